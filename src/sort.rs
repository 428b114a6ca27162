//! External sorter.

use log;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use crate::buffer::ChunkBuffer;
use crate::chunk::ExternalChunk;
use crate::merger::KWayMerger;
use crate::progress::{HumanDuration, Progress, ProgressCallback, ProgressReporter, DEFAULT_PROGRESS_INTERVAL};
use crate::record::{is_blank, ParseError, Record};
use crate::workdir::WorkDir;

/// Default chunk size limit: 200 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 200 * bytesize::MIB;

/// Sorting error.
#[derive(Debug)]
pub enum SortError {
    /// Temporary directory creation error.
    TempDir(io::Error),
    /// I/O error on an input, chunk or output file.
    IO { path: PathBuf, err: io::Error },
    /// Line format error.
    MalformedLine {
        path: PathBuf,
        line_no: u64,
        err: ParseError,
    },
    /// Temporary data removal error. Never returned by the sorter, only logged.
    Cleanup { path: PathBuf, err: io::Error },
}

impl SortError {
    /// Returns a function wrapping an I/O error of the file at `path`.
    pub fn io(path: &Path) -> impl FnOnce(io::Error) -> SortError + '_ {
        move |err| SortError::IO {
            path: path.to_path_buf(),
            err,
        }
    }
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(match &self {
            SortError::TempDir(err) => err,
            SortError::IO { err, .. } => err,
            SortError::MalformedLine { err, .. } => err,
            SortError::Cleanup { err, .. } => err,
        })
    }
}

impl Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            SortError::TempDir(err) => write!(f, "temporary directory not created: {}", err),
            SortError::IO { path, err } => write!(f, "I/O operation on {} failed: {}", path.display(), err),
            SortError::MalformedLine { path, line_no, err } => {
                write!(f, "malformed line {} of {}: {}", line_no, path.display(), err)
            }
            SortError::Cleanup { path, err } => write!(f, "{} not removed: {}", path.display(), err),
        }
    }
}

/// Merge phase statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Number of lines written to the output.
    pub lines: u64,
    /// Number of bytes written to the output.
    pub bytes: u64,
}

/// Whole sort run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortStats {
    pub chunks: usize,
    pub lines: u64,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub elapsed: Duration,
}

/// External sorter builder. Provides methods for [`ExternalSorter`] initialization.
pub struct ExternalSorterBuilder {
    /// Chunk size limit in bytes.
    chunk_size: u64,
    /// Directory to be used to store temporary data.
    tmp_dir: Option<Box<Path>>,
    /// Chunk file read/write buffer size.
    rw_buf_size: Option<usize>,
    /// Progress callback.
    progress: Option<ProgressCallback>,
    /// Minimal interval between progress reports.
    progress_interval: Duration,
}

impl ExternalSorterBuilder {
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        ExternalSorterBuilder::default()
    }

    /// Builds an [`ExternalSorter`] instance using provided configuration.
    pub fn build(self) -> Result<ExternalSorter, SortError> {
        ExternalSorter::new(
            self.tmp_dir.as_deref(),
            self.chunk_size,
            self.rw_buf_size,
            ProgressReporter::new(self.progress, self.progress_interval),
        )
    }

    /// Sets chunk size limit in bytes.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> ExternalSorterBuilder {
        self.chunk_size = chunk_size;
        return self;
    }

    /// Sets directory to be used to store temporary data.
    pub fn with_tmp_dir(mut self, path: &Path) -> ExternalSorterBuilder {
        self.tmp_dir = Some(path.into());
        return self;
    }

    /// Sets chunk read/write buffer size.
    pub fn with_rw_buf_size(mut self, buf_size: usize) -> ExternalSorterBuilder {
        self.rw_buf_size = Some(buf_size);
        return self;
    }

    /// Sets progress callback.
    pub fn with_progress(mut self, callback: impl FnMut(&Progress) + 'static) -> ExternalSorterBuilder {
        self.progress = Some(Box::new(callback));
        return self;
    }

    /// Sets minimal interval between two progress callback calls.
    pub fn with_progress_interval(mut self, interval: Duration) -> ExternalSorterBuilder {
        self.progress_interval = interval;
        return self;
    }
}

impl Default for ExternalSorterBuilder {
    fn default() -> Self {
        ExternalSorterBuilder {
            chunk_size: DEFAULT_CHUNK_SIZE,
            tmp_dir: None,
            rw_buf_size: None,
            progress: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// External sorter.
///
/// A sorter owns a temporary directory and performs a single sort run: [`ExternalSorter::sort`] consumes
/// it and removes all temporary data before returning, whether the run succeeded or not.
pub struct ExternalSorter {
    /// Directory to be used to store temporary data.
    work_dir: WorkDir,
    /// Chunk size limit in bytes.
    chunk_size: u64,
    /// Chunk file read/write buffer size.
    rw_buf_size: Option<usize>,
    /// Progress reporter.
    progress: ProgressReporter,
}

impl ExternalSorter {
    /// Creates a new external sorter instance.
    ///
    /// # Arguments
    /// * `tmp_path` - Directory to be used to store temporary data. If paramater is [`None`] default OS temporary
    ///   directory will be used.
    /// * `chunk_size` - Chunk size limit in bytes. The limit is checked before a line is added to a chunk,
    ///   so a chunk can exceed it by less than one line.
    /// * `rw_buf_size` - Chunks file read/write buffer size.
    /// * `progress` - Progress reporter.
    pub fn new(
        tmp_path: Option<&Path>,
        chunk_size: u64,
        rw_buf_size: Option<usize>,
        progress: ProgressReporter,
    ) -> Result<Self, SortError> {
        log::info!("chunk size: {}", ByteSize(chunk_size));

        return Ok(ExternalSorter {
            work_dir: WorkDir::new(tmp_path)?,
            chunk_size,
            rw_buf_size,
            progress,
        });
    }

    /// Returns the temporary directory path.
    pub fn tmp_dir(&self) -> &Path {
        self.work_dir.path()
    }

    /// Sorts lines of the `input` file writing the result to the `output` file.
    /// Temporary data is removed before returning.
    pub fn sort(mut self, input: &Path, output: &Path) -> Result<SortStats, SortError> {
        let result = self.run(input, output);

        log::debug!("removing temporary directory {}", self.work_dir.path().display());
        if let Err(err) = self.work_dir.close() {
            log::warn!("{}", err);
        }

        result
    }

    fn run(&mut self, input: &Path, output: &Path) -> Result<SortStats, SortError> {
        let started = Instant::now();
        let input_bytes = fs::metadata(input).map_err(SortError::io(input))?.len();
        log::info!("input file size: {}", ByteSize(input_bytes));

        log::info!("phase 1: splitting into sorted chunks ...");
        let chunk_paths = self.split_into_chunks(input)?;

        log::info!("phase 2: merging chunks ...");
        let merge_stats = self.merge(&chunk_paths, output)?;

        let stats = SortStats {
            chunks: chunk_paths.len(),
            lines: merge_stats.lines,
            input_bytes,
            output_bytes: merge_stats.bytes,
            elapsed: started.elapsed(),
        };
        log::info!(
            "sort complete: output file size {}, total processing time {}",
            ByteSize(stats.output_bytes),
            HumanDuration(stats.elapsed)
        );

        return Ok(stats);
    }

    /// Splits the input file into sorted chunk files.
    /// Returns chunk file paths in creation order.
    ///
    /// If the split fails all chunk files created by the call are removed.
    pub fn split_into_chunks(&mut self, input: &Path) -> Result<Vec<PathBuf>, SortError> {
        let started = Instant::now();
        let mut chunk_paths = Vec::new();

        if let Err(err) = self.fill_chunks(input, &mut chunk_paths) {
            log::error!("error during splitting: {}", err);
            self.work_dir.remove_chunks(&chunk_paths);
            return Err(err);
        }

        log::info!(
            "split complete: created {} chunks in {}",
            chunk_paths.len(),
            HumanDuration(started.elapsed())
        );

        return Ok(chunk_paths);
    }

    fn fill_chunks(&mut self, input: &Path, chunk_paths: &mut Vec<PathBuf>) -> Result<(), SortError> {
        let file = fs::File::open(input).map_err(SortError::io(input))?;
        let total_bytes = file.metadata().map_err(SortError::io(input))?.len();
        let mut reader = match self.rw_buf_size {
            Some(buf_size) => io::BufReader::with_capacity(buf_size, file),
            None => io::BufReader::new(file),
        };

        let mut chunk_buf = ChunkBuffer::new(self.chunk_size);
        let mut processed_bytes = 0;
        let mut line_no = 0;
        self.progress.restart();

        loop {
            let mut line = String::new();
            let line_size = reader.read_line(&mut line).map_err(SortError::io(input))? as u64;
            if line_size == 0 {
                break;
            }
            line_no += 1;
            processed_bytes += line_size;

            if chunk_buf.is_full_for(line_size) {
                self.create_chunk(&mut chunk_buf, chunk_paths)?;
                self.progress.report_with(|| Progress::Split {
                    processed_bytes,
                    total_bytes,
                    chunks: chunk_paths.len(),
                });
            }

            if is_blank(&line) {
                chunk_buf.skip(line_size);
                continue;
            }

            match Record::parse(line) {
                Ok(record) => chunk_buf.push(record),
                Err(err) => {
                    log::error!("error parsing line {} of {}: {:?}", line_no, input.display(), err.line());
                    return Err(SortError::MalformedLine {
                        path: input.to_path_buf(),
                        line_no,
                        err,
                    });
                }
            }
        }

        self.create_chunk(&mut chunk_buf, chunk_paths)?;

        return Ok(());
    }

    fn create_chunk(&mut self, chunk_buf: &mut ChunkBuffer, chunk_paths: &mut Vec<PathBuf>) -> Result<(), SortError> {
        if chunk_buf.is_empty() {
            chunk_buf.take_sorted();
            return Ok(());
        }

        log::debug!("sorting chunk data ({} lines, {}) ...", chunk_buf.len(), ByteSize(chunk_buf.mem_size()));
        let records = chunk_buf.take_sorted();

        let path = self.work_dir.next_chunk_path();
        chunk_paths.push(path.clone());

        log::debug!("saving chunk data to {}", path.display());
        ExternalChunk::dump(&path, records, self.rw_buf_size)?;

        return Ok(());
    }

    /// Merges sorted chunk files into the `output` file.
    ///
    /// The chunk files are removed afterwards whether the merge succeeded or not. If the merge fails
    /// the partially written output file is removed too.
    pub fn merge(&mut self, chunk_paths: &[PathBuf], output: &Path) -> Result<MergeStats, SortError> {
        let started = Instant::now();

        log::info!("opening {} chunk files ...", chunk_paths.len());
        let result = match self.open_chunks(chunk_paths) {
            Ok(chunks) => self.write_merged(chunks, output).map_err(|err| {
                match fs::remove_file(output) {
                    Err(rm_err) if rm_err.kind() != io::ErrorKind::NotFound => {
                        log::warn!("partial output {} not removed: {}", output.display(), rm_err)
                    }
                    _ => {}
                }
                err
            }),
            Err(err) => Err(err),
        };

        log::info!("cleaning up temporary files ...");
        let cleanup_started = Instant::now();
        self.work_dir.remove_chunks(chunk_paths);
        log::info!("cleanup took {}", HumanDuration(cleanup_started.elapsed()));

        match &result {
            Ok(stats) => log::info!(
                "merge complete: {} lines in {}",
                stats.lines,
                HumanDuration(started.elapsed())
            ),
            Err(err) => log::error!("error during merging: {}", err),
        }

        result
    }

    fn open_chunks(&self, chunk_paths: &[PathBuf]) -> Result<Vec<ExternalChunk>, SortError> {
        chunk_paths
            .iter()
            .map(|path| ExternalChunk::open(path, self.rw_buf_size))
            .collect()
    }

    fn write_merged(&mut self, chunks: Vec<ExternalChunk>, output: &Path) -> Result<MergeStats, SortError> {
        let file = fs::File::create(output).map_err(SortError::io(output))?;
        let mut output_writer = match self.rw_buf_size {
            Some(buf_size) => io::BufWriter::with_capacity(buf_size, file),
            None => io::BufWriter::new(file),
        };

        let mut stats = MergeStats::default();
        self.progress.restart();

        for record in KWayMerger::new(chunks) {
            let record = record?;
            output_writer
                .write_all(record.raw().as_bytes())
                .map_err(SortError::io(output))?;

            stats.lines += 1;
            stats.bytes += record.raw().len() as u64;
            self.progress.report_with(|| Progress::Merge {
                lines: stats.lines,
                bytes: stats.bytes,
            });
        }

        output_writer.flush().map_err(SortError::io(output))?;

        return Ok(stats);
    }
}

/// Sorts lines of the `input` file into the `output` file using default settings
/// and the given chunk size limit.
pub fn sort_file(input: &Path, output: &Path, chunk_size: u64) -> Result<SortStats, SortError> {
    ExternalSorterBuilder::new()
        .with_chunk_size(chunk_size)
        .build()?
        .sort(input, output)
}
