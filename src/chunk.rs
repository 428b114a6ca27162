//! Sorted chunk files.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use log;

use crate::record::{is_blank, Record};
use crate::sort::SortError;

/// External chunk. A sorted sequence of lines stored on file system, one record per line.
///
/// Reading a chunk yields its records in file order. Reading stops at the end of the file or at the
/// first blank line. The file handle is closed when the chunk is dropped.
pub struct ExternalChunk {
    path: PathBuf,
    reader: io::BufReader<fs::File>,
    line_no: u64,
    exhausted: bool,
}

impl ExternalChunk {
    /// Writes records to a new chunk file. Returns the number of bytes written.
    ///
    /// Every line is written newline-terminated even if its raw form is not,
    /// so that the last line of an input never runs into the next record.
    pub fn dump(
        path: &Path,
        items: impl IntoIterator<Item = Record>,
        buf_size: Option<usize>,
    ) -> Result<u64, SortError> {
        let file = fs::File::create(path).map_err(SortError::io(path))?;
        let mut chunk_writer = match buf_size {
            Some(buf_size) => io::BufWriter::with_capacity(buf_size, file),
            None => io::BufWriter::new(file),
        };

        let mut written = 0;
        for item in items.into_iter() {
            let raw = item.raw();
            chunk_writer.write_all(raw.as_bytes()).map_err(SortError::io(path))?;
            written += raw.len() as u64;
            if !raw.ends_with('\n') {
                chunk_writer.write_all(b"\n").map_err(SortError::io(path))?;
                written += 1;
            }
        }

        chunk_writer.flush().map_err(SortError::io(path))?;

        return Ok(written);
    }

    /// Opens a chunk file for reading.
    pub fn open(path: &Path, buf_size: Option<usize>) -> Result<Self, SortError> {
        let file = fs::File::open(path).map_err(SortError::io(path))?;
        let reader = match buf_size {
            Some(buf_size) => io::BufReader::with_capacity(buf_size, file),
            None => io::BufReader::new(file),
        };

        return Ok(ExternalChunk {
            path: path.to_path_buf(),
            reader,
            line_no: 0,
            exhausted: false,
        });
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for ExternalChunk {
    type Item = Result<Record, SortError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => {
                self.exhausted = true;
                return None;
            }
            Ok(_) => self.line_no += 1,
            Err(err) => {
                self.exhausted = true;
                return Some(Err(SortError::IO {
                    path: self.path.clone(),
                    err,
                }));
            }
        }

        if is_blank(&line) {
            self.exhausted = true;
            return None;
        }

        match Record::parse(line) {
            Ok(record) => Some(Ok(record)),
            Err(err) => {
                self.exhausted = true;
                log::error!("error parsing line {} of {}: {:?}", self.line_no, self.path().display(), err.line());
                Some(Err(SortError::MalformedLine {
                    path: self.path.clone(),
                    line_no: self.line_no,
                    err,
                }))
            }
        }
    }
}
