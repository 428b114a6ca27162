//! Temporary working directory.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log;

use crate::sort::SortError;

/// Temporary directory holding chunk files of a single sort run.
///
/// Chunk paths are handed out with increasing indexes and tracked until they are removed. Closing
/// the directory removes the remaining chunk files first and the directory itself afterwards.
/// Dropping an unclosed directory does the same, ignoring errors.
pub struct WorkDir {
    tmp_dir: Option<tempfile::TempDir>,
    chunks: Vec<PathBuf>,
    next_index: usize,
}

impl WorkDir {
    /// Creates a new working directory inside `parent` or inside the default OS temporary directory.
    pub fn new(parent: Option<&Path>) -> Result<Self, SortError> {
        let tmp_dir = if let Some(parent) = parent {
            tempfile::tempdir_in(parent)
        } else {
            tempfile::tempdir()
        }
        .map_err(SortError::TempDir)?;

        log::info!("using {} as a temporary directory", tmp_dir.path().display());

        return Ok(WorkDir {
            tmp_dir: Some(tmp_dir),
            chunks: Vec::new(),
            next_index: 0,
        });
    }

    pub fn path(&self) -> &Path {
        match &self.tmp_dir {
            Some(tmp_dir) => tmp_dir.path(),
            None => Path::new(""),
        }
    }

    /// Allocates a path for the next chunk file and starts tracking it.
    pub fn next_chunk_path(&mut self) -> PathBuf {
        let path = self.path().join(format!("chunk_{}.txt", self.next_index));
        self.next_index += 1;
        self.chunks.push(path.clone());
        path
    }

    /// Number of chunk files still tracked.
    #[cfg(test)]
    pub(crate) fn chunks_count(&self) -> usize {
        self.chunks.len()
    }

    /// Removes chunk files. A file that does not exist anymore is not an error,
    /// other failures are logged and skipped.
    pub fn remove_chunks(&mut self, paths: &[PathBuf]) {
        for path in paths {
            if let Err(err) = remove_file(path) {
                log::warn!("{}", err);
            }
        }
        let removed: HashSet<&PathBuf> = paths.iter().collect();
        self.chunks.retain(|chunk| !removed.contains(chunk));
    }

    /// Removes all remaining chunk files and the directory itself.
    pub fn close(mut self) -> Result<(), SortError> {
        let chunks = std::mem::take(&mut self.chunks);
        self.remove_chunks(&chunks);

        match self.tmp_dir.take() {
            Some(tmp_dir) => {
                let path = tmp_dir.path().to_path_buf();
                tmp_dir.close().map_err(|err| SortError::Cleanup { path, err })
            }
            None => Ok(()),
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.tmp_dir.is_some() {
            let chunks = std::mem::take(&mut self.chunks);
            self.remove_chunks(&chunks);
        }
    }
}

fn remove_file(path: &Path) -> Result<(), SortError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(SortError::Cleanup {
            path: path.to_path_buf(),
            err,
        }),
    }
}
