//! `ext-line-sort` sorts text files far larger than available memory.
//!
//! The input is a file of numbered lines, `<number>.<text>`, one record per line. Lines are ordered by
//! text first and by number second; the lines themselves are written to the output byte for byte as
//! they were read.
//!
//! Sorting is done in two passes. During the first pass the input is split into chunks whose total line
//! length stays within a configured limit, each chunk is sorted in memory and saved to a temporary file.
//! During the second pass the sorted chunks are merged together using a binary heap holding one pending
//! line per chunk. Memory consumption is bounded by the chunk size during the first pass and by the
//! number of chunks during the second one. For more information see
//! [External Sorting](https://en.wikipedia.org/wiki/External_sorting).
//!
//! # Overview
//!
//! * **Stable order:** lines with equal keys keep their input order within a chunk, and lines of an
//!   earlier chunk precede equal lines of a later chunk, so the output is the same for any chunk size.
//! * **Cleanup:** temporary chunk files and their directory are removed whether sorting succeeds or fails.
//! * **Progress reporting:** an optional callback is invoked during long phases.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use bytesize::MIB;
//!
//! use ext_line_sort::{ExternalSorter, ExternalSorterBuilder};
//!
//! fn main() {
//!     let sorter: ExternalSorter = ExternalSorterBuilder::new()
//!         .with_tmp_dir(Path::new("./"))
//!         .with_chunk_size(50 * MIB)
//!         .with_progress(|progress| println!("{:?}", progress))
//!         .build()
//!         .unwrap();
//!
//!     let stats = sorter.sort(Path::new("input.txt"), Path::new("output.txt")).unwrap();
//!     println!("sorted {} lines", stats.lines);
//! }
//! ```

pub mod buffer;
pub mod chunk;
#[cfg(feature = "cli")]
pub mod cli;
pub mod generator;
pub mod heap;
pub mod merger;
pub mod progress;
pub mod record;
pub mod sort;
pub mod workdir;

pub use buffer::ChunkBuffer;
pub use chunk::ExternalChunk;
pub use generator::LineGenerator;
pub use heap::MinHeap;
pub use merger::KWayMerger;
pub use progress::{HumanDuration, Progress, ProgressReporter};
pub use record::{ParseError, ParseErrorKind, Record};
pub use sort::{sort_file, ExternalSorter, ExternalSorterBuilder, MergeStats, SortError, SortStats, DEFAULT_CHUNK_SIZE};
pub use workdir::WorkDir;
