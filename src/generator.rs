//! Test file generator.
//!
//! Produces files of `<number>. <text>` lines suitable as sorter input. About a third of the lines
//! reuse a small set of common texts so that the output has plenty of equal texts ordered by number.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::Path;

use log;
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::progress::{Progress, ProgressReporter};

/// Texts repeated across generated lines.
pub const COMMON_TEXTS: [&str; 10] = [
    "Apple",
    "Banana",
    "Cherry",
    "Date",
    "Elderberry",
    "Something something something",
    "Test string",
    "Random text",
    "Common phrase",
    "Repeated line",
];

const MAX_NUMBER: u64 = 1_000_000_000_000_000_000;
const MAX_TEXT_LEN: usize = 100;
const COMMON_TEXT_PROBABILITY: f64 = 0.3;
const TEXT_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ ";

/// Random line generator.
pub struct LineGenerator<R: Rng> {
    rng: R,
}

impl LineGenerator<ThreadRng> {
    pub fn new() -> Self {
        LineGenerator::with_rng(rand::thread_rng())
    }
}

impl Default for LineGenerator<ThreadRng> {
    fn default() -> Self {
        LineGenerator::new()
    }
}

impl<R: Rng> LineGenerator<R> {
    /// Creates a generator using the given random number generator.
    pub fn with_rng(rng: R) -> Self {
        LineGenerator { rng }
    }

    /// Generates a single newline-terminated line.
    pub fn generate_line(&mut self) -> String {
        let number = self.rng.gen_range(1..=MAX_NUMBER);
        let text = if self.rng.gen_bool(COMMON_TEXT_PROBABILITY) {
            COMMON_TEXTS[self.rng.gen_range(0..COMMON_TEXTS.len())].to_string()
        } else {
            let len = self.rng.gen_range(1..=MAX_TEXT_LEN);
            (0..len)
                .map(|_| TEXT_CHARSET[self.rng.gen_range(0..TEXT_CHARSET.len())] as char)
                .collect()
        };

        format!("{}. {}\n", number, text)
    }

    /// Writes lines to the file at `path` until at least `target_bytes` bytes are written.
    /// Returns the number of bytes written.
    pub fn generate_file(
        &mut self,
        path: &Path,
        target_bytes: u64,
        progress: &mut ProgressReporter,
    ) -> io::Result<u64> {
        let mut output_writer = io::BufWriter::new(fs::File::create(path)?);
        let mut written_bytes = 0;
        progress.restart();

        while written_bytes < target_bytes {
            let line = self.generate_line();
            output_writer.write_all(line.as_bytes())?;
            written_bytes += line.len() as u64;

            progress.report_with(|| Progress::Generate {
                written_bytes,
                target_bytes,
            });
        }
        output_writer.flush()?;

        log::debug!("generated {} bytes into {}", written_bytes, path.display());

        return Ok(written_bytes);
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::*;

    use super::{LineGenerator, MAX_NUMBER};
    use crate::progress::ProgressReporter;
    use crate::record::Record;
    use crate::sort::sort_file;

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[rstest]
    fn test_generated_lines_parse() {
        let mut generator = LineGenerator::with_rng(StdRng::seed_from_u64(7));

        for _ in 0..1000 {
            let line = generator.generate_line();
            assert!(line.ends_with('\n'));

            let record = Record::parse(line.clone()).unwrap();
            assert!(record.number() >= 1 && record.number() <= MAX_NUMBER, "{:?}", line);
        }
    }

    #[rstest]
    fn test_seeded_generators_agree() {
        let mut first = LineGenerator::with_rng(StdRng::seed_from_u64(42));
        let mut second = LineGenerator::with_rng(StdRng::seed_from_u64(42));

        for _ in 0..10 {
            assert_eq!(first.generate_line(), second.generate_line());
        }
    }

    #[rstest]
    fn test_generate_file_and_sort(tmp_dir: tempfile::TempDir) {
        let input = tmp_dir.path().join("input.txt");
        let output = tmp_dir.path().join("output.txt");
        let mut generator = LineGenerator::with_rng(StdRng::seed_from_u64(1));

        let written = generator
            .generate_file(&input, 20_000, &mut ProgressReporter::disabled())
            .unwrap();
        assert!(written >= 20_000);
        assert_eq!(fs::metadata(&input).unwrap().len(), written);

        let stats = sort_file(&input, &output, 2_000).unwrap();
        assert!(stats.chunks >= 10);
        assert_eq!(stats.output_bytes, written);
    }
}
