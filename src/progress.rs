//! Progress reporting.

use std::fmt;
use std::time::{Duration, Instant};

/// Default minimal interval between two progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Progress report passed to a progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Input splitting progress.
    Split {
        processed_bytes: u64,
        total_bytes: u64,
        chunks: usize,
    },
    /// Chunk merging progress.
    Merge { lines: u64, bytes: u64 },
    /// Test file generation progress.
    Generate { written_bytes: u64, target_bytes: u64 },
}

/// Progress callback type.
pub type ProgressCallback = Box<dyn FnMut(&Progress)>;

/// Rate limited progress reporter.
///
/// Invokes the callback at most once per interval. A reporter without a callback does nothing,
/// the report is not even built in that case.
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    interval: Duration,
    last_report: Instant,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressCallback>, interval: Duration) -> Self {
        ProgressReporter {
            callback,
            interval,
            last_report: Instant::now(),
        }
    }

    /// Creates a reporter that never reports.
    pub fn disabled() -> Self {
        ProgressReporter::new(None, DEFAULT_PROGRESS_INTERVAL)
    }

    /// Restarts the interval, used at the beginning of a phase.
    pub fn restart(&mut self) {
        self.last_report = Instant::now();
    }

    /// Reports progress if the interval since the previous report has elapsed.
    pub fn report_with(&mut self, progress: impl FnOnce() -> Progress) {
        if let Some(callback) = self.callback.as_mut() {
            if self.last_report.elapsed() >= self.interval {
                callback(&progress());
                self.last_report = Instant::now();
            }
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        ProgressReporter::disabled()
    }
}

/// Human readable duration: seconds below a minute, minutes below an hour, hours otherwise.
#[derive(Debug, Clone, Copy)]
pub struct HumanDuration(pub Duration);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.0.as_secs_f64();
        if seconds < 60.0 {
            write!(f, "{:.1} seconds", seconds)
        } else if seconds < 3600.0 {
            write!(f, "{:.1} minutes", seconds / 60.0)
        } else {
            write!(f, "{:.1} hours", seconds / 3600.0)
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use rstest::*;

    use super::{HumanDuration, Progress, ProgressReporter};

    #[rstest]
    #[case(Duration::from_millis(12_340), "12.3 seconds")]
    #[case(Duration::from_secs(90), "1.5 minutes")]
    #[case(Duration::from_secs(5_400), "1.5 hours")]
    fn test_human_duration(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(HumanDuration(duration).to_string(), expected);
    }

    #[rstest]
    fn test_reporter_zero_interval_reports_every_time() {
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = reports.clone();
        let mut reporter = ProgressReporter::new(
            Some(Box::new(move |progress: &Progress| sink.borrow_mut().push(*progress))),
            Duration::ZERO,
        );

        reporter.report_with(|| Progress::Merge { lines: 1, bytes: 5 });
        reporter.report_with(|| Progress::Merge { lines: 2, bytes: 9 });

        assert_eq!(
            *reports.borrow(),
            vec![Progress::Merge { lines: 1, bytes: 5 }, Progress::Merge { lines: 2, bytes: 9 }]
        );
    }

    #[rstest]
    fn test_reporter_respects_interval() {
        let reports = Rc::new(RefCell::new(0));
        let sink = reports.clone();
        let mut reporter = ProgressReporter::new(
            Some(Box::new(move |_: &Progress| *sink.borrow_mut() += 1)),
            Duration::from_secs(3600),
        );

        reporter.restart();
        reporter.report_with(|| Progress::Merge { lines: 1, bytes: 1 });

        assert_eq!(*reports.borrow(), 0);
    }

    #[rstest]
    fn test_disabled_reporter_does_not_build_report() {
        let mut reporter = ProgressReporter::disabled();
        reporter.report_with(|| panic!("report must not be built"));
    }
}
