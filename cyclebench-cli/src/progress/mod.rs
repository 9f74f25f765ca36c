//! Progress Reporting
//!
//! Streams run progress while benchmarks execute. Two presentations exist,
//! selected by the configured trace format:
//!
//! - [`ConsoleProgress`] - plain lines for a terminal
//! - [`IntelliJProgress`] - self-contained `<ijLog>` events an IDE host
//!   parses line by line
//!
//! One reporter instance lives for the whole process and is threaded through
//! the executor. Write failures on the progress stream are logged and never
//! abort a benchmark.

mod console;
mod intellij;

pub use console::ConsoleProgress;
pub use intellij::{IntelliJProgress, ProgressState};

use crate::config::TraceFormat;
use std::fmt;
use std::io::Write;

/// Outcome reported when a benchmark or group finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinishStatus {
    /// Completed normally
    #[default]
    Success,
    /// At least one failure
    Failure,
}

impl FinishStatus {
    /// Upper-case form used in structured events
    pub fn as_result_type(self) -> &'static str {
        match self {
            FinishStatus::Success => "SUCCESS",
            FinishStatus::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for FinishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishStatus::Success => f.write_str("Success"),
            FinishStatus::Failure => f.write_str("Failure"),
        }
    }
}

impl std::str::FromStr for FinishStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Success" => Ok(FinishStatus::Success),
            "Failure" => Ok(FinishStatus::Failure),
            other => Err(format!("unknown finish status '{other}'")),
        }
    }
}

/// Receiver of run progress events
pub trait BenchmarkProgress {
    /// The run starts
    fn start_suite(&mut self, suite: &str);

    /// The run ends; `summary` is the text table of all results
    fn end_suite(&mut self, suite: &str, summary: &str);

    /// A benchmark run identified by `benchmark` starts
    fn start_benchmark(&mut self, suite: &str, benchmark: &str);

    /// A benchmark run completed with `status`
    fn end_benchmark(&mut self, suite: &str, benchmark: &str, status: FinishStatus, message: &str);

    /// A benchmark run was aborted
    fn end_benchmark_exception(&mut self, suite: &str, benchmark: &str, error: &str, stacktrace: &str);

    /// Free-form line belonging to a benchmark run
    fn output(&mut self, suite: &str, benchmark: &str, message: &str);

    /// State to persist between forked invocations, if any
    fn state(&self) -> Option<ProgressState> {
        None
    }

    /// Continue from state persisted by an earlier invocation
    fn restore(&mut self, _state: ProgressState) {}
}

/// Create the reporter for `format`, writing to `writer`
pub fn create(format: TraceFormat, writer: Box<dyn Write>) -> Box<dyn BenchmarkProgress> {
    match format {
        TraceFormat::Text => Box::new(ConsoleProgress::new(writer)),
        TraceFormat::Xml => Box::new(IntelliJProgress::new(writer)),
    }
}

/// Write one line, logging instead of failing
fn emit(writer: &mut dyn Write, line: &str) {
    if let Err(e) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
        tracing::warn!(error = %e, "failed to write progress event");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// In-memory writer whose contents stay readable after boxing
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_finish_status_text() {
        assert_eq!(FinishStatus::Success.to_string(), "Success");
        assert_eq!(FinishStatus::Failure.as_result_type(), "FAILURE");
        assert_eq!("Failure".parse::<FinishStatus>(), Ok(FinishStatus::Failure));
        assert!("failed".parse::<FinishStatus>().is_err());
    }

    #[test]
    fn test_create_selects_presentation() {
        let buffer = SharedBuffer::default();
        let mut progress = create(TraceFormat::Text, Box::new(buffer.clone()));
        progress.output("main", "pkg.A.run", "hello");
        assert_eq!(buffer.contents(), "hello\n");
        assert!(progress.state().is_none());

        let buffer = SharedBuffer::default();
        let mut progress = create(TraceFormat::Xml, Box::new(buffer.clone()));
        progress.start_suite("main");
        assert!(buffer.contents().starts_with("<ijLog>"));
        assert!(progress.state().is_some());
    }
}
