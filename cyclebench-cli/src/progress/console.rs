//! Console Progress
//!
//! Plain lines for a terminal, no nesting.

use super::{BenchmarkProgress, FinishStatus, emit};
use std::io::Write;

/// Line-oriented progress for humans
pub struct ConsoleProgress {
    writer: Box<dyn Write>,
}

impl ConsoleProgress {
    /// Reporter writing to `writer`
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }

    fn line(&mut self, line: &str) {
        emit(self.writer.as_mut(), line);
    }
}

impl BenchmarkProgress for ConsoleProgress {
    fn start_suite(&mut self, _suite: &str) {}

    fn end_suite(&mut self, _suite: &str, summary: &str) {
        self.line("");
        self.line(summary);
    }

    fn start_benchmark(&mut self, _suite: &str, benchmark: &str) {
        self.line("");
        self.line(&format!("\u{2026} {benchmark}"));
    }

    fn end_benchmark(&mut self, _suite: &str, _benchmark: &str, status: FinishStatus, message: &str) {
        self.line(&format!("  {status}: {message}"));
    }

    fn end_benchmark_exception(&mut self, _suite: &str, _benchmark: &str, error: &str, stacktrace: &str) {
        self.line(&format!("  EXCEPTION: {error}"));
        self.line(stacktrace);
    }

    fn output(&mut self, _suite: &str, _benchmark: &str, message: &str) {
        self.line(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::tests::SharedBuffer;

    #[test]
    fn test_console_lines() {
        let buffer = SharedBuffer::default();
        let mut progress = ConsoleProgress::new(Box::new(buffer.clone()));

        progress.start_suite("main");
        progress.start_benchmark("main", "pkg.A.run | size=10");
        progress.output("main", "pkg.A.run | size=10", "Iteration #0: 12.0000 ops/ms");
        progress.end_benchmark("main", "pkg.A.run | size=10", FinishStatus::Success, "  ~ 12.0 ops/ms");
        progress.start_benchmark("main", "pkg.A.fail");
        progress.end_benchmark_exception("main", "pkg.A.fail", "boom", "at frame");
        progress.end_suite("main", "Benchmark  Mode");

        assert_eq!(
            buffer.contents(),
            "\n\u{2026} pkg.A.run | size=10\n\
             Iteration #0: 12.0000 ops/ms\n\
             \x20 Success:   ~ 12.0 ops/ms\n\
             \n\u{2026} pkg.A.fail\n\
             \x20 EXCEPTION: boom\n\
             at frame\n\
             \n\
             Benchmark  Mode\n"
        );
    }
}
