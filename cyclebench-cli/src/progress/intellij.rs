//! Structured IDE Progress
//!
//! Every event is one self-contained `<ijLog>` line. Events form a tree
//! through `id` / `parentId`:
//!
//! ```text
//! [root]
//!   └── <suite>                 execution name
//!         └── <class>           opened lazily, closed when the class changes
//!               └── <class>.<method>
//! ```
//!
//! Free text (output, error messages, stack traces) travels base64-encoded
//! inside CDATA; ids and names are XML-escaped attribute values.

use super::{BenchmarkProgress, FinishStatus, emit};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::Write;

const ROOT_ID: &str = "[root]";

/// Cursor state of the structured reporter
///
/// Forked invocations persist it in the progress file, one field per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    /// Class group currently open, empty before the first benchmark
    pub current_class: String,
    /// Failure once any benchmark of the open class failed
    pub current_status: FinishStatus,
    /// Failure once any benchmark failed
    pub suite_status: FinishStatus,
}

impl ProgressState {
    /// Three-line persisted form
    pub fn encode(&self) -> String {
        format!(
            "{}\n{}\n{}\n",
            self.current_class, self.current_status, self.suite_status
        )
    }

    /// Parse the persisted form; missing or unreadable lines fall back to
    /// the initial state
    pub fn decode(text: &str) -> Self {
        let mut lines = text.lines();
        let current_class = lines.next().unwrap_or_default().to_string();
        let mut status = || {
            lines
                .next()
                .and_then(|l| l.trim().parse::<FinishStatus>().ok())
                .unwrap_or_default()
        };
        let current_status = status();
        let suite_status = status();
        Self {
            current_class,
            current_status,
            suite_status,
        }
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn test_element(id: &str, parent: &str, body: &str) -> String {
    format!(
        "<test id='{}' parentId='{}'>{body}</test>",
        escape(id),
        escape(parent)
    )
}

fn event(kind: &str, id: &str, parent: &str, body: &str) -> String {
    format!(
        "<ijLog><event type='{kind}'>{}</event></ijLog>",
        test_element(id, parent, body)
    )
}

fn result_element(status: FinishStatus, body: &str) -> String {
    let head = format!(
        "<result resultType='{}' startTime='0' endTime='0'",
        status.as_result_type()
    );
    if body.is_empty() {
        format!("{head}/>")
    } else {
        format!("{head}>{body}</result>")
    }
}

fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", STANDARD.encode(text.as_bytes()))
}

fn suite_start(parent: &str, id: &str) -> String {
    event(
        "beforeSuite",
        id,
        parent,
        &format!("<descriptor name='{}'/>", escape(id)),
    )
}

fn suite_finish(parent: &str, id: &str, status: FinishStatus) -> String {
    event("afterSuite", id, parent, &result_element(status, ""))
}

fn benchmark_start(parent: &str, class_name: &str, method_name: &str) -> String {
    event(
        "beforeTest",
        &format!("{class_name}.{method_name}"),
        parent,
        &format!(
            "<descriptor name='{}' className='{}' />",
            escape(method_name),
            escape(class_name)
        ),
    )
}

fn benchmark_finish(parent: &str, id: &str, status: FinishStatus) -> String {
    event("afterTest", id, parent, &result_element(status, ""))
}

fn benchmark_finish_exception(parent: &str, id: &str, error: &str, stacktrace: &str) -> String {
    let body = format!(
        "<errorMsg>{}</errorMsg><stackTrace>{}</stackTrace>",
        cdata(error),
        cdata(stacktrace)
    );
    event(
        "afterTest",
        id,
        parent,
        &result_element(FinishStatus::Failure, &body),
    )
}

fn log_output(parent: &str, id: &str, info: &str) -> String {
    event(
        "onOutput",
        id,
        parent,
        &format!("<event destination='StdOut'>{}</event>", cdata(info)),
    )
}

/// Split a run id into class and method at the last `.` of its name part
///
/// `pkg.Suite.run | x=1.5` splits into `pkg.Suite` and `run | x=1.5`.
fn split_run_id(id: &str) -> (&str, &str) {
    let name_end = id.find(" | ").unwrap_or(id.len());
    match id[..name_end].rfind('.') {
        Some(dot) => (&id[..dot], &id[dot + 1..]),
        None => ("", id),
    }
}

/// Structured progress for an IDE host
pub struct IntelliJProgress {
    writer: Box<dyn Write>,
    state: ProgressState,
}

impl IntelliJProgress {
    /// Reporter writing to `writer`, starting fresh
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            state: ProgressState::default(),
        }
    }

    fn line(&mut self, line: &str) {
        emit(self.writer.as_mut(), line);
    }

    fn close_class(&mut self, suite: &str) {
        if !self.state.current_class.is_empty() {
            let line = suite_finish(suite, &self.state.current_class, self.state.current_status);
            self.line(&line);
        }
    }
}

impl BenchmarkProgress for IntelliJProgress {
    fn start_suite(&mut self, suite: &str) {
        self.state.current_status = FinishStatus::Success;
        self.line(&suite_start("", ROOT_ID));
        self.line(&suite_start(ROOT_ID, suite));
    }

    fn end_suite(&mut self, suite: &str, summary: &str) {
        self.close_class(suite);
        let status = self.state.suite_status;
        self.line(&log_output(ROOT_ID, suite, &format!("{summary}\n")));
        self.line(&suite_finish(ROOT_ID, suite, status));
        self.line(&suite_finish("", ROOT_ID, status));
    }

    fn start_benchmark(&mut self, suite: &str, benchmark: &str) {
        let (class_name, method_name) = split_run_id(benchmark);
        if self.state.current_class != class_name {
            self.close_class(suite);
            self.state.current_status = FinishStatus::Success;
            self.state.current_class = class_name.to_string();
            self.line(&suite_start(suite, class_name));
        }

        let class = self.state.current_class.clone();
        self.line(&benchmark_start(&class, class_name, method_name));
        self.line(&log_output(&class, benchmark, &format!("{suite}: {benchmark}\n")));
    }

    fn end_benchmark(&mut self, _suite: &str, benchmark: &str, status: FinishStatus, message: &str) {
        if status == FinishStatus::Failure {
            self.state.current_status = FinishStatus::Failure;
            self.state.suite_status = FinishStatus::Failure;
        }
        let class = self.state.current_class.clone();
        self.line(&log_output(&class, benchmark, &format!("{message}\n\n")));
        self.line(&benchmark_finish(&class, benchmark, status));
    }

    fn end_benchmark_exception(&mut self, _suite: &str, benchmark: &str, error: &str, stacktrace: &str) {
        self.state.current_status = FinishStatus::Failure;
        self.state.suite_status = FinishStatus::Failure;
        let class = self.state.current_class.clone();
        self.line(&benchmark_finish_exception(&class, benchmark, error, stacktrace));
    }

    fn output(&mut self, _suite: &str, benchmark: &str, message: &str) {
        let class = self.state.current_class.clone();
        self.line(&log_output(&class, benchmark, &format!("{message}\n")));
    }

    fn state(&self) -> Option<ProgressState> {
        Some(self.state.clone())
    }

    fn restore(&mut self, state: ProgressState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::tests::SharedBuffer;

    fn decode_cdata(line: &str) -> String {
        let start = line.find("<![CDATA[").unwrap() + "<![CDATA[".len();
        let end = line[start..].find("]]>").unwrap() + start;
        String::from_utf8(STANDARD.decode(&line[start..end]).unwrap()).unwrap()
    }

    #[test]
    fn test_split_run_id() {
        assert_eq!(split_run_id("pkg.Suite.run"), ("pkg.Suite", "run"));
        assert_eq!(
            split_run_id("pkg.Suite.run | data=5.0"),
            ("pkg.Suite", "run | data=5.0")
        );
        assert_eq!(split_run_id("run"), ("", "run"));
    }

    #[test]
    fn test_event_envelopes() {
        assert_eq!(
            suite_start("", ROOT_ID),
            "<ijLog><event type='beforeSuite'><test id='[root]' parentId=''><descriptor name='[root]'/></test></event></ijLog>"
        );
        assert_eq!(
            benchmark_finish("pkg.A", "pkg.A.run", FinishStatus::Success),
            "<ijLog><event type='afterTest'><test id='pkg.A.run' parentId='pkg.A'><result resultType='SUCCESS' startTime='0' endTime='0'/></test></event></ijLog>"
        );
        assert_eq!(
            benchmark_start("pkg.A", "pkg.A", "run"),
            "<ijLog><event type='beforeTest'><test id='pkg.A.run' parentId='pkg.A'><descriptor name='run' className='pkg.A' /></test></event></ijLog>"
        );
    }

    #[test]
    fn test_attributes_are_escaped() {
        let line = suite_start("<root>", "it's & more");
        assert!(line.contains("id='it&apos;s &amp; more'"));
        assert!(line.contains("parentId='&lt;root&gt;'"));
    }

    #[test]
    fn test_output_is_base64() {
        let line = log_output("pkg.A", "pkg.A.run", "Iteration #0: 1 ops/ms\n");
        assert!(line.contains("<event destination='StdOut'><![CDATA["));
        assert_eq!(decode_cdata(&line), "Iteration #0: 1 ops/ms\n");
    }

    #[test]
    fn test_exception_embeds_message_and_trace() {
        let line = benchmark_finish_exception("pkg.A", "pkg.A.run", "boom", "frame 1");
        assert!(line.contains("resultType='FAILURE'"));
        let error_at = line.find("<errorMsg>").unwrap();
        let trace_at = line.find("<stackTrace>").unwrap();
        assert_eq!(decode_cdata(&line[error_at..]), "boom");
        assert_eq!(decode_cdata(&line[trace_at..]), "frame 1");
    }

    #[test]
    fn test_class_groups_open_and_close_lazily() {
        let buffer = SharedBuffer::default();
        let mut progress = IntelliJProgress::new(Box::new(buffer.clone()));

        progress.start_suite("main");
        progress.start_benchmark("main", "pkg.A.first");
        progress.end_benchmark("main", "pkg.A.first", FinishStatus::Success, "ok");
        progress.start_benchmark("main", "pkg.A.second");
        progress.end_benchmark_exception("main", "pkg.A.second", "boom", "trace");
        progress.start_benchmark("main", "pkg.B.third");
        progress.end_benchmark("main", "pkg.B.third", FinishStatus::Success, "ok");
        progress.end_suite("main", "summary");

        let output = buffer.contents();
        let lines: Vec<&str> = output.lines().collect();

        let opened: Vec<&str> = lines
            .iter()
            .filter(|l| l.contains("type='beforeSuite'"))
            .copied()
            .collect();
        assert_eq!(opened.len(), 4);
        assert!(opened[2].contains("id='pkg.A' parentId='main'"));
        assert!(opened[3].contains("id='pkg.B' parentId='main'"));

        let closed: Vec<&str> = lines
            .iter()
            .filter(|l| l.contains("type='afterSuite'"))
            .copied()
            .collect();
        assert_eq!(closed.len(), 4);
        assert!(closed[0].contains("id='pkg.A'") && closed[0].contains("FAILURE"));
        assert!(closed[1].contains("id='pkg.B'") && closed[1].contains("SUCCESS"));
        assert!(closed[2].contains("id='main' parentId='[root]'") && closed[2].contains("FAILURE"));
        assert!(closed[3].contains("id='[root]' parentId=''") && closed[3].contains("FAILURE"));

        let summary = lines
            .iter()
            .position(|l| l.contains("type='onOutput'") && l.contains("id='main'"))
            .unwrap();
        assert_eq!(decode_cdata(lines[summary]), "summary\n");
        assert!(summary < lines.len() - 2);
    }

    #[test]
    fn test_state_round_trip_resumes_class() {
        let state = ProgressState {
            current_class: "pkg.A".into(),
            current_status: FinishStatus::Failure,
            suite_status: FinishStatus::Failure,
        };
        assert_eq!(ProgressState::decode(&state.encode()), state);

        let buffer = SharedBuffer::default();
        let mut progress = IntelliJProgress::new(Box::new(buffer.clone()));
        progress.restore(state);
        progress.start_benchmark("main", "pkg.A.next");
        assert!(!buffer.contents().contains("beforeSuite"));
    }

    #[test]
    fn test_decode_tolerates_missing_lines() {
        assert_eq!(ProgressState::decode(""), ProgressState::default());
        let state = ProgressState::decode("pkg.A\n");
        assert_eq!(state.current_class, "pkg.A");
        assert_eq!(state.suite_status, FinishStatus::Success);
    }
}
