//! Failure Capture
//!
//! Benchmark code reports failure by panicking. Every engine phase runs
//! inside [`capture`], which turns a panic into a [`BenchmarkFailure`]
//! carrying the panic message and a stack trace.
//!
//! The stack trace has to be taken while the panicking frames still exist,
//! so a process-wide hook records it into a thread-local slot. The hook is
//! installed once and forwards to the previously installed hook whenever the
//! panicking thread is not inside [`capture`].

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use thiserror::Error;

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Lifecycle phase of one benchmark run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Instance construction, parametrization and the setup hook
    Setup,
    /// Counting how many invocations fill one iteration budget
    CycleEstimation,
    /// Warm-up iteration `k`
    Warmup(u32),
    /// Measurement iteration `i`
    Measurement(u32),
    /// Teardown hook and sink flush
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("setup"),
            Phase::CycleEstimation => f.write_str("cycle estimation"),
            Phase::Warmup(k) => write!(f, "warm-up #{k}"),
            Phase::Measurement(i) => write!(f, "iteration #{i}"),
            Phase::Teardown => f.write_str("teardown"),
        }
    }
}

/// A benchmark run aborted by a panic or a runtime error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BenchmarkFailure {
    /// Phase the failure happened in
    pub phase: Phase,
    /// Error description
    pub message: String,
    /// Stack trace, empty when none could be captured
    pub stacktrace: String,
}

impl BenchmarkFailure {
    /// Failure without a stack trace
    pub fn new(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
            stacktrace: String::new(),
        }
    }
}

/// Run `f`, converting a panic into a [`BenchmarkFailure`] for `phase`
pub fn capture<R>(phase: Phase, f: impl FnOnce() -> R) -> Result<R, BenchmarkFailure> {
    install_hook();

    let was_capturing = CAPTURING.with(|c| c.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|c| c.set(was_capturing));

    outcome.map_err(|payload| {
        let stacktrace = LAST_TRACE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_default();
        BenchmarkFailure {
            phase,
            message: panic_message(payload.as_ref()),
            stacktrace,
        }
    })
}

/// Extract the message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let trace = format!("{info}\n{}", Backtrace::force_capture());
                LAST_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            } else {
                previous(info);
            }
        }));
    });
}
