//! Top-level guard that turns a panic anywhere below it into a classified
//! failure with a recovery menu, instead of taking the process down.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

use chrono::Utc;
use engine_logging::{engine_error, engine_info};
use rand::Rng;
use serde::Serialize;
use serde_json::json;

use crate::bundle::Bundle;
use crate::errors::{classify_unhandled_failure, LocalizedError};

struct PanicRecord {
    location: Option<String>,
    trace: String,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicRecord>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Records location and backtrace of every panic for the boundary to show.
/// Chains to the previously installed hook. Safe to call more than once.
pub fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let record = PanicRecord {
                location: info.location().map(|l| l.to_string()),
                trace: Backtrace::force_capture().to_string(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(record));
            previous(info);
        }));
    });
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedFailure {
    pub id: String,
    pub error: LocalizedError,
    pub location: Option<String>,
    pub trace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryAction {
    /// Render the children again from their current state.
    Retry,
    /// Throw all state away and start over.
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentInfo {
    pub app_version: String,
    pub os: String,
    pub arch: String,
    pub locale: String,
}

impl EnvironmentInfo {
    pub fn current(app_version: &str, locale: &str) -> Self {
        Self {
            app_version: app_version.to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            locale: locale.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("no failure has been captured")]
    NothingCaptured,
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct ErrorBoundary {
    bundle: Arc<Bundle>,
    failure: Option<CapturedFailure>,
    retries: u64,
}

impl ErrorBoundary {
    pub fn new(bundle: Arc<Bundle>) -> Self {
        Self {
            bundle,
            failure: None,
            retries: 0,
        }
    }

    /// Runs `f`; a panic inside is captured and `None` returned.
    pub fn guard<R>(&mut self, origin: &str, f: impl FnOnce() -> R) -> Option<R> {
        LAST_PANIC.with(|slot| slot.borrow_mut().take());
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Some(value),
            Err(payload) => {
                self.capture(origin, payload.as_ref());
                None
            }
        }
    }

    pub fn failure(&self) -> Option<&CapturedFailure> {
        self.failure.as_ref()
    }

    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn retries(&self) -> u64 {
        self.retries
    }

    /// Clears the captured failure. Not rate limited.
    pub fn retry(&mut self) -> BoundaryAction {
        if self.failure.take().is_some() {
            self.retries += 1;
            engine_info!("Boundary retry #{}", self.retries);
        }
        BoundaryAction::Retry
    }

    pub fn reload(&mut self) -> BoundaryAction {
        self.failure = None;
        engine_info!("Boundary reload requested");
        BoundaryAction::Reload
    }

    /// Pretty JSON with the failure and environment, for the user to submit.
    pub fn create_report(&self, env: &EnvironmentInfo) -> Result<String, ReportError> {
        let failure = self.failure.as_ref().ok_or(ReportError::NothingCaptured)?;
        let report = json!({
            "id": failure.id,
            "code": failure.error.code().as_str(),
            "message": failure.error.message(),
            "userMessage": failure.error.user_message(),
            "severity": failure.error.severity(),
            "context": failure.error.context(),
            "location": failure.location,
            "trace": failure.trace,
            "timestamp": failure.error.timestamp().to_rfc3339(),
            "environment": env,
        });
        Ok(serde_json::to_string_pretty(&report)?)
    }

    fn capture(&mut self, origin: &str, payload: &(dyn Any + Send)) {
        let cause = panic_message(payload);
        let record = LAST_PANIC.with(|slot| slot.borrow_mut().take());
        let (location, trace) = match record {
            Some(record) => (record.location, record.trace),
            None => (None, "<backtrace unavailable>".to_string()),
        };
        let failure = CapturedFailure {
            id: failure_id(),
            error: classify_unhandled_failure(&self.bundle, &cause, Some(origin)),
            location,
            trace,
        };
        engine_error!(
            "Unhandled failure {} in {}: {} at {:?}",
            failure.id,
            origin,
            cause,
            failure.location
        );
        self.failure = Some(failure);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// `err-<unix millis>-<6 base36 chars>`.
fn failure_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..6)
        .map(|_| std::char::from_digit(rng.random_range(0..36u32), 36).unwrap_or('0'))
        .collect();
    format!("err-{}-{}", Utc::now().timestamp_millis(), suffix)
}
