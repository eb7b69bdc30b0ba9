use std::sync::Arc;

use mailpdf_core::{
    install_panic_hook, BoundaryAction, Bundle, EnvironmentInfo, ErrorBoundary, ErrorCode, Locale,
    ReportError, Severity,
};

fn boundary() -> ErrorBoundary {
    install_panic_hook();
    ErrorBoundary::new(Arc::new(Bundle::for_locale(Locale::En)))
}

#[test]
fn guard_passes_values_through() {
    let mut boundary = boundary();
    assert_eq!(boundary.guard("render", || 41 + 1), Some(42));
    assert!(!boundary.has_failed());
}

#[test]
fn panic_is_captured_with_location() {
    let mut boundary = boundary();
    let result: Option<()> = boundary.guard("render", || panic!("view exploded"));
    assert!(result.is_none());

    let failure = boundary.failure().expect("captured failure");
    assert!(failure.id.starts_with("err-"));
    assert_eq!(failure.error.code(), ErrorCode::UnhandledFailure);
    assert_eq!(failure.error.severity(), Severity::Critical);
    assert_eq!(failure.error.message(), "view exploded");
    assert_eq!(
        failure
            .error
            .context()
            .and_then(|ctx| ctx.get("origin"))
            .map(String::as_str),
        Some("render")
    );
    assert!(failure
        .location
        .as_deref()
        .is_some_and(|loc| loc.contains("boundary.rs")));
}

#[test]
fn retry_can_be_repeated_without_limit() {
    let mut boundary = boundary();
    for attempt in 1..=3 {
        let _: Option<()> = boundary.guard("dispatch", || panic!("attempt {attempt}"));
        assert!(boundary.has_failed());
        assert_eq!(boundary.retry(), BoundaryAction::Retry);
        assert!(!boundary.has_failed());
        assert_eq!(boundary.retries(), attempt);
    }
}

#[test]
fn reload_clears_failure() {
    let mut boundary = boundary();
    let _: Option<()> = boundary.guard("dispatch", || panic!("broken"));
    assert_eq!(boundary.reload(), BoundaryAction::Reload);
    assert!(boundary.failure().is_none());
}

#[test]
fn report_contains_failure_and_environment() {
    let mut boundary = boundary();
    let env = EnvironmentInfo::current("0.1.0", "en");
    assert!(matches!(
        boundary.create_report(&env),
        Err(ReportError::NothingCaptured)
    ));

    let _: Option<()> = boundary.guard("dispatch", || panic!("bad state"));
    let id = boundary.failure().map(|f| f.id.clone()).expect("failure");
    let report = boundary.create_report(&env).expect("report");
    let parsed: serde_json::Value = serde_json::from_str(&report).expect("json");

    assert_eq!(parsed["id"], serde_json::Value::String(id));
    assert_eq!(parsed["code"], "unhandled-failure");
    assert_eq!(parsed["message"], "bad state");
    assert_eq!(parsed["environment"]["app_version"], "0.1.0");
    assert_eq!(parsed["environment"]["locale"], "en");
    assert!(parsed["trace"].is_string());
}
