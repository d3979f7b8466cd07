use std::io;
use std::path::Path;

use mnprobe_core::errors::{ErrorInfo, ProbeError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("line", "3")
        .with_context("reason", "example")
}

#[test]
fn not_found_error_surface() {
    let err = ProbeError::NotFound(sample_info("missing-file", "cannot find resume.dat"));
    assert_eq!(err.info().code, "missing-file");
    assert!(err.info().context.contains_key("line"));
}

#[test]
fn format_error_surface() {
    let err = ProbeError::Format(sample_info("header-shape", "wrong header"));
    assert_eq!(err.info().code, "header-shape");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = ProbeError::Config(
        ErrorInfo::new("tol-range", "tol must be positive")
            .with_context("tol", "-1")
            .with_hint("pass --tol with a positive value"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("config error: tol must be positive (code: tol-range)"));
    assert!(rendered.contains("tol=-1"));
    assert!(rendered.contains("hint: pass --tol"));
}

#[test]
fn io_not_found_maps_to_not_found_family() {
    let err = io::Error::new(io::ErrorKind::NotFound, "gone");
    let mapped = ProbeError::from_io("table-read", Path::new("scan/live.points"), &err);
    assert!(matches!(mapped, ProbeError::NotFound(_)));
    assert_eq!(mapped.info().context["path"], "scan/live.points");

    let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
    let mapped = ProbeError::from_io("table-read", Path::new("x"), &err);
    assert!(matches!(mapped, ProbeError::Io(_)));
}

#[test]
fn errors_roundtrip_through_json() {
    let err = ProbeError::Table(sample_info("table-ragged", "row width changed"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Table\""));
    let back: ProbeError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, err);
}
