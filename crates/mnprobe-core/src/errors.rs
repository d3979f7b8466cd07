//! Structured error types shared across mnprobe crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`ProbeError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, line numbers, mode indices).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Adds a `path` context entry rendered with [`Path::display`].
    pub fn with_path(self, path: &Path) -> Self {
        self.with_context("path", path.display().to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for snapshot construction.
///
/// Only fatal conditions are represented here. Recoverable anomalies found
/// while reading a scan are reported alongside the snapshot instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum ProbeError {
    /// A required scan file does not exist.
    #[error("file not found: {0}")]
    NotFound(ErrorInfo),
    /// Invalid thresholds or configuration values.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// The status file does not follow the expected layout.
    #[error("format error: {0}")]
    Format(ErrorInfo),
    /// A numeric table could not be shaped or queried.
    #[error("table error: {0}")]
    Table(ErrorInfo),
    /// Filesystem errors other than a missing file.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl ProbeError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            ProbeError::NotFound(info)
            | ProbeError::Config(info)
            | ProbeError::Format(info)
            | ProbeError::Table(info)
            | ProbeError::Io(info)
            | ProbeError::Serde(info) => info,
        }
    }

    /// Maps an I/O error on `path` onto the matching family.
    pub fn from_io(code: &str, path: &Path, err: &std::io::Error) -> Self {
        let info = ErrorInfo::new(code, err.to_string()).with_path(path);
        if err.kind() == std::io::ErrorKind::NotFound {
            ProbeError::NotFound(info)
        } else {
            ProbeError::Io(info)
        }
    }
}
