use std::fs;
use std::path::Path;

use mnprobe_core::errors::{ErrorInfo, ProbeError};
use serde::{Deserialize, Serialize};

use crate::table::DEFAULT_FILL;

/// Thresholds the scan was launched with, plus loader tuning.
///
/// `tol` and `maxiter` must match the values handed to the sampler for the
/// computed stopping criteria to agree with the flags it records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Evidence tolerance factor.
    #[serde(default = "default_tol")]
    pub tol: f64,
    /// Iteration cap. `None` means the scan has no cap.
    #[serde(default)]
    pub maxiter: Option<u64>,
    /// Value substituted for unparsable table tokens.
    #[serde(default = "default_fill")]
    pub fill: f64,
}

fn default_tol() -> f64 {
    0.1
}

fn default_fill() -> f64 {
    DEFAULT_FILL
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            tol: default_tol(),
            maxiter: None,
            fill: default_fill(),
        }
    }
}

impl SnapshotConfig {
    /// Loads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, ProbeError> {
        let bytes =
            fs::read(path).map_err(|err| ProbeError::from_io("config-read", path, &err))?;
        serde_yaml::from_slice(&bytes).map_err(|err| {
            ProbeError::Serde(ErrorInfo::new("config-parse", err.to_string()).with_path(path))
        })
    }

    /// Rejects non-positive thresholds.
    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.tol.is_nan() || self.tol <= 0.0 {
            return Err(ProbeError::Config(
                ErrorInfo::new("tol-range", format!("tol <= 0: {}", self.tol))
                    .with_hint("use the tol passed to MultiNest (default 0.5)"),
            ));
        }
        if self.maxiter == Some(0) {
            return Err(ProbeError::Config(
                ErrorInfo::new("maxiter-range", "maxiter <= 0: 0")
                    .with_hint("omit maxiter when the scan has no iteration cap"),
            ));
        }
        Ok(())
    }

    /// Natural log of `tol`.
    pub fn ln_tol(&self) -> f64 {
        self.tol.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SnapshotConfig::default();
        assert_eq!(config.tol, 0.1);
        assert_eq!(config.maxiter, None);
        assert_eq!(config.fill, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_fills_missing_fields() {
        let config: SnapshotConfig = serde_yaml::from_str("maxiter: 5000\n").unwrap();
        assert_eq!(config.tol, 0.1);
        assert_eq!(config.maxiter, Some(5000));

        let config: SnapshotConfig = serde_yaml::from_str("tol: .inf\nfill: -1.0\n").unwrap();
        assert!(config.tol.is_infinite());
        assert_eq!(config.fill, -1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_thresholds() {
        let mut config = SnapshotConfig {
            tol: 0.0,
            ..SnapshotConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().info().code, "tol-range");
        config.tol = f64::NAN;
        assert!(matches!(config.validate(), Err(ProbeError::Config(_))));
        config.tol = 0.5;
        config.maxiter = Some(0);
        assert_eq!(config.validate().unwrap_err().info().code, "maxiter-range");
    }
}
