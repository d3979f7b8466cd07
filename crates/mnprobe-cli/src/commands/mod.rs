pub mod check;
pub mod version;
pub mod watch;

use std::path::PathBuf;

use clap::Args;
use mnprobe_core::ProbeError;
use mnprobe_snap::SnapshotConfig;

/// Scan selection and thresholds shared by `check` and `watch`.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// MultiNest output prefix, e.g. `chains/run-`.
    pub root: String,
    /// YAML file with `tol`, `maxiter` and `fill`; flags override it.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Evidence tolerance the scan was started with.
    #[arg(long)]
    pub tol: Option<f64>,
    /// Iteration cap the scan was started with.
    #[arg(long)]
    pub maxiter: Option<u64>,
    /// Value substituted for unparsable table tokens.
    #[arg(long)]
    pub fill: Option<f64>,
}

impl ScanArgs {
    pub fn snapshot_config(&self) -> Result<SnapshotConfig, ProbeError> {
        let mut config = match &self.config {
            Some(path) => SnapshotConfig::load(path)?,
            None => SnapshotConfig::default(),
        };
        if let Some(tol) = self.tol {
            config.tol = tol;
        }
        if self.maxiter.is_some() {
            config.maxiter = self.maxiter;
        }
        if let Some(fill) = self.fill {
            config.fill = fill;
        }
        config.validate()?;
        Ok(config)
    }
}
