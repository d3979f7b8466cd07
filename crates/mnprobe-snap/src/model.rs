use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::anomaly::Anomaly;
use crate::evidence::LiveStatistics;
use crate::resume::LnEvidence;

/// Scan-wide state: thresholds, decoded header and derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    pub tol: f64,
    pub ln_tol: f64,
    pub maxiter: Option<u64>,
    pub root: String,
    pub gen_live_completed: bool,
    pub n_rejected: u64,
    pub n_like_calls: u64,
    pub n_modes: usize,
    pub n_live: u64,
    pub ln_z_trapezium: f64,
    pub ln_z_trapezium_info: f64,
    pub ellipsoidal: bool,
    pub ceff: bool,
    pub n_params: usize,
    pub n_dims: usize,
    pub ln_like_max: f64,
    pub like_max: f64,
    pub like_mean: f64,
    pub chi_squared_min: f64,
    pub z_trapezium: f64,
    /// `None` when there are no live points.
    pub ln_z_trapezium_error: Option<f64>,
    pub z_trapezium_error: Option<f64>,
    pub stop_1b: bool,
    pub stop_4: bool,
    /// Conjunction of the recorded per-mode stop flags.
    pub stop: bool,
    pub z_trapezium_plus_active: f64,
}

/// Decoded and derived state of one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeState {
    pub mode: usize,
    pub branch_number: Vec<u64>,
    pub branch_line: Vec<Vec<String>>,
    /// Stop flag recorded by the sampler.
    pub stop: bool,
    pub ic_reme: String,
    pub ic_fnode: String,
    pub n_live: u64,
    pub vol: f64,
    pub ln_z_trapezium: LnEvidence,
    pub ln_z_trapezium_info: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceff_unknown: Option<String>,
    pub z_trapezium: f64,
    /// Evidence held by the mode's live points (zero without live points).
    pub z_active: f64,
    pub z_trapezium_plus_active: f64,
    /// Likelihood statistics and criteria; present only when `n_live > 0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<LiveStatistics>,
}

/// Immutable result of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub global: GlobalState,
    pub modes: BTreeMap<usize, ModeState>,
    /// Recoverable conditions raised while building the snapshot.
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
    /// SHA256 over the three input buffers that were parsed.
    pub fingerprint: String,
}

impl Snapshot {
    /// Whether the sampler considers every mode finished.
    pub fn stopped(&self) -> bool {
        self.global.stop
    }
}
