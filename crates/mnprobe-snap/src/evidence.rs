//! Evidence, likelihood and stopping-criteria calculations.
//!
//! MultiNest stops a mode when any of four criteria holds:
//!
//! 1. `delta_max < tol` (1a) and `n_rejected - n_live > 50` (1b)
//! 2. `n_live_mode < n_dims + 1`
//! 3. `ln_like_max - ln_like_min <= 1E-4`
//! 4. `n_rejected >= maxiter`
//!
//! where `delta_max = like_max * vol / Z` for the mode. The scan stops once
//! every mode has stopped.

use std::collections::BTreeMap;

use mnprobe_core::errors::{ErrorInfo, ProbeError};
use serde::{Deserialize, Serialize};

use crate::anomaly::Anomaly;
use crate::config::SnapshotConfig;
use crate::model::{GlobalState, ModeState};
use crate::resume::{ModeRecord, ResumeFile};
use crate::table::NumericTable;

/// Minimum surplus of rejected over live points for criterion 1b.
pub const MIN_REJECTED_SURPLUS: u64 = 50;

/// Likelihood spread below which a mode counts as flat (criterion 3).
pub const FLAT_LIKELIHOOD_SPREAD: f64 = 1e-4;

/// Error on a log-evidence, `sqrt(|info| / n_live)`.
///
/// Undefined without live points.
pub fn error_ln_evidence(info: f64, n_live: u64) -> Option<f64> {
    (n_live > 0).then(|| (info.abs() / n_live as f64).sqrt())
}

/// Criteria that depend only on scan-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStops {
    pub stop_1b: bool,
    pub stop_4: bool,
}

impl GlobalStops {
    pub fn evaluate(n_rejected: u64, n_live: u64, maxiter: Option<u64>) -> Self {
        Self {
            stop_1b: n_rejected > n_live.saturating_add(MIN_REJECTED_SURPLUS),
            stop_4: maxiter.is_some_and(|cap| n_rejected >= cap),
        }
    }
}

/// Per-mode stopping criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopCriteria {
    pub stop_1a: bool,
    pub stop_1b: bool,
    pub stop_1: bool,
    pub stop_2: bool,
    pub stop_3: bool,
    pub stop_4: bool,
    /// `stop_1 || stop_2 || stop_3 || stop_4`.
    pub computed: bool,
}

impl StopCriteria {
    pub fn evaluate(
        delta_max: f64,
        tol: f64,
        ln_like_spread: f64,
        n_live: u64,
        n_dims: usize,
        global: GlobalStops,
    ) -> Self {
        let stop_1a = delta_max < tol;
        let stop_1 = stop_1a && global.stop_1b;
        let stop_2 = n_live < n_dims as u64 + 1;
        let stop_3 = ln_like_spread <= FLAT_LIKELIHOOD_SPREAD;
        Self {
            stop_1a,
            stop_1b: global.stop_1b,
            stop_1,
            stop_2,
            stop_3,
            stop_4: global.stop_4,
            computed: stop_1 || stop_2 || stop_3 || global.stop_4,
        }
    }
}

/// Summary of a set of log-likelihood values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodSummary {
    pub ln_like_max: f64,
    pub ln_like_min: f64,
    pub ln_like_mean: f64,
    pub like_max: f64,
    pub like_min: f64,
    /// Mean of the likelihoods, not the exponential of the mean log-likelihood.
    pub like_mean: f64,
}

impl LikelihoodSummary {
    /// Returns `None` for an empty slice.
    pub fn from_ln_like(ln_like: &[f64]) -> Option<Self> {
        if ln_like.is_empty() {
            return None;
        }
        let count = ln_like.len() as f64;
        let ln_like_max = ln_like.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let ln_like_min = ln_like.iter().copied().fold(f64::INFINITY, f64::min);
        let ln_like_mean = ln_like.iter().sum::<f64>() / count;
        let like_mean = ln_like.iter().map(|value| value.exp()).sum::<f64>() / count;
        Some(Self {
            ln_like_max,
            ln_like_min,
            ln_like_mean,
            like_max: ln_like_max.exp(),
            like_min: ln_like_min.exp(),
            like_mean,
        })
    }
}

/// Derived statistics for a mode that still has live points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStatistics {
    #[serde(flatten)]
    pub likelihood: LikelihoodSummary,
    pub chi_squared_min: f64,
    pub chi_squared_max: f64,
    pub chi_squared_mean: f64,
    pub ln_delta_max: f64,
    pub delta_max: f64,
    pub ln_delta_mean: f64,
    pub delta_mean: f64,
    pub ln_z_trapezium_error: f64,
    pub z_trapezium_error: f64,
    pub criteria: StopCriteria,
}

/// Output of [`evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub global: GlobalState,
    pub modes: BTreeMap<usize, ModeState>,
}

/// Derives statistics and criteria from a decoded status file and both tables.
///
/// `active` is the `phys_live.points` table (last two rows log-likelihood and
/// mode id), `live` the `live.points` table (last row log-likelihood).
/// Anomalies are appended to `anomalies`.
pub fn evaluate(
    resume: ResumeFile,
    active: &NumericTable,
    live: &NumericTable,
    config: &SnapshotConfig,
    root: &str,
    anomalies: &mut Vec<Anomaly>,
) -> Result<Evaluation, ProbeError> {
    let n_params = active
        .n_rows()
        .checked_sub(2)
        .ok_or_else(|| narrow_table("phys_live.points", active.n_rows(), 2))?;
    let n_dims = live
        .n_rows()
        .checked_sub(1)
        .ok_or_else(|| narrow_table("live.points", live.n_rows(), 1))?;
    let ln_like_row = n_params;
    let mode_row = n_params + 1;

    let overall = active
        .row(ln_like_row)
        .and_then(LikelihoodSummary::from_ln_like)
        .ok_or_else(|| {
            ProbeError::Table(
                ErrorInfo::new("table-empty", "no live points to summarise")
                    .with_context("table", "phys_live.points"),
            )
        })?;

    let header = resume.header;
    let stops = GlobalStops::evaluate(header.n_rejected, header.n_live, config.maxiter);
    let z_trapezium = header.ln_z_trapezium.exp();
    let ln_z_trapezium_error = error_ln_evidence(header.ln_z_trapezium_info, header.n_live);
    let stop = resume.modes.iter().all(|mode| mode.stop);
    if stop && !stops.stop_1b {
        Anomaly::UnusualConvergence {
            n_rejected: header.n_rejected,
            n_live: header.n_live,
        }
        .raise(anomalies);
    }

    let mut modes = BTreeMap::new();
    for (index, record) in resume.modes.into_iter().enumerate() {
        let ln_like = active.select(ln_like_row, mode_row, (index + 1) as f64);
        let state = evaluate_mode(
            index,
            record,
            &ln_like,
            n_dims,
            stops,
            config.tol,
            anomalies,
        )?;
        modes.insert(index, state);
    }
    let z_trapezium_plus_active = modes
        .values()
        .map(|mode| mode.z_trapezium_plus_active)
        .sum::<f64>();

    let global = GlobalState {
        tol: config.tol,
        ln_tol: config.ln_tol(),
        maxiter: config.maxiter,
        root: root.to_string(),
        gen_live_completed: header.gen_live_completed,
        n_rejected: header.n_rejected,
        n_like_calls: header.n_like_calls,
        n_modes: header.n_modes,
        n_live: header.n_live,
        ln_z_trapezium: header.ln_z_trapezium,
        ln_z_trapezium_info: header.ln_z_trapezium_info,
        ellipsoidal: header.ellipsoidal,
        ceff: resume.ceff,
        n_params,
        n_dims,
        ln_like_max: overall.ln_like_max,
        like_max: overall.like_max,
        like_mean: overall.like_mean,
        chi_squared_min: -2.0 * overall.ln_like_max,
        z_trapezium,
        ln_z_trapezium_error,
        z_trapezium_error: ln_z_trapezium_error.map(|error| error * z_trapezium),
        stop_1b: stops.stop_1b,
        stop_4: stops.stop_4,
        stop,
        z_trapezium_plus_active,
    };
    Ok(Evaluation { global, modes })
}

fn evaluate_mode(
    index: usize,
    record: ModeRecord,
    ln_like: &[f64],
    n_dims: usize,
    stops: GlobalStops,
    tol: f64,
    anomalies: &mut Vec<Anomaly>,
) -> Result<ModeState, ProbeError> {
    let ln_z = record.ln_z_trapezium.value();
    let z_trapezium = ln_z.exp();

    let live = if record.n_live > 0 {
        let likelihood = LikelihoodSummary::from_ln_like(ln_like).ok_or_else(|| {
            ProbeError::Table(
                ErrorInfo::new(
                    "mode-points-missing",
                    format!(
                        "mode {index} reports {} live points but none carry its id",
                        record.n_live
                    ),
                )
                .with_context("table", "phys_live.points")
                .with_context("mode", index.to_string())
                .with_hint("the scan may be rewriting phys_live.points; poll again"),
            )
        })?;
        Some(live_statistics(
            index,
            &record,
            likelihood,
            ln_z,
            n_dims,
            stops,
            tol,
            anomalies,
        ))
    } else {
        None
    };

    let z_active = live
        .as_ref()
        .map_or(0.0, |stats| stats.likelihood.like_mean * record.vol);

    Ok(ModeState {
        mode: index,
        branch_number: record.branch_number,
        branch_line: record.branch_line,
        stop: record.stop,
        ic_reme: record.ic_reme,
        ic_fnode: record.ic_fnode,
        n_live: record.n_live,
        vol: record.vol,
        ln_z_trapezium: record.ln_z_trapezium,
        ln_z_trapezium_info: record.ln_z_trapezium_info,
        ceff_unknown: record.ceff_unknown,
        z_trapezium,
        z_active,
        z_trapezium_plus_active: z_trapezium + z_active,
        live,
    })
}

#[allow(clippy::too_many_arguments)]
fn live_statistics(
    index: usize,
    record: &ModeRecord,
    likelihood: LikelihoodSummary,
    ln_z: f64,
    n_dims: usize,
    stops: GlobalStops,
    tol: f64,
    anomalies: &mut Vec<Anomaly>,
) -> LiveStatistics {
    let ln_vol = record.vol.ln();
    let ln_delta_max = ln_vol + likelihood.ln_like_max - ln_z;
    let delta_max = ln_delta_max.exp();
    let ln_delta_mean = ln_vol + likelihood.like_mean.ln() - ln_z;
    // n_live > 0 on this path.
    let ln_z_trapezium_error =
        (record.ln_z_trapezium_info.abs() / record.n_live as f64).sqrt();

    let criteria = StopCriteria::evaluate(
        delta_max,
        tol,
        likelihood.ln_like_max - likelihood.ln_like_min,
        record.n_live,
        n_dims,
        stops,
    );
    if criteria.computed != record.stop {
        Anomaly::InconsistentStop {
            mode: index,
            recorded: record.stop,
            computed: criteria.computed,
            tol,
        }
        .raise(anomalies);
    }

    LiveStatistics {
        chi_squared_min: -2.0 * likelihood.ln_like_max,
        chi_squared_max: -2.0 * likelihood.ln_like_min,
        chi_squared_mean: -2.0 * likelihood.ln_like_mean,
        likelihood,
        ln_delta_max,
        delta_max,
        ln_delta_mean,
        delta_mean: ln_delta_mean.exp(),
        ln_z_trapezium_error,
        z_trapezium_error: ln_z_trapezium_error * ln_z.exp(),
        criteria,
    }
}

fn narrow_table(table: &str, found: usize, needed: usize) -> ProbeError {
    ProbeError::Table(
        ErrorInfo::new(
            "table-narrow",
            format!("expected at least {needed} columns, found {found}"),
        )
        .with_context("table", table),
    )
}
