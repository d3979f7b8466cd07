use serde::{Deserialize, Serialize};

/// Recoverable condition found while building a snapshot.
///
/// Anomalies never abort the snapshot. They are logged when raised and kept
/// on the result so callers can decide how loudly to surface them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Table tokens that failed to parse and were replaced by the fill value.
    FilledTokens {
        /// Table file name.
        file: String,
        /// Number of replaced tokens.
        count: usize,
    },
    /// A mode's log-evidence token was unparsable and the sentinel was used.
    EvidenceSentinel {
        /// Mode index.
        mode: usize,
        /// Offending token.
        raw: String,
    },
    /// Every mode stopped although criterion 1b does not hold.
    UnusualConvergence {
        /// Rejected points at snapshot time.
        n_rejected: u64,
        /// Live points at snapshot time.
        n_live: u64,
    },
    /// Criteria recomputed for a mode disagree with the recorded stop flag.
    InconsistentStop {
        /// Mode index.
        mode: usize,
        /// Flag written by the sampler.
        recorded: bool,
        /// Flag recomputed from the criteria.
        computed: bool,
        /// Tolerance assumed for the recomputation.
        tol: f64,
    },
}

impl Anomaly {
    /// Stable machine readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Anomaly::FilledTokens { .. } => "filled-tokens",
            Anomaly::EvidenceSentinel { .. } => "evidence-sentinel",
            Anomaly::UnusualConvergence { .. } => "unusual-convergence",
            Anomaly::InconsistentStop { .. } => "inconsistent-stop",
        }
    }

    /// Human readable description.
    pub fn message(&self) -> String {
        match self {
            Anomaly::FilledTokens { file, count } => {
                format!("{count} unparsable token(s) in {file} replaced by the fill value")
            }
            Anomaly::EvidenceSentinel { mode, raw } => {
                format!("mode {mode}: log-evidence token {raw:?} unparsable, using -1E100")
            }
            Anomaly::UnusualConvergence { n_rejected, n_live } => format!(
                "unusual convergence - very few rejected points ({n_rejected} rejected, {n_live} live)"
            ),
            Anomaly::InconsistentStop {
                mode,
                recorded,
                computed,
                tol,
            } => format!(
                "mode {mode}: inconsistent stopping criteria (recorded {recorded}, computed {computed}); \
                 the assumed tol = {tol} may not match the scan"
            ),
        }
    }

    pub(crate) fn raise(self, sink: &mut Vec<Anomaly>) {
        tracing::warn!(code = self.code(), "{}", self.message());
        sink.push(self);
    }
}
