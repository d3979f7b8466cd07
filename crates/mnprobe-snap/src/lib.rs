//! Point-in-time stopping-criteria snapshot of a MultiNest scan.
//!
//! [`snapshot`] reads `<root>resume.dat`, `<root>phys_live.points` and
//! `<root>live.points`, decodes them and evaluates MultiNest's four stopping
//! criteria per mode. The scan's files are only read, so snapshots can be
//! taken while the sampler is still writing them.

/// Recoverable conditions reported alongside a snapshot.
pub mod anomaly;
/// YAML configuration for thresholds and loader tuning.
pub mod config;
pub mod evidence;
/// Snapshot data model.
pub mod model;
/// Text and JSON rendering.
pub mod report;
pub mod resume;
/// Snapshot assembly and input fingerprinting.
pub mod snapshot;
/// Tolerant whitespace-delimited numeric tables.
pub mod table;

pub use anomaly::Anomaly;
pub use config::SnapshotConfig;
pub use evidence::{
    error_ln_evidence, GlobalStops, LikelihoodSummary, LiveStatistics, StopCriteria,
};
pub use model::{GlobalState, ModeState, Snapshot};
pub use report::{render_json, render_progress, render_text};
pub use resume::{decode, decode_str, infer_constant_efficiency, LnEvidence, ResumeFile};
pub use snapshot::{fingerprint, snapshot, ScanPaths};
pub use table::{load_table, NumericTable};
