use std::fs;
use std::path::{Path, PathBuf};

use mnprobe_core::digest_parts;
use mnprobe_core::errors::{ErrorInfo, ProbeError};
use serde::{Deserialize, Serialize};

use crate::anomaly::Anomaly;
use crate::config::SnapshotConfig;
use crate::evidence::{self, Evaluation};
use crate::model::Snapshot;
use crate::resume;
use crate::table::NumericTable;

/// File names are cut to this many characters before they are opened.
pub const MAX_NAME_LEN: usize = 70;

/// Status file suffix.
pub const RESUME_SUFFIX: &str = "resume.dat";
/// Active points table suffix.
pub const PHYS_LIVE_SUFFIX: &str = "phys_live.points";
/// Live points table suffix.
pub const LIVE_SUFFIX: &str = "live.points";

/// Locations of the three files read for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPaths {
    pub resume: PathBuf,
    pub phys_live: PathBuf,
    pub live: PathBuf,
}

impl ScanPaths {
    /// Builds the paths from the MultiNest root prefix.
    ///
    /// The prefix is concatenated, not joined: `chains/run-` gives
    /// `chains/run-resume.dat`. Names longer than [`MAX_NAME_LEN`] characters
    /// are silently truncated.
    pub fn from_root(root: &str) -> Self {
        Self {
            resume: truncated(root, RESUME_SUFFIX),
            phys_live: truncated(root, PHYS_LIVE_SUFFIX),
            live: truncated(root, LIVE_SUFFIX),
        }
    }

    /// Fails on the first file that does not exist.
    pub fn check_exist(&self) -> Result<(), ProbeError> {
        for path in [&self.resume, &self.phys_live, &self.live] {
            if !path.is_file() {
                return Err(ProbeError::NotFound(
                    ErrorInfo::new("missing-file", format!("Cannot find: {}", path.display()))
                        .with_path(path),
                ));
            }
        }
        Ok(())
    }
}

fn truncated(root: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{root}{suffix}").chars().take(MAX_NAME_LEN).collect::<String>())
}

struct ScanBuffers {
    resume: Vec<u8>,
    phys_live: Vec<u8>,
    live: Vec<u8>,
}

impl ScanBuffers {
    fn read(paths: &ScanPaths) -> Result<Self, ProbeError> {
        let read = |path: &Path| {
            fs::read(path).map_err(|err| ProbeError::from_io("scan-read", path, &err))
        };
        Ok(Self {
            resume: read(paths.resume.as_path())?,
            phys_live: read(paths.phys_live.as_path())?,
            live: read(paths.live.as_path())?,
        })
    }

    fn fingerprint(&self) -> String {
        digest_parts([
            (RESUME_SUFFIX, self.resume.as_slice()),
            (PHYS_LIVE_SUFFIX, self.phys_live.as_slice()),
            (LIVE_SUFFIX, self.live.as_slice()),
        ])
    }
}

/// Builds a snapshot of the scan whose output files start with `root`.
///
/// Thresholds are validated and all three files are checked for existence
/// before anything is parsed. The files are read once each; nothing is
/// written and no state is kept between calls.
pub fn snapshot(root: &str, config: &SnapshotConfig) -> Result<Snapshot, ProbeError> {
    config.validate()?;
    let paths = ScanPaths::from_root(root);
    paths.check_exist()?;
    let buffers = ScanBuffers::read(&paths)?;

    let mut anomalies = Vec::new();
    let fill = config.fill;
    let active = parse_table(&buffers.phys_live, &paths.phys_live, fill, &mut anomalies)?;
    let live = parse_table(&buffers.live, &paths.live, fill, &mut anomalies)?;
    let text = String::from_utf8_lossy(&buffers.resume);
    let decoded = resume::decode_str(&text).map_err(|err| match err {
        ProbeError::Format(info) => ProbeError::Format(info.with_path(&paths.resume)),
        other => other,
    })?;
    for (mode, record) in decoded.modes.iter().enumerate() {
        if let resume::LnEvidence::Sentinel { raw } = &record.ln_z_trapezium {
            Anomaly::EvidenceSentinel {
                mode,
                raw: raw.clone(),
            }
            .raise(&mut anomalies);
        }
    }

    let Evaluation { global, modes } =
        evidence::evaluate(decoded, &active, &live, config, root, &mut anomalies)?;
    tracing::debug!(
        n_modes = global.n_modes,
        stop = global.stop,
        anomalies = anomalies.len(),
        "snapshot assembled"
    );
    Ok(Snapshot {
        global,
        modes,
        anomalies,
        fingerprint: buffers.fingerprint(),
    })
}

/// Fingerprint of the current scan files, without parsing them.
///
/// Matches [`Snapshot::fingerprint`] when the files are unchanged.
pub fn fingerprint(root: &str) -> Result<String, ProbeError> {
    let paths = ScanPaths::from_root(root);
    paths.check_exist()?;
    Ok(ScanBuffers::read(&paths)?.fingerprint())
}

fn parse_table(
    bytes: &[u8],
    path: &Path,
    fill: f64,
    anomalies: &mut Vec<Anomaly>,
) -> Result<NumericTable, ProbeError> {
    let text = String::from_utf8_lossy(bytes);
    let table = NumericTable::parse(&text, fill).map_err(|err| match err {
        ProbeError::Table(info) => ProbeError::Table(info.with_path(path)),
        other => other,
    })?;
    if table.filled() > 0 {
        Anomaly::FilledTokens {
            file: path.display().to_string(),
            count: table.filled(),
        }
        .raise(anomalies);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_concatenate_root() {
        let paths = ScanPaths::from_root("chains/run-");
        assert_eq!(paths.resume, PathBuf::from("chains/run-resume.dat"));
        assert_eq!(paths.phys_live, PathBuf::from("chains/run-phys_live.points"));
        assert_eq!(paths.live, PathBuf::from("chains/run-live.points"));
    }

    #[test]
    fn long_names_are_truncated() {
        let root = "x".repeat(65);
        let paths = ScanPaths::from_root(&root);
        let resume = paths.resume.to_string_lossy().into_owned();
        assert_eq!(resume.chars().count(), MAX_NAME_LEN);
        assert!(resume.ends_with("resum"));
        assert_eq!(paths.live.to_string_lossy(), format!("{root}live."));
    }

    #[test]
    fn invalid_thresholds_fail_before_io() {
        let config = SnapshotConfig {
            tol: -1.0,
            ..SnapshotConfig::default()
        };
        let err = snapshot("/nonexistent/run-", &config).unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }
}
