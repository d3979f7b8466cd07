use std::fs;
use std::path::Path;

use mnprobe_core::errors::{ErrorInfo, ProbeError};
use serde::{Deserialize, Serialize};

/// Fill value substituted for unparsable tokens unless the caller overrides it.
pub const DEFAULT_FILL: f64 = 0.0;

/// Whitespace-delimited numeric table stored one row per file column.
///
/// `rows[v][k]` is variable `v` (file column) of observation `k` (file line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericTable {
    rows: Vec<Vec<f64>>,
    filled: usize,
}

impl NumericTable {
    /// Parses table text, replacing tokens that are not valid floats with `fill`.
    ///
    /// Blank lines and lines starting with `#` are skipped. The width of the
    /// first data line fixes the number of variables; any later line with a
    /// different width is rejected.
    pub fn parse(text: &str, fill: f64) -> Result<Self, ProbeError> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut filled = 0usize;
        let mut width = None;
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            let expected = *width.get_or_insert_with(|| {
                rows = vec![Vec::new(); tokens.len()];
                tokens.len()
            });
            if tokens.len() != expected {
                return Err(ProbeError::Table(
                    ErrorInfo::new(
                        "table-ragged",
                        format!("expected {expected} columns, found {}", tokens.len()),
                    )
                    .with_context("line", (idx + 1).to_string()),
                ));
            }
            for (row, token) in rows.iter_mut().zip(tokens) {
                let value = match token.parse::<f64>() {
                    Ok(value) => value,
                    Err(_) => {
                        filled += 1;
                        fill
                    }
                };
                row.push(value);
            }
        }
        Ok(Self { rows, filled })
    }

    /// Number of variables (file columns).
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of observations (file lines).
    pub fn n_observations(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Number of tokens replaced by the fill value.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Returns variable `index`, if present.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Values of `row` at every observation where `key` equals `wanted`.
    pub fn select(&self, row: usize, key: usize, wanted: f64) -> Vec<f64> {
        match (self.row(row), self.row(key)) {
            (Some(values), Some(keys)) => values
                .iter()
                .zip(keys)
                .filter(|(_, key)| **key == wanted)
                .map(|(value, _)| *value)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Reads and parses the table stored at `path`.
pub fn load_table(path: &Path, fill: f64) -> Result<NumericTable, ProbeError> {
    let text =
        fs::read_to_string(path).map_err(|err| ProbeError::from_io("table-read", path, &err))?;
    NumericTable::parse(&text, fill).map_err(|err| match err {
        ProbeError::Table(info) => ProbeError::Table(info.with_path(path)),
        other => other,
    })
}
