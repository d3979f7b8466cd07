use std::collections::BTreeMap;

use mnprobe_core::errors::{ErrorInfo, ProbeError};
use mnprobe_core::to_canonical_json_pretty;
use serde::Serialize;
use serde_json::Value;

use crate::model::Snapshot;

const WIDTH: usize = 80;

/// Explanation printed ahead of the text report.
pub const PREAMBLE: &str = r"Four stopping criteria are applied per mode:

    mode_stop = 1. OR 2. OR 3. OR 4.

    1a. delta_max < tol
    1b. n_rejected - n_live > 50
    1. 1a. AND 1b.
    2. n_live_mode < n_dims + 1
    3. ln like_max - ln min_like <= 1E-4
    4. n_rejected >= max_iter

where we define delta_max = like_max * volume / evidence in a mode.

Once all modes have stopped, MultiNest stops.

Most modes eventually stop via criteria 1. 1b. is usually satisfied long
before 1a.

Monitor progression of scan by tracking progress of ln_delta_max towards ln_tol
per mode.

The *z_trapezium* evidence is that found by summing \int L dX at each iteration
of the MN algorithm with the trapezoidal rule.

The *z_trapezium_plus_active* evidence is the trapezoidal evidence *plus*
evidence remaining in the active live points, estimated as expected(like) * vol.";

fn banner(title: &str) -> String {
    let padded = format!(" {title} ");
    format!("{padded:=^width$}", width = WIDTH)
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ProbeError> {
    serde_json::to_value(value)
        .map_err(|err| ProbeError::Serde(ErrorInfo::new("report-serialize", err.to_string())))
}

// Nested objects are merged into the parent so each section is one flat,
// key-sorted listing.
fn flatten(value: Value, fields: &mut BTreeMap<String, Value>) {
    if let Value::Object(map) = value {
        for (key, inner) in map {
            match inner {
                Value::Object(_) if key != "ln_z_trapezium" => flatten(inner, fields),
                other => {
                    fields.insert(key, other);
                }
            }
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "n/a".to_string(),
        Value::String(text) => format!("{text:?}"),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(key, inner)| format!("{key}: {}", render_value(inner)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        other => other.to_string(),
    }
}

fn write_section<T: Serialize>(
    out: &mut String,
    title: &str,
    value: &T,
) -> Result<(), ProbeError> {
    let mut fields = BTreeMap::new();
    flatten(to_value(value)?, &mut fields);
    out.push_str(&format!("{}\n\n", banner(title)));
    let key_width = fields.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in &fields {
        out.push_str(&format!("{key:<key_width$} : {}\n", render_value(value)));
    }
    out.push('\n');
    Ok(())
}

/// Human readable report: preamble, global section, one section per mode.
pub fn render_text(snapshot: &Snapshot) -> Result<String, ProbeError> {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", banner("Check MultiNest stopping criteria")));
    out.push_str(PREAMBLE);
    out.push_str("\n\n");
    write_section(&mut out, "Global information", &snapshot.global)?;
    for (index, mode) in &snapshot.modes {
        write_section(&mut out, &format!("Mode: {index}"), mode)?;
    }
    if !snapshot.anomalies.is_empty() {
        out.push_str(&format!("{}\n\n", banner("Anomalies")));
        for anomaly in &snapshot.anomalies {
            out.push_str(&format!("[{}] {}\n", anomaly.code(), anomaly.message()));
        }
        out.push('\n');
    }
    Ok(out)
}

/// Canonical, key-sorted JSON rendering of the snapshot.
pub fn render_json(snapshot: &Snapshot) -> Result<String, ProbeError> {
    to_canonical_json_pretty(snapshot)
}

/// One line per mode tracking `ln_delta_max` against `ln_tol`.
pub fn render_progress(snapshot: &Snapshot) -> String {
    let global = &snapshot.global;
    let mut out = format!(
        "n_rejected={} n_like_calls={} n_live={} stop={} z_plus_active={:e}",
        global.n_rejected,
        global.n_like_calls,
        global.n_live,
        global.stop,
        global.z_trapezium_plus_active
    );
    for (index, mode) in &snapshot.modes {
        let delta = match &mode.live {
            Some(stats) => format!("{:.4}", stats.ln_delta_max),
            None => "n/a".to_string(),
        };
        out.push_str(&format!(
            "\n  mode {index}: ln_delta_max={delta} ln_tol={:.4} n_live={} stop={}",
            global.ln_tol, mode.n_live, mode.stop
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_is_centred() {
        let line = banner("Mode: 0");
        assert_eq!(line.len(), WIDTH);
        assert!(line.contains(" Mode: 0 "));
        assert!(line.starts_with("====") && line.ends_with("===="));
    }

    #[test]
    fn flatten_merges_nested_objects() {
        let value = serde_json::json!({
            "n_live": 3,
            "live": {"delta_max": 0.5, "criteria": {"stop_1a": true}},
            "ln_z_trapezium": {"kind": "parsed", "value": -1.0},
        });
        let mut fields = BTreeMap::new();
        flatten(value, &mut fields);
        assert_eq!(fields["stop_1a"], Value::Bool(true));
        assert_eq!(fields["delta_max"], serde_json::json!(0.5));
        assert!(fields["ln_z_trapezium"].is_object());
        assert!(!fields.contains_key("live"));
    }

    #[test]
    fn values_render_compactly() {
        assert_eq!(render_value(&Value::Null), "n/a");
        assert_eq!(render_value(&serde_json::json!(["1", "2"])), "[\"1\", \"2\"]");
        assert_eq!(
            render_value(&serde_json::json!({"kind": "sentinel", "raw": "x"})),
            "{kind: \"sentinel\", raw: \"x\"}"
        );
    }

    #[test]
    fn section_lists_aligned_fields_under_banner() {
        let mut out = String::new();
        let value = serde_json::json!({"n_live": 3, "tol": 0.1, "live": {"stop": false}});
        write_section(&mut out, "Mode: 0", &value).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], banner("Mode: 0"));
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "n_live : 3");
        assert_eq!(lines[3], "stop   : false");
        assert_eq!(lines[4], "tol    : 0.1");
        assert!(out.ends_with("\n\n"));
    }
}
