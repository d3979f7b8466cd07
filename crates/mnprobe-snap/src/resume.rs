//! Decoder for the MultiNest `resume.dat` status file.
//!
//! The file has no fixed schema. After a four line header the remaining lines
//! are consumed as a queue whose layout depends on values decoded earlier:
//! the number of modes, each mode's branch count, and whether the scan runs
//! in constant-efficiency mode. Every line must be consumed exactly once.

use std::collections::VecDeque;

use mnprobe_core::errors::{ErrorInfo, ProbeError};
use serde::{Deserialize, Serialize};

/// Token counts of the four header lines.
pub const HEADER_SHAPE: [usize; 4] = [1, 4, 2, 1];

/// Log-evidence substituted when a mode's value cannot be parsed.
pub const LN_EVIDENCE_SENTINEL: f64 = -1e100;

/// Per-mode log-evidence as decoded from the mode summary line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LnEvidence {
    /// Token parsed as a float.
    Parsed {
        /// Parsed log-evidence.
        value: f64,
    },
    /// Token was unparsable; [`LN_EVIDENCE_SENTINEL`] stands in for it.
    Sentinel {
        /// Raw token as found in the file.
        raw: String,
    },
}

impl LnEvidence {
    fn from_token(token: &str) -> Self {
        match token.parse::<f64>() {
            Ok(value) => LnEvidence::Parsed { value },
            Err(_) => LnEvidence::Sentinel {
                raw: token.to_string(),
            },
        }
    }

    /// Numeric value used in downstream calculations.
    pub fn value(&self) -> f64 {
        match self {
            LnEvidence::Parsed { value } => *value,
            LnEvidence::Sentinel { .. } => LN_EVIDENCE_SENTINEL,
        }
    }

    /// Whether the sentinel was substituted.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, LnEvidence::Sentinel { .. })
    }
}

/// Scan-wide values from the four header lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeHeader {
    /// True once the initial live points have been generated.
    pub gen_live_completed: bool,
    /// Number of rejected (dead) points so far.
    pub n_rejected: u64,
    /// Number of likelihood evaluations so far.
    pub n_like_calls: u64,
    /// Number of modes found.
    pub n_modes: usize,
    /// Total number of live points.
    pub n_live: u64,
    /// Global trapezoidal log-evidence.
    pub ln_z_trapezium: f64,
    /// Global information term used for the log-evidence error.
    pub ln_z_trapezium_info: f64,
    /// Whether ellipsoidal sampling is active.
    pub ellipsoidal: bool,
}

/// Raw per-mode record. Fields with unknown meaning are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeRecord {
    /// Branch counts (one entry in the current format).
    pub branch_number: Vec<u64>,
    /// Branch description lines, kept as raw tokens.
    pub branch_line: Vec<Vec<String>>,
    /// Stop flag written by the sampler.
    pub stop: bool,
    /// Opaque `ic_reme` code.
    pub ic_reme: String,
    /// Opaque `ic_fNode` code.
    pub ic_fnode: String,
    /// Live points in the mode.
    pub n_live: u64,
    /// Prior volume remaining in the mode.
    pub vol: f64,
    /// Trapezoidal log-evidence of the mode.
    pub ln_z_trapezium: LnEvidence,
    /// Information term for the mode's log-evidence error.
    pub ln_z_trapezium_info: f64,
    /// Opaque trailing token present only in constant-efficiency mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceff_unknown: Option<String>,
}

/// Fully decoded status file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeFile {
    /// Header values.
    pub header: ResumeHeader,
    /// Constant-efficiency flag inferred while decoding.
    pub ceff: bool,
    /// Mode records in index order.
    pub modes: Vec<ModeRecord>,
}

/// One whitespace-split line together with its 1-based line number.
#[derive(Debug, Clone, PartialEq)]
struct TokenLine {
    number: usize,
    tokens: Vec<String>,
}

#[derive(Debug)]
struct TokenQueue {
    lines: VecDeque<TokenLine>,
}

impl TokenQueue {
    fn pop(&mut self, what: &str) -> Result<TokenLine, ProbeError> {
        self.lines.pop_front().ok_or_else(|| {
            ProbeError::Format(
                ErrorInfo::new("resume-truncated", format!("file ended before {what}"))
                    .with_hint("the scan may still be writing resume.dat; poll again"),
            )
        })
    }

    fn pop_exact(&mut self, width: usize, what: &str) -> Result<TokenLine, ProbeError> {
        let line = self.pop(what)?;
        if line.tokens.len() != width {
            return Err(ProbeError::Format(
                ErrorInfo::new(
                    "resume-line-width",
                    format!("{what}: expected {width} tokens, found {}", line.tokens.len()),
                )
                .with_context("line", line.number.to_string()),
            ));
        }
        Ok(line)
    }

    fn peek(&self) -> Option<&[String]> {
        self.lines.front().map(|line| line.tokens.as_slice())
    }
}

/// Splits status file text into whitespace tokens, one entry per line.
pub fn tokenize(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect()
}

/// Constant-efficiency heuristic.
///
/// The status file carries no explicit flag. A scan is taken to run in
/// constant-efficiency mode when, right after the first mode's evidence line,
/// another line exists and it holds exactly one token. The check is made once
/// and applies to every mode.
pub fn infer_constant_efficiency(next_line: Option<&[String]>) -> bool {
    matches!(next_line, Some(tokens) if tokens.len() == 1)
}

/// Decodes status file text.
pub fn decode_str(text: &str) -> Result<ResumeFile, ProbeError> {
    decode(tokenize(text))
}

/// Decodes pre-tokenized status file lines.
pub fn decode(lines: Vec<Vec<String>>) -> Result<ResumeFile, ProbeError> {
    let shape: Vec<usize> = lines.iter().take(HEADER_SHAPE.len()).map(Vec::len).collect();
    if shape != HEADER_SHAPE {
        return Err(ProbeError::Format(ErrorInfo::new(
            "resume-header-shape",
            format!("header token counts {shape:?} differ from {HEADER_SHAPE:?}"),
        )));
    }

    let mut queue = TokenQueue {
        lines: lines
            .into_iter()
            .enumerate()
            .map(|(idx, tokens)| TokenLine {
                number: idx + 1,
                tokens,
            })
            .collect(),
    };

    let header = decode_header(&mut queue)?;
    let n_modes = header.n_modes;
    tracing::debug!(n_modes, n_live = header.n_live, "decoded resume header");

    // Pass A: branch counts for every mode.
    let mut branches = Vec::new();
    for mode in 0..n_modes {
        let line = queue.pop_exact(1, &format!("branch count of mode {mode}"))?;
        let branch_number = parse_count(&line, 0, "branch_number")?;
        let mut branch_line = Vec::new();
        if branch_number > 0 {
            // Width is not validated; layout of these lines is not understood.
            let raw = queue.pop(&format!("branch line of mode {mode}"))?;
            branch_line.push(raw.tokens);
        }
        branches.push((vec![branch_number], branch_line));
    }

    // Pass B: mode summaries.
    let mut ceff_flag = None;
    let mut modes = Vec::new();
    for (mode, (branch_number, branch_line)) in branches.into_iter().enumerate() {
        let status = queue.pop_exact(4, &format!("status line of mode {mode}"))?;
        let stop = is_true(&status.tokens[0]);
        let ic_reme = status.tokens[1].clone();
        let ic_fnode = status.tokens[2].clone();
        let n_live = parse_count(&status, 3, "n_live")?;

        let evidence = queue.pop_exact(3, &format!("evidence line of mode {mode}"))?;
        let vol = parse_float(&evidence, 0, "vol")?;
        if vol.is_nan() || vol < 0.0 {
            return Err(negative(&evidence, "vol", vol));
        }
        let ln_z_trapezium = LnEvidence::from_token(&evidence.tokens[1]);
        let ln_z_trapezium_info = parse_float(&evidence, 2, "ln_z_trapezium_info")?;

        let ceff = *ceff_flag.get_or_insert_with(|| infer_constant_efficiency(queue.peek()));
        let ceff_unknown = if ceff {
            let line = queue.pop_exact(1, &format!("constant-efficiency line of mode {mode}"))?;
            line.tokens.into_iter().next()
        } else {
            None
        };

        modes.push(ModeRecord {
            branch_number,
            branch_line,
            stop,
            ic_reme,
            ic_fnode,
            n_live,
            vol,
            ln_z_trapezium,
            ln_z_trapezium_info,
            ceff_unknown,
        });
    }

    if let Some(line) = queue.lines.front() {
        return Err(ProbeError::Format(
            ErrorInfo::new(
                "resume-residual",
                format!("{} unparsed line(s) after the last mode", queue.lines.len()),
            )
            .with_context("line", line.number.to_string())
            .with_context("tokens", line.tokens.join(" ")),
        ));
    }

    Ok(ResumeFile {
        header,
        ceff: ceff_flag.unwrap_or(false),
        modes,
    })
}

fn decode_header(queue: &mut TokenQueue) -> Result<ResumeHeader, ProbeError> {
    let generated = queue.pop_exact(1, "live point generation flag")?;
    let counts = queue.pop_exact(4, "scan counters")?;
    let evidence = queue.pop_exact(2, "global evidence")?;
    let sampling = queue.pop_exact(1, "ellipsoidal flag")?;

    let n_modes = parse_count(&counts, 2, "n_modes")?;
    Ok(ResumeHeader {
        gen_live_completed: !is_true(&generated.tokens[0]),
        n_rejected: parse_count(&counts, 0, "n_rejected")?,
        n_like_calls: parse_count(&counts, 1, "n_like_calls")?,
        n_modes: usize::try_from(n_modes).map_err(|_| {
            ProbeError::Format(
                ErrorInfo::new("resume-count-range", "n_modes does not fit in memory")
                    .with_context("line", counts.number.to_string()),
            )
        })?,
        n_live: parse_count(&counts, 3, "n_live")?,
        ln_z_trapezium: parse_float(&evidence, 0, "ln_z_trapezium")?,
        ln_z_trapezium_info: parse_float(&evidence, 1, "ln_z_trapezium_info")?,
        ellipsoidal: is_true(&sampling.tokens[0]),
    })
}

fn is_true(token: &str) -> bool {
    token == "T"
}

fn parse_count(line: &TokenLine, index: usize, field: &str) -> Result<u64, ProbeError> {
    let token = &line.tokens[index];
    let value: i64 = token.parse().map_err(|_| {
        ProbeError::Format(
            ErrorInfo::new("resume-integer", format!("{field} is not an integer: {token}"))
                .with_context("line", line.number.to_string()),
        )
    })?;
    u64::try_from(value).map_err(|_| negative(line, field, value as f64))
}

fn parse_float(line: &TokenLine, index: usize, field: &str) -> Result<f64, ProbeError> {
    let token = &line.tokens[index];
    token.parse().map_err(|_| {
        ProbeError::Format(
            ErrorInfo::new("resume-float", format!("{field} is not a number: {token}"))
                .with_context("line", line.number.to_string()),
        )
    })
}

fn negative(line: &TokenLine, field: &str, value: f64) -> ProbeError {
    ProbeError::Format(
        ErrorInfo::new("resume-negative", format!("{field} must be >= 0, found {value}"))
            .with_context("line", line.number.to_string())
            .with_context("field", field),
    )
}
