#![deny(missing_docs)]
#![doc = "Shared error types and canonical serialization helpers for the mnprobe workspace."]

pub mod errors;
/// SHA256 fingerprint helpers.
pub mod hash;
/// Canonical JSON serde helpers.
pub mod serde;

pub use errors::{ErrorInfo, ProbeError};
pub use hash::digest_parts;
pub use serde::to_canonical_json_pretty;
