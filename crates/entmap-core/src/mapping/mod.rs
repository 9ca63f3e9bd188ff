//! Mapping engine: invoker, transformation core, and skip reporting
//!
//! The public surface is one operation: [`map`] (or
//! [`MappingInvoker::map_with_report`] when the caller wants the skip report
//! and metadata alongside the target). Everything else in this module is the
//! machinery behind it.

mod engine;
pub mod invoker;
mod session;
pub mod skips;

pub use invoker::MappingInvoker;
pub use skips::{SkipItem, SkipReason, SkipReport, SkipSummary};

use crate::error::Result;
use crate::schema::{ContextToken, TypeRegistry};
use crate::value::Value;
use serde::Serialize;

/// A mapped target plus the observability record of how it was produced
#[derive(Debug, Clone, Serialize)]
pub struct MappingOutcome {
    /// The freshly constructed, populated target instance
    pub target: Value,
    /// Every field left at its zero value, and why
    pub skips: SkipReport,
    pub metadata: MappingMetadata,
}

/// Metadata about one mapping invocation
#[derive(Debug, Clone, Serialize)]
pub struct MappingMetadata {
    pub source_type: String,
    pub target_type: String,
    pub context: String,
    /// RFC3339 timestamp of the invocation
    pub timestamp: String,
    pub duration_ms: u64,
}

/// Map `source` into a new instance of `target_type` for the given context
/// token
///
/// Convenience wrapper over [`MappingInvoker`] with the default
/// materialization probe.
pub fn map(
    registry: &TypeRegistry,
    source: &Value,
    target_type: &str,
    token: &ContextToken,
) -> Result<Value> {
    MappingInvoker::new(registry).map(source, target_type, token)
}
