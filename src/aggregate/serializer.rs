//! Deterministic rendering of aggregated results.
//!
//! # Responsibilities
//! - Render an AggregatedResult as a stable JSON payload
//! - Keep field order equal to configuration order
//! - Bound failure detail length so verbose upstream errors cannot grow
//!   the payload without limit
//!
//! # Design Decisions
//! - serde_json's `preserve_order` feature makes map insertion order the
//!   emission order, so the same result value always yields identical bytes

use serde_json::{Map, Value};

use crate::aggregate::outcome::{AggregatedResult, DependencyOutcome};

/// Detail strings longer than this are truncated before serialization.
pub const MAX_DETAIL_CHARS: usize = 256;

/// Serialize an aggregated result into its wire payload.
///
/// Byte-identical for value-identical inputs. The `ok` field comes first,
/// then one object per dependency in configuration order.
pub fn serialize(result: &AggregatedResult) -> Vec<u8> {
    let mut root = Map::new();
    root.insert("ok".to_string(), Value::Bool(result.ok()));

    for (name, outcome) in result.entries() {
        let mut slot = Map::new();
        slot.insert(
            "status".to_string(),
            Value::String(outcome.status().to_string()),
        );
        match outcome {
            DependencyOutcome::Success(value) => {
                slot.insert("value".to_string(), value.clone());
            }
            DependencyOutcome::Failure { kind, detail } => {
                slot.insert("kind".to_string(), Value::String(kind.as_str().to_string()));
                slot.insert("detail".to_string(), Value::String(truncate(detail)));
            }
            DependencyOutcome::Skipped(reason) => {
                slot.insert("detail".to_string(), Value::String(truncate(reason)));
            }
        }
        root.insert(name.clone(), Value::Object(slot));
    }

    // Plain bools, strings, and maps cannot fail to serialize.
    serde_json::to_vec(&Value::Object(root)).unwrap_or_default()
}

fn truncate(detail: &str) -> String {
    detail.chars().take(MAX_DETAIL_CHARS).collect()
}
