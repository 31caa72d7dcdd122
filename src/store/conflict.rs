use serde::{Deserialize, Serialize};

use super::evidence::Evidence;
use super::sku::FieldName;

/// One competing value for a field, with the source it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub value: String,
    pub source: String,
}

/// Disagreement between evidence claims for one field, awaiting a single
/// authoritative resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub field: FieldName,
    /// Competing claims, highest-confidence first.
    pub claims: Vec<Claim>,
}

impl Conflict {
    /// Builds a conflict from a field's evidence set: one claim per
    /// distinct value, ordered by the best confidence backing it.
    /// Returns `None` when the evidence agrees (fewer than two distinct
    /// values).
    pub fn from_evidence(field: FieldName, evidence: &[Evidence]) -> Option<Self> {
        let mut sorted: Vec<&Evidence> = evidence.iter().filter(|e| e.field == field).collect();
        sorted.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        let mut claims: Vec<Claim> = Vec::new();
        for ev in sorted {
            if claims.iter().any(|c| c.value == ev.value) {
                continue;
            }
            claims.push(Claim {
                value: ev.value.clone(),
                source: ev.source_url.clone(),
            });
        }

        if claims.len() < 2 {
            return None;
        }
        Some(Self { field, claims })
    }

    /// The resolution that would pick the claim at `index`.
    pub fn resolution_for(&self, index: usize) -> Option<ConflictResolution> {
        self.claims.get(index).map(|claim| ConflictResolution {
            field: self.field,
            value: claim.value.clone(),
            source: claim.source.clone(),
        })
    }
}

/// A user's choice of the authoritative claim for a conflicted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictResolution {
    pub field: FieldName,
    pub value: String,
    pub source: String,
}
