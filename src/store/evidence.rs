use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sku::{Confidence, FieldName};

/// Where a piece of evidence was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Official,
    Marketplace,
    Forum,
    Datasheet,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceType::Official => "official",
            SourceType::Marketplace => "marketplace",
            SourceType::Forum => "forum",
            SourceType::Datasheet => "datasheet",
        };
        f.write_str(s)
    }
}

/// A sourced claim supporting one field's value. Read-only once fetched;
/// re-verification happens out of band and does not mutate the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub field: FieldName,
    pub value: String,
    pub source_url: String,
    pub source_type: SourceType,
    pub snippet: String,
    pub confidence: Confidence,
    pub verified: bool,
    pub fetched_at: DateTime<Utc>,
}

impl Evidence {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        field: FieldName,
        value: impl Into<String>,
        source_url: impl Into<String>,
        source_type: SourceType,
        snippet: impl Into<String>,
        confidence: u8,
        verified: bool,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            field,
            value: value.into(),
            source_url: source_url.into(),
            source_type,
            snippet: snippet.into(),
            confidence: Confidence::new(confidence),
            verified,
            fetched_at,
        }
    }
}
