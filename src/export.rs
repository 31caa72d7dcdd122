//! Export and publish surface: target formats, receipts, and the
//! validation blockers that gate both.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::store::FieldName;

/// Marketplace feed formats the exporter can produce. The formats
/// themselves are owned by the external exporter; these are the
/// identifiers the console routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    OzonXml,
    YandexYml,
    WildberriesCsv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::OzonXml,
        ExportFormat::YandexYml,
        ExportFormat::WildberriesCsv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::OzonXml => "ozon_xml",
            ExportFormat::YandexYml => "yandex_yml",
            ExportFormat::WildberriesCsv => "wildberries_csv",
        }
    }

    /// Human-readable channel name for console output.
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::OzonXml => "Ozon XML",
            ExportFormat::YandexYml => "Yandex YML",
            ExportFormat::WildberriesCsv => "Wildberries CSV",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ozon_xml" => Ok(ExportFormat::OzonXml),
            "yandex_yml" => Ok(ExportFormat::YandexYml),
            "wildberries_csv" => Ok(ExportFormat::WildberriesCsv),
            other => Err(ParseError::ExportFormat(other.to_string())),
        }
    }
}

/// A condition preventing export/publish until resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blocker {
    pub id: String,
    /// The field the blocker points at, when it concerns one.
    pub field: Option<FieldName>,
    pub description: String,
}

impl Blocker {
    pub fn new(id: impl Into<String>, field: Option<FieldName>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field,
            description: description.into(),
        }
    }
}

/// Proof that an export completed, returned by the exporter backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub job_id: String,
    pub format: ExportFormat,
    pub exported_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_roundtrips_through_str() {
        for format in ExportFormat::ALL {
            assert_eq!(format.as_str().parse::<ExportFormat>().unwrap(), format);
        }
    }

    #[test]
    fn unknown_format_rejected() {
        assert!("amazon_json".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn format_serializes_snake_case() {
        let json = serde_json::to_string(&ExportFormat::WildberriesCsv).unwrap();
        assert_eq!(json, r#""wildberries_csv""#);
    }

    #[test]
    fn blocker_may_target_a_field() {
        let blocker = Blocker::new(
            "blk-1",
            Some(FieldName::Yield),
            "Yield specification missing from all sources",
        );
        assert_eq!(blocker.field, Some(FieldName::Yield));

        let general = Blocker::new("blk-2", None, "Category mapping unconfirmed");
        assert!(general.field.is_none());
    }
}
