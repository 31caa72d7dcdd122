use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Extraction confidence, clamped to 0..=100 at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(u8);

impl Confidence {
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Review state of a single text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Verified,
    Pending,
    Conflict,
    Locked,
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldStatus::Verified => "verified",
            FieldStatus::Pending => "pending",
            FieldStatus::Conflict => "conflict",
            FieldStatus::Locked => "locked",
        };
        f.write_str(s)
    }
}

impl FromStr for FieldStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verified" => Ok(FieldStatus::Verified),
            "pending" => Ok(FieldStatus::Pending),
            "conflict" => Ok(FieldStatus::Conflict),
            "locked" => Ok(FieldStatus::Locked),
            other => Err(ParseError::FieldStatus(other.to_string())),
        }
    }
}

/// Quality-control state of the hero image. Image fields carry this
/// instead of a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QcStatus {
    Pending,
    Passed,
    Failed,
}

impl fmt::Display for QcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QcStatus::Pending => "pending",
            QcStatus::Passed => "passed",
            QcStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The closed set of enrichable fields. All field access goes through
/// this enum; there is no lookup by raw string key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Mpn,
    Brand,
    Yield,
    Dimensions,
    Weight,
    HeroImage,
}

impl FieldName {
    pub const ALL: [FieldName; 6] = [
        FieldName::Mpn,
        FieldName::Brand,
        FieldName::Yield,
        FieldName::Dimensions,
        FieldName::Weight,
        FieldName::HeroImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Mpn => "mpn",
            FieldName::Brand => "brand",
            FieldName::Yield => "yield",
            FieldName::Dimensions => "dimensions",
            FieldName::Weight => "weight",
            FieldName::HeroImage => "hero_image",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, FieldName::HeroImage)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mpn" => Ok(FieldName::Mpn),
            "brand" => Ok(FieldName::Brand),
            "yield" => Ok(FieldName::Yield),
            "dimensions" => Ok(FieldName::Dimensions),
            "weight" => Ok(FieldName::Weight),
            "hero_image" => Ok(FieldName::HeroImage),
            other => Err(ParseError::FieldName(other.to_string())),
        }
    }
}

/// One enriched text field: extracted value, review status, confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub value: String,
    pub status: FieldStatus,
    pub confidence: Confidence,
}

impl FieldRecord {
    pub fn new(value: impl Into<String>, status: FieldStatus, confidence: u8) -> Self {
        Self {
            value: value.into(),
            status,
            confidence: Confidence::new(confidence),
        }
    }
}

/// The hero image slot: a URL plus its QC verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageField {
    pub url: String,
    pub qc_status: QcStatus,
}

/// The enriched field set for exactly one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuData {
    pub job_id: String,
    pub mpn: FieldRecord,
    pub brand: FieldRecord,
    pub page_yield: FieldRecord,
    pub dimensions: FieldRecord,
    pub weight: FieldRecord,
    pub hero_image: ImageField,
}

impl SkuData {
    /// Typed accessor for a text field. `HeroImage` has no text record.
    pub fn record(&self, field: FieldName) -> Option<&FieldRecord> {
        match field {
            FieldName::Mpn => Some(&self.mpn),
            FieldName::Brand => Some(&self.brand),
            FieldName::Yield => Some(&self.page_yield),
            FieldName::Dimensions => Some(&self.dimensions),
            FieldName::Weight => Some(&self.weight),
            FieldName::HeroImage => None,
        }
    }

    pub fn record_mut(&mut self, field: FieldName) -> Option<&mut FieldRecord> {
        match field {
            FieldName::Mpn => Some(&mut self.mpn),
            FieldName::Brand => Some(&mut self.brand),
            FieldName::Yield => Some(&mut self.page_yield),
            FieldName::Dimensions => Some(&mut self.dimensions),
            FieldName::Weight => Some(&mut self.weight),
            FieldName::HeroImage => None,
        }
    }

    /// Text fields currently in `Locked` status.
    pub fn locked_fields(&self) -> Vec<FieldName> {
        FieldName::ALL
            .iter()
            .copied()
            .filter(|f| {
                self.record(*f)
                    .is_some_and(|r| r.status == FieldStatus::Locked)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SkuData {
        SkuData {
            job_id: "job-001".into(),
            mpn: FieldRecord::new("CE285A", FieldStatus::Verified, 95),
            brand: FieldRecord::new("HP", FieldStatus::Verified, 98),
            page_yield: FieldRecord::new("1600 pages", FieldStatus::Pending, 72),
            dimensions: FieldRecord::new("12.5 x 3.8 x 5.2 cm", FieldStatus::Conflict, 65),
            weight: FieldRecord::new("0.45 kg", FieldStatus::Pending, 80),
            hero_image: ImageField {
                url: "https://img.example.com/ce285a.jpg".into(),
                qc_status: QcStatus::Pending,
            },
        }
    }

    #[test]
    fn confidence_clamps_to_100() {
        assert_eq!(Confidence::new(250).get(), 100);
        assert_eq!(Confidence::new(100).get(), 100);
        assert_eq!(Confidence::new(0).get(), 0);
        assert_eq!(Confidence::new(72).get(), 72);
    }

    #[test]
    fn field_status_parses_known_values() {
        assert_eq!("verified".parse::<FieldStatus>().unwrap(), FieldStatus::Verified);
        assert_eq!("locked".parse::<FieldStatus>().unwrap(), FieldStatus::Locked);
    }

    #[test]
    fn field_status_rejects_unknown_values() {
        assert!("approved".parse::<FieldStatus>().is_err());
        assert!("".parse::<FieldStatus>().is_err());
    }

    #[test]
    fn field_name_roundtrips_through_str() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>().unwrap(), field);
        }
        assert!("sku_title".parse::<FieldName>().is_err());
    }

    #[test]
    fn record_accessor_covers_text_fields_only() {
        let sku = sample();
        assert_eq!(sku.record(FieldName::Mpn).unwrap().value, "CE285A");
        assert_eq!(sku.record(FieldName::Yield).unwrap().value, "1600 pages");
        assert!(sku.record(FieldName::HeroImage).is_none());
    }

    #[test]
    fn record_mut_updates_in_place() {
        let mut sku = sample();
        sku.record_mut(FieldName::Weight).unwrap().value = "0.5 kg".into();
        assert_eq!(sku.weight.value, "0.5 kg");
    }

    #[test]
    fn locked_fields_lists_only_locked() {
        let mut sku = sample();
        assert!(sku.locked_fields().is_empty());
        sku.brand.status = FieldStatus::Locked;
        sku.weight.status = FieldStatus::Locked;
        assert_eq!(sku.locked_fields(), vec![FieldName::Brand, FieldName::Weight]);
    }

    #[test]
    fn sku_serialization_roundtrip() {
        let sku = sample();
        let json = serde_json::to_string(&sku).unwrap();
        let back: SkuData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sku);
    }
}
