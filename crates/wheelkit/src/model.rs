use derive_more::{AsRef, Deref, Display, From, Into};
use palette::Srgb;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_WEIGHT: f64 = 1.0;

/// An `#rrggbb` color override. Stored as plain text so records with colors
/// this version cannot parse still load; they fall back to the palette.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct HexColor(String);

crate::impl_string_newtype!(HexColor);

impl HexColor {
    /// Validates user input and normalizes it to lowercase `#rrggbb`.
    pub fn parse(input: &str) -> Result<Self, EntryError> {
        let trimmed = input.trim();
        let rgb = Srgb::<u8>::from_str(trimmed)
            .map_err(|_| EntryError::InvalidColor(trimmed.to_string()))?;
        Ok(Self::from_srgb(rgb))
    }

    pub fn from_srgb(rgb: Srgb<u8>) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue))
    }

    pub fn to_srgb(&self) -> Option<Srgb<u8>> {
        Srgb::<u8>::from_str(self.0.trim()).ok()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("Weight must be a positive number, got '{0}'")]
    InvalidWeight(String),
    #[error("'{0}' is not a color, use #rrggbb")]
    InvalidColor(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub label: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<HexColor>,
}

impl Entry {
    pub fn new(label: impl Into<String>, weight: f64) -> Self {
        Self {
            label: label.into(),
            weight,
            color: None,
        }
    }

    pub fn with_color(mut self, color: HexColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Builds an entry from raw form input.
    ///
    /// An empty label is not an error: it yields `Ok(None)` and the caller
    /// leaves its list untouched. An empty weight means [`DEFAULT_WEIGHT`].
    pub fn from_input(label: &str, weight: &str, color: &str) -> Result<Option<Self>, EntryError> {
        let label = label.trim();
        if label.is_empty() {
            return Ok(None);
        }

        let weight = parse_weight(weight)?;
        let color = match color.trim() {
            "" => None,
            c => Some(HexColor::parse(c)?),
        };

        Ok(Some(Self {
            label: label.to_string(),
            weight,
            color,
        }))
    }

    /// The weight used for slicing. Records read from disk are not
    /// re-validated, so anything non-finite or non-positive counts as zero.
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}

pub fn parse_weight(input: &str) -> Result<f64, EntryError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(DEFAULT_WEIGHT);
    }

    input
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w > 0.0)
        .ok_or_else(|| EntryError::InvalidWeight(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_validation() {
        assert_eq!(Entry::from_input("   ", "2", ""), Ok(None));
        assert_eq!(
            Entry::from_input(" Pizza ", "", ""),
            Ok(Some(Entry::new("Pizza", 1.0)))
        );
        assert_eq!(
            Entry::from_input("Pizza", "2.5", "#FF6B6B"),
            Ok(Some(
                Entry::new("Pizza", 2.5).with_color(HexColor::new("#ff6b6b"))
            ))
        );

        for bad in ["abc", "0", "-3", "NaN", "inf"] {
            assert_eq!(
                Entry::from_input("Pizza", bad, ""),
                Err(EntryError::InvalidWeight(bad.to_string())),
                "weight {bad:?} should be rejected"
            );
        }

        assert!(matches!(
            Entry::from_input("Pizza", "1", "chartreuse-ish"),
            Err(EntryError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_entry_json_shape() {
        let plain: Entry = serde_json::from_str(r#"{"label": "A", "weight": 1}"#).unwrap();
        assert_eq!(plain, Entry::new("A", 1.0));
        assert_eq!(
            serde_json::to_string(&plain).unwrap(),
            r#"{"label":"A","weight":1.0}"#
        );

        let colored: Entry =
            serde_json::from_str(r##"{"label": "B", "weight": 2.0, "color": "#3498DB"}"##)
                .unwrap();
        assert_eq!(
            colored.color.as_ref().and_then(HexColor::to_srgb),
            Some(Srgb::new(0x34, 0x98, 0xdb))
        );
    }

    #[test]
    fn test_effective_weight() {
        assert_eq!(Entry::new("a", 2.0).effective_weight(), 2.0);
        assert_eq!(Entry::new("a", 0.0).effective_weight(), 0.0);
        assert_eq!(Entry::new("a", -1.0).effective_weight(), 0.0);
        assert_eq!(Entry::new("a", f64::NAN).effective_weight(), 0.0);
    }
}
