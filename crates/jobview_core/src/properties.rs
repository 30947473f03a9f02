use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fields::{local_file_or_url, Slot, Unit};
use crate::job::FieldUpdate;

/// Batched update: property name to new value.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Loosely typed property value as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Text(String),
}

impl PropertyValue {
    /// Numeric view; negative or non-numeric values yield `None`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            PropertyValue::Bool(b) => Some(u64::from(*b)),
            PropertyValue::UInt(v) => Some(*v),
            PropertyValue::Int(v) => u64::try_from(*v).ok(),
            PropertyValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::UInt(v) => Some(*v != 0),
            PropertyValue::Int(v) => Some(*v != 0),
            PropertyValue::Text(s) => {
                let s = s.trim();
                Some(!(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")))
            }
        }
    }

    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::UInt(v) => write!(f, "{v}"),
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        PropertyValue::UInt(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::UInt(u64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl FieldUpdate {
    /// Translates one batched property into a field update.
    ///
    /// Unknown keys and values of an unusable type yield `None`.
    pub fn from_property(key: &str, value: &PropertyValue) -> Option<Self> {
        let update = match key {
            "title" => FieldUpdate::Summary(value.as_text()),
            "infoMessage" => FieldUpdate::InfoMessage(value.as_text()),
            "percent" => {
                FieldUpdate::Percent(u32::try_from(value.as_u64()?).unwrap_or(u32::MAX))
            }
            "destUrl" => FieldUpdate::DestUrl(local_file_or_url(&value.as_text())),
            "speed" => FieldUpdate::Speed(value.as_u64()?),
            "processedFiles" => FieldUpdate::Processed(Unit::Files, value.as_u64()?),
            "processedBytes" => FieldUpdate::Processed(Unit::Bytes, value.as_u64()?),
            "processedDirectories" => FieldUpdate::Processed(Unit::Directories, value.as_u64()?),
            "totalFiles" => FieldUpdate::Total(Unit::Files, value.as_u64()?),
            "totalBytes" => FieldUpdate::Total(Unit::Bytes, value.as_u64()?),
            "totalDirectories" => FieldUpdate::Total(Unit::Directories, value.as_u64()?),
            "descriptionLabel1" => FieldUpdate::DescriptionLabel(Slot::First, value.as_text()),
            "descriptionValue1" => FieldUpdate::DescriptionValue(Slot::First, value.as_text()),
            "descriptionLabel2" => FieldUpdate::DescriptionLabel(Slot::Second, value.as_text()),
            "descriptionValue2" => FieldUpdate::DescriptionValue(Slot::Second, value.as_text()),
            "suspended" => FieldUpdate::Suspended(value.as_bool()?),
            _ => return None,
        };
        Some(update)
    }
}
