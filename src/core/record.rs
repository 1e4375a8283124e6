// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Stream records and typed field access.

use std::fmt;
use std::str::FromStr;

use super::error::{ExportError, Result};
use super::value::{FieldValue, Fields};

/// Kind of a stream record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Establishes or re-asserts the stream's capabilities
    Configuration,
    /// One timestamped measurement
    Data,
}

impl RecordKind {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Configuration => "configuration",
            RecordKind::Data => "data",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "configuration" | "config" => Ok(RecordKind::Configuration),
            "data" => Ok(RecordKind::Data),
            other => Err(ExportError::format(
                "record_type",
                format!("unknown record type '{other}'"),
            )),
        }
    }
}

/// One record of a stream as delivered by a record source.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Configuration or data
    pub kind: RecordKind,
    /// Container timestamp of the record (nanoseconds)
    pub timestamp_ns: u64,
    /// Decoded payload fields
    pub fields: Fields,
}

impl Record {
    /// Create an empty record of the given kind.
    pub fn new(kind: RecordKind, timestamp_ns: u64) -> Self {
        Self {
            kind,
            timestamp_ns,
            fields: Fields::new(),
        }
    }

    /// Create an empty configuration record.
    pub fn configuration(timestamp_ns: u64) -> Self {
        Self::new(RecordKind::Configuration, timestamp_ns)
    }

    /// Create an empty data record.
    pub fn data(timestamp_ns: u64) -> Self {
        Self::new(RecordKind::Data, timestamp_ns)
    }

    /// Add a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Get a field that must be present and non-null.
    pub fn require(&self, name: &str) -> Result<&FieldValue> {
        match self.fields.get(name) {
            Some(FieldValue::Null) | None => Err(ExportError::format(name, "missing field")),
            Some(value) => Ok(value),
        }
    }

    /// Get a numeric field, keeping its original representation.
    pub fn require_number(&self, name: &str) -> Result<&FieldValue> {
        let value = self.require(name)?;
        if value.is_numeric() {
            Ok(value)
        } else {
            Err(mismatch(name, "number", value))
        }
    }

    /// Get a text field.
    pub fn require_str(&self, name: &str) -> Result<&str> {
        let value = self.require(name)?;
        value.as_str().ok_or_else(|| mismatch(name, "string", value))
    }

    /// Get a numeric vector with exactly three components.
    pub fn require_vec3(&self, name: &str) -> Result<[&FieldValue; 3]> {
        let value = self.require(name)?;
        let items = value
            .as_array()
            .ok_or_else(|| mismatch(name, "array", value))?;
        match items {
            [x, y, z] => {
                for item in [x, y, z] {
                    if !item.is_numeric() {
                        return Err(ExportError::format(
                            name,
                            format!("expected numeric components, got {}", item.type_name()),
                        ));
                    }
                }
                Ok([x, y, z])
            }
            _ => Err(ExportError::format(
                name,
                format!("expected 3 components, got {}", items.len()),
            )),
        }
    }

    /// Get a capability flag; a missing flag reads as `false`.
    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.fields.get(name) {
            None | Some(FieldValue::Null) => Ok(false),
            Some(FieldValue::Bool(b)) => Ok(*b),
            Some(value) => match value.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(mismatch(name, "bool", value)),
            },
        }
    }
}

fn mismatch(name: &str, expected: &str, found: &FieldValue) -> ExportError {
    ExportError::format(
        name,
        format!("expected {expected}, got {}", found.type_name()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_from_str() {
        assert_eq!(
            "configuration".parse::<RecordKind>().unwrap(),
            RecordKind::Configuration
        );
        assert_eq!("DATA".parse::<RecordKind>().unwrap(), RecordKind::Data);
        assert!("state".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_require_missing_and_null() {
        let record = Record::data(0).with_field("ssid", FieldValue::Null);
        let err = record.require("ssid").unwrap_err();
        assert_eq!(err, ExportError::format("ssid", "missing field"));
        assert!(record.require("bssid_mac").is_err());
    }

    #[test]
    fn test_require_typed() {
        let record = Record::data(0)
            .with_field("rssi", -50i64)
            .with_field("ssid", "Home")
            .with_field("pressure", 101325.5f64);
        assert_eq!(record.require_number("rssi").unwrap(), &FieldValue::Int64(-50));
        assert_eq!(record.require_str("ssid").unwrap(), "Home");
        assert_eq!(
            record.require_number("pressure").unwrap(),
            &FieldValue::Float64(101325.5)
        );
        assert!(record.require_str("rssi").is_err());
        assert!(record.require_number("ssid").is_err());
    }

    #[test]
    fn test_require_vec3() {
        let ok = Record::data(0).with_field("accel_msec2", vec![0.1f64, 0.2, 9.8]);
        let [x, _, z] = ok.require_vec3("accel_msec2").unwrap();
        assert_eq!(x, &FieldValue::Float64(0.1));
        assert_eq!(z, &FieldValue::Float64(9.8));

        let short = Record::data(0).with_field("accel_msec2", vec![0.1f64, 0.2]);
        let err = short.require_vec3("accel_msec2").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Format error in field 'accel_msec2': expected 3 components, got 2"
        );

        let text = Record::data(0).with_field("accel_msec2", vec!["a", "b", "c"]);
        assert!(text.require_vec3("accel_msec2").is_err());
    }

    #[test]
    fn test_flag_defaults_to_false() {
        let record = Record::configuration(0)
            .with_field("has_accelerometer", true)
            .with_field("has_gyroscope", 0i64)
            .with_field("has_magnetometer", "yes");
        assert!(record.flag("has_accelerometer").unwrap());
        assert!(!record.flag("has_gyroscope").unwrap());
        assert!(!record.flag("has_barometer").unwrap());
        assert!(record.flag("has_magnetometer").is_err());
    }
}
