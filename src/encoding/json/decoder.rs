// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON record payload decoder.
//!
//! Each payload is a JSON object. The reserved `record_type` member selects
//! the record kind; every other member becomes a typed field.
//!
//! ## Example
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sensorcsv::encoding::json::JsonRecordDecoder;
//! use sensorcsv::FieldValue;
//!
//! let decoder = JsonRecordDecoder::new();
//! let record = decoder
//!     .decode(br#"{"record_type": "data", "pressure": 101325.0}"#, 7)?
//!     .expect("data records are exported");
//! assert_eq!(record.require_number("pressure")?, &FieldValue::Float64(101325.0));
//! # Ok(())
//! # }
//! ```

use crate::{ExportError, FieldValue, Fields, Record, RecordKind, Result};

/// Name of the member carrying the record kind.
pub const RECORD_TYPE_FIELD: &str = "record_type";

/// Record kinds that are present in recordings but never exported.
const IGNORED_RECORD_TYPES: &[&str] = &["state", "tags"];

/// Decoder for JSON-encoded sensor records.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordDecoder {
    _private: (),
}

impl JsonRecordDecoder {
    /// Create a new JSON record decoder.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Decode one payload.
    ///
    /// Returns `Ok(None)` for record kinds that are not exported (state
    /// records), and a format error when the payload is not a JSON object
    /// or lacks a valid `record_type`.
    pub fn decode(&self, data: &[u8], timestamp_ns: u64) -> Result<Option<Record>> {
        let value: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| ExportError::format("payload", format!("invalid JSON: {e}")))?;

        let serde_json::Value::Object(obj) = value else {
            return Err(ExportError::format("payload", "expected a JSON object"));
        };

        let kind_name = obj
            .get(RECORD_TYPE_FIELD)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExportError::format(RECORD_TYPE_FIELD, "missing field"))?;

        if IGNORED_RECORD_TYPES
            .iter()
            .any(|ignored| kind_name.eq_ignore_ascii_case(ignored))
        {
            return Ok(None);
        }
        let kind: RecordKind = kind_name.parse()?;

        let mut fields = Fields::with_capacity(obj.len());
        for (key, val) in &obj {
            if key == RECORD_TYPE_FIELD {
                continue;
            }
            fields.insert(key.clone(), json_to_field_value(val)?);
        }

        Ok(Some(Record {
            kind,
            timestamp_ns,
            fields,
        }))
    }
}

/// Convert a JSON value to a field value.
fn json_to_field_value(value: &serde_json::Value) -> Result<FieldValue> {
    match value {
        serde_json::Value::Null => Ok(FieldValue::Null),
        serde_json::Value::Bool(b) => Ok(FieldValue::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(FieldValue::Int64(i))
            } else if let Some(u) = n.as_u64() {
                Ok(FieldValue::UInt64(u))
            } else if let Some(f) = n.as_f64() {
                Ok(FieldValue::Float64(f))
            } else {
                Err(ExportError::format("number", "unknown number format"))
            }
        }
        serde_json::Value::String(s) => Ok(FieldValue::String(s.clone())),
        serde_json::Value::Array(arr) => {
            let mut values = Vec::with_capacity(arr.len());
            for item in arr {
                values.push(json_to_field_value(item)?);
            }
            Ok(FieldValue::Array(values))
        }
        serde_json::Value::Object(_) => Err(ExportError::format(
            "payload",
            "nested objects are not supported in sensor records",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_configuration() {
        let decoder = JsonRecordDecoder::new();
        let record = decoder
            .decode(
                br#"{"record_type":"configuration","has_accelerometer":true,"has_gyroscope":false}"#,
                42,
            )
            .unwrap()
            .unwrap();

        assert_eq!(record.kind, RecordKind::Configuration);
        assert_eq!(record.timestamp_ns, 42);
        assert!(record.flag("has_accelerometer").unwrap());
        assert!(!record.fields.contains_key(RECORD_TYPE_FIELD));
    }

    #[test]
    fn test_decode_data_types() {
        let decoder = JsonRecordDecoder::new();
        let record = decoder
            .decode(
                br#"{"record_type":"data","board_timestamp_ns":1000,"ssid":"Home","rssi":-50,"accel_msec2":[0.1,0.2,9.8]}"#,
                0,
            )
            .unwrap()
            .unwrap();

        assert_eq!(record.get("board_timestamp_ns"), Some(&FieldValue::Int64(1000)));
        assert_eq!(record.get("rssi"), Some(&FieldValue::Int64(-50)));
        assert_eq!(record.require_str("ssid").unwrap(), "Home");
        assert!(record.require_vec3("accel_msec2").is_ok());
    }

    #[test]
    fn test_large_unsigned() {
        let decoder = JsonRecordDecoder::new();
        let record = decoder
            .decode(br#"{"record_type":"data","t":18446744073709551615}"#, 0)
            .unwrap()
            .unwrap();
        assert_eq!(record.get("t"), Some(&FieldValue::UInt64(u64::MAX)));
    }

    #[test]
    fn test_state_records_are_skipped() {
        let decoder = JsonRecordDecoder::new();
        let decoded = decoder.decode(br#"{"record_type":"state"}"#, 0).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_invalid_payloads() {
        let decoder = JsonRecordDecoder::new();
        assert!(decoder.decode(b"not json", 0).is_err());
        assert!(decoder.decode(b"[1,2,3]", 0).is_err());
        assert!(decoder.decode(br#"{"pressure":1.0}"#, 0).is_err());
        assert!(decoder
            .decode(br#"{"record_type":"data","nested":{"a":1}}"#, 0)
            .is_err());
    }
}
