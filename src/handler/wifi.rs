// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wi-Fi beacon streams.

use super::row::{CsvSchema, RowBuilder};
use crate::{Record, Result};

pub(super) fn schema() -> CsvSchema {
    CsvSchema::new(vec!["timestamp", "ssid", "bssid", "freq", "rssi"])
}

pub(super) fn format_row(record: &Record, row: &mut RowBuilder) -> Result<()> {
    row.push_field(record, "board_timestamp_ns")?;
    row.push_text_field(record, "ssid")?;
    row.push_text_field(record, "bssid_mac")?;
    row.push_field(record, "freq_mhz")?;
    row.push_field(record, "rssi")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beacon(ssid: &str) -> Record {
        Record::data(0)
            .with_field("board_timestamp_ns", 1000i64)
            .with_field("ssid", ssid)
            .with_field("bssid_mac", "AA:BB:CC:DD:EE:FF")
            .with_field("freq_mhz", 2412.0f32)
            .with_field("rssi", -50.0f32)
    }

    #[test]
    fn test_row() {
        let mut row = RowBuilder::new();
        format_row(&beacon("Home"), &mut row).unwrap();
        assert_eq!(row.finish(), ["1000", "Home", "AA:BB:CC:DD:EE:FF", "2412", "-50"]);
    }

    #[test]
    fn test_hidden_network() {
        let mut row = RowBuilder::new();
        format_row(&beacon(""), &mut row).unwrap();
        assert_eq!(row.finish(), ["1000", "", "AA:BB:CC:DD:EE:FF", "2412", "-50"]);
    }

    #[test]
    fn test_numeric_ssid_rejected() {
        let record = beacon("x").with_field("ssid", 5i64);
        let mut row = RowBuilder::new();
        assert!(format_row(&record, &mut row).is_err());
    }
}
