// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bluetooth beacon streams.

use super::row::{CsvSchema, RowBuilder};
use crate::{Record, Result};

pub(super) fn schema() -> CsvSchema {
    CsvSchema::new(vec!["timestamp", "id", "rssi", "freq"])
}

pub(super) fn format_row(record: &Record, row: &mut RowBuilder) -> Result<()> {
    row.push_field(record, "board_timestamp_ns")?;
    row.push_text_field(record, "unique_id")?;
    row.push_field(record, "rssi")?;
    row.push_field(record, "freq_mhz")
}
