// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Barometer streams.

use super::row::{CsvSchema, RowBuilder};
use crate::{Record, Result};

pub(super) fn schema() -> CsvSchema {
    CsvSchema::new(vec!["timestamp", "pressure", "altitude"])
}

pub(super) fn format_row(record: &Record, row: &mut RowBuilder) -> Result<()> {
    row.push_field(record, "capture_timestamp_ns")?;
    row.push_field(record, "pressure")?;
    row.push_field(record, "altitude")
}
