// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CSV column schema and row assembly.

use crate::core::FieldValue;
use crate::{ExportError, Record, Result};

/// Ordered column names of one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSchema {
    columns: Vec<&'static str>,
}

impl CsvSchema {
    /// Schema with the given columns.
    pub fn new(columns: Vec<&'static str>) -> Self {
        Self { columns }
    }

    /// Column names in output order.
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Collects the cells of one CSV row from typed values.
///
/// Each formatting call owns its builder; nothing is shared between rows
/// and nothing reaches the output until the row is complete.
#[derive(Debug, Default)]
pub struct RowBuilder {
    cells: Vec<String>,
}

impl RowBuilder {
    /// Start an empty row.
    pub fn new() -> Self {
        Self {
            cells: Vec::with_capacity(10),
        }
    }

    /// Append a numeric cell.
    pub fn push_number(&mut self, field: &str, value: &FieldValue) -> Result<()> {
        let mut cell = String::new();
        if value.write_number(&mut cell) {
            self.cells.push(cell);
            Ok(())
        } else {
            Err(ExportError::format(
                field,
                format!("expected number, got {}", value.type_name()),
            ))
        }
    }

    /// Append the numeric field `name` of `record`.
    pub fn push_field(&mut self, record: &Record, name: &str) -> Result<()> {
        let value = record.require_number(name)?;
        self.push_number(name, value)
    }

    /// Append the text field `name` of `record`.
    pub fn push_text_field(&mut self, record: &Record, name: &str) -> Result<()> {
        let text = record.require_str(name)?;
        self.cells.push(text.to_string());
        Ok(())
    }

    /// Number of cells appended so far.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell was appended.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The finished cells, in column order.
    pub fn finish(self) -> Vec<String> {
        self.cells
    }
}
