// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout sensorcsv.
//!
//! This module provides the foundational types for the library:
//! - [`ExportError`] - Error taxonomy scoped by file, stream and record
//! - [`FieldValue`] - Typed record field values
//! - [`Record`] - One configuration or data record of a stream

pub mod error;
pub mod record;
pub mod value;

pub use error::{ExportError, Result};
pub use record::{Record, RecordKind};
pub use value::{FieldValue, Fields};
