// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON decoder module.
//!
//! Provides decoding of JSON-encoded sensor record payloads.

pub mod decoder;

pub use decoder::{JsonRecordDecoder, RECORD_TYPE_FIELD};
