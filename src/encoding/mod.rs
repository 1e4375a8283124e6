// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record payload decoding.
//!
//! - [`json`] - JSON-encoded sensor records

pub mod json;

pub use json::JsonRecordDecoder;
