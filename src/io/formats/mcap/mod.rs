// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MCAP container support.
//!
//! Reading is delegated to the mcap crate; this module maps MCAP channels
//! onto sensor streams and decodes their JSON record payloads.

pub mod constants;
pub mod source;

pub use constants::MCAP_MAGIC;
pub use source::{McapRecordSource, INSTANCE_ID_KEY, RECORDABLE_TYPE_KEY};
