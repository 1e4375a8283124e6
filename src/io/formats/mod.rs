// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Recording container implementations.
//!
//! - [`mcap`]: MCAP recordings with JSON sensor records

pub mod mcap;
