// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Sensorcsv
//!
//! Exports the low-rate sensor streams of device recordings to CSV.
//!
//! Each stream of a supported sensor family becomes one CSV file next to the
//! recording (or in a chosen output directory):
//!
//! | Family | Sensor types | File suffix |
//! |---|---|---|
//! | Motion | SLAM IMU (1202), SLAM magnetometer (1203) | `_IMU_<i>`, `_Magnet_<i>` |
//! | Wi-Fi beacon | 282 | `_Wifi_<i>` |
//! | Bluetooth beacon | 283 | `_BLE_<i>` |
//! | Barometer | 247 | `_Baro_<i>` |
//!
//! ## Architecture
//!
//! - `io/` - Recording sources ([`RecordSource`]), MCAP reader and CSV sinks
//! - `encoding/` - JSON record payload decoding
//! - `handler/` - Per-stream state machine and family row layouts
//! - `router` - Stream to output file routing and the per-file registry
//! - `runner` - Per-file run control and result reporting
//!
//! ## Example
//!
//! ```rust,no_run
//! use sensorcsv::{ExportConfig, RunController};
//!
//! let controller = RunController::new(ExportConfig::default());
//! let summary = controller.run(["walk.mcap"]);
//! println!("{} rows written", summary.rows_written());
//! ```

// Core types
pub mod core;

pub use core::{ExportError, FieldValue, Fields, Record, RecordKind, Result};

// Payload decoding
pub mod encoding;

// Sensor type classification
pub mod sensor;

pub use sensor::{FamilyTag, SensorFamily, SensorType};

// I/O types (sources, metadata, sinks)
pub mod io;

pub use io::metadata::{FileFormat, ReplayStats, StreamId, StreamInfo};
pub use io::traits::RecordSource;
pub use io::{open_source, CsvSink, McapRecordSource, MemoryRecordSource};

// Export pipeline
pub mod config;
pub mod handler;
pub mod router;
pub mod runner;

pub use config::{ExportConfig, ExportConfigBuilder};
pub use handler::{HandlerState, Outcome, SensorHandler};
pub use router::{OutputClaims, RouteDecision, RoutePlan, StreamRegistry, StreamRouter};
pub use runner::{process_file, FileResult, RunController, RunSummary};
