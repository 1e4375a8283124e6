// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer: recording sources and CSV sinks.
//!
//! Recordings are read through the [`RecordSource`] trait; the container
//! format is detected from the file content by [`open_source`].

pub mod detection;
pub mod formats;
pub mod memory;
pub mod metadata;
pub mod sink;
pub mod traits;

use std::path::Path;

use tracing::debug;

use crate::{ExportError, Result};

// Re-exports
pub use detection::detect_format;
pub use formats::mcap::McapRecordSource;
pub use memory::MemoryRecordSource;
pub use metadata::{FileFormat, ReplayStats, StreamId, StreamInfo};
pub use sink::CsvSink;
pub use traits::RecordSource;

/// Open a recording with automatic format detection.
///
/// # Example
///
/// ```rust,no_run
/// use sensorcsv::io::open_source;
///
/// let source = open_source("recording.mcap")?;
/// for stream in source.streams() {
///     println!("{} {}", stream.id, stream.name);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn open_source<P: AsRef<Path>>(path: P) -> Result<Box<dyn RecordSource>> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    debug!(path = %path.display(), %format, "Detected recording format");

    match format {
        FileFormat::Mcap => Ok(Box::new(McapRecordSource::open(path)?)),
        FileFormat::Unknown => Err(ExportError::file_open(
            path,
            "unrecognized recording format",
        )),
    }
}
