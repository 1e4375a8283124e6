// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format detection using magic numbers.
//!
//! Recordings are identified by their leading bytes rather than by file
//! extension, so a renamed or truncated file is reported as what it is.
//!
//! # Example
//!
//! ```rust,no_run
//! use sensorcsv::io::detection::detect_format;
//! use sensorcsv::io::metadata::FileFormat;
//!
//! let format = detect_format("recording.mcap")?;
//! assert_eq!(format, FileFormat::Mcap);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::io::formats::mcap::MCAP_MAGIC;
use crate::{ExportError, Result};

use super::metadata::FileFormat;

/// Detect the container format of a recording from its content.
///
/// Fails only if the file cannot be opened or read; an unrecognized
/// header yields `FileFormat::Unknown`.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<FileFormat> {
    let path_ref = path.as_ref();
    let mut file = File::open(path_ref).map_err(|e| ExportError::file_open(path_ref, e))?;

    let mut header = [0u8; 8];
    let mut n = 0;
    while n < header.len() {
        match file.read(&mut header[n..]) {
            Ok(0) => break,
            Ok(read) => n += read,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExportError::file_open(path_ref, e)),
        }
    }

    Ok(detect_from_magic(&header[..n]))
}

/// Classify a file header.
fn detect_from_magic(header: &[u8]) -> FileFormat {
    if header.len() >= MCAP_MAGIC.len() && header[..MCAP_MAGIC.len()] == MCAP_MAGIC {
        FileFormat::Mcap
    } else {
        FileFormat::Unknown
    }
}
