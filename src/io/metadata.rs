// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shared metadata types for recording sources.

use std::fmt;

use crate::sensor::SensorType;

/// Identity of one sensor stream inside a recording.
///
/// The instance index is the 0-based position of the stream among the
/// streams of the same sensor type in that recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId {
    /// Recordable type of the stream
    pub sensor: SensorType,
    /// Instance index among streams of the same type
    pub instance: u16,
}

impl StreamId {
    /// Create a new stream identity.
    pub fn new(sensor: SensorType, instance: u16) -> Self {
        Self { sensor, instance }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.sensor.id(), self.instance)
    }
}

/// Information about a stream discovered in a recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Stream identity
    pub id: StreamId,
    /// Name of the stream inside the container (topic, channel name)
    pub name: String,
    /// Number of records in this stream (0 if unknown)
    pub record_count: u64,
}

impl StreamInfo {
    /// Create a new StreamInfo.
    pub fn new(id: StreamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            record_count: 0,
        }
    }

    /// Set the record count.
    pub fn with_record_count(mut self, count: u64) -> Self {
        self.record_count = count;
        self
    }
}

/// Counters reported by a finished replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Records handed to subscribers
    pub delivered: u64,
    /// Records of unsubscribed streams or non-exported kinds
    pub skipped: u64,
    /// Records whose payload could not be decoded
    pub undecodable: u64,
}

/// Recording container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// MCAP container
    Mcap,
    /// Unknown format
    Unknown,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Mcap => f.write_str("MCAP"),
            FileFormat::Unknown => f.write_str("Unknown"),
        }
    }
}
