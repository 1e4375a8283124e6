// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! In-memory record source.
//!
//! Holds streams and records built in code. Useful for driving the exporter
//! from other decoders, and for exercising it without a container file.
//!
//! ```
//! use sensorcsv::io::{MemoryRecordSource, RecordSource, StreamId};
//! use sensorcsv::sensor::SensorType;
//! use sensorcsv::Record;
//!
//! let baro = StreamId::new(SensorType::BAROMETER, 0);
//! let source = MemoryRecordSource::new("mem.rec")
//!     .with_stream(baro, "247-1")
//!     .with_record(baro, Record::configuration(0));
//! assert_eq!(source.streams().len(), 1);
//! ```

use std::collections::HashSet;

use crate::io::metadata::{ReplayStats, StreamId, StreamInfo};
use crate::io::traits::RecordSource;
use crate::{ExportError, Record, Result};

/// A recording held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    path: String,
    streams: Vec<StreamInfo>,
    records: Vec<(StreamId, Record)>,
    subscribed: HashSet<StreamId>,
    /// Fail the replay after this many records have been read
    fail_after: Option<usize>,
}

impl MemoryRecordSource {
    /// Create an empty source reporting `path` as its origin.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Declare a stream.
    pub fn with_stream(mut self, id: StreamId, name: impl Into<String>) -> Self {
        self.add_stream(id, name);
        self
    }

    /// Append a record to the replay sequence.
    pub fn with_record(mut self, stream: StreamId, record: Record) -> Self {
        self.push(stream, record);
        self
    }

    /// Make the replay fail with a source error after `n` records.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Declare a stream.
    pub fn add_stream(&mut self, id: StreamId, name: impl Into<String>) {
        if !self.streams.iter().any(|s| s.id == id) {
            self.streams.push(StreamInfo::new(id, name));
            self.streams.sort_by_key(|s| s.id);
        }
    }

    /// Append a record to the replay sequence.
    pub fn push(&mut self, stream: StreamId, record: Record) {
        if let Some(info) = self.streams.iter_mut().find(|s| s.id == stream) {
            info.record_count += 1;
        }
        self.records.push((stream, record));
    }

    /// Check whether a stream is subscribed.
    pub fn is_subscribed(&self, stream: StreamId) -> bool {
        self.subscribed.contains(&stream)
    }
}

impl RecordSource for MemoryRecordSource {
    fn streams(&self) -> Vec<StreamInfo> {
        self.streams.clone()
    }

    fn subscribe(&mut self, stream: StreamId) -> Result<()> {
        if !self.streams.iter().any(|s| s.id == stream) {
            return Err(ExportError::source_failure(
                &self.path,
                format!("no stream {stream} in recording"),
            ));
        }
        self.subscribed.insert(stream);
        Ok(())
    }

    fn replay_all(&mut self, visit: &mut dyn FnMut(StreamId, &Record)) -> Result<ReplayStats> {
        let mut stats = ReplayStats::default();
        for (read, (stream, record)) in self.records.iter().enumerate() {
            if self.fail_after == Some(read) {
                return Err(ExportError::source_failure(
                    &self.path,
                    format!("record {read} is unreadable"),
                ));
            }
            if self.subscribed.contains(stream) {
                visit(*stream, record);
                stats.delivered += 1;
            } else {
                stats.skipped += 1;
            }
        }
        Ok(stats)
    }

    fn close(&mut self) {
        self.subscribed.clear();
    }
}
