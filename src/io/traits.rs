// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The record source seam between container readers and the exporter.

use crate::{Record, Result};

use super::metadata::{ReplayStats, StreamId, StreamInfo};

/// Trait for replaying the sensor streams of an opened recording.
///
/// A source lists its streams, accepts subscriptions, and then replays
/// every record of every subscribed stream in container order. Records are
/// lent to the visitor for the duration of one call only.
///
/// # Example
///
/// ```no_run
/// use sensorcsv::io::traits::RecordSource;
///
/// fn count(source: &mut dyn RecordSource) -> sensorcsv::Result<u64> {
///     for stream in source.streams() {
///         source.subscribe(stream.id)?;
///     }
///     let mut n = 0;
///     source.replay_all(&mut |_id, _record| n += 1)?;
///     Ok(n)
/// }
/// ```
pub trait RecordSource {
    /// All streams in the recording, ordered by (type, instance).
    fn streams(&self) -> Vec<StreamInfo>;

    /// Subscribe to the records of one stream.
    ///
    /// Fails if the stream does not exist in this recording.
    fn subscribe(&mut self, stream: StreamId) -> Result<()>;

    /// Deliver every record of every subscribed stream, in source order.
    ///
    /// Returns when the recording is exhausted, or with
    /// [`ExportError::Source`](crate::ExportError::Source) when the
    /// container cannot be read any further.
    fn replay_all(&mut self, visit: &mut dyn FnMut(StreamId, &Record)) -> Result<ReplayStats>;

    /// Release the underlying container.
    fn close(&mut self) {}
}
