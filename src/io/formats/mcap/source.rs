// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MCAP record source using the mcap crate.
//!
//! Each MCAP channel is one sensor stream. The stream's recordable type is
//! read from the channel metadata key `recordable_type_id`, or from a topic
//! of the form `<typeId>-<instanceId>`. Payloads are JSON records (see
//! [`JsonRecordDecoder`]).
//!
//! Channels are discovered from the summary section when present; files
//! without a usable summary are scanned once at open time.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use tracing::{debug, warn};

use crate::encoding::json::JsonRecordDecoder;
use crate::io::metadata::{ReplayStats, StreamId, StreamInfo};
use crate::io::traits::RecordSource;
use crate::sensor::SensorType;
use crate::{ExportError, Record, Result};

/// Channel metadata key holding the numeric recordable type.
pub const RECORDABLE_TYPE_KEY: &str = "recordable_type_id";
/// Channel metadata key holding the stream instance id.
pub const INSTANCE_ID_KEY: &str = "instance_id";

/// A channel as seen during discovery.
#[derive(Debug, Clone)]
struct ChannelEntry {
    id: u16,
    topic: String,
    encoding: String,
    metadata: BTreeMap<String, String>,
    message_count: u64,
}

/// Record source over a memory-mapped MCAP file.
pub struct McapRecordSource {
    /// File path
    path: String,
    /// Memory-mapped file
    mmap: memmap2::Mmap,
    /// Discovered sensor streams, ordered by (type, instance)
    streams: Vec<StreamInfo>,
    /// Channel ID to stream identity
    channel_streams: HashMap<u16, StreamId>,
    /// Streams whose records are delivered on replay
    subscribed: HashSet<StreamId>,
    decoder: JsonRecordDecoder,
}

impl McapRecordSource {
    /// Open an MCAP recording and discover its sensor streams.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let file = File::open(path_ref).map_err(|e| ExportError::file_open(path_ref, e))?;

        // SAFETY: the mapping is read-only and lives as long as the source.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| ExportError::file_open(path_ref, format!("failed to mmap file: {e}")))?;

        let channels = match mcap::Summary::read(&mmap) {
            Ok(Some(summary)) => {
                let counts: BTreeMap<u16, u64> = summary
                    .stats
                    .as_ref()
                    .map(|stats| stats.channel_message_counts.clone())
                    .unwrap_or_default();

                summary
                    .channels
                    .values()
                    .map(|channel| ChannelEntry {
                        id: channel.id,
                        topic: channel.topic.clone(),
                        encoding: channel.message_encoding.clone(),
                        metadata: channel.metadata.clone(),
                        message_count: counts.get(&channel.id).copied().unwrap_or(0),
                    })
                    .collect()
            }
            Ok(None) => {
                debug!(
                    context = "McapRecordSource",
                    path = %path_str,
                    "MCAP file has no summary section, scanning for channels"
                );
                Self::scan_channels(path_ref, &mmap)?
            }
            Err(e) => {
                warn!(
                    context = "McapRecordSource",
                    path = %path_str,
                    error = %e,
                    "Failed to read summary, scanning for channels"
                );
                Self::scan_channels(path_ref, &mmap)?
            }
        };

        let (streams, channel_streams) = assign_streams(&path_str, channels);

        Ok(Self {
            path: path_str,
            mmap,
            streams,
            channel_streams,
            subscribed: HashSet::new(),
            decoder: JsonRecordDecoder::new(),
        })
    }

    /// Scan the file to build channel information when no summary is available.
    fn scan_channels(path: &Path, mmap: &memmap2::Mmap) -> Result<Vec<ChannelEntry>> {
        let stream = mcap::MessageStream::new(mmap).map_err(|e| {
            ExportError::file_open(path, format!("not a readable MCAP file: {e}"))
        })?;

        let mut channels: BTreeMap<u16, ChannelEntry> = BTreeMap::new();
        for result in stream {
            let message = match result {
                Ok(m) => m,
                Err(e) => {
                    // Replay reports the failure; discovery keeps what it saw.
                    warn!(
                        context = "McapRecordSource",
                        error = %e,
                        "Error reading message during channel scan"
                    );
                    break;
                }
            };

            channels
                .entry(message.channel.id)
                .or_insert_with(|| ChannelEntry {
                    id: message.channel.id,
                    topic: message.channel.topic.clone(),
                    encoding: message.channel.message_encoding.clone(),
                    metadata: message.channel.metadata.clone(),
                    message_count: 0,
                })
                .message_count += 1;
        }

        Ok(channels.into_values().collect())
    }
}

impl RecordSource for McapRecordSource {
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
        let stream = mcap::MessageStream::new(&self.mmap)
            .map_err(|e| ExportError::source_failure(&self.path, e))?;

        for result in stream {
            let message = result.map_err(|e| ExportError::source_failure(&self.path, e))?;

            let Some(&id) = self.channel_streams.get(&message.channel.id) else {
                stats.skipped += 1;
                continue;
            };
            if !self.subscribed.contains(&id) {
                stats.skipped += 1;
                continue;
            }

            match self.decoder.decode(&message.data, message.log_time) {
                Ok(Some(record)) => {
                    visit(id, &record);
                    stats.delivered += 1;
                }
                Ok(None) => stats.skipped += 1,
                Err(e) => {
                    warn!(
                        context = "McapRecordSource",
                        stream = %id,
                        sequence = message.sequence,
                        error = %e,
                        "Skipping undecodable record"
                    );
                    stats.undecodable += 1;
                }
            }
        }

        Ok(stats)
    }

    fn close(&mut self) {
        self.subscribed.clear();
    }
}

/// Resolve channels to sensor streams and number instances per type.
fn assign_streams(
    path: &str,
    channels: Vec<ChannelEntry>,
) -> (Vec<StreamInfo>, HashMap<u16, StreamId>) {
    let mut by_type: BTreeMap<SensorType, Vec<(u32, ChannelEntry)>> = BTreeMap::new();

    for channel in channels {
        match sensor_identity(&channel.topic, &channel.metadata) {
            Some((sensor, instance_key)) => {
                if !channel.encoding.eq_ignore_ascii_case("json") {
                    warn!(
                        context = "McapRecordSource",
                        path,
                        topic = %channel.topic,
                        encoding = %channel.encoding,
                        "Sensor channel is not JSON encoded, its records will not decode"
                    );
                }
                by_type
                    .entry(sensor)
                    .or_default()
                    .push((instance_key, channel));
            }
            None => debug!(
                context = "McapRecordSource",
                path,
                topic = %channel.topic,
                "Channel carries no recordable type, ignoring"
            ),
        }
    }

    let mut streams = Vec::new();
    let mut channel_streams = HashMap::new();
    for (sensor, mut entries) in by_type {
        entries.sort_by_key(|(instance_key, channel)| (*instance_key, channel.id));
        for (index, (_, channel)) in entries.into_iter().enumerate() {
            let instance = u16::try_from(index).unwrap_or(u16::MAX);
            let id = StreamId::new(sensor, instance);
            channel_streams.insert(channel.id, id);
            streams.push(
                StreamInfo::new(id, channel.topic).with_record_count(channel.message_count),
            );
        }
    }

    (streams, channel_streams)
}

/// Recordable type and instance key of a channel.
///
/// Metadata wins over the topic name.
fn sensor_identity(topic: &str, metadata: &BTreeMap<String, String>) -> Option<(SensorType, u32)> {
    let (topic_type, topic_instance) = parse_numeric_name(topic).unzip();

    let sensor = match metadata.get(RECORDABLE_TYPE_KEY) {
        Some(raw) => raw.trim().parse::<u16>().ok().map(SensorType)?,
        None => topic_type.map(SensorType)?,
    };
    let instance = metadata
        .get(INSTANCE_ID_KEY)
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .or(topic_instance)
        .unwrap_or(0);

    Some((sensor, instance))
}

/// Parse a numeric stream name such as `1202-1` or `/1202-1`.
fn parse_numeric_name(topic: &str) -> Option<(u16, u32)> {
    let name = topic.trim_start_matches('/');
    let (type_id, instance) = name.split_once('-')?;
    Some((type_id.parse().ok()?, instance.parse().ok()?))
}
