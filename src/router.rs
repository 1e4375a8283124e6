// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Stream routing.
//!
//! The [`StreamRouter`] decides, per stream of a recording, whether it is
//! exported and where its CSV file goes. Exported streams are subscribed on
//! the source and get a handler with a freshly created sink. The handlers of
//! one file live in a [`StreamRegistry`] keyed by [`StreamId`].
//!
//! [`OutputClaims`] remembers which input wrote each output file during a
//! run, so that two inputs sharing a file stem cannot overwrite each other.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ExportConfig;
use crate::handler::{HandlerState, HandlerStats, Outcome, SensorHandler};
use crate::io::metadata::{StreamId, StreamInfo};
use crate::io::sink::CsvSink;
use crate::io::traits::RecordSource;
use crate::sensor::FamilyTag;
use crate::{ExportError, Record, Result};

/// What the router does with one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Export to the given file
    Export { tag: FamilyTag, path: PathBuf },
    /// Sensor type has no exporter
    Unknown,
    /// Family excluded by configuration
    Filtered(FamilyTag),
}

/// Routing decision for one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub stream: StreamInfo,
    pub decision: RouteDecision,
}

/// Output files claimed during a run, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct OutputClaims {
    owners: HashMap<PathBuf, PathBuf>,
}

impl OutputClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path` for `input`.
    ///
    /// Fails if a different input already claimed it. The same input may
    /// claim its own outputs again.
    pub fn claim(&mut self, path: &Path, input: &Path) -> Result<()> {
        match self.owners.get(path) {
            Some(owner) if owner != input => Err(ExportError::stream_open(
                path,
                format!("already written from {}", owner.display()),
            )),
            Some(_) => Ok(()),
            None => {
                self.owners.insert(path.to_path_buf(), input.to_path_buf());
                Ok(())
            }
        }
    }

    /// Forget every claim.
    pub fn clear(&mut self) {
        self.owners.clear();
    }

    /// Number of claimed paths.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Maps streams of a recording to output files.
#[derive(Debug, Clone, Copy)]
pub struct StreamRouter<'a> {
    config: &'a ExportConfig,
}

impl<'a> StreamRouter<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// Output file of stream `instance` of family `tag` read from `input`.
    ///
    /// `<input without extension>_<tag>_<instance>.csv`, or the same file
    /// name inside the configured output directory.
    pub fn output_path(&self, input: &Path, tag: FamilyTag, instance: u16) -> PathBuf {
        let suffix = format!("_{}_{}.csv", tag.as_str(), instance);
        let base = match &self.config.output_dir {
            Some(dir) => dir.join(input.file_stem().unwrap_or(input.as_os_str())),
            None => input.with_extension(""),
        };
        let mut name = OsString::from(base);
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Decide the route of one stream.
    pub fn decide(&self, input: &Path, stream: StreamId) -> RouteDecision {
        match stream.sensor.tag() {
            None => RouteDecision::Unknown,
            Some(tag) if !self.config.allows(tag) => RouteDecision::Filtered(tag),
            Some(tag) => RouteDecision::Export {
                tag,
                path: self.output_path(input, tag, stream.instance),
            },
        }
    }

    /// Routing decisions for all streams, in stream order.
    pub fn plan(&self, input: &Path, streams: &[StreamInfo]) -> Vec<RoutePlan> {
        streams
            .iter()
            .map(|stream| RoutePlan {
                stream: stream.clone(),
                decision: self.decide(input, stream.id),
            })
            .collect()
    }

    /// Subscribe the exported streams of `source` and create their handlers.
    ///
    /// A stream whose sink cannot be created is skipped; the remaining
    /// streams are still wired.
    pub fn wire(&self, input: &Path, source: &mut dyn RecordSource) -> StreamRegistry {
        self.wire_with(input, source, &mut OutputClaims::new())
    }

    /// Like [`StreamRouter::wire`], refusing outputs that `claims` holds for
    /// another input.
    pub fn wire_with(
        &self,
        input: &Path,
        source: &mut dyn RecordSource,
        claims: &mut OutputClaims,
    ) -> StreamRegistry {
        let mut registry = StreamRegistry::new();

        for plan in self.plan(input, &source.streams()) {
            let id = plan.stream.id;
            let (tag, path) = match plan.decision {
                RouteDecision::Export { tag, path } => (tag, path),
                RouteDecision::Unknown => {
                    debug!(
                        context = "StreamRouter",
                        stream = %id,
                        sensor = %id.sensor,
                        "No exporter for sensor type, skipping stream"
                    );
                    registry.skip();
                    continue;
                }
                RouteDecision::Filtered(tag) => {
                    debug!(
                        context = "StreamRouter",
                        stream = %id,
                        %tag,
                        "Family not selected, skipping stream"
                    );
                    registry.skip();
                    continue;
                }
            };

            let opened = claims
                .claim(&path, input)
                .and_then(|()| self.open_handler(id, &path, source));
            match opened {
                Ok(handler) => {
                    debug!(
                        context = "StreamRouter",
                        stream = %id,
                        %tag,
                        path = %path.display(),
                        "Stream routed"
                    );
                    registry.insert(handler);
                }
                Err(e) => {
                    warn!(
                        context = "StreamRouter",
                        stream = %id,
                        path = %path.display(),
                        kind = e.kind(),
                        details = ?e.log_fields(),
                        "Cannot open output, skipping stream"
                    );
                    registry.skip();
                    registry.record_error(e);
                }
            }
        }

        registry
    }

    fn open_handler(
        &self,
        id: StreamId,
        path: &Path,
        source: &mut dyn RecordSource,
    ) -> Result<SensorHandler> {
        source
            .subscribe(id)
            .map_err(|e| ExportError::stream_open(path, e))?;
        let sink = CsvSink::create(path, self.config.quote_text)?;
        SensorHandler::new(id, sink)
    }
}

/// Final counters of a registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryReport {
    pub streams_processed: usize,
    pub streams_skipped: usize,
    pub rows_written: u64,
    pub records_rejected: u64,
    pub records_discarded: u64,
    pub configurations_ignored: u64,
    pub errors: Vec<ExportError>,
}

/// Handlers of one recording, keyed by stream.
pub struct StreamRegistry<W: Write = File> {
    handlers: BTreeMap<StreamId, SensorHandler<W>>,
    skipped: usize,
    errors: Vec<ExportError>,
}

impl<W: Write> Default for StreamRegistry<W> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
            skipped: 0,
            errors: Vec::new(),
        }
    }
}

impl<W: Write> StreamRegistry<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for its stream, replacing any previous one.
    pub fn insert(&mut self, handler: SensorHandler<W>) {
        self.handlers.insert(handler.stream(), handler);
    }

    /// Count a stream that gets no handler.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Keep an error for the file report.
    pub fn record_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Streams with a handler, in order.
    pub fn streams(&self) -> impl Iterator<Item = StreamId> + '_ {
        self.handlers.keys().copied()
    }

    pub fn handler(&self, stream: StreamId) -> Option<&SensorHandler<W>> {
        self.handlers.get(&stream)
    }

    /// Hand a record to the handler of its stream.
    ///
    /// Records of streams without a handler are ignored. Rejected records
    /// are logged and counted by their handler; output failures are kept
    /// and end the stream.
    pub fn dispatch(&mut self, stream: StreamId, record: &Record) -> Option<Outcome> {
        let handler = self.handlers.get_mut(&stream)?;
        match handler.handle(record) {
            Ok(outcome) => Some(outcome),
            Err(e @ ExportError::Format { .. }) => {
                warn!(
                    context = "StreamRegistry",
                    stream = %stream,
                    kind = %record.kind,
                    timestamp_ns = record.timestamp_ns,
                    error = %e,
                    "Skipping record"
                );
                None
            }
            Err(e) => {
                warn!(
                    context = "StreamRegistry",
                    stream = %stream,
                    kind = e.kind(),
                    details = ?e.log_fields(),
                    "Failed to write record"
                );
                self.errors.push(e);
                None
            }
        }
    }

    /// Close every sink and sum up.
    pub fn finish(self) -> RegistryReport {
        let mut report = RegistryReport {
            streams_skipped: self.skipped,
            errors: self.errors,
            ..Default::default()
        };

        for (stream, handler) in self.handlers {
            let stats = handler.stats();
            add_stats(&mut report, &stats);
            let failed = handler.state() == HandlerState::Failed;
            match handler.finish() {
                Ok(_) if failed => {}
                Ok(_) => report.streams_processed += 1,
                Err(e) => {
                    warn!(
                        context = "StreamRegistry",
                        stream = %stream,
                        error = %e,
                        "Failed to close output"
                    );
                    report.errors.push(e);
                }
            }
        }

        report
    }
}

fn add_stats(report: &mut RegistryReport, stats: &HandlerStats) {
    report.rows_written += stats.rows;
    report.records_rejected += stats.rejected;
    report.records_discarded += stats.discarded;
    report.configurations_ignored += stats.ignored_configurations;
}
