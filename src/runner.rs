// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Export run control.
//!
//! Every input file is processed on its own: open, route streams, replay all
//! records in source order, close the outputs. Failures are contained to
//! the smallest unit they affect:
//!
//! - a record that cannot be formatted is dropped;
//! - a stream whose output cannot be opened, or fails while writing, is
//!   skipped;
//! - a file that cannot be opened, or whose source fails mid-replay, is
//!   reported and the run moves on to the next file.
//!
//! Output files are claimed per run: a second input that would write a file
//! already written from another input keeps its streams unexported.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::ExportConfig;
use crate::io::open_source;
use crate::io::traits::RecordSource;
use crate::router::{OutputClaims, StreamRouter};
use crate::ExportError;

/// Outcome of exporting one input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileResult {
    /// Input path
    pub input: PathBuf,
    /// Streams with an output file that was closed cleanly
    pub streams_processed: usize,
    /// Streams without output (unknown, filtered or unopenable)
    pub streams_skipped: usize,
    /// Data rows written over all streams
    pub rows_written: u64,
    /// Records dropped with a format error
    pub records_rejected: u64,
    /// Records the source could not decode
    pub records_undecodable: u64,
    /// Records dropped after their stream's output failed
    pub records_discarded: u64,
    /// File, stream and output errors
    pub errors: Vec<ExportError>,
    /// Replay stopped early on a source failure
    pub aborted: bool,
}

impl FileResult {
    fn new(input: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            ..Default::default()
        }
    }

    /// Whether the file was opened at all.
    pub fn opened(&self) -> bool {
        !self
            .errors
            .iter()
            .any(|e| matches!(e, ExportError::FileOpen { .. }))
    }

    /// Whether the file exported without any error.
    pub fn is_success(&self) -> bool {
        !self.aborted && self.errors.is_empty()
    }
}

/// Aggregated outcome of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub files: Vec<FileResult>,
}

impl RunSummary {
    /// Files that exported without any error.
    pub fn files_succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    /// Files with at least one error.
    pub fn files_failed(&self) -> usize {
        self.files.len() - self.files_succeeded()
    }

    pub fn rows_written(&self) -> u64 {
        self.files.iter().map(|f| f.rows_written).sum()
    }

    pub fn records_rejected(&self) -> u64 {
        self.files.iter().map(|f| f.records_rejected).sum()
    }
}

/// Drives the export of input files.
#[derive(Debug, Clone, Default)]
pub struct RunController {
    config: ExportConfig,
    claims: RefCell<OutputClaims>,
}

impl RunController {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            claims: RefCell::default(),
        }
    }

    /// Export every file in order.
    pub fn run<I, P>(&self, paths: I) -> RunSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.run_with(paths, |_| {})
    }

    /// Export every file in order, calling `on_file` after each one.
    ///
    /// Output claims of earlier runs are forgotten.
    pub fn run_with<I, P, F>(&self, paths: I, mut on_file: F) -> RunSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
        F: FnMut(&FileResult),
    {
        self.claims.borrow_mut().clear();
        let mut summary = RunSummary::default();
        for path in paths {
            let result = self.process_file(path.as_ref());
            on_file(&result);
            summary.files.push(result);
        }
        summary
    }

    /// Export one recording file.
    pub fn process_file(&self, path: &Path) -> FileResult {
        let mut source = match open_source(path) {
            Ok(source) => source,
            Err(e) => {
                error!(
                    context = "RunController",
                    input = %path.display(),
                    kind = e.kind(),
                    details = ?e.log_fields(),
                    "Cannot open recording, skipping file"
                );
                let mut result = FileResult::new(path);
                result.errors.push(e);
                return result;
            }
        };
        self.process_source(path, source.as_mut())
    }

    /// Export the streams of an already opened source.
    ///
    /// `input` names the recording and determines the output paths.
    pub fn process_source(&self, input: &Path, source: &mut dyn RecordSource) -> FileResult {
        let mut result = FileResult::new(input);

        let mut registry = {
            let mut claims = self.claims.borrow_mut();
            StreamRouter::new(&self.config).wire_with(input, source, &mut claims)
        };
        let replay = source.replay_all(&mut |stream, record| {
            registry.dispatch(stream, record);
        });
        source.close();

        // Outputs are closed whether or not the replay finished.
        let report = registry.finish();
        result.streams_processed = report.streams_processed;
        result.streams_skipped = report.streams_skipped;
        result.rows_written = report.rows_written;
        result.records_rejected = report.records_rejected;
        result.records_discarded = report.records_discarded;
        result.errors = report.errors;

        match replay {
            Ok(stats) => {
                result.records_undecodable = stats.undecodable;
                if stats.undecodable > 0 {
                    warn!(
                        context = "RunController",
                        input = %input.display(),
                        count = stats.undecodable,
                        "Some records could not be decoded"
                    );
                }
            }
            Err(e) => {
                error!(
                    context = "RunController",
                    input = %input.display(),
                    kind = e.kind(),
                    details = ?e.log_fields(),
                    rows_kept = result.rows_written,
                    "Recording failed mid-replay, aborting file"
                );
                result.aborted = e.is_fatal_for_file();
                result.errors.push(e);
            }
        }

        info!(
            context = "RunController",
            input = %input.display(),
            streams = result.streams_processed,
            skipped = result.streams_skipped,
            rows = result.rows_written,
            rejected = result.records_rejected,
            "Processed {}: {} streams, {} rows, {} rejected records",
            input.display(),
            result.streams_processed,
            result.rows_written,
            result.records_rejected
        );

        result
    }
}

/// Export one recording file with `config`.
pub fn process_file<P: AsRef<Path>>(path: P, config: &ExportConfig) -> FileResult {
    RunController::new(config.clone()).process_file(path.as_ref())
}
