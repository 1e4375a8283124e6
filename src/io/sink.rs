// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Append-only CSV output for one stream.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, WriterBuilder};

use crate::{ExportError, Result};

/// Default write buffer size (64 KiB).
const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// CSV output destination owned by exactly one stream.
///
/// The file is created (truncating any previous content) when the sink is
/// constructed, so every routed stream gets a file even if no record ever
/// arrives. Records are buffered whole and only reach the destination in
/// complete lines; [`CsvSink::close`] flushes them.
///
/// Text cells are written verbatim unless `quote_text` is set, in which
/// case cells containing a delimiter, quote or line break are quoted.
pub struct CsvSink<W: Write = File> {
    /// Destination label used in errors and logs
    label: PathBuf,
    writer: csv::Writer<W>,
    /// Records accepted so far, header included
    lines: u64,
}

impl CsvSink<File> {
    /// Create (or truncate) the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P, quote_text: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ExportError::stream_open(path, e))?;
        Ok(Self::from_writer(path, file, quote_text))
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap an arbitrary writer.
    pub fn from_writer(label: impl Into<PathBuf>, writer: W, quote_text: bool) -> Self {
        Self::with_capacity(label, writer, quote_text, DEFAULT_BUFFER_SIZE)
    }

    /// Wrap an arbitrary writer with a buffer of `capacity` bytes.
    pub fn with_capacity(
        label: impl Into<PathBuf>,
        writer: W,
        quote_text: bool,
        capacity: usize,
    ) -> Self {
        let quote_style = if quote_text {
            QuoteStyle::Necessary
        } else {
            QuoteStyle::Never
        };
        let writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(quote_style)
            .buffer_capacity(capacity)
            .from_writer(writer);

        Self {
            label: label.into(),
            writer,
            lines: 0,
        }
    }

    /// Destination of this sink.
    pub fn path(&self) -> &Path {
        &self.label
    }

    /// Number of records written, header included.
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Append one record.
    ///
    /// Every record must have as many cells as the first one written.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(record)
            .map_err(|e| ExportError::io(format!("write {}", self.label.display()), e.into()))?;
        self.lines += 1;
        Ok(())
    }

    /// Flush buffered records to the destination.
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| ExportError::io(format!("flush {}", self.label.display()), e))
    }

    /// Flush and release the destination, returning the records written.
    pub fn close(mut self) -> Result<u64> {
        self.flush()?;
        Ok(self.lines)
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> Result<W> {
        let label = self.label;
        self.writer.into_inner().map_err(|e| {
            let err: io::Error = e.into_error();
            ExportError::io(format!("flush {}", label.display()), err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rejects its first `failures` writes, then records everything.
    struct FlakyWriter {
        failures: usize,
        written: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::new(io::ErrorKind::Other, "disk busy"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_records_in_memory() {
        let mut sink = CsvSink::from_writer("mem", Vec::new(), false);
        sink.write_record(["timestamp", "pressure", "altitude"]).unwrap();
        sink.write_record(["1", "101325", "12.5"]).unwrap();

        assert_eq!(sink.lines_written(), 2);
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(text, "timestamp,pressure,altitude\n1,101325,12.5\n");
    }

    #[test]
    fn test_text_verbatim_unless_quoting() {
        let mut plain = CsvSink::from_writer("mem", Vec::new(), false);
        plain.write_record(["1", "Cafe, 2nd floor", "say \"hi\""]).unwrap();
        assert_eq!(
            String::from_utf8(plain.into_inner().unwrap()).unwrap(),
            "1,Cafe, 2nd floor,say \"hi\"\n"
        );

        let mut quoted = CsvSink::from_writer("mem", Vec::new(), true);
        quoted.write_record(["1", "Cafe, 2nd floor", "say \"hi\"", "plain"]).unwrap();
        assert_eq!(
            String::from_utf8(quoted.into_inner().unwrap()).unwrap(),
            "1,\"Cafe, 2nd floor\",\"say \"\"hi\"\"\",plain\n"
        );
    }

    #[test]
    fn test_failed_flush_keeps_lines_whole() {
        let writer = FlakyWriter {
            failures: 1,
            written: Vec::new(),
        };
        let mut sink = CsvSink::from_writer("flaky", writer, false);

        sink.write_record(["timestamp", "pressure", "altitude"]).unwrap();
        let err = sink.flush().unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));

        sink.write_record(["1", "101325", "12.5"]).unwrap();
        sink.flush().unwrap();

        let written = sink.into_inner().unwrap().written;
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "timestamp,pressure,altitude\n1,101325,12.5\n"
        );
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec_Baro_0.csv");
        std::fs::write(&path, "stale content\nfrom last run\n").unwrap();

        let sink = CsvSink::create(&path, false).unwrap();
        assert_eq!(sink.close().unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_close_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec_IMU_0.csv");

        let mut sink = CsvSink::create(&path, false).unwrap();
        sink.write_record(["timestamp"]).unwrap();
        sink.write_record(["42"]).unwrap();
        assert_eq!(sink.close().unwrap(), 2);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "timestamp\n42\n");
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("rec_BLE_0.csv");

        let err = CsvSink::create(&path, false).err().unwrap();
        assert!(matches!(err, ExportError::StreamOpen { .. }));
    }
}
