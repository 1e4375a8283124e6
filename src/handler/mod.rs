// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-stream record handlers.
//!
//! A [`SensorHandler`] consumes the records of exactly one stream and writes
//! them through the stream's [`CsvSink`]. All four sensor families share one
//! state machine:
//!
//! ```text
//! Uninitialized --configuration--> Configured --data--> Emitting
//! (any state) --output error--> Failed
//! ```
//!
//! The first configuration record freezes the column schema and writes the
//! header. Later configuration records are ignored so that every row of a
//! file has the same width. Data records before any configuration are
//! rejected with a format error. Once the output fails, the remaining
//! records of the stream are discarded.
//!
//! Family specific column layouts live in [`motion`], [`wifi`],
//! [`bluetooth`] and [`barometer`].

pub mod barometer;
pub mod bluetooth;
pub mod motion;
pub mod row;
pub mod wifi;

use std::fmt;
use std::fs::File;
use std::io::Write;

use tracing::{debug, warn};

use crate::io::metadata::StreamId;
use crate::io::sink::CsvSink;
use crate::sensor::SensorFamily;
use crate::{ExportError, Record, RecordKind, Result};

pub use motion::MotionCapabilities;
pub use row::{CsvSchema, RowBuilder};

/// Lifecycle state of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// No configuration seen yet
    Uninitialized,
    /// Schema frozen, header written
    Configured,
    /// At least one row written
    Emitting,
    /// Output failed; records are discarded
    Failed,
}

impl fmt::Display for HandlerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerState::Uninitialized => f.write_str("uninitialized"),
            HandlerState::Configured => f.write_str("configured"),
            HandlerState::Emitting => f.write_str("emitting"),
            HandlerState::Failed => f.write_str("failed"),
        }
    }
}

/// What a handler did with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First configuration: schema frozen and header written
    HeaderWritten,
    /// Configuration after the schema was frozen; nothing written
    ConfigurationIgnored,
    /// One data row written
    RowWritten,
    /// Output already failed; nothing written
    Discarded,
}

/// Counters kept by a handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerStats {
    /// Data rows written
    pub rows: u64,
    /// Records rejected with a format error
    pub rejected: u64,
    /// Configuration records ignored after freeze
    pub ignored_configurations: u64,
    /// Records dropped after an output failure
    pub discarded: u64,
}

/// Frozen row layout of a configured stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowLayout {
    Motion(MotionCapabilities),
    WifiBeacon,
    BluetoothBeacon,
    Barometer,
}

impl RowLayout {
    /// Derive the layout from a stream's first configuration record.
    fn configure(family: SensorFamily, record: &Record) -> Result<Self> {
        match family {
            SensorFamily::Motion => {
                Ok(RowLayout::Motion(MotionCapabilities::from_record(record)?))
            }
            SensorFamily::WifiBeacon => Ok(RowLayout::WifiBeacon),
            SensorFamily::BluetoothBeacon => Ok(RowLayout::BluetoothBeacon),
            SensorFamily::Barometer => Ok(RowLayout::Barometer),
            SensorFamily::Unknown => {
                Err(ExportError::config("no row layout for unknown sensor family"))
            }
        }
    }

    fn schema(&self) -> CsvSchema {
        match self {
            RowLayout::Motion(caps) => motion::schema(caps),
            RowLayout::WifiBeacon => wifi::schema(),
            RowLayout::BluetoothBeacon => bluetooth::schema(),
            RowLayout::Barometer => barometer::schema(),
        }
    }

    fn format_row(&self, record: &Record, row: &mut RowBuilder) -> Result<()> {
        match self {
            RowLayout::Motion(caps) => motion::format_row(caps, record, row),
            RowLayout::WifiBeacon => wifi::format_row(record, row),
            RowLayout::BluetoothBeacon => bluetooth::format_row(record, row),
            RowLayout::Barometer => barometer::format_row(record, row),
        }
    }
}

/// Record handler for one stream, owning that stream's sink.
pub struct SensorHandler<W: Write = File> {
    stream: StreamId,
    family: SensorFamily,
    state: HandlerState,
    layout: Option<RowLayout>,
    schema: Option<CsvSchema>,
    sink: CsvSink<W>,
    stats: HandlerStats,
}

impl<W: Write> SensorHandler<W> {
    /// Create a handler for `stream` writing through `sink`.
    ///
    /// Fails for streams whose sensor family is not exported.
    pub fn new(stream: StreamId, sink: CsvSink<W>) -> Result<Self> {
        let family = stream.sensor.family();
        if !family.is_known() {
            return Err(ExportError::config(format!(
                "no handler for sensor type {}",
                stream.sensor
            )));
        }

        Ok(Self {
            stream,
            family,
            state: HandlerState::Uninitialized,
            layout: None,
            schema: None,
            sink,
            stats: HandlerStats::default(),
        })
    }

    /// Stream this handler is bound to.
    pub fn stream(&self) -> StreamId {
        self.stream
    }

    /// Sensor family of the stream.
    pub fn family(&self) -> SensorFamily {
        self.family
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HandlerState {
        self.state
    }

    /// Frozen schema, once configured.
    pub fn schema(&self) -> Option<&CsvSchema> {
        self.schema.as_ref()
    }

    /// Counters so far.
    pub fn stats(&self) -> HandlerStats {
        self.stats
    }

    /// Handle one record of this handler's stream.
    ///
    /// A format error leaves the output untouched and the handler usable
    /// for the next record. An output error is returned once; the handler
    /// then discards every later record.
    pub fn handle(&mut self, record: &Record) -> Result<Outcome> {
        if self.state == HandlerState::Failed {
            self.stats.discarded += 1;
            return Ok(Outcome::Discarded);
        }

        let result = match record.kind {
            RecordKind::Configuration => self.on_configuration(record),
            RecordKind::Data => self.on_data(record),
        };
        match &result {
            Err(ExportError::Format { .. }) => self.stats.rejected += 1,
            Err(e @ ExportError::Io { .. }) => {
                warn!(
                    stream = %self.stream,
                    path = %self.sink.path().display(),
                    error = %e,
                    "Output failed, discarding the rest of the stream"
                );
                self.state = HandlerState::Failed;
            }
            _ => {}
        }
        result
    }

    fn on_configuration(&mut self, record: &Record) -> Result<Outcome> {
        if self.state != HandlerState::Uninitialized {
            self.stats.ignored_configurations += 1;
            debug!(
                stream = %self.stream,
                state = %self.state,
                "Schema already frozen, ignoring configuration record"
            );
            return Ok(Outcome::ConfigurationIgnored);
        }

        let layout = RowLayout::configure(self.family, record)?;
        let schema = layout.schema();
        self.sink.write_record(schema.columns())?;

        debug!(
            stream = %self.stream,
            columns = schema.len(),
            "Schema frozen"
        );
        self.layout = Some(layout);
        self.schema = Some(schema);
        self.state = HandlerState::Configured;
        Ok(Outcome::HeaderWritten)
    }

    fn on_data(&mut self, record: &Record) -> Result<Outcome> {
        let Some(layout) = self.layout else {
            return Err(ExportError::format(
                "record_type",
                "data record before any configuration record",
            ));
        };

        let mut row = RowBuilder::new();
        layout.format_row(record, &mut row)?;
        self.sink.write_record(row.finish())?;

        self.stats.rows += 1;
        self.state = HandlerState::Emitting;
        Ok(Outcome::RowWritten)
    }

    /// Flush and close the sink.
    ///
    /// A failed sink is released without reporting its error again.
    pub fn finish(self) -> Result<HandlerStats> {
        if self.state != HandlerState::Failed {
            self.sink.close()?;
        }
        Ok(self.stats)
    }

    /// Release the sink.
    pub fn into_sink(self) -> CsvSink<W> {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorType;

    /// Writer whose every write fails.
    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn handler(sensor: SensorType) -> SensorHandler<Vec<u8>> {
        let sink = CsvSink::from_writer("mem", Vec::new(), false);
        SensorHandler::new(StreamId::new(sensor, 0), sink).unwrap()
    }

    fn output(handler: SensorHandler<Vec<u8>>) -> String {
        String::from_utf8(handler.into_sink().into_inner().unwrap()).unwrap()
    }

    fn motion_config(acc: bool, gyro: bool, mag: bool) -> Record {
        Record::configuration(0)
            .with_field("has_accelerometer", acc)
            .with_field("has_gyroscope", gyro)
            .with_field("has_magnetometer", mag)
    }

    fn imu_sample(t: i64, acc: Vec<f64>) -> Record {
        Record::data(0)
            .with_field("capture_timestamp_ns", t)
            .with_field("accel_msec2", acc)
            .with_field("gyro_radsec", vec![0.0f64, 0.0, 0.5])
            .with_field("mag_tesla", vec![1e-5f64, 2e-5, 3e-5])
    }

    #[test]
    fn test_unknown_family_rejected() {
        let sink = CsvSink::from_writer("mem", Vec::new(), false);
        assert!(SensorHandler::new(StreamId::new(SensorType(214), 0), sink).is_err());
    }

    #[test]
    fn test_state_transitions() {
        let mut h = handler(SensorType::BAROMETER);
        assert_eq!(h.state(), HandlerState::Uninitialized);

        assert_eq!(h.handle(&Record::configuration(0)).unwrap(), Outcome::HeaderWritten);
        assert_eq!(h.state(), HandlerState::Configured);

        let sample = Record::data(0)
            .with_field("capture_timestamp_ns", 5i64)
            .with_field("pressure", 101325.0f64)
            .with_field("altitude", 12.5f64);
        assert_eq!(h.handle(&sample).unwrap(), Outcome::RowWritten);
        assert_eq!(h.state(), HandlerState::Emitting);

        assert_eq!(output(h), "timestamp,pressure,altitude\n5,101325,12.5\n");
    }

    #[test]
    fn test_header_for_partial_motion_capabilities() {
        let mut h = handler(SensorType::SLAM_IMU);
        h.handle(&motion_config(true, false, true)).unwrap();
        assert_eq!(output(h), "timestamp,accX,accY,accZ,magX,magY,magZ\n");
    }

    #[test]
    fn test_n_rows_after_one_configuration() {
        let mut h = handler(SensorType::SLAM_IMU);
        h.handle(&motion_config(true, true, false)).unwrap();
        for t in 0..5 {
            h.handle(&imu_sample(t, vec![0.1, 0.2, 9.8])).unwrap();
        }
        assert_eq!(h.stats().rows, 5);

        let text = output(h);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "0,0.1,0.2,9.8,0,0,0.5");
        assert_eq!(lines[5], "4,0.1,0.2,9.8,0,0,0.5");
    }

    #[test]
    fn test_reconfiguration_keeps_frozen_schema() {
        let mut h = handler(SensorType::SLAM_IMU);
        h.handle(&motion_config(true, false, false)).unwrap();
        assert_eq!(
            h.handle(&motion_config(true, true, true)).unwrap(),
            Outcome::ConfigurationIgnored
        );
        h.handle(&imu_sample(7, vec![1.0, 2.0, 3.0])).unwrap();

        assert_eq!(h.stats().ignored_configurations, 1);
        assert_eq!(h.schema().map(|s| s.len()), Some(4));
        assert_eq!(output(h), "timestamp,accX,accY,accZ\n7,1,2,3\n");
    }

    #[test]
    fn test_malformed_vector_skips_only_that_record() {
        let mut h = handler(SensorType::SLAM_IMU);
        h.handle(&motion_config(true, false, false)).unwrap();

        let err = h.handle(&imu_sample(1, vec![0.1, 0.2])).unwrap_err();
        assert!(matches!(err, ExportError::Format { .. }));
        assert_eq!(h.stats().rejected, 1);

        h.handle(&imu_sample(2, vec![0.1, 0.2, 9.8])).unwrap();
        assert_eq!(output(h), "timestamp,accX,accY,accZ\n2,0.1,0.2,9.8\n");
    }

    #[test]
    fn test_data_before_configuration_rejected() {
        let mut h = handler(SensorType::WIFI_BEACON);
        let sample = Record::data(0)
            .with_field("board_timestamp_ns", 1000i64)
            .with_field("ssid", "Home")
            .with_field("bssid_mac", "AA:BB:CC:DD:EE:FF")
            .with_field("freq_mhz", 2412i64)
            .with_field("rssi", -50i64);

        let err = h.handle(&sample).unwrap_err();
        assert!(matches!(err, ExportError::Format { .. }));
        assert_eq!(h.state(), HandlerState::Uninitialized);

        h.handle(&Record::configuration(0)).unwrap();
        h.handle(&sample).unwrap();
        assert_eq!(
            output(h),
            "timestamp,ssid,bssid,freq,rssi\n1000,Home,AA:BB:CC:DD:EE:FF,2412,-50\n"
        );
    }

    #[test]
    fn test_invalid_motion_configuration_stays_uninitialized() {
        let mut h = handler(SensorType::SLAM_MAGNETOMETER);
        let bad = Record::configuration(0).with_field("has_magnetometer", "yes");
        assert!(h.handle(&bad).is_err());
        assert_eq!(h.state(), HandlerState::Uninitialized);

        h.handle(&motion_config(false, false, true)).unwrap();
        assert_eq!(output(h), "timestamp,magX,magY,magZ\n");
    }

    #[test]
    fn test_finish_reports_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec_Baro_0.csv");
        let sink = CsvSink::create(&path, false).unwrap();
        let mut h = SensorHandler::new(StreamId::new(SensorType::BAROMETER, 0), sink).unwrap();
        h.handle(&Record::configuration(0)).unwrap();

        let stats = h.finish().unwrap();
        assert_eq!(stats.rows, 0);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "timestamp,pressure,altitude\n"
        );
    }

    #[test]
    fn test_quoted_text_cells() {
        let sink = CsvSink::from_writer("mem", Vec::new(), true);
        let mut h = SensorHandler::new(StreamId::new(SensorType::WIFI_BEACON, 0), sink).unwrap();
        h.handle(&Record::configuration(0)).unwrap();
        let sample = Record::data(0)
            .with_field("board_timestamp_ns", 1000i64)
            .with_field("ssid", "Cafe, 2nd")
            .with_field("bssid_mac", "AA:BB:CC:DD:EE:FF")
            .with_field("freq_mhz", 2412i64)
            .with_field("rssi", -50i64);
        h.handle(&sample).unwrap();

        assert_eq!(
            output(h),
            "timestamp,ssid,bssid,freq,rssi\n1000,\"Cafe, 2nd\",AA:BB:CC:DD:EE:FF,2412,-50\n"
        );
    }

    #[test]
    fn test_header_write_failure_discards_stream() {
        // A tiny buffer forces the header out to the broken writer at once.
        let sink = CsvSink::with_capacity("broken", BrokenWriter, false, 8);
        let mut h = SensorHandler::new(StreamId::new(SensorType::BAROMETER, 0), sink).unwrap();

        let err = h.handle(&Record::configuration(0)).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
        assert_eq!(h.state(), HandlerState::Failed);

        let sample = Record::data(0)
            .with_field("capture_timestamp_ns", 5i64)
            .with_field("pressure", 101325.0f64)
            .with_field("altitude", 12.5f64);
        assert_eq!(h.handle(&sample).unwrap(), Outcome::Discarded);
        assert_eq!(h.handle(&Record::configuration(0)).unwrap(), Outcome::Discarded);

        let stats = h.finish().unwrap();
        assert_eq!(stats.discarded, 2);
        assert_eq!(stats.rejected, 0);
        assert_eq!(stats.rows, 0);
    }
}
