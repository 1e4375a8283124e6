// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::{json, Value};

// ============================================================================
// Recording Fixtures
// ============================================================================

/// Sensor type ids used by the fixtures.
pub const BAROMETER: u16 = 247;
pub const WIFI: u16 = 282;
pub const BLUETOOTH: u16 = 283;
pub const SLAM_IMU: u16 = 1202;
pub const SLAM_MAGNETOMETER: u16 = 1203;
/// A camera stream; never exported.
pub const CAMERA: u16 = 214;

/// Authors MCAP recordings with JSON sensor payloads.
pub struct RecordingBuilder {
    writer: mcap::Writer<BufWriter<File>>,
    schema_id: u16,
    sequence: u32,
}

impl RecordingBuilder {
    /// Create a recording at `path`.
    pub fn create(path: &Path) -> Self {
        let file = File::create(path).expect("create recording");
        let mut writer = mcap::Writer::new(BufWriter::new(file)).expect("start recording");
        let schema_id = writer
            .add_schema("SensorRecord", "jsonschema", b"{}")
            .expect("add schema");
        Self {
            writer,
            schema_id,
            sequence: 0,
        }
    }

    /// Add a stream named `<type>-<instance>`.
    pub fn stream(&mut self, type_id: u16, instance: u32) -> u16 {
        self.channel(&format!("{type_id}-{instance}"), &[])
    }

    /// Add a channel with explicit metadata.
    pub fn channel(&mut self, topic: &str, metadata: &[(&str, &str)]) -> u16 {
        let metadata: BTreeMap<String, String> = metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.writer
            .add_channel(self.schema_id, topic, "json", &metadata)
            .expect("add channel")
    }

    /// Write one JSON record.
    pub fn record(&mut self, channel: u16, log_time: u64, payload: Value) -> &mut Self {
        let data = serde_json::to_vec(&payload).expect("serialize payload");
        self.raw(channel, log_time, &data)
    }

    /// Write raw payload bytes.
    pub fn raw(&mut self, channel: u16, log_time: u64, data: &[u8]) -> &mut Self {
        self.sequence += 1;
        self.writer
            .write_to_known_channel(
                &mcap::records::MessageHeader {
                    channel_id: channel,
                    sequence: self.sequence,
                    log_time,
                    publish_time: log_time,
                },
                data,
            )
            .expect("write message");
        self
    }

    /// Finish the recording.
    pub fn finish(mut self) {
        self.writer.finish().expect("finish recording");
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Motion configuration record.
pub fn motion_config(accel: bool, gyro: bool, mag: bool) -> Value {
    json!({
        "record_type": "configuration",
        "has_accelerometer": accel,
        "has_gyroscope": gyro,
        "has_magnetometer": mag,
    })
}

/// Motion data record.
pub fn motion_data(t: u64, accel: &[f64], gyro: &[f64], mag: &[f64]) -> Value {
    json!({
        "record_type": "data",
        "capture_timestamp_ns": t,
        "accel_msec2": accel,
        "gyro_radsec": gyro,
        "mag_tesla": mag,
    })
}

/// Configuration record without fields.
pub fn plain_config() -> Value {
    json!({ "record_type": "configuration" })
}

/// Wi-Fi beacon data record.
pub fn wifi_data(t: u64, ssid: &str, bssid: &str, freq: i64, rssi: i64) -> Value {
    json!({
        "record_type": "data",
        "board_timestamp_ns": t,
        "ssid": ssid,
        "bssid_mac": bssid,
        "freq_mhz": freq,
        "rssi": rssi,
    })
}

/// Bluetooth beacon data record.
pub fn ble_data(t: u64, id: &str, rssi: i64, freq: i64) -> Value {
    json!({
        "record_type": "data",
        "board_timestamp_ns": t,
        "unique_id": id,
        "rssi": rssi,
        "freq_mhz": freq,
    })
}

/// Barometer data record.
pub fn baro_data(t: u64, pressure: f64, altitude: f64) -> Value {
    json!({
        "record_type": "data",
        "capture_timestamp_ns": t,
        "pressure": pressure,
        "altitude": altitude,
    })
}

/// State record; present in recordings, never exported.
pub fn state_record() -> Value {
    json!({ "record_type": "state", "uptime_s": 12 })
}

// ============================================================================
// Assertions
// ============================================================================

/// Read an output file.
pub fn read_csv(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

/// Names of all CSV files in `dir`, sorted.
pub fn csv_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read output dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".csv"))
        .collect();
    names.sort();
    names
}
