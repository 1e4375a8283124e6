// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Motion streams (IMU and magnetometer).
//!
//! The configuration record announces which of the three vector sensors are
//! present. Each present sensor contributes three columns, always in the
//! order accelerometer, gyroscope, magnetometer.

use super::row::{CsvSchema, RowBuilder};
use crate::{Record, Result};

/// Timestamp field of a motion sample.
pub const TIMESTAMP_FIELD: &str = "capture_timestamp_ns";

/// One vector sensor of a motion stream.
struct VectorSensor {
    /// Capability flag in the configuration record
    flag: &'static str,
    /// Vector field in data records
    field: &'static str,
    columns: [&'static str; 3],
}

static VECTOR_SENSORS: [VectorSensor; 3] = [
    VectorSensor {
        flag: "has_accelerometer",
        field: "accel_msec2",
        columns: ["accX", "accY", "accZ"],
    },
    VectorSensor {
        flag: "has_gyroscope",
        field: "gyro_radsec",
        columns: ["gyroX", "gyroY", "gyroZ"],
    },
    VectorSensor {
        flag: "has_magnetometer",
        field: "mag_tesla",
        columns: ["magX", "magY", "magZ"],
    },
];

/// Sensors present on a motion stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionCapabilities {
    pub accelerometer: bool,
    pub gyroscope: bool,
    pub magnetometer: bool,
}

impl MotionCapabilities {
    /// Read the capability flags of a configuration record.
    ///
    /// Missing flags read as absent.
    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            accelerometer: record.flag(VECTOR_SENSORS[0].flag)?,
            gyroscope: record.flag(VECTOR_SENSORS[1].flag)?,
            magnetometer: record.flag(VECTOR_SENSORS[2].flag)?,
        })
    }

    fn present(&self) -> [bool; 3] {
        [self.accelerometer, self.gyroscope, self.magnetometer]
    }

    fn sensors(&self) -> impl Iterator<Item = &'static VectorSensor> {
        VECTOR_SENSORS
            .iter()
            .zip(self.present())
            .filter_map(|(sensor, present)| present.then_some(sensor))
    }
}

pub(super) fn schema(caps: &MotionCapabilities) -> CsvSchema {
    let mut columns = vec!["timestamp"];
    for sensor in caps.sensors() {
        columns.extend(sensor.columns);
    }
    CsvSchema::new(columns)
}

pub(super) fn format_row(
    caps: &MotionCapabilities,
    record: &Record,
    row: &mut RowBuilder,
) -> Result<()> {
    row.push_field(record, TIMESTAMP_FIELD)?;
    for sensor in caps.sensors() {
        for (component, value) in record.require_vec3(sensor.field)?.into_iter().enumerate() {
            row.push_number(sensor.columns[component], value)?;
        }
    }
    Ok(())
}
