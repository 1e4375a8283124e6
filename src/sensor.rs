// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sensor identities: recordable types, families and output tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ExportError, Result};

/// Recordable type identifier of a stream, as stored in the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorType(pub u16);

impl SensorType {
    /// Barometer stream
    pub const BAROMETER: SensorType = SensorType(247);
    /// Wi-Fi beacon scan stream
    pub const WIFI_BEACON: SensorType = SensorType(282);
    /// Bluetooth beacon scan stream
    pub const BLUETOOTH_BEACON: SensorType = SensorType(283);
    /// Inertial measurement unit stream
    pub const SLAM_IMU: SensorType = SensorType(1202);
    /// Magnetometer stream
    pub const SLAM_MAGNETOMETER: SensorType = SensorType(1203);

    /// Numeric type identifier.
    pub fn id(&self) -> u16 {
        self.0
    }

    /// Human readable name of the recordable type.
    pub fn name(&self) -> &'static str {
        match *self {
            SensorType::BAROMETER => "BarometerRecordableClass",
            SensorType::WIFI_BEACON => "WifiBeaconRecordableClass",
            SensorType::BLUETOOTH_BEACON => "BluetoothBeaconRecordableClass",
            SensorType::SLAM_IMU => "SlamImuData",
            SensorType::SLAM_MAGNETOMETER => "SlamMagnetometerData",
            _ => "Unknown",
        }
    }

    /// Sensor family this type belongs to.
    pub fn family(&self) -> SensorFamily {
        match *self {
            SensorType::SLAM_IMU | SensorType::SLAM_MAGNETOMETER => SensorFamily::Motion,
            SensorType::WIFI_BEACON => SensorFamily::WifiBeacon,
            SensorType::BLUETOOTH_BEACON => SensorFamily::BluetoothBeacon,
            SensorType::BAROMETER => SensorFamily::Barometer,
            _ => SensorFamily::Unknown,
        }
    }

    /// Output file tag, or `None` for unsupported types.
    ///
    /// Motion streams split into `IMU` and `Magnet` by type.
    pub fn tag(&self) -> Option<FamilyTag> {
        match *self {
            SensorType::SLAM_IMU => Some(FamilyTag::Imu),
            SensorType::SLAM_MAGNETOMETER => Some(FamilyTag::Magnet),
            SensorType::WIFI_BEACON => Some(FamilyTag::Wifi),
            SensorType::BLUETOOTH_BEACON => Some(FamilyTag::Ble),
            SensorType::BAROMETER => Some(FamilyTag::Baro),
            _ => None,
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

/// Closed set of stream kinds the exporter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorFamily {
    /// Accelerometer / gyroscope / magnetometer samples
    Motion,
    /// Wi-Fi access point observations
    WifiBeacon,
    /// Bluetooth beacon observations
    BluetoothBeacon,
    /// Pressure and altitude samples
    Barometer,
    /// Anything else; skipped
    Unknown,
}

impl SensorFamily {
    /// Check whether streams of this family are exported.
    pub fn is_known(&self) -> bool {
        !matches!(self, SensorFamily::Unknown)
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorFamily::Motion => "motion",
            SensorFamily::WifiBeacon => "wifi_beacon",
            SensorFamily::BluetoothBeacon => "bluetooth_beacon",
            SensorFamily::Barometer => "barometer",
            SensorFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag used in output file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FamilyTag {
    /// `IMU`
    Imu,
    /// `Magnet`
    Magnet,
    /// `Wifi`
    Wifi,
    /// `BLE`
    Ble,
    /// `Baro`
    Baro,
}

impl FamilyTag {
    /// All tags, in output order.
    pub const ALL: [FamilyTag; 5] = [
        FamilyTag::Imu,
        FamilyTag::Magnet,
        FamilyTag::Wifi,
        FamilyTag::Ble,
        FamilyTag::Baro,
    ];

    /// Convert to the exact file name tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyTag::Imu => "IMU",
            FamilyTag::Magnet => "Magnet",
            FamilyTag::Wifi => "Wifi",
            FamilyTag::Ble => "BLE",
            FamilyTag::Baro => "Baro",
        }
    }
}

impl fmt::Display for FamilyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FamilyTag {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        FamilyTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                ExportError::config(format!(
                    "unknown family tag '{wanted}', expected one of IMU, Magnet, Wifi, BLE, Baro"
                ))
            })
    }
}

impl TryFrom<String> for FamilyTag {
    type Error = ExportError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<FamilyTag> for String {
    fn from(tag: FamilyTag) -> Self {
        tag.as_str().to_string()
    }
}
