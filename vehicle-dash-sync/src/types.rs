//! Core types for the status synchronizer library
//!
//! This module defines the status enums and per-endpoint snapshot DTOs the
//! synchronizer consumes. Snapshots are parsed and validated up front - a
//! payload with a missing or unknown field is a `SyncError::Payload`, never a
//! half-populated snapshot that would diff as "changed" against the cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Timestamp type used throughout the synchronizer
pub type Timestamp = DateTime<Utc>;

/// Result type for synchronizer operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while fetching or applying status snapshots
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: status {0}")]
    Http(u16),

    #[error("Malformed payload: {0}")]
    Payload(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Payload(err.to_string())
    }
}

/// Vehicle wake state, reported by `/api/connection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    Sleep,
    Awake,
}

/// BLE link state, reported by `/api/connection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BleStatus {
    Connected,
    Disconnected,
}

/// UWB session state, reported by `/api/connection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UwbStatus {
    /// No UWB session
    NA,
    /// Distance measurement active
    Ranging,
    /// Connection parameter discovery
    CPD,
    /// Ranging and CPD interleaved
    Mixed,
}

impl UwbStatus {
    /// True when the user position is being measured (Ranging or Mixed)
    pub fn is_ranging(&self) -> bool {
        matches!(self, UwbStatus::Ranging | UwbStatus::Mixed)
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleStatus::Sleep => write!(f, "Sleep"),
            VehicleStatus::Awake => write!(f, "Awake"),
        }
    }
}

impl fmt::Display for BleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BleStatus::Connected => write!(f, "Connected"),
            BleStatus::Disconnected => write!(f, "Disconnected"),
        }
    }
}

impl fmt::Display for UwbStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UwbStatus::NA => write!(f, "NA"),
            UwbStatus::Ranging => write!(f, "Ranging"),
            UwbStatus::CPD => write!(f, "CPD"),
            UwbStatus::Mixed => write!(f, "Mixed"),
        }
    }
}

/// Door open/close position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorPosition {
    Open,
    Close,
}

/// Door lock state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorLock {
    Lock,
    Unlock,
}

impl fmt::Display for DoorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorPosition::Open => write!(f, "open"),
            DoorPosition::Close => write!(f, "close"),
        }
    }
}

impl fmt::Display for DoorLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorLock::Lock => write!(f, "lock"),
            DoorLock::Unlock => write!(f, "unlock"),
        }
    }
}

/// Doors reported by `/api/door`
///
/// The trunk is reported by the backend but has no hinged model, so it gets
/// no swing animation - lock tinting still applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DoorName {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
    Trunk,
}

impl DoorName {
    /// All doors, in the backend's reporting order
    pub const ALL: [DoorName; 5] = [
        DoorName::FrontLeft,
        DoorName::FrontRight,
        DoorName::RearLeft,
        DoorName::RearRight,
        DoorName::Trunk,
    ];

    /// True for doors present on the car model (everything but the trunk)
    pub fn has_hinge(&self) -> bool {
        !matches!(self, DoorName::Trunk)
    }

    /// True for right-hand-side doors, which swing in the opposite direction
    pub fn is_right_side(&self) -> bool {
        matches!(self, DoorName::FrontRight | DoorName::RearRight)
    }
}

impl fmt::Display for DoorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DoorName::FrontLeft => "FrontLeft",
            DoorName::FrontRight => "FrontRight",
            DoorName::RearLeft => "RearLeft",
            DoorName::RearRight => "RearRight",
            DoorName::Trunk => "Trunk",
        };
        write!(f, "{}", name)
    }
}

/// One door's `[openState, lockState]` pair as sent on the wire
pub type DoorState = (DoorPosition, DoorLock);

/// Snapshot of `/api/connection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSnapshot {
    /// Vehicle wake state: Sleep or Awake
    #[serde(rename = "VehicleStatus")]
    pub vehicle: VehicleStatus,
    /// BLE link state: Connected or Disconnected
    #[serde(rename = "BleStatus")]
    pub ble: BleStatus,
    /// UWB session state: NA, Ranging, CPD or Mixed
    #[serde(rename = "UwbStatus")]
    pub uwb: UwbStatus,
}

impl Default for ConnectionSnapshot {
    /// The page-load sentinel state before the first poll succeeds
    fn default() -> Self {
        Self {
            vehicle: VehicleStatus::Sleep,
            ble: BleStatus::Disconnected,
            uwb: UwbStatus::NA,
        }
    }
}

/// Snapshot of `/api/door`: door name mapped to its `[open, lock]` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorSnapshot(pub BTreeMap<DoorName, DoorState>);

impl DoorSnapshot {
    /// All doors closed and locked - the backend's initial state
    pub fn all_closed_locked() -> Self {
        let mut doors = BTreeMap::new();
        for door in DoorName::ALL {
            doors.insert(door, (DoorPosition::Close, DoorLock::Lock));
        }
        DoorSnapshot(doors)
    }

    pub fn get(&self, door: DoorName) -> Option<DoorState> {
        self.0.get(&door).copied()
    }

    pub fn set(&mut self, door: DoorName, state: DoorState) {
        self.0.insert(door, state);
    }
}

impl Default for DoorSnapshot {
    fn default() -> Self {
        Self::all_closed_locked()
    }
}

/// Snapshot of `/api/ranging`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangingSnapshot {
    /// First path power in dBm
    #[serde(rename = "FirstPathPower")]
    pub first_path_power: f64,
    /// Angle of arrival in degrees
    #[serde(rename = "AOA", default)]
    pub aoa: f64,
    /// Distance from the vehicle origin in centimeters
    #[serde(rename = "Distance")]
    pub distance: f64,
}

/// Snapshot of `/api/user`: projected user position and heading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UserSnapshot {
    /// X coordinate in centimeters
    pub x: f64,
    /// Y coordinate in centimeters
    pub y: f64,
    /// Heading the user model should face, in radians
    #[serde(rename = "TurnAngle")]
    pub turn_angle: f64,
}

impl UserSnapshot {
    /// Straight-line distance from the vehicle origin, in meters
    pub fn distance_m(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt() / 100.0
    }
}
