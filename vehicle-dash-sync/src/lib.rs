//! Vehicle Access Status Synchronizer Library
//!
//! Domain logic for a vehicle-access status dashboard: it consumes periodic
//! status snapshots from a backend (connection, doors, ranging, user
//! position), diffs them against per-module caches, and on every observed
//! change dispatches a visual effect and appends a transition record to a
//! capped event log.
//!
//! # Architecture
//!
//! This library is intentionally free of I/O:
//! - Parses and validates per-endpoint JSON snapshots into typed DTOs
//! - Diffs snapshots per module and dispatches exactly one effect per
//!   changed field
//! - Models effects as owned, steppable animations over an explicit view
//!   state instead of callbacks against a shared scene
//! - Evaluates the welcome-light AND gate (vehicle awake + UWB ranging)
//!
//! The library does NOT:
//! - Perform HTTP requests or scheduling
//! - Render anything
//!
//! Polling, configuration and presentation live in the application layer
//! (vehicle-dash-cli).
//!
//! # Example Usage
//!
//! ```
//! use vehicle_dash_sync::{ConnectionSnapshot, Dashboard};
//!
//! let mut dash = Dashboard::new(100);
//! dash.view.set_model_ready();
//!
//! // One poll cycle: parse, diff, dispatch
//! let snap: ConnectionSnapshot = serde_json::from_str(
//!     r#"{"VehicleStatus":"Awake","BleStatus":"Connected","UwbStatus":"NA"}"#,
//! ).unwrap();
//! dash.apply_connection(&snap);
//!
//! // Render driver: step animations
//! dash.advance(0.033);
//! assert!(dash.log.len() > 0);
//! ```

// Public modules
pub mod dashboard;
pub mod diff;
pub mod effects;
pub mod event_log;
pub mod types;
pub mod view;
pub mod welcome;

// Re-export main types for convenience
pub use dashboard::Dashboard;
pub use diff::{ConnectionTracker, DoorTracker, RangingTracker, UserTracker};
pub use event_log::{EventLog, EventSource, TransitionEvent, DEFAULT_MAX_ENTRIES};
pub use types::{
    BleStatus, ConnectionSnapshot, DoorLock, DoorName, DoorPosition, DoorSnapshot, DoorState,
    RangingSnapshot, Result, SyncError, Timestamp, UserSnapshot, UwbStatus, VehicleStatus,
};
pub use view::CarView;
pub use welcome::WelcomeLight;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
