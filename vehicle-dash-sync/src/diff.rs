//! State differencers and transition dispatchers
//!
//! One tracker per status module. Each tracker owns the last snapshot it
//! applied, compares a fresh snapshot against it field by field, and for
//! every changed field runs the bound effect exactly once and appends one
//! transition record to the log.
//!
//! The connection tracker gates its cache advance on the effect result: if
//! the car model has not loaded yet the effect reports failure, the cached
//! value stays put, and the same transition fires again on the next poll.
//! The door tracker advances unconditionally, matching the source module.

use crate::effects::palette;
use crate::event_log::{EventLog, EventSource};
use crate::types::{
    ConnectionSnapshot, DoorName, DoorSnapshot, RangingSnapshot, UserSnapshot, VehicleStatus,
};
use crate::view::CarView;

/// Diffs `/api/connection` snapshots and drives the body color flash,
/// brightness fade and coverage circles.
pub struct ConnectionTracker {
    cache: ConnectionSnapshot,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self {
            cache: ConnectionSnapshot::default(),
        }
    }

    pub fn cached(&self) -> &ConnectionSnapshot {
        &self.cache
    }

    /// Dispatch every changed field independently in one cycle.
    ///
    /// The source dashboard chained BLE and UWB behind `else if`, handling at
    /// most one of the two per poll; that was flagged as an ambiguity and is
    /// deliberately not reproduced here.
    pub fn apply(&mut self, snap: &ConnectionSnapshot, view: &mut CarView, log: &mut EventLog) {
        if snap.ble != self.cache.ble {
            log::debug!("BLE status changed: {} -> {}", self.cache.ble, snap.ble);
            let applied = view.flash_body_color(palette::ble_color(snap.ble));
            log.add_entry(EventSource::Connection, "BLE Status", self.cache.ble, snap.ble);

            if snap.ble == crate::types::BleStatus::Connected {
                view.show_ble_circle();
            } else {
                view.hide_ble_circle();
            }
            if applied {
                self.cache.ble = snap.ble;
            }
        }

        if snap.uwb != self.cache.uwb {
            log::debug!("UWB status changed: {} -> {}", self.cache.uwb, snap.uwb);
            let applied = view.flash_body_color(palette::uwb_color(snap.uwb));
            log.add_entry(EventSource::Connection, "UWB Status", self.cache.uwb, snap.uwb);

            if snap.uwb.is_ranging() {
                view.show_uwb_circle();
            } else {
                view.hide_uwb_circle();
            }
            view.set_uwb_icon_animated(snap.uwb.is_ranging());
            if applied {
                self.cache.uwb = snap.uwb;
            }
        }

        if snap.vehicle != self.cache.vehicle {
            log::debug!(
                "vehicle status changed: {} -> {}",
                self.cache.vehicle,
                snap.vehicle
            );
            let brightness = match snap.vehicle {
                VehicleStatus::Awake => crate::effects::timing::BRIGHTNESS_AWAKE,
                VehicleStatus::Sleep => crate::effects::timing::BRIGHTNESS_SLEEP,
            };
            let applied = view.fade_brightness(brightness);
            log.add_entry(
                EventSource::Connection,
                "Vehicle Status",
                self.cache.vehicle,
                snap.vehicle,
            );
            if applied {
                self.cache.vehicle = snap.vehicle;
            }
        }
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Diffs `/api/door` snapshots and drives door swings and lock tint flashes.
pub struct DoorTracker {
    cache: DoorSnapshot,
}

impl DoorTracker {
    pub fn new() -> Self {
        Self {
            cache: DoorSnapshot::all_closed_locked(),
        }
    }

    pub fn cached(&self) -> &DoorSnapshot {
        &self.cache
    }

    pub fn apply(&mut self, snap: &DoorSnapshot, view: &mut CarView, log: &mut EventLog) {
        for door in DoorName::ALL {
            let Some((position, lock)) = snap.get(door) else {
                continue;
            };
            let Some((prev_position, prev_lock)) = self.cache.get(door) else {
                continue;
            };

            // Position and lock changes are independent: an open/close must
            // not fire the lock flash and vice versa
            if position != prev_position {
                log::debug!("{} position changed: {} -> {}", door, prev_position, position);
                view.swing_door(door, position == crate::types::DoorPosition::Open);
                log.add_entry(
                    EventSource::Door,
                    format!("{} Position", door),
                    prev_position,
                    position,
                );
            }

            if lock != prev_lock {
                log::debug!("{} lock changed: {} -> {}", door, prev_lock, lock);
                view.flash_door_lock(door, palette::lock_color(lock));
                log.add_entry(EventSource::Door, format!("{} Lock", door), prev_lock, lock);
            }

            self.cache.set(door, (position, lock));
        }
    }
}

impl Default for DoorTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Diffs `/api/ranging` snapshots field by field into the log.
///
/// The first snapshot logs every field with an `Initial` previous value, the
/// way the source panel seeds its ranging rows.
pub struct RangingTracker {
    cache: Option<RangingSnapshot>,
}

impl RangingTracker {
    pub fn new() -> Self {
        Self { cache: None }
    }

    pub fn cached(&self) -> Option<&RangingSnapshot> {
        self.cache.as_ref()
    }

    pub fn apply(&mut self, snap: &RangingSnapshot, log: &mut EventLog) {
        match &self.cache {
            Some(prev) => {
                if snap.first_path_power != prev.first_path_power {
                    log.add_entry(
                        EventSource::Ranging,
                        "FirstPathPower",
                        prev.first_path_power,
                        snap.first_path_power,
                    );
                }
                if snap.aoa != prev.aoa {
                    log.add_entry(EventSource::Ranging, "AOA", prev.aoa, snap.aoa);
                }
                if snap.distance != prev.distance {
                    log.add_entry(EventSource::Ranging, "Distance", prev.distance, snap.distance);
                }
            }
            None => {
                log.add_entry(
                    EventSource::Ranging,
                    "FirstPathPower",
                    "Initial",
                    snap.first_path_power,
                );
                log.add_entry(EventSource::Ranging, "AOA", "Initial", snap.aoa);
                log.add_entry(EventSource::Ranging, "Distance", "Initial", snap.distance);
            }
        }
        self.cache = Some(*snap);
    }
}

impl Default for RangingTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Diffs `/api/user` snapshots and glides the user marker to new targets.
pub struct UserTracker {
    cache: UserSnapshot,
}

impl UserTracker {
    pub fn new() -> Self {
        Self {
            cache: UserSnapshot::default(),
        }
    }

    pub fn cached(&self) -> &UserSnapshot {
        &self.cache
    }

    pub fn apply(&mut self, snap: &UserSnapshot, view: &mut CarView, log: &mut EventLog) {
        if *snap == self.cache {
            return;
        }

        if snap.x != self.cache.x {
            log.add_entry(EventSource::User, "x", self.cache.x, snap.x);
        }
        if snap.y != self.cache.y {
            log.add_entry(EventSource::User, "y", self.cache.y, snap.y);
        }
        if snap.turn_angle != self.cache.turn_angle {
            log.add_entry(EventSource::User, "TurnAngle", self.cache.turn_angle, snap.turn_angle);
        }

        view.move_user(snap.x as f32, snap.y as f32, snap.turn_angle as f32);
        self.cache = *snap;
    }
}

impl Default for UserTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ViewProp;
    use crate::types::{BleStatus, DoorLock, DoorPosition, UwbStatus};

    fn fixtures() -> (CarView, EventLog) {
        (CarView::ready(), EventLog::new())
    }

    #[test]
    fn test_unchanged_snapshot_emits_nothing() {
        let (mut view, mut log) = fixtures();
        let mut tracker = ConnectionTracker::new();

        tracker.apply(&ConnectionSnapshot::default(), &mut view, &mut log);
        assert!(log.is_empty());
        assert_eq!(view.effects_started(), 0);
    }

    #[test]
    fn test_ble_connect_scenario() {
        let (mut view, mut log) = fixtures();
        let mut tracker = ConnectionTracker::new();

        let snap = ConnectionSnapshot {
            ble: BleStatus::Connected,
            ..ConnectionSnapshot::default()
        };
        tracker.apply(&snap, &mut view, &mut log);

        // Exactly one log entry with the right old/new values
        assert_eq!(log.len(), 1);
        let entry = log.entries().next().unwrap();
        assert_eq!(entry.source, EventSource::Connection);
        assert_eq!(entry.field, "BLE Status");
        assert_eq!(entry.previous, "Disconnected");
        assert_eq!(entry.new, "Connected");

        // Flash fired once, circle is revealed
        assert!(view.is_animating(ViewProp::BodyFlash));
        assert!(view.ble_circle.visible);

        // Same snapshot again: nothing new
        tracker.apply(&snap, &mut view, &mut log);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_simultaneous_ble_and_uwb_changes_both_dispatch() {
        let (mut view, mut log) = fixtures();
        let mut tracker = ConnectionTracker::new();

        let snap = ConnectionSnapshot {
            ble: BleStatus::Connected,
            uwb: UwbStatus::Ranging,
            ..ConnectionSnapshot::default()
        };
        tracker.apply(&snap, &mut view, &mut log);

        // Both fields handled in the same cycle (no `else if` throttling)
        assert_eq!(log.len(), 2);
        assert!(view.ble_circle.visible);
        assert!(view.uwb_circle.visible);
        assert!(view.uwb_icon_animated);
        assert_eq!(tracker.cached().ble, BleStatus::Connected);
        assert_eq!(tracker.cached().uwb, UwbStatus::Ranging);
    }

    #[test]
    fn test_cache_not_advanced_until_model_ready() {
        let mut view = CarView::new(); // model not loaded
        let mut log = EventLog::new();
        let mut tracker = ConnectionTracker::new();

        let snap = ConnectionSnapshot {
            ble: BleStatus::Connected,
            ..ConnectionSnapshot::default()
        };
        tracker.apply(&snap, &mut view, &mut log);

        // Logged, but the cache held back so the transition retries
        assert_eq!(log.len(), 1);
        assert_eq!(tracker.cached().ble, BleStatus::Disconnected);

        view.set_model_ready();
        tracker.apply(&snap, &mut view, &mut log);
        assert_eq!(tracker.cached().ble, BleStatus::Connected);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_uwb_status_drives_circle_and_icon() {
        let (mut view, mut log) = fixtures();
        let mut tracker = ConnectionTracker::new();

        let mut snap = ConnectionSnapshot {
            uwb: UwbStatus::Mixed,
            ..ConnectionSnapshot::default()
        };
        tracker.apply(&snap, &mut view, &mut log);
        assert!(view.uwb_circle.visible);
        assert!(view.uwb_icon_animated);

        snap.uwb = UwbStatus::CPD;
        tracker.apply(&snap, &mut view, &mut log);
        view.advance(1.0);
        assert!(!view.uwb_circle.visible);
        assert!(!view.uwb_icon_animated);
    }

    #[test]
    fn test_door_open_does_not_fire_lock_effect() {
        let (mut view, mut log) = fixtures();
        let mut tracker = DoorTracker::new();

        let mut snap = DoorSnapshot::all_closed_locked();
        snap.set(DoorName::FrontLeft, (DoorPosition::Open, DoorLock::Lock));
        tracker.apply(&snap, &mut view, &mut log);

        assert_eq!(log.len(), 1);
        let entry = log.entries().next().unwrap();
        assert_eq!(entry.field, "FrontLeft Position");

        // Swing started, no lock tint flash
        assert!(view.is_animating(ViewProp::DoorAngle(DoorName::FrontLeft)));
        assert!(!view.is_animating(ViewProp::DoorFlash(DoorName::FrontLeft)));
    }

    #[test]
    fn test_door_lock_and_position_change_together() {
        let (mut view, mut log) = fixtures();
        let mut tracker = DoorTracker::new();

        let mut snap = DoorSnapshot::all_closed_locked();
        snap.set(DoorName::RearRight, (DoorPosition::Open, DoorLock::Unlock));
        tracker.apply(&snap, &mut view, &mut log);

        assert_eq!(log.len(), 2);
        assert!(view.is_animating(ViewProp::DoorAngle(DoorName::RearRight)));
        assert!(view.is_animating(ViewProp::DoorFlash(DoorName::RearRight)));
    }

    #[test]
    fn test_trunk_lock_change_logs_without_swing() {
        let (mut view, mut log) = fixtures();
        let mut tracker = DoorTracker::new();

        let mut snap = DoorSnapshot::all_closed_locked();
        snap.set(DoorName::Trunk, (DoorPosition::Close, DoorLock::Unlock));
        tracker.apply(&snap, &mut view, &mut log);

        assert_eq!(log.len(), 1);
        assert!(view.is_animating(ViewProp::DoorFlash(DoorName::Trunk)));
    }

    #[test]
    fn test_ranging_first_snapshot_logs_initial_values() {
        let mut log = EventLog::new();
        let mut tracker = RangingTracker::new();

        let snap = RangingSnapshot {
            first_path_power: -8.0,
            aoa: 30.0,
            distance: 250.0,
        };
        tracker.apply(&snap, &mut log);

        assert_eq!(log.len(), 3);
        assert!(log.entries().all(|e| e.previous == "Initial"));
    }

    #[test]
    fn test_ranging_diffs_only_changed_fields() {
        let mut log = EventLog::new();
        let mut tracker = RangingTracker::new();

        let first = RangingSnapshot {
            first_path_power: -8.0,
            aoa: 30.0,
            distance: 250.0,
        };
        tracker.apply(&first, &mut log);

        let second = RangingSnapshot {
            distance: 240.0,
            ..first
        };
        tracker.apply(&second, &mut log);

        assert_eq!(log.len(), 4);
        let entry = log.entries().next().unwrap();
        assert_eq!(entry.field, "Distance");
        assert_eq!(entry.previous, "250");
        assert_eq!(entry.new, "240");
    }

    #[test]
    fn test_user_tracker_retargets_marker() {
        let (mut view, mut log) = fixtures();
        let mut tracker = UserTracker::new();

        let snap = UserSnapshot {
            x: 300.0,
            y: -150.0,
            turn_angle: 0.7,
        };
        tracker.apply(&snap, &mut view, &mut log);
        assert_eq!(log.len(), 3);
        assert!(view.is_animating(ViewProp::UserX));

        // Identical snapshot: no new events, no new animation restart
        let started = view.effects_started();
        tracker.apply(&snap, &mut view, &mut log);
        assert_eq!(log.len(), 3);
        assert_eq!(view.effects_started(), started);
    }
}
