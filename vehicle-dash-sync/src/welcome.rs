//! Welcome light condition evaluator
//!
//! The one real state machine in the dashboard: the light projections turn
//! on only while the vehicle is awake AND a UWB ranging session is active,
//! and turn off as soon as either condition drops.

use crate::event_log::{EventLog, EventSource};
use crate::types::{ConnectionSnapshot, UwbStatus, VehicleStatus};
use crate::view::CarView;

/// Two-input AND gate over vehicle wake state and UWB ranging
pub struct WelcomeLight {
    vehicle: VehicleStatus,
    uwb: UwbStatus,
    active: bool,
}

impl WelcomeLight {
    pub fn new() -> Self {
        Self {
            vehicle: VehicleStatus::Sleep,
            uwb: UwbStatus::NA,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `Awake AND (Ranging OR Mixed)`
    pub fn should_be_active(&self) -> bool {
        self.vehicle == VehicleStatus::Awake && self.uwb.is_ranging()
    }

    /// Feed a fresh connection snapshot, log its own view of the inputs, and
    /// re-evaluate the gate. Safe to call with an unchanged snapshot on every
    /// poll tick.
    pub fn apply(&mut self, snap: &ConnectionSnapshot, view: &mut CarView, log: &mut EventLog) {
        let vehicle_changed = snap.vehicle != self.vehicle;
        let uwb_changed = snap.uwb != self.uwb;

        if vehicle_changed {
            log.add_entry(
                EventSource::WelcomeLight,
                "Vehicle Status",
                self.vehicle,
                snap.vehicle,
            );
            self.vehicle = snap.vehicle;
        }
        if uwb_changed {
            log.add_entry(EventSource::WelcomeLight, "UWB Status", self.uwb, snap.uwb);
            self.uwb = snap.uwb;
        }

        if vehicle_changed || uwb_changed {
            self.evaluate(view, log);
        }
    }

    /// Re-apply the gate. Activation and deactivation are no-ops when the
    /// light is already in the target state, so redundant calls are harmless.
    pub fn evaluate(&mut self, view: &mut CarView, log: &mut EventLog) {
        if self.should_be_active() {
            self.activate(view, log);
        } else {
            self.deactivate(view, log);
        }
    }

    fn activate(&mut self, view: &mut CarView, log: &mut EventLog) {
        if self.active {
            return;
        }
        self.active = true;
        log::info!("welcome lights on: vehicle awake, UWB ranging");
        log.add_entry(EventSource::WelcomeLight, "Lights", "Off", "On");
        view.welcome_on();
    }

    fn deactivate(&mut self, view: &mut CarView, log: &mut EventLog) {
        if !self.active {
            return;
        }
        self.active = false;
        let reason = if self.vehicle == VehicleStatus::Sleep {
            "Vehicle Sleep"
        } else {
            "UWB Not Ranging"
        };
        log::info!("welcome lights off: {}", reason);
        log.add_entry(
            EventSource::WelcomeLight,
            "Lights",
            "On",
            format!("Off ({})", reason),
        );
        view.welcome_off();
    }
}

impl Default for WelcomeLight {
    fn default() -> Self {
        Self::new()
    }
}
