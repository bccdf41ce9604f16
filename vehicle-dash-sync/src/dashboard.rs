//! Dashboard aggregate
//!
//! One constructed-at-startup instance owning the view state, the transition
//! log, the per-module trackers and the welcome light gate. The pollers hand
//! it fresh snapshots; the render driver steps its animations.

use crate::diff::{ConnectionTracker, DoorTracker, RangingTracker, UserTracker};
use crate::event_log::EventLog;
use crate::types::{ConnectionSnapshot, DoorSnapshot, RangingSnapshot, UserSnapshot};
use crate::view::CarView;
use crate::welcome::WelcomeLight;

pub struct Dashboard {
    pub view: CarView,
    pub log: EventLog,
    connection: ConnectionTracker,
    doors: DoorTracker,
    ranging: RangingTracker,
    user: UserTracker,
    welcome: WelcomeLight,
}

impl Dashboard {
    pub fn new(max_log_entries: usize) -> Self {
        Self {
            view: CarView::new(),
            log: EventLog::with_capacity(max_log_entries),
            connection: ConnectionTracker::new(),
            doors: DoorTracker::new(),
            ranging: RangingTracker::new(),
            user: UserTracker::new(),
            welcome: WelcomeLight::new(),
        }
    }

    /// Feed a `/api/connection` snapshot through the connection tracker
    pub fn apply_connection(&mut self, snap: &ConnectionSnapshot) {
        self.connection.apply(snap, &mut self.view, &mut self.log);
    }

    /// Feed a `/api/connection` snapshot through the welcome light gate.
    /// Runs on its own polling cadence, separate from the connection tracker.
    pub fn apply_welcome(&mut self, snap: &ConnectionSnapshot) {
        self.welcome.apply(snap, &mut self.view, &mut self.log);
    }

    /// Feed a `/api/door` snapshot
    pub fn apply_doors(&mut self, snap: &DoorSnapshot) {
        self.doors.apply(snap, &mut self.view, &mut self.log);
    }

    /// Feed a `/api/ranging` snapshot
    pub fn apply_ranging(&mut self, snap: &RangingSnapshot) {
        self.ranging.apply(snap, &mut self.log);
    }

    /// Feed a `/api/user` snapshot
    pub fn apply_user(&mut self, snap: &UserSnapshot) {
        self.user.apply(snap, &mut self.view, &mut self.log);
    }

    /// Step all running animations by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.view.advance(dt);
    }

    pub fn welcome_light_active(&self) -> bool {
        self.welcome.is_active()
    }

    pub fn connection_cache(&self) -> &ConnectionSnapshot {
        self.connection.cached()
    }
}
