//! Tween and animation primitives
//!
//! The visual effect layer reduced to what it actually computes: timed
//! interpolation of scalar view properties with an easing curve. Each
//! `Animation` owns a snapshot of the values it interpolates, so a status
//! flip mid-flight cannot mutate a running effect - re-triggering replaces
//! the in-flight animation for that property instead of layering a second
//! tween over the same target.

use crate::types::DoorName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Easing curves used by the dashboard effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    /// Decelerating, `1 - (1-t)^2`
    QuadOut,
    /// Accelerating, `t^2`
    QuadIn,
    /// Symmetric ease-in-out
    QuadInOut,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` onto the curve
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadIn => t * t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0) * (-2.0 * t + 2.0) / 2.0
                }
            }
        }
    }
}

/// One timed interpolation between two scalar values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    /// Duration in seconds
    pub duration: f32,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
        }
    }

    /// Value at `elapsed` seconds; clamps to the endpoint once past duration
    pub fn sample(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = self.easing.apply(elapsed / self.duration);
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, elapsed: f32) -> bool {
        elapsed >= self.duration
    }
}

/// A view property driven by exactly one animation at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewProp {
    /// Whole-model brightness multiplier
    BodyBrightness,
    /// Body flash overlay blend, 0 = original color, 1 = full overlay
    BodyFlash,
    /// Hinge angle of one door, radians
    DoorAngle(DoorName),
    /// Lock tint overlay blend of one door
    DoorFlash(DoorName),
    BleCircleRadius,
    BleCircleOpacity,
    UwbCircleRadius,
    UwbCircleOpacity,
    WelcomeOpacity,
    WelcomeScale,
    UserX,
    UserY,
    UserAngle,
}

impl fmt::Display for ViewProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewProp::BodyBrightness => write!(f, "BodyBrightness"),
            ViewProp::BodyFlash => write!(f, "BodyFlash"),
            ViewProp::DoorAngle(d) => write!(f, "DoorAngle({})", d),
            ViewProp::DoorFlash(d) => write!(f, "DoorFlash({})", d),
            ViewProp::BleCircleRadius => write!(f, "BleCircleRadius"),
            ViewProp::BleCircleOpacity => write!(f, "BleCircleOpacity"),
            ViewProp::UwbCircleRadius => write!(f, "UwbCircleRadius"),
            ViewProp::UwbCircleOpacity => write!(f, "UwbCircleOpacity"),
            ViewProp::WelcomeOpacity => write!(f, "WelcomeOpacity"),
            ViewProp::WelcomeScale => write!(f, "WelcomeScale"),
            ViewProp::UserX => write!(f, "UserX"),
            ViewProp::UserY => write!(f, "UserY"),
            ViewProp::UserAngle => write!(f, "UserAngle"),
        }
    }
}

/// A running animation: consecutive tween segments driving one property
///
/// Multi-segment animations reproduce the chained timelines of the source
/// effects: a flash is blend 0→1 then 1→0, a circle reveal expands, then
/// pulses in and back out.
#[derive(Debug, Clone)]
pub struct Animation {
    pub prop: ViewProp,
    segments: Vec<Tween>,
    segment: usize,
    elapsed: f32,
}

/// What `Animation::advance` reports back to the view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationStep {
    pub value: f32,
    pub finished: bool,
}

impl Animation {
    pub fn new(prop: ViewProp, segments: Vec<Tween>) -> Self {
        debug_assert!(!segments.is_empty());
        Self {
            prop,
            segments,
            segment: 0,
            elapsed: 0.0,
        }
    }

    /// Single-segment convenience constructor
    pub fn single(prop: ViewProp, tween: Tween) -> Self {
        Self::new(prop, vec![tween])
    }

    /// Current value without advancing time
    pub fn current(&self) -> f32 {
        self.segments[self.segment].sample(self.elapsed)
    }

    /// Advance by `dt` seconds, rolling leftover time into the next segment
    pub fn advance(&mut self, dt: f32) -> AnimationStep {
        self.elapsed += dt;
        while self.segments[self.segment].is_finished(self.elapsed) {
            if self.segment + 1 == self.segments.len() {
                return AnimationStep {
                    value: self.segments[self.segment].to,
                    finished: true,
                };
            }
            self.elapsed -= self.segments[self.segment].duration;
            self.segment += 1;
        }
        AnimationStep {
            value: self.segments[self.segment].sample(self.elapsed),
            finished: false,
        }
    }
}

/// Linear RGB color, components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Status-to-color tables, matching the source dashboard exactly.
pub mod palette {
    use super::Rgb;
    use crate::types::{BleStatus, DoorLock, UwbStatus};

    pub const UWB_NA: Rgb = Rgb::new(1.0, 0.41, 0.71); // pink
    pub const UWB_RANGING: Rgb = Rgb::new(0.0, 1.0, 0.0); // green
    pub const UWB_CPD: Rgb = Rgb::new(1.0, 1.0, 0.0); // yellow
    pub const UWB_MIXED: Rgb = Rgb::new(0.5, 0.0, 0.5); // purple

    pub const BLE_CONNECTED: Rgb = Rgb::new(0.0, 0.0, 1.0); // blue
    pub const BLE_DISCONNECTED: Rgb = Rgb::new(1.0, 0.0, 0.0); // red

    pub const LOCKED: Rgb = Rgb::new(1.0, 0.0, 0.0); // red
    pub const UNLOCKED: Rgb = Rgb::new(0.0, 1.0, 0.0); // green

    pub fn uwb_color(status: UwbStatus) -> Rgb {
        match status {
            UwbStatus::NA => UWB_NA,
            UwbStatus::Ranging => UWB_RANGING,
            UwbStatus::CPD => UWB_CPD,
            UwbStatus::Mixed => UWB_MIXED,
        }
    }

    pub fn ble_color(status: BleStatus) -> Rgb {
        match status {
            BleStatus::Connected => BLE_CONNECTED,
            BleStatus::Disconnected => BLE_DISCONNECTED,
        }
    }

    pub fn lock_color(lock: DoorLock) -> Rgb {
        match lock {
            DoorLock::Lock => LOCKED,
            DoorLock::Unlock => UNLOCKED,
        }
    }
}

/// Effect timing and geometry constants from the source dashboard.
pub mod timing {
    /// Body/door color flash: fade in, then back out
    pub const FLASH_IN_SECS: f32 = 0.2;
    pub const FLASH_OUT_SECS: f32 = 0.2;

    /// Whole-model brightness fade on vehicle wake/sleep
    pub const BRIGHTNESS_FADE_SECS: f32 = 0.5;
    pub const BRIGHTNESS_AWAKE: f32 = 1.5;
    pub const BRIGHTNESS_SLEEP: f32 = 0.15;

    /// Range circle reveal: expand + fade in, then one pulse cycle
    pub const CIRCLE_SHOW_SECS: f32 = 0.8;
    pub const CIRCLE_PULSE_SECS: f32 = 0.5;
    pub const CIRCLE_HIDE_SECS: f32 = 0.6;
    pub const CIRCLE_OPACITY: f32 = 0.6;
    pub const CIRCLE_PULSE_FACTOR: f32 = 0.8;

    pub const BLE_CIRCLE_MAX_RADIUS: f32 = 8.0;
    pub const BLE_CIRCLE_MIN_RADIUS: f32 = 1.0;
    pub const UWB_CIRCLE_MAX_RADIUS: f32 = 4.0;
    pub const UWB_CIRCLE_MIN_RADIUS: f32 = 1.0;

    /// Door swing: one second to +-60 degrees
    pub const DOOR_SWING_SECS: f32 = 1.0;
    pub const DOOR_OPEN_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

    /// Welcome light projections
    pub const WELCOME_ON_SECS: f32 = 0.8;
    pub const WELCOME_OFF_SECS: f32 = 0.6;
    pub const WELCOME_OPACITY: f32 = 0.9;
    pub const WELCOME_SCALE_ON: f32 = 1.0;
    pub const WELCOME_SCALE_OFF: f32 = 0.5;

    /// User marker retarget duration
    pub const USER_MOVE_SECS: f32 = 0.5;
}
