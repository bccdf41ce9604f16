//! Owned view state for the car dashboard
//!
//! `CarView` replaces the shared Three.js scene graph with an explicit model
//! of everything the status effects touch: body brightness and flash overlay,
//! per-door hinge angle and lock tint, the BLE/UWB range circles, the welcome
//! light projections and the user marker. Effects queue animations; the
//! driver steps them with `advance(dt)`.
//!
//! Starting an effect for a property that is already animating cancels the
//! in-flight animation and starts from the current value, so rapid status
//! toggling can never leave two tweens fighting over one property.

use crate::effects::{timing, Animation, Easing, Rgb, Tween, ViewProp};
use crate::types::DoorName;
use std::collections::BTreeMap;

/// One door's presentation state
#[derive(Debug, Clone, Copy)]
pub struct DoorView {
    /// Hinge angle in radians; 0 = closed
    pub angle: f32,
    /// Lock tint overlay color for the current flash
    pub flash_color: Rgb,
    /// Overlay blend, 0 = no tint visible
    pub flash_blend: f32,
}

/// A ground circle indicating BLE or UWB coverage
#[derive(Debug, Clone, Copy)]
pub struct CircleView {
    pub visible: bool,
    pub radius: f32,
    pub opacity: f32,
}

/// The welcome light projections beside the doors
#[derive(Debug, Clone, Copy)]
pub struct LightView {
    pub opacity: f32,
    pub scale: f32,
}

/// The user marker position and heading
#[derive(Debug, Clone, Copy, Default)]
pub struct UserView {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// Complete dashboard view state
pub struct CarView {
    /// False until the car model has loaded; body effects report failure
    /// until then so callers can retry on the next poll
    model_ready: bool,
    pub brightness: f32,
    /// Body flash overlay color for the current flash
    pub flash_color: Rgb,
    /// Body flash overlay blend, 0 = original paint
    pub flash_blend: f32,
    doors: BTreeMap<DoorName, DoorView>,
    pub ble_circle: CircleView,
    pub uwb_circle: CircleView,
    pub welcome: LightView,
    pub user: UserView,
    /// UWB icon idle/animated toggle: true while ranging is active
    pub uwb_icon_animated: bool,
    animations: Vec<Animation>,
    effects_started: u64,
}

impl CarView {
    pub fn new() -> Self {
        Self {
            model_ready: false,
            brightness: timing::BRIGHTNESS_SLEEP,
            flash_color: Rgb::new(0.0, 0.0, 0.0),
            flash_blend: 0.0,
            doors: DoorName::ALL
                .iter()
                .map(|&d| {
                    (
                        d,
                        DoorView {
                            angle: 0.0,
                            flash_color: Rgb::new(0.0, 0.0, 0.0),
                            flash_blend: 0.0,
                        },
                    )
                })
                .collect(),
            ble_circle: CircleView {
                visible: false,
                radius: timing::BLE_CIRCLE_MIN_RADIUS,
                opacity: 0.0,
            },
            uwb_circle: CircleView {
                visible: false,
                radius: timing::UWB_CIRCLE_MIN_RADIUS,
                opacity: 0.0,
            },
            welcome: LightView {
                opacity: 0.0,
                scale: timing::WELCOME_SCALE_OFF,
            },
            user: UserView::default(),
            uwb_icon_animated: false,
            animations: Vec::new(),
            effects_started: 0,
        }
    }

    /// A view with the model already loaded, skipping the loading window
    pub fn ready() -> Self {
        let mut view = Self::new();
        view.model_ready = true;
        view
    }

    /// Mark the car model as loaded; body effects succeed from here on
    pub fn set_model_ready(&mut self) {
        self.model_ready = true;
    }

    pub fn is_model_ready(&self) -> bool {
        self.model_ready
    }

    pub fn door(&self, door: DoorName) -> &DoorView {
        &self.doors[&door]
    }

    /// Number of animations currently in flight
    pub fn active_animations(&self) -> usize {
        self.animations.len()
    }

    /// True if some animation is driving `prop` right now
    pub fn is_animating(&self, prop: ViewProp) -> bool {
        self.animations.iter().any(|a| a.prop == prop)
    }

    /// Total effects started since construction (for tests and diagnostics)
    pub fn effects_started(&self) -> u64 {
        self.effects_started
    }

    fn current_value(&self, prop: ViewProp) -> f32 {
        if let Some(anim) = self.animations.iter().find(|a| a.prop == prop) {
            return anim.current();
        }
        match prop {
            ViewProp::BodyBrightness => self.brightness,
            ViewProp::BodyFlash => self.flash_blend,
            ViewProp::DoorAngle(d) => self.doors[&d].angle,
            ViewProp::DoorFlash(d) => self.doors[&d].flash_blend,
            ViewProp::BleCircleRadius => self.ble_circle.radius,
            ViewProp::BleCircleOpacity => self.ble_circle.opacity,
            ViewProp::UwbCircleRadius => self.uwb_circle.radius,
            ViewProp::UwbCircleOpacity => self.uwb_circle.opacity,
            ViewProp::WelcomeOpacity => self.welcome.opacity,
            ViewProp::WelcomeScale => self.welcome.scale,
            ViewProp::UserX => self.user.x,
            ViewProp::UserY => self.user.y,
            ViewProp::UserAngle => self.user.angle,
        }
    }

    fn apply_value(&mut self, prop: ViewProp, value: f32) {
        match prop {
            ViewProp::BodyBrightness => self.brightness = value,
            ViewProp::BodyFlash => self.flash_blend = value,
            ViewProp::DoorAngle(d) => {
                if let Some(door) = self.doors.get_mut(&d) {
                    door.angle = value;
                }
            }
            ViewProp::DoorFlash(d) => {
                if let Some(door) = self.doors.get_mut(&d) {
                    door.flash_blend = value;
                }
            }
            ViewProp::BleCircleRadius => self.ble_circle.radius = value,
            ViewProp::BleCircleOpacity => self.ble_circle.opacity = value,
            ViewProp::UwbCircleRadius => self.uwb_circle.radius = value,
            ViewProp::UwbCircleOpacity => self.uwb_circle.opacity = value,
            ViewProp::WelcomeOpacity => self.welcome.opacity = value,
            ViewProp::WelcomeScale => self.welcome.scale = value,
            ViewProp::UserX => self.user.x = value,
            ViewProp::UserY => self.user.y = value,
            ViewProp::UserAngle => self.user.angle = value,
        }
    }

    /// Queue an animation, cancelling any in-flight animation on the same
    /// property
    fn start(&mut self, animation: Animation) {
        self.animations.retain(|a| a.prop != animation.prop);
        self.effects_started += 1;
        self.animations.push(animation);
    }

    /// Step all live animations by `dt` seconds, folding finished values
    /// into the view
    pub fn advance(&mut self, dt: f32) {
        let mut animations = std::mem::take(&mut self.animations);
        animations.retain_mut(|anim| {
            let step = anim.advance(dt);
            let prop = anim.prop;
            self.apply_value(prop, step.value);
            if step.finished {
                self.on_animation_complete(prop);
            }
            !step.finished
        });
        // Effects started from completion hooks would land in self.animations;
        // none do today, but keep them if that changes.
        self.animations.extend(animations.drain(..));
    }

    fn on_animation_complete(&mut self, prop: ViewProp) {
        match prop {
            // Hide animations end with the circle removed from the scene
            ViewProp::BleCircleOpacity => {
                if self.ble_circle.opacity <= f32::EPSILON {
                    self.ble_circle.visible = false;
                }
            }
            ViewProp::UwbCircleOpacity => {
                if self.uwb_circle.opacity <= f32::EPSILON {
                    self.uwb_circle.visible = false;
                }
            }
            _ => {}
        }
    }

    // ----- Effect entry points -----

    /// Flash the whole body with `color` (in, then back out).
    /// Returns false while the model has not loaded; the caller must not
    /// advance its cache so the transition is retried next poll.
    pub fn flash_body_color(&mut self, color: Rgb) -> bool {
        if !self.model_ready {
            log::debug!("body flash skipped, model not loaded");
            return false;
        }
        self.flash_color = color;
        self.start(Animation::new(
            ViewProp::BodyFlash,
            vec![
                Tween::new(0.0, 1.0, timing::FLASH_IN_SECS, Easing::QuadOut),
                Tween::new(1.0, 0.0, timing::FLASH_OUT_SECS, Easing::QuadIn),
            ],
        ));
        true
    }

    /// Fade body brightness to `to` (vehicle wake/sleep)
    pub fn fade_brightness(&mut self, to: f32) -> bool {
        if !self.model_ready {
            log::debug!("brightness fade skipped, model not loaded");
            return false;
        }
        let from = self.current_value(ViewProp::BodyBrightness);
        self.start(Animation::single(
            ViewProp::BodyBrightness,
            Tween::new(from, to, timing::BRIGHTNESS_FADE_SECS, Easing::Linear),
        ));
        true
    }

    fn show_circle(
        &mut self,
        radius_prop: ViewProp,
        opacity_prop: ViewProp,
        min_radius: f32,
        max_radius: f32,
    ) {
        self.start(Animation::new(
            radius_prop,
            vec![
                Tween::new(min_radius, max_radius, timing::CIRCLE_SHOW_SECS, Easing::QuadOut),
                Tween::new(
                    max_radius,
                    max_radius * timing::CIRCLE_PULSE_FACTOR,
                    timing::CIRCLE_PULSE_SECS,
                    Easing::QuadInOut,
                ),
                Tween::new(
                    max_radius * timing::CIRCLE_PULSE_FACTOR,
                    max_radius,
                    timing::CIRCLE_PULSE_SECS,
                    Easing::QuadInOut,
                ),
            ],
        ));
        self.start(Animation::single(
            opacity_prop,
            Tween::new(0.0, timing::CIRCLE_OPACITY, timing::CIRCLE_SHOW_SECS, Easing::QuadOut),
        ));
    }

    fn hide_circle(&mut self, radius_prop: ViewProp, opacity_prop: ViewProp, min_radius: f32) {
        let radius = self.current_value(radius_prop);
        let opacity = self.current_value(opacity_prop);
        self.start(Animation::single(
            radius_prop,
            Tween::new(radius, min_radius, timing::CIRCLE_HIDE_SECS, Easing::QuadIn),
        ));
        self.start(Animation::single(
            opacity_prop,
            Tween::new(opacity, 0.0, timing::CIRCLE_HIDE_SECS, Easing::QuadIn),
        ));
    }

    /// Reveal the BLE coverage circle (expand, fade in, pulse once)
    pub fn show_ble_circle(&mut self) {
        self.ble_circle.visible = true;
        self.show_circle(
            ViewProp::BleCircleRadius,
            ViewProp::BleCircleOpacity,
            timing::BLE_CIRCLE_MIN_RADIUS,
            timing::BLE_CIRCLE_MAX_RADIUS,
        );
    }

    /// Contract and fade out the BLE coverage circle
    pub fn hide_ble_circle(&mut self) {
        if !self.ble_circle.visible {
            return;
        }
        self.hide_circle(
            ViewProp::BleCircleRadius,
            ViewProp::BleCircleOpacity,
            timing::BLE_CIRCLE_MIN_RADIUS,
        );
    }

    /// Reveal the UWB coverage circle
    pub fn show_uwb_circle(&mut self) {
        self.uwb_circle.visible = true;
        self.show_circle(
            ViewProp::UwbCircleRadius,
            ViewProp::UwbCircleOpacity,
            timing::UWB_CIRCLE_MIN_RADIUS,
            timing::UWB_CIRCLE_MAX_RADIUS,
        );
    }

    /// Contract and fade out the UWB coverage circle
    pub fn hide_uwb_circle(&mut self) {
        if !self.uwb_circle.visible {
            return;
        }
        self.hide_circle(
            ViewProp::UwbCircleRadius,
            ViewProp::UwbCircleOpacity,
            timing::UWB_CIRCLE_MIN_RADIUS,
        );
    }

    /// Swing a door open or closed. Right-side doors swing positive,
    /// left-side negative; the trunk has no hinge and is ignored.
    pub fn swing_door(&mut self, door: DoorName, open: bool) -> bool {
        if !door.has_hinge() {
            return false;
        }
        if !self.model_ready {
            log::debug!("door swing skipped, model not loaded");
            return false;
        }
        let target = if !open {
            0.0
        } else if door.is_right_side() {
            timing::DOOR_OPEN_ANGLE
        } else {
            -timing::DOOR_OPEN_ANGLE
        };
        let from = self.current_value(ViewProp::DoorAngle(door));
        self.start(Animation::single(
            ViewProp::DoorAngle(door),
            Tween::new(from, target, timing::DOOR_SWING_SECS, Easing::Linear),
        ));
        true
    }

    /// Flash one door with its lock-state tint
    pub fn flash_door_lock(&mut self, door: DoorName, color: Rgb) -> bool {
        if !self.model_ready {
            log::debug!("door lock flash skipped, model not loaded");
            return false;
        }
        if let Some(view) = self.doors.get_mut(&door) {
            view.flash_color = color;
        }
        self.start(Animation::new(
            ViewProp::DoorFlash(door),
            vec![
                Tween::new(0.0, 1.0, timing::FLASH_IN_SECS, Easing::QuadOut),
                Tween::new(1.0, 0.0, timing::FLASH_OUT_SECS, Easing::QuadIn),
            ],
        ));
        true
    }

    /// Fade the welcome light projections in
    pub fn welcome_on(&mut self) {
        let opacity = self.current_value(ViewProp::WelcomeOpacity);
        let scale = self.current_value(ViewProp::WelcomeScale);
        self.start(Animation::single(
            ViewProp::WelcomeOpacity,
            Tween::new(opacity, timing::WELCOME_OPACITY, timing::WELCOME_ON_SECS, Easing::QuadOut),
        ));
        self.start(Animation::single(
            ViewProp::WelcomeScale,
            Tween::new(scale, timing::WELCOME_SCALE_ON, timing::WELCOME_ON_SECS, Easing::QuadOut),
        ));
    }

    /// Fade the welcome light projections out
    pub fn welcome_off(&mut self) {
        let opacity = self.current_value(ViewProp::WelcomeOpacity);
        let scale = self.current_value(ViewProp::WelcomeScale);
        self.start(Animation::single(
            ViewProp::WelcomeOpacity,
            Tween::new(opacity, 0.0, timing::WELCOME_OFF_SECS, Easing::QuadIn),
        ));
        self.start(Animation::single(
            ViewProp::WelcomeScale,
            Tween::new(scale, timing::WELCOME_SCALE_OFF, timing::WELCOME_OFF_SECS, Easing::QuadIn),
        ));
    }

    /// Glide the user marker to a new position and heading
    pub fn move_user(&mut self, x: f32, y: f32, angle: f32) {
        let from_x = self.current_value(ViewProp::UserX);
        let from_y = self.current_value(ViewProp::UserY);
        let from_angle = self.current_value(ViewProp::UserAngle);
        self.start(Animation::single(
            ViewProp::UserX,
            Tween::new(from_x, x, timing::USER_MOVE_SECS, Easing::QuadInOut),
        ));
        self.start(Animation::single(
            ViewProp::UserY,
            Tween::new(from_y, y, timing::USER_MOVE_SECS, Easing::QuadInOut),
        ));
        self.start(Animation::single(
            ViewProp::UserAngle,
            Tween::new(from_angle, angle, timing::USER_MOVE_SECS, Easing::QuadInOut),
        ));
    }

    /// Toggle the UWB icon between idle and animated (ranging) appearance
    pub fn set_uwb_icon_animated(&mut self, animated: bool) {
        self.uwb_icon_animated = animated;
    }
}

impl Default for CarView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::palette;

    #[test]
    fn test_body_flash_requires_loaded_model() {
        let mut view = CarView::new();
        assert!(!view.flash_body_color(palette::BLE_CONNECTED));
        assert_eq!(view.active_animations(), 0);

        view.set_model_ready();
        assert!(view.flash_body_color(palette::BLE_CONNECTED));
        assert!(view.is_animating(ViewProp::BodyFlash));
    }

    #[test]
    fn test_flash_peaks_then_returns_to_original() {
        let mut view = CarView::ready();
        view.flash_body_color(palette::BLE_DISCONNECTED);

        view.advance(0.2);
        assert!(view.flash_blend > 0.99);

        view.advance(0.3);
        assert_eq!(view.flash_blend, 0.0);
        assert!(!view.is_animating(ViewProp::BodyFlash));
    }

    #[test]
    fn test_brightness_fade_reaches_target() {
        let mut view = CarView::ready();
        view.fade_brightness(timing::BRIGHTNESS_AWAKE);
        view.advance(1.0);
        assert_eq!(view.brightness, timing::BRIGHTNESS_AWAKE);
    }

    #[test]
    fn test_retrigger_cancels_in_flight_tween() {
        let mut view = CarView::ready();
        view.fade_brightness(timing::BRIGHTNESS_AWAKE);
        view.advance(0.1);

        // Re-trigger mid-flight: only one animation remains on the property
        view.fade_brightness(timing::BRIGHTNESS_SLEEP);
        assert_eq!(
            view.animations.iter().filter(|a| a.prop == ViewProp::BodyBrightness).count(),
            1
        );

        view.advance(1.0);
        assert_eq!(view.brightness, timing::BRIGHTNESS_SLEEP);
    }

    #[test]
    fn test_ble_circle_show_then_hide() {
        let mut view = CarView::ready();
        view.show_ble_circle();
        assert!(view.ble_circle.visible);

        // Reveal, then both pulse segments
        view.advance(2.0);
        assert_eq!(view.ble_circle.radius, timing::BLE_CIRCLE_MAX_RADIUS);
        assert_eq!(view.ble_circle.opacity, timing::CIRCLE_OPACITY);

        view.hide_ble_circle();
        view.advance(1.0);
        assert!(!view.ble_circle.visible);
        assert_eq!(view.ble_circle.opacity, 0.0);
    }

    #[test]
    fn test_hide_circle_without_show_is_noop() {
        let mut view = CarView::ready();
        view.hide_uwb_circle();
        assert_eq!(view.active_animations(), 0);
    }

    #[test]
    fn test_door_swing_directions() {
        let mut view = CarView::ready();
        assert!(view.swing_door(DoorName::FrontRight, true));
        assert!(view.swing_door(DoorName::RearLeft, true));
        view.advance(1.5);

        assert_eq!(view.door(DoorName::FrontRight).angle, timing::DOOR_OPEN_ANGLE);
        assert_eq!(view.door(DoorName::RearLeft).angle, -timing::DOOR_OPEN_ANGLE);

        assert!(view.swing_door(DoorName::FrontRight, false));
        view.advance(1.5);
        assert_eq!(view.door(DoorName::FrontRight).angle, 0.0);
    }

    #[test]
    fn test_trunk_has_no_swing() {
        let mut view = CarView::ready();
        assert!(!view.swing_door(DoorName::Trunk, true));
        assert_eq!(view.active_animations(), 0);
    }

    #[test]
    fn test_welcome_light_fade_cycle() {
        let mut view = CarView::ready();
        view.welcome_on();
        view.advance(1.0);
        assert_eq!(view.welcome.opacity, timing::WELCOME_OPACITY);
        assert_eq!(view.welcome.scale, timing::WELCOME_SCALE_ON);

        view.welcome_off();
        view.advance(1.0);
        assert_eq!(view.welcome.opacity, 0.0);
        assert_eq!(view.welcome.scale, timing::WELCOME_SCALE_OFF);
    }

    #[test]
    fn test_user_marker_glides_to_target() {
        let mut view = CarView::ready();
        view.move_user(3.0, 4.0, 1.5);
        view.advance(0.25);
        // Mid-flight: somewhere between origin and target
        assert!(view.user.x > 0.0 && view.user.x < 3.0);

        view.advance(0.5);
        assert_eq!(view.user.x, 3.0);
        assert_eq!(view.user.y, 4.0);
        assert_eq!(view.user.angle, 1.5);
    }
}
