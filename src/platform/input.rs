//! Raw keyboard, mouse and touch events folded into a per-tick snapshot
//!
//! Event handlers write into [`InputState`]; the game loop reads it once per
//! tick through [`InputState::snapshot`]. The simulation never writes back.

use glam::Vec2;

use crate::sim::{DirectionKeys, TickInput};

/// Virtual joystick geometry (px)
pub const JOYSTICK_SIZE: f32 = 180.0;
pub const JOYSTICK_STICK_SIZE: f32 = 76.0;
pub const JOYSTICK_DEADZONE: f32 = 18.0;

/// Furthest the stick can travel from the base centre
pub const JOYSTICK_MAX_DISTANCE: f32 = JOYSTICK_SIZE / 2.0 - JOYSTICK_STICK_SIZE / 2.0;

/// One changed touch point, as much of it as the event carried
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSample {
    pub identifier: i32,
    /// Client coordinates; None when the event had no usable position
    pub client: Option<Vec2>,
}

#[derive(Debug, Clone, Copy)]
struct JoystickTouch {
    identifier: i32,
    /// Top-left corner of the joystick base in client coordinates
    base_origin: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: DirectionKeys,
    shooting: bool,
    /// Stick offset from the base centre after clamping and deadzone (px)
    stick: Vec2,
    joystick: Option<JoystickTouch>,
    pause_requested: bool,
    idle_mode: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    fn direction_mut(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            "ArrowUp" | "w" | "W" => Some(&mut self.keys.up),
            "ArrowDown" | "s" | "S" => Some(&mut self.keys.down),
            "ArrowLeft" | "a" | "A" => Some(&mut self.keys.left),
            "ArrowRight" | "d" | "D" => Some(&mut self.keys.right),
            _ => None,
        }
    }

    /// `key` is the layout-dependent key value, `code` the physical key.
    /// Returns true if the event was consumed.
    pub fn key_down(&mut self, key: &str, code: &str) -> bool {
        if code == "Space" {
            self.shooting = true;
            return true;
        }
        match key {
            "Escape" | "p" | "P" => {
                self.pause_requested = true;
                return true;
            }
            "i" | "I" => {
                self.idle_mode = !self.idle_mode;
                log::info!("Idle mode: {}", self.idle_mode);
                return true;
            }
            _ => {}
        }
        match self.direction_mut(key) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str, code: &str) -> bool {
        if code == "Space" {
            self.shooting = false;
            return true;
        }
        match self.direction_mut(key) {
            Some(flag) => {
                *flag = false;
                true
            }
            None => false,
        }
    }

    /// Primary mouse button fires
    pub fn mouse_button(&mut self, button: i16, pressed: bool) {
        if button == 0 {
            self.shooting = pressed;
        }
    }

    /// On-screen fire button
    pub fn shoot_button(&mut self, pressed: bool) {
        self.shooting = pressed;
    }

    pub fn request_pause(&mut self) {
        self.pause_requested = true;
    }

    /// First finger on the joystick base. Malformed events are logged and ignored.
    pub fn joystick_start(&mut self, touch: Option<TouchSample>, base_origin: Option<Vec2>) {
        if self.joystick.is_some() {
            return;
        }
        let Some(touch) = touch else {
            log::error!("Joystick touchstart: no changed touches in event");
            return;
        };
        let (Some(client), Some(base_origin)) = (touch.client, base_origin) else {
            log::error!(
                "Joystick touchstart: invalid coordinates ({:?}) or missing base rect",
                touch.client
            );
            return;
        };
        self.joystick = Some(JoystickTouch {
            identifier: touch.identifier,
            base_origin,
        });
        self.move_stick(client - base_origin);
    }

    pub fn joystick_move(&mut self, touches: &[TouchSample]) {
        let Some(active) = self.joystick else {
            return;
        };
        let Some(touch) = touches.iter().find(|t| t.identifier == active.identifier) else {
            return;
        };
        match touch.client {
            Some(client) => self.move_stick(client - active.base_origin),
            None => log::error!("Joystick touchmove: touch {} has no position", touch.identifier),
        }
    }

    pub fn joystick_end(&mut self, touches: &[TouchSample]) {
        let tracked = self
            .joystick
            .is_some_and(|j| touches.iter().any(|t| t.identifier == j.identifier));
        if tracked {
            self.joystick_cancel();
        }
    }

    pub fn joystick_cancel(&mut self) {
        self.joystick = None;
        self.stick = Vec2::ZERO;
        self.keys = DirectionKeys::default();
    }

    /// `local` is the touch position relative to the base's top-left corner
    fn move_stick(&mut self, local: Vec2) {
        let offset = (local - Vec2::splat(JOYSTICK_SIZE / 2.0)).clamp_length_max(JOYSTICK_MAX_DISTANCE);
        self.stick = if offset.x.abs() > JOYSTICK_DEADZONE || offset.y.abs() > JOYSTICK_DEADZONE {
            offset
        } else {
            Vec2::ZERO
        };
    }

    /// Stick deflection scaled to 0..=1, if any
    pub fn analog(&self) -> Option<Vec2> {
        (self.stick != Vec2::ZERO).then(|| self.stick / JOYSTICK_MAX_DISTANCE)
    }

    pub fn is_moving(&self) -> bool {
        self.keys.any() || self.stick != Vec2::ZERO
    }

    /// Read the current state for one tick, consuming one-shot requests
    pub fn snapshot(&mut self) -> TickInput {
        TickInput {
            keys: self.keys,
            shooting: self.shooting,
            analog: self.analog(),
            pause: std::mem::take(&mut self.pause_requested),
            idle_mode: self.idle_mode,
        }
    }
}
