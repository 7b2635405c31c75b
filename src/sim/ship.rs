//! The player's ship: movement model, firing and the scroll margin

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Laser;
use crate::consts::*;
use crate::heading;

/// Discrete steering inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionKeys {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Engine glow for the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThrustState {
    #[default]
    None,
    Forward,
    Backward,
}

#[derive(Debug, Clone)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading (radians)
    pub angle: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub friction: f32,
    pub width: f32,
    pub height: f32,
    pub thrust: ThrustState,
    pub exploding: bool,
    pub explosion_frame: u32,
}

impl Ship {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            max_speed: SHIP_MAX_SPEED,
            acceleration: SHIP_ACCELERATION,
            friction: SHIP_FRICTION,
            width: SHIP_WIDTH,
            height: SHIP_HEIGHT,
            thrust: ThrustState::None,
            exploding: false,
            explosion_frame: 0,
        }
    }

    /// Strict hitbox used for enemy contact and enemy lasers
    pub fn collision_radius(&self) -> f32 {
        self.width * SHIP_COLLISION_FACTOR
    }

    /// Generous radius used for picking up XP and plasma
    pub fn xp_radius(&self) -> f32 {
        self.width * SHIP_XP_RADIUS_FACTOR
    }

    /// Apply one tick of player control.
    ///
    /// An analog vector takes precedence over the direction keys. Friction
    /// is applied exactly once per call whichever mode ran.
    pub fn steer(&mut self, keys: DirectionKeys, analog: Option<Vec2>, sensitivity: f32) {
        match analog.filter(|v| v.length_squared() > f32::EPSILON) {
            Some(v) => self.steer_analog(v, sensitivity),
            None => self.steer_directional(keys),
        }
        self.vel *= self.friction;
    }

    fn steer_analog(&mut self, v: Vec2, sensitivity: f32) {
        let speed = (v.length() * sensitivity).min(self.max_speed);
        self.angle = v.y.atan2(v.x);
        self.vel = v.normalize() * speed;
        self.thrust = ThrustState::Forward;
    }

    fn steer_directional(&mut self, keys: DirectionKeys) {
        self.thrust = if keys.up {
            ThrustState::Forward
        } else if keys.down {
            ThrustState::Backward
        } else {
            ThrustState::None
        };

        if keys.left {
            self.angle -= SHIP_ROTATION_SPEED;
        }
        if keys.right {
            self.angle += SHIP_ROTATION_SPEED;
        }

        let dir = heading(self.angle);
        if keys.up {
            self.vel += dir * self.acceleration;
        }
        if keys.down {
            self.vel -= dir * self.acceleration * BACKWARD_THRUST_FACTOR;
        }

        let speed = self.vel.length();
        if speed > self.max_speed {
            self.vel *= self.max_speed / speed;
        }
    }

    /// Move by the current velocity while staying inside the scroll margin.
    ///
    /// Returns the overshoot the rest of the world must be shifted by
    /// (zero when the ship stayed inside the margin).
    pub fn advance_within_margin(&mut self, viewport: Vec2, margin_factor: f32) -> Vec2 {
        let margin = viewport * margin_factor;
        let next = self.pos + self.vel;
        let clamped = next.clamp(margin, viewport - margin);
        self.pos = clamped;
        clamped - next
    }

    /// Advance the explosion animation (no-op while intact)
    pub fn update(&mut self) {
        if self.exploding {
            self.explosion_frame += 1;
        }
    }

    /// Start the explosion. Returns false if the ship was already exploding.
    pub fn explode(&mut self) -> bool {
        if self.exploding {
            return false;
        }
        self.exploding = true;
        self.explosion_frame = 0;
        self.vel = Vec2::ZERO;
        self.thrust = ThrustState::None;
        true
    }

    /// Lasers leave from the nose; two parallel bolts from the double-laser level on
    pub fn fire(&self, laser_level: u32, base_damage: f32) -> Vec<Laser> {
        let dir = heading(self.angle);
        let tip = self.pos + dir * (self.width / 2.0);
        if laser_level >= DOUBLE_LASER_LEVEL {
            let side = Vec2::new(-dir.y, dir.x) * DOUBLE_LASER_OFFSET;
            vec![
                Laser::new(tip + side, self.angle, laser_level, base_damage),
                Laser::new(tip - side, self.angle, laser_level, base_damage),
            ]
        } else {
            vec![Laser::new(tip, self.angle, laser_level, base_damage)]
        }
    }

    pub fn apply_speed_upgrade(&mut self) {
        self.max_speed += SPEED_UPGRADE_INCREASE;
        self.acceleration += ACCELERATION_UPGRADE_INCREASE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys(up: bool, down: bool, left: bool, right: bool) -> DirectionKeys {
        DirectionKeys {
            up,
            down,
            left,
            right,
        }
    }

    #[test]
    fn test_thrust_then_friction() {
        let mut ship = Ship::new(Vec2::ZERO);
        ship.steer(keys(true, false, false, false), None, 4.5);
        // 0.15 forward thrust, then one friction pass
        assert!((ship.vel.x - 0.15 * 0.9).abs() < 1e-6);
        assert_eq!(ship.thrust, ThrustState::Forward);
    }

    #[test]
    fn test_backward_thrust_is_weaker() {
        let mut fwd = Ship::new(Vec2::ZERO);
        let mut back = Ship::new(Vec2::ZERO);
        fwd.steer(keys(true, false, false, false), None, 4.5);
        back.steer(keys(false, true, false, false), None, 4.5);
        assert!(back.vel.length() < fwd.vel.length());
        assert!(back.vel.x < 0.0);
    }

    #[test]
    fn test_analog_sets_heading() {
        let mut ship = Ship::new(Vec2::ZERO);
        ship.steer(DirectionKeys::default(), Some(Vec2::new(0.0, 1.0)), 4.5);
        assert!((ship.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!((ship.vel.length() - 4.0 * 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_double_laser_is_symmetric() {
        let ship = Ship::new(Vec2::new(100.0, 100.0));
        assert_eq!(ship.fire(1, 1.0).len(), 1);
        let pair = ship.fire(2, 1.0);
        assert_eq!(pair.len(), 2);
        let mid = (pair[0].pos + pair[1].pos) * 0.5;
        assert!((mid - Vec2::new(120.0, 100.0)).length() < 1e-4);
        assert!(((pair[0].pos - pair[1].pos).length() - 14.0).abs() < 1e-4);
    }

    #[test]
    fn test_margin_returns_overshoot() {
        let mut ship = Ship::new(Vec2::new(21.0, 50.0));
        ship.vel = Vec2::new(-5.0, 0.0);
        let offset = ship.advance_within_margin(Vec2::new(100.0, 100.0), 0.2);
        assert_eq!(ship.pos, Vec2::new(20.0, 50.0));
        assert_eq!(offset, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn test_explode_is_idempotent() {
        let mut ship = Ship::new(Vec2::ZERO);
        assert!(ship.explode());
        ship.update();
        assert!(!ship.explode());
        assert_eq!(ship.explosion_frame, 1);
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_max(
            start in (-10.0f32..10.0, -10.0f32..10.0),
            angle in -6.3f32..6.3,
            steps in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 1..60),
            speed_upgrades in 0u32..4,
        ) {
            let mut ship = Ship::new(Vec2::ZERO);
            for _ in 0..speed_upgrades {
                ship.apply_speed_upgrade();
            }
            ship.vel = Vec2::new(start.0, start.1).clamp_length_max(ship.max_speed);
            ship.angle = angle;
            for (up, down, left, right) in steps {
                ship.steer(keys(up, down, left, right), None, 4.5);
                prop_assert!(ship.vel.length() <= ship.max_speed * ship.friction + 1e-4);
            }
        }

        #[test]
        fn prop_analog_speed_is_capped(x in -1.0f32..1.0, y in -1.0f32..1.0, sens in 0.5f32..20.0) {
            let mut ship = Ship::new(Vec2::ZERO);
            ship.steer(DirectionKeys::default(), Some(Vec2::new(x, y)), sens);
            prop_assert!(ship.vel.length() <= ship.max_speed * ship.friction + 1e-4);
        }
    }
}
