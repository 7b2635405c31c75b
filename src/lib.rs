//! Space Ship Idle - A top-down arcade shooter with an idle-style tech tree
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ship, enemies, missiles, rewards)
//! - `platform`: Browser/native platform abstraction (input, storage, frame clock)
//! - `persistence`: Tech flags and plasma currency across sessions
//! - `tuning`: Data-driven game balance
//! - `ui`: Notification contract towards the presentation layer

pub mod error;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::GameError;
pub use persistence::Progress;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one display frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Milliseconds of simulation clock per tick
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default viewport when the host has not reported one yet
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;

    /// Ship hull (the hitboxes derive from the width)
    pub const SHIP_WIDTH: f32 = 40.0;
    pub const SHIP_HEIGHT: f32 = 28.0;
    pub const SHIP_COLLISION_FACTOR: f32 = 0.28;
    pub const SHIP_XP_RADIUS_FACTOR: f32 = 0.5;
    pub const SHIP_EXPLOSION_FRAMES: u32 = 24;

    /// Ship physics (per tick)
    pub const SHIP_ACCELERATION: f32 = 0.15;
    pub const SHIP_MAX_SPEED: f32 = 4.0;
    pub const SHIP_FRICTION: f32 = 0.90;
    pub const SHIP_ROTATION_SPEED: f32 = 0.07;
    pub const BACKWARD_THRUST_FACTOR: f32 = 0.7;
    pub const SPEED_UPGRADE_INCREASE: f32 = 1.2;
    pub const ACCELERATION_UPGRADE_INCREASE: f32 = 0.02;

    /// Player lasers
    pub const LASER_BASE_SPEED: f32 = 6.0;
    pub const LASER_SPEED_PER_LEVEL: f32 = 1.2;
    pub const LASER_DAMAGE_GROWTH: f32 = 1.10;
    pub const DOUBLE_LASER_LEVEL: u32 = 2;
    pub const DOUBLE_LASER_OFFSET: f32 = 7.0;

    /// Enemy lasers
    pub const ENEMY_LASER_SPEED: f32 = 5.0;
    pub const ENEMY_LASER_LIFE: u32 = 80;
    pub const ENEMY_LASER_HALF_WIDTH: f32 = 5.0;

    /// Enemies
    pub const ENEMY_SIZE: f32 = 30.0;
    pub const ENEMY_EXPLOSION_FRAMES: u32 = 14;
    pub const ENEMY_HIT_FLASH_FRAMES: u32 = 6;
    pub const ENEMY_PURSUIT_SCALE: f32 = 0.5;
    pub const ENEMY_HP_GROWTH: f32 = 1.10;

    /// Pickups
    pub const XP_RADIUS: f32 = 7.0;
    pub const PLASMA_RADIUS: f32 = 8.0;
    /// Plasma drops are nudged toward the viewport centre and kept off the edges
    pub const PLASMA_CENTER_BIAS: f32 = 40.0;
    pub const PLASMA_EDGE_PADDING: f32 = 24.0;

    /// Magnet upgrade
    pub const MAGNET_BASE_RADIUS: f32 = 30.0;
    pub const MAGNET_RADIUS_INCREASE: f32 = 10.0;
    pub const MAGNET_BASE_STRENGTH: f32 = 0.03;
    pub const MAGNET_STRENGTH_INCREASE: f32 = 0.01;

    /// Progression
    pub const INITIAL_LEVEL: u32 = 1;
    pub const INITIAL_MAX_XP: u32 = 5;
    pub const XP_INCREASE_PER_LEVEL: u32 = 5;

    /// Auto-aim blends this fraction of the heading error per tick
    pub const AUTO_AIM_BLEND: f32 = 0.18;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle`
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the vector from `from` to `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-4);
        assert!((normalize_angle(-2.5 * PI) + PI / 2.0).abs() < 1e-4);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-4);
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_angle_to_and_heading_agree() {
        let a = angle_to(Vec2::new(10.0, 10.0), Vec2::new(10.0, 20.0));
        let h = heading(a);
        assert!(h.x.abs() < 1e-5);
        assert!((h.y - 1.0).abs() < 1e-5);
    }
}
