//! Hit tests between ships, enemies, projectiles and pickups
//!
//! Everything is a circle. Enemies carry two radii: a forgiving one for
//! laser hits and a tight one for body contact with the ship.

use glam::Vec2;

use super::enemy::Enemy;
use super::ship::Ship;
use crate::consts::ENEMY_LASER_HALF_WIDTH;

/// Strict circle overlap test on squared distances
#[inline]
pub fn circles_overlap(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Laser bolt against the enemy's enlarged laser hitbox
pub fn laser_hits_enemy(laser_pos: Vec2, enemy: &Enemy, hitbox_factor: f32) -> bool {
    circles_overlap(laser_pos, enemy.pos, enemy.laser_hit_radius(hitbox_factor))
}

/// Enemy body against the ship's collision radius
pub fn enemy_touches_ship(enemy: &Enemy, ship: &Ship, hitbox_factor: f32) -> bool {
    circles_overlap(
        enemy.pos,
        ship.pos,
        enemy.contact_radius(hitbox_factor) + ship.collision_radius(),
    )
}

/// Enemy bolt against the ship, padded by the bolt's half width
pub fn enemy_laser_hits_ship(bolt_pos: Vec2, ship: &Ship) -> bool {
    circles_overlap(bolt_pos, ship.pos, ship.collision_radius() + ENEMY_LASER_HALF_WIDTH)
}

/// Pickup inside the ship's collection radius
pub fn ship_reaches_pickup(ship: &Ship, pickup_pos: Vec2, pickup_radius: f32) -> bool {
    circles_overlap(ship.pos, pickup_pos, ship.xp_radius() + pickup_radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyType;

    #[test]
    fn test_laser_hitbox_is_larger_than_body() {
        let enemy = Enemy::new(1, Vec2::ZERO, EnemyType::Triangle, 1);
        // size 30: laser radius 21
        assert!(laser_hits_enemy(Vec2::new(20.0, 0.0), &enemy, 0.7));
        assert!(!laser_hits_enemy(Vec2::new(21.5, 0.0), &enemy, 0.7));
    }

    #[test]
    fn test_contact_uses_tight_radii() {
        let mut enemy = Enemy::new(1, Vec2::ZERO, EnemyType::Triangle, 1);
        let ship = Ship::new(Vec2::ZERO);
        // 30 * 0.38 + 40 * 0.28 = 22.6
        enemy.pos = Vec2::new(22.0, 0.0);
        assert!(enemy_touches_ship(&enemy, &ship, 0.38));
        enemy.pos = Vec2::new(23.0, 0.0);
        assert!(!enemy_touches_ship(&enemy, &ship, 0.38));
    }

    #[test]
    fn test_enemy_laser_padding() {
        let ship = Ship::new(Vec2::ZERO);
        // 11.2 + 5
        assert!(enemy_laser_hits_ship(Vec2::new(16.0, 0.0), &ship));
        assert!(!enemy_laser_hits_ship(Vec2::new(16.5, 0.0), &ship));
    }

    #[test]
    fn test_pickup_radius() {
        let ship = Ship::new(Vec2::ZERO);
        // 20 + 7
        assert!(ship_reaches_pickup(&ship, Vec2::new(26.0, 0.0), 7.0));
        assert!(!ship_reaches_pickup(&ship, Vec2::new(27.5, 0.0), 7.0));
    }
}
