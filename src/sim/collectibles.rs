//! Magnet pull and pickup of XP orbs and plasma cells

use glam::Vec2;

use super::collision::ship_reaches_pickup;
use super::effects::{XP_SPARKLE, burst};
use super::progression::level_up;
use super::state::{GameEvent, GameState, Pickup};
use super::ship::Ship;

/// Pull one pickup toward the ship by a fraction of the remaining offset
pub fn apply_magnet(pickup: &mut Pickup, ship_pos: Vec2, radius: f32, strength: f32) {
    if pickup.collected || radius <= 0.0 {
        return;
    }
    let offset = ship_pos - pickup.pos;
    if offset.length() < radius {
        pickup.pos += offset * strength;
    }
}

/// Magnet then pickup test; true if this call collected it
fn magnet_and_collect(pickup: &mut Pickup, ship: &Ship, radius: f32, strength: f32) -> bool {
    apply_magnet(pickup, ship.pos, radius, strength);
    ship_reaches_pickup(ship, pickup.pos, pickup.radius) && pickup.collect()
}

/// Resolve all XP orbs for this tick
pub fn collect_xp(state: &mut GameState) {
    let radius = state.progression.magnet_radius();
    let strength = state.progression.magnet_strength();

    let mut collected_at = Vec::new();
    for xp in state.xp_points.iter_mut() {
        if magnet_and_collect(xp, &state.ship, radius, strength) {
            collected_at.push(xp.pos);
        }
    }
    state.xp_points.retain(|p| !p.collected);

    for pos in collected_at {
        let sparkle = burst(&mut state.rng, pos, XP_SPARKLE);
        state.push_particles(sparkle);
        state.experience += 1;
        state.xp_collected += 1;
        if state.experience >= state.max_xp {
            level_up(state);
        }
    }
}

/// Resolve all plasma cells for this tick
pub fn collect_plasma(state: &mut GameState) {
    let radius = state.progression.magnet_radius();
    let strength = state.progression.magnet_strength();

    let mut gained = 0;
    for cell in state.plasma_cells.iter_mut() {
        if magnet_and_collect(cell, &state.ship, radius, strength) {
            gained += 1;
        }
    }
    state.plasma_cells.retain(|p| !p.collected);

    if gained > 0 {
        state.progression.plasma += gained;
        log::debug!("Collected {} plasma (total {})", gained, state.progression.plasma);
        let plasma = state.progression.plasma;
        let progress = state.progression.to_progress();
        state.emit(GameEvent::PlasmaChanged(plasma));
        state.emit(GameEvent::ProgressChanged(progress));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Progress;
    use crate::sim::progression::UpgradeKind;
    use crate::sim::state::{GamePhase, PauseReason};
    use crate::tuning::Tuning;

    fn state() -> GameState {
        GameState::new(4, Tuning::default(), Progress::default())
    }

    #[test]
    fn test_magnet_pulls_proportionally() {
        let mut p = Pickup::xp(Vec2::new(30.0, 0.0));
        apply_magnet(&mut p, Vec2::ZERO, 40.0, 0.04);
        assert!((p.pos.x - 28.8).abs() < 1e-4);

        let mut far = Pickup::xp(Vec2::new(45.0, 0.0));
        apply_magnet(&mut far, Vec2::ZERO, 40.0, 0.04);
        assert_eq!(far.pos.x, 45.0);
    }

    #[test]
    fn test_no_pull_without_magnet() {
        let mut s = state();
        let ship = s.ship.pos;
        s.xp_points.push(Pickup::xp(ship + Vec2::new(30.0, 0.0)));
        collect_xp(&mut s);
        assert_eq!(s.xp_points[0].pos, ship + Vec2::new(30.0, 0.0));
    }

    #[test]
    fn test_xp_collected_once() {
        let mut s = state();
        let ship = s.ship.pos;
        s.xp_points.push(Pickup::xp(ship));
        collect_xp(&mut s);
        collect_xp(&mut s);
        assert_eq!(s.experience, 1);
        assert_eq!(s.xp_collected, 1);
        assert!(s.xp_points.is_empty());
        assert!(!s.particles.is_empty());
    }

    #[test]
    fn test_reaching_threshold_opens_shop() {
        let mut s = state();
        let ship = s.ship.pos;
        s.experience = s.max_xp - 1;
        s.xp_points.push(Pickup::xp(ship));
        collect_xp(&mut s);
        assert_eq!(s.level, 2);
        assert_eq!(s.phase, GamePhase::Paused(PauseReason::Shop));
    }

    #[test]
    fn test_plasma_notifies_progress() {
        let mut s = state();
        s.progression.apply_upgrade(UpgradeKind::Magnet);
        let ship = s.ship.pos;
        s.plasma_cells.push(Pickup::plasma(ship + Vec2::new(5.0, 0.0)));
        collect_plasma(&mut s);
        assert_eq!(s.progression.plasma, 1);
        let events = s.drain_events();
        assert_eq!(events[0], GameEvent::PlasmaChanged(1));
        assert!(matches!(&events[1], GameEvent::ProgressChanged(p) if p.plasma == 1));
    }
}
