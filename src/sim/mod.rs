//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only; timers run on the simulation clock
//! - Seeded RNG only
//! - Stable iteration order (insertion order, enemies addressed by ID)
//! - No rendering or platform dependencies

pub mod collectibles;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod missile;
pub mod progression;
pub mod ship;
pub mod state;
pub mod tick;

#[cfg(test)]
mod scenarios;

pub use enemy::{DamageOutcome, Enemy, EnemyType, spawn_enemy, spawn_wave};
pub use missile::{HomingMissile, MissilePhase};
pub use progression::{Progression, TechFlags, TechKind, UpgradeKind, UpgradeLevels, level_up};
pub use ship::{DirectionKeys, Ship, ThrustState};
pub use state::{
    Command, EnemyId, EnemyLaser, GameEvent, GamePhase, GameState, HintKind, Laser, PauseReason,
    Pickup, PickupKind, StatsSnapshot,
};
pub use tick::{TickInput, tick};
