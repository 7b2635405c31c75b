//! Game balance table
//!
//! Every value has a compiled-in default. Hosts may override any subset with
//! a JSON document; keys that are absent keep their defaults.

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Plasma price of each tech-tree unlock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TechCosts {
    pub auto_shoot: u32,
    pub auto_aim: u32,
    pub elite_hint: u32,
    pub homing_missile: u32,
}

impl Default for TechCosts {
    fn default() -> Self {
        Self {
            auto_shoot: 10,
            auto_aim: 15,
            elite_hint: 5,
            homing_missile: 25,
        }
    }
}

/// Runtime-tunable gameplay values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    // === Weapons ===
    /// Minimum time between manual shots (ms)
    pub laser_cooldown_ms: f64,
    /// Minimum time between auto-shoot volleys (ms)
    pub auto_shoot_cooldown_ms: f64,
    /// Time between auto-missile launches (ms)
    pub auto_missile_interval_ms: f64,
    /// Laser damage at upgrade level 0
    pub base_laser_damage: f32,

    // === Enemies ===
    /// Time between regular spawns (ms)
    pub enemy_spawn_interval_ms: f64,
    /// Chance that a kill also drops a plasma cell
    pub plasma_drop_chance: f32,
    /// An elite joins the regular spawn every this many levels
    pub elite_interval: u32,
    /// Levels added to the elite's stat scaling
    pub elite_level_bonus: u32,
    pub elite_size: f32,
    /// Enemy waves arrive on levels that are multiples of this
    pub wave_interval: u32,
    pub wave_size: u32,
    /// How long hint banners stay up (ms)
    pub hint_duration_ms: f64,

    // === Hitboxes ===
    /// Laser hits use the generous radius, ship contact the strict one
    pub laser_hitbox_factor: f32,
    pub contact_hitbox_factor: f32,

    // === Ship ===
    /// Fraction of the viewport kept as a scroll margin on each side
    pub scroll_margin_factor: f32,
    /// Ship speed at full analog deflection (before max-speed cap)
    pub joystick_sensitivity: f32,
    /// Delay between the ship exploding and the game-over screen (ms)
    pub game_over_delay_ms: f64,

    // === Effects ===
    pub screen_shake: bool,
    pub max_particles: usize,

    pub tech_costs: TechCosts,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            laser_cooldown_ms: 280.0,
            auto_shoot_cooldown_ms: 320.0,
            auto_missile_interval_ms: 2800.0,
            base_laser_damage: 0.8,

            enemy_spawn_interval_ms: 2500.0,
            plasma_drop_chance: 0.05,
            elite_interval: 10,
            elite_level_bonus: 8,
            elite_size: 44.0,
            wave_interval: 5,
            wave_size: 10,
            hint_duration_ms: 3500.0,

            laser_hitbox_factor: 0.7,
            contact_hitbox_factor: 0.38,

            scroll_margin_factor: 0.2,
            joystick_sensitivity: 4.5,
            game_over_delay_ms: 1000.0,

            screen_shake: true,
            max_particles: 1024,

            tech_costs: TechCosts::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| GameError::InvalidTuning(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), GameError> {
        if self.elite_interval == 0 {
            return Err(GameError::InvalidTuning("eliteInterval must be > 0".into()));
        }
        if self.wave_interval == 0 {
            return Err(GameError::InvalidTuning("waveInterval must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.plasma_drop_chance) {
            return Err(GameError::InvalidTuning(format!(
                "plasmaDropChance {} outside 0..=1",
                self.plasma_drop_chance
            )));
        }
        if !(0.0..0.5).contains(&self.scroll_margin_factor) {
            return Err(GameError::InvalidTuning(format!(
                "scrollMarginFactor {} outside 0..0.5",
                self.scroll_margin_factor
            )));
        }
        if self.enemy_spawn_interval_ms <= 0.0 {
            return Err(GameError::InvalidTuning(
                "enemySpawnIntervalMs must be positive".into(),
            ));
        }
        if self.laser_hitbox_factor <= 0.0 || self.contact_hitbox_factor <= 0.0 {
            return Err(GameError::InvalidTuning("hitbox factors must be positive".into()));
        }
        Ok(())
    }

    /// Effective particle cap (zero disables particles entirely)
    pub fn particle_cap(&self) -> usize {
        self.max_particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "waveSize": 3, "techCosts": { "autoAim": 2 } }"#).unwrap();
        assert_eq!(t.wave_size, 3);
        assert_eq!(t.tech_costs.auto_aim, 2);
        assert_eq!(t.tech_costs.auto_shoot, TechCosts::default().auto_shoot);
        assert_eq!(t.laser_cooldown_ms, 280.0);
    }

    #[test]
    fn test_rejects_zero_intervals() {
        assert!(matches!(
            Tuning::from_json(r#"{ "eliteInterval": 0 }"#),
            Err(GameError::InvalidTuning(_))
        ));
        assert!(Tuning::from_json(r#"{ "plasmaDropChance": 1.5 }"#).is_err());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }
}
