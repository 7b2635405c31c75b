//! Shop upgrades, the plasma-funded tech tree and level-ups

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, GameState, PauseReason};
use crate::consts::*;
use crate::error::GameError;
use crate::persistence::Progress;
use crate::tuning::TechCosts;

/// Choices offered by the level-up shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKind {
    Magnet,
    Laser,
    Speed,
}

/// Per-session shop levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    pub magnet: u32,
    pub laser: u32,
    pub speed: u32,
}

/// Permanent unlocks bought with plasma
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechKind {
    AutoShoot,
    AutoAim,
    EliteHint,
    HomingMissile,
}

impl TechKind {
    pub const ALL: [TechKind; 4] = [
        TechKind::AutoShoot,
        TechKind::AutoAim,
        TechKind::EliteHint,
        TechKind::HomingMissile,
    ];

    /// Field name inside the persisted flags object
    pub fn storage_key(self) -> &'static str {
        match self {
            TechKind::AutoShoot => "autoShoot",
            TechKind::AutoAim => "autoAim",
            TechKind::EliteHint => "eliteHint",
            TechKind::HomingMissile => "homingMissile",
        }
    }

    pub fn cost(self, costs: &TechCosts) -> u32 {
        match self {
            TechKind::AutoShoot => costs.auto_shoot,
            TechKind::AutoAim => costs.auto_aim,
            TechKind::EliteHint => costs.elite_hint,
            TechKind::HomingMissile => costs.homing_missile,
        }
    }
}

/// Unlocked tech, stored as a JSON object of booleans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TechFlags {
    pub auto_shoot: bool,
    pub auto_aim: bool,
    pub elite_hint: bool,
    pub homing_missile: bool,
}

impl TechFlags {
    pub fn has(&self, tech: TechKind) -> bool {
        match tech {
            TechKind::AutoShoot => self.auto_shoot,
            TechKind::AutoAim => self.auto_aim,
            TechKind::EliteHint => self.elite_hint,
            TechKind::HomingMissile => self.homing_missile,
        }
    }

    fn set(&mut self, tech: TechKind) {
        match tech {
            TechKind::AutoShoot => self.auto_shoot = true,
            TechKind::AutoAim => self.auto_aim = true,
            TechKind::EliteHint => self.elite_hint = true,
            TechKind::HomingMissile => self.homing_missile = true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progression {
    pub upgrades: UpgradeLevels,
    pub tech: TechFlags,
    /// Persistent currency
    pub plasma: u32,
}

impl Progression {
    /// Start a session from persisted progress; shop levels always reset
    pub fn from_progress(progress: Progress) -> Self {
        Self {
            upgrades: UpgradeLevels::default(),
            tech: progress.tech,
            plasma: progress.plasma,
        }
    }

    pub fn to_progress(&self) -> Progress {
        Progress {
            tech: self.tech,
            plasma: self.plasma,
        }
    }

    /// Pull radius; zero until the first magnet upgrade
    pub fn magnet_radius(&self) -> f32 {
        match self.upgrades.magnet {
            0 => 0.0,
            n => MAGNET_BASE_RADIUS + n as f32 * MAGNET_RADIUS_INCREASE,
        }
    }

    /// Fraction of the remaining offset closed per tick
    pub fn magnet_strength(&self) -> f32 {
        match self.upgrades.magnet {
            0 => 0.0,
            n => MAGNET_BASE_STRENGTH + n as f32 * MAGNET_STRENGTH_INCREASE,
        }
    }

    /// The tech tree is offered once the player owns any plasma
    pub fn tech_tree_available(&self) -> bool {
        self.plasma > 0
    }

    /// Bump a shop level
    pub fn apply_upgrade(&mut self, kind: UpgradeKind) {
        match kind {
            UpgradeKind::Magnet => self.upgrades.magnet += 1,
            UpgradeKind::Laser => self.upgrades.laser += 1,
            UpgradeKind::Speed => self.upgrades.speed += 1,
        }
    }

    /// Buy a tech unlock. Plasma is only spent when the purchase succeeds.
    pub fn unlock_tech(&mut self, tech: TechKind, costs: &TechCosts) -> Result<(), GameError> {
        if self.tech.has(tech) {
            return Err(GameError::AlreadyUnlocked(tech));
        }
        let cost = tech.cost(costs);
        if self.plasma < cost {
            return Err(GameError::InsufficientPlasma {
                tech,
                cost,
                available: self.plasma,
            });
        }
        self.plasma -= cost;
        self.tech.set(tech);
        Ok(())
    }
}

/// Advance a level and open the shop. Only acts while running.
pub fn level_up(state: &mut GameState) {
    if !state.is_running() {
        return;
    }
    state.level += 1;
    state.experience = 0;
    state.max_xp += XP_INCREASE_PER_LEVEL;
    state.phase = GamePhase::Paused(PauseReason::Shop);
    log::info!("Level up to {} (next at {} XP)", state.level, state.max_xp);
    state.emit(GameEvent::ShopOpened);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_magnet_scales_with_level() {
        let mut p = Progression::default();
        assert_eq!(p.magnet_radius(), 0.0);
        p.apply_upgrade(UpgradeKind::Magnet);
        assert_eq!(p.magnet_radius(), 40.0);
        assert!((p.magnet_strength() - 0.04).abs() < 1e-6);
        p.apply_upgrade(UpgradeKind::Magnet);
        assert_eq!(p.magnet_radius(), 50.0);
    }

    #[test]
    fn test_unlock_spends_plasma_once() {
        let costs = TechCosts::default();
        let mut p = Progression {
            plasma: 30,
            ..Default::default()
        };
        p.unlock_tech(TechKind::AutoShoot, &costs).unwrap();
        assert!(p.tech.auto_shoot);
        assert_eq!(p.plasma, 30 - costs.auto_shoot);
        assert_eq!(
            p.unlock_tech(TechKind::AutoShoot, &costs),
            Err(GameError::AlreadyUnlocked(TechKind::AutoShoot))
        );
        assert_eq!(p.plasma, 30 - costs.auto_shoot);
    }

    #[test]
    fn test_unlock_rejects_insufficient_plasma() {
        let costs = TechCosts::default();
        let mut p = Progression {
            plasma: 1,
            ..Default::default()
        };
        assert!(matches!(
            p.unlock_tech(TechKind::HomingMissile, &costs),
            Err(GameError::InsufficientPlasma { available: 1, .. })
        ));
        assert!(!p.tech.homing_missile);
        assert_eq!(p.plasma, 1);
    }

    #[test]
    fn test_flags_accept_partial_objects() {
        let flags: TechFlags = serde_json::from_str(r#"{"autoShoot":true,"autoAim":false}"#).unwrap();
        assert!(flags.auto_shoot);
        assert!(!flags.homing_missile);
        let json = serde_json::to_string(&flags).unwrap();
        assert!(json.contains("\"eliteHint\":false"));
    }

    #[test]
    fn test_level_up_opens_shop() {
        let mut state = GameState::new(1, Tuning::default(), Progress::default());
        state.experience = state.max_xp;
        level_up(&mut state);
        assert_eq!(state.level, 2);
        assert_eq!(state.experience, 0);
        assert_eq!(state.max_xp, 10);
        assert_eq!(state.phase, GamePhase::Paused(PauseReason::Shop));
        assert_eq!(state.drain_events(), vec![GameEvent::ShopOpened]);

        level_up(&mut state);
        assert_eq!(state.level, 2);
    }
}
