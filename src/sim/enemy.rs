//! Enemies: type table, pursuit, damage bookkeeping and spawn policy

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{EnemyId, EnemyLaser, GameEvent, GameState, HintKind};
use crate::consts::*;
use crate::{angle_to, heading};

/// Shooter enemies wait this many ticks (plus jitter) between shots
const SHOOT_COOLDOWN_BASE: f32 = 150.0;
const SHOOT_COOLDOWN_JITTER: f32 = 60.0;

/// Enemy archetypes, unlocked progressively by player level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyType {
    Triangle,
    Square,
    Pentagon,
    Shooter,
}

/// Base stats of an archetype
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub min_level: u32,
    pub base_hp: f32,
    pub base_speed: f32,
    pub can_shoot: bool,
}

impl EnemyType {
    pub const ALL: [EnemyType; 4] = [
        EnemyType::Triangle,
        EnemyType::Square,
        EnemyType::Pentagon,
        EnemyType::Shooter,
    ];

    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyType::Triangle => EnemyStats {
                min_level: 1,
                base_hp: 1.0,
                base_speed: 0.7,
                can_shoot: false,
            },
            EnemyType::Square => EnemyStats {
                min_level: 5,
                base_hp: 3.0,
                base_speed: 0.6,
                can_shoot: false,
            },
            EnemyType::Pentagon => EnemyStats {
                min_level: 10,
                base_hp: 7.0,
                base_speed: 0.5,
                can_shoot: false,
            },
            EnemyType::Shooter => EnemyStats {
                min_level: 18,
                base_hp: 10.0,
                base_speed: 0.45,
                can_shoot: true,
            },
        }
    }

    /// Types a player of `level` can meet
    pub fn available(level: u32) -> impl Iterator<Item = EnemyType> {
        Self::ALL
            .into_iter()
            .filter(move |t| level >= t.stats().min_level)
    }
}

/// Hit points for a type at a level: 10 % compounding per level above 1
pub fn scaled_hp(base_hp: f32, level: u32) -> f32 {
    let exp = level.saturating_sub(1) as i32;
    (base_hp * ENEMY_HP_GROWTH.powi(exp)).round().max(1.0)
}

/// Speed grows by 1 % per ten levels
pub fn scaled_speed(base_speed: f32, level: u32) -> f32 {
    base_speed * (1.0 + (level.saturating_sub(1) / 10) as f32 * 0.01)
}

/// What a single hit did to an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Enemy was already dying or gone
    Ignored,
    /// Damaged but still alive
    Hit,
    /// This hit crossed hp ≤ 0; the caller must grant the reward
    Killed,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub pos: Vec2,
    pub kind: EnemyType,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub size: f32,
    pub elite: bool,
    /// Cleared once the explosion animation has finished
    pub alive: bool,
    pub exploding: bool,
    pub explosion_frame: u32,
    pub is_hit: bool,
    pub hit_timer: u32,
    /// Set with the first lethal hit so rewards are granted once
    pub reward_granted: bool,
    /// Ticks until a shooter may fire again
    pub shoot_cooldown: f32,
}

impl Enemy {
    pub fn new(id: EnemyId, pos: Vec2, kind: EnemyType, level: u32) -> Self {
        let stats = kind.stats();
        let hp = scaled_hp(stats.base_hp, level);
        Self {
            id,
            pos,
            kind,
            hp,
            max_hp: hp,
            speed: scaled_speed(stats.base_speed, level),
            size: ENEMY_SIZE,
            elite: false,
            alive: true,
            exploding: false,
            explosion_frame: 0,
            is_hit: false,
            hit_timer: 0,
            reward_granted: false,
            shoot_cooldown: 0.0,
        }
    }

    /// Pick a type uniformly among those unlocked at `level`
    pub fn random(rng: &mut Pcg32, id: EnemyId, pos: Vec2, level: u32) -> Self {
        let types: Vec<EnemyType> = EnemyType::available(level).collect();
        let kind = if types.is_empty() {
            EnemyType::Triangle
        } else {
            types[rng.random_range(0..types.len())]
        };
        Self::new(id, pos, kind, level)
    }

    /// Alive, not yet exploding, still has hit points
    pub fn is_targetable(&self) -> bool {
        self.alive && !self.exploding && self.hp > 0.0
    }

    /// Radius for laser hits (deliberately larger than the body)
    pub fn laser_hit_radius(&self, factor: f32) -> f32 {
        self.size * factor
    }

    /// Radius for ship contact (deliberately tight)
    pub fn contact_radius(&self, factor: f32) -> f32 {
        self.size * factor
    }

    pub fn explosion_finished(&self) -> bool {
        self.exploding && self.explosion_frame > ENEMY_EXPLOSION_FRAMES
    }

    /// Advance one tick. Shooters may return a laser aimed at the ship.
    pub fn update(&mut self, ship_pos: Vec2, rng: &mut Pcg32) -> Option<EnemyLaser> {
        if self.exploding {
            self.explosion_frame += 1;
            if self.explosion_finished() {
                self.alive = false;
            }
            return None;
        }

        if self.hit_timer > 0 {
            self.hit_timer -= 1;
            if self.hit_timer == 0 {
                self.is_hit = false;
            }
        }

        if !self.alive {
            return None;
        }

        let angle = angle_to(self.pos, ship_pos);
        self.pos += heading(angle) * self.speed * ENEMY_PURSUIT_SCALE;

        let mut shot = None;
        if self.kind.stats().can_shoot {
            if self.shoot_cooldown <= 0.0 {
                self.shoot_cooldown =
                    SHOOT_COOLDOWN_BASE + rng.random::<f32>() * SHOOT_COOLDOWN_JITTER;
                shot = Some(EnemyLaser::new(self.pos, angle));
            }
            self.shoot_cooldown -= 1.0;
        }
        shot
    }

    /// Apply damage from a laser or missile splash
    pub fn apply_damage(&mut self, damage: f32) -> DamageOutcome {
        if !self.is_targetable() {
            return DamageOutcome::Ignored;
        }
        self.hp = (self.hp - damage).max(0.0);
        if self.hp <= 0.0 {
            self.destroy();
            if self.reward_granted {
                return DamageOutcome::Hit;
            }
            self.reward_granted = true;
            return DamageOutcome::Killed;
        }
        if !self.is_hit {
            self.is_hit = true;
            self.hit_timer = ENEMY_HIT_FLASH_FRAMES;
        }
        DamageOutcome::Hit
    }

    /// Begin the death animation
    pub fn destroy(&mut self) {
        if !self.exploding {
            self.exploding = true;
            self.explosion_frame = 0;
        }
    }
}

/// Random point on one of the four viewport edges
pub fn edge_position(rng: &mut Pcg32, viewport: Vec2) -> Vec2 {
    match rng.random_range(0..4) {
        0 => Vec2::new(0.0, rng.random::<f32>() * viewport.y),
        1 => Vec2::new(viewport.x, rng.random::<f32>() * viewport.y),
        2 => Vec2::new(rng.random::<f32>() * viewport.x, 0.0),
        _ => Vec2::new(rng.random::<f32>() * viewport.x, viewport.y),
    }
}

fn push_random_enemy(state: &mut GameState, level: u32) -> EnemyId {
    let id = state.next_entity_id();
    let pos = edge_position(&mut state.rng, state.viewport);
    let enemy = Enemy::random(&mut state.rng, id, pos, level);
    log::debug!("Spawned {:?} #{} hp={} at {:?}", enemy.kind, id, enemy.hp, pos);
    state.enemies.push(enemy);
    id
}

/// Regular spawn; on elite levels an elite joins the regular enemy
pub fn spawn_enemy(state: &mut GameState) {
    let level = state.level;
    push_random_enemy(state, level);

    if level > 0 && level % state.tuning.elite_interval == 0 {
        let id = push_random_enemy(state, level + state.tuning.elite_level_bonus);
        let size = state.tuning.elite_size;
        if let Some(elite) = state.enemies.iter_mut().find(|e| e.id == id) {
            elite.elite = true;
            elite.size = size;
        }
        log::info!("Elite enemy #{} spawned at level {}", id, level);
        if state.progression.tech.elite_hint {
            let duration_ms = state.tuning.hint_duration_ms;
            state.emit(GameEvent::Hint {
                kind: HintKind::EliteSpotted,
                duration_ms,
            });
        }
    }
}

/// Burst of enemies on wave milestones
pub fn spawn_wave(state: &mut GameState) {
    let level = state.level;
    let count = state.tuning.wave_size;
    for _ in 0..count {
        push_random_enemy(state, level);
    }
    log::info!("Enemy wave of {} at level {}", count, level);
    let duration_ms = state.tuning.hint_duration_ms;
    state.emit(GameEvent::Hint {
        kind: HintKind::WaveIncoming,
        duration_ms,
    });
}
