//! Homing missiles that circle their target and detonate with area damage

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::enemy::{DamageOutcome, Enemy};
use super::state::EnemyId;
use crate::{heading, normalize_angle};

pub const MISSILE_RADIUS: f32 = 7.0;
pub const MISSILE_SPEED: f32 = 2.2;
/// Maximum heading change per tick (radians)
pub const MISSILE_TURN_SPEED: f32 = 0.045;
pub const MISSILE_LIFE: i32 = 240;
pub const MISSILE_EXPLOSION_RADIUS: f32 = 60.0;
pub const MISSILE_DAMAGE: f32 = 6.0;
pub const MISSILE_EXPLOSION_FRAMES: u32 = 30;
/// Ticks of straight flight allowed without any target
pub const MISSILE_GRACE_TICKS: u32 = 90;
const ORBIT_RADIUS_MIN: f32 = 50.0;
const ORBIT_RADIUS_JITTER: f32 = 20.0;
const ORBIT_PHASE_STEP: f32 = 0.13;
const TRAIL_LEN: usize = 12;

/// Lifecycle of a missile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissilePhase {
    /// In flight, orbiting a target or coasting while searching
    Seeking,
    /// Damage applied; explosion animation running
    Detonating { frame: u32 },
    /// Eligible for removal
    Removed,
}

#[derive(Debug, Clone)]
pub struct HomingMissile {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub radius: f32,
    /// Weak handle, re-validated every tick
    pub target: Option<EnemyId>,
    pub orbit_phase: f32,
    pub orbit_radius: f32,
    /// Remaining flight ticks; detonation is forced at zero
    pub life: i32,
    pub lost_target_ticks: u32,
    pub phase: MissilePhase,
    /// Recent positions, oldest first
    pub trail: VecDeque<Vec2>,
}

impl HomingMissile {
    pub fn launch(rng: &mut Pcg32, pos: Vec2, angle: f32, target: Option<EnemyId>) -> Self {
        Self {
            pos,
            angle,
            speed: MISSILE_SPEED,
            radius: MISSILE_RADIUS,
            target,
            orbit_phase: rng.random::<f32>() * std::f32::consts::TAU,
            orbit_radius: ORBIT_RADIUS_MIN + rng.random::<f32>() * ORBIT_RADIUS_JITTER,
            life: MISSILE_LIFE,
            lost_target_ticks: 0,
            phase: MissilePhase::Seeking,
            trail: VecDeque::with_capacity(TRAIL_LEN),
        }
    }

    pub fn is_seeking(&self) -> bool {
        self.phase == MissilePhase::Seeking
    }

    pub fn should_be_removed(&self) -> bool {
        self.phase == MissilePhase::Removed
    }

    fn find_target<'a>(&self, enemies: &'a [Enemy], id: EnemyId) -> Option<&'a Enemy> {
        enemies.iter().find(|e| e.id == id && e.is_targetable())
    }

    fn nearest(&self, enemies: &[Enemy]) -> Option<(EnemyId, Vec2)> {
        enemies
            .iter()
            .filter(|e| e.is_targetable())
            .min_by(|a, b| {
                a.pos
                    .distance_squared(self.pos)
                    .total_cmp(&b.pos.distance_squared(self.pos))
            })
            .map(|e| (e.id, e.pos))
    }

    /// Advance one tick of flight or explosion animation
    pub fn update(&mut self, enemies: &[Enemy]) {
        match self.phase {
            MissilePhase::Removed => return,
            MissilePhase::Detonating { frame } => {
                let frame = frame + 1;
                self.phase = if frame >= MISSILE_EXPLOSION_FRAMES {
                    MissilePhase::Removed
                } else {
                    MissilePhase::Detonating { frame }
                };
                return;
            }
            MissilePhase::Seeking => {}
        }

        let mut target_pos = self
            .target
            .and_then(|id| self.find_target(enemies, id))
            .map(|e| e.pos);

        if target_pos.is_none() {
            self.target = None;
            match self.nearest(enemies) {
                Some((id, pos)) => {
                    self.target = Some(id);
                    self.lost_target_ticks = 0;
                    let to = pos - self.pos;
                    self.orbit_phase = to.y.atan2(to.x);
                    target_pos = Some(pos);
                }
                None => {
                    self.lost_target_ticks += 1;
                    self.pos += heading(self.angle) * self.speed;
                    if self.lost_target_ticks > MISSILE_GRACE_TICKS {
                        self.life = 0;
                    }
                }
            }
        }

        if let Some(center) = target_pos {
            self.lost_target_ticks = 0;
            self.orbit_phase += ORBIT_PHASE_STEP;
            let aim = center + heading(self.orbit_phase) * self.orbit_radius;
            let to = aim - self.pos;
            let turn = normalize_angle(to.y.atan2(to.x) - self.angle);
            self.angle += turn.clamp(-MISSILE_TURN_SPEED, MISSILE_TURN_SPEED);
            self.pos += heading(self.angle) * self.speed;
        }

        self.life -= 1;

        self.trail.push_back(self.pos);
        if self.trail.len() > TRAIL_LEN {
            self.trail.pop_front();
        }
    }

    /// True once the missile touches its target or runs out of life
    pub fn should_detonate(&self, enemies: &[Enemy]) -> bool {
        if !self.is_seeking() {
            return false;
        }
        if self.life <= 0 {
            return true;
        }
        self.target
            .and_then(|id| self.find_target(enemies, id))
            .is_some_and(|e| self.pos.distance(e.pos) < self.radius + e.size / 2.0)
    }

    /// Apply area damage and start the explosion animation.
    ///
    /// Returns the positions of enemies this blast killed (their rewards
    /// are still owed), or `None` if the missile had already detonated.
    pub fn detonate(&mut self, enemies: &mut [Enemy]) -> Option<Vec<Vec2>> {
        if !self.is_seeking() {
            return None;
        }
        self.phase = MissilePhase::Detonating { frame: 0 };

        let mut kills = Vec::new();
        for enemy in enemies.iter_mut().filter(|e| e.is_targetable()) {
            if self.pos.distance(enemy.pos) < MISSILE_EXPLOSION_RADIUS + enemy.size / 2.0
                && enemy.apply_damage(MISSILE_DAMAGE) == DamageOutcome::Killed
            {
                kills.push(enemy.pos);
            }
        }
        log::debug!("Missile detonated at {:?}, {} kills", self.pos, kills.len());
        Some(kills)
    }

    pub fn shift(&mut self, offset: Vec2) {
        self.pos += offset;
        for p in self.trail.iter_mut() {
            *p += offset;
        }
    }
}
