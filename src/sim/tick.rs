//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically, plus the
//! command handler the presentation layer uses to hand back decisions.

use glam::Vec2;
use rand::Rng;

use super::collectibles::{collect_plasma, collect_xp};
use super::collision::{enemy_laser_hits_ship, enemy_touches_ship, laser_hits_enemy};
use super::effects::{
    BurstSpec, ENEMY_FLAMES, ENEMY_SPARKS, MISSILE_DEBRIS, SHAKE_ENEMY_LASER, SHAKE_MISSILE,
    SHAKE_SHIP_HIT, SHIP_DEBRIS, burst, update_particles,
};
use super::enemy::{DamageOutcome, spawn_enemy, spawn_wave};
use super::missile::HomingMissile;
use super::progression::UpgradeKind;
use super::ship::DirectionKeys;
use super::state::{Command, GameEvent, GamePhase, GameState, PauseReason, Pickup};
use crate::consts::*;
use crate::error::GameError;
use crate::{angle_to, normalize_angle};

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Directional steering keys
    pub keys: DirectionKeys,
    /// Fire held
    pub shooting: bool,
    /// Analog stick vector (length 0..=1); overrides the keys when present
    pub analog: Option<Vec2>,
    /// Pause menu toggle
    pub pause: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    // Handle pause toggle (only between running and the pause menu)
    if input.pause {
        let command = match state.phase {
            GamePhase::Running => Some(Command::OpenPauseMenu),
            GamePhase::Paused(PauseReason::Menu) => Some(Command::Resume),
            _ => None,
        };
        if let Some(command) = command {
            if let Err(e) = state.apply_command(command) {
                log::warn!("Pause toggle ignored: {}", e);
            }
            if command == Command::OpenPauseMenu {
                return;
            }
        }
    }

    // Don't tick while paused or after game over
    if !state.is_running() {
        return;
    }

    state.time_ticks += 1;
    state.time_ms += FRAME_MS;

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    // Cosmetics first: shake jitter, stars, particles
    if state.tuning.screen_shake {
        state.shake.advance(&mut state.rng);
    }
    state.stars.update(state.ship.pos, state.viewport);
    update_particles(&mut state.particles);

    // Ship movement and scroll correction
    if !state.ship.exploding {
        let sensitivity = state.tuning.joystick_sensitivity;
        state.ship.steer(input.keys, input.analog, sensitivity);
        let offset = state
            .ship
            .advance_within_margin(state.viewport, state.tuning.scroll_margin_factor);
        if offset != Vec2::ZERO {
            state.shift_world(offset);
        }
    }
    state.ship.update();

    // Manual fire
    if input.shooting
        && !state.ship.exploding
        && cooldown_elapsed(state.last_shot_ms, state.time_ms, state.tuning.laser_cooldown_ms)
    {
        fire_lasers(state);
        state.last_shot_ms = Some(state.time_ms);
    }

    let viewport = state.viewport;
    for laser in &mut state.lasers {
        laser.advance(viewport);
    }

    update_enemies(state);

    collect_xp(state);
    collect_plasma(state);

    update_enemy_lasers(state);
    update_missiles(state);

    state.publish_hud();

    // A level-up above may have opened the shop; timers freeze with it
    if !state.is_running() {
        return;
    }

    if state.time_ms >= state.next_spawn_ms {
        spawn_enemy(state);
        state.next_spawn_ms = state.time_ms + state.tuning.enemy_spawn_interval_ms;
    }

    if !state.ship.exploding {
        auto_aim(state);
        auto_shoot(state);
        auto_missile(state);
    }

    if state.game_over_at_ms.is_some_and(|at| state.time_ms >= at) {
        state.end_game();
    }
}

fn cooldown_elapsed(last: Option<f64>, now: f64, cooldown: f64) -> bool {
    last.is_none_or(|t| now - t > cooldown)
}

fn fire_lasers(state: &mut GameState) {
    let shots = state
        .ship
        .fire(state.progression.upgrades.laser, state.tuning.base_laser_damage);
    state.lasers.extend(shots);
}

fn spawn_burst(state: &mut GameState, pos: Vec2, spec: BurstSpec) {
    let particles = burst(&mut state.rng, pos, spec);
    state.push_particles(particles);
}

fn trigger_shake(state: &mut GameState, preset: (f32, u32)) {
    if state.tuning.screen_shake {
        state.shake.trigger(preset);
    }
}

/// Blow up the ship and arm the delayed game over (first hit only)
fn destroy_ship(state: &mut GameState, shake: (f32, u32)) {
    if !state.ship.explode() {
        return;
    }
    log::info!("Ship destroyed at level {}", state.level);
    trigger_shake(state, shake);
    let pos = state.ship.pos;
    spawn_burst(state, pos, SHIP_DEBRIS);
    state.game_over_at_ms = Some(state.time_ms + state.tuning.game_over_delay_ms);
    state.emit(GameEvent::ShipDestroyed);
}

/// Where a plasma drop lands: nudged toward the centre, kept off the edges
pub fn plasma_drop_position(enemy_pos: Vec2, viewport: Vec2) -> Vec2 {
    let to_center = viewport * 0.5 - enemy_pos;
    let nudged = enemy_pos + to_center.normalize_or_zero() * PLASMA_CENTER_BIAS;
    let pad = Vec2::splat(PLASMA_EDGE_PADDING);
    nudged.clamp(pad, (viewport - pad).max(pad))
}

/// The single reward for a kill: one XP orb, maybe a plasma cell, one kill
fn award_kill(state: &mut GameState, pos: Vec2) {
    state.xp_points.push(Pickup::xp(pos));
    if state.rng.random::<f32>() < state.tuning.plasma_drop_chance {
        let drop = plasma_drop_position(pos, state.viewport);
        state.plasma_cells.push(Pickup::plasma(drop));
    }
    state.kills += 1;
    spawn_burst(state, pos, ENEMY_FLAMES);
    spawn_burst(state, pos, ENEMY_SPARKS);
}

/// Pursuit, shooter fire, ship contact and laser hits
fn update_enemies(state: &mut GameState) {
    let ship_pos = state.ship.pos;
    let laser_factor = state.tuning.laser_hitbox_factor;
    let contact_factor = state.tuning.contact_hitbox_factor;

    let mut bolts = Vec::new();
    let mut kills = Vec::new();
    let mut ship_hit = false;

    for enemy in &mut state.enemies {
        if let Some(bolt) = enemy.update(ship_pos, &mut state.rng) {
            bolts.push(bolt);
        }

        if !state.ship.exploding
            && enemy.is_targetable()
            && enemy_touches_ship(enemy, &state.ship, contact_factor)
        {
            ship_hit = true;
        }

        for laser in state.lasers.iter_mut().filter(|l| l.active) {
            if !enemy.is_targetable() {
                break;
            }
            if laser_hits_enemy(laser.pos, enemy, laser_factor) {
                laser.active = false;
                if enemy.apply_damage(laser.damage) == DamageOutcome::Killed {
                    kills.push(enemy.pos);
                }
            }
        }
    }

    state.enemy_lasers.extend(bolts);
    state.lasers.retain(|l| l.active);
    state.enemies.retain(|e| e.alive);

    if ship_hit {
        destroy_ship(state, SHAKE_SHIP_HIT);
    }
    for pos in kills {
        award_kill(state, pos);
    }
}

fn update_enemy_lasers(state: &mut GameState) {
    let viewport = state.viewport;
    let ship = &state.ship;
    let mut ship_hit = false;

    state.enemy_lasers.retain_mut(|bolt| {
        if !bolt.advance(viewport) {
            return false;
        }
        if !ship.exploding && !ship_hit && enemy_laser_hits_ship(bolt.pos, ship) {
            ship_hit = true;
            return false;
        }
        true
    });

    if ship_hit {
        destroy_ship(state, SHAKE_ENEMY_LASER);
    }
}

fn update_missiles(state: &mut GameState) {
    let mut blasts = Vec::new();
    let mut kills = Vec::new();

    for missile in &mut state.missiles {
        missile.update(&state.enemies);
        if missile.should_detonate(&state.enemies)
            && let Some(killed) = missile.detonate(&mut state.enemies)
        {
            blasts.push(missile.pos);
            kills.extend(killed);
        }
    }
    state.missiles.retain(|m| !m.should_be_removed());

    for pos in blasts {
        trigger_shake(state, SHAKE_MISSILE);
        spawn_burst(state, pos, MISSILE_DEBRIS);
    }
    for pos in kills {
        award_kill(state, pos);
    }
}

fn nearest_enemy(state: &GameState) -> Option<(u32, Vec2)> {
    let ship = state.ship.pos;
    state
        .enemies
        .iter()
        .filter(|e| e.is_targetable())
        .min_by(|a, b| {
            a.pos
                .distance_squared(ship)
                .total_cmp(&b.pos.distance_squared(ship))
        })
        .map(|e| (e.id, e.pos))
}

/// Blend the heading toward the nearest enemy
fn auto_aim(state: &mut GameState) {
    if !state.progression.tech.auto_aim {
        return;
    }
    if let Some((_, target)) = nearest_enemy(state) {
        let diff = normalize_angle(angle_to(state.ship.pos, target) - state.ship.angle);
        state.ship.angle += diff * AUTO_AIM_BLEND;
    }
}

fn auto_shoot(state: &mut GameState) {
    if !state.progression.tech.auto_shoot {
        return;
    }
    if cooldown_elapsed(
        state.last_auto_shot_ms,
        state.time_ms,
        state.tuning.auto_shoot_cooldown_ms,
    ) {
        fire_lasers(state);
        state.last_auto_shot_ms = Some(state.time_ms);
    }
}

/// Launch a missile at the nearest enemy once the interval has passed
fn auto_missile(state: &mut GameState) {
    if !state.progression.tech.homing_missile || state.time_ms < state.next_missile_ms {
        return;
    }
    let Some((target, _)) = nearest_enemy(state) else {
        return;
    };
    let missile = HomingMissile::launch(
        &mut state.rng,
        state.ship.pos,
        state.ship.angle,
        Some(target),
    );
    state.missiles.push(missile);
    state.next_missile_ms = state.time_ms + state.tuning.auto_missile_interval_ms;
}

/// Demo pilot: turn toward the nearest enemy, keep shooting, back off when close
fn autopilot(state: &GameState, input: &mut TickInput) {
    input.shooting = true;
    input.analog = None;
    input.keys = DirectionKeys::default();

    let Some((_, target)) = nearest_enemy(state) else {
        input.keys.up = !state.xp_points.is_empty();
        return;
    };
    let diff = normalize_angle(angle_to(state.ship.pos, target) - state.ship.angle);
    input.keys.left = diff < -0.05;
    input.keys.right = diff > 0.05;

    let distance = state.ship.pos.distance(target);
    input.keys.down = distance < 120.0;
    input.keys.up = distance > 220.0;
}

impl GameState {
    /// Apply a decision coming back from the presentation layer
    pub fn apply_command(&mut self, command: Command) -> Result<(), GameError> {
        match (command, self.phase) {
            (Command::ChooseUpgrade(kind), GamePhase::Paused(PauseReason::Shop)) => {
                self.progression.apply_upgrade(kind);
                if kind == UpgradeKind::Speed {
                    self.ship.apply_speed_upgrade();
                }
                log::info!("Upgrade {:?} chosen at level {}", kind, self.level);
                self.phase = GamePhase::Running;
                self.emit(GameEvent::Resumed);
                if self.level % self.tuning.wave_interval == 0 {
                    spawn_wave(self);
                }
                Ok(())
            }
            (Command::OpenPauseMenu, GamePhase::Running) => {
                self.phase = GamePhase::Paused(PauseReason::Menu);
                let stats = self.stats();
                self.emit(GameEvent::PauseMenu(stats));
                Ok(())
            }
            (Command::Resume, GamePhase::Paused(PauseReason::Menu))
            | (Command::CloseTechTree, GamePhase::Paused(PauseReason::TechTree)) => {
                self.phase = GamePhase::Running;
                self.emit(GameEvent::Resumed);
                Ok(())
            }
            (
                Command::OpenTechTree,
                GamePhase::Running | GamePhase::Paused(PauseReason::Menu),
            ) if self.progression.tech_tree_available() => {
                self.phase = GamePhase::Paused(PauseReason::TechTree);
                self.emit(GameEvent::TechTreeOpened(self.progression.tech));
                Ok(())
            }
            (Command::UnlockTech(tech), GamePhase::Paused(PauseReason::TechTree)) => {
                self.progression.unlock_tech(tech, &self.tuning.tech_costs)?;
                log::info!(
                    "Unlocked {} ({} plasma left)",
                    tech.storage_key(),
                    self.progression.plasma
                );
                let progress = self.progression.to_progress();
                self.emit(GameEvent::PlasmaChanged(progress.plasma));
                self.emit(GameEvent::ProgressChanged(progress));
                self.emit(GameEvent::TechTreeOpened(self.progression.tech));
                Ok(())
            }
            (Command::Restart, _) => {
                self.restart();
                Ok(())
            }
            (command, phase) => Err(GameError::CommandRejected {
                command: command.name(),
                phase: phase.describe().to_string(),
            }),
        }
    }

    /// Fresh run with the same tuning and viewport, keeping persisted progress
    fn restart(&mut self) {
        let seed = self.rng.random::<u64>();
        let progress = self.progression.to_progress();
        log::info!("Restarting run (seed {})", seed);
        *self = GameState::with_viewport(seed, self.tuning.clone(), progress, self.viewport);
        self.emit(GameEvent::ExperienceChanged {
            current: self.experience,
            max: self.max_xp,
        });
        self.emit(GameEvent::LevelChanged {
            level: self.level,
            pop: false,
        });
        self.emit(GameEvent::PlasmaChanged(self.progression.plasma));
        self.emit(GameEvent::Resumed);
    }
}
