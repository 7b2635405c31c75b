//! Game state and core simulation types
//!
//! Everything the tick reads or writes lives in [`GameState`]; there is no
//! ambient global state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{ScreenShake, StarField};
use super::enemy::Enemy;
use super::missile::HomingMissile;
use super::progression::{Progression, TechFlags, UpgradeKind};
use super::ship::Ship;
use crate::consts::*;
use crate::persistence::Progress;
use crate::tuning::Tuning;

/// Why the simulation is currently frozen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    /// Pause menu opened by the player
    Menu,
    /// Level-up shop waiting for an upgrade choice
    Shop,
    /// Tech tree modal open
    TechTree,
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Frozen; in-flight entity state is kept untouched
    Paused(PauseReason),
    /// Run ended
    GameOver,
}

impl GamePhase {
    pub fn describe(&self) -> &'static str {
        match self {
            GamePhase::Running => "running",
            GamePhase::Paused(PauseReason::Menu) => "paused",
            GamePhase::Paused(PauseReason::Shop) => "in the shop",
            GamePhase::Paused(PauseReason::TechTree) => "in the tech tree",
            GamePhase::GameOver => "game over",
        }
    }
}

/// Read-only statistics handed to the pause menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub level: u32,
    pub kills: u32,
    pub xp_collected: u32,
    pub plasma: u32,
    pub magnet_level: u32,
    pub laser_level: u32,
    pub speed_level: u32,
    pub time_survived_ms: f64,
}

/// Timed banners shown by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintKind {
    EliteSpotted,
    WaveIncoming,
}

/// Notifications for the presentation layer, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ShopOpened,
    PauseMenu(StatsSnapshot),
    Resumed,
    TechTreeOpened(TechFlags),
    ExperienceChanged { current: u32, max: u32 },
    LevelChanged { level: u32, pop: bool },
    PlasmaChanged(u32),
    /// Persisted progress changed and should be written out
    ProgressChanged(Progress),
    Hint { kind: HintKind, duration_ms: f64 },
    ShipDestroyed,
    GameOver { level: u32 },
}

/// Player decisions coming back from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ChooseUpgrade(UpgradeKind),
    OpenPauseMenu,
    Resume,
    OpenTechTree,
    UnlockTech(super::progression::TechKind),
    CloseTechTree,
    Restart,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::ChooseUpgrade(_) => "choose upgrade",
            Command::OpenPauseMenu => "open pause menu",
            Command::Resume => "resume",
            Command::OpenTechTree => "open tech tree",
            Command::UnlockTech(_) => "unlock tech",
            Command::CloseTechTree => "close tech tree",
            Command::Restart => "restart",
        }
    }
}

/// A player laser bolt
#[derive(Debug, Clone)]
pub struct Laser {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub upgrade_level: u32,
    pub damage: f32,
    pub active: bool,
}

impl Laser {
    pub fn new(pos: Vec2, angle: f32, upgrade_level: u32, base_damage: f32) -> Self {
        Self {
            pos,
            angle,
            speed: LASER_BASE_SPEED + upgrade_level as f32 * LASER_SPEED_PER_LEVEL,
            upgrade_level,
            damage: base_damage * LASER_DAMAGE_GROWTH.powi(upgrade_level as i32),
            active: true,
        }
    }

    /// Move along the heading; leaving the viewport deactivates the bolt
    pub fn advance(&mut self, viewport: Vec2) {
        self.pos += crate::heading(self.angle) * self.speed;
        if !within_bounds(self.pos, viewport) {
            self.active = false;
        }
    }
}

/// A projectile fired by shooter enemies
#[derive(Debug, Clone)]
pub struct EnemyLaser {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub life: u32,
}

impl EnemyLaser {
    pub fn new(pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            angle,
            speed: ENEMY_LASER_SPEED,
            life: ENEMY_LASER_LIFE,
        }
    }

    /// Advance one tick; returns false once the bolt has expired
    pub fn advance(&mut self, viewport: Vec2) -> bool {
        self.pos += crate::heading(self.angle) * self.speed;
        self.life = self.life.saturating_sub(1);
        self.life > 0 && within_bounds(self.pos, viewport)
    }
}

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Xp,
    Plasma,
}

/// An XP orb or plasma cell lying in the world
#[derive(Debug, Clone)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f32,
    pub collected: bool,
}

impl Pickup {
    pub fn xp(pos: Vec2) -> Self {
        Self {
            kind: PickupKind::Xp,
            pos,
            radius: XP_RADIUS,
            collected: false,
        }
    }

    pub fn plasma(pos: Vec2) -> Self {
        Self {
            kind: PickupKind::Plasma,
            pos,
            radius: PLASMA_RADIUS,
            collected: false,
        }
    }

    /// Mark as collected. Returns false if it already was.
    pub fn collect(&mut self) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        true
    }
}

/// Palette slot of a particle, resolved by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    XpSparkle,
    EnemyDebris,
    ShipDebris,
    MissileDebris,
}

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// Remaining ticks
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    /// Velocity multiplier per tick
    pub drag: f32,
}

/// Stable handle to an enemy; survives compaction of the enemy list
pub type EnemyId = u32;

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Visible play area; the ship is kept inside its scroll margin
    pub viewport: Vec2,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulation clock (ms); all cooldowns and timers run on it
    pub time_ms: f64,

    pub ship: Ship,
    pub enemies: Vec<Enemy>,
    pub lasers: Vec<Laser>,
    pub enemy_lasers: Vec<EnemyLaser>,
    pub xp_points: Vec<Pickup>,
    pub plasma_cells: Vec<Pickup>,
    pub missiles: Vec<HomingMissile>,

    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub shake: ScreenShake,
    pub stars: StarField,

    pub progression: Progression,
    pub level: u32,
    pub experience: u32,
    pub max_xp: u32,
    pub kills: u32,
    pub xp_collected: u32,

    pub last_shot_ms: Option<f64>,
    pub last_auto_shot_ms: Option<f64>,
    pub next_spawn_ms: f64,
    pub next_missile_ms: f64,
    /// Set when the ship explodes; game over fires once the clock passes it
    pub game_over_at_ms: Option<f64>,

    /// Outgoing notifications (drain with [`GameState::drain_events`])
    pub events: Vec<GameEvent>,
    last_hud: (u32, u32, u32),
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning, progress: Progress) -> Self {
        Self::with_viewport(
            seed,
            tuning,
            progress,
            Vec2::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
        )
    }

    pub fn with_viewport(seed: u64, tuning: Tuning, progress: Progress, viewport: Vec2) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = StarField::new(&mut rng, viewport);
        let next_spawn_ms = tuning.enemy_spawn_interval_ms;
        let next_missile_ms = tuning.auto_missile_interval_ms;

        Self {
            seed,
            rng,
            tuning,
            viewport,
            phase: GamePhase::Running,
            time_ticks: 0,
            time_ms: 0.0,
            ship: Ship::new(viewport * 0.5),
            enemies: Vec::new(),
            lasers: Vec::new(),
            enemy_lasers: Vec::new(),
            xp_points: Vec::new(),
            plasma_cells: Vec::new(),
            missiles: Vec::new(),
            particles: Vec::new(),
            shake: ScreenShake::default(),
            stars,
            progression: Progression::from_progress(progress),
            level: INITIAL_LEVEL,
            experience: 0,
            max_xp: INITIAL_MAX_XP,
            kills: 0,
            xp_collected: 0,
            last_shot_ms: None,
            last_auto_shot_ms: None,
            next_spawn_ms,
            next_missile_ms,
            game_over_at_ms: None,
            events: Vec::new(),
            last_hud: (0, INITIAL_MAX_XP, INITIAL_LEVEL),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EnemyId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn stats(&self) -> StatsSnapshot {
        let up = &self.progression.upgrades;
        StatsSnapshot {
            level: self.level,
            kills: self.kills,
            xp_collected: self.xp_collected,
            plasma: self.progression.plasma,
            magnet_level: up.magnet,
            laser_level: up.laser,
            speed_level: up.speed,
            time_survived_ms: self.time_ms,
        }
    }

    /// Emit HUD notifications for anything that changed since last call
    pub fn publish_hud(&mut self) {
        let (exp, max, level) = self.last_hud;
        if exp != self.experience || max != self.max_xp {
            self.emit(GameEvent::ExperienceChanged {
                current: self.experience,
                max: self.max_xp,
            });
        }
        if level != self.level {
            self.emit(GameEvent::LevelChanged {
                level: self.level,
                pop: self.level > level,
            });
        }
        self.last_hud = (self.experience, self.max_xp, self.level);
    }

    /// React to a new host viewport size
    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.stars = StarField::new(&mut self.rng, viewport);
        self.ship.pos = self.ship.pos.clamp(Vec2::ZERO, viewport);
    }

    /// Translate everything except the ship (scroll correction)
    pub fn shift_world(&mut self, offset: Vec2) {
        for e in &mut self.enemies {
            e.pos += offset;
        }
        for l in &mut self.lasers {
            l.pos += offset;
        }
        for l in &mut self.enemy_lasers {
            l.pos += offset;
        }
        for m in &mut self.missiles {
            m.shift(offset);
        }
        for p in self.xp_points.iter_mut().chain(self.plasma_cells.iter_mut()) {
            p.pos += offset;
        }
        for p in &mut self.particles {
            p.pos += offset;
        }
        self.stars.shift(offset, self.viewport);
    }

    /// Enter game over. Repeated calls are no-ops.
    pub fn end_game(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.game_over_at_ms = None;
        log::info!(
            "Game over at level {} ({} kills, {:.1}s)",
            self.level,
            self.kills,
            self.time_ms / 1000.0
        );
        self.emit(GameEvent::GameOver { level: self.level });
    }

    /// Add particles while honouring the configured cap
    pub fn push_particles(&mut self, particles: impl IntoIterator<Item = Particle>) {
        let cap = self.tuning.particle_cap();
        for p in particles {
            if self.particles.len() >= cap {
                break;
            }
            self.particles.push(p);
        }
    }
}

/// True if `pos` lies inside the viewport rectangle
#[inline]
pub fn within_bounds(pos: Vec2, viewport: Vec2) -> bool {
    pos.x >= 0.0 && pos.x <= viewport.x && pos.y >= 0.0 && pos.y <= viewport.y
}
