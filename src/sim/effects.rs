//! Cosmetic effects: particles, screen shake and the parallax star field
//!
//! Nothing in here feeds back into collisions or rewards.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Particle, ParticleKind};

/// Shake presets (intensity in px, duration in ticks)
pub const SHAKE_SHIP_HIT: (f32, u32) = (12.0, 24);
pub const SHAKE_ENEMY_LASER: (f32, u32) = (8.0, 15);
pub const SHAKE_MISSILE: (f32, u32) = (9.0, 12);

/// XP sparkle burst
const XP_PARTICLE_COUNT: usize = 12;
const XP_PARTICLE_SPEED: (f32, f32) = (1.2, 3.0);
const XP_PARTICLE_LIFE: (f32, f32) = (18.0, 28.0);
const XP_PARTICLE_SIZE: (f32, f32) = (1.5, 3.0);
const XP_PARTICLE_FRICTION: f32 = 0.93;

/// Parallax layers: (star count, parallax factor, star size)
const STAR_LAYERS: [(usize, f32, f32); 3] = [(60, 0.15, 1.2), (40, 0.08, 1.7), (20, 0.04, 2.2)];

/// Screen shake state; the offset is only meaningful to the renderer and
/// is rolled again (or cleared) at the start of every tick
#[derive(Debug, Clone, Default)]
pub struct ScreenShake {
    pub ticks_left: u32,
    pub intensity: f32,
    pub offset: Vec2,
}

impl ScreenShake {
    pub fn trigger(&mut self, (intensity, duration): (f32, u32)) {
        self.ticks_left = duration;
        self.intensity = intensity;
    }

    /// Advance one tick and roll a new jitter. Returns true while active.
    pub fn advance(&mut self, rng: &mut Pcg32) -> bool {
        if self.ticks_left == 0 {
            self.offset = Vec2::ZERO;
            return false;
        }
        self.offset = Vec2::new(
            (rng.random::<f32>() - 0.5) * self.intensity,
            (rng.random::<f32>() - 0.5) * self.intensity,
        );
        self.ticks_left -= 1;
        true
    }
}

#[derive(Debug, Clone)]
pub struct StarLayer {
    pub parallax: f32,
    pub size: f32,
    pub stars: Vec<Vec2>,
}

/// Bring a point that left the viewport back in from the opposite edge
pub fn wrap_to_viewport(mut p: Vec2, viewport: Vec2) -> Vec2 {
    if p.x < 0.0 {
        p.x += viewport.x;
    }
    if p.x > viewport.x {
        p.x -= viewport.x;
    }
    if p.y < 0.0 {
        p.y += viewport.y;
    }
    if p.y > viewport.y {
        p.y -= viewport.y;
    }
    p
}

/// Background stars drifting against the ship's motion
#[derive(Debug, Clone)]
pub struct StarField {
    pub layers: Vec<StarLayer>,
    last_ship: Option<Vec2>,
}

impl StarField {
    pub fn new(rng: &mut Pcg32, viewport: Vec2) -> Self {
        let layers = STAR_LAYERS
            .iter()
            .map(|&(count, parallax, size)| StarLayer {
                parallax,
                size,
                stars: (0..count)
                    .map(|_| {
                        Vec2::new(
                            rng.random::<f32>() * viewport.x,
                            rng.random::<f32>() * viewport.y,
                        )
                    })
                    .collect(),
            })
            .collect();
        Self {
            layers,
            last_ship: None,
        }
    }

    /// Drift stars opposite to the ship's on-screen motion, wrapping at the edges
    pub fn update(&mut self, ship_pos: Vec2, viewport: Vec2) {
        let delta = self.last_ship.map_or(Vec2::ZERO, |last| ship_pos - last);
        self.last_ship = Some(ship_pos);
        for layer in &mut self.layers {
            for star in &mut layer.stars {
                *star = wrap_to_viewport(*star - delta * layer.parallax, viewport);
            }
        }
    }

    /// Scroll correction; stars wrap so the field never empties
    pub fn shift(&mut self, offset: Vec2, viewport: Vec2) {
        for layer in &mut self.layers {
            for star in &mut layer.stars {
                *star = wrap_to_viewport(*star + offset, viewport);
            }
        }
    }

    pub fn star_count(&self) -> usize {
        self.layers.iter().map(|l| l.stars.len()).sum()
    }
}

/// Shape of a radial particle burst
#[derive(Debug, Clone, Copy)]
pub struct BurstSpec {
    pub kind: ParticleKind,
    pub count: usize,
    pub speed: (f32, f32),
    pub life: (f32, f32),
    pub size: (f32, f32),
    pub drag: f32,
}

pub const XP_SPARKLE: BurstSpec = BurstSpec {
    kind: ParticleKind::XpSparkle,
    count: XP_PARTICLE_COUNT,
    speed: XP_PARTICLE_SPEED,
    life: XP_PARTICLE_LIFE,
    size: XP_PARTICLE_SIZE,
    drag: XP_PARTICLE_FRICTION,
};

/// Flame core and spark spray of a dying enemy
pub const ENEMY_FLAMES: BurstSpec = BurstSpec {
    kind: ParticleKind::EnemyDebris,
    count: 16,
    speed: (1.5, 4.0),
    life: (10.0, 20.0),
    size: (2.0, 4.0),
    drag: 1.0,
};

pub const ENEMY_SPARKS: BurstSpec = BurstSpec {
    kind: ParticleKind::EnemyDebris,
    count: 22,
    speed: (2.2, 5.0),
    life: (14.0, 30.0),
    size: (1.5, 4.0),
    drag: 1.0,
};

pub const SHIP_DEBRIS: BurstSpec = BurstSpec {
    kind: ParticleKind::ShipDebris,
    count: 22,
    speed: (2.0, 4.5),
    life: (14.0, 26.0),
    size: (2.0, 4.0),
    drag: 1.0,
};

pub const MISSILE_DEBRIS: BurstSpec = BurstSpec {
    kind: ParticleKind::MissileDebris,
    count: 35,
    speed: (1.5, 5.0),
    life: (18.0, 30.0),
    size: (1.5, 5.0),
    drag: 1.0,
};

fn lerp_range(rng: &mut Pcg32, (lo, hi): (f32, f32)) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

/// Spawn a radial burst of particles at `pos`
pub fn burst(rng: &mut Pcg32, pos: Vec2, spec: BurstSpec) -> Vec<Particle> {
    (0..spec.count)
        .map(|_| {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let speed = lerp_range(rng, spec.speed);
            let life = lerp_range(rng, spec.life);
            Particle {
                pos,
                vel: crate::heading(angle) * speed,
                kind: spec.kind,
                life,
                max_life: life,
                size: lerp_range(rng, spec.size),
                drag: spec.drag,
            }
        })
        .collect()
}

/// Advance all particles one tick and drop the dead ones
pub fn update_particles(particles: &mut Vec<Particle>) {
    for p in particles.iter_mut() {
        p.pos += p.vel;
        p.vel *= p.drag;
        p.life -= 1.0;
    }
    particles.retain(|p| p.life > 0.0);
}
