/// Particle subsystem.
///
/// Purely cosmetic: gameplay never reads particles, and the subsystem owns a
/// separate RNG so effects never shift gameplay randomness. The live
/// particle count never exceeds `MAX_PARTICLES` (60% of it while lagging).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::collision::Vec2;
use crate::domain::entity::{Particle, Rgb};

pub const MAX_PARTICLES: usize = 500;

const SHIELD_COLOR: Rgb = Rgb::hex(0x4169E1);
const HURT_COLOR: Rgb = Rgb::hex(0xFF0000);
const BLAST_COLOR: Rgb = Rgb::hex(0xFF8C00);

pub struct Effects {
    pub particles: Vec<Particle>,
    pub enabled: bool,
    rng: StdRng,
}

impl Effects {
    pub fn new(seed: u64) -> Self {
        Effects {
            particles: Vec::with_capacity(MAX_PARTICLES),
            enabled: true,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn cap(lagging: bool) -> usize {
        if lagging { MAX_PARTICLES * 6 / 10 } else { MAX_PARTICLES }
    }

    /// Spray up to `count` particles from `pos`. Anything past the cap is dropped.
    pub fn burst(&mut self, pos: Vec2, color: Rgb, count: usize, speed: f32, life: u32, lagging: bool) {
        if !self.enabled { return; }
        let room = Self::cap(lagging).saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let s = self.rng.gen_range(0.3..=1.0) * speed;
            let l = self.rng.gen_range(life / 2..=life.max(1));
            self.particles.push(Particle {
                pos,
                vel: Vec2::from_angle(angle) * s,
                life: l,
                max_life: l,
                color,
            });
        }
    }

    pub fn cast(&mut self, pos: Vec2, color: Rgb, lagging: bool) {
        self.burst(pos, color, 6, 2.0, 18, lagging);
    }

    pub fn hit(&mut self, pos: Vec2, color: Rgb, lagging: bool) {
        self.burst(pos, color, 8, 3.0, 20, lagging);
    }

    pub fn death(&mut self, pos: Vec2, color: Rgb, lagging: bool) {
        self.burst(pos, color, 20, 4.0, 40, lagging);
    }

    pub fn shield_block(&mut self, pos: Vec2, lagging: bool) {
        self.burst(pos, SHIELD_COLOR, 10, 3.0, 20, lagging);
    }

    pub fn hurt(&mut self, pos: Vec2, lagging: bool) {
        self.burst(pos, HURT_COLOR, 10, 3.0, 25, lagging);
    }

    pub fn blast(&mut self, pos: Vec2, lagging: bool) {
        self.burst(pos, BLAST_COLOR, 40, 7.0, 45, lagging);
    }

    pub fn tick(&mut self) {
        self.particles.retain_mut(|p| p.tick());
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_cap() {
        let mut fx = Effects::new(1);
        for _ in 0..100 {
            fx.death(Vec2::new(10.0, 10.0), Rgb::hex(0xFFFFFF), false);
        }
        assert_eq!(fx.particles.len(), MAX_PARTICLES);
        fx.tick();
        assert!(fx.particles.len() <= MAX_PARTICLES);
    }

    #[test]
    fn lagging_cap_is_lower() {
        let mut fx = Effects::new(1);
        for _ in 0..100 {
            fx.blast(Vec2::ZERO, true);
        }
        assert_eq!(fx.particles.len(), 300);
        // already above the lag cap: nothing new is added
        let p = fx.particles[0].clone();
        fx.particles.extend(std::iter::repeat(p).take(50));
        let before = fx.particles.len();
        fx.hit(Vec2::ZERO, Rgb::hex(0), true);
        assert_eq!(fx.particles.len(), before);
    }

    #[test]
    fn particles_expire() {
        let mut fx = Effects::new(3);
        fx.hit(Vec2::ZERO, Rgb::hex(0), false);
        assert!(!fx.particles.is_empty());
        for _ in 0..25 {
            fx.tick();
        }
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn disabled_spawns_nothing() {
        let mut fx = Effects::new(3);
        fx.enabled = false;
        fx.blast(Vec2::ZERO, false);
        assert!(fx.particles.is_empty());
    }
}
