//! Fire particle simulation
//!
//! Particles age, rise, and collide with the scene's obstacles. An
//! impact can leave a burning location behind, and burning locations
//! keep emitting new particles until they go out.

use crate::rasterizer::{pack_rgb, Vec3};
use crate::scene;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// World-space draw radius of one particle.
pub const PARTICLE_RADIUS: f64 = 10.0;

/// Particles added per simulation tick while the emit button is held.
pub const EMIT_BURST: usize = 10;

/// Age gained per tick; life ends past 255.
const AGE_STEP: i32 = 3;
const MAX_AGE: i32 = 255;

/// Chance per tick that a burning location goes out on its own.
const BURNOUT_CHANCE: f64 = 0.005;
/// Chance per tick that a burning location emits a particle.
const FLARE_CHANCE: f64 = 0.5;

/// A camera burst: where new particles start and which way they go.
#[derive(Debug, Clone, Copy)]
pub struct Emission {
    pub origin: Vec3,
    pub dir: Vec3,
}

#[derive(Debug, Clone)]
pub struct FireParticle {
    pub loc: Vec3,
    pub dir: Vec3,
    pub ttl: i32,
    pub spread: f64,
}

impl FireParticle {
    /// Burst particle: random starting age up to 200, wide spread.
    pub fn burst(rng: &mut StdRng, loc: Vec3, dir: Vec3) -> Self {
        let ttl = (rng.gen::<f64>() * 200.0) as i32;
        Self::with_profile(rng, loc, dir, ttl, 0.4)
    }

    /// Particle with an explicit age and spread, scattered slightly
    /// around the requested location and direction. The location also
    /// gets a kick of three times the un-jittered direction.
    pub fn with_profile(rng: &mut StdRng, loc: Vec3, dir: Vec3, ttl: i32, spread: f64) -> Self {
        let theta = rng.gen::<f64>() * TAU;
        let a = rng.gen::<f64>() * 0.2;
        let b = rng.gen::<f64>() * 0.05;
        let jittered = dir + Vec3::new(theta.sin() * b, rng.gen::<f64>() * 0.1, theta.cos() * b);
        let scattered = loc + Vec3::new(theta.sin() * a, 0.0, theta.cos() * a) + dir.scale(3.0);
        Self {
            loc: scattered,
            dir: jittered,
            ttl,
            spread,
        }
    }

    /// Deep red young, brightening toward yellow with age.
    pub fn color(&self) -> u32 {
        let r = (self.ttl + 155).min(255) as u8;
        let g = (self.ttl - 155).max(0) as u8;
        pack_rgb(r, g, 0)
    }
}

/// All live particles and burning locations, advanced once per
/// simulation tick. Locked as a whole wherever the render loop reads
/// it, so a frame never sees a half-stepped state.
pub struct ParticleSystem {
    pub particles: Vec<FireParticle>,
    pub fires: Vec<Vec3>,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            fires: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded variant for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            fires: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One simulation step: the camera burst, then burning locations,
    /// then every particle's aging, motion, and collision.
    pub fn tick(&mut self, emission: Option<Emission>) {
        if let Some(e) = emission {
            for _ in 0..EMIT_BURST {
                let p = FireParticle::burst(&mut self.rng, e.origin, e.dir);
                self.particles.push(p);
            }
        }
        self.burn_fires();
        self.advance_particles();
    }

    /// Burning locations go out randomly or when something solid sits
    /// on them; half the time, the survivors emit a slow particle with
    /// a short spread.
    fn burn_fires(&mut self) {
        let Self {
            particles,
            fires,
            rng,
        } = self;
        fires.retain(|&loc| {
            if rng.gen::<f64>() < BURNOUT_CHANCE || scene::blocks(loc) {
                return false;
            }
            if rng.gen::<f64>() < FLARE_CHANCE {
                particles.push(FireParticle::with_profile(rng, loc, Vec3::ZERO, 200, 0.01));
            }
            true
        });
    }

    fn advance_particles(&mut self) {
        let Self {
            particles,
            fires,
            rng,
        } = self;
        let mut ignited = Vec::new();
        particles.retain_mut(|p| {
            if p.ttl + AGE_STEP > MAX_AGE {
                return false;
            }
            p.ttl += AGE_STEP;
            // speed tapers with age
            let next = p.loc + p.dir.scale((300 - p.ttl) as f64 / 255.0);
            if scene::blocks(next) {
                // an impact can leave the departure point burning
                if rng.gen::<f64>() < p.spread {
                    ignited.push(p.loc);
                }
                return false;
            }
            p.loc = next;
            p.loc.y += 0.2; // slight upward drift
            true
        });
        fires.append(&mut ignited);
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_spot() -> Vec3 {
        Vec3::new(50.0, 10.0, 50.0)
    }

    #[test]
    fn test_emission_adds_one_burst_per_tick() {
        let mut sys = ParticleSystem::with_seed(7);
        let e = Emission {
            origin: Vec3::new(50.0, 69.0, 50.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        };
        sys.tick(Some(e));
        assert_eq!(sys.particles.len(), EMIT_BURST);
        sys.tick(None);
        assert_eq!(sys.particles.len(), EMIT_BURST);
        sys.tick(Some(e));
        assert_eq!(sys.particles.len(), 2 * EMIT_BURST);
    }

    #[test]
    fn test_particles_age_and_expire() {
        let mut sys = ParticleSystem::with_seed(7);
        sys.particles.push(FireParticle {
            loc: free_spot(),
            dir: Vec3::ZERO,
            ttl: 253,
            spread: 0.0,
        });
        sys.tick(None);
        assert!(sys.particles.is_empty());
        assert!(sys.fires.is_empty());
    }

    #[test]
    fn test_live_particles_drift_upward() {
        let mut sys = ParticleSystem::with_seed(7);
        sys.particles.push(FireParticle {
            loc: free_spot(),
            dir: Vec3::ZERO,
            ttl: 0,
            spread: 0.0,
        });
        sys.tick(None);
        let p = &sys.particles[0];
        assert_eq!(p.ttl, 3);
        assert_eq!(p.loc.x, 50.0);
        assert_eq!(p.loc.z, 50.0);
        assert!((p.loc.y - 10.2).abs() < 1e-12);
    }

    #[test]
    fn test_impact_removes_and_ignites_the_departure_point() {
        let mut sys = ParticleSystem::with_seed(7);
        // aimed straight into the cube, guaranteed to spread
        sys.particles.push(FireParticle {
            loc: Vec3::new(4.0, 15.0, 15.0),
            dir: Vec3::X,
            ttl: 0,
            spread: 1.0,
        });
        sys.tick(None);
        assert!(sys.particles.is_empty());
        assert_eq!(sys.fires.len(), 1);
        assert_eq!(sys.fires[0].x, 4.0);
        assert_eq!(sys.fires[0].y, 15.0);
        assert_eq!(sys.fires[0].z, 15.0);
    }

    #[test]
    fn test_impact_with_zero_spread_never_ignites() {
        let mut sys = ParticleSystem::with_seed(7);
        sys.particles.push(FireParticle {
            loc: Vec3::new(4.0, 15.0, 15.0),
            dir: Vec3::X,
            ttl: 0,
            spread: 0.0,
        });
        sys.tick(None);
        assert!(sys.particles.is_empty());
        assert!(sys.fires.is_empty());
    }

    #[test]
    fn test_covered_fire_is_snuffed() {
        let mut sys = ParticleSystem::with_seed(7);
        sys.fires.push(Vec3::new(15.0, 15.0, 15.0)); // inside the cube
        sys.fires.push(scene::SPHERE_CENTER);
        sys.tick(None);
        assert!(sys.fires.is_empty());
    }

    #[test]
    fn test_open_fire_emits_until_it_goes_out() {
        let mut sys = ParticleSystem::with_seed(7);
        sys.fires.push(free_spot());
        let mut saw_particle = false;
        for _ in 0..40 {
            sys.tick(None);
            saw_particle |= !sys.particles.is_empty();
        }
        assert!(saw_particle || sys.fires.is_empty());
    }

    #[test]
    fn test_flare_profile_stays_near_the_fire() {
        let mut rng = StdRng::seed_from_u64(99);
        let at = free_spot();
        let p = FireParticle::with_profile(&mut rng, at, Vec3::ZERO, 200, 0.01);
        assert_eq!(p.ttl, 200);
        assert_eq!(p.spread, 0.01);
        // zero base direction means only the small scatter ring moves it
        assert!((p.loc - at).len() <= 0.2 + 1e-12);
        assert!(p.dir.len() < 0.2);
    }

    #[test]
    fn test_burst_gets_a_direction_kick() {
        let mut rng = StdRng::seed_from_u64(99);
        let at = free_spot();
        let p = FireParticle::burst(&mut rng, at, Vec3::X);
        assert!((0..200).contains(&p.ttl));
        assert_eq!(p.spread, 0.4);
        // three units along the request, plus at most the scatter ring
        assert!((p.loc.x - (at.x + 3.0)).abs() <= 0.2 + 1e-12);
        assert!((p.loc.z - at.z).abs() <= 0.2 + 1e-12);
        assert_eq!(p.loc.y, at.y);
    }

    #[test]
    fn test_color_brightens_with_age() {
        let mut p = FireParticle {
            loc: Vec3::ZERO,
            dir: Vec3::ZERO,
            ttl: 0,
            spread: 0.0,
        };
        assert_eq!(p.color(), 0x9B0000);
        p.ttl = 100;
        assert_eq!(p.color(), 0xFF0000);
        p.ttl = 255;
        assert_eq!(p.color(), 0xFF6400);
    }
}
