//! Initial particle distribution.

use kernel::{ParticleInit, Vec4};
use rand::Rng;

use crate::config::SimulationConfig;

/// Seed the initial particle state for a run.
///
/// Particles are distributed uniformly in the ±half-extent cube with damped
/// random initial velocities (a tenth of the positional range, so the first
/// frames are not static). Forces start at zero and every particle starts
/// red; the update kernel reassigns colors from the first frame on.
pub fn seed_particles(config: &SimulationConfig) -> ParticleInit {
    let n = config.particle_count as usize;
    let b = config.half_extent;
    let mut rng = rand::thread_rng();
    let mut init = ParticleInit::with_capacity(n);

    for _ in 0..n {
        let position = Vec4::new(
            rng.gen_range(-b..=b),
            rng.gen_range(-b..=b),
            rng.gen_range(-b..=b),
            1.0,
        );

        let vb = b / 10.0;
        let life = if config.respawn {
            rng.gen_range(0.0..1.0)
        } else {
            0.0
        };
        let velocity = Vec4::new(
            rng.gen_range(-vb..=vb),
            rng.gen_range(-vb..=vb),
            rng.gen_range(-vb..=vb),
            life,
        );

        init.push(
            position,
            Vec4::zero(),
            velocity,
            Vec4::new(1.0, 0.0, 0.0, 1.0),
        );
    }

    init
}
