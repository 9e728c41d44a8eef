//! Property-based tests for the wind particle pool.
//!
//! - Pool size never changes
//! - A dead particle is never alive again without a respawn
//! - Respawn always yields full life and zero alpha

use glam::Vec3;
use ocean_sim::config::{ParticleConfig, WindConfig};
use ocean_sim::WindSimulator;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Spawn(f64),
    Update(f32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0f64..=1.0).prop_map(Op::Spawn),
        (0.0f32..0.5).prop_map(Op::Update),
    ]
}

fn wind() -> impl Strategy<Value = Vec3> {
    (-1.0f32..1.0, -1.0f32..1.0).prop_map(|(x, z)| Vec3::new(x, 0.0, z))
}

proptest! {
    #[test]
    fn no_reanimation_without_respawn(
        count in 1usize..16,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 1..80),
        w in wind(),
    ) {
        let particles = ParticleConfig { count, seed: Some(seed), ..Default::default() };
        let mut sim = WindSimulator::new(&particles, &WindConfig::default());
        let mut time = 0.0f32;

        for op in ops {
            let before: Vec<bool> = sim.pool().particles().iter().map(|p| p.is_alive()).collect();
            match op {
                Op::Spawn(probability) => {
                    let spawned = sim.try_spawn(probability, w, Vec3::ZERO);
                    for (i, p) in sim.pool().particles().iter().enumerate() {
                        if Some(i) == spawned {
                            prop_assert_eq!(p.life, particles.life);
                            prop_assert_eq!(p.color.w, 0.0);
                        } else {
                            prop_assert_eq!(p.is_alive(), before[i]);
                        }
                    }
                }
                Op::Update(dt) => {
                    time += dt;
                    sim.update(dt, time, w);
                    for (i, p) in sim.pool().particles().iter().enumerate() {
                        if !before[i] {
                            prop_assert!(!p.is_alive());
                        }
                        prop_assert!(p.color.w >= 0.0 && p.color.w <= 1.0);
                    }
                }
            }
            prop_assert_eq!(sim.pool().len(), count);
        }
    }
}
