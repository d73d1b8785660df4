//! Frame dispatch protocol: group-size divisibility and ownership state.

use kernel::{
    DispatchError, GpuContext, GpuSimulation, ParticleInit, SimError, SimulationOptions, Vec4,
};

fn gpu_context() -> Option<GpuContext> {
    match GpuContext::initialize(None) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Skipping GPU test: {e}");
            None
        }
    }
}

fn grid_init(n: usize, spacing: f32) -> ParticleInit {
    let mut init = ParticleInit::with_capacity(n);
    let side = (n as f32).cbrt().ceil() as usize;
    for i in 0..n {
        let x = (i % side) as f32;
        let y = ((i / side) % side) as f32;
        let z = (i / (side * side)) as f32;
        init.push(
            Vec4::new(x * spacing, y * spacing, z * spacing, 1.0),
            Vec4::zero(),
            Vec4::zero(),
            Vec4::new(1.0, 0.0, 0.0, 1.0),
        );
    }
    init
}

fn options(group_size: u32) -> SimulationOptions {
    SimulationOptions {
        group_size,
        ..Default::default()
    }
}

#[test]
fn scenario_a_1024_particles_group_32() {
    let Some(ctx) = gpu_context() else { return };

    let init = grid_init(1024, 1.0);
    let mut sim =
        GpuSimulation::new(ctx, &init, &options(32)).expect("initialization failed");

    assert_eq!(sim.particle_count(), 1024);
    assert_eq!(sim.buffers().attribute_size(), 1024 * 16);

    sim.step_frame(0.01).expect("frame dispatch failed");
    assert_eq!(sim.dispatcher().frames_dispatched(), 1);
    assert!(sim.dispatcher().graphics_owns_buffers());
}

#[test]
fn tiled_force_kernel_dispatches_with_exact_division() {
    let Some(ctx) = gpu_context() else { return };

    // The tiled kernel stages positions through workgroup memory and has
    // no bounds guard; 512 particles at group size 64 divide exactly.
    let init = grid_init(512, 1.0);
    let mut sim = GpuSimulation::new(
        ctx,
        &init,
        &SimulationOptions {
            group_size: 64,
            force_entry: "force_tiled".to_string(),
            ..Default::default()
        },
    )
    .expect("initialization failed");
    for _ in 0..3 {
        sim.step_frame(0.01).expect("frame dispatch failed");
    }
    assert_eq!(sim.dispatcher().frames_dispatched(), 3);
}

#[test]
fn respawn_variant_runs_frames() {
    let Some(ctx) = gpu_context() else { return };

    let init = grid_init(64, 1.0);
    let mut sim = GpuSimulation::new(
        ctx,
        &init,
        &SimulationOptions {
            group_size: 32,
            respawn: true,
            ..Default::default()
        },
    )
    .expect("initialization failed");

    // Seeded lives are zero here, so every particle respawns each frame;
    // positions must stay pinned to their seeds and remain finite.
    for _ in 0..5 {
        sim.step_frame(0.3).expect("frame dispatch failed");
    }
    let positions = sim
        .buffers()
        .read_attribute(sim.context(), kernel::Attribute::Position);
    for (i, p) in positions.iter().enumerate() {
        assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
        let seed = init.positions[i];
        assert!(
            (p.x - seed.x).abs() < 1.0e-6
                && (p.y - seed.y).abs() < 1.0e-6
                && (p.z - seed.z).abs() < 1.0e-6,
            "expired particle {i} did not respawn at its seed"
        );
    }
}

#[test]
fn non_divisor_group_size_fails_before_enqueue() {
    let Some(ctx) = gpu_context() else { return };

    // 1000 % 32 != 0: the dispatcher must refuse with the actionable
    // mismatch error and never attempt a frame.
    let init = grid_init(1000, 1.0);
    let mut sim =
        GpuSimulation::new(ctx, &init, &options(32)).expect("initialization failed");

    let err = sim.step_frame(0.01).unwrap_err();
    match err {
        SimError::Dispatch(DispatchError::GroupSizeMismatch {
            particle_count,
            group_size,
        }) => {
            assert_eq!(particle_count, 1000);
            assert_eq!(group_size, 32);
        }
        other => panic!("expected group size mismatch, got: {other}"),
    }
    assert_eq!(sim.dispatcher().frames_dispatched(), 0);
    assert!(sim.dispatcher().graphics_owns_buffers());
}

#[test]
fn mismatch_message_names_both_sizes() {
    let err = SimError::from(DispatchError::GroupSizeMismatch {
        particle_count: 1000,
        group_size: 32,
    });
    let msg = err.to_string();
    assert!(msg.contains("1000") && msg.contains("32"));
    assert!(msg.contains("evenly divide"));
}
