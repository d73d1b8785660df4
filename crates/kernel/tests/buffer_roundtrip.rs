//! Upload/readback round-trip for the shared buffer set.
//!
//! Before any kernel dispatch, reading an attribute back must yield content
//! byte-identical to what was uploaded.

use kernel::{Attribute, BufferVariant, GpuContext, ParticleInit, SharedBuffers, Vec4};

/// Try to initialize a device context; skip the test when no adapter exists.
fn gpu_context() -> Option<GpuContext> {
    match GpuContext::initialize(None) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Skipping GPU test: {e}");
            None
        }
    }
}

/// Deterministic, non-trivial per-particle pattern.
fn patterned_init(n: usize) -> ParticleInit {
    let mut init = ParticleInit::with_capacity(n);
    for i in 0..n {
        let f = i as f32;
        init.push(
            Vec4::new(f, -f, f * 0.5, 1.0),
            Vec4::new(f * 0.25, 0.0, -f * 0.25, 0.0),
            Vec4::new(-f * 0.125, f * 0.125, 0.0, 0.0),
            Vec4::new(1.0, 0.0, f / n as f32, 1.0),
        );
    }
    init
}

fn assert_bytes_equal(uploaded: &[Vec4], read: &[Vec4], what: &str) {
    assert_eq!(
        bytemuck::cast_slice::<Vec4, u8>(uploaded),
        bytemuck::cast_slice::<Vec4, u8>(read),
        "{what} round-trip changed content"
    );
}

#[test]
fn all_attributes_round_trip_byte_identical() {
    let Some(ctx) = gpu_context() else { return };

    let init = patterned_init(256);
    let buffers = SharedBuffers::load_data(&ctx, &init, BufferVariant::Standard)
        .expect("buffer creation failed");

    assert_bytes_equal(
        &init.positions,
        &buffers.read_attribute(&ctx, Attribute::Position),
        "position",
    );
    assert_bytes_equal(
        &init.colors,
        &buffers.read_attribute(&ctx, Attribute::Color),
        "color",
    );
    assert_bytes_equal(
        &init.forces,
        &buffers.read_attribute(&ctx, Attribute::Force),
        "force",
    );
    assert_bytes_equal(
        &init.velocities,
        &buffers.read_attribute(&ctx, Attribute::Velocity),
        "velocity",
    );
}

#[test]
fn attribute_buffers_sized_sixteen_bytes_per_particle() {
    let Some(ctx) = gpu_context() else { return };

    let init = patterned_init(1024);
    let buffers = SharedBuffers::load_data(&ctx, &init, BufferVariant::Standard)
        .expect("buffer creation failed");

    assert_eq!(buffers.particle_count(), 1024);
    assert_eq!(buffers.attribute_size(), 1024 * 16);
    assert_eq!(buffers.position.size(), 1024 * 16);
    assert_eq!(buffers.color.size(), 1024 * 16);
    assert_eq!(buffers.force.size(), 1024 * 16);
    assert_eq!(buffers.velocity.size(), 1024 * 16);
}

#[test]
fn respawn_variant_allocates_seed_copies() {
    let Some(ctx) = gpu_context() else { return };

    let init = patterned_init(64);
    let buffers = SharedBuffers::load_data(&ctx, &init, BufferVariant::Respawn)
        .expect("buffer creation failed");

    assert_eq!(buffers.variant(), BufferVariant::Respawn);
    let pos_seed = buffers.position_seed.as_ref().expect("position seed missing");
    let vel_seed = buffers.velocity_seed.as_ref().expect("velocity seed missing");
    assert_eq!(pos_seed.size(), 64 * 16);
    assert_eq!(vel_seed.size(), 64 * 16);
}

#[test]
fn mismatched_or_empty_input_is_rejected() {
    let Some(ctx) = gpu_context() else { return };

    let empty = ParticleInit::default();
    assert!(SharedBuffers::load_data(&ctx, &empty, BufferVariant::Standard).is_err());

    let mut uneven = patterned_init(8);
    uneven.colors.pop();
    let err = SharedBuffers::load_data(&ctx, &uneven, BufferVariant::Standard).unwrap_err();
    assert!(err.to_string().contains("equal length"));
}
