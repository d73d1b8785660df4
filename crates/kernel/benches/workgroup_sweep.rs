//! Workgroup size sweep for the tiled force kernel.
//!
//! Tests group sizes 32, 64, 128, 256 at 4K and 16K particles.
//! Run with: cargo bench -p kernel --bench workgroup_sweep

use std::time::Instant;

use kernel::{GpuContext, GpuSimulation, ParticleInit, SimulationOptions, Vec4};

fn create_particle_cube(n: usize) -> ParticleInit {
    let side = (n as f32).cbrt().ceil() as usize;
    let spacing = 2.0;
    let mut init = ParticleInit::with_capacity(n);
    for i in 0..n {
        let x = (i % side) as f32;
        let y = ((i / side) % side) as f32;
        let z = (i / (side * side)) as f32;
        init.push(
            Vec4::new(x * spacing - 20.0, y * spacing - 20.0, z * spacing - 20.0, 1.0),
            Vec4::zero(),
            Vec4::zero(),
            Vec4::new(1.0, 0.0, 0.0, 1.0),
        );
    }
    init
}

fn bench_group_size(n: usize, group_size: u32, n_frames: usize) -> Option<f64> {
    let ctx = match GpuContext::initialize(None) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("GPU required for this bench: {e}");
            return None;
        }
    };

    let init = create_particle_cube(n);
    let mut sim = GpuSimulation::new(
        ctx,
        &init,
        &SimulationOptions {
            group_size,
            force_entry: "force_tiled".to_string(),
            ..Default::default()
        },
    )
    .expect("initialization failed");

    let dt = 0.001_f32;
    // Warmup
    for _ in 0..3 {
        sim.step_frame(dt).expect("frame failed");
    }

    let start = Instant::now();
    for _ in 0..n_frames {
        sim.step_frame(dt).expect("frame failed");
    }
    let elapsed = start.elapsed().as_secs_f64();
    let fps = n_frames as f64 / elapsed;

    println!(
        "  group={:>3}  {:>6} particles  {:>3} frames  {:.3}s  {:>8.1} frames/s",
        group_size, n, n_frames, elapsed, fps
    );
    Some(fps)
}

fn main() {
    println!("=== Workgroup Size Sweep ===\n");

    let group_sizes = [32u32, 64, 128, 256];

    for &(n, frames) in &[(4096usize, 60), (16_384, 20)] {
        println!("--- {} particles ---", n);
        let mut best_group = 0u32;
        let mut best_fps = 0.0f64;

        for &group in &group_sizes {
            if n as u32 % group != 0 {
                continue;
            }
            match bench_group_size(n, group, frames) {
                Some(fps) if fps > best_fps => {
                    best_fps = fps;
                    best_group = group;
                }
                Some(_) => {}
                None => return,
            }
        }
        println!("  Best: group={} ({:.1} frames/s)\n", best_group, best_fps);
    }
}
