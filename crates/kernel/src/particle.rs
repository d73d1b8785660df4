//! Particle record types shared between the CPU seeding path and the GPU buffers.

use bytemuck::{Pod, Zeroable};

/// Four-component float record, 16 bytes, matching `vec4<f32>` in the kernels.
///
/// The same layout serves every particle attribute: positions and velocities
/// use x/y/z plus a w component (homogeneous 1.0 for positions, particle life
/// for velocities in the respawn variant), colors are RGBA.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vec4 {
    /// X component (or red).
    pub x: f32,
    /// Y component (or green).
    pub y: f32,
    /// Z component (or blue).
    pub z: f32,
    /// W component (or alpha).
    pub w: f32,
}

impl Vec4 {
    /// Construct from four components.
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// All-zero record.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// CPU-side initial particle state, uploaded once at startup.
///
/// All four arrays are parallel: index `i` across every array refers to the
/// same particle. The arrays must have equal length before upload; the
/// shared buffer set enforces this.
#[derive(Debug, Clone, Default)]
pub struct ParticleInit {
    /// Initial positions (w = 1.0).
    pub positions: Vec<Vec4>,
    /// Initial accumulated forces (normally all zero).
    pub forces: Vec<Vec4>,
    /// Initial velocities (w = particle life in the respawn variant).
    pub velocities: Vec<Vec4>,
    /// Initial colors (RGBA).
    pub colors: Vec<Vec4>,
}

impl ParticleInit {
    /// Create an empty set with room for `n` particles per attribute.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            positions: Vec::with_capacity(n),
            forces: Vec::with_capacity(n),
            velocities: Vec::with_capacity(n),
            colors: Vec::with_capacity(n),
        }
    }

    /// Append one particle's full attribute row.
    pub fn push(&mut self, position: Vec4, force: Vec4, velocity: Vec4, color: Vec4) {
        self.positions.push(position);
        self.forces.push(force);
        self.velocities.push(velocity);
        self.colors.push(color);
    }

    /// Number of particles (length of the position array).
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// `true` if no particles have been added.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// `true` if all four attribute arrays have the same length.
    pub fn lengths_match(&self) -> bool {
        let n = self.positions.len();
        self.forces.len() == n && self.velocities.len() == n && self.colors.len() == n
    }
}
