//! Kernel program loading.
//!
//! Compiles WGSL kernel source for the selected device, with the tile size
//! injected into the source text before compilation so kernel-local
//! fixed-size scratch arrays are sized at compile time. Build success means
//! the program is loadable, nothing more — numerical correctness is the
//! kernel author's problem.

use crate::error::SimError;

use super::context::GpuContext;

/// Tokens in the kernel source that the loader rewrites. The shipped source
/// declares both with the placeholder value 64; any external source must do
/// the same to opt into tile-size injection.
const TILE_CONST_TOKEN: &str = "const TILE: u32 = 64u;";
const TILE_WORKGROUP_TOKEN: &str = "@workgroup_size(64)";

/// Build-time configuration parameters.
#[derive(Debug, Clone, Copy)]
pub struct ProgramConfig {
    /// Local group size for the force kernels, injected as the `TILE`
    /// compile-time constant.
    pub tile_size: u32,
}

/// A compiled kernel program.
#[derive(Debug)]
pub struct Program {
    /// The compiled shader module holding every entry point.
    pub module: wgpu::ShaderModule,
    /// Tile size the source was compiled with.
    pub tile_size: u32,
}

impl Program {
    /// Compile `source` for the context's device.
    ///
    /// On failure returns [`SimError::Build`] carrying the full build log
    /// (status, options, diagnostic text). This is the only diagnostic
    /// channel for kernel-side bugs, so the log is never truncated.
    pub fn build(ctx: &GpuContext, source: &str, config: &ProgramConfig) -> Result<Self, SimError> {
        let tile = config.tile_size;
        let configured = source
            .replace(TILE_CONST_TOKEN, &format!("const TILE: u32 = {tile}u;"))
            .replace(TILE_WORKGROUP_TOKEN, &format!("@workgroup_size({tile})"));

        tracing::debug!("building kernel program: {} bytes, TILE={}", configured.len(), tile);

        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("nbody_kernels"),
                source: wgpu::ShaderSource::Wgsl(configured.into()),
            });
        if let Some(e) = pollster::block_on(ctx.device.pop_error_scope()) {
            let log = format!("status: failed\noptions: TILE={tile}\n{e}");
            return Err(SimError::Build { log });
        }

        tracing::debug!("kernel program built");
        Ok(Self {
            module,
            tile_size: tile,
        })
    }
}
