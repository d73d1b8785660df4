//! Error taxonomy for every device-facing operation.
//!
//! Each kind carries an explicit fatality classification. In the current
//! pipeline every kind is fatal: a compute-capable device, a valid kernel
//! program, and a compatible group size are hard preconditions, so callers
//! abort startup (or the frame loop) on the first error instead of retrying.

use thiserror::Error;

/// Errors produced by the simulation core.
#[derive(Debug, Error)]
pub enum SimError {
    /// No compute-capable adapter was exposed by any backend.
    #[error("no compute-capable GPU adapter found")]
    DeviceDiscovery,

    /// The adapter refused to create a device/queue pair.
    ///
    /// wgpu creates the command queue together with the device, so queue
    /// creation failures surface here as well.
    #[error("failed to create device context: {0}")]
    ContextCreation(String),

    /// Kernel program compilation failed. `log` holds the complete build
    /// diagnostic (status, options, message text) and is the only feedback
    /// channel for kernel-authoring bugs.
    #[error("kernel program build failed\n{log}")]
    Build {
        /// Full build log, untruncated.
        log: String,
    },

    /// A particle attribute buffer could not be allocated or populated.
    #[error("buffer allocation failed: {0}")]
    BufferAllocation(String),

    /// A named entry point could not be resolved from the compiled program.
    #[error("kernel entry point `{entry}` could not be resolved: {detail}")]
    KernelResolution {
        /// The entry point name that failed to resolve.
        entry: String,
        /// Device-reported detail.
        detail: String,
    },

    /// A kernel argument descriptor did not match the available buffers.
    #[error("kernel argument mismatch at binding {binding}: expected {expected}")]
    ArgumentMismatch {
        /// Positional binding index of the mismatched argument.
        binding: u32,
        /// Role the kernel signature expects at that binding.
        expected: &'static str,
    },

    /// A per-frame dispatch failed.
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Reasons a frame dispatch can fail.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The configured local group size does not evenly divide the particle
    /// count. Recoverable by configuration, but fatal to the run.
    #[error(
        "local group size {group_size} does not evenly divide particle count \
         {particle_count}; choose a group size that divides the particle count"
    )]
    GroupSizeMismatch {
        /// Global work size (particle count).
        particle_count: u32,
        /// Configured local group size.
        group_size: u32,
    },

    /// The dispatcher was invoked while the compute domain already held the
    /// shared buffers (protocol violation).
    #[error("frame dispatched while shared buffers were owned by {owner}")]
    WrongPhase {
        /// Domain that held the buffers at the time of the call.
        owner: &'static str,
    },

    /// The device rejected an enqueued command (argument/layout mismatch,
    /// device loss). Carries the captured validation text.
    #[error("device rejected enqueued work: {0}")]
    Device(String),
}

impl SimError {
    /// Whether this error terminates the run. Every current kind does; the
    /// classification is explicit so callers never guess.
    pub fn is_fatal(&self) -> bool {
        match self {
            SimError::DeviceDiscovery
            | SimError::ContextCreation(_)
            | SimError::Build { .. }
            | SimError::BufferAllocation(_)
            | SimError::KernelResolution { .. }
            | SimError::ArgumentMismatch { .. }
            | SimError::Dispatch(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_size_message_is_actionable() {
        let err = SimError::from(DispatchError::GroupSizeMismatch {
            particle_count: 1000,
            group_size: 32,
        });
        let msg = err.to_string();
        assert!(msg.contains("32"));
        assert!(msg.contains("1000"));
        assert!(msg.contains("evenly divide"));
        assert!(err.is_fatal());
    }

    #[test]
    fn build_error_preserves_log() {
        let log = "status: failed\noptions: TILE=32\nerror: expected ';'".to_string();
        let err = SimError::Build { log: log.clone() };
        assert!(err.to_string().contains(&log));
    }
}
