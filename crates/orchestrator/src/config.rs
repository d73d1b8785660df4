//! Configuration parsing and validation for simulation runs.

use serde::{Deserialize, Serialize};
use std::fs;

/// Main simulation configuration.
///
/// The constraint that the group size evenly divides the particle count is
/// enforced here, before any GPU work starts: an invalid combination
/// refuses to start rather than failing mid-initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Human-readable run name.
    pub name: String,
    /// Number of particles (global work size, fixed for the run).
    pub particle_count: u32,
    /// Bounding-box half-extent; particles reflect at ±this value.
    #[serde(default = "default_half_extent")]
    pub half_extent: f32,
    /// Per-frame time step (seconds).
    #[serde(default = "default_time_step")]
    pub time_step: f32,
    /// Local workgroup size for the force kernel.
    #[serde(default = "default_group_size")]
    pub group_size: u32,
    /// Force kernel entry point to use.
    #[serde(default = "default_force_kernel")]
    pub force_kernel: String,
    /// Allocate the respawn buffer extension and use the respawning update
    /// kernel.
    #[serde(default)]
    pub respawn: bool,
    /// Optional path to an external kernel source file; the embedded source
    /// is used when absent.
    #[serde(default)]
    pub kernel_source: Option<String>,
    /// Stop after this many frames (headless runs).
    #[serde(default)]
    pub max_frames: Option<u64>,
}

// Default values
fn default_half_extent() -> f32 {
    50.0
}

fn default_time_step() -> f32 {
    0.01
}

fn default_group_size() -> u32 {
    32
}

fn default_force_kernel() -> String {
    "force_naive".to_string()
}

impl SimulationConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &str) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path, e))?;

        let config: SimulationConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse config JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.particle_count == 0 {
            return Err("Particle count must be at least 1".to_string());
        }

        if self.half_extent <= 0.0 {
            return Err("Bounding-box half-extent must be positive".to_string());
        }

        if self.time_step <= 0.0 {
            return Err("Time step must be positive".to_string());
        }

        if self.group_size == 0 {
            return Err("Group size must be at least 1".to_string());
        }

        if self.particle_count % self.group_size != 0 {
            return Err(format!(
                "The group size must evenly divide the number of particles \
                 ({} % {} != 0)",
                self.particle_count, self.group_size
            ));
        }

        if self.force_kernel.is_empty() {
            return Err("Force kernel entry point name must not be empty".to_string());
        }

        if let Some(max_frames) = self.max_frames {
            if max_frames == 0 {
                return Err("max_frames must be at least 1".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> SimulationConfig {
        SimulationConfig {
            name: "test".to_string(),
            particle_count: 1024,
            half_extent: default_half_extent(),
            time_step: default_time_step(),
            group_size: default_group_size(),
            force_kernel: default_force_kernel(),
            respawn: false,
            kernel_source: None,
            max_frames: None,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn group_size_must_divide_particle_count() {
        // 1000 % 32 != 0: the run must refuse to start.
        let mut config = base_config();
        config.particle_count = 1000;
        config.group_size = 32;
        let err = config.validate().unwrap_err();
        assert!(err.contains("evenly divide"));

        config.group_size = 40; // 1000 % 40 == 0
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_particles_and_zero_group() {
        let mut config = base_config();
        config.particle_count = 0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.group_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_nonpositive_scalars() {
        let mut config = base_config();
        config.time_step = 0.0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.half_extent = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_minimal_json_with_defaults() {
        let json = r#"{ "name": "minimal", "particle_count": 64 }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.group_size, 32);
        assert_eq!(config.force_kernel, "force_naive");
        assert!(!config.respawn);
        assert!(config.validate().is_ok());
    }
}
