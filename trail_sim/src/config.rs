use std::{
    env, fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{CONTROLLER_LAYER, ENERGY_LAYER, HOME_LAYER};

pub const BUILTIN_SIMULATION_CONFIG: &str = include_str!("data/simulation_config.json");

/// Environment variable pointing at a JSON override for [`SimulationConfig`].
pub const CONFIG_PATH_ENV: &str = "TRAIL_SIM_CONFIG_PATH";

/// Tunables for the trail dynamics and agent behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub diffusion: DiffusionConfig,
    pub dissipation: DissipationConfig,
    pub deposit: DepositConfig,
    pub navigation: NavigationConfig,
    pub layers: LayerConfig,
}

impl SimulationConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_SIMULATION_CONFIG)
            .expect("builtin simulation config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("diffusion.rate", self.diffusion.rate)?;
        check_fraction("dissipation.rate", self.dissipation.rate)?;
        check_fraction(
            "navigation.occupied_tolerance",
            self.navigation.occupied_tolerance,
        )?;
        for (field, name) in [
            ("layers.home", &self.layers.home),
            ("layers.energy", &self.layers.energy),
            ("layers.controller", &self.layers.controller),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "layer name must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse simulation config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read simulation config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid simulation config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionConfig {
    /// Fraction of a source cell moved to its lowest neighbour per pass.
    pub rate: f64,
    /// Cells below this value never spread.
    pub min_source: u8,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            rate: 0.01,
            min_source: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissipationConfig {
    pub rate: f64,
}

impl Default for DissipationConfig {
    fn default() -> Self {
        Self { rate: 0.01 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositConfig {
    /// Trail strength laid on the step where the bookkeeping was last reset.
    pub max_tile_amount: u8,
    /// Strength lost per step walked since then.
    pub min_deposit_amount: u8,
}

impl DepositConfig {
    /// Strength an agent lays after `steps` steps; may be negative far from the origin.
    pub fn amount_after(&self, steps: u32) -> i64 {
        self.max_tile_amount as i64 - steps as i64 * self.min_deposit_amount as i64
    }
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            max_tile_amount: 100,
            min_deposit_amount: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Steps a searching agent may wander before it gives up and heads home.
    pub search_max_steps: u32,
    /// Chance that a searching agent treats an occupied cell as passable.
    pub occupied_tolerance: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            search_max_steps: 100,
            occupied_tolerance: 1.0 / 3.0,
        }
    }
}

/// Layer names used by the goal state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub home: String,
    pub energy: String,
    pub controller: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            home: HOME_LAYER.to_string(),
            energy: ENERGY_LAYER.to_string(),
            controller: CONTROLLER_LAYER.to_string(),
        }
    }
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Builtin,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "file:{}", path.display()),
            ConfigSource::Builtin => f.write_str("builtin"),
        }
    }
}

/// Loads the config named by `TRAIL_SIM_CONFIG_PATH`, falling back to the
/// builtin copy when the variable is unset or the file is unusable.
pub fn load_simulation_config_from_env() -> (SimulationConfig, ConfigSource) {
    let override_path = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    if let Some(path) = override_path {
        match SimulationConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "trail_sim::config",
                    path = %path.display(),
                    "simulation_config.loaded=file"
                );
                return (config, ConfigSource::File(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "trail_sim::config",
                    path = %path.display(),
                    error = %err,
                    "simulation_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "trail_sim::config", "simulation_config.loaded=builtin");
    (SimulationConfig::builtin(), ConfigSource::Builtin)
}
