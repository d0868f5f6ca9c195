use ::config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use strix_mechanism::MotorMechanismSettings;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Top-level configuration for the bring-up binary.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Control-loop period in milliseconds.
    pub loop_period_ms: u64,
    /// How many ticks the soak loop runs before releasing the mechanism.
    pub ticks: u64,
    /// The mechanism under test.
    pub mechanism: MotorMechanismSettings,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .build()
        .and_then(|config| config.try_deserialize());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
