use crate::config::GenerateConfig;
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Loads a YAML config file into a [`GenerateConfig`].
///
/// Every field is optional in the file; omitted sections fall back to the
/// built-in defaults, so an empty mapping reproduces the zero-configuration
/// run. No environment variables are read.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GenerateConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: GenerateConfig = match serde_yaml::from_str(&config_content) {
        Ok(config) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            config
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    info!(
        staging_dir = %config.stage.staging_dir.display(),
        program = %config.generator.program,
        "Config loaded and merged with defaults"
    );

    Ok(config)
}
