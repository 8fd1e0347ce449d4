// src/config/global_config.rs
use crate::config::config_manager::{ConfigurationManager, WorldConfiguration};
use log::{info, warn};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

// Global static variable to hold the initialized ConfigurationManager
static GLOBAL_CONFIG_MANAGER: OnceCell<Arc<RwLock<ConfigurationManager>>> = OnceCell::new();

pub const CONFIG_PATH_ENV: &str = "WORLDGEN_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "worldgen.toml";

/// Path the global manager loads from: `$WORLDGEN_CONFIG`, else `worldgen.toml`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn internal_initialize() -> Arc<RwLock<ConfigurationManager>> {
    let config_path = config_path();

    let config_manager = if config_path.exists() {
        match ConfigurationManager::load_from_file(&config_path) {
            Ok(manager) => manager,
            Err(e) => {
                warn!(
                    "Failed to load global config from {:?}: {}. Using default configuration.",
                    config_path, e
                );
                ConfigurationManager::with_config(WorldConfiguration::default(), Some(config_path))
            }
        }
    } else {
        info!("No config at {:?}, using default configuration", config_path);
        ConfigurationManager::with_config(WorldConfiguration::default(), Some(config_path))
    };
    Arc::new(RwLock::new(config_manager))
}

/// Gets the process-wide ConfigurationManager, loading it on first use.
pub fn get_config_manager() -> &'static Arc<RwLock<ConfigurationManager>> {
    GLOBAL_CONFIG_MANAGER.get_or_init(internal_initialize)
}

/// Snapshot of the current global configuration.
pub fn get_world_configuration() -> WorldConfiguration {
    let manager = get_config_manager()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    manager.get_config().clone()
}
