// src/config/config_manager.rs

use serde::{Serialize, Deserialize};
use std::fs;
use std::path::{Path, PathBuf};
use log::{info, warn};

use crate::error::{Result, WorldError};
use crate::physics::PhysicsConfig;
use crate::terrain::terrain_config::{BiomeConfig, StreamingConfig, TerrainConfig, ZoneConfig};

pub fn default_world_seed() -> u64 { 1337 }
pub fn default_chunk_size() -> f64 { 200.0 }

// --- Main WorldConfiguration Struct ---
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorldConfiguration {
    #[serde(default = "default_world_seed")]
    pub world_seed: u64,
    /// Edge length of a square chunk in world units.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: f64,

    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub zone: ZoneConfig,
    #[serde(default)]
    pub biome: BiomeConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub streaming: StreamingConfig,
}

impl Default for WorldConfiguration {
    fn default() -> Self {
        Self {
            world_seed: default_world_seed(),
            chunk_size: default_chunk_size(),
            terrain: TerrainConfig::default(),
            zone: ZoneConfig::default(),
            biome: BiomeConfig::default(),
            physics: PhysicsConfig::default(),
            streaming: StreamingConfig::default(),
        }
    }
}

impl WorldConfiguration {
    /// Clamps every section into a usable state. Returns what was changed.
    pub fn validate_and_fix(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.chunk_size.is_finite() || self.chunk_size <= 0.0 {
            warnings.push(format!(
                "chunk_size must be positive, reset to {}",
                default_chunk_size()
            ));
            self.chunk_size = default_chunk_size();
        }
        warnings.extend(self.terrain.validate_and_fix());
        warnings.extend(self.zone.validate_and_fix());
        warnings.extend(self.biome.validate_and_fix(self.chunk_size));
        warnings.extend(self.physics.validate_and_fix());
        warnings.extend(self.streaming.validate_and_fix());
        warnings
    }

    /// Fails on anything `validate_and_fix` would have to change.
    pub fn validate(&self) -> Result<()> {
        let problems = self.clone().validate_and_fix();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(WorldError::InvalidConfig(problems.join("; ")))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

// Configuration Manager: owns the active configuration and where it came from
#[derive(Debug, Clone, Default)]
pub struct ConfigurationManager {
    current_config: WorldConfiguration,
    config_path: Option<PathBuf>, // Path used for loading/saving
}

impl ConfigurationManager {
    pub fn with_config(config: WorldConfiguration, config_path: Option<PathBuf>) -> Self {
        Self {
            current_config: config,
            config_path,
        }
    }

    // Load configuration from a TOML or JSON file, chosen by extension
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Loading config from: {:?}", path_ref);
        let config_str = fs::read_to_string(path_ref)?;

        let mut config: WorldConfiguration = match ConfigFormat::from_path(path_ref) {
            ConfigFormat::Json => serde_json::from_str(&config_str)?,
            ConfigFormat::Toml => toml::from_str(&config_str)?,
        };
        for warning in config.validate_and_fix() {
            warn!("{:?}: {}", path_ref, warning);
        }

        Ok(Self {
            current_config: config,
            config_path: Some(path_ref.to_path_buf()),
        })
    }

    // Save configuration to the stored path
    pub fn save_to_file(&self) -> Result<()> {
        let path = self
            .config_path
            .as_deref()
            .ok_or_else(|| {
                WorldError::InvalidConfig("cannot save configuration: no config path set".into())
            })?;
        info!("Saving config to: {:?}", path);
        let contents = match ConfigFormat::from_path(path) {
            ConfigFormat::Json => serde_json::to_string_pretty(&self.current_config)?,
            ConfigFormat::Toml => toml::to_string_pretty(&self.current_config)?,
        };
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn set_config_path<P: AsRef<Path>>(&mut self, path: P) {
        self.config_path = Some(path.as_ref().to_path_buf());
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    // Applies a whole new config struct, repaired before it is stored
    pub fn update_config(&mut self, mut updates: WorldConfiguration) -> Vec<String> {
        let warnings = updates.validate_and_fix();
        for warning in &warnings {
            warn!("{}", warning);
        }
        self.current_config = updates;
        warnings
    }

    pub fn get_config_mut(&mut self) -> &mut WorldConfiguration {
        &mut self.current_config
    }

    pub fn get_config(&self) -> &WorldConfiguration {
        &self.current_config
    }

    pub fn validate_and_fix(&mut self) -> Vec<String> {
        self.current_config.validate_and_fix()
    }

    pub fn validate(&self) -> Result<()> {
        self.current_config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("worldgen-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults_validate() {
        assert!(WorldConfiguration::default().validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let path = temp_path("roundtrip.toml");
        let mut config = WorldConfiguration::default();
        config.world_seed = 99;
        config.streaming.render_distance = 4;
        let manager = ConfigurationManager::with_config(config.clone(), Some(path.clone()));
        manager.save_to_file().unwrap();

        let loaded = ConfigurationManager::load_from_file(&path).unwrap();
        assert_eq!(loaded.get_config(), &config);
        assert_eq!(loaded.config_path(), Some(path.as_path()));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_json_selected_by_extension() {
        let path = temp_path("partial.json");
        fs::write(&path, r#"{ "world_seed": 5, "physics": { "gravity": 9.81 } }"#).unwrap();
        let loaded = ConfigurationManager::load_from_file(&path).unwrap();
        assert_eq!(loaded.get_config().world_seed, 5);
        assert_eq!(loaded.get_config().physics.gravity, 9.81);
        assert_eq!(loaded.get_config().chunk_size, 200.0);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_repairs_out_of_range_values() {
        let path = temp_path("repair.toml");
        fs::write(&path, "chunk_size = -3.0\n[biome]\nedge_blend_distance = 500.0\n").unwrap();
        let loaded = ConfigurationManager::load_from_file(&path).unwrap();
        assert_eq!(loaded.get_config().chunk_size, 200.0);
        assert_eq!(loaded.get_config().biome.edge_blend_distance, 100.0);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_parse_errors_surface() {
        let path = temp_path("broken.toml");
        fs::write(&path, "world_seed = \"not a number\"").unwrap();
        assert!(matches!(
            ConfigurationManager::load_from_file(&path),
            Err(WorldError::TomlParse(_))
        ));
        fs::remove_file(&path).ok();
        assert!(matches!(
            ConfigurationManager::load_from_file(temp_path("missing.toml")),
            Err(WorldError::Io(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut manager = ConfigurationManager::default();
        manager.get_config_mut().physics.max_sub_delta = 0.0;
        assert!(matches!(manager.validate(), Err(WorldError::InvalidConfig(_))));
        assert_eq!(manager.validate_and_fix().len(), 1);
        assert!(manager.validate().is_ok());
    }

    #[test]
    fn test_save_without_path_fails() {
        assert!(ConfigurationManager::default().save_to_file().is_err());
    }
}
