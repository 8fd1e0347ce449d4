pub mod config_manager;
pub mod global_config;

pub use config_manager::{ConfigurationManager, WorldConfiguration};
pub use global_config::{get_config_manager, get_world_configuration};
