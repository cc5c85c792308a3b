pub mod config;
pub mod evidence;

pub use config::{Config, ConfigError, PathConfig};
pub use evidence::*;
