//! Configuration.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{config_path, default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SORTMEDIA_CONFIG";

/// Subsecond digits used in file names unless configured otherwise.
pub const DEFAULT_PRECISION: u8 = 6;
