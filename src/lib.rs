//! Core library for `sortmedia`.
//!
//! Organizes photos and videos into a `YYYY/MM/YYYY-MM-DD/` archive named after their capture
//! time and camera. The pieces, in pipeline order:
//! - `media`: capture metadata from exiftool, with filename and mtime fallbacks.
//! - `pathgen`: pure destination naming and parsing.
//! - `fs_ops`: content-hash collision resolution and atomic copy/move.
//! - `engine`: discovery plus a bounded worker pool driving the per-file pipeline.
//! - `verify`: re-checks archived names against their metadata.

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs_ops;
pub mod media;
pub mod output;
pub mod pathgen;
pub mod platform;
pub mod verify;

pub use config::{
    Config, LogLevel, default_config_path, default_log_path, load_config_from_xml_path,
    path_has_symlink_ancestor,
};
pub use engine::{CancelToken, Engine, RunContext, RunOptions, RunReport, TransferMode};
pub use errors::SortError;
pub use fs_ops::{copy_file, move_file, resolve};
pub use pathgen::{DestinationCandidate, NamingConfig, NamingStyle};
