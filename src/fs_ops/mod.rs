//! Filesystem operations: content hashing, collision resolution and atomic transfers.

mod atomic;
pub mod collision;
mod copy;
mod file_move;
pub mod hash;
pub(crate) mod helpers;
mod io_copy;
mod metadata;
mod space;
mod util;

pub use collision::{MAX_COLLISION_PROBES, Resolution, resolve};
pub use copy::{TEMP_PREFIX, copy_file};
pub use file_move::{move_file, move_file_with};
pub use hash::content_hash;
pub use helpers::io_error_with_help;

pub(crate) use space::format_bytes;
