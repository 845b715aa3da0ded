//! Utility helpers.

pub mod fs;

pub use fs::{atomic_write, calculate_checksum, ensure_dir, ensure_parent_dir, read_lines};
