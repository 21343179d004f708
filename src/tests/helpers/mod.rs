pub mod tempdir;
pub mod workspace;

// Re-export the helpers for easy access
pub use tempdir::unique_temp_dir;
pub use workspace::{set_mtime_ahead, write_file};
