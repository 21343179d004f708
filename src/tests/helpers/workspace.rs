//! On-disk fixtures for index and provider tests

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Write `content` to `dir/name`, creating parent directories
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&path, content).expect("Failed to write fixture file");
    path
}

/// Push a file's mtime forward so staleness checks see a change even on
/// filesystems with coarse timestamps
pub fn set_mtime_ahead(path: &Path, seconds: u64) {
    let file = File::options()
        .write(true)
        .open(path)
        .expect("Failed to open fixture for mtime update");
    file.set_modified(SystemTime::now() + Duration::from_secs(seconds))
        .expect("Failed to set mtime");
}
