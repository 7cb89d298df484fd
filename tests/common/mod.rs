#![allow(dead_code)]

use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use std::time::{Duration as StdDuration, SystemTime};

use chrono::{Duration, Utc};
use clean_tmps::Threshold;

const DAY: StdDuration = StdDuration::from_secs(24 * 60 * 60);

/// A threshold one day in the future.
///
/// ctime can't be set from userspace, so everything created by a test is
/// "old" against this threshold unless its atime/mtime are pushed past it
/// with [`make_recent`].
pub fn future_threshold() -> Threshold {
    Threshold::at(Utc::now() + Duration::days(1))
}

/// Whole seconds, ten days from now.
pub fn recent_instant() -> SystemTime {
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    SystemTime::UNIX_EPOCH + StdDuration::from_secs(secs) + 10 * DAY
}

/// Set atime and mtime of a file or directory, following symlinks.
pub fn set_times(path: &Path, accessed: SystemTime, modified: SystemTime) {
    File::open(path)
        .unwrap()
        .set_times(FileTimes::new().set_accessed(accessed).set_modified(modified))
        .unwrap();
}

/// Push atime and mtime beyond [`future_threshold`].
///
/// atime is kept a day ahead of mtime so relatime mounts don't bump it
/// when the walker reads a directory.
pub fn make_recent(path: &Path) {
    let at = recent_instant();
    set_times(path, at + DAY, at);
}

pub fn touch(path: &Path) {
    fs::write(path, b"stale").unwrap();
}

/// Everything below `root`, relative to it, sorted.
pub fn remaining(root: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap().path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    found.sort();
    found
}

pub fn times_of(path: &Path) -> (SystemTime, SystemTime) {
    let meta = fs::metadata(path).unwrap();
    (meta.accessed().unwrap(), meta.modified().unwrap())
}
