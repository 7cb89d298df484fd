use std::collections::HashMap;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Original access and modification time of a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirTimes {
    pub accessed: SystemTime,
    pub modified: SystemTime,
}

/// Directory timestamps captured before a sweep mutated anything under them.
///
/// Removing an entry bumps its parent's mtime. The cache records a parent's
/// times the first time it is about to be disturbed and puts them back once
/// the root is done. The first capture of a path is kept: a later call sees
/// a directory that was already touched.
#[derive(Debug, Default)]
pub struct TimestampCache {
    entries: HashMap<PathBuf, DirTimes>,
}

impl TimestampCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `dir` unless it is already in the cache.
    ///
    /// A failed stat leaves the cache unchanged; that directory is then
    /// simply not restored.
    pub fn ensure_cached(&mut self, dir: &Path) {
        if self.entries.contains_key(dir) {
            return;
        }
        match read_times(dir) {
            Ok(times) => {
                self.entries.insert(dir.to_path_buf(), times);
            }
            Err(e) => {
                tracing::debug!(path = %dir.display(), error = %e, "cannot snapshot directory times");
            }
        }
    }

    pub fn get(&self, dir: &Path) -> Option<&DirTimes> {
        self.entries.get(dir)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every snapshot back. Returns how many directories were restored.
    ///
    /// Best effort: directories removed in the meantime, or that refuse the
    /// update, are skipped.
    pub fn restore(self) -> usize {
        let mut restored = 0;
        for (dir, times) in self.entries {
            match write_times(&dir, times) {
                Ok(()) => restored += 1,
                Err(e) => {
                    tracing::debug!(path = %dir.display(), error = %e, "cannot restore directory times");
                }
            }
        }
        restored
    }
}

fn read_times(dir: &Path) -> io::Result<DirTimes> {
    let meta = fs::metadata(dir)?;
    Ok(DirTimes {
        accessed: meta.accessed()?,
        modified: meta.modified()?,
    })
}

fn write_times(dir: &Path, times: DirTimes) -> io::Result<()> {
    let handle = File::open(dir)?;
    handle.set_times(
        FileTimes::new()
            .set_accessed(times.accessed)
            .set_modified(times.modified),
    )
}
