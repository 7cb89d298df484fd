use std::fs::{FileType, Metadata};
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// A single filesystem entry captured during a sweep.
///
/// Built from one non-following `stat()` at discovery time and never
/// refreshed afterwards: every decision about the entry is made against
/// this snapshot, even if the entry changes while the sweep is running.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Full path to the entry.
    pub path: PathBuf,

    /// What kind of entry this is.
    pub kind: EntryKind,

    /// Timestamps as seen by the discovery stat.
    pub times: Timestamps,
}

impl Entry {
    /// Build an entry from metadata obtained with `symlink_metadata`.
    ///
    /// Returns `None` when a timestamp is outside the representable range,
    /// which the sweep treats like any other unreadable entry.
    pub fn from_metadata(path: &Path, meta: &Metadata) -> Option<Self> {
        Some(Self {
            path: path.to_path_buf(),
            kind: EntryKind::from(meta.file_type()),
            times: Timestamps::from_metadata(meta)?,
        })
    }
}

/// The kind of a traversed entry.
///
/// Only the kinds whose timestamps move when they are used get their own
/// variant. Everything else (sockets, block devices, whatever the platform
/// invents next) lands in [`EntryKind::Other`] and is never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link.
    Symlink,

    /// A named pipe.
    Fifo,

    /// A character device.
    CharDevice,

    /// Anything else.
    Other,
}

impl From<FileType> for EntryKind {
    fn from(ft: FileType) -> Self {
        if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else if ft.is_fifo() {
            EntryKind::Fifo
        } else if ft.is_char_device() {
            EntryKind::CharDevice
        } else {
            EntryKind::Other
        }
    }
}

/// Modification, status-change and access times of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub modified: DateTime<Utc>,
    pub changed: DateTime<Utc>,
    pub accessed: DateTime<Utc>,
}

impl Timestamps {
    /// Read all three timestamps with nanosecond precision.
    pub fn from_metadata(meta: &Metadata) -> Option<Self> {
        Some(Self {
            modified: instant(meta.mtime(), meta.mtime_nsec())?,
            changed: instant(meta.ctime(), meta.ctime_nsec())?,
            accessed: instant(meta.atime(), meta.atime_nsec())?,
        })
    }

    /// Use the same instant for all three timestamps.
    pub fn uniform(at: DateTime<Utc>) -> Self {
        Self {
            modified: at,
            changed: at,
            accessed: at,
        }
    }
}

fn instant(secs: i64, nsecs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, u32::try_from(nsecs).ok()?)
}
