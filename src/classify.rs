use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::entry::{Entry, EntryKind, Timestamps};

/// Upper bound on the number of links followed while resolving a symlink.
///
/// Matches Linux's `MAXSYMLINKS`. A chain that is still a symlink after this
/// many hops is treated as broken.
pub const MAX_SYMLINK_HOPS: usize = 40;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What a sweep does with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the entry alone.
    Skip,

    /// Remove the entry right away.
    Unlink,

    /// An old directory. Try `rmdir` once everything below it was processed.
    DeferDirectoryCheck,

    /// A symlink to an old directory. Unlink it at the end of the sweep if
    /// the directory it points at is gone by then.
    DeferSymlinkCheck,
}

impl Action {
    /// Whether the entry goes on the deferred queue.
    pub fn is_deferred(self) -> bool {
        matches!(self, Action::DeferDirectoryCheck | Action::DeferSymlinkCheck)
    }
}

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// The cut-off instant of a run. Anything last touched at or before it is
/// old enough to go.
///
/// Computed once and passed by value, so a long sweep never shifts its own
/// cut-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Threshold(DateTime<Utc>);

impl Threshold {
    /// A threshold at an explicit instant.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// `days` before `now`. `None` if the result does not fit in a
    /// `DateTime`.
    pub fn days_before(now: DateTime<Utc>, days: u32) -> Option<Self> {
        let span = Duration::try_days(i64::from(days))?;
        now.checked_sub_signed(span).map(Self)
    }

    /// `days` before the current time.
    pub fn days_ago(days: u32) -> Option<Self> {
        Self::days_before(Utc::now(), days)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// `true` when `ts` is at or before the threshold.
    pub fn admits(&self, ts: DateTime<Utc>) -> bool {
        ts <= self.0
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify an entry captured by the walker.
pub fn classify_entry(entry: &Entry, threshold: Threshold) -> Action {
    classify(&entry.path, entry.kind, &entry.times, threshold)
}

/// Classify an entry from its non-following stat.
///
/// Symlinks are resolved through the filesystem; everything else is decided
/// by [`classify_resolved`] without touching the disk.
pub fn classify(path: &Path, kind: EntryKind, times: &Timestamps, threshold: Threshold) -> Action {
    match kind {
        EntryKind::Symlink => classify_symlink(path, threshold),
        _ => classify_resolved(kind, times, threshold),
    }
}

/// Decide on an entry that is known not to be a symlink.
///
/// Sockets, block devices and unknown kinds don't reliably update their
/// timestamps on use, so their age says nothing and they are always kept.
/// Directories are judged on mtime alone because reading them bumps atime.
/// Everything else needs mtime, ctime and atime all at or before the
/// threshold.
///
/// A `Symlink` kind here means the caller already followed one level and
/// got another link back; it is kept rather than followed again.
pub fn classify_resolved(kind: EntryKind, times: &Timestamps, threshold: Threshold) -> Action {
    match kind {
        EntryKind::Dir if threshold.admits(times.modified) => Action::DeferDirectoryCheck,
        EntryKind::Dir => Action::Skip,
        EntryKind::File | EntryKind::Fifo | EntryKind::CharDevice => {
            let old = [times.modified, times.changed, times.accessed]
                .into_iter()
                .all(|ts| threshold.admits(ts));
            if old {
                Action::Unlink
            } else {
                Action::Skip
            }
        }
        EntryKind::Symlink | EntryKind::Other => Action::Skip,
    }
}

/// Decide on a symlink by looking at what it points to.
///
/// A link's own atime doesn't move when it is traversed, so its age is
/// inferred from the referent. Broken links, loops and over-long chains all
/// count as dangling and are unlinked. A link to an old directory is only
/// removed at the end of the sweep, and only if the directory is gone by
/// then.
pub fn classify_symlink(path: &Path, threshold: Threshold) -> Action {
    match resolve(path) {
        Resolution::Target(kind, times) => match classify_resolved(kind, &times, threshold) {
            Action::DeferDirectoryCheck => Action::DeferSymlinkCheck,
            other => other,
        },
        Resolution::Dangling => Action::Unlink,
        Resolution::Unreadable(err) => {
            tracing::debug!(path = %path.display(), error = %err, "cannot resolve symlink, keeping it");
            Action::Skip
        }
    }
}

// ---------------------------------------------------------------------------
// Symlink resolution
// ---------------------------------------------------------------------------

enum Resolution {
    Target(EntryKind, Timestamps),
    Dangling,
    Unreadable(io::Error),
}

/// Follow `path` hop by hop until something other than a symlink turns up.
fn resolve(path: &Path) -> Resolution {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_SYMLINK_HOPS {
        let target = match fs::read_link(&current) {
            Ok(t) => t,
            Err(e) => return from_io_error(e),
        };
        current = hop(&current, target);

        let meta = match fs::symlink_metadata(&current) {
            Ok(m) => m,
            Err(e) => return from_io_error(e),
        };
        let kind = EntryKind::from(meta.file_type());
        if kind == EntryKind::Symlink {
            continue;
        }
        return match Timestamps::from_metadata(&meta) {
            Some(times) => Resolution::Target(kind, times),
            None => Resolution::Unreadable(io::Error::new(
                io::ErrorKind::InvalidData,
                "timestamp out of range",
            )),
        };
    }
    Resolution::Dangling
}

/// Relative link targets are relative to the directory holding the link.
fn hop(link: &Path, target: PathBuf) -> PathBuf {
    match link.parent() {
        Some(dir) => dir.join(target),
        None => target,
    }
}

/// Errors meaning "there is nothing at the end of this chain".
///
/// A loop inside a path component or an over-long name surfaces as `ELOOP`
/// or `ENAMETOOLONG` from the kernel rather than as a hop we can count.
fn from_io_error(err: io::Error) -> Resolution {
    let unreachable = matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    ) || matches!(err.raw_os_error(), Some(libc::ELOOP | libc::ENAMETOOLONG));

    if unreachable {
        Resolution::Dangling
    } else {
        Resolution::Unreadable(err)
    }
}
