use std::path::PathBuf;
use std::time::Duration;

/// The output of a completed sweep.
#[derive(Debug, Default)]
pub struct Results {
    /// Total number of entries removed, immediate and deferred.
    pub removed: usize,

    /// Removed paths, in the order they were removed.
    /// Only populated if `.collect_paths(true)` was set on the builder.
    pub paths: Vec<PathBuf>,

    /// Sweep statistics.
    pub stats: SweepStats,
}

/// Counters for a completed sweep, summed over all roots.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepStats {
    /// Number of roots processed.
    pub roots: usize,

    /// Entries found below the roots, excluded ones included.
    pub entries: usize,

    /// Entries skipped because their name matched an exclusion pattern.
    pub excluded: usize,

    /// Entries that vanished or could not be stat'ed.
    pub unreadable: usize,

    /// Entries removed during the top-down scan.
    pub unlinked: usize,

    /// Entries put on a deferred queue.
    pub deferred: usize,

    /// Directories removed during the bottom-up drain.
    pub dirs_removed: usize,

    /// Dangling symlinks removed during the bottom-up drain.
    pub symlinks_removed: usize,

    /// Removals attempted and refused (non-empty directory, permissions, ...).
    pub failed_removals: usize,

    /// Directories whose timestamps were put back.
    pub restored: usize,

    /// Wall-clock time of the whole sweep.
    pub duration: Duration,
}

impl SweepStats {
    /// Everything removed, immediate and deferred.
    pub fn removed(&self) -> usize {
        self.unlinked + self.dirs_removed + self.symlinks_removed
    }

    pub(crate) fn absorb(&mut self, other: &SweepStats) {
        self.roots += other.roots;
        self.entries += other.entries;
        self.excluded += other.excluded;
        self.unreadable += other.unreadable;
        self.unlinked += other.unlinked;
        self.deferred += other.deferred;
        self.dirs_removed += other.dirs_removed;
        self.symlinks_removed += other.symlinks_removed;
        self.failed_removals += other.failed_removals;
        self.restored += other.restored;
    }
}
