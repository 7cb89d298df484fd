use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::classify::{classify_entry, Action, Threshold};
use crate::deferred::{DeferredItem, DeferredQueue};
use crate::entry::Entry;
use crate::exclude::ExcludeSet;
use crate::results::SweepStats;
use crate::timestamps::TimestampCache;
use crate::traits::Reporter;

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `sweep_root()`.
pub(crate) struct EngineOptions<'a> {
    pub threshold: Threshold,
    pub excludes: &'a ExcludeSet,
    pub reporter: &'a dyn Reporter,
    pub collect_paths: bool,
}

// ---------------------------------------------------------------------------
// sweep_root()
// ---------------------------------------------------------------------------

/// Sweep a single root: top-down scan, bottom-up drain, timestamp restore.
///
/// The cache and queue live only for this call, so roots never see each
/// other's state. `paths` receives removed paths when collection is on.
pub(crate) fn sweep_root(root: &Path, opts: &EngineOptions<'_>, paths: &mut Vec<PathBuf>) -> SweepStats {
    let mut sweep = RootSweep {
        opts,
        cache: TimestampCache::new(),
        stats: SweepStats {
            roots: 1,
            ..SweepStats::default()
        },
        paths,
    };

    let queue = sweep.scan(root);
    sweep.drain(queue);

    let RootSweep { cache, mut stats, .. } = sweep;
    stats.restored = cache.restore();

    tracing::info!(
        root = %root.display(),
        entries = stats.entries,
        removed = stats.removed(),
        failed = stats.failed_removals,
        restored = stats.restored,
        "swept root"
    );
    stats
}

struct RootSweep<'a, 'o> {
    opts: &'a EngineOptions<'o>,
    cache: TimestampCache,
    stats: SweepStats,
    paths: &'a mut Vec<PathBuf>,
}

impl RootSweep<'_, '_> {
    /// Walk `root` top-down, unlink what can go now, queue the rest.
    ///
    /// Siblings are visited in byte order of their names, so two runs over
    /// the same tree make the same decisions in the same order.
    fn scan(&mut self, root: &Path) -> DeferredQueue {
        let mut queue = DeferredQueue::new();

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .same_file_system(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for res in walker {
            let dent = match res {
                Ok(d) => d,
                Err(e) => {
                    tracing::debug!(error = %e, "walk error, skipping");
                    continue;
                }
            };

            // The root itself is never a candidate
            if dent.depth() == 0 {
                continue;
            }
            self.stats.entries += 1;

            if self.opts.excludes.is_excluded(dent.file_name()) {
                tracing::trace!(path = %dent.path().display(), "excluded");
                self.stats.excluded += 1;
                continue;
            }

            let Some(entry) = stat(dent.path()) else {
                self.stats.unreadable += 1;
                continue;
            };

            let action = classify_entry(&entry, self.opts.threshold);
            tracing::trace!(path = %entry.path.display(), kind = ?entry.kind, ?action, "classified");

            match action {
                Action::Unlink => {
                    self.snapshot_parent(&entry.path);
                    match fs::remove_file(&entry.path) {
                        Ok(()) => {
                            self.stats.unlinked += 1;
                            self.report(entry.path);
                        }
                        Err(e) => self.removal_failed(&entry.path, &e),
                    }
                }
                action if action.is_deferred() => {
                    self.stats.deferred += 1;
                    queue.push(entry.path, action);
                }
                _ => {}
            }
        }

        queue
    }

    /// Handle deferred entries deepest first.
    fn drain(&mut self, queue: DeferredQueue) {
        for DeferredItem { path, action } in queue.into_bottom_up() {
            self.snapshot_parent(&path);

            let outcome = match action {
                Action::DeferDirectoryCheck => fs::remove_dir(&path).map(|()| true),
                // `exists()` follows the link: false once the target is gone
                Action::DeferSymlinkCheck if path.exists() => Ok(false),
                Action::DeferSymlinkCheck => fs::remove_file(&path).map(|()| true),
                Action::Skip | Action::Unlink => continue,
            };

            match outcome {
                Ok(true) => {
                    if action == Action::DeferDirectoryCheck {
                        self.stats.dirs_removed += 1;
                    } else {
                        self.stats.symlinks_removed += 1;
                    }
                    self.report(path);
                }
                Ok(false) => {}
                Err(e) => self.removal_failed(&path, &e),
            }
        }
    }

    fn snapshot_parent(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.cache.ensure_cached(parent);
        }
    }

    fn report(&mut self, path: PathBuf) {
        self.opts.reporter.removed(&path);
        if self.opts.collect_paths {
            self.paths.push(path);
        }
    }

    fn removal_failed(&mut self, path: &Path, err: &io::Error) {
        tracing::debug!(path = %path.display(), error = %err, "removal failed, leaving in place");
        self.stats.failed_removals += 1;
    }
}

/// Non-following stat. `None` on any failure.
fn stat(path: &Path) -> Option<Entry> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Entry::from_metadata(path, &meta),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot stat entry, skipping");
            None
        }
    }
}
