use std::path::PathBuf;
use std::time::Instant;

use crate::classify::Threshold;
use crate::engine::{sweep_root, EngineOptions};
use crate::error::CleanError;
use crate::exclude::ExcludeSet;
use crate::results::{Results, SweepStats};
use crate::traits::{Reporter, SilentReporter};

// ---------------------------------------------------------------------------
// SweepBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a sweep.
///
/// Created via [`clean_tmps::sweep()`](crate::sweep). Configure with chained
/// builder methods, then call [`run()`](SweepBuilder::run) to execute.
///
/// # Example
///
/// ```rust,ignore
/// let results = clean_tmps::sweep()
///     .root("/tmp")
///     .root("/var/tmp")
///     .exclude("*.pid")
///     .threshold(Threshold::days_ago(3).unwrap())
///     .reporter(StdoutReporter)
///     .run()?;
/// ```
#[derive(Default)]
pub struct SweepBuilder {
    roots:         Vec<PathBuf>,
    excludes:      Vec<String>,
    threshold:     Option<Threshold>,
    reporter:      Option<Box<dyn Reporter>>,
    collect_paths: bool,
}

impl SweepBuilder {
    // ── Roots ─────────────────────────────────────────────────────────────

    /// Add a directory tree to sweep. Roots are processed in the order they
    /// were added; the root directory itself is never removed.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(path.into());
        self
    }

    /// Add several roots at once.
    pub fn roots<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots.extend(paths.into_iter().map(Into::into));
        self
    }

    // ── Exclusions ────────────────────────────────────────────────────────

    /// Never touch entries whose base name matches `pattern`.
    ///
    /// `.vfs_rsrc_streams_*` is always excluded on top of whatever is
    /// configured here.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Add several exclusion patterns at once.
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Entries last touched at or before this instant are removed.
    /// Required.
    pub fn threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Receive each removed path as soon as it is gone.
    pub fn reporter(mut self, r: impl Reporter + 'static) -> Self {
        self.reporter = Some(Box::new(r));
        self
    }

    /// Collect removed paths into [`Results::paths`].
    ///
    /// Disabled by default to avoid allocation overhead when paths aren't needed.
    pub fn collect_paths(mut self, yes: bool) -> Self {
        self.collect_paths = yes;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Sweep every root in turn and return what was done.
    ///
    /// # Errors
    ///
    /// Returns `Err` only when no threshold was set. Every exclusion pattern
    /// is accepted. Problems with individual entries are skipped and only
    /// counted in [`SweepStats`].
    pub fn run(self) -> Result<Results, CleanError> {
        let threshold = self.threshold.ok_or(CleanError::MissingThreshold)?;
        let excludes = ExcludeSet::new(self.excludes);
        let reporter: Box<dyn Reporter> = match self.reporter {
            Some(r) => r,
            None    => Box::new(SilentReporter),
        };

        let opts = EngineOptions {
            threshold,
            excludes: &excludes,
            reporter: reporter.as_ref(),
            collect_paths: self.collect_paths,
        };

        tracing::debug!(
            roots = self.roots.len(),
            threshold = %threshold.instant(),
            patterns = ?excludes.patterns(),
            "starting sweep"
        );

        let start = Instant::now();
        let mut stats = SweepStats::default();
        let mut paths = Vec::new();

        for root in &self.roots {
            stats.absorb(&sweep_root(root, &opts, &mut paths));
        }
        stats.duration = start.elapsed();

        Ok(Results {
            removed: stats.removed(),
            paths,
            stats,
        })
    }
}
