//! # clean-tmps
//!
//! Removes stale entries from temporary directory trees without leaving a
//! trace on the directories it cleaned.
//!
//! A sweep walks each root top-down and decides per entry:
//!
//! * files, named pipes and character devices go when their mtime, ctime and
//!   atime are all at or before the [`Threshold`];
//! * directories whose mtime is old are queued and `rmdir`'d bottom-up once
//!   their contents were handled, so a directory emptied by the sweep goes
//!   with it;
//! * symlinks are judged by what they point to. Dangling links go at once,
//!   links to old directories are removed at the end if the directory went;
//! * sockets and other exotic kinds are always kept.
//!
//! Every directory whose contents change has its atime/mtime put back at the
//! end, so the next run still sees how old it really is.
//!
//! Problems with single entries (vanished, permission denied, not empty) are
//! skipped silently. Only configuration problems are errors.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use clean_tmps::{StdoutReporter, Threshold};
//!
//! let results = clean_tmps::sweep()
//!     .root("/tmp")
//!     .root("/var/tmp")
//!     .exclude("*.pid")
//!     .threshold(Threshold::days_ago(3).expect("in range"))
//!     .reporter(StdoutReporter)
//!     .run()
//!     .unwrap();
//!
//! println!("Removed {} entries in {:.3}s",
//!     results.removed,
//!     results.stats.duration.as_secs_f64()
//! );
//! ```
//!
//! # Configuration from the environment
//!
//! The binary reads the `daily_clean_tmps_*` variables used by `periodic(8)`:
//!
//! ```rust,no_run
//! use clean_tmps::Settings;
//!
//! if let Some(settings) = Settings::from_env().unwrap() {
//!     let threshold = settings.threshold().unwrap();
//!     settings.sweep(threshold).run().unwrap();
//! }
//! ```

#![forbid(unsafe_code)]

pub mod bootstrap;
pub mod classify;
pub mod config;

mod builder;
mod deferred;
mod engine;
mod entry;
mod error;
mod exclude;
mod results;
mod timestamps;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SweepBuilder;
pub use classify::{Action, Threshold};
pub use config::Settings;
pub use deferred::{DeferredItem, DeferredQueue};
pub use entry::{Entry, EntryKind, Timestamps};
pub use error::CleanError;
pub use exclude::{ExcludeSet, VFS_RSRC_STREAMS};
pub use results::{Results, SweepStats};
pub use timestamps::{DirTimes, TimestampCache};
pub use traits::{write_path, Reporter, StdoutReporter};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SweepBuilder`] to configure and run a sweep.
///
/// # Example
///
/// ```rust
/// use clean_tmps::Threshold;
///
/// // No roots: nothing is touched
/// let results = clean_tmps::sweep()
///     .threshold(Threshold::days_ago(7).unwrap())
///     .run()
///     .unwrap();
///
/// assert_eq!(results.removed, 0);
/// assert_eq!(results.stats.roots, 0);
/// ```
pub fn sweep() -> SweepBuilder {
    SweepBuilder::default()
}
