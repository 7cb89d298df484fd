//! Settings read from the environment, the way `periodic.conf` hands them over.

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use crate::builder::SweepBuilder;
use crate::classify::Threshold;
use crate::error::CleanError;

pub const ENABLE_VAR: &str = "daily_clean_tmps_enable";
pub const DAYS_VAR: &str = "daily_clean_tmps_days";
pub const DIRS_VAR: &str = "daily_clean_tmps_dirs";
pub const IGNORE_VAR: &str = "daily_clean_tmps_ignore";
pub const VERBOSE_VAR: &str = "daily_clean_tmps_verbose";

/// A validated configuration for an enabled run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Age in days after which entries are removed. Always positive.
    pub retention_days: u32,

    /// Directory trees to sweep, in configuration order.
    pub roots: Vec<PathBuf>,

    /// User-supplied exclusion globs. The implicit pattern is added later
    /// by [`ExcludeSet`](crate::ExcludeSet).
    pub excludes: Vec<String>,

    /// Print every removed path.
    pub verbose: bool,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Option<Self>, CleanError> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Read settings through `lookup`.
    ///
    /// Returns `Ok(None)` when cleaning is not enabled; nothing else is
    /// validated in that case.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, CleanError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if !is_yes(lookup(ENABLE_VAR).as_deref()) {
            return Ok(None);
        }

        let retention_days = parse_days(lookup(DAYS_VAR).as_deref())?;
        let roots = split_words(lookup(DIRS_VAR).as_deref())
            .map(|w| PathBuf::from(OsStr::from_bytes(w)))
            .collect();
        let excludes = split_words(lookup(IGNORE_VAR).as_deref())
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect();
        let verbose = is_yes(lookup(VERBOSE_VAR).as_deref());

        Ok(Some(Self {
            retention_days,
            roots,
            excludes,
            verbose,
        }))
    }

    /// The cut-off instant for a run starting now.
    pub fn threshold(&self) -> Result<Threshold, CleanError> {
        Threshold::days_ago(self.retention_days).ok_or(CleanError::InvalidRetention)
    }

    /// A builder with roots and exclusions filled in.
    pub fn sweep(&self, threshold: Threshold) -> SweepBuilder {
        crate::sweep()
            .roots(self.roots.iter().cloned())
            .excludes(self.excludes.iter().cloned())
            .threshold(threshold)
    }
}

fn is_yes(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"yes"))
}

fn parse_days(value: Option<&OsStr>) -> Result<u32, CleanError> {
    let raw = value.map(OsStr::as_bytes).unwrap_or_default();
    if raw.is_empty() {
        return Err(CleanError::MissingRetention);
    }
    let days: i64 = std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or(CleanError::InvalidRetention)?;
    if days <= 0 {
        return Err(CleanError::NonPositiveRetention);
    }
    u32::try_from(days).map_err(|_| CleanError::InvalidRetention)
}

/// Split on ASCII whitespace, dropping empty words.
fn split_words(value: Option<&OsStr>) -> impl Iterator<Item = &[u8]> {
    value
        .map(OsStr::as_bytes)
        .unwrap_or_default()
        .split(u8::is_ascii_whitespace)
        .filter(|w| !w.is_empty())
}
