use thiserror::Error;

/// Everything that can stop a run.
///
/// Per-entry I/O failures never show up here: the sweep swallows them and
/// moves on. What remains are configuration problems and the periodic
/// relaunch.
#[derive(Error, Debug)]
pub enum CleanError {
    // Config
    #[error("$daily_clean_tmps_enable is set but $daily_clean_tmps_days is not")]
    MissingRetention,

    #[error("$daily_clean_tmps_days is not a valid integer")]
    InvalidRetention,

    #[error("$daily_clean_tmps_days is not positive")]
    NonPositiveRetention,

    #[error("no threshold configured")]
    MissingThreshold,

    // Bootstrap
    #[error("failed to relaunch under periodic configuration")]
    Relaunch(#[source] std::io::Error),
}

impl CleanError {
    /// Whether this is a configuration problem the operator has to fix.
    pub fn is_config_error(&self) -> bool {
        !matches!(self, Self::Relaunch(_))
    }

    /// Process exit status for this error.
    ///
    /// Configuration problems exit with 2, the status periodic scripts
    /// have always used for them.
    pub fn exit_code(&self) -> u8 {
        if self.is_config_error() {
            2
        } else {
            1
        }
    }
}
