//! Re-entry through `periodic.conf`.
//!
//! When started outside `periodic(8)`, the `daily_clean_tmps_*` variables
//! are usually not in the environment yet. If the system has a periodic
//! configuration, the binary runs itself again through a shell that sources
//! it, and exits with that child's status.

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::error::CleanError;

/// Marks the relaunched child so it doesn't relaunch again.
pub const RUNNING_VAR: &str = "CLEAN_TMPS_RUNNING";

/// The system periodic configuration.
pub const PERIODIC_CONF: &str = "/etc/defaults/periodic.conf";

/// Whether this process already is the relaunched child.
///
/// Unset means no. Otherwise the value must parse as an integer; non-zero
/// means yes, and anything unparsable also counts as yes.
pub fn already_running(value: Option<&OsStr>) -> bool {
    match value {
        None => false,
        Some(v) => std::str::from_utf8(v.as_bytes())
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .is_none_or(|n| n != 0),
    }
}

/// Quote `arg` for a POSIX shell.
///
/// Words made only of safe characters are returned untouched; anything else
/// is wrapped in single quotes.
pub fn shell_quote(arg: &OsStr) -> OsString {
    let bytes = arg.as_bytes();
    let safe = |b: &u8| b.is_ascii_alphanumeric() || b"@%+=:,./-_".contains(b);
    if !bytes.is_empty() && bytes.iter().all(safe) {
        return arg.to_os_string();
    }

    let mut quoted = Vec::with_capacity(bytes.len() + 2);
    quoted.push(b'\'');
    for &b in bytes {
        if b == b'\'' {
            quoted.extend_from_slice(b"'\"'\"'");
        } else {
            quoted.push(b);
        }
    }
    quoted.push(b'\'');
    OsString::from_vec(quoted)
}

/// The shell command that sources `conf` and runs `program` again.
pub fn relaunch_command(program: &OsStr, conf: &Path) -> Command {
    let mut script = b"set -a;. ".to_vec();
    script.extend_from_slice(shell_quote(conf.as_os_str()).as_bytes());
    script.extend_from_slice(b";source_periodic_confs;");
    script.extend_from_slice(shell_quote(program).as_bytes());
    script.push(b';');

    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(OsString::from_vec(script)).env(RUNNING_VAR, "1");
    cmd
}

/// Relaunch through [`PERIODIC_CONF`] if needed.
///
/// Returns the child's exit status, or `None` when this process should go
/// on and do the work itself: it already is the child, or there is no
/// readable periodic configuration.
pub fn relaunch_if_needed() -> Result<Option<u8>, CleanError> {
    if already_running(std::env::var_os(RUNNING_VAR).as_deref()) {
        return Ok(None);
    }
    if let Err(e) = File::open(PERIODIC_CONF) {
        tracing::debug!(path = PERIODIC_CONF, error = %e, "no periodic configuration, running directly");
        return Ok(None);
    }

    let program = std::env::current_exe().map_err(CleanError::Relaunch)?;
    tracing::debug!(program = %program.display(), "relaunching under periodic configuration");
    let status = relaunch_command(program.as_os_str(), Path::new(PERIODIC_CONF))
        .status()
        .map_err(CleanError::Relaunch)?;
    Ok(Some(exit_code(status)))
}

/// A child killed by a signal maps to `128 + signal`, as shells report it.
pub fn exit_code(status: ExitStatus) -> u8 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code as u8,
        (None, Some(sig)) => 128u8.wrapping_add(sig as u8),
        (None, None) => 1,
    }
}
