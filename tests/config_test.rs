use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use chrono::{Duration, Utc};
use clean_tmps::bootstrap::{already_running, exit_code, relaunch_command, shell_quote, RUNNING_VAR};
use clean_tmps::config::{DAYS_VAR, DIRS_VAR, ENABLE_VAR, IGNORE_VAR, VERBOSE_VAR};
use clean_tmps::{CleanError, ExcludeSet, Settings, VFS_RSRC_STREAMS};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn load(vars: &[(&str, &str)]) -> Result<Option<Settings>, CleanError> {
    let env: HashMap<String, OsString> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), OsString::from(v)))
        .collect();
    Settings::from_lookup(|key| env.get(key).cloned())
}

fn enabled(extra: &[(&str, &str)]) -> Result<Option<Settings>, CleanError> {
    let mut vars = vec![(ENABLE_VAR, "YES")];
    vars.extend_from_slice(extra);
    load(&vars)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[test]
fn disabled_unless_enable_is_yes() {
    assert!(load(&[]).unwrap().is_none());
    assert!(load(&[(ENABLE_VAR, "no"), (DAYS_VAR, "3")]).unwrap().is_none());
    assert!(load(&[(ENABLE_VAR, "true"), (DAYS_VAR, "3")]).unwrap().is_none());
}

#[test]
fn disabled_run_does_not_validate_days() {
    assert!(load(&[(DAYS_VAR, "bogus")]).unwrap().is_none());
}

#[test]
fn reads_every_setting() {
    let settings = enabled(&[
        (DAYS_VAR, " 3 "),
        (DIRS_VAR, "/tmp  /var/tmp\n/private/tmp"),
        (IGNORE_VAR, "*.pid\t.X*-lock"),
        (VERBOSE_VAR, "Yes"),
    ])
    .unwrap()
    .unwrap();

    assert_eq!(settings.retention_days, 3);
    assert_eq!(
        settings.roots,
        vec![
            PathBuf::from("/tmp"),
            PathBuf::from("/var/tmp"),
            PathBuf::from("/private/tmp"),
        ]
    );
    assert_eq!(settings.excludes, vec!["*.pid".to_string(), ".X*-lock".to_string()]);
    assert!(settings.verbose);
}

#[test]
fn defaults_when_optional_settings_are_absent() {
    let settings = enabled(&[(DAYS_VAR, "7")]).unwrap().unwrap();

    assert!(settings.roots.is_empty());
    assert!(settings.excludes.is_empty());
    assert!(!settings.verbose);
}

#[test]
fn non_utf8_roots_are_kept_verbatim() {
    let raw = OsStr::from_bytes(b"/tmp/caf\xe9");
    let settings = Settings::from_lookup(|key| match key {
        ENABLE_VAR => Some("yes".into()),
        DAYS_VAR => Some("1".into()),
        DIRS_VAR => Some(raw.to_os_string()),
        _ => None,
    })
    .unwrap()
    .unwrap();

    assert_eq!(settings.roots, vec![PathBuf::from(raw)]);
}

#[test]
fn missing_days_is_reported() {
    for vars in [&[][..], &[(DAYS_VAR, "")][..]] {
        let err = enabled(vars).unwrap_err();
        assert!(matches!(err, CleanError::MissingRetention));
        assert_eq!(
            err.to_string(),
            "$daily_clean_tmps_enable is set but $daily_clean_tmps_days is not"
        );
        assert_eq!(err.exit_code(), 2);
    }
}

#[test]
fn invalid_days_is_reported() {
    for days in ["three", "3.5", "99999999999999999999999"] {
        let err = enabled(&[(DAYS_VAR, days)]).unwrap_err();
        assert!(matches!(err, CleanError::InvalidRetention), "{days}");
        assert_eq!(err.to_string(), "$daily_clean_tmps_days is not a valid integer");
    }
}

#[test]
fn non_positive_days_is_reported() {
    for days in ["0", "-4"] {
        let err = enabled(&[(DAYS_VAR, days)]).unwrap_err();
        assert!(matches!(err, CleanError::NonPositiveRetention), "{days}");
        assert_eq!(err.to_string(), "$daily_clean_tmps_days is not positive");
    }
}

#[test]
fn threshold_is_retention_days_ago() {
    let settings = enabled(&[(DAYS_VAR, "2")]).unwrap().unwrap();
    let before = Utc::now();
    let threshold = settings.threshold().unwrap();
    let after = Utc::now();

    assert!(threshold.instant() >= before - Duration::days(2));
    assert!(threshold.instant() <= after - Duration::days(2));
}

#[test]
fn implicit_exclusion_is_always_present() {
    let set = ExcludeSet::new(["*.pid"]);
    assert_eq!(set.patterns(), ["*.pid".to_string(), VFS_RSRC_STREAMS.to_string()]);
    assert!(set.is_excluded(OsStr::new(".vfs_rsrc_streams_abc")));
    assert!(set.is_excluded(OsStr::new("x.pid")));
    assert!(!set.is_excluded(OsStr::new("x.pid.bak")));
}

#[test]
fn exclusions_follow_fnmatch_rules() {
    let set = ExcludeSet::new(["*", "a\\b"]);
    assert!(set.is_excluded(OsStr::new(".hidden")), "* matches a leading dot");
    assert!(set.is_excluded(OsStr::new("a\\b")), "backslash is literal");

    let bracket = ExcludeSet::new(["[!x]y"]);
    assert!(bracket.is_excluded(OsStr::new("ay")));
    assert!(!bracket.is_excluded(OsStr::new("xy")));
}

#[test]
fn braces_and_commas_are_ordinary_characters() {
    let set = ExcludeSet::new(["a{b,c}"]);
    assert!(set.is_excluded(OsStr::new("a{b,c}")));
    assert!(!set.is_excluded(OsStr::new("ab")));
    assert!(!set.is_excluded(OsStr::new("ac")));
}

#[test]
fn unclosed_brackets_are_literal() {
    let set = ExcludeSet::new(["[x", "[!]", "*.[ch"]);
    assert!(set.is_excluded(OsStr::new("[x")));
    assert!(!set.is_excluded(OsStr::new("x")));
    assert!(set.is_excluded(OsStr::new("[!]")));
    assert!(set.is_excluded(OsStr::new("main.[ch")));
    assert!(!set.is_excluded(OsStr::new("main.c")));
}

#[test]
fn bracket_classes_use_fnmatch_rules() {
    let caret = ExcludeSet::new(["[^a]"]);
    assert!(caret.is_excluded(OsStr::new("^")), "a leading caret is a member");
    assert!(caret.is_excluded(OsStr::new("a")));
    assert!(!caret.is_excluded(OsStr::new("b")));

    let only_specials = ExcludeSet::new(["[^!]"]);
    assert!(only_specials.is_excluded(OsStr::new("!")));
    assert!(only_specials.is_excluded(OsStr::new("^")));
    assert!(!only_specials.is_excluded(OsStr::new("a")));

    let edges = ExcludeSet::new(["[]]", "[a-]", "x[a-c-e]"]);
    assert!(edges.is_excluded(OsStr::new("]")));
    assert!(edges.is_excluded(OsStr::new("-")));
    assert!(edges.is_excluded(OsStr::new("a")));
    assert!(edges.is_excluded(OsStr::new("xb")));
    assert!(edges.is_excluded(OsStr::new("x-")));
    assert!(edges.is_excluded(OsStr::new("xe")));
    assert!(!edges.is_excluded(OsStr::new("xd")));
}

#[test]
fn reversed_range_matches_nothing() {
    let set = ExcludeSet::new(["[z-a]x"]);
    assert_eq!(set.patterns()[0], "[z-a]x");
    assert!(!set.is_excluded(OsStr::new("ax")));
    assert!(!set.is_excluded(OsStr::new("zx")));
    assert!(!set.is_excluded(OsStr::new("[z-a]x")));
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[test]
fn running_marker_parsing() {
    assert!(!already_running(None));
    assert!(!already_running(Some(OsStr::new("0"))));
    assert!(already_running(Some(OsStr::new("1"))));
    assert!(already_running(Some(OsStr::new(" 2 "))));
    assert!(already_running(Some(OsStr::new("yes"))), "unparsable counts as running");
    assert!(already_running(Some(OsStr::new(""))));
}

#[test]
fn shell_quoting() {
    assert_eq!(shell_quote(OsStr::new("/usr/local/bin/clean-tmps")), "/usr/local/bin/clean-tmps");
    assert_eq!(shell_quote(OsStr::new("")), "''");
    assert_eq!(shell_quote(OsStr::new("my prog")), "'my prog'");
    assert_eq!(shell_quote(OsStr::new("it's")), "'it'\"'\"'s'");
    assert_eq!(shell_quote(OsStr::new("$HOME")), "'$HOME'");
}

#[test]
fn relaunch_sources_periodic_conf() {
    let cmd = relaunch_command(OsStr::new("/opt/my tools/clean-tmps"), Path::new("/etc/defaults/periodic.conf"));

    assert_eq!(cmd.get_program(), "/bin/sh");
    let args: Vec<&OsStr> = cmd.get_args().collect();
    assert_eq!(
        args,
        [
            OsStr::new("-c"),
            OsStr::new("set -a;. /etc/defaults/periodic.conf;source_periodic_confs;'/opt/my tools/clean-tmps';"),
        ]
    );
    let env: Vec<_> = cmd.get_envs().collect();
    assert_eq!(env, [(OsStr::new(RUNNING_VAR), Some(OsStr::new("1")))]);
}

#[test]
fn exit_codes_follow_the_child() {
    assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
    assert_eq!(exit_code(ExitStatus::from_raw(2 << 8)), 2);
    assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
}
