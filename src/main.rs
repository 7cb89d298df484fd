use std::process::ExitCode;

use clean_tmps::{bootstrap, CleanError, Settings, StdoutReporter};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `clean_tmps=debug`.
const LOG_VAR: &str = "CLEAN_TMPS_LOG";

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            // Configuration errors go to stdout so they land in the
            // periodic report next to the regular output.
            if err.is_config_error() {
                println!("{err}");
            } else {
                eprintln!("Error: {err}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn run() -> Result<u8, CleanError> {
    if let Some(code) = bootstrap::relaunch_if_needed()? {
        return Ok(code);
    }

    let Some(settings) = Settings::from_env()? else {
        tracing::debug!("cleaning disabled");
        return Ok(0);
    };
    let threshold = settings.threshold()?;

    println!();
    println!("Removing old temporary files:");

    let mut sweep = settings.sweep(threshold);
    if settings.verbose {
        sweep = sweep.reporter(StdoutReporter);
    }
    let results = sweep.run()?;

    tracing::info!(
        removed = results.removed,
        failed = results.stats.failed_removals,
        restored = results.stats.restored,
        elapsed_ms = results.stats.duration.as_millis() as u64,
        "sweep finished"
    );
    Ok(0)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
