use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Receives every path a sweep removed, as soon as it is gone.
///
/// Called for immediate unlinks during the top-down scan and again for each
/// deferred removal during the bottom-up drain. Never called for entries
/// that were kept or whose removal failed.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::path::{Path, PathBuf};
/// use clean_tmps::Reporter;
///
/// #[derive(Default)]
/// struct Collect(RefCell<Vec<PathBuf>>);
///
/// impl Reporter for Collect {
///     fn removed(&self, path: &Path) {
///         self.0.borrow_mut().push(path.to_path_buf());
///     }
/// }
/// ```
pub trait Reporter {
    fn removed(&self, path: &Path);
}

/// Prints each removed path on its own line to standard output.
///
/// Paths are written as raw bytes, so names that aren't valid UTF-8 come
/// out exactly as they are on disk. Write errors are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn removed(&self, path: &Path) {
        let _ = write_path(&mut io::stdout().lock(), path);
    }
}

/// Write `path` as raw bytes followed by a newline.
pub fn write_path<W: Write>(out: &mut W, path: &Path) -> io::Result<()> {
    out.write_all(path.as_os_str().as_bytes())?;
    out.write_all(b"\n")
}

/// Says nothing. Used when no reporter is configured.
pub(crate) struct SilentReporter;

impl Reporter for SilentReporter {
    fn removed(&self, _path: &Path) {}
}
