//! Host platform (linux for example) utility functions

use std::path::PathBuf;

/// Environment variable giving the root of the software tree.
pub const SW_ROOT_ENV_VAR: &str = "MARKER_FOCUS_SW_ROOT";

/// Get the root directory of the software tree.
///
/// The root is read from the `MARKER_FOCUS_SW_ROOT` environment variable. If the variable is not
/// set the current working directory is used instead, so the software can be run from a checkout
/// without any setup.
pub fn get_marker_focus_sw_root() -> std::io::Result<PathBuf> {
    match std::env::var(SW_ROOT_ENV_VAR) {
        Ok(v) => Ok(PathBuf::from(v)),
        Err(_) => std::env::current_dir()
    }
}
