//! Fixed tool locations for supported host platforms
//!
//! Tool discovery is a table of well-known install paths, not a `PATH`
//! search, and the table is asymmetric on purpose:
//!
//! | host    | dotnet path                          | existence check                       |
//! |---------|--------------------------------------|---------------------------------------|
//! | Windows | `C:/Program Files/dotnet/dotnet.exe` | checked; a missing file means the tool is unavailable |
//! | other   | `/usr/bin/dotnet`                    | none; the path is trusted as-is       |
//!
//! On Windows the installer location is reliable enough that a miss means
//! "not installed". On Unix hosts the path is handed over unchecked and a
//! missing tool surfaces when the process fails to spawn.

use std::path::{Path, PathBuf};

/// Well-known dotnet CLI location on Windows hosts.
pub const WINDOWS_DOTNET_PATH: &str = "C:/Program Files/dotnet/dotnet.exe";

/// Well-known dotnet CLI location on non-Windows hosts.
pub const UNIX_DOTNET_PATH: &str = "/usr/bin/dotnet";

/// Well-known systemctl location, trusted unchecked like the Unix dotnet path.
pub const SYSTEMCTL_PATH: &str = "/usr/bin/systemctl";

/// Resolve the dotnet executable for the current host per the policy table.
pub fn find_dotnet_executable() -> Option<PathBuf> {
    if cfg!(windows) {
        let candidate = Path::new(WINDOWS_DOTNET_PATH);
        if candidate.exists() {
            Some(absolutize(candidate))
        } else {
            None
        }
    } else {
        Some(absolutize(Path::new(UNIX_DOTNET_PATH)))
    }
}

/// Normalize a tool path to an absolute path against the current directory.
pub fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
