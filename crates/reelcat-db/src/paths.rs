//! Per-user file locations shared by the database and the config file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Directory name under the platform config and data directories.
const APP_DIR_NAME: &str = "reelcat";

/// Kind of per-user directory a file lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppDir {
    /// Settings (`$XDG_CONFIG_HOME/reelcat` on Linux).
    Config,
    /// Persistent data (`$XDG_DATA_HOME/reelcat` on Linux).
    Data,
}

impl AppDir {
    fn platform_base(self) -> Option<PathBuf> {
        match self {
            Self::Config => dirs::config_dir(),
            Self::Data => dirs::data_dir(),
        }
    }
}

/// Resolves `file_name` under `dir` when given, otherwise under the
/// platform directory for `kind`.
///
/// # Errors
///
/// Returns an error if `dir` is `None` and the platform directory cannot be
/// determined.
pub fn app_file(dir: Option<&PathBuf>, kind: AppDir, file_name: &str) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(file_name));
    }
    let base = kind
        .platform_base()
        .with_context(|| format!("cannot determine the user {kind:?} directory"))?;
    Ok(under_app_dir(&base, file_name))
}

fn under_app_dir(base: &Path, file_name: &str) -> PathBuf {
    base.join(APP_DIR_NAME).join(file_name)
}
