//! Writers for the two artifacts the pipeline leaves on disk.
//!
//! Both go through [`write_atomic`]: the supervisor re-reads the config on
//! every restart and must never see a half-written file.

use crate::error::{LauncherError, Result};
use crate::util::fs_atomic::write_atomic;
use std::path::Path;
use tracing::info;
use xr_config::EngineConfig;

/// Serialize `config` as pretty JSON and replace `path` with it.
pub fn write_engine_config(path: &Path, config: &EngineConfig) -> Result<()> {
    let bytes = config
        .to_json_pretty()
        .map_err(|e| LauncherError::config_write(path, e))?;
    write_atomic(path, &bytes, Some(0o600)).map_err(|e| LauncherError::config_write(path, e))?;
    info!(path = %path.display(), bytes = bytes.len(), "engine config written");
    Ok(())
}

/// Persist the share link verbatim as the only content of `path`.
pub fn write_results(path: &Path, link: &str) -> Result<()> {
    write_atomic(path, link.as_bytes(), None).map_err(|e| LauncherError::config_write(path, e))?;
    info!(path = %path.display(), "share link saved");
    Ok(())
}
