use std::path::{Path, PathBuf};

/// Engine executable name, also the archive entry we extract.
pub const ENGINE_FILE: &str = "xray";
/// Engine config written by the synthesizer, read by every engine restart.
pub const CONFIG_FILE: &str = "c.json";
/// Single-line results file holding the share link.
pub const RESULTS_FILE: &str = "link.txt";

/// Well-known file locations inside the launcher's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePaths {
    pub engine: PathBuf,
    pub config: PathBuf,
    pub results: PathBuf,
}

impl EnginePaths {
    /// Paths under `dir`. Pass an absolute directory: the engine path is
    /// executed as-is and a bare `xray` would be looked up on `PATH`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            engine: dir.join(ENGINE_FILE),
            config: dir.join(CONFIG_FILE),
            results: dir.join(RESULTS_FILE),
        }
    }
}
