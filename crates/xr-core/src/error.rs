use std::io;
use std::path::PathBuf;
use thiserror::Error;
use xr_types::CoreError;

pub type Result<T, E = LauncherError> = std::result::Result<T, E>;

/// Everything that can go wrong between startup and the supervise loop.
///
/// Only the startup variants ever reach `main`; the others are logged and
/// recovered where they happen.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("engine download failed: HTTP {status}")]
    DownloadFailed { status: u16 },

    #[error("engine archive has no '{entry}' entry")]
    ArtifactNotFound { entry: String },

    #[error("engine archive unreadable: {0}")]
    ArchiveInvalid(String),

    #[error("reality keygen failed: {0}")]
    KeygenFailed(String),

    #[error("write {}: {source}", path.display())]
    ConfigWriteFailed {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("node registration failed: {0}")]
    RegistrationFailed(String),

    #[error("public ip discovery failed on every endpoint")]
    IpDiscoveryFailed,

    #[error("spawn engine {}: {source}", program.display())]
    EngineSpawnFailed {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Http(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LauncherError {
    /// Whether this error should stop the launcher during startup.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::RegistrationFailed(_) | Self::IpDiscoveryFailed | Self::EngineSpawnFailed { .. }
        )
    }

    pub(crate) fn config_write(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ConfigWriteFailed {
            path: path.into(),
            source: source.into(),
        }
    }
}
