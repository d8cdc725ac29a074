//! Engine artifact fetcher.
//!
//! Downloads the pinned Xray-core release for the host architecture, but only
//! when the executable is not already on disk.
//! 仅在本地不存在可执行文件时下载；已存在则零网络请求。

use crate::error::{LauncherError, Result};
use crate::paths::ENGINE_FILE;
use crate::util::fs_atomic::write_atomic;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use xr_types::ports::http::{HttpClient, HttpRequest};

/// Pinned engine release.
pub const ENGINE_VERSION: &str = "1.8.24";
/// Release download root; `/v{version}/Xray-linux-{suffix}.zip` is appended.
pub const RELEASE_BASE: &str = "https://github.com/XTLS/Xray-core/releases/download";
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Release archive flavour for a CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchSuffix {
    X86_64,
    Arm64,
    Arm32,
}

impl ArchSuffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "64",
            Self::Arm64 => "arm64-v8a",
            Self::Arm32 => "arm32-v7a",
        }
    }

    /// Strict mapping; `None` for architectures we have no archive for.
    pub fn detect(arch: &str) -> Option<Self> {
        let arch = arch.to_ascii_lowercase();
        if arch.contains("x86_64") || arch.contains("amd64") {
            Some(Self::X86_64)
        } else if arch.contains("aarch64") || arch.contains("arm64") {
            Some(Self::Arm64)
        } else if arch.contains("arm") {
            Some(Self::Arm32)
        } else {
            None
        }
    }

    /// Like [`detect`](Self::detect) but falls back to x86-64 with a warning.
    pub fn detect_or_default(arch: &str) -> Self {
        Self::detect(arch).unwrap_or_else(|| {
            warn!(arch, "unknown architecture, defaulting to 64-bit x86 archive");
            Self::X86_64
        })
    }
}

/// What to download and which entry to pull out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub version: String,
    pub release_base: String,
    pub arch: String,
    pub entry: String,
}

impl Default for ArtifactSpec {
    fn default() -> Self {
        Self {
            version: ENGINE_VERSION.to_string(),
            release_base: RELEASE_BASE.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            entry: ENGINE_FILE.to_string(),
        }
    }
}

impl ArtifactSpec {
    pub fn release_url(&self) -> String {
        format!(
            "{}/v{}/Xray-linux-{}.zip",
            self.release_base.trim_end_matches('/'),
            self.version,
            ArchSuffix::detect_or_default(&self.arch).as_str()
        )
    }
}

pub struct ArtifactFetcher {
    http: Arc<dyn HttpClient>,
    spec: ArtifactSpec,
}

impl ArtifactFetcher {
    pub fn new(http: Arc<dyn HttpClient>, spec: ArtifactSpec) -> Self {
        Self { http, spec }
    }

    /// Make sure an executable exists at `dest` and return its path.
    ///
    /// Idempotent: an existing file short-circuits before any network call.
    pub async fn ensure_engine_binary(&self, dest: &Path) -> Result<PathBuf> {
        if dest.is_file() {
            debug!(path = %dest.display(), "engine binary present, skipping download");
            return Ok(dest.to_path_buf());
        }

        let url = self.spec.release_url();
        info!(%url, version = %self.spec.version, "downloading engine");

        let rsp = self
            .http
            .execute(HttpRequest::get(url.clone(), DOWNLOAD_TIMEOUT_SECS))
            .await?;
        if rsp.status != 200 {
            return Err(LauncherError::DownloadFailed { status: rsp.status });
        }
        debug!(bytes = rsp.body.len(), "engine archive downloaded");

        let entry = self.spec.entry.clone();
        let binary = tokio::task::spawn_blocking(move || extract_entry(&rsp.body, &entry))
            .await
            .map_err(|e| LauncherError::ArchiveInvalid(format!("extract task: {e}")))??;

        write_atomic(dest, &binary, Some(0o755))?;
        info!(path = %dest.display(), bytes = binary.len(), "engine installed");
        Ok(dest.to_path_buf())
    }
}

/// Scan a zip archive and return the contents of the file entry named `name`.
/// Every other entry is skipped.
pub fn extract_entry(archive: &[u8], name: &str) -> Result<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| LauncherError::ArchiveInvalid(e.to_string()))?;

    for i in 0..zip.len() {
        let mut file = zip
            .by_index(i)
            .map_err(|e| LauncherError::ArchiveInvalid(e.to_string()))?;
        if !file.is_file() || file.name() != name {
            continue;
        }
        let mut out = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut out)?;
        return Ok(out);
    }

    Err(LauncherError::ArtifactNotFound {
        entry: name.to_string(),
    })
}
