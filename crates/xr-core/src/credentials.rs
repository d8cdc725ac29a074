//! Client id, Reality keypair and short id.
//!
//! The keypair comes from the engine's own `x25519` subcommand; we only parse
//! its output. The short id uses the OS CSPRNG because it takes part in the
//! Reality handshake.

use crate::error::{LauncherError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;
use xr_config::RealityKeyMaterial;

/// Engine subcommand that prints a fresh X25519 keypair.
pub const KEYGEN_SUBCOMMAND: &str = "x25519";
const PRIVATE_KEY_LABEL: &str = "Private key:";
const PUBLIC_KEY_LABEL: &str = "Public key:";
/// Short id length in bytes (16 hex characters).
pub const SHORT_ID_BYTES: usize = 8;

/// Client id: the override verbatim when set and non-blank, otherwise a
/// random v4 UUID in lowercase hyphenated form.
pub fn generate_client_id(override_id: Option<&str>) -> String {
    match override_id {
        Some(id) if !id.trim().is_empty() => {
            if Uuid::parse_str(id).is_err() {
                warn!(client_id = id, "client id override is not a canonical UUID, using it anyway");
            }
            id.to_string()
        }
        _ => Uuid::new_v4().to_string(),
    }
}

/// 8 random bytes from the OS, lowercase hex.
pub fn generate_short_id() -> String {
    let mut bytes = [0u8; SHORT_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// One line of keygen output, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeygenLine {
    PrivateKey(String),
    PublicKey(String),
    Other,
}

/// Classify a keygen output line. The value is whatever follows the first
/// colon, trimmed.
pub fn parse_keygen_line(line: &str) -> KeygenLine {
    let value = || {
        line.split_once(':')
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    if line.contains(PRIVATE_KEY_LABEL) {
        value().map_or(KeygenLine::Other, KeygenLine::PrivateKey)
    } else if line.contains(PUBLIC_KEY_LABEL) {
        value().map_or(KeygenLine::Other, KeygenLine::PublicKey)
    } else {
        KeygenLine::Other
    }
}

/// Run `<engine> x25519` once and build the Reality key material.
///
/// Fails with [`LauncherError::KeygenFailed`] if either key is missing once
/// the process has exited. There is no retry.
pub async fn generate_reality_keys(engine: &Path) -> Result<RealityKeyMaterial> {
    info!(engine = %engine.display(), "generating reality keypair");

    let mut child = Command::new(engine)
        .arg(KEYGEN_SUBCOMMAND)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| LauncherError::KeygenFailed(format!("spawn {}: {e}", engine.display())))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| LauncherError::KeygenFailed("keygen stdout not captured".into()))?;

    let mut private_key = None;
    let mut public_key = None;
    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| LauncherError::KeygenFailed(format!("read keygen output: {e}")))?
    {
        match parse_keygen_line(&line) {
            KeygenLine::PrivateKey(v) => private_key = Some(v),
            KeygenLine::PublicKey(v) => public_key = Some(v),
            KeygenLine::Other => {}
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| LauncherError::KeygenFailed(format!("wait for keygen: {e}")))?;
    debug!(?status, "keygen exited");

    let (Some(private_key), Some(public_key)) = (private_key, public_key) else {
        return Err(LauncherError::KeygenFailed(format!(
            "keypair not found in `{} {KEYGEN_SUBCOMMAND}` output (exit status: {status})",
            engine.display()
        )));
    };

    Ok(RealityKeyMaterial {
        private_key,
        public_key,
        short_id: generate_short_id(),
    })
}
