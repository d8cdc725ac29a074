#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use serial_test::serial;
use std::path::{Path, PathBuf};
use xr_core::credentials::generate_reality_keys;
use xr_core::LauncherError;

// Scripts are written then exec'd; serialised so a concurrent fork cannot
// hold the write fd open (ETXTBSY).
fn fake_engine(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("xray");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
#[serial]
async fn parses_engine_keygen_output() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(
        dir.path(),
        r#"[ "$1" = "x25519" ] || exit 2
echo "Private key: cPrivKeyExample0123456789abcdefghijklmnopqr"
echo "Public key: pPubKeyExample0123456789abcdefghijklmnopqrs""#,
    );

    let keys = generate_reality_keys(&engine).await.unwrap();
    assert_eq!(keys.private_key, "cPrivKeyExample0123456789abcdefghijklmnopqr");
    assert_eq!(keys.public_key, "pPubKeyExample0123456789abcdefghijklmnopqrs");
    assert_eq!(keys.short_id.len(), 16);
}

#[tokio::test]
#[serial]
async fn missing_public_key_is_keygen_failed() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(dir.path(), r#"echo "Private key: onlyhalf""#);

    let err = generate_reality_keys(&engine).await.unwrap_err();
    assert!(matches!(err, LauncherError::KeygenFailed(_)));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn unrunnable_engine_is_keygen_failed() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate_reality_keys(&dir.path().join("absent"))
        .await
        .unwrap_err();
    assert!(matches!(err, LauncherError::KeygenFailed(_)));
}
