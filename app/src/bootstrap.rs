//! Startup pipeline: fetch → identity → keys → config → link → banner →
//! registration → supervisor.
//! 启动流水线：严格顺序执行，任一致命错误直接返回到 main。

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use xr_config::{build_config, encode_link, ProtocolKind, ProtocolVariant, RealityKeyMaterial, ServerIdentity};
use xr_core::credentials::{generate_client_id, generate_reality_keys};
use xr_core::discovery::{discover_public_ip, IP_ECHO_ENDPOINTS};
use xr_core::fetcher::{ArtifactFetcher, ArtifactSpec};
use xr_core::output::{write_engine_config, write_results};
use xr_core::registrar::NodeRegistrar;
use xr_core::supervisor::{CommandLauncher, Supervisor};
use xr_core::EnginePaths;
use xr_types::ports::http::HttpClient;

use crate::settings::LauncherSettings;

/// Everything the startup stages produced, ready for the banner, the
/// registrar and the supervisor.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub workdir: PathBuf,
    pub paths: EnginePaths,
    pub identity: ServerIdentity,
    pub variant: ProtocolVariant,
    pub keys: Option<RealityKeyMaterial>,
    pub link: String,
}

/// Turn `--workdir` (or the current directory) into an absolute, existing
/// directory.
pub fn resolve_workdir(workdir: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let dir = match workdir {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => cwd.join(p),
        None => cwd,
    };
    std::fs::create_dir_all(&dir).with_context(|| format!("create workdir {}", dir.display()))?;
    Ok(dir)
}

/// Run every fallible startup stage. The returned value is immutable from
/// here on.
pub async fn prepare(
    http: Arc<dyn HttpClient>,
    spec: ArtifactSpec,
    settings: &LauncherSettings,
    kind: ProtocolKind,
    workdir: &Path,
) -> Result<Prepared> {
    let paths = EnginePaths::in_dir(workdir);

    ArtifactFetcher::new(http.clone(), spec)
        .ensure_engine_binary(&paths.engine)
        .await
        .context("prepare engine binary")?;

    let public_ip = discover_public_ip(http.as_ref(), IP_ECHO_ENDPOINTS).await;
    let client_id = generate_client_id(settings.client_id_override(kind));
    let identity = ServerIdentity::new(client_id, settings.port, public_ip);
    let variant = settings.variant(kind);

    let keys = if variant.needs_reality_keys() {
        Some(
            generate_reality_keys(&paths.engine)
                .await
                .context("generate reality keypair")?,
        )
    } else {
        None
    };

    let config = build_config(&identity, &variant, keys.as_ref()).context("build engine config")?;
    write_engine_config(&paths.config, &config)?;

    let link = encode_link(&identity, &variant, keys.as_ref()).context("encode share link")?;
    write_results(&paths.results, &link)?;

    if identity.ip_unknown() {
        warn!("public ip unknown; edit the address in the share link before use");
    }

    Ok(Prepared {
        workdir: workdir.to_path_buf(),
        paths,
        identity,
        variant,
        keys,
        link,
    })
}

/// Operator-facing summary on stdout.
pub fn banner(p: &Prepared) -> String {
    let mut out = String::new();
    let rule = "==========================================";
    out.push_str(&format!("{rule}\n{} server ready\n{rule}\n", p.variant.label()));
    out.push_str(&format!("Server:     {}:{}\n", p.identity.public_ip, p.identity.listen_port));
    out.push_str(&format!("UUID:       {}\n", p.identity.client_id));
    if let (ProtocolVariant::VlessReality { dest, .. }, Some(keys)) = (&p.variant, &p.keys) {
        out.push_str(&format!("Public key: {}\n", keys.public_key));
        out.push_str(&format!("Short id:   {}\n", keys.short_id));
        out.push_str(&format!("SNI:        {}\n", p.variant.primary_server_name().unwrap_or_default()));
        out.push_str(&format!("Dest:       {dest}\n"));
    }
    out.push_str(&format!("Link file:  {}\n", p.paths.results.display()));
    out.push_str(&format!("{rule}\n{}\n{rule}", p.link));
    out
}

/// Registration then supervision. Returns only when a shutdown signal
/// arrives; the supervisor future is dropped, which kills the engine.
pub async fn serve(http: Arc<dyn HttpClient>, settings: &LauncherSettings, p: &Prepared, quiet: bool) -> Result<()> {
    use std::io::IsTerminal;

    let interactive = std::io::stdin().is_terminal();
    let outcome = NodeRegistrar::new(http, settings.registrar(interactive))
        .register(&p.link, &p.identity, &p.variant)
        .await;
    info!(?outcome, "registration finished");

    let launcher = CommandLauncher::engine(&p.paths.engine, &p.paths.config)
        .current_dir(&p.workdir)
        .quiet(quiet);
    let supervisor = Supervisor::new(launcher);

    tokio::select! {
        never = supervisor.run() => match never {},
        signal = shutdown_signal() => {
            let signal = signal?;
            info!(signal, "shutting down, stopping engine");
        }
    }
    Ok(())
}

/// Resolve on SIGINT or (on unix) SIGTERM, with the signal's name.
async fn shutdown_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).context("install SIGTERM handler")?;
        tokio::select! {
            r = tokio::signal::ctrl_c() => r.map(|_| "SIGINT").context("wait for SIGINT"),
            _ = term.recv() => Ok("SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.context("wait for Ctrl-C")?;
        Ok("Ctrl-C")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(variant: ProtocolVariant, keys: Option<RealityKeyMaterial>) -> Prepared {
        Prepared {
            workdir: PathBuf::from("/srv/node"),
            paths: EnginePaths::in_dir("/srv/node"),
            identity: ServerIdentity::new("11111111-2222-4333-8444-555555555555", 20041, "103.1.2.3"),
            variant,
            keys,
            link: "vless://example".into(),
        }
    }

    #[test]
    fn reality_banner_shows_public_material_only() {
        let keys = RealityKeyMaterial {
            private_key: "PRIVATE-SECRET".into(),
            public_key: "PUBLIC-KEY".into(),
            short_id: "0123456789abcdef".into(),
        };
        let text = banner(&prepared(ProtocolVariant::vless_reality_default(), Some(keys)));
        assert!(text.contains("103.1.2.3:20041"));
        assert!(text.contains("PUBLIC-KEY"));
        assert!(text.contains("0123456789abcdef"));
        assert!(text.contains("www.microsoft.com"));
        assert!(text.contains("/srv/node/link.txt"));
        assert!(!text.contains("PRIVATE-SECRET"));
    }

    #[test]
    fn vmess_banner_has_no_reality_lines() {
        let text = banner(&prepared(ProtocolVariant::VMess, None));
        assert!(text.starts_with("=="));
        assert!(text.contains("VMess server ready"));
        assert!(!text.contains("Public key"));
    }

    #[test]
    fn workdir_is_created_and_absolute() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = resolve_workdir(Some(&tmp.path().join("nested/run"))).unwrap();
        assert!(dir.is_absolute());
        assert!(dir.is_dir());
        assert!(resolve_workdir(None).unwrap().is_absolute());
    }
}
