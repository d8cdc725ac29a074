//! Launcher settings read from the process environment.
//!
//! `from_env` is a thin wrapper over [`LauncherSettings::from_lookup`], which
//! takes any `key -> value` function so tests never touch the real
//! environment.

use anyhow::{bail, Context, Result};
use xr_config::{parse_server_names, ProtocolKind, ProtocolVariant};
use xr_core::registrar::RegistrarSettings;

pub const DEFAULT_PORT: u16 = 20041;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    pub port: u16,
    pub vless_uuid: Option<String>,
    pub vmess_uuid: Option<String>,
    pub reality_dest: String,
    pub reality_server_names: Vec<String>,
    pub node_api_url: Option<String>,
    pub node_api_default_url: Option<String>,
    pub skip_node_upload: bool,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            vless_uuid: None,
            vmess_uuid: None,
            reality_dest: ProtocolVariant::DEFAULT_REALITY_DEST.to_string(),
            reality_server_names: vec![ProtocolVariant::DEFAULT_REALITY_SERVER_NAME.to_string()],
            node_api_url: None,
            node_api_default_url: None,
            skip_node_upload: false,
        }
    }
}

impl LauncherSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from `lookup`. Blank values count as unset; client id
    /// overrides are otherwise taken verbatim.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let verbatim = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT").map(|v| ("PORT", v)).or_else(|| get("SERVER_PORT").map(|v| ("SERVER_PORT", v))) {
            Some((key, raw)) => parse_port(&raw).with_context(|| format!("invalid {key}"))?,
            None => DEFAULT_PORT,
        };

        let reality_server_names = get("REALITY_SERVER_NAMES")
            .map(|raw| parse_server_names(&raw))
            .filter(|names| !names.is_empty())
            .unwrap_or(defaults.reality_server_names);

        Ok(Self {
            port,
            vless_uuid: verbatim("VLESS_UUID"),
            vmess_uuid: verbatim("VMESS_UUID"),
            reality_dest: get("REALITY_DEST").unwrap_or(defaults.reality_dest),
            reality_server_names,
            node_api_url: get("NODE_API_URL"),
            node_api_default_url: get("NODE_API_DEFAULT_URL"),
            skip_node_upload: get("SKIP_NODE_UPLOAD").is_some_and(|v| is_truthy(&v)),
        })
    }

    pub fn variant(&self, kind: ProtocolKind) -> ProtocolVariant {
        match kind {
            ProtocolKind::VlessReality => ProtocolVariant::VlessReality {
                dest: self.reality_dest.clone(),
                server_names: self.reality_server_names.clone(),
            },
            ProtocolKind::VMess => ProtocolVariant::VMess,
        }
    }

    /// Client id override for `kind` (`VLESS_UUID` or `VMESS_UUID`).
    pub fn client_id_override(&self, kind: ProtocolKind) -> Option<&str> {
        match kind {
            ProtocolKind::VlessReality => self.vless_uuid.as_deref(),
            ProtocolKind::VMess => self.vmess_uuid.as_deref(),
        }
    }

    pub fn registrar(&self, interactive: bool) -> RegistrarSettings {
        RegistrarSettings {
            skip: self.skip_node_upload,
            api_url: self.node_api_url.clone(),
            default_api_url: self.node_api_default_url.clone(),
            interactive,
        }
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    let port: u16 = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a port number"))?;
    if port == 0 {
        bail!("port must be between 1 and 65535");
    }
    Ok(port)
}

fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}
