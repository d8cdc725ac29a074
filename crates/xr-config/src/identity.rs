//! Immutable startup values shared by the synthesizer and the link encoder.
//!
//! Both consumers read the same instances, which is what keeps the config
//! file and the connection string consistent with each other.

use std::fmt;
use std::str::FromStr;

/// Sentinel used when public-IP discovery fails.
pub const UNKNOWN_IP: &str = "UNKNOWN";

/// Who this node is: client id, listen port and the address clients dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub client_id: String,
    pub listen_port: u16,
    pub public_ip: String,
}

impl ServerIdentity {
    pub fn new(client_id: impl Into<String>, listen_port: u16, public_ip: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            listen_port,
            public_ip: public_ip.into(),
        }
    }

    /// `true` when discovery fell back to [`UNKNOWN_IP`].
    pub fn ip_unknown(&self) -> bool {
        self.public_ip == UNKNOWN_IP
    }
}

/// Reality keypair plus short id. Lives only for the current process.
#[derive(Clone, PartialEq, Eq)]
pub struct RealityKeyMaterial {
    pub private_key: String,
    pub public_key: String,
    pub short_id: String,
}

// Keep the private key out of logs.
impl fmt::Debug for RealityKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealityKeyMaterial")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("short_id", &self.short_id)
            .finish()
    }
}

/// The two protocol shapes the launcher can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolVariant {
    /// VLESS over TCP with Reality camouflage.
    VlessReality {
        /// Masquerade destination, `host:port`.
        dest: String,
        /// SNI values accepted by the server; the first one goes into the link.
        server_names: Vec<String>,
    },
    /// VMess over TCP with an HTTP-disguise header.
    VMess,
}

impl ProtocolVariant {
    pub const DEFAULT_REALITY_DEST: &'static str = "www.microsoft.com:443";
    pub const DEFAULT_REALITY_SERVER_NAME: &'static str = "www.microsoft.com";

    /// Reality variant with the stock masquerade target.
    pub fn vless_reality_default() -> Self {
        Self::VlessReality {
            dest: Self::DEFAULT_REALITY_DEST.to_string(),
            server_names: vec![Self::DEFAULT_REALITY_SERVER_NAME.to_string()],
        }
    }

    /// Human label used in node names and banners.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VlessReality { .. } => "VLESS-Reality",
            Self::VMess => "VMess",
        }
    }

    /// Engine inbound protocol name.
    pub fn engine_protocol(&self) -> &'static str {
        match self {
            Self::VlessReality { .. } => "vless",
            Self::VMess => "vmess",
        }
    }

    pub fn needs_reality_keys(&self) -> bool {
        matches!(self, Self::VlessReality { .. })
    }

    /// First configured SNI, if this is the Reality variant.
    pub fn primary_server_name(&self) -> Option<&str> {
        match self {
            Self::VlessReality { server_names, .. } => server_names.first().map(String::as_str),
            Self::VMess => None,
        }
    }
}

/// Variant selector without payload, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolKind {
    #[default]
    VlessReality,
    VMess,
}

impl FromStr for ProtocolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vless-reality" | "vless" | "reality" => Ok(Self::VlessReality),
            "vmess" => Ok(Self::VMess),
            other => Err(format!(
                "unknown protocol '{other}' (expected vless-reality or vmess)"
            )),
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VlessReality => "vless-reality",
            Self::VMess => "vmess",
        })
    }
}

/// Split a comma separated SNI list, dropping blanks.
pub fn parse_server_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
