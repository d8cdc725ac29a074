//! Engine config synthesis.
//!
//! `build_config` is a pure function of `(identity, variant, keys)`: no clock,
//! no randomness, no I/O. Writing the result is the caller's job.

use crate::identity::{ProtocolVariant, RealityKeyMaterial, ServerIdentity};
use crate::model::{
    Client, DisguiseResponse, EngineConfig, Inbound, InboundSettings, LogConfig, LogLevel,
    Outbound, RealitySettings, Sniffing, StreamSettings, TcpHeader, TcpSettings,
};
use crate::ConfigError;

/// Client flow used by the Reality variant.
pub const VISION_FLOW: &str = "xtls-rprx-vision";

/// Build the engine document for `variant`.
///
/// The Reality variant requires `keys`; the VMess variant ignores them.
pub fn build_config(
    identity: &ServerIdentity,
    variant: &ProtocolVariant,
    keys: Option<&RealityKeyMaterial>,
) -> Result<EngineConfig, ConfigError> {
    let (inbound, loglevel) = match variant {
        ProtocolVariant::VlessReality { dest, server_names } => {
            let keys = keys.ok_or(ConfigError::MissingRealityKeys)?;
            if server_names.is_empty() {
                return Err(ConfigError::NoServerName);
            }
            (vless_reality_inbound(identity, variant, dest, server_names, keys), LogLevel::Warning)
        }
        ProtocolVariant::VMess => (vmess_inbound(identity), LogLevel::None),
    };

    Ok(EngineConfig {
        log: LogConfig { loglevel },
        inbounds: vec![inbound],
        outbounds: vec![Outbound::direct()],
    })
}

fn vless_reality_inbound(
    identity: &ServerIdentity,
    variant: &ProtocolVariant,
    dest: &str,
    server_names: &[String],
    keys: &RealityKeyMaterial,
) -> Inbound {
    Inbound {
        port: identity.listen_port,
        protocol: variant.engine_protocol().to_string(),
        settings: InboundSettings {
            clients: vec![Client {
                id: identity.client_id.clone(),
                flow: Some(VISION_FLOW.to_string()),
                alter_id: None,
            }],
            decryption: Some("none".to_string()),
        },
        stream_settings: StreamSettings {
            network: "tcp".to_string(),
            security: Some("reality".to_string()),
            reality_settings: Some(RealitySettings {
                show: false,
                dest: dest.to_string(),
                xver: 0,
                server_names: server_names.to_vec(),
                private_key: keys.private_key.clone(),
                public_key: keys.public_key.clone(),
                short_ids: vec![keys.short_id.clone()],
            }),
            tcp_settings: None,
        },
        sniffing: Some(Sniffing {
            enabled: true,
            dest_override: ["http", "tls", "quic"].map(String::from).to_vec(),
        }),
        tag: None,
    }
}

fn vmess_inbound(identity: &ServerIdentity) -> Inbound {
    Inbound {
        port: identity.listen_port,
        protocol: ProtocolVariant::VMess.engine_protocol().to_string(),
        settings: InboundSettings {
            clients: vec![Client {
                id: identity.client_id.clone(),
                flow: None,
                alter_id: Some(0),
            }],
            decryption: None,
        },
        stream_settings: StreamSettings {
            network: "tcp".to_string(),
            security: None,
            reality_settings: None,
            tcp_settings: Some(TcpSettings {
                accept_proxy_protocol: false,
                header: TcpHeader {
                    kind: "http".to_string(),
                    response: DisguiseResponse::default(),
                },
            }),
        },
        sniffing: None,
        tag: Some("vmess".to_string()),
    }
}
