//! Share-link encoding.
//!
//! Links are derived from the same [`ServerIdentity`] / [`RealityKeyMaterial`]
//! values the config is built from, never regenerated.

use crate::identity::{ProtocolVariant, RealityKeyMaterial, ServerIdentity};
use crate::synth::VISION_FLOW;
use crate::ConfigError;
use base64::Engine as _;
use serde::Serialize;
use std::borrow::Cow;
use std::net::Ipv6Addr;

/// Fragment appended to the VLESS link.
pub const VLESS_LINK_NAME: &str = "VLESS-Reality";
/// `ps` field of the VMess link.
pub const VMESS_LINK_NAME: &str = "VMess-Server";

/// VMess share object; field order is the serialized order.
#[derive(Debug, Serialize)]
struct VmessShare<'a> {
    v: &'a str,
    ps: &'a str,
    add: &'a str,
    port: String,
    id: &'a str,
    aid: &'a str,
    net: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    tls: &'a str,
}

/// Render the connection string clients import.
pub fn encode_link(
    identity: &ServerIdentity,
    variant: &ProtocolVariant,
    keys: Option<&RealityKeyMaterial>,
) -> Result<String, ConfigError> {
    match variant {
        ProtocolVariant::VlessReality { .. } => {
            let keys = keys.ok_or(ConfigError::MissingRealityKeys)?;
            let sni = variant
                .primary_server_name()
                .ok_or(ConfigError::NoServerName)?;
            Ok(vless_link(identity, sni, keys))
        }
        ProtocolVariant::VMess => vmess_link(identity),
    }
}

/// URI host form of `ip`: IPv6 literals are bracketed, anything else
/// (IPv4, `UNKNOWN`) is used as-is.
fn uri_host(ip: &str) -> Cow<'_, str> {
    if ip.parse::<Ipv6Addr>().is_ok() {
        Cow::Owned(format!("[{ip}]"))
    } else {
        Cow::Borrowed(ip)
    }
}

// Parameter order is fixed; some client importers are positional.
fn vless_link(identity: &ServerIdentity, sni: &str, keys: &RealityKeyMaterial) -> String {
    format!(
        "vless://{id}@{ip}:{port}?encryption=none&flow={flow}&security=reality&sni={sni}\
         &fp=chrome&pbk={pbk}&sid={sid}&type=tcp&headerType=none#{name}",
        id = identity.client_id,
        ip = uri_host(&identity.public_ip),
        port = identity.listen_port,
        flow = VISION_FLOW,
        pbk = keys.public_key,
        sid = keys.short_id,
        name = VLESS_LINK_NAME,
    )
}

fn vmess_link(identity: &ServerIdentity) -> Result<String, ConfigError> {
    let share = VmessShare {
        v: "2",
        ps: VMESS_LINK_NAME,
        add: &identity.public_ip,
        port: identity.listen_port.to_string(),
        id: &identity.client_id,
        aid: "0",
        net: "tcp",
        kind: "http",
        tls: "",
    };
    let json = serde_json::to_string(&share)?;
    Ok(format!(
        "vmess://{}",
        base64::engine::general_purpose::STANDARD.encode(json)
    ))
}
