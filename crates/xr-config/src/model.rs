//! Engine configuration schema (the subset of Xray-core's JSON we emit).
//!
//! Field order in these structs is the order in the written file; keep it
//! stable so identical inputs serialize to identical bytes.

use serde::{Deserialize, Serialize};

/// Top-level engine document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub log: LogConfig,
    pub inbounds: Vec<Inbound>,
    pub outbounds: Vec<Outbound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub loglevel: LogLevel,
}

/// Engine log level. We only ever emit the quiet ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Warning,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbound {
    pub port: u16,
    pub protocol: String,
    pub settings: InboundSettings,
    pub stream_settings: StreamSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sniffing: Option<Sniffing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundSettings {
    pub clients: Vec<Client>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decryption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alter_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSettings {
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality_settings: Option<RealitySettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_settings: Option<TcpSettings>,
}

/// Server side Reality settings.
///
/// `public_key` is not read by the engine's server path; it is kept so the
/// config carries every credential the share link advertises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealitySettings {
    pub show: bool,
    pub dest: String,
    pub xver: u8,
    pub server_names: Vec<String>,
    pub private_key: String,
    pub public_key: String,
    pub short_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpSettings {
    pub accept_proxy_protocol: bool,
    pub header: TcpHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpHeader {
    #[serde(rename = "type")]
    pub kind: String,
    pub response: DisguiseResponse,
}

/// Canned HTTP response the engine prepends to make VMess look like HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisguiseResponse {
    pub version: String,
    pub status: String,
    pub reason: String,
    pub headers: DisguiseHeaders,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisguiseHeaders {
    #[serde(rename = "Content-Type")]
    pub content_type: Vec<String>,
    #[serde(rename = "Transfer-Encoding")]
    pub transfer_encoding: Vec<String>,
    #[serde(rename = "Connection")]
    pub connection: Vec<String>,
    #[serde(rename = "Pragma")]
    pub pragma: String,
}

impl Default for DisguiseResponse {
    fn default() -> Self {
        Self {
            version: "1.1".to_string(),
            status: "200".to_string(),
            reason: "OK".to_string(),
            headers: DisguiseHeaders {
                content_type: vec!["text/html; charset=utf-8".to_string()],
                transfer_encoding: vec!["chunked".to_string()],
                connection: vec!["keep-alive".to_string()],
                pragma: "no-cache".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sniffing {
    pub enabled: bool,
    pub dest_override: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outbound {
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Outbound {
    /// Plain direct egress.
    pub fn direct() -> Self {
        Self {
            protocol: "freedom".to_string(),
            tag: Some("direct".to_string()),
        }
    }
}

impl EngineConfig {
    /// Pretty JSON, the on-disk form.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, crate::ConfigError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// The single inbound this launcher ever emits.
    pub fn inbound(&self) -> Option<&Inbound> {
        self.inbounds.first()
    }
}
