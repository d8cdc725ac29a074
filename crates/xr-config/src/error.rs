use thiserror::Error;

/// Errors raised while shaping or serializing the engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The Reality variant was asked for without key material.
    #[error("reality key material is required for the vless-reality variant")]
    MissingRealityKeys,

    /// The Reality variant needs at least one SNI to advertise.
    #[error("reality server name list is empty")]
    NoServerName,

    #[error("serialize engine config: {0}")]
    Serialize(#[from] serde_json::Error),
}
