//! xr-config: everything the launcher derives from its inputs without I/O.
//!
//! - [`identity`]: the immutable values built once at startup
//! - [`model`]: the engine's JSON schema (the subset we emit)
//! - [`synth`]: `build_config`, polymorphic over [`ProtocolVariant`]
//! - [`link`]: share-link encoding (`vless://`, `vmess://`)
//! - [`node`]: node-name heuristic used by the registrar
//!
//! 本 crate 只做纯计算；写文件与子进程都在 xr-core。

pub mod error;
pub mod identity;
pub mod link;
pub mod model;
pub mod node;
pub mod synth;

pub use error::ConfigError;
pub use identity::{
    parse_server_names, ProtocolKind, ProtocolVariant, RealityKeyMaterial, ServerIdentity, UNKNOWN_IP,
};
pub use link::encode_link;
pub use model::EngineConfig;
pub use node::{node_name, region_for_ip};
pub use synth::build_config;
