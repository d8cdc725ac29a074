//! xr-types: cross-crate stable contracts (error classes, I/O ports).
//!
//! Nothing in here performs I/O. The runtime crate talks to the network only
//! through [`ports::http::HttpClient`]; the concrete client is injected by the
//! binary at startup.

pub mod errors;
pub mod ports;

pub use errors::{CoreError, ErrorClass};
