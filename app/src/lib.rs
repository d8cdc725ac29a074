//! xray-runner: launches an Xray-core node and keeps it running.
//!
//! The library half of the binary, exposed so integration tests can drive
//! the CLI definition, settings and pipeline directly.

pub mod bootstrap;
pub mod cli;
pub mod logging;
pub mod reqwest_http;
pub mod settings;
