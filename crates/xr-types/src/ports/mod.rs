//! Port traits implemented by the application layer.

pub mod http;
