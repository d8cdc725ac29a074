//! Node naming for the inventory registrar.
//!
//! The region is a coarse guess from the first IPv4 octet. It is a label for
//! humans scanning the inventory, not geolocation.

use crate::identity::ProtocolVariant;

/// Region label used when no prefix matches.
pub const DEFAULT_REGION: &str = "Node";

const REGION_PREFIXES: &[(&str, &str)] = &[
    ("103.", "HK"),
    ("119.", "HK"),
    ("172.", "US"),
    ("45.", "US"),
    ("89.", "EU"),
];

/// Best-effort region label for `ip`.
pub fn region_for_ip(ip: &str) -> &'static str {
    REGION_PREFIXES
        .iter()
        .find(|(prefix, _)| ip.starts_with(prefix))
        .map(|(_, region)| *region)
        .unwrap_or(DEFAULT_REGION)
}

/// `{region}-{protocol}-{port}`
pub fn node_name(ip: &str, variant: &ProtocolVariant, port: u16) -> String {
    format!("{}-{}-{}", region_for_ip(ip), variant.label(), port)
}
