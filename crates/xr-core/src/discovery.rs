//! Public IP discovery via plain-text echo endpoints.

use crate::error::{LauncherError, Result};
use std::net::IpAddr;
use tracing::{debug, info, warn};
use xr_config::UNKNOWN_IP;
use xr_types::ports::http::{HttpClient, HttpRequest};

/// Tried in order; the first usable answer wins.
pub const IP_ECHO_ENDPOINTS: &[&str] = &["https://api64.ipify.org", "https://ifconfig.me"];
pub const IP_DISCOVERY_TIMEOUT_SECS: u64 = 3;

/// Ask each endpoint in turn for our public address.
///
/// An answer counts only if the status is 2xx and the trimmed body parses
/// as an IP address; captive portals and HTML error pages are skipped.
pub async fn try_discover_public_ip(http: &dyn HttpClient, endpoints: &[&str]) -> Result<String> {
    for url in endpoints {
        let rsp = match http
            .execute(HttpRequest::get(*url, IP_DISCOVERY_TIMEOUT_SECS))
            .await
        {
            Ok(rsp) => rsp,
            Err(e) => {
                debug!(url, error = %e, "ip echo endpoint unreachable");
                continue;
            }
        };
        if !rsp.is_success() {
            debug!(url, status = rsp.status, "ip echo endpoint returned error status");
            continue;
        }
        let body = rsp.text();
        let candidate = body.trim();
        match candidate.parse::<IpAddr>() {
            Ok(ip) => return Ok(ip.to_string()),
            Err(_) => debug!(url, "ip echo endpoint returned a non-address body"),
        }
    }
    Err(LauncherError::IpDiscoveryFailed)
}

/// Like [`try_discover_public_ip`] but never fails: falls back to `UNKNOWN`.
pub async fn discover_public_ip(http: &dyn HttpClient, endpoints: &[&str]) -> String {
    match try_discover_public_ip(http, endpoints).await {
        Ok(ip) => {
            info!(%ip, "public ip discovered");
            ip
        }
        Err(e) => {
            warn!(error = %e, "falling back to {UNKNOWN_IP}");
            UNKNOWN_IP.to_string()
        }
    }
}
