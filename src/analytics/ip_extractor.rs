//! Client address extraction for click recording
//!
//! Forwarding headers are only honoured when the deployment says a proxy sits
//! in front of the service; otherwise the socket peer is used.

use axum::http::HeaderMap;
use std::net::IpAddr;
use tracing::warn;

use crate::config::{AnalyticsConfig, TrustedProxyMode};

/// Pick the address a click is attributed to.
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`, as seen on dual-stack
/// listeners) are reported as plain IPv4.
///
/// # Arguments
/// * `headers` - Request headers, consulted only in a trusted proxy mode
/// * `socket_ip` - Peer address of the connection, used as the fallback
/// * `config` - Analytics configuration naming the proxy mode and hop count
///
/// # Returns
/// The canonical client address under the configured trust rules
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_ip: IpAddr,
    config: &AnalyticsConfig,
) -> IpAddr {
    let ip = match config.trusted_proxy_mode {
        TrustedProxyMode::Cloudflare => cloudflare_ip(headers).unwrap_or_else(|| {
            warn!("CF-Connecting-IP header missing in Cloudflare mode, using socket address");
            socket_ip
        }),
        TrustedProxyMode::Standard => {
            forwarded_for_ip(headers, config.num_trusted_proxies).unwrap_or(socket_ip)
        }
        TrustedProxyMode::None => socket_ip,
    };

    ip.to_canonical()
}

fn cloudflare_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("cf-connecting-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// Walk X-Forwarded-For from the right, skipping `trusted_hops` proxies.
fn forwarded_for_ip(headers: &HeaderMap, trusted_hops: Option<usize>) -> Option<IpAddr> {
    let xff = headers.get("x-forwarded-for")?.to_str().ok()?;

    let chain: Vec<IpAddr> = xff
        .split(',')
        .filter_map(|s| s.trim().parse::<IpAddr>().ok())
        .collect();

    match trusted_hops {
        Some(hops) if chain.len() > hops => Some(chain[chain.len() - hops - 1]),
        // Chain shorter than the configured hops: the leftmost entry is all we have
        Some(_) => chain.first().copied(),
        None => chain.last().copied(),
    }
}
