//! Client identification: address and fingerprint of the requester.

use std::net::IpAddr;

use crate::AuthError;

/// Proxy headers consulted before the peer address, in priority order.
pub const FORWARDED_HEADERS: [&str; 3] = ["CF-Connecting-IP", "X-Forwarded-For", "X-Real-IP"];

/// Used when neither headers nor the connection yield an address.
pub const UNKNOWN_ADDRESS: &str = "0.0.0.0";

/// What the core knows about the party making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Canonical textual IP address.
    pub address: String,
    /// Opaque fingerprint, the raw `User-Agent` value.
    pub fingerprint: String,
}

impl ClientInfo {
    pub fn new(address: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            fingerprint: fingerprint.into(),
        }
    }
}

/// Parses an address and returns its canonical text form.
///
/// IPv4-mapped IPv6 addresses collapse to plain IPv4 so the same client is
/// counted once in the failed-attempt ledger.
pub fn normalize_address(raw: &str) -> Result<String, AuthError> {
    raw.trim()
        .parse::<IpAddr>()
        .map(|ip| ip.to_canonical().to_string())
        .map_err(|_| AuthError::InvalidAddress)
}

/// Resolves the client address from proxy headers and the peer address.
///
/// Walks [`FORWARDED_HEADERS`] in order, taking the first hop of a
/// comma-separated chain; the first value that parses as an IP wins. The
/// peer address comes last, then [`UNKNOWN_ADDRESS`].
pub fn resolve_client_address<'a, F>(header: F, peer: Option<IpAddr>) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    for name in FORWARDED_HEADERS {
        let Some(value) = header(name) else {
            continue;
        };

        let first_hop = value.split(',').next().unwrap_or_default();
        if let Ok(address) = normalize_address(first_hop) {
            return address;
        }
    }

    peer.map_or_else(
        || UNKNOWN_ADDRESS.to_owned(),
        |ip| ip.to_canonical().to_string(),
    )
}
