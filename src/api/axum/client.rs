use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;

use crate::client::{ClientInfo, resolve_client_address};

/// Resolves the client address from proxy headers, then the peer address.
pub fn extract_client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    resolve_client_address(
        |name| headers.get(name).and_then(|v| v.to_str().ok()),
        peer,
    )
}

/// Address and user-agent of the caller. The peer address is read from
/// `ConnectInfo<SocketAddr>` when the server was started with it.
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let fingerprint = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        Ok(ClientInfo::new(
            extract_client_ip(&parts.headers, peer),
            fingerprint,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_header_chain() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.9"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
        );
        assert_eq!(extract_client_ip(&headers, None), "203.0.113.5");

        headers.insert("cf-connecting-ip", HeaderValue::from_static("2001:db8::7"));
        assert_eq!(extract_client_ip(&headers, None), "2001:db8::7");
    }

    #[test]
    fn test_invalid_header_falls_through_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        let peer = IpAddr::V6(Ipv6Addr::LOCALHOST);
        assert_eq!(extract_client_ip(&headers, Some(peer)), "::1");
        assert_eq!(extract_client_ip(&headers, None), "0.0.0.0");
    }
}
