//! `--web.listen-address` handling.

use std::borrow::Cow;

use anyhow::Context;
use tokio::net::TcpListener;

/// A bare `:port` binds every IPv4 interface. Anything else is `host:port`
/// and is resolved when binding, so hostnames work as well as IP literals.
pub fn bind_address(addr: &str) -> Cow<'_, str> {
    if addr.starts_with(':') {
        Cow::Owned(format!("0.0.0.0{addr}"))
    } else {
        Cow::Borrowed(addr)
    }
}

pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    let resolved = bind_address(addr);
    TcpListener::bind(resolved.as_ref())
        .await
        .with_context(|| format!("error starting HTTP server on {addr}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_port_binds_all_interfaces() {
        assert_eq!(bind_address(":9608"), "0.0.0.0:9608");
    }

    #[test]
    fn host_and_port_passed_through() {
        for addr in ["127.0.0.1:9100", "[::1]:9608", "localhost:9608", "exporter.internal:9608"] {
            assert_eq!(bind_address(addr), addr);
        }
    }

    #[tokio::test]
    async fn binds_hostname() {
        let listener = bind("localhost:0").await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn binds_bare_port() {
        let listener = bind(":0").await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_unspecified());
    }

    #[tokio::test]
    async fn rejects_garbage() {
        for bad in ["9608", ":http", ":99999"] {
            let err = bind(bad).await.unwrap_err();
            assert!(err.to_string().contains(bad), "{bad}");
        }
    }
}
