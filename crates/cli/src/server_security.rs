use anyhow::{Context as AnyhowContext, Result};
use std::net::SocketAddr;

/// Resolves `bind` and refuses non-loopback addresses unless `public` is set.
///
/// Session ids and action tokens travel in query strings, so the browser is
/// loopback-only by default.
pub(crate) async fn resolve_bind_addr(bind: &str, public: bool) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(bind)
        .await
        .with_context(|| format!("Failed to resolve bind address: {bind}"))?
        .collect();
    check_bind_addrs(bind, &addrs, public)?;
    addrs
        .iter()
        .copied()
        .find(SocketAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
        .with_context(|| format!("Bind address resolved to zero socket addrs: {bind}"))
}

fn check_bind_addrs(bind: &str, addrs: &[SocketAddr], public: bool) -> Result<()> {
    if addrs.is_empty() {
        anyhow::bail!("Bind address resolved to zero socket addrs: {bind}")
    }
    if !public && addrs.iter().any(|addr| !addr.ip().is_loopback()) {
        anyhow::bail!(
            "Refusing to bind to non-loopback address without --public: {bind}"
        )
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loopback_binds_without_public() {
        let addr = resolve_bind_addr("127.0.0.1:0", false).await.unwrap();
        assert!(addr.ip().is_loopback());
    }

    #[tokio::test]
    async fn non_loopback_requires_public() {
        assert!(resolve_bind_addr("0.0.0.0:0", false).await.is_err());
        resolve_bind_addr("0.0.0.0:0", true).await.unwrap();
    }

    #[test]
    fn empty_resolution_is_rejected() {
        assert!(check_bind_addrs("nowhere:0", &[], true).is_err());
    }
}
