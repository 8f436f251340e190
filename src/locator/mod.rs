//! Network-origin metadata resolution.
//!
//! A [`Locator`] resolves where the client's traffic appears to come
//! from. It is handed the client's own transport, so results reflect any
//! configured proxy.

mod ipinfo;

pub use ipinfo::IpinfoLocator;

use std::net::IpAddr;

use async_trait::async_trait;

use crate::error::Result;
use crate::transport::Transport;

/// Resolved network-origin metadata. Immutable; cached per client for
/// the client's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub ip: Option<IpAddr>,
    pub asn: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub postal: String,
}

/// Pluggable locate capability.
#[async_trait]
pub trait Locator: Send + Sync {
    /// Resolve the current network origin with a single round trip over
    /// `transport`. No retries; cancellation is dropping the future.
    async fn locate(&self, transport: &dyn Transport) -> Result<Location>;
}
