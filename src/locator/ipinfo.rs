//! ipinfo.io locator.

use async_trait::async_trait;
use bytes::Bytes;
use http::Request;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::locator::{Location, Locator};
use crate::transport::Transport;

const IPINFO_ENDPOINT: &str = "http://ipinfo.io";

/// Locator backed by the ipinfo.io JSON endpoint.
#[derive(Debug, Clone, Default)]
pub struct IpinfoLocator {
    token: Option<String>,
    endpoint: Option<String>,
}

impl IpinfoLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a bearer token to lookups.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the provider endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(IPINFO_ENDPOINT)
    }
}

#[async_trait]
impl Locator for IpinfoLocator {
    async fn locate(&self, transport: &dyn Transport) -> Result<Location> {
        let mut builder = Request::get(self.endpoint()).header("Accept", "application/json");
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = builder.body(Bytes::new())?;

        let response = transport.round_trip(request).await?;
        if !response.is_success() {
            return Err(Error::http_status(response.status, "ipinfo lookup failed"));
        }
        let payload: IpinfoPayload = response.json()?;
        tracing::debug!(ip = %payload.ip, "resolved location");
        Ok(payload.into_location())
    }
}

/// Provider payload; unknown and missing fields are tolerated.
#[derive(Debug, Deserialize)]
struct IpinfoPayload {
    #[serde(default)]
    ip: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    org: String,
    #[serde(default)]
    postal: String,
}

impl IpinfoPayload {
    /// ASN is the first whitespace-delimited token of the org field,
    /// e.g. "AS13335 Cloudflare, Inc." -> "AS13335".
    fn asn(&self) -> String {
        self.org
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    fn into_location(self) -> Location {
        Location {
            ip: self.ip.parse().ok(),
            asn: self.asn(),
            country: self.country,
            region: self.region,
            city: self.city,
            postal: self.postal,
        }
    }
}
