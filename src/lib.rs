//! # Veil
//!
//! HTTP client identity layer: shuffled TLS cipher-suite ordering,
//! rotating user agents, cached geolocation, and an ordered
//! request/response transform pipeline, composed over a pluggable
//! transport.
//!
//! ```no_run
//! use std::sync::Arc;
//! use veil::{options, Client, UserAgent, UserAgents};
//!
//! # async fn run() -> veil::Result<()> {
//! let agents = Arc::new(UserAgents::new()?);
//! let client = Client::new([
//!     options::with_tls_shuffle(),
//!     options::with_user_agent(&agents, UserAgent::Desktop),
//! ]);
//! let response = client.get("http://example.com/").await?;
//! println!("{}", response.text()?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod cookie;
pub mod error;
pub mod locator;
pub mod options;
pub mod response;
pub mod tlshuffle;
pub mod transport;
pub mod useragent;

pub use client::{Client, RequestTransform, ResponseTransform};
pub use cookie::{Cookie, CookieJar, CookieStore};
pub use error::{Error, Result};
pub use locator::{IpinfoLocator, Location, Locator};
pub use options::ClientOption;
pub use response::Response;
pub use tlshuffle::TlsConfig;
pub use transport::{HttpTransport, Transport};
pub use useragent::{UserAgent, UserAgents};
