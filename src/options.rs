//! Ordered configuration mutations applied at client construction.
//!
//! Options that reconfigure transport internals (proxy, keep-alives,
//! TLS config) only apply to the canonical [`HttpTransport`]; on a
//! foreign transport they silently no-op, emitting a debug event. This
//! mirrors the behavior the crate inherited and is a documented
//! limitation, not a recommendation.

use std::sync::Arc;

use bytes::Bytes;
use http::header::USER_AGENT;
use http::{HeaderValue, Request};
use url::Url;

use crate::client::Client;
use crate::cookie::{Cookie, CookieStore};
use crate::error::Result;
use crate::locator::Locator;
use crate::response::Response;
use crate::tlshuffle::TlsConfig;
use crate::transport::{HttpTransport, Transport};
use crate::useragent::{UserAgent, UserAgents};

/// One configuration mutation. Applied in registration order; later
/// options override earlier ones.
pub struct ClientOption(Box<dyn FnOnce(&mut Client) + Send>);

impl ClientOption {
    fn new(f: impl FnOnce(&mut Client) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub(crate) fn apply(self, client: &mut Client) {
        (self.0)(client)
    }
}

/// Mutate the canonical transport, or skip with a debug event when the
/// configured transport is something else.
fn with_http_transport(
    option: &'static str,
    f: impl FnOnce(&mut HttpTransport) + Send + 'static,
) -> ClientOption {
    ClientOption::new(move |client| match client.transport.as_http() {
        Some(transport) => f(transport),
        None => {
            tracing::debug!(option, "transport is not the canonical HTTP transport; skipping");
        }
    })
}

/// Replace the transport.
pub fn with_transport(transport: impl Transport + 'static) -> ClientOption {
    ClientOption::new(move |client| client.transport = Box::new(transport))
}

/// Replace the cookie store.
pub fn with_cookie_store(store: impl CookieStore + 'static) -> ClientOption {
    ClientOption::new(move |client| client.store = Box::new(store))
}

/// Replace the locator.
pub fn with_locator(locator: impl Locator + 'static) -> ClientOption {
    ClientOption::new(move |client| client.locator = Box::new(locator))
}

/// Inject cookies into the store as if received from `url`.
pub fn with_cookies(url: Url, cookies: Vec<Cookie>) -> ClientOption {
    ClientOption::new(move |client| client.store.set_cookies(&url, cookies))
}

/// Route requests through a forward proxy. Canonical transport only.
pub fn with_proxy_url(proxy: Url) -> ClientOption {
    with_http_transport("with_proxy_url", move |transport| {
        transport.proxy = Some(proxy);
    })
}

/// Toggle keep-alive advertisement. Canonical transport only.
pub fn with_disable_keep_alives(disable: bool) -> ClientOption {
    with_http_transport("with_disable_keep_alives", move |transport| {
        transport.disable_keep_alives = disable;
    })
}

/// Replace the TLS configuration. Canonical transport only; the last
/// registered config wins.
pub fn with_tls_config(config: TlsConfig) -> ClientOption {
    with_http_transport("with_tls_config", move |transport| {
        transport.tls = Some(config);
    })
}

/// TLS configuration with a one-shot shuffled cipher-suite order. The
/// shuffle happens here, once, not per request.
pub fn with_tls_shuffle() -> ClientOption {
    with_tls_config(TlsConfig::shuffled())
}

/// Append a request transform to the pipeline.
pub fn with_request_transform(
    f: impl Fn(Request<Bytes>) -> Result<Request<Bytes>> + Send + Sync + 'static,
) -> ClientOption {
    ClientOption::new(move |client| client.request_transforms.push(Box::new(f)))
}

/// Append a response transform to the pipeline.
pub fn with_response_transform(
    f: impl Fn(Response) -> Result<Response> + Send + Sync + 'static,
) -> ClientOption {
    ClientOption::new(move |client| client.response_transforms.push(Box::new(f)))
}

/// Send a fixed User-Agent header on every request.
pub fn with_user_agent_str(user_agent: impl Into<String>) -> ClientOption {
    let user_agent = user_agent.into();
    with_request_transform(move |mut request| {
        let value = HeaderValue::from_str(&user_agent).map_err(http::Error::from)?;
        request.headers_mut().insert(USER_AGENT, value);
        Ok(request)
    })
}

/// Rotate the User-Agent header through the category's ring, one value
/// per request.
pub fn with_user_agent(agents: &Arc<UserAgents>, category: UserAgent) -> ClientOption {
    let agents = Arc::clone(agents);
    with_request_transform(move |mut request| {
        let value =
            HeaderValue::from_str(&agents.next(category)).map_err(http::Error::from)?;
        request.headers_mut().insert(USER_AGENT, value);
        Ok(request)
    })
}
