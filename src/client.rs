//! HTTP client composed from transport, cookie store, locator, and
//! transform pipelines.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, COOKIE};
use http::{HeaderValue, Request};
use tokio::sync::Mutex;
use url::Url;

use crate::cookie::{Cookie, CookieJar, CookieStore};
use crate::error::{Error, Result};
use crate::locator::{IpinfoLocator, Location, Locator};
use crate::options::ClientOption;
use crate::response::Response;
use crate::transport::{HttpTransport, Transport};

/// Stage of the request pipeline. May rewrite the request or abort the
/// exchange by returning an error.
pub type RequestTransform = Box<dyn Fn(Request<Bytes>) -> Result<Request<Bytes>> + Send + Sync>;

/// Stage of the response pipeline. May replace the response wholesale.
pub type ResponseTransform = Box<dyn Fn(Response) -> Result<Response> + Send + Sync>;

/// HTTP client with a pluggable transport, cookie store, locator, and
/// ordered transform pipelines.
///
/// Built once from ordered options; pipelines are fixed after
/// construction. Safe to share across tasks by reference.
pub struct Client {
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) store: Box<dyn CookieStore>,
    pub(crate) locator: Box<dyn Locator>,
    pub(crate) request_transforms: Vec<RequestTransform>,
    pub(crate) response_transforms: Vec<ResponseTransform>,
    // Held across the whole check/fetch/store sequence.
    location: Mutex<Option<Location>>,
}

impl Client {
    /// Build a client from defaults plus ordered options, applied left
    /// to right. Later options override earlier ones.
    pub fn new(options: impl IntoIterator<Item = ClientOption>) -> Self {
        let mut client = Self {
            transport: Box::new(HttpTransport::default()),
            store: Box::new(CookieJar::new()),
            locator: Box::new(IpinfoLocator::new()),
            request_transforms: Vec::new(),
            response_transforms: Vec::new(),
            location: Mutex::new(None),
        };
        for option in options {
            option.apply(&mut client);
        }
        client
    }

    /// Perform one exchange: request transforms in registration order,
    /// the transport round trip, then response transforms in order. The
    /// first transform error aborts and is returned verbatim; an error
    /// before the round trip prevents it entirely.
    pub async fn execute(&self, request: Request<Bytes>) -> Result<Response> {
        let mut request = request;
        for transform in &self.request_transforms {
            request = transform(request)?;
        }

        let url = Url::parse(&request.uri().to_string())?;

        // Jar cookies ride along unless the caller set the header.
        if !request.headers().contains_key(COOKIE) {
            let cookies = self.store.cookies(&url);
            if !cookies.is_empty() {
                let header = cookies
                    .iter()
                    .map(|c| format!("{}={}", c.name, c.value))
                    .collect::<Vec<_>>()
                    .join("; ");
                let value = HeaderValue::from_str(&header).map_err(http::Error::from)?;
                request.headers_mut().insert(COOKIE, value);
            }
        }

        let response = self.transport.round_trip(request).await?;

        let received: Vec<Cookie> = response
            .header_all("set-cookie")
            .iter()
            .filter_map(|header| Cookie::parse(header, &url).ok())
            .collect();
        if !received.is_empty() {
            self.store.set_cookies(&url, received);
        }

        let mut response = response;
        for transform in &self.response_transforms {
            response = transform(response)?;
        }
        Ok(response)
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        let request = Request::get(url).body(Bytes::new())?;
        self.execute(request).await
    }

    pub async fn head(&self, url: &str) -> Result<Response> {
        let request = Request::head(url).body(Bytes::new())?;
        self.execute(request).await
    }

    pub async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> Result<Response> {
        let request = Request::post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body.into())?;
        self.execute(request).await
    }

    pub async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Response> {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        self.post(url, "application/x-www-form-urlencoded", encoded)
            .await
    }

    /// The configured transport.
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// The configured transport, mutably (e.g. for
    /// [`Transport::as_http`] inspection).
    pub fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }

    /// Stored cookie with the given name applicable to `url`.
    ///
    /// [`Error::CookieNotFound`] distinguishes absence from failure.
    pub fn cookie(&self, url: &Url, name: &str) -> Result<Cookie> {
        self.store
            .cookies(url)
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::CookieNotFound(name.to_string()))
    }

    pub fn has_cookie(&self, url: &Url, name: &str) -> bool {
        self.cookie(url, name).is_ok()
    }

    pub fn cookie_value(&self, url: &Url, name: &str) -> Option<String> {
        self.cookie(url, name).ok().map(|c| c.value)
    }

    /// Resolve the client's network origin. Always performs a lookup
    /// over the client's own transport.
    pub async fn location(&self) -> Result<Location> {
        self.locator.locate(self.transport.as_ref()).await
    }

    /// Like [`location`](Self::location), but the first successful
    /// result is cached for the client's lifetime.
    ///
    /// The cache lock is held across the lookup: concurrent callers
    /// block until the first completes and then observe the identical
    /// cached value. A failed lookup is not cached and may be retried.
    pub async fn location_cached(&self) -> Result<Location> {
        let mut cached = self.location.lock().await;
        if let Some(location) = cached.as_ref() {
            return Ok(location.clone());
        }
        let location = self.locator.locate(self.transport.as_ref()).await?;
        *cached = Some(location.clone());
        Ok(location)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}
