//! Cookie storage behind a pluggable store capability.
//!
//! The default [`CookieJar`] is a domain-scoped in-memory store that
//! refuses to set cookies for bare public suffixes.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, TimeZone, Utc};
use url::Url;

use crate::error::{Error, Result};

/// Public suffixes a cookie domain may never equal. Kept deliberately
/// small; the guard only has to stop the obvious cross-site grabs.
const PUBLIC_SUFFIXES: &[&str] = &[
    "com", "net", "org", "edu", "gov", "mil", "int", "io", "co", "co.uk", "org.uk", "ac.uk",
    "gov.uk", "com.au", "net.au", "org.au", "co.jp", "ne.jp", "or.jp", "com.br", "co.nz",
];

fn is_public_suffix(domain: &str) -> bool {
    PUBLIC_SUFFIXES.iter().any(|s| domain.eq_ignore_ascii_case(s))
}

/// Cookie representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<String>,
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            secure: false,
            http_only: false,
            same_site: None,
            expires: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = normalize_domain(&domain.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Parse a Set-Cookie header value received for `request_url`.
    ///
    /// An explicit Domain attribute naming a bare public suffix is
    /// rejected; without one the cookie is scoped to the request host.
    pub fn parse(header: &str, request_url: &Url) -> Result<Self> {
        let request_domain = request_url
            .host_str()
            .ok_or_else(|| Error::cookie_parse("no host in URL"))?;

        let parts: Vec<&str> = header.split(';').map(str::trim).collect();
        let (name, value) = match parts[0].split_once('=') {
            Some((n, v)) => (n.trim().to_string(), v.trim().to_string()),
            None => return Err(Error::cookie_parse("no = in cookie")),
        };
        if name.is_empty() {
            return Err(Error::cookie_parse("empty cookie name"));
        }

        let mut cookie = Cookie::new(name, value).with_domain(request_domain);
        let mut max_age: Option<i64> = None;

        for attr in parts.iter().skip(1) {
            let attr_lower = attr.to_lowercase();
            if attr_lower == "secure" {
                cookie.secure = true;
            } else if attr_lower == "httponly" {
                cookie.http_only = true;
            } else if let Some((key, val)) = attr.split_once('=') {
                match key.trim().to_lowercase().as_str() {
                    "domain" => {
                        let domain = normalize_domain(val.trim());
                        if is_public_suffix(&domain) {
                            return Err(Error::cookie_parse(format!(
                                "cookie domain is a public suffix: {}",
                                domain
                            )));
                        }
                        cookie.domain = domain;
                    }
                    "path" => cookie.path = val.trim().to_string(),
                    "expires" => cookie.expires = parse_cookie_date(val.trim()),
                    "max-age" => max_age = val.trim().parse().ok(),
                    "samesite" => cookie.same_site = Some(val.trim().to_string()),
                    _ => {}
                }
            }
        }
        // Max-Age wins over Expires when both are present.
        if let Some(secs) = max_age {
            cookie.expires = Some(Utc::now() + chrono::Duration::seconds(secs));
        }
        Ok(cookie)
    }

    /// Whether this cookie should be sent with a request to `url`.
    pub fn matches_url(&self, url: &Url) -> bool {
        let request_domain = match url.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        };

        if self.secure && url.scheme() != "https" {
            return false;
        }
        if let Some(expires) = self.expires {
            if expires < Utc::now() {
                return false;
            }
        }

        let cookie_domain = self.domain.to_lowercase();
        if request_domain != cookie_domain
            && !request_domain.ends_with(&format!(".{}", cookie_domain))
        {
            return false;
        }

        let request_path = url.path();
        request_path == self.path
            || request_path.starts_with(&format!("{}/", self.path.trim_end_matches('/')))
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Cookie store capability.
///
/// Implementations use interior mutability; a store is shared by every
/// task holding the client.
pub trait CookieStore: Send + Sync {
    /// Cookies applicable to a request to `url`.
    fn cookies(&self, url: &Url) -> Vec<Cookie>;

    /// Store cookies received in a response from `url`.
    fn set_cookies(&self, url: &Url, cookies: Vec<Cookie>);
}

/// Default in-memory cookie store, scoped by domain.
#[derive(Debug, Default)]
pub struct CookieJar {
    // domain -> name -> cookie
    cookies: RwLock<HashMap<String, HashMap<String, Cookie>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cookies.read().unwrap().values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.read().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.cookies.write().unwrap().clear();
    }

    /// Assemble a Cookie request-header value for `url`, if any
    /// stored cookie matches.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.cookies(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl CookieStore for CookieJar {
    fn cookies(&self, url: &Url) -> Vec<Cookie> {
        self.cookies
            .read()
            .unwrap()
            .values()
            .flat_map(|m| m.values())
            .filter(|c| c.matches_url(url))
            .cloned()
            .collect()
    }

    fn set_cookies(&self, url: &Url, cookies: Vec<Cookie>) {
        let host = url.host_str().unwrap_or_default().to_lowercase();
        let mut map = self.cookies.write().unwrap();
        for mut cookie in cookies {
            if cookie.domain.is_empty() {
                cookie.domain = host.clone();
            }
            map.entry(cookie.domain.clone())
                .or_default()
                .insert(cookie.name.clone(), cookie);
        }
    }
}

fn normalize_domain(domain: &str) -> String {
    domain.strip_prefix('.').unwrap_or(domain).to_lowercase()
}

fn parse_cookie_date(date_str: &str) -> Option<DateTime<Utc>> {
    for fmt in [
        "%a, %d %b %Y %H:%M:%S GMT",
        "%a, %d-%b-%y %H:%M:%S GMT",
        "%Y-%m-%dT%H:%M:%SZ",
    ] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date_str, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    date_str
        .parse::<i64>()
        .ok()
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}
