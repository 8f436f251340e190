//! Transport seam and the canonical HTTP/1.1 transport.
//!
//! [`Transport`] is the round-trip capability the client composes over.
//! [`HttpTransport`] is the default implementation: plain HTTP/1.1 over
//! a fresh TCP connection per call, with `httparse` for response heads.
//! It carries (but does not consume) a [`TlsConfig`]; handshakes and
//! connection pooling are out of scope, so `https` URIs are answered
//! with a typed error.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

use crate::error::{Error, Result};
use crate::response::Response;
use crate::tlshuffle::TlsConfig;

/// Maximum response head size (64KB).
const MAX_HEADERS_SIZE: usize = 64 * 1024;

/// Maximum number of headers to parse.
const MAX_HEADERS_COUNT: usize = 100;

/// One HTTP exchange. Implementations are shared across tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single request/response exchange.
    async fn round_trip(&self, request: Request<Bytes>) -> Result<Response>;

    /// Downcast to the canonical transport, if that is what this is.
    ///
    /// Options that reconfigure transport internals (proxy, keep-alives,
    /// TLS config) use this as their capability check and no-op when it
    /// returns `None`.
    fn as_http(&mut self) -> Option<&mut HttpTransport> {
        None
    }
}

/// Canonical HTTP/1.1 transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// TLS parameters for TLS-capable consumers of this configuration.
    pub tls: Option<TlsConfig>,
    /// Forward proxy; requests are sent there in absolute form.
    pub proxy: Option<Url>,
    /// Advertise `Connection: close` instead of `keep-alive`.
    pub disable_keep_alives: bool,
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Duration,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            tls: None,
            proxy: None,
            disable_keep_alives: false,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| Error::ConnectTimeout(self.connect_timeout))?
            .map_err(|e| Error::connection(format!("connect {}:{}: {}", host, port, e)))?;
        Ok(stream)
    }

    fn build_request(&self, request: &Request<Bytes>) -> Result<Vec<u8>> {
        let uri = request.uri();
        let method = request.method();
        let body = request.body();

        let mut wire = Vec::with_capacity(1024);
        wire.extend_from_slice(method.as_str().as_bytes());
        wire.push(b' ');
        if self.proxy.is_some() {
            // absolute-form request target through a proxy
            wire.extend_from_slice(uri.to_string().as_bytes());
        } else {
            let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
            wire.extend_from_slice(path.as_bytes());
        }
        wire.extend_from_slice(b" HTTP/1.1\r\n");

        wire.extend_from_slice(b"Host: ");
        if let Some(host) = uri.host() {
            wire.extend_from_slice(host.as_bytes());
            if let Some(port) = uri.port() {
                wire.push(b':');
                wire.extend_from_slice(port.as_str().as_bytes());
            }
        }
        wire.extend_from_slice(b"\r\n");

        let mut has_connection = false;
        let mut has_content_length = false;
        for (name, value) in request.headers() {
            if name == &http::header::HOST {
                continue;
            }
            if name == &http::header::CONNECTION {
                has_connection = true;
            }
            if name == &http::header::CONTENT_LENGTH {
                has_content_length = true;
            }
            wire.extend_from_slice(name.as_str().as_bytes());
            wire.extend_from_slice(b": ");
            wire.extend_from_slice(value.as_bytes());
            wire.extend_from_slice(b"\r\n");
        }

        if !has_connection {
            if self.disable_keep_alives {
                wire.extend_from_slice(b"Connection: close\r\n");
            } else {
                wire.extend_from_slice(b"Connection: keep-alive\r\n");
            }
        }
        let needs_length = !body.is_empty()
            || method == Method::POST
            || method == Method::PUT
            || method == Method::PATCH;
        if !has_content_length && needs_length {
            wire.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
        }

        wire.extend_from_slice(b"\r\n");
        Ok(wire)
    }

    async fn read_response(&self, stream: &mut TcpStream, method: &Method) -> Result<Response> {
        let mut buf: Vec<u8> = Vec::with_capacity(8 * 1024);
        let mut chunk = [0u8; 4096];

        // Read until the head parses completely.
        let (status, headers, head_len) = loop {
            let n = stream
                .read(&mut chunk)
                .await
                .map_err(|e| Error::connection(format!("read: {}", e)))?;
            if n == 0 {
                return Err(Error::protocol("connection closed before response head"));
            }
            buf.extend_from_slice(&chunk[..n]);
            if buf.len() > MAX_HEADERS_SIZE {
                return Err(Error::protocol("response head too large"));
            }

            let mut header_storage = [httparse::EMPTY_HEADER; MAX_HEADERS_COUNT];
            let mut parsed = httparse::Response::new(&mut header_storage);
            match parsed.parse(&buf) {
                Ok(httparse::Status::Complete(head_len)) => {
                    let status = parsed
                        .code
                        .ok_or_else(|| Error::protocol("missing status code"))?;
                    let headers: Vec<(String, String)> = parsed
                        .headers
                        .iter()
                        .map(|h| {
                            (
                                h.name.to_string(),
                                String::from_utf8_lossy(h.value).into_owned(),
                            )
                        })
                        .collect();
                    break (status, headers, head_len);
                }
                Ok(httparse::Status::Partial) => continue,
                Err(e) => return Err(Error::protocol(format!("malformed response: {}", e))),
            }
        };

        let response = Response::new(status, headers, Bytes::new());

        // HEAD and bodyless statuses carry no payload.
        if *method == Method::HEAD || status == 204 || status == 304 || (100..200).contains(&status)
        {
            return Ok(response);
        }

        let content_length = response
            .header("content-length")
            .and_then(|v| v.trim().parse::<usize>().ok());
        let chunked = response
            .header("transfer-encoding")
            .map(|v| v.to_lowercase().contains("chunked"))
            .unwrap_or(false);

        let body = if chunked {
            loop {
                if let Some(decoded) = decode_chunked(&buf[head_len..])? {
                    break Bytes::from(decoded);
                }
                let n = stream
                    .read(&mut chunk)
                    .await
                    .map_err(|e| Error::connection(format!("read: {}", e)))?;
                if n == 0 {
                    return Err(Error::protocol("connection closed mid chunked body"));
                }
                buf.extend_from_slice(&chunk[..n]);
            }
        } else if let Some(length) = content_length {
            while buf.len() < head_len + length {
                let n = stream
                    .read(&mut chunk)
                    .await
                    .map_err(|e| Error::connection(format!("read: {}", e)))?;
                if n == 0 {
                    return Err(Error::protocol("connection closed mid body"));
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            Bytes::copy_from_slice(&buf[head_len..head_len + length])
        } else {
            // No framing: body runs to EOF.
            loop {
                let n = stream
                    .read(&mut chunk)
                    .await
                    .map_err(|e| Error::connection(format!("read: {}", e)))?;
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            Bytes::copy_from_slice(&buf[head_len..])
        };

        Ok(Response::new(response.status, response.headers, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn round_trip(&self, request: Request<Bytes>) -> Result<Response> {
        let uri = request.uri().clone();
        match uri.scheme_str() {
            Some("http") => {}
            Some("https") => {
                return Err(Error::tls(
                    "https requires a TLS-capable transport; the canonical transport only carries \
                     TLS configuration",
                ));
            }
            other => {
                return Err(Error::protocol(format!(
                    "unsupported scheme: {}",
                    other.unwrap_or("none")
                )));
            }
        }

        let (host, port) = match &self.proxy {
            Some(proxy) => {
                let host = proxy
                    .host_str()
                    .ok_or_else(|| Error::connection("proxy URL has no host"))?;
                (host.to_string(), proxy.port_or_known_default().unwrap_or(80))
            }
            None => {
                let host = uri
                    .host()
                    .ok_or_else(|| Error::connection("request URI has no host"))?;
                (host.to_string(), uri.port_u16().unwrap_or(80))
            }
        };

        let mut stream = self.connect(&host, port).await?;
        let wire = self.build_request(&request)?;
        stream
            .write_all(&wire)
            .await
            .map_err(|e| Error::connection(format!("write request: {}", e)))?;
        let body = request.body();
        if !body.is_empty() {
            stream
                .write_all(body)
                .await
                .map_err(|e| Error::connection(format!("write body: {}", e)))?;
        }
        stream
            .flush()
            .await
            .map_err(|e| Error::connection(format!("flush: {}", e)))?;

        let response = self.read_response(&mut stream, request.method()).await?;
        tracing::debug!(
            method = %request.method(),
            uri = %uri,
            status = response.status,
            "round trip"
        );
        Ok(response.with_url(uri.to_string()))
    }

    fn as_http(&mut self) -> Option<&mut HttpTransport> {
        Some(self)
    }
}

/// Decode a chunked body. Returns `None` when the buffer does not yet
/// hold the terminating chunk.
fn decode_chunked(data: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut out = Vec::new();
    let mut pos = 0;
    loop {
        let Some(line_end) = find_crlf(&data[pos..]) else {
            return Ok(None);
        };
        let size_str = std::str::from_utf8(&data[pos..pos + line_end])
            .map_err(|_| Error::protocol("non-ASCII chunk size"))?;
        let size_hex = size_str.trim().split(';').next().unwrap_or("");
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| Error::protocol(format!("bad chunk size: {:?}", size_str)))?;
        pos += line_end + 2;
        if size == 0 {
            // Optional trailers are ignored.
            return Ok(Some(out));
        }
        if data.len() < pos + size + 2 {
            return Ok(None);
        }
        out.extend_from_slice(&data[pos..pos + size]);
        pos += size + 2;
    }
}

fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == b"\r\n")
}
