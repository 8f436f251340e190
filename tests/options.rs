//! Prebuilt option behavior, including the canonical-transport
//! capability check.

use async_trait::async_trait;
use bytes::Bytes;
use http::Request;
use url::Url;
use veil::options::{
    with_disable_keep_alives, with_proxy_url, with_tls_config, with_tls_shuffle, with_transport,
};
use veil::tlshuffle::default_suites;
use veil::{Client, Error, Response, Result, TlsConfig, Transport};

struct StubTransport;

#[async_trait]
impl Transport for StubTransport {
    async fn round_trip(&self, _request: Request<Bytes>) -> Result<Response> {
        Err(Error::connection("stub"))
    }
}

#[test]
fn default_transport_is_canonical_with_no_tls_config() {
    let mut client = Client::default();
    let transport = client.transport_mut().as_http().expect("canonical");
    assert!(transport.tls.is_none());
    assert!(transport.proxy.is_none());
    assert!(!transport.disable_keep_alives);
}

#[test]
fn tls_shuffle_builds_a_constrained_config() {
    let mut client = Client::new([with_tls_shuffle()]);
    let tls = client
        .transport_mut()
        .as_http()
        .unwrap()
        .tls
        .clone()
        .expect("tls config");

    let canonical = default_suites();
    assert_eq!(tls.cipher_suites.len(), canonical.len());
    assert_eq!(tls.cipher_suites[0], canonical[0]);
}

#[test]
fn last_registered_tls_config_wins() {
    let pinned = TlsConfig {
        cipher_suites: vec![0x1301, 0x1302, 0x1303],
    };
    let mut client = Client::new([with_tls_config(pinned.clone()), with_tls_shuffle()]);
    let tls = client
        .transport_mut()
        .as_http()
        .unwrap()
        .tls
        .clone()
        .unwrap();
    assert_ne!(tls, pinned);
    assert_eq!(tls.cipher_suites.len(), default_suites().len());
}

#[test]
fn proxy_and_keep_alive_options_mutate_the_canonical_transport() {
    let proxy = Url::parse("http://proxy.internal:3128").unwrap();
    let mut client = Client::new([
        with_proxy_url(proxy.clone()),
        with_disable_keep_alives(true),
    ]);
    let transport = client.transport_mut().as_http().unwrap();
    assert_eq!(transport.proxy.as_ref(), Some(&proxy));
    assert!(transport.disable_keep_alives);
}

#[test]
fn transport_options_noop_on_foreign_transports() {
    // Documented limitation: options expecting the canonical transport
    // skip silently when it has been replaced.
    let proxy = Url::parse("http://proxy.internal:3128").unwrap();
    let mut client = Client::new([
        with_transport(StubTransport),
        with_proxy_url(proxy),
        with_disable_keep_alives(true),
        with_tls_shuffle(),
    ]);
    assert!(client.transport_mut().as_http().is_none());
}

#[test]
fn replacing_the_transport_discards_earlier_mutations() {
    let mut client = Client::new([with_disable_keep_alives(true), with_transport(StubTransport)]);
    assert!(client.transport_mut().as_http().is_none());
}
