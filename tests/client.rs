//! Client composition, pipeline ordering, and cookie handling.

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use url::Url;
use veil::options::{
    with_cookies, with_disable_keep_alives, with_request_transform, with_response_transform,
    with_user_agent, with_user_agent_str,
};
use veil::{Client, Cookie, Error, Response, UserAgent, UserAgents};

use helpers::mock_server::{CannedResponse, MockHttpServer};

fn example_url() -> Url {
    Url::parse("http://example.com/").unwrap()
}

/// Header value out of an echoed request head, lowercase comparison.
fn echoed_header(body: &str, name: &str) -> Option<String> {
    body.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

#[test]
fn cookie_helpers_distinguish_set_from_unset() {
    let url = example_url();
    let client = Client::new([with_cookies(
        url.clone(),
        vec![Cookie::new("example_name", "example_value")],
    )]);

    assert!(client.has_cookie(&url, "example_name"));
    assert_eq!(
        client.cookie_value(&url, "example_name").as_deref(),
        Some("example_value")
    );

    assert!(!client.has_cookie(&url, "other_name"));
    assert_eq!(client.cookie_value(&url, "other_name"), None);
    assert!(matches!(
        client.cookie(&url, "other_name"),
        Err(Error::CookieNotFound(_))
    ));
}

#[test]
fn fresh_client_has_no_cookies() {
    let client = Client::default();
    assert!(!client.has_cookie(&example_url(), "anything"));
}

#[tokio::test]
async fn request_transforms_apply_in_registration_order() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    server.start_echo();

    let client = Client::new([
        with_request_transform(|mut request| {
            request
                .headers_mut()
                .insert("x-order", "a".parse().unwrap());
            Ok(request)
        }),
        with_request_transform(|mut request| {
            // The second stage observes the first stage's mutation.
            let prior = request
                .headers()
                .get("x-order")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("missing")
                .to_string();
            request
                .headers_mut()
                .insert("x-order", format!("{}-b", prior).parse().unwrap());
            Ok(request)
        }),
    ]);

    let response = client.get(&url).await.unwrap();
    let body = response.text().unwrap();
    assert_eq!(echoed_header(&body, "x-order").as_deref(), Some("a-b"));
}

#[tokio::test]
async fn request_transform_error_skips_later_stages_and_transport() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    let hits = server.start_echo();

    let later_stage_runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&later_stage_runs);

    let client = Client::new([
        with_request_transform(|_request| Err(Error::protocol("abort"))),
        with_request_transform(move |request| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(request)
        }),
    ]);

    let err = client.get(&url).await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
    assert_eq!(later_stage_runs.load(Ordering::SeqCst), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0, "transport must not run");
}

#[tokio::test]
async fn response_transform_may_replace_the_response() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    server.start(CannedResponse::ok("original"));

    let client = Client::new([with_response_transform(|_response| {
        Ok(Response::new(204, Vec::new(), Bytes::new()))
    })]);

    let response = client.get(&url).await.unwrap();
    assert_eq!(response.status, 204);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn response_transform_error_propagates_verbatim() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    server.start(CannedResponse::ok("original"));

    let client = Client::new([with_response_transform(|_response| {
        Err(Error::protocol("rejected"))
    })]);

    assert!(matches!(
        client.get(&url).await,
        Err(Error::Protocol(message)) if message == "rejected"
    ));
}

#[tokio::test]
async fn get_returns_status_and_body() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    server.start(CannedResponse::ok("hello"));

    let client = Client::default();
    let response = client.get(&url).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(response.is_success());
    assert_eq!(response.text().unwrap(), "hello");
}

#[tokio::test]
async fn head_returns_no_body() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    server.start(CannedResponse::ok("ignored"));

    let client = Client::default();
    let response = client.head(&url).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn post_form_encodes_pairs() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    server.start_echo();

    let client = Client::default();
    let response = client
        .post_form(&url, &[("a", "1"), ("b", "two words")])
        .await
        .unwrap();
    let body = response.text().unwrap();
    assert_eq!(
        echoed_header(&body, "content-type").as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert!(body.ends_with("a=1&b=two+words"));
}

#[tokio::test]
async fn set_cookie_responses_land_in_the_jar() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    server.start(CannedResponse::ok("ok").with_header("Set-Cookie", "session=abc123; Path=/"));

    let client = Client::default();
    client.get(&url).await.unwrap();

    let parsed = Url::parse(&url).unwrap();
    assert_eq!(
        client.cookie_value(&parsed, "session").as_deref(),
        Some("abc123")
    );
}

#[tokio::test]
async fn stored_cookies_ride_along_on_later_requests() {
    let setter = MockHttpServer::bind().await.unwrap();
    let setter_url = setter.url();
    setter.start(CannedResponse::ok("ok").with_header("Set-Cookie", "session=abc123; Path=/"));

    // Same host, different port; cookie domains ignore ports.
    let echo = MockHttpServer::bind().await.unwrap();
    let echo_url = echo.url();
    echo.start_echo();

    let client = Client::default();
    client.get(&setter_url).await.unwrap();

    let response = client.get(&echo_url).await.unwrap();
    let body = response.text().unwrap();
    assert_eq!(
        echoed_header(&body, "cookie").as_deref(),
        Some("session=abc123")
    );
}

#[tokio::test]
async fn static_user_agent_is_sent() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    server.start_echo();

    let client = Client::new([with_user_agent_str("veil-test/1.0")]);
    let response = client.get(&url).await.unwrap();
    let body = response.text().unwrap();
    assert_eq!(
        echoed_header(&body, "user-agent").as_deref(),
        Some("veil-test/1.0")
    );
}

#[tokio::test]
async fn rotating_user_agent_varies_across_requests() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    server.start_echo();

    let agents = Arc::new(UserAgents::new().unwrap());
    let client = Client::new([with_user_agent(&agents, UserAgent::Any)]);

    let first = client.get(&url).await.unwrap();
    let second = client.get(&url).await.unwrap();
    let ua_first = echoed_header(&first.text().unwrap(), "user-agent").unwrap();
    let ua_second = echoed_header(&second.text().unwrap(), "user-agent").unwrap();
    assert!(!ua_first.is_empty());
    assert_ne!(ua_first, ua_second);
}

#[tokio::test]
async fn disable_keep_alives_advertises_close() {
    let server = MockHttpServer::bind().await.unwrap();
    let url = server.url();
    server.start_echo();

    let client = Client::new([with_disable_keep_alives(true)]);
    let response = client.get(&url).await.unwrap();
    let body = response.text().unwrap();
    assert_eq!(echoed_header(&body, "connection").as_deref(), Some("close"));
}

#[tokio::test]
async fn https_is_rejected_by_the_canonical_transport() {
    let client = Client::default();
    assert!(matches!(
        client.get("https://example.com/").await,
        Err(Error::Tls(_))
    ));
}
