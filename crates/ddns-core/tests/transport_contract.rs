//! Contract Test: Shared Update Transport
//!
//! Constraints verified:
//! - Every request carries the client User-Agent
//! - Connection failures surface as retryable network errors
//! - Error text built from response bodies stays on one line
//! - Replies are classified after the whole body is read

mod common;

use common::*;
use ddns_core::protocol::{self, transport};
use ddns_core::{ErrorKind, UpdateContext, UpdateResult};
use httptest::matchers::*;
use httptest::responders::*;
use httptest::{Expectation, Server};
use url::Url;

#[tokio::test]
async fn request_carries_user_agent_and_query() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", UPDATE_PATH),
            request::headers(contains(("user-agent", matches("^ddns/")))),
            request::query(url_decoded(contains(("hostname", "home.example.com")))),
            request::query(url_decoded(contains(("myip", "203.0.113.5")))),
        ])
        .respond_with(status_code(200).body("good 203.0.113.5")),
    );

    // A plain client: the transport sets the header itself
    let client = reqwest::Client::new();
    let result = protocol::update(
        &FakeRegistrar::for_server(&server),
        &UpdateContext::new(),
        &client,
        ip("203.0.113.5"),
    )
    .await
    .expect("update succeeds");

    assert_eq!(
        result,
        UpdateResult::Updated {
            new_ip: ip("203.0.113.5")
        }
    );
}

#[tokio::test]
async fn shared_client_serves_consecutive_updates() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", UPDATE_PATH))
            .times(3)
            .respond_with(status_code(200).body("nochg")),
    );

    let client = transport::build_client(transport::DEFAULT_HTTP_TIMEOUT).unwrap();
    let registrar = FakeRegistrar::for_server(&server);
    for _ in 0..3 {
        let result = protocol::update(&registrar, &UpdateContext::new(), &client, ip("192.0.2.1"))
            .await
            .unwrap();
        assert_eq!(result.ip(), ip("192.0.2.1"));
    }
}

#[tokio::test]
async fn connection_refused_is_retryable_network_error() {
    let registrar = FakeRegistrar::new(Url::parse("http://127.0.0.1:1/nic/update").unwrap());

    let err = protocol::update(
        &registrar,
        &UpdateContext::new(),
        &reqwest::Client::new(),
        ip("192.0.2.1"),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.is_retryable());
    // Credentials embedded in the URL never leak into error text
    assert!(!err.to_string().contains("secret"));
}

#[tokio::test]
async fn unknown_reply_is_reported_on_one_line() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", UPDATE_PATH))
            .respond_with(status_code(200).body("Service\r\nTemporarily\n\tDown\n")),
    );

    let err = protocol::update(
        &FakeRegistrar::for_server(&server),
        &UpdateContext::new(),
        &reqwest::Client::new(),
        ip("192.0.2.1"),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownResponse);
    assert_eq!(err.to_string(), "unknown response: service temporarily down");
}

#[tokio::test]
async fn registrar_refusal_is_not_retryable() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", UPDATE_PATH))
            .respond_with(status_code(200).body("badauth\n")),
    );

    let err = protocol::update(
        &FakeRegistrar::for_server(&server),
        &UpdateContext::new(),
        &reqwest::Client::new(),
        ip("192.0.2.1"),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AuthFailure);
    assert!(!err.is_retryable());
}
