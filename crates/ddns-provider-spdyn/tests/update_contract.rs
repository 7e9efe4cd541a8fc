//! Wire contract: Spdyn

use ddns_core::config::{ProviderConfig, RecordSettings};
use ddns_core::{DnsProvider, ErrorKind, UpdateContext, UpdateResult};
use ddns_provider_spdyn::SpdynProvider;
use httptest::matchers::*;
use httptest::responders::*;
use httptest::{Expectation, Server};
use std::net::IpAddr;
use url::Url;

fn provider_for(server: &Server, user: &str, password: &str, token: &str) -> SpdynProvider {
    let settings = RecordSettings::new(
        "example.com",
        "nas",
        ProviderConfig::Spdyn {
            user: user.to_string(),
            password: password.to_string(),
            token: token.to_string(),
        },
    );
    SpdynProvider::from_settings(&settings)
        .expect("settings are valid")
        .with_endpoint(Url::parse(&server.url_str("/nic/update")).unwrap())
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[tokio::test]
async fn token_mode_sends_hostname_as_user() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/nic/update"),
            request::query(url_decoded(contains(("hostname", "nas.example.com")))),
            request::query(url_decoded(contains(("user", "nas.example.com")))),
            request::query(url_decoded(contains(("pass", "t0k&en")))),
            request::query(url_decoded(contains(("myip", "198.51.100.7")))),
        ])
        .respond_with(status_code(200).body("good 198.51.100.7")),
    );

    let result = provider_for(&server, "", "", "t0k&en")
        .update(&UpdateContext::new(), &reqwest::Client::new(), ip("198.51.100.7"))
        .await
        .expect("update succeeds");

    assert_eq!(
        result,
        UpdateResult::Updated {
            new_ip: ip("198.51.100.7")
        }
    );
}

#[tokio::test]
async fn user_password_mode_sends_account_credentials() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/nic/update"),
            request::query(url_decoded(contains(("user", "alice")))),
            request::query(url_decoded(contains(("pass", "hunter2")))),
            request::query(url_decoded(contains(("myip", "2001:db8::7")))),
        ])
        .respond_with(status_code(200).body("nochg 2001:db8::7\n")),
    );

    let result = provider_for(&server, "alice", "hunter2", "")
        .update(&UpdateContext::new(), &reqwest::Client::new(), ip("2001:db8::7"))
        .await
        .expect("update succeeds");

    assert_eq!(
        result,
        UpdateResult::Unchanged {
            current_ip: ip("2001:db8::7")
        }
    );
}

#[tokio::test]
async fn repeated_update_with_current_ip_succeeds() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/nic/update"),
            request::query(url_decoded(contains(("myip", "192.0.2.44")))),
        ])
        .times(2)
        .respond_with(status_code(200).body("nochg")),
    );

    let provider = provider_for(&server, "", "", "t0ken");
    let client = reqwest::Client::new();
    for _ in 0..2 {
        let result = provider
            .update(&UpdateContext::new(), &client, ip("192.0.2.44"))
            .await
            .expect("update succeeds");
        assert_eq!(
            result,
            UpdateResult::Unchanged {
                current_ip: ip("192.0.2.44")
            }
        );
    }
}

#[tokio::test]
async fn registrar_failures_are_typed() {
    let cases = [
        ("abuse", ErrorKind::BannedAbuse),
        ("numhost", ErrorKind::BannedAbuse),
        ("badauth", ErrorKind::AuthFailure),
        ("!yours", ErrorKind::AuthFailure),
        ("notfqdn", ErrorKind::BadRequest),
        ("nohost", ErrorKind::HostnameNotExists),
        ("fatal", ErrorKind::HostnameNotExists),
        ("please try later", ErrorKind::UnknownResponse),
    ];

    for (body, expected) in cases {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/nic/update"))
                .respond_with(status_code(200).body(body)),
        );

        let err = provider_for(&server, "", "", "t0ken")
            .update(&UpdateContext::new(), &reqwest::Client::new(), ip("192.0.2.1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), expected, "body {:?}", body);
    }
}

#[tokio::test]
async fn non_200_is_http_status() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/nic/update"))
            .respond_with(status_code(502).body("bad gateway")),
    );

    let err = provider_for(&server, "", "", "t0ken")
        .update(&UpdateContext::new(), &reqwest::Client::new(), ip("192.0.2.1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::HttpStatus);
    assert_eq!(err.to_string(), "HTTP status is not valid: 502: bad gateway");
}
