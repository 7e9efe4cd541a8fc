//! Test doubles shared by the transport contract tests
//!
//! `FakeRegistrar` speaks a minimal dyndns dialect against a local httptest
//! server, so the shared update path can be exercised without any registrar
//! crate.

#![allow(dead_code)]

use ddns_core::error::Result;
use ddns_core::protocol::{
    DyndnsProtocol, Failure, Fallback, Marker, ResponseGrammar, StatusTable, UpdateRequest,
    Verdict,
};
use httptest::Server;
use std::net::IpAddr;
use url::Url;

pub const UPDATE_PATH: &str = "/nic/update";

const MARKERS: &[Marker] = &[
    Marker::prefix("good", Verdict::Updated).echoing_ip(),
    Marker::prefix("nochg", Verdict::Unchanged),
    Marker::exact("badauth", Verdict::Failed(Failure::Auth)),
];

const TABLES: &[StatusTable] = &[StatusTable::new(200, MARKERS, Fallback::UnknownResponse)];

static GRAMMAR: ResponseGrammar = ResponseGrammar::new(TABLES);

/// Registrar double with a configurable endpoint
pub struct FakeRegistrar {
    endpoint: Url,
}

impl FakeRegistrar {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    /// Registrar pointed at `server`
    pub fn for_server(server: &Server) -> Self {
        Self::new(Url::parse(&server.url_str(UPDATE_PATH)).expect("server url parses"))
    }
}

impl DyndnsProtocol for FakeRegistrar {
    fn protocol_name(&self) -> &'static str {
        "fake"
    }

    fn build_request(&self, ip: IpAddr) -> Result<UpdateRequest> {
        UpdateRequest::builder(&self.endpoint)
            .userinfo("user", "secret")
            .query("hostname", "home.example.com")
            .address("myip", ip)
            .build()
    }

    fn grammar(&self) -> &'static ResponseGrammar {
        &GRAMMAR
    }
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid ip literal")
}
