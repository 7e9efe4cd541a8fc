//! Response classification
//!
//! Registrars answer in plain text. Each one declares a [`ResponseGrammar`]:
//! per accepted status code, an ordered list of [`Marker`]s. The first marker
//! matching the cleaned body decides the outcome. Order matters because two
//! tokens can both occur in one reply.

use crate::error::{Error, Result};
use crate::traits::UpdateResult;
use std::net::IpAddr;

/// How a marker token is compared with the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Body equals the token
    Exact,
    /// Body starts with the token
    Prefix,
    /// Body contains the token anywhere
    Contains,
}

/// Failure a marker maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Auth,
    HostnameNotExists,
    BannedAbuse,
    BadRequest,
}

/// What a matched marker means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Registrar applied the address
    Updated,
    /// Registrar already had the address
    Unchanged,
    /// Registrar refused the update
    Failed(Failure),
}

/// One known token in a registrar's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    rule: MatchRule,
    token: &'static str,
    verdict: Verdict,
    echoes_ip: bool,
    detail: &'static str,
}

impl Marker {
    pub const fn exact(token: &'static str, verdict: Verdict) -> Self {
        Self::new(MatchRule::Exact, token, verdict)
    }

    pub const fn prefix(token: &'static str, verdict: Verdict) -> Self {
        Self::new(MatchRule::Prefix, token, verdict)
    }

    pub const fn contains(token: &'static str, verdict: Verdict) -> Self {
        Self::new(MatchRule::Contains, token, verdict)
    }

    const fn new(rule: MatchRule, token: &'static str, verdict: Verdict) -> Self {
        Self {
            rule,
            token,
            verdict,
            echoes_ip: false,
            detail: "",
        }
    }

    /// The token is followed by the address the registrar applied
    pub const fn echoing_ip(mut self) -> Self {
        self.echoes_ip = true;
        self
    }

    /// Extra text attached to the resulting error
    pub const fn with_detail(mut self, detail: &'static str) -> Self {
        self.detail = detail;
        self
    }

    fn matches(&self, body: &str) -> bool {
        match self.rule {
            MatchRule::Exact => body == self.token,
            MatchRule::Prefix => body.starts_with(self.token),
            MatchRule::Contains => body.contains(self.token),
        }
    }

    // Text after the token and exactly one separating space
    fn echoed<'a>(&self, body: &'a str) -> Option<&'a str> {
        let at = body.find(self.token)?;
        body[at + self.token.len()..].strip_prefix(' ')
    }
}

/// What to report when a status code is accepted but no marker matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    UnknownResponse,
    HttpStatus,
}

/// Markers for one accepted status code
#[derive(Debug, Clone, Copy)]
pub struct StatusTable {
    status: u16,
    markers: &'static [Marker],
    fallback: Fallback,
}

impl StatusTable {
    pub const fn new(status: u16, markers: &'static [Marker], fallback: Fallback) -> Self {
        Self {
            status,
            markers,
            fallback,
        }
    }
}

/// A registrar's complete response vocabulary
#[derive(Debug, Clone, Copy)]
pub struct ResponseGrammar {
    tables: &'static [StatusTable],
}

impl ResponseGrammar {
    pub const fn new(tables: &'static [StatusTable]) -> Self {
        Self { tables }
    }

    /// Map a registrar reply to an outcome
    ///
    /// `requested` is the address sent; an echoed address must equal it.
    pub fn classify(&self, status: u16, raw_body: &str, requested: IpAddr) -> Result<UpdateResult> {
        let body = clean_body(raw_body);

        let Some(table) = self.tables.iter().find(|t| t.status == status) else {
            return Err(Error::http_status(status, to_single_line(&body)));
        };

        let Some(marker) = table.markers.iter().find(|m| m.matches(&body)) else {
            return Err(match table.fallback {
                Fallback::UnknownResponse => Error::unknown_response(to_single_line(&body)),
                Fallback::HttpStatus => Error::http_status(status, to_single_line(&body)),
            });
        };

        let detail = marker.detail.to_string();
        match marker.verdict {
            Verdict::Failed(Failure::Auth) => Err(Error::Authentication(detail)),
            Verdict::Failed(Failure::HostnameNotExists) => Err(Error::HostnameNotExists(detail)),
            Verdict::Failed(Failure::BannedAbuse) => Err(Error::BannedAbuse(detail)),
            Verdict::Failed(Failure::BadRequest) => Err(Error::BadRequest(detail)),
            Verdict::Updated | Verdict::Unchanged => {
                let ip = if marker.echoes_ip {
                    let echoed = marker.echoed(&body).ok_or_else(|| Error::MalformedIp {
                        response: to_single_line(&body),
                        reason: format!("no address after {:?}", marker.token),
                    })?;
                    confirm_echoed_ip(echoed, requested)?
                } else {
                    requested
                };
                Ok(match marker.verdict {
                    Verdict::Unchanged => UpdateResult::Unchanged { current_ip: ip },
                    _ => UpdateResult::Updated { new_ip: ip },
                })
            }
        }
    }
}

fn confirm_echoed_ip(echoed: &str, requested: IpAddr) -> Result<IpAddr> {
    let received: IpAddr = echoed.parse().map_err(|e: std::net::AddrParseError| Error::MalformedIp {
        response: to_single_line(echoed),
        reason: e.to_string(),
    })?;

    if received != requested {
        return Err(Error::IpMismatch {
            sent: requested,
            received,
        });
    }
    Ok(received)
}

/// Normalize a body before matching: surrounding whitespace removed, lowercased
pub fn clean_body(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Collapse control characters (newlines included) into single spaces
pub fn to_single_line(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut gap = false;
    for c in s.chars() {
        if c.is_control() {
            gap = !out.is_empty();
            continue;
        }
        if gap {
            if c != ' ' && !out.ends_with(' ') {
                out.push(' ');
            }
            gap = false;
        }
        out.push(c);
    }
    out
}
