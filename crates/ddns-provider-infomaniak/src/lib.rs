// # Infomaniak DNS Provider
//
// Infomaniak authenticates with basic auth built from the dyndns username and
// password created in the Infomaniak manager. Successful replies echo the
// applied address, which must equal the one sent.
//
// ## API Reference
//
// - Update: GET `https://infomaniak.com/nic/update?hostname=<fqdn>&myip=<ip>`
// - 200 replies: `successfully_changed <ip>`, `no_change <ip>`, and the older
//   `good <ip>` / `nochg <ip>`
// - 400 replies: `nohost`, `badauth`

use async_trait::async_trait;
use ddns_core::config::{IpVersion, Ipv6Suffix, ProviderConfig, RecordSettings};
use ddns_core::hostname::{self, check_domain_and_owner};
use ddns_core::protocol::{
    self, DyndnsProtocol, Failure, Fallback, Marker, ResponseGrammar, StatusTable, UpdateContext,
    UpdateRequest, Verdict,
};
use ddns_core::traits::{DnsProvider, DnsProviderFactory, HtmlRow, UpdateResult};
use ddns_core::{ConfigError, Error, Result};
use std::fmt;
use std::net::IpAddr;
use url::Url;

/// Infomaniak update endpoint
pub const INFOMANIAK_ENDPOINT: &str = "https://infomaniak.com/nic/update";

const OK_MARKERS: &[Marker] = &[
    Marker::prefix("successfully_changed", Verdict::Updated).echoing_ip(),
    Marker::prefix("no_change", Verdict::Unchanged).echoing_ip(),
    Marker::prefix("good", Verdict::Updated).echoing_ip(),
    Marker::prefix("nochg", Verdict::Unchanged).echoing_ip(),
];

const BAD_REQUEST_MARKERS: &[Marker] = &[
    Marker::exact("nohost", Verdict::Failed(Failure::HostnameNotExists)),
    Marker::exact("badauth", Verdict::Failed(Failure::Auth)),
];

const TABLES: &[StatusTable] = &[
    StatusTable::new(200, OK_MARKERS, Fallback::UnknownResponse),
    StatusTable::new(400, BAD_REQUEST_MARKERS, Fallback::HttpStatus),
];

static GRAMMAR: ResponseGrammar = ResponseGrammar::new(TABLES);

/// Infomaniak DNS provider
pub struct InfomaniakProvider {
    domain: String,
    owner: String,
    ip_version: IpVersion,
    ipv6_suffix: Option<Ipv6Suffix>,
    username: String,
    /// ⚠️ NEVER log this value
    password: String,
    endpoint: Url,
}

impl fmt::Debug for InfomaniakProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfomaniakProvider")
            .field("domain", &self.domain)
            .field("owner", &self.owner)
            .field("ip_version", &self.ip_version)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

pub fn validate_settings(
    domain: &str,
    owner: &str,
    username: &str,
    password: &str,
) -> std::result::Result<(), ConfigError> {
    check_domain_and_owner(domain, owner)?;
    if username.is_empty() {
        return Err(ConfigError::UsernameNotSet);
    }
    if password.is_empty() {
        return Err(ConfigError::PasswordNotSet);
    }
    Ok(())
}

impl InfomaniakProvider {
    /// Build a provider from validated settings
    pub fn from_settings(settings: &RecordSettings) -> Result<Self> {
        let ProviderConfig::Infomaniak { username, password } = &settings.provider else {
            return Err(ConfigError::Invalid(format!(
                "{} settings given to the infomaniak provider",
                settings.provider.type_name()
            ))
            .into());
        };

        validate_settings(&settings.domain, &settings.owner, username, password)?;

        Ok(Self {
            domain: settings.domain.clone(),
            owner: settings.owner.clone(),
            ip_version: settings.ip_version,
            ipv6_suffix: settings.ipv6_suffix,
            username: username.clone(),
            password: password.clone(),
            endpoint: Url::parse(INFOMANIAK_ENDPOINT)
                .map_err(|e| Error::invalid_input(e.to_string()))?,
        })
    }

    /// Send updates somewhere other than Infomaniak
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }
}

impl fmt::Display for InfomaniakProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hostname::provider_id(
            &self.domain,
            &self.owner,
            "infomaniak",
            self.ip_version,
        ))
    }
}

impl DyndnsProtocol for InfomaniakProvider {
    fn protocol_name(&self) -> &'static str {
        "infomaniak"
    }

    fn build_request(&self, ip: IpAddr) -> Result<UpdateRequest> {
        UpdateRequest::builder(&self.endpoint)
            .userinfo(&self.username, &self.password)
            .query(
                "hostname",
                hostname::build_query_hostname(&self.owner, &self.domain),
            )
            .address("myip", ip)
            .build()
    }

    fn grammar(&self) -> &'static ResponseGrammar {
        &GRAMMAR
    }
}

#[async_trait]
impl DnsProvider for InfomaniakProvider {
    fn domain(&self) -> &str {
        &self.domain
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn ip_version(&self) -> IpVersion {
        self.ip_version
    }

    fn ipv6_suffix(&self) -> Option<Ipv6Suffix> {
        self.ipv6_suffix
    }

    fn html(&self) -> HtmlRow {
        HtmlRow::new(
            &self.build_domain_name(),
            &self.owner,
            "Infomaniak",
            "https://www.infomaniak.com/",
            self.ip_version,
        )
    }

    fn provider_name(&self) -> &'static str {
        "infomaniak"
    }

    async fn update(
        &self,
        ctx: &UpdateContext,
        client: &reqwest::Client,
        ip: IpAddr,
    ) -> Result<UpdateResult> {
        protocol::update(self, ctx, client, ip).await
    }
}

/// Factory for creating Infomaniak providers
pub struct InfomaniakFactory;

impl DnsProviderFactory for InfomaniakFactory {
    fn create(&self, settings: &RecordSettings) -> Result<Box<dyn DnsProvider>> {
        let provider = InfomaniakProvider::from_settings(settings)?;
        tracing::debug!(provider = %provider, "created infomaniak provider");
        Ok(Box::new(provider))
    }
}

/// Register the Infomaniak provider with a registry
pub fn register(registry: &ddns_core::ProviderRegistry) {
    registry.register_provider("infomaniak", Box::new(InfomaniakFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::ErrorKind;

    fn settings(owner: &str, username: &str, password: &str) -> RecordSettings {
        RecordSettings::new(
            "example.com",
            owner,
            ProviderConfig::Infomaniak {
                username: username.into(),
                password: password.into(),
            },
        )
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_validate_settings_order() {
        assert!(matches!(
            validate_settings("localhost", "*", "", ""),
            Err(ConfigError::DomainNotValid(_))
        ));
        assert_eq!(
            validate_settings("example.com", "*", "", ""),
            Err(ConfigError::OwnerWildcard)
        );
        assert_eq!(
            validate_settings("example.com", "@", "", ""),
            Err(ConfigError::UsernameNotSet)
        );
        assert_eq!(
            validate_settings("example.com", "@", "u", ""),
            Err(ConfigError::PasswordNotSet)
        );
    }

    #[test]
    fn test_build_request() {
        let provider =
            InfomaniakProvider::from_settings(&settings("@", "alice", "hunter2")).unwrap();
        let request = provider.build_request(ip("203.0.113.5")).unwrap();

        assert_eq!(request.url().host_str(), Some("infomaniak.com"));
        assert_eq!(request.url().username(), "alice");
        assert_eq!(request.url().password(), Some("hunter2"));
        assert_eq!(request.query_value("hostname").as_deref(), Some("example.com"));
        assert_eq!(request.query_value("myip").as_deref(), Some("203.0.113.5"));
    }

    #[test]
    fn test_ok_replies_must_echo_sent_address() {
        let requested = ip("203.0.113.5");
        let cases: &[(&str, std::result::Result<UpdateResult, ErrorKind>)] = &[
            (
                "successfully_changed 203.0.113.5",
                Ok(UpdateResult::Updated { new_ip: requested }),
            ),
            ("no_change 203.0.113.5", Ok(UpdateResult::Unchanged { current_ip: requested })),
            ("good 203.0.113.5", Ok(UpdateResult::Updated { new_ip: requested })),
            ("nochg 203.0.113.5", Ok(UpdateResult::Unchanged { current_ip: requested })),
            ("good 203.0.113.6", Err(ErrorKind::IpMismatch)),
            ("good", Err(ErrorKind::MalformedIpResponse)),
            ("good 203.0.113", Err(ErrorKind::MalformedIpResponse)),
            ("good203.0.113.5", Err(ErrorKind::MalformedIpResponse)),
            ("successfully_changed203.0.113.5", Err(ErrorKind::MalformedIpResponse)),
            ("nochg  203.0.113.5", Err(ErrorKind::MalformedIpResponse)),
            ("badauth", Err(ErrorKind::UnknownResponse)),
        ];

        for (body, expected) in cases {
            let got = GRAMMAR.classify(200, body, requested).map_err(|e| e.kind());
            assert_eq!(&got, expected, "body {:?}", body);
        }
    }

    #[test]
    fn test_bad_request_replies() {
        let requested = ip("203.0.113.5");
        assert_eq!(
            GRAMMAR.classify(400, "nohost", requested).unwrap_err().kind(),
            ErrorKind::HostnameNotExists
        );
        assert_eq!(
            GRAMMAR.classify(400, "badauth", requested).unwrap_err().kind(),
            ErrorKind::AuthFailure
        );
        let err = GRAMMAR.classify(400, "invalid", requested).unwrap_err();
        assert_eq!(err.to_string(), "HTTP status is not valid: 400: invalid");
        assert_eq!(
            GRAMMAR.classify(500, "good 203.0.113.5", requested).unwrap_err().kind(),
            ErrorKind::HttpStatus
        );
    }

    #[test]
    fn test_identity_and_redaction() {
        let provider = InfomaniakProvider::from_settings(
            &settings("vpn", "alice", "hunter2").with_ip_version(IpVersion::V4),
        )
        .unwrap();

        assert_eq!(
            provider.to_string(),
            "[domain: example.com | owner: vpn | provider: infomaniak | ip: ipv4]"
        );
        let html = provider.html();
        assert_eq!(
            html.domain,
            "<a href=\"http://vpn.example.com\">vpn.example.com</a>"
        );
        assert_eq!(html.ip_version, "ipv4");

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("hunter2"));
        assert!(debug_str.contains("alice"));
    }
}
