// # Strato DNS Provider
//
// Strato's dyndns endpoint authenticates with HTTP basic auth where the
// username is the registered domain and the password is the dyndns password
// set for that domain.
//
// ## API Reference
//
// - Update: GET `https://dyndns.strato.com/nic/update?hostname=<fqdn>&myip=<ip>`
// - Replies: `good <ip>`, `nochg <ip>`, `notfqdn`, `abuse`, `badrequest`,
//   `badauth`, all plaintext with status 200

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

/// Strato update endpoint
pub const STRATO_ENDPOINT: &str = "https://dyndns.strato.com/nic/update";

const MARKERS: &[Marker] = &[
    Marker::prefix("notfqdn", Verdict::Failed(Failure::HostnameNotExists)),
    Marker::prefix("abuse", Verdict::Failed(Failure::BannedAbuse)),
    Marker::prefix("badrequest", Verdict::Failed(Failure::BadRequest)),
    Marker::prefix("badauth", Verdict::Failed(Failure::Auth)),
    Marker::prefix("good", Verdict::Updated),
    Marker::prefix("nochg", Verdict::Unchanged),
];

const TABLES: &[StatusTable] = &[StatusTable::new(200, MARKERS, Fallback::UnknownResponse)];

static GRAMMAR: ResponseGrammar = ResponseGrammar::new(TABLES);

/// Strato DNS provider
pub struct StratoProvider {
    domain: String,
    owner: String,
    ip_version: IpVersion,
    ipv6_suffix: Option<Ipv6Suffix>,
    /// ⚠️ NEVER log this value
    password: String,
    endpoint: Url,
}

impl fmt::Debug for StratoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StratoProvider")
            .field("domain", &self.domain)
            .field("owner", &self.owner)
            .field("ip_version", &self.ip_version)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// Reject settings Strato cannot work with
pub fn validate_settings(domain: &str, owner: &str, password: &str) -> std::result::Result<(), ConfigError> {
    check_domain_and_owner(domain, owner)?;
    if password.is_empty() {
        return Err(ConfigError::PasswordNotSet);
    }
    Ok(())
}

impl StratoProvider {
    /// Build a provider from validated settings
    pub fn from_settings(settings: &RecordSettings) -> Result<Self> {
        let ProviderConfig::Strato { password } = &settings.provider else {
            return Err(ConfigError::Invalid(format!(
                "{} settings given to the strato provider",
                settings.provider.type_name()
            ))
            .into());
        };

        validate_settings(&settings.domain, &settings.owner, password)?;

        Ok(Self {
            domain: settings.domain.clone(),
            owner: settings.owner.clone(),
            ip_version: settings.ip_version,
            ipv6_suffix: settings.ipv6_suffix,
            password: password.clone(),
            endpoint: Url::parse(STRATO_ENDPOINT).map_err(|e| Error::invalid_input(e.to_string()))?,
        })
    }

    /// Send updates somewhere other than Strato, e.g. a test server
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }
}

impl fmt::Display for StratoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hostname::provider_id(
            &self.domain,
            &self.owner,
            "strato",
            self.ip_version,
        ))
    }
}

impl DyndnsProtocol for StratoProvider {
    fn protocol_name(&self) -> &'static str {
        "strato"
    }

    fn build_request(&self, ip: IpAddr) -> Result<UpdateRequest> {
        UpdateRequest::builder(&self.endpoint)
            .userinfo(&self.domain, &self.password)
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
impl DnsProvider for StratoProvider {
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
            "Strato DNS",
            "https://strato.com/",
            self.ip_version,
        )
    }

    fn provider_name(&self) -> &'static str {
        "strato"
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

/// Factory for creating Strato providers
pub struct StratoFactory;

impl DnsProviderFactory for StratoFactory {
    fn create(&self, settings: &RecordSettings) -> Result<Box<dyn DnsProvider>> {
        let provider = StratoProvider::from_settings(settings)?;
        tracing::debug!(provider = %provider, "created strato provider");
        Ok(Box::new(provider))
    }
}

/// Register the Strato provider with a registry
pub fn register(registry: &ddns_core::ProviderRegistry) {
    registry.register_provider("strato", Box::new(StratoFactory));
}
