// # ddnss.de DNS Provider
//
// ddnss.de answers with a small HTML page rather than a bare status token, so
// its markers are matched anywhere in the body.
//
// ## API Reference
//
// - Update: GET `https://www.ddnss.de/upd.php?user=&pwd=&host=&ip=`
// - Dual stack hosts take IPv6 addresses under `ip6` instead of `ip`

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

/// ddnss.de update endpoint
pub const DDNSS_ENDPOINT: &str = "https://www.ddnss.de/upd.php";

const MARKERS: &[Marker] = &[
    Marker::contains("badysys", Verdict::Failed(Failure::BadRequest))
        .with_detail("system parameter not valid"),
    Marker::contains("badauth", Verdict::Failed(Failure::Auth)),
    Marker::contains("notfqdn", Verdict::Failed(Failure::HostnameNotExists)),
    Marker::contains("updated 1 hostname", Verdict::Updated),
];

const TABLES: &[StatusTable] = &[StatusTable::new(200, MARKERS, Fallback::UnknownResponse)];

static GRAMMAR: ResponseGrammar = ResponseGrammar::new(TABLES);

/// ddnss.de DNS provider
pub struct DdnssProvider {
    domain: String,
    owner: String,
    ip_version: IpVersion,
    ipv6_suffix: Option<Ipv6Suffix>,
    username: String,
    /// ⚠️ NEVER log this value
    password: String,
    dual_stack: bool,
    endpoint: Url,
}

impl fmt::Debug for DdnssProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DdnssProvider")
            .field("domain", &self.domain)
            .field("owner", &self.owner)
            .field("ip_version", &self.ip_version)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("dual_stack", &self.dual_stack)
            .finish()
    }
}

/// Reject settings ddnss.de cannot work with
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

impl DdnssProvider {
    /// Build a provider from validated settings
    pub fn from_settings(settings: &RecordSettings) -> Result<Self> {
        let ProviderConfig::Ddnss {
            username,
            password,
            dual_stack,
        } = &settings.provider
        else {
            return Err(ConfigError::Invalid(format!(
                "{} settings given to the ddnss provider",
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
            dual_stack: *dual_stack,
            endpoint: Url::parse(DDNSS_ENDPOINT).map_err(|e| Error::invalid_input(e.to_string()))?,
        })
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    fn address_key(&self, ip: IpAddr) -> &'static str {
        if self.dual_stack && ip.is_ipv6() {
            "ip6"
        } else {
            "ip"
        }
    }
}

impl fmt::Display for DdnssProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hostname::provider_id(
            &self.domain,
            &self.owner,
            "ddnss",
            self.ip_version,
        ))
    }
}

impl DyndnsProtocol for DdnssProvider {
    fn protocol_name(&self) -> &'static str {
        "ddnss"
    }

    fn build_request(&self, ip: IpAddr) -> Result<UpdateRequest> {
        UpdateRequest::builder(&self.endpoint)
            .query("user", &self.username)
            .secret_query("pwd", &self.password)
            .query(
                "host",
                hostname::build_query_hostname(&self.owner, &self.domain),
            )
            .address(self.address_key(ip), ip)
            .build()
    }

    fn grammar(&self) -> &'static ResponseGrammar {
        &GRAMMAR
    }
}

#[async_trait]
impl DnsProvider for DdnssProvider {
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
            "DDNSS.de",
            "https://ddnss.de/",
            self.ip_version,
        )
    }

    fn provider_name(&self) -> &'static str {
        "ddnss"
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

/// Factory for creating ddnss.de providers
pub struct DdnssFactory;

impl DnsProviderFactory for DdnssFactory {
    fn create(&self, settings: &RecordSettings) -> Result<Box<dyn DnsProvider>> {
        let provider = DdnssProvider::from_settings(settings)?;
        tracing::debug!(
            provider = %provider,
            dual_stack = provider.dual_stack,
            "created ddnss provider"
        );
        Ok(Box::new(provider))
    }
}

/// Register the ddnss.de provider with a registry
pub fn register(registry: &ddns_core::ProviderRegistry) {
    registry.register_provider("ddnss", Box::new(DdnssFactory));
}
