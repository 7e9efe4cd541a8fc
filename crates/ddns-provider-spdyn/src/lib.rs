// # Spdyn DNS Provider
//
// Spdyn accepts either an account user/password pair or a per-host update
// token. In token mode the hostname itself is sent as the user and the token
// as the password.
//
// ## API Reference
//
// - Variables: https://wiki.securepoint.de/SPDyn/Variablen
// - Update: GET `https://update.spdyn.de/nic/update?hostname=&myip=&user=&pass=`

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

/// Spdyn update endpoint
pub const SPDYN_ENDPOINT: &str = "https://update.spdyn.de/nic/update";

const MARKERS: &[Marker] = &[
    Marker::exact("abuse", Verdict::Failed(Failure::BannedAbuse)),
    Marker::exact("numhost", Verdict::Failed(Failure::BannedAbuse)),
    Marker::exact("badauth", Verdict::Failed(Failure::Auth)),
    Marker::exact("!yours", Verdict::Failed(Failure::Auth)),
    Marker::prefix("good", Verdict::Updated),
    Marker::exact("notfqdn", Verdict::Failed(Failure::BadRequest)).with_detail("not fqdn"),
    Marker::prefix("nochg", Verdict::Unchanged),
    Marker::exact("nohost", Verdict::Failed(Failure::HostnameNotExists)),
    Marker::exact("fatal", Verdict::Failed(Failure::HostnameNotExists)),
];

const TABLES: &[StatusTable] = &[StatusTable::new(200, MARKERS, Fallback::UnknownResponse)];

static GRAMMAR: ResponseGrammar = ResponseGrammar::new(TABLES);

/// How the provider authenticates, settled once at construction
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Per-host update token
    Token(String),
    /// Account user and password
    UserPassword { user: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(<REDACTED>)"),
            Credentials::UserPassword { user, .. } => f
                .debug_struct("UserPassword")
                .field("user", user)
                .field("password", &"<REDACTED>")
                .finish(),
        }
    }
}

/// Reject settings Spdyn cannot work with
///
/// User and password are only required when no token is given.
pub fn validate_settings(
    domain: &str,
    owner: &str,
    token: &str,
    user: &str,
    password: &str,
) -> std::result::Result<Credentials, ConfigError> {
    check_domain_and_owner(domain, owner)?;

    if !token.is_empty() {
        return Ok(Credentials::Token(token.to_string()));
    }

    if user.is_empty() {
        return Err(ConfigError::UsernameNotSet);
    }
    if password.is_empty() {
        return Err(ConfigError::PasswordNotSet);
    }

    Ok(Credentials::UserPassword {
        user: user.to_string(),
        password: password.to_string(),
    })
}

/// Spdyn DNS provider
#[derive(Debug)]
pub struct SpdynProvider {
    domain: String,
    owner: String,
    ip_version: IpVersion,
    ipv6_suffix: Option<Ipv6Suffix>,
    credentials: Credentials,
    endpoint: Url,
}

impl SpdynProvider {
    /// Build a provider from validated settings
    pub fn from_settings(settings: &RecordSettings) -> Result<Self> {
        let ProviderConfig::Spdyn {
            user,
            password,
            token,
        } = &settings.provider
        else {
            return Err(ConfigError::Invalid(format!(
                "{} settings given to the spdyn provider",
                settings.provider.type_name()
            ))
            .into());
        };

        let credentials =
            validate_settings(&settings.domain, &settings.owner, token, user, password)?;

        Ok(Self {
            domain: settings.domain.clone(),
            owner: settings.owner.clone(),
            ip_version: settings.ip_version,
            ipv6_suffix: settings.ipv6_suffix,
            credentials,
            endpoint: Url::parse(SPDYN_ENDPOINT).map_err(|e| Error::invalid_input(e.to_string()))?,
        })
    }

    /// Send updates somewhere other than Spdyn, e.g. a test server
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }
}

impl fmt::Display for SpdynProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hostname::provider_id(
            &self.domain,
            &self.owner,
            "spdyn",
            self.ip_version,
        ))
    }
}

impl DyndnsProtocol for SpdynProvider {
    fn protocol_name(&self) -> &'static str {
        "spdyn"
    }

    fn build_request(&self, ip: IpAddr) -> Result<UpdateRequest> {
        let hostname = hostname::build_query_hostname(&self.owner, &self.domain);
        let builder = UpdateRequest::builder(&self.endpoint)
            .query("hostname", hostname.clone())
            .address("myip", ip);

        let builder = match &self.credentials {
            Credentials::Token(token) => builder
                .query("user", hostname)
                .secret_query("pass", token),
            Credentials::UserPassword { user, password } => builder
                .query("user", user)
                .secret_query("pass", password),
        };

        builder.build()
    }

    fn grammar(&self) -> &'static ResponseGrammar {
        &GRAMMAR
    }
}

#[async_trait]
impl DnsProvider for SpdynProvider {
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
            "Spdyn DNS",
            "https://spdyn.com/",
            self.ip_version,
        )
    }

    fn provider_name(&self) -> &'static str {
        "spdyn"
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

/// Factory for creating Spdyn providers
pub struct SpdynFactory;

impl DnsProviderFactory for SpdynFactory {
    fn create(&self, settings: &RecordSettings) -> Result<Box<dyn DnsProvider>> {
        let provider = SpdynProvider::from_settings(settings)?;
        tracing::debug!(
            provider = %provider,
            token = matches!(provider.credentials, Credentials::Token(_)),
            "created spdyn provider"
        );
        Ok(Box::new(provider))
    }
}

/// Register the Spdyn provider with a registry
pub fn register(registry: &ddns_core::ProviderRegistry) {
    registry.register_provider("spdyn", Box::new(SpdynFactory));
}
