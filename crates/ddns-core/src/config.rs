//! Configuration types for the DDNS system
//!
//! A settings document lists one [`RecordSettings`] per managed record:
//!
//! ```json
//! {
//!   "settings": [
//!     { "provider": "strato", "domain": "example.com", "owner": "@", "password": "secret" },
//!     { "provider": "ddnss", "domain": "example.de", "owner": "home",
//!       "username": "me", "password": "secret", "dual_stack": true, "ip_version": "ipv6" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

/// Main DDNS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Records to keep updated
    #[serde(default)]
    pub settings: Vec<RecordSettings>,
}

impl DdnsConfig {
    /// Parse a JSON settings document
    pub fn from_json(data: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(data)?)
    }

    /// Check that at least one record is configured
    ///
    /// Nothing registrar-specific is checked here. Per-record validation runs
    /// in [`ProviderRegistry::create_all`](crate::ProviderRegistry::create_all),
    /// which hands every record to its registrar's factory.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.settings.is_empty() {
            return Err(crate::ConfigError::Invalid("no records configured".into()).into());
        }
        Ok(())
    }
}

/// Address family a provider instance publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IpVersion {
    /// IPv4 only
    #[serde(rename = "ipv4")]
    V4,
    /// IPv6 only
    #[serde(rename = "ipv6")]
    V6,
    /// Both IPv4 and IPv6
    #[default]
    #[serde(rename = "ipv4 or ipv6", alias = "")]
    Both,
}

impl IpVersion {
    /// Whether `ip` may be published for a record of this family
    pub fn admits(self, ip: IpAddr) -> bool {
        match self {
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
            IpVersion::Both => true,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IpVersion::V4 => "ipv4",
            IpVersion::V6 => "ipv6",
            IpVersion::Both => "ipv4 or ipv6",
        })
    }
}

/// IPv6 prefix used to derive the host address after a network change
///
/// Written as `address/length`, for example `0:0:0:0:72ad:8fbb:a54e:bedd/64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv6Suffix {
    addr: Ipv6Addr,
    prefix_len: u8,
}

impl Ipv6Suffix {
    /// Create a suffix, rejecting prefix lengths above 128
    pub fn new(addr: Ipv6Addr, prefix_len: u8) -> Result<Self, crate::ConfigError> {
        if prefix_len > 128 {
            return Err(crate::ConfigError::Invalid(format!(
                "IPv6 suffix prefix length {} exceeds 128",
                prefix_len
            )));
        }
        Ok(Self { addr, prefix_len })
    }

    pub fn addr(&self) -> Ipv6Addr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }
}

impl FromStr for Ipv6Suffix {
    type Err = crate::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| crate::ConfigError::Invalid(format!("IPv6 suffix {:?} has no prefix length", s)))?;
        let addr: Ipv6Addr = addr
            .parse()
            .map_err(|e| crate::ConfigError::Invalid(format!("IPv6 suffix {:?}: {}", s, e)))?;
        let len: u8 = len
            .parse()
            .map_err(|e| crate::ConfigError::Invalid(format!("IPv6 suffix {:?}: {}", s, e)))?;
        Self::new(addr, len)
    }
}

impl fmt::Display for Ipv6Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

impl TryFrom<String> for Ipv6Suffix {
    type Error = crate::ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ipv6Suffix> for String {
    fn from(value: Ipv6Suffix) -> Self {
        value.to_string()
    }
}

/// Registrar-specific settings, tagged by the `provider` field
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// ddnss.de
    Ddnss {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
        /// Publish IPv6 addresses under the `ip6` key
        #[serde(default)]
        dual_stack: bool,
    },

    /// Infomaniak
    Infomaniak {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },

    /// Spdyn; `token` replaces `user` and `password` when set
    Spdyn {
        #[serde(default)]
        user: String,
        #[serde(default)]
        password: String,
        #[serde(default)]
        token: String,
    },

    /// Strato; the domain doubles as the username
    Strato {
        #[serde(default)]
        password: String,
    },
}

impl ProviderConfig {
    /// Get the provider type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderConfig::Ddnss { .. } => "ddnss",
            ProviderConfig::Infomaniak { .. } => "infomaniak",
            ProviderConfig::Spdyn { .. } => "spdyn",
            ProviderConfig::Strato { .. } => "strato",
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "<REDACTED>" }
}

// Secrets stay out of Debug output
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Ddnss {
                username,
                password,
                dual_stack,
            } => f
                .debug_struct("Ddnss")
                .field("username", username)
                .field("password", &redact(password))
                .field("dual_stack", dual_stack)
                .finish(),
            ProviderConfig::Infomaniak { username, password } => f
                .debug_struct("Infomaniak")
                .field("username", username)
                .field("password", &redact(password))
                .finish(),
            ProviderConfig::Spdyn {
                user,
                password,
                token,
            } => f
                .debug_struct("Spdyn")
                .field("user", user)
                .field("password", &redact(password))
                .field("token", &redact(token))
                .finish(),
            ProviderConfig::Strato { password } => f
                .debug_struct("Strato")
                .field("password", &redact(password))
                .finish(),
        }
    }
}

/// Settings for one managed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSettings {
    /// Registered domain, e.g. "example.com"
    pub domain: String,

    /// Label under the domain; "@" is the domain itself
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Address family to publish
    #[serde(default)]
    pub ip_version: IpVersion,

    /// Optional IPv6 suffix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_suffix: Option<Ipv6Suffix>,

    /// Registrar and its credentials
    #[serde(flatten)]
    pub provider: ProviderConfig,
}

impl RecordSettings {
    /// Create settings for a record
    pub fn new(
        domain: impl Into<String>,
        owner: impl Into<String>,
        provider: ProviderConfig,
    ) -> Self {
        Self {
            domain: domain.into(),
            owner: owner.into(),
            ip_version: IpVersion::default(),
            ipv6_suffix: None,
            provider,
        }
    }

    /// Set the IP version
    pub fn with_ip_version(mut self, ip_version: IpVersion) -> Self {
        self.ip_version = ip_version;
        self
    }

    /// Set the IPv6 suffix
    pub fn with_ipv6_suffix(mut self, suffix: Ipv6Suffix) -> Self {
        self.ipv6_suffix = Some(suffix);
        self
    }
}

fn default_owner() -> String {
    "@".to_string()
}
