// # DNS Provider Trait
//
// Defines the interface the scheduler uses to keep one record current.
//
// ## Implementations
//
// - ddnss.de: `ddns-provider-ddnss` crate
// - Infomaniak: `ddns-provider-infomaniak` crate
// - Spdyn: `ddns-provider-spdyn` crate
// - Strato: `ddns-provider-strato` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, UpdateContext};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let client = ddns_core::protocol::transport::build_client(Duration::from_secs(30))?;
//     let ctx = UpdateContext::new().with_timeout(Duration::from_secs(10));
//
//     let result = provider.update(&ctx, &client, "203.0.113.5".parse()?).await?;
//     println!("{} now points at {}", provider.build_domain_name(), result.ip());
//
//     Ok(())
// }
// ```

use crate::config::{IpVersion, Ipv6Suffix};
use crate::protocol::UpdateContext;
use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;

/// Result of a DNS update operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// Registrar applied the address
    Updated {
        /// The new IP address
        new_ip: IpAddr,
    },
    /// Registrar reported the record already had the address
    Unchanged {
        /// The current IP address
        current_ip: IpAddr,
    },
}

impl UpdateResult {
    /// Address the record now points at
    pub fn ip(&self) -> IpAddr {
        match self {
            UpdateResult::Updated { new_ip } => *new_ip,
            UpdateResult::Unchanged { current_ip } => *current_ip,
        }
    }
}

/// Row shown for a provider on a status page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlRow {
    pub domain: String,
    pub owner: String,
    pub provider: String,
    pub ip_version: String,
}

impl HtmlRow {
    /// Row with a link to the record and a link to the registrar
    pub fn new(
        domain_name: &str,
        owner: &str,
        provider_label: &str,
        provider_url: &str,
        ip_version: IpVersion,
    ) -> Self {
        Self {
            domain: format!("<a href=\"http://{0}\">{0}</a>", domain_name),
            owner: owner.to_string(),
            provider: format!("<a href=\"{}\">{}</a>", provider_url, provider_label),
            ip_version: ip_version.to_string(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// One instance manages one record at one registrar. Instances are immutable
/// after construction, so concurrent `update` calls on the same instance are
/// safe.
///
/// # Trust Level: Untrusted
///
/// Providers perform HTTPS calls to their own endpoint and parse the reply.
/// They do not retry, back off, cache, spawn tasks, or decide whether an
/// update is needed; the scheduler owns all of that.
///
/// # Display
///
/// `Display` yields a stable identifier of the form
/// `[domain: example.com | owner: @ | provider: strato | ip: ipv4]`.
#[async_trait]
pub trait DnsProvider: Send + Sync + fmt::Display {
    /// Registered domain
    fn domain(&self) -> &str;

    /// Label under the domain, `@` for the domain itself
    fn owner(&self) -> &str;

    /// Address family this instance publishes
    fn ip_version(&self) -> IpVersion;

    /// IPv6 suffix for deriving the host address, if configured
    fn ipv6_suffix(&self) -> Option<Ipv6Suffix>;

    /// Whether traffic is proxied by the registrar; never for dyndns registrars
    fn proxied(&self) -> bool {
        false
    }

    /// Fully qualified name of the record
    fn build_domain_name(&self) -> String {
        crate::hostname::build_domain_name(self.owner(), self.domain())
    }

    /// Status page projection
    fn html(&self) -> HtmlRow;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Publish `ip` for this record
    ///
    /// # Idempotency
    ///
    /// Calling this twice with an address the registrar already holds is
    /// safe; registrars with a "no change" marker yield
    /// `UpdateResult::Unchanged`.
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateResult)`: the registrar accepted the address
    /// - `Err(Error)`: a typed failure; see `Error::kind`
    async fn update(
        &self,
        ctx: &UpdateContext,
        client: &reqwest::Client,
        ip: IpAddr,
    ) -> Result<UpdateResult, crate::Error>;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from record settings
    ///
    /// Validation happens here; invalid settings never yield a provider.
    fn create(
        &self,
        settings: &crate::config::RecordSettings,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_result_ip() {
        let ip: IpAddr = "2001:db8::5".parse().unwrap();
        assert_eq!(UpdateResult::Updated { new_ip: ip }.ip(), ip);
        assert_eq!(UpdateResult::Unchanged { current_ip: ip }.ip(), ip);
    }

    #[test]
    fn test_html_row() {
        let row = HtmlRow::new(
            "home.example.com",
            "home",
            "Strato DNS",
            "https://strato.com/",
            IpVersion::V4,
        );
        assert_eq!(
            row.domain,
            "<a href=\"http://home.example.com\">home.example.com</a>"
        );
        assert_eq!(row.provider, "<a href=\"https://strato.com/\">Strato DNS</a>");
        assert_eq!(row.ip_version, "ipv4");
    }
}
