//! Hostname and settings helpers shared by every registrar

use crate::config::IpVersion;
use crate::error::ConfigError;

/// Fully qualified name of the record, `@` meaning the domain itself
pub fn build_domain_name(owner: &str, domain: &str) -> String {
    match owner {
        "@" | "" => domain.to_string(),
        _ => format!("{}.{}", owner, domain),
    }
}

/// Hostname as registrars expect it in the update query
pub fn build_query_hostname(owner: &str, domain: &str) -> String {
    build_domain_name(owner, domain)
}

/// Stable human identifier of a provider instance
pub fn provider_id(domain: &str, owner: &str, provider: &str, ip_version: IpVersion) -> String {
    format!(
        "[domain: {} | owner: {} | provider: {} | ip: {}]",
        domain, owner, provider, ip_version
    )
}

/// Syntax check for a registered domain (RFC 1035 labels, at least two of them)
pub fn check_domain(domain: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| Err(ConfigError::DomainNotValid(reason));

    if domain.is_empty() {
        return invalid("domain name cannot be empty".into());
    }

    if domain.len() > 253 {
        return invalid(format!(
            "domain name too long: {} chars (max 253)",
            domain.len()
        ));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return invalid(format!("{} has no top level domain", domain));
    }

    for label in labels {
        if label.is_empty() {
            return invalid(format!("{} has an empty label", domain));
        }
        if label.len() > 63 {
            return invalid(format!(
                "label {:?} too long: {} chars (max 63)",
                label,
                label.len()
            ));
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return invalid(format!("label {:?} contains invalid characters", label));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return invalid(format!("label {:?} starts or ends with a hyphen", label));
        }
    }

    Ok(())
}

/// Checks every registrar shares: domain syntax then owner wildcard
pub fn check_domain_and_owner(domain: &str, owner: &str) -> Result<(), ConfigError> {
    check_domain(domain)?;
    if owner == "*" {
        return Err(ConfigError::OwnerWildcard);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_domain_name() {
        assert_eq!(build_domain_name("@", "example.com"), "example.com");
        assert_eq!(build_domain_name("", "example.com"), "example.com");
        assert_eq!(build_domain_name("home", "example.com"), "home.example.com");
        assert_eq!(build_query_hostname("a.b", "example.com"), "a.b.example.com");
    }

    #[test]
    fn test_provider_id() {
        assert_eq!(
            provider_id("example.com", "@", "strato", IpVersion::V4),
            "[domain: example.com | owner: @ | provider: strato | ip: ipv4]"
        );
    }

    #[test]
    fn test_check_domain() {
        assert!(check_domain("example.com").is_ok());
        assert!(check_domain("sub-domain.example.co.uk").is_ok());
        assert!(check_domain("").is_err());
        assert!(check_domain("localhost").is_err());
        assert!(check_domain("example..com").is_err());
        assert!(check_domain("-bad.com").is_err());
        assert!(check_domain("bad_char.com").is_err());
        assert!(check_domain(&format!("{}.com", "a".repeat(64))).is_err());
    }

    #[test]
    fn test_wildcard_owner_rejected() {
        assert_eq!(
            check_domain_and_owner("example.com", "*"),
            Err(ConfigError::OwnerWildcard)
        );
        assert!(check_domain_and_owner("example.com", "www").is_ok());
    }
}
