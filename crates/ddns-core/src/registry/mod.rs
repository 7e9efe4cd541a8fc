//! Plugin-based provider registry
//!
//! The registry maps the `provider` discriminator of [`RecordSettings`] to the
//! factory that builds it, so the daemon never branches on registrar names.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddns_core::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! ddns_provider_strato::register(&registry);
//!
//! let provider = registry.create_provider(&settings)?;
//! ```
//!
//! ## Registration
//!
//! Each provider crate exposes a `register` function:
//!
//! ```rust,ignore
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_provider("strato", Box::new(StratoFactory));
//! }
//! ```

use crate::config::{DdnsConfig, RecordSettings};
use crate::error::{ConfigError, Result};
use crate::traits::{DnsProvider, DnsProviderFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Provider registry for plugin-based DNS provider creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name as it appears in settings (e.g., "strato")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        providers.insert(name.into(), factory);
    }

    /// Create a DNS provider from record settings
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If the provider type is not registered or the settings
    ///   are invalid
    pub fn create_provider(&self, settings: &RecordSettings) -> Result<Box<dyn DnsProvider>> {
        let provider_type = settings.provider.type_name();
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| ConfigError::UnknownProvider(provider_type.to_string()))?;

        factory.create(settings)
    }

    /// Create one provider per record, failing on the first invalid one
    pub fn create_all(&self, config: &DdnsConfig) -> Result<Vec<Box<dyn DnsProvider>>> {
        config.validate()?;
        config
            .settings
            .iter()
            .map(|settings| self.create_provider(settings))
            .collect()
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::error::{Error, ErrorKind};

    struct MockProviderFactory;

    impl DnsProviderFactory for MockProviderFactory {
        fn create(&self, _settings: &RecordSettings) -> Result<Box<dyn DnsProvider>> {
            Err(Error::from(ConfigError::PasswordNotSet))
        }
    }

    fn strato_settings() -> RecordSettings {
        RecordSettings::new(
            "example.com",
            "@",
            ProviderConfig::Strato {
                password: String::new(),
            },
        )
    }

    #[test]
    fn test_registry_registration() {
        let registry = ProviderRegistry::new();

        // Initially empty
        assert!(!registry.has_provider("strato"));

        // Register
        registry.register_provider("strato", Box::new(MockProviderFactory));

        // Now present
        assert!(registry.has_provider("strato"));
        assert!(registry.list_providers().contains(&"strato".to_string()));
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let registry = ProviderRegistry::new();
        let err = registry.create_provider(&strato_settings()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.to_string().contains("unknown provider type: strato"));
    }

    #[test]
    fn test_factory_errors_propagate() {
        let registry = ProviderRegistry::new();
        registry.register_provider("strato", Box::new(MockProviderFactory));

        let config = DdnsConfig {
            settings: vec![strato_settings()],
        };
        let err = registry.create_all(&config).err().unwrap();
        assert!(matches!(err, Error::Config(ConfigError::PasswordNotSet)));
    }

    #[test]
    fn test_registrar_checks_run_in_create_all() {
        let registry = ProviderRegistry::new();
        registry.register_provider("strato", Box::new(MockProviderFactory));

        // An empty password passes the document check and fails at the factory
        let config = DdnsConfig {
            settings: vec![strato_settings()],
        };
        assert!(config.validate().is_ok());
        assert!(registry.create_all(&config).is_err());
    }

    #[test]
    fn test_create_all_requires_records() {
        let registry = ProviderRegistry::new();
        assert!(registry.create_all(&DdnsConfig::default()).is_err());
    }
}
