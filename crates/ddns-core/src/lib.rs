// # ddns-core
//
// Core library for keeping dynamic DNS records current at registrars that
// expose a plaintext "dyndns update" endpoint.
//
// ## Architecture Overview
//
// - **DnsProvider**: Trait the scheduler drives, one instance per record
// - **DyndnsProtocol**: Registrar-specific request builder and response grammar
// - **protocol::update**: Shared build → send → classify exchange
// - **ProviderRegistry**: Plugin-based registry mapping settings to providers
//
// ## Design Principles
//
// 1. **Validate early**: Invalid settings fail at construction, never at update
// 2. **Data-driven replies**: Each registrar's vocabulary is an ordered table
// 3. **Single-shot**: Providers never retry; every failure is a typed error
// 4. **Shared transport**: One HTTP client for every provider instance

pub mod config;
pub mod error;
pub mod hostname;
pub mod protocol;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, IpVersion, Ipv6Suffix, ProviderConfig, RecordSettings};
pub use error::{ConfigError, Error, ErrorKind, Result};
pub use protocol::{CancelHandle, DyndnsProtocol, UpdateContext, UpdateRequest};
pub use registry::ProviderRegistry;
pub use traits::{DnsProvider, DnsProviderFactory, HtmlRow, UpdateResult};
