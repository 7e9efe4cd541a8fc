//! Core traits for the DDNS system
//!
//! - [`DnsProvider`]: Keep one record current at one registrar
//! - [`DnsProviderFactory`]: Build a provider from validated settings

pub mod dns_provider;

pub use dns_provider::{DnsProvider, DnsProviderFactory, HtmlRow, UpdateResult};
