//! Update request assembly
//!
//! Registrars only differ in where they expect the hostname, the address and
//! the credentials. [`UpdateRequestBuilder`] places each piece and escapes it;
//! the result is an immutable [`UpdateRequest`] the transport sends as-is.

use crate::error::{Error, Result};
use std::net::IpAddr;
use url::Url;

/// Placeholder for secrets in logged URLs
const REDACTED: &str = "REDACTED";

/// One fully formed GET request to a registrar's update endpoint
#[derive(Clone)]
pub struct UpdateRequest {
    url: Url,
    address_key: &'static str,
    secret_keys: Vec<&'static str>,
}

impl UpdateRequest {
    /// Start building a request against `endpoint`
    pub fn builder(endpoint: &Url) -> UpdateRequestBuilder {
        UpdateRequestBuilder {
            url: endpoint.clone(),
            userinfo: None,
            query: Vec::new(),
            address: None,
            secret_keys: Vec::new(),
        }
    }

    /// Target URL, including userinfo credentials when the registrar uses them
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Query key that carries the address
    pub fn address_key(&self) -> &'static str {
        self.address_key
    }

    /// Decoded value of a query parameter
    pub fn query_value(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// URL safe for logs: userinfo password and secret query values replaced
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        if url.password().is_some() {
            let _ = url.set_password(Some(REDACTED));
        }
        if !self.secret_keys.is_empty() {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(k, v)| {
                    let v = if self.secret_keys.iter().any(|key| *key == k) {
                        REDACTED.to_string()
                    } else {
                        v.into_owned()
                    };
                    (k.into_owned(), v)
                })
                .collect();
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        url.to_string()
    }
}

impl std::fmt::Debug for UpdateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateRequest")
            .field("url", &self.redacted_url())
            .field("address_key", &self.address_key)
            .finish()
    }
}

/// Builder for [`UpdateRequest`]
pub struct UpdateRequestBuilder {
    url: Url,
    userinfo: Option<(String, String)>,
    query: Vec<(&'static str, String)>,
    address: Option<(&'static str, IpAddr)>,
    secret_keys: Vec<&'static str>,
}

impl UpdateRequestBuilder {
    /// Embed basic-auth credentials in the URL
    pub fn userinfo(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.userinfo = Some((username.into(), password.into()));
        self
    }

    /// Add a query parameter
    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    /// Add a query parameter that never shows up in logs
    pub fn secret_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.secret_keys.push(key);
        self.query(key, value)
    }

    /// Set the address and the key carrying it
    pub fn address(mut self, key: &'static str, ip: IpAddr) -> Self {
        self.address = Some((key, ip));
        self
    }

    /// Assemble the request
    ///
    /// Fails only when the endpoint cannot carry the requested pieces, which
    /// means the registrar implementation itself is wrong.
    pub fn build(self) -> Result<UpdateRequest> {
        let (address_key, ip) = self
            .address
            .ok_or_else(|| Error::invalid_input("update request has no address"))?;

        let mut url = self.url;
        if let Some((username, password)) = self.userinfo {
            url.set_username(&username)
                .map_err(|_| Error::invalid_input("endpoint cannot carry a username"))?;
            url.set_password(Some(&password))
                .map_err(|_| Error::invalid_input("endpoint cannot carry a password"))?;
        }

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair(address_key, &ip.to_string());
        }

        Ok(UpdateRequest {
            url,
            address_key,
            secret_keys: self.secret_keys,
        })
    }
}
