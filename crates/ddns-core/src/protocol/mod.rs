//! Provider update protocol
//!
//! Every registrar supported here speaks a variant of the same exchange: one
//! HTTPS GET carrying hostname, address and credentials, answered by a short
//! plaintext status. A registrar describes its variant through
//! [`DyndnsProtocol`]; [`update`] drives the exchange the same way for all.
//!
//! ```text
//! build_request(ip) ──► transport::execute ──► grammar().classify ──► Result<UpdateResult>
//! ```

pub mod request;
pub mod response;
pub mod transport;

pub use request::{UpdateRequest, UpdateRequestBuilder};
pub use response::{Failure, Fallback, MatchRule, Marker, ResponseGrammar, StatusTable, Verdict};
pub use transport::{CancelHandle, UpdateContext};

use crate::error::Result;
use crate::traits::UpdateResult;
use std::net::IpAddr;
use tracing::debug;

/// The registrar-specific half of a provider
///
/// Both methods are pure: settings were validated when the provider was
/// built, and nothing here touches the network.
pub trait DyndnsProtocol: Send + Sync {
    /// Provider name used in logs
    fn protocol_name(&self) -> &'static str;

    /// Map the address to publish onto a request
    fn build_request(&self, ip: IpAddr) -> Result<UpdateRequest>;

    /// The registrar's response vocabulary
    fn grammar(&self) -> &'static ResponseGrammar;
}

/// Run one update exchange for `protocol`
///
/// Single shot: no retries, no caching. The caller owns both.
pub async fn update<P>(
    protocol: &P,
    ctx: &UpdateContext,
    client: &reqwest::Client,
    ip: IpAddr,
) -> Result<UpdateResult>
where
    P: DyndnsProtocol + ?Sized,
{
    let request = protocol.build_request(ip)?;

    debug!(
        provider = protocol.protocol_name(),
        url = %request.redacted_url(),
        address_key = request.address_key(),
        "sending update request"
    );

    let (status, body) = transport::execute(ctx, client, &request).await?;
    let outcome = protocol.grammar().classify(status, &body, ip);

    match &outcome {
        Ok(result) => debug!(provider = protocol.protocol_name(), status, ?result, "update accepted"),
        Err(e) => debug!(provider = protocol.protocol_name(), status, error = %e, "update rejected"),
    }

    outcome
}
