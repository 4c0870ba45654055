//! Client side of the strategy service: transport seam, HTTP client and errors.

/// Endpoint configuration.
pub mod config;
/// Transport error taxonomy.
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
/// `reqwest` transport.
pub mod http;

use futures::future::BoxFuture;

use crate::dto::query::Query;

pub use self::{
    config::StrategyApiConfig,
    error::{TransportError, TransportResult},
    http::HttpStrategyClient,
};

/// Raw HTTP outcome before classification. Headers are irrelevant to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text, unparsed.
    pub body: String,
}

impl RawResponse {
    /// Construct a raw response from a status code and body text.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Abstraction over the outbound call to the strategy service.
///
/// Implementations issue exactly one request per invocation and never retry.
pub trait StrategyTransport: Send + Sync {
    /// POST `query` to the service and resolve with whatever came back.
    fn post_query(&self, query: Query) -> BoxFuture<'static, TransportResult<RawResponse>>;
}
