//! Error types raised while talking to the strategy service.

use std::error::Error;

use thiserror::Error;

/// Convenient result alias returning [`TransportError`] failures.
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport-level failures; anything that prevented a response from arriving.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The deadline elapsed before the service answered.
    #[error("request to strategy service timed out")]
    Timeout,
    /// The wait was abandoned on behalf of the caller.
    #[error("request to strategy service was cancelled")]
    Cancelled,
    /// The service could not be reached at the connection level.
    #[error("failed to connect to strategy service")]
    Network {
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build strategy service client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// Any other failure, carrying the underlying message.
    #[error("{message}")]
    Other { message: String },
}

impl TransportError {
    /// Construct a network error from any connection failure.
    pub fn network(source: impl Error + Send + Sync + 'static) -> Self {
        TransportError::Network {
            source: Box::new(source),
        }
    }

    /// Map a `reqwest` failure onto the transport taxonomy.
    ///
    /// A connect timeout is reported as both a connect error and a timeout; it maps to
    /// [`TransportError::Network`] since only the executor deadline yields `Timeout`.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() {
            TransportError::network(err)
        } else if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Other {
                message: err.to_string(),
            }
        }
    }
}
