//! Error types for the parcel tracking adapters
//!
//! Every adapter funnels its failures into one closed [`Error`] enum so
//! callers can branch on the kind instead of matching message text.

use crate::model::Carrier;
use thiserror::Error;

/// Result type alias for tracking operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the parcel tracking system
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Transport failure or non-success HTTP status
    ///
    /// The displayed message is carrier-agnostic. `cause` is kept for logs.
    #[error(
        "Sorry, there is some problem on server, we will get it fixed as soon as possible, please try again later."
    )]
    Server {
        /// Underlying cause (connection error or status line)
        cause: String,
    },

    /// The carrier's own API reported a failure other than "not found"
    #[error("We faced some problem getting track records from {carrier}, please try again later.")]
    CourierUpstream {
        /// Carrier that reported the failure
        carrier: Carrier,
    },

    /// The carrier affirmatively reports that no such tracking number exists
    #[error(
        "The track records cannot be found, please make sure you have enter correct Track ID."
    )]
    RecordNotFound,

    /// Response body could not be parsed or lacked a required field
    #[error("Malformed response from {carrier}: {reason}")]
    MalformedResponse {
        /// Carrier whose response was malformed
        carrier: Carrier,
        /// What was wrong with it
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No courier registered for the requested carrier
    #[error("Unknown carrier: {0}")]
    UnknownCarrier(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a server (transport) error
    pub fn server(cause: impl Into<String>) -> Self {
        Self::Server {
            cause: cause.into(),
        }
    }

    /// Create a courier upstream error
    pub fn courier_upstream(carrier: Carrier) -> Self {
        Self::CourierUpstream { carrier }
    }

    /// Create a malformed response error
    pub fn malformed(carrier: Carrier, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            carrier,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unknown carrier error
    pub fn unknown_carrier(name: impl Into<String>) -> Self {
        Self::UnknownCarrier(name.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// `true` when the carrier reported that the tracking number does not exist
    pub fn is_record_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound)
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
