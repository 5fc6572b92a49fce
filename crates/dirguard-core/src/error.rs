//! Error types for directory operations.
//!
//! Every failure the directory layer can surface maps onto one variant of [`Error`]. Server
//! diagnostics are carried verbatim so callers can report them without re-querying.

use thiserror::Error;

/// Main error type for directory operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The server could not be reached, or the connection could not be released cleanly.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The bind was rejected.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The server reported a search failure other than "no such object".
    #[error("Search failed (code {code}): {diagnostic}")]
    Search {
        /// Protocol result code
        code: u32,
        /// Server diagnostic message
        diagnostic: String,
    },

    /// The server rejected an add, modify, delete or rename.
    #[error("{operation} of `{dn}` failed (code {code}): {diagnostic}")]
    Mutation {
        /// Wire operation that failed
        operation: &'static str,
        /// Target entry
        dn: String,
        /// Protocol result code
        code: u32,
        /// Server diagnostic message
        diagnostic: String,
    },

    /// An entry already exists at the DN being created.
    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    /// A move was attempted from an absent source or onto an occupied destination.
    #[error("Cannot move `{from}` to `{to}`: {reason}")]
    InvalidMove {
        /// Source DN
        from: String,
        /// Destination DN
        to: String,
        /// Which half of the precondition failed
        reason: String,
    },

    /// A required handle was missing when the operation was invoked.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// A distinguished name could not be parsed.
    #[error("Invalid distinguished name: {0}")]
    InvalidDn(String),

    /// A transport operation exceeded its timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Specialized result type for directory operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::Authentication(_) => "AUTHENTICATION_ERROR",
            Self::Search { .. } => "SEARCH_ERROR",
            Self::Mutation { .. } => "MUTATION_ERROR",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::InvalidMove { .. } => "INVALID_MOVE",
            Self::Precondition(_) => "PRECONDITION_ERROR",
            Self::InvalidDn(_) => "INVALID_DN",
            Self::Timeout(_) => "TIMEOUT",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Returns the protocol result code reported by the server, if any.
    #[must_use]
    pub const fn result_code(&self) -> Option<u32> {
        match self {
            Self::Search { code, .. } | Self::Mutation { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if this error should be logged as a serious error.
    ///
    /// Guard rejections are expected outcomes of the caller's intent and are not included.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Config(_) | Self::Search { .. } | Self::Mutation { .. }
        )
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid directory URL: {err}"))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config(err.to_string())
    }
}
