//! Validation errors raised by the exchange model.

use thiserror::Error;

/// Local validation failure. Raised before the session log is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
