//! Domain-specific error types and error handling.

mod types;

pub use types::TokenError;

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The flag store could not answer; revocation state is unknown
    #[error("Flag store error: {message}")]
    Store { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}
