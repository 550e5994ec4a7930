//! Token codec error types
//!
//! `TokenError` is the diagnostic error of the signing codec. Lifecycle
//! lookups never surface it to callers; it collapses to "no usable token"
//! at that boundary and is kept here for logging and direct codec use.

use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Token encoding and verification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Token issued in the future")]
    IssuedInFuture,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid issuer")]
    InvalidIssuer,

    #[error("Invalid audience")]
    InvalidAudience,

    #[error("Algorithm not allowed")]
    InvalidAlgorithm,

    #[error("Missing claim: {claim}")]
    MissingClaim { claim: String },

    #[error("Invalid claims: {message}")]
    InvalidClaims { message: String },

    #[error("Malformed token: {message}")]
    Malformed { message: String },

    #[error("Token generation failed: {message}")]
    EncodingFailed { message: String },

    #[error("Key load error: {message}")]
    KeyLoad { message: String },

    #[error("Unsupported algorithm: {name}")]
    UnsupportedAlgorithm { name: String },
}

impl TokenError {
    /// Whether the failure is a time-window check rather than a defect in
    /// the token itself
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            TokenError::TokenExpired | TokenError::TokenNotYetValid | TokenError::IssuedInFuture
        )
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            ErrorKind::ImmatureSignature => TokenError::TokenNotYetValid,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
            ErrorKind::InvalidAudience => TokenError::InvalidAudience,
            ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => TokenError::InvalidAlgorithm,
            ErrorKind::MissingRequiredClaim(claim) => TokenError::MissingClaim {
                claim: claim.clone(),
            },
            ErrorKind::InvalidAlgorithmName => TokenError::UnsupportedAlgorithm {
                name: error.to_string(),
            },
            ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                TokenError::KeyLoad {
                    message: error.to_string(),
                }
            }
            _ => TokenError::Malformed {
                message: error.to_string(),
            },
        }
    }
}
