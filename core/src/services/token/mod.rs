//! Token service module
//!
//! This module handles all token-related operations including:
//! - Claim assembly for new tokens
//! - Signing and verification, with the optional cookie-secret split
//! - Asymmetric key loading for RSA, EC and EdDSA
//! - Revocation and rotation through a flag store

mod claim_builder;
mod codec;
mod config;
mod key_manager;
mod service;

#[cfg(test)]
mod tests;

pub use claim_builder::ClaimBuilder;
pub use codec::SigningCodec;
pub use config::TokenServiceConfig;
pub use key_manager::{KeyFamily, KeyPair};
pub use service::{
    generate_cookie_secret, FindOptions, Rotation, RotationRefusal, TokenService,
    COOKIE_SECRET_BYTES,
};
