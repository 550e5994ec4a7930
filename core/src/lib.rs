//! # TokenLock Core
//!
//! Domain layer for signed bearer tokens: claim sets, the signing codec,
//! the lifecycle service and the flag store interface it uses for
//! revocation and rotation markers.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::{ClaimSet, Token, TokenCookie, ROTATION_EXCLUDED};
pub use errors::{DomainError, TokenError};
pub use repositories::{FlagStore, InMemoryFlagStore};
pub use services::{
    ClaimBuilder, FindOptions, KeyFamily, KeyPair, Rotation, RotationRefusal, SigningCodec,
    TokenService, TokenServiceConfig,
};
