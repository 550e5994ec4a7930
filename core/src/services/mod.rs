//! Services containing the token lifecycle logic.

pub mod token;

// Re-export commonly used types
pub use token::{
    ClaimBuilder, FindOptions, KeyFamily, KeyPair, Rotation, RotationRefusal, SigningCodec,
    TokenService, TokenServiceConfig,
};
