//! Domain entities representing tokens and their transport artifacts.

pub mod claims;
pub mod cookie;
pub mod token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use claims::{ClaimSet, ROTATION_EXCLUDED};
pub use cookie::TokenCookie;
pub use token::Token;
