//! Asymmetric key material for RSA, EC and EdDSA signing

use std::fs;
use std::path::Path;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::errors::TokenError;

/// Algorithm family, deciding how key material is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    pub fn of(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => KeyFamily::Hmac,
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => KeyFamily::Rsa,
            Algorithm::ES256 | Algorithm::ES384 => KeyFamily::Ec,
            Algorithm::EdDSA => KeyFamily::Ed,
        }
    }

    pub fn is_symmetric(self) -> bool {
        self == KeyFamily::Hmac
    }
}

/// PEM-loaded signing and verification keys for an asymmetric algorithm
#[derive(Clone)]
pub struct KeyPair {
    family: KeyFamily,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Creates a key pair from PEM strings
    ///
    /// # Arguments
    ///
    /// * `algorithm` - Asymmetric algorithm the keys are used with
    /// * `private_key_pem` - PEM-encoded private key (PKCS#8, or PKCS#1 for RSA)
    /// * `public_key_pem` - PEM-encoded public key
    ///
    /// # Returns
    ///
    /// * `Ok(KeyPair)` - Keys parsed successfully
    /// * `Err(TokenError)` - HMAC algorithm given, or a key failed to parse
    pub fn from_pem_strings(
        algorithm: Algorithm,
        private_key_pem: &str,
        public_key_pem: &str,
    ) -> Result<Self, TokenError> {
        let family = KeyFamily::of(algorithm);
        let (encoding_key, decoding_key) = match family {
            KeyFamily::Hmac => {
                return Err(TokenError::KeyLoad {
                    message: format!("{:?} uses a shared secret, not a key pair", algorithm),
                })
            }
            KeyFamily::Rsa => (
                EncodingKey::from_rsa_pem(private_key_pem.as_bytes()),
                DecodingKey::from_rsa_pem(public_key_pem.as_bytes()),
            ),
            KeyFamily::Ec => (
                EncodingKey::from_ec_pem(private_key_pem.as_bytes()),
                DecodingKey::from_ec_pem(public_key_pem.as_bytes()),
            ),
            KeyFamily::Ed => (
                EncodingKey::from_ed_pem(private_key_pem.as_bytes()),
                DecodingKey::from_ed_pem(public_key_pem.as_bytes()),
            ),
        };

        let encoding_key = encoding_key.map_err(|e| TokenError::KeyLoad {
            message: format!("Invalid private key format: {}", e),
        })?;
        let decoding_key = decoding_key.map_err(|e| TokenError::KeyLoad {
            message: format!("Invalid public key format: {}", e),
        })?;

        Ok(Self {
            family,
            encoding_key,
            decoding_key,
        })
    }

    /// Creates a key pair from PEM files
    pub fn from_files<P: AsRef<Path>>(
        algorithm: Algorithm,
        private_key_path: P,
        public_key_path: P,
    ) -> Result<Self, TokenError> {
        let private_key_pem = fs::read_to_string(private_key_path.as_ref()).map_err(|e| TokenError::KeyLoad {
            message: format!("Failed to read private key: {}", e),
        })?;
        let public_key_pem = fs::read_to_string(public_key_path.as_ref()).map_err(|e| TokenError::KeyLoad {
            message: format!("Failed to read public key: {}", e),
        })?;

        Self::from_pem_strings(algorithm, &private_key_pem, &public_key_pem)
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    /// Returns the encoding key for signing JWTs
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the decoding key for verifying JWTs
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}
