//! Cipher error types.

use std::path::PathBuf;

/// Errors produced while building or using a cipher.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unrecognized option, unknown algorithm or strategy name, or no key
    /// reference at all for the asymmetric strategy.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The symmetric strategy has no password to derive its key from.
    #[error("no password specified for symmetric cipher")]
    MissingPassword,

    /// Encryption needs a public key that is not currently available.
    #[error("no public key available (public key file: {})", display_file(.file))]
    NoPublicKey { file: Option<PathBuf> },

    /// Decryption needs a private key that is not currently available.
    #[error("no private key available (private key file: {})", display_file(.file))]
    NoPrivateKey { file: Option<PathBuf> },

    /// Decryption was requested from a one-way strategy.
    #[error("decryption is not supported by the {strategy} cipher")]
    UnsupportedOperation { strategy: &'static str },

    /// The value carries no cipher and none was supplied.
    #[error("cipher cannot be inferred: value was not encrypted in this process")]
    CipherNotInferred,

    /// The primitive rejected the ciphertext (wrong key, corrupt input, bad padding).
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// The primitive rejected the plaintext (e.g. longer than the RSA modulus allows).
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
}

impl Error {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

fn display_file(file: &Option<PathBuf>) -> String {
    file.as_ref()
        .map_or_else(|| "none".to_string(), |p| p.display().to_string())
}

pub type Result<T> = std::result::Result<T, Error>;
