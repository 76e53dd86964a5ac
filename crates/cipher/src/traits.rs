//! Cipher trait shared by the digest, symmetric and asymmetric strategies.

use std::fmt;

use crate::{
    error::{Error, Result},
    strategy::Strategy,
};

/// A string encryption strategy.
///
/// Implementations are configured once at construction and are otherwise
/// immutable, apart from lazily loaded key material. Ciphertext is always
/// text: lowercase hex for digests, MIME-style base64 for everything else.
pub trait Cipher: Send + Sync + fmt::Debug {
    /// Which strategy this cipher implements.
    fn strategy(&self) -> Strategy;

    /// Whether ciphertext produced by this strategy can be reversed.
    ///
    /// A static property of the strategy, independent of key availability.
    fn can_decrypt(&self) -> bool {
        true
    }

    /// Encrypt `plaintext`. Any string, including the empty string, is valid input.
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt a ciphertext previously produced by [`encrypt`](Self::encrypt).
    fn decrypt(&self, _ciphertext: &str) -> Result<String> {
        Err(Error::UnsupportedOperation {
            strategy: self.strategy().as_str(),
        })
    }
}
