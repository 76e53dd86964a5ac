//! A string that remembers the cipher which produced it.

use std::{fmt, sync::Arc};

use crate::{
    equality,
    error::{Error, Result},
    strategy::{CipherFactory, CipherOptions},
    traits::Cipher,
};

/// Ciphertext (or plaintext) paired with the cipher that produced it.
///
/// The cipher is present only when the value is the direct result of an
/// encryption call in this process. A value read back from storage is plain
/// even if its text is ciphertext; use [`decrypt_with`](Self::decrypt_with)
/// to name the cipher explicitly.
///
/// Comparison with `==` follows the equality rules in [`equality`]: an
/// encrypted value equals the plaintext it was produced from.
#[derive(Clone)]
pub struct EncryptedValue {
    raw: String,
    cipher: Option<Arc<dyn Cipher>>,
}

impl EncryptedValue {
    /// A value that was not encrypted in this process.
    pub fn plain(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            cipher: None,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn into_raw(self) -> String {
        self.raw
    }

    pub fn cipher(&self) -> Option<&dyn Cipher> {
        self.cipher.as_deref()
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    /// True only for encrypted values whose cipher is reversible.
    pub fn can_decrypt(&self) -> bool {
        self.cipher.as_ref().is_some_and(|c| c.can_decrypt())
    }

    /// Encrypt this value's text with `cipher`.
    ///
    /// Encrypting an already encrypted value wraps its ciphertext once more.
    pub fn encrypt_with(&self, cipher: Arc<dyn Cipher>) -> Result<Self> {
        let raw = cipher.encrypt(&self.raw)?;
        Ok(Self {
            raw,
            cipher: Some(cipher),
        })
    }

    /// Encrypt this value's text using the process-wide defaults.
    pub fn encrypt(&self, options: impl Into<CipherOptions>) -> Result<Self> {
        self.encrypt_with(CipherFactory::from_defaults().build(options)?)
    }

    pub fn encrypt_in_place(&mut self, options: impl Into<CipherOptions>) -> Result<()> {
        *self = self.encrypt(options)?;
        Ok(())
    }

    /// Decrypt with the cipher that produced this value.
    pub fn decrypt(&self) -> Result<Self> {
        let cipher = self.cipher.as_ref().ok_or(Error::CipherNotInferred)?;
        cipher.decrypt(&self.raw).map(Self::plain)
    }

    /// Decrypt with an explicitly named cipher, using the process-wide defaults.
    pub fn decrypt_with(&self, options: impl Into<CipherOptions>) -> Result<Self> {
        CipherFactory::from_defaults()
            .build(options)?
            .decrypt(&self.raw)
            .map(Self::plain)
    }

    pub fn decrypt_in_place(&mut self) -> Result<()> {
        *self = self.decrypt()?;
        Ok(())
    }

    /// Compare against plaintext without allocating a value for it.
    pub(crate) fn equals_plain(&self, plain: &str) -> Result<bool> {
        if self.raw == plain {
            return Ok(true);
        }
        if !self.is_encrypted() {
            return Ok(false);
        }
        equality::is_string_equal(plain, self)
    }

    pub(crate) fn decrypt_raw(&self) -> Result<String> {
        match &self.cipher {
            Some(cipher) => cipher.decrypt(&self.raw),
            None => Err(Error::CipherNotInferred),
        }
    }

    pub(crate) fn reencrypt(&self, plain: &str) -> Result<String> {
        match &self.cipher {
            Some(cipher) => cipher.encrypt(plain),
            None => Err(Error::CipherNotInferred),
        }
    }
}

impl fmt::Debug for EncryptedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedValue")
            .field("raw", &self.raw)
            .field("cipher", &self.cipher)
            .finish()
    }
}

impl fmt::Display for EncryptedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for EncryptedValue {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl From<String> for EncryptedValue {
    fn from(raw: String) -> Self {
        Self::plain(raw)
    }
}

impl From<&str> for EncryptedValue {
    fn from(raw: &str) -> Self {
        Self::plain(raw)
    }
}

fn log_failure(result: Result<bool>) -> bool {
    result.unwrap_or_else(|_e| {
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %_e, "equality check failed, treating values as unequal");
        false
    })
}

impl PartialEq for EncryptedValue {
    fn eq(&self, other: &Self) -> bool {
        log_failure(equality::values_equal(self, other))
    }
}

impl PartialEq<str> for EncryptedValue {
    fn eq(&self, other: &str) -> bool {
        log_failure(self.equals_plain(other))
    }
}

impl PartialEq<&str> for EncryptedValue {
    fn eq(&self, other: &&str) -> bool {
        log_failure(self.equals_plain(other))
    }
}

impl PartialEq<String> for EncryptedValue {
    fn eq(&self, other: &String) -> bool {
        log_failure(self.equals_plain(other))
    }
}

impl PartialEq<EncryptedValue> for str {
    fn eq(&self, other: &EncryptedValue) -> bool {
        other == self
    }
}

impl PartialEq<EncryptedValue> for &str {
    fn eq(&self, other: &EncryptedValue) -> bool {
        other == *self
    }
}

impl PartialEq<EncryptedValue> for String {
    fn eq(&self, other: &EncryptedValue) -> bool {
        other == self
    }
}
