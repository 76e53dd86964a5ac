//! Strategy names, per-strategy options and the factory that builds ciphers.

use std::{fmt, str::FromStr, sync::Arc};

use {
    cipherkit_config::{CipherConfig, defaults},
    serde_json::Value,
};

use crate::{
    asymmetric::{AsymmetricCipher, AsymmetricOptions},
    digest::{DigestCipher, DigestOptions},
    error::{Error, Result},
    symmetric::{SymmetricCipher, SymmetricOptions},
    traits::Cipher,
    value::EncryptedValue,
};

/// The closed set of cipher strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One-way salted hash.
    #[default]
    Digest,
    /// Password-based block cipher.
    Symmetric,
    /// RSA key pair.
    Asymmetric,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Digest => "digest",
            Self::Symmetric => "symmetric",
            Self::Asymmetric => "asymmetric",
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digest" | "sha" => Ok(Self::Digest),
            "symmetric" | "symmetrically" => Ok(Self::Symmetric),
            "asymmetric" | "asymmetrically" => Ok(Self::Asymmetric),
            _ => Err(Error::invalid(format!("unknown cipher strategy: {s}"))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one strategy. The variant selects the strategy.
#[derive(Debug, Clone)]
pub enum CipherOptions {
    Digest(DigestOptions),
    Symmetric(SymmetricOptions),
    Asymmetric(AsymmetricOptions),
}

impl CipherOptions {
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Digest(_) => Strategy::Digest,
            Self::Symmetric(_) => Strategy::Symmetric,
            Self::Asymmetric(_) => Strategy::Asymmetric,
        }
    }

    /// Empty options for `strategy`, leaving everything to the defaults.
    pub fn defaults_for(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Digest => Self::Digest(DigestOptions::default()),
            Strategy::Symmetric => Self::Symmetric(SymmetricOptions::default()),
            Strategy::Asymmetric => Self::Asymmetric(AsymmetricOptions::default()),
        }
    }

    /// Parse options for `strategy` from a JSON object.
    ///
    /// `null` is treated as an empty object. Keys the strategy does not
    /// recognize are rejected.
    pub fn from_json(strategy: Strategy, options: Value) -> Result<Self> {
        let options = match options {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };
        match strategy {
            Strategy::Digest => serde_json::from_value(options).map(Self::Digest),
            Strategy::Symmetric => serde_json::from_value(options).map(Self::Symmetric),
            Strategy::Asymmetric => serde_json::from_value(options).map(Self::Asymmetric),
        }
        .map_err(|e| Error::invalid(format!("invalid {strategy} options: {e}")))
    }
}

impl Default for CipherOptions {
    fn default() -> Self {
        Self::defaults_for(Strategy::default())
    }
}

impl From<Strategy> for CipherOptions {
    fn from(strategy: Strategy) -> Self {
        Self::defaults_for(strategy)
    }
}

impl From<DigestOptions> for CipherOptions {
    fn from(options: DigestOptions) -> Self {
        Self::Digest(options)
    }
}

impl From<SymmetricOptions> for CipherOptions {
    fn from(options: SymmetricOptions) -> Self {
        Self::Symmetric(options)
    }
}

impl From<AsymmetricOptions> for CipherOptions {
    fn from(options: AsymmetricOptions) -> Self {
        Self::Asymmetric(options)
    }
}

/// Builds ciphers against an explicit configuration.
#[derive(Debug, Clone, Default)]
pub struct CipherFactory {
    config: CipherConfig,
}

impl CipherFactory {
    pub fn new(config: CipherConfig) -> Self {
        Self { config }
    }

    /// Factory bound to a snapshot of the process-wide defaults.
    pub fn from_defaults() -> Self {
        Self::new(defaults::current())
    }

    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    pub fn build(&self, options: impl Into<CipherOptions>) -> Result<Arc<dyn Cipher>> {
        let cipher: Arc<dyn Cipher> = match options.into() {
            CipherOptions::Digest(options) => {
                Arc::new(DigestCipher::with_defaults(options, &self.config.digest)?)
            },
            CipherOptions::Symmetric(options) => {
                Arc::new(SymmetricCipher::with_defaults(options, &self.config.symmetric)?)
            },
            CipherOptions::Asymmetric(options) => {
                Arc::new(AsymmetricCipher::with_config(options, &self.config)?)
            },
        };
        Ok(cipher)
    }

    /// Build from a strategy name (aliases accepted) and JSON options.
    pub fn build_named(&self, strategy: &str, options: Value) -> Result<Arc<dyn Cipher>> {
        let strategy: Strategy = strategy.parse()?;
        self.build(CipherOptions::from_json(strategy, options)?)
    }

    /// Encrypt `plaintext`, keeping the cipher on the result.
    pub fn encrypt(
        &self,
        plaintext: &str,
        options: impl Into<CipherOptions>,
    ) -> Result<EncryptedValue> {
        EncryptedValue::plain(plaintext).encrypt_with(self.build(options)?)
    }

    /// Decrypt a stored ciphertext. The result is a plain value.
    pub fn decrypt(
        &self,
        ciphertext: &str,
        options: impl Into<CipherOptions>,
    ) -> Result<EncryptedValue> {
        let cipher = self.build(options)?;
        cipher.decrypt(ciphertext).map(EncryptedValue::plain)
    }
}

/// Encrypt `plaintext` with the named strategy and the process-wide defaults.
pub fn encrypt(plaintext: &str, strategy: &str, options: Value) -> Result<EncryptedValue> {
    let factory = CipherFactory::from_defaults();
    EncryptedValue::plain(plaintext).encrypt_with(factory.build_named(strategy, options)?)
}

/// Decrypt `ciphertext` with the named strategy and the process-wide defaults.
pub fn decrypt(ciphertext: &str, strategy: &str, options: Value) -> Result<EncryptedValue> {
    let cipher = CipherFactory::from_defaults().build_named(strategy, options)?;
    cipher.decrypt(ciphertext).map(EncryptedValue::plain)
}
