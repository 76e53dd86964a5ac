//! One-way digest strategy: `hex(digest(builder(data, salt)))`.
//!
//! Digest ciphertext cannot be decrypted. The only way to tell whether a
//! plaintext matches is to hash it again with the same algorithm, salt and
//! builder, which is what the equality resolver does.

use std::{fmt, str::FromStr, sync::Arc};

use {
    cipherkit_config::{DigestDefaults, defaults},
    openssl::hash::{MessageDigest, hash},
    serde::{Deserialize, Deserializer},
};

use crate::{
    error::{Error, Result},
    strategy::Strategy,
    traits::Cipher,
};

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// Canonical upper-case name, e.g. `SHA1`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha224 => "SHA224",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        }
    }

    fn message_digest(self) -> MessageDigest {
        match self {
            Self::Md5 => MessageDigest::md5(),
            Self::Sha1 => MessageDigest::sha1(),
            Self::Sha224 => MessageDigest::sha224(),
            Self::Sha256 => MessageDigest::sha256(),
            Self::Sha384 => MessageDigest::sha384(),
            Self::Sha512 => MessageDigest::sha512(),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA1" => Ok(Self::Sha1),
            "SHA224" => Ok(Self::Sha224),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(Error::invalid(format!("unknown digest algorithm: {s}"))),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything that can hand out a salt, e.g. a user record carrying its own.
pub trait SaltSource: Send + Sync {
    fn salt(&self) -> String;
}

/// Where the salt comes from. Resolved exactly once, when the cipher is built.
#[derive(Clone)]
pub enum Salt {
    Literal(String),
    Provider(Arc<dyn Fn() -> String + Send + Sync>),
    Source(Arc<dyn SaltSource>),
}

impl Salt {
    pub fn provider(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::Provider(Arc::new(f))
    }

    pub fn source(source: impl SaltSource + 'static) -> Self {
        Self::Source(Arc::new(source))
    }

    fn resolve(&self) -> String {
        match self {
            Self::Literal(s) => s.clone(),
            Self::Provider(f) => f(),
            Self::Source(src) => src.salt(),
        }
    }
}

impl From<&str> for Salt {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_string())
    }
}

impl From<String> for Salt {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(_) => f.write_str("Salt::Literal(..)"),
            Self::Provider(_) => f.write_str("Salt::Provider(..)"),
            Self::Source(_) => f.write_str("Salt::Source(..)"),
        }
    }
}

/// Scalars are accepted and stringified, so `salt = 42` means `"42"`.
impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(Self::Literal(s)),
            serde_json::Value::Number(n) => Ok(Self::Literal(n.to_string())),
            serde_json::Value::Bool(b) => Ok(Self::Literal(b.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "salt must be a string or scalar, got {other}"
            ))),
        }
    }
}

/// Assembles the hashed payload from the data and the resolved salt.
#[derive(Clone, Default)]
pub enum Builder {
    /// `data` followed by `salt`.
    #[default]
    Concat,
    Custom(Arc<dyn Fn(&str, &str) -> String + Send + Sync>),
}

impl Builder {
    pub fn custom(f: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    fn build(&self, data: &str, salt: &str) -> String {
        match self {
            Self::Concat => format!("{data}{salt}"),
            Self::Custom(f) => f(data, salt),
        }
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concat => f.write_str("Builder::Concat"),
            Self::Custom(_) => f.write_str("Builder::Custom(..)"),
        }
    }
}

/// Options for [`DigestCipher`]. Unset fields fall back to the defaults.
///
/// `builder` can only be supplied in code; it is not a data option.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DigestOptions {
    pub algorithm: Option<String>,
    pub salt: Option<Salt>,
    #[serde(skip)]
    pub builder: Option<Builder>,
}

impl DigestOptions {
    pub fn with_salt(salt: impl Into<Salt>) -> Self {
        Self {
            salt: Some(salt.into()),
            ..Self::default()
        }
    }
}

/// Salted one-way hash cipher.
pub struct DigestCipher {
    algorithm: DigestAlgorithm,
    salt: String,
    builder: Builder,
}

impl DigestCipher {
    /// Build from `options`, falling back to the process-wide defaults.
    pub fn new(options: DigestOptions) -> Result<Self> {
        Self::with_defaults(options, &defaults::current().digest)
    }

    pub fn with_defaults(options: DigestOptions, defaults: &DigestDefaults) -> Result<Self> {
        let algorithm = options
            .algorithm
            .as_deref()
            .unwrap_or(&defaults.algorithm)
            .parse()?;
        let salt = options
            .salt
            .map_or_else(|| defaults.salt.clone(), |s| s.resolve());

        #[cfg(feature = "tracing")]
        tracing::debug!(%algorithm, "digest cipher configured");

        Ok(Self {
            algorithm,
            salt,
            builder: options.builder.unwrap_or_default(),
        })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }
}

impl fmt::Debug for DigestCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestCipher")
            .field("algorithm", &self.algorithm)
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl Cipher for DigestCipher {
    fn strategy(&self) -> Strategy {
        Strategy::Digest
    }

    fn can_decrypt(&self) -> bool {
        false
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let payload = self.builder.build(plaintext, &self.salt);
        let digest = hash(self.algorithm.message_digest(), payload.as_bytes())
            .map_err(|e| {
                Error::EncryptionFailed(format!("{} digest failed: {e}", self.algorithm))
            })?;
        Ok(hex::encode(digest))
    }
}
