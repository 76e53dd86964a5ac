/// Config schema for the per-strategy cipher defaults.
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration: one section per cipher strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CipherConfig {
    pub digest: DigestDefaults,
    pub symmetric: SymmetricDefaults,
    pub asymmetric: AsymmetricDefaults,
}

/// Defaults for the one-way digest strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DigestDefaults {
    /// Digest name. Defaults to "SHA1".
    pub algorithm: String,
    /// Salt appended to the data before hashing. Defaults to "salt".
    pub salt: String,
}

impl Default for DigestDefaults {
    fn default() -> Self {
        Self {
            algorithm: "SHA1".into(),
            salt: "salt".into(),
        }
    }
}

/// Defaults for the password-based block cipher strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymmetricDefaults {
    /// Block cipher name. Defaults to "DES-EDE3-CBC".
    pub algorithm: String,
    /// Password the key and IV are derived from. No default.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<Secret<String>>,
    /// Use PBKDF2 key/IV derivation instead of the legacy derivation that
    /// existing ciphertexts were produced with.
    pub pkcs5_compliant: bool,
}

impl Default for SymmetricDefaults {
    fn default() -> Self {
        Self {
            algorithm: "DES-EDE3-CBC".into(),
            password: None,
            pkcs5_compliant: false,
        }
    }
}

/// Defaults for the RSA key pair strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AsymmetricDefaults {
    pub public_key_file: Option<String>,
    pub private_key_file: Option<String>,
    /// Block cipher protecting the private key file, if it is encrypted.
    pub algorithm: Option<String>,
    /// Password protecting the private key file, if it is encrypted.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<Secret<String>>,
}

// ── Serde helpers for Secret<String> ──

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
