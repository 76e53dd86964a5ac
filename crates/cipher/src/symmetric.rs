//! Password-based block cipher strategy.
//!
//! The key and IV are derived from the password on every call, so a
//! password provider can change its answer between calls. Two derivations
//! exist:
//!
//! - legacy (default): OpenSSL `EVP_BytesToKey` with MD5, no salt and 2048
//!   rounds. Every value stored before PKCS#5 compliance was added was written
//!   this way, so the output must stay bit-for-bit identical.
//! - PKCS#5 compliant: PBKDF2-HMAC-SHA1 over the password, 2048 rounds,
//!   producing key and IV in one stretch.

use std::{fmt, str::FromStr, sync::Arc};

use {
    cipherkit_config::{SymmetricDefaults, defaults},
    openssl::{hash::MessageDigest, pkcs5, symm},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Deserializer},
    zeroize::Zeroizing,
};

use crate::{
    encoding,
    error::{Error, Result},
    strategy::Strategy,
    traits::Cipher,
};

/// Rounds used by both key derivations.
const DERIVATION_ROUNDS: usize = 2048;

/// Supported block cipher algorithms, named as OpenSSL names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCipher {
    DesEde3Cbc,
    DesEde3Cfb,
    DesEde3Ecb,
    Aes128Cbc,
    Aes128Cfb,
    Aes128Ecb,
    Aes192Cbc,
    Aes192Cfb,
    Aes192Ecb,
    Aes256Cbc,
    Aes256Cfb,
    Aes256Ecb,
}

impl BlockCipher {
    pub fn name(self) -> &'static str {
        match self {
            Self::DesEde3Cbc => "DES-EDE3-CBC",
            Self::DesEde3Cfb => "DES-EDE3-CFB",
            Self::DesEde3Ecb => "DES-EDE3",
            Self::Aes128Cbc => "AES-128-CBC",
            Self::Aes128Cfb => "AES-128-CFB",
            Self::Aes128Ecb => "AES-128-ECB",
            Self::Aes192Cbc => "AES-192-CBC",
            Self::Aes192Cfb => "AES-192-CFB",
            Self::Aes192Ecb => "AES-192-ECB",
            Self::Aes256Cbc => "AES-256-CBC",
            Self::Aes256Cfb => "AES-256-CFB",
            Self::Aes256Ecb => "AES-256-ECB",
        }
    }

    fn openssl(self) -> symm::Cipher {
        match self {
            Self::DesEde3Cbc => symm::Cipher::des_ede3_cbc(),
            Self::DesEde3Cfb => symm::Cipher::des_ede3_cfb64(),
            Self::DesEde3Ecb => symm::Cipher::des_ede3(),
            Self::Aes128Cbc => symm::Cipher::aes_128_cbc(),
            Self::Aes128Cfb => symm::Cipher::aes_128_cfb128(),
            Self::Aes128Ecb => symm::Cipher::aes_128_ecb(),
            Self::Aes192Cbc => symm::Cipher::aes_192_cbc(),
            Self::Aes192Cfb => symm::Cipher::aes_192_cfb128(),
            Self::Aes192Ecb => symm::Cipher::aes_192_ecb(),
            Self::Aes256Cbc => symm::Cipher::aes_256_cbc(),
            Self::Aes256Cfb => symm::Cipher::aes_256_cfb128(),
            Self::Aes256Ecb => symm::Cipher::aes_256_ecb(),
        }
    }
}

impl FromStr for BlockCipher {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DES-EDE3-CBC" => Ok(Self::DesEde3Cbc),
            "DES-EDE3-CFB" | "DES-EDE3-CFB64" => Ok(Self::DesEde3Cfb),
            "DES-EDE3" | "DES-EDE3-ECB" => Ok(Self::DesEde3Ecb),
            "AES-128-CBC" => Ok(Self::Aes128Cbc),
            "AES-128-CFB" | "AES-128-CFB128" => Ok(Self::Aes128Cfb),
            "AES-128-ECB" => Ok(Self::Aes128Ecb),
            "AES-192-CBC" => Ok(Self::Aes192Cbc),
            "AES-192-CFB" | "AES-192-CFB128" => Ok(Self::Aes192Cfb),
            "AES-192-ECB" => Ok(Self::Aes192Ecb),
            "AES-256-CBC" => Ok(Self::Aes256Cbc),
            "AES-256-CFB" | "AES-256-CFB128" => Ok(Self::Aes256Cfb),
            "AES-256-ECB" => Ok(Self::Aes256Ecb),
            _ => Err(Error::invalid(format!("unknown block cipher algorithm: {s}"))),
        }
    }
}

impl fmt::Display for BlockCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Password the key and IV are derived from.
#[derive(Clone)]
pub enum Password {
    Literal(Secret<String>),
    /// Asked on every encrypt/decrypt call. `None` means no password right now.
    Provider(Arc<dyn Fn() -> Option<String> + Send + Sync>),
}

impl Password {
    pub fn provider(f: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Provider(Arc::new(f))
    }

    fn resolve(&self) -> Result<Zeroizing<String>> {
        match self {
            Self::Literal(secret) => Ok(Zeroizing::new(secret.expose_secret().clone())),
            Self::Provider(f) => f().map(Zeroizing::new).ok_or(Error::MissingPassword),
        }
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self::Literal(Secret::new(s.to_string()))
    }
}

impl From<String> for Password {
    fn from(s: String) -> Self {
        Self::Literal(Secret::new(s))
    }
}

impl From<Secret<String>> for Password {
    fn from(secret: Secret<String>) -> Self {
        Self::Literal(secret)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(_) => f.write_str("Password::Literal([REDACTED])"),
            Self::Provider(_) => f.write_str("Password::Provider(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for Password {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// Options for [`SymmetricCipher`]. Unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymmetricOptions {
    pub algorithm: Option<String>,
    pub password: Option<Password>,
    pub pkcs5_compliant: Option<bool>,
}

impl SymmetricOptions {
    pub fn with_password(password: impl Into<Password>) -> Self {
        Self {
            password: Some(password.into()),
            ..Self::default()
        }
    }
}

/// Reversible cipher keyed by a shared password.
#[derive(Clone)]
pub struct SymmetricCipher {
    algorithm: BlockCipher,
    password: Password,
    pkcs5_compliant: bool,
}

impl SymmetricCipher {
    /// Build from `options`, falling back to the process-wide defaults.
    pub fn new(options: SymmetricOptions) -> Result<Self> {
        Self::with_defaults(options, &defaults::current().symmetric)
    }

    pub fn with_defaults(options: SymmetricOptions, defaults: &SymmetricDefaults) -> Result<Self> {
        let algorithm: BlockCipher = options
            .algorithm
            .as_deref()
            .unwrap_or(&defaults.algorithm)
            .parse()?;
        let password = options
            .password
            .or_else(|| defaults.password.clone().map(Password::Literal))
            .ok_or(Error::MissingPassword)?;
        let pkcs5_compliant = options
            .pkcs5_compliant
            .unwrap_or(defaults.pkcs5_compliant);

        #[cfg(feature = "tracing")]
        tracing::debug!(%algorithm, pkcs5_compliant, "symmetric cipher configured");

        Ok(Self {
            algorithm,
            password,
            pkcs5_compliant,
        })
    }

    pub fn algorithm(&self) -> BlockCipher {
        self.algorithm
    }

    pub fn pkcs5_compliant(&self) -> bool {
        self.pkcs5_compliant
    }

    /// Derive the key and (for chained modes) IV from the current password.
    fn key_iv(&self) -> Result<(Zeroizing<Vec<u8>>, Option<Vec<u8>>)> {
        let password = self.password.resolve()?;
        let cipher = self.algorithm.openssl();

        if self.pkcs5_compliant {
            let key_len = cipher.key_len();
            let iv_len = cipher.iv_len().unwrap_or(0);
            let mut material = Zeroizing::new(vec![0u8; key_len + iv_len]);
            pkcs5::pbkdf2_hmac(
                password.as_bytes(),
                b"",
                DERIVATION_ROUNDS,
                MessageDigest::sha1(),
                &mut material,
            )
            .map_err(|e| Error::invalid(format!("key derivation failed: {e}")))?;
            let iv = (iv_len > 0).then(|| material[key_len..].to_vec());
            material.truncate(key_len);
            Ok((material, iv))
        } else {
            let pair = pkcs5::bytes_to_key(
                cipher,
                MessageDigest::md5(),
                password.as_bytes(),
                None,
                DERIVATION_ROUNDS as i32,
            )
            .map_err(|e| Error::invalid(format!("key derivation failed: {e}")))?;
            Ok((Zeroizing::new(pair.key), pair.iv))
        }
    }

    /// Decrypt raw ciphertext bytes. Used for protected private key files.
    pub(crate) fn decrypt_bytes(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let (key, iv) = self.key_iv()?;
        symm::decrypt(self.algorithm.openssl(), &key, iv.as_deref(), ciphertext)
            .map(Zeroizing::new)
            .map_err(|e| {
                Error::DecryptionFailed(format!("{} rejected ciphertext: {e}", self.algorithm))
            })
    }
}

impl fmt::Debug for SymmetricCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricCipher")
            .field("algorithm", &self.algorithm)
            .field("password", &self.password)
            .field("pkcs5_compliant", &self.pkcs5_compliant)
            .finish()
    }
}

impl Cipher for SymmetricCipher {
    fn strategy(&self) -> Strategy {
        Strategy::Symmetric
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let (key, iv) = self.key_iv()?;
        let cipher = self.algorithm.openssl();
        let ciphertext = symm::encrypt(cipher, &key, iv.as_deref(), plaintext.as_bytes())
            .map_err(|e| {
                Error::EncryptionFailed(format!("{} encryption failed: {e}", self.algorithm))
            })?;
        Ok(encoding::encode(&ciphertext))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let raw = encoding::decode(ciphertext)?;
        let plaintext = self.decrypt_bytes(&raw)?;
        String::from_utf8(plaintext.to_vec())
            .map_err(|_| Error::DecryptionFailed("decrypted data is not valid UTF-8".into()))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        rstest::rstest,
        std::sync::{Arc, Mutex},
    };

    fn cipher(options: SymmetricOptions) -> SymmetricCipher {
        SymmetricCipher::with_defaults(options, &SymmetricDefaults::default()).unwrap()
    }

    #[test]
    fn uses_default_algorithm() {
        let c = cipher(SymmetricOptions::with_password("secret"));
        assert_eq!(c.algorithm(), BlockCipher::DesEde3Cbc);
        assert!(!c.pkcs5_compliant());
        assert!(c.can_decrypt());
    }

    #[test]
    fn missing_password() {
        let result = SymmetricCipher::with_defaults(
            SymmetricOptions::default(),
            &SymmetricDefaults::default(),
        );
        assert!(matches!(result, Err(Error::MissingPassword)));
    }

    #[test]
    fn default_password_is_used() {
        let defaults = SymmetricDefaults {
            algorithm: "DES-EDE3-CFB".into(),
            password: Some(Secret::new("secret".into())),
            pkcs5_compliant: false,
        };
        let c = SymmetricCipher::with_defaults(SymmetricOptions::default(), &defaults).unwrap();
        assert_eq!(c.algorithm(), BlockCipher::DesEde3Cfb);
        assert_eq!(c.encrypt("test").unwrap(), "QWz/eQ==\n");
    }

    #[test]
    fn unknown_algorithm_is_invalid_configuration() {
        let result = SymmetricCipher::with_defaults(
            SymmetricOptions {
                algorithm: Some("ROT13".into()),
                ..SymmetricOptions::with_password("secret")
            },
            &SymmetricDefaults::default(),
        );
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[rstest]
    #[case("DES-EDE3-CBC", "oTxJd67ElLY=\n")]
    #[case("des-ede3-cfb", "QWz/eQ==\n")]
    #[case("AES-256-CBC", "k0XRLag3RzZippD7cSnvcQ==\n")]
    fn legacy_derivation_matches_stored_values(#[case] algorithm: &str, #[case] golden: &str) {
        let c = cipher(SymmetricOptions {
            algorithm: Some(algorithm.into()),
            pkcs5_compliant: Some(false),
            ..SymmetricOptions::with_password("secret")
        });
        assert_eq!(c.encrypt("test").unwrap(), golden);
        assert_eq!(c.decrypt(golden).unwrap(), "test");
    }

    #[test]
    fn compliant_derivation_differs_from_legacy() {
        let compliant = cipher(SymmetricOptions {
            pkcs5_compliant: Some(true),
            ..SymmetricOptions::with_password("secret")
        });
        let encrypted = compliant.encrypt("test").unwrap();
        assert_eq!(encrypted, "NLc9OWSuE4A=\n");
        assert_ne!(encrypted, "oTxJd67ElLY=\n");
        assert_eq!(compliant.decrypt(&encrypted).unwrap(), "test");
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn round_trips(#[case] pkcs5_compliant: bool) {
        let c = cipher(SymmetricOptions {
            pkcs5_compliant: Some(pkcs5_compliant),
            ..SymmetricOptions::with_password("secret")
        });
        for plaintext in ["", "shhhh", "ünïcödé ✓", &"x".repeat(500)] {
            let encrypted = c.encrypt(plaintext).unwrap();
            assert_eq!(c.decrypt(&encrypted).unwrap(), plaintext);
        }
    }

    #[test]
    fn ecb_mode_round_trips_without_iv() {
        let c = cipher(SymmetricOptions {
            algorithm: Some("AES-128-ECB".into()),
            ..SymmetricOptions::with_password("secret")
        });
        let encrypted = c.encrypt("sixteen byte msg").unwrap();
        assert_eq!(c.decrypt(&encrypted).unwrap(), "sixteen byte msg");
    }

    #[test]
    fn wrong_password_fails_padding_check() {
        let c = cipher(SymmetricOptions::with_password("wrong"));
        assert!(matches!(
            c.decrypt("oTxJd67ElLY=\n"),
            Err(Error::DecryptionFailed(_))
        ));
    }

    #[test]
    fn corrupt_base64_fails() {
        let c = cipher(SymmetricOptions::with_password("secret"));
        assert!(matches!(c.decrypt("%%%"), Err(Error::DecryptionFailed(_))));
    }

    #[test]
    fn provider_password_is_read_on_every_call() {
        let current = Arc::new(Mutex::new(Some("secret".to_string())));
        let shared = Arc::clone(&current);
        let c = cipher(SymmetricOptions::with_password(Password::provider(move || {
            shared.lock().unwrap().clone()
        })));

        assert_eq!(c.encrypt("test").unwrap(), "oTxJd67ElLY=\n");

        *current.lock().unwrap() = Some("other".into());
        assert_ne!(c.encrypt("test").unwrap(), "oTxJd67ElLY=\n");

        *current.lock().unwrap() = None;
        assert!(matches!(c.encrypt("test"), Err(Error::MissingPassword)));
    }

    #[test]
    fn debug_output_redacts_password() {
        let c = cipher(SymmetricOptions::with_password("hunter2"));
        let debug = format!("{c:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn options_deserialize_from_json() {
        let options: SymmetricOptions = serde_json::from_value(serde_json::json!({
            "algorithm": "DES-EDE3-CFB",
            "password": "secret",
        }))
        .unwrap();
        assert_eq!(cipher(options).encrypt("test").unwrap(), "QWz/eQ==\n");

        let unknown: std::result::Result<SymmetricOptions, _> =
            serde_json::from_value(serde_json::json!({ "key": "secret" }));
        assert!(unknown.is_err());
    }
}
