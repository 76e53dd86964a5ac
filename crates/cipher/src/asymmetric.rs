//! RSA key pair strategy.
//!
//! Data is encrypted with the public key and decrypted with the private key,
//! or the other way round when `encrypt_with_private` is set. Keys are PEM,
//! given inline or as file paths. The private key file may itself be stored
//! as symmetric ciphertext, in which case a password (and optionally a block
//! cipher algorithm) unlocks it.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use {
    cipherkit_config::{CipherConfig, defaults},
    openssl::{
        error::ErrorStack,
        pkey::{Private, Public},
        rsa::{Padding, Rsa},
    },
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Deserializer},
    zeroize::Zeroizing,
};

use crate::{
    encoding,
    error::{Error, Result},
    key_material::KeyMaterial,
    strategy::Strategy,
    symmetric::{Password, SymmetricCipher, SymmetricOptions},
    traits::Cipher,
};

/// Where the public key comes from when it is given explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// Inline PEM.
    Pem(String),
    /// Computed from the private key.
    Derived,
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(if s == "derived" {
            Self::Derived
        } else {
            Self::Pem(s)
        })
    }
}

/// Options for [`AsymmetricCipher`]. Unset key files fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AsymmetricOptions {
    pub public_key: Option<PublicKey>,
    pub private_key: Option<Secret<String>>,
    pub public_key_file: Option<PathBuf>,
    pub private_key_file: Option<PathBuf>,
    /// Block cipher the private key file is encrypted with.
    pub algorithm: Option<String>,
    /// Password the private key file is encrypted with.
    pub password: Option<Password>,
    #[serde(default)]
    pub encrypt_with_private: bool,
}

enum PublicSource {
    None,
    Material(KeyMaterial),
    Derived,
}

/// Reversible cipher backed by an RSA key pair.
pub struct AsymmetricCipher {
    public: PublicSource,
    private: Option<KeyMaterial>,
    public_key_file: Option<PathBuf>,
    private_key_file: Option<PathBuf>,
    algorithm: Option<String>,
    /// Unlocks the private key file when it is stored encrypted.
    protection: Option<SymmetricCipher>,
    encrypt_with_private: bool,
    public_rsa: OnceLock<Rsa<Public>>,
    private_rsa: OnceLock<Rsa<Private>>,
}

impl AsymmetricCipher {
    /// Build from `options`, falling back to the process-wide defaults.
    pub fn new(options: AsymmetricOptions) -> Result<Self> {
        Self::with_config(options, &defaults::current())
    }

    pub fn with_config(options: AsymmetricOptions, config: &CipherConfig) -> Result<Self> {
        let defaults = &config.asymmetric;
        let public_key_file = options
            .public_key_file
            .or_else(|| defaults.public_key_file.as_ref().map(PathBuf::from));
        let private_key_file = options
            .private_key_file
            .or_else(|| defaults.private_key_file.as_ref().map(PathBuf::from));

        if options.public_key.is_none()
            && options.private_key.is_none()
            && public_key_file.is_none()
            && private_key_file.is_none()
        {
            return Err(Error::invalid(concat!(
                "at least one of public_key, private_key, public_key_file or ",
                "private_key_file must be specified"
            )));
        }

        let public = match options.public_key {
            Some(PublicKey::Derived) => PublicSource::Derived,
            Some(PublicKey::Pem(pem)) => PublicSource::Material(KeyMaterial::inline(pem)),
            None => match &public_key_file {
                Some(path) => PublicSource::Material(KeyMaterial::file(path)),
                None => PublicSource::None,
            },
        };
        let private = match options.private_key {
            Some(pem) => Some(KeyMaterial::inline(pem.expose_secret().as_bytes())),
            None => private_key_file.as_ref().map(KeyMaterial::file),
        };

        let algorithm = options.algorithm.or_else(|| defaults.algorithm.clone());
        let password = options
            .password
            .or_else(|| defaults.password.clone().map(Password::Literal));
        let protection = password
            .map(|password| {
                SymmetricCipher::with_defaults(
                    SymmetricOptions {
                        algorithm: algorithm.clone(),
                        password: Some(password),
                        pkcs5_compliant: None,
                    },
                    &config.symmetric,
                )
            })
            .transpose()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            public_key_file = ?public_key_file,
            private_key_file = ?private_key_file,
            protected = protection.is_some(),
            encrypt_with_private = options.encrypt_with_private,
            "asymmetric cipher configured"
        );

        Ok(Self {
            public,
            private,
            public_key_file,
            private_key_file,
            algorithm,
            protection,
            encrypt_with_private: options.encrypt_with_private,
            public_rsa: OnceLock::new(),
            private_rsa: OnceLock::new(),
        })
    }

    pub fn public_key_file(&self) -> Option<&Path> {
        self.public_key_file.as_deref()
    }

    pub fn private_key_file(&self) -> Option<&Path> {
        self.private_key_file.as_deref()
    }

    /// Algorithm protecting the private key file, if one was configured.
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    /// Whether the private key file is expected to be password protected.
    pub fn has_password(&self) -> bool {
        self.protection.is_some()
    }

    pub fn encrypts_with_private(&self) -> bool {
        self.encrypt_with_private
    }

    /// Whether a public key is currently resolvable.
    pub fn public(&self) -> bool {
        match &self.public {
            PublicSource::None => false,
            PublicSource::Material(material) => material.is_available(),
            PublicSource::Derived => self.private(),
        }
    }

    /// Whether a private key is currently resolvable.
    pub fn private(&self) -> bool {
        self.private.as_ref().is_some_and(KeyMaterial::is_available)
    }

    fn no_public_key(&self) -> Error {
        Error::NoPublicKey {
            file: self.public_key_file.clone(),
        }
    }

    fn no_private_key(&self) -> Error {
        Error::NoPrivateKey {
            file: self.private_key_file.clone(),
        }
    }

    fn private_rsa(&self) -> Result<Rsa<Private>> {
        if let Some(rsa) = self.private_rsa.get() {
            return Ok(rsa.clone());
        }
        let pem = self
            .private
            .as_ref()
            .and_then(KeyMaterial::load)
            .ok_or_else(|| self.no_private_key())?;

        match &self.protection {
            // The password may come from a provider, so the unlocked key is
            // not kept around.
            Some(cipher) => {
                let text = std::str::from_utf8(pem).map_err(|_| {
                    Error::DecryptionFailed("protected private key is not base64 text".into())
                })?;
                let unlocked = cipher.decrypt_bytes(&encoding::decode(text)?)?;
                Rsa::private_key_from_pem(unlocked.as_slice()).map_err(|_| {
                    Error::DecryptionFailed("wrong password for protected private key".into())
                })
            },
            None => {
                let rsa = parse_private(pem)?;
                Ok(self.private_rsa.get_or_init(|| rsa).clone())
            },
        }
    }

    fn public_rsa(&self) -> Result<Rsa<Public>> {
        if let Some(rsa) = self.public_rsa.get() {
            return Ok(rsa.clone());
        }
        let rsa = match &self.public {
            PublicSource::None => return Err(self.no_public_key()),
            PublicSource::Material(material) => {
                parse_public(material.load().ok_or_else(|| self.no_public_key())?)?
            },
            PublicSource::Derived => {
                if !self.private() {
                    return Err(self.no_public_key());
                }
                let private = self.private_rsa()?;
                derive_public(&private)
                    .map_err(|e| Error::invalid(format!("cannot derive public key: {e}")))?
            },
        };
        Ok(self.public_rsa.get_or_init(|| rsa).clone())
    }
}

fn parse_private(pem: &[u8]) -> Result<Rsa<Private>> {
    Rsa::private_key_from_pem(pem)
        .map_err(|e| Error::invalid(format!("private key is not a valid RSA PEM key: {e}")))
}

/// Accepts SubjectPublicKeyInfo (`BEGIN PUBLIC KEY`) and PKCS#1 (`BEGIN RSA PUBLIC KEY`).
fn parse_public(pem: &[u8]) -> Result<Rsa<Public>> {
    Rsa::public_key_from_pem(pem)
        .or_else(|_| Rsa::public_key_from_pem_pkcs1(pem))
        .map_err(|e| Error::invalid(format!("public key is not a valid RSA PEM key: {e}")))
}

fn derive_public(private: &Rsa<Private>) -> std::result::Result<Rsa<Public>, ErrorStack> {
    Rsa::from_public_components(private.n().to_owned()?, private.e().to_owned()?)
}

/// Run an RSA transform into a modulus-sized buffer.
fn transform(
    size: u32,
    op: impl FnOnce(&mut [u8]) -> std::result::Result<usize, ErrorStack>,
) -> std::result::Result<Zeroizing<Vec<u8>>, ErrorStack> {
    let mut buf = Zeroizing::new(vec![0u8; size as usize]);
    let len = op(buf.as_mut_slice())?;
    buf.truncate(len);
    Ok(buf)
}

impl fmt::Debug for AsymmetricCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsymmetricCipher")
            .field("public_key_file", &self.public_key_file)
            .field("private_key_file", &self.private_key_file)
            .field("algorithm", &self.algorithm)
            .field("has_password", &self.has_password())
            .field("encrypt_with_private", &self.encrypt_with_private)
            .finish_non_exhaustive()
    }
}

impl Cipher for AsymmetricCipher {
    fn strategy(&self) -> Strategy {
        Strategy::Asymmetric
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let data = plaintext.as_bytes();
        let encrypted = if self.encrypt_with_private {
            let rsa = self.private_rsa()?;
            transform(rsa.size(), |buf| rsa.private_encrypt(data, buf, Padding::PKCS1))
        } else {
            let rsa = self.public_rsa()?;
            transform(rsa.size(), |buf| rsa.public_encrypt(data, buf, Padding::PKCS1))
        }
        .map_err(|e| Error::EncryptionFailed(format!("RSA encryption failed: {e}")))?;
        Ok(encoding::encode(&encrypted))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let data = encoding::decode(ciphertext)?;
        let decrypted = if self.encrypt_with_private {
            let rsa = self.public_rsa()?;
            transform(rsa.size(), |buf| rsa.public_decrypt(&data, buf, Padding::PKCS1))
        } else {
            let rsa = self.private_rsa()?;
            // OpenSSL 3.2+ applies implicit rejection to PKCS#1 v1.5: a wrong
            // key or tampered ciphertext may decrypt to random bytes instead of
            // failing. Those bytes usually fail the UTF-8 check below, but not
            // always.
            transform(rsa.size(), |buf| rsa.private_decrypt(&data, buf, Padding::PKCS1))
        }
        .map_err(|e| Error::DecryptionFailed(format!("RSA decryption failed: {e}")))?;
        String::from_utf8(decrypted.to_vec())
            .map_err(|_| Error::DecryptionFailed("decrypted data is not valid UTF-8".into()))
    }
}
