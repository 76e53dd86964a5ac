//! Pluggable string encryption.
//!
//! Three strategies share the [`Cipher`] trait: a salted one-way
//! [`DigestCipher`], a password-based [`SymmetricCipher`] and an RSA
//! [`AsymmetricCipher`]. Encrypting produces an [`EncryptedValue`] that keeps
//! the cipher it came from, so it can later be decrypted or compared with
//! `==` against plaintext and other encrypted values (see [`equality`]).
//!
//! Ciphers read their defaults from [`cipherkit_config::defaults`] when they
//! are built, or from an explicit config through [`CipherFactory`].

pub mod asymmetric;
pub mod digest;
pub mod encoding;
pub mod equality;
pub mod error;
pub mod key_material;
pub mod strategy;
pub mod symmetric;
pub mod traits;
pub mod value;

pub use {
    asymmetric::{AsymmetricCipher, AsymmetricOptions, PublicKey},
    digest::{Builder, DigestAlgorithm, DigestCipher, DigestOptions, Salt, SaltSource},
    equality::values_equal,
    error::{Error, Result},
    key_material::KeyMaterial,
    strategy::{CipherFactory, CipherOptions, Strategy, decrypt, encrypt},
    symmetric::{BlockCipher, Password, SymmetricCipher, SymmetricOptions},
    traits::Cipher,
    value::EncryptedValue,
};
