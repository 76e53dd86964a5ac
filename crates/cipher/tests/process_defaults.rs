#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Everything here touches the process-wide defaults, so it runs as one test.
use {
    cipherkit_cipher::{
        DigestCipher, DigestOptions, EncryptedValue, Error, Strategy, SymmetricCipher,
        SymmetricOptions, decrypt, encrypt,
    },
    cipherkit_config::defaults,
    secrecy::Secret,
    serde_json::{Value, json},
};

#[test]
fn ciphers_read_defaults_at_construction() {
    defaults::reset();

    // Digest is the default strategy and uses the built-in salt.
    let value = encrypt("test", "sha", Value::Null).unwrap();
    assert_eq!(value.raw(), "f438229716cab43569496f3a3630b3727524b81b");
    assert_eq!(value.cipher().unwrap().strategy(), Strategy::Digest);

    // No default password yet.
    assert!(matches!(
        encrypt("test", "symmetric", Value::Null),
        Err(Error::MissingPassword)
    ));

    defaults::update(|cfg| {
        cfg.digest.salt = "secret".into();
        cfg.symmetric.password = Some(Secret::new("secret".into()));
    });

    let before_change = DigestCipher::new(DigestOptions::default()).unwrap();
    assert_eq!(before_change.salt(), "secret");

    let value = encrypt("test", "symmetrically", Value::Null).unwrap();
    assert_eq!(value.raw(), "oTxJd67ElLY=\n");
    assert_eq!(
        decrypt("oTxJd67ElLY=\n", "symmetric", Value::Null)
            .unwrap()
            .raw(),
        "test"
    );

    let shhhh = EncryptedValue::plain("shhhh").encrypt(Strategy::Digest).unwrap();
    assert_eq!(shhhh.raw(), "3b22cbe4acde873c3efc82681096f3ae69aff828");

    // Later changes leave existing ciphers alone.
    defaults::update(|cfg| cfg.digest.salt = "changed".into());
    assert_eq!(before_change.salt(), "secret");
    assert!(shhhh == "shhhh");

    // A bad default algorithm surfaces at construction.
    defaults::update(|cfg| cfg.symmetric.algorithm = "NOT-A-CIPHER".into());
    assert!(matches!(
        SymmetricCipher::new(SymmetricOptions::default()),
        Err(Error::InvalidConfiguration(_))
    ));
    let explicit = SymmetricCipher::new(SymmetricOptions {
        algorithm: Some("DES-EDE3-CFB".into()),
        ..SymmetricOptions::default()
    })
    .unwrap();
    assert_eq!(explicit.algorithm().name(), "DES-EDE3-CFB");

    // Options override defaults, and unknown keys are rejected.
    let value = encrypt(
        "test",
        "symmetric",
        json!({ "algorithm": "DES-EDE3-CFB", "password": "secret" }),
    )
    .unwrap();
    assert_eq!(value.raw(), "QWz/eQ==\n");
    assert!(matches!(
        encrypt("test", "digest", json!({ "pepper": "x" })),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        encrypt("test", "rot13", Value::Null),
        Err(Error::InvalidConfiguration(_))
    ));

    defaults::reset();
    assert!(matches!(
        SymmetricCipher::new(SymmetricOptions::default()),
        Err(Error::MissingPassword)
    ));
}
