#![allow(clippy::unwrap_used, clippy::expect_used)]
use {
    cipherkit_config::{CipherConfig, defaults, load_config},
    secrecy::{ExposeSecret, Secret},
};

#[test]
fn install_update_and_reset() {
    defaults::reset();
    let built_in = defaults::current();
    assert_eq!(built_in.digest.algorithm, "SHA1");
    assert_eq!(built_in.digest.salt, "salt");
    assert_eq!(built_in.symmetric.algorithm, "DES-EDE3-CBC");
    assert!(built_in.symmetric.password.is_none());
    assert!(!built_in.symmetric.pkcs5_compliant);
    assert!(built_in.asymmetric.public_key_file.is_none());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cipherkit.yaml");
    std::fs::write(
        &path,
        "digest:\n  salt: pepper\nsymmetric:\n  password: hunter2\n  pkcs5_compliant: true\n",
    )
    .unwrap();
    defaults::install(load_config(&path).unwrap());

    let snapshot = defaults::current();
    assert_eq!(snapshot.digest.salt, "pepper");
    assert_eq!(snapshot.digest.algorithm, "SHA1");
    assert_eq!(
        snapshot.symmetric.password.as_ref().unwrap().expose_secret(),
        "hunter2"
    );
    assert!(snapshot.symmetric.pkcs5_compliant);

    defaults::update(|cfg| {
        cfg.asymmetric.private_key_file = Some("/keys/private.pem".into());
        cfg.asymmetric.password = Some(Secret::new("secret".into()));
    });
    let updated = defaults::current();
    assert_eq!(
        updated.asymmetric.private_key_file.as_deref(),
        Some("/keys/private.pem")
    );
    // Snapshots taken earlier are unaffected.
    assert!(snapshot.asymmetric.private_key_file.is_none());

    defaults::reset();
    let reset = defaults::current();
    assert!(reset.symmetric.password.is_none());
    assert_eq!(reset.digest.salt, CipherConfig::default().digest.salt);
}
