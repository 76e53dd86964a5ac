#![allow(clippy::unwrap_used, clippy::expect_used)]
use {
    cipherkit_cipher::{
        AsymmetricOptions, CipherFactory, CipherOptions, DigestOptions, EncryptedValue, Strategy,
        SymmetricOptions, values_equal,
    },
    rstest::rstest,
    std::path::Path,
};

fn factory() -> CipherFactory {
    CipherFactory::default()
}

fn options(strategy: Strategy) -> CipherOptions {
    match strategy {
        Strategy::Symmetric => SymmetricOptions::with_password("secret").into(),
        _ => DigestOptions::default().into(),
    }
}

#[test]
fn digest_value_equals_original_plaintext() {
    let value = factory()
        .encrypt("shhhh", DigestOptions::with_salt("secret"))
        .unwrap();
    assert_eq!(value.raw(), "3b22cbe4acde873c3efc82681096f3ae69aff828");
    assert!(value == "shhhh");
    assert!("shhhh" == value);
    assert!(value != "shhh");
}

#[rstest]
#[case(Strategy::Digest)]
#[case(Strategy::Symmetric)]
fn equal_to_itself_and_its_plaintext(#[case] strategy: Strategy) {
    let value = factory().encrypt("test", options(strategy)).unwrap();
    assert!(value == value.clone());
    assert!(value == "test");
    assert!("test" == value);
}

#[rstest]
#[case(Strategy::Digest)]
#[case(Strategy::Symmetric)]
fn equal_to_stored_copy_of_its_ciphertext(#[case] strategy: Strategy) {
    let value = factory().encrypt("test", options(strategy)).unwrap();
    let stored = value.to_string();
    assert!(value == stored);
    assert!(stored == value);
}

#[rstest]
#[case(Strategy::Digest)]
#[case(Strategy::Symmetric)]
fn one_encryption_hop_at_most(#[case] strategy: Strategy) {
    let once = factory().encrypt("test", options(strategy)).unwrap();
    let twice = once.encrypt(options(strategy)).unwrap();

    assert!(once == twice);
    assert!(twice == once);

    assert!(twice != "test");
    assert!("test" != twice);
}

#[test]
fn independently_encrypted_symmetric_values_are_equal() {
    let a = factory()
        .encrypt("test", SymmetricOptions::with_password("secret"))
        .unwrap();
    let b = factory()
        .encrypt("test", SymmetricOptions::with_password("secret"))
        .unwrap();
    assert!(a == b);
    assert!(a == "test" && b == "test");
}

#[test]
fn stored_ciphertext_alone_is_just_a_string() {
    let stored = EncryptedValue::plain("oTxJd67ElLY=\n");
    assert!(!stored.is_encrypted());
    assert!(!stored.can_decrypt());
    assert!(stored != "test");
    assert!(!values_equal(&stored, &EncryptedValue::plain("test")).unwrap());

    let decrypted = stored
        .decrypt_with(SymmetricOptions::with_password("secret"))
        .unwrap();
    assert!(decrypted == "test");
}

#[test]
fn different_passwords_still_compare_by_plaintext() {
    let value = factory()
        .encrypt("test", SymmetricOptions::with_password("secret"))
        .unwrap();
    let other = factory()
        .encrypt("test", SymmetricOptions::with_password("another"))
        .unwrap();
    // Each side decrypts with its own cipher, so both still resolve to "test".
    assert!(value == other);
    assert!(value != "tset");
}

#[test]
fn equality_is_symmetric_when_one_side_cannot_decrypt() {
    let public_only = AsymmetricOptions {
        public_key_file: Some(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/keys/public.pem"),
        ),
        ..AsymmetricOptions::default()
    };
    let sealed = factory().encrypt("test", public_only).unwrap();
    let hashed = sealed.encrypt(DigestOptions::default()).unwrap();

    assert!(values_equal(&hashed, &sealed).unwrap());
    assert!(values_equal(&sealed, &hashed).unwrap());
    assert!(hashed == sealed);
    assert!(sealed == hashed);
}
