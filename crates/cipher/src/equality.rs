//! Logical equality between plain and encrypted values.
//!
//! Two values are equal when their text is identical. Otherwise, if at least
//! one side carries a cipher, the comparison crosses at most one encryption
//! boundary per side:
//!
//! - a reversible value is decrypted and its plaintext compared;
//! - a one-way value is compared by encrypting the candidate plaintext with
//!   the same cipher instance and comparing ciphertexts.
//!
//! A value encrypted twice is therefore equal to the once-encrypted value but
//! not to the original plaintext.

use crate::{error::Result, value::EncryptedValue};

/// Whether `plain` is the plaintext behind `encrypted`.
///
/// `encrypted` must carry a cipher.
pub(crate) fn is_string_equal(plain: &str, encrypted: &EncryptedValue) -> Result<bool> {
    if encrypted.can_decrypt() {
        Ok(encrypted.decrypt_raw()? == plain)
    } else {
        Ok(encrypted.reencrypt(plain)? == encrypted.raw())
    }
}

/// Whether decrypting `reversible` yields the plaintext behind `other`.
fn decrypted_equal(reversible: &EncryptedValue, other: &EncryptedValue) -> Result<bool> {
    if !reversible.can_decrypt() {
        return Ok(false);
    }
    is_string_equal(&reversible.decrypt_raw()?, other)
}

/// Fallible form of `a == b`.
///
/// When both sides are encrypted every check is tried in turn and the first
/// success wins, so the result does not depend on argument order. An error
/// from the underlying ciphers (a missing key, corrupt ciphertext) is
/// returned only if no check succeeded.
pub fn values_equal(a: &EncryptedValue, b: &EncryptedValue) -> Result<bool> {
    if a.raw() == b.raw() {
        return Ok(true);
    }
    match (a.is_encrypted(), b.is_encrypted()) {
        (false, false) => Ok(false),
        (true, false) => is_string_equal(b.raw(), a),
        (false, true) => is_string_equal(a.raw(), b),
        (true, true) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                left = %a.cipher().map_or("none", |c| c.strategy().as_str()),
                right = %b.cipher().map_or("none", |c| c.strategy().as_str()),
                "comparing two encrypted values"
            );
            let checks: [&dyn Fn() -> Result<bool>; 4] = [
                &|| is_string_equal(a.raw(), b),
                &|| is_string_equal(b.raw(), a),
                &|| decrypted_equal(a, b),
                &|| decrypted_equal(b, a),
            ];
            let mut first_error = None;
            for check in checks {
                match check() {
                    Ok(true) => return Ok(true),
                    Ok(false) => {},
                    Err(e) => {
                        first_error.get_or_insert(e);
                    },
                }
            }
            first_error.map_or(Ok(false), Err)
        },
    }
}
