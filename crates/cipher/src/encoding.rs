//! Text encoding of binary ciphertext.
//!
//! Ciphertext is stored as MIME-style base64: standard alphabet, at most 60
//! characters per line, every line terminated by `\n`. This is the format
//! previously stored values were written in, so it must not change.

use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose},
};

use crate::error::{Error, Result};

const LINE_LEN: usize = 60;

const STRICT: GeneralPurpose = general_purpose::STANDARD;

/// Decoder that accepts input with or without trailing `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as newline-wrapped base64.
pub fn encode(bytes: &[u8]) -> String {
    let flat = STRICT.encode(bytes);
    let mut out = String::with_capacity(flat.len() + flat.len() / LINE_LEN + 1);
    // base64 output is ASCII, so every byte offset is a char boundary.
    for start in (0..flat.len()).step_by(LINE_LEN) {
        out.push_str(&flat[start..flat.len().min(start + LINE_LEN)]);
        out.push('\n');
    }
    out
}

/// Decode newline-wrapped base64. Embedded whitespace is ignored.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT
        .decode(compact)
        .map_err(|e| Error::DecryptionFailed(format!("invalid base64 ciphertext: {e}")))
}
