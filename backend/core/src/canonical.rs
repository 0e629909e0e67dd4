//! Text canonicalization and content hashing.
//!
//! OCR output for the same worksheet varies in width forms, line breaks and
//! spacing. Canonical text folds those differences so the prompt and the
//! `normalized_text_hash` only change when the content does.

use hex::ToHex;
use sha2::Digest;
use unicode_normalization::UnicodeNormalization;

/// NFKC-fold, collapse every whitespace run to one ASCII space, trim.
pub fn canonicalize(input: &str) -> String {
    let folded = input.nfkc().collect::<String>();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase hex SHA-256 of the UTF-8 bytes of `text`.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(text.as_bytes());
    hasher.finalize().encode_hex::<String>()
}

pub fn is_sha256_hex(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 64 {
        return false;
    }
    bytes.iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// True when canonical text carries at least one letter or digit.
pub fn has_content(canonical: &str) -> bool {
    canonical.chars().any(char::is_alphanumeric)
}

/// Both hashes carried into the response `debug` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalText {
    pub text: String,
    pub raw_hash: String,
    pub normalized_hash: String,
}

impl CanonicalText {
    pub fn from_raw(raw: &str) -> Self {
        let text = canonicalize(raw);
        let normalized_hash = sha256_hex(&text);
        Self {
            raw_hash: sha256_hex(raw),
            normalized_hash,
            text,
        }
    }
}
