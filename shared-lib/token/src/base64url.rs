//! URL-safe base64 without padding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode bytes as base64url with the trailing `=` stripped.
pub fn encode(data: impl AsRef<[u8]>) -> String {
    STANDARD
        .encode(data)
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect()
}

/// Decode base64url text, restoring any padding that was stripped.
pub fn decode(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let padding = (4 - data.len() % 4) % 4;
    let mut standard = String::with_capacity(data.len() + padding);
    standard.extend(data.chars().map(|c| match c {
        '-' => '+',
        '_' => '/',
        c => c,
    }));
    standard.extend(std::iter::repeat('=').take(padding));

    STANDARD.decode(standard)
}
