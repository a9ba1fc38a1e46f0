//! Record identifier generation.
//!
//! Every stored record carries an opaque, server-generated identifier of the
//! form `<prefix>:<base64>`, where the base64 part encodes 16 random bytes in
//! the URL-safe alphabet. The prefix names the collection (`party:`,
//! `encounter:`, ...) so an identifier read out of a log or a URL is
//! self-describing. Identifiers are immutable once assigned.

use std::fs::File;
use std::io::Read;

/// Number of random bytes behind each identifier.
const ID_BYTES: usize = 16;

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn encode_base64_url_safe(input: &[u8]) -> String {
    let mut result = String::new();
    let mut i = 0;

    while i < input.len() {
        let b1 = input[i];
        let b2 = if i + 1 < input.len() { input[i + 1] } else { 0 };
        let b3 = if i + 2 < input.len() { input[i + 2] } else { 0 };

        let combined = ((b1 as u32) << 16) | ((b2 as u32) << 8) | (b3 as u32);

        result.push(BASE64_CHARS[((combined >> 18) & 0x3F) as usize] as char);
        result.push(BASE64_CHARS[((combined >> 12) & 0x3F) as usize] as char);

        if i + 1 < input.len() {
            result.push(BASE64_CHARS[((combined >> 6) & 0x3F) as usize] as char);
        }

        if i + 2 < input.len() {
            result.push(BASE64_CHARS[(combined & 0x3F) as usize] as char);
        }

        i += 3;
    }

    result
}

/// Generates a fresh identifier for the given collection prefix.
///
/// Randomness comes from `/dev/urandom`; an I/O failure there is surfaced to
/// the caller rather than silently degrading to a predictable id.
pub fn generate(prefix: &str) -> std::io::Result<String> {
    let mut random_bytes = [0u8; ID_BYTES];
    File::open("/dev/urandom")?.read_exact(&mut random_bytes)?;
    Ok(format!("{}:{}", prefix, encode_base64_url_safe(&random_bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_known_vector() {
        // 3 zero bytes -> "AAAA", 16 zero bytes -> 22 chars, no padding
        assert_eq!(encode_base64_url_safe(&[0u8; 3]), "AAAA");
        assert_eq!(encode_base64_url_safe(&[0u8; 16]).len(), 22);
        assert_eq!(
            encode_base64_url_safe(&[0u8; 16]),
            "AAAAAAAAAAAAAAAAAAAAAA"
        );
    }

    #[test]
    fn encode_uses_url_safe_alphabet() {
        let encoded = encode_base64_url_safe(&[0xFC, 0xFF, 0xFE, 0xFD]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        for c in encoded.chars() {
            assert!(c.is_ascii_alphanumeric() || c == '-' || c == '_');
        }
    }

    #[test]
    fn generate_has_prefix_and_length() {
        let id = generate("party").unwrap();
        assert!(id.starts_with("party:"));
        assert_eq!(id.len(), "party:".len() + 22);
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = generate("issue").unwrap();
        let b = generate("issue").unwrap();
        assert_ne!(a, b);
    }
}
