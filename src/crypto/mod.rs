//! Field-level encryption for sensitive student data.
//!
//! Sensitive columns (email, phone number) are stored as `hex(iv):hex(ciphertext)`
//! tokens under AES-256-CBC with a fresh random IV per encryption. Values written
//! before encryption was introduced carry no `:` separator and are passed through
//! unchanged, so old databases keep working after the migration.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

use crate::errors::AppError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;
/// AES block size; the IV is always this long.
const IV_LEN: usize = 16;

/// A stored field value, classified by the presence of the `iv:ciphertext` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldToken {
    /// Well-formed encrypted token: decoded IV and ciphertext bytes.
    Encrypted { iv: [u8; IV_LEN], ciphertext: Vec<u8> },
    /// Anything else: plaintext written before encryption was introduced,
    /// or a token too mangled to decode.
    Legacy,
}

impl FieldToken {
    /// Classify a stored value. Only a value with a `:` separator, valid hex on
    /// both sides and a 16-byte IV qualifies as encrypted.
    pub fn parse(raw: &str) -> FieldToken {
        let Some((iv_hex, ct_hex)) = raw.split_once(':') else {
            return FieldToken::Legacy;
        };
        match (hex::decode(iv_hex), hex::decode(ct_hex)) {
            (Ok(iv), Ok(ciphertext)) => match <[u8; IV_LEN]>::try_from(iv) {
                Ok(iv) => FieldToken::Encrypted { iv, ciphertext },
                Err(_) => FieldToken::Legacy,
            },
            _ => FieldToken::Legacy,
        }
    }
}

/// Symmetric codec for individual string fields.
#[derive(Clone)]
pub struct FieldCodec {
    key: [u8; KEY_LEN],
}

impl FieldCodec {
    /// Create a codec from a pre-shared key. The key must be exactly 32 bytes.
    pub fn new(key: &str) -> Result<Self, AppError> {
        let key: [u8; KEY_LEN] = key.as_bytes().try_into().map_err(|_| {
            AppError::Internal(format!(
                "Encryption key must be exactly {} bytes, got {}",
                KEY_LEN,
                key.len()
            ))
        })?;
        Ok(Self { key })
    }

    /// Encrypt a field value into an `iv:ciphertext` token.
    ///
    /// Every call draws a fresh random IV, so encrypting the same plaintext
    /// twice yields two different tokens. Empty input passes through unchanged.
    pub fn encrypt(&self, plaintext: &str) -> String {
        if plaintext.is_empty() {
            return String::new();
        }
        let mut iv = [0u8; IV_LEN];
        rand::rngs::OsRng.fill_bytes(&mut iv);
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
    }

    /// Decrypt a stored value back to its plaintext.
    ///
    /// Legacy plaintext (no separator) is returned unmodified. Any decryption
    /// failure (wrong key, corrupted bytes, bad padding) also returns the stored
    /// value unchanged; callers must treat an unchanged token as undecryptable
    /// and render it as given, never as a recovered plaintext.
    pub fn decrypt(&self, stored: &str) -> String {
        let FieldToken::Encrypted { iv, ciphertext } = FieldToken::parse(stored) else {
            return stored.to_string();
        };
        let plaintext = Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext);
        match plaintext {
            Ok(bytes) => String::from_utf8(bytes).unwrap_or_else(|_| stored.to_string()),
            Err(_) => stored.to_string(),
        }
    }

    /// Encrypt an optional field, leaving `None` and empty values untouched.
    pub fn encrypt_opt(&self, value: Option<&str>) -> Option<String> {
        value.filter(|v| !v.is_empty()).map(|v| self.encrypt(v))
    }

    /// Decrypt an optional stored field.
    pub fn decrypt_opt(&self, value: Option<String>) -> Option<String> {
        value.map(|v| self.decrypt(&v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ENCRYPTION_KEY;

    fn codec() -> FieldCodec {
        FieldCodec::new(DEFAULT_ENCRYPTION_KEY).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();
        for plaintext in ["a", "student@correo.com", "999-555-123", "ñandú tildes"] {
            let token = codec.encrypt(plaintext);
            assert_ne!(token, plaintext);
            assert_eq!(codec.decrypt(&token), plaintext);
        }
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let codec = codec();
        let a = codec.encrypt("same input");
        let b = codec.encrypt("same input");
        assert_ne!(a, b);
        assert_eq!(codec.decrypt(&a), "same input");
        assert_eq!(codec.decrypt(&b), "same input");
    }

    #[test]
    fn test_token_shape() {
        let token = codec().encrypt("hello");
        let (iv_hex, ct_hex) = token.split_once(':').unwrap();
        assert_eq!(iv_hex.len(), IV_LEN * 2);
        assert!(!ct_hex.is_empty());
        assert!(matches!(
            FieldToken::parse(&token),
            FieldToken::Encrypted { .. }
        ));
    }

    #[test]
    fn test_empty_passes_through() {
        let codec = codec();
        assert_eq!(codec.encrypt(""), "");
        assert_eq!(codec.decrypt(""), "");
        assert_eq!(codec.encrypt_opt(None), None);
        assert_eq!(codec.encrypt_opt(Some("")), None);
    }

    #[test]
    fn test_legacy_plaintext_tolerance() {
        let codec = codec();
        assert_eq!(codec.decrypt("plain-value-without-colon"), "plain-value-without-colon");
        // A colon alone does not make a token: both sides must be valid hex.
        assert_eq!(codec.decrypt("user:name"), "user:name");
        assert_eq!(FieldToken::parse("user:name"), FieldToken::Legacy);
    }

    #[test]
    fn test_tamper_tolerance() {
        let codec = codec();
        let token = codec.encrypt("confidential");
        // Flip ciphertext bytes while keeping valid hex.
        let (iv_hex, ct_hex) = token.split_once(':').unwrap();
        let corrupted_ct: String = ct_hex
            .chars()
            .map(|c| if c == 'a' { 'b' } else { 'a' })
            .collect();
        let corrupted = format!("{}:{}", iv_hex, corrupted_ct);
        assert_eq!(codec.decrypt(&corrupted), corrupted);
    }

    #[test]
    fn test_wrong_key_returns_token() {
        let token = codec().encrypt("secret");
        let other = FieldCodec::new("otra-clave-distinta-de-32-bytes!").unwrap();
        // A wrong key must never recover the plaintext.
        assert_ne!(other.decrypt(&token), "secret");
    }

    #[test]
    fn test_key_length_enforced() {
        assert!(FieldCodec::new("short").is_err());
        assert!(FieldCodec::new(DEFAULT_ENCRYPTION_KEY).is_ok());
    }
}
