//! Credential encryption at rest.
//!
//! Secrets are sealed with AES-256-GCM under a key derived from the configured
//! secret with Argon2, and encoded as `iv:authTag:ciphertext` (each part hex).

use std::fmt;

use argon2::Argon2;
use zeroize::Zeroizing;

use crate::crypto::aes::{self, Sealed, SecureKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::error::{AppError, Result};
use crate::models::credentials::Credentials;

/// Fixed application salt for key derivation. Changing it invalidates every stored secret.
const KEY_DERIVATION_SALT: &[u8] = b"sge-bridge/credential-cipher/v1";

/// Derives a key from a secret and salt using Argon2.
fn derive_key(secret: &str, salt: &[u8]) -> Result<SecureKey> {
    let mut key = [0u8; KEY_SIZE];
    Argon2::default()
        .hash_password_into(secret.as_bytes(), salt, &mut key)
        .map_err(|e| AppError::Internal(format!("Argon2 key derivation error: {}", e)))?;
    Ok(SecureKey::new(key))
}

/// An encoded `iv:authTag:ciphertext` string. Opaque outside this module.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedSecret(String);

impl EncryptedSecret {
    /// Wraps an encoded string without validating it; [`CredentialCipher::decrypt`] does that.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the secret and returns the encoded form.
    pub fn into_string(self) -> String {
        self.0
    }

    fn encode(sealed: &Sealed) -> Self {
        Self(format!(
            "{}:{}:{}",
            hex::encode(sealed.nonce),
            hex::encode(sealed.tag),
            hex::encode(&sealed.ciphertext)
        ))
    }

    fn decode(&self) -> Result<Sealed> {
        let mut parts = self.0.split(':');
        let (Some(iv), Some(tag), Some(ciphertext), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::Format("expected three colon-separated parts".to_string()));
        };

        let nonce: [u8; NONCE_SIZE] = hex::decode(iv)
            .map_err(|e| AppError::Format(format!("iv is not hex: {}", e)))?
            .try_into()
            .map_err(|_| AppError::Format(format!("iv must be {} bytes", NONCE_SIZE)))?;

        let tag: [u8; TAG_SIZE] = hex::decode(tag)
            .map_err(|e| AppError::Format(format!("auth tag is not hex: {}", e)))?
            .try_into()
            .map_err(|_| AppError::Format(format!("auth tag must be {} bytes", TAG_SIZE)))?;

        let ciphertext = hex::decode(ciphertext)
            .map_err(|e| AppError::Format(format!("ciphertext is not hex: {}", e)))?;

        Ok(Sealed {
            nonce,
            tag,
            ciphertext,
        })
    }
}

impl fmt::Display for EncryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EncryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncryptedSecret").field(&"[OPAQUE]").finish()
    }
}

/// Encrypts and decrypts credentials for storage.
///
/// The key is derived once on construction; Argon2 is deliberately slow.
pub struct CredentialCipher {
    key: SecureKey,
}

impl CredentialCipher {
    /// Creates a new `CredentialCipher` from the configured secret.
    ///
    /// # Arguments
    ///
    /// * `secret` - The configured secret the key is derived from.
    pub fn new(secret: &str) -> Result<Self> {
        let key = derive_key(secret, KEY_DERIVATION_SALT)?;
        Ok(Self { key })
    }

    /// Encrypts a plaintext into an `EncryptedSecret`.
    ///
    /// Every call uses a fresh IV, so the same plaintext never encodes the same way twice.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedSecret> {
        let sealed = aes::encrypt(&self.key, plaintext.as_bytes())?;
        Ok(EncryptedSecret::encode(&sealed))
    }

    /// Decrypts an `EncryptedSecret`.
    ///
    /// # Returns
    ///
    /// The plaintext, `AppError::Format` when the encoding is malformed, or
    /// `AppError::Integrity` when the tag does not verify.
    pub fn decrypt(&self, secret: &EncryptedSecret) -> Result<Zeroizing<String>> {
        let sealed = secret.decode()?;
        let plaintext = Zeroizing::new(aes::decrypt(&self.key, &sealed)?);

        String::from_utf8(plaintext.to_vec())
            .map(Zeroizing::new)
            .map_err(|_| AppError::Format("plaintext is not valid UTF-8".to_string()))
    }

    /// Seals a credential pair as one `EncryptedSecret`.
    pub fn encrypt_credentials(&self, credentials: &Credentials) -> Result<EncryptedSecret> {
        let json = Zeroizing::new(
            sonic_rs::to_string(credentials)
                .map_err(|e| AppError::Internal(format!("Credential serialization failed: {}", e)))?,
        );
        self.encrypt(&json)
    }

    /// Opens a credential pair sealed by [`CredentialCipher::encrypt_credentials`].
    pub fn decrypt_credentials(&self, secret: &EncryptedSecret) -> Result<Credentials> {
        let json = self.decrypt(secret)?;
        sonic_rs::from_str(&json)
            .map_err(|_| AppError::Format("sealed value is not a credential pair".to_string()))
    }
}

impl fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static CIPHER: Lazy<CredentialCipher> =
        Lazy::new(|| CredentialCipher::new("unit-test-secret").unwrap());

    fn flip_byte(encoded: &str, part: usize, index: usize) -> EncryptedSecret {
        let mut parts: Vec<Vec<u8>> = encoded
            .split(':')
            .map(|p| hex::decode(p).unwrap())
            .collect();
        parts[part][index] ^= 0x01;
        EncryptedSecret::new(
            parts
                .iter()
                .map(hex::encode)
                .collect::<Vec<_>>()
                .join(":"),
        )
    }

    #[test]
    fn round_trip() {
        let long = "long".repeat(500);
        for plaintext in ["x", "senha123", "çãõ é ü", long.as_str()] {
            let secret = CIPHER.encrypt(plaintext).unwrap();
            assert_eq!(CIPHER.decrypt(&secret).unwrap().as_str(), plaintext);
        }
    }

    #[test]
    fn same_plaintext_encrypts_differently() {
        let a = CIPHER.encrypt("senha123").unwrap();
        let b = CIPHER.encrypt("senha123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn encoded_shape_is_iv_tag_ciphertext() {
        let secret = CIPHER.encrypt("abc").unwrap();
        let parts: Vec<&str> = secret.as_str().split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), NONCE_SIZE * 2);
        assert_eq!(parts[1].len(), TAG_SIZE * 2);
        assert_eq!(parts[2].len(), 3 * 2);
    }

    #[test]
    fn any_flipped_byte_fails_integrity() {
        let secret = CIPHER.encrypt("senha123").unwrap();
        let lengths = [NONCE_SIZE, TAG_SIZE, "senha123".len()];
        for (part, len) in lengths.iter().enumerate() {
            for index in 0..*len {
                let tampered = flip_byte(secret.as_str(), part, index);
                assert!(
                    matches!(CIPHER.decrypt(&tampered), Err(AppError::Integrity(_))),
                    "part {} byte {} was not detected",
                    part,
                    index
                );
            }
        }
    }

    #[test]
    fn wrong_key_fails_integrity() {
        let other = CredentialCipher::new("another-secret").unwrap();
        let secret = CIPHER.encrypt("senha123").unwrap();
        assert!(matches!(other.decrypt(&secret), Err(AppError::Integrity(_))));
    }

    #[test]
    fn malformed_input_is_a_format_error() {
        let valid = CIPHER.encrypt("senha123").unwrap();
        let parts: Vec<&str> = valid.as_str().split(':').collect();

        let cases = [
            String::new(),
            "abc".to_string(),
            format!("{}:{}", parts[0], parts[1]),
            format!("{}:{}:{}:00", parts[0], parts[1], parts[2]),
            format!("zz:{}:{}", parts[1], parts[2]),
            format!("{}:{}:{}", &parts[0][2..], parts[1], parts[2]),
            format!("{}:{}00:{}", parts[0], parts[1], parts[2]),
        ];

        for case in cases {
            assert!(
                matches!(CIPHER.decrypt(&EncryptedSecret::new(case.clone())), Err(AppError::Format(_))),
                "{:?} should be a format error",
                case
            );
        }
    }

    #[test]
    fn debug_never_prints_material() {
        let secret = CIPHER.encrypt("senha123").unwrap();
        assert!(!format!("{:?}", secret).contains(secret.as_str()));
        assert!(format!("{:?}", *CIPHER).contains("REDACTED"));
    }

    #[test]
    fn credentials_round_trip_through_one_secret() {
        let sealed = CIPHER
            .encrypt_credentials(&Credentials::new("11122233344", "senha123"))
            .unwrap();
        assert!(!sealed.as_str().contains("senha123"));

        let opened = CIPHER.decrypt_credentials(&sealed).unwrap();
        assert_eq!(opened.user, "11122233344");
        assert_eq!(opened.password, "senha123");

        let not_credentials = CIPHER.encrypt("just text").unwrap();
        assert!(matches!(
            CIPHER.decrypt_credentials(&not_credentials),
            Err(AppError::Format(_))
        ));
    }
}
