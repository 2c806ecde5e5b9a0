use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce, Tag,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AppError, Result};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// The size of the AES-GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// A secure key wrapper that ensures the key is zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecureKey([u8; KEY_SIZE]);

impl SecureKey {
    /// Creates a new `SecureKey` from a byte array.
    ///
    /// # Arguments
    ///
    /// * `key` - A 32-byte array representing the AES-256 key.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    /// Returns a reference to the key as a byte slice.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SecureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecureKey([REDACTED])")
    }
}

/// The three separately recoverable parts of an AES-GCM encryption.
pub struct Sealed {
    /// The nonce (IV) used for this encryption.
    pub nonce: [u8; NONCE_SIZE],
    /// The detached authentication tag.
    pub tag: [u8; TAG_SIZE],
    /// The ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

/// Generates a new random AES-GCM nonce.
///
/// # Returns
///
/// A 12-byte array representing the nonce.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypts a plaintext using AES-256-GCM with a fresh random nonce and a detached tag.
///
/// # Arguments
///
/// * `key` - The AES-256 key.
/// * `plaintext` - The data to encrypt.
///
/// # Returns
///
/// The nonce, tag and ciphertext.
pub fn encrypt(key: &SecureKey, plaintext: &[u8]) -> Result<Sealed> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let nonce_bytes = generate_nonce();
    let nonce = Nonce::from(nonce_bytes);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, b"", &mut buffer)
        .map_err(|e| AppError::Internal(format!("Encryption failed: {}", e)))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag.as_slice());

    Ok(Sealed {
        nonce: nonce_bytes,
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Decrypts a sealed value using AES-256-GCM.
///
/// # Arguments
///
/// * `key` - The AES-256 key.
/// * `sealed` - The nonce, tag and ciphertext produced by [`encrypt`].
///
/// # Returns
///
/// The decrypted plaintext, or `AppError::Integrity` when the tag does not verify.
pub fn decrypt(key: &SecureKey, sealed: &Sealed) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from(sealed.nonce);
    let tag = Tag::from(sealed.tag);

    let mut buffer = sealed.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(&nonce, b"", &mut buffer, &tag)
        .map_err(|_| {
            buffer.zeroize();
            AppError::Integrity("authentication tag mismatch".to_string())
        })?;

    Ok(buffer)
}
