//! One-shot authenticated encryption under a derived key.
//!
//! The 32-byte input key is a raw shared secret (a compressed curve point),
//! not a uniformly random AES key, so it is first run through HKDF-SHA256.
//! The nonce is fixed at all-zero: the caller contract is that a key is
//! used for at most one message, which every caller in this crate satisfies
//! by deriving the key from a fresh ephemeral key agreement.

use crate::Error;
use aes_gcm::aead::{generic_array::GenericArray, Aead, NewAead};
use aes_gcm::Aes256Gcm;
use hkdf::Hkdf;
use sha2::Sha256;

/// AEAD tag length appended to the sealed message.
pub const TAG_LENGTH: usize = 16;

const NONCE_LENGTH: usize = 12;

type AesKey = [u8; 32];

/// Seal a message under a single-use 32-byte key.
///
/// Output is `msg.len() + TAG_LENGTH` bytes.
pub fn seal(key: &[u8; 32], msg: &[u8]) -> Vec<u8> {
    let aead = Aes256Gcm::new(GenericArray::from_slice(&derive_key(key)));
    let nonce = [0u8; NONCE_LENGTH];
    let nonce = GenericArray::from_slice(&nonce);

    aead.encrypt(nonce, msg)
        .expect("mixvote: seal: encryption failure!")
}

/// Open a sealed message, verifying its tag.
pub fn open(key: &[u8; 32], sealed: &[u8]) -> Result<Vec<u8>, Error> {
    if sealed.len() < TAG_LENGTH {
        return Err(Error::InvalidCypher);
    }

    let aead = Aes256Gcm::new(GenericArray::from_slice(&derive_key(key)));
    let nonce = [0u8; NONCE_LENGTH];
    let nonce = GenericArray::from_slice(&nonce);

    let plaintext = aead.decrypt(nonce, sealed)?;
    Ok(plaintext)
}

fn derive_key(master: &[u8; 32]) -> AesKey {
    let h = Hkdf::<Sha256>::new(None, master);
    let mut out = [0u8; 32];
    h.expand(&[], &mut out).unwrap();
    out
}
