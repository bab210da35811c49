// We define in our crate:
use crate::{PublicKey, SecretKey};
use std::borrow::Cow;

pub use hex_buffer_serde::Hex;

// a single-purpose type for use in `#[serde(with)]`
pub enum PublicKeyHex {}

impl Hex<PublicKey> for PublicKeyHex {
    type Error = String;

    fn create_bytes(public_key: &PublicKey) -> Cow<[u8]> {
        public_key.to_bytes().to_vec().into()
    }

    fn from_bytes(bytes: &[u8]) -> Result<PublicKey, String> {
        PublicKey::from_bytes(bytes).ok_or_else(|| "wrong public key length".to_string())
    }
}

// a single-purpose type for use in `#[serde(with)]`
pub enum SecretKeyHex {}

impl Hex<SecretKey> for SecretKeyHex {
    type Error = String;

    fn create_bytes(secret_key: &SecretKey) -> Cow<[u8]> {
        secret_key.to_bytes().to_vec().into()
    }

    fn from_bytes(bytes: &[u8]) -> Result<SecretKey, String> {
        SecretKey::from_bytes(bytes).ok_or_else(|| "wrong secret key length".to_string())
    }
}
