//! The byte-level conventions the core is consumed with across a foreign
//! boundary (a sandboxed module or linked library).
//!
//! Conventions: keys travel as raw 32-byte arrays with no framing; key
//! lists are contiguous 32-byte elements plus an explicit count;
//! variable-length outputs are returned as a [`Buffer`], whose wire form is
//! a 4-byte little-endian length immediately followed by the payload.
//!
//! The caller owns participant bookkeeping: which public key belongs to
//! whom, and the stable agreed order of the mixnet and trustee key lists
//! (order matters for layering, not for aggregation). The caller also owns
//! moving these bytes through its authenticated event log; the core treats
//! that log purely as an ordered byte source and sink.

use crate::audit;
use crate::keygen::{MixnetKeypair, PublicKey, SecretKey, TrusteeKeypair, KEY_LENGTH};
use crate::mix;
use crate::onion;
use crate::vote::{self, EncryptResult};
use crate::{decryption, ecies_ed25519, Error};
use std::convert::TryInto;

/// Numeric error codes for hosts that cannot carry a Rust error across the
/// boundary.
pub const ERR_INVALID_PUBLIC_KEY: i32 = 1;
pub const ERR_IDENTITY_ELEMENT: i32 = 2;
pub const ERR_WEAK_PUBLIC_KEY: i32 = 3;
pub const ERR_AUTHENTICATION: i32 = 4;
pub const ERR_INVALID_CYPHER: i32 = 5;
pub const ERR_WRONG_INPUT: i32 = 6;
/// Reserved for hosts with fallible allocators; never produced here.
pub const ERR_OUT_OF_MEMORY: i32 = 7;

pub fn error_code(err: &Error) -> i32 {
    match err {
        Error::InvalidPublicKey => ERR_INVALID_PUBLIC_KEY,
        Error::IdentityElement => ERR_IDENTITY_ELEMENT,
        Error::WeakPublicKey => ERR_WEAK_PUBLIC_KEY,
        Error::AuthenticationError => ERR_AUTHENTICATION,
        Error::InvalidCypher => ERR_INVALID_CYPHER,
        Error::WrongInput(_) => ERR_WRONG_INPUT,
    }
}

/// An owned, call-scoped output buffer: 4-byte little-endian payload length
/// followed by the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer(Vec<u8>);

impl Buffer {
    pub fn from_payload(payload: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(4 + payload.len());
        bytes.extend(&(payload.len() as u32).to_le_bytes());
        bytes.extend(payload);
        Buffer(bytes)
    }

    /// Parse a length-prefixed buffer, returning its payload.
    pub fn parse(bytes: &[u8]) -> Result<&[u8], Error> {
        if bytes.len() < 4 {
            return Err(Error::InvalidCypher);
        }
        let len = u32::from_le_bytes(bytes[..4].try_into().unwrap()) as usize;
        if bytes.len() != 4 + len {
            return Err(Error::InvalidCypher);
        }
        Ok(&bytes[4..])
    }

    /// The payload, without the length prefix.
    pub fn payload(&self) -> &[u8] {
        &self.0[4..]
    }

    /// The full wire form, length prefix included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Generate a mixnet node key pair. Payload: secret(32) ‖ public(32).
pub fn generate_mixnet_keys() -> Buffer {
    let keypair = MixnetKeypair::generate();
    keypair_buffer(&keypair.secret, &keypair.public)
}

/// Generate a trustee key pair. Payload: secret(32) ‖ public(32).
pub fn generate_trustee_keys() -> Buffer {
    let keypair = TrusteeKeypair::generate();
    keypair_buffer(&keypair.secret, &keypair.public)
}

/// Size in bytes of a fully-layered cypher. Pure; hosts use it to size
/// their own buffers up front.
pub fn cypher_size(mixnet_count: u32, max_size: u32) -> u32 {
    onion::cypher_size(mixnet_count as usize, max_size as usize) as u32
}

/// Deniably encrypt a vote. Payload: cypher0 ‖ cypher1 ‖ control_data,
/// where each cypher is `cypher_size(mixnet_count, max_size)` bytes and the
/// control data is `(mixnet_count + 1) * 32 + 48` bytes.
pub fn encrypt_message(
    mixnet_publics: &[u8],
    mixnet_count: u32,
    trustee_publics: &[u8],
    trustee_count: u32,
    msg: &[u8],
    max_size: u32,
) -> Result<Buffer, Error> {
    let mixnet_publics = parse_publics(mixnet_publics, mixnet_count)?;
    let trustee_publics = parse_publics(trustee_publics, trustee_count)?;

    let result = vote::encrypt_message(
        &mixnet_publics,
        &trustee_publics,
        msg,
        max_size as usize,
    )?;

    let payload = [
        result.cyphers[0].as_slice(),
        result.cyphers[1].as_slice(),
        result.control_data.as_slice(),
    ]
    .concat();
    Ok(Buffer::from_payload(&payload))
}

/// Peel one mixnet layer off a batch block. Payload: the sorted,
/// concatenated plaintext block.
pub fn decrypt_mixnet(
    node_secret: &[u8],
    cypher_count: u32,
    cypher_block: &[u8],
) -> Result<Buffer, Error> {
    let secret = parse_secret(node_secret)?;
    let block = mix::decrypt_mixnet_layer(&secret, cypher_count as usize, cypher_block)?;
    Ok(Buffer::from_payload(&block))
}

/// Strip the trustee layer off a batch block using all trustee secrets.
pub fn decrypt_trustee(
    trustee_secrets: &[u8],
    trustee_count: u32,
    cypher_count: u32,
    cypher_block: &[u8],
) -> Result<Buffer, Error> {
    let secrets = parse_secrets(trustee_secrets, trustee_count)?;
    let block = decryption::decrypt_trustee(&secrets, cypher_count as usize, cypher_block)?;
    Ok(Buffer::from_payload(&block))
}

/// Audit the election record. `user_cyphers` is `user_count` submissions of
/// cypher0 ‖ cypher1 ‖ control_data; `mixnet_outputs` is every node's
/// recorded output block, concatenated in pipeline order. Returns the
/// signed outcome code of [`audit::Outcome`].
pub fn validate(
    user_cyphers: &[u8],
    user_count: u32,
    mixnet_outputs: &[u8],
    mixnet_publics: &[u8],
    mixnet_count: u32,
    trustee_publics: &[u8],
    trustee_secrets: &[u8],
    trustee_count: u32,
    max_size: u32,
) -> Result<i64, Error> {
    let mixnet_publics = parse_publics(mixnet_publics, mixnet_count)?;
    let trustee_publics = parse_publics(trustee_publics, trustee_count)?;
    let trustee_secrets = parse_secrets(trustee_secrets, trustee_count)?;

    let node_count = mixnet_count as usize;
    let user_count = user_count as usize;
    let max_size = max_size as usize;

    let full_size = onion::cypher_size(node_count, max_size);
    let control_size = (node_count + 1) * 32 + ecies_ed25519::OVERHEAD;
    let submission_size = 2 * full_size + control_size;
    if user_cyphers.len() != user_count * submission_size {
        return Err(Error::WrongInput("user cypher block has the wrong length"));
    }

    let submissions: Vec<EncryptResult> = user_cyphers
        .chunks(submission_size)
        .map(|chunk| EncryptResult {
            cyphers: [
                chunk[..full_size].to_vec(),
                chunk[full_size..2 * full_size].to_vec(),
            ],
            control_data: chunk[2 * full_size..].to_vec(),
        })
        .collect();

    // Split the concatenated mix record into per-hop blocks; entries shrink
    // by 48 bytes per hop.
    let mut blocks = Vec::with_capacity(node_count);
    let mut offset = 0;
    for hop in 1..=node_count {
        let block_size = 2 * user_count * onion::cypher_size(node_count - hop, max_size);
        if offset + block_size > mixnet_outputs.len() {
            return Err(Error::WrongInput("mixnet output record has the wrong length"));
        }
        blocks.push(mixnet_outputs[offset..offset + block_size].to_vec());
        offset += block_size;
    }
    if offset != mixnet_outputs.len() {
        return Err(Error::WrongInput("mixnet output record has the wrong length"));
    }

    let outcome = audit::validate(
        &submissions,
        &blocks,
        &mixnet_publics,
        &trustee_publics,
        &trustee_secrets,
        max_size,
    )?;
    Ok(outcome.code())
}

fn keypair_buffer(secret: &SecretKey, public: &PublicKey) -> Buffer {
    let mut payload = Vec::with_capacity(2 * KEY_LENGTH);
    payload.extend(secret.as_bytes().iter());
    payload.extend(public.as_bytes().iter());
    Buffer::from_payload(&payload)
}

fn parse_publics(bytes: &[u8], count: u32) -> Result<Vec<PublicKey>, Error> {
    if bytes.len() != count as usize * KEY_LENGTH {
        return Err(Error::WrongInput("key array length does not match count"));
    }

    Ok(bytes
        .chunks(KEY_LENGTH)
        .map(|chunk| PublicKey::from_bytes(chunk).unwrap())
        .collect())
}

fn parse_secrets(bytes: &[u8], count: u32) -> Result<Vec<SecretKey>, Error> {
    if bytes.len() != count as usize * KEY_LENGTH {
        return Err(Error::WrongInput("key array length does not match count"));
    }

    Ok(bytes
        .chunks(KEY_LENGTH)
        .map(|chunk| SecretKey::from_bytes(chunk).unwrap())
        .collect())
}

fn parse_secret(bytes: &[u8]) -> Result<SecretKey, Error> {
    SecretKey::from_bytes(bytes).ok_or(Error::WrongInput("secret key must be 32 bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_framing() {
        let buffer = Buffer::from_payload(b"hello");
        assert_eq!(buffer.as_bytes()[..4], [5, 0, 0, 0]);
        assert_eq!(buffer.payload(), b"hello");
        assert_eq!(Buffer::parse(buffer.as_bytes()).unwrap(), b"hello");

        assert!(Buffer::parse(&[5, 0, 0, 0, 1]).is_err());
        assert!(Buffer::parse(&[1, 0]).is_err());
    }

    #[test]
    fn test_keygen_payload_shape() {
        let keys = generate_mixnet_keys();
        assert_eq!(keys.payload().len(), 64);

        // secret ‖ public: the public half must re-derive from the secret.
        let secret = SecretKey::from_bytes(&keys.payload()[..32]).unwrap();
        let public = PublicKey::from_secret(&secret);
        assert_eq!(&keys.payload()[32..], public.as_bytes());
    }

    #[test]
    fn test_cypher_size() {
        assert_eq!(cypher_size(3, 18), 210);
    }

    #[test]
    fn test_key_array_count_mismatch() {
        let keys = [0u8; 64];
        assert!(parse_publics(&keys, 3).is_err());
        assert!(parse_secrets(&keys[..10], 1).is_err());
    }
}
