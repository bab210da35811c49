//! ECIES on twisted Edwards Curve25519.
//!
//! An encryption is `ephemeral-public(32) ‖ sealed body ‖ tag(16)`, adding
//! exactly [`OVERHEAD`] bytes per layer. The ephemeral key pair is drawn
//! from the OS CSPRNG, or derived from a caller-supplied 32-byte seed when
//! the same encryption must be reproduced later byte-for-byte (audit
//! replay).
//!
//! There are two decrypt operations and the distinction matters:
//!   - [`decrypt`] clamps the secret before the scalar multiplication. Use
//!     it with any individually-generated key (mixnet node, ephemeral).
//!   - [`decrypt_combined`] uses the scalar exactly as given. Use it only
//!     with a combined trustee secret, whose shares were already clamped
//!     before summation. Clamping the sum again silently corrupts the
//!     shared point, so these are separate functions rather than a flag.

use crate::keygen::{PublicKey, SecretKey, KEY_LENGTH};
use crate::seal;
use crate::Error;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::IsIdentity;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

/// Bytes added by one encryption layer: ephemeral public key plus AEAD tag.
pub const OVERHEAD: usize = KEY_LENGTH + seal::TAG_LENGTH;

type SharedSecret = [u8; 32];

/// Generate an ephemeral key pair from the OS CSPRNG.
pub fn generate_keypair() -> (SecretKey, PublicKey) {
    let mut csprng = rand::rngs::OsRng {};
    let secret = SecretKey::generate(&mut csprng);
    let public = PublicKey::from_secret(&secret);
    (secret, public)
}

/// Derive an ephemeral key pair deterministically from a 32-byte seed.
///
/// The same seed always yields the same key pair. A seed must never be
/// reused for two distinct messages under the same recipient key.
pub fn keypair_from_seed(seed: &[u8; 32]) -> (SecretKey, PublicKey) {
    let mut csprng = ChaCha20Rng::from_seed(*seed);
    let secret = SecretKey::generate(&mut csprng);
    let public = PublicKey::from_secret(&secret);
    (secret, public)
}

/// Encrypt a message to the receiver's public key with fresh randomness.
///
/// It can only be decrypted by the matching secret key. Fails with
/// `IdentityElement`/`WeakPublicKey` on a degenerate key agreement; callers
/// doing randomized encryption should retry with fresh ephemeral material.
pub fn encrypt(receiver_pub: &PublicKey, msg: &[u8]) -> Result<Vec<u8>, Error> {
    let ephemeral = generate_keypair();
    encrypt_with(ephemeral, receiver_pub, msg)
}

/// Encrypt a message to the receiver's public key, deriving the ephemeral
/// key pair from `seed`. Same seed, key and message give byte-identical
/// output.
pub fn encrypt_seeded(
    receiver_pub: &PublicKey,
    msg: &[u8],
    seed: &[u8; 32],
) -> Result<Vec<u8>, Error> {
    let ephemeral = keypair_from_seed(seed);
    encrypt_with(ephemeral, receiver_pub, msg)
}

fn encrypt_with(
    ephemeral: (SecretKey, PublicKey),
    receiver_pub: &PublicKey,
    msg: &[u8],
) -> Result<Vec<u8>, Error> {
    let (ephemeral_sk, ephemeral_pk) = ephemeral;
    let shared = shared_secret(ephemeral_sk.clamped_scalar(), receiver_pub)?;
    let sealed = seal::seal(&shared, msg);

    let mut cypher_text = Vec::with_capacity(KEY_LENGTH + sealed.len());
    cypher_text.extend(ephemeral_pk.to_bytes().iter());
    cypher_text.extend(sealed);

    Ok(cypher_text)
}

/// Decrypt an ECIES ciphertext with an individually-generated secret key.
/// The secret is clamped before the scalar multiplication.
pub fn decrypt(receiver_sec: &SecretKey, cypher: &[u8]) -> Result<Vec<u8>, Error> {
    decrypt_scalar(receiver_sec.clamped_scalar(), cypher)
}

/// Decrypt an ECIES ciphertext with an already-combined trustee secret.
/// The secret is used exactly as given - never re-clamped.
pub fn decrypt_combined(receiver_sec: &SecretKey, cypher: &[u8]) -> Result<Vec<u8>, Error> {
    decrypt_scalar(receiver_sec.raw_scalar(), cypher)
}

fn decrypt_scalar(secret: Scalar, cypher: &[u8]) -> Result<Vec<u8>, Error> {
    if cypher.len() < OVERHEAD {
        return Err(Error::InvalidCypher);
    }

    let ephemeral_pk =
        PublicKey::from_bytes(&cypher[..KEY_LENGTH]).ok_or(Error::InvalidCypher)?;
    let sealed = &cypher[KEY_LENGTH..];

    let shared = shared_secret(secret, &ephemeral_pk)?;
    seal::open(&shared, sealed)
}

fn shared_secret(secret: Scalar, public: &PublicKey) -> Result<SharedSecret, Error> {
    let point = public.as_point()?;
    let shared_point = point * secret;

    if shared_point.is_identity() {
        return Err(Error::IdentityElement);
    }
    if shared_point.is_small_order() {
        return Err(Error::WeakPublicKey);
    }

    Ok(shared_point.compress().to_bytes())
}
