//! Key pairs for mixnet nodes and trustees, and trustee key aggregation.
//!
//! The two key kinds are kept as distinct types on purpose: trustee keys are
//! additively aggregatable (the whole quorum acts as one recipient), mixnet
//! keys never are (each node peels its own layer). Handing a mixnet key to
//! the aggregation functions should not typecheck.

use crate::serde_hex::{Hex, PublicKeyHex, SecretKeyHex};
use crate::Error;
use curve25519_dalek::constants;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use hex::FromHex;
use rand::{CryptoRng, RngCore};

/// Length of all keys, public and secret, in bytes.
pub const KEY_LENGTH: usize = 32;

/// A secret scalar, stored unclamped exactly as generated.
///
/// Clamping happens at the point of use: individually inside
/// [`combine_secret`], and inside the single-recipient ECIES decrypt path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretKey([u8; KEY_LENGTH]);

impl SecretKey {
    /// Generate a fresh secret key from the given CSPRNG.
    pub fn generate<R: RngCore + CryptoRng>(csprng: &mut R) -> Self {
        let mut bytes = [0u8; KEY_LENGTH];
        csprng.fill_bytes(&mut bytes);
        SecretKey(bytes)
    }

    #[inline]
    pub fn to_bytes(&self) -> [u8; KEY_LENGTH] {
        self.0
    }

    #[inline]
    pub fn as_bytes<'a>(&'a self) -> &'a [u8; KEY_LENGTH] {
        &self.0
    }

    /// Construct a `SecretKey` from a slice of bytes.
    ///
    /// Will return None if the slice is not exactly 32 bytes.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != KEY_LENGTH {
            return None;
        }
        let mut out = [0u8; KEY_LENGTH];
        out.copy_from_slice(bytes);
        Some(SecretKey(out))
    }

    /// The clamped scalar for this secret. Use for every single-share
    /// operation: public-key derivation and per-node decryption.
    pub(crate) fn clamped_scalar(&self) -> Scalar {
        clamp_scalar(self.0)
    }

    /// The scalar exactly as stored, without clamping. Only valid for an
    /// already-combined trustee secret, whose shares were clamped before
    /// summation; re-clamping it would corrupt decryption.
    pub(crate) fn raw_scalar(&self) -> Scalar {
        Scalar::from_bits(self.0)
    }
}

/// A compressed Edwards public point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey([u8; KEY_LENGTH]);

impl PublicKey {
    #[inline]
    pub fn to_bytes(&self) -> [u8; KEY_LENGTH] {
        self.0
    }

    #[inline]
    pub fn as_bytes<'a>(&'a self) -> &'a [u8; KEY_LENGTH] {
        &self.0
    }

    /// Construct a `PublicKey` from a slice of bytes.
    ///
    /// Will return None if the slice is not exactly 32 bytes. The bytes are
    /// not checked for being a curve point until the key is used.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != KEY_LENGTH {
            return None;
        }
        let mut out = [0u8; KEY_LENGTH];
        out.copy_from_slice(bytes);
        Some(PublicKey(out))
    }

    /// Derive the public key from a secret key.
    pub fn from_secret(sk: &SecretKey) -> Self {
        let point = &sk.clamped_scalar() * &constants::ED25519_BASEPOINT_TABLE;
        PublicKey(point.compress().to_bytes())
    }

    /// Get the Edwards point for this public key.
    pub fn as_point(&self) -> Result<EdwardsPoint, Error> {
        CompressedEdwardsY::from_slice(&self.0)
            .decompress()
            .ok_or(Error::InvalidPublicKey)
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl FromHex for PublicKey {
    type Error = hex::FromHexError;

    fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self, Self::Error> {
        let bytes = hex::decode(hex)?;
        PublicKey::from_bytes(&bytes).ok_or(hex::FromHexError::InvalidStringLength)
    }
}

/// A mixnet node's key pair. One per node; never aggregated.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MixnetKeypair {
    #[serde(with = "SecretKeyHex")]
    pub secret: SecretKey,

    #[serde(with = "PublicKeyHex")]
    pub public: PublicKey,
}

impl MixnetKeypair {
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng {};
        let secret = SecretKey::generate(&mut csprng);
        let public = PublicKey::from_secret(&secret);
        MixnetKeypair { secret, public }
    }
}

/// A trustee's key pair. Holds one additive share of the election secret.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrusteeKeypair {
    #[serde(with = "SecretKeyHex")]
    pub secret: SecretKey,

    #[serde(with = "PublicKeyHex")]
    pub public: PublicKey,
}

impl TrusteeKeypair {
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng {};
        let secret = SecretKey::generate(&mut csprng);
        let public = PublicKey::from_secret(&secret);
        TrusteeKeypair { secret, public }
    }
}

/// Additively combine trustee public keys into the single election public
/// key. Order-independent.
pub fn combine_public(publics: &[PublicKey]) -> Result<PublicKey, Error> {
    if publics.is_empty() {
        return Err(Error::WrongInput("cannot combine an empty key list"));
    }

    let mut sum = EdwardsPoint::identity();
    for public in publics {
        sum += public.as_point()?;
    }

    Ok(PublicKey(sum.compress().to_bytes()))
}

/// Additively combine trustee secret shares into the election secret.
///
/// Each share is clamped individually, then the clamped scalars are summed.
/// The result is a canonical scalar and must NOT be clamped again before
/// use - see [`SecretKey::raw_scalar`]. Order-independent.
pub fn combine_secret(secrets: &[SecretKey]) -> SecretKey {
    let mut sum = Scalar::zero();
    for secret in secrets {
        sum += secret.clamped_scalar();
    }

    SecretKey(sum.to_bytes())
}

pub(crate) fn clamp_scalar(mut bytes: [u8; KEY_LENGTH]) -> Scalar {
    bytes[0] &= 248;
    bytes[31] &= 127;
    bytes[31] |= 64;
    Scalar::from_bits(bytes)
}
