//! The layered encryption pipeline.
//!
//! A message is encrypted once to the combined trustee key and then
//! re-encrypted to every mixnet node, last node first, so that the first
//! node's layer is outermost. Decryption therefore runs node 1 → node N →
//! trustees. Every layer consumes one 32-byte chunk of the seed, which
//! makes the whole pipeline a pure function of (keys, message, seed) - the
//! property the audit's replay depends on.

use crate::ecies_ed25519;
use crate::keygen::{combine_public, PublicKey};
use crate::Error;
use rand::RngCore;

/// Layer seed material: one 32-byte chunk per encryption layer, trustee
/// chunk first, then mixnet chunks in last-to-first node order.
///
/// A seed must never be reused across two distinct messages under the same
/// keys. Outside of generation it is only ever legitimately reconstructed
/// during audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed(Vec<u8>);

/// Seed bytes consumed per encryption layer.
pub const SEED_CHUNK: usize = 32;

impl Seed {
    /// Generate fresh seed material for `mixnet_count` nodes plus the
    /// trustee layer.
    pub fn generate(mixnet_count: usize) -> Self {
        let mut csprng = rand::rngs::OsRng {};
        let mut bytes = vec![0u8; (mixnet_count + 1) * SEED_CHUNK];
        csprng.fill_bytes(&mut bytes);
        Seed(bytes)
    }

    /// Reconstruct a seed from raw bytes (audit path).
    ///
    /// Will return None unless the length is a non-zero multiple of 32.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() % SEED_CHUNK != 0 {
            return None;
        }
        Some(Seed(bytes.to_vec()))
    }

    /// Number of 32-byte layer chunks.
    pub fn layers(&self) -> usize {
        self.0.len() / SEED_CHUNK
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The seed for a shallower onion: the first `layers` chunks. Used by
    /// the audit to recompute the expected ciphertext after each mix hop.
    pub fn truncated(&self, layers: usize) -> Seed {
        Seed(self.0[..layers * SEED_CHUNK].to_vec())
    }

    fn chunk(&self, index: usize) -> [u8; SEED_CHUNK] {
        let mut out = [0u8; SEED_CHUNK];
        out.copy_from_slice(&self.0[index * SEED_CHUNK..(index + 1) * SEED_CHUNK]);
        out
    }
}

/// Size in bytes of a fully-layered ciphertext.
pub fn cypher_size(mixnet_count: usize, max_size: usize) -> usize {
    max_size + ecies_ed25519::OVERHEAD * (mixnet_count + 1)
}

/// Onion-encrypt a message through the trustee layer and every mixnet
/// layer.
///
/// Mixnet nodes are given in pipeline order: `mixnet_publics[0]` decrypts
/// first, so its layer is applied last. The seed must carry exactly
/// `mixnet_publics.len() + 1` chunks. Same inputs yield byte-identical
/// output.
pub fn encrypt_full(
    mixnet_publics: &[PublicKey],
    trustee_publics: &[PublicKey],
    msg: &[u8],
    seed: &Seed,
) -> Result<Vec<u8>, Error> {
    if seed.layers() != mixnet_publics.len() + 1 {
        return Err(Error::WrongInput("seed length does not match layer count"));
    }

    let trustee_key = combine_public(trustee_publics)?;
    let mut cypher = ecies_ed25519::encrypt_seeded(&trustee_key, msg, &seed.chunk(0))?;

    let count = mixnet_publics.len();
    for (index, node_public) in mixnet_publics.iter().enumerate().rev() {
        let chunk = seed.chunk(count - index);
        cypher = ecies_ed25519::encrypt_seeded(node_public, &cypher, &chunk)?;
    }

    Ok(cypher)
}
