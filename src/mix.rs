//! The mixnet decrypt-and-mix step.
//!
//! Each node receives the whole batch as one block of uniform-length
//! ciphertexts, strips its own layer off every entry, and emits the
//! plaintexts sorted lexicographically. The sort is the anonymity
//! mechanism: it erases any correlation between an entry's position in the
//! input block and its position in the output block. Node k's output block
//! is node k+1's input block.
//!
//! This is an expensive operation for large batches; entries have no data
//! dependencies on each other, so callers may fan the per-entry decryptions
//! out across threads before the sort.

use crate::keygen::SecretKey;
use crate::{ecies_ed25519, Error};

/// Peel this node's layer off a batch and re-order it.
///
/// The block must split evenly into `cypher_count` entries. Every entry
/// shrinks by 48 bytes. If any single entry fails authentication the whole
/// batch fails - the fixed-count invariant later stages rely on forbids
/// dropping entries.
pub fn decrypt_mixnet_layer(
    node_secret: &SecretKey,
    cypher_count: usize,
    cypher_block: &[u8],
) -> Result<Vec<u8>, Error> {
    let entries = split_block(cypher_count, cypher_block)?;

    let mut plaintexts = Vec::with_capacity(cypher_count);
    for entry in entries {
        plaintexts.push(ecies_ed25519::decrypt(node_secret, entry)?);
    }

    plaintexts.sort();
    Ok(plaintexts.concat())
}

/// Split a batch block into its uniform-length entries.
pub(crate) fn split_block(
    cypher_count: usize,
    cypher_block: &[u8],
) -> Result<Vec<&[u8]>, Error> {
    if cypher_count == 0 {
        return Err(Error::WrongInput("cypher_count must be non-zero"));
    }
    if cypher_block.len() % cypher_count != 0 {
        return Err(Error::WrongInput(
            "block length not divisible by cypher_count",
        ));
    }

    let entry_size = cypher_block.len() / cypher_count;
    if entry_size <= ecies_ed25519::OVERHEAD {
        return Err(Error::InvalidCypher);
    }

    Ok(cypher_block.chunks(entry_size).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::MixnetKeypair;

    #[test]
    fn test_layer_shrinks_entries() {
        let node = MixnetKeypair::generate();

        let a = ecies_ed25519::encrypt(&node.public, &[1u8; 10]).unwrap();
        let b = ecies_ed25519::encrypt(&node.public, &[2u8; 10]).unwrap();

        let block = [a, b].concat();
        let out = decrypt_mixnet_layer(&node.secret, 2, &block).unwrap();
        assert_eq!(out.len(), 20);
    }

    #[test]
    fn test_sorting_erases_order() {
        let node = MixnetKeypair::generate();

        let a = ecies_ed25519::encrypt(&node.public, &[1u8; 10]).unwrap();
        let b = ecies_ed25519::encrypt(&node.public, &[2u8; 10]).unwrap();
        let c = ecies_ed25519::encrypt(&node.public, &[3u8; 10]).unwrap();

        let forward = [a.clone(), b.clone(), c.clone()].concat();
        let shuffled = [c, a, b].concat();

        assert_eq!(
            decrypt_mixnet_layer(&node.secret, 3, &forward).unwrap(),
            decrypt_mixnet_layer(&node.secret, 3, &shuffled).unwrap()
        );
    }

    #[test]
    fn test_uneven_block_rejected() {
        let node = MixnetKeypair::generate();
        let block = vec![0u8; 199];

        assert!(matches!(
            decrypt_mixnet_layer(&node.secret, 2, &block),
            Err(Error::WrongInput(_))
        ));
    }

    #[test]
    fn test_tampered_entry_fails_batch() {
        let node = MixnetKeypair::generate();

        let a = ecies_ed25519::encrypt(&node.public, &[1u8; 10]).unwrap();
        let b = ecies_ed25519::encrypt(&node.public, &[2u8; 10]).unwrap();

        let mut block = [a, b].concat();
        let last = block.len() - 1;
        block[last] ^= 0x01;

        assert!(decrypt_mixnet_layer(&node.secret, 2, &block).is_err());
    }
}
