//! Post-election validation: prove no ciphertext was substituted, dropped,
//! or added, and name the cheater if one was.
//!
//! For every voter the trustees decrypt the control data, recover the
//! decoy's seed, and re-derive the exact decoy ciphertext the voter must
//! have submitted and the exact intermediate form it must have taken after
//! every mix hop. If the decoy is present at every stage then - because the
//! real and decoy cyphers are structurally indistinguishable to everyone
//! but the quorum - the real vote must have survived too. No real vote is
//! ever decrypted or revealed.

use crate::keygen::{combine_secret, PublicKey, SecretKey};
use crate::onion::{cypher_size, encrypt_full, Seed};
use crate::vote::EncryptResult;
use crate::{ecies_ed25519, Error};
use std::cmp::Ordering;

/// The audit verdict.
///
/// Indices are 1-based; `code()` gives the signed numeric form used at the
/// foreign boundary. Only the first detected fraud is reported: voters are
/// scanned in submission order, and for each voter the submission stage is
/// checked before the mix hops in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every decoy survived every stage.
    Valid,

    /// This voter's submitted pair does not contain their decoy.
    CheatingVoter(usize),

    /// This mixnet node's recorded output block lost a decoy.
    TamperedMixnetNode(usize),
}

impl Outcome {
    /// 0 on success, a negative 1-based voter index, or a positive 1-based
    /// mixnet node index.
    pub fn code(&self) -> i64 {
        match self {
            Outcome::Valid => 0,
            Outcome::CheatingVoter(index) => -(*index as i64),
            Outcome::TamperedMixnetNode(index) => *index as i64,
        }
    }
}

/// Replay every voter's decoy derivation against the public record.
///
/// `mixnet_outputs[k]` is the full sorted block that mixnet node k+1
/// published; each must hold `2 * user_cyphers.len()` entries (both cyphers
/// of every pair travel through the mix).
pub fn validate(
    user_cyphers: &[EncryptResult],
    mixnet_outputs: &[Vec<u8>],
    mixnet_publics: &[PublicKey],
    trustee_publics: &[PublicKey],
    trustee_secrets: &[SecretKey],
    max_size: usize,
) -> Result<Outcome, Error> {
    let node_count = mixnet_publics.len();
    if mixnet_outputs.len() != node_count {
        return Err(Error::WrongInput(
            "one recorded output block per mixnet node required",
        ));
    }
    if trustee_secrets.is_empty() {
        return Err(Error::WrongInput("no trustee secrets supplied"));
    }
    if max_size == 0 {
        return Err(Error::WrongInput("max_size must be non-zero"));
    }

    let entry_count = 2 * user_cyphers.len();

    // A block of the wrong shape cannot contain anyone's decoy; the node
    // that published it is implicated before any per-voter work.
    for hop in 1..=node_count {
        let expected_len = entry_count * cypher_size(node_count - hop, max_size);
        if mixnet_outputs[hop - 1].len() != expected_len {
            return Ok(Outcome::TamperedMixnetNode(hop));
        }
    }

    let combined = combine_secret(trustee_secrets);
    let zeros = vec![0u8; max_size];

    for (user, result) in user_cyphers.iter().enumerate() {
        let voter = Outcome::CheatingVoter(user + 1);

        // Recover the decoy seed from the control data.
        let seed_bytes = match ecies_ed25519::decrypt_combined(&combined, &result.control_data)
        {
            Ok(bytes) => bytes,
            Err(_) => return Ok(voter),
        };
        let seed = match Seed::from_bytes(&seed_bytes) {
            Some(seed) if seed.layers() == node_count + 1 => seed,
            _ => return Ok(voter),
        };

        // The decoy as submitted. A degenerate key agreement during replay
        // means the seed is not one an honest encryption could have
        // produced, which implicates the voter.
        let expected = match encrypt_full(mixnet_publics, trustee_publics, &zeros, &seed) {
            Ok(cypher) => cypher,
            Err(Error::IdentityElement) | Err(Error::WeakPublicKey) => return Ok(voter),
            Err(err) => return Err(err),
        };
        if result.cyphers[0] != expected && result.cyphers[1] != expected {
            return Ok(voter);
        }

        // The decoy after each hop, located by binary search in the node's
        // sorted output block.
        for hop in 1..=node_count {
            let layers = node_count - hop + 1;
            let expected = match encrypt_full(
                &mixnet_publics[hop..],
                trustee_publics,
                &zeros,
                &seed.truncated(layers),
            ) {
                Ok(cypher) => cypher,
                Err(Error::IdentityElement) | Err(Error::WeakPublicKey) => return Ok(voter),
                Err(err) => return Err(err),
            };

            let entry_size = cypher_size(node_count - hop, max_size);
            if !block_contains(&mixnet_outputs[hop - 1], entry_size, &expected) {
                return Ok(Outcome::TamperedMixnetNode(hop));
            }
        }
    }

    Ok(Outcome::Valid)
}

fn block_contains(block: &[u8], entry_size: usize, needle: &[u8]) -> bool {
    let count = block.len() / entry_size;
    let mut low = 0;
    let mut high = count;

    while low < high {
        let mid = (low + high) / 2;
        let entry = &block[mid * entry_size..(mid + 1) * entry_size];
        match entry.cmp(needle) {
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid,
            Ordering::Equal => return true,
        }
    }

    false
}
