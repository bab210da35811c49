//! Deniable vote encryption.
//!
//! Every vote is submitted as a pair: the fully-layered real message and a
//! fully-layered all-zero decoy. The decoy's seed is encrypted to the
//! combined trustee key as control data, so only the full trustee quorum
//! can ever tell which slot was real. The audit later replays the decoy's
//! derivation from that seed to prove the pair survived every stage.

use crate::keygen::{combine_public, PublicKey};
use crate::onion::{encrypt_full, Seed};
use crate::{ecies_ed25519, Error};
use rand::RngCore;

/// The per-vote submission artifact.
///
/// Exactly one of `cyphers`, after the full decryption pipeline, yields the
/// voter's zero-padded message; the other yields all zeros. Which is which
/// is decided by a coin flip and recoverable only from `control_data`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EncryptResult {
    pub cyphers: [Vec<u8>; 2],
    pub control_data: Vec<u8>,
}

/// Encrypt a vote for submission.
///
/// The message is zero-padded to `max_size`; both resulting cyphers are
/// `cypher_size(mixnet_publics.len(), max_size)` bytes. Degenerate key
/// agreements are retried internally with fresh randomness and never
/// surface.
pub fn encrypt_message(
    mixnet_publics: &[PublicKey],
    trustee_publics: &[PublicKey],
    msg: &[u8],
    max_size: usize,
) -> Result<EncryptResult, Error> {
    if max_size == 0 {
        return Err(Error::WrongInput("max_size must be non-zero"));
    }
    if msg.len() > max_size {
        return Err(Error::WrongInput("message longer than max_size"));
    }

    let mut padded = vec![0u8; max_size];
    padded[..msg.len()].copy_from_slice(msg);

    // The real branch's seed is discarded: nothing may ever re-derive the
    // real cypher. The fake branch's seed is what the audit runs on.
    let (real, _) = encrypt_branch(mixnet_publics, trustee_publics, &padded)?;
    let fake_msg = vec![0u8; max_size];
    let (fake, fake_seed) = encrypt_branch(mixnet_publics, trustee_publics, &fake_msg)?;

    let trustee_key = combine_public(trustee_publics)?;
    let control_data = encrypt_retrying(&trustee_key, fake_seed.as_bytes())?;

    let mut csprng = rand::rngs::OsRng {};
    let cyphers = if csprng.next_u32() & 1 == 0 {
        [real, fake]
    } else {
        [fake, real]
    };

    Ok(EncryptResult {
        cyphers,
        control_data,
    })
}

/// Run the full pipeline on one branch, retrying the whole branch with a
/// fresh seed on a degenerate key agreement.
fn encrypt_branch(
    mixnet_publics: &[PublicKey],
    trustee_publics: &[PublicKey],
    msg: &[u8],
) -> Result<(Vec<u8>, Seed), Error> {
    loop {
        let seed = Seed::generate(mixnet_publics.len());
        match encrypt_full(mixnet_publics, trustee_publics, msg, &seed) {
            Ok(cypher) => return Ok((cypher, seed)),
            Err(Error::IdentityElement) | Err(Error::WeakPublicKey) => continue,
            Err(err) => return Err(err),
        }
    }
}

fn encrypt_retrying(public: &PublicKey, msg: &[u8]) -> Result<Vec<u8>, Error> {
    loop {
        match ecies_ed25519::encrypt(public, msg) {
            Ok(cypher) => return Ok(cypher),
            Err(Error::IdentityElement) | Err(Error::WeakPublicKey) => continue,
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::{MixnetKeypair, TrusteeKeypair};
    use crate::onion::cypher_size;

    #[test]
    fn test_encrypt_message_shape() {
        let mixnet: Vec<MixnetKeypair> = (0..3).map(|_| MixnetKeypair::generate()).collect();
        let trustees: Vec<TrusteeKeypair> =
            (0..3).map(|_| TrusteeKeypair::generate()).collect();

        let mixnet_publics: Vec<_> = mixnet.iter().map(|k| k.public).collect();
        let trustee_publics: Vec<_> = trustees.iter().map(|k| k.public).collect();

        let result =
            encrypt_message(&mixnet_publics, &trustee_publics, b"message1", 18).unwrap();

        assert_eq!(result.cyphers[0].len(), cypher_size(3, 18));
        assert_eq!(result.cyphers[1].len(), cypher_size(3, 18));
        assert_ne!(result.cyphers[0], result.cyphers[1]);

        // Control data is the encrypted (3+1)-chunk seed.
        assert_eq!(
            result.control_data.len(),
            4 * 32 + crate::ecies_ed25519::OVERHEAD
        );
    }

    #[test]
    fn test_encrypt_message_rejects_oversized() {
        let mixnet = vec![MixnetKeypair::generate()];
        let trustees = vec![TrusteeKeypair::generate(), TrusteeKeypair::generate()];

        let mixnet_publics: Vec<_> = mixnet.iter().map(|k| k.public).collect();
        let trustee_publics: Vec<_> = trustees.iter().map(|k| k.public).collect();

        assert!(matches!(
            encrypt_message(&mixnet_publics, &trustee_publics, b"way too long", 4),
            Err(Error::WrongInput(_))
        ));
    }
}
