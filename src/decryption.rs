//! Trustee threshold decryption: the final layer strip.
//!
//! After the last mixnet node, every entry in the batch carries only the
//! trustee layer, encrypted to the sum of all trustee public keys. The full
//! quorum's secret shares are combined additively and the layer is stripped
//! with the no-reclamp ECIES variant. Any proper subset of shares sums to a
//! different scalar and decrypts nothing.
//!
//! No re-ordering happens here - the batch was already anonymized by the
//! mixnet sorts.

use crate::keygen::{combine_secret, SecretKey};
use crate::mix::split_block;
use crate::{ecies_ed25519, Error};

/// Strip the trustee layer off a batch using all trustee secret shares.
pub fn decrypt_trustee(
    trustee_secrets: &[SecretKey],
    cypher_count: usize,
    cypher_block: &[u8],
) -> Result<Vec<u8>, Error> {
    if trustee_secrets.is_empty() {
        return Err(Error::WrongInput("no trustee secrets supplied"));
    }

    let combined = combine_secret(trustee_secrets);
    let entries = split_block(cypher_count, cypher_block)?;

    let mut out = Vec::with_capacity(cypher_block.len());
    for entry in entries {
        out.extend(ecies_ed25519::decrypt_combined(&combined, entry)?);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::{combine_public, TrusteeKeypair};

    #[test]
    fn test_decrypt_trustee() {
        let trustees: Vec<TrusteeKeypair> =
            (0..3).map(|_| TrusteeKeypair::generate()).collect();
        let publics: Vec<_> = trustees.iter().map(|t| t.public).collect();
        let secrets: Vec<_> = trustees.iter().map(|t| t.secret.clone()).collect();

        let election_key = combine_public(&publics).unwrap();

        let a = ecies_ed25519::encrypt(&election_key, &[7u8; 18]).unwrap();
        let b = ecies_ed25519::encrypt(&election_key, &[9u8; 18]).unwrap();
        let block = [a, b].concat();

        let out = decrypt_trustee(&secrets, 2, &block).unwrap();
        assert_eq!(out, [[7u8; 18].to_vec(), [9u8; 18].to_vec()].concat());
    }

    #[test]
    fn test_partial_quorum_fails() {
        let trustees: Vec<TrusteeKeypair> =
            (0..3).map(|_| TrusteeKeypair::generate()).collect();
        let publics: Vec<_> = trustees.iter().map(|t| t.public).collect();
        let secrets: Vec<_> = trustees.iter().map(|t| t.secret.clone()).collect();

        let election_key = combine_public(&publics).unwrap();
        let block = ecies_ed25519::encrypt(&election_key, &[7u8; 18]).unwrap();

        assert!(decrypt_trustee(&secrets[..2], 1, &block).is_err());
    }
}
