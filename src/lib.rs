//! mixvote: the cryptographic core of an anonymity-preserving, verifiable
//! voting protocol.
//!
//! Votes are onion-encrypted through a chain of mixnet nodes on top of a
//! single trustee layer. Each mixnet node peels one layer off the whole
//! batch and sorts the result, erasing the correlation between a voter and
//! a position in the batch. The trustee layer is encrypted to the *sum* of
//! all trustee public keys, so only the full trustee quorum can strip it.
//!
//! Every voter actually submits a pair of ciphertexts: the real vote and a
//! deterministically derived decoy. After the election, `validate` replays
//! the decoy derivation and checks that the decoy survived every stage,
//! which (by indistinguishability of the pair) proves the real vote did
//! too, without decrypting it.

#[macro_use]
extern crate serde;

mod audit;
mod decryption;
mod error;
mod keygen;
mod mix;
mod onion;
mod serde_hex;
mod vote;

pub mod boundary;
pub mod ecies_ed25519;
pub mod seal;

pub use audit::*;
pub use decryption::*;
pub use error::*;
pub use keygen::*;
pub use mix::*;
pub use onion::*;
pub use serde_hex::*;
pub use vote::*;
