use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("mixvote: invalid public key - not a curve point")]
    InvalidPublicKey,

    #[error("mixvote: key agreement produced the identity element")]
    IdentityElement,

    #[error("mixvote: weak public key - small order point")]
    WeakPublicKey,

    #[error("mixvote: authentication failed - ciphertext tag mismatch")]
    AuthenticationError,

    #[error("mixvote: malformed cyphertext")]
    InvalidCypher,

    #[error("mixvote: wrong input: {0}")]
    WrongInput(&'static str),
}

impl From<aes_gcm::aead::Error> for Error {
    fn from(_: aes_gcm::aead::Error) -> Self {
        Error::AuthenticationError
    }
}
