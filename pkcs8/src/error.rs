use kagi::passphrase::PassphraseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The input is not an EncryptedPrivateKeyInfo; callers treat it as cleartext.
    #[error("not an EncryptedPrivateKeyInfo: {0}")]
    NotAnEnvelope(String),

    #[error("passphrase: {0}")]
    Passphrase(#[from] PassphraseError),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid algorithm parameters: {0}")]
    InvalidParameters(&'static str),

    /// Wrong passphrase and corrupt ciphertext are indistinguishable.
    #[error("decryption failed")]
    DecryptFailed,

    #[error("PEM record is not encrypted")]
    NotEncrypted,

    #[error("invalid DEK-Info header: {0}")]
    InvalidDekInfo(String),

    #[error("PEM error: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),
}
