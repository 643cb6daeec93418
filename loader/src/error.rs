use kagi::passphrase::PassphraseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reading the source failed or the input is too large.
    Stream,
    /// The bytes are not a key in any supported format, or are malformed.
    Format,
    /// No passphrase could be obtained.
    Passphrase,
    /// Decryption failed: wrong passphrase or corrupt ciphertext.
    Crypto,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input exceeds the limit of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("no reader recognized the input")]
    Unrecognized,

    #[error("unknown input type: {0}")]
    UnknownInputType(String),

    #[error("passphrase: {0}")]
    Passphrase(#[from] PassphraseError),

    #[error("DER: {0}")]
    Der(#[from] der::error::Error),

    #[error("PEM: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("PKCS#8: {0}")]
    Pkcs8(#[from] pkcs8::Error),

    #[error("MS key: {0}")]
    MsKey(#[from] mskey::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::TooLarge { .. } => ErrorKind::Stream,
            Error::Unrecognized | Error::UnknownInputType(_) => ErrorKind::Format,
            Error::Passphrase(_) => ErrorKind::Passphrase,
            Error::Der(e) => match e {
                der::error::Error::Io(_) | der::error::Error::TooLarge { .. } => ErrorKind::Stream,
                _ => ErrorKind::Format,
            },
            Error::Pem(e) => pem_kind(e),
            Error::Pkcs8(e) => match e {
                pkcs8::Error::Passphrase(_) => ErrorKind::Passphrase,
                pkcs8::Error::DecryptFailed => ErrorKind::Crypto,
                pkcs8::Error::Pem(e) => pem_kind(e),
                _ => ErrorKind::Format,
            },
            Error::MsKey(e) => match e {
                mskey::Error::Passphrase(_) => ErrorKind::Passphrase,
                mskey::Error::BadDecrypt => ErrorKind::Crypto,
                mskey::Error::Io(_) | mskey::Error::TooLarge { .. } => ErrorKind::Stream,
                _ => ErrorKind::Format,
            },
        }
    }
}

fn pem_kind(e: &pem::error::Error) -> ErrorKind {
    match e {
        pem::error::Error::Io(_) | pem::error::Error::TooLarge { .. } => ErrorKind::Stream,
        _ => ErrorKind::Format,
    }
}
