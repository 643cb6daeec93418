use kagi::passphrase::PassphraseError;
use nom::Needed;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("truncated input: at least {needed} more bytes needed")]
    Truncated { needed: usize },

    #[error("parser error {0:?}")]
    Parser(nom::error::ErrorKind),

    #[error("unknown blob type 0x{0:02x}")]
    BadHeader(u8),

    #[error("unsupported blob version {0}")]
    UnsupportedVersion(u8),

    #[error("bad magic 0x{0:08x}")]
    BadMagic(u32),

    #[error("blob type does not match the key magic")]
    PublicPrivateMismatch,

    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    #[error("inconsistent PVK header: {0}")]
    InconsistentHeader(&'static str),

    #[error("declared length {length} exceeds the limit of {limit} bytes")]
    TooLarge { length: usize, limit: usize },

    #[error("passphrase: {0}")]
    Passphrase(#[from] PassphraseError),

    /// Wrong passphrase and corrupt data are indistinguishable.
    #[error("PVK decryption failed")]
    BadDecrypt,

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the input could still be valid if more bytes were available.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Truncated { .. })
    }

    /// True when the input is not a blob of the expected format at all.
    ///
    /// Passphrase, decryption, I/O and size errors are not format errors.
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Error::Truncated { .. }
                | Error::Parser(_)
                | Error::BadHeader(_)
                | Error::UnsupportedVersion(_)
                | Error::BadMagic(_)
                | Error::PublicPrivateMismatch
                | Error::InconsistentHeader(_)
        )
    }
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    fn from(value: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match value {
            nom::Err::Incomplete(Needed::Size(n)) => Error::Truncated { needed: n.get() },
            nom::Err::Incomplete(Needed::Unknown) => Error::Truncated { needed: 1 },
            nom::Err::Error(e) | nom::Err::Failure(e) => match e.code {
                nom::error::ErrorKind::Eof => Error::Truncated { needed: 1 },
                kind => Error::Parser(kind),
            },
        }
    }
}
