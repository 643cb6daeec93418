use nom::Needed;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parser error {0:?}")]
    Parser(nom::error::ErrorKind),

    #[error("truncated input: at least {needed} more bytes needed")]
    Truncated { needed: usize },

    #[error("invalid identifier octets")]
    InvalidTag,

    #[error("invalid length octets")]
    InvalidLength,

    #[error("length does not fit in usize")]
    LengthOverflow,

    #[error("declared length {length} exceeds the limit of {limit} bytes")]
    TooLarge { length: usize, limit: usize },

    #[error("expected a constructed value")]
    NotConstructed,

    #[error("{0} bytes of trailing data after value")]
    TrailingData(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the input could still be valid if more bytes were available.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Truncated { .. })
    }
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    fn from(value: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match value {
            nom::Err::Incomplete(Needed::Size(n)) => Error::Truncated { needed: n.get() },
            nom::Err::Incomplete(Needed::Unknown) => Error::Truncated { needed: 1 },
            nom::Err::Error(e) | nom::Err::Failure(e) => match e.code {
                nom::error::ErrorKind::Tag => Error::InvalidTag,
                nom::error::ErrorKind::Verify => Error::InvalidLength,
                nom::error::ErrorKind::TooLarge => Error::LengthOverflow,
                nom::error::ErrorKind::Eof => Error::Truncated { needed: 1 },
                kind => Error::Parser(kind),
            },
        }
    }
}
