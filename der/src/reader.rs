use std::io::{ErrorKind, Read};

use kagi::Blob;
use log::trace;
use nom::Needed;

use crate::error::{Error, Result};
use crate::{Header, parse_header};

enum Step {
    Done(Header),
    Need(usize),
}

/// Reads exactly one DER value from `reader`.
///
/// The identifier and length octets are read first, then exactly the
/// declared number of contents octets. Anything after the value is left
/// in the reader. The returned blob holds the header and the contents.
///
/// `limit` bounds the total size of the value; longer declared lengths are
/// rejected before any contents are read.
pub fn read_der<R: Read>(mut reader: R, limit: usize) -> Result<Blob> {
    let mut buf = Vec::with_capacity(4);
    let header = loop {
        let step = match parse_header(&buf) {
            Ok((_, header)) => Step::Done(header),
            Err(nom::Err::Incomplete(Needed::Size(n))) => Step::Need(n.get()),
            Err(nom::Err::Incomplete(Needed::Unknown)) => Step::Need(1),
            Err(e) => return Err(e.into()),
        };
        match step {
            Step::Done(header) => break header,
            Step::Need(n) => {
                let start = buf.len();
                buf.resize(start + n, 0);
                reader.read_exact(&mut buf[start..]).map_err(|e| match e.kind() {
                    ErrorKind::UnexpectedEof => Error::Truncated { needed: n },
                    _ => Error::Io(e),
                })?;
            }
        }
    };

    let total = header.total_len().ok_or(Error::LengthOverflow)?;
    if total > limit {
        return Err(Error::TooLarge {
            length: total,
            limit,
        });
    }
    trace!(
        "der header: {:?}, {} contents bytes",
        header.tag, header.length
    );

    buf.reserve_exact(header.length);
    let read = reader
        .by_ref()
        .take(header.length as u64)
        .read_to_end(&mut buf)?;
    if read < header.length {
        return Err(Error::Truncated {
            needed: header.length - read,
        });
    }
    Ok(Blob::new(buf))
}
