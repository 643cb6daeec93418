use std::io::{BufRead, BufReader, Read};
use std::str::FromStr;

use log::trace;

use crate::error::{Error, Result};
use crate::{Boundary, Pem, parse_boundary};

/// Reads one PEM block from `reader`.
///
/// Lines before the first `-----BEGIN` boundary are skipped. Reading stops
/// at the matching `-----END` boundary, although buffering may consume a
/// little more of the source. At most `limit` bytes are examined.
pub fn read_pem<R: Read>(reader: R, limit: usize) -> Result<Pem> {
    let mut reader = BufReader::new(reader.take((limit as u64).saturating_add(1)));
    let mut text = String::new();
    let mut line = Vec::new();
    let mut consumed = 0usize;
    let mut in_block = false;
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        consumed += n;
        if consumed > limit {
            return Err(Error::TooLarge { limit });
        }
        let s = std::str::from_utf8(&line).map_err(|_| Error::NotText)?;
        match parse_boundary(s.trim_end()) {
            Ok((Boundary::Begin, _)) if !in_block => in_block = true,
            Ok((Boundary::End, _)) if in_block => {
                text.push_str(s);
                break;
            }
            _ => {}
        }
        if in_block {
            text.push_str(s);
        }
    }
    if !in_block {
        return Err(Error::MissingPreEncapsulationBoundary);
    }
    trace!("pem block: {} bytes of text", text.len());
    Pem::from_str(&text)
}
