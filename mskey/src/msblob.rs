//! Microsoft `PUBLICKEYBLOB` / `PRIVATEKEYBLOB` key blobs.
//!
//! ```text
//! BLOBHEADER { bType u8, bVersion u8, reserved u16, aiKeyAlg u32 }
//! magic u32, bitlen u32, key body
//! ```
//!
//! All integers are little endian, including the big numbers of the body.

use std::io::{ErrorKind, Read};

use log::{debug, trace};
use nom::number::streaming::{le_u8, le_u16, le_u32};
use nom::{IResult, Parser};
use num_bigint::BigUint;
use num_traits::Zero;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::key::{Algorithm, DsaKey, KeyMaterial, KeyObject, RsaKey, RsaPrivate, Visibility};

pub const PUBLICKEYBLOB: u8 = 0x06;
pub const PRIVATEKEYBLOB: u8 = 0x07;
pub const CUR_BLOB_VERSION: u8 = 0x02;

/// "RSA1"
pub const RSA1_MAGIC: u32 = 0x3141_5352;
/// "RSA2"
pub const RSA2_MAGIC: u32 = 0x3241_5352;
/// "DSS1"
pub const DSS1_MAGIC: u32 = 0x3153_5344;
/// "DSS2"
pub const DSS2_MAGIC: u32 = 0x3253_5344;

/// BLOBHEADER, magic and bit length.
pub const HEADER_LEN: usize = 16;

const DSS_Q_LEN: usize = 20;
const DSS_SEED_LEN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobHeader {
    pub visibility: Visibility,
    pub algorithm: Algorithm,
    pub key_alg: u32,
    pub bitlen: u32,
}

type RawHeader = (u8, u8, u16, u32, u32, u32);

fn raw_header(input: &[u8]) -> IResult<&[u8], RawHeader> {
    let (input, btype) = le_u8(input)?;
    let (input, version) = le_u8(input)?;
    let (input, reserved) = le_u16(input)?;
    let (input, key_alg) = le_u32(input)?;
    let (input, magic) = le_u32(input)?;
    let (input, bitlen) = le_u32(input)?;
    Ok((input, (btype, version, reserved, key_alg, magic, bitlen)))
}

impl BlobHeader {
    /// Parses and validates the 16 header bytes, returning the remaining
    /// input.
    pub fn parse(input: &[u8]) -> Result<(&[u8], BlobHeader)> {
        let (rest, (btype, version, _, key_alg, magic, bitlen)) = raw_header(input)?;
        let visibility = match btype {
            PUBLICKEYBLOB => Visibility::Public,
            PRIVATEKEYBLOB => Visibility::Private,
            other => return Err(Error::BadHeader(other)),
        };
        if version != CUR_BLOB_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let (algorithm, magic_visibility) = match magic {
            RSA1_MAGIC => (Algorithm::Rsa, Visibility::Public),
            RSA2_MAGIC => (Algorithm::Rsa, Visibility::Private),
            DSS1_MAGIC => (Algorithm::Dsa, Visibility::Public),
            DSS2_MAGIC => (Algorithm::Dsa, Visibility::Private),
            other => return Err(Error::BadMagic(other)),
        };
        if magic_visibility != visibility {
            return Err(Error::PublicPrivateMismatch);
        }
        Ok((
            rest,
            BlobHeader {
                visibility,
                algorithm,
                key_alg,
                bitlen,
            },
        ))
    }

    fn nbyte(&self) -> usize {
        self.bitlen.div_ceil(8) as usize
    }

    fn hnbyte(&self) -> usize {
        self.bitlen.div_ceil(16) as usize
    }

    /// Length of the key body that follows the header.
    pub fn body_len(&self) -> usize {
        let (nbyte, hnbyte) = (self.nbyte(), self.hnbyte());
        match (self.algorithm, self.visibility) {
            (Algorithm::Rsa, Visibility::Public) => 4 + nbyte,
            (Algorithm::Rsa, Visibility::Private) => 4 + 2 * nbyte + 5 * hnbyte,
            (Algorithm::Dsa, Visibility::Public) => 3 * nbyte + DSS_Q_LEN + DSS_SEED_LEN,
            (Algorithm::Dsa, Visibility::Private) => 2 * nbyte + 2 * DSS_Q_LEN + DSS_SEED_LEN,
        }
    }
}

fn le_uint(input: &[u8], len: usize) -> IResult<&[u8], BigUint> {
    let (rest, bytes) = nom::bytes::streaming::take(len).parse(input)?;
    Ok((rest, BigUint::from_bytes_le(bytes)))
}

fn rsa_body<'a>(header: &BlobHeader, input: &'a [u8]) -> IResult<&'a [u8], RsaKey> {
    let (nbyte, hnbyte) = (header.nbyte(), header.hnbyte());
    let (input, public_exponent) = le_u32(input)?;
    let (input, modulus) = le_uint(input, nbyte)?;
    let mut key = RsaKey {
        modulus,
        public_exponent: BigUint::from(public_exponent),
        private: None,
    };
    if header.visibility == Visibility::Public {
        return Ok((input, key));
    }

    let (input, prime1) = le_uint(input, hnbyte)?;
    let (input, prime2) = le_uint(input, hnbyte)?;
    let (input, exponent1) = le_uint(input, hnbyte)?;
    let (input, exponent2) = le_uint(input, hnbyte)?;
    let (input, coefficient) = le_uint(input, hnbyte)?;
    let (input, private_exponent) = le_uint(input, nbyte)?;
    key.private = Some(RsaPrivate {
        private_exponent,
        prime1,
        prime2,
        exponent1,
        exponent2,
        coefficient,
    });
    Ok((input, key))
}

// y for public blobs, x for private ones
fn dsa_body<'a>(
    header: &BlobHeader,
    input: &'a [u8],
) -> IResult<&'a [u8], (BigUint, BigUint, BigUint, BigUint)> {
    let nbyte = header.nbyte();
    let (input, p) = le_uint(input, nbyte)?;
    let (input, q) = le_uint(input, DSS_Q_LEN)?;
    let (input, g) = le_uint(input, nbyte)?;
    let value_len = match header.visibility {
        Visibility::Public => nbyte,
        Visibility::Private => DSS_Q_LEN,
    };
    let (input, value) = le_uint(input, value_len)?;
    // DSSSEED is not used
    let (input, _) = nom::bytes::streaming::take(DSS_SEED_LEN).parse(input)?;
    Ok((input, (p, q, g, value)))
}

fn dsa_key(header: &BlobHeader, input: &[u8]) -> Result<DsaKey> {
    let (_, (p, q, g, value)) = dsa_body(header, input)?;
    match header.visibility {
        Visibility::Public => Ok(DsaKey {
            p,
            q,
            g,
            y: value,
            x: None,
        }),
        Visibility::Private => {
            if p.is_zero() {
                return Err(Error::InvalidKey("DSA p is zero"));
            }
            let y = g.modpow(&value, &p);
            Ok(DsaKey {
                p,
                q,
                g,
                y,
                x: Some(value),
            })
        }
    }
}

/// Decodes the key body that follows an already parsed header.
pub(crate) fn decode_body(header: &BlobHeader, body: &[u8]) -> Result<KeyObject> {
    debug!(
        "MSBLOB {:?} {:?} key, {} bits",
        header.visibility, header.algorithm, header.bitlen
    );
    let material = match header.algorithm {
        Algorithm::Rsa => KeyMaterial::Rsa(rsa_body(header, body)?.1),
        Algorithm::Dsa => KeyMaterial::Dsa(dsa_key(header, body)?),
    };
    Ok(KeyObject::new(material))
}

/// Decodes one key blob from the start of `input`.
///
/// Bytes after the blob are ignored.
pub fn decode(input: &[u8]) -> Result<KeyObject> {
    let (body, header) = BlobHeader::parse(input)?;
    decode_body(&header, body)
}

pub(crate) fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Error::Truncated {
                    needed: buf.len() - filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(())
}

/// Reads one key blob from `reader`.
///
/// The header is read and validated first; `limit` bounds the total blob
/// size before the body is read. Anything after the blob is left in the
/// reader.
pub fn read_msblob<R: Read>(mut reader: R, limit: usize) -> Result<KeyObject> {
    let mut buf = Zeroizing::new(vec![0u8; HEADER_LEN]);
    read_exact(&mut reader, &mut buf)?;
    let (_, header) = BlobHeader::parse(&buf)?;

    let body_len = header.body_len();
    let total = HEADER_LEN + body_len;
    if total > limit {
        return Err(Error::TooLarge {
            length: total,
            limit,
        });
    }
    trace!("MSBLOB body: {} bytes", body_len);

    buf.resize(total, 0);
    read_exact(&mut reader, &mut buf[HEADER_LEN..])?;
    decode_body(&header, &buf[HEADER_LEN..])
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    const RSA: &[u8] = include_bytes!("../testdata/rsa.msblob");
    const RSA_PUB: &[u8] = include_bytes!("../testdata/rsa_pub.msblob");
    const DSA: &[u8] = include_bytes!("../testdata/dsa.msblob");
    const DSA_PUB: &[u8] = include_bytes!("../testdata/dsa_pub.msblob");

    #[rstest(
        input,
        expected_der,
        visibility,
        algorithm,
        case(RSA, include_bytes!("../testdata/rsa.pk1.der").as_slice(), Visibility::Private, Algorithm::Rsa),
        case(RSA_PUB, include_bytes!("../testdata/rsa_pub.pk1.der").as_slice(), Visibility::Public, Algorithm::Rsa),
        case(DSA, include_bytes!("../testdata/dsa.der").as_slice(), Visibility::Private, Algorithm::Dsa),
        case(DSA_PUB, include_bytes!("../testdata/dsa_pub.spki.der").as_slice(), Visibility::Public, Algorithm::Dsa)
    )]
    fn test_decode(
        input: &[u8],
        expected_der: &[u8],
        visibility: Visibility,
        algorithm: Algorithm,
    ) {
        let key = decode(input).unwrap();
        assert_eq!(visibility, key.visibility());
        assert_eq!(algorithm, key.algorithm());
        assert_eq!(expected_der, key.to_der().unwrap());
    }

    #[rstest(input, expected_bits, case(RSA, 512), case(DSA, 1024))]
    fn test_decode_bits(input: &[u8], expected_bits: u64) {
        let (_, header) = BlobHeader::parse(input).unwrap();
        assert_eq!(input.len(), HEADER_LEN + header.body_len());
        assert_eq!(expected_bits, decode(input).unwrap().bits());
    }

    #[rstest(input, case(RSA), case(RSA_PUB), case(DSA), case(DSA_PUB))]
    fn test_decode_truncated_at_every_length(input: &[u8]) {
        for len in 0..input.len() {
            let err = decode(&input[..len]).unwrap_err();
            assert!(err.is_truncated(), "len {}: {:?}", len, err);

            let err = read_msblob(Cursor::new(&input[..len]), usize::MAX).unwrap_err();
            assert!(err.is_truncated(), "len {}: {:?}", len, err);
        }
    }

    #[test]
    fn test_read_msblob_leaves_trailing_data() {
        let input = [RSA, b"trailing"].concat();
        let mut cursor = Cursor::new(input);

        let key = read_msblob(&mut cursor, 4096).unwrap();
        assert_eq!(Visibility::Private, key.visibility());
        assert_eq!(RSA.len() as u64, cursor.position());
    }

    #[test]
    fn test_read_msblob_too_large() {
        let err = read_msblob(Cursor::new(RSA), 100).unwrap_err();
        assert!(matches!(
            err,
            Error::TooLarge {
                length: 308,
                limit: 100
            }
        ));
    }

    fn with_header_byte(index: usize, value: u8) -> Vec<u8> {
        let mut input = RSA.to_vec();
        input[index] = value;
        input
    }

    #[test]
    fn test_bad_header() {
        let input = with_header_byte(0, 0x08);
        assert!(matches!(decode(&input), Err(Error::BadHeader(0x08))));
    }

    #[test]
    fn test_unsupported_version() {
        let input = with_header_byte(1, 0x03);
        assert!(matches!(decode(&input), Err(Error::UnsupportedVersion(3))));
    }

    #[test]
    fn test_bad_magic() {
        // "RSA3"
        let input = with_header_byte(11, b'3');
        assert!(matches!(decode(&input), Err(Error::BadMagic(0x3341_5352))));
    }

    #[rstest(
        index,
        value,
        // PUBLICKEYBLOB with RSA2
        case(0, PUBLICKEYBLOB),
        // PRIVATEKEYBLOB with RSA1
        case(11, b'1')
    )]
    fn test_public_private_mismatch(index: usize, value: u8) {
        let input = with_header_byte(index, value);
        assert!(matches!(decode(&input), Err(Error::PublicPrivateMismatch)));
    }

    #[test]
    fn test_dsa_zero_modulus() {
        let mut input = DSA.to_vec();
        input[HEADER_LEN..HEADER_LEN + 128].fill(0);
        assert!(matches!(decode(&input), Err(Error::InvalidKey(_))));
    }
}
