//! PVK private key files.
//!
//! A 24 byte header, the salt, then a `PRIVATEKEYBLOB`. When the file is
//! encrypted everything after the first 8 bytes of the blob is RC4
//! encrypted with a key derived from the salt and the passphrase.

use std::io::Read;

use kagi::passphrase::{PASSPHRASE_CAPACITY, PassphraseBridge, PassphraseProvider};
use log::{debug, trace};
use nom::IResult;
use nom::number::streaming::le_u32;
use rc4::consts::U16;
use rc4::{KeyInit, Rc4, StreamCipher};
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::key::{KeyObject, Visibility};
use crate::msblob::{self, BlobHeader, DSS2_MAGIC, RSA2_MAGIC, read_exact};

pub const PVK_MAGIC: u32 = 0xb0b5_f11e;
pub const PVK_HEADER_LEN: usize = 24;
pub const PVK_MAX_SALTLEN: u32 = 10240;
pub const PVK_MAX_KEYLEN: u32 = 102400;

// BLOBHEADER stays in clear text
const CLEAR_LEN: usize = 8;
const RC4_KEY_LEN: usize = 16;
// 40-bit export keys keep the first 5 bytes
const WEAK_KEY_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PvkHeader {
    pub key_type: u32,
    pub encrypted: bool,
    pub salt_len: usize,
    pub key_len: usize,
}

fn raw_header(input: &[u8]) -> IResult<&[u8], [u32; 6]> {
    let (input, magic) = le_u32(input)?;
    let (input, reserved) = le_u32(input)?;
    let (input, key_type) = le_u32(input)?;
    let (input, encrypted) = le_u32(input)?;
    let (input, salt_len) = le_u32(input)?;
    let (input, key_len) = le_u32(input)?;
    Ok((
        input,
        [magic, reserved, key_type, encrypted, salt_len, key_len],
    ))
}

impl PvkHeader {
    pub fn parse(input: &[u8]) -> Result<(&[u8], PvkHeader)> {
        let (rest, [magic, _, key_type, encrypted, salt_len, key_len]) = raw_header(input)?;
        if magic != PVK_MAGIC {
            return Err(Error::BadMagic(magic));
        }
        if salt_len > PVK_MAX_SALTLEN {
            return Err(Error::InconsistentHeader("salt is too long"));
        }
        if key_len > PVK_MAX_KEYLEN {
            return Err(Error::InconsistentHeader("key is too long"));
        }
        let encrypted = encrypted != 0;
        if encrypted && salt_len == 0 {
            return Err(Error::InconsistentHeader("encrypted without a salt"));
        }
        Ok((
            rest,
            PvkHeader {
                key_type,
                encrypted,
                salt_len: salt_len as usize,
                key_len: key_len as usize,
            },
        ))
    }

    /// Length of the salt and key that follow the header.
    pub fn body_len(&self) -> usize {
        self.salt_len + self.key_len
    }
}

fn derive_key(salt: &[u8], secret: &[u8]) -> Zeroizing<[u8; RC4_KEY_LEN]> {
    let mut digest = Sha1::new().chain_update(salt).chain_update(secret).finalize();
    let mut key = Zeroizing::new([0u8; RC4_KEY_LEN]);
    key.copy_from_slice(&digest[..RC4_KEY_LEN]);
    digest.as_mut_slice().fill(0);
    key
}

fn apply_rc4(key: &[u8; RC4_KEY_LEN], data: &mut [u8]) {
    let mut cipher = Rc4::<U16>::new(key.into());
    cipher.apply_keystream(data);
}

fn has_private_magic(blob: &[u8]) -> bool {
    match blob.get(CLEAR_LEN..CLEAR_LEN + 4) {
        Some(magic) => {
            let magic = u32::from_le_bytes([magic[0], magic[1], magic[2], magic[3]]);
            magic == RSA2_MAGIC || magic == DSS2_MAGIC
        }
        None => false,
    }
}

// Returns the clear text blob, trying the 40-bit key when the full key
// does not produce a private key magic.
fn decrypt_blob(salt: &[u8], secret: &[u8], blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let key = derive_key(salt, secret);
    let mut clear = Zeroizing::new(blob.to_vec());
    apply_rc4(&key, &mut clear[CLEAR_LEN..]);
    if has_private_magic(&clear) {
        return Ok(clear);
    }

    let mut weak = Zeroizing::new([0u8; RC4_KEY_LEN]);
    weak[..WEAK_KEY_LEN].copy_from_slice(&key[..WEAK_KEY_LEN]);
    clear.copy_from_slice(blob);
    apply_rc4(&weak, &mut clear[CLEAR_LEN..]);
    if has_private_magic(&clear) {
        debug!("PVK decrypted with a 40-bit key");
        return Ok(clear);
    }
    Err(Error::BadDecrypt)
}

fn decode_body(
    header: &PvkHeader,
    body: &[u8],
    provider: &dyn PassphraseProvider,
) -> Result<KeyObject> {
    debug!(
        "PVK key type {}, encrypted: {}",
        header.key_type, header.encrypted
    );
    let (salt, blob) = body.split_at(header.salt_len);
    if !header.encrypted {
        return private_blob(blob);
    }
    if blob.len() < CLEAR_LEN {
        return Err(Error::InconsistentHeader("key is shorter than BLOBHEADER"));
    }

    let mut buf = Zeroizing::new([0u8; PASSPHRASE_CAPACITY]);
    let len = PassphraseBridge::new(provider).fill(buf.as_mut_slice())?;
    let clear = decrypt_blob(salt, &buf[..len], blob)?;
    private_blob(&clear)
}

fn private_blob(blob: &[u8]) -> Result<KeyObject> {
    let (body, header) = BlobHeader::parse(blob)?;
    if header.visibility != Visibility::Private {
        return Err(Error::PublicPrivateMismatch);
    }
    msblob::decode_body(&header, body)
}

/// Decodes a PVK file held in `input`.
///
/// The provider is asked for a passphrase only when the file is encrypted.
pub fn decode(input: &[u8], provider: &dyn PassphraseProvider) -> Result<KeyObject> {
    let (rest, header) = PvkHeader::parse(input)?;
    let body_len = header.body_len();
    if rest.len() < body_len {
        return Err(Error::Truncated {
            needed: body_len - rest.len(),
        });
    }
    decode_body(&header, &rest[..body_len], provider)
}

/// Reads a PVK file from `reader`.
///
/// The header is validated before the salt and key are read, so at most
/// `PVK_MAX_SALTLEN + PVK_MAX_KEYLEN` body bytes are buffered.
pub fn read_pvk<R: Read>(mut reader: R, provider: &dyn PassphraseProvider) -> Result<KeyObject> {
    let mut head = [0u8; PVK_HEADER_LEN];
    read_exact(&mut reader, &mut head)?;
    let (_, header) = PvkHeader::parse(&head)?;
    trace!(
        "PVK body: {} salt bytes, {} key bytes",
        header.salt_len, header.key_len
    );

    let mut body = Zeroizing::new(vec![0u8; header.body_len()]);
    read_exact(&mut reader, &mut body)?;
    decode_body(&header, &body, provider)
}
