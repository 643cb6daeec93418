//! RFC 1421 style encrypted PEM bodies (`Proc-Type: 4,ENCRYPTED`).
//!
//! The key is derived from the passphrase and the first 8 bytes of the IV
//! with one round of the MD5 based `EVP_BytesToKey` construction.

use kagi::Blob;
use kagi::decoder::Decoder;
use kagi::passphrase::{PASSPHRASE_CAPACITY, PassphraseBridge, PassphraseProvider};
use log::debug;
use md5::{Digest, Md5};
use pem::{DEK_INFO, Pem};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::pbe::Cipher;

fn parse_dek_info(value: &str) -> Result<(Cipher, Vec<u8>)> {
    let (name, iv) = value
        .split_once(',')
        .ok_or_else(|| Error::InvalidDekInfo(value.to_string()))?;
    let cipher = Cipher::from_name(name.trim())?;
    let iv = hex::decode(iv.trim()).map_err(|e| Error::InvalidDekInfo(e.to_string()))?;
    if iv.len() != cipher.block_len() {
        return Err(Error::InvalidDekInfo(format!(
            "{} byte IV for {}",
            iv.len(),
            name.trim()
        )));
    }
    Ok((cipher, iv))
}

fn bytes_to_key(secret: &[u8], salt: &[u8], key_len: usize) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(Vec::with_capacity(key_len + 16));
    let mut prev: Option<md5::digest::Output<Md5>> = None;
    while key.len() < key_len {
        let mut hasher = Md5::new();
        if let Some(prev) = prev.as_ref() {
            hasher.update(prev);
        }
        hasher.update(secret);
        hasher.update(salt);
        let block = hasher.finalize();
        key.extend_from_slice(&block);
        prev = Some(block);
    }
    key.truncate(key_len);
    key
}

/// Decrypts the body of an encrypted PEM record.
///
/// The passphrase is requested through [`PassphraseBridge::new`] once per
/// call. Records without `Proc-Type: 4,ENCRYPTED` are rejected with
/// [`Error::NotEncrypted`].
pub fn decrypt_pem(pem: &Pem, provider: &dyn PassphraseProvider) -> Result<Blob> {
    if !pem.is_encrypted() {
        return Err(Error::NotEncrypted);
    }
    let dek_info = pem
        .header(DEK_INFO)
        .ok_or_else(|| Error::InvalidDekInfo("missing".to_string()))?;
    let (cipher, iv) = parse_dek_info(dek_info)?;
    debug!("legacy PEM encryption: {:?}", cipher);
    let body: Blob = pem.decode()?;

    let mut buf = Zeroizing::new([0u8; PASSPHRASE_CAPACITY]);
    let len = PassphraseBridge::new(provider).fill(buf.as_mut_slice())?;
    let key = bytes_to_key(&buf[..len], &iv[..8], cipher.key_len());

    let plaintext = cipher.decrypt(&key, &iv, &body)?;
    Ok(Blob::from_slice(&plaintext))
}
