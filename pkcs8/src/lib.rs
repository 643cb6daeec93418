//! # pkcs8
//!
//! Password based decryption of private keys.
//!
//! - [`decrypt_der`]: an RFC 5958 `EncryptedPrivateKeyInfo` protected with
//!   PBES2 (PBKDF2 + AES/3DES/DES CBC) or PBES1 (PBKDF1 + DES CBC).
//! - [`legacy::decrypt_pem`]: a PEM record carrying `Proc-Type: 4,ENCRYPTED`
//!   and `DEK-Info` headers.
//!
//! Both return the decrypted DER key material as a [`kagi::Blob`]. A wrong
//! passphrase is reported as [`Error::DecryptFailed`], the same as corrupted
//! ciphertext.
//!
//! ## Example
//!
//! ```
//! use kagi::passphrase::FixedPassphrase;
//! use pkcs8::{EncryptedPrivateKeyInfo, Pbes2Params};
//!
//! // SEQUENCE { OCTET STRING "key" }
//! let key = [0x30, 0x05, 0x04, 0x03, b'k', b'e', b'y'];
//! let params = Pbes2Params::aes256_cbc(b"saltsalt", 2048, [7u8; 16]);
//! let der = EncryptedPrivateKeyInfo::encrypt(&key, b"correct-horse", &params).unwrap();
//!
//! let blob = pkcs8::decrypt_der(&der, &FixedPassphrase::new("correct-horse")).unwrap();
//! assert_eq!(&key[..], blob.as_bytes());
//! ```

mod algorithm;
mod encrypted;
pub mod error;
pub mod legacy;
mod pbe;

use kagi::Blob;
use kagi::passphrase::{PASSPHRASE_CAPACITY, PassphraseBridge, PassphraseProvider};
use zeroize::Zeroizing;

pub use algorithm::AlgorithmIdentifier;
pub use encrypted::EncryptedPrivateKeyInfo;
pub use error::{Error, Result};
pub use pbe::{Cipher, MAX_ITERATIONS, Pbes1Digest, Pbes2Params, Prf, Scheme};

/// Decrypts an `EncryptedPrivateKeyInfo` held in `der`.
///
/// The envelope and its algorithm parameters are checked before the provider
/// is asked for a passphrase, so an input that is not an envelope
/// ([`Error::NotAnEnvelope`]) or uses an unknown algorithm never prompts.
/// The provider receives an empty prompt context.
pub fn decrypt_der(der: &[u8], provider: &dyn PassphraseProvider) -> Result<Blob> {
    let envelope = EncryptedPrivateKeyInfo::parse(der)?;
    let scheme = envelope.scheme()?;

    let mut buf = Zeroizing::new([0u8; PASSPHRASE_CAPACITY]);
    let len = PassphraseBridge::without_prompt(provider).fill(buf.as_mut_slice())?;
    envelope.decrypt_with(&scheme, &buf[..len])
}
