//! # loader
//!
//! Detects the container format of a key and decrypts it.
//!
//! The input is buffered once and offered to each reader in order (PEM,
//! PVK, MSBLOB, DER by default). A reader that does not recognize its
//! format lets the next one try. Any other failure stops the chain.
//!
//! PEM and DER results go through the PKCS#8 decryptor: legacy
//! `Proc-Type: 4,ENCRYPTED` records are decrypted first, and an
//! EncryptedPrivateKeyInfo is replaced by its PrivateKeyInfo.
//!
//! ```no_run
//! use kagi::passphrase::FixedPassphrase;
//! use loader::{LoadedKey, Loader};
//!
//! let file = std::fs::File::open("key.pem").unwrap();
//! match Loader::default().load(file, &FixedPassphrase::new("secret")).unwrap() {
//!     LoadedKey::Der { label, der, .. } => println!("{:?}: {} bytes", label, der.len()),
//!     LoadedKey::Key(key) => println!("{:?} key, {} bits", key.algorithm(), key.bits()),
//! }
//! ```

pub mod error;
pub mod format;
mod loader;
mod options;

pub use error::{Error, ErrorKind, Result};
pub use format::{Attempt, Context, Decoded, FormatReader};
pub use loader::{LoadedKey, Loader, load, load_as};
pub use options::{DEFAULT_MAX_INPUT_LEN, InputType, LoadOptions};
