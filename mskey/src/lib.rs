//! # mskey
//!
//! Readers for the Microsoft key formats:
//!
//! - [`msblob`]: `PUBLICKEYBLOB` / `PRIVATEKEYBLOB` with RSA or DSS keys.
//! - [`pvk`]: PVK files, optionally RC4 encrypted with a passphrase.
//!
//! Both produce a [`KeyObject`], which can be exported as DER or PEM:
//!
//! ```no_run
//! use kagi::passphrase::FixedPassphrase;
//! use pem::ToPem;
//!
//! let file = std::fs::File::open("key.pvk").unwrap();
//! let key = mskey::pvk::read_pvk(file, &FixedPassphrase::new("secret")).unwrap();
//! println!("{}", key.to_pem().unwrap());
//! ```

pub mod error;
mod key;
pub mod msblob;
pub mod pvk;

pub use error::{Error, Result};
pub use key::{Algorithm, DsaKey, KeyMaterial, KeyObject, OID_DSA, RsaKey, RsaPrivate, Visibility};
