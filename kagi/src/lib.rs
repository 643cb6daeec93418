//! # kagi
//!
//! Core traits and shared types for the kagi key loading crates.
//!
//! ## Overview
//!
//! Loading a key is a chain of conversions:
//! ```text
//! bytes → PEM / DER / MSBLOB / PVK → Blob → (decrypt) → DER key material
//! ```
//!
//! Each step uses the [`decoder::Decoder`] trait, and the reverse direction
//! uses [`encoder::Encoder`]. The marker traits (`DecodableFrom`,
//! `EncodableTo`) restrict conversions to the pairs that make sense.
//!
//! This crate also defines the two values every reader shares:
//!
//! - [`Blob`]: an owned buffer whose length is exactly its content.
//! - [`passphrase::PassphraseProvider`]: the capability used to obtain a
//!   secret, together with [`passphrase::PassphraseBridge`] which copies
//!   that secret into a fixed-size buffer for the legacy decoders.
//!
//! ## Example
//!
//! ```
//! use kagi::passphrase::{FixedPassphrase, PassphraseBridge, PASSPHRASE_CAPACITY};
//!
//! let provider = FixedPassphrase::new("correct-horse");
//! let bridge = PassphraseBridge::new(&provider);
//! let mut buf = [0u8; PASSPHRASE_CAPACITY];
//! let len = bridge.fill(&mut buf).unwrap();
//! assert_eq!(b"correct-horse", &buf[..len]);
//! ```

#![forbid(unsafe_code)]

mod blob;

pub mod decoder;
pub mod encoder;
pub mod passphrase;

pub use blob::Blob;
