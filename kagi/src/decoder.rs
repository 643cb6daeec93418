//! Decoder trait for type-safe conversions.
//!
//! The `Decoder` trait converts a source type `T` into a destination type
//! `D`. Every stage of the key loading pipeline is one such conversion:
//! PEM text into a [`Pem`](../../pem/struct.Pem.html) record, a record into
//! a [`Blob`](crate::Blob), a blob into an ASN.1 element or a key object.
//!
//! # Design Pattern
//!
//! The decoder uses a two-trait pattern for type safety:
//!
//! 1. `Decoder<T, D>` - Performs the actual conversion
//! 2. `DecodableFrom<T>` - Marker trait constraining valid conversions
//!
//! Only conversions that were explicitly declared compile.
//!
//! # Implementation Guide
//!
//! ```no_run
//! use kagi::decoder::{DecodableFrom, Decoder};
//!
//! struct Armored(String);
//! struct Raw(Vec<u8>);
//!
//! #[derive(Debug)]
//! struct BadArmor;
//!
//! // 1. Mark the destination type as decodable from the source type
//! impl DecodableFrom<Armored> for Raw {}
//!
//! // 2. Implement the decoder on the source type
//! impl Decoder<Armored, Raw> for Armored {
//!     type Error = BadArmor;
//!
//!     fn decode(&self) -> Result<Raw, Self::Error> {
//!         Ok(Raw(self.0.as_bytes().to_vec()))
//!     }
//! }
//! ```

/// Decoder trait for converting from type `T` to type `D`.
///
/// This trait is implemented by the source type `T`. The destination type
/// must implement `DecodableFrom<T>`.
///
/// # Type Parameters
///
/// * `T` - The source type (usually `Self`)
/// * `D` - The destination type that can be decoded from `T`
///
/// # Examples
///
/// ```ignore
/// use kagi::decoder::Decoder;
/// use pem::Pem;
///
/// let pem: Pem = text.parse()?;
/// let blob: kagi::Blob = pem.decode()?;
/// ```
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails. The specific error
    /// conditions depend on the implementing type.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
///
/// It has no methods. Implement it for each destination type that may be
/// produced from a given source type:
///
/// ```no_run
/// use kagi::decoder::DecodableFrom;
///
/// struct Envelope;
/// struct Plaintext;
///
/// impl DecodableFrom<Envelope> for Plaintext {}
/// ```
pub trait DecodableFrom<T> {}
