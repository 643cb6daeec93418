//! Encoder trait, the reverse direction of [`crate::decoder::Decoder`].
//!
//! `Encoder<T, E>` is implemented on the source type `T` and produces `E`.
//! `EncodableTo<T>` marks the valid destination types, e.g. an ASN.1
//! element that can be written out as DER bytes.

/// Encoder trait for converting from type `T` to type `E`.
pub trait Encoder<T, E: EncodableTo<T>> {
    /// The error type returned when encoding fails.
    type Error;

    /// Encodes `self` into type `E`.
    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait indicating that type `E` can be encoded from type `T`.
pub trait EncodableTo<T> {}
