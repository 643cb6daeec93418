//! RFC 5958 EncryptedPrivateKeyInfo

use asn1::{Element, OctetString};
use der::{Tag, Tlv};
use kagi::Blob;
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use log::trace;

use crate::algorithm::AlgorithmIdentifier;
use crate::error::{Error, Result};
use crate::pbe::{Pbes2Params, Scheme};

/// EncryptedPrivateKeyInfo
///
/// ```asn1
/// EncryptedPrivateKeyInfo ::= SEQUENCE {
///     encryptionAlgorithm  EncryptionAlgorithmIdentifier,
///     encryptedData        EncryptedData
/// }
///
/// EncryptedData ::= OCTET STRING
/// ```
///
/// The ciphertext is borrowed from the buffer the envelope was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPrivateKeyInfo<'a> {
    encryption_algorithm: AlgorithmIdentifier,
    encrypted_data: &'a [u8],
    offset: usize,
}

fn not_an_envelope(e: impl std::fmt::Display) -> Error {
    Error::NotAnEnvelope(e.to_string())
}

impl<'a> EncryptedPrivateKeyInfo<'a> {
    /// Parses `der` as exactly one EncryptedPrivateKeyInfo.
    ///
    /// Any mismatch is reported as [`Error::NotAnEnvelope`].
    pub fn parse(der: &'a [u8]) -> Result<Self> {
        let outer = Tlv::from_der(der).map_err(not_an_envelope)?;
        if outer.tag() != Tag::SEQUENCE {
            return Err(not_an_envelope("expected SEQUENCE"));
        }
        let children = outer.children().map_err(not_an_envelope)?;
        let [algorithm, data] = children.as_slice() else {
            return Err(not_an_envelope(format!(
                "expected 2 elements, got {}",
                children.len()
            )));
        };
        if data.tag() != Tag::OCTET_STRING {
            return Err(not_an_envelope("encryptedData must be OCTET STRING"));
        }
        let algorithm = Element::try_from(algorithm).map_err(not_an_envelope)?;
        let encryption_algorithm: AlgorithmIdentifier =
            algorithm.decode().map_err(not_an_envelope)?;

        let offset = outer.header_len() + children[0].encoded_len() + data.header_len();
        Ok(EncryptedPrivateKeyInfo {
            encryption_algorithm,
            encrypted_data: data.value(),
            offset,
        })
    }

    pub fn encryption_algorithm(&self) -> &AlgorithmIdentifier {
        &self.encryption_algorithm
    }

    pub fn ciphertext(&self) -> &'a [u8] {
        self.encrypted_data
    }

    /// Position of the ciphertext inside the parsed buffer.
    pub fn ciphertext_offset(&self) -> usize {
        self.offset
    }

    pub fn ciphertext_len(&self) -> usize {
        self.encrypted_data.len()
    }

    /// The encryption scheme named by the algorithm identifier.
    pub fn scheme(&self) -> Result<Scheme> {
        Scheme::try_from(&self.encryption_algorithm)
    }

    /// Decrypts the envelope with `secret`.
    ///
    /// Returns the unpadded plaintext as is. Checking that it holds a
    /// PrivateKeyInfo is left to the consumer of the key.
    pub fn decrypt(&self, secret: &[u8]) -> Result<Blob> {
        self.decrypt_with(&self.scheme()?, secret)
    }

    pub(crate) fn decrypt_with(&self, scheme: &Scheme, secret: &[u8]) -> Result<Blob> {
        let plaintext = scheme.decrypt(secret, self.encrypted_data)?;
        trace!(
            "decrypted {} of {} bytes",
            plaintext.len(),
            self.encrypted_data.len()
        );
        Ok(Blob::from_slice(&plaintext))
    }

    /// Encrypts `plaintext` with PBES2 and returns the DER encoded envelope.
    pub fn encrypt(plaintext: &[u8], secret: &[u8], params: &Pbes2Params) -> Result<Vec<u8>> {
        let ciphertext = params.encrypt(secret, plaintext)?;
        let envelope = EncryptedPrivateKeyInfo {
            encryption_algorithm: AlgorithmIdentifier::try_from(params)?,
            encrypted_data: &ciphertext,
            offset: 0,
        };
        Encoder::<EncryptedPrivateKeyInfo, Vec<u8>>::encode(&envelope)
    }
}

impl<'a> DecodableFrom<&'a [u8]> for EncryptedPrivateKeyInfo<'a> {}

impl<'a> Decoder<&'a [u8], EncryptedPrivateKeyInfo<'a>> for &'a [u8] {
    type Error = Error;

    fn decode(&self) -> Result<EncryptedPrivateKeyInfo<'a>> {
        EncryptedPrivateKeyInfo::parse(self)
    }
}

impl<'a> EncodableTo<EncryptedPrivateKeyInfo<'a>> for Element {}

impl<'a> Encoder<EncryptedPrivateKeyInfo<'a>, Element> for EncryptedPrivateKeyInfo<'a> {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            self.encryption_algorithm.encode()?,
            Element::OctetString(OctetString::from(self.encrypted_data)),
        ]))
    }
}

impl<'a> EncodableTo<EncryptedPrivateKeyInfo<'a>> for Vec<u8> {}

impl<'a> Encoder<EncryptedPrivateKeyInfo<'a>, Vec<u8>> for EncryptedPrivateKeyInfo<'a> {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        let element: Element = Encoder::<EncryptedPrivateKeyInfo, Element>::encode(self)?;
        Ok(element.encode()?)
    }
}
