//! AlgorithmIdentifier type
//!
//! Defined in RFC 5280 Section 4.1.1.2

use asn1::{Element, ObjectIdentifier};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};

use crate::error::{Error, Result};

pub const OID_PBES2: &str = "1.2.840.113549.1.5.13";
pub const OID_PBKDF2: &str = "1.2.840.113549.1.5.12";
pub const OID_PBE_MD5_DES_CBC: &str = "1.2.840.113549.1.5.3";
pub const OID_PBE_SHA1_DES_CBC: &str = "1.2.840.113549.1.5.10";

pub const OID_HMAC_SHA1: &str = "1.2.840.113549.2.7";
pub const OID_HMAC_SHA224: &str = "1.2.840.113549.2.8";
pub const OID_HMAC_SHA256: &str = "1.2.840.113549.2.9";
pub const OID_HMAC_SHA384: &str = "1.2.840.113549.2.10";
pub const OID_HMAC_SHA512: &str = "1.2.840.113549.2.11";

pub const OID_AES128_CBC: &str = "2.16.840.1.101.3.4.1.2";
pub const OID_AES192_CBC: &str = "2.16.840.1.101.3.4.1.22";
pub const OID_AES256_CBC: &str = "2.16.840.1.101.3.4.1.42";
pub const OID_DES_EDE3_CBC: &str = "1.2.840.113549.3.7";
pub const OID_DES_CBC: &str = "1.3.14.3.2.7";

/// Algorithm Identifier
///
/// ```asn1
/// AlgorithmIdentifier ::= SEQUENCE {
///     algorithm   OBJECT IDENTIFIER,
///     parameters  ANY DEFINED BY algorithm OPTIONAL
/// }
/// ```
///
/// `parameters` is `None` when the field is omitted. An explicit NULL is
/// kept as `Some(Element::Null)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    pub parameters: Option<Element>,
}

impl AlgorithmIdentifier {
    pub fn new(algorithm: ObjectIdentifier) -> Self {
        Self {
            algorithm,
            parameters: None,
        }
    }

    pub fn new_with_params(algorithm: ObjectIdentifier, parameters: Element) -> Self {
        Self {
            algorithm,
            parameters: Some(parameters),
        }
    }

    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    pub fn parameters(&self) -> Option<&Element> {
        self.parameters.as_ref()
    }

    /// True when the parameters are absent or an explicit NULL.
    pub fn has_no_parameters(&self) -> bool {
        matches!(self.parameters, None | Some(Element::Null))
    }
}

impl DecodableFrom<Element> for AlgorithmIdentifier {}

impl Decoder<Element, AlgorithmIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AlgorithmIdentifier> {
        match self {
            Element::Sequence(elements) => {
                let (algorithm, parameters) = match elements.as_slice() {
                    [Element::ObjectIdentifier(oid)] => (oid.clone(), None),
                    [Element::ObjectIdentifier(oid), params] => (oid.clone(), Some(params.clone())),
                    _ => {
                        return Err(Error::InvalidParameters(
                            "AlgorithmIdentifier must be an OBJECT IDENTIFIER and optional parameters",
                        ));
                    }
                };
                Ok(AlgorithmIdentifier {
                    algorithm,
                    parameters,
                })
            }
            _ => Err(Error::InvalidParameters(
                "AlgorithmIdentifier must be a SEQUENCE",
            )),
        }
    }
}

impl EncodableTo<AlgorithmIdentifier> for Element {}

impl Encoder<AlgorithmIdentifier, Element> for AlgorithmIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![Element::ObjectIdentifier(self.algorithm.clone())];
        if let Some(params) = &self.parameters {
            elements.push(params.clone());
        }
        Ok(Element::Sequence(elements))
    }
}
