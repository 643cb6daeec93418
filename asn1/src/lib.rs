use std::{fmt::Display, str::FromStr};

use der::{Class, PrimitiveTag, Tag, Tlv};
use error::Error;
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::ToPrimitive;

pub mod error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    ContextSpecific {
        slot: u32,
        constructed: bool,
        element: Box<Element>,
    },
    /// Any other value, kept as its tag and contents octets.
    Unimplemented { tag: Tag, value: Vec<u8> },
}

impl Element {
    pub fn as_sequence(&self) -> Option<&[Element]> {
        match self {
            Element::Sequence(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Element::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_octet_string(&self) -> Option<&OctetString> {
        match self {
            Element::OctetString(os) => Some(os),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&ObjectIdentifier> {
        match self {
            Element::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }
}

/// Deepest nesting of constructed values accepted when decoding.
pub const MAX_DEPTH: usize = 32;

fn elements_of(tlv: &Tlv<'_>, depth: usize) -> Result<Vec<Element>, Error> {
    tlv.children()?
        .iter()
        .map(|child| Element::from_tlv(child, depth + 1))
        .collect()
}

impl TryFrom<&Tlv<'_>> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv<'_>) -> Result<Self, Self::Error> {
        Element::from_tlv(tlv, 0)
    }
}

impl Element {
    fn from_tlv(tlv: &Tlv<'_>, depth: usize) -> Result<Self, Error> {
        if depth > MAX_DEPTH {
            return Err(Error::NestingTooDeep(MAX_DEPTH));
        }
        let tag = tlv.tag();
        let data = tlv.value();
        if tag.class() == Class::ContextSpecific {
            let slot = tag.number();
            if tag.is_constructed() {
                // EXPLICIT tagging: exactly one nested value
                let children = tlv.children()?;
                return match children.as_slice() {
                    [inner] => Ok(Element::ContextSpecific {
                        slot,
                        constructed: true,
                        element: Box::new(Element::from_tlv(inner, depth + 1)?),
                    }),
                    _ => Err(Error::InvalidContextSpecific {
                        slot,
                        msg: "context-specific constructed must have exactly one sub-tlv"
                            .to_string(),
                    }),
                };
            }
            // IMPLICIT tagging: the upper layer interprets the raw contents
            return Ok(Element::ContextSpecific {
                slot,
                constructed: false,
                element: Box::new(Element::OctetString(OctetString::from(data))),
            });
        }

        match tag.primitive() {
            Some(PrimitiveTag::Boolean) => match data {
                [0x00] => Ok(Element::Boolean(false)),
                [0xff] => Ok(Element::Boolean(true)),
                _ => Err(Error::InvalidBoolean),
            },
            Some(PrimitiveTag::Integer) => {
                if data.is_empty() {
                    return Err(Error::IntegerNoData);
                }
                Ok(Element::Integer(Integer::from(data)))
            }
            Some(PrimitiveTag::BitString) if !tag.is_constructed() => {
                Ok(Element::BitString(BitString::try_from(data)?))
            }
            Some(PrimitiveTag::OctetString) if !tag.is_constructed() => {
                Ok(Element::OctetString(OctetString::from(data)))
            }
            Some(PrimitiveTag::Null) => {
                if !data.is_empty() {
                    return Err(Error::InvalidNull);
                }
                Ok(Element::Null)
            }
            Some(PrimitiveTag::ObjectIdentifier) => {
                Ok(Element::ObjectIdentifier(ObjectIdentifier::try_from(data)?))
            }
            Some(PrimitiveTag::Sequence) if tag.is_constructed() => {
                Ok(Element::Sequence(elements_of(tlv, depth)?))
            }
            Some(PrimitiveTag::Set) if tag.is_constructed() => {
                Ok(Element::Set(elements_of(tlv, depth)?))
            }
            _ => Ok(Element::Unimplemented {
                tag,
                value: data.to_vec(),
            }),
        }
    }
}

impl<'a> DecodableFrom<Tlv<'a>> for Element {}

impl<'a> Decoder<Tlv<'a>, Element> for Tlv<'a> {
    type Error = Error;

    fn decode(&self) -> Result<Element, Self::Error> {
        Element::try_from(self)
    }
}

impl<'a> DecodableFrom<&'a [u8]> for Element {}

impl<'a> Decoder<&'a [u8], Element> for &'a [u8] {
    type Error = Error;

    /// Parses exactly one DER value.
    fn decode(&self) -> Result<Element, Self::Error> {
        let tlv = Tlv::from_der(self)?;
        Element::try_from(&tlv)
    }
}

impl Element {
    fn write_der(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        match self {
            Element::Boolean(b) => {
                der::write_tlv(
                    Tag::universal(PrimitiveTag::Boolean.into(), false),
                    &[if *b { 0xff } else { 0x00 }],
                    out,
                );
            }
            Element::Integer(i) => der::write_tlv(Tag::INTEGER, &i.to_signed_bytes_be(), out),
            Element::BitString(bs) => {
                let mut value = Vec::with_capacity(bs.data.len() + 1);
                value.push(bs.unused);
                value.extend_from_slice(&bs.data);
                der::write_tlv(Tag::universal(PrimitiveTag::BitString.into(), false), &value, out)
            }
            Element::OctetString(os) => der::write_tlv(Tag::OCTET_STRING, os.as_bytes(), out),
            Element::Null => der::write_tlv(Tag::NULL, &[], out),
            Element::ObjectIdentifier(oid) => {
                der::write_tlv(Tag::OBJECT_IDENTIFIER, &Vec::<u8>::try_from(oid)?, out)
            }
            Element::Sequence(elements) => {
                der::write_tlv(Tag::SEQUENCE, &encode_all(elements)?, out)
            }
            Element::Set(elements) => der::write_tlv(Tag::SET, &encode_all(elements)?, out),
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => {
                let tag = Tag::context_specific(*slot, *constructed);
                if *constructed {
                    // EXPLICIT tagging: wrap the inner element
                    let mut inner = Vec::new();
                    element.write_der(&mut inner)?;
                    der::write_tlv(tag, &inner, out);
                } else {
                    // IMPLICIT tagging: only raw contents can be re-tagged
                    match element.as_ref() {
                        Element::OctetString(os) => der::write_tlv(tag, os.as_bytes(), out),
                        _ => {
                            return Err(Error::ElementCannotEncode(
                                "IMPLICIT tagging of a non OCTET STRING element",
                            ));
                        }
                    }
                }
            }
            Element::Unimplemented { tag, value } => der::write_tlv(*tag, value, out),
        }
        Ok(())
    }
}

fn encode_all(elements: &[Element]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    for element in elements {
        element.write_der(&mut out)?;
    }
    Ok(out)
}

impl EncodableTo<Element> for Vec<u8> {}

impl Encoder<Element, Vec<u8>> for Element {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let mut out = Vec::new();
        self.write_der(&mut out)?;
        Ok(out)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Boolean(b) => write!(f, "Boolean({})", b),
            Element::Integer(i) => write!(f, "Integer({})", i),
            Element::BitString(bs) => write!(f, "BitString({} bits)", bs.bit_len()),
            Element::OctetString(os) => write!(f, "OctetString({})", os),
            Element::Null => write!(f, "Null"),
            Element::ObjectIdentifier(oid) => write!(f, "ObjectIdentifier({})", oid),
            Element::Sequence(seq) => write!(f, "Sequence({:?})", seq),
            Element::Set(set) => write!(f, "Set({:?})", set),
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => write!(
                f,
                "ContextSpecific(slot: {}, constructed: {}, element: {})",
                slot, constructed, element
            ),
            Element::Unimplemented { tag, value } => {
                write!(f, "Unimplemented({:?}, {} bytes)", tag, value.len())
            }
        }
    }
}

// ASN1 integer is possible to be a positive and negative value.
// This can be arbitrary sized values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    /// Returns a reference to the inner BigInt
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    /// Converts the Integer to u32 if it fits in the range
    pub fn to_u32(&self) -> Option<u32> {
        self.inner.to_u32()
    }

    /// Converts the Integer to u64 if it fits in the range
    pub fn to_u64(&self) -> Option<u64> {
        self.inner.to_u64()
    }

    /// Converts the Integer to usize if it fits in the range
    pub fn to_usize(&self) -> Option<usize> {
        self.inner.to_usize()
    }

    /// Minimal two's complement big endian encoding.
    pub fn to_signed_bytes_be(&self) -> Vec<u8> {
        self.inner.to_signed_bytes_be()
    }
}

impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(value),
        }
    }
}

impl From<BigInt> for Integer {
    fn from(value: BigInt) -> Self {
        Integer { inner: value }
    }
}

impl From<BigUint> for Integer {
    fn from(value: BigUint) -> Self {
        Integer {
            inner: BigInt::from_biguint(Sign::Plus, value),
        }
    }
}

impl From<&BigUint> for Integer {
    fn from(value: &BigUint) -> Self {
        Integer::from(value.clone())
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

impl TryFrom<&Integer> for u64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.inner.to_u64().ok_or(Error::IntegerOutOfRange)
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn components(&self) -> &[u64] {
        &self.inner
    }
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(Error::ObjectIdentifierNoData);
        }

        let mut subidentifiers = Vec::new();
        let mut val = 0u64;
        let mut pending = false;
        for v in value.iter() {
            if !pending && *v == 0x80 {
                // a subidentifier must not start with a padding group
                return Err(Error::ObjectIdentifierIncompleteEncoding);
            }
            if val > (u64::MAX >> 7) {
                return Err(Error::ObjectIdentifierInvalidComponent(format!(
                    "{}...",
                    val
                )));
            }
            val = (val << 7) | (*v as u64 & 0x7F);
            pending = *v & 0x80 != 0;
            if !pending {
                // If the continuation bit is not set, we have reached the end of this value
                subidentifiers.push(val);
                val = 0;
            }
        }
        if pending {
            // If there is a leftover value, it means the encoding was incorrect
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        // The first subidentifier packs the first two arcs.
        let first = subidentifiers[0];
        let (a, b) = match first {
            0..40 => (0, first),
            40..80 => (1, first - 40),
            _ => (2, first - 80),
        };
        let mut inner = vec![a, b];
        inner.extend_from_slice(&subidentifiers[1..]);
        Ok(ObjectIdentifier { inner })
    }
}

impl TryFrom<&ObjectIdentifier> for Vec<u8> {
    type Error = Error;

    fn try_from(oid: &ObjectIdentifier) -> Result<Self, Self::Error> {
        if oid.inner.len() < 2 {
            return Err(Error::ObjectIdentifierTooFewComponents);
        }
        let (a, b) = (oid.inner[0], oid.inner[1]);
        if a > 2 || (a < 2 && b >= 40) {
            return Err(Error::ObjectIdentifierInvalidComponent(format!("{}.{}", a, b)));
        }
        let first = (a * 40)
            .checked_add(b)
            .ok_or_else(|| Error::ObjectIdentifierInvalidComponent(b.to_string()))?;

        let mut result = Vec::new();
        for v in std::iter::once(first).chain(oid.inner[2..].iter().copied()) {
            let mut encoded = vec![(v & 0x7F) as u8];
            let mut value = v >> 7;
            while value > 0 {
                encoded.push((value & 0x7F) as u8 | 0x80);
                value >>= 7;
            }
            result.extend(encoded.iter().rev());
        }
        Ok(result)
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", s)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split('.')
            .map(|s| s.parse::<u64>().map_err(Error::ParseInt))
            .collect::<Result<Vec<u64>, Error>>()?;
        if values.len() < 2 {
            return Err(Error::ObjectIdentifierTooFewComponents);
        }
        Ok(ObjectIdentifier { inner: values })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

/// BIT STRING contents: the number of unused trailing bits and the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    pub fn new(unused: u8, data: Vec<u8>) -> Result<Self, Error> {
        if unused > 7 || (data.is_empty() && unused != 0) {
            return Err(Error::BitStringUnusedBitsOutOfRange(unused));
        }
        Ok(BitString { unused, data })
    }

    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 - usize::from(self.unused)
    }
}

impl From<Vec<u8>> for BitString {
    /// A BIT STRING with no unused bits.
    fn from(data: Vec<u8>) -> Self {
        BitString { unused: 0, data }
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value.split_first() {
            Some((&unused, data)) => BitString::new(unused, data.to_vec()),
            None => Err(Error::BitStringNoData),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl OctetString {
    /// Returns the inner bytes as a slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Consumes self and returns the inner bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        OctetString { inner: value }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl Display for OctetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<String>>()
            .join("");
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use rstest::rstest;
    use std::str::FromStr;

    use super::*;

    #[rstest(input, expected,
        case(vec![0x01], "1"),
        case(vec![0x00, 0x80], "128"),
        case(vec![0xff], "-1"),
        case(vec![0x03, 0xd4, 0x15, 0x31, 0x8e, 0x2c, 0x57, 0x1d, 0x29, 0x05, 0xfc, 0x3e, 0x05, 0x27, 0x68, 0x9d, 0x0d, 0x09], "333504890676592408951587385614406537514249"),
    )]
    fn test_parse_element_integer(input: Vec<u8>, expected: &str) {
        let expected_num = Integer {
            inner: BigInt::from_str(expected).unwrap(),
        };

        let value = Integer::from(input.as_slice());

        assert_eq!(expected_num, value);
        assert_eq!(input, value.to_signed_bytes_be());
    }

    #[rstest(input, expected,
        case(vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x05, 0x0d], "1.2.840.113549.1.5.13"),
        case(vec![0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x01, 0x2a], "2.16.840.1.101.3.4.1.42"),
        case(vec![0x2b, 0x0e, 0x03, 0x02, 0x07], "1.3.14.3.2.7"),
        case(vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x03, 0x07], "1.2.840.113549.3.7"),
        case(vec![0x88, 0x37, 0x00], "2.999.0"),
    )]
    fn test_object_identifier(input: Vec<u8>, expected: &str) {
        let oid = ObjectIdentifier::try_from(input.as_slice()).unwrap();
        assert_eq!(expected, oid.to_string());
        assert!(oid == expected);

        let parsed = ObjectIdentifier::from_str(expected).unwrap();
        assert_eq!(input, Vec::<u8>::try_from(&parsed).unwrap());
    }

    #[rstest(input,
        case(vec![]),
        case(vec![0x2a, 0x86]),
        case(vec![0x2a, 0x80, 0x01]),
    )]
    fn test_object_identifier_invalid(input: Vec<u8>) {
        assert!(ObjectIdentifier::try_from(input.as_slice()).is_err());
    }

    #[test]
    fn test_decode_sequence() {
        // SEQUENCE { OID 1.2.840.113549.1.5.12, SEQUENCE { OCTET STRING, INTEGER 2048 } }
        let input: Vec<u8> = vec![
            0x30, 0x17, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x05, 0x0c, 0x30,
            0x0a, 0x04, 0x04, 0x01, 0x02, 0x03, 0x04, 0x02, 0x02, 0x08, 0x00,
        ];
        let element: Element = input.as_slice().decode().unwrap();

        let seq = element.as_sequence().unwrap();
        assert_eq!(2, seq.len());
        assert!(*seq[0].as_oid().unwrap() == "1.2.840.113549.1.5.12");
        let params = seq[1].as_sequence().unwrap();
        assert_eq!(
            &[1, 2, 3, 4],
            params[0].as_octet_string().unwrap().as_bytes()
        );
        assert_eq!(Some(2048), params[1].as_integer().unwrap().to_u32());

        let encoded: Vec<u8> = element.encode().unwrap();
        assert_eq!(input, encoded);
    }

    #[rstest(input,
        case(vec![0x01, 0x01, 0x01]),
        case(vec![0x02, 0x00]),
        case(vec![0x05, 0x01, 0x00]),
        case(vec![0xa0, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]),
        case(vec![0x03, 0x00]),
        case(vec![0x03, 0x02, 0x08, 0x00]),
        case(vec![0x03, 0x01, 0x01]),
    )]
    fn test_decode_invalid(input: Vec<u8>) {
        let result: Result<Element, Error> = input.as_slice().decode();
        assert!(result.is_err());
    }

    fn nested_sequences(depth: usize) -> Vec<u8> {
        let mut der = vec![0x30, 0x00];
        for _ in 0..depth {
            let mut outer = Vec::new();
            der::write_tlv(Tag::SEQUENCE, &der, &mut outer);
            der = outer;
        }
        der
    }

    #[rstest(depth, ok,
        case(MAX_DEPTH, true),
        case(MAX_DEPTH + 1, false),
        case(5_000, false),
    )]
    fn test_decode_nesting_limit(depth: usize, ok: bool) {
        let input = nested_sequences(depth);
        let result: Result<Element, Error> = input.as_slice().decode();
        match result {
            Ok(_) => assert!(ok),
            Err(Error::NestingTooDeep(max)) => {
                assert!(!ok);
                assert_eq!(MAX_DEPTH, max);
            }
            Err(e) => panic!("unexpected {:?}", e),
        }
    }

    #[rstest(element,
        case(Element::Boolean(true)),
        case(Element::Null),
        case(Element::Integer(Integer::from(65537u64))),
        case(Element::ContextSpecific { slot: 0, constructed: true, element: Box::new(Element::Integer(Integer::from(1u64))) }),
        case(Element::ContextSpecific { slot: 1, constructed: false, element: Box::new(Element::OctetString(OctetString::from(vec![0xaa, 0xbb]))) }),
        case(Element::Unimplemented { tag: Tag::universal(0x0c, false), value: b"kagi".to_vec() }),
        case(Element::BitString(BitString::from(vec![0x02, 0x01, 0x05]))),
        case(Element::BitString(BitString::new(4, vec![0xa0]).unwrap())),
    )]
    fn test_encode_decode(element: Element) {
        let encoded: Vec<u8> = element.encode().unwrap();
        let decoded: Element = encoded.as_slice().decode().unwrap();
        assert_eq!(element, decoded);
    }
}
