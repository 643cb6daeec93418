//! DER framing (ITU-T X.690).
//!
//! This crate only deals with the identifier/length/contents structure of
//! DER values. The meaning of the contents lives in the `asn1` crate.

use kagi::decoder::{DecodableFrom, Decoder};
use nom::{IResult, Parser};

pub mod error;
mod reader;

pub use reader::read_der;

use error::{Error, Result};

pub const TAG_CONSTRUCTED: u8 = 0x20;
const TAG_NUMBER_MASK: u8 = 0x1f;
const LENGTH_LONG_FORM: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Class {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl From<u8> for Class {
    fn from(value: u8) -> Self {
        match value >> 6 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::ContextSpecific,
            _ => Class::Private,
        }
    }
}

impl From<Class> for u8 {
    fn from(value: Class) -> Self {
        match value {
            Class::Universal => 0x00,
            Class::Application => 0x40,
            Class::ContextSpecific => 0x80,
            Class::Private => 0xc0,
        }
    }
}

/// Universal tag numbers used by key structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrimitiveTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Sequence,
    Set,
    Unimplemented(u32),
}

impl From<u32> for PrimitiveTag {
    fn from(value: u32) -> Self {
        match value {
            0x01 => Self::Boolean,
            0x02 => Self::Integer,
            0x03 => Self::BitString,
            0x04 => Self::OctetString,
            0x05 => Self::Null,
            0x06 => Self::ObjectIdentifier,
            0x10 => Self::Sequence,
            0x11 => Self::Set,
            _ => Self::Unimplemented(value),
        }
    }
}

impl From<PrimitiveTag> for u32 {
    fn from(value: PrimitiveTag) -> Self {
        match value {
            PrimitiveTag::Boolean => 0x01,
            PrimitiveTag::Integer => 0x02,
            PrimitiveTag::BitString => 0x03,
            PrimitiveTag::OctetString => 0x04,
            PrimitiveTag::Null => 0x05,
            PrimitiveTag::ObjectIdentifier => 0x06,
            PrimitiveTag::Sequence => 0x10,
            PrimitiveTag::Set => 0x11,
            PrimitiveTag::Unimplemented(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tag {
    class: Class,
    constructed: bool,
    number: u32,
}

impl Tag {
    pub const SEQUENCE: Tag = Tag::universal(0x10, true);
    pub const SET: Tag = Tag::universal(0x11, true);
    pub const INTEGER: Tag = Tag::universal(0x02, false);
    pub const OCTET_STRING: Tag = Tag::universal(0x04, false);
    pub const OBJECT_IDENTIFIER: Tag = Tag::universal(0x06, false);
    pub const NULL: Tag = Tag::universal(0x05, false);

    pub const fn new(class: Class, constructed: bool, number: u32) -> Self {
        Tag {
            class,
            constructed,
            number,
        }
    }

    pub const fn universal(number: u32, constructed: bool) -> Self {
        Tag::new(Class::Universal, constructed, number)
    }

    pub const fn context_specific(slot: u32, constructed: bool) -> Self {
        Tag::new(Class::ContextSpecific, constructed, slot)
    }

    pub fn class(&self) -> Class {
        self.class
    }

    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// The universal type of this tag, if it is in the universal class.
    pub fn primitive(&self) -> Option<PrimitiveTag> {
        match self.class {
            Class::Universal => Some(PrimitiveTag::from(self.number)),
            _ => None,
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut first = u8::from(self.class);
        if self.constructed {
            first |= TAG_CONSTRUCTED;
        }
        if self.number < u32::from(TAG_NUMBER_MASK) {
            out.push(first | self.number as u8);
            return;
        }
        out.push(first | TAG_NUMBER_MASK);
        let mut groups = Vec::new();
        let mut n = self.number;
        while n > 0 {
            groups.push((n & 0x7f) as u8);
            n >>= 7;
        }
        while let Some(b) = groups.pop() {
            if groups.is_empty() {
                out.push(b);
            } else {
                out.push(b | 0x80);
            }
        }
    }
}

/// Identifier and length octets of one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: Tag,
    pub length: usize,
    pub header_len: usize,
}

impl Header {
    /// Size of the complete value, identifier and length octets included.
    pub fn total_len(&self) -> Option<usize> {
        self.header_len.checked_add(self.length)
    }
}

fn failure(input: &[u8], kind: nom::error::ErrorKind) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Failure(nom::error::Error::new(input, kind))
}

pub fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag> {
    let (mut rest, first) = nom::number::streaming::be_u8(input)?;
    let class = Class::from(first);
    let constructed = first & TAG_CONSTRUCTED == TAG_CONSTRUCTED;
    let number = first & TAG_NUMBER_MASK;
    if number != TAG_NUMBER_MASK {
        return Ok((rest, Tag::new(class, constructed, u32::from(number))));
    }

    // high tag number form: base 128, most significant group first.
    let mut number = 0u32;
    loop {
        let (r, b) = nom::number::streaming::be_u8(rest)?;
        rest = r;
        if number == 0 && b == 0x80 {
            return Err(failure(input, nom::error::ErrorKind::Tag));
        }
        if number > (u32::MAX >> 7) {
            return Err(failure(input, nom::error::ErrorKind::TooLarge));
        }
        number = (number << 7) | u32::from(b & 0x7f);
        if b & 0x80 == 0 {
            break;
        }
    }
    if number < u32::from(TAG_NUMBER_MASK) {
        return Err(failure(input, nom::error::ErrorKind::Tag));
    }
    Ok((rest, Tag::new(class, constructed, number)))
}

pub fn parse_length(input: &[u8]) -> IResult<&[u8], usize> {
    let (rest, n) = nom::number::streaming::be_u8(input)?;
    if n & LENGTH_LONG_FORM == 0 {
        // short form: 0-127
        return Ok((rest, n as usize));
    }
    // long form
    // First 1 bit is a marker for long form.
    // Other bits represent bytes length of the length field.
    let count = (n & 0x7f) as usize;
    if count == 0 || count == 0x7f {
        // indefinite length (BER only) and the reserved value
        return Err(failure(input, nom::error::ErrorKind::Verify));
    }
    if count > size_of::<usize>() {
        return Err(failure(input, nom::error::ErrorKind::TooLarge));
    }
    let (rest, bs) = nom::bytes::streaming::take(count).parse(rest)?;
    if bs[0] == 0 {
        return Err(failure(input, nom::error::ErrorKind::Verify));
    }
    let length = bs.iter().fold(0usize, |n, &b| (n << 8) | b as usize);
    if length < LENGTH_LONG_FORM as usize {
        return Err(failure(input, nom::error::ErrorKind::Verify));
    }
    Ok((rest, length))
}

pub fn parse_header(input: &[u8]) -> IResult<&[u8], Header> {
    let (rest, tag) = parse_tag(input)?;
    let (rest, length) = parse_length(rest)?;
    let header_len = input.len() - rest.len();
    Ok((
        rest,
        Header {
            tag,
            length,
            header_len,
        },
    ))
}

/// Size of the first complete DER value in `input`.
///
/// Bytes after that value are not examined.
pub fn frame_len(input: &[u8]) -> Result<usize> {
    let (_, header) = parse_header(input)?;
    let total = header.total_len().ok_or(Error::LengthOverflow)?;
    if total > input.len() {
        return Err(Error::Truncated {
            needed: total - input.len(),
        });
    }
    Ok(total)
}

/// Borrowed view of one DER value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    tag: Tag,
    header_len: usize,
    value: &'a [u8],
}

impl<'a> Tlv<'a> {
    pub fn parse(input: &'a [u8]) -> IResult<&'a [u8], Tlv<'a>> {
        let (rest, header) = parse_header(input)?;
        let (rest, value) = nom::bytes::streaming::take(header.length).parse(rest)?;
        Ok((
            rest,
            Tlv {
                tag: header.tag,
                header_len: header.header_len,
                value,
            },
        ))
    }

    /// Parses `input` as exactly one value.
    pub fn from_der(input: &'a [u8]) -> Result<Tlv<'a>> {
        let (rest, tlv) = Tlv::parse(input)?;
        if !rest.is_empty() {
            return Err(Error::TrailingData(rest.len()));
        }
        Ok(tlv)
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Contents octets.
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Size of the encoded value, identifier and length octets included.
    pub fn encoded_len(&self) -> usize {
        self.header_len + self.value.len()
    }

    /// Values nested in a constructed value, in order.
    pub fn children(&self) -> Result<Vec<Tlv<'a>>> {
        if !self.tag.is_constructed() {
            return Err(Error::NotConstructed);
        }
        let mut tlvs = Vec::new();
        let mut data = self.value;
        while !data.is_empty() {
            let (rest, tlv) = Tlv::parse(data)?;
            data = rest;
            tlvs.push(tlv);
        }
        Ok(tlvs)
    }
}

impl<'a> DecodableFrom<&'a [u8]> for Tlv<'a> {}

impl<'a> Decoder<&'a [u8], Tlv<'a>> for &'a [u8] {
    type Error = Error;

    fn decode(&self) -> Result<Tlv<'a>> {
        Tlv::from_der(self)
    }
}

fn encode_length(length: usize, out: &mut Vec<u8>) {
    if length < LENGTH_LONG_FORM as usize {
        out.push(length as u8);
        return;
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(LENGTH_LONG_FORM | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// Appends one DER value with the given tag and contents to `out`.
pub fn write_tlv(tag: Tag, value: &[u8], out: &mut Vec<u8>) {
    tag.encode(out);
    encode_length(value.len(), out);
    out.extend_from_slice(value);
}

/// Encodes one DER value with the given tag and contents.
pub fn encode_tlv(tag: Tag, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len() + 6);
    write_tlv(tag, value, &mut out);
    out
}
