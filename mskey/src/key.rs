use std::str::FromStr;

use asn1::{BitString, Element, Integer, ObjectIdentifier};
use kagi::encoder::{EncodableTo, Encoder};
use num_bigint::BigUint;
use pem::{Label, Pem, ToPem};

use crate::error::{Error, Result};

/// id-dsa (RFC 3279)
pub const OID_DSA: &str = "1.2.840.10040.4.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Key algorithm named by the blob magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Rsa,
    Dsa,
}

/*
RSAPrivateKey ::= SEQUENCE {
    version           Version,
    modulus           INTEGER,  -- n
    publicExponent    INTEGER,  -- e
    privateExponent   INTEGER,  -- d
    prime1            INTEGER,  -- p
    prime2            INTEGER,  -- q
    exponent1         INTEGER,  -- d mod (p-1)
    exponent2         INTEGER,  -- d mod (q-1)
    coefficient       INTEGER,  -- (inverse of q) mod p
}
*/

/// Private half of an RSA key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivate {
    pub private_exponent: BigUint, // d
    pub prime1: BigUint,           // p
    pub prime2: BigUint,           // q
    pub exponent1: BigUint,        // d mod (p-1)
    pub exponent2: BigUint,        // d mod (q-1)
    pub coefficient: BigUint,      // (inverse of q) mod p
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaKey {
    pub modulus: BigUint,
    pub public_exponent: BigUint,
    pub private: Option<RsaPrivate>,
}

/// DSA domain parameters with the public value and, for private keys, `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsaKey {
    pub p: BigUint,
    pub q: BigUint,
    pub g: BigUint,
    pub y: BigUint,
    pub x: Option<BigUint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    Rsa(RsaKey),
    Dsa(DsaKey),
}

/// A key read from an MSBLOB or PVK container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyObject {
    material: KeyMaterial,
}

impl KeyObject {
    pub fn new(material: KeyMaterial) -> Self {
        KeyObject { material }
    }

    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }

    pub fn into_material(self) -> KeyMaterial {
        self.material
    }

    pub fn algorithm(&self) -> Algorithm {
        match self.material {
            KeyMaterial::Rsa(_) => Algorithm::Rsa,
            KeyMaterial::Dsa(_) => Algorithm::Dsa,
        }
    }

    /// Private when the private components are present.
    pub fn visibility(&self) -> Visibility {
        let private = match &self.material {
            KeyMaterial::Rsa(rsa) => rsa.private.is_some(),
            KeyMaterial::Dsa(dsa) => dsa.x.is_some(),
        };
        if private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    /// Size of the modulus (RSA) or of `p` (DSA) in bits.
    pub fn bits(&self) -> u64 {
        match &self.material {
            KeyMaterial::Rsa(rsa) => rsa.modulus.bits(),
            KeyMaterial::Dsa(dsa) => dsa.p.bits(),
        }
    }

    /// DER encoding: PKCS#1 for RSA, the OpenSSL `DSAPrivateKey` sequence
    /// for DSA private keys and SubjectPublicKeyInfo for DSA public keys.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.encode()
    }
}

fn int(value: &BigUint) -> Element {
    Element::Integer(Integer::from(value))
}

fn zero() -> Element {
    Element::Integer(Integer::from(0u64))
}

impl EncodableTo<KeyObject> for Element {}

impl Encoder<KeyObject, Element> for KeyObject {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let element = match &self.material {
            KeyMaterial::Rsa(RsaKey {
                modulus,
                public_exponent,
                private: Some(private),
            }) => Element::Sequence(vec![
                zero(),
                int(modulus),
                int(public_exponent),
                int(&private.private_exponent),
                int(&private.prime1),
                int(&private.prime2),
                int(&private.exponent1),
                int(&private.exponent2),
                int(&private.coefficient),
            ]),
            KeyMaterial::Rsa(RsaKey {
                modulus,
                public_exponent,
                private: None,
            }) => Element::Sequence(vec![int(modulus), int(public_exponent)]),
            KeyMaterial::Dsa(DsaKey {
                p,
                q,
                g,
                y,
                x: Some(x),
            }) => Element::Sequence(vec![zero(), int(p), int(q), int(g), int(y), int(x)]),
            KeyMaterial::Dsa(DsaKey {
                p,
                q,
                g,
                y,
                x: None,
            }) => {
                let y: Vec<u8> = int(y).encode()?;
                Element::Sequence(vec![
                    Element::Sequence(vec![
                        Element::ObjectIdentifier(ObjectIdentifier::from_str(OID_DSA)?),
                        Element::Sequence(vec![int(p), int(q), int(g)]),
                    ]),
                    Element::BitString(BitString::from(y)),
                ])
            }
        };
        Ok(element)
    }
}

impl EncodableTo<KeyObject> for Vec<u8> {}

impl Encoder<KeyObject, Vec<u8>> for KeyObject {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        let element: Element = self.encode()?;
        Ok(element.encode()?)
    }
}

impl ToPem for KeyObject {
    type Error = Error;

    fn pem_label(&self) -> Label {
        match (self.algorithm(), self.visibility()) {
            (Algorithm::Rsa, Visibility::Private) => Label::RSAPrivateKey,
            (Algorithm::Rsa, Visibility::Public) => Label::RSAPublicKey,
            (Algorithm::Dsa, Visibility::Private) => Label::DSAPrivateKey,
            (Algorithm::Dsa, Visibility::Public) => Label::PublicKey,
        }
    }

    fn to_pem(&self) -> Result<Pem> {
        Ok(Pem::from_bytes(self.pem_label(), &self.to_der()?))
    }
}
