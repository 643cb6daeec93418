//! Password based encryption schemes of RFC 8018 (PKCS#5 v2.1).

use std::str::FromStr;

use asn1::{Element, Integer, ObjectIdentifier, OctetString};
use cbc::cipher::{
    BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit, block_padding::Pkcs7,
};
use digest::Digest;
use hmac::Hmac;
use kagi::decoder::Decoder;
use kagi::encoder::Encoder;
use log::debug;
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use zeroize::{Zeroize, Zeroizing};

use crate::algorithm::*;
use crate::error::{Error, Result};

/// Highest iteration count accepted from an envelope. Larger counts are
/// rejected as [`Error::InvalidParameters`] before any key derivation.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Pseudo random function of PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prf {
    /// The default when the `prf` field is omitted.
    #[default]
    HmacSha1,
    HmacSha224,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl Prf {
    fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        match oid.to_string().as_str() {
            OID_HMAC_SHA1 => Ok(Prf::HmacSha1),
            OID_HMAC_SHA224 => Ok(Prf::HmacSha224),
            OID_HMAC_SHA256 => Ok(Prf::HmacSha256),
            OID_HMAC_SHA384 => Ok(Prf::HmacSha384),
            OID_HMAC_SHA512 => Ok(Prf::HmacSha512),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }

    fn oid(&self) -> &'static str {
        match self {
            Prf::HmacSha1 => OID_HMAC_SHA1,
            Prf::HmacSha224 => OID_HMAC_SHA224,
            Prf::HmacSha256 => OID_HMAC_SHA256,
            Prf::HmacSha384 => OID_HMAC_SHA384,
            Prf::HmacSha512 => OID_HMAC_SHA512,
        }
    }

    fn derive(&self, secret: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) -> Result<()> {
        let derived = match self {
            Prf::HmacSha1 => pbkdf2::pbkdf2::<Hmac<Sha1>>(secret, salt, iterations, out),
            Prf::HmacSha224 => pbkdf2::pbkdf2::<Hmac<Sha224>>(secret, salt, iterations, out),
            Prf::HmacSha256 => pbkdf2::pbkdf2::<Hmac<Sha256>>(secret, salt, iterations, out),
            Prf::HmacSha384 => pbkdf2::pbkdf2::<Hmac<Sha384>>(secret, salt, iterations, out),
            Prf::HmacSha512 => pbkdf2::pbkdf2::<Hmac<Sha512>>(secret, salt, iterations, out),
        };
        derived.map_err(|_| Error::InvalidParameters("PBKDF2 output length"))
    }
}

/// Block cipher in CBC mode with PKCS#7 padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cipher {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    DesEde3Cbc,
    DesCbc,
}

impl Cipher {
    fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        match oid.to_string().as_str() {
            OID_AES128_CBC => Ok(Cipher::Aes128Cbc),
            OID_AES192_CBC => Ok(Cipher::Aes192Cbc),
            OID_AES256_CBC => Ok(Cipher::Aes256Cbc),
            OID_DES_EDE3_CBC => Ok(Cipher::DesEde3Cbc),
            OID_DES_CBC => Ok(Cipher::DesCbc),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }

    /// Cipher named in an RFC 1421 `DEK-Info` header.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "AES-128-CBC" => Ok(Cipher::Aes128Cbc),
            "AES-192-CBC" => Ok(Cipher::Aes192Cbc),
            "AES-256-CBC" => Ok(Cipher::Aes256Cbc),
            "DES-EDE3-CBC" => Ok(Cipher::DesEde3Cbc),
            "DES-CBC" => Ok(Cipher::DesCbc),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }

    fn oid(&self) -> &'static str {
        match self {
            Cipher::Aes128Cbc => OID_AES128_CBC,
            Cipher::Aes192Cbc => OID_AES192_CBC,
            Cipher::Aes256Cbc => OID_AES256_CBC,
            Cipher::DesEde3Cbc => OID_DES_EDE3_CBC,
            Cipher::DesCbc => OID_DES_CBC,
        }
    }

    pub fn key_len(&self) -> usize {
        match self {
            Cipher::Aes128Cbc => 16,
            Cipher::Aes192Cbc => 24,
            Cipher::Aes256Cbc => 32,
            Cipher::DesEde3Cbc => 24,
            Cipher::DesCbc => 8,
        }
    }

    /// Block size, which is also the IV length.
    pub fn block_len(&self) -> usize {
        match self {
            Cipher::Aes128Cbc | Cipher::Aes192Cbc | Cipher::Aes256Cbc => 16,
            Cipher::DesEde3Cbc | Cipher::DesCbc => 8,
        }
    }

    pub(crate) fn decrypt(&self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if data.is_empty() || data.len() % self.block_len() != 0 {
            return Err(Error::DecryptFailed);
        }
        match self {
            Cipher::Aes128Cbc => cbc_decrypt::<aes::Aes128>(key, iv, data),
            Cipher::Aes192Cbc => cbc_decrypt::<aes::Aes192>(key, iv, data),
            Cipher::Aes256Cbc => cbc_decrypt::<aes::Aes256>(key, iv, data),
            Cipher::DesEde3Cbc => cbc_decrypt::<des::TdesEde3>(key, iv, data),
            Cipher::DesCbc => cbc_decrypt::<des::Des>(key, iv, data),
        }
    }

    pub(crate) fn encrypt(&self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Cipher::Aes128Cbc => cbc_encrypt::<aes::Aes128>(key, iv, data),
            Cipher::Aes192Cbc => cbc_encrypt::<aes::Aes192>(key, iv, data),
            Cipher::Aes256Cbc => cbc_encrypt::<aes::Aes256>(key, iv, data),
            Cipher::DesEde3Cbc => cbc_encrypt::<des::TdesEde3>(key, iv, data),
            Cipher::DesCbc => cbc_encrypt::<des::Des>(key, iv, data),
        }
    }
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Zeroizing<Vec<u8>>>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let decryptor = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| Error::InvalidParameters("key or IV length"))?;
    let mut buf = Zeroizing::new(data.to_vec());
    let len = decryptor
        .decrypt_padded_mut::<Pkcs7>(buf.as_mut_slice())
        .map_err(|_| Error::DecryptFailed)?
        .len();
    buf.truncate(len);
    Ok(buf)
}

fn cbc_encrypt<C>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let encryptor = cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| Error::InvalidParameters("key or IV length"))?;
    // room for one block of padding
    let mut buf = vec![0u8; data.len() + iv.len()];
    buf[..data.len()].copy_from_slice(data);
    let len = encryptor
        .encrypt_padded_mut::<Pkcs7>(&mut buf, data.len())
        .map_err(|_| Error::InvalidParameters("padding"))?
        .len();
    buf.truncate(len);
    Ok(buf)
}

/// Digest of the PBES1 key derivation (PBKDF1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pbes1Digest {
    Md5,
    Sha1,
}

/// A resolved encryption scheme with all parameters checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    Pbes2(Pbes2Params),
    Pbes1 {
        digest: Pbes1Digest,
        salt: Vec<u8>,
        iterations: u32,
    },
}

/// Parameters of PBES2 with PBKDF2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbes2Params {
    pub salt: Vec<u8>,
    pub iterations: u32,
    pub prf: Prf,
    pub cipher: Cipher,
    pub iv: Vec<u8>,
}

impl Pbes2Params {
    /// AES-256-CBC keyed with PBKDF2-HMAC-SHA256.
    pub fn aes256_cbc(salt: &[u8], iterations: u32, iv: [u8; 16]) -> Self {
        Pbes2Params {
            salt: salt.to_vec(),
            iterations,
            prf: Prf::HmacSha256,
            cipher: Cipher::Aes256Cbc,
            iv: iv.to_vec(),
        }
    }

    fn derive_key(&self, secret: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let mut key = Zeroizing::new(vec![0u8; self.cipher.key_len()]);
        self.prf
            .derive(secret, &self.salt, self.iterations, key.as_mut_slice())?;
        Ok(key)
    }

    pub(crate) fn encrypt(&self, secret: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(Error::InvalidParameters("iteration count out of range"));
        }
        if self.iv.len() != self.cipher.block_len() {
            return Err(Error::InvalidParameters("IV length does not match the cipher"));
        }
        let key = self.derive_key(secret)?;
        self.cipher.encrypt(&key, &self.iv, plaintext)
    }
}

fn oid(s: &str) -> Result<ObjectIdentifier> {
    Ok(ObjectIdentifier::from_str(s)?)
}

impl TryFrom<&Pbes2Params> for AlgorithmIdentifier {
    type Error = Error;

    fn try_from(params: &Pbes2Params) -> Result<Self> {
        let mut kdf_params = vec![
            Element::OctetString(OctetString::from(params.salt.as_slice())),
            Element::Integer(Integer::from(u64::from(params.iterations))),
        ];
        if params.prf != Prf::default() {
            let prf = AlgorithmIdentifier::new_with_params(oid(params.prf.oid())?, Element::Null);
            kdf_params.push(prf.encode()?);
        }
        let kdf = AlgorithmIdentifier::new_with_params(oid(OID_PBKDF2)?, Element::Sequence(kdf_params));
        let cipher = AlgorithmIdentifier::new_with_params(
            oid(params.cipher.oid())?,
            Element::OctetString(OctetString::from(params.iv.as_slice())),
        );
        Ok(AlgorithmIdentifier::new_with_params(
            oid(OID_PBES2)?,
            Element::Sequence(vec![kdf.encode()?, cipher.encode()?]),
        ))
    }
}

fn octet_string<'a>(element: &'a Element, what: &'static str) -> Result<&'a [u8]> {
    element
        .as_octet_string()
        .map(OctetString::as_bytes)
        .ok_or(Error::InvalidParameters(what))
}

fn iteration_count(element: &Element) -> Result<u32> {
    match element.as_integer().and_then(Integer::to_u32) {
        Some(n) if (1..=MAX_ITERATIONS).contains(&n) => Ok(n),
        _ => Err(Error::InvalidParameters("iteration count out of range")),
    }
}

fn parse_pbes2(params: Option<&Element>) -> Result<Pbes2Params> {
    // PBES2-params ::= SEQUENCE { keyDerivationFunc, encryptionScheme }
    let [kdf, enc] = params
        .and_then(Element::as_sequence)
        .ok_or(Error::InvalidParameters("PBES2-params must be a SEQUENCE"))?
    else {
        return Err(Error::InvalidParameters("PBES2-params must have 2 elements"));
    };
    let kdf: AlgorithmIdentifier = kdf.decode()?;
    if kdf.algorithm != OID_PBKDF2 {
        return Err(Error::UnsupportedAlgorithm(kdf.algorithm.to_string()));
    }

    // PBKDF2-params ::= SEQUENCE { salt, iterationCount, keyLength OPTIONAL, prf DEFAULT }
    let kdf_params = kdf
        .parameters()
        .and_then(Element::as_sequence)
        .ok_or(Error::InvalidParameters("PBKDF2-params must be a SEQUENCE"))?;
    let (salt, iterations, rest) = match kdf_params {
        [salt, iterations, rest @ ..] => (
            octet_string(salt, "PBKDF2 salt must be an OCTET STRING")?,
            iteration_count(iterations)?,
            rest,
        ),
        _ => return Err(Error::InvalidParameters("PBKDF2-params is too short")),
    };
    let (key_length, rest) = match rest {
        [Element::Integer(n), rest @ ..] => (
            Some(
                n.to_usize()
                    .ok_or(Error::InvalidParameters("PBKDF2 key length"))?,
            ),
            rest,
        ),
        _ => (None, rest),
    };
    let prf = match rest {
        [] => Prf::default(),
        [prf] => {
            let prf: AlgorithmIdentifier = prf.decode()?;
            if !prf.has_no_parameters() {
                return Err(Error::InvalidParameters("PRF parameters must be NULL"));
            }
            Prf::from_oid(&prf.algorithm)?
        }
        _ => return Err(Error::InvalidParameters("PBKDF2-params is too long")),
    };

    let enc: AlgorithmIdentifier = enc.decode()?;
    let cipher = Cipher::from_oid(&enc.algorithm)?;
    let iv = enc
        .parameters()
        .ok_or(Error::InvalidParameters("cipher IV is missing"))
        .and_then(|iv| octet_string(iv, "cipher IV must be an OCTET STRING"))?;
    if iv.len() != cipher.block_len() {
        return Err(Error::InvalidParameters("IV length does not match the cipher"));
    }
    if key_length.is_some_and(|n| n != cipher.key_len()) {
        return Err(Error::InvalidParameters("key length does not match the cipher"));
    }

    Ok(Pbes2Params {
        salt: salt.to_vec(),
        iterations,
        prf,
        cipher,
        iv: iv.to_vec(),
    })
}

fn parse_pbes1(digest: Pbes1Digest, params: Option<&Element>) -> Result<Scheme> {
    // PBEParameter ::= SEQUENCE { salt OCTET STRING (SIZE(8)), iterationCount INTEGER }
    match params.and_then(Element::as_sequence) {
        Some([salt, iterations]) => {
            let salt = octet_string(salt, "PBE salt must be an OCTET STRING")?;
            if salt.len() != 8 {
                return Err(Error::InvalidParameters("PBE salt must be 8 bytes"));
            }
            Ok(Scheme::Pbes1 {
                digest,
                salt: salt.to_vec(),
                iterations: iteration_count(iterations)?,
            })
        }
        _ => Err(Error::InvalidParameters("PBEParameter must be a SEQUENCE of 2 elements")),
    }
}

impl TryFrom<&AlgorithmIdentifier> for Scheme {
    type Error = Error;

    fn try_from(alg: &AlgorithmIdentifier) -> Result<Self> {
        let scheme = match alg.algorithm.to_string().as_str() {
            OID_PBES2 => Scheme::Pbes2(parse_pbes2(alg.parameters())?),
            OID_PBE_MD5_DES_CBC => parse_pbes1(Pbes1Digest::Md5, alg.parameters())?,
            OID_PBE_SHA1_DES_CBC => parse_pbes1(Pbes1Digest::Sha1, alg.parameters())?,
            other => return Err(Error::UnsupportedAlgorithm(other.to_string())),
        };
        debug!("encryption scheme: {}", scheme);
        Ok(scheme)
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scheme::Pbes2(p) => write!(
                f,
                "PBES2 ({:?}, {:?}, {} iterations)",
                p.prf, p.cipher, p.iterations
            ),
            Scheme::Pbes1 {
                digest, iterations, ..
            } => write!(f, "PBES1 ({:?}, DES-CBC, {} iterations)", digest, iterations),
        }
    }
}

// PBKDF1: T_1 = Hash(P || S), T_i = Hash(T_{i-1}); DK = T_c[..16]
fn pbkdf1<D: Digest>(secret: &[u8], salt: &[u8], iterations: u32) -> Zeroizing<[u8; 16]> {
    let mut t = D::new().chain_update(secret).chain_update(salt).finalize();
    for _ in 1..iterations {
        let next = D::digest(&t);
        t.as_mut_slice().zeroize();
        t = next;
    }
    let mut dk = Zeroizing::new([0u8; 16]);
    dk.copy_from_slice(&t[..16]);
    t.as_mut_slice().zeroize();
    dk
}

impl Scheme {
    /// Derives the key from `secret` and decrypts `ciphertext`.
    pub fn decrypt(&self, secret: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Scheme::Pbes2(params) => {
                let key = params.derive_key(secret)?;
                params.cipher.decrypt(&key, &params.iv, ciphertext)
            }
            Scheme::Pbes1 {
                digest,
                salt,
                iterations,
            } => {
                let dk = match digest {
                    Pbes1Digest::Md5 => pbkdf1::<Md5>(secret, salt, *iterations),
                    Pbes1Digest::Sha1 => pbkdf1::<Sha1>(secret, salt, *iterations),
                };
                Cipher::DesCbc.decrypt(&dk[..8], &dk[8..], ciphertext)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn pbkdf2_element(rest: Vec<Element>) -> Element {
        let mut params = vec![
            Element::OctetString(OctetString::from(vec![1u8; 8])),
            Element::Integer(Integer::from(1000u64)),
        ];
        params.extend(rest);
        Element::Sequence(vec![
            Element::ObjectIdentifier(oid(OID_PBKDF2).unwrap()),
            Element::Sequence(params),
        ])
    }

    fn cipher_element(cipher_oid: &str, iv_len: usize) -> Element {
        Element::Sequence(vec![
            Element::ObjectIdentifier(oid(cipher_oid).unwrap()),
            Element::OctetString(OctetString::from(vec![2u8; iv_len])),
        ])
    }

    fn pbes2(kdf: Element, cipher: Element) -> AlgorithmIdentifier {
        AlgorithmIdentifier::new_with_params(
            oid(OID_PBES2).unwrap(),
            Element::Sequence(vec![kdf, cipher]),
        )
    }

    fn prf_element(prf_oid: &str) -> Element {
        Element::Sequence(vec![
            Element::ObjectIdentifier(oid(prf_oid).unwrap()),
            Element::Null,
        ])
    }

    #[rstest(
        kdf_rest,
        cipher_oid,
        iv_len,
        expected_prf,
        expected_cipher,
        case(vec![], OID_AES128_CBC, 16, Prf::HmacSha1, Cipher::Aes128Cbc),
        case(vec![prf_element(OID_HMAC_SHA256)], OID_AES256_CBC, 16, Prf::HmacSha256, Cipher::Aes256Cbc),
        case(vec![Element::Integer(Integer::from(24u64)), prf_element(OID_HMAC_SHA512)], OID_AES192_CBC, 16, Prf::HmacSha512, Cipher::Aes192Cbc),
        case(vec![Element::Integer(Integer::from(24u64))], OID_DES_EDE3_CBC, 8, Prf::HmacSha1, Cipher::DesEde3Cbc),
        case(vec![prf_element(OID_HMAC_SHA384)], OID_DES_CBC, 8, Prf::HmacSha384, Cipher::DesCbc)
    )]
    fn test_parse_pbes2(
        kdf_rest: Vec<Element>,
        cipher_oid: &str,
        iv_len: usize,
        expected_prf: Prf,
        expected_cipher: Cipher,
    ) {
        let alg = pbes2(pbkdf2_element(kdf_rest), cipher_element(cipher_oid, iv_len));
        let scheme = Scheme::try_from(&alg).unwrap();
        assert_eq!(
            Scheme::Pbes2(Pbes2Params {
                salt: vec![1u8; 8],
                iterations: 1000,
                prf: expected_prf,
                cipher: expected_cipher,
                iv: vec![2u8; iv_len],
            }),
            scheme
        );
    }

    #[rstest(
        alg,
        case(pbes2(pbkdf2_element(vec![]), cipher_element(OID_AES128_CBC, 8))),
        case(pbes2(pbkdf2_element(vec![Element::Integer(Integer::from(16u64))]), cipher_element(OID_AES256_CBC, 16))),
        case(pbes2(pbkdf2_element(vec![Element::Null]), cipher_element(OID_AES256_CBC, 16))),
        case(AlgorithmIdentifier::new(oid(OID_PBES2).unwrap())),
        case(AlgorithmIdentifier::new_with_params(oid(OID_PBE_MD5_DES_CBC).unwrap(), Element::Null))
    )]
    fn test_parse_invalid_parameters(alg: AlgorithmIdentifier) {
        assert!(matches!(
            Scheme::try_from(&alg),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[rstest(
        alg,
        // RC2-CBC
        case(pbes2(pbkdf2_element(vec![]), cipher_element("1.2.840.113549.3.2", 8))),
        // hmacWithMD5
        case(pbes2(pbkdf2_element(vec![prf_element("1.2.840.113549.2.6")]), cipher_element(OID_AES128_CBC, 16))),
        // pbeWithSHAAnd3-KeyTripleDES-CBC (PKCS#12)
        case(AlgorithmIdentifier::new(oid("1.2.840.113549.1.12.1.3").unwrap()))
    )]
    fn test_parse_unsupported(alg: AlgorithmIdentifier) {
        assert!(matches!(
            Scheme::try_from(&alg),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[rstest(
        iterations,
        valid,
        case(0, false),
        case(1, true),
        case(u64::from(MAX_ITERATIONS), true),
        case(u64::from(MAX_ITERATIONS) + 1, false),
        case(u64::from(u32::MAX), false)
    )]
    fn test_parse_iteration_count(iterations: u64, valid: bool) {
        let kdf = Element::Sequence(vec![
            Element::ObjectIdentifier(oid(OID_PBKDF2).unwrap()),
            Element::Sequence(vec![
                Element::OctetString(OctetString::from(vec![1u8; 8])),
                Element::Integer(Integer::from(iterations)),
            ]),
        ]);
        let alg = pbes2(kdf, cipher_element(OID_AES128_CBC, 16));
        match Scheme::try_from(&alg) {
            Ok(Scheme::Pbes2(params)) => {
                assert!(valid);
                assert_eq!(iterations, u64::from(params.iterations));
            }
            Err(Error::InvalidParameters(_)) => assert!(!valid),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[rstest(
        cipher,
        len,
        case(Cipher::Aes128Cbc, 0),
        case(Cipher::Aes128Cbc, 15),
        case(Cipher::Aes256Cbc, 33),
        case(Cipher::DesEde3Cbc, 12)
    )]
    fn test_decrypt_misaligned(cipher: Cipher, len: usize) {
        let key = vec![0u8; cipher.key_len()];
        let iv = vec![0u8; cipher.block_len()];
        assert!(matches!(
            cipher.decrypt(&key, &iv, &vec![0u8; len]),
            Err(Error::DecryptFailed)
        ));
    }

    #[rstest(
        cipher,
        case(Cipher::Aes128Cbc),
        case(Cipher::Aes192Cbc),
        case(Cipher::Aes256Cbc),
        case(Cipher::DesEde3Cbc),
        case(Cipher::DesCbc)
    )]
    fn test_cipher_encrypt_then_decrypt(cipher: Cipher) {
        let key = vec![0x42u8; cipher.key_len()];
        let iv = vec![0x24u8; cipher.block_len()];
        let plaintext = b"a plaintext that spans several blocks".to_vec();

        let ciphertext = cipher.encrypt(&key, &iv, &plaintext).unwrap();
        assert_eq!(0, ciphertext.len() % cipher.block_len());
        assert!(ciphertext.len() > plaintext.len());

        let decrypted = cipher.decrypt(&key, &iv, &ciphertext).unwrap();
        assert_eq!(plaintext, *decrypted);
    }

    #[test]
    fn test_pbkdf1_single_iteration_is_one_hash() {
        let dk = pbkdf1::<Md5>(b"secret", b"saltsalt", 1);
        let expected = Md5::new()
            .chain_update(b"secret")
            .chain_update(b"saltsalt")
            .finalize();
        assert_eq!(&expected[..], &dk[..]);
    }
}
