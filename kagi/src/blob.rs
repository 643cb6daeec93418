use std::fmt::{Debug, Formatter};
use std::ops::Deref;

use zeroize::Zeroizing;

/// An owned, exact-length byte buffer produced by a format reader.
///
/// `len()` is the number of content bytes. The allocation is shrunk on
/// construction and never exposed, so capacity can not be mistaken for
/// length. The contents are wiped when the blob is dropped since a blob may
/// carry decrypted key material.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Blob {
    data: Zeroizing<Vec<u8>>,
}

impl Blob {
    pub fn new(mut data: Vec<u8>) -> Self {
        data.shrink_to_fit();
        Blob {
            data: Zeroizing::new(data),
        }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Blob {
            data: Zeroizing::new(data.to_vec()),
        }
    }

    /// Logical content length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copies the contents out into a plain vector.
    ///
    /// The copy is not zeroized on drop; prefer borrowing with
    /// [`Blob::as_bytes`] where possible.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.to_vec()
    }
}

impl Debug for Blob {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blob").field("len", &self.len()).finish()
    }
}

impl Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Vec<u8>> for Blob {
    fn from(value: Vec<u8>) -> Self {
        Blob::new(value)
    }
}

impl From<&[u8]> for Blob {
    fn from(value: &[u8]) -> Self {
        Blob::from_slice(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Blob;

    #[rstest(
        input,
        case(vec![]),
        case(vec![0x30, 0x00]),
        case(Vec::with_capacity(4096)),
    )]
    fn test_blob_len_is_content_len(input: Vec<u8>) {
        let expected = input.len();
        let blob = Blob::new(input);
        assert_eq!(expected, blob.len());
        assert_eq!(expected, blob.as_bytes().len());
    }

    #[test]
    fn test_blob_debug_hides_content() {
        let blob = Blob::from_slice(b"secret key bytes");
        let printed = format!("{:?}", blob);
        assert_eq!("Blob { len: 16 }", printed);
    }
}
