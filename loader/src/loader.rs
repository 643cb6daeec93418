use std::io::{Cursor, Read};

use kagi::Blob;
use kagi::decoder::Decoder;
use kagi::passphrase::{PassphraseContext, PassphraseError, PassphraseProvider, Secret};
use log::{debug, trace};
use mskey::KeyObject;
use pem::Label;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::format::{
    Attempt, Context, Decoded, DerReader, FormatReader, MsblobReader, PemReader, PvkReader,
};
use crate::options::{InputType, LoadOptions};

/// A loaded key.
#[derive(Debug)]
pub enum LoadedKey {
    /// DER key material from a PEM or DER source, decrypted if it was
    /// encrypted. `label` is the PEM label describing the DER, if known.
    Der {
        label: Option<Label>,
        der: Blob,
        encrypted: bool,
    },
    /// A key decoded from MSBLOB or PVK.
    Key(KeyObject),
}

impl LoadedKey {
    pub fn label(&self) -> Option<&Label> {
        match self {
            LoadedKey::Der { label, .. } => label.as_ref(),
            LoadedKey::Key(_) => None,
        }
    }

    pub fn der(&self) -> Option<&[u8]> {
        match self {
            LoadedKey::Der { der, .. } => Some(der.as_bytes()),
            LoadedKey::Key(_) => None,
        }
    }

    pub fn key(&self) -> Option<&KeyObject> {
        match self {
            LoadedKey::Der { .. } => None,
            LoadedKey::Key(key) => Some(key),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, LoadedKey::Der { encrypted: true, .. })
    }
}

/// Rejects secrets longer than the configured capacity before they reach
/// a decoder.
struct CappedProvider<'a> {
    inner: &'a dyn PassphraseProvider,
    capacity: usize,
}

impl PassphraseProvider for CappedProvider<'_> {
    fn obtain(&self, context: &PassphraseContext<'_>) -> std::result::Result<Secret, PassphraseError> {
        let secret = self.inner.obtain(context)?;
        if secret.len() > self.capacity {
            return Err(PassphraseError::TooLong {
                capacity: self.capacity,
            });
        }
        Ok(secret)
    }
}

/// Tries an ordered list of readers until one accepts the input.
pub struct Loader {
    readers: Vec<Box<dyn FormatReader>>,
    options: LoadOptions,
}

impl Default for Loader {
    fn default() -> Self {
        Loader::new(LoadOptions::default())
    }
}

impl Loader {
    /// Loader with the default reader order: PEM, PVK, MSBLOB, DER.
    pub fn new(options: LoadOptions) -> Self {
        let readers: [Box<dyn FormatReader>; 4] = [
            Box::new(PemReader),
            Box::new(PvkReader),
            Box::new(MsblobReader),
            Box::new(DerReader),
        ];
        Loader::with_readers(readers.into(), options)
    }

    pub fn with_readers(readers: Vec<Box<dyn FormatReader>>, options: LoadOptions) -> Self {
        Loader { readers, options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Names of the readers `load` will try, in order.
    pub fn reader_names(&self) -> Vec<&'static str> {
        self.selected().map(|r| r.name()).collect()
    }

    fn selected(&self) -> impl Iterator<Item = &dyn FormatReader> {
        let input_type = self.options.input_type;
        self.readers
            .iter()
            .map(|r| r.as_ref())
            .filter(move |r| input_type.is_none_or(|t| r.input_type() == t))
    }

    /// Loads one key from `source`.
    ///
    /// The source is read to the end (at most `max_input_len` bytes) and
    /// dropped before any reader runs.
    pub fn load<R: Read>(&self, source: R, provider: &dyn PassphraseProvider) -> Result<LoadedKey> {
        let input = read_all(source, self.options.max_input_len)?;
        trace!("buffered {} input bytes", input.len());

        let provider = CappedProvider {
            inner: provider,
            capacity: self.options.passphrase_capacity,
        };
        let ctx = Context::new(&provider, &self.options);

        for reader in self.selected() {
            let mut cursor = Cursor::new(input.as_slice());
            match reader.attempt(&mut cursor, &ctx)? {
                Attempt::Decoded(decoded) => {
                    debug!("{} reader accepted the input", reader.name());
                    return finish(decoded, &provider);
                }
                Attempt::NotThisFormat => debug!("{} reader fell through", reader.name()),
            }
        }
        Err(Error::Unrecognized)
    }
}

fn read_all<R: Read>(source: R, limit: usize) -> Result<Zeroizing<Vec<u8>>> {
    let mut input = Zeroizing::new(Vec::new());
    source
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut input)?;
    if input.len() > limit {
        return Err(Error::TooLarge { limit });
    }
    Ok(input)
}

fn finish(decoded: Decoded, provider: &dyn PassphraseProvider) -> Result<LoadedKey> {
    match decoded {
        Decoded::Key(key) => Ok(LoadedKey::Key(key)),
        Decoded::Der(der) => decrypt_envelope(None, der, false, provider),
        Decoded::Pem(pem) => {
            let label = pem.label().clone();
            if pem.is_encrypted() {
                debug!("{} record uses legacy PEM encryption", label);
                let der = pkcs8::legacy::decrypt_pem(&pem, provider)?;
                decrypt_envelope(Some(label), der, true, provider)
            } else {
                let der: Blob = pem.decode()?;
                decrypt_envelope(Some(label), der, false, provider)
            }
        }
    }
}

/// Decrypts `der` if it is an EncryptedPrivateKeyInfo, else passes it on.
fn decrypt_envelope(
    label: Option<Label>,
    der: Blob,
    encrypted: bool,
    provider: &dyn PassphraseProvider,
) -> Result<LoadedKey> {
    match pkcs8::decrypt_der(&der, provider) {
        Ok(plain) => {
            debug!("decrypted PKCS#8 envelope");
            Ok(LoadedKey::Der {
                label: Some(Label::PrivateKey),
                der: plain,
                encrypted: true,
            })
        }
        Err(pkcs8::Error::NotAnEnvelope(reason)) => {
            trace!("cleartext: {}", reason);
            Ok(LoadedKey::Der {
                label,
                der,
                encrypted,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Loads a key from `source` with the default reader order.
pub fn load<R: Read>(source: R, provider: &dyn PassphraseProvider) -> Result<LoadedKey> {
    Loader::default().load(source, provider)
}

/// Loads a key, trying only readers of `input_type`.
pub fn load_as<R: Read>(
    source: R,
    input_type: InputType,
    provider: &dyn PassphraseProvider,
) -> Result<LoadedKey> {
    Loader::new(LoadOptions::default().with_input_type(input_type)).load(source, provider)
}
