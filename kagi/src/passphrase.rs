//! Passphrase capability and the fixed-buffer bridge used by decoders.
//!
//! A [`PassphraseProvider`] is handed by reference to every call that may
//! need a secret. Nothing here stores a provider or a secret beyond the
//! call that asked for it.

use std::fmt::{Debug, Formatter};

use thiserror::Error;
use zeroize::Zeroizing;

/// Prompt info sent to the provider by [`PassphraseBridge::new`].
pub const PASSPHRASE_PROMPT_INFO: &str = "pass phrase";

/// Size of the fixed buffer decoders read a passphrase into (`PEM_BUFSIZE`).
///
/// Longer secrets are rejected with [`PassphraseError::TooLong`].
pub const PASSPHRASE_CAPACITY: usize = 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PassphraseError {
    #[error("passphrase was not provided")]
    Declined,

    #[error("passphrase is unavailable: {0}")]
    Unavailable(String),

    #[error("passphrase exceeds the {capacity} byte buffer")]
    TooLong { capacity: usize },
}

/// Context passed along with a passphrase request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassphraseContext<'a> {
    info: Option<&'a str>,
}

impl<'a> PassphraseContext<'a> {
    pub fn new() -> Self {
        PassphraseContext { info: None }
    }

    pub fn with_info(info: &'a str) -> Self {
        PassphraseContext { info: Some(info) }
    }

    /// Human readable hint describing what the secret is for.
    pub fn info(&self) -> Option<&'a str> {
        self.info
    }
}

/// A secret returned by a provider. Wiped on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(Zeroizing<Vec<u8>>);

impl Secret {
    pub fn new(secret: Vec<u8>) -> Self {
        Secret(Zeroizing::new(secret))
    }

    pub fn empty() -> Self {
        Secret::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(<redacted>)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Secret::new(value.as_bytes().to_vec())
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret::new(value.into_bytes())
    }
}

impl From<&[u8]> for Secret {
    fn from(value: &[u8]) -> Self {
        Secret::new(value.to_vec())
    }
}

impl From<Vec<u8>> for Secret {
    fn from(value: Vec<u8>) -> Self {
        Secret::new(value)
    }
}

/// Capability that produces a passphrase on request.
///
/// Implementations may be asked any number of times and must not assume the
/// caller caches an earlier answer.
pub trait PassphraseProvider {
    fn obtain(&self, context: &PassphraseContext<'_>) -> Result<Secret, PassphraseError>;
}

impl<F> PassphraseProvider for F
where
    F: Fn(&PassphraseContext<'_>) -> Result<Secret, PassphraseError>,
{
    fn obtain(&self, context: &PassphraseContext<'_>) -> Result<Secret, PassphraseError> {
        self(context)
    }
}

/// Provider that always answers with the same secret.
#[derive(Debug, Clone)]
pub struct FixedPassphrase {
    secret: Secret,
}

impl FixedPassphrase {
    pub fn new(secret: impl Into<Secret>) -> Self {
        FixedPassphrase {
            secret: secret.into(),
        }
    }
}

impl PassphraseProvider for FixedPassphrase {
    fn obtain(&self, _context: &PassphraseContext<'_>) -> Result<Secret, PassphraseError> {
        Ok(self.secret.clone())
    }
}

/// Provider for inputs that are never expected to be encrypted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPassphrase;

impl PassphraseProvider for NoPassphrase {
    fn obtain(&self, _context: &PassphraseContext<'_>) -> Result<Secret, PassphraseError> {
        Err(PassphraseError::Declined)
    }
}

/// Adapts a [`PassphraseProvider`] to the fixed-buffer contract of the
/// legacy decoders: the secret is copied into a caller buffer and the
/// number of bytes written is returned.
///
/// `Ok(0)` is a valid, empty passphrase. Any `Err` means no passphrase
/// could be obtained.
pub struct PassphraseBridge<'a> {
    provider: &'a dyn PassphraseProvider,
    info: Option<&'static str>,
}

impl<'a> PassphraseBridge<'a> {
    /// Bridge that sends [`PASSPHRASE_PROMPT_INFO`] as the prompt info.
    pub fn new(provider: &'a dyn PassphraseProvider) -> Self {
        PassphraseBridge {
            provider,
            info: Some(PASSPHRASE_PROMPT_INFO),
        }
    }

    /// Bridge that sends an empty context.
    pub fn without_prompt(provider: &'a dyn PassphraseProvider) -> Self {
        PassphraseBridge {
            provider,
            info: None,
        }
    }

    pub fn fill(&self, buf: &mut [u8]) -> Result<usize, PassphraseError> {
        let context = match self.info {
            Some(info) => PassphraseContext::with_info(info),
            None => PassphraseContext::new(),
        };
        let secret = self.provider.obtain(&context)?;
        if secret.len() > buf.len() {
            return Err(PassphraseError::TooLong {
                capacity: buf.len(),
            });
        }
        buf[..secret.len()].copy_from_slice(secret.as_bytes());
        Ok(secret.len())
    }
}
