//! One reader per container format.
//!
//! A reader looks at the start of the source and either decodes it, reports
//! that the bytes are not its format, or fails hard. Only the second case
//! lets the [`crate::Loader`] move on to the next reader.

use std::io::Read;

use kagi::Blob;
use kagi::passphrase::PassphraseProvider;
use log::trace;
use mskey::KeyObject;
use pem::Pem;

use crate::error::Result;
use crate::options::{InputType, LoadOptions};

/// Outcome of a reader that did not fail.
#[derive(Debug)]
pub enum Attempt<T> {
    Decoded(T),
    NotThisFormat,
}

/// What a reader produced, before any decryption.
#[derive(Debug)]
pub enum Decoded {
    Der(Blob),
    Pem(Pem),
    Key(KeyObject),
}

/// Shared inputs for one load.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    provider: &'a dyn PassphraseProvider,
    options: &'a LoadOptions,
}

impl<'a> Context<'a> {
    pub fn new(provider: &'a dyn PassphraseProvider, options: &'a LoadOptions) -> Self {
        Context { provider, options }
    }

    pub fn provider(&self) -> &'a dyn PassphraseProvider {
        self.provider
    }

    pub fn options(&self) -> &'a LoadOptions {
        self.options
    }
}

pub trait FormatReader {
    fn name(&self) -> &'static str;

    fn input_type(&self) -> InputType;

    /// Tries to decode one value from `source`.
    ///
    /// Returns `Ok(Attempt::NotThisFormat)` only when the bytes cannot be
    /// this format. Stream, passphrase and decryption failures are `Err`.
    fn attempt(&self, source: &mut dyn Read, ctx: &Context<'_>) -> Result<Attempt<Decoded>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DerReader;

impl FormatReader for DerReader {
    fn name(&self) -> &'static str {
        "der"
    }

    fn input_type(&self) -> InputType {
        InputType::Der
    }

    fn attempt(&self, source: &mut dyn Read, ctx: &Context<'_>) -> Result<Attempt<Decoded>> {
        match der::read_der(source, ctx.options().max_input_len) {
            Ok(blob) => Ok(Attempt::Decoded(Decoded::Der(blob))),
            Err(der::error::Error::Io(e)) => Err(e.into()),
            // the input is fully buffered, so an oversized length is a truncation
            Err(e) => {
                trace!("der: {}", e);
                Ok(Attempt::NotThisFormat)
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PemReader;

impl FormatReader for PemReader {
    fn name(&self) -> &'static str {
        "pem"
    }

    fn input_type(&self) -> InputType {
        InputType::Pem
    }

    /// Binary input and text without a BEGIN line fall through. Once a
    /// BEGIN line is seen, every failure is reported.
    fn attempt(&self, source: &mut dyn Read, ctx: &Context<'_>) -> Result<Attempt<Decoded>> {
        match pem::read_pem(source, ctx.options().max_input_len) {
            Ok(pem) => Ok(Attempt::Decoded(Decoded::Pem(pem))),
            Err(e @ (pem::error::Error::NotText | pem::error::Error::MissingPreEncapsulationBoundary)) => {
                trace!("pem: {}", e);
                Ok(Attempt::NotThisFormat)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MsblobReader;

impl FormatReader for MsblobReader {
    fn name(&self) -> &'static str {
        "msblob"
    }

    fn input_type(&self) -> InputType {
        InputType::Msblob
    }

    fn attempt(&self, source: &mut dyn Read, ctx: &Context<'_>) -> Result<Attempt<Decoded>> {
        mskey_attempt(
            "msblob",
            mskey::msblob::read_msblob(source, ctx.options().max_input_len),
        )
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PvkReader;

impl FormatReader for PvkReader {
    fn name(&self) -> &'static str {
        "pvk"
    }

    fn input_type(&self) -> InputType {
        InputType::Pvk
    }

    fn attempt(&self, source: &mut dyn Read, ctx: &Context<'_>) -> Result<Attempt<Decoded>> {
        mskey_attempt("pvk", mskey::pvk::read_pvk(source, ctx.provider()))
    }
}

fn mskey_attempt(name: &str, result: mskey::Result<KeyObject>) -> Result<Attempt<Decoded>> {
    match result {
        Ok(key) => Ok(Attempt::Decoded(Decoded::Key(key))),
        Err(e) if e.is_format() || matches!(e, mskey::Error::TooLarge { .. }) => {
            trace!("{}: {}", name, e);
            Ok(Attempt::NotThisFormat)
        }
        Err(e) => Err(e.into()),
    }
}
