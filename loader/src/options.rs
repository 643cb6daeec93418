use std::fmt::{Display, Formatter};
use std::str::FromStr;

use kagi::passphrase::PASSPHRASE_CAPACITY;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default bound on the bytes buffered from a source.
pub const DEFAULT_MAX_INPUT_LEN: usize = 1 << 20;

/// Container format a reader accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Der,
    Pem,
    Msblob,
    Pvk,
}

impl Display for InputType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputType::Der => write!(f, "DER"),
            InputType::Pem => write!(f, "PEM"),
            InputType::Msblob => write!(f, "MSBLOB"),
            InputType::Pvk => write!(f, "PVK"),
        }
    }
}

impl FromStr for InputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "der" => Ok(InputType::Der),
            "pem" => Ok(InputType::Pem),
            "msblob" => Ok(InputType::Msblob),
            "pvk" => Ok(InputType::Pvk),
            _ => Err(Error::UnknownInputType(s.to_string())),
        }
    }
}

/// Settings for [`crate::Loader`].
///
/// Missing fields take their defaults when deserialized, so an outer
/// configuration can set only what it cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Only readers of this type are tried. `None` tries all of them.
    pub input_type: Option<InputType>,
    /// Upper bound on the bytes read from the source.
    pub max_input_len: usize,
    /// Longest passphrase accepted from the provider. Values above
    /// [`PASSPHRASE_CAPACITY`] are capped by the decoders' own buffers.
    pub passphrase_capacity: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            input_type: None,
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            passphrase_capacity: PASSPHRASE_CAPACITY,
        }
    }
}

impl LoadOptions {
    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = Some(input_type);
        self
    }

    pub fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }

    pub fn with_passphrase_capacity(mut self, capacity: usize) -> Self {
        self.passphrase_capacity = capacity;
        self
    }
}
