//! Flasher stub descriptions
//!
//! esptool publishes each flasher stub as a JSON document under
//! `esptool/targets/stub_flasher`, and espflash carries the same objects
//! converted to TOML. Both are read here, without importing esptool itself.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose, Engine as _};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{chip::Chip, error::Error};

/// Flash stub object (deserialized from JSON as used by `esptool.py`, or from
/// TOML as converted by espflash)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlashStub {
    /// Entry point (address)
    entry: i128,
    /// Text (base64 encoded)
    text: String,
    /// Start of text section address
    text_start: i128,
    /// Data (base64 encoded), absent for stubs without initialized data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    /// Start of data section address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_start: Option<i128>,
}

impl FlashStub {
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    /// Read a stub description, picking the format from the file extension
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let parse = match path.extension().and_then(OsStr::to_str) {
            Some("json") => Self::from_json,
            Some("toml") => Self::from_toml,
            _ => return Err(Error::UnknownStubFormat(path.to_path_buf())),
        };

        let contents = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        parse(&contents)
    }

    /// Decode both segments into a [StubRecord]
    pub fn into_record(self) -> Result<StubRecord, Error> {
        let text = decode("text", &self.text)?;
        let data = match &self.data {
            Some(data) => decode("data", data)?,
            None => Vec::new(),
        };

        Ok(StubRecord {
            entry: self.entry,
            text_start: self.text_start,
            text,
            data_start: self.data_start.unwrap_or_default(),
            data,
        })
    }
}

fn decode(segment: &'static str, encoded: &str) -> Result<Vec<u8>, Error> {
    general_purpose::STANDARD
        .decode(encoded)
        .map_err(|source| Error::InvalidBase64 { segment, source })
}

/// A decoded flasher stub
///
/// Addresses are kept at the width they were read with; they are checked
/// against the image format when encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubRecord {
    pub entry: i128,
    pub text_start: i128,
    pub text: Vec<u8>,
    pub data_start: i128,
    pub data: Vec<u8>,
}

/// A directory holding stub descriptions for several chips
#[derive(Debug, Clone)]
pub struct StubSource {
    dir: PathBuf,
}

impl StubSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Locate the description for `chip`, preferring esptool's JSON
    pub fn path(&self, chip: Chip) -> Result<PathBuf, Error> {
        let esptool = self.dir.join(chip.esptool_stub_name());
        if esptool.is_file() {
            return Ok(esptool);
        }

        let espflash = self.dir.join(chip.espflash_stub_name());
        if espflash.is_file() {
            return Ok(espflash);
        }

        Err(Error::StubNotFound {
            chip,
            dir: self.dir.clone(),
        })
    }

    /// Fetch the flash stub for the provided chip
    pub fn load(&self, chip: Chip) -> Result<StubRecord, Error> {
        let path = self.path(chip)?;
        debug!("Loading {chip} stub from {}", path.display());

        FlashStub::from_file(&path)?.into_record()
    }
}
