//! Extraction configuration
//!
//! The stub descriptions are found either directly, inside an esptool
//! checkout, or inside an ESP-IDF tree (which vendors esptool as a
//! component). Explicit paths win over the ESP-IDF location.

use std::path::{Path, PathBuf};

use log::debug;
use strum::IntoEnumIterator;

use crate::{chip::Chip, error::Error};

/// Location of the stub descriptions inside an esptool checkout
pub const ESPTOOL_STUB_DIR: &str = "esptool/targets/stub_flasher";
/// Location of the esptool component inside an ESP-IDF tree
pub const IDF_ESPTOOL_DIR: &str = "components/esptool_py/esptool";

/// Where to look for stub descriptions, in order of precedence
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StubLocation {
    /// Directory holding the stub descriptions directly
    pub stub_dir: Option<PathBuf>,
    /// Root of an esptool checkout
    pub esptool_path: Option<PathBuf>,
    /// Root of an ESP-IDF tree
    pub idf_path: Option<PathBuf>,
}

impl StubLocation {
    pub fn resolve(&self) -> Result<PathBuf, Error> {
        let dir = if let Some(dir) = &self.stub_dir {
            dir.clone()
        } else if let Some(esptool) = &self.esptool_path {
            esptool.join(ESPTOOL_STUB_DIR)
        } else if let Some(idf) = &self.idf_path {
            idf.join(IDF_ESPTOOL_DIR).join(ESPTOOL_STUB_DIR)
        } else {
            return Err(Error::MissingStubDir);
        };

        debug!("Using stub directory {}", dir.display());

        Ok(dir)
    }
}

/// Configuration for a single extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    stub_dir: PathBuf,
    output_dir: PathBuf,
    chips: Vec<Chip>,
}

impl Config {
    /// An empty `chips` selection means every supported chip
    pub fn new(
        location: &StubLocation,
        output_dir: impl Into<PathBuf>,
        chips: &[Chip],
    ) -> Result<Self, Error> {
        let chips: Vec<Chip> = if chips.is_empty() {
            Chip::iter().collect()
        } else {
            Chip::iter().filter(|chip| chips.contains(chip)).collect()
        };

        Ok(Self {
            stub_dir: location.resolve()?,
            output_dir: output_dir.into(),
            chips,
        })
    }

    pub fn stub_dir(&self) -> &Path {
        &self.stub_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }
}
