//! Library and application errors

use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::chip::Chip;

/// All possible errors returned by espstub
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Failed to extract the stub for the {chip}")]
    #[diagnostic(code(espstub::chip))]
    Chip {
        chip: Chip,
        #[source]
        #[diagnostic_source]
        source: Box<Error>,
    },

    #[error("The {segment} segment is not valid base64")]
    #[diagnostic(
        code(espstub::invalid_base64),
        help("Stub descriptions must carry their segments as standard base64")
    )]
    InvalidBase64 {
        segment: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("I/O error while accessing {path}")]
    #[diagnostic(code(espstub::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse the JSON stub description")]
    #[diagnostic(code(espstub::json))]
    Json(#[from] serde_json::Error),

    #[error("No stub directory was provided")]
    #[diagnostic(
        code(espstub::missing_stub_dir),
        help("Set the IDF_PATH environment variable (run the export.sh script in the esp-idf directory), \
              or pass one of `--stub-dir`, `--esptool-path` or `--idf-path`")
    )]
    MissingStubDir,

    #[error("No stub description for the {chip} found in {dir}")]
    #[diagnostic(
        code(espstub::stub_not_found),
        help("Expected esptool's `stub_flasher_*.json` or espflash's `<chip>.toml` in that directory")
    )]
    StubNotFound { chip: Chip, dir: PathBuf },

    #[error("Failed to parse the TOML stub description")]
    #[diagnostic(code(espstub::toml))]
    Toml(#[from] toml::de::Error),

    #[error("Unrecognized stub description format: {0}")]
    #[diagnostic(
        code(espstub::unknown_stub_format),
        help("Stub descriptions must be `.json` (esptool) or `.toml` (espflash) files")
    )]
    UnknownStubFormat(PathBuf),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// Lets `#[diagnostic_source]` on `Error::Chip::source` expose the boxed error
impl std::borrow::Borrow<dyn Diagnostic> for Box<Error> {
    fn borrow(&self) -> &(dyn Diagnostic + 'static) {
        self.as_ref()
    }
}

/// A stub record could not be represented in the STUB image format
#[derive(Debug, Diagnostic, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodingError {
    #[error("The `{field}` address {value:#x} does not fit in 32 bits")]
    #[diagnostic(
        code(espstub::encoding::address_out_of_range),
        help("Addresses must be within 0..=0xffffffff")
    )]
    AddressOutOfRange { field: &'static str, value: i128 },

    #[error("The {segment} segment is {len} bytes long, which exceeds the 32-bit length field")]
    #[diagnostic(code(espstub::encoding::segment_too_large))]
    SegmentTooLarge { segment: &'static str, len: usize },
}

pub(crate) trait ResultExt {
    /// Mark an error as having occurred while extracting the stub of `chip`
    fn for_chip(self, chip: Chip) -> Self;
}

impl<T> ResultExt for Result<T, Error> {
    fn for_chip(self, chip: Chip) -> Self {
        self.map_err(|err| Error::Chip {
            chip,
            source: Box::new(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_error_keeps_inner_diagnostic() {
        let err = Err::<(), _>(Error::StubNotFound {
            chip: Chip::Esp32s2,
            dir: PathBuf::from("stubs"),
        })
        .for_chip(Chip::Esp32s2)
        .unwrap_err();

        let inner = err.diagnostic_source().expect("inner diagnostic");
        assert_eq!(
            inner.code().map(|code| code.to_string()).as_deref(),
            Some("espstub::stub_not_found")
        );
        assert!(inner
            .help()
            .is_some_and(|help| help.to_string().contains("stub_flasher_*.json")));
    }

    #[test]
    fn chip_error_keeps_encoding_help() {
        let err = Err::<(), _>(Error::from(EncodingError::AddressOutOfRange {
            field: "entry",
            value: 1 << 32,
        }))
        .for_chip(Chip::Esp32)
        .unwrap_err();

        let inner = err.diagnostic_source().expect("inner diagnostic");
        assert!(inner
            .help()
            .is_some_and(|help| help.to_string().contains("0..=0xffffffff")));
    }
}
