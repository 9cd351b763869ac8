//! Extract the esptool flasher stubs into STUB images
//!
//! esptool ships a small RAM-resident flasher ("stub") for each supported
//! chip. This crate reads those stub descriptions and packs each one into a
//! self-contained image (see [image]) that a flasher can embed and upload
//! without depending on esptool at runtime.
//!
//! ```no_run
//! use espstub::{config::StubLocation, extract, Config};
//!
//! let location = StubLocation {
//!     idf_path: std::env::var_os("IDF_PATH").map(Into::into),
//!     ..Default::default()
//! };
//! let config = Config::new(&location, ".", &[])?;
//!
//! for path in extract(&config)? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), espstub::Error>(())
//! ```

pub use self::{
    chip::Chip,
    config::Config,
    error::{EncodingError, Error},
    extract::{encode_file, extract},
    image::{encode, StubImage},
    stub::{FlashStub, StubRecord, StubSource},
};

pub mod chip;
pub mod config;
pub mod error;
pub mod extract;
pub mod image;
#[cfg(feature = "cli")]
pub mod logging;
pub mod stub;
