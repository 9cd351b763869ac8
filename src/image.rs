//! The STUB image container
//!
//! All values are little endian:
//!
//! | Offset | Field                      |
//! |-------:|----------------------------|
//! | `0x00` | Magic value, `STUB`        |
//! | `0x04` | Chip type                  |
//! | `0x08` | Entry address              |
//! | `0x0C` | Text start                 |
//! | `0x10` | Text length                |
//! | `0x14` | Text                       |
//! | `n`    | Data start                 |
//! | `n+4`  | Data length                |
//! | `n+8`  | Data                       |

use std::mem::size_of;

use bytemuck::{bytes_of, Pod, Zeroable};

use crate::{error::EncodingError, stub::StubRecord};

pub const STUB_MAGIC: [u8; 4] = *b"STUB";

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C, packed)]
struct StubHeader {
    magic: [u8; 4],
    chip_type: u32,
    entry: u32,
    text_start: u32,
    text_len: u32,
}

impl StubHeader {
    fn new(chip_type: u32, entry: u32, text_start: u32, text_len: u32) -> Self {
        Self {
            magic: STUB_MAGIC,
            chip_type: chip_type.to_le(),
            entry: entry.to_le(),
            text_start: text_start.to_le(),
            text_len: text_len.to_le(),
        }
    }
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C, packed)]
struct SegmentHeader {
    addr: u32,
    length: u32,
}

impl SegmentHeader {
    fn new(addr: u32, length: u32) -> Self {
        Self {
            addr: addr.to_le(),
            length: length.to_le(),
        }
    }
}

/// A validated stub, ready to be serialized
///
/// Segment lengths are never stored; they are taken from the segments
/// themselves when writing the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubImage<'a> {
    chip_type: u32,
    entry: u32,
    text_start: u32,
    text: &'a [u8],
    data_start: u32,
    data: &'a [u8],
}

impl<'a> StubImage<'a> {
    /// Validate `record` against the widths of the image fields
    pub fn new(record: &'a StubRecord, chip_type: u32) -> Result<Self, EncodingError> {
        let image = Self {
            chip_type,
            entry: address("entry", record.entry)?,
            text_start: address("text_start", record.text_start)?,
            text: &record.text,
            data_start: address("data_start", record.data_start)?,
            data: &record.data,
        };

        // Reject oversized segments up front so `to_bytes` can't fail halfway
        segment_len("text", image.text.len())?;
        segment_len("data", image.data.len())?;

        Ok(image)
    }

    pub fn chip_type(&self) -> u32 {
        self.chip_type
    }

    pub fn entry(&self) -> u32 {
        self.entry
    }

    /// Text segment load address and contents
    pub fn text(&self) -> (u32, &'a [u8]) {
        (self.text_start, self.text)
    }

    /// Data segment load address and contents
    pub fn data(&self) -> (u32, &'a [u8]) {
        (self.data_start, self.data)
    }

    /// Total size of the serialized image in bytes
    pub fn size(&self) -> usize {
        size_of::<StubHeader>() + self.text.len() + size_of::<SegmentHeader>() + self.data.len()
    }

    /// Serialize the image
    pub fn to_bytes(&self) -> Vec<u8> {
        // Both lengths were checked in `new`
        let header = StubHeader::new(
            self.chip_type,
            self.entry,
            self.text_start,
            self.text.len() as u32,
        );
        let data_header = SegmentHeader::new(self.data_start, self.data.len() as u32);

        let mut bytes = Vec::with_capacity(self.size());
        bytes.extend_from_slice(bytes_of(&header));
        bytes.extend_from_slice(self.text);
        bytes.extend_from_slice(bytes_of(&data_header));
        bytes.extend_from_slice(self.data);

        bytes
    }
}

/// Build the STUB image for `record`, tagged with `chip_type`
pub fn encode(record: &StubRecord, chip_type: u32) -> Result<Vec<u8>, EncodingError> {
    Ok(StubImage::new(record, chip_type)?.to_bytes())
}

fn address(field: &'static str, value: i128) -> Result<u32, EncodingError> {
    u32::try_from(value).map_err(|_| EncodingError::AddressOutOfRange { field, value })
}

fn segment_len(segment: &'static str, len: usize) -> Result<u32, EncodingError> {
    u32::try_from(len).map_err(|_| EncodingError::SegmentTooLarge { segment, len })
}
