//! Chips for which esptool ships a flasher stub

use strum::{Display, EnumIter, EnumString, VariantNames};

/// All chips with a flasher stub
///
/// The declaration order is the order in which `extract` processes them.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum Chip {
    /// ESP8266
    Esp8266,
    /// ESP32
    Esp32,
    /// ESP32-S2
    Esp32s2,
    /// ESP32-S3
    Esp32s3,
    /// ESP32-C3, ESP8685
    Esp32c3,
}

impl Chip {
    /// Tag written into the `chip_type` field of a STUB image
    ///
    /// The ESP32 family uses its image chip ID; the ESP8266 has none, so it
    /// is placed just above the 16-bit chip ID range.
    pub fn chip_type(&self) -> u32 {
        match self {
            Chip::Esp8266 => 0x10000,
            Chip::Esp32 => 0,
            Chip::Esp32s2 => 2,
            Chip::Esp32s3 => 9,
            Chip::Esp32c3 => 5,
        }
    }

    /// File name of the stub description in esptool's `stub_flasher`
    /// directory
    pub fn esptool_stub_name(&self) -> &'static str {
        match self {
            Chip::Esp8266 => "stub_flasher_8266.json",
            Chip::Esp32 => "stub_flasher_32.json",
            Chip::Esp32s2 => "stub_flasher_32s2.json",
            Chip::Esp32s3 => "stub_flasher_32s3.json",
            Chip::Esp32c3 => "stub_flasher_32c3.json",
        }
    }

    /// File name of the stub description as converted to TOML by espflash
    pub fn espflash_stub_name(&self) -> String {
        format!("{self}.toml")
    }

    /// File name of the generated STUB image
    pub fn image_name(&self) -> String {
        format!("{self}_stub.bin")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn chip_types() {
        let tags: Vec<_> = Chip::iter().map(|chip| chip.chip_type()).collect();
        assert_eq!(tags, vec![0x10000, 0, 2, 9, 5]);
    }

    #[test]
    fn file_names() {
        assert_eq!(Chip::Esp8266.image_name(), "esp8266_stub.bin");
        assert_eq!(Chip::Esp32s3.image_name(), "esp32s3_stub.bin");
        assert_eq!(Chip::Esp32c3.espflash_stub_name(), "esp32c3.toml");
        assert_eq!(Chip::Esp32s2.esptool_stub_name(), "stub_flasher_32s2.json");
    }

    #[test]
    fn parse_from_name() {
        for chip in Chip::iter() {
            assert_eq!(Chip::from_str(&chip.to_string()).unwrap(), chip);
        }

        assert_eq!(Chip::VARIANTS.len(), 5);
        assert!(Chip::from_str("esp32c6").is_err());
    }
}
