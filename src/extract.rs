//! Write the STUB image of every configured chip

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    chip::Chip,
    config::Config,
    error::{Error, ResultExt},
    image::StubImage,
    stub::{FlashStub, StubRecord, StubSource},
};

/// Extract the stubs for all chips in `config`
///
/// Stops at the first chip that fails; images written before that point are
/// left in place. Returns the paths of the written images.
pub fn extract(config: &Config) -> Result<Vec<PathBuf>, Error> {
    let source = StubSource::new(config.stub_dir());
    let output_dir = config.output_dir();

    fs::create_dir_all(output_dir).map_err(|err| Error::io(output_dir, err))?;

    let mut written = Vec::with_capacity(config.chips().len());
    for &chip in config.chips() {
        let path = output_dir.join(chip.image_name());

        source
            .load(chip)
            .and_then(|record| write_image(&record, chip, &path))
            .for_chip(chip)?;

        written.push(path);
    }

    Ok(written)
}

/// Encode a single stub description for `chip` into `output`
pub fn encode_file(input: &Path, chip: Chip, output: &Path) -> Result<(), Error> {
    let record = FlashStub::from_file(input)?.into_record()?;

    write_image(&record, chip, output)
}

fn write_image(record: &StubRecord, chip: Chip, path: &Path) -> Result<(), Error> {
    let image = StubImage::new(record, chip.chip_type())?;

    let (text_addr, text) = image.text();
    debug!("{chip}: {} byte stub text at {text_addr:#010x}", text.len());
    let (data_addr, data) = image.data();
    debug!("{chip}: {} byte stub data at {data_addr:#010x}", data.len());

    fs::write(path, image.to_bytes()).map_err(|err| Error::io(path, err))?;
    info!(
        "Wrote {} ({} bytes, entry {:#010x})",
        path.display(),
        image.size(),
        image.entry()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::StubLocation;

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/resources/stubs")
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("espstub-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn location() -> StubLocation {
        StubLocation {
            stub_dir: Some(fixtures()),
            ..Default::default()
        }
    }

    #[test]
    fn extracts_all_chips() {
        let out = scratch("all");
        let config = Config::new(&location(), &out, &[]).unwrap();

        let written = extract(&config).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec![
                "esp8266_stub.bin",
                "esp32_stub.bin",
                "esp32s2_stub.bin",
                "esp32s3_stub.bin",
                "esp32c3_stub.bin",
            ]
        );

        for (path, chip) in written.iter().zip(config.chips()) {
            let bytes = fs::read(path).unwrap();
            assert_eq!(&bytes[..4], b"STUB");
            assert_eq!(&bytes[4..8], &chip.chip_type().to_le_bytes());
        }

        fs::remove_dir_all(out).unwrap();
    }

    #[test]
    fn esp8266_image_contents() {
        let out = scratch("esp8266");
        let config = Config::new(&location(), &out, &[Chip::Esp8266]).unwrap();

        extract(&config).unwrap();
        let bytes = fs::read(out.join("esp8266_stub.bin")).unwrap();

        let mut expected = b"STUB".to_vec();
        expected.extend_from_slice(&0x10000u32.to_le_bytes());
        expected.extend_from_slice(&0x4010_f000u32.to_le_bytes());
        expected.extend_from_slice(&0x4010_0000u32.to_le_bytes());
        expected.extend_from_slice(&16u32.to_le_bytes());
        expected.extend(0u8..16);
        expected.extend_from_slice(&0x3ffe_8000u32.to_le_bytes());
        expected.extend_from_slice(&4u32.to_le_bytes());
        expected.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd]);

        assert_eq!(bytes, expected);

        fs::remove_dir_all(out).unwrap();
    }

    #[test]
    fn reports_failing_chip() {
        let out = scratch("missing");
        let location = StubLocation {
            stub_dir: Some(fixtures().join("missing")),
            ..Default::default()
        };
        let config = Config::new(&location, &out, &[Chip::Esp32s3]).unwrap();

        let err = extract(&config).unwrap_err();
        match err {
            Error::Chip { chip, source } => {
                assert_eq!(chip, Chip::Esp32s3);
                assert!(matches!(*source, Error::StubNotFound { .. }));
            }
            err => panic!("unexpected error: {err:?}"),
        }

        let _ = fs::remove_dir_all(out);
    }

    #[test]
    fn encode_single_file() {
        let out = scratch("single");
        fs::create_dir_all(&out).unwrap();
        let output = out.join("custom.bin");

        encode_file(&fixtures().join("esp32c3.toml"), Chip::Esp32c3, &output).unwrap();

        let bytes = fs::read(&output).unwrap();
        assert_eq!(bytes.len(), 20 + 32 + 8 + 4);
        assert_eq!(&bytes[4..8], &[5, 0, 0, 0]);

        fs::remove_dir_all(out).unwrap();
    }

    #[test]
    fn out_of_range_record_writes_nothing() {
        let out = scratch("range");
        fs::create_dir_all(&out).unwrap();
        let path = out.join("bad.bin");

        let record = StubRecord {
            entry: 1 << 32,
            ..Default::default()
        };
        let err = write_image(&record, Chip::Esp32, &path).unwrap_err();

        assert!(matches!(err, Error::Encoding(_)));
        assert!(!path.exists());

        fs::remove_dir_all(out).unwrap();
    }
}
