//! ICO container encoding.
//!
//! An ICO file here holds exactly one PNG-compressed image: a 6-byte
//! header, one 16-byte directory entry, then the PNG bytes unchanged.

use crate::error::ExportError;
use std::io::Cursor;
use std::path::Path;

pub const ICO_HEADER_LEN: usize = 6;
pub const ICO_ENTRY_LEN: usize = 16;
/// Offset of the image payload: header plus one directory entry.
pub const ICO_IMAGE_OFFSET: u32 = (ICO_HEADER_LEN + ICO_ENTRY_LEN) as u32;

/// Width and height of a PNG payload, read from its header.
pub fn png_dimensions(png: &[u8]) -> Result<(u32, u32), ExportError> {
    if png.is_empty() {
        return Err(ExportError::EmptyPayload);
    }
    let decoder = png::Decoder::new(Cursor::new(png));
    let reader = decoder.read_info().map_err(|e| ExportError::InvalidPng(e.to_string()))?;
    let info = reader.info();
    Ok((info.width, info.height))
}

/// Directory size byte: sides of 256 and above are stored as 0.
fn dimension_byte(side: u32) -> u8 {
    u8::try_from(side).unwrap_or(0)
}

/// Wrap a PNG payload in a single-image ICO container.
pub fn encode_ico(png: &[u8]) -> Result<Vec<u8>, ExportError> {
    let (width, height) = png_dimensions(png)?;
    let size = u32::try_from(png.len()).map_err(|_| ExportError::InvalidPng("payload exceeds 4 GiB".to_string()))?;

    let mut out = Vec::with_capacity(ICO_IMAGE_OFFSET as usize + png.len());
    // Reserved, type 1 (icon), one image
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());

    out.push(dimension_byte(width));
    out.push(dimension_byte(height));
    out.push(0); // palette
    out.push(0); // reserved
    out.extend_from_slice(&1u16.to_le_bytes()); // color planes
    out.extend_from_slice(&32u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&ICO_IMAGE_OFFSET.to_le_bytes());

    out.extend_from_slice(png);
    log::debug!("Encoded {width}x{height} ICO ({} bytes)", out.len());
    Ok(out)
}

/// Read a PNG file and write it to `output` as an ICO.
pub fn convert_png_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<(u32, u32), ExportError> {
    let png = std::fs::read(input)?;
    let dimensions = png_dimensions(&png)?;
    std::fs::write(output.as_ref(), encode_ico(&png)?)?;
    log::info!("Wrote {}", output.as_ref().display());
    Ok(dimensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            let data = vec![200u8; (width * height * 4) as usize];
            writer.write_image_data(&data).unwrap();
        }
        out
    }

    #[test]
    fn test_header_and_entry() {
        let png = png_bytes(64, 64);
        let ico = encode_ico(&png).unwrap();

        assert_eq!(&ico[..6], &[0, 0, 1, 0, 1, 0]);
        let entry = &ico[6..22];
        assert_eq!(entry[0], 64);
        assert_eq!(entry[1], 64);
        assert_eq!(&entry[2..8], &[0, 0, 1, 0, 32, 0]);
        assert_eq!(u32::from_le_bytes(entry[8..12].try_into().unwrap()), png.len() as u32);
        assert_eq!(u32::from_le_bytes(entry[12..16].try_into().unwrap()), 22);
        assert_eq!(&ico[22..], png.as_slice());
    }

    #[test]
    fn test_large_sides_encode_as_zero() {
        let ico = encode_ico(&png_bytes(256, 300)).unwrap();
        assert_eq!(ico[6], 0);
        assert_eq!(ico[7], 0);

        let ico = encode_ico(&png_bytes(255, 16)).unwrap();
        assert_eq!(ico[6], 255);
        assert_eq!(ico[7], 16);
    }

    #[test]
    fn test_rejects_bad_payloads() {
        assert!(matches!(encode_ico(&[]), Err(ExportError::EmptyPayload)));
        assert!(matches!(encode_ico(b"GIF89a not a png"), Err(ExportError::InvalidPng(_))));
    }

    #[test]
    fn test_convert_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("icon.png");
        let output = dir.path().join("icon.ico");
        std::fs::write(&input, png_bytes(32, 32)).unwrap();

        assert_eq!(convert_png_file(&input, &output).unwrap(), (32, 32));
        let ico = std::fs::read(&output).unwrap();
        assert_eq!(ico[6], 32);
        assert!(matches!(
            convert_png_file(dir.path().join("missing.png"), &output),
            Err(ExportError::Io(_))
        ));
    }
}
