use std::collections::HashMap;
use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::png_codec;
use crate::{IconError, IconLayer, Result};

// https://en.wikipedia.org/wiki/Apple_Icon_Image_format

const ICNS_MAGIC: &[u8; 4] = b"icns";
/// Tag plus length field, present on the outer record and on every element.
const RECORD_HEADER_SIZE: u32 = 8;

lazy_static::lazy_static! {
    /// OSType per (pixel resolution, double-density flag).
    ///
    /// Keyed explicitly so reordering layers can never mismatch tags. The
    /// double-density entries carry their *pixel* size, e.g. `ic11` is the
    /// 16pt @2x slot and therefore 32px.
    static ref ELEMENT_TYPES: HashMap<(u32, bool), [u8; 4]> = {
        let mut table = HashMap::new();
        table.insert((16, false), *b"icp4");
        table.insert((32, false), *b"icp5");
        table.insert((64, false), *b"icp6");
        table.insert((128, false), *b"ic07");
        table.insert((256, false), *b"ic08");
        table.insert((512, false), *b"ic09");
        table.insert((32, true), *b"ic11");
        table.insert((64, true), *b"ic12");
        table.insert((256, true), *b"ic13");
        table.insert((512, true), *b"ic14");
        table.insert((1024, true), *b"ic10");
        table
    };
}

fn element_type(scale: u32, retina: bool) -> Option<[u8; 4]> {
    ELEMENT_TYPES.get(&(scale, retina)).copied()
}

fn element_info(tag: [u8; 4]) -> Option<(u32, bool)> {
    ELEMENT_TYPES.iter().find(|(_, t)| **t == tag).map(|(key, _)| *key)
}

/// Serialize layers into a macOS-style tagged-chunk container.
///
/// Every layer becomes one PNG element regardless of its compression flag;
/// the per-layer flag only matters for the directory-based container. All
/// length fields are big-endian and include their own record header.
pub(crate) fn save_icns(layers: &[IconLayer]) -> Result<Vec<u8>> {
    let mut elements = Vec::new();
    let mut seen = Vec::new();

    for layer in layers {
        let tag = element_type(layer.scale(), layer.is_retina()).ok_or(IconError::UnknownIcnsScale {
            scale: layer.scale(),
            retina: layer.is_retina(),
        })?;
        if seen.contains(&tag) {
            return Err(IconError::DuplicateScale { scale: layer.scale() });
        }
        seen.push(tag);

        let blob = png_codec::encode(layer)?;
        elements.extend_from_slice(&tag);
        elements.write_u32::<BigEndian>(blob.len() as u32 + RECORD_HEADER_SIZE)?;
        elements.extend_from_slice(&blob);
        log::debug!("{} element: {} bytes", String::from_utf8_lossy(&tag), blob.len());
    }

    let mut result = Vec::with_capacity(elements.len() + RECORD_HEADER_SIZE as usize);
    result.extend_from_slice(ICNS_MAGIC);
    result.write_u32::<BigEndian>(elements.len() as u32 + RECORD_HEADER_SIZE)?;
    result.extend_from_slice(&elements);
    Ok(result)
}

/// Parse a macOS-style container back into its layers.
///
/// Elements with tags this engine does not produce (table of contents,
/// version info, legacy ARGB slots) are skipped.
pub(crate) fn load_icns(data: &[u8]) -> Result<Vec<IconLayer>> {
    if data.len() < RECORD_HEADER_SIZE as usize {
        return Err(IconError::FileTooShort);
    }
    if &data[0..4] != ICNS_MAGIC {
        return Err(IconError::IdMismatch);
    }
    let total = Cursor::new(&data[4..8]).read_u32::<BigEndian>()? as usize;
    if total != data.len() {
        return Err(IconError::OutOfBounds { offset: total });
    }

    let mut result = Vec::new();
    let mut offset = RECORD_HEADER_SIZE as usize;
    while offset < data.len() {
        if offset + RECORD_HEADER_SIZE as usize > data.len() {
            return Err(IconError::OutOfBounds { offset });
        }
        let tag: [u8; 4] = [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]];
        let length = Cursor::new(&data[offset + 4..offset + 8]).read_u32::<BigEndian>()? as usize;
        if length < RECORD_HEADER_SIZE as usize || offset + length > data.len() {
            return Err(IconError::OutOfBounds { offset });
        }

        let Some((scale, retina)) = element_info(tag) else {
            log::debug!("skipping unknown element {:?}", String::from_utf8_lossy(&tag));
            offset += length;
            continue;
        };

        let blob = &data[offset + RECORD_HEADER_SIZE as usize..offset + length];
        let (side, pixels) = png_codec::decode(blob)?;
        if side != scale {
            log::warn!("element {} declares {scale}px but contains a {side}px image", String::from_utf8_lossy(&tag));
        }
        result.push(IconLayer::new(side, true, pixels)?.with_retina(retina));
        offset += length;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_layer(scale: u32) -> IconLayer {
        let mut data = Vec::with_capacity((scale * scale * 4) as usize);
        for i in 0..scale * scale {
            data.extend([(i % 251) as u8, (i % 241) as u8, (i % 239) as u8, 0xFF]);
        }
        IconLayer::new(scale, false, data).unwrap()
    }

    #[test]
    fn test_container_structure() {
        let layers = vec![create_layer(16), create_layer(32)];
        let data = save_icns(&layers).unwrap();

        assert_eq!(&data[0..4], b"icns");
        let total = u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize;
        assert_eq!(total, data.len());

        // first element: icp4 with its own length bookkeeping
        assert_eq!(&data[8..12], b"icp4");
        let first_len = u32::from_be_bytes([data[12], data[13], data[14], data[15]]) as usize;
        assert_eq!(&data[16..24], &png_codec::PNG_SIGNATURE);
        assert_eq!(&data[8 + first_len..8 + first_len + 4], b"icp5");
    }

    #[test]
    fn test_roundtrip() {
        let layers = vec![create_layer(16), create_layer(128), create_layer(512)];
        let data = save_icns(&layers).unwrap();

        let loaded = load_icns(&data).unwrap();
        assert_eq!(loaded.len(), 3);
        for (loaded, original) in loaded.iter().zip(&layers) {
            assert_eq!(loaded.scale(), original.scale());
            assert_eq!(loaded.data(), original.data());
            assert!(!loaded.is_retina());
        }
    }

    #[test]
    fn test_retina_tags() {
        let layers = vec![create_layer(32).with_retina(true), create_layer(1024).with_retina(true)];
        let data = save_icns(&layers).unwrap();

        assert_eq!(&data[8..12], b"ic11");
        let loaded = load_icns(&data).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(IconLayer::is_retina));
        assert_eq!(loaded[1].scale(), 1024);
    }

    #[test]
    fn test_unknown_scale_is_rejected() {
        let err = save_icns(&[create_layer(48)]).unwrap_err();
        assert!(matches!(err, IconError::UnknownIcnsScale { scale: 48, retina: false }));

        // 1024 only exists as the 512pt @2x slot
        let err = save_icns(&[create_layer(1024)]).unwrap_err();
        assert!(matches!(err, IconError::UnknownIcnsScale { scale: 1024, retina: false }));
    }

    #[test]
    fn test_duplicate_elements_are_rejected() {
        let layers = vec![create_layer(16), create_layer(16)];
        assert!(matches!(save_icns(&layers), Err(IconError::DuplicateScale { scale: 16 })));
    }

    #[test]
    fn test_empty_layer_set() {
        let data = save_icns(&[]).unwrap();
        assert_eq!(data.len(), 8);
        assert!(load_icns(&data).unwrap().is_empty());
    }

    #[test]
    fn test_load_skips_unknown_elements() {
        let mut data = save_icns(&[create_layer(16)]).unwrap();
        // append a TOC element and fix up the outer length
        data.extend_from_slice(b"TOC ");
        data.extend_from_slice(&12u32.to_be_bytes());
        data.extend_from_slice(&[0, 0, 0, 0]);
        let total = data.len() as u32;
        data[4..8].copy_from_slice(&total.to_be_bytes());

        let loaded = load_icns(&data).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_load_rejects_truncated_container() {
        let data = save_icns(&[create_layer(16)]).unwrap();
        assert!(matches!(load_icns(&data[0..data.len() - 1]), Err(IconError::OutOfBounds { .. })));
        assert!(matches!(load_icns(b"not-icns"), Err(IconError::IdMismatch)));
    }
}
