use std::collections::HashSet;
use std::io::{Cursor, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::png_codec;
use crate::{IconError, IconLayer, Result};

// https://en.wikipedia.org/wiki/ICO_(file_format)

const ICO_HEADER_SIZE: usize = 6;
const ICO_DIRECTORY_SIZE: usize = 16;
const ICO_RESOURCE_ICON: u16 = 1;

const BITMAP_HEADER_SIZE: u32 = 40;

/// Byte width of one 1-bit mask row, padded to a 32-bit boundary.
pub(crate) fn mask_bytes_per_row(scale: u32) -> u32 {
    scale.div_ceil(32) * 4
}

/// One ICONDIRENTRY record.
struct DirEntry {
    width: u8,
    height: u8,
    num_colors: u8,
    reserved: u8,
    planes: u16,
    depth: u16,
    bytes: u32,
    offset: u32,
}

impl DirEntry {
    fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_u8(self.width)?;
        out.write_u8(self.height)?;
        out.write_u8(self.num_colors)?;
        out.write_u8(self.reserved)?;
        out.write_u16::<LittleEndian>(self.planes)?;
        out.write_u16::<LittleEndian>(self.depth)?;
        out.write_u32::<LittleEndian>(self.bytes)?;
        out.write_u32::<LittleEndian>(self.offset)?;
        Ok(())
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> Result<DirEntry> {
        Ok(DirEntry {
            width: cursor.read_u8()?,
            height: cursor.read_u8()?,
            num_colors: cursor.read_u8()?,
            reserved: cursor.read_u8()?,
            planes: cursor.read_u16::<LittleEndian>()?,
            depth: cursor.read_u16::<LittleEndian>()?,
            bytes: cursor.read_u32::<LittleEndian>()?,
            offset: cursor.read_u32::<LittleEndian>()?,
        })
    }
}

/// Serialize layers into a classic directory-based icon container.
///
/// The directory entries reference payload offsets that are only known after
/// the payloads are laid out, so the table is reserved as zero bytes first
/// and patched in place once every payload length is final.
pub(crate) fn save_ico(layers: &[IconLayer]) -> Result<Vec<u8>> {
    if layers.len() > u16::MAX as usize {
        return Err(IconError::TooManyLayers {
            count: layers.len(),
            max: u16::MAX as usize,
        });
    }
    let mut seen = HashSet::new();
    for layer in layers {
        if !seen.insert(layer.scale()) {
            return Err(IconError::DuplicateScale { scale: layer.scale() });
        }
    }

    let mut result = Vec::new();

    // ICONDIR: reserved, resource type, entry count
    result.write_u16::<LittleEndian>(0)?;
    result.write_u16::<LittleEndian>(ICO_RESOURCE_ICON)?;
    result.write_u16::<LittleEndian>(layers.len() as u16)?;

    // reserve the directory table
    result.resize(ICO_HEADER_SIZE + ICO_DIRECTORY_SIZE * layers.len(), 0);

    let mut dirs = Vec::with_capacity(layers.len());
    for layer in layers {
        let offset = result.len() as u32;
        let dir = if layer.is_compressed() {
            write_png_payload(&mut result, layer, offset)?
        } else {
            write_bitmap_payload(&mut result, layer, offset)?
        };
        log::debug!("{}x{} payload: {} bytes at offset {}", layer.scale(), layer.scale(), dir.bytes, offset);
        dirs.push(dir);
    }

    // patch the reserved table with the final directory entries
    for (i, dir) in dirs.iter().enumerate() {
        let start = ICO_HEADER_SIZE + i * ICO_DIRECTORY_SIZE;
        let mut slot = &mut result[start..start + ICO_DIRECTORY_SIZE];
        dir.write(&mut slot)?;
    }

    Ok(result)
}

/// Scales of 256 and up wrap to 0 in the single-byte dimension fields; the
/// payload headers carry the real size.
fn dimension_byte(scale: u32) -> u8 {
    if scale >= 256 { 0 } else { scale as u8 }
}

fn write_bitmap_payload(out: &mut Vec<u8>, layer: &IconLayer, offset: u32) -> Result<DirEntry> {
    let scale = layer.scale();
    let bytes_per_row = mask_bytes_per_row(scale);
    let image_size = scale * scale * 4 + bytes_per_row * scale;

    // bitmap sub-header; the doubled height reserves the implicit mask plane
    out.write_u32::<LittleEndian>(BITMAP_HEADER_SIZE)?;
    out.write_i32::<LittleEndian>(scale as i32)?;
    out.write_i32::<LittleEndian>(scale as i32 * 2)?;
    out.write_u16::<LittleEndian>(1)?; // planes
    out.write_u16::<LittleEndian>(32)?; // bit depth
    out.write_u32::<LittleEndian>(0)?; // no compression
    out.write_u32::<LittleEndian>(image_size)?;
    out.write_i32::<LittleEndian>(0)?; // x pixels per meter
    out.write_i32::<LittleEndian>(0)?; // y pixels per meter
    out.write_u32::<LittleEndian>(0)?; // palette size
    out.write_u32::<LittleEndian>(0)?; // important colors

    // color data: bottom-up rows, BGRA samples
    for y in (0..scale).rev() {
        for x in 0..scale {
            let [r, g, b, a] = layer.rgba(x, y);
            out.extend([b, g, r, a]);
        }
    }

    // mask: one bit per pixel, set = fully transparent, MSB first,
    // rows padded to 32 bits and emitted bottom-up like the color data
    for y in (0..scale).rev() {
        let mut row = vec![0; bytes_per_row as usize];
        for x in 0..scale {
            if layer.rgba(x, y)[3] == 0 {
                row[(x / 8) as usize] |= 1 << (7 - x % 8);
            }
        }
        out.extend_from_slice(&row);
    }

    Ok(DirEntry {
        width: dimension_byte(scale),
        height: dimension_byte(scale),
        num_colors: 0,
        reserved: 0,
        planes: 1,
        depth: 32,
        bytes: BITMAP_HEADER_SIZE + image_size,
        offset,
    })
}

fn write_png_payload(out: &mut Vec<u8>, layer: &IconLayer, offset: u32) -> Result<DirEntry> {
    let blob = png_codec::encode(layer)?;
    out.extend_from_slice(&blob);

    // dimension fields are meaningless for embedded PNG payloads
    Ok(DirEntry {
        width: 0,
        height: 0,
        num_colors: 0,
        reserved: 0,
        planes: 0,
        depth: 0,
        bytes: blob.len() as u32,
        offset,
    })
}

/// Parse a classic icon container back into its layers.
pub(crate) fn load_ico(data: &[u8]) -> Result<Vec<IconLayer>> {
    if data.len() < ICO_HEADER_SIZE {
        return Err(IconError::FileTooShort);
    }
    let mut cursor = Cursor::new(data);
    let reserved = cursor.read_u16::<LittleEndian>()?;
    let resource = cursor.read_u16::<LittleEndian>()?;
    if reserved != 0 || resource != ICO_RESOURCE_ICON {
        return Err(IconError::IdMismatch);
    }

    let count = cursor.read_u16::<LittleEndian>()? as usize;
    if data.len() < ICO_HEADER_SIZE + count * ICO_DIRECTORY_SIZE {
        return Err(IconError::FileTooShort);
    }

    let mut result = Vec::with_capacity(count);
    for _ in 0..count {
        let dir = DirEntry::read(&mut cursor)?;
        let start = dir.offset as usize;
        let end = start + dir.bytes as usize;
        if end > data.len() || start >= end {
            return Err(IconError::OutOfBounds { offset: start });
        }

        let payload = &data[start..end];
        if payload.starts_with(&png_codec::PNG_SIGNATURE) {
            let (scale, pixels) = png_codec::decode(payload)?;
            result.push(IconLayer::new(scale, true, pixels)?);
        } else {
            result.push(read_bitmap_payload(payload, start)?);
        }
    }
    Ok(result)
}

fn read_bitmap_payload(payload: &[u8], offset: usize) -> Result<IconLayer> {
    if payload.len() < BITMAP_HEADER_SIZE as usize {
        return Err(IconError::OutOfBounds { offset });
    }
    let mut cursor = Cursor::new(payload);
    let header_size = cursor.read_u32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()?;
    let height = cursor.read_i32::<LittleEndian>()?;
    let _planes = cursor.read_u16::<LittleEndian>()?;
    let depth = cursor.read_u16::<LittleEndian>()?;
    let compression = cursor.read_u32::<LittleEndian>()?;

    if header_size != BITMAP_HEADER_SIZE {
        return Err(IconError::UnsupportedBitmap {
            message: format!("unexpected sub-header size {header_size}"),
        });
    }
    if depth != 32 || compression != 0 {
        return Err(IconError::UnsupportedBitmap {
            message: format!("only uncompressed 32-bit payloads are supported (depth {depth}, compression {compression})"),
        });
    }
    if width <= 0 || height != width * 2 {
        return Err(IconError::UnsupportedBitmap {
            message: format!("implausible payload dimensions {width}x{height}"),
        });
    }

    let scale = width as u32;
    let pixel_bytes = (scale * scale * 4) as usize;
    let pixel_start = BITMAP_HEADER_SIZE as usize;
    if payload.len() < pixel_start + pixel_bytes {
        return Err(IconError::OutOfBounds { offset: offset + payload.len() });
    }

    // color data is bottom-up BGRA; the mask that follows is redundant with
    // the alpha channel and is skipped
    let mut pixels = vec![0; pixel_bytes];
    for y in 0..scale {
        for x in 0..scale {
            let src = pixel_start + (((scale - y - 1) * scale + x) * 4) as usize;
            let dst = ((y * scale + x) * 4) as usize;
            pixels[dst] = payload[src + 2];
            pixels[dst + 1] = payload[src + 1];
            pixels[dst + 2] = payload[src];
            pixels[dst + 3] = payload[src + 3];
        }
    }
    IconLayer::new(scale, false, pixels)
}
