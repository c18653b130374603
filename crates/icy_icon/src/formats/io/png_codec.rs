//! In-memory PNG blobs for compressed payloads.

use std::io::Cursor;

use crate::{IconError, IconLayer, Result};

pub(crate) const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Encode a layer as a standalone PNG stream.
pub(crate) fn encode(layer: &IconLayer) -> Result<Vec<u8>> {
    let mut blob = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut blob, layer.scale(), layer.scale());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(layer.data())?;
    }
    Ok(blob)
}

/// Decode a standalone PNG stream back to (edge length, RGBA8 pixels).
///
/// The blob is expected to be a square RGBA8 image, which is all this engine
/// ever embeds.
pub(crate) fn decode(data: &[u8]) -> Result<(u32, Vec<u8>)> {
    let decoder = png::Decoder::new(Cursor::new(data));
    let mut reader = decoder.read_info()?;

    let info = reader.info();
    if info.color_type != png::ColorType::Rgba || info.bit_depth != png::BitDepth::Eight {
        return Err(IconError::invalid_png(format!(
            "unsupported format: {:?}/{:?} (expected RGBA/8-bit)",
            info.color_type, info.bit_depth
        )));
    }
    if info.width != info.height {
        return Err(IconError::invalid_png(format!("payload image is not square: {}x{}", info.width, info.height)));
    }

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IconError::invalid_png("output buffer size unknown"))?;
    let mut buf = vec![0; buf_size];
    let frame = reader.next_frame(&mut buf)?;

    buf.truncate(frame.buffer_size());
    Ok((frame.width, buf))
}
