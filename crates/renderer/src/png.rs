//! RGBA PNG export for rendered frames.

use std::io::Write;
use std::path::Path;

use crate::compositor::RenderedFrame;
use crate::error::{RenderError, RenderResult};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Encode a frame as an 8-bit RGBA PNG.
pub fn encode_frame(frame: &RenderedFrame) -> RenderResult<Vec<u8>> {
    encode_rgba(&frame.pixels, frame.width, frame.height)
}

/// Encode a raw RGBA buffer (4 bytes per pixel, rows top to bottom).
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(RenderError::Png(format!("empty image {}x{}", width, height)));
    }
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(RenderError::Png(format!("{}x{} exceeds PNG limits", width, height))),
    };
    if Some(pixels.len()) != width.checked_mul(height).and_then(|n| n.checked_mul(4)) {
        return Err(RenderError::Png(format!(
            "buffer of {} bytes does not match {}x{} RGBA",
            pixels.len(),
            width,
            height
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&w.to_be_bytes());
    ihdr.extend_from_slice(&h.to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(6); // color type (RGBA)
    ihdr.push(0); // compression method
    ihdr.push(0); // filter method
    ihdr.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr);

    let idat = deflate_scanlines(pixels, width * 4)
        .map_err(|e| RenderError::Png(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Encode `frame` and write it to `path`.
pub fn write_png(path: impl AsRef<Path>, frame: &RenderedFrame) -> RenderResult<()> {
    let bytes = encode_frame(frame)?;
    std::fs::write(path.as_ref(), &bytes)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        bytes = bytes.len(),
        width = frame.width,
        height = frame.height,
        "PNG written"
    );
    Ok(())
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(pixels: &[u8], row_bytes: usize) -> std::io::Result<Vec<u8>> {
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    for row in pixels.chunks_exact(row_bytes) {
        encoder.write_all(&[0])?;
        encoder.write_all(row)?;
    }
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_and_chunks() {
        let frame = RenderedFrame::allocate(3, 2, 1).unwrap();
        let png = encode_frame(&frame).unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);
        assert_eq!(&png[8..12], &13u32.to_be_bytes());
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..20], &3u32.to_be_bytes());
        assert_eq!(&png[20..24], &2u32.to_be_bytes());
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        assert!(matches!(encode_rgba(&[0; 7], 1, 2), Err(RenderError::Png(_))));
        assert!(matches!(encode_rgba(&[], 0, 0), Err(RenderError::Png(_))));
    }

    #[test]
    fn test_idat_inflates_to_filtered_rows() {
        use std::io::Read;

        let pixels: Vec<u8> = (0..16).collect();
        let png = encode_rgba(&pixels, 2, 2).unwrap();

        // IDAT follows the 8-byte signature and the 25-byte IHDR chunk.
        let idat_start = 8 + 25;
        let len = u32::from_be_bytes(png[idat_start..idat_start + 4].try_into().unwrap()) as usize;
        assert_eq!(&png[idat_start + 4..idat_start + 8], b"IDAT");
        let data = &png[idat_start + 8..idat_start + 8 + len];

        let mut raw = Vec::new();
        flate2::read::ZlibDecoder::new(data).read_to_end(&mut raw).unwrap();
        let mut expected = vec![0u8];
        expected.extend(0..8);
        expected.push(0);
        expected.extend(8..16);
        assert_eq!(raw, expected);
    }
}
