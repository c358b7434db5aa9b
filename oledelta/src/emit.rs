use crate::Config;
use snafu::{ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
pub enum EmitError {
    #[snafu(display("Failed to encode GIF: {source}"))]
    GifEncode { source: gif::EncodingError },
}

/// Palette used by every emitted frame: index 0 = black, index 1 = white.
const PALETTE: [u8; 6] = [0, 0, 0, 255, 255, 255];

/// Unpacks a stored frame into one palette index per pixel.
///
/// Stored bytes are polarity-inverted for the target panel, so each byte is
/// bit-complemented before its bits are mapped: bit=1 becomes index 1
/// (white), bit=0 index 0 (black).
pub fn bitmap_to_indexed(frame: &[u8], config: &Config) -> Vec<u8> {
    let width = config.width as usize;
    let mut pixels = vec![0u8; width * config.height as usize];

    let mut i = 0;
    for y in 0..config.height as usize {
        for xb in 0..width / 8 {
            let byte = !frame[i];
            i += 1;
            for bit in 0..8 {
                pixels[y * width + xb * 8 + bit] = (byte >> bit) & 1;
            }
        }
    }

    pixels
}

/// Writes the reconstructed frame sequence as an infinitely looping 2-color
/// GIF with a fixed per-frame delay of `round(1000 / fps)` milliseconds.
pub fn write_gif<W: Write>(
    frames: &[Vec<u8>],
    config: &Config,
    w: W,
) -> Result<(), EmitError> {
    let mut encoder = gif::Encoder::new(
        w,
        config.width as u16,
        config.height as u16,
        &PALETTE,
    )
    .context(GifEncodeSnafu)?;
    encoder
        .set_repeat(gif::Repeat::Infinite)
        .context(GifEncodeSnafu)?;

    // GIF delays tick in centiseconds.
    let duration_ms = (1000.0 / config.fps as f64).round() as u32;
    let delay = (duration_ms / 10) as u16;

    for bitmap in frames {
        let pixels = bitmap_to_indexed(bitmap, config);
        let mut frame = gif::Frame::from_indexed_pixels(
            config.width as u16,
            config.height as u16,
            pixels,
            None,
        );
        frame.delay = delay;
        encoder.write_frame(&frame).context(GifEncodeSnafu)?;
    }

    Ok(())
}
