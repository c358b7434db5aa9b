use crate::Config;
use image::{imageops, DynamicImage, GrayImage, Luma};
use snafu::{ensure, Snafu};

#[derive(Debug, Snafu)]
pub enum ExtractError {
    #[snafu(display(
        "Frame is {width}x{height}, expected {expected_width}x{expected_height}"
    ))]
    Dimensions {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}

/// Reduces one already-resized frame to a packed 1-bpp bitmap.
///
/// Pipeline: grayscale, gaussian blur to kill sparkle noise, hard threshold,
/// then a 3x3 erosion/dilation pass to drop isolated on-pixels smaller than
/// the structuring element.
pub fn extract_bitmap(image: &DynamicImage, config: &Config) -> Result<Vec<u8>, ExtractError> {
    ensure!(
        image.width() == config.width && image.height() == config.height,
        DimensionsSnafu {
            width: image.width(),
            height: image.height(),
            expected_width: config.width,
            expected_height: config.height,
        }
    );

    let gray = image.to_luma8();
    let mut binary = imageops::blur(&gray, config.blur_sigma);
    for Luma([p]) in binary.pixels_mut() {
        *p = if *p > config.threshold { 255 } else { 0 };
    }

    let eroded = rank_filter(&binary, config.morph_window, Rank::Min);
    let cleaned = rank_filter(&eroded, config.morph_window, Rank::Max);

    Ok(pack_bitmap(&cleaned, config))
}

#[derive(Clone, Copy)]
enum Rank {
    Min,
    Max,
}

/// Sliding-window minimum/maximum filter. Pixels closer than `window / 2` to
/// the border are copied through unchanged.
fn rank_filter(image: &GrayImage, window: u32, rank: Rank) -> GrayImage {
    let (width, height) = image.dimensions();
    let margin = window / 2;
    let mut out = image.clone();

    for y in margin..height.saturating_sub(margin) {
        for x in margin..width.saturating_sub(margin) {
            let mut acc = match rank {
                Rank::Min => u8::MAX,
                Rank::Max => u8::MIN,
            };
            for dy in 0..window {
                for dx in 0..window {
                    let Luma([p]) = *image.get_pixel(x + dx - margin, y + dy - margin);
                    acc = match rank {
                        Rank::Min => acc.min(p),
                        Rank::Max => acc.max(p),
                    };
                }
            }
            out.put_pixel(x, y, Luma([acc]));
        }
    }

    out
}

/// Packs a thresholded image into the bitmap byte layout: bit `b` of byte
/// `xb + y * (width / 8)` is the pixel at `(xb * 8 + b, y)`.
fn pack_bitmap(image: &GrayImage, config: &Config) -> Vec<u8> {
    let mut data = Vec::with_capacity(config.bytes_per_frame());

    for y in 0..config.height {
        for xb in 0..config.width / 8 {
            let mut byte = 0u8;
            for bit in 0..8 {
                let Luma([p]) = *image.get_pixel(xb * 8 + bit, y);
                if p == 255 {
                    byte |= 1 << bit;
                }
            }
            data.push(byte);
        }
    }

    data
}
