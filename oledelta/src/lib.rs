//! Delta-encoded animation codec for 1-bit-per-pixel OLED panels.
//!
//! An animation is stored as one full **base frame** plus, for every later
//! frame, a sparse list of byte-level **deltas** against the immediately
//! preceding frame. Frames are packed bitmaps: bit `b` of byte
//! `xb + y * (width / 8)` is the pixel at column `xb * 8 + b`, row `y`, and a
//! set bit means "pixel on" (white). At the default 128x64 geometry a frame
//! is exactly 1024 bytes.
//!
//! Reconstruction is strictly sequential: frame `i` only exists as
//! `apply_delta(frame[i - 1], delta[i])`, so there is no random access
//! without replaying from the base frame.
//!
//! # Artifact format
//!
//! The encoded animation is emitted as a pair of C source artifacts meant to
//! be compiled straight into display firmware. The definition artifact
//! carries the arrays:
//!
//! ```c
//! #define FRAME_COUNT 3
//!
//! const uint8_t base_frame[1024] PROGMEM = {
//!   0x00, 0x00, /* ... 16 hex bytes per line ... */
//! };
//!
//! const delta_t frame_1_deltas[] PROGMEM = {
//!   {5, 0x80},
//! };
//!
//! const uint16_t frame_1_delta_count = 1;
//! ```
//!
//! followed by a `NULL`-headed `delta_frames[]` pointer table, a matching
//! `delta_counts[]` table, and a `<name>_expression` aggregate bundling all
//! four items. The declaration artifact is the corresponding header: the
//! `delta_t`/`delta_anim_t` typedefs plus an `extern` for the aggregate.
//!
//! Hex byte literals are always two digits, uppercase. Delta pairs are
//! `{<decimal index>, 0x<HH>}` with indices in `[0, bytes_per_frame)`.
//!
//! The parser in [`parse`] accepts exactly this grammar and rebuilds the
//! frame sequence; [`ser`] and [`parse`] are two views of the same format,
//! and the round trip is lossless.
//!
//! Stored bytes carry the panel's polarity: the emitter bit-complements every
//! byte before mapping bits to palette indices (see [`emit`]).

pub mod delta;
pub mod emit;
pub mod extract;
pub mod parse;
pub mod ser;

pub use delta::{apply_delta, compute_delta, encode_frames, reconstruct, DeltaEntry};

/// Tunables threaded through the extractor, codec, serializer, parser, and
/// emitter. Defaults match the SSD1306-class 128x64 panels the artifacts
/// target.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frame width in pixels. Must be a multiple of 8.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Binarization threshold: a pixel is "on" iff its blurred grayscale
    /// value is strictly greater than this.
    pub threshold: u8,
    /// Gaussian blur sigma applied before thresholding.
    pub blur_sigma: f32,
    /// Window size of the erosion/dilation speckle filter. Must be odd.
    pub morph_window: u32,
    /// Playback rate used when reconstructing a GIF.
    pub fps: u32,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            width: 128,
            height: 64,
            threshold: 140,
            blur_sigma: 1.0,
            morph_window: 3,
            fps: 10,
        }
    }

    /// Packed size of one frame.
    pub const fn bytes_per_frame(&self) -> usize {
        (self.width as usize / 8) * self.height as usize
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully delta-encoded animation: the base frame plus one delta list per
/// following frame. This is the single aggregate both the serializer and the
/// parser operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAnimation {
    /// First frame, stored in full.
    pub base: Vec<u8>,
    /// `deltas[i]` turns frame `i` into frame `i + 1`.
    pub deltas: Vec<Vec<DeltaEntry>>,
}

impl EncodedAnimation {
    pub fn frame_count(&self) -> usize {
        self.deltas.len() + 1
    }
}
