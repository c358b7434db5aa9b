use crate::{Config, EncodedAnimation};
use snafu::{ensure, Snafu};

/// One changed byte between two consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaEntry {
    pub index: u16,
    pub value: u8,
}

#[derive(Debug, Snafu)]
pub enum EncodeError {
    #[snafu(display("Animation has no frames"))]
    NoFrames,
    #[snafu(display(
        "Frame {frame} is {len} bytes, expected {expected} for the configured geometry"
    ))]
    FrameLength {
        frame: usize,
        len: usize,
        expected: usize,
    },
}

/// Computes the sparse byte-level difference between two frames.
///
/// Emits one entry per differing byte position, in ascending index order.
/// Identical frames yield an empty delta.
pub fn compute_delta(prev: &[u8], curr: &[u8]) -> Vec<DeltaEntry> {
    prev.iter()
        .zip(curr)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, (_, &b))| DeltaEntry {
            index: i as u16,
            value: b,
        })
        .collect()
}

/// Applies a delta to a frame, returning the next frame. `prev` is left
/// untouched so every reconstructed frame stays independently valid.
pub fn apply_delta(prev: &[u8], delta: &[DeltaEntry]) -> Vec<u8> {
    let mut next = prev.to_vec();
    for &DeltaEntry { index, value } in delta {
        next[usize::from(index)] = value;
    }
    next
}

/// Delta-encodes an ordered frame sequence: the first frame becomes the base,
/// every later frame is reduced to its difference against its predecessor.
pub fn encode_frames(frames: &[Vec<u8>], config: &Config) -> Result<EncodedAnimation, EncodeError> {
    ensure!(!frames.is_empty(), NoFramesSnafu);

    let expected = config.bytes_per_frame();
    for (i, frame) in frames.iter().enumerate() {
        ensure!(
            frame.len() == expected,
            FrameLengthSnafu {
                frame: i,
                len: frame.len(),
                expected,
            }
        );
    }

    let deltas = frames
        .windows(2)
        .map(|pair| compute_delta(&pair[0], &pair[1]))
        .collect();

    Ok(EncodedAnimation {
        base: frames[0].clone(),
        deltas,
    })
}

/// Rebuilds the full frame sequence. Each step applies to the previous
/// *reconstructed* frame, never to the base.
pub fn reconstruct(anim: &EncodedAnimation) -> Vec<Vec<u8>> {
    let mut frames = Vec::with_capacity(anim.frame_count());
    frames.push(anim.base.clone());

    for delta in &anim.deltas {
        let next = apply_delta(&frames[frames.len() - 1], delta);
        frames.push(next);
    }

    frames
}
