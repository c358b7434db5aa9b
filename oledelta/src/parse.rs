use crate::{Config, DeltaEntry, EncodedAnimation};
use snafu::{ensure, OptionExt, Snafu};

#[derive(Debug, Snafu)]
pub enum ParseError {
    #[snafu(display("No FRAME_COUNT marker in artifact"))]
    MissingFrameCount,
    #[snafu(display("FRAME_COUNT is not a positive integer"))]
    MalformedFrameCount,
    #[snafu(display("No base_frame array in artifact"))]
    MissingBaseFrame,
    #[snafu(display("Unterminated array block for `{marker}`"))]
    UnterminatedBlock { marker: String },
    #[snafu(display("base_frame is declared as {declared} bytes, expected {expected}"))]
    BaseFrameLength { declared: String, expected: usize },
    #[snafu(display("base_frame holds {found} byte literals, expected {expected}"))]
    BaseFrameCount { found: usize, expected: usize },
    #[snafu(display("Malformed byte literal `{literal}` in base_frame"))]
    MalformedByte { literal: String },
    #[snafu(display("No frame_{frame}_deltas array in artifact"))]
    MissingDeltaArray { frame: usize },
    #[snafu(display("Malformed delta pair `{{{pair}}}` in frame_{frame}_deltas"))]
    MalformedDelta { frame: usize, pair: String },
    #[snafu(display(
        "Delta index {index} in frame_{frame}_deltas is outside the {expected}-byte frame"
    ))]
    DeltaIndexRange {
        frame: usize,
        index: u16,
        expected: usize,
    },
}

/// Recovers an [`EncodedAnimation`] from a definition artifact.
///
/// The declared frame count decides how many numbered delta arrays must be
/// present; a missing or malformed element fails the whole parse, there is no
/// partial recovery.
pub fn parse(text: &str, config: &Config) -> Result<EncodedAnimation, ParseError> {
    let expected = config.bytes_per_frame();

    let count = frame_count(text)?;
    let base = base_frame(text, expected)?;

    let mut deltas = Vec::with_capacity(count - 1);
    for frame in 1..count {
        deltas.push(delta_array(text, frame, expected)?);
    }

    Ok(EncodedAnimation { base, deltas })
}

fn frame_count(text: &str) -> Result<usize, ParseError> {
    let at = text.find("FRAME_COUNT").context(MissingFrameCountSnafu)?;
    let rest = text[at + "FRAME_COUNT".len()..].trim_start();

    let digits: &str = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];
    let count = digits
        .parse::<usize>()
        .ok()
        .context(MalformedFrameCountSnafu)?;
    ensure!(count >= 1, MalformedFrameCountSnafu);

    Ok(count)
}

/// Returns the text between the `{` following `marker` and the `};` that
/// terminates the array.
fn array_block<'a>(text: &'a str, marker: &str) -> Result<Option<&'a str>, ParseError> {
    let Some(at) = text.find(marker) else {
        return Ok(None);
    };

    let rest = &text[at..];
    let open = rest.find('{').context(UnterminatedBlockSnafu { marker })?;
    let close = rest.find("};").context(UnterminatedBlockSnafu { marker })?;
    ensure!(close > open, UnterminatedBlockSnafu { marker });

    Ok(Some(&rest[open + 1..close]))
}

fn base_frame(text: &str, expected: usize) -> Result<Vec<u8>, ParseError> {
    let marker = "base_frame[";
    let block = array_block(text, marker)?.context(MissingBaseFrameSnafu)?;

    // The declared array length has to match the configured geometry.
    let at = text.find(marker).context(MissingBaseFrameSnafu)? + marker.len();
    let declared = &text[at..at + text[at..].find(']').unwrap_or(0)];
    ensure!(
        declared.parse::<usize>().ok() == Some(expected),
        BaseFrameLengthSnafu { declared, expected }
    );

    let mut bytes = Vec::with_capacity(expected);
    for literal in block
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        bytes.push(hex_byte(literal).context(MalformedByteSnafu { literal })?);
    }

    ensure!(
        bytes.len() == expected,
        BaseFrameCountSnafu {
            found: bytes.len(),
            expected,
        }
    );

    Ok(bytes)
}

fn delta_array(text: &str, frame: usize, expected: usize) -> Result<Vec<DeltaEntry>, ParseError> {
    let marker = format!("frame_{frame}_deltas[");
    let block = array_block(text, &marker)?.context(MissingDeltaArraySnafu { frame })?;

    let mut entries = Vec::new();
    let mut rest = block;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after.find('}').context(MalformedDeltaSnafu {
            frame,
            pair: after.trim(),
        })?;
        let pair = &after[..close];

        entries.push(delta_pair(pair, frame, expected)?);
        rest = &after[close + 1..];
    }

    Ok(entries)
}

fn delta_pair(pair: &str, frame: usize, expected: usize) -> Result<DeltaEntry, ParseError> {
    let malformed = || MalformedDeltaSnafu {
        frame,
        pair: pair.trim(),
    };

    let (index, value) = pair.split_once(',').with_context(malformed)?;
    let index = index.trim().parse::<u16>().ok().with_context(malformed)?;
    let value = hex_byte(value.trim()).with_context(malformed)?;

    ensure!(
        usize::from(index) < expected,
        DeltaIndexRangeSnafu {
            frame,
            index,
            expected,
        }
    );

    Ok(DeltaEntry { index, value })
}

/// Parses a `0xHH` literal: exactly two hex digits, either case.
fn hex_byte(literal: &str) -> Option<u8> {
    let digits = literal.strip_prefix("0x")?;
    if digits.len() != 2 {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}
