use crate::{Config, EncodedAnimation};
use itertools::Itertools;
use snafu::{ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
pub enum SerializeError {
    WriteIo { source: std::io::Error },
}

/// Writes the definition artifact: frame count, base frame, per-frame delta
/// arrays and counts, the pointer/count tables, and the `<name>_expression`
/// aggregate. Pure formatting; correctness is established by round-tripping
/// through the parser.
pub fn write_source<W: Write>(
    anim: &EncodedAnimation,
    name: &str,
    config: &Config,
    mut w: W,
) -> Result<(), SerializeError> {
    macro_rules! w {
        ($($arg:tt)*) => {
            writeln!(w, $($arg)*).context(WriteIoSnafu)
        };
    }

    w!("#include <stdint.h>")?;
    w!()?;
    w!("#include <Arduino.h>")?;
    w!()?;
    w!("#include \"{name}.h\"")?;
    w!()?;
    w!("#define FRAME_COUNT {}", anim.frame_count())?;
    w!()?;

    w!(
        "const uint8_t base_frame[{}] PROGMEM = {{",
        config.bytes_per_frame()
    )?;
    for line in anim.base.chunks(16) {
        w!(
            "  {},",
            line.iter()
                .format_with(", ", |b, f| f(&format_args!("0x{b:02X}")))
        )?;
    }
    w!("}};")?;
    w!()?;

    for (i, delta) in anim.deltas.iter().enumerate() {
        let frame = i + 1;
        w!("const delta_t frame_{frame}_deltas[] PROGMEM = {{")?;
        for entry in delta {
            w!("  {{{}, 0x{:02X}}},", entry.index, entry.value)?;
        }
        w!("}};")?;
        w!()?;
        w!(
            "const uint16_t frame_{frame}_delta_count = {};",
            delta.len()
        )?;
        w!()?;
    }

    w!("const delta_t* delta_frames[] = {{")?;
    w!("  NULL,")?;
    for frame in 1..anim.frame_count() {
        w!("  frame_{frame}_deltas,")?;
    }
    w!("}};")?;
    w!()?;

    w!("const uint16_t delta_counts[] = {{")?;
    w!("  0,")?;
    for frame in 1..anim.frame_count() {
        w!("  frame_{frame}_delta_count,")?;
    }
    w!("}};")?;
    w!()?;

    w!("const delta_anim_t {name}_expression = {{")?;
    w!("  base_frame,")?;
    w!("  delta_frames,")?;
    w!("  delta_counts,")?;
    w!("  FRAME_COUNT,")?;
    w!("}};")?;

    Ok(())
}

/// Writes the declaration artifact: the `delta_t`/`delta_anim_t` typedefs,
/// the frame count, externs for the three arrays, and the `extern` for the
/// animation aggregate.
pub fn write_header<W: Write>(
    anim: &EncodedAnimation,
    name: &str,
    config: &Config,
    mut w: W,
) -> Result<(), SerializeError> {
    macro_rules! w {
        ($($arg:tt)*) => {
            writeln!(w, $($arg)*).context(WriteIoSnafu)
        };
    }

    w!("#pragma once")?;
    w!()?;
    w!("#include <stdint.h>")?;
    w!()?;
    w!("#ifndef DELTA_ANIM_DEFINED")?;
    w!("#define DELTA_ANIM_DEFINED")?;
    w!("typedef struct {{")?;
    w!("  uint16_t index;")?;
    w!("  uint8_t value;")?;
    w!("}} delta_t;")?;
    w!()?;
    w!("typedef struct {{")?;
    w!("  const uint8_t* base_frame;")?;
    w!("  const delta_t* const* deltas;")?;
    w!("  const uint16_t* delta_counts;")?;
    w!("  uint16_t frame_count;")?;
    w!("}} delta_anim_t;")?;
    w!("#endif")?;
    w!()?;
    w!(
        "#define {}_FRAME_COUNT {}",
        name.to_ascii_uppercase(),
        anim.frame_count()
    )?;
    w!()?;
    w!(
        "extern const uint8_t base_frame[{}];",
        config.bytes_per_frame()
    )?;
    w!("extern const delta_t* delta_frames[];")?;
    w!("extern const uint16_t delta_counts[];")?;
    w!("extern const delta_anim_t {name}_expression;")?;

    Ok(())
}

/// Turns a file stem into a valid C identifier for the artifact's symbol
/// names.
pub fn c_identifier(stem: &str) -> String {
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if name.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }

    name
}
