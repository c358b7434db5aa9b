use oledelta::{
    delta::{apply_delta, compute_delta, encode_frames, reconstruct, EncodeError},
    parse::{parse, ParseError},
    ser, Config, EncodedAnimation,
};

fn config() -> Config {
    Config::default()
}

fn serialize(anim: &EncodedAnimation, name: &str, config: &Config) -> String {
    let mut buf = Vec::new();
    ser::write_source(anim, name, config, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

/// Deterministic frame sequence with sparse frame-to-frame changes, plus one
/// duplicated frame to cover the empty-delta case.
fn test_frames(config: &Config) -> Vec<Vec<u8>> {
    let len = config.bytes_per_frame();
    let mut state = 0x2545_F491u32;
    let mut rand = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };

    let mut frame = vec![0u8; len];
    for byte in frame.iter_mut() {
        *byte = rand() as u8;
    }

    let mut frames = vec![frame];
    for _ in 0..8 {
        let mut next = frames[frames.len() - 1].clone();
        for _ in 0..rand() % 40 {
            let index = rand() as usize % len;
            next[index] = rand() as u8;
        }
        frames.push(next);
    }

    // identical consecutive pair
    frames.push(frames[frames.len() - 1].clone());

    frames
}

#[test]
fn roundtrip_identity() {
    let config = config();
    let frames = test_frames(&config);

    let anim = encode_frames(&frames, &config).unwrap();
    let text = serialize(&anim, "testanim", &config);

    let parsed = parse(&text, &config).unwrap();
    assert_eq!(anim, parsed);
    assert_eq!(reconstruct(&parsed), frames);
}

#[test]
fn parse_is_idempotent() {
    let config = config();
    let frames = test_frames(&config);
    let text = serialize(&encode_frames(&frames, &config).unwrap(), "anim", &config);

    let first = parse(&text, &config).unwrap();
    let second = parse(&text, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(reconstruct(&first), reconstruct(&second));
}

#[test]
fn delta_covers_exactly_the_differing_bytes() {
    let config = config();
    let frames = test_frames(&config);

    for pair in frames.windows(2) {
        let delta = compute_delta(&pair[0], &pair[1]);

        let differing = pair[0]
            .iter()
            .zip(&pair[1])
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(delta.len(), differing);

        // ascending, unique indices
        for entries in delta.windows(2) {
            assert!(entries[0].index < entries[1].index);
        }

        assert_eq!(apply_delta(&pair[0], &delta), pair[1]);
    }
}

#[test]
fn identical_frames_give_an_empty_delta() {
    let frame = vec![0xA5u8; 1024];
    assert!(compute_delta(&frame, &frame).is_empty());
    assert_eq!(apply_delta(&frame, &[]), frame);
}

#[test]
fn apply_delta_leaves_prev_untouched() {
    let prev = vec![0u8; 1024];
    let mut curr = prev.clone();
    curr[17] = 0x42;

    let delta = compute_delta(&prev, &curr);
    let next = apply_delta(&prev, &delta);

    assert_eq!(prev, vec![0u8; 1024]);
    assert_eq!(next, curr);
}

#[test]
fn single_changed_byte_scenario() {
    let config = config();
    let base = vec![0u8; 1024];
    let mut second = base.clone();
    second[5] = 0x80;

    let anim = encode_frames(&[base.clone(), second.clone()], &config).unwrap();
    assert_eq!(anim.frame_count(), 2);
    assert_eq!(anim.deltas[0].len(), 1);
    assert_eq!(usize::from(anim.deltas[0][0].index), 5);
    assert_eq!(anim.deltas[0][0].value, 0x80);

    let text = serialize(&anim, "blink", &config);
    assert!(text.contains("#define FRAME_COUNT 2"));
    assert!(text.contains("const uint8_t base_frame[1024] PROGMEM = {"));
    assert!(text.contains("  {5, 0x80},"));
    assert!(text.contains("const uint16_t frame_1_delta_count = 1;"));
    assert!(text.contains("const delta_anim_t blink_expression = {"));

    let frames = reconstruct(&parse(&text, &config).unwrap());
    assert_eq!(frames, vec![base, second]);
}

#[test]
fn serializer_emits_uppercase_two_digit_hex() {
    let config = config();
    let mut base = vec![0u8; 1024];
    base[0] = 0xAB;
    base[1] = 0x05;

    let text = serialize(
        &encode_frames(&[base], &config).unwrap(),
        "anim",
        &config,
    );
    assert!(text.contains("  0xAB, 0x05, 0x00"));
}

#[test]
fn missing_frame_count_fails() {
    let config = config();
    let text = serialize(
        &encode_frames(&test_frames(&config), &config).unwrap(),
        "anim",
        &config,
    )
    .replace("FRAME_COUNT", "N_FRAMES");

    assert!(matches!(
        parse(&text, &config),
        Err(ParseError::MissingFrameCount)
    ));
}

#[test]
fn missing_delta_array_fails() {
    let config = config();
    let text = serialize(
        &encode_frames(&test_frames(&config), &config).unwrap(),
        "anim",
        &config,
    )
    .replace("frame_2_deltas[]", "frame_2_removed[]");

    assert!(matches!(
        parse(&text, &config),
        Err(ParseError::MissingDeltaArray { frame: 2 })
    ));
}

#[test]
fn missing_base_frame_fails() {
    let config = config();
    let text = serialize(
        &encode_frames(&test_frames(&config), &config).unwrap(),
        "anim",
        &config,
    )
    .replace("base_frame[1024]", "base_frame_data");

    assert!(matches!(
        parse(&text, &config),
        Err(ParseError::MissingBaseFrame)
    ));
}

#[test]
fn wrong_base_frame_declared_length_fails() {
    let config = config();
    let text = serialize(
        &encode_frames(&test_frames(&config), &config).unwrap(),
        "anim",
        &config,
    )
    .replace("base_frame[1024]", "base_frame[512]");

    assert!(matches!(
        parse(&text, &config),
        Err(ParseError::BaseFrameLength { .. })
    ));
}

#[test]
fn truncated_base_frame_fails() {
    let config = config();
    let base = vec![0u8; 1024];
    let text = serialize(&encode_frames(&[base], &config).unwrap(), "anim", &config)
        .replacen("0x00, ", "", 1);

    assert!(matches!(
        parse(&text, &config),
        Err(ParseError::BaseFrameCount {
            found: 1023,
            expected: 1024,
        })
    ));
}

#[test]
fn malformed_delta_pair_fails() {
    let config = config();
    let base = vec![0u8; 1024];
    let mut second = base.clone();
    second[5] = 0x80;

    let text = serialize(
        &encode_frames(&[base, second], &config).unwrap(),
        "anim",
        &config,
    );

    let decimal_value = text.replace("{5, 0x80}", "{5, 128}");
    assert!(matches!(
        parse(&decimal_value, &config),
        Err(ParseError::MalformedDelta { frame: 1, .. })
    ));

    let out_of_range = text.replace("{5, 0x80}", "{5000, 0x80}");
    assert!(matches!(
        parse(&out_of_range, &config),
        Err(ParseError::DeltaIndexRange {
            frame: 1,
            index: 5000,
            expected: 1024,
        })
    ));
}

#[test]
fn lowercase_hex_is_accepted() {
    let config = config();
    let base = vec![0u8; 1024];
    let mut second = base.clone();
    second[5] = 0xAB;

    let text = serialize(
        &encode_frames(&[base, second], &config).unwrap(),
        "anim",
        &config,
    )
    .replace("0xAB", "0xab");

    let parsed = parse(&text, &config).unwrap();
    assert_eq!(parsed.deltas[0][0].value, 0xAB);
}

#[test]
fn encode_rejects_bad_input() {
    let config = config();

    assert!(matches!(
        encode_frames(&[], &config),
        Err(EncodeError::NoFrames)
    ));

    assert!(matches!(
        encode_frames(&[vec![0u8; 1000]], &config),
        Err(EncodeError::FrameLength {
            frame: 0,
            len: 1000,
            expected: 1024,
        })
    ));
}

#[test]
fn header_declares_the_aggregate() {
    let config = config();
    let base = vec![0u8; 1024];
    let anim = encode_frames(&[base.clone(), base], &config).unwrap();

    let mut buf = Vec::new();
    ser::write_header(&anim, "smile", &config, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.contains("} delta_t;"));
    assert!(text.contains("} delta_anim_t;"));
    assert!(text.contains("#define SMILE_FRAME_COUNT 2"));
    assert!(text.contains("extern const uint8_t base_frame[1024];"));
    assert!(text.contains("extern const delta_t* delta_frames[];"));
    assert!(text.contains("extern const uint16_t delta_counts[];"));
    assert!(text.contains("extern const delta_anim_t smile_expression;"));
}

#[test]
fn c_identifier_sanitizes_stems() {
    assert_eq!(ser::c_identifier("my-anim 2"), "my_anim_2");
    assert_eq!(ser::c_identifier("2cool"), "_2cool");
    assert_eq!(ser::c_identifier("smile"), "smile");
}
