use argh::FromArgs;
use image::{codecs::gif::GifDecoder, imageops::FilterType, AnimationDecoder, DynamicImage};
use oledelta::{delta, emit, extract, parse, ser, Config};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Converts an animated GIF into delta-encoded C arrays for a 128x64 OLED
/// panel, or reconstructs a GIF from such an artifact.
#[derive(FromArgs)]
struct Cli {
    /// frames per second for reconstructed GIFs
    #[argh(option, default = "10")]
    fps: u32,

    /// binarization threshold on a 0-255 scale
    #[argh(option, default = "140")]
    threshold: u8,

    /// an animation (.gif/.mp4) to encode, or a generated source artifact to
    /// decode
    #[argh(positional)]
    input: String,

    /// output base name when encoding, output GIF path when decoding
    #[argh(positional)]
    output: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        fps,
        threshold,
        input,
        output,
    } = argh::from_env();

    let config = Config {
        fps,
        threshold,
        ..Config::default()
    };

    if input.ends_with(".gif") || input.ends_with(".mp4") {
        encode(&input, output.as_deref(), &config)
    } else if let Some(output) = output {
        decode(&input, &output, &config)
    } else {
        eprintln!("Usage: oledelta <anim.gif|anim.mp4> [out_base]");
        eprintln!("       oledelta <artifact.cpp> <out.gif>");
        std::process::exit(2);
    }
}

fn encode(
    input: &str,
    out_base: Option<&str>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = GifDecoder::new(BufReader::new(File::open(input)?))?;
    let frames = decoder.into_frames().collect_frames()?;

    println!("Encoding {} frames from `{input}`", frames.len());

    let mut bitmaps = Vec::with_capacity(frames.len());
    for frame in frames {
        let image = DynamicImage::ImageRgba8(frame.into_buffer()).resize_exact(
            config.width,
            config.height,
            FilterType::Nearest,
        );
        bitmaps.push(extract::extract_bitmap(&image, config)?);
    }

    let anim = delta::encode_frames(&bitmaps, config)?;

    let out_base = match out_base {
        Some(base) => base.to_string(),
        None => Path::new(input)
            .with_extension("")
            .to_string_lossy()
            .into_owned(),
    };
    let name = ser::c_identifier(
        &Path::new(&out_base)
            .file_name()
            .ok_or("output base name is empty")?
            .to_string_lossy(),
    );

    let header_path = format!("{out_base}.h");
    ser::write_header(&anim, &name, config, BufWriter::new(File::create(&header_path)?))?;

    let source_path = format!("{out_base}.cpp");
    ser::write_source(
        &anim,
        &name,
        config,
        BufWriter::new(File::create(&source_path)?),
    )?;

    println!(
        "Written {} frames to `{header_path}` and `{source_path}`",
        anim.frame_count()
    );

    Ok(())
}

fn decode(input: &str, output: &str, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(input)?;

    println!("Decoding `{input}`");

    let anim = parse::parse(&text, config)?;
    let frames = delta::reconstruct(&anim);

    emit::write_gif(&frames, config, BufWriter::new(File::create(output)?))?;

    println!("Written {} frames to `{output}`", frames.len());

    Ok(())
}
