// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! A thin example binary exercising `cineform`'s `Session::encode`/`Session::decode` over raw
//! packed frames read from and written to disk, minus container demuxing (there is no
//! multiplexed file format here, per `spec.md` §1 "container-level multiplexing" being out of
//! scope) and playback.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod ui;

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};

use cineform::{ChannelDelta, CineformError, Layer, Session, SessionConfig};
use cineform_color::{BayerOrientation, PixelFormat};

#[derive(Parser)]
#[command(name = "cineform-cli", version, about = "Encode/decode raw packed frames through the CineForm-rs codec core")]
struct Cli {
    /// Sets the level of verbosity. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encodes a raw packed frame into a CineForm TLV sample.
    Encode {
        /// Path to a raw packed frame, or `-` to read from standard input.
        input: PathBuf,
        /// Path the encoded sample is written to, or `-` for standard output.
        output: PathBuf,
        /// Wire pixel format the input buffer is packed as. See `cineform_color::PixelFormat`.
        #[arg(long)]
        format: PixelFormatArg,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Rows `[display_height, height)` are bottom-edge padding; defaults to `height`.
        #[arg(long)]
        display_height: Option<u32>,
        /// Encodes as a difference frame against the session's most recent keyframe rather than
        /// a keyframe. A session only ever holds one frame's worth of state here, so this is
        /// only useful when combined with a prior `encode` sharing the same process.
        #[arg(long)]
        difference: bool,
        /// Forces Q=1 on every band and relies entirely on the peaks table.
        #[arg(long)]
        lossless: bool,
        /// A raw TLV metadata buffer to install before encoding (`UpdateCFHDDATA`).
        #[arg(long)]
        metadata: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "frame")]
        metadata_layer: LayerArg,
        /// Stereo per-eye channel delta the metadata buffer applies to (0 = common).
        #[arg(long, default_value_t = 0)]
        channel: ChannelDelta,
    },
    /// Decodes a CineForm TLV sample, converting to the requested output pixel format.
    Decode {
        /// Path to an encoded sample, or `-` to read from standard input.
        input: PathBuf,
        /// Path the reconstructed packed frame is written to, or `-` for standard output.
        /// Omit together with `--probe-only` to only print the sample header.
        output: Option<PathBuf>,
        /// Wire pixel format to reconstruct into.
        #[arg(long)]
        format: PixelFormatArg,
        /// Only print the sample header and effective metadata; do not run the inverse
        /// transform or write pixels.
        #[arg(long)]
        probe_only: bool,
        /// A raw TLV metadata buffer to install before decoding (`UpdateCFHDDATA`).
        #[arg(long)]
        metadata: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "override")]
        metadata_layer: LayerArg,
        #[arg(long, default_value_t = 0)]
        channel: ChannelDelta,
        /// Additional directories consulted for GUID-named external metadata layer files
        /// (`BASE`/`DATABASE`/`OVERRIDE`, see `spec.md` §6).
        #[arg(long = "lut-search-path")]
        lut_search_paths: Vec<PathBuf>,
    },
    /// Prints a sample's header fields without decoding any pixels.
    Info {
        /// Path to an encoded sample, or `-` to read from standard input.
        input: PathBuf,
    },
}

/// A thin `FromStr` wrapper so a bare `clap::ValueEnum` derive (which can't carry the `Bayer`
/// variant's `bits`/`orientation` fields) still gets clap's argument parsing and help text.
#[derive(Copy, Clone, Debug)]
struct PixelFormatArg(PixelFormat);

impl FromStr for PixelFormatArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = match s.to_ascii_lowercase().as_str() {
            "yuyv" => PixelFormat::Yuyv,
            "uyvy" => PixelFormat::Uyvy,
            "yu64" => PixelFormat::Yu64,
            "yr16" => PixelFormat::Yr16,
            "v210" => PixelFormat::V210,
            "nv12" => PixelFormat::Nv12,
            "yv12" => PixelFormat::Yv12,
            "rg24" => PixelFormat::Rg24,
            "bgr24" => PixelFormat::Bgr24,
            "rg32" | "rgba" => PixelFormat::Rg32,
            "rg48" => PixelFormat::Rg48,
            "rg64" | "rgba64" => PixelFormat::Rg64,
            "b64a" => PixelFormat::B64a,
            "rg30" | "ab10" => PixelFormat::Rg30,
            "ar10" => PixelFormat::Ar10,
            "r210" => PixelFormat::R210,
            "dpx0" => PixelFormat::Dpx0,
            "r408" => PixelFormat::R408,
            "v408" => PixelFormat::V408,
            "r4fl" => PixelFormat::R4fl,
            bayer if bayer.starts_with("byr") || bayer.starts_with("bayer") => parse_bayer(bayer)?,
            other => return Err(format!("unrecognized pixel format {other:?}")),
        };
        Ok(PixelFormatArg(format))
    }
}

/// Parses `byr1`/`byr2`/`byr3`/`byr4`/`byr5` (the wire tags from `spec.md` §4.6) and the more
/// explicit `bayer:<bits>:<orientation>` form (e.g. `bayer:12:redgrn`).
fn parse_bayer(s: &str) -> Result<PixelFormat, String> {
    if let Some(rest) = s.strip_prefix("bayer:") {
        let mut parts = rest.split(':');
        let bits: u8 = parts
            .next()
            .ok_or_else(|| "expected bayer:<bits>:<orientation>".to_string())?
            .parse()
            .map_err(|_| "bayer bit depth must be an integer".to_string())?;
        let orientation = parse_orientation(parts.next().unwrap_or("redgrn"))?;
        return Ok(PixelFormat::Bayer { bits, orientation });
    }

    let (bits, orientation) = match s {
        "byr1" => (8, BayerOrientation::RedGrn),
        "byr2" => (8, BayerOrientation::GrnRed),
        "byr3" => (12, BayerOrientation::RedGrn),
        "byr4" => (16, BayerOrientation::RedGrn),
        "byr5" => (16, BayerOrientation::GrnRed),
        other => return Err(format!("unrecognized Bayer format tag {other:?}")),
    };
    Ok(PixelFormat::Bayer { bits, orientation })
}

fn parse_orientation(s: &str) -> Result<BayerOrientation, String> {
    match s.to_ascii_lowercase().as_str() {
        "redgrn" | "red_grn" => Ok(BayerOrientation::RedGrn),
        "grnred" | "grn_red" => Ok(BayerOrientation::GrnRed),
        "blugrn" | "blu_grn" => Ok(BayerOrientation::BluGrn),
        "grnblu" | "grn_blu" => Ok(BayerOrientation::GrnBlu),
        other => Err(format!("unrecognized Bayer orientation {other:?}")),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LayerArg {
    Base,
    Frame,
    Frame1,
    Frame2,
    Database,
    Database1,
    Database2,
    Override,
    Override1,
    Override2,
}

impl From<LayerArg> for Layer {
    fn from(arg: LayerArg) -> Layer {
        match arg {
            LayerArg::Base => Layer::Base,
            LayerArg::Frame => Layer::Frame,
            LayerArg::Frame1 => Layer::Frame1,
            LayerArg::Frame2 => Layer::Frame2,
            LayerArg::Database => Layer::Database,
            LayerArg::Database1 => Layer::Database1,
            LayerArg::Database2 => Layer::Database2,
            LayerArg::Override => Layer::Override,
            LayerArg::Override1 => Layer::Override1,
            LayerArg::Override2 => Layer::Override2,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // `pretty_env_logger` honors `RUST_LOG`; fall back to a verbosity derived from `-v` when it
    // is unset.
    if std::env::var_os("RUST_LOG").is_none() {
        let level = match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", format!("cineform={level},cineform_cli={level}"));
    }
    pretty_env_logger::init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
enum CliError {
    Codec(CineformError),
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Codec(err) => write!(f, "{err}"),
            CliError::Io(err) => write!(f, "{err}"),
        }
    }
}

impl From<CineformError> for CliError {
    fn from(err: CineformError) -> Self {
        CliError::Codec(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

fn read_input(path: &std::path::Path) -> Result<Vec<u8>, CliError> {
    use std::io::Read;
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read(path)?)
    }
}

fn write_output(path: &std::path::Path, data: &[u8]) -> Result<(), CliError> {
    use std::io::Write;
    if path.as_os_str() == "-" {
        std::io::stdout().write_all(data)?;
    } else {
        fs::write(path, data)?;
    }
    Ok(())
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Encode { input, output, format, width, height, display_height, difference, lossless, metadata, metadata_layer, channel } => {
            run_encode(input, output, format.0, width, height, display_height, difference, lossless, metadata, metadata_layer.into(), channel)
        }
        Command::Decode { input, output, format, probe_only, metadata, metadata_layer, channel, lut_search_paths } => {
            run_decode(input, output, format.0, probe_only, metadata, metadata_layer.into(), channel, lut_search_paths)
        }
        Command::Info { input } => run_info(input),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_encode(
    input: PathBuf,
    output: PathBuf,
    format: PixelFormat,
    width: u32,
    height: u32,
    display_height: Option<u32>,
    difference: bool,
    lossless: bool,
    metadata: Option<PathBuf>,
    metadata_layer: Layer,
    channel: ChannelDelta,
) -> Result<(), CliError> {
    let data = read_input(&input)?;
    let mut session = Session::new(SessionConfig::new().with_lossless(lossless));

    if let Some(metadata_path) = metadata {
        let buf = read_input(&metadata_path)?;
        session.update_metadata(&buf, channel, metadata_layer)?;
    }

    let mut frame = cineform::Frame::new(format, width, height, display_height.unwrap_or(height), data)?;
    if difference {
        frame = frame.as_difference();
    }

    let sample = session.encode(&frame)?;
    log::info!("encoded {} byte sample from a {width}x{height} frame", sample.len());

    let mut walker = cineform_container::sample::SampleWalker::new(&sample);
    if let Ok(Some(cineform_container::sample::SampleChunk::Header(header))) = walker.next() {
        ui::print_sample_header(&header, sample.len());
    }
    ui::print_stats(&session.stats());

    write_output(&output, &sample)?;
    Ok(())
}

fn run_decode(
    input: PathBuf,
    output: Option<PathBuf>,
    format: PixelFormat,
    probe_only: bool,
    metadata: Option<PathBuf>,
    metadata_layer: Layer,
    channel: ChannelDelta,
    lut_search_paths: Vec<PathBuf>,
) -> Result<(), CliError> {
    let sample = read_input(&input)?;
    let mut session = Session::new(SessionConfig::new());

    if !lut_search_paths.is_empty() {
        session.set_external_layer_search_paths(lut_search_paths);
    }
    if let Some(metadata_path) = metadata {
        let buf = read_input(&metadata_path)?;
        session.update_metadata(&buf, channel, metadata_layer)?;
    }

    print_header_only(&sample)?;

    if probe_only {
        ui::print_metadata(&session.effective_metadata(channel));
        return Ok(());
    }

    let frame = session.decode(&sample, format)?;
    ui::print_metadata(&session.effective_metadata(channel));
    ui::print_stats(&session.stats());

    match output {
        Some(path) => write_output(&path, &frame.data)?,
        None => log::warn!("no output path given; decoded {} bytes were discarded", frame.data.len()),
    }
    Ok(())
}

fn run_info(input: PathBuf) -> Result<(), CliError> {
    let sample = read_input(&input)?;
    print_header_only(&sample)
}

/// Walks just far enough to find and print the sample header chunk, without entropy-decoding or
/// inverse-transforming any band.
fn print_header_only(sample: &[u8]) -> Result<(), CliError> {
    let mut walker = cineform_container::sample::SampleWalker::new(sample);
    match walker.next()? {
        Some(cineform_container::sample::SampleChunk::Header(header)) => {
            ui::print_sample_header(&header, sample.len());
            Ok(())
        }
        _ => Err(CliError::Codec(CineformError::UnsupportedSample("sample does not begin with a header chunk"))),
    }
}
