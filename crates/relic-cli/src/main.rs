/// relic command-line tool: decode, validate and checksum files in legacy
/// transport encodings (RLE90, BinHex4).
///
/// # Command overview
///
/// ```text
/// relic <COMMAND> [OPTIONS]
///
/// Commands:
///   decode     Decode an RLE90 or BinHex4 file
///   validate   Check that a file decodes cleanly
///   crc        Compute a parametrized CRC over a file
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Raise log verbosity (-v info, -vv debug, -vvv trace)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                   |
/// |------|-------------------------------------------|
/// | 0    | Success                                   |
/// | 1    | Error (I/O failure, corrupt input, etc.)  |
///
/// Decoded data goes to stdout; logs and errors go to stderr.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use relic_decoder::{DecoderConfig, Format, Rle90Dialect};
use tracing_subscriber::EnvFilter;

mod cmd_crc;
mod cmd_decode;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Decoders for legacy transport encodings.
#[derive(Parser)]
#[command(name = "relic", version, about = "RLE90 / BinHex4 decoder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise log verbosity; repeat for more detail.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Decode a file and write the decoded bytes.
    Decode(DecodeArgs),
    /// Check that a file decodes cleanly and report its decoded size.
    Validate(ValidateArgs),
    /// Compute a CRC over a file.
    Crc(CrcArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Format selection shared by `decode` and `validate`.
///
/// ```text
/// ┌───────────┬─────────────────────────────────────────────────────────┐
/// │ Flag      │ Values / default                                        │
/// ├───────────┼─────────────────────────────────────────────────────────┤
/// │ --format  │ rle90 (default) | binhex4                               │
/// │ --dialect │ non-buffering (default) | buffering   (RLE90 only)      │
/// └───────────┴─────────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct FormatArgs {
    /// Input encoding: `rle90` or `binhex4`.
    #[arg(short, long, default_value = "rle90")]
    pub format: Format,

    /// RLE90 escaped-marker dialect: `non-buffering` or `buffering`.
    #[arg(long, default_value = "non-buffering")]
    pub dialect: Rle90Dialect,
}

impl FormatArgs {
    pub fn config(&self) -> DecoderConfig {
        DecoderConfig::new(self.format).with_dialect(self.dialect)
    }
}

/// Arguments for `relic decode`.
///
/// Streams the input through the incremental decoder, `--chunk-size`
/// bytes per read, and writes the decoded bytes to stdout or `-o`.
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Encoded input file.
    pub file: PathBuf,

    #[command(flatten)]
    pub format: FormatArgs,

    /// Bytes requested per read from the decoder.
    #[arg(long, default_value_t = 4096)]
    pub chunk_size: usize,

    /// Write decoded output to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `relic validate`.
///
/// Decodes the whole file twice (in one block and one byte at a time) and
/// reports success only if both succeed with identical output.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Encoded input file.
    pub file: PathBuf,

    #[command(flatten)]
    pub format: FormatArgs,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `relic crc`.
///
/// Starts from `--preset` (default `arc`); any explicit parameter flag
/// overrides the corresponding preset value.
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────────────┐
/// │ Flag          │ Meaning                                              │
/// ├───────────────┼──────────────────────────────────────────────────────┤
/// │ --preset      │ arc | xmodem | crc32                                 │
/// │ --width       │ register width in bits (1-64)                        │
/// │ --poly        │ polynomial, hex (0x1021) or decimal                  │
/// │ --init        │ initial register value                               │
/// │ --xor-out     │ final XOR value                                      │
/// │ --reflect-in  │ true | false                                         │
/// │ --reflect-out │ true | false                                         │
/// └───────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct CrcArgs {
    /// File to checksum.
    pub file: PathBuf,

    /// Named parameter set.
    #[arg(long, default_value = "arc")]
    pub preset: String,

    #[arg(long)]
    pub width: Option<u8>,

    #[arg(long)]
    pub poly: Option<String>,

    #[arg(long)]
    pub init: Option<String>,

    #[arg(long)]
    pub xor_out: Option<String>,

    #[arg(long)]
    pub reflect_in: Option<bool>,

    #[arg(long)]
    pub reflect_out: Option<bool>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Crc(args) => cmd_crc::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
