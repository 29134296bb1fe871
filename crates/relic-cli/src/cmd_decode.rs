/// Implementation of `relic decode`.
///
/// Opens the input through [`DecoderConfig::open`](relic_decoder::DecoderConfig::open)
/// and pulls `--chunk-size` bytes per read until the decoder reports end
/// of stream. The output is written to stdout or to `-o <file>`.
///
/// Decoding is streamed: memory use is bounded by the chunk size plus the
/// decoder's backlog, independent of file size.
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

use anyhow::{Context, Result, bail};
use relic_decoder::DecodingStream;
use tracing::info;

use crate::DecodeArgs;

/// Run the `relic decode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened, the data is corrupt,
/// or the output cannot be written. Bytes decoded before a corruption
/// error have already been written when the error is reported.
pub fn run(args: &DecodeArgs) -> Result<()> {
    if args.chunk_size == 0 {
        bail!("--chunk-size must be at least 1");
    }

    let config = args.format.config();
    let file =
        File::open(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let mut stream = config.open(BufReader::new(file)).with_context(|| {
        format!(
            "failed to open {} as {}",
            args.file.display(),
            config.format
        )
    })?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot write {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let mut buf = vec![0u8; args.chunk_size];
    let mut total: u64 = 0;
    loop {
        let n = stream
            .read(&mut buf, 0, args.chunk_size)
            .with_context(|| {
                format!(
                    "failed to decode {} after {total} bytes",
                    args.file.display()
                )
            })?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).context("cannot write decoded output")?;
        total += n as u64;
    }
    out.flush().context("cannot write decoded output")?;
    stream.close();

    info!(bytes = total, format = %config.format, "decoded {}", args.file.display());
    Ok(())
}
