#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use relic_decoder::{decode_rle90, DecodingStream, Rle90Decoder, Rle90Dialect};

#[derive(Debug, Arbitrary)]
struct Input {
    buffering: bool,
    /// Read sizes, cycled; zero entries exercise the empty-read path.
    chunks: Vec<u8>,
    data: Vec<u8>,
}

// Fuzz target: RLE90 incremental decoder against the batch decoder.
//
// The incremental decoder is driven with an arbitrary schedule of read
// sizes. Whatever the schedule:
// - if the batch decode succeeds, the concatenated reads equal its output
// - if the batch decode fails, some read fails too
// Catches bugs in backlog draining and run splitting across reads.
fuzz_target!(|input: Input| {
    let dialect = if input.buffering {
        Rle90Dialect::Buffering
    } else {
        Rle90Dialect::NonBuffering
    };
    let expected = decode_rle90(&input.data, dialect);

    let mut decoder = Rle90Decoder::new(&input.data[..], dialect);
    // Every pass over the schedule makes progress once it has a nonzero entry.
    let chunks = if input.chunks.iter().all(|&c| c == 0) {
        vec![64]
    } else {
        input.chunks
    };
    let mut buf = [0u8; 256];
    let mut out = Vec::new();
    let mut result = Ok(());

    for &chunk in chunks.iter().cycle() {
        let count = usize::from(chunk);
        match decoder.read(&mut buf, 0, count) {
            Ok(0) if count > 0 => break,
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    match expected {
        Ok(expected) => {
            assert!(result.is_ok(), "stream failed where batch succeeded");
            assert_eq!(out, expected);
        }
        Err(_) => assert!(result.is_err(), "stream succeeded where batch failed"),
    }
});
