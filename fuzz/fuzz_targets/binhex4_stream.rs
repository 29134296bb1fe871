#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use relic_decoder::{decode_binhex4, BinHex4Decoder, DecodingStream};

#[derive(Debug, Arbitrary)]
struct Input {
    chunks: Vec<u8>,
    data: Vec<u8>,
}

// Fuzz target: BinHex4 incremental decoder against the batch decoder.
//
// Same contract as `rle90_stream`: identical output for any read schedule
// when the batch decode succeeds, and an error somewhere when it fails.
// Catches bugs in:
// - Bit accumulator carry across reads
// - Line-break skipping at chunk boundaries
// - End-marker handling and residual-bit discard
fuzz_target!(|input: Input| {
    let expected = decode_binhex4(&input.data);

    let mut decoder = match BinHex4Decoder::new(&input.data[..]) {
        Ok(decoder) => decoder,
        Err(_) => {
            assert!(expected.is_err(), "constructor failed where batch succeeded");
            return;
        }
    };

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
