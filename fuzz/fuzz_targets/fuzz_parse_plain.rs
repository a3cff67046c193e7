#![no_main]
use libfuzzer_sys::fuzz_target;
use lib_stream::parsing::PlainIndexParser;
use lib_stream::{ByteMedia, MemoryMedia};

// Fuzz the plain index parser over arbitrary container images.
fuzz_target!(|data: &[u8]| {
    // Cap input size to keep table allocations and recursion bounded
    if data.len() > 1 << 16 {
        return;
    }

    let media = MemoryMedia::new("fuzz", data.to_vec());
    if let Ok(entries) = PlainIndexParser::try_read_index(&media, "", 0, media.length()) {
        // Parsed entries must honor the bounds the parser promises
        for entry in &entries {
            assert!(entry.offset + entry.size <= media.length());
        }
    }
});
