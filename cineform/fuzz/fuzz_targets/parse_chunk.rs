#![no_main]

use cineform_container::chunk::ChunkReader;
use cineform_container::sample::SampleWalker;
use libfuzzer_sys::fuzz_target;

// The container's only parse state is "byte offset into the sample"; this target
// fuzzes the two layers that state lives at in isolation from the rest of the pipeline, cheaper
// per-iteration than driving a full `Session::decode`.
fuzz_target!(|data: &[u8]| {
    let mut reader = ChunkReader::new(data);
    loop {
        match reader.next() {
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(_) => break,
        }
    }

    let mut walker = SampleWalker::new(data);
    loop {
        match walker.next() {
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(_) => break,
        }
    }
});
