#![no_main]

use libfuzzer_sys::fuzz_target;
use stark_engine::proof::Proof;

// `Proof::from_bytes` is the one parser in this crate that has to survive
// arbitrary, adversarial byte input directly: every other entry point
// (`StarkProof::from_bytes`) builds on it but still requires knowing the
// query/column counts out of band. Never panic, only ever return `Err`.
fuzz_target!(|data: &[u8]| {
    let _ = Proof::from_bytes(data);
});
