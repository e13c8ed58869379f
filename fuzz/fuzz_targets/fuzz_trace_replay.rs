#![no_main]

use holdpick_harness::{Trace, replay};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(trace) = Trace::parse(text) else {
        return;
    };
    // An invalid header config is the only expected replay failure.
    let Ok(report) = replay(&trace) else {
        return;
    };
    let again = replay(&trace).expect("second replay");
    assert_eq!(report.checksum, again.checksum, "replay not deterministic");
    assert!(report.steps == trace.steps.len());
});
