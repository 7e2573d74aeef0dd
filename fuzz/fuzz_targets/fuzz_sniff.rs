#![no_main]

use fastprobe::{ParseOutcome, sniff};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match sniff(data) {
        ParseOutcome::Matched(meta) => assert!(meta.width > 0 && meta.height > 0),
        ParseOutcome::NeedMoreBytes(n) => assert!(n > 0),
        ParseOutcome::NotThisFormat => {}
    }

    // A verdict on a prefix must hold for the whole input.
    let half = &data[..data.len() / 2];
    match sniff(half) {
        ParseOutcome::Matched(meta) => assert_eq!(sniff(data), ParseOutcome::Matched(meta)),
        ParseOutcome::NotThisFormat => assert_eq!(sniff(data), ParseOutcome::NotThisFormat),
        ParseOutcome::NeedMoreBytes(_) => {}
    }
});
