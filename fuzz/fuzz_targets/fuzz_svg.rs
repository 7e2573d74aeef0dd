#![no_main]

use fastprobe::formats::svg;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut doc = b"<svg ".to_vec();
    doc.extend_from_slice(data);
    let _ = svg::parse(data);
    let _ = svg::parse(&doc);
});
