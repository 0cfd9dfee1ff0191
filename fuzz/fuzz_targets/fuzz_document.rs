#![no_main]

use libfuzzer_sys::fuzz_target;
use sbp_parser::{parse_document, parse_evidence_json};
use sbp_render_term::render_lanes;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = parse_document(input);
    let _ = parse_evidence_json(&parsed);
    for step in parsed.steps() {
        let _ = render_lanes(step);
    }
});
