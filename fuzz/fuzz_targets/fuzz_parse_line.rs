#![no_main]

use libfuzzer_sys::fuzz_target;
use sbp_core::Grammar;
use sbp_parser::{detect_grammar, parse_line_with_detection};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let first_choice = detect_grammar(line);
    if let Ok(parsed) = parse_line_with_detection(line) {
        let count = parsed.step.len();
        assert_eq!(parsed.step.roles().len(), parsed.step.actions().len());
        for edge in &parsed.step.edges {
            assert!(edge.from < count && edge.to < count);
            assert!(edge.from < edge.to);
        }
        if parsed.grammar == Grammar::Legacy {
            assert_eq!(first_choice, Grammar::Legacy);
        }
        if parsed.fell_back() {
            assert_eq!(parsed.grammar, Grammar::Inline);
        }
    }
});
