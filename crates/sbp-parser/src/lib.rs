#![forbid(unsafe_code)]

mod inline_parser;
mod legacy_parser;
mod normalize;
mod step_builder;

use sbp_core::{BlueprintError, BlueprintStep, Grammar};
use serde::Serialize;
use serde_json::json;

pub use inline_parser::parse_inline;
pub use legacy_parser::parse_legacy;
pub use normalize::{compatibility_normalize, resolve_role};

/// Lines with at least this many commas try the legacy grammar first.
pub const LEGACY_COMMA_THRESHOLD: usize = 2;

/// Outcome of parsing one line through the grammar detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineParse {
    pub step: BlueprintStep,
    /// Grammar that produced `step`.
    pub grammar: Grammar,
    /// Why the legacy attempt was abandoned, when the line fell back to the inline grammar.
    pub legacy_error: Option<BlueprintError>,
}

impl LineParse {
    #[must_use]
    pub const fn fell_back(&self) -> bool {
        self.legacy_error.is_some()
    }
}

#[must_use]
pub fn comma_count(line: &str) -> usize {
    line.matches(',').count()
}

/// Grammar the detector tries first for `line`.
#[must_use]
pub fn detect_grammar(line: &str) -> Grammar {
    if comma_count(line) >= LEGACY_COMMA_THRESHOLD {
        Grammar::Legacy
    } else {
        Grammar::Inline
    }
}

/// Parse one line, returning the record plus which grammar produced it.
///
/// Lines that look like legacy triples are tried as such first; any legacy
/// failure falls through to the inline grammar, whose result (or error) wins.
pub fn parse_line_with_detection(line: &str) -> Result<LineParse, BlueprintError> {
    let legacy_error = match detect_grammar(line) {
        Grammar::Legacy => match parse_legacy(line) {
            Ok(step) => {
                return Ok(LineParse {
                    step,
                    grammar: Grammar::Legacy,
                    legacy_error: None,
                });
            }
            Err(err) => Some(err),
        },
        Grammar::Inline => None,
    };

    parse_inline(line).map(|step| LineParse {
        step,
        grammar: Grammar::Inline,
        legacy_error,
    })
}

pub fn parse_line(line: &str) -> Result<BlueprintStep, BlueprintError> {
    parse_line_with_detection(line).map(|parsed| parsed.step)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    pub text: String,
    pub result: Result<LineParse, BlueprintError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DocumentParse {
    pub lines: Vec<DocumentLine>,
}

impl DocumentParse {
    pub fn steps(&self) -> impl Iterator<Item = &BlueprintStep> {
        self.lines
            .iter()
            .filter_map(|line| line.result.as_ref().ok())
            .map(|parsed| &parsed.step)
    }

    pub fn errors(&self) -> impl Iterator<Item = (usize, &BlueprintError)> {
        self.lines
            .iter()
            .filter_map(|line| line.result.as_ref().err().map(|err| (line.line_number, err)))
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.lines.iter().all(|line| line.result.is_ok())
    }

    #[must_use]
    pub fn grammar_count(&self, grammar: Grammar) -> usize {
        self.lines
            .iter()
            .filter(|line| matches!(&line.result, Ok(parsed) if parsed.grammar == grammar))
            .count()
    }
}

/// Parse every non-blank line of `input` independently.
#[must_use]
pub fn parse_document(input: &str) -> DocumentParse {
    let lines = input
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let text = raw.trim();
            (!text.is_empty()).then(|| DocumentLine {
                line_number: index + 1,
                text: text.to_string(),
                result: parse_line_with_detection(text),
            })
        })
        .collect();
    DocumentParse { lines }
}

#[must_use]
pub fn parse_evidence_json(parsed: &DocumentParse) -> String {
    let errors: Vec<String> = parsed
        .errors()
        .map(|(line_number, err)| format!("line {line_number}: {err}"))
        .collect();
    json!({
        "line_count": parsed.lines.len(),
        "step_count": parsed.steps().count(),
        "error_count": errors.len(),
        "segment_count": parsed.steps().map(BlueprintStep::len).sum::<usize>(),
        "edge_count": parsed.steps().map(|step| step.edges.len()).sum::<usize>(),
        "branch_count": parsed.steps().map(BlueprintStep::branch_count).sum::<usize>(),
        "legacy_count": parsed.grammar_count(Grammar::Legacy),
        "inline_count": parsed.grammar_count(Grammar::Inline),
        "errors": errors,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use sbp_core::{BlueprintError, Grammar, Role};

    use super::{
        detect_grammar, parse_document, parse_evidence_json, parse_line,
        parse_line_with_detection, resolve_role,
    };

    #[test]
    fn comma_heavy_lines_prefer_legacy() {
        assert_eq!(detect_grammar("a, b, c"), Grammar::Legacy);
        assert_eq!(detect_grammar("Step:C Pay, then leave"), Grammar::Inline);
        assert_eq!(detect_grammar("Step:C Pay"), Grammar::Inline);
    }

    #[test]
    fn legacy_line_parses_as_legacy() {
        let parsed = parse_line_with_detection("Checkout, Customer>Front>Back, Pay>Process>Confirm")
            .expect("legacy line should parse");
        assert_eq!(parsed.grammar, Grammar::Legacy);
        assert!(!parsed.fell_back());
        assert_eq!(parsed.step.role_codes(), "CFB");
        assert_eq!(parsed.step.edge_pairs(), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn failed_legacy_attempt_falls_back_to_inline() {
        let parsed = parse_line_with_detection("Pay:C Tap card, wait, smile/F Charge")
            .expect("inline fallback should parse");
        assert_eq!(parsed.grammar, Grammar::Inline);
        assert!(matches!(
            parsed.legacy_error,
            Some(BlueprintError::UnsupportedRole { .. })
        ));
        assert_eq!(parsed.step.step, "Pay");
        assert_eq!(parsed.step.actions(), vec!["Tap card, wait, smile", "Charge"]);
    }

    #[test]
    fn inline_error_wins_after_failed_fallback() {
        // Legacy rejects "Server"; the inline retry splits "Pay," off as the step
        // and then rejects the same token as a role prefix.
        let err = parse_line("Pay, Server>Front, x//y").unwrap_err();
        assert_eq!(
            err,
            BlueprintError::InvalidRolePrefix {
                segment: "Server".to_string()
            }
        );
    }

    #[test]
    fn scenario_errors_propagate() {
        let err = parse_line("Step:B Update//P Check").unwrap_err();
        assert!(err.to_string().contains("Double slash"));
    }

    #[test]
    fn document_parse_skips_blank_lines_and_numbers_the_rest() {
        let input = "\nCheckout, C>F, Pay>Charge\n\n  Bad:S nope  \nLook:C Browse/F Greet\n";
        let parsed = parse_document(input);

        assert_eq!(parsed.lines.len(), 3);
        assert_eq!(parsed.lines[0].line_number, 2);
        assert_eq!(parsed.lines[1].line_number, 4);
        assert_eq!(parsed.lines[1].text, "Bad:S nope");
        assert_eq!(parsed.lines[2].line_number, 5);
        assert_eq!(parsed.steps().count(), 2);
        assert!(!parsed.is_clean());

        let errors: Vec<_> = parsed.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, 4);
        assert_eq!(parsed.grammar_count(Grammar::Legacy), 1);
        assert_eq!(parsed.grammar_count(Grammar::Inline), 1);
    }

    #[test]
    fn evidence_json_contains_counts() {
        let parsed = parse_document(
            "Add:C Click/F Add/B Update//P Check/B Reflect\nCheckout, C>F, Pay>Charge\nBroken:C a/",
        );
        let evidence = parse_evidence_json(&parsed);
        assert!(evidence.contains("\"step_count\":2"));
        assert!(evidence.contains("\"error_count\":1"));
        assert!(evidence.contains("\"branch_count\":1"));
        assert!(evidence.contains("\"segment_count\":7"));
        assert!(evidence.contains("\"edge_count\":6"));
        assert!(evidence.contains("line 3:"));
    }

    fn role_letter() -> impl Strategy<Value = char> {
        prop::sample::select(vec!['C', 'F', 'B', 'P', 'c', 'f', 'b', 'p'])
    }

    fn separator() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["/", "|", "//", ">", "→"])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_inline_segments_and_edges_stay_in_bounds(
            segments in prop::collection::vec((role_letter(), "[a-z]{1,8}( [a-z]{1,8})?"), 1..8),
            separators in prop::collection::vec(separator(), 7),
        ) {
            let mut body = String::new();
            for (index, (role, action)) in segments.iter().enumerate() {
                if index > 0 {
                    body.push_str(separators[index - 1]);
                }
                body.push(*role);
                body.push(' ');
                body.push_str(action);
            }
            let line = format!("Step:{body}");

            match parse_line(&line) {
                Ok(step) => {
                    let k = segments.len();
                    prop_assert_eq!(step.roles().len(), k);
                    prop_assert_eq!(step.actions().len(), k);
                    for edge in &step.edges {
                        prop_assert!(edge.from < k && edge.to < k);
                        prop_assert!(edge.from < edge.to);
                    }
                    for index in 0..k - 1 {
                        let expected: Vec<(usize, usize)> = match separators[index] {
                            "|" => vec![],
                            "//" => vec![(index, index + 1), (index, index + 2)],
                            _ => vec![(index, index + 1)],
                        };
                        let actual: Vec<(usize, usize)> =
                            step.outgoing(index).map(|edge| edge.pair()).collect();
                        prop_assert_eq!(actual, expected);
                    }
                }
                Err(err) => {
                    let k = segments.len();
                    prop_assert!(k >= 2 && separators[k - 2] == "//");
                    prop_assert!(matches!(err, BlueprintError::MissingBranchTarget { .. }), "unexpected error {err}");
                }
            }
        }

        #[test]
        fn prop_legacy_lines_are_linear_chains(
            roles in prop::collection::vec(prop::sample::select(vec!["Customer", "front", "BACK", "proc", "C"]), 0..6),
            actions in prop::collection::vec("[A-Za-z]{1,10}", 0..6),
        ) {
            let line = format!("Step, {}, {}", roles.join(">"), actions.join(">"));
            let parsed = parse_line_with_detection(&line).expect("legacy line should parse");
            let n = roles.len().max(actions.len());

            prop_assert_eq!(parsed.grammar, Grammar::Legacy);
            prop_assert_eq!(parsed.step.len(), n);
            let expected: Vec<(usize, usize)> = (1..n).map(|to| (to - 1, to)).collect();
            prop_assert_eq!(parsed.step.edge_pairs(), expected);
        }

        #[test]
        fn prop_role_resolution_is_idempotent(role in prop::sample::select(Role::ALL.to_vec())) {
            let once = resolve_role(&role.code().to_string()).expect("canonical code resolves");
            let twice = resolve_role(&once.code().to_string()).expect("canonical code resolves");
            prop_assert_eq!(once, role);
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn prop_parse_line_is_deterministic(input in ".{0,128}") {
            prop_assert_eq!(parse_line_with_detection(&input), parse_line_with_detection(&input));
        }
    }
}
