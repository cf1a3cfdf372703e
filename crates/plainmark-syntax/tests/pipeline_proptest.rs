//! Property-based tests for the whole pipeline.
//!
//! The compiler must be total: any input, however malformed, produces HTML
//! without panicking, and the lexer never drops or duplicates a byte.

use plainmark_syntax::{compile, compile_with_diagnostics, tokenize};
use proptest::prelude::*;

/// Lines built from the characters that drive block and inline parsing.
fn markup_strategy() -> impl Strategy<Value = String> {
    let line = r"[ \t]{0,4}(#{1,8} |> |- |\* |1\. |```|~~~|---)?[a-z *_`\[\]()\\!<&]{0,30}";
    prop::collection::vec(line, 0..20).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn lexer_is_lossless(input in any::<String>()) {
        let rebuilt: String = tokenize(&input).iter().map(|t| t.text).collect();
        prop_assert_eq!(rebuilt, input);
    }

    #[test]
    fn token_offsets_match_lexemes(input in markup_strategy()) {
        for token in tokenize(&input) {
            prop_assert_eq!(&input[token.offset..token.end()], token.text);
        }
    }

    #[test]
    fn compile_never_panics(input in any::<String>()) {
        let _html = compile(&input);
    }

    #[test]
    fn compile_markup_never_panics(input in markup_strategy()) {
        let (html, degradations) = compile_with_diagnostics(&input);
        prop_assert_eq!(html, compile(&input));
        for degradation in degradations {
            prop_assert!(degradation.offset() <= input.len());
        }
    }

    #[test]
    fn output_never_contains_raw_angle_brackets_from_text(input in "[a-z][a-z <>&]{0,40}") {
        let html = compile(&input);
        let stripped = html
            .trim_start_matches("<p>")
            .trim_end_matches("</p>");
        prop_assert!(!stripped.contains('<'));
        prop_assert!(!stripped.contains('>'));
    }
}
