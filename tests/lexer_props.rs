//! Property tests for the lexer

use pigeon::{Lexer, Token};
use proptest::prelude::*;

fn rebuild(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.lexeme.as_str()).collect()
}

fn word() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,5}"
}

/// A bare word or a parenthesized group of words
fn item() -> impl Strategy<Value = String> {
    prop_oneof![
        word(),
        prop::collection::vec(word(), 1..4).prop_map(|words| format!("({})", words.join(" "))),
    ]
}

/// Lines of items, each indented by zero to two levels
fn lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        (0usize..3, prop::collection::vec(item(), 1..5))
            .prop_map(|(depth, items)| format!("{}{}\n", "    ".repeat(depth), items.join(" "))),
        1..6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn lexer_never_panics(source in "[ -~\n\t]{0,200}") {
        let _ = Lexer::new(&source, None).tokenize();
    }

    #[test]
    fn tab_is_rejected_where_it_appears(
        prefix in "[a-z]{1,8}( [a-z]{1,8}){0,3}",
        suffix in "[ -~]{0,20}",
    ) {
        let source = format!("{}\t{}", prefix, suffix);
        let err = Lexer::new(&source, None).tokenize().unwrap_err();
        prop_assert_eq!(err.message(), "tab character");
        let location = err.location().unwrap();
        prop_assert_eq!(location.line, 1);
        prop_assert_eq!(location.column, prefix.len() + 1);
    }

    #[test]
    fn words_keep_their_text(words in prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..6)) {
        let source = format!("({})\n", words.join(" "));
        let tokens = Lexer::new(&source, None).tokenize().unwrap();
        let texts: Vec<String> = tokens
            .iter()
            .filter(|t| t.lexeme.chars().all(|c| c.is_ascii_alphanumeric()) && !t.lexeme.is_empty())
            .map(|t| t.lexeme.clone())
            .collect();
        prop_assert_eq!(texts, words);
    }

    #[test]
    fn lexemes_rebuild_the_source(lines in lines()) {
        let source = lines.concat();
        let tokens = Lexer::new(&source, None).tokenize().unwrap();
        prop_assert_eq!(rebuild(&tokens), source);
    }

    #[test]
    fn comments_and_blank_lines_drop_out(lines in lines(), note in "[a-z ]{0,12}") {
        let source = lines.concat();
        let noisy: String = lines
            .iter()
            .map(|line| format!("{}\n// {}\n\n", line, note))
            .collect();
        let tokens = Lexer::new(&noisy, None).tokenize().unwrap();
        prop_assert_eq!(rebuild(&tokens), source);
    }
}
