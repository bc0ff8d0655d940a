//! Post-pass over the raw token stream.
//!
//! - indentation followed by newline (a blank line) is dropped
//! - successive newlines collapse into one
//! - trailing spaces before a newline are dropped
//! - newline, indentation, comma becomes a single space (line continuation)
//!
//! A comma anywhere else is an error.

use super::token::{Token, TokenType};
use crate::error::{PigeonError, PigeonResult};

pub fn filter_tokens(raw: Vec<Token>) -> PigeonResult<Vec<Token>> {
    let mut out: Vec<Token> = Vec::with_capacity(raw.len());
    let mut absorb_space = false;

    for token in raw {
        match token.token_type {
            TokenType::Newline => {
                absorb_space = false;
                while matches!(
                    out.last().map(|t| t.token_type),
                    Some(TokenType::Indentation) | Some(TokenType::Space)
                ) {
                    out.pop();
                }
                match out.last() {
                    None => {}
                    Some(last) if last.token_type == TokenType::Newline => {}
                    Some(_) => out.push(token),
                }
            }
            TokenType::Comma => {
                let n = out.len();
                let continuation = n >= 2
                    && out[n - 1].token_type == TokenType::Indentation
                    && out[n - 2].token_type == TokenType::Newline;
                if !continuation {
                    return Err(PigeonError::syntax_error(
                        "unexpected comma",
                        token.location,
                    ));
                }
                out.truncate(n - 2);
                out.push(Token::new(TokenType::Space, " ".to_string(), token.location));
                absorb_space = true;
            }
            TokenType::Space if absorb_space => {
                absorb_space = false;
            }
            _ => {
                absorb_space = false;
                out.push(token);
            }
        }
    }

    if let Some(last) = out.last() {
        if last.token_type != TokenType::Newline {
            let location = last.location.clone();
            out.push(Token::new(TokenType::Newline, "\n".to_string(), location));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn lex(source: &str) -> PigeonResult<Vec<Token>> {
        Lexer::new(source, None).tokenize()
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenType> {
        tokens.iter().map(|t| t.token_type).collect()
    }

    fn rebuild(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.lexeme.as_str()).collect()
    }

    #[test]
    fn test_blank_lines_collapse() {
        let tokens = lex("a\n\n    \n\nb\n").unwrap();
        assert_eq!(rebuild(&tokens), "a\nb\n");
    }

    #[test]
    fn test_trailing_spaces_dropped() {
        let tokens = lex("a   \nb").unwrap();
        assert_eq!(rebuild(&tokens), "a\nb\n");
    }

    #[test]
    fn test_leading_blank_lines_dropped() {
        let tokens = lex("\n\n// header\nfunc main\n").unwrap();
        assert_eq!(rebuild(&tokens), "func main\n");
    }

    #[test]
    fn test_comma_continuation() {
        let source = "    as m (M<Str I> \"a\" 1\n        , \"b\" 2)\n";
        let tokens = lex(source).unwrap();
        assert_eq!(rebuild(&tokens), "    as m (M<Str I> \"a\" 1 \"b\" 2)\n");
        assert!(!kinds(&tokens).contains(&TokenType::Comma));
    }

    #[test]
    fn test_stray_comma_rejected() {
        let err = lex("(f a, b)").unwrap_err();
        assert_eq!(err.message(), "unexpected comma");
        assert_eq!(err.location().unwrap().column, 5);

        let err = lex("x\n, y").unwrap_err();
        assert_eq!(err.message(), "unexpected comma");
    }

    #[test]
    fn test_round_trip_without_comments() {
        let source = "func main\n    locals xs L<I>\n    (push xs 1)\n    (println (len xs))\n";
        let tokens = lex(source).unwrap();
        assert_eq!(rebuild(&tokens), source);
    }

    #[test]
    fn test_empty_input() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex("\n\n   \n").unwrap().is_empty());
    }
}
