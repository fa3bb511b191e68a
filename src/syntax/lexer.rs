//! Shell-style word splitting for a single logical line.
//!
//! Quoting follows POSIX shell rules closely enough for test scripts:
//! single quotes are literal, a backslash escapes the next character both
//! inside double quotes and outside any quotes, and a `#` at the start of a
//! word comments out the rest of the line.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::fmt;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct WordParser;

/// A line that could not be split into words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Byte offset into the line where splitting stopped.
    pub offset: usize,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unterminated quote or trailing escape at column {}",
            self.offset + 1
        )
    }
}

impl std::error::Error for LexError {}

/// Splits `line` into words.
pub fn split(line: &str) -> Result<Vec<String>, LexError> {
    let mut pairs = WordParser::parse(Rule::line, line).map_err(|e| LexError {
        offset: match e.location {
            pest::error::InputLocation::Pos(p) => p,
            pest::error::InputLocation::Span((start, _)) => start,
        },
    })?;

    let Some(line) = pairs.next() else {
        return Ok(Vec::new());
    };

    Ok(line
        .into_inner()
        .filter(|p| p.as_rule() == Rule::word)
        .map(build_word)
        .collect())
}

fn build_word(pair: Pair<Rule>) -> String {
    let mut word = String::new();
    for piece in pair.into_inner() {
        match piece.as_rule() {
            Rule::bare => word.push_str(piece.as_str()),
            Rule::escaped => word.push_str(&piece.as_str()[1..]),
            Rule::single_quoted => {
                for inner in piece.into_inner() {
                    word.push_str(inner.as_str());
                }
            }
            Rule::double_quoted => {
                for inner in piece.into_inner() {
                    match inner.as_rule() {
                        Rule::double_escape => word.push_str(&inner.as_str()[1..]),
                        _ => word.push_str(inner.as_str()),
                    }
                }
            }
            _ => {}
        }
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        split(line).unwrap()
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(words("mkfile -t both a b"), ["mkfile", "-t", "both", "a", "b"]);
    }

    #[test]
    fn test_extra_blanks() {
        assert_eq!(words("  sync \t  "), ["sync"]);
        assert!(words("   ").is_empty());
    }

    #[test]
    fn test_double_quotes_keep_spaces() {
        assert_eq!(words(r#"rm lhs="a b c""#), ["rm", "lhs=a b c"]);
    }

    #[test]
    fn test_single_quotes_are_literal() {
        assert_eq!(words(r#"x 'a \" $LHS'"#), ["x", r#"a \" $LHS"#]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(words(r"x a\ b"), ["x", "a b"]);
        assert_eq!(words(r#"x "q\"q" "\n""#), ["x", "q\"q", "n"]);
    }

    #[test]
    fn test_trailing_comment() {
        assert_eq!(words("mkfile a # make one file"), ["mkfile", "a"]);
        assert_eq!(words("sync #"), ["sync"]);
        assert_eq!(words("x\t#tab"), ["x"]);
    }

    #[test]
    fn test_hash_inside_word_is_literal() {
        assert_eq!(words("mkfile a#b"), ["mkfile", "a#b"]);
        assert_eq!(words(r##"mkfile "#q" \#e"##), ["mkfile", "#q", "#e"]);
    }

    #[test]
    fn test_adjacent_pieces_join() {
        assert_eq!(words(r#"x a"b c"'d'"#), ["x", "ab cd"]);
    }

    #[test]
    fn test_empty_quoted_word() {
        assert_eq!(words(r#"x """#), ["x", ""]);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = split(r#"x "abc"#).unwrap_err();
        assert!(err.offset >= 2);
        assert!(split("x 'abc").is_err());
        assert!(split(r"x abc\").is_err());
    }
}
