//! Test file parser.
//!
//! Turns the text of a test file into an ordered list of [`ParsedCommand`]s.
//! Parsing is all-or-nothing: the first malformed line aborts the whole file
//! with an error located by file name and 1-based line number.

use super::lexer;
use super::ParsedCommand;
use crate::errors::{HarnessError, Result, SourceFile};
use crate::registry::CommandRegistry;
use miette::{NamedSource, SourceSpan};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Reads and parses the test file at `path`.
pub fn parse_test_file(path: &Path, registry: &CommandRegistry) -> Result<Vec<ParsedCommand>> {
    let source = std::fs::read_to_string(path).map_err(|e| HarnessError::Read {
        file: path.to_path_buf(),
        source: e,
    })?;
    parse_source(&path.display().to_string(), &source, registry)
}

/// Parses test file text; `name` is only used for diagnostics.
pub fn parse_source(
    name: &str,
    source: &str,
    registry: &CommandRegistry,
) -> Result<Vec<ParsedCommand>> {
    let src: SourceFile = Arc::new(NamedSource::new(name, source.to_string()));
    let mut cmds = Vec::with_capacity(4);

    for logical in LogicalLines::new(source) {
        let logical = logical.map_err(|pending| HarnessError::Malformed {
            file: name.to_string(),
            line: pending.line,
            message: "unterminated line continuation at end of file".to_string(),
            src: src.clone(),
            span: pending.span(),
        })?;

        let args = lexer::split(&logical.text).map_err(|e| HarnessError::Tokenize {
            file: name.to_string(),
            line: logical.line,
            message: e.to_string(),
            src: src.clone(),
            span: logical.span(),
        })?;

        let Some(verb) = args.first() else {
            return Err(HarnessError::Malformed {
                file: name.to_string(),
                line: logical.line,
                message: "empty command".to_string(),
                src: src.clone(),
                span: logical.span(),
            });
        };

        let command = registry
            .lookup(verb)
            .ok_or_else(|| HarnessError::UnknownCommand {
                file: name.to_string(),
                line: logical.line,
                verb: verb.clone(),
                src: src.clone(),
                span: logical.span(),
            })?;

        cmds.push(ParsedCommand {
            command,
            args,
            line: logical.line,
        });
    }

    Ok(cmds)
}

// ============================================================================
// LOGICAL LINES
// ============================================================================

/// One command line after comment stripping and continuation joining.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogicalLine {
    text: String,
    /// Physical line number (1-based) on which the logical line ends.
    line: usize,
    /// Byte range of the physical lines that make it up.
    start: usize,
    end: usize,
}

impl LogicalLine {
    fn span(&self) -> SourceSpan {
        (self.start, self.end - self.start).into()
    }
}

/// Iterator over the logical lines of a test file.
///
/// Blank lines and `#` comments are dropped before joining, so a comment in
/// the middle of a continued command does not end it. A continuation still
/// pending at end of input is yielded as `Err`.
struct LogicalLines<'a> {
    physical: std::iter::Enumerate<std::str::SplitInclusive<'a, char>>,
    offset: usize,
    pending: Option<LogicalLine>,
}

impl<'a> LogicalLines<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            physical: source.split_inclusive('\n').enumerate(),
            offset: 0,
            pending: None,
        }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = std::result::Result<LogicalLine, LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, raw) in self.physical.by_ref() {
            let start = self.offset;
            self.offset += raw.len();
            let end = start + raw.trim_end_matches(['\n', '\r']).len();

            let part = raw.trim();
            if part.is_empty() || part.starts_with('#') {
                continue;
            }

            let pending = self.pending.get_or_insert_with(|| LogicalLine {
                text: String::new(),
                line: idx + 1,
                start,
                end,
            });
            pending.line = idx + 1;
            pending.end = end;

            if let Some(head) = part.strip_suffix('\\') {
                pending.text.push_str(head);
                continue;
            }

            pending.text.push_str(part);
            return self.pending.take().map(Ok);
        }

        self.pending.take().map(Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<(String, usize)> {
        LogicalLines::new(src)
            .map(|l| {
                let l = l.unwrap();
                (l.text, l.line)
            })
            .collect()
    }

    fn l(text: &str, line: usize) -> (String, usize) {
        (text.to_string(), line)
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let src = "# header\n\n   \nsync\n  # indented comment\ntouch\n";
        assert_eq!(lines(src), vec![l("sync", 4), l("touch", 6)]);
    }

    #[test]
    fn test_continuation_joins_lines() {
        let src = "mkfile a \\\n   b \\\nc\nsync";
        assert_eq!(lines(src), vec![l("mkfile a b c", 3), l("sync", 4)]);
    }

    #[test]
    fn test_continuation_has_no_implicit_blank() {
        assert_eq!(lines("a\\\nb\n"), vec![l("ab", 2)]);
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(lines("sync\r\ntouch\r\n"), vec![l("sync", 1), l("touch", 2)]);
    }

    #[test]
    fn test_dangling_continuation() {
        let mut it = LogicalLines::new("sync\nmkfile a \\\n");
        assert!(it.next().unwrap().is_ok());
        let pending = it.next().unwrap().unwrap_err();
        assert_eq!(pending.line, 2);
        assert!(it.next().is_none());
    }

    #[test]
    fn test_span_covers_continued_lines() {
        let src = "sync\nmkfile \\\n a\n";
        let all: Vec<_> = LogicalLines::new(src).map(|l| l.unwrap()).collect();
        assert_eq!(&src[all[1].start..all[1].end], "mkfile \\\n a");
    }
}
