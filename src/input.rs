//! Pre-analysis of raw grammar text.
//!
//! Splits the input into a line catalog and validates every character before
//! any grammar parsing happens. The catalog is what turns byte offsets into
//! line numbers for every later diagnostic.

use log::debug;
use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::types::Diagnostic;

/// The line terminator that ended a cataloged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    Crlf,
    Lf,
    Cr,
    /// Only possible on the last line, and always reported as an error.
    None,
}

impl LineEnd {
    #[must_use]
    pub fn len(self) -> usize {
        match self {
            LineEnd::Crlf => 2,
            LineEnd::Lf | LineEnd::Cr => 1,
            LineEnd::None => 0,
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self == LineEnd::None
    }
}

/// One line of the input. `begin` is the byte offset of the first character;
/// `length` covers the text and the line end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub line_no: usize,
    pub begin: usize,
    pub length: usize,
    pub text_length: usize,
    pub end: LineEnd,
}

/// The result of pre-analysis: the input bytes, their line catalog, and any
/// character-level errors found.
#[derive(Debug, Clone)]
pub struct InputAnalysis {
    bytes: Vec<u8>,
    lines: Vec<Line>,
    errors: Vec<Diagnostic>,
}

impl InputAnalysis {
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[must_use]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Line number containing `char_index`. Offsets past the end of the
    /// input resolve to the last line; an input with no lines resolves to 0.
    #[must_use]
    pub fn find_line(&self, char_index: usize) -> usize {
        if self.lines.is_empty() {
            return 0;
        }
        let after = self.lines.partition_point(|line| line.begin <= char_index);
        after.saturating_sub(1).min(self.lines.len() - 1)
    }

    /// Build a diagnostic located at `char_index`.
    pub(crate) fn diagnostic(&self, char_index: usize, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(self.find_line(char_index), char_index, message)
    }

    pub(crate) fn into_errors(self) -> Vec<Diagnostic> {
        self.errors
    }
}

fn line_end(input: &mut &[u8]) -> ModalResult<LineEnd> {
    alt((
        b"\r\n".value(LineEnd::Crlf),
        b"\n".value(LineEnd::Lf),
        b"\r".value(LineEnd::Cr),
    ))
    .parse_next(input)
}

fn line<'i>(input: &mut &'i [u8]) -> ModalResult<(&'i [u8], Option<LineEnd>)> {
    (
        take_while(0.., |b: u8| b != b'\r' && b != b'\n'),
        opt(line_end),
    )
        .parse_next(input)
}

fn is_valid(b: u8) -> bool {
    b == b'\t' || (32..=126).contains(&b)
}

/// Catalog the lines of `input` and validate its characters.
///
/// Valid characters are tab and printable ASCII (32-126). Every other byte
/// is reported. A last line without a line end is cataloged with
/// [`LineEnd::None`] and reported. In `strict` mode only CRLF line ends are
/// accepted.
pub fn analyze(input: impl AsRef<[u8]>, strict: bool) -> InputAnalysis {
    let bytes = input.as_ref();
    let mut lines = Vec::new();
    let mut errors = Vec::new();
    let mut rest = bytes;

    while !rest.is_empty() {
        let begin = bytes.len() - rest.len();
        let Ok((text, end)) = line.parse_next(&mut rest) else {
            break;
        };
        let line_no = lines.len();
        let end = end.unwrap_or(LineEnd::None);

        for (offset, &b) in text.iter().enumerate() {
            if !is_valid(b) {
                errors.push(Diagnostic::new(
                    line_no,
                    begin + offset,
                    format!("invalid character found 'x{b:02x}'"),
                ));
            }
        }

        let end_at = begin + text.len();
        match end {
            LineEnd::Lf if strict => errors.push(Diagnostic::new(
                line_no,
                end_at,
                "line end character is new line only (\\n, x0A) - strict ABNF specified",
            )),
            LineEnd::Cr if strict => errors.push(Diagnostic::new(
                line_no,
                end_at,
                "line end character is carriage return only (\\r, x0D) - strict ABNF specified",
            )),
            LineEnd::None => errors.push(Diagnostic::new(
                line_no,
                end_at,
                "last line has no line end characters",
            )),
            _ => {}
        }

        lines.push(Line {
            line_no,
            begin,
            length: text.len() + end.len(),
            text_length: text.len(),
            end,
        });
    }

    debug!(
        "input analysis: {} bytes, {} lines, {} errors",
        bytes.len(),
        lines.len(),
        errors.len()
    );

    InputAnalysis {
        bytes: bytes.to_vec(),
        lines,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_mixed_line_ends() {
        let analysis = analyze("a\r\nbc\nd\r", false);
        assert!(!analysis.has_errors());
        let ends: Vec<_> = analysis.lines().iter().map(|l| l.end).collect();
        assert_eq!(ends, vec![LineEnd::Crlf, LineEnd::Lf, LineEnd::Cr]);
        let begins: Vec<_> = analysis.lines().iter().map(|l| l.begin).collect();
        assert_eq!(begins, vec![0, 3, 6]);
        assert_eq!(analysis.lines()[1].text_length, 2);
        assert_eq!(analysis.lines()[1].length, 3);
    }

    #[test]
    fn blank_lines_are_cataloged() {
        let analysis = analyze("\n\n", false);
        assert_eq!(analysis.lines().len(), 2);
        assert!(analysis.lines().iter().all(|l| l.text_length == 0));
    }

    #[test]
    fn empty_input_has_no_lines() {
        let analysis = analyze("", false);
        assert!(analysis.lines().is_empty());
        assert!(!analysis.has_errors());
        assert_eq!(analysis.find_line(10), 0);
    }

    #[test]
    fn invalid_character_is_located() {
        let analysis = analyze(b"ab\n c\x7f\n".as_slice(), false);
        assert_eq!(analysis.errors().len(), 1);
        let err = &analysis.errors()[0];
        assert_eq!(err.line, 1);
        assert_eq!(err.char_index, 5);
        assert_eq!(err.message, "invalid character found 'x7f'");
    }

    #[test]
    fn tab_is_valid() {
        assert!(!analyze("a\tb\n", false).has_errors());
    }

    #[test]
    fn missing_last_line_end_is_reported() {
        let analysis = analyze("a = b\nc = d", false);
        assert_eq!(analysis.lines().len(), 2);
        assert_eq!(analysis.lines()[1].end, LineEnd::None);
        assert_eq!(analysis.errors().len(), 1);
        assert_eq!(analysis.errors()[0].line, 1);
        assert_eq!(analysis.errors()[0].char_index, 11);
    }

    #[test]
    fn strict_mode_accepts_only_crlf() {
        assert!(!analyze("a\r\n", true).has_errors());
        let analysis = analyze("a\nb\rc\r\n", true);
        assert_eq!(analysis.errors().len(), 2);
        assert!(analysis.errors()[0].message.contains("new line only"));
        assert!(analysis.errors()[1].message.contains("carriage return only"));
    }

    #[test]
    fn find_line_resolution() {
        let analysis = analyze("ab\ncd\nef\n", false);
        assert_eq!(analysis.find_line(0), 0);
        assert_eq!(analysis.find_line(2), 0);
        assert_eq!(analysis.find_line(3), 1);
        assert_eq!(analysis.find_line(8), 2);
        assert_eq!(analysis.find_line(1000), 2);
    }
}
