use std::fmt;

/// A located message produced while compiling a grammar.
///
/// `line` is the zero-based line number and `char_index` the zero-based
/// byte offset into the full grammar input. The line is resolved through
/// the input line catalog, so it is always a valid line of the input (or 0
/// for an input with no lines).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub char_index: usize,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(line: usize, char_index: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            char_index,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: char {}: {}",
            self.line, self.char_index, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let d = Diagnostic::new(2, 17, "Rule name 'x' used but not defined.");
        assert_eq!(
            d.to_string(),
            "line 2: char 17: Rule name 'x' used but not defined."
        );
    }
}
