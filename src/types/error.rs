use std::fmt;

use thiserror::Error;

use super::diagnostic::Diagnostic;

/// Why a grammar failed to compile, grouped by the stage that rejected it.
///
/// Every variant carries the full list of problems found by that stage;
/// later stages never run once an earlier stage has reported errors.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid grammar input:{}", list(errors))]
    InvalidInput { errors: Vec<Diagnostic> },

    #[error("grammar syntax errors:{}", list(errors))]
    Syntax { errors: Vec<Diagnostic> },

    #[error("grammar semantic errors:{}", list(errors))]
    Semantic { errors: Vec<Diagnostic> },

    #[error("grammar attribute errors:{}", list(errors))]
    Attributes { errors: Vec<AttributeError> },
}

impl CompileError {
    /// The located diagnostics of a text-level failure. Empty for
    /// [`CompileError::Attributes`], whose errors name rules instead.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::InvalidInput { errors }
            | CompileError::Syntax { errors }
            | CompileError::Semantic { errors } => errors,
            CompileError::Attributes { .. } => &[],
        }
    }
}

fn list<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(|item| format!("\n  {item}")).collect()
}

/// The three attribute faults that make a rule unusable by a
/// recursive-descent parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeErrorKind {
    LeftRecursive,
    Infinite,
    Cyclic,
}

impl fmt::Display for AttributeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeErrorKind::LeftRecursive => "left recursive",
            AttributeErrorKind::Infinite => "infinite",
            AttributeErrorKind::Cyclic => "cyclic",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule '{rule}' is {kind}")]
pub struct AttributeError {
    pub rule: String,
    pub index: usize,
    pub kind: AttributeErrorKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_message_lists_every_diagnostic() {
        let err = CompileError::Syntax {
            errors: vec![
                Diagnostic::new(0, 4, "Group \"(...)\" opened but not closed."),
                Diagnostic::new(1, 12, "Unrecognized SABNF element."),
            ],
        };
        assert_eq!(
            err.to_string(),
            "grammar syntax errors:\n  line 0: char 4: Group \"(...)\" opened but not closed.\n  line 1: char 12: Unrecognized SABNF element."
        );
        assert_eq!(err.diagnostics().len(), 2);
    }

    #[test]
    fn attribute_error_message() {
        let err = AttributeError {
            rule: "S".into(),
            index: 0,
            kind: AttributeErrorKind::LeftRecursive,
        };
        assert_eq!(err.to_string(), "rule 'S' is left recursive");
    }

    #[test]
    fn attributes_variant_lists_rules() {
        let err = CompileError::Attributes {
            errors: vec![
                AttributeError {
                    rule: "S".into(),
                    index: 0,
                    kind: AttributeErrorKind::Infinite,
                },
                AttributeError {
                    rule: "S".into(),
                    index: 0,
                    kind: AttributeErrorKind::Cyclic,
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "grammar attribute errors:\n  rule 'S' is infinite\n  rule 'S' is cyclic"
        );
        assert!(err.diagnostics().is_empty());
    }
}
