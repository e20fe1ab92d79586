use log::debug;

use crate::analysis;
use crate::input;
use crate::parse;
use crate::reduce::reduce;
use crate::{CompileError, Grammar};

/// Run every stage over `source`, stopping at the first stage that reports
/// errors.
pub(crate) fn compile(source: String, strict: bool) -> Result<Grammar, CompileError> {
    let input = input::analyze(&source, strict);
    if input.has_errors() {
        return Err(CompileError::InvalidInput {
            errors: input.into_errors(),
        });
    }

    let syntax = parse::syntax(&input, strict);
    if syntax.has_errors() {
        return Err(CompileError::Syntax {
            errors: syntax.into_errors(),
        });
    }

    let (rules, udts, errors) = parse::semantic(&input, &syntax).into_parts();
    if !errors.is_empty() {
        return Err(CompileError::Semantic { errors });
    }

    let rules = reduce(rules);
    let analysis = analysis::analyze(&rules);
    let errors = analysis.errors(&rules);
    if !errors.is_empty() {
        return Err(CompileError::Attributes { errors });
    }

    debug!(
        "compiled grammar: {} rules, {} udts",
        rules.len(),
        udts.len()
    );
    Ok(Grammar {
        rules,
        udts,
        analysis,
        source,
    })
}
