//! The grammar-text front end.
//!
//! [`syntax`] parses the pre-analyzed input with the bootstrap SABNF grammar,
//! reporting structural faults and recording a parse tree. [`semantic`]
//! translates that tree into rules and opcode tables.

mod bootstrap;
mod semantic;
mod syntax;

use log::debug;

use crate::engine::ast::Ast;
use crate::engine::Parser;
use crate::input::InputAnalysis;
use crate::types::{Diagnostic, Rule, Udt};

/// Result of the syntax phase.
#[derive(Debug)]
pub struct SyntaxOutput {
    errors: Vec<Diagnostic>,
    rule_count: usize,
    ast: Ast,
}

impl SyntaxOutput {
    #[must_use]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of rule definitions (including `=/` lines) recognized.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub(crate) fn into_errors(self) -> Vec<Diagnostic> {
        self.errors
    }
}

/// Result of the semantic phase: the untranslated-name-free rule list and
/// UDT list, plus any semantic errors.
///
/// On error the rules are a best-effort partial result and must not be fed
/// to later stages.
#[derive(Debug)]
pub struct SemanticOutput {
    rules: Vec<Rule>,
    udts: Vec<Udt>,
    errors: Vec<Diagnostic>,
}

impl SemanticOutput {
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn udts(&self) -> &[Udt] {
        &self.udts
    }

    #[must_use]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<Rule>, Vec<Udt>, Vec<Diagnostic>) {
        (self.rules, self.udts, self.errors)
    }
}

/// Run the syntax phase over pre-analyzed grammar input.
///
/// In `strict` mode every SABNF extension and case-sensitive string is
/// reported as an error.
pub fn syntax(input: &InputAnalysis, strict: bool) -> SyntaxOutput {
    let mut parser = syntax::register(Parser::new(bootstrap::rules()));
    for (rule, callback) in semantic::callbacks().iter().enumerate() {
        if callback.is_some() {
            parser = parser.record(rule);
        }
    }

    let mut context = syntax::SyntaxContext::new(strict);
    let outcome = parser.parse(bootstrap::FILE, input.bytes(), &mut context);
    let rule_count = context.rule_count();
    let mut errors: Vec<Diagnostic> = context
        .into_errors()
        .into_iter()
        .map(|(at, message)| input.diagnostic(at, message))
        .collect();
    if !outcome.success {
        let at = outcome.matched.unwrap_or(0);
        errors.push(input.diagnostic(at, "syntax analysis of input grammar failed"));
    }

    debug!(
        "syntax: {} rule definitions, {} errors",
        rule_count,
        errors.len()
    );
    SyntaxOutput {
        errors,
        rule_count,
        ast: outcome.ast,
    }
}

/// Translate a syntactically valid grammar into rules and UDTs.
///
/// Rule and back-reference names are resolved case-insensitively once the
/// whole input has been translated, so rules may be used before they are
/// defined.
pub fn semantic(input: &InputAnalysis, syntax: &SyntaxOutput) -> SemanticOutput {
    if syntax.has_errors() {
        return SemanticOutput {
            rules: Vec::new(),
            udts: Vec::new(),
            errors: vec![Diagnostic::new(
                0,
                0,
                "cannot do semantic analysis until syntax analysis has completed without errors",
            )],
        };
    }

    let mut translator = semantic::Translator::default();
    syntax
        .ast
        .translate(input.bytes(), &semantic::callbacks(), &mut translator);
    let (rules, udts, errors) = translator.finish();
    let errors: Vec<Diagnostic> = errors
        .into_iter()
        .map(|(at, message)| input.diagnostic(at, message))
        .collect();

    debug!(
        "semantic: {} rules, {} udts, {} opcodes, {} errors",
        rules.len(),
        udts.len(),
        rules.iter().map(|r| r.opcodes.len()).sum::<usize>(),
        errors.len()
    );
    SemanticOutput {
        rules,
        udts,
        errors,
    }
}
