//! Recursive-descent opcode interpreter.
//!
//! Runs a grammar table against an input with per-rule syntax callbacks and
//! records the phrases of selected rules into an [`Ast`] for later
//! translation. It executes the structural, literal and look-around
//! operators; UDT, back-reference and look-behind opcodes belong to the full
//! runtime and never occur in the tables run here.

pub(crate) mod ast;

use crate::types::{Opcode, Rule};
use ast::Ast;

/// The point in a rule's evaluation at which its syntax callback fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallbackState {
    /// Before the rule is tried.
    Active,
    /// The rule matched a non-empty phrase.
    Match,
    /// The rule matched the empty string.
    Empty,
    NoMatch,
}

/// Syntax callback: state, the full input, phrase offset, phrase length
/// (0 unless matched), and the caller's data.
pub(crate) type RuleCallback<D> = fn(CallbackState, &[u8], usize, usize, &mut D);

pub(crate) struct Parser<'g, D> {
    rules: &'g [Rule],
    callbacks: Vec<Option<RuleCallback<D>>>,
    recorded: Vec<bool>,
}

#[derive(Debug)]
pub(crate) struct ParseOutcome {
    /// True only when the start rule matched the entire input.
    pub(crate) success: bool,
    pub(crate) matched: Option<usize>,
    pub(crate) ast: Ast,
}

impl<'g, D> Parser<'g, D> {
    pub(crate) fn new(rules: &'g [Rule]) -> Self {
        Self {
            rules,
            callbacks: vec![None; rules.len()],
            recorded: vec![false; rules.len()],
        }
    }

    #[must_use]
    pub(crate) fn callback(mut self, rule: usize, callback: RuleCallback<D>) -> Self {
        self.callbacks[rule] = Some(callback);
        self
    }

    /// Record the phrases matched by `rule` in the AST.
    #[must_use]
    pub(crate) fn record(mut self, rule: usize) -> Self {
        self.recorded[rule] = true;
        self
    }

    pub(crate) fn parse(&self, start: usize, input: &[u8], data: &mut D) -> ParseOutcome {
        let mut execution = Execution {
            rules: self.rules,
            callbacks: &self.callbacks,
            recorded: &self.recorded,
            input,
            data,
            ast: Ast::default(),
        };
        let matched = execution.rnm(start, 0);
        ParseOutcome {
            success: matched == Some(input.len()),
            matched,
            ast: execution.ast,
        }
    }
}

struct Execution<'a, D> {
    rules: &'a [Rule],
    callbacks: &'a [Option<RuleCallback<D>>],
    recorded: &'a [bool],
    input: &'a [u8],
    data: &'a mut D,
    ast: Ast,
}

impl<D> Execution<'_, D> {
    /// Try opcode `op` of rule `rule` at `pos`; returns the matched length.
    fn opcode(&mut self, rule: usize, op: usize, pos: usize) -> Option<usize> {
        let rules = self.rules;
        match &rules[rule].opcodes[op] {
            Opcode::Alt { children } => {
                for &child in children {
                    if let Some(len) = self.opcode(rule, child, pos) {
                        return Some(len);
                    }
                }
                None
            }
            Opcode::Cat { children } => {
                let mark = self.ast.len();
                let mut len = 0;
                for &child in children {
                    match self.opcode(rule, child, pos + len) {
                        Some(n) => len += n,
                        None => {
                            self.ast.truncate(mark);
                            return None;
                        }
                    }
                }
                Some(len)
            }
            Opcode::Rep { min, max } => {
                let mark = self.ast.len();
                let mut count = 0u32;
                let mut len = 0;
                while max.map_or(true, |max| count < max) {
                    match self.opcode(rule, op + 1, pos + len) {
                        None => break,
                        // An empty match can only repeat forever; count it once.
                        Some(0) => {
                            count += 1;
                            break;
                        }
                        Some(n) => {
                            count += 1;
                            len += n;
                        }
                    }
                }
                if count >= *min {
                    Some(len)
                } else {
                    self.ast.truncate(mark);
                    None
                }
            }
            Opcode::Rnm { index } => self.rnm(*index, pos),
            Opcode::And => self.look_ahead(rule, op, pos).map(|_| 0),
            Opcode::Not => match self.look_ahead(rule, op, pos) {
                Some(_) => None,
                None => Some(0),
            },
            Opcode::Abg => (pos == 0).then_some(0),
            Opcode::Aen => (pos == self.input.len()).then_some(0),
            Opcode::Tbs { string } => {
                let phrase = self.input.get(pos..pos + string.len())?;
                let matched = phrase.iter().zip(string).all(|(&b, &c)| u32::from(b) == c);
                matched.then_some(string.len())
            }
            Opcode::Tls { string } => {
                let phrase = self.input.get(pos..pos + string.len())?;
                let matched = phrase
                    .iter()
                    .zip(string)
                    .all(|(&b, &c)| u32::from(b.to_ascii_lowercase()) == c);
                matched.then_some(string.len())
            }
            Opcode::Trg { min, max } => {
                let b = u32::from(*self.input.get(pos)?);
                (*min..=*max).contains(&b).then_some(1)
            }
            other @ (Opcode::Udt { .. } | Opcode::Bkr { .. } | Opcode::Bka | Opcode::Bkn) => {
                unreachable!(
                    "{} opcodes are not executed by the grammar engine",
                    other.mnemonic()
                )
            }
        }
    }

    /// Evaluate the opcode governed by `op` without consuming input or
    /// keeping any AST records it produced.
    fn look_ahead(&mut self, rule: usize, op: usize, pos: usize) -> Option<usize> {
        let mark = self.ast.len();
        let result = self.opcode(rule, op + 1, pos);
        self.ast.truncate(mark);
        result
    }

    fn rnm(&mut self, index: usize, pos: usize) -> Option<usize> {
        let callback = self.callbacks[index];
        if let Some(callback) = callback {
            callback(CallbackState::Active, self.input, pos, 0, self.data);
        }

        let mark = self.ast.len();
        let node = if self.recorded[index] {
            Some(self.ast.down(index, pos))
        } else {
            None
        };

        let result = self.opcode(index, 0, pos);
        match (result, node) {
            (Some(len), Some(node)) => self.ast.up(node, len),
            (Some(_), None) => {}
            (None, _) => self.ast.truncate(mark),
        }

        if let Some(callback) = callback {
            let state = match result {
                Some(0) => CallbackState::Empty,
                Some(_) => CallbackState::Match,
                None => CallbackState::NoMatch,
            };
            callback(state, self.input, pos, result.unwrap_or(0), self.data);
        }
        result
    }
}
