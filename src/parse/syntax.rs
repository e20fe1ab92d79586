//! Syntax-phase callbacks.
//!
//! These run while the bootstrap grammar parses the input. The bootstrap
//! grammar accepts a superset of valid SABNF through its `*Error` rules, so
//! most faults show up here as a successful match of an error rule, reported
//! at the offset of the construct that went wrong.

use super::bootstrap::{
    ABG_OP, AEN_OP, AND_OP, BASIC_ELEMENT_ERROR, BKA_OP, BKN_OP, BKR_OP, CLS_CLOSE, CLS_OPEN,
    CLS_STRING, DEFINED_AS_ERROR, FILE, GROUP, GROUP_CLOSE, LINE_END_ERROR, NOT_OP, OPTION,
    OPTION_CLOSE, PROS_VAL_CLOSE, PROS_VAL_OPEN, PROS_VAL_STRING, RULE, RULE_ERROR,
    RULE_NAME_ERROR, STRING_TAB, TLS_CLOSE, TLS_OPEN, TLS_STRING, UDT_OP,
};
use crate::engine::{CallbackState, Parser};

/// Delimiter state for one nesting level: the rule body, or one open group
/// or option.
#[derive(Debug, Default)]
struct Frame {
    /// Offset of the `(` or `[` that opened this level.
    open: usize,
    tls_open: usize,
    cls_open: usize,
    prose_open: usize,
    /// An unclosed string was already reported at this level; the element
    /// error that follows it is the same fault.
    basic_error: bool,
}

/// Mutable state threaded through the syntax callbacks.
#[derive(Debug)]
pub(crate) struct SyntaxContext {
    strict: bool,
    rule_count: usize,
    frames: Vec<Frame>,
    string_tab: Option<usize>,
    errors: Vec<(usize, String)>,
}

impl SyntaxContext {
    pub(crate) fn new(strict: bool) -> Self {
        Self {
            strict,
            rule_count: 0,
            frames: Vec::new(),
            string_tab: None,
            errors: Vec::new(),
        }
    }

    pub(crate) fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Errors as `(offset, message)` pairs, in the order found.
    pub(crate) fn into_errors(self) -> Vec<(usize, String)> {
        self.errors
    }

    /// Record a fault once. A branch that fails and is re-parsed by a later
    /// alternative fires the same callbacks again at the same offsets.
    fn error(&mut self, at: usize, message: impl Into<String>) {
        let message = message.into();
        if !self
            .errors
            .iter()
            .any(|(seen_at, seen)| *seen_at == at && *seen == message)
        {
            self.errors.push((at, message));
        }
    }

    fn strict_error(&mut self, at: usize, message: &str) {
        if self.strict {
            self.error(at, message);
        }
    }

    fn top(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::default());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn push_frame(&mut self, open: usize) {
        self.frames.push(Frame {
            open,
            ..Frame::default()
        });
    }

    fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }
}

/// Attach every syntax callback to `parser`.
pub(super) fn register(parser: Parser<'_, SyntaxContext>) -> Parser<'_, SyntaxContext> {
    parser
        .callback(FILE, file)
        .callback(RULE, rule)
        .callback(RULE_ERROR, rule_error)
        .callback(RULE_NAME_ERROR, rule_name_error)
        .callback(DEFINED_AS_ERROR, defined_as_error)
        .callback(AND_OP, and_op)
        .callback(NOT_OP, not_op)
        .callback(BKA_OP, bka_op)
        .callback(BKN_OP, bkn_op)
        .callback(ABG_OP, abg_op)
        .callback(AEN_OP, aen_op)
        .callback(BKR_OP, bkr_op)
        .callback(UDT_OP, udt_op)
        .callback(TLS_OPEN, tls_open)
        .callback(TLS_STRING, quoted_string)
        .callback(TLS_CLOSE, tls_close)
        .callback(CLS_OPEN, cls_open)
        .callback(CLS_STRING, quoted_string)
        .callback(CLS_CLOSE, cls_close)
        .callback(PROS_VAL_OPEN, prose_open)
        .callback(PROS_VAL_STRING, prose_string)
        .callback(PROS_VAL_CLOSE, prose_close)
        .callback(STRING_TAB, string_tab)
        .callback(GROUP, nesting)
        .callback(OPTION, nesting)
        .callback(GROUP_CLOSE, group_close)
        .callback(OPTION_CLOSE, option_close)
        .callback(BASIC_ELEMENT_ERROR, basic_element_error)
        .callback(LINE_END_ERROR, line_end_error)
}

fn file(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    match state {
        CallbackState::Active => {
            ctx.rule_count = 0;
            ctx.frames.clear();
            ctx.string_tab = None;
        }
        CallbackState::Empty => ctx.error(index, "grammar file is empty"),
        CallbackState::Match => {
            if ctx.rule_count == 0 {
                ctx.error(index, "no rules defined");
            }
        }
        CallbackState::NoMatch => unreachable!("the file rule cannot fail to match"),
    }
}

fn rule(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    match state {
        CallbackState::Active => {
            ctx.frames.clear();
            ctx.push_frame(index);
        }
        CallbackState::Match => ctx.rule_count += 1,
        CallbackState::Empty | CallbackState::NoMatch => {}
    }
}

fn rule_error(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.error(
            index,
            "Unrecognized SABNF line. Invalid rule, comment or blank line.",
        );
    }
}

fn rule_name_error(
    state: CallbackState,
    _: &[u8],
    index: usize,
    _: usize,
    ctx: &mut SyntaxContext,
) {
    if state == CallbackState::Match {
        ctx.error(
            index,
            "Rule names must be alphanum and begin with alphabetic character.",
        );
    }
}

fn defined_as_error(
    state: CallbackState,
    _: &[u8],
    index: usize,
    _: usize,
    ctx: &mut SyntaxContext,
) {
    if state == CallbackState::Match {
        ctx.error(index, "Expected '=' or '=/'. Not found.");
    }
}

fn and_op(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.strict_error(index, "AND operator(&) found - strict ABNF specified.");
    }
}

fn not_op(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.strict_error(index, "NOT operator(!) found - strict ABNF specified.");
    }
}

fn bka_op(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.strict_error(
            index,
            "Positive look-behind operator(&&) found - strict ABNF specified.",
        );
    }
}

fn bkn_op(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.strict_error(
            index,
            "Negative look-behind operator(!!) found - strict ABNF specified.",
        );
    }
}

fn abg_op(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.strict_error(
            index,
            "Beginning of string anchor(%^) found - strict ABNF specified.",
        );
    }
}

fn aen_op(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.strict_error(
            index,
            "End of string anchor(%$) found - strict ABNF specified.",
        );
    }
}

fn bkr_op(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.strict_error(
            index,
            "Back reference operator(\\name) found - strict ABNF specified.",
        );
    }
}

fn udt_op(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.strict_error(index, "UDT operator(u_name) found - strict ABNF specified.");
    }
}

fn tls_open(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.top().tls_open = index;
    }
}

fn cls_open(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.top().cls_open = index;
    }
}

fn prose_open(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.top().prose_open = index;
    }
}

fn string_tab(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::Match {
        ctx.string_tab = Some(index);
    }
}

fn quoted_string(
    state: CallbackState,
    _: &[u8],
    _: usize,
    _: usize,
    ctx: &mut SyntaxContext,
) {
    match state {
        CallbackState::Active => ctx.string_tab = None,
        CallbackState::Match => {
            if let Some(tab) = ctx.string_tab {
                ctx.error(
                    tab,
                    "Tab character (\\t, x09) not allowed in literal string (see 'quoted-string' definition, RFC 7405.)",
                );
            }
        }
        CallbackState::Empty | CallbackState::NoMatch => {}
    }
}

fn prose_string(
    state: CallbackState,
    _: &[u8],
    _: usize,
    _: usize,
    ctx: &mut SyntaxContext,
) {
    match state {
        CallbackState::Active => ctx.string_tab = None,
        CallbackState::Match => {
            if let Some(tab) = ctx.string_tab {
                ctx.error(
                    tab,
                    "Tab character (\\t, x09) not allowed in prose value string.",
                );
            }
        }
        CallbackState::Empty | CallbackState::NoMatch => {}
    }
}

fn tls_close(state: CallbackState, _: &[u8], _: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::NoMatch {
        let frame = ctx.top();
        frame.basic_error = true;
        let at = frame.tls_open;
        ctx.error(
            at,
            "Case-insensitive literal string(\"...\") opened but not closed.",
        );
    }
}

fn cls_close(state: CallbackState, _: &[u8], _: usize, _: usize, ctx: &mut SyntaxContext) {
    match state {
        CallbackState::NoMatch => {
            let frame = ctx.top();
            frame.basic_error = true;
            let at = frame.cls_open;
            ctx.error(
                at,
                "Case-sensitive literal string('...') opened but not closed.",
            );
        }
        CallbackState::Match => {
            let at = ctx.top().cls_open;
            ctx.strict_error(
                at,
                "Case-sensitive string operator('...') found - strict ABNF specified.",
            );
        }
        CallbackState::Active | CallbackState::Empty => {}
    }
}

fn prose_close(state: CallbackState, _: &[u8], _: usize, _: usize, ctx: &mut SyntaxContext) {
    match state {
        CallbackState::NoMatch => {
            let frame = ctx.top();
            frame.basic_error = true;
            let at = frame.prose_open;
            ctx.error(at, "Prose value operator(<...>) opened but not closed.");
        }
        CallbackState::Match => {
            let at = ctx.top().prose_open;
            ctx.error(
                at,
                "Prose value operator(<...>) found. The ABNF syntax is valid, but a parser cannot be generated from this grammar.",
            );
        }
        CallbackState::Active | CallbackState::Empty => {}
    }
}

/// Groups and options each get their own frame for as long as they are
/// being parsed, matched or not.
fn nesting(state: CallbackState, _: &[u8], index: usize, _: usize, ctx: &mut SyntaxContext) {
    match state {
        CallbackState::Active => ctx.push_frame(index),
        CallbackState::Match | CallbackState::Empty | CallbackState::NoMatch => ctx.pop_frame(),
    }
}

fn group_close(state: CallbackState, _: &[u8], _: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::NoMatch {
        let at = ctx.top().open;
        ctx.error(at, "Group \"(...)\" opened but not closed.");
    }
}

fn option_close(state: CallbackState, _: &[u8], _: usize, _: usize, ctx: &mut SyntaxContext) {
    if state == CallbackState::NoMatch {
        let at = ctx.top().open;
        ctx.error(at, "Option \"[...]\" opened but not closed.");
    }
}

fn basic_element_error(
    state: CallbackState,
    _: &[u8],
    index: usize,
    _: usize,
    ctx: &mut SyntaxContext,
) {
    if state == CallbackState::Match {
        let frame = ctx.top();
        if frame.basic_error {
            frame.basic_error = false;
        } else {
            ctx.error(index, "Unrecognized SABNF element.");
        }
    }
}

fn line_end_error(
    state: CallbackState,
    _: &[u8],
    index: usize,
    _: usize,
    ctx: &mut SyntaxContext,
) {
    if state == CallbackState::Match {
        ctx.error(index, "Unrecognized grammar element or characters.");
    }
}
