//! Semantic-phase translation: walks the recorded parse tree and builds the
//! opcode table for every rule, then resolves rule and back-reference names.

use std::borrow::Cow;
use std::collections::HashMap;

use super::bootstrap::{
    ABG_OP, AEN_OP, ALTERNATION, AND_OP, BKA_OP, BKN_OP, BKR_CI, BKR_CS, BKR_NAME, BKR_OP, BMAX,
    BMIN, B_STRING, CLS_OP, CONCATENATION, DEFINED, DMAX, DMIN, D_STRING, FILE, INC_ALT, NOT_OP,
    OPTION_OPEN, REPETITION, REP_MAX, REP_MIN, REP_MIN_MAX, REP_OP, RNM_OP, RULE, RULE_COUNT,
    RULE_LOOKUP, RULE_NAME, TBS_OP, TLS_OP, TRG_OP, UDT_EMPTY, UDT_NON_EMPTY, XMAX, XMIN,
    X_STRING,
};
use crate::engine::ast::{AstCallback, Translate, Visit};
use crate::types::{Opcode, Rule, Udt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefinedAs {
    /// `=`: a new rule.
    Defined,
    /// `=/`: more alternatives for an existing rule.
    Incremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReferenceKind {
    Rule,
    BackReference { case_insensitive: bool },
}

/// A name used before all rules are known. Patched in place once the whole
/// file has been translated.
#[derive(Debug)]
struct Reference {
    rule: usize,
    opcode: usize,
    name: String,
    at: usize,
    kind: ReferenceKind,
}

/// The ALT being filled at one nesting level, and the CAT most recently
/// opened inside it.
#[derive(Debug, Clone, Copy)]
struct Level {
    alt: usize,
    cat: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Translator {
    rules: Vec<Rule>,
    udts: Vec<Udt>,
    rule_names: HashMap<String, usize>,
    udt_names: HashMap<String, usize>,
    references: Vec<Reference>,
    errors: Vec<(usize, String)>,

    rule_name: String,
    rule_at: usize,
    defined_as: Option<DefinedAs>,
    current: Option<usize>,
    levels: Vec<Level>,

    rep: usize,
    range: (u32, u32),
    string: Vec<u32>,
    bkr_case_insensitive: bool,
    bkr_name: String,
}

impl Translator {
    /// Rules, UDTs, and `(offset, message)` errors.
    pub(crate) fn finish(self) -> (Vec<Rule>, Vec<Udt>, Vec<(usize, String)>) {
        (self.rules, self.udts, self.errors)
    }

    fn error(&mut self, at: usize, message: String) {
        self.errors.push((at, message));
    }

    /// Append an opcode to the rule being built; returns its index.
    fn push(&mut self, op: Opcode) -> usize {
        match self.current {
            Some(rule) => {
                let opcodes = &mut self.rules[rule].opcodes;
                opcodes.push(op);
                opcodes.len() - 1
            }
            None => 0,
        }
    }

    fn next_index(&self) -> usize {
        self.current
            .map_or(0, |rule| self.rules[rule].opcodes.len())
    }

    fn opcode_mut(&mut self, index: usize) -> Option<&mut Opcode> {
        let rule = self.current?;
        self.rules[rule].opcodes.get_mut(index)
    }

    fn add_child(&mut self, parent: usize, child: usize) {
        if let Some(Opcode::Alt { children } | Opcode::Cat { children }) = self.opcode_mut(parent)
        {
            children.push(child);
        }
    }

    fn number(&mut self, text: &str, radix: u32, at: usize) -> u32 {
        match u32::from_str_radix(text, radix) {
            Ok(value) => value,
            Err(_) => {
                self.error(
                    at,
                    format!("numeric value '{text}' does not fit in 32 bits"),
                );
                0
            }
        }
    }

    fn udt(&mut self, name: &str, empty: bool, at: usize) -> usize {
        let lower = name.to_ascii_lowercase();
        if let Some(&index) = self.udt_names.get(&lower) {
            if self.udts[index].empty != empty {
                self.error(
                    at,
                    format!("UDT name '{name}' previously used with a different empty flag."),
                );
            }
            return index;
        }
        let index = self.udts.len();
        self.udts.push(Udt::new(name, index, empty));
        self.udt_names.insert(lower, index);
        index
    }

    fn reference(&mut self, opcode: usize, name: String, at: usize, kind: ReferenceKind) {
        if let Some(rule) = self.current {
            self.references.push(Reference {
                rule,
                opcode,
                name,
                at,
                kind,
            });
        }
    }

    fn resolve_references(&mut self) {
        for reference in std::mem::take(&mut self.references) {
            let lower = reference.name.to_ascii_lowercase();
            let resolved = match reference.kind {
                ReferenceKind::Rule => self
                    .rule_names
                    .get(&lower)
                    .map(|&index| Opcode::Rnm { index }),
                ReferenceKind::BackReference { case_insensitive } => {
                    let udt = self.udt_names.get(&lower).map(|&index| (index, true));
                    let rule = self.rule_names.get(&lower).map(|&index| (index, false));
                    udt.or(rule).map(|(index, udt)| Opcode::Bkr {
                        index,
                        udt,
                        case_insensitive,
                    })
                }
            };
            match resolved {
                Some(op) => self.rules[reference.rule].opcodes[reference.opcode] = op,
                None => {
                    let message = match reference.kind {
                        ReferenceKind::Rule => {
                            format!("Rule name '{}' used but not defined.", reference.name)
                        }
                        ReferenceKind::BackReference { .. } => format!(
                            "Back reference name '{}' refers to an undefined rule or UDT.",
                            reference.name
                        ),
                    };
                    self.error(reference.at, message);
                }
            }
        }
    }
}

/// The translation callback table, indexed by bootstrap rule.
pub(crate) fn callbacks() -> Vec<Option<AstCallback<Translator>>> {
    fn set(
        table: &mut [Option<AstCallback<Translator>>],
        rule: usize,
        callback: AstCallback<Translator>,
    ) {
        table[rule] = Some(callback);
    }

    let mut table = vec![None; RULE_COUNT];
    set(&mut table, FILE, file);
    set(&mut table, RULE, rule);
    set(&mut table, RULE_LOOKUP, rule_lookup);
    set(&mut table, RULE_NAME, rule_name);
    set(&mut table, DEFINED, defined);
    set(&mut table, INC_ALT, inc_alt);
    set(&mut table, ALTERNATION, alternation);
    set(&mut table, CONCATENATION, concatenation);
    set(&mut table, REPETITION, repetition);
    set(&mut table, OPTION_OPEN, option_open);
    set(&mut table, REP_OP, rep_op);
    set(&mut table, REP_MIN, rep_min);
    set(&mut table, REP_MAX, rep_max);
    set(&mut table, REP_MIN_MAX, rep_min_max);
    set(&mut table, AND_OP, and_op);
    set(&mut table, NOT_OP, not_op);
    set(&mut table, BKA_OP, bka_op);
    set(&mut table, BKN_OP, bkn_op);
    set(&mut table, ABG_OP, abg_op);
    set(&mut table, AEN_OP, aen_op);
    set(&mut table, BKR_OP, bkr_op);
    set(&mut table, BKR_CS, bkr_cs);
    set(&mut table, BKR_CI, bkr_ci);
    set(&mut table, BKR_NAME, bkr_name);
    set(&mut table, RNM_OP, rnm_op);
    set(&mut table, UDT_EMPTY, udt_empty);
    set(&mut table, UDT_NON_EMPTY, udt_non_empty);
    set(&mut table, TLS_OP, tls_op);
    set(&mut table, CLS_OP, cls_op);
    set(&mut table, TBS_OP, tbs_op);
    set(&mut table, D_STRING, d_string);
    set(&mut table, X_STRING, x_string);
    set(&mut table, B_STRING, b_string);
    set(&mut table, TRG_OP, trg_op);
    set(&mut table, DMIN, range_min_dec);
    set(&mut table, DMAX, range_max_dec);
    set(&mut table, XMIN, range_min_hex);
    set(&mut table, XMAX, range_max_hex);
    set(&mut table, BMIN, range_min_bin);
    set(&mut table, BMAX, range_max_bin);
    table
}

fn phrase(input: &[u8], index: usize, len: usize) -> Cow<'_, str> {
    String::from_utf8_lossy(&input[index..index + len])
}

fn file(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.resolve_references();
    }
    Translate::Continue
}

fn rule(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Pre {
        t.levels.clear();
        t.defined_as = None;
        t.current = None;
    }
    Translate::Continue
}

fn rule_lookup(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        let name = std::mem::take(&mut t.rule_name);
        let lower = name.to_ascii_lowercase();
        let existing = t.rule_names.get(&lower).copied();
        match (t.defined_as, existing) {
            (Some(DefinedAs::Defined), None) => {
                let index = t.rules.len();
                t.rules.push(Rule::new(&name, index, Vec::new()));
                t.rule_names.insert(lower, index);
                t.current = Some(index);
            }
            (Some(DefinedAs::Defined), Some(_)) => {
                let at = t.rule_at;
                t.error(at, format!("Rule name '{name}' previously defined."));
                t.defined_as = None;
            }
            (Some(DefinedAs::Incremental), Some(index)) => t.current = Some(index),
            (Some(DefinedAs::Incremental), None) => {
                let at = t.rule_at;
                t.error(
                    at,
                    format!("Rule name '{name}' for incremental alternate not previously defined."),
                );
                t.defined_as = None;
            }
            (None, _) => {}
        }
    }
    Translate::Continue
}

fn rule_name(
    visit: Visit,
    input: &[u8],
    index: usize,
    len: usize,
    t: &mut Translator,
) -> Translate {
    if visit == Visit::Post {
        t.rule_name = phrase(input, index, len).into_owned();
        t.rule_at = index;
    }
    Translate::Continue
}

fn defined(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.defined_as = Some(DefinedAs::Defined);
    }
    Translate::Continue
}

fn inc_alt(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.defined_as = Some(DefinedAs::Incremental);
    }
    Translate::Continue
}

fn alternation(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    match visit {
        Visit::Pre => {
            let Some(defined_as) = t.defined_as else {
                return Translate::Skip;
            };
            let alt = if t.levels.is_empty() && defined_as == DefinedAs::Incremental {
                // The rule's root ALT receives the new alternatives.
                0
            } else {
                t.push(Opcode::Alt {
                    children: Vec::new(),
                })
            };
            t.levels.push(Level { alt, cat: 0 });
        }
        Visit::Post => {
            t.levels.pop();
        }
    }
    Translate::Continue
}

fn concatenation(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Pre {
        if let Some(level) = t.levels.last().copied() {
            let cat = t.next_index();
            t.add_child(level.alt, cat);
            t.push(Opcode::Cat {
                children: Vec::new(),
            });
            if let Some(level) = t.levels.last_mut() {
                level.cat = cat;
            }
        }
    }
    Translate::Continue
}

fn repetition(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Pre {
        if let Some(level) = t.levels.last().copied() {
            let next = t.next_index();
            t.add_child(level.cat, next);
        }
    }
    Translate::Continue
}

fn option_open(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.push(Opcode::Rep {
            min: 0,
            max: Some(1),
        });
    }
    Translate::Continue
}

fn rep_op(visit: Visit, _: &[u8], index: usize, _: usize, t: &mut Translator) -> Translate {
    match visit {
        Visit::Pre => t.rep = t.push(Opcode::Rep { min: 0, max: None }),
        Visit::Post => {
            let rep = t.rep;
            if let Some(&mut Opcode::Rep {
                min,
                max: Some(max),
            }) = t.opcode_mut(rep)
            {
                if min > max {
                    t.error(
                        index,
                        format!(
                            "repetition min cannot be greater than max: min: {min}: max: {max}"
                        ),
                    );
                }
            }
        }
    }
    Translate::Continue
}

fn set_rep(t: &mut Translator, min: Option<u32>, max: Option<u32>) {
    let rep = t.rep;
    if let Some(Opcode::Rep {
        min: rep_min,
        max: rep_max,
    }) = t.opcode_mut(rep)
    {
        if let Some(min) = min {
            *rep_min = min;
        }
        if max.is_some() {
            *rep_max = max;
        }
    }
}

fn rep_min(visit: Visit, input: &[u8], index: usize, len: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        let n = t.number(&phrase(input, index, len), 10, index);
        set_rep(t, Some(n), None);
    }
    Translate::Continue
}

fn rep_max(visit: Visit, input: &[u8], index: usize, len: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        let n = t.number(&phrase(input, index, len), 10, index);
        set_rep(t, None, Some(n));
    }
    Translate::Continue
}

fn rep_min_max(
    visit: Visit,
    input: &[u8],
    index: usize,
    len: usize,
    t: &mut Translator,
) -> Translate {
    if visit == Visit::Post {
        let n = t.number(&phrase(input, index, len), 10, index);
        set_rep(t, Some(n), Some(n));
    }
    Translate::Continue
}

fn and_op(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.push(Opcode::And);
    }
    Translate::Continue
}

fn not_op(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.push(Opcode::Not);
    }
    Translate::Continue
}

fn bka_op(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.push(Opcode::Bka);
    }
    Translate::Continue
}

fn bkn_op(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.push(Opcode::Bkn);
    }
    Translate::Continue
}

fn abg_op(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.push(Opcode::Abg);
    }
    Translate::Continue
}

fn aen_op(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.push(Opcode::Aen);
    }
    Translate::Continue
}

fn bkr_op(visit: Visit, _: &[u8], index: usize, _: usize, t: &mut Translator) -> Translate {
    match visit {
        Visit::Pre => {
            t.bkr_case_insensitive = true;
            t.bkr_name.clear();
        }
        Visit::Post => {
            let case_insensitive = t.bkr_case_insensitive;
            let opcode = t.push(Opcode::Bkr {
                index: 0,
                udt: false,
                case_insensitive,
            });
            let name = std::mem::take(&mut t.bkr_name);
            t.reference(
                opcode,
                name,
                index,
                ReferenceKind::BackReference { case_insensitive },
            );
        }
    }
    Translate::Continue
}

fn bkr_cs(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.bkr_case_insensitive = false;
    }
    Translate::Continue
}

fn bkr_ci(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.bkr_case_insensitive = true;
    }
    Translate::Continue
}

fn bkr_name(visit: Visit, input: &[u8], index: usize, len: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        t.bkr_name = phrase(input, index, len).into_owned();
    }
    Translate::Continue
}

fn rnm_op(visit: Visit, input: &[u8], index: usize, len: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        let opcode = t.push(Opcode::Rnm { index: 0 });
        let name = phrase(input, index, len).into_owned();
        t.reference(opcode, name, index, ReferenceKind::Rule);
    }
    Translate::Continue
}

fn udt_empty(
    visit: Visit,
    input: &[u8],
    index: usize,
    len: usize,
    t: &mut Translator,
) -> Translate {
    if visit == Visit::Post {
        let udt = t.udt(&phrase(input, index, len), true, index);
        t.push(Opcode::Udt {
            index: udt,
            empty: true,
        });
    }
    Translate::Continue
}

fn udt_non_empty(
    visit: Visit,
    input: &[u8],
    index: usize,
    len: usize,
    t: &mut Translator,
) -> Translate {
    if visit == Visit::Post {
        let udt = t.udt(&phrase(input, index, len), false, index);
        t.push(Opcode::Udt {
            index: udt,
            empty: false,
        });
    }
    Translate::Continue
}

/// The characters between the delimiters of a quoted phrase.
fn inner(input: &[u8], index: usize, len: usize) -> &[u8] {
    if len < 2 {
        return &[];
    }
    &input[index + 1..index + len - 1]
}

fn tls_op(visit: Visit, input: &[u8], index: usize, len: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        let string = inner(input, index, len)
            .iter()
            .map(|b| u32::from(b.to_ascii_lowercase()))
            .collect();
        t.push(Opcode::Tls { string });
    }
    Translate::Continue
}

fn cls_op(visit: Visit, input: &[u8], index: usize, len: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        let string: Vec<u32> = inner(input, index, len)
            .iter()
            .map(|&b| u32::from(b))
            .collect();
        if string.is_empty() {
            t.push(Opcode::Tls { string });
        } else {
            t.push(Opcode::Tbs { string });
        }
    }
    Translate::Continue
}

fn tbs_op(visit: Visit, _: &[u8], _: usize, _: usize, t: &mut Translator) -> Translate {
    match visit {
        Visit::Pre => t.string.clear(),
        Visit::Post => {
            let string = std::mem::take(&mut t.string);
            t.push(Opcode::Tbs { string });
        }
    }
    Translate::Continue
}

fn string_char(input: &[u8], index: usize, len: usize, radix: u32, t: &mut Translator) {
    let value = t.number(&phrase(input, index, len), radix, index);
    t.string.push(value);
}

fn d_string(visit: Visit, input: &[u8], index: usize, len: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        string_char(input, index, len, 10, t);
    }
    Translate::Continue
}

fn x_string(visit: Visit, input: &[u8], index: usize, len: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        string_char(input, index, len, 16, t);
    }
    Translate::Continue
}

fn b_string(visit: Visit, input: &[u8], index: usize, len: usize, t: &mut Translator) -> Translate {
    if visit == Visit::Post {
        string_char(input, index, len, 2, t);
    }
    Translate::Continue
}

fn trg_op(visit: Visit, _: &[u8], index: usize, _: usize, t: &mut Translator) -> Translate {
    match visit {
        Visit::Pre => t.range = (0, 0),
        Visit::Post => {
            let (min, max) = t.range;
            if min > max {
                t.error(
                    index,
                    format!(
                        "TRG, (%dmin-max), min cannot be greater than max: min: {min}: max: {max}"
                    ),
                );
            }
            t.push(Opcode::Trg { min, max });
        }
    }
    Translate::Continue
}

fn range_bound(input: &[u8], index: usize, len: usize, radix: u32, t: &mut Translator) -> u32 {
    t.number(&phrase(input, index, len), radix, index)
}

fn range_min_dec(
    visit: Visit,
    input: &[u8],
    index: usize,
    len: usize,
    t: &mut Translator,
) -> Translate {
    if visit == Visit::Post {
        t.range.0 = range_bound(input, index, len, 10, t);
    }
    Translate::Continue
}

fn range_max_dec(
    visit: Visit,
    input: &[u8],
    index: usize,
    len: usize,
    t: &mut Translator,
) -> Translate {
    if visit == Visit::Post {
        t.range.1 = range_bound(input, index, len, 10, t);
    }
    Translate::Continue
}

fn range_min_hex(
    visit: Visit,
    input: &[u8],
    index: usize,
    len: usize,
    t: &mut Translator,
) -> Translate {
    if visit == Visit::Post {
        t.range.0 = range_bound(input, index, len, 16, t);
    }
    Translate::Continue
}

fn range_max_hex(
    visit: Visit,
    input: &[u8],
    index: usize,
    len: usize,
    t: &mut Translator,
) -> Translate {
    if visit == Visit::Post {
        t.range.1 = range_bound(input, index, len, 16, t);
    }
    Translate::Continue
}

fn range_min_bin(
    visit: Visit,
    input: &[u8],
    index: usize,
    len: usize,
    t: &mut Translator,
) -> Translate {
    if visit == Visit::Post {
        t.range.0 = range_bound(input, index, len, 2, t);
    }
    Translate::Continue
}

fn range_max_bin(
    visit: Visit,
    input: &[u8],
    index: usize,
    len: usize,
    t: &mut Translator,
) -> Translate {
    if visit == Visit::Post {
        t.range.1 = range_bound(input, index, len, 2, t);
    }
    Translate::Continue
}
