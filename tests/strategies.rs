#![allow(dead_code)]

use proptest::prelude::*;

// --- Grammar shape ---
// Rules are named r0..r{n-1}. Every rule body is an alternation of
// concatenations built from a fixed set of terminals, references to any
// rule (so recursion of every kind shows up), and the grouping, option,
// repetition and look-ahead wrappers.

const TERMINALS: &[&str] = &[
    "\"a\"",
    "\"bc\"",
    "\"\"",
    "'x'",
    "%d48-57",
    "%x41.42",
    "%b1100001",
];

const REPETITIONS: &[&str] = &["*", "1*", "1*1", "2", "0*3"];

/// A generated grammar: one rule body per rule.
#[derive(Debug, Clone)]
pub struct GenGrammar {
    pub bodies: Vec<String>,
}

impl GenGrammar {
    pub fn rule_count(&self) -> usize {
        self.bodies.len()
    }

    /// The grammar as ABNF text, one rule per line.
    pub fn to_abnf(&self) -> String {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, body)| format!("r{i} = {body}\n"))
            .collect()
    }
}

fn arb_atom(rules: usize) -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(TERMINALS).prop_map(str::to_owned),
        (0..rules).prop_map(|k| format!("r{k}")),
    ]
}

/// An element expression: an atom, possibly wrapped a few levels deep.
fn arb_element(rules: usize) -> impl Strategy<Value = String> {
    arb_atom(rules).prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| format!("[{e}]")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a} / {b})")),
            (prop::sample::select(REPETITIONS), inner.clone())
                .prop_map(|(rep, e)| format!("{rep}({e})")),
            (prop::sample::select(&["&", "!"][..]), inner)
                .prop_map(|(op, e)| format!("{op}({e})")),
        ]
    })
}

fn arb_concatenation(rules: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(arb_element(rules), 1..4).prop_map(|elements| elements.join(" "))
}

fn arb_body(rules: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(arb_concatenation(rules), 1..4).prop_map(|alts| alts.join(" / "))
}

/// Generate a grammar of 1 to 5 rules.
pub fn arb_grammar() -> impl Strategy<Value = GenGrammar> {
    (1usize..6).prop_flat_map(|n| {
        prop::collection::vec(arb_body(n), n).prop_map(|bodies| GenGrammar { bodies })
    })
}

/// Generate a grammar whose last rule always terminates on a terminal.
pub fn arb_terminated_grammar() -> impl Strategy<Value = GenGrammar> {
    arb_grammar().prop_map(|mut gen| {
        for body in &mut gen.bodies {
            body.push_str(" / \"z\"");
        }
        gen
    })
}
