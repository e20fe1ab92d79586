//! Rule classification and attribute propagation.
//!
//! [`classify`] types every rule by its recursion pattern.
//! [`propagate_non_recursive`] then computes whether each rule can match a
//! finite phrase, the empty phrase and a non-empty phrase, and
//! [`propagate_recursive`] finds left, right, nested and cyclic recursion.
//! [`Analysis::errors`] turns the results into the rule faults that reject
//! a grammar.

mod classify;
mod non_recursive;
mod recursive;

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::types::{AttributeError, AttributeErrorKind, Opcode, Rule};

pub use classify::classify;
pub use non_recursive::propagate_non_recursive;
pub use recursive::propagate_recursive;

/// A rule's recursion pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    /// `N`: never reaches itself.
    NonRecursive,
    /// `R`: reaches itself, but shares no cycle with another rule.
    Recursive,
    /// `MR`: in a mutual-recursion group.
    MutuallyRecursive,
    /// `NMR`: non-recursive, but refers to mutually recursive rules.
    RefersToMutual,
    /// `RMR`: recursive, and refers to mutually recursive rules.
    RecursiveRefersToMutual,
}

impl RuleType {
    /// True for the types whose recursive attributes are computed.
    #[must_use]
    pub fn is_recursive(self) -> bool {
        matches!(
            self,
            RuleType::Recursive | RuleType::MutuallyRecursive | RuleType::RecursiveRefersToMutual
        )
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuleType::NonRecursive => "N",
            RuleType::Recursive => "R",
            RuleType::MutuallyRecursive => "MR",
            RuleType::RefersToMutual => "NMR",
            RuleType::RecursiveRefersToMutual => "RMR",
        })
    }
}

/// Attributes of a rule or opcode.
///
/// `finite`, `empty` and `not_empty` say whether some finite phrase, the
/// empty phrase, and some non-empty phrase can be matched. The other four
/// describe where the rule recurs into itself: first (`left`), last
/// (`right`), between non-empty phrases (`nested`), or as its whole phrase
/// (`cyclic`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RuleAttr {
    pub left: bool,
    pub nested: bool,
    pub right: bool,
    pub cyclic: bool,
    pub finite: bool,
    pub empty: bool,
    pub not_empty: bool,
}

impl RuleAttr {
    /// Starting values before propagation. Recursive rules assume the worst
    /// until their own walk proves otherwise.
    fn initial(rule_type: RuleType) -> Self {
        let recursive = rule_type.is_recursive();
        Self {
            left: recursive,
            nested: false,
            right: recursive,
            cyclic: recursive,
            finite: false,
            empty: true,
            not_empty: false,
        }
    }

    /// Attributes of a leaf opcode. Structural opcodes have no leaf value.
    fn terminal(op: &Opcode) -> Self {
        let (finite, empty, not_empty) = match op {
            Opcode::Udt { empty, .. } => (true, *empty, true),
            Opcode::And | Opcode::Not | Opcode::Bka | Opcode::Bkn | Opcode::Abg | Opcode::Aen => {
                (true, true, false)
            }
            Opcode::Bkr { .. } => (true, true, true),
            Opcode::Tls { string } => (true, string.is_empty(), !string.is_empty()),
            Opcode::Tbs { .. } | Opcode::Trg { .. } => (true, false, true),
            Opcode::Alt { .. } | Opcode::Cat { .. } | Opcode::Rep { .. } | Opcode::Rnm { .. } => {
                (false, false, false)
            }
        };
        Self {
            finite,
            empty,
            not_empty,
            ..Self::default()
        }
    }

    /// The non-recursive part only; recursion flags cleared.
    #[must_use]
    pub fn non_recursive(&self) -> Self {
        Self {
            finite: self.finite,
            empty: self.empty,
            not_empty: self.not_empty,
            ..Self::default()
        }
    }

    fn set_non_recursive(&mut self, from: &RuleAttr) {
        self.finite = from.finite;
        self.empty = from.empty;
        self.not_empty = from.not_empty;
    }

    fn set_recursive(&mut self, from: &RuleAttr) {
        self.left = from.left;
        self.nested = from.nested;
        self.right = from.right;
        self.cyclic = from.cyclic;
    }

    /// `REP` with a zero minimum can always match the empty phrase.
    fn repeated(mut self, min: u32) -> Self {
        if min == 0 {
            self.finite = true;
            self.empty = true;
        }
        self
    }
}

/// Per-rule control block used while classifying and propagating.
#[derive(Debug, Clone)]
pub(crate) struct RuleControl {
    pub(crate) is_open: bool,
    pub(crate) is_complete: bool,
    pub(crate) rule_type: RuleType,
    pub(crate) mr_group: Option<usize>,
    /// How many times each rule is reached from this one.
    pub(crate) ref_count: Vec<u32>,
}

/// Memo of walks already made through mutually recursive rules, keyed by
/// the path of rules opened from the start of the walk.
#[derive(Debug, Default)]
struct Branches {
    path: Vec<usize>,
    memo: HashMap<Vec<usize>, RuleAttr>,
}

impl Branches {
    /// Step into `rule`. Returns the cached result if this exact path has
    /// been walked before, in which case the step is undone.
    fn enter(&mut self, rule: usize) -> Option<RuleAttr> {
        self.path.push(rule);
        let hit = self.memo.get(&self.path).copied();
        if hit.is_some() {
            self.path.pop();
        }
        hit
    }

    fn leave(&mut self, attr: RuleAttr) {
        self.memo.insert(self.path.clone(), attr);
        self.path.pop();
    }
}

/// Classification and attributes of every rule of a grammar.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub(crate) controls: Vec<RuleControl>,
    pub(crate) attrs: Vec<RuleAttr>,
    pub(crate) mr_groups: Vec<Vec<usize>>,
}

impl Analysis {
    /// Number of rules analyzed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `rule` is out of range.
    #[must_use]
    pub fn rule_type(&self, rule: usize) -> RuleType {
        self.controls[rule].rule_type
    }

    /// The rule's type as a short label, e.g. `"N"` or `"MR(0)"`.
    ///
    /// # Panics
    ///
    /// Panics if `rule` is out of range.
    #[must_use]
    pub fn type_label(&self, rule: usize) -> String {
        let control = &self.controls[rule];
        match control.mr_group {
            Some(group) => format!("{}({group})", control.rule_type),
            None => control.rule_type.to_string(),
        }
    }

    /// # Panics
    ///
    /// Panics if `rule` is out of range.
    #[must_use]
    pub fn mr_group(&self, rule: usize) -> Option<usize> {
        self.controls[rule].mr_group
    }

    /// Mutual-recursion groups in discovery order. Each group lists its
    /// members' rule indices; no rule belongs to more than one group.
    #[must_use]
    pub fn mr_groups(&self) -> &[Vec<usize>] {
        &self.mr_groups
    }

    /// # Panics
    ///
    /// Panics if `rule` is out of range.
    #[must_use]
    pub fn attr(&self, rule: usize) -> RuleAttr {
        self.attrs[rule]
    }

    #[must_use]
    pub fn attrs(&self) -> &[RuleAttr] {
        &self.attrs
    }

    /// Every rule reachable from `rule`, directly or indirectly, in index
    /// order. Includes `rule` itself if it is recursive.
    ///
    /// # Panics
    ///
    /// Panics if `rule` is out of range.
    #[must_use]
    pub fn references(&self, rule: usize) -> Vec<usize> {
        self.controls[rule]
            .ref_count
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(index, _)| index)
            .collect()
    }

    /// The attribute faults: one entry per left-recursive, infinite, or
    /// cyclic rule, in rule order.
    #[must_use]
    pub fn errors(&self, rules: &[Rule]) -> Vec<AttributeError> {
        let mut errors = Vec::new();
        for (rule, attr) in rules.iter().zip(&self.attrs) {
            let mut report = |kind| {
                errors.push(AttributeError {
                    rule: rule.name.clone(),
                    index: rule.index,
                    kind,
                });
            };
            if attr.left {
                report(AttributeErrorKind::LeftRecursive);
            }
            if !attr.finite {
                report(AttributeErrorKind::Infinite);
            }
            if attr.cyclic {
                report(AttributeErrorKind::Cyclic);
            }
        }
        errors
    }
}

/// Classify `rules` and propagate all attributes.
#[must_use]
pub fn analyze(rules: &[Rule]) -> Analysis {
    let mut analysis = classify(rules);
    propagate_non_recursive(&mut analysis, rules);
    propagate_recursive(&mut analysis, rules);
    debug!(
        "attributes: {} rules, {} mutual recursion groups, {} errors",
        rules.len(),
        analysis.mr_groups.len(),
        analysis.errors(rules).len()
    );
    analysis
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::input::analyze as analyze_input;
    use crate::parse::{semantic, syntax};
    use crate::reduce::reduce;

    /// Translate and reduce a grammar that is known to be valid text.
    pub(crate) fn rules_of(source: &str) -> Vec<Rule> {
        let input = analyze_input(source, false);
        let syntax = syntax(&input, false);
        assert!(!syntax.has_errors(), "{:?}", syntax.errors());
        let output = semantic(&input, &syntax);
        assert!(!output.has_errors(), "{:?}", output.errors());
        reduce(output.into_parts().0)
    }

    #[test]
    fn leaf_attributes() {
        let tls_empty = RuleAttr::terminal(&Opcode::Tls { string: vec![] });
        assert!(tls_empty.finite && tls_empty.empty && !tls_empty.not_empty);
        let trg = RuleAttr::terminal(&Opcode::Trg { min: 1, max: 2 });
        assert!(trg.finite && !trg.empty && trg.not_empty);
        let udt = RuleAttr::terminal(&Opcode::Udt {
            index: 0,
            empty: true,
        });
        assert!(udt.empty && udt.not_empty);
        let and = RuleAttr::terminal(&Opcode::And);
        assert!(and.empty && !and.not_empty);
    }

    #[test]
    fn initial_values_assume_recursion() {
        let r = RuleAttr::initial(RuleType::Recursive);
        assert!(r.left && r.right && r.cyclic && !r.nested);
        let n = RuleAttr::initial(RuleType::RefersToMutual);
        assert!(!n.left && !n.right && !n.cyclic);
        assert!(!n.finite && n.empty && !n.not_empty);
    }

    #[test]
    fn branch_memo_hits_only_on_identical_path() {
        let mut branches = Branches::default();
        assert_eq!(branches.enter(1), None);
        assert_eq!(branches.enter(2), None);
        let attr = RuleAttr {
            finite: true,
            ..RuleAttr::default()
        };
        branches.leave(attr);
        assert_eq!(branches.enter(2), Some(attr));
        assert_eq!(branches.path, vec![1]);
        branches.leave(RuleAttr::default());
        assert_eq!(branches.enter(2), None);
    }

    #[test]
    fn errors_name_each_rule_and_kind() {
        let rules = rules_of("S = S\nT = \"t\"\n");
        let analysis = analyze(&rules);
        let errors = analysis.errors(&rules);
        let kinds: Vec<_> = errors.iter().map(|e| (e.rule.as_str(), e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("S", AttributeErrorKind::LeftRecursive),
                ("S", AttributeErrorKind::Infinite),
                ("S", AttributeErrorKind::Cyclic),
            ]
        );
    }

    #[test]
    fn type_labels() {
        let rules = rules_of("S = \"x\" A / \"y\"\nA = \"a\" S / \"b\"\nT = S\n");
        let analysis = analyze(&rules);
        assert_eq!(analysis.type_label(0), "MR(0)");
        assert_eq!(analysis.type_label(1), "MR(0)");
        assert_eq!(analysis.type_label(2), "NMR");
        assert_eq!(analysis.references(2), vec![0, 1]);
    }
}
