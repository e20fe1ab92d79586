use log::{debug, trace};

use super::{Analysis, Branches, RuleAttr, RuleControl, RuleType};
use crate::types::{Opcode, Rule};

/// Compute `finite`, `empty` and `not_empty` for every rule.
///
/// `N` and `R` rules are walked first and each result is final once its
/// walk completes. Every member of a mutual-recursion group is then walked
/// with a fresh branch memo, since a group member's value depends on the
/// path into the group. `NMR` and `RMR` rules come last, when everything
/// they reach is complete.
pub fn propagate_non_recursive(analysis: &mut Analysis, rules: &[Rule]) {
    let Analysis {
        controls,
        attrs,
        mr_groups,
    } = analysis;
    for control in controls.iter_mut() {
        control.is_open = false;
        control.is_complete = false;
    }

    let mut walker = Walker {
        rules,
        controls,
        attrs,
        branches: None,
    };

    for index in 0..rules.len() {
        if matches!(
            walker.controls[index].rule_type,
            RuleType::NonRecursive | RuleType::Recursive
        ) {
            walker.rule_attr(index);
        }
    }

    for group in mr_groups.iter() {
        for &member in group {
            walker.branches = Some(Branches::default());
            walker.rule_attr(member);
            walker.controls[member].is_complete = true;
        }
    }
    walker.branches = None;

    for index in 0..rules.len() {
        if matches!(
            walker.controls[index].rule_type,
            RuleType::RefersToMutual | RuleType::RecursiveRefersToMutual
        ) {
            walker.rule_attr(index);
        }
    }

    for (rule, attr) in rules.iter().zip(walker.attrs.iter()) {
        trace!(
            "{}: finite={} empty={} not_empty={}",
            rule.name,
            attr.finite,
            attr.empty,
            attr.not_empty
        );
    }
    debug!(
        "non-recursive attributes: {} infinite rules",
        walker.attrs.iter().filter(|a| !a.finite).count()
    );
}

struct Walker<'a> {
    rules: &'a [Rule],
    controls: &'a mut [RuleControl],
    attrs: &'a mut [RuleAttr],
    branches: Option<Branches>,
}

impl Walker<'_> {
    fn rule_attr(&mut self, index: usize) -> RuleAttr {
        let control = &self.controls[index];
        if control.is_open || control.is_complete {
            return self.attrs[index].non_recursive();
        }
        if let Some(hit) = self.branches.as_mut().and_then(|b| b.enter(index)) {
            return hit;
        }

        self.controls[index].is_open = true;
        let attr = self.opcode_attr(index, 0);
        self.controls[index].is_open = false;
        self.attrs[index].set_non_recursive(&attr);

        match self.branches.as_mut() {
            Some(branches) => branches.leave(attr),
            None => self.controls[index].is_complete = true,
        }
        attr
    }

    fn opcode_attr(&mut self, rule: usize, op: usize) -> RuleAttr {
        let rules = self.rules;
        match &rules[rule].opcodes[op] {
            Opcode::Alt { children } => {
                let mut attr = RuleAttr::default();
                for &child in children {
                    let child = self.opcode_attr(rule, child);
                    attr.finite |= child.finite;
                    attr.empty |= child.empty;
                    attr.not_empty |= child.not_empty;
                }
                attr
            }
            Opcode::Cat { children } => {
                let mut attr = RuleAttr {
                    finite: true,
                    empty: true,
                    ..RuleAttr::default()
                };
                for &child in children {
                    let child = self.opcode_attr(rule, child);
                    attr.finite &= child.finite;
                    attr.empty &= child.empty;
                    attr.not_empty |= child.not_empty;
                }
                attr
            }
            Opcode::Rep { min, .. } => self.opcode_attr(rule, op + 1).repeated(*min),
            Opcode::Rnm { index } => self.rule_attr(*index),
            other => RuleAttr::terminal(other),
        }
    }
}
