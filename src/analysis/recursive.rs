use log::{debug, trace};

use super::{Analysis, Branches, RuleAttr, RuleControl};
use crate::types::{Opcode, Rule};

/// Compute `left`, `nested`, `right` and `cyclic` for every recursive rule.
///
/// Each recursive rule is walked as the start of its own search. Reaching
/// the start again yields its assumed recursive values; rules that cannot
/// lead back to the start, and rules already open on the current path,
/// contribute only their non-recursive values. Only the four recursion
/// flags of the start rule are updated.
pub fn propagate_recursive(analysis: &mut Analysis, rules: &[Rule]) {
    let Analysis {
        controls, attrs, ..
    } = analysis;
    for control in controls.iter_mut() {
        control.is_open = false;
    }

    for start in 0..rules.len() {
        if !controls[start].rule_type.is_recursive() {
            continue;
        }
        let attr = {
            let mut walker = Walker {
                rules,
                controls,
                attrs,
                start,
                branches: Branches::default(),
            };
            walker.rule_attr(start)
        };
        attrs[start].set_recursive(&attr);
        trace!(
            "{}: left={} nested={} right={} cyclic={}",
            rules[start].name,
            attr.left,
            attr.nested,
            attr.right,
            attr.cyclic
        );
    }

    debug!(
        "recursive attributes: {} left, {} nested, {} right, {} cyclic",
        attrs.iter().filter(|a| a.left).count(),
        attrs.iter().filter(|a| a.nested).count(),
        attrs.iter().filter(|a| a.right).count(),
        attrs.iter().filter(|a| a.cyclic).count()
    );
}

struct Walker<'a> {
    rules: &'a [Rule],
    controls: &'a mut [RuleControl],
    attrs: &'a [RuleAttr],
    start: usize,
    branches: Branches,
}

impl Walker<'_> {
    fn rule_attr(&mut self, index: usize) -> RuleAttr {
        let control = &self.controls[index];
        if index == self.start && control.is_open {
            return self.attrs[index];
        }
        if control.ref_count[self.start] == 0 || control.is_open {
            return self.attrs[index].non_recursive();
        }
        if let Some(hit) = self.branches.enter(index) {
            return hit;
        }

        self.controls[index].is_open = true;
        let attr = self.opcode_attr(index, 0);
        self.controls[index].is_open = false;
        self.branches.leave(attr);
        attr
    }

    fn opcode_attr(&mut self, rule: usize, op: usize) -> RuleAttr {
        let rules = self.rules;
        match &rules[rule].opcodes[op] {
            Opcode::Alt { children } => {
                let mut attr = RuleAttr::default();
                for &child in children {
                    let child = self.opcode_attr(rule, child);
                    attr.left |= child.left;
                    attr.nested |= child.nested;
                    attr.right |= child.right;
                    attr.cyclic |= child.cyclic;
                    attr.finite |= child.finite;
                    attr.empty |= child.empty;
                    attr.not_empty |= child.not_empty;
                }
                attr
            }
            Opcode::Cat { children } => {
                let children: Vec<RuleAttr> = children
                    .iter()
                    .map(|&child| self.opcode_attr(rule, child))
                    .collect();
                concatenation(&children)
            }
            Opcode::Rep { min, .. } => self.opcode_attr(rule, op + 1).repeated(*min),
            Opcode::Rnm { index } => self.rule_attr(*index),
            other => RuleAttr::terminal(other),
        }
    }
}

fn concatenation(children: &[RuleAttr]) -> RuleAttr {
    RuleAttr {
        left: leads_with(children.iter(), |c| c.left),
        nested: is_nested(children),
        right: leads_with(children.iter().rev(), |c| c.right),
        cyclic: children.iter().all(|c| c.cyclic),
        finite: children.iter().all(|c| c.finite),
        empty: children.iter().all(|c| c.empty),
        not_empty: children.iter().any(|c| c.not_empty),
    }
}

/// True if `flag` holds for some child that is reached by skipping only
/// children that can match empty.
fn leads_with<'a>(
    mut children: impl Iterator<Item = &'a RuleAttr>,
    flag: impl Fn(&RuleAttr) -> bool,
) -> bool {
    children
        .find(|&c| flag(c) || !c.empty)
        .is_some_and(flag)
}

/// A child that recurs on one side only, followed (in scan order) by a
/// child that matches a non-empty phrase.
fn recursion_then_phrase<'a>(
    children: impl Iterator<Item = &'a RuleAttr>,
    from_right: bool,
) -> bool {
    let mut found = false;
    for c in children {
        if found {
            if c.not_empty {
                return true;
            }
            continue;
        }
        let (near, far) = if from_right {
            (c.left, c.right)
        } else {
            (c.right, c.left)
        };
        found = near && !far && c.not_empty;
    }
    false
}

/// Nested recursion: the start rule recurs with a non-empty phrase on both
/// sides of it.
fn is_nested(children: &[RuleAttr]) -> bool {
    if children.iter().any(|c| c.nested) {
        return true;
    }
    if recursion_then_phrase(children.iter(), false)
        || recursion_then_phrase(children.iter().rev(), true)
    {
        return true;
    }

    let mut phrase_before = false;
    let mut recursion = false;
    for c in children {
        if !phrase_before {
            phrase_before = c.not_empty;
        } else if !recursion {
            recursion = c.left || c.right || c.cyclic;
        } else if c.not_empty {
            return true;
        }
    }
    false
}
