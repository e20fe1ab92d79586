use log::{debug, trace};

use super::{Analysis, RuleAttr, RuleControl, RuleType};
use crate::types::{Opcode, Rule};

/// Count, for every rule, how often each rule is reached from it, and type
/// each rule by its recursion pattern.
///
/// A rule that reaches itself is `R`. Recursive rules that reach each other
/// form a mutual-recursion group and become `MR`; each group is seeded by
/// the lowest-indexed member and a rule joins only the first group that
/// claims it. Rules that reach an `MR` rule without being in a group become
/// `NMR` (non-recursive) or `RMR` (recursive).
#[must_use]
pub fn classify(rules: &[Rule]) -> Analysis {
    let count = rules.len();
    let mut controls: Vec<RuleControl> = (0..count)
        .map(|_| RuleControl {
            is_open: false,
            is_complete: false,
            rule_type: RuleType::NonRecursive,
            mr_group: None,
            ref_count: vec![0; count],
        })
        .collect();

    for (index, control) in controls.iter_mut().enumerate() {
        let mut scanned = vec![false; count];
        scan(rules, index, &mut control.ref_count, &mut scanned);
        if control.ref_count[index] > 0 {
            control.rule_type = RuleType::Recursive;
        }
    }

    let mut mr_groups: Vec<Vec<usize>> = Vec::new();
    for i in 0..count {
        if controls[i].rule_type != RuleType::Recursive {
            continue;
        }
        let mut group = Vec::new();
        for j in 0..count {
            if i == j || controls[j].rule_type != RuleType::Recursive {
                continue;
            }
            if controls[i].ref_count[j] > 0 && controls[j].ref_count[i] > 0 {
                if group.is_empty() {
                    group.push(i);
                }
                group.push(j);
            }
        }
        if group.is_empty() {
            continue;
        }
        let id = mr_groups.len();
        for &member in &group {
            controls[member].rule_type = RuleType::MutuallyRecursive;
            controls[member].mr_group = Some(id);
        }
        trace!("mutual recursion group {id}: {group:?}");
        mr_groups.push(group);
    }

    for i in 0..count {
        let refers_to_mutual = controls[i]
            .ref_count
            .iter()
            .zip(&controls)
            .any(|(&refs, target)| refs > 0 && target.rule_type == RuleType::MutuallyRecursive);
        if !refers_to_mutual {
            continue;
        }
        let control = &mut controls[i];
        control.rule_type = match control.rule_type {
            RuleType::NonRecursive => RuleType::RefersToMutual,
            RuleType::Recursive => RuleType::RecursiveRefersToMutual,
            other => other,
        };
    }

    debug!(
        "classify: {} rules, {} recursive, {} mutual recursion groups",
        count,
        controls.iter().filter(|c| c.rule_type.is_recursive()).count(),
        mr_groups.len()
    );

    let attrs = controls
        .iter()
        .map(|control| RuleAttr::initial(control.rule_type))
        .collect();
    Analysis {
        controls,
        attrs,
        mr_groups,
    }
}

/// Depth-first walk over the rule references of `index`, counting every
/// reference and descending into each rule once.
fn scan(rules: &[Rule], index: usize, ref_count: &mut [u32], scanned: &mut [bool]) {
    scanned[index] = true;
    for op in &rules[index].opcodes {
        if let Opcode::Rnm { index: target } = *op {
            ref_count[target] += 1;
            if !scanned[target] {
                scan(rules, target, ref_count, scanned);
            }
        }
    }
}
