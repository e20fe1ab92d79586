//! Opcode reduction: removes structurally redundant opcodes.
//!
//! The semantic phase wraps every alternative in an ALT and every element in
//! a CAT, so most rules start out with single-child ALT and CAT nodes. Those,
//! and `REP(1,1)`, match exactly what their only child matches and can be
//! dropped. Every remaining child index is redirected through removed nodes
//! to the surviving opcode they stood for.

use log::debug;

use crate::types::{Opcode, Rule};

/// Reduce every rule's opcode table. Rule order and indices are unchanged.
///
/// Reducing an already-reduced table returns it unchanged.
#[must_use]
pub fn reduce(rules: Vec<Rule>) -> Vec<Rule> {
    let before: usize = rules.iter().map(|r| r.opcodes.len()).sum();
    let rules: Vec<Rule> = rules
        .into_iter()
        .map(|mut rule| {
            rule.opcodes = reduce_opcodes(rule.opcodes);
            rule
        })
        .collect();
    let after: usize = rules.iter().map(|r| r.opcodes.len()).sum();
    debug!("reduce: {before} opcodes -> {after}");
    rules
}

/// The only child of a removable opcode, or `None` if `op` stays.
fn sole_child(opcodes: &[Opcode], index: usize) -> Option<usize> {
    match &opcodes[index] {
        Opcode::Alt { children } | Opcode::Cat { children } if children.len() == 1 => {
            Some(children[0])
        }
        Opcode::Rep {
            min: 1,
            max: Some(1),
        } if index + 1 < opcodes.len() => Some(index + 1),
        _ => None,
    }
}

fn reduce_opcodes(opcodes: Vec<Opcode>) -> Vec<Opcode> {
    let mut remap = Vec::with_capacity(opcodes.len());
    let mut next = 0;
    for index in 0..opcodes.len() {
        if sole_child(&opcodes, index).is_some() {
            remap.push(None);
        } else {
            remap.push(Some(next));
            next += 1;
        }
    }
    if next == opcodes.len() {
        return opcodes;
    }

    // Follow chains of removed nodes down to the opcode that survives.
    let resolve = |mut index: usize| -> usize {
        for _ in 0..opcodes.len() {
            match remap[index] {
                Some(new_index) => return new_index,
                None => match sole_child(&opcodes, index) {
                    Some(child) => index = child,
                    None => break,
                },
            }
        }
        panic!("opcode {index} does not resolve to a surviving opcode");
    };

    opcodes
        .iter()
        .enumerate()
        .filter(|(index, _)| remap[*index].is_some())
        .map(|(_, op)| match op {
            Opcode::Alt { children } => Opcode::Alt {
                children: children.iter().map(|&c| resolve(c)).collect(),
            },
            Opcode::Cat { children } => Opcode::Cat {
                children: children.iter().map(|&c| resolve(c)).collect(),
            },
            other => other.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tbs(b: u32) -> Opcode {
        Opcode::Tbs { string: vec![b] }
    }

    fn reduce_one(opcodes: Vec<Opcode>) -> Vec<Opcode> {
        reduce(vec![Rule::new("S", 0, opcodes)]).remove(0).opcodes
    }

    #[test]
    fn single_child_chain_collapses_to_terminal() {
        let reduced = reduce_one(vec![
            Opcode::Alt { children: vec![1] },
            Opcode::Cat { children: vec![2] },
            tbs(97),
        ]);
        assert_eq!(reduced, vec![tbs(97)]);
    }

    #[test]
    fn children_are_redirected_through_removed_nodes() {
        // ALT(CAT(RNM), CAT(TBS TBS))
        let reduced = reduce_one(vec![
            Opcode::Alt {
                children: vec![1, 3],
            },
            Opcode::Cat { children: vec![2] },
            Opcode::Rnm { index: 0 },
            Opcode::Cat {
                children: vec![4, 5],
            },
            tbs(1),
            tbs(2),
        ]);
        assert_eq!(
            reduced,
            vec![
                Opcode::Alt {
                    children: vec![1, 2]
                },
                Opcode::Rnm { index: 0 },
                Opcode::Cat {
                    children: vec![3, 4]
                },
                tbs(1),
                tbs(2),
            ]
        );
    }

    #[test]
    fn rep_one_one_is_removed() {
        // CAT(REP(1,1) TBS, TBS)
        let reduced = reduce_one(vec![
            Opcode::Cat {
                children: vec![1, 3],
            },
            Opcode::Rep {
                min: 1,
                max: Some(1),
            },
            tbs(1),
            tbs(2),
        ]);
        assert_eq!(
            reduced,
            vec![
                Opcode::Cat {
                    children: vec![1, 2]
                },
                tbs(1),
                tbs(2),
            ]
        );
    }

    #[test]
    fn governed_opcode_stays_adjacent() {
        // CAT(REP(0,1) ALT(CAT(TBS)), TBS): the REP must still precede its TBS.
        let reduced = reduce_one(vec![
            Opcode::Cat {
                children: vec![1, 5],
            },
            Opcode::Rep {
                min: 0,
                max: Some(1),
            },
            Opcode::Alt { children: vec![3] },
            Opcode::Cat { children: vec![4] },
            tbs(1),
            tbs(2),
        ]);
        assert_eq!(
            reduced,
            vec![
                Opcode::Cat {
                    children: vec![1, 3]
                },
                Opcode::Rep {
                    min: 0,
                    max: Some(1)
                },
                tbs(1),
                tbs(2),
            ]
        );
    }

    #[test]
    fn multi_child_nodes_and_other_reps_survive() {
        let opcodes = vec![
            Opcode::Alt {
                children: vec![1, 3],
            },
            Opcode::Rep {
                min: 0,
                max: None,
            },
            tbs(1),
            tbs(2),
        ];
        assert_eq!(reduce_one(opcodes.clone()), opcodes);
    }

    #[test]
    fn reduction_is_idempotent() {
        let once = reduce_one(vec![
            Opcode::Alt {
                children: vec![1, 3],
            },
            Opcode::Cat { children: vec![2] },
            Opcode::Rnm { index: 0 },
            Opcode::Cat {
                children: vec![4, 6],
            },
            Opcode::Rep {
                min: 1,
                max: Some(1),
            },
            tbs(1),
            tbs(2),
        ]);
        assert_eq!(once.len(), 5);
        let twice = reduce_one(once.clone());
        assert_eq!(once, twice);
    }
}
