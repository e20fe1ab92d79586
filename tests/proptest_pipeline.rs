mod strategies;

use proptest::prelude::*;
use sabnf::analysis::{self, RuleType};
use sabnf::{input, parse, reduce, Compiler, Opcode, Rule};
use strategies::{arb_grammar, arb_terminated_grammar, GenGrammar};

/// Run the front end and reduction on a generated grammar. Generated text
/// is always well formed, so every stage before attribute analysis must
/// succeed.
fn rules_of(gen: &GenGrammar) -> Vec<Rule> {
    let text = gen.to_abnf();
    let input = input::analyze(&text, false);
    assert!(!input.has_errors(), "{text}: {:?}", input.errors());
    let syntax = parse::syntax(&input, false);
    assert!(!syntax.has_errors(), "{text}: {:?}", syntax.errors());
    let semantic = parse::semantic(&input, &syntax);
    assert!(!semantic.has_errors(), "{text}: {:?}", semantic.errors());
    let (rules, _, _) = semantic.into_parts();
    reduce::reduce(rules)
}

// ---------------------------------------------------------------------------
// Opcode tables
//
// Reduction leaves no removable node behind, is idempotent, and keeps every
// child index inside its rule's table.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn reduction_is_idempotent(gen in arb_grammar()) {
        let once = rules_of(&gen);
        let twice = reduce::reduce(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn reduced_tables_have_no_redundant_nodes(gen in arb_grammar()) {
        for rule in rules_of(&gen) {
            for (i, op) in rule.opcodes.iter().enumerate() {
                match op {
                    Opcode::Alt { children } | Opcode::Cat { children } => {
                        prop_assert!(children.len() > 1, "{}[{}] = {:?}", rule.name, i, op);
                    }
                    Opcode::Rep { min: 1, max: Some(1) } => {
                        prop_assert!(false, "REP(1,1) left in {}[{}]", rule.name, i);
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn child_indices_are_in_bounds(gen in arb_grammar()) {
        let rules = rules_of(&gen);
        for rule in &rules {
            let len = rule.opcodes.len();
            for (i, op) in rule.opcodes.iter().enumerate() {
                prop_assert!(op.children().iter().all(|&c| c > i && c < len));
                if op.governs_next() {
                    prop_assert!(i + 1 < len);
                }
                if let Opcode::Rnm { index } = op {
                    prop_assert!(*index < rules.len());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
//
// Every rule gets exactly one type, MR groups are disjoint, and rules that
// never reach themselves carry no recursion flags.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn mr_groups_partition_their_members(gen in arb_grammar()) {
        let rules = rules_of(&gen);
        let analysis = analysis::analyze(&rules);
        let mut seen = vec![false; rules.len()];
        for (g, group) in analysis.mr_groups().iter().enumerate() {
            prop_assert!(group.len() > 1);
            for &member in group {
                prop_assert!(!seen[member], "rule {} in two groups", member);
                seen[member] = true;
                prop_assert_eq!(analysis.mr_group(member), Some(g));
                prop_assert_eq!(analysis.rule_type(member), RuleType::MutuallyRecursive);
            }
        }
        for (index, in_group) in seen.into_iter().enumerate() {
            if !in_group {
                prop_assert_eq!(analysis.mr_group(index), None);
                prop_assert_ne!(analysis.rule_type(index), RuleType::MutuallyRecursive);
            }
        }
    }

    #[test]
    fn recursive_types_reach_themselves(gen in arb_grammar()) {
        let rules = rules_of(&gen);
        let analysis = analysis::analyze(&rules);
        for index in 0..rules.len() {
            let reaches_self = analysis.references(index).contains(&index);
            prop_assert_eq!(analysis.rule_type(index).is_recursive(), reaches_self);
        }
    }

    #[test]
    fn non_recursive_rules_have_clear_flags(gen in arb_grammar()) {
        let rules = rules_of(&gen);
        let analysis = analysis::analyze(&rules);
        for index in 0..rules.len() {
            let attr = analysis.attr(index);
            prop_assert!(attr.empty || attr.not_empty);
            if !analysis.rule_type(index).is_recursive() {
                prop_assert!(!attr.left && !attr.nested && !attr.right && !attr.cyclic);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Compilation
//
// The compiler accepts a well-formed grammar exactly when attribute analysis
// finds nothing wrong with it.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn compile_agrees_with_analysis(gen in arb_grammar()) {
        let rules = rules_of(&gen);
        let faults = analysis::analyze(&rules).errors(&rules);
        let compiled = Compiler::new().source(&gen.to_abnf()).compile();
        prop_assert_eq!(compiled.is_ok(), faults.is_empty());
    }

    #[test]
    fn terminal_exit_makes_every_rule_finite(gen in arb_terminated_grammar()) {
        let rules = rules_of(&gen);
        let analysis = analysis::analyze(&rules);
        prop_assert!(analysis.attrs().iter().all(|a| a.finite));
    }

    #[test]
    fn generated_source_is_deterministic(gen in arb_terminated_grammar()) {
        if let Ok(grammar) = Compiler::new().source(&gen.to_abnf()).compile() {
            let again = Compiler::new().source(&gen.to_abnf()).compile();
            prop_assert!(again.is_ok());
            if let Ok(again) = again {
                prop_assert_eq!(grammar.to_rust_source(), again.to_rust_source());
            }
        }
    }
}
