use sabnf::analysis::{self, Analysis, RuleType};
use sabnf::{input, parse, reduce, Rule};

fn rules_of(source: &str) -> Vec<Rule> {
    let input = input::analyze(source, false);
    assert!(!input.has_errors(), "{:?}", input.errors());
    let syntax = parse::syntax(&input, false);
    assert!(!syntax.has_errors(), "{:?}", syntax.errors());
    let semantic = parse::semantic(&input, &syntax);
    assert!(!semantic.has_errors(), "{:?}", semantic.errors());
    let (rules, _, _) = semantic.into_parts();
    reduce::reduce(rules)
}

fn analyze(source: &str) -> (Vec<Rule>, Analysis) {
    let rules = rules_of(source);
    let analysis = analysis::analyze(&rules);
    (rules, analysis)
}

#[test]
fn terminal_rules_are_finite_and_non_recursive() {
    let (_, analysis) = analyze("S = \"a\" %d48-57 'b' %x41.42\n");
    assert_eq!(analysis.rule_type(0), RuleType::NonRecursive);
    let attr = analysis.attr(0);
    assert!(attr.finite);
    assert!(!attr.empty);
    assert!(attr.not_empty);
    assert!(!attr.left && !attr.right && !attr.nested && !attr.cyclic);
}

#[test]
fn empty_and_not_empty_of_optional_phrase() {
    let (_, analysis) = analyze("S = [\"a\"]\nE = \"\"\n");
    let optional = analysis.attr(0);
    assert!(optional.empty && optional.not_empty);
    let empty = analysis.attr(1);
    assert!(empty.empty && !empty.not_empty);
}

#[test]
fn every_rule_can_match_something() {
    let (_, analysis) = analyze(
        "S = A / B *C\nA = \"\"\nB = &\"x\" \"y\"\nC = ['c']\nD = \"d\" D / \"\"\n",
    );
    for attr in analysis.attrs() {
        assert!(attr.empty || attr.not_empty, "{attr:?}");
    }
}

#[test]
fn mutual_recursion_is_symmetric() {
    let source = "S = A / \"s\"\nA = \"a\" B\nB = \"b\" S\nT = S\n";
    let (_, analysis) = analyze(source);
    for i in 0..analysis.len() {
        for j in 0..analysis.len() {
            let mutual = analysis.references(i).contains(&j) && analysis.references(j).contains(&i);
            if i != j && mutual {
                assert_eq!(analysis.mr_group(i), analysis.mr_group(j));
                assert!(analysis.mr_group(i).is_some());
            }
        }
    }
    assert_eq!(analysis.mr_groups(), &[vec![0, 1, 2]]);
    assert_eq!(analysis.rule_type(3), RuleType::RefersToMutual);
}

#[test]
fn groups_are_seeded_in_rule_order() {
    // B and C are found through A first; D's group starts at D.
    let source = "A = \"a\" B / \"x\"\nB = C\nC = A\nD = \"d\" E / \"y\"\nE = D\n";
    let (_, analysis) = analyze(source);
    assert_eq!(analysis.mr_groups(), &[vec![0, 1, 2], vec![3, 4]]);
    let labels: Vec<String> = (0..5).map(|i| analysis.type_label(i)).collect();
    assert_eq!(labels, ["MR(0)", "MR(0)", "MR(0)", "MR(1)", "MR(1)"]);
}

#[test]
fn repeated_prefix_hides_left_recursion() {
    let (rules, analysis) = analyze("S = *\"a\" S / \"b\"\n");
    assert!(analysis.attr(0).left);
    let errors = analysis.errors(&rules);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, sabnf::AttributeErrorKind::LeftRecursive);
}

#[test]
fn nested_recursion_is_accepted() {
    let (rules, analysis) = analyze("S = \"(\" S \")\" / \"x\"\n");
    let attr = analysis.attr(0);
    assert!(attr.nested);
    assert!(!attr.left && !attr.right && !attr.cyclic);
    assert!(attr.finite);
    assert!(analysis.errors(&rules).is_empty());
}

#[test]
fn empty_udt_makes_recursion_left() {
    let (rules, analysis) = analyze("S = e_skip S \"x\" / \"y\"\n");
    assert!(analysis.attr(0).left);
    assert!(!analysis.errors(&rules).is_empty());

    let (rules, analysis) = analyze("S = u_word S \"x\" / \"y\"\n");
    let attr = analysis.attr(0);
    assert!(!attr.left);
    assert!(attr.nested);
    assert!(analysis.errors(&rules).is_empty());
}

#[test]
fn look_ahead_does_not_consume() {
    // The look-ahead matches nothing, so S is still left recursive.
    let (_, analysis) = analyze("S = &\"a\" S \"b\" / \"c\"\n");
    assert!(analysis.attr(0).left);
}

#[test]
fn non_recursive_rules_have_clear_recursion_flags() {
    let source = "S = A B\nA = \"a\" A / \"a\"\nB = *A\n";
    let (_, analysis) = analyze(source);
    for index in 0..analysis.len() {
        if !analysis.rule_type(index).is_recursive() {
            let attr = analysis.attr(index);
            assert!(!attr.left && !attr.nested && !attr.right && !attr.cyclic);
        }
    }
    assert!(analysis.attr(1).right);
}

#[test]
fn infinite_recursion_without_exit() {
    let (rules, analysis) = analyze("S = \"a\" S\n");
    assert!(!analysis.attr(0).finite);
    let kinds: Vec<_> = analysis.errors(&rules).into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![sabnf::AttributeErrorKind::Infinite]);
}
