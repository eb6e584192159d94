use crate::analysis::*;
use crate::parser::parse_rule;

#[test]
fn test_positional_rule_with_length_check() {
    let rule = parse_rule("c $1 <8", 0).unwrap();
    let dependency = analyze_rule(&rule).unwrap();
    assert_eq!(
        dependency.origin,
        DependencyOrigin::Positional {
            tracked_primitives: 3
        }
    );
    assert_eq!(
        dependency.checks,
        vec![RejectCheck {
            primitive: 2,
            kind: CheckKind::Length,
        }]
    );
    assert!(dependency.is_length_only());
}

#[test]
fn test_content_check_is_recorded() {
    let rule = parse_rule("l (a", 0).unwrap();
    let dependency = analyze_rule(&rule).unwrap();
    assert_eq!(dependency.checks[0].kind, CheckKind::Content);
    assert!(!dependency.is_length_only());
}

#[test]
fn test_purge_is_not_tracked() {
    for text in ["@a $1", "@?v", "P", "l I", "M Q", "~x", "c !a", "/1", "%2a"] {
        let rule = parse_rule(text, 0).unwrap();
        assert_eq!(analyze_rule(&rule), None, "{text}");
    }
}

#[test]
fn test_annotate_dependencies_fills_slots() {
    let mut rules = vec![
        parse_rule("u", 0).unwrap(),
        parse_rule("@a", 1).unwrap(),
    ];
    annotate_dependencies(&mut rules);
    assert!(rules[0].dependency.is_some());
    assert!(rules[1].dependency.is_none());
}

#[test]
fn test_special_countability_without_rejection() {
    let rule = parse_rule("@a $1", 0).unwrap();
    let dependency = special_countability(&rule).unwrap();
    assert_eq!(dependency.origin, DependencyOrigin::OnePerWord);
    assert!(dependency.checks.is_empty());
}

#[test]
fn test_special_countability_truncate_then_reject_memory() {
    let rule = parse_rule("M '5 Q", 0).unwrap();
    let dependency = special_countability(&rule).unwrap();
    assert_eq!(dependency.origin, DependencyOrigin::LengthThreshold { min_len: 6 });
    assert_eq!(dependency.checks[0].primitive, 2);

    let rule = parse_rule("'5 Q", 0).unwrap();
    let dependency = special_countability(&rule).unwrap();
    assert_eq!(dependency.origin, DependencyOrigin::LengthThreshold { min_len: 6 });
    assert_eq!(dependency.checks[0].primitive, 1);
}

#[test]
fn test_special_countability_rejects_other_shapes() {
    for text in ["@a <5", "M '5 $1 Q", "M c Q", "~ab"] {
        let rule = parse_rule(text, 0).unwrap();
        assert_eq!(special_countability(&rule), None, "{text}");
    }
}

#[test]
fn test_apply_special_countability_only_fills_empty_slots() {
    let mut rules = vec![
        parse_rule("c <5", 0).unwrap(),
        parse_rule("@a", 1).unwrap(),
        parse_rule("'3 Q", 2).unwrap(),
        parse_rule("@a >2", 3).unwrap(),
    ];
    annotate_dependencies(&mut rules);
    apply_special_countability(&mut rules);

    assert!(matches!(
        rules[0].dependency.as_ref().unwrap().origin,
        DependencyOrigin::Positional { .. }
    ));
    assert_eq!(
        rules[1].dependency.as_ref().unwrap().origin,
        DependencyOrigin::OnePerWord
    );
    assert_eq!(
        rules[2].dependency.as_ref().unwrap().origin,
        DependencyOrigin::LengthThreshold { min_len: 4 }
    );
    assert!(rules[3].dependency.is_none());
}

#[test]
fn test_dependency_serializes_with_type_tag() {
    let rule = parse_rule("'3 Q", 0).unwrap();
    let dependency = special_countability(&rule).unwrap();
    let json = serde_json::to_value(&dependency).unwrap();
    assert_eq!(json["origin"]["type"], "length_threshold");
    assert_eq!(json["origin"]["min_len"], 4);
}
