//! Tests for feature terms, the term parser and the expander

use crate::terms::*;
use ndarray::array;

fn names(expander: &FeatureExpander) -> Vec<String> {
    expander.feature_names()
}

#[test]
fn test_term_rendering() {
    assert_eq!(FeatureTerm::variable("x").unwrap().to_string(), "x");
    assert_eq!(FeatureTerm::power("x", 3).unwrap().to_string(), "x^3");

    let term = FeatureTerm::from_factors(vec![
        Factor::new("a", 2).unwrap(),
        Factor::new("b", 1).unwrap(),
    ])
    .unwrap();
    assert_eq!(term.to_string(), "a^2*b");
    assert_eq!(term.degree(), 3);
    assert!(term.is_interaction());
    assert!(!term.is_bare());
    assert_eq!(term.variables().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_term_construction_errors() {
    assert!(matches!(
        Factor::new("x", 0),
        Err(TermError::InvalidExponent { .. })
    ));
    assert!(matches!(
        FeatureTerm::variable("a*b"),
        Err(TermError::InvalidVariable { .. })
    ));
    assert!(matches!(
        FeatureTerm::variable(""),
        Err(TermError::InvalidVariable { .. })
    ));
    assert_eq!(
        FeatureTerm::from_factors(Vec::new()).unwrap_err(),
        TermError::EmptyTerm
    );
}

#[test]
fn test_term_merges_repeated_variables() {
    let term = FeatureTerm::from_factors(vec![
        Factor::new("a", 1).unwrap(),
        Factor::new("b", 1).unwrap(),
        Factor::new("a", 2).unwrap(),
    ])
    .unwrap();
    assert_eq!(term.to_string(), "a^3*b");
}

#[test]
fn test_parser_basic_syntax() {
    let term = FeatureTerm::parse("x").unwrap();
    assert!(term.is_bare());
    assert_eq!(term.factors(), &[Factor::new("x", 1).unwrap()]);

    let term = FeatureTerm::parse("x^2").unwrap();
    assert_eq!(term.factors(), &[Factor::new("x", 2).unwrap()]);

    let term: FeatureTerm = "a*b".parse().unwrap();
    assert_eq!(term.variables().collect::<Vec<_>>(), vec!["a", "b"]);

    // Whitespace around separators is ignored, inside names it is kept
    let term = FeatureTerm::parse(" unit price ^ 2 * qty ").unwrap();
    assert_eq!(
        term.factors(),
        &[
            Factor::new("unit price", 2).unwrap(),
            Factor::new("qty", 1).unwrap()
        ]
    );
    assert_eq!(term.to_string(), "unit price^2*qty");
}

#[test]
fn test_parser_errors() {
    assert!(matches!(
        FeatureTerm::parse(""),
        Err(TermError::Syntax { .. })
    ));
    assert!(matches!(
        FeatureTerm::parse("a**b"),
        Err(TermError::Syntax { position: 2, .. })
    ));
    assert!(matches!(
        FeatureTerm::parse("x^"),
        Err(TermError::Syntax { .. })
    ));
    assert!(matches!(
        FeatureTerm::parse("x^2y"),
        Err(TermError::Syntax { .. })
    ));
    assert!(matches!(
        FeatureTerm::parse("x^-1"),
        Err(TermError::Syntax { .. })
    ));
    assert!(matches!(
        FeatureTerm::parse("x^0"),
        Err(TermError::InvalidExponent { .. })
    ));
    assert!(matches!(
        FeatureTerm::parse("x^99999999999"),
        Err(TermError::InvalidExponent { .. })
    ));
    assert!(matches!(
        FeatureTerm::parse("*x"),
        Err(TermError::Syntax { position: 0, .. })
    ));
}

#[test]
fn test_render_parse_round_trip() {
    let expander = FeatureExpander::new(&["a", "b", "c"], 3).unwrap();
    for term in expander.terms() {
        let parsed = FeatureTerm::parse(&term.to_string()).unwrap();
        assert_eq!(&parsed, term);
    }
}

#[test]
fn test_term_serde_as_string() {
    let term = FeatureTerm::parse("a^2*b").unwrap();
    let json = serde_json::to_string(&term).unwrap();
    assert_eq!(json, r#""a^2*b""#);

    let back: FeatureTerm = serde_json::from_str(&json).unwrap();
    assert_eq!(back, term);

    let bad: Result<FeatureTerm, _> = serde_json::from_str(r#""a^""#);
    assert!(bad.is_err());
}

#[test]
fn test_term_evaluation() {
    let term = FeatureTerm::parse("a^2*b").unwrap();
    let value = term.evaluate_with(|name| match name {
        "a" => 3.0,
        "b" => 2.0,
        _ => 0.0,
    });
    assert_eq!(value, 18.0);
}

#[test]
fn test_expander_identity() {
    let expander = FeatureExpander::new(&["a", "b"], 1).unwrap();
    assert_eq!(names(&expander), vec!["a", "b"]);
    assert!(!expander.is_expanded());

    let design = expander.expand(array![[1.0, 4.0], [2.0, 3.0]].view()).unwrap();
    assert_eq!(design, array![[1.0, 4.0], [2.0, 3.0]]);
}

#[test]
fn test_expander_single_variable_powers() {
    let expander = FeatureExpander::new(&["x"], 3).unwrap();
    assert_eq!(names(&expander), vec!["x", "x^2", "x^3"]);

    let design = expander.expand(array![[2.0], [-1.0]].view()).unwrap();
    assert_eq!(design, array![[2.0, 4.0, 8.0], [-1.0, 1.0, -1.0]]);
}

#[test]
fn test_expander_interaction_order() {
    let expander = FeatureExpander::new(&["a", "b"], 2).unwrap();
    assert_eq!(names(&expander), vec!["a", "b", "a^2", "a*b", "b^2"]);

    let expander = FeatureExpander::new(&["a", "b"], 3).unwrap();
    assert_eq!(
        names(&expander),
        vec!["a", "b", "a^2", "a*b", "b^2", "a^3", "a^2*b", "a*b^2", "b^3"]
    );

    let expander = FeatureExpander::new(&["a", "b", "c"], 2).unwrap();
    assert_eq!(
        names(&expander),
        vec!["a", "b", "c", "a^2", "a*b", "a*c", "b^2", "b*c", "c^2"]
    );
}

#[test]
fn test_expander_rows_match_terms() {
    let expander = FeatureExpander::new(&["a", "b"], 2).unwrap();
    let row = expander.expand_row(&[2.0, 5.0]).unwrap();
    assert_eq!(row, vec![2.0, 5.0, 4.0, 10.0, 25.0]);

    let by_name: Vec<f64> = expander
        .terms()
        .iter()
        .map(|t| t.evaluate_with(|v| if v == "a" { 2.0 } else { 5.0 }))
        .collect();
    assert_eq!(row, by_name);
}

#[test]
fn test_expander_errors() {
    let none: [&str; 0] = [];
    assert_eq!(
        FeatureExpander::new(&none, 1).unwrap_err(),
        TermError::NoVariables
    );
    assert_eq!(
        FeatureExpander::new(&["x"], 0).unwrap_err(),
        TermError::InvalidDegree(0)
    );
    assert_eq!(
        FeatureExpander::new(&["x", "x"], 1).unwrap_err(),
        TermError::DuplicateVariable("x".to_string())
    );

    let expander = FeatureExpander::new(&["a", "b"], 1).unwrap();
    assert_eq!(
        expander.expand_row(&[1.0]).unwrap_err(),
        TermError::DimensionMismatch {
            expected: 2,
            actual: 1
        }
    );
    assert!(expander.expand(array![[1.0, 2.0, 3.0]].view()).is_err());
}
