//! Tests for stateless and registry-backed prediction

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};

use super::*;
use crate::config::FitConfig;
use crate::select::ModelSelector;

fn names(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

fn interaction_request(rows: Vec<RawInput>) -> PredictionRequest {
    PredictionRequest {
        x_values: rows,
        coefficients: Some(CoefficientSet::Single(vec![1.0, 2.0, 3.0])),
        intercept: Some(InterceptSet::Scalar(0.0)),
        feature_names: names(&["a", "b", "a*b"]),
        ..PredictionRequest::default()
    }
}

fn named(pairs: &[(&str, f64)]) -> RawInput {
    RawInput::Named(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
}

/// Two-input interaction model fitted on a 3×3 grid: y = 1 + a + 3b + 2ab
fn interaction_model() -> FittedModel {
    let mut rows = Vec::new();
    for a in [0.0, 1.0, 2.0] {
        for b in [0.0, 1.0, 3.0] {
            rows.push([a, b, 1.0 + a + 3.0 * b + 2.0 * a * b]);
        }
    }
    let x = Array2::from_shape_fn((rows.len(), 2), |(i, j)| rows[i][j]);
    let y = Array2::from_shape_fn((rows.len(), 1), |(i, _)| rows[i][2]);
    let variables = vec!["a".to_string(), "b".to_string()];

    let selection = ModelSelector::new(FitConfig::default())
        .fit_fixed(&variables, 2, x.view(), y.view())
        .unwrap();
    FittedModel::new(selection.expander, selection.fit, vec!["y".to_string()]).unwrap()
}

// ==================== Stateless ====================

#[test]
fn test_stateless_interaction_terms() {
    let request = interaction_request(vec![vec![2.0, 5.0].into()]);
    let predictions = evaluate_stateless(&request).unwrap();
    assert_eq!(predictions, Predictions::Single(vec![42.0]));
}

#[test]
fn test_stateless_row_shapes() {
    let request = interaction_request(vec![
        // Already expanded: one value per feature
        vec![2.0, 5.0, 10.0].into(),
        // Missing trailing variable is zero
        vec![2.0].into(),
        // A scalar binds to the first variable
        2.0.into(),
        named(&[("b", 5.0), ("a", 2.0)]),
        named(&[("a", 2.0)]),
    ]);

    let predictions = evaluate_stateless(&request).unwrap();
    assert_eq!(
        predictions.as_single().unwrap(),
        &[42.0, 2.0, 2.0, 42.0, 2.0]
    );
}

#[test]
fn test_stateless_row_errors() {
    let too_long = interaction_request(vec![vec![1.0, 2.0, 3.0, 4.0].into()]);
    assert!(matches!(
        evaluate_stateless(&too_long),
        Err(ModelError::PredictionShape { .. })
    ));

    let unknown = interaction_request(vec![named(&[("c", 1.0)])]);
    assert!(matches!(
        evaluate_stateless(&unknown),
        Err(ModelError::PredictionShape { .. })
    ));
}

#[test]
fn test_stateless_base_order_follows_bare_terms() {
    let request = PredictionRequest {
        x_values: vec![vec![1.0, 2.0].into()],
        coefficients: Some(CoefficientSet::Single(vec![1.0, 10.0, 100.0])),
        intercept: Some(InterceptSet::Scalar(0.0)),
        feature_names: names(&["b^2", "a", "b"]),
        ..PredictionRequest::default()
    };
    // a = 1, b = 2: 4 + 10 + 200
    assert_eq!(
        evaluate_stateless(&request).unwrap(),
        Predictions::Single(vec![214.0])
    );

    // c only occurs inside a product, so it comes after the bare a
    let nested = PredictionRequest {
        x_values: vec![vec![2.0, 3.0].into()],
        coefficients: Some(CoefficientSet::Single(vec![1.0, 1.0])),
        feature_names: names(&["a*c", "a"]),
        ..request
    };
    assert_eq!(
        evaluate_stateless(&nested).unwrap(),
        Predictions::Single(vec![8.0])
    );
}

#[test]
fn test_stateless_polynomial_without_names() {
    let request = PredictionRequest {
        x_values: vec![3.0.into(), vec![-2.0].into()],
        coefficients: Some(CoefficientSet::Single(vec![0.0, 1.0])),
        intercept: Some(InterceptSet::Scalar(0.5)),
        is_polynomial: true,
        degree: 2,
        ..PredictionRequest::default()
    };

    let predictions = evaluate_stateless(&request).unwrap();
    assert_eq!(predictions, Predictions::Single(vec![9.5, 4.5]));
}

#[test]
fn test_stateless_positional_without_names() {
    let request = PredictionRequest {
        x_values: vec![3.0.into(), vec![1.0, 1.0].into()],
        coefficients: Some(CoefficientSet::Single(vec![2.0, 5.0])),
        intercept: Some(InterceptSet::Scalar(1.0)),
        ..PredictionRequest::default()
    };
    assert_eq!(
        evaluate_stateless(&request).unwrap(),
        Predictions::Single(vec![7.0, 8.0])
    );

    let too_long = PredictionRequest {
        x_values: vec![vec![1.0, 2.0, 3.0].into()],
        ..request.clone()
    };
    assert!(evaluate_stateless(&too_long).is_err());

    let by_name = PredictionRequest {
        x_values: vec![named(&[("a", 1.0)])],
        ..request
    };
    assert!(matches!(
        evaluate_stateless(&by_name),
        Err(ModelError::PredictionShape { .. })
    ));
}

#[test]
fn test_stateless_multiple_targets() {
    let request = PredictionRequest {
        x_values: vec![vec![3.0, 4.0].into()],
        coefficients: Some(CoefficientSet::PerTarget(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ])),
        intercept: Some(InterceptSet::PerTarget(vec![1.0, 2.0])),
        feature_names: names(&["a", "b"]),
        ..PredictionRequest::default()
    };
    assert_eq!(
        evaluate_stateless(&request).unwrap(),
        Predictions::Multi(vec![vec![4.0, 6.0]])
    );

    // A single target comes back as vectors when asked to
    let single = PredictionRequest {
        coefficients: Some(CoefficientSet::Single(vec![1.0, 1.0])),
        intercept: Some(InterceptSet::Scalar(0.0)),
        multi_output: true,
        ..request
    };
    assert_eq!(
        evaluate_stateless(&single).unwrap(),
        Predictions::Multi(vec![vec![7.0]])
    );
}

#[test]
fn test_stateless_request_errors() {
    let base = interaction_request(vec![vec![1.0, 1.0].into()]);

    let no_coefficients = PredictionRequest {
        coefficients: None,
        ..base.clone()
    };
    assert!(matches!(
        evaluate_stateless(&no_coefficients),
        Err(ModelError::PredictionShape { .. })
    ));

    let no_intercept = PredictionRequest {
        intercept: None,
        ..base.clone()
    };
    assert!(evaluate_stateless(&no_intercept).is_err());

    let wrong_intercepts = PredictionRequest {
        intercept: Some(InterceptSet::PerTarget(vec![0.0, 1.0])),
        ..base.clone()
    };
    assert!(matches!(
        evaluate_stateless(&wrong_intercepts),
        Err(ModelError::PredictionShape { .. })
    ));

    let wrong_names = PredictionRequest {
        feature_names: names(&["a", "b"]),
        ..base.clone()
    };
    assert!(matches!(
        evaluate_stateless(&wrong_names),
        Err(ModelError::PredictionShape { .. })
    ));

    let bad_term = PredictionRequest {
        feature_names: names(&["a", "b", "a^"]),
        ..base.clone()
    };
    assert!(matches!(
        evaluate_stateless(&bad_term),
        Err(ModelError::Term(_))
    ));

    let ragged = PredictionRequest {
        coefficients: Some(CoefficientSet::PerTarget(vec![vec![1.0, 2.0], vec![1.0]])),
        intercept: Some(InterceptSet::PerTarget(vec![0.0, 0.0])),
        feature_names: None,
        ..base
    };
    assert!(matches!(
        evaluate_stateless(&ragged),
        Err(ModelError::PredictionShape { .. })
    ));
}

#[test]
fn test_stateless_is_pure() {
    let request = interaction_request(vec![vec![1.5, -2.25].into(), vec![0.1, 7.0].into()]);
    let first = evaluate_stateless(&request).unwrap();
    let second = evaluate_stateless(&request).unwrap();
    assert_eq!(first, second);
}

// ==================== JSON ====================

#[test]
fn test_request_json_shapes() {
    let request = PredictionRequest::from_json(
        r#"{
            "x_values": [1.5, [1, 2], {"a": 1}],
            "coefficients": [[1, 2]],
            "intercept": [0.5],
            "feature_names": ["a", "b"],
            "model_equation": "y(x) = 1.0*a + 2.0*b + 0.5"
        }"#,
    )
    .unwrap();

    assert_eq!(
        request.x_values,
        vec![
            RawInput::Scalar(1.5),
            RawInput::Values(vec![1.0, 2.0]),
            named(&[("a", 1.0)]),
        ]
    );
    assert_eq!(
        request.coefficients,
        Some(CoefficientSet::PerTarget(vec![vec![1.0, 2.0]]))
    );
    assert_eq!(request.intercept, Some(InterceptSet::PerTarget(vec![0.5])));
    assert_eq!(request.degree, 1);
    assert!(!request.is_polynomial);
    assert!(request.model_id.is_none());

    let scalar = PredictionRequest::from_json(
        r#"{"x_values": [2], "coefficients": 3, "intercept": 1}"#,
    )
    .unwrap();
    assert_eq!(
        evaluate_stateless(&scalar).unwrap(),
        Predictions::Single(vec![7.0])
    );

    assert!(PredictionRequest::from_json(r#"{"x_values": "nope"}"#).is_err());
}

#[test]
fn test_predictions_serialize_untagged() {
    let single = serde_json::to_string(&Predictions::Single(vec![1.0, 2.5])).unwrap();
    assert_eq!(single, "[1.0,2.5]");

    let multi = serde_json::to_string(&Predictions::Multi(vec![vec![1.0, 2.0]])).unwrap();
    assert_eq!(multi, "[[1.0,2.0]]");
}

// ==================== Registry-backed ====================

#[test]
fn test_registered_model_prediction() {
    let registry = ModelRegistry::new();
    let id = registry.insert(interaction_model());
    let evaluator = PredictionEvaluator::new(&registry);

    let request = PredictionRequest::for_model(
        id.clone(),
        vec![vec![2.0, 5.0].into(), named(&[("b", 5.0), ("a", 2.0)]), 2.0.into()],
    );
    let predictions = evaluator.evaluate(&request).unwrap();
    let values = predictions.as_single().unwrap();

    assert_abs_diff_eq!(values[0], 1.0 + 2.0 + 15.0 + 20.0, epsilon = 1e-8);
    assert_eq!(values[0], values[1]);
    assert_abs_diff_eq!(values[2], 3.0, epsilon = 1e-8);
}

#[test]
fn test_registered_model_reorders_by_feature_names() {
    let registry = ModelRegistry::new();
    let id = registry.insert(interaction_model());
    let evaluator = PredictionEvaluator::new(&registry);

    let in_order = PredictionRequest::for_model(id.clone(), vec![vec![2.0, 5.0].into()]);
    let swapped = PredictionRequest {
        x_values: vec![vec![5.0, 2.0].into()],
        feature_names: names(&["b", "a", "b^2"]),
        ..in_order.clone()
    };
    assert_eq!(
        evaluator.evaluate(&in_order).unwrap(),
        evaluator.evaluate(&swapped).unwrap()
    );

    // Names that do not cover every base variable leave the order alone
    let partial = PredictionRequest {
        feature_names: names(&["b"]),
        ..swapped
    };
    assert_ne!(
        evaluator.evaluate(&in_order).unwrap(),
        evaluator.evaluate(&partial).unwrap()
    );

    // Extra trailing values are dropped
    let long = PredictionRequest::for_model(id, vec![vec![2.0, 5.0, 99.0].into()]);
    assert_eq!(
        evaluator.evaluate(&in_order).unwrap(),
        evaluator.evaluate(&long).unwrap()
    );
}

#[test]
fn test_registered_model_matches_stateless() {
    let model = interaction_model();
    let registry = ModelRegistry::new();
    let rows: Vec<RawInput> = vec![vec![0.5, 1.5].into(), vec![-1.0, 2.0].into()];

    let stateless = PredictionRequest {
        x_values: rows.clone(),
        coefficients: Some(CoefficientSet::Single(model.coefficients().row(0).to_vec())),
        intercept: Some(InterceptSet::Scalar(model.intercepts()[0])),
        feature_names: Some(model.feature_names()),
        ..PredictionRequest::default()
    };
    let id = registry.insert(model);
    let replay = PredictionRequest::for_model(id, rows);

    let evaluator = PredictionEvaluator::new(&registry);
    assert_eq!(
        evaluator.evaluate(&replay).unwrap(),
        evaluator.evaluate(&stateless).unwrap()
    );
}

#[test]
fn test_missing_model_falls_back_or_fails() {
    let registry = ModelRegistry::new();
    let evaluator = PredictionEvaluator::new(&registry);

    let with_coefficients = PredictionRequest {
        model_id: Some("expired".to_string()),
        ..interaction_request(vec![vec![2.0, 5.0].into()])
    };
    assert_eq!(
        evaluator.evaluate(&with_coefficients).unwrap(),
        Predictions::Single(vec![42.0])
    );

    let bare = PredictionRequest::for_model("expired", vec![vec![2.0, 5.0].into()]);
    assert_eq!(
        evaluator.evaluate(&bare).unwrap_err(),
        ModelError::ModelNotFound("expired".to_string())
    );
}

#[test]
fn test_multi_target_registered_model() {
    let x = array![[1.0], [2.0], [3.0], [4.0]];
    let y = array![[2.0, 1.0], [4.0, 0.0], [6.0, -1.0], [8.0, -2.0]];
    let selection = ModelSelector::new(FitConfig::default())
        .fit_fixed(&["x".to_string()], 1, x.view(), y.view())
        .unwrap();
    let model = FittedModel::new(
        selection.expander,
        selection.fit,
        vec!["up".to_string(), "down".to_string()],
    )
    .unwrap();

    let registry = ModelRegistry::new();
    let id = registry.insert(model);
    let predictions = PredictionEvaluator::new(&registry)
        .evaluate(&PredictionRequest::for_model(id, vec![5.0.into()]))
        .unwrap();

    let rows = predictions.as_multi().unwrap();
    assert_eq!(rows.len(), 1);
    assert_abs_diff_eq!(rows[0][0], 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(rows[0][1], -3.0, epsilon = 1e-9);
}
