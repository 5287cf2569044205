//! Shared fixtures and end-to-end tests for the model module
//!
//! The fixture model mirrors the shape of the production artifacts: two
//! label encoders, a standard scaler over all eight columns, and a logistic
//! regression over four selected features.

use std::path::Path;

use serde_json::json;

use crate::models::PatientRecord;

use super::artifacts::{
    ModelArtifacts, ENCODERS_FILE, FEATURE_INDICES_FILE, MODEL_FILE, SCALER_FILE, SELECTED_FEATURES_FILE,
};
use super::classifier::{Classifier, ClassifierArtifact};
use super::encoder::{EncoderMap, LabelEncoder};
use super::pipeline::Preprocessor;
use super::scaler::FeatureScaler;
use super::selection::FeatureSelection;
use super::service::ModelService;

// ============================================================================
// FIXTURES
// ============================================================================

pub(crate) const SELECTED_INDICES: [usize; 4] = [1, 5, 6, 7];
pub(crate) const SELECTED_NAMES: [&str; 4] = ["age", "bmi", "HbA1c_level", "blood_glucose_level"];

pub(crate) fn example_patient() -> PatientRecord {
    PatientRecord::example()
}

pub(crate) fn gender_encoder() -> LabelEncoder {
    LabelEncoder::new(["Female", "Male", "Other"])
}

pub(crate) fn smoking_encoder() -> LabelEncoder {
    LabelEncoder::new(["No Info", "current", "ever", "former", "never", "not current"])
}

pub(crate) fn standard_encoders() -> EncoderMap {
    let mut encoders = EncoderMap::new();
    encoders.insert("gender".to_string(), gender_encoder());
    encoders.insert("smoking_history".to_string(), smoking_encoder());
    encoders
}

fn scaler_json() -> serde_json::Value {
    json!({
        "kind": "standard",
        "mean": [0.41, 41.9, 0.075, 0.039, 2.18, 27.3, 5.53, 138.1],
        "scale": [0.49, 22.5, 0.26, 0.19, 1.9, 6.6, 1.07, 40.7]
    })
}

fn logistic_json() -> serde_json::Value {
    json!({
        "model_type": "LogisticRegression",
        "coef": [1.0, 0.6, 2.5, 1.1],
        "intercept": -4.5
    })
}

fn standard_scaler() -> FeatureScaler {
    serde_json::from_value(scaler_json()).unwrap()
}

fn classifier_from(value: serde_json::Value) -> Classifier {
    let artifact: ClassifierArtifact = serde_json::from_value(value).unwrap();
    artifact.validate().unwrap();
    artifact.into()
}

pub(crate) fn artifacts_with(classifier: serde_json::Value, selection: FeatureSelection) -> ModelArtifacts {
    let preprocessor = Preprocessor::new(Some(standard_encoders()), Some(standard_scaler()), selection);
    ModelArtifacts::new(classifier_from(classifier), preprocessor, "models")
}

pub(crate) fn test_service() -> ModelService {
    ModelService::new(artifacts_with(
        logistic_json(),
        FeatureSelection::new(Some(SELECTED_INDICES.to_vec()), None),
    ))
}

/// Write a complete artifact directory
pub(crate) fn write_artifacts(dir: &Path) {
    write(dir, MODEL_FILE, logistic_json());
    write(dir, SCALER_FILE, scaler_json());
    write(
        dir,
        ENCODERS_FILE,
        json!({
            "gender": {"classes": ["Female", "Male", "Other"]},
            "smoking_history": {"classes": ["No Info", "current", "ever", "former", "never", "not current"]}
        }),
    );
    write(dir, SELECTED_FEATURES_FILE, json!(SELECTED_NAMES));
    write(dir, FEATURE_INDICES_FILE, json!(SELECTED_INDICES));
}

pub(crate) fn write(dir: &Path, file: &str, value: serde_json::Value) {
    std::fs::write(dir.join(file), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

fn patients() -> Vec<PatientRecord> {
    let mut out = Vec::new();
    for (gender, smoking, age, bmi, hba1c, glucose) in [
        ("Female", "never", 45.0, 25.5, 5.7, 140.0),
        ("Male", "current", 80.0, 40.1, 9.0, 300.0),
        ("Other", "No Info", 2.0, 12.0, 3.5, 80.0),
        ("Male", "not current", 120.0, 100.0, 10.0, 80.0),
        ("Female", "former", 0.0, 10.0, 6.6, 159.0),
        ("Female", "ever", 33.0, 22.0, 6.1, 200.0),
    ] {
        out.push(PatientRecord {
            gender: gender.to_string(),
            age,
            hypertension: (age > 50.0) as i32,
            heart_disease: (bmi > 35.0) as i32,
            smoking_history: smoking.to_string(),
            bmi,
            hba1c_level: hba1c,
            blood_glucose_level: glucose,
        });
    }
    out
}

// ============================================================================
// PREDICTION ENGINE
// ============================================================================

#[test]
fn test_predictions_are_well_formed() {
    let service = test_service();

    for patient in patients() {
        let prediction = service.predict(&patient).unwrap();
        assert!(prediction.label <= 1);
        assert!((0.0..=1.0).contains(&prediction.probability));
        assert_eq!(prediction.label == 1, prediction.probability > 0.5);
    }
}

#[test]
fn test_prediction_is_deterministic() {
    let service = test_service();
    let first = service.predict(&example_patient()).unwrap();

    for _ in 0..10 {
        assert_eq!(service.predict(&example_patient()).unwrap(), first);
    }
}

#[test]
fn test_high_risk_patient_scores_higher() {
    let service = test_service();
    let [healthy, sick] = [&patients()[2], &patients()[1]].map(|p| service.predict(p).unwrap());

    assert!(sick.probability > healthy.probability);
    assert_eq!(sick.label, 1);
}

#[test]
fn test_unknown_category_is_never_defaulted() {
    let service = test_service();
    let mut patient = example_patient();
    patient.gender = "Unknown".to_string();

    let err = service.predict(&patient).unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(
        err.to_string(),
        "Unknown value 'Unknown' for feature 'gender'. Allowed values: ['Female', 'Male', 'Other']"
    );
}

#[test]
fn test_unloaded_service() {
    let service = ModelService::unloaded();

    assert!(!service.is_model_loaded());
    assert_eq!(service.model_type(), None);
    assert!(matches!(
        service.predict(&example_patient()),
        Err(super::PredictionError::ModelNotLoaded)
    ));

    let info = service.info();
    assert!(!info.model_loaded);
    assert!(info.model_type.is_none());
}

#[test]
fn test_batch_matches_sequential_predictions() {
    let service = test_service();
    let batch = patients();

    let together = service.predict_batch(&batch).unwrap();
    let one_by_one: Vec<_> = batch.iter().map(|p| service.predict(p).unwrap()).collect();

    assert_eq!(together, one_by_one);
    assert!(service.predict_batch(&[]).unwrap().is_empty());
}

#[test]
fn test_batch_fails_on_first_bad_record() {
    let service = test_service();
    let mut batch = patients();
    batch[3].smoking_history = "vaping".to_string();

    let err = service.predict_batch(&batch).unwrap_err();
    assert!(matches!(err, super::PredictionError::UnknownCategory { ref value, .. } if value == "vaping"));
}

#[test]
fn test_index_and_name_selection_predict_identically() {
    let by_index = test_service();
    let by_name = ModelService::new(artifacts_with(
        logistic_json(),
        FeatureSelection::new(None, Some(SELECTED_NAMES.iter().map(|s| s.to_string()).collect())),
    ));

    for patient in patients() {
        assert_eq!(by_index.predict(&patient).unwrap(), by_name.predict(&patient).unwrap());
    }
}

#[test]
fn test_label_only_classifier_reports_label_as_probability() {
    let service = ModelService::new(artifacts_with(
        json!({"model_type": "LinearSVC", "coef": [1.0, 0.6, 2.5, 1.1], "intercept": -4.5}),
        FeatureSelection::new(Some(SELECTED_INDICES.to_vec()), None),
    ));

    for patient in patients() {
        let prediction = service.predict(&patient).unwrap();
        assert_eq!(prediction.probability, f64::from(prediction.label));
    }
}

#[test]
fn test_width_mismatch_surfaces_from_classifier() {
    // Classifier expects four features but selection is missing: eight arrive
    let service = ModelService::new(artifacts_with(logistic_json(), FeatureSelection::default()));

    let err = service.predict(&example_patient()).unwrap_err();
    assert!(matches!(
        err,
        super::PredictionError::DimensionMismatch { stage: "classifier", expected: 4, actual: 8 }
    ));
    assert!(!err.is_client_error());
}

#[test]
fn test_forest_classifier_end_to_end() {
    // Splits on scaled HbA1c (column 2 of the selection)
    let tree = |threshold: f64| {
        json!({
            "nodes": [
                {"split": {"feature": 2, "threshold": threshold, "left": 1, "right": 2}},
                {"leaf": {"value": [90, 10]}},
                {"leaf": {"value": [20, 80]}}
            ],
            "n_features": 4
        })
    };
    let service = ModelService::new(artifacts_with(
        json!({"model_type": "RandomForestClassifier", "trees": [tree(0.5), tree(1.5)]}),
        FeatureSelection::new(Some(SELECTED_INDICES.to_vec()), None),
    ));

    assert_eq!(service.model_type(), Some("RandomForestClassifier"));

    // HbA1c 9.0 is far above both thresholds once scaled
    let sick = service.predict(&patients()[1]).unwrap();
    assert_eq!(sick.label, 1);
    assert!((sick.probability - 0.8).abs() < 1e-12);

    // HbA1c 3.5 stays left in both trees
    let healthy = service.predict(&patients()[2]).unwrap();
    assert_eq!(healthy.label, 0);
    assert!((healthy.probability - 0.1).abs() < 1e-12);
}

#[test]
fn test_info_describes_pipeline() {
    let info = test_service().info();

    assert!(info.model_loaded);
    assert_eq!(info.model_type, Some("LogisticRegression"));
    assert_eq!(info.supports_probability, Some(true));
    assert!(info.scaler_loaded);
    assert_eq!(info.input_width, Some(4));
    assert_eq!(info.feature_indices, Some(SELECTED_INDICES.to_vec()));
    assert_eq!(
        info.selected_features,
        Some(SELECTED_NAMES.iter().map(|s| s.to_string()).collect())
    );
    assert_eq!(info.encoders.unwrap()["gender"], vec!["Female", "Male", "Other"]);
}

// ============================================================================
// ARTIFACT LOADING
// ============================================================================

#[test]
fn test_load_full_artifact_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());

    let loaded = ModelService::load(dir.path(), true).unwrap();
    assert!(loaded.is_model_loaded());
    assert_eq!(loaded.model_type(), Some("LogisticRegression"));

    let in_memory = test_service();
    for patient in patients() {
        assert_eq!(loaded.predict(&patient).unwrap(), in_memory.predict(&patient).unwrap());
    }
}

#[test]
fn test_missing_classifier_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), SCALER_FILE, scaler_json());

    let err = ModelService::load(dir.path(), true).unwrap_err();
    assert!(matches!(err, super::ArtifactError::Missing(ref path) if path.ends_with(MODEL_FILE)));
}

#[test]
fn test_missing_classifier_tolerated_when_not_required() {
    let dir = tempfile::tempdir().unwrap();

    let service = ModelService::load(dir.path(), false).unwrap();
    assert!(!service.is_model_loaded());
    assert_eq!(service.model_type(), None);
}

#[test]
fn test_optional_artifacts_may_be_missing() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        MODEL_FILE,
        json!({"model_type": "LogisticRegression", "coef": [0.0, 0.02, 0.0, 0.0, 0.0, 0.01, 0.3, 0.01], "intercept": -4.0}),
    );
    write(dir.path(), ENCODERS_FILE, json!({
        "gender": {"classes": ["Female", "Male", "Other"]},
        "smoking_history": {"classes": ["No Info", "current", "ever", "former", "never", "not current"]}
    }));

    let service = ModelService::load(dir.path(), true).unwrap();
    let info = service.info();
    assert!(!info.scaler_loaded);
    assert_eq!(info.feature_indices, None);
    assert_eq!(info.input_width, Some(8));

    // unscaled, unselected row goes straight to the classifier
    let prediction = service.predict(&example_patient()).unwrap();
    let z: f64 = 0.02 * 45.0 + 0.01 * 25.5 + 0.3 * 5.7 + 0.01 * 140.0 - 4.0;
    assert!((prediction.probability - 1.0 / (1.0 + (-z).exp())).abs() < 1e-12);
}

#[test]
fn test_unsorted_encoder_classes_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    write(
        dir.path(),
        ENCODERS_FILE,
        json!({
            "gender": {"classes": ["Male", "Female", "Other"]},
            "smoking_history": {"classes": ["No Info", "current", "ever", "former", "never", "not current"]}
        }),
    );

    let err = ModelService::load(dir.path(), true).unwrap_err();
    assert!(
        matches!(err, super::ArtifactError::Invalid { ref path, ref reason }
            if path.ends_with(ENCODERS_FILE) && reason.contains("gender"))
    );
}

#[test]
fn test_missing_encoders_reject_categorical_input() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        MODEL_FILE,
        json!({"model_type": "LogisticRegression", "coef": vec![1.0; 8], "intercept": 0.0}),
    );

    let service = ModelService::load(dir.path(), true).unwrap();
    let err = service.predict(&example_patient()).unwrap_err();
    assert!(matches!(err, super::PredictionError::UnencodedCategory { ref column, .. } if column == "gender"));
}

#[test]
fn test_names_used_when_indices_missing() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    std::fs::remove_file(dir.path().join(FEATURE_INDICES_FILE)).unwrap();

    let service = ModelService::load(dir.path(), true).unwrap();
    assert_eq!(service.info().feature_indices, None);
    assert_eq!(
        service.predict(&example_patient()).unwrap(),
        test_service().predict(&example_patient()).unwrap()
    );
}

#[test]
fn test_corrupt_artifact_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    std::fs::write(dir.path().join(SCALER_FILE), b"not json").unwrap();

    let err = ModelService::load(dir.path(), true).unwrap_err();
    assert!(matches!(err, super::ArtifactError::Parse { .. }));
}

#[test]
fn test_structurally_invalid_classifier_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        MODEL_FILE,
        json!({"model_type": "DecisionTreeClassifier", "nodes": [{"split": {"feature": 0, "threshold": 1.0, "left": 0, "right": 0}}]}),
    );

    let err = ModelService::load(dir.path(), false).unwrap_err();
    assert!(matches!(err, super::ArtifactError::Invalid { .. }));
}
