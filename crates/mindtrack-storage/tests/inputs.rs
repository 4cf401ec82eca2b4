use mindtrack_core::ids::{QuestionnaireId, ScoringSystemId};
use mindtrack_core::models::scoring::ScoringType;
use mindtrack_storage::error::StorageError;
use mindtrack_storage::inputs::{load_catalog, load_responses};

#[test]
fn loads_catalog_and_responses() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.json");
    let responses_path = dir.path().join("responses.json");

    std::fs::write(
        &catalog_path,
        r#"{
            "questionnaires": [{"id": 1, "title": "PHQ", "questions": [
                {"id": 1, "question_type": "scale", "text": "Mood"}
            ]}],
            "scoring_systems": [{
                "system": {
                    "id": 5, "questionnaire_id": 1, "name": "Total", "scoring_type": "simple_sum"
                },
                "rules": [{"id": 1, "scoring_system_id": 5, "question_id": 1}]
            }]
        }"#,
    )
    .unwrap();
    std::fs::write(
        &responses_path,
        r#"[{
            "id": "7d3c5a7e-2f5e-4b53-9f55-8f2d8c1a0b11",
            "questionnaire_id": 1,
            "answers": [{
                "question": {"id": 1, "question_type": "scale", "text": "Mood"},
                "value": 3
            }]
        }]"#,
    )
    .unwrap();

    let catalog = load_catalog(&catalog_path).unwrap();
    assert_eq!(catalog.questionnaires[0].id, QuestionnaireId(1));
    let definition = catalog.system(ScoringSystemId(5)).unwrap();
    assert_eq!(definition.system.scoring_type, ScoringType::SimpleSum);
    assert_eq!(definition.rules[0].weight, 1.0);

    let responses = load_responses(&responses_path).unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].answers[0].numeric_value(), Some(3.0));
}

#[test]
fn missing_input_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.json");
    match load_catalog(&path) {
        Err(StorageError::NotFound { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected NotFound, got {other:?}"),
    }
}
