use mindtrack_core::ids::{QuestionId, ResponseId, ScoringSystemId};
use mindtrack_core::models::catalog::Catalog;
use mindtrack_core::models::questionnaire::{Question, QuestionType};
use mindtrack_core::models::response::Answer;
use mindtrack_core::models::score::{AdditionalData, ResponseScore};
use mindtrack_core::models::scoring::{RangeBasis, ScoreRule, ScoringSystem, ScoringType};
use serde_json::json;

fn question(question_type: QuestionType, category: Option<&str>) -> Question {
    Question {
        id: QuestionId(1),
        question_type,
        text: "How are you?".to_string(),
        category: category.map(str::to_string),
        choices: vec![],
    }
}

fn answer_with_value(value: serde_json::Value) -> Answer {
    Answer {
        question: question(QuestionType::Number, None),
        selected_choice: None,
        multiple_choices: vec![],
        value: Some(value),
    }
}

#[test]
fn scoring_type_parses_every_known_strategy() {
    for scoring_type in ScoringType::ALL {
        let parsed: ScoringType = serde_json::from_value(json!(scoring_type.as_str())).unwrap();
        assert_eq!(parsed, scoring_type);
    }
}

#[test]
fn unrecognised_scoring_type_becomes_unknown() {
    let parsed: ScoringType = serde_json::from_value(json!("bayesian")).unwrap();
    assert_eq!(parsed, ScoringType::Unknown);
}

#[test]
fn unrecognised_question_type_becomes_other() {
    let parsed: QuestionType = serde_json::from_value(json!("date")).unwrap();
    assert_eq!(parsed, QuestionType::Other);
    assert_eq!(parsed.to_string(), "other");
}

#[test]
fn question_type_displays_its_wire_name() {
    for name in ["single_choice", "multiple_choice", "number", "scale", "text", "textarea"] {
        let parsed: QuestionType = serde_json::from_value(json!(name)).unwrap();
        assert_eq!(parsed.to_string(), name);
    }
}

#[test]
fn scoring_system_defaults() {
    let system: ScoringSystem = serde_json::from_value(json!({
        "id": 4,
        "questionnaire_id": 1,
        "name": "Clinical",
        "scoring_type": "range_based"
    }))
    .unwrap();

    assert!(system.is_active);
    assert!(!system.is_default);
    assert_eq!(system.range_basis, RangeBasis::SimpleSum);
    assert!(system.formula.is_none());
}

#[test]
fn score_rule_defaults_weight_to_one() {
    let rule: ScoreRule = serde_json::from_value(json!({
        "id": 1,
        "scoring_system_id": 4,
        "question_id": 9
    }))
    .unwrap();

    assert_eq!(rule.weight, 1.0);
    assert!(!rule.text_score_enabled);
    assert!(rule.conditional_logic.is_none());
}

#[test]
fn blank_category_falls_back_to_general() {
    assert_eq!(question(QuestionType::Text, None).category_or_default(), "general");
    assert_eq!(question(QuestionType::Text, Some("  ")).category_or_default(), "general");
    assert_eq!(question(QuestionType::Text, Some("sleep")).category_or_default(), "sleep");
}

#[test]
fn numeric_value_accepts_numbers_and_numeric_strings() {
    assert_eq!(answer_with_value(json!(7)).numeric_value(), Some(7.0));
    assert_eq!(answer_with_value(json!(" 2.5 ")).numeric_value(), Some(2.5));
    assert_eq!(answer_with_value(json!("often")).numeric_value(), None);
    assert_eq!(answer_with_value(json!(true)).numeric_value(), None);
}

#[test]
fn ids_parse_from_strings() {
    assert_eq!("12".parse::<ScoringSystemId>().unwrap(), ScoringSystemId(12));
    assert!("twelve".parse::<ScoringSystemId>().is_err());

    let id = ResponseId::new();
    assert_eq!(id.to_string().parse::<ResponseId>().unwrap(), id);
}

#[test]
fn active_systems_put_the_default_first() {
    let catalog: Catalog = serde_json::from_value(json!({
        "questionnaires": [{ "id": 1, "title": "Intake" }],
        "scoring_systems": [
            { "system": {
                "id": 1, "questionnaire_id": 1, "name": "Engagement", "scoring_type": "simple_sum"
            } },
            { "system": {
                "id": 2, "questionnaire_id": 1, "name": "Clinical", "scoring_type": "weighted",
                "is_default": true
            } },
            { "system": {
                "id": 3, "questionnaire_id": 1, "name": "Retired", "scoring_type": "weighted",
                "is_active": false
            } },
            { "system": {
                "id": 4, "questionnaire_id": 2, "name": "Other", "scoring_type": "weighted"
            } }
        ]
    }))
    .unwrap();

    let ids: Vec<u64> = catalog
        .active_systems_for(mindtrack_core::ids::QuestionnaireId(1))
        .iter()
        .map(|d| d.system.id.0)
        .collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn non_finite_score_fields_are_named() {
    let mut score = ResponseScore {
        response_id: ResponseId::new(),
        scoring_system_id: ScoringSystemId(1),
        raw_score: 12.0,
        score_range: None,
        z_score: Some(0.5),
        percentile: Some(69.15),
        additional_data: AdditionalData::default(),
        notes: String::new(),
        calculated_at: jiff::Timestamp::UNIX_EPOCH,
    };
    assert_eq!(score.non_finite_field(), None);

    score
        .additional_data
        .subscales
        .insert("anxiety".to_string(), f64::INFINITY);
    assert_eq!(score.non_finite_field(), Some("subscales"));

    score.z_score = Some(f64::NAN);
    assert_eq!(score.non_finite_field(), Some("z_score"));

    score.raw_score = f64::NEG_INFINITY;
    assert_eq!(score.non_finite_field(), Some("raw_score"));
}
