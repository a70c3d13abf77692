//! Editor reducer, validation and submit tests

use async_trait::async_trait;
use medcalc::calculator::{CalculatorForm, Category, Document, Parameter};
use medcalc::editor::{
    self, EditorEvent, EditorMode, EditorState, submit, update, validate,
};
use medcalc::error::{EditorError, StoreError};
use medcalc::store::{CalculatorStore, MemoryStore};
use std::sync::Mutex;

/// Store that records every call and hands out fixed ids.
#[derive(Default)]
struct RecordingStore {
    calls: Mutex<Vec<(String, Option<String>, Document)>>,
    fail: bool,
}

impl RecordingStore {
    fn failing() -> Self {
        RecordingStore {
            fail: true,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(String, Option<String>, Document)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, id: Option<&str>, doc: Document) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), id.map(String::from), doc));
        if self.fail {
            return Err(StoreError::Io(std::io::Error::other("unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl CalculatorStore for RecordingStore {
    async fn create(&self, doc: Document) -> Result<String, StoreError> {
        self.record("create", None, doc)?;
        Ok("new-id".to_string())
    }

    async fn get(&self, _id: &str) -> Result<Option<Document>, StoreError> {
        Ok(None)
    }

    async fn update(&self, id: &str, patch: Document) -> Result<(), StoreError> {
        self.record("update", Some(id), patch)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.record("delete", Some(id), Document::new())
    }

    async fn list_all(&self) -> Result<Vec<(String, Document)>, StoreError> {
        Ok(Vec::new())
    }
}

fn complete_form() -> CalculatorForm {
    CalculatorForm {
        name: "BMI".to_string(),
        short_description: "Body mass index".to_string(),
        long_description: "Weight relative to height squared".to_string(),
        category: Category {
            popular: true,
            recently_added: false,
        },
        speciality_tags: vec!["Nutrition".to_string()],
        additional_field: "Adults only".to_string(),
        why_to_use: "Screening".to_string(),
        where_to_use: "Primary care".to_string(),
        parameters: vec![
            Parameter::new("Weight", "w", &["kg", "lbs"]),
            Parameter::new("Height", "h", &["m", "cm"]),
        ],
        formula: r"\frac{w}{h^{2}}".to_string(),
        medical_evidences: "WHO".to_string(),
    }
}

#[test]
fn test_mode_from_route() {
    assert_eq!(EditorMode::from_route(None), EditorMode::Create);
    assert_eq!(EditorMode::from_route(Some("")), EditorMode::Create);
    assert_eq!(
        EditorMode::from_route(Some("abc")),
        EditorMode::Update("abc".to_string())
    );
    assert_eq!(EditorMode::Create.heading(), "Create Calculator");
}

#[test]
fn test_text_fields_and_flags() {
    let mut state = EditorState::new(EditorMode::Create);
    state = update(state, EditorEvent::SetName("BMI".into()));
    state = update(state, EditorEvent::SetShortDescription("short".into()));
    state = update(state, EditorEvent::SetPopular(true));
    state = update(state, EditorEvent::SetRecentlyAdded(true));
    state = update(state, EditorEvent::SetPopular(false));

    assert_eq!(state.form.name, "BMI");
    assert_eq!(state.form.short_description, "short");
    assert!(!state.form.category.popular);
    assert!(state.form.category.recently_added);
}

#[test]
fn test_update_leaves_input_untouched() {
    let before = EditorState::new(EditorMode::Create);
    let after = update(before.clone(), EditorEvent::SetName("x".into()));
    assert_eq!(before.form.name, "");
    assert_eq!(after.form.name, "x");
}

#[test]
fn test_tags() {
    let mut state = EditorState::default();
    for tag in ["Cardiology", "Cardiology", ""] {
        state = update(state, EditorEvent::SetNewTag(tag.into()));
        state = update(state, EditorEvent::AddTag);
    }
    assert_eq!(state.form.speciality_tags, vec!["Cardiology"]);
    assert_eq!(state.new_tag, "");

    state = update(state, EditorEvent::RemoveTag("Cardiology".into()));
    assert!(state.form.speciality_tags.is_empty());
}

#[test]
fn test_add_parameter_requires_all_parts() {
    let mut state = EditorState::default();
    state = update(state, EditorEvent::SetNewParameterName("Weight".into()));
    state = update(state, EditorEvent::SetNewParameterSymbol("w".into()));
    state = update(state, EditorEvent::AddParameter);
    assert!(state.form.parameters.is_empty(), "no unit selected yet");

    state = update(state, EditorEvent::ToggleNewParameterUnit("kg".into()));
    state = update(state, EditorEvent::ToggleNewParameterUnit("lbs".into()));
    state = update(state, EditorEvent::ToggleNewParameterUnit("lbs".into()));
    state = update(state, EditorEvent::AddParameter);

    assert_eq!(state.form.parameters, vec![Parameter::new("Weight", "w", &["kg"])]);
    assert_eq!(state.new_parameter, Parameter::default());
}

#[test]
fn test_edit_and_remove_parameter() {
    let mut state = update(EditorState::default(), EditorEvent::Loaded(complete_form()));
    state = update(
        state,
        EditorEvent::UpdateParameter {
            index: 1,
            name: None,
            symbol: Some("ht".into()),
            units: Some(vec!["cm".into()]),
        },
    );
    assert_eq!(state.form.parameters[1], Parameter::new("Height", "ht", &["cm"]));

    state = update(state, EditorEvent::RemoveParameter(0));
    state = update(state, EditorEvent::RemoveParameter(5));
    assert_eq!(state.form.parameters.len(), 1);
    assert_eq!(state.form.parameters[0].symbol, "ht");
}

#[test]
fn test_insert_symbol_moves_cursor() {
    let mut state = update(EditorState::default(), EditorEvent::SetFormula("w".into()));
    assert_eq!(state.cursor, 1);

    state = update(
        state,
        EditorEvent::InsertSymbol {
            start: 1,
            end: 1,
            symbol: " \\times ".into(),
        },
    );
    assert_eq!(state.form.formula, "w \\times ");
    assert_eq!(state.cursor, 9);
}

#[test]
fn test_unit_query_filters_catalog() {
    let state = update(EditorState::default(), EditorEvent::SetUnitQuery("mmhg".into()));
    assert_eq!(state.filtered_units(), vec!["millimeters of mercury (mmHg)"]);
}

#[test]
fn test_evaluate_sets_and_clears_result() {
    let mut state = update(EditorState::default(), EditorEvent::Loaded(complete_form()));
    state = update(state, EditorEvent::SetParamValue { symbol: "w".into(), value: 70.0 });
    state = update(state, EditorEvent::SetParamUnit { symbol: "w".into(), unit: "kg".into() });
    state = update(state, EditorEvent::EvaluateFormula);

    assert_eq!(state.test_result, None);
    let error = state.test_error.clone().unwrap();
    assert!(error.to_lowercase().contains("missing value for parameter: h"));

    state = update(state, EditorEvent::SetParamValue { symbol: "h".into(), value: 175.0 });
    state = update(state, EditorEvent::SetParamUnit { symbol: "h".into(), unit: "cm".into() });
    state = update(state, EditorEvent::EvaluateFormula);

    assert!((state.test_result.unwrap() - 22.857).abs() < 0.001);
    assert_eq!(state.test_error, None);
}

#[test]
fn test_previews_follow_form() {
    let state = update(EditorState::default(), EditorEvent::Loaded(complete_form()));
    let previews = state.previews(&medcalc::units::ConversionTable::standard());
    assert_eq!(previews.evaluable, "(w) / (h**2)");
    assert!(previews.swift.contains("static func bmi("));
}

#[test]
fn test_validate_complete_form() {
    assert!(validate(&complete_form()).is_ok());
}

#[test]
fn test_validate_reports_every_blank() {
    let mut form = complete_form();
    form.why_to_use = "   ".to_string();
    form.formula = String::new();
    form.parameters[1].units.clear();

    let err = validate(&form).unwrap_err();
    assert_eq!(err.missing, vec!["whyToUse", "formula", "parameters[1]"]);
    assert_eq!(
        err.to_string(),
        "Missing required fields: whyToUse, formula, parameters[1]"
    );

    form.parameters.clear();
    assert!(validate(&form).unwrap_err().missing.contains(&"parameters".to_string()));
}

#[tokio::test]
async fn test_submit_create_writes_all_fields_once() {
    let store = RecordingStore::default();
    let id = submit(&store, &EditorMode::Create, &complete_form()).await.unwrap();
    assert_eq!(id, "new-id");

    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    let (op, target, doc) = &calls[0];
    assert_eq!(op, "create");
    assert_eq!(target, &None);
    for field in [
        "name",
        "shortDescription",
        "longDescription",
        "category",
        "specialityTags",
        "additionalField",
        "whyToUse",
        "whereToUse",
        "parameters",
        "formula",
        "medicalEvidences",
    ] {
        assert!(doc.contains_key(field), "missing {}", field);
    }
    assert_eq!(doc.len(), 11);
    assert_eq!(doc["formula"], r"\frac{w}{h^{2}}");
    assert_eq!(doc["category"]["popular"], true);
}

#[tokio::test]
async fn test_submit_update_targets_route_id() {
    let store = RecordingStore::default();
    let mode = EditorMode::Update("abc".to_string());
    let id = submit(&store, &mode, &complete_form()).await.unwrap();
    assert_eq!(id, "abc");

    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "update");
    assert_eq!(calls[0].1.as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_submit_blank_field_never_reaches_store() {
    let store = RecordingStore::default();
    let mut form = complete_form();
    form.name.clear();

    let err = submit(&store, &EditorMode::Create, &form).await.unwrap_err();
    assert!(matches!(err, EditorError::Validation(ref v) if v.missing == vec!["name"]));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_submit_store_failure() {
    let store = RecordingStore::failing();
    let err = submit(&store, &EditorMode::Create, &complete_form())
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Store(_)));
    assert_eq!(store.calls().len(), 1);
}

#[tokio::test]
async fn test_load_existing_and_unknown() {
    let store = MemoryStore::new();
    let id = store.create(complete_form().to_document()).await.unwrap();

    let state = editor::load(&store, Some(&id)).await.unwrap();
    assert_eq!(state.mode, EditorMode::Update(id.clone()));
    assert_eq!(state.form, complete_form());

    let state = editor::load(&store, Some("missing")).await.unwrap();
    assert_eq!(state.mode, EditorMode::Update("missing".to_string()));
    assert_eq!(state.form, CalculatorForm::default());

    let state = editor::load(&store, None).await.unwrap();
    assert_eq!(state.mode, EditorMode::Create);
}

#[tokio::test]
async fn test_create_then_update_round_trip() {
    let store = MemoryStore::new();
    let id = submit(&store, &EditorMode::Create, &complete_form()).await.unwrap();

    let mut state = editor::load(&store, Some(&id)).await.unwrap();
    state = update(state, EditorEvent::SetName("Body Mass Index".into()));
    submit(&store, &state.mode, &state.form).await.unwrap();

    let reloaded = editor::load(&store, Some(&id)).await.unwrap();
    assert_eq!(reloaded.form.name, "Body Mass Index");
    assert_eq!(reloaded.form.parameters.len(), 2);
}
