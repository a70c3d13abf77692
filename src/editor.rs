//! The calculator authoring form.
//!
//! The whole screen is one [`EditorState`] value. Each user action is an
//! [`EditorEvent`] fed to [`update`], which returns the next state; nothing
//! else mutates it. Store calls happen only in [`load`] and [`submit`].

use crate::calculator::{CalculatorForm, Parameter};
use crate::error::{EditorError, StoreError, ValidationError};
use crate::evaluator::{ParamValues, evaluate_formula};
use crate::preview::{Previews, render_previews};
use crate::store::CalculatorStore;
use crate::transform::insert_symbol;
use crate::units::{ConversionTable, search_unit_options, standard_table};

/// Create when the route carries no id, update otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EditorMode {
    #[default]
    Create,
    Update(String),
}

impl EditorMode {
    pub fn from_route(id: Option<&str>) -> Self {
        match id {
            Some(id) if !id.is_empty() => EditorMode::Update(id.to_string()),
            _ => EditorMode::Create,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            EditorMode::Create => "Create Calculator",
            EditorMode::Update(_) => "Update Calculator",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorState {
    pub mode: EditorMode,
    pub form: CalculatorForm,
    /// Parameter being composed before it is added to the form.
    pub new_parameter: Parameter,
    pub new_tag: String,
    pub unit_query: String,
    /// Cursor position in the formula text after the last insertion.
    pub cursor: usize,
    pub param_values: ParamValues,
    pub test_result: Option<f64>,
    pub test_error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    SetName(String),
    SetShortDescription(String),
    SetLongDescription(String),
    SetPopular(bool),
    SetRecentlyAdded(bool),
    SetAdditionalField(String),
    SetWhyToUse(String),
    SetWhereToUse(String),
    SetFormula(String),
    SetMedicalEvidences(String),
    SetNewTag(String),
    AddTag,
    RemoveTag(String),
    SetNewParameterName(String),
    SetNewParameterSymbol(String),
    ToggleNewParameterUnit(String),
    AddParameter,
    UpdateParameter {
        index: usize,
        name: Option<String>,
        symbol: Option<String>,
        units: Option<Vec<String>>,
    },
    RemoveParameter(usize),
    SetUnitQuery(String),
    /// Replace the `start..end` selection of the formula with `symbol`.
    InsertSymbol {
        start: usize,
        end: usize,
        symbol: String,
    },
    SetParamValue {
        symbol: String,
        value: f64,
    },
    SetParamUnit {
        symbol: String,
        unit: String,
    },
    EvaluateFormula,
    /// Replace the form with a record fetched from the store.
    Loaded(CalculatorForm),
}

impl EditorState {
    pub fn new(mode: EditorMode) -> Self {
        EditorState {
            mode,
            ..Default::default()
        }
    }

    pub fn filtered_units(&self) -> Vec<&'static str> {
        search_unit_options(&self.unit_query)
    }

    pub fn previews(&self, table: &ConversionTable) -> Previews {
        render_previews(
            &self.form.name,
            &self.form.parameters,
            &self.form.formula,
            table,
        )
    }
}

/// Apply one event using the standard conversion table.
pub fn update(state: EditorState, event: EditorEvent) -> EditorState {
    update_with(state, event, standard_table())
}

pub fn update_with(
    mut state: EditorState,
    event: EditorEvent,
    table: &ConversionTable,
) -> EditorState {
    match event {
        EditorEvent::SetName(v) => state.form.name = v,
        EditorEvent::SetShortDescription(v) => state.form.short_description = v,
        EditorEvent::SetLongDescription(v) => state.form.long_description = v,
        EditorEvent::SetPopular(v) => state.form.category.popular = v,
        EditorEvent::SetRecentlyAdded(v) => state.form.category.recently_added = v,
        EditorEvent::SetAdditionalField(v) => state.form.additional_field = v,
        EditorEvent::SetWhyToUse(v) => state.form.why_to_use = v,
        EditorEvent::SetWhereToUse(v) => state.form.where_to_use = v,
        EditorEvent::SetFormula(v) => {
            state.cursor = v.len();
            state.form.formula = v;
        }
        EditorEvent::SetMedicalEvidences(v) => state.form.medical_evidences = v,
        EditorEvent::SetNewTag(v) => state.new_tag = v,
        EditorEvent::AddTag => {
            if !state.new_tag.is_empty() && !state.form.speciality_tags.contains(&state.new_tag) {
                let tag = std::mem::take(&mut state.new_tag);
                state.form.speciality_tags.push(tag);
            }
        }
        EditorEvent::RemoveTag(tag) => state.form.speciality_tags.retain(|t| *t != tag),
        EditorEvent::SetNewParameterName(v) => state.new_parameter.name = v,
        EditorEvent::SetNewParameterSymbol(v) => state.new_parameter.symbol = v,
        EditorEvent::ToggleNewParameterUnit(unit) => {
            let units = &mut state.new_parameter.units;
            if units.contains(&unit) {
                units.retain(|u| *u != unit);
            } else {
                units.push(unit);
            }
        }
        EditorEvent::AddParameter => {
            let p = &state.new_parameter;
            if !p.name.is_empty() && !p.symbol.is_empty() && !p.units.is_empty() {
                let param = std::mem::take(&mut state.new_parameter);
                state.form.parameters.push(param);
            }
        }
        EditorEvent::UpdateParameter {
            index,
            name,
            symbol,
            units,
        } => {
            if let Some(param) = state.form.parameters.get_mut(index) {
                if let Some(name) = name {
                    param.name = name;
                }
                if let Some(symbol) = symbol {
                    param.symbol = symbol;
                }
                if let Some(units) = units {
                    param.units = units;
                }
            }
        }
        EditorEvent::RemoveParameter(index) => {
            if index < state.form.parameters.len() {
                state.form.parameters.remove(index);
            }
        }
        EditorEvent::SetUnitQuery(v) => state.unit_query = v,
        EditorEvent::InsertSymbol { start, end, symbol } => {
            let (formula, cursor) = insert_symbol(&state.form.formula, start, end, &symbol);
            state.form.formula = formula;
            state.cursor = cursor;
        }
        EditorEvent::SetParamValue { symbol, value } => {
            state.param_values.entry(symbol).or_default().value = value;
        }
        EditorEvent::SetParamUnit { symbol, unit } => {
            state.param_values.entry(symbol).or_default().unit = unit;
        }
        EditorEvent::EvaluateFormula => {
            match evaluate_formula(
                &state.form.formula,
                &state.form.parameters,
                &state.param_values,
                table,
            ) {
                Ok(evaluation) => {
                    state.test_result = Some(evaluation.result);
                    state.test_error = None;
                }
                Err(e) => {
                    state.test_result = None;
                    state.test_error = Some(e.to_string());
                }
            }
        }
        EditorEvent::Loaded(form) => state.form = form,
    }
    state
}

/// Check every required field, reporting all blanks at once.
pub fn validate(form: &CalculatorForm) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    let required = [
        ("name", &form.name),
        ("shortDescription", &form.short_description),
        ("longDescription", &form.long_description),
        ("additionalField", &form.additional_field),
        ("whyToUse", &form.why_to_use),
        ("whereToUse", &form.where_to_use),
        ("formula", &form.formula),
        ("medicalEvidences", &form.medical_evidences),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            missing.push(field.to_string());
        }
    }

    if form.parameters.is_empty() {
        missing.push("parameters".to_string());
    }
    for (index, param) in form.parameters.iter().enumerate() {
        if !param.is_complete() {
            missing.push(format!("parameters[{}]", index));
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

/// Fetch the record named by the route, if any, into a fresh editor.
///
/// An unknown id leaves the form empty but keeps Update mode, so a save
/// writes the document under that id.
pub async fn load(store: &dyn CalculatorStore, id: Option<&str>) -> Result<EditorState, StoreError> {
    let mode = EditorMode::from_route(id);
    let state = EditorState::new(mode.clone());

    let EditorMode::Update(id) = mode else {
        return Ok(state);
    };

    match store.get(&id).await {
        Ok(Some(doc)) => {
            let form = CalculatorForm::from_document(&id, doc)?;
            Ok(update(state, EditorEvent::Loaded(form)))
        }
        Ok(None) => {
            log::error!("No such calculator found: {}", id);
            Ok(state)
        }
        Err(e) => {
            log::error!("Error fetching calculator details: {}", e);
            Err(e)
        }
    }
}

/// Validate and persist the form: one `create` in Create mode, one merging
/// `update` in Update mode. A form that fails validation never reaches the
/// store. Returns the record id.
pub async fn submit(
    store: &dyn CalculatorStore,
    mode: &EditorMode,
    form: &CalculatorForm,
) -> Result<String, EditorError> {
    validate(form)?;

    let doc = form.to_document();
    let result = match mode {
        EditorMode::Create => store.create(doc).await,
        EditorMode::Update(id) => store.update(id, doc).await.map(|_| id.clone()),
    };

    match result {
        Ok(id) => {
            log::info!("Calculator saved: {} ({})", form.name, id);
            Ok(id)
        }
        Err(e) => {
            log::error!("Error saving calculator: {}", e);
            Err(EditorError::Store(e))
        }
    }
}

