use crate::error::StoreError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A raw stored document: the calculator fields without the id.
pub type Document = Map<String, Value>;

/// Decode a `null` field as the type's default, the same as an absent one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Named, symbol-addressable formula input.
///
/// `units[0]` is the unit the formula expects; test values supplied in any
/// other unit are converted into it before evaluation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(deserialize_with = "null_as_default")]
    pub units: Vec<String>,
}

impl Parameter {
    pub fn new(name: &str, symbol: &str, units: &[&str]) -> Self {
        Parameter {
            name: name.to_string(),
            symbol: symbol.to_string(),
            units: units.iter().map(|u| u.to_string()).collect(),
        }
    }

    pub fn target_unit(&self) -> Option<&str> {
        self.units.first().map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.symbol.trim().is_empty() && !self.units.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    #[serde(deserialize_with = "null_as_default")]
    pub popular: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub recently_added: bool,
}

/// The persisted body of a calculator.
///
/// Every field has a default, so documents written by older versions of the
/// app (or by hand) load with empty strings and lists instead of failing.
/// A field stored as `null` loads the same way.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatorForm {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub short_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub long_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: Category,
    #[serde(deserialize_with = "null_as_default")]
    pub speciality_tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub additional_field: String,
    #[serde(deserialize_with = "null_as_default")]
    pub why_to_use: String,
    #[serde(deserialize_with = "null_as_default")]
    pub where_to_use: String,
    #[serde(deserialize_with = "null_as_default")]
    pub parameters: Vec<Parameter>,
    /// Raw author-entered formula text, never the transformed expression.
    #[serde(deserialize_with = "null_as_default")]
    pub formula: String,
    #[serde(deserialize_with = "null_as_default")]
    pub medical_evidences: String,
}

impl CalculatorForm {
    /// Decode a stored document, defaulting absent fields.
    pub fn from_document(id: &str, doc: Document) -> Result<Self, StoreError> {
        serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Malformed {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Full document with every persisted field present.
    pub fn to_document(&self) -> Document {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // a struct of strings, bools and vectors always serializes to an object
            _ => Map::new(),
        }
    }

    pub fn parameter(&self, symbol: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.symbol == symbol)
    }
}

/// A calculator as read back from the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatorRecord {
    pub id: String,
    #[serde(flatten)]
    pub form: CalculatorForm,
}

impl CalculatorRecord {
    pub fn from_document(id: &str, doc: Document) -> Result<Self, StoreError> {
        Ok(CalculatorRecord {
            id: id.to_string(),
            form: CalculatorForm::from_document(id, doc)?,
        })
    }
}

/// A test value typed by the author in the editor. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamValue {
    pub value: f64,
    pub unit: String,
}

impl ParamValue {
    pub fn new(value: f64, unit: &str) -> Self {
        ParamValue {
            value,
            unit: unit.to_string(),
        }
    }
}
