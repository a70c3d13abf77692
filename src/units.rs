use crate::error::FormulaError;
use lazy_static::lazy_static;
use std::collections::BTreeMap;

lazy_static! {
    static ref STANDARD_TABLE: ConversionTable = ConversionTable::empty()
        .with_factor("cm", "m", 0.01)
        .with_factor("m", "cm", 100.0)
        .with_factor("kg", "lbs", 2.20462)
        .with_factor("lbs", "kg", 1.0 / 2.20462);
}

/// Directed unit conversion table.
///
/// Each `(from, to)` pair is its own entry: registering `cm -> m` says nothing
/// about `m -> cm`. The standard table only covers a few length and mass
/// pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversionTable {
    factors: BTreeMap<(String, String), f64>,
}

impl ConversionTable {
    /// A table with no entries. Only identity conversions succeed.
    pub fn empty() -> Self {
        ConversionTable {
            factors: BTreeMap::new(),
        }
    }

    /// The table shipped with the application.
    pub fn standard() -> Self {
        STANDARD_TABLE.clone()
    }

    /// Builder-style insert of one directed entry.
    pub fn with_factor(mut self, from: &str, to: &str, factor: f64) -> Self {
        self.insert(from, to, factor);
        self
    }

    pub fn insert(&mut self, from: &str, to: &str, factor: f64) {
        self.factors
            .insert((from.to_string(), to.to_string()), factor);
    }

    pub fn factor(&self, from: &str, to: &str) -> Option<f64> {
        self.factors
            .get(&(from.to_string(), to.to_string()))
            .copied()
    }

    /// Convert `value` expressed in `from` into `to`.
    ///
    /// Matching units short-circuit without a lookup.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, FormulaError> {
        if from == to {
            return Ok(value);
        }
        match self.factor(from, to) {
            Some(factor) => Ok(value * factor),
            None => Err(FormulaError::UnsupportedConversion {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    /// Entries in stable `(from, to)` order, used to inline the table into
    /// code previews.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.factors
            .iter()
            .map(|((from, to), factor)| (from.as_str(), to.as_str(), *factor))
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

/// Shared read-only view of the standard table.
pub fn standard_table() -> &'static ConversionTable {
    &STANDARD_TABLE
}

/// Convert with the standard table.
pub fn convert(value: f64, from: &str, to: &str) -> Result<f64, FormulaError> {
    STANDARD_TABLE.convert(value, from, to)
}

/// Units offered by the parameter unit picker, grouped by domain.
pub const UNIT_OPTIONS: &[&str] = &[
    // Length
    "m",
    "cm",
    "millimeters (mm)",
    "micrometers (µm)",
    "nanometers (nm)",
    "kilometers (km)",
    "feet (ft)",
    "inches (in)",
    "yards (yd)",
    "miles (mi)",
    // Weight
    "kg",
    "lbs",
    "kilograms (kg)",
    "grams (g)",
    "milligrams (mg)",
    "micrograms (µg)",
    "nanograms (ng)",
    "pounds (lbs)",
    "ounces (oz)",
    "stones (st)",
    // Volume
    "liters (L)",
    "milliliters (mL)",
    "microliters (µL)",
    "cubic centimeters (cm³)",
    "deciliters (dL)",
    "fluid ounces (fl oz)",
    "teaspoons (tsp)",
    "tablespoons (tbsp)",
    // Concentration
    "milligrams per deciliter (mg/dL)",
    "millimoles per liter (mmol/L)",
    "micromoles per liter (µmol/L)",
    "nanomoles per liter (nmol/L)",
    "grams per deciliter (g/dL)",
    "nanograms per milliliter (ng/mL)",
    "picograms per milliliter (pg/mL)",
    "micrograms per liter (µg/L)",
    "milliequivalents per liter (mEq/L)",
    "international units per liter (IU/L)",
    // Pressure
    "millimeters of mercury (mmHg)",
    "atmospheres (atm)",
    "kilopascals (kPa)",
    "centimeters of water (cmH₂O)",
    "pounds per square inch (psi)",
    // Time
    "seconds (s)",
    "milliseconds (ms)",
    "minutes (min)",
    "hours (h)",
    "days (d)",
    "weeks (wk)",
    "months (mo)",
    "years (yr)",
    // Temperature
    "Celsius (°C)",
    "Fahrenheit (°F)",
    "Kelvin (K)",
    // Energy
    "calories (cal)",
    "kilocalories (kcal)",
    "joules (J)",
    "kilojoules (kJ)",
    // Flow rate
    "liters per minute (L/min)",
    "milliliters per hour (mL/hr)",
    "drops per minute (drops/min)",
    // Body surface area
    "square centimeters (cm²)",
    "square meters (m²)",
    // Miscellaneous
    "percent (%)",
    "beats per minute (bpm)",
    "respirations per minute (resp/min)",
    "kilograms per square meter (kg/m²)",
    // Drug dosing
    "micrograms per kilogram (µg/kg)",
    "milligrams per kilogram (mg/kg)",
    "micrograms per kilogram per minute (µg/kg/min)",
    "milliliters per kilogram per minute (mL/kg/min)",
    // Cardiology
    "mL/beat (stroke volume)",
    "L/min/m² (cardiac index)",
    // Hematology
    "femtoliters (fL)",
    // Biochemistry
    "pH units",
    "milliosmoles per kilogram (mOsm/kg)",
];

/// Case-insensitive substring search over [`UNIT_OPTIONS`]. An empty query
/// returns the whole catalog.
pub fn search_unit_options(query: &str) -> Vec<&'static str> {
    let needle = query.to_lowercase();
    UNIT_OPTIONS
        .iter()
        .copied()
        .filter(|unit| unit.to_lowercase().contains(&needle))
        .collect()
}
