use crate::calculator::{ParamValue, Parameter};
use crate::error::FormulaError;
use crate::expression;
use crate::transform::to_evaluable;
use crate::units::ConversionTable;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

lazy_static! {
    static ref SYMBOL_REGEX: Regex = Regex::new(r"[A-Za-z]+").unwrap();
}

/// Test values keyed by parameter symbol.
pub type ParamValues = BTreeMap<String, ParamValue>;

/// Every stage of a successful evaluation, for display in the editor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    /// The formula after the evaluable-expression rewrite.
    pub expression: String,
    /// The expression with every symbol replaced by its converted value.
    pub substituted: String,
    /// Raw, unrounded result.
    pub result: f64,
}

/// Replace every alphabetic run in `expression` with the matching test value,
/// converted into the parameter's first declared unit.
///
/// Symbols that are not declared parameters keep the supplied unit. A run
/// with no supplied value fails the whole substitution.
pub fn substitute(
    expression: &str,
    parameters: &[Parameter],
    values: &ParamValues,
    table: &ConversionTable,
) -> Result<String, FormulaError> {
    let mut out = String::with_capacity(expression.len());
    let mut last = 0;

    for symbol in SYMBOL_REGEX.find_iter(expression) {
        out.push_str(&expression[last..symbol.start()]);
        last = symbol.end();

        let Some(supplied) = values.get(symbol.as_str()) else {
            return Err(FormulaError::MissingParameter(symbol.as_str().to_string()));
        };
        let target = parameters
            .iter()
            .find(|p| p.symbol == symbol.as_str())
            .and_then(Parameter::target_unit)
            .unwrap_or(supplied.unit.as_str());

        let converted = table.convert(supplied.value, &supplied.unit, target)?;
        if converted < 0.0 {
            out.push_str(&format!("({})", converted));
        } else {
            out.push_str(&converted.to_string());
        }
    }
    out.push_str(&expression[last..]);

    Ok(out)
}

/// Rewrite, substitute and evaluate an author-entered formula.
///
/// ```
/// use medcalc::calculator::{ParamValue, Parameter};
/// use medcalc::evaluator::{ParamValues, evaluate_formula};
/// use medcalc::units::ConversionTable;
///
/// let params = vec![Parameter::new("Weight", "w", &["kg"]), Parameter::new("Height", "h", &["m"])];
/// let mut values = ParamValues::new();
/// values.insert("w".into(), ParamValue::new(70.0, "kg"));
/// values.insert("h".into(), ParamValue::new(175.0, "cm"));
///
/// let eval = evaluate_formula(r"\frac{w}{h^{2}}", &params, &values, &ConversionTable::standard()).unwrap();
/// assert!((eval.result - 22.857).abs() < 0.001);
/// ```
pub fn evaluate_formula(
    formula: &str,
    parameters: &[Parameter],
    values: &ParamValues,
    table: &ConversionTable,
) -> Result<Evaluation, FormulaError> {
    let expression = to_evaluable(formula);
    let substituted = substitute(&expression, parameters, values, table)?;
    let result = expression::evaluate(&substituted)?;

    log::debug!("evaluated '{}' as '{}' = {}", formula, substituted, result);

    Ok(Evaluation {
        expression,
        substituted,
        result,
    })
}
