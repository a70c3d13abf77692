//! Swift and Java renderings of a formula for developers porting a calculator
//! into the mobile apps. The snippets are documentation only; nothing here is
//! compiled or executed.

use crate::calculator::Parameter;
use crate::transform::{DIV_REGEX, FRACTION_REGEX, Rule, TIMES_REGEX, apply_rules, to_evaluable};
use crate::units::ConversionTable;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;

lazy_static! {
    static ref SQRT_REGEX: Regex = Regex::new(r"\\sqrt\{([^{}]*)\}").unwrap();
    static ref POWER_BRACED_REGEX: Regex =
        Regex::new(r"([A-Za-z0-9_.]+|\([^()]*\))\^\{([^{}]*)\}").unwrap();
    static ref POWER_BARE_REGEX: Regex =
        Regex::new(r"([A-Za-z0-9_.]+|\([^()]*\))\^([A-Za-z0-9_.]+)").unwrap();
    static ref WORD_REGEX: Regex = Regex::new(r"(\\?)([A-Za-z]+)").unwrap();
}

/// All three renderings of one formula.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Previews {
    pub evaluable: String,
    pub swift: String,
    pub java: String,
}

pub fn render_previews(
    calculator_name: &str,
    parameters: &[Parameter],
    formula: &str,
    table: &ConversionTable,
) -> Previews {
    Previews {
        evaluable: to_evaluable(formula),
        swift: swift_code(calculator_name, parameters, formula, table),
        java: java_code(calculator_name, parameters, formula, table),
    }
}

/// `"Body Mass-Index"` -> `"bodyMassIndex"`.
///
/// Non-alphanumerics act as word breaks. An empty result falls back to
/// `calculate` so the generated signature stays well formed.
pub fn to_camel_case(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();

    let joined: String = spaced
        .split(' ')
        .enumerate()
        .map(|(index, word)| {
            if index == 0 {
                word.to_lowercase()
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            }
        })
        .collect();

    if joined.is_empty() {
        "calculate".to_string()
    } else {
        joined
    }
}

/// Point declared symbols at their `<symbol>Converted` locals. LaTeX command
/// names (`\frac`, `\times`, ...) are never renamed.
fn rename_symbols(formula: &str, parameters: &[Parameter]) -> String {
    WORD_REGEX
        .replace_all(formula, |caps: &Captures| {
            let word = &caps[2];
            if caps[1].is_empty() && parameters.iter().any(|p| p.symbol == word) {
                format!("{}Converted", word)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

pub fn swift_formula(formula: &str, parameters: &[Parameter]) -> String {
    apply_rules(
        &rename_symbols(formula, parameters),
        &[
            Rule { pattern: &FRACTION_REGEX, replacement: "($1) / ($2)" },
            Rule { pattern: &SQRT_REGEX, replacement: "sqrt($1)" },
            Rule { pattern: &POWER_BRACED_REGEX, replacement: "pow($1, $2)" },
            Rule { pattern: &POWER_BARE_REGEX, replacement: "pow($1, $2)" },
            Rule { pattern: &TIMES_REGEX, replacement: "*" },
            Rule { pattern: &DIV_REGEX, replacement: "/" },
        ],
    )
}

pub fn java_formula(formula: &str, parameters: &[Parameter]) -> String {
    apply_rules(
        &rename_symbols(formula, parameters),
        &[
            Rule { pattern: &FRACTION_REGEX, replacement: "($1) / ($2)" },
            Rule { pattern: &SQRT_REGEX, replacement: "Math.sqrt($1)" },
            Rule { pattern: &POWER_BRACED_REGEX, replacement: "Math.pow($1, $2)" },
            Rule { pattern: &POWER_BARE_REGEX, replacement: "Math.pow($1, $2)" },
            Rule { pattern: &TIMES_REGEX, replacement: "*" },
            Rule { pattern: &DIV_REGEX, replacement: "/" },
        ],
    )
}

fn escape_swift(text: &str) -> String {
    text.replace('\\', "\\\\")
}

fn escape_java(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn swift_code(
    calculator_name: &str,
    parameters: &[Parameter],
    formula: &str,
    table: &ConversionTable,
) -> String {
    let function_name = to_camel_case(calculator_name);
    let param_list = parameters
        .iter()
        .map(|p| {
            format!(
                "{s}: Double, from{s}Unit: String, to{s}Unit: String",
                s = p.symbol
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        "import Foundation".to_string(),
        String::new(),
        "struct Formulas {".to_string(),
        format!(
            "    static func {}({}) -> (String, Double) {{",
            function_name, param_list
        ),
        "        func convertUnit(value: Double, from: String, to: String) -> Double {".to_string(),
        "            if from == to {".to_string(),
        "                return value".to_string(),
        "            }".to_string(),
        "            switch (from, to) {".to_string(),
    ];
    for (from, to, factor) in table.entries() {
        lines.push(format!(
            "            case (\"{}\", \"{}\"): return value * {}",
            from, to, factor
        ));
    }
    lines.push(
        "            default: fatalError(\"Unsupported unit conversion: \\(from) to \\(to)\")"
            .to_string(),
    );
    lines.push("            }".to_string());
    lines.push("        }".to_string());
    lines.push(String::new());

    for p in parameters {
        lines.push(format!(
            "        let {s}Converted = convertUnit(value: {s}, from: from{s}Unit, to: to{s}Unit)",
            s = p.symbol
        ));
    }
    lines.push(format!(
        "        let result = {}",
        swift_formula(formula, parameters)
    ));
    lines.push("        let explanation = \"\"\"".to_string());
    lines.push(format!(
        "        The formula for {} is: {}.",
        escape_swift(calculator_name),
        escape_swift(formula)
    ));
    for p in parameters {
        lines.push(format!(
            "        For {} ({}): Enter value and unit.",
            escape_swift(&p.name),
            p.symbol
        ));
    }
    lines.push("        Result: \\(result).".to_string());
    lines.push("        \"\"\"".to_string());
    lines.push("        return (explanation, round(result * 100) / 100)".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());

    lines.join("\n")
}

pub fn java_code(
    calculator_name: &str,
    parameters: &[Parameter],
    formula: &str,
    table: &ConversionTable,
) -> String {
    let function_name = to_camel_case(calculator_name);
    let param_list = parameters
        .iter()
        .map(|p| {
            format!(
                "double {s}, String from{s}Unit, String to{s}Unit",
                s = p.symbol
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        "public class Formulas {".to_string(),
        "    public static double convertUnit(double value, String from, String to) {".to_string(),
        "        if (from.equals(to)) {".to_string(),
        "            return value;".to_string(),
        "        }".to_string(),
        "        switch (from + \"->\" + to) {".to_string(),
    ];
    for (from, to, factor) in table.entries() {
        lines.push(format!(
            "            case \"{}->{}\": return value * {};",
            from, to, factor
        ));
    }
    lines.push(
        "            default: throw new IllegalArgumentException(\"Unsupported unit conversion: \" + from + \" to \" + to);"
            .to_string(),
    );
    lines.push("        }".to_string());
    lines.push("    }".to_string());
    lines.push(String::new());
    lines.push(format!(
        "    public static String {}({}) {{",
        function_name, param_list
    ));
    for p in parameters {
        lines.push(format!(
            "        double {s}Converted = convertUnit({s}, from{s}Unit, to{s}Unit);",
            s = p.symbol
        ));
    }
    lines.push(format!(
        "        double result = {};",
        java_formula(formula, parameters)
    ));
    lines.push(format!(
        "        String explanation = \"The formula for {} is: {}.\\n\" +",
        escape_java(calculator_name),
        escape_java(formula)
    ));
    for p in parameters {
        lines.push(format!(
            "            \"{} ({}): Enter value and unit\\n\" +",
            escape_java(&p.name),
            p.symbol
        ));
    }
    lines.push("            \"Result: \" + result;".to_string());
    lines.push("        return explanation;".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());

    lines.join("\n")
}
