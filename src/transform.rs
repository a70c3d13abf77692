//! Rewrites of the restricted LaTeX formula grammar.
//!
//! Each rule is a single global regex pass over the current string, applied
//! left to right without overlap, in a fixed order. Rules never re-run on
//! their own output, so a fraction nested inside a fraction argument is left
//! half rewritten.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

// A fraction argument may hold one level of braces, e.g. `h^{2}`.
const BRACED_ARG: &str = r"([^{}]*(?:\{[^{}]*\}[^{}]*)*)";

lazy_static! {
    pub(crate) static ref FRACTION_REGEX: Regex =
        Regex::new(&format!(r"\\frac\{{{BRACED_ARG}\}}\{{{BRACED_ARG}\}}")).unwrap();
    pub(crate) static ref SQUARE_REGEX: Regex = Regex::new(r"\^\{2\}").unwrap();
    pub(crate) static ref TIMES_REGEX: Regex = Regex::new(r"\\times").unwrap();
    pub(crate) static ref DIV_REGEX: Regex = Regex::new(r"\\div").unwrap();
}

/// One rewrite step: every match of `pattern` is replaced by `replacement`
/// (regex replacement syntax, `$1` for the first group).
pub struct Rule<'a> {
    pub pattern: &'a Regex,
    pub replacement: &'a str,
}

/// Apply `rules` in order, each as one pass over the output of the previous.
pub fn apply_rules(formula: &str, rules: &[Rule<'_>]) -> String {
    rules.iter().fold(formula.to_string(), |text, rule| {
        rule.pattern
            .replace_all(&text, rule.replacement)
            .into_owned()
    })
}

/// Rewrite a formula into the syntax understood by the arithmetic evaluator.
///
/// `\frac{A}{B}` becomes `(A) / (B)`, `^{2}` becomes `**2`, `\times` and
/// `\div` become `*` and `/`. Parameter symbols are left untouched.
///
/// ```
/// use medcalc::transform::to_evaluable;
///
/// assert_eq!(to_evaluable(r"\frac{w}{h^{2}}"), "(w) / (h**2)");
/// ```
pub fn to_evaluable(formula: &str) -> String {
    apply_rules(
        formula,
        &[
            Rule {
                pattern: &FRACTION_REGEX,
                replacement: "($1) / ($2)",
            },
            Rule {
                pattern: &SQUARE_REGEX,
                replacement: "**2",
            },
            Rule {
                pattern: &TIMES_REGEX,
                replacement: "*",
            },
            Rule {
                pattern: &DIV_REGEX,
                replacement: "/",
            },
        ],
    )
}

/// A snippet the author can insert into the formula text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PaletteItem {
    pub label: &'static str,
    pub symbol: &'static str,
}

pub const MATH_COMPONENTS: &[PaletteItem] = &[
    PaletteItem { label: "Fraction", symbol: "\\frac{}{} " },
    PaletteItem { label: "Square", symbol: "^{2} " },
    PaletteItem { label: "Power", symbol: "^{} " },
    PaletteItem { label: "Subscript", symbol: "_{} " },
    PaletteItem { label: "Square Root", symbol: "\\sqrt{} " },
    PaletteItem { label: "Summation", symbol: "\\sum_{i=1}^{n} " },
];

pub const OPERATORS: &[PaletteItem] = &[
    PaletteItem { label: "Plus", symbol: " + " },
    PaletteItem { label: "Minus", symbol: " - " },
    PaletteItem { label: "Multiply", symbol: " \\times " },
    PaletteItem { label: "Divide", symbol: " \\div " },
];

/// Replace the `start..end` selection of `formula` with `symbol`.
///
/// Offsets are clamped to the string and snapped back to char boundaries.
/// Returns the new text and the cursor position just after the insertion.
pub fn insert_symbol(formula: &str, start: usize, end: usize, symbol: &str) -> (String, usize) {
    let start = floor_char_boundary(formula, start.min(formula.len()));
    let end = floor_char_boundary(formula, end.clamp(start, formula.len()));

    let mut text = String::with_capacity(formula.len() + symbol.len());
    text.push_str(&formula[..start]);
    text.push_str(symbol);
    text.push_str(&formula[end..]);
    (text, start + symbol.len())
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
