//! Arithmetic evaluator tests

use medcalc::FormulaError;
use medcalc::expression::{MAX_DEPTH, Token, evaluate, tokenize};

#[test]
fn test_simple_arithmetic() {
    assert_eq!(evaluate("2 + 2").unwrap(), 4.0);
    assert_eq!(evaluate("10 - 3").unwrap(), 7.0);
    assert_eq!(evaluate("4 * 5").unwrap(), 20.0);
    assert_eq!(evaluate("20 / 4").unwrap(), 5.0);
}

#[test]
fn test_order_of_operations() {
    assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
    assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
    assert_eq!(evaluate("10 - 5 - 2").unwrap(), 3.0);
    assert_eq!(evaluate("16 / 4 / 2").unwrap(), 2.0);
    assert_eq!(evaluate("2**3 * 2").unwrap(), 16.0);
}

#[test]
fn test_power_is_right_associative() {
    assert_eq!(evaluate("2**3**2").unwrap(), 512.0);
    assert_eq!(evaluate("(2**3)**2").unwrap(), 64.0);
}

#[test]
fn test_unary_minus() {
    assert_eq!(evaluate("-2**2").unwrap(), -4.0);
    assert_eq!(evaluate("(-2)**2").unwrap(), 4.0);
    assert_eq!(evaluate("2**-1").unwrap(), 0.5);
    assert_eq!(evaluate("3 - -1").unwrap(), 4.0);
}

#[test]
fn test_decimals() {
    assert!((evaluate("(70) / (1.75**2)").unwrap() - 22.857142857).abs() < 1e-6);
    assert_eq!(evaluate(".5 + 1.5").unwrap(), 2.0);
}

#[test]
fn test_tokenize() {
    assert_eq!(
        tokenize("1.5**(2)").unwrap(),
        vec![
            Token::Number(1.5),
            Token::Power,
            Token::LParen,
            Token::Number(2.0),
            Token::RParen,
        ]
    );
}

#[test]
fn test_malformed_input() {
    for input in ["", "   ", "1 +", "(1 + 2", "1 2", "1..2", "2 * * 3", ")"] {
        assert!(
            matches!(evaluate(input), Err(FormulaError::Malformed(_))),
            "{:?}",
            input
        );
    }
}

#[test]
fn test_letters_rejected() {
    assert!(matches!(evaluate("w + 1"), Err(FormulaError::Malformed(_))));
}

#[test]
fn test_non_finite_result() {
    assert_eq!(evaluate("1 / 0"), Err(FormulaError::NonFinite));
    assert_eq!(evaluate("0 / 0"), Err(FormulaError::NonFinite));
    assert_eq!(evaluate("0 ** -1"), Err(FormulaError::NonFinite));
}

#[test]
fn test_deep_parentheses_rejected() {
    let input = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
    assert_eq!(
        evaluate(&input),
        Err(FormulaError::Malformed("expression nested too deeply".to_string()))
    );
}

#[test]
fn test_long_sign_run_rejected() {
    let input = format!("{}1", "-".repeat(100_000));
    assert!(matches!(evaluate(&input), Err(FormulaError::Malformed(_))));
}

#[test]
fn test_long_power_chain_rejected() {
    let input = format!("{}1", "1**".repeat(100_000));
    assert!(matches!(evaluate(&input), Err(FormulaError::Malformed(_))));
}

#[test]
fn test_nesting_within_limit() {
    let depth = MAX_DEPTH / 2;
    let input = format!("{}2{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(evaluate(&input).unwrap(), 2.0);
    // long flat sums do not nest
    let input = format!("{}1", "1 + ".repeat(10_000));
    assert_eq!(evaluate(&input).unwrap(), 10_001.0);
}
