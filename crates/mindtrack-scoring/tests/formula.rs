use std::collections::BTreeMap;

use mindtrack_scoring::config::{DEFAULT_FORMULA_MAX_LENGTH, DEFAULT_FORMULA_STEP_LIMIT};
use mindtrack_scoring::formula::{Formula, FormulaError};

fn vars() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("q_1".to_string(), 4.0),
        ("q_2".to_string(), 3.0),
        ("simple_sum".to_string(), 7.0),
        ("zero".to_string(), 0.0),
    ])
}

fn eval(source: &str) -> Result<f64, FormulaError> {
    Formula::parse(source, DEFAULT_FORMULA_MAX_LENGTH)?
        .evaluate(&vars(), DEFAULT_FORMULA_STEP_LIMIT)
}

fn value(source: &str) -> f64 {
    eval(source).unwrap_or_else(|e| panic!("{source}: {e}"))
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(value("1 + 2 * 3"), 7.0);
    assert_eq!(value("(1 + 2) * 3"), 9.0);
    assert_eq!(value("10 - 4 - 3"), 3.0);
    assert_eq!(value("2 * 3 ** 2"), 18.0);
    assert_eq!(value("7 // 2 + 7 % 4"), 6.0);
}

#[test]
fn power_is_right_associative_and_binds_tighter_than_negation() {
    assert_eq!(value("2 ** 3 ** 2"), 512.0);
    assert_eq!(value("2 ^ 3"), 8.0);
    assert_eq!(value("-2 ** 2"), -4.0);
    assert_eq!(value("2 ** -1"), 0.5);
    assert_eq!(value("--3"), 3.0);
}

#[test]
fn floored_division_and_modulo_follow_the_divisor() {
    assert_eq!(value("-7 // 2"), -4.0);
    assert_eq!(value("-7 % 3"), 2.0);
    assert_eq!(value("7 % -3"), -2.0);
}

#[test]
fn variables_and_placeholders() {
    assert_eq!(value("q_1 * 2 + {q_2}"), 11.0);
    assert_eq!(value("{simple_sum} / 7"), 1.0);
    assert!((value("pi") - std::f64::consts::PI).abs() < 1e-12);
    assert!((value("tau / 2 - pi")).abs() < 1e-12);
}

#[test]
fn functions() {
    assert_eq!(value("max(q_1, q_2, 10)"), 10.0);
    assert_eq!(value("min(q_1)"), 4.0);
    assert_eq!(value("abs(-3) + fabs(-1)"), 4.0);
    assert_eq!(value("sqrt(16) + pow(2, 3)"), 12.0);
    assert_eq!(value("round(2.346, 2)"), 2.35);
    assert_eq!(value("round(2.5)"), 3.0);
    assert_eq!(value("floor(2.7) + ceil(2.1)"), 5.0);
    assert!((value("log10(1000) + log2(8)") - 6.0).abs() < 1e-12);
    assert!((value("log(8, 2)") - 3.0).abs() < 1e-12);
    assert!((value("log(e)") - 1.0).abs() < 1e-12);
}

#[test]
fn comparisons_and_logic_are_numeric() {
    assert_eq!(value("q_1 > q_2"), 1.0);
    assert_eq!(value("q_1 == q_2"), 0.0);
    assert_eq!(value("(q_1 >= 4) * 10"), 10.0);
    assert_eq!(value("not zero"), 1.0);
    assert_eq!(value("zero or 5"), 5.0);
    assert_eq!(value("q_1 and q_2"), 3.0);
    assert_eq!(value("zero and 1/0"), 0.0);
    assert_eq!(value("True + false"), 1.0);
}

#[test]
fn chained_comparisons_are_rejected() {
    assert!(matches!(eval("1 < q_1 < 5"), Err(FormulaError::ChainedComparison { .. })));
}

#[test]
fn evaluation_errors() {
    assert_eq!(eval("1 / 0"), Err(FormulaError::DivisionByZero));
    assert_eq!(eval("q_1 % zero"), Err(FormulaError::DivisionByZero));
    assert_eq!(eval("q_1 // 0"), Err(FormulaError::DivisionByZero));
    assert_eq!(eval("sqrt(-1)"), Err(FormulaError::NonFinite));
    assert_eq!(eval("log(0)"), Err(FormulaError::NonFinite));
    assert_eq!(eval("10 ** 400"), Err(FormulaError::NonFinite));
    assert_eq!(eval("q_9 + 1"), Err(FormulaError::UnknownVariable("q_9".to_string())));
}

#[test]
fn parse_errors() {
    assert_eq!(Formula::parse("", 100), Err(FormulaError::Empty));
    assert_eq!(Formula::parse("   ", 100), Err(FormulaError::Empty));
    assert_eq!(eval("1 +"), Err(FormulaError::UnexpectedEnd));
    assert!(matches!(eval("(1 + 2"), Err(FormulaError::UnexpectedEnd)));
    assert!(matches!(eval("1 2"), Err(FormulaError::UnexpectedToken { at: 2, .. })));
    assert!(matches!(eval("{1}"), Err(FormulaError::UnexpectedToken { .. })));
    assert_eq!(eval("eval(1)"), Err(FormulaError::UnknownFunction("eval".to_string())));
    assert!(matches!(eval("pow(2)"), Err(FormulaError::Arity { function: "pow", got: 1, .. })));
    assert!(matches!(eval("max()"), Err(FormulaError::Arity { function: "max", got: 0, .. })));
}

#[test]
fn nothing_outside_arithmetic_is_reachable() {
    for source in [
        "__import__('os')",
        "q_1.__class__",
        "[x for x in q_1]",
        "lambda: 1",
        "q_1 if q_2 else 0",
        "open('/etc/passwd')",
        "a = 1",
    ] {
        assert!(eval(source).is_err(), "{source} should not evaluate");
    }
}

#[test]
fn length_limit() {
    let long = "1 + ".repeat(50) + "1";
    assert!(matches!(
        Formula::parse(&long, 64),
        Err(FormulaError::TooLong { max: 64, .. })
    ));
    assert!(Formula::parse(&long, DEFAULT_FORMULA_MAX_LENGTH).is_ok());
}

#[test]
fn nesting_limit() {
    let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(eval(&deep), Err(FormulaError::NestingTooDeep));

    let negations = format!("{}1", "-".repeat(100));
    assert_eq!(eval(&negations), Err(FormulaError::NestingTooDeep));

    let fine = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    assert_eq!(value(&fine), 1.0);
}

#[test]
fn step_limit() {
    let formula = Formula::parse(&("1 + ".repeat(200) + "1"), DEFAULT_FORMULA_MAX_LENGTH).unwrap();
    assert_eq!(formula.evaluate(&vars(), 50), Err(FormulaError::StepLimit(50)));
    assert_eq!(formula.evaluate(&vars(), DEFAULT_FORMULA_STEP_LIMIT), Ok(201.0));
}

#[test]
fn long_operator_runs_stay_flat() {
    let sum = format!("{}1", "1+".repeat(2047));
    assert_eq!(value(&sum), 2048.0);

    let product = format!("{}2", "1*".repeat(2047));
    assert_eq!(value(&product), 2.0);

    let mixed = format!("{}q_1", "q_1-q_2*2+".repeat(400));
    assert_eq!(value(&mixed), 4.0 - 2.0 * 400.0);

    let ands = format!("{}q_1", "1 and ".repeat(600));
    assert_eq!(value(&ands), 4.0);

    let ors = format!("{}zero", "zero or ".repeat(400));
    assert_eq!(value(&ors), 0.0);
}

#[test]
fn and_or_return_the_deciding_operand() {
    assert_eq!(value("q_1 and zero and q_2"), 0.0);
    assert_eq!(value("q_1 and q_2 and simple_sum"), 7.0);
    assert_eq!(value("zero or q_2 or q_1"), 3.0);
    assert_eq!(value("zero or zero"), 0.0);
    // The deciding operand stops evaluation, so the missing name is never read.
    assert_eq!(value("zero and q_404"), 0.0);
    assert_eq!(value("q_1 or q_404"), 4.0);
}

#[test]
fn round_with_extreme_digits_leaves_the_value() {
    assert_eq!(value("round(2.5, 400)"), 2.5);
    assert_eq!(value("round(2.5, -400)"), 2.5);
    assert_eq!(value("round(1234.5678, 2)"), 1234.57);
}

#[test]
fn lists_referenced_variables() {
    let formula = Formula::parse("q_1 + {q_2} * max(simple_sum, pi)", 200).unwrap();
    let names: Vec<&str> = formula.variables().into_iter().collect();
    assert_eq!(names, vec!["pi", "q_1", "q_2", "simple_sum"]);
    assert_eq!(formula.source(), "q_1 + {q_2} * max(simple_sum, pi)");
}
