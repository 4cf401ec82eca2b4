use std::collections::BTreeMap;

use super::{BinaryOp, CompareOp, Expr, FormulaError, Function, constant};

pub(crate) struct Evaluator<'a> {
    variables: &'a BTreeMap<String, f64>,
    steps: usize,
    step_limit: usize,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(variables: &'a BTreeMap<String, f64>, step_limit: usize) -> Self {
        Self {
            variables,
            steps: 0,
            step_limit,
        }
    }

    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<f64, FormulaError> {
        self.steps += 1;
        if self.steps > self.step_limit {
            return Err(FormulaError::StepLimit(self.step_limit));
        }

        let value = match expr {
            Expr::Number(value) => *value,
            Expr::Variable(name) => self
                .variables
                .get(name)
                .copied()
                .or_else(|| constant(name))
                .ok_or_else(|| FormulaError::UnknownVariable(name.clone()))?,
            Expr::Negate(inner) => -self.eval(inner)?,
            Expr::Not(inner) => truth(self.eval(inner)? == 0.0),
            // `and` yields the first falsy operand, `or` the first truthy
            // one, else both yield the last.
            Expr::And(operands) => self.short_circuit(operands, |v| v == 0.0)?,
            Expr::Or(operands) => self.short_circuit(operands, |v| v != 0.0)?,
            Expr::Compare(op, lhs, rhs) => {
                let (a, b) = (self.eval(lhs)?, self.eval(rhs)?);
                truth(match op {
                    CompareOp::Eq => a == b,
                    CompareOp::Ne => a != b,
                    CompareOp::Lt => a < b,
                    CompareOp::Le => a <= b,
                    CompareOp::Gt => a > b,
                    CompareOp::Ge => a >= b,
                })
            }
            Expr::Binary(op, lhs, rhs) => {
                let (a, b) = (self.eval(lhs)?, self.eval(rhs)?);
                binary(*op, a, b)?
            }
            Expr::Chain(first, rest) => {
                let mut acc = self.eval(first)?;
                for (op, operand) in rest {
                    let b = self.eval(operand)?;
                    acc = finite(binary(*op, acc, b)?)?;
                }
                acc
            }
            Expr::Call(function, args) => {
                let args = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<Result<Vec<_>, _>>()?;
                call(*function, &args)?
            }
        };

        finite(value)
    }

    fn short_circuit(
        &mut self,
        operands: &[Expr],
        stop: impl Fn(f64) -> bool,
    ) -> Result<f64, FormulaError> {
        let mut last = 0.0;
        for operand in operands {
            last = self.eval(operand)?;
            if stop(last) {
                break;
            }
        }
        Ok(last)
    }
}

fn finite(value: f64) -> Result<f64, FormulaError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::NonFinite)
    }
}

fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn binary(op: BinaryOp, a: f64, b: f64) -> Result<f64, FormulaError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            nonzero(b)?;
            a / b
        }
        BinaryOp::FloorDiv => {
            nonzero(b)?;
            (a / b).floor()
        }
        // Floored modulo: the result takes the divisor's sign.
        BinaryOp::Mod => {
            nonzero(b)?;
            a - b * (a / b).floor()
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            a.powf(b)
        }
    };
    Ok(value)
}

fn nonzero(divisor: f64) -> Result<(), FormulaError> {
    if divisor == 0.0 {
        Err(FormulaError::DivisionByZero)
    } else {
        Ok(())
    }
}

/// Arity was checked at parse time.
fn call(function: Function, args: &[f64]) -> Result<f64, FormulaError> {
    let x = args.first().copied().unwrap_or(0.0);
    let second = args.get(1).copied();
    let value = match function {
        Function::Abs => x.abs(),
        Function::Sqrt => x.sqrt(),
        Function::Exp => x.exp(),
        Function::Log => match second {
            Some(base) => x.ln() / base.ln(),
            None => x.ln(),
        },
        Function::Log10 => x.log10(),
        Function::Log2 => x.log2(),
        Function::Pow => binary(BinaryOp::Pow, x, second.unwrap_or(1.0))?,
        Function::Sin => x.sin(),
        Function::Cos => x.cos(),
        Function::Tan => x.tan(),
        Function::Floor => x.floor(),
        Function::Ceil => x.ceil(),
        Function::Round => match second {
            // Past about 308 digits either way the factor stops being a
            // usable number, and rounding there leaves `x` as it is.
            Some(digits) => {
                let factor = 10f64.powi(digits.trunc() as i32);
                if factor.is_finite() && factor != 0.0 {
                    let rounded = (x * factor).round() / factor;
                    if rounded.is_finite() { rounded } else { x }
                } else {
                    x
                }
            }
            None => x.round(),
        },
        Function::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
        Function::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };
    Ok(value)
}
