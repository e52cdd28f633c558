//! Attribute value expressions

use super::{EvaluationError, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Expression bound to an attribute usage
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer(i64),
    Number(f64),
    Text(String),
    /// Name of another feature; not resolved by this provider
    Reference(String),
    Negate(Box<Expression>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
}

impl Expression {
    /// Fold the expression to a value, `attribute` names the owner for errors
    ///
    /// Integer arithmetic stays exact unless it overflows or divides; then the
    /// result is a float.
    pub fn evaluate(&self, attribute: &str) -> Result<Value, EvaluationError> {
        match self {
            Expression::Integer(value) => Ok(Value::Integer(*value)),
            Expression::Number(value) => finite(*value, attribute).map(Value::Number),
            Expression::Text(text) => Ok(Value::Text(text.clone())),
            Expression::Reference(reference) => Err(EvaluationError::UnresolvedReference {
                attribute: attribute.to_string(),
                reference: reference.clone(),
            }),
            Expression::Negate(inner) => match inner.evaluate(attribute)? {
                Value::Integer(value) => Ok(value
                    .checked_neg()
                    .map_or(Value::Number(-(value as f64)), Value::Integer)),
                Value::Number(value) => Ok(Value::Number(-value)),
                Value::Text(_) => Err(not_numeric(attribute)),
            },
            Expression::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate(attribute)?;
                let rhs = rhs.evaluate(attribute)?;
                if let (Value::Integer(a), Value::Integer(b)) = (&lhs, &rhs) {
                    let exact = match op {
                        BinaryOp::Add => a.checked_add(*b),
                        BinaryOp::Subtract => a.checked_sub(*b),
                        BinaryOp::Multiply => a.checked_mul(*b),
                        BinaryOp::Divide => None,
                    };
                    if let Some(value) = exact {
                        return Ok(Value::Integer(value));
                    }
                }
                let lhs = lhs.as_number().ok_or_else(|| not_numeric(attribute))?;
                let rhs = rhs.as_number().ok_or_else(|| not_numeric(attribute))?;
                let value = match op {
                    BinaryOp::Add => lhs + rhs,
                    BinaryOp::Subtract => lhs - rhs,
                    BinaryOp::Multiply => lhs * rhs,
                    BinaryOp::Divide => lhs / rhs,
                };
                finite(value, attribute).map(Value::Number)
            }
        }
    }
}

fn not_numeric(attribute: &str) -> EvaluationError {
    EvaluationError::NotNumeric {
        attribute: attribute.to_string(),
    }
}

fn finite(value: f64, attribute: &str) -> Result<f64, EvaluationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationError::NonFinite {
            attribute: attribute.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: f64) -> Box<Expression> {
        Box::new(Expression::Number(value))
    }

    #[test]
    fn test_arithmetic() {
        let expr = Expression::Binary {
            op: BinaryOp::Subtract,
            lhs: number(1.0),
            rhs: Box::new(Expression::Negate(number(2.5))),
        };
        assert_eq!(expr.evaluate("tx"), Ok(Value::Number(3.5)));
    }

    #[test]
    fn test_integer_arithmetic_is_exact() {
        let big = Expression::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(Expression::Integer(9_007_199_254_740_992)),
            rhs: Box::new(Expression::Integer(1)),
        };
        assert_eq!(big.evaluate("typeID"), Ok(Value::Integer(9_007_199_254_740_993)));

        let negated = Expression::Negate(Box::new(Expression::Integer(7)));
        assert_eq!(negated.evaluate("typeID"), Ok(Value::Integer(-7)));

        let halved = Expression::Binary {
            op: BinaryOp::Divide,
            lhs: Box::new(Expression::Integer(3)),
            rhs: Box::new(Expression::Integer(2)),
        };
        assert_eq!(halved.evaluate("tx"), Ok(Value::Number(1.5)));

        let overflow = Expression::Binary {
            op: BinaryOp::Multiply,
            lhs: Box::new(Expression::Integer(i64::MAX)),
            rhs: Box::new(Expression::Integer(2)),
        };
        assert_eq!(overflow.evaluate("tx"), Ok(Value::Number(i64::MAX as f64 * 2.0)));
    }

    #[test]
    fn test_division_by_zero_is_not_finite() {
        let expr = Expression::Binary {
            op: BinaryOp::Divide,
            lhs: number(1.0),
            rhs: number(0.0),
        };
        assert_eq!(
            expr.evaluate("ry"),
            Err(EvaluationError::NonFinite {
                attribute: "ry".to_string()
            })
        );
    }

    #[test]
    fn test_text_in_arithmetic() {
        let expr = Expression::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(Expression::Text("a".to_string())),
            rhs: number(1.0),
        };
        assert_eq!(
            expr.evaluate("tz"),
            Err(EvaluationError::NotNumeric {
                attribute: "tz".to_string()
            })
        );
    }
}
