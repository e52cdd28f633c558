//! Document tree abstraction
//!
//! Structural documents are trees of heterogeneous nodes (packages, part
//! definitions, part usages, attributes, ...). The core only reaches them through
//! [`DocumentNode`] capability queries; node kinds it does not recognize are
//! skipped while their children are still visited.
//!
//! [`parse`] provides a concrete tree for the supported notation subset.

mod expression;
mod lexer;
mod model;
mod parser;

pub use expression::{BinaryOp, Expression};
pub use model::{Element, ElementKind, Multiplicity};
pub use parser::{ParseError, ParseErrorKind, parse};

use crate::constants::TYPE_ID_ATTRIBUTE;

/// A node of an externally owned document tree
pub trait DocumentNode {
    /// Declared name, if any
    fn name(&self) -> Option<&str>;

    /// Owned child nodes in document order
    fn owned_elements(&self) -> impl Iterator<Item = &Self>;

    /// Structural part usage view of this node
    fn as_part(&self) -> Option<PartUsage<'_>> {
        None
    }

    /// Whether this node is a part definition
    fn is_part_definition(&self) -> bool {
        false
    }

    /// Whether this node is an attribute usage
    fn is_attribute(&self) -> bool {
        false
    }

    /// Reduce this node's bound expression to a value
    ///
    /// Returns `Ok(None)` when nothing is bound.
    fn evaluate(&self) -> Result<Option<Value>, EvaluationError> {
        Ok(None)
    }
}

/// Part usage details exposed by a document node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartUsage<'a> {
    /// Definitions typing this usage (`part x : A, B`)
    pub definitions: Vec<&'a str>,
    /// Features this usage subsets (`subsets children`)
    pub subsets: Vec<&'a str>,
}

impl PartUsage<'_> {
    /// Whether the usage is typed by `definition` (simple or qualified name)
    pub fn is_defined_by(&self, definition: &str) -> bool {
        self.definitions
            .iter()
            .any(|d| *d == definition || d.rsplit("::").next() == Some(definition))
    }
}

/// Evaluated attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Exact integer literal or integer arithmetic result
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the value, integers widened to `f64`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(value) => Some(*value as f64),
            Value::Number(value) => Some(*value),
            Value::Text(_) => None,
        }
    }
}

/// Attribute evaluation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Attribute '{attribute}' references unresolved name '{reference}'")]
    UnresolvedReference { attribute: String, reference: String },
    #[error("Attribute '{attribute}' does not evaluate to a number")]
    NotNumeric { attribute: String },
    #[error("Attribute '{attribute}' does not evaluate to text")]
    NotText { attribute: String },
    #[error("Attribute '{attribute}' is not an integer: {value}")]
    NotInteger { attribute: String, value: f64 },
    #[error("Attribute '{attribute}' evaluates to a non-finite number")]
    NonFinite { attribute: String },
}

/// Find an owned attribute by name
pub fn attribute<'a, N: DocumentNode>(node: &'a N, name: &str) -> Option<&'a N> {
    node.owned_elements()
        .find(|child| child.is_attribute() && child.name() == Some(name))
}

fn attribute_value<N: DocumentNode>(
    node: &N,
    name: &str,
) -> Result<Option<Value>, EvaluationError> {
    Ok(attribute(node, name)
        .map(|attr| attr.evaluate())
        .transpose()?
        .flatten())
}

/// Evaluate an owned attribute as a number
pub fn attribute_number<N: DocumentNode>(
    node: &N,
    name: &str,
) -> Result<Option<f64>, EvaluationError> {
    attribute_value(node, name)?
        .map(|value| {
            value.as_number().ok_or_else(|| EvaluationError::NotNumeric {
                attribute: name.to_string(),
            })
        })
        .transpose()
}

/// Evaluate an owned attribute as text
pub fn attribute_text<N: DocumentNode>(
    node: &N,
    name: &str,
) -> Result<Option<String>, EvaluationError> {
    match attribute_value(node, name)? {
        None => Ok(None),
        Some(Value::Text(text)) => Ok(Some(text)),
        Some(_) => Err(EvaluationError::NotText {
            attribute: name.to_string(),
        }),
    }
}

/// Integer type tag of a node, if it declares one
pub fn type_id<N: DocumentNode>(node: &N) -> Result<Option<i64>, EvaluationError> {
    let not_integer = |value: f64| EvaluationError::NotInteger {
        attribute: TYPE_ID_ATTRIBUTE.to_string(),
        value,
    };
    match attribute_value(node, TYPE_ID_ATTRIBUTE)? {
        None => Ok(None),
        Some(Value::Integer(value)) => Ok(Some(value)),
        // 2^63 is the first float above i64::MAX
        Some(Value::Number(value))
            if value.fract() != 0.0 || value < i64::MIN as f64 || value >= i64::MAX as f64 =>
        {
            Err(not_integer(value))
        }
        Some(Value::Number(value)) => Ok(Some(value as i64)),
        Some(Value::Text(_)) => Err(EvaluationError::NotNumeric {
            attribute: TYPE_ID_ATTRIBUTE.to_string(),
        }),
    }
}

/// Whether a node carries a numeric type tag
///
/// A tag that fails to evaluate is an error, not a missing tag.
pub fn has_numeric_type_id<N: DocumentNode>(node: &N) -> Result<bool, EvaluationError> {
    type_id(node).map(|id| id.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_helpers() {
        let element = parse(
            r#"part p {
                attribute :>> tx = 2.5;
                attribute :>> label = "wheel";
                attribute :>> typeID = 3;
                attribute rz;
            }"#,
        )
        .unwrap();
        let part = element.owned_elements().next().unwrap();

        assert_eq!(attribute_number(part, "tx"), Ok(Some(2.5)));
        assert_eq!(attribute_number(part, "ty"), Ok(None));
        assert_eq!(attribute_number(part, "rz"), Ok(None));
        assert_eq!(attribute_text(part, "label"), Ok(Some("wheel".to_string())));
        assert_eq!(
            attribute_number(part, "label"),
            Err(EvaluationError::NotNumeric {
                attribute: "label".to_string()
            })
        );
        assert_eq!(type_id(part), Ok(Some(3)));
        assert_eq!(has_numeric_type_id(part), Ok(true));
    }

    #[test]
    fn test_type_id_must_be_integral() {
        let element = parse("part p { attribute :>> typeID = 1.5; }").unwrap();
        let part = element.owned_elements().next().unwrap();
        assert_eq!(
            type_id(part),
            Err(EvaluationError::NotInteger {
                attribute: "typeID".to_string(),
                value: 1.5
            })
        );
        assert!(has_numeric_type_id(part).is_err());
    }

    #[test]
    fn test_text_type_id_is_not_numeric() {
        let element = parse(r#"part p { attribute :>> typeID = "x"; }"#).unwrap();
        let part = element.owned_elements().next().unwrap();
        assert_eq!(
            has_numeric_type_id(part),
            Err(EvaluationError::NotNumeric {
                attribute: "typeID".to_string()
            })
        );
    }

    #[test]
    fn test_large_type_ids_are_exact() {
        let element = parse(
            "part p { attribute :>> typeID = 9007199254740993; }
             part q { attribute :>> typeID = -9223372036854775808; }
             part r { attribute :>> typeID = 9223372036854775808; }",
        )
        .unwrap();
        let ids: Vec<_> = element.owned_elements().map(type_id).collect();
        assert_eq!(ids[0], Ok(Some(9_007_199_254_740_993)));
        assert_eq!(ids[1], Ok(Some(i64::MIN)));
        assert!(matches!(ids[2], Err(EvaluationError::NotInteger { .. })));
    }

    #[test]
    fn test_qualified_definition_names() {
        let usage = PartUsage {
            definitions: vec!["Geometry::Component"],
            subsets: vec![],
        };
        assert!(usage.is_defined_by("Component"));
        assert!(usage.is_defined_by("Geometry::Component"));
        assert!(!usage.is_defined_by("Context"));
    }
}
