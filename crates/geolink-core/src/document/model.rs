//! Element tree produced by the notation parser

use super::expression::Expression;
use super::{DocumentNode, EvaluationError, PartUsage, Value};

/// Declared multiplicity, `[lower..upper]` with `None` for `*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplicity {
    pub lower: u64,
    pub upper: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Unnamed document root
    Namespace,
    Package,
    Import {
        target: String,
    },
    PartDefinition {
        specializes: Vec<String>,
    },
    PartUsage {
        definitions: Vec<String>,
        subsets: Vec<String>,
        redefines: Vec<String>,
        multiplicity: Option<Multiplicity>,
    },
    AttributeDefinition,
    AttributeUsage {
        definition: Option<String>,
        redefinition: bool,
        value: Option<Expression>,
    },
}

/// A parsed document element and the elements it owns
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: Option<String>,
    pub kind: ElementKind,
    pub owned: Vec<Element>,
}

impl Element {
    pub fn new(name: Option<String>, kind: ElementKind) -> Self {
        Self {
            name,
            kind,
            owned: Vec::new(),
        }
    }

    pub fn namespace() -> Self {
        Self::new(None, ElementKind::Namespace)
    }

    /// Plain part usage without typing or subsetting
    pub fn part(name: impl Into<String>) -> Self {
        Self::new(
            Some(name.into()),
            ElementKind::PartUsage {
                definitions: Vec::new(),
                subsets: Vec::new(),
                redefines: Vec::new(),
                multiplicity: None,
            },
        )
    }

    /// Redefining attribute usage bound to `value`
    pub fn attribute(name: impl Into<String>, value: Expression) -> Self {
        Self::new(
            Some(name.into()),
            ElementKind::AttributeUsage {
                definition: None,
                redefinition: true,
                value: Some(value),
            },
        )
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.owned.push(child);
        self
    }
}

impl DocumentNode for Element {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn owned_elements(&self) -> impl Iterator<Item = &Self> {
        self.owned.iter()
    }

    fn as_part(&self) -> Option<PartUsage<'_>> {
        match &self.kind {
            ElementKind::PartUsage {
                definitions,
                subsets,
                ..
            } => Some(PartUsage {
                definitions: definitions.iter().map(String::as_str).collect(),
                subsets: subsets.iter().map(String::as_str).collect(),
            }),
            _ => None,
        }
    }

    fn is_part_definition(&self) -> bool {
        matches!(self.kind, ElementKind::PartDefinition { .. })
    }

    fn is_attribute(&self) -> bool {
        matches!(self.kind, ElementKind::AttributeUsage { .. })
    }

    fn evaluate(&self) -> Result<Option<Value>, EvaluationError> {
        match &self.kind {
            ElementKind::AttributeUsage {
                value: Some(expression),
                ..
            } => expression
                .evaluate(self.name.as_deref().unwrap_or_default())
                .map(Some),
            _ => Ok(None),
        }
    }
}
