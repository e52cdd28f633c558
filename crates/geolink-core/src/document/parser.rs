//! Recursive-descent parser for the structural notation subset
//!
//! Supported: packages, `import`, `part def`, part usages with typing, subsetting,
//! redefinition and multiplicity, `attribute def`, and attribute usages bound to
//! arithmetic expressions. Visibility and `abstract` prefixes are accepted and ignored.

use super::expression::{BinaryOp, Expression};
use super::lexer::{Token, TokenKind, tokenize};
use super::model::{Element, ElementKind, Multiplicity};

/// Parse error with a 1-based source position
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} (line {line}, column {column})")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(line: usize, column: usize, kind: ParseErrorKind) -> Self {
        Self { line, column, kind }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("Unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Unterminated block comment")]
    UnterminatedComment,
    #[error("Invalid number literal: {0}")]
    InvalidNumber(String),
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },
    #[error("Unexpected end of input, expected {0}")]
    UnexpectedEof(&'static str),
    #[error("Invalid multiplicity bound: {0}")]
    InvalidMultiplicity(f64),
}

const IGNORED_PREFIXES: [&str; 4] = ["public", "private", "protected", "abstract"];

/// Parse a document into an unnamed namespace element
pub fn parse(text: &str) -> Result<Element, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut root = Element::namespace();
    while !parser.at_eof() {
        if let Some(member) = parser.member()? {
            root.owned.push(member);
        }
    }
    tracing::trace!(members = root.owned.len(), "parsed document");
    Ok(root)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    // ============== Token Helpers ==============

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn at_symbol(&self, symbol: &str) -> bool {
        matches!(self.peek().kind, TokenKind::Symbol(s) if s == symbol)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(ident) if ident == keyword)
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        let found = self.at_symbol(symbol);
        if found {
            self.advance();
        }
        found
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let found = self.at_keyword(keyword);
        if found {
            self.advance();
        }
        found
    }

    fn error(&self, expected: &'static str) -> ParseError {
        let token = self.peek();
        let kind = match &token.kind {
            TokenKind::Eof => ParseErrorKind::UnexpectedEof(expected),
            other => ParseErrorKind::UnexpectedToken {
                expected,
                found: other.describe(),
            },
        };
        ParseError::new(token.line, token.column, kind)
    }

    fn expect_symbol(&mut self, symbol: &'static str) -> Result<(), ParseError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.error(symbol))
        }
    }

    fn at_name(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Ident(_) | TokenKind::QuotedName(_)
        )
    }

    fn name(&mut self) -> Result<String, ParseError> {
        match &self.peek().kind {
            TokenKind::Ident(name) | TokenKind::QuotedName(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("a name")),
        }
    }

    fn qualified_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.name()?;
        while self.at_symbol("::") && self.lookahead_is_name(1) {
            self.advance();
            name.push_str("::");
            name.push_str(&self.name()?);
        }
        Ok(name)
    }

    fn lookahead_is_name(&self, offset: usize) -> bool {
        self.tokens.get(self.pos + offset).is_some_and(|token| {
            matches!(token.kind, TokenKind::Ident(_) | TokenKind::QuotedName(_))
        })
    }

    fn qualified_names(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.qualified_name()?];
        while self.eat_symbol(",") {
            names.push(self.qualified_name()?);
        }
        Ok(names)
    }

    // ============== Members ==============

    fn member(&mut self) -> Result<Option<Element>, ParseError> {
        while IGNORED_PREFIXES.iter().any(|prefix| self.at_keyword(prefix)) {
            self.advance();
        }
        if self.eat_symbol(";") {
            return Ok(None);
        }
        if self.eat_keyword("package") {
            let name = self.name()?;
            let mut element = Element::new(Some(name), ElementKind::Package);
            self.body(&mut element)?;
            return Ok(Some(element));
        }
        if self.eat_keyword("import") {
            return self.import().map(Some);
        }
        if self.eat_keyword("part") {
            if self.eat_keyword("def") {
                return self.part_definition().map(Some);
            }
            return self.part_usage().map(Some);
        }
        if self.eat_keyword("attribute") {
            if self.eat_keyword("def") {
                let name = self.name()?;
                let mut element = Element::new(Some(name), ElementKind::AttributeDefinition);
                self.body(&mut element)?;
                return Ok(Some(element));
            }
            return self.attribute_usage().map(Some);
        }
        Err(self.error("a declaration"))
    }

    /// `;` or `{ member* }`
    fn body(&mut self, element: &mut Element) -> Result<(), ParseError> {
        if self.eat_symbol(";") {
            return Ok(());
        }
        self.expect_symbol("{")?;
        while !self.eat_symbol("}") {
            if self.at_eof() {
                return Err(self.error("'}'"));
            }
            if let Some(member) = self.member()? {
                element.owned.push(member);
            }
        }
        Ok(())
    }

    fn import(&mut self) -> Result<Element, ParseError> {
        let mut target = self.qualified_name()?;
        if self.eat_symbol("::") {
            self.expect_symbol("*")?;
            target.push_str("::*");
        }
        self.expect_symbol(";")?;
        Ok(Element::new(None, ElementKind::Import { target }))
    }

    fn part_definition(&mut self) -> Result<Element, ParseError> {
        let name = self.name()?;
        let specializes = if self.eat_symbol(":>") || self.eat_keyword("specializes") {
            self.qualified_names()?
        } else {
            Vec::new()
        };
        let mut element = Element::new(Some(name), ElementKind::PartDefinition { specializes });
        self.body(&mut element)?;
        Ok(element)
    }

    fn part_usage(&mut self) -> Result<Element, ParseError> {
        let mut name = None;
        let mut definitions = Vec::new();
        let mut subsets = Vec::new();
        let mut redefines = Vec::new();
        let mut multiplicity = None;

        if self.at_name() && !self.at_keyword("subsets") && !self.at_keyword("redefines") {
            name = Some(self.name()?);
        }
        loop {
            if self.eat_symbol(":") {
                definitions.extend(self.qualified_names()?);
            } else if self.eat_symbol(":>") || self.eat_keyword("subsets") {
                subsets.extend(self.qualified_names()?);
            } else if self.eat_symbol(":>>") || self.eat_keyword("redefines") {
                redefines.extend(self.qualified_names()?);
            } else if self.at_symbol("[") {
                multiplicity = Some(self.multiplicity()?);
            } else {
                break;
            }
        }
        // `part :>> wheel` implicitly names the usage after what it redefines
        let name = name.or_else(|| redefines.first().map(|r| simple_name(r).to_string()));

        let mut element = Element::new(
            name,
            ElementKind::PartUsage {
                definitions,
                subsets,
                redefines,
                multiplicity,
            },
        );
        self.body(&mut element)?;
        Ok(element)
    }

    fn multiplicity(&mut self) -> Result<Multiplicity, ParseError> {
        self.expect_symbol("[")?;
        let multiplicity = if self.eat_symbol("*") {
            Multiplicity {
                lower: 0,
                upper: None,
            }
        } else {
            let lower = self.bound()?;
            let upper = if self.eat_symbol("..") {
                if self.eat_symbol("*") {
                    None
                } else {
                    Some(self.bound()?)
                }
            } else {
                Some(lower)
            };
            Multiplicity { lower, upper }
        };
        self.expect_symbol("]")?;
        Ok(multiplicity)
    }

    fn bound(&mut self) -> Result<u64, ParseError> {
        let token = self.peek().clone();
        let invalid = |value: f64| {
            ParseError::new(
                token.line,
                token.column,
                ParseErrorKind::InvalidMultiplicity(value),
            )
        };
        match token.kind {
            TokenKind::Integer(value) => {
                self.advance();
                u64::try_from(value).map_err(|_| invalid(value as f64))
            }
            TokenKind::Number(value) => Err(invalid(value)),
            _ => Err(self.error("a multiplicity bound")),
        }
    }

    fn attribute_usage(&mut self) -> Result<Element, ParseError> {
        let redefinition = self.eat_symbol(":>>") || self.eat_keyword("redefines");
        let name = if redefinition {
            let redefined = self.qualified_name()?;
            Some(simple_name(&redefined).to_string())
        } else if self.at_name() {
            Some(self.name()?)
        } else {
            None
        };
        let definition = if self.eat_symbol(":") {
            Some(self.qualified_name()?)
        } else {
            None
        };
        let value = if self.eat_symbol("=") {
            Some(self.expression()?)
        } else {
            None
        };

        let mut element = Element::new(
            name,
            ElementKind::AttributeUsage {
                definition,
                redefinition,
                value,
            },
        );
        self.body(&mut element)?;
        Ok(element)
    }

    // ============== Expressions ==============

    fn expression(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat_symbol("+") {
                BinaryOp::Add
            } else if self.eat_symbol("-") {
                BinaryOp::Subtract
            } else {
                return Ok(lhs);
            };
            let rhs = self.term()?;
            lhs = Expression::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat_symbol("*") {
                BinaryOp::Multiply
            } else if self.eat_symbol("/") {
                BinaryOp::Divide
            } else {
                return Ok(lhs);
            };
            let rhs = self.unary()?;
            lhs = Expression::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        if self.eat_symbol("-") {
            return Ok(Expression::Negate(Box::new(self.unary()?)));
        }
        if self.eat_symbol("+") {
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        match &self.peek().kind {
            TokenKind::Integer(value) => {
                let value = *value;
                self.advance();
                Ok(Expression::Integer(value))
            }
            TokenKind::Number(value) => {
                let value = *value;
                self.advance();
                Ok(Expression::Number(value))
            }
            TokenKind::Str(text) => {
                let text = text.clone();
                self.advance();
                Ok(Expression::Text(text))
            }
            TokenKind::Ident(_) | TokenKind::QuotedName(_) => {
                Ok(Expression::Reference(self.qualified_name()?))
            }
            TokenKind::Symbol("(") => {
                self.advance();
                let inner = self.expression()?;
                self.expect_symbol(")")?;
                Ok(inner)
            }
            _ => Err(self.error("an expression")),
        }
    }
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentNode;

    #[test]
    fn test_component_preamble() {
        let text = r#"
            package MyStructure {
                private import ScalarValues::*;
                part def Component {
                    attribute tx;
                    attribute typeID;
                    part children: Component[0..*];
                }
            }
        "#;
        let root = parse(text).unwrap();
        assert_eq!(root.kind, ElementKind::Namespace);
        assert_eq!(root.name, None);

        let package = &root.owned[0];
        assert_eq!(package.kind, ElementKind::Package);
        assert_eq!(package.name(), Some("MyStructure"));
        assert_eq!(
            package.owned[0].kind,
            ElementKind::Import {
                target: "ScalarValues::*".to_string()
            }
        );

        let definition = &package.owned[1];
        assert!(definition.is_part_definition());
        let children = &definition.owned[2];
        assert_eq!(
            children.kind,
            ElementKind::PartUsage {
                definitions: vec!["Component".to_string()],
                subsets: vec![],
                redefines: vec![],
                multiplicity: Some(Multiplicity {
                    lower: 0,
                    upper: None
                }),
            }
        );
        assert!(definition.owned[0].is_attribute());
        assert_eq!(definition.owned[0].evaluate(), Ok(None));
    }

    #[test]
    fn test_part_usage_clauses() {
        let root =
            parse("part 'left wheel' : Vehicle::Wheel, Part subsets children [2] { }").unwrap();
        let part = &root.owned[0];
        assert_eq!(part.name(), Some("left wheel"));
        let usage = part.as_part().unwrap();
        assert_eq!(usage.definitions, ["Vehicle::Wheel", "Part"]);
        assert_eq!(usage.subsets, ["children"]);
        assert!(usage.is_defined_by("Wheel"));
    }

    #[test]
    fn test_redefined_part_takes_name() {
        let root = parse("part :>> engine;").unwrap();
        assert_eq!(root.owned[0].name(), Some("engine"));
    }

    #[test]
    fn test_attribute_usages() {
        let root = parse(
            r#"part p {
                attribute mass : Real = 2 * -1.5;
                attribute :>> label = "x";
                attribute def Label;
            }"#,
        )
        .unwrap();
        let part = &root.owned[0];
        assert_eq!(
            part.owned[0].kind,
            ElementKind::AttributeUsage {
                definition: Some("Real".to_string()),
                redefinition: false,
                value: Some(Expression::Binary {
                    op: BinaryOp::Multiply,
                    lhs: Box::new(Expression::Integer(2)),
                    rhs: Box::new(Expression::Negate(Box::new(Expression::Number(1.5)))),
                }),
            }
        );
        assert_eq!(part.owned[1].name(), Some("label"));
        assert_eq!(part.owned[2].kind, ElementKind::AttributeDefinition);
    }

    #[test]
    fn test_precedence() {
        let root = parse("attribute :>> v = 1 + 2 * 3 - 4 / 2;").unwrap();
        assert_eq!(
            root.owned[0].evaluate(),
            Ok(Some(crate::document::Value::Number(5.0)))
        );
    }

    #[test]
    fn test_error_positions() {
        let err = parse("package P {\n  part a\n}").unwrap_err();
        assert_eq!((err.line, err.column), (3, 1));
        assert_eq!(
            err.kind,
            ParseErrorKind::UnexpectedToken {
                expected: "{",
                found: "'}'".to_string()
            }
        );

        let err = parse("package P {").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof("'}'"));

        let err = parse("part a[1.5];").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidMultiplicity(1.5));

        let err = parse("connection c;").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::UnexpectedToken {
                expected: "a declaration",
                ..
            }
        ));
    }
}
