//! Tokenizer for the structural notation subset

use super::parser::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    /// `'quoted name'`
    QuotedName(String),
    Str(String),
    Integer(i64),
    Number(f64),
    Symbol(&'static str),
    Eof,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Ident(ident) => format!("'{ident}'"),
            TokenKind::QuotedName(name) => format!("name '{name}'"),
            TokenKind::Str(text) => format!("string \"{text}\""),
            TokenKind::Integer(value) => format!("number {value}"),
            TokenKind::Number(value) => format!("number {value}"),
            TokenKind::Symbol(symbol) => format!("'{symbol}'"),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

// Longest first
const SYMBOLS: [&str; 19] = [
    ":>>", "::", ":>", "..", "{", "}", "(", ")", "[", "]", ";", ":", "=", ",", "+", "-", "*",
    "/", ".",
];

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

/// Split `text` into tokens, always terminated by [`TokenKind::Eof`]
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        chars: text.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    loop {
        lexer.skip_trivia()?;
        let (line, column) = (lexer.line, lexer.column);
        let Some(c) = lexer.peek(0) else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                column,
            });
            return Ok(tokens);
        };

        let kind = if c.is_alphabetic() || c == '_' {
            TokenKind::Ident(lexer.take_while(|c| c.is_alphanumeric() || c == '_'))
        } else if c.is_ascii_digit() {
            lexer.number(line, column)?
        } else if c == '\'' || c == '"' {
            let text = lexer.quoted(c, line, column)?;
            if c == '\'' {
                TokenKind::QuotedName(text)
            } else {
                TokenKind::Str(text)
            }
        } else if let Some(symbol) = lexer.symbol() {
            TokenKind::Symbol(symbol)
        } else {
            return Err(ParseError::new(
                line,
                column,
                ParseErrorKind::UnexpectedCharacter(c),
            ));
        };
        tokens.push(Token { kind, line, column });
    }
}

impl Lexer {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek(0).filter(|c| keep(*c)) {
            text.push(c);
            self.bump();
        }
        text
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while self.peek(0).is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(0), self.peek(1)) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => {
                                return Err(ParseError::new(
                                    line,
                                    column,
                                    ParseErrorKind::UnterminatedComment,
                                ));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn number(&mut self, line: usize, column: usize) -> Result<TokenKind, ParseError> {
        let mut text = self.take_while(|c| c.is_ascii_digit());
        let mut integral = true;
        // `0..*` is a range, not a fraction
        if self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            integral = false;
        }
        if matches!(self.peek(0), Some('e' | 'E')) {
            let signed = matches!(self.peek(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
                integral = false;
            }
        }
        if self.peek(0).is_some_and(|c| c.is_alphabetic() || c == '_') {
            text.push_str(&self.take_while(|c| c.is_alphanumeric() || c == '_'));
            return Err(ParseError::new(
                line,
                column,
                ParseErrorKind::InvalidNumber(text),
            ));
        }
        // Integer literals stay exact; only those beyond i64 fall back to f64
        if integral && let Ok(value) = text.parse::<i64>() {
            return Ok(TokenKind::Integer(value));
        }
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ParseError::new(line, column, ParseErrorKind::InvalidNumber(text)))
    }

    /// Quoted text up to the matching `quote`; `\` escapes the next character
    fn quoted(&mut self, quote: char, line: usize, column: usize) -> Result<String, ParseError> {
        let unterminated = || ParseError::new(line, column, ParseErrorKind::UnterminatedString);
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump().ok_or_else(unterminated)? {
                '\\' => text.push(self.bump().ok_or_else(unterminated)?),
                c if c == quote => return Ok(text),
                c => text.push(c),
            }
        }
    }

    fn symbol(&mut self) -> Option<&'static str> {
        let symbol = SYMBOLS.into_iter().find(|symbol| {
            symbol
                .chars()
                .enumerate()
                .all(|(i, c)| self.peek(i) == Some(c))
        })?;
        for _ in 0..symbol.len() {
            self.bump();
        }
        Some(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_ranges_are_not_fractions() {
        assert_eq!(
            kinds("[0..*]"),
            [
                TokenKind::Symbol("["),
                TokenKind::Integer(0),
                TokenKind::Symbol(".."),
                TokenKind::Symbol("*"),
                TokenKind::Symbol("]"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1.5 2e3 4.0E-2 7"),
            [
                TokenKind::Number(1.5),
                TokenKind::Number(2000.0),
                TokenKind::Number(0.04),
                TokenKind::Integer(7),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_integers_keep_full_precision() {
        assert_eq!(
            kinds("9007199254740993 99999999999999999999"),
            [
                TokenKind::Integer(9_007_199_254_740_993),
                TokenKind::Number(1e20),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            kinds(r#"'driver\'s seat' "a=\"q\" \\ b""#),
            [
                TokenKind::QuotedName("driver's seat".to_string()),
                TokenKind::Str(r#"a="q" \ b"#.to_string()),
                TokenKind::Eof,
            ]
        );

        let err = tokenize(r"'trailing\").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
    }

    #[test]
    fn test_redefinition_symbols_and_comments() {
        assert_eq!(
            kinds("attribute :>> tx // trailing\n /* block\n comment */ = 'odd name';"),
            [
                TokenKind::Ident("attribute".to_string()),
                TokenKind::Symbol(":>>"),
                TokenKind::Ident("tx".to_string()),
                TokenKind::Symbol("="),
                TokenKind::QuotedName("odd name".to_string()),
                TokenKind::Symbol(";"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("part\n  a;").unwrap();
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn test_errors() {
        let err = tokenize("part a { # }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedCharacter('#'));
        assert_eq!((err.line, err.column), (1, 10));

        let err = tokenize("x = \"open").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);

        let err = tokenize("/* never closed").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedComment);

        let err = tokenize("12abc").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidNumber("12abc".to_string()));
    }
}
