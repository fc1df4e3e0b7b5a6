use std::fmt;

use phf::phf_set;
use serde::Serialize;

use crate::error::Position;

pub static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "let",
    "const",
    "var",
    "function",
    "return",
    "if",
    "else",
    "class",
    "new",
    "true",
    "false",
    "null",
};

pub static ONE_SYMBOL_OPERATORS: phf::Set<char> = phf_set! {
    '+', '-', '*', '/', '%', '=', '<', '>', '!',
    '(', ')', '{', '}', '[', ']',
    ';', ',', '.', ':',
};

pub static TWO_SYMBOLS_OPERATORS: phf::Set<&'static str> = phf_set! {
    "==", "!=", "<=", ">=", "=>", "&&", "||", "+=", "-=", "*=", "/=",
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    String,
    Operator,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Operator => "operator",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. String lexemes keep their quotes.
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn is(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.kind == kind && self.lexeme == lexeme
    }

    pub fn is_operator(&self, lexeme: &str) -> bool {
        self.is(TokenKind::Operator, lexeme)
    }

    pub fn is_keyword(&self, lexeme: &str) -> bool {
        self.is(TokenKind::Keyword, lexeme)
    }

    /// The literal contents: string tokens lose their delimiters.
    pub fn value(&self) -> &str {
        match self.kind {
            TokenKind::String => &self.lexeme[1..self.lexeme.len() - 1],
            _ => &self.lexeme,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.lexeme)
    }
}
