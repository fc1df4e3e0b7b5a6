use log::{debug, trace};

use super::{Token, TokenKind, KEYWORDS, ONE_SYMBOL_OPERATORS, TWO_SYMBOLS_OPERATORS};
use crate::error::{CompileError, CompileResult, Position};

#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    tokens: Vec<Token>,
    index: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            tokens: vec![],
            index: 0,
            line: 1,
            column: 0,
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.index];
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        c
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut s = String::new();
        while self.index < self.chars.len() && pred(self.chars[self.index]) {
            s.push(self.advance());
        }
        s
    }

    fn new_token(&mut self, kind: TokenKind, lexeme: String, start: Position) {
        trace!("{}:{} {} {:?}", start.line, start.column, kind, lexeme);
        self.tokens.push(Token {
            kind,
            lexeme,
            line: start.line,
            column: start.column,
        });
    }

    fn parse_number(&mut self) {
        let start = self.position();
        let s = self.take_while(|c| c.is_ascii_digit() || c == '.');
        self.new_token(TokenKind::Number, s, start);
    }

    fn parse_identifier(&mut self) {
        let start = self.position();
        let s = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');

        if KEYWORDS.contains(s.as_str()) {
            self.new_token(TokenKind::Keyword, s, start);
        } else {
            self.new_token(TokenKind::Identifier, s, start);
        }
    }

    fn parse_string(&mut self) -> CompileResult<()> {
        let start = self.position();
        let quote = self.advance();
        let mut s = String::from(quote);
        s.push_str(&self.take_while(|c| c != quote));
        if self.index >= self.chars.len() {
            return Err(CompileError::lexical("Unterminated string literal", start));
        }
        s.push(self.advance());
        self.new_token(TokenKind::String, s, start);
        Ok(())
    }

    fn parse_operator(&mut self) -> CompileResult<()> {
        let start = self.position();
        let c = self.chars[self.index];
        let c2 = self.chars[self.index..].iter().take(2).collect::<String>();

        if TWO_SYMBOLS_OPERATORS.contains(c2.as_str()) {
            self.advance();
            self.advance();
            self.new_token(TokenKind::Operator, c2, start);
        } else if ONE_SYMBOL_OPERATORS.contains(&c) {
            self.advance();
            self.new_token(TokenKind::Operator, c.to_string(), start);
        } else {
            return Err(CompileError::lexical(
                format!("Unexpected character '{}'", c),
                start,
            ));
        }
        Ok(())
    }

    fn _tokenize(&mut self) -> CompileResult<()> {
        while self.index < self.chars.len() {
            let c = self.chars[self.index];

            if c.is_whitespace() {
                self.advance();
            } else if c.is_ascii_digit() {
                self.parse_number();
            } else if c.is_ascii_alphabetic() || c == '_' {
                self.parse_identifier();
            } else if c == '"' || c == '\'' {
                self.parse_string()?;
            } else {
                self.parse_operator()?;
            }
        }
        Ok(())
    }

    pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
        if source.trim().is_empty() {
            return Err(CompileError::validation("Source code cannot be empty"));
        }

        let mut lexer = Lexer::new(source);
        lexer._tokenize()?;
        debug!("lexed {} tokens", lexer.tokens.len());

        Ok(lexer.tokens)
    }
}
