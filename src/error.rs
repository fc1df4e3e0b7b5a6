use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

/// The pipeline stage that rejected the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Validation,
    Lexical,
    Syntax,
    Semantic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Validation => "Validation",
            Phase::Lexical => "Lexical",
            Phase::Syntax => "Syntax",
            Phase::Semantic => "Semantic",
        };
        write!(f, "{}", s)
    }
}

/// Line (1-based) and column (0-based) of a token in the source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Clone, Debug, PartialEq, Error, Serialize)]
#[error("{phase} error{}: {message}", at(.position))]
pub struct CompileError {
    pub phase: Phase,
    pub message: String,
    pub position: Option<Position>,
}

fn at(position: &Option<Position>) -> String {
    match position {
        Some(p) => format!(" at line {}, column {}", p.line, p.column),
        None => String::new(),
    }
}

impl CompileError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Validation,
            message: message.into(),
            position: None,
        }
    }

    pub fn lexical(message: impl Into<String>, position: Position) -> Self {
        Self {
            phase: Phase::Lexical,
            message: message.into(),
            position: Some(position),
        }
    }

    pub fn syntax(message: impl Into<String>, position: Option<Position>) -> Self {
        Self {
            phase: Phase::Syntax,
            message: message.into(),
            position,
        }
    }

    pub fn semantic(message: impl Into<String>, position: Option<Position>) -> Self {
        Self {
            phase: Phase::Semantic,
            message: message.into(),
            position,
        }
    }
}
