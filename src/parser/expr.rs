use std::fmt;

use serde::Serialize;

use super::Identifier;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,
}

impl BinOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
            BinOpKind::Equal => "==",
            BinOpKind::NotEqual => "!=",
            BinOpKind::LessThan => "<",
            BinOpKind::LessEqual => "<=",
            BinOpKind::GreaterThan => ">",
            BinOpKind::GreaterEqual => ">=",
            BinOpKind::LogicalAnd => "&&",
            BinOpKind::LogicalOr => "||",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinOpKind::Add | BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Mod
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOpKind::Equal
                | BinOpKind::NotEqual
                | BinOpKind::LessThan
                | BinOpKind::LessEqual
                | BinOpKind::GreaterThan
                | BinOpKind::GreaterEqual
        )
    }
}

impl fmt::Display for BinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOpKind {
    Neg,
    Not,
}

impl UnaryOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOpKind::Neg => "-",
            UnaryOpKind::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AssignOpKind {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            AssignOpKind::Assign => "=",
            AssignOpKind::AddAssign => "+=",
            AssignOpKind::SubAssign => "-=",
            AssignOpKind::MulAssign => "*=",
            AssignOpKind::DivAssign => "/=",
        }
    }

    /// The arithmetic a compound assignment applies before storing.
    pub fn bin_op(&self) -> Option<BinOpKind> {
        match self {
            AssignOpKind::Assign => None,
            AssignOpKind::AddAssign => Some(BinOpKind::Add),
            AssignOpKind::SubAssign => Some(BinOpKind::Sub),
            AssignOpKind::MulAssign => Some(BinOpKind::Mul),
            AssignOpKind::DivAssign => Some(BinOpKind::Div),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Literal {
    Number(String),
    String(String),
    Boolean(bool),
    Null,
}

impl fmt::Display for Literal {
    /// Operand spelling used by the IR: strings are re-quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    Ident(Identifier),
    Unary(UnaryOpKind, Box<Expr>),
    Binary(BinOpKind, Box<Expr>, Box<Expr>),
    Assign(Box<Expr>, AssignOpKind, Box<Expr>),
    Call(Identifier, Vec<Expr>),
    MethodCall(Box<Expr>, String, Vec<Expr>),
    Member(Box<Expr>, String),
    New(Identifier, Vec<Expr>),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Arrow(Identifier, Box<Expr>),
}
