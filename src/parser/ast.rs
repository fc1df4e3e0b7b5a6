use serde::Serialize;

use super::Expr;
use crate::error::Position;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Program(pub Vec<Stmt>);

/// A name together with where it was written.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Identifier {
    pub name: String,
    pub position: Position,
}

impl Identifier {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Block(pub Vec<Stmt>);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

impl DeclKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclKind::Let => "let",
            DeclKind::Const => "const",
            DeclKind::Var => "var",
        }
    }
}

/// Function declarations and class methods share this shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FuncDef {
    pub name: Identifier,
    pub params: Vec<Identifier>,
    pub body: Block,
}

impl FuncDef {
    pub fn is_constructor(&self) -> bool {
        self.name.name == "constructor"
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassDef {
    pub name: Identifier,
    pub methods: Vec<FuncDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Stmt {
    Function(FuncDef),
    Class(ClassDef),
    Variable(DeclKind, Identifier, Option<Expr>),
    If(Expr, Block, Option<Block>),
    Return(Option<Expr>),
    Expr(Expr),
}
