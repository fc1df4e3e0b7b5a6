use std::fmt;

use serde::{Serialize, Serializer};

use crate::parser::{BinOpKind, Literal};

/// Coarse static type inferred for display; never used to reject a program.
#[derive(Clone, Debug, PartialEq)]
pub enum Ty {
    Unknown,
    Number,
    String,
    Boolean,
    Null,
    Array,
    Object,
    Func(Box<Ty>),
    Class(String),
    Instance(String),
}

impl Ty {
    pub fn of_literal(literal: &Literal) -> Ty {
        match literal {
            Literal::Number(_) => Ty::Number,
            Literal::String(_) => Ty::String,
            Literal::Boolean(_) => Ty::Boolean,
            Literal::Null => Ty::Null,
        }
    }

    pub fn of_binary(op: BinOpKind, left: &Ty, right: &Ty) -> Ty {
        match op {
            BinOpKind::Add => match (left, right) {
                (Ty::String, _) | (_, Ty::String) => Ty::String,
                (Ty::Number, Ty::Number) => Ty::Number,
                _ => Ty::Unknown,
            },
            op if op.is_arithmetic() => Ty::Number,
            op if op.is_comparison() => Ty::Boolean,
            _ => match (left, right) {
                (Ty::Boolean, Ty::Boolean) => Ty::Boolean,
                _ => Ty::Unknown,
            },
        }
    }

    pub fn get_return_type(&self) -> Option<Ty> {
        match self {
            Ty::Func(ty) => Some(*ty.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Unknown => write!(f, "unknown"),
            Ty::Number => write!(f, "number"),
            Ty::String => write!(f, "string"),
            Ty::Boolean => write!(f, "boolean"),
            Ty::Null => write!(f, "null"),
            Ty::Array => write!(f, "array"),
            Ty::Object => write!(f, "object"),
            Ty::Func(ret) => write!(f, "function -> {}", ret),
            Ty::Class(name) => write!(f, "class {}", name),
            Ty::Instance(name) => write!(f, "{}", name),
        }
    }
}

impl Serialize for Ty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
