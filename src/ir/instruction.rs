use std::fmt;

use serde::{Serialize, Serializer};

use crate::parser::{BinOpKind, UnaryOpKind};

/// One three-address instruction. Operands are names, temps (`t0`) or literal text.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Assign {
        dest: String,
        value: String,
    },
    Binary {
        dest: String,
        left: String,
        op: BinOpKind,
        right: String,
    },
    Unary {
        dest: String,
        op: UnaryOpKind,
        operand: String,
    },
    Label(String),
    Goto(String),
    CondGoto {
        cond: String,
        label: String,
    },
    Call {
        dest: String,
        name: String,
        argc: usize,
    },
    Param(String),
    Return(Option<String>),
    Function(String),
    Class(String),
    New {
        dest: String,
        class: String,
        argc: usize,
    },
    NewArray(String),
    NewObject(String),
    IndexStore {
        array: String,
        index: usize,
        value: String,
    },
    Store {
        object: String,
        field: String,
        value: String,
    },
    Load {
        dest: String,
        object: String,
        field: String,
    },
    Closure {
        dest: String,
        label: String,
    },
}

impl Instruction {
    /// The plain name this instruction writes, if any.
    pub fn dest(&self) -> Option<&str> {
        match self {
            Instruction::Assign { dest, .. }
            | Instruction::Binary { dest, .. }
            | Instruction::Unary { dest, .. }
            | Instruction::Call { dest, .. }
            | Instruction::New { dest, .. }
            | Instruction::Load { dest, .. }
            | Instruction::Closure { dest, .. } => Some(dest.as_str()),
            Instruction::NewArray(dest) | Instruction::NewObject(dest) => Some(dest.as_str()),
            _ => None,
        }
    }

    /// Names and literals read by a pure right-hand side.
    pub fn operands(&self) -> Vec<&str> {
        match self {
            Instruction::Assign { value, .. } => vec![value.as_str()],
            Instruction::Binary { left, right, .. } => vec![left.as_str(), right.as_str()],
            Instruction::Unary { operand, .. } => vec![operand.as_str()],
            _ => vec![],
        }
    }

    /// Text after `dest = ` for assignment-shaped instructions.
    pub fn rhs(&self) -> Option<String> {
        match self {
            Instruction::Assign { value, .. } => Some(value.clone()),
            Instruction::Binary {
                left, op, right, ..
            } => Some(format!("{} {} {}", left, op, right)),
            Instruction::Unary { op, operand, .. } => Some(format!("{}{}", op, operand)),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { dest, value } => write!(f, "{} = {}", dest, value),
            Instruction::Binary {
                dest,
                left,
                op,
                right,
            } => write!(f, "{} = {} {} {}", dest, left, op, right),
            Instruction::Unary { dest, op, operand } => write!(f, "{} = {}{}", dest, op, operand),
            Instruction::Label(name) => write!(f, "{}:", name),
            Instruction::Goto(label) => write!(f, "goto {}", label),
            Instruction::CondGoto { cond, label } => write!(f, "if {} goto {}", cond, label),
            Instruction::Call { dest, name, argc } => {
                write!(f, "{} = call {}, {}", dest, name, argc)
            }
            Instruction::Param(value) => write!(f, "param {}", value),
            Instruction::Return(Some(value)) => write!(f, "return {}", value),
            Instruction::Return(None) => write!(f, "return"),
            Instruction::Function(name) => write!(f, "function {}:", name),
            Instruction::Class(name) => write!(f, "class {}:", name),
            Instruction::New { dest, class, argc } => {
                write!(f, "{} = new {}, {}", dest, class, argc)
            }
            Instruction::NewArray(dest) => write!(f, "{} = []", dest),
            Instruction::NewObject(dest) => write!(f, "{} = {{}}", dest),
            Instruction::IndexStore {
                array,
                index,
                value,
            } => write!(f, "{}[{}] = {}", array, index, value),
            Instruction::Store {
                object,
                field,
                value,
            } => write!(f, "{}.{} = {}", object, field, value),
            Instruction::Load {
                dest,
                object,
                field,
            } => write!(f, "{} = {}.{}", dest, object, field),
            Instruction::Closure { dest, label } => write!(f, "{} = closure {}", dest, label),
        }
    }
}

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Renders instructions one per line, the form the optimizer and code generator are shown with.
pub fn to_lines(instructions: &[Instruction]) -> Vec<String> {
    instructions.iter().map(|i| i.to_string()).collect()
}
