use std::collections::HashMap;

use log::{debug, trace};

use crate::ir::Instruction;
use crate::parser::{BinOpKind, UnaryOpKind};

/// Single forward pass of constant folding and propagation, followed by
/// removal of repeated assignments.
///
/// There is no control-flow graph. Everything known about names is forgotten
/// at each barrier instead.
pub struct Optimizer {
    constants: HashMap<String, String>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

fn as_number(operand: &str) -> Option<f64> {
    let digits = operand.strip_prefix('-').unwrap_or(operand);
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    operand.parse().ok()
}

fn is_literal(operand: &str) -> bool {
    as_number(operand).is_some()
        || operand.starts_with('"')
        || matches!(operand, "true" | "false" | "null")
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Control can enter at a label or function, leaves at a return, and a call
/// may write any global.
fn is_barrier(instruction: &Instruction) -> bool {
    matches!(
        instruction,
        Instruction::Label(_)
            | Instruction::Function(_)
            | Instruction::Class(_)
            | Instruction::Return(_)
            | Instruction::Call { .. }
            | Instruction::New { .. }
    )
}

fn fold_binary(op: BinOpKind, left: &str, right: &str) -> Option<String> {
    let a = as_number(left)?;
    let b = as_number(right)?;

    let value = match op {
        BinOpKind::Add => format_number(a + b),
        BinOpKind::Sub => format_number(a - b),
        BinOpKind::Mul => format_number(a * b),
        BinOpKind::Div if b != 0.0 => format_number(a / b),
        BinOpKind::Mod if b != 0.0 => format_number(a % b),
        BinOpKind::Div | BinOpKind::Mod => return None,
        BinOpKind::Equal => (a == b).to_string(),
        BinOpKind::NotEqual => (a != b).to_string(),
        BinOpKind::LessThan => (a < b).to_string(),
        BinOpKind::LessEqual => (a <= b).to_string(),
        BinOpKind::GreaterThan => (a > b).to_string(),
        BinOpKind::GreaterEqual => (a >= b).to_string(),
        BinOpKind::LogicalAnd | BinOpKind::LogicalOr => return None,
    };
    Some(value)
}

fn fold_unary(op: UnaryOpKind, operand: &str) -> Option<String> {
    match op {
        UnaryOpKind::Neg => as_number(operand).map(|n| format_number(-n)),
        UnaryOpKind::Not => match operand {
            "true" => Some("false".to_string()),
            "false" => Some("true".to_string()),
            _ => None,
        },
    }
}

impl Optimizer {
    pub fn new() -> Self {
        Self {
            constants: HashMap::new(),
        }
    }

    pub fn optimize(mut self, instructions: &[Instruction]) -> Vec<Instruction> {
        let folded = self.fold(instructions);
        let optimized = dedupe(folded);
        debug!(
            "optimized {} instructions into {}",
            instructions.len(),
            optimized.len()
        );
        optimized
    }

    fn resolve(&self, operand: &str) -> String {
        self.constants
            .get(operand)
            .cloned()
            .unwrap_or_else(|| operand.to_string())
    }

    fn record(&mut self, dest: &str, value: &str) {
        if is_literal(value) {
            self.constants.insert(dest.to_string(), value.to_string());
        } else {
            self.constants.remove(dest);
        }
    }

    fn fold(&mut self, instructions: &[Instruction]) -> Vec<Instruction> {
        let mut out = Vec::with_capacity(instructions.len());

        for instruction in instructions {
            match instruction {
                Instruction::Assign { dest, value } => {
                    if dest == value {
                        trace!("dropped self-assignment of {}", dest);
                        continue;
                    }
                    let value = self.resolve(value);
                    self.record(dest, &value);
                    out.push(Instruction::Assign {
                        dest: dest.clone(),
                        value,
                    });
                }
                Instruction::Binary {
                    dest,
                    left,
                    op,
                    right,
                } => {
                    let left = self.resolve(left);
                    let right = self.resolve(right);
                    if let Some(value) = fold_binary(*op, &left, &right) {
                        trace!("folded {} = {} {} {} to {}", dest, left, op, right, value);
                        self.record(dest, &value);
                        out.push(Instruction::Assign {
                            dest: dest.clone(),
                            value,
                        });
                    } else {
                        self.constants.remove(dest);
                        out.push(Instruction::Binary {
                            dest: dest.clone(),
                            left,
                            op: *op,
                            right,
                        });
                    }
                }
                Instruction::Unary { dest, op, operand } => {
                    let operand = self.resolve(operand);
                    if let Some(value) = fold_unary(*op, &operand) {
                        self.record(dest, &value);
                        out.push(Instruction::Assign {
                            dest: dest.clone(),
                            value,
                        });
                    } else {
                        self.constants.remove(dest);
                        out.push(Instruction::Unary {
                            dest: dest.clone(),
                            op: *op,
                            operand,
                        });
                    }
                }
                Instruction::IndexStore {
                    array,
                    index,
                    value,
                } => out.push(Instruction::IndexStore {
                    array: array.clone(),
                    index: *index,
                    value: self.resolve(value),
                }),
                Instruction::Store {
                    object,
                    field,
                    value,
                } => out.push(Instruction::Store {
                    object: object.clone(),
                    field: field.clone(),
                    value: self.resolve(value),
                }),
                other if is_barrier(other) => {
                    self.constants.clear();
                    out.push(other.clone());
                }
                other => {
                    if let Some(dest) = other.dest() {
                        self.constants.remove(dest);
                    }
                    out.push(other.clone());
                }
            }
        }

        out
    }
}

/// Drops an assignment whose destination already holds the same right-hand
/// side. A write to a name forgets every remembered line that read it.
fn dedupe(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut seen: HashMap<String, (String, Vec<String>)> = HashMap::new();
    let mut out = Vec::with_capacity(instructions.len());

    for instruction in instructions {
        if is_barrier(&instruction) {
            seen.clear();
        }

        if let (Some(dest), Some(rhs)) = (instruction.dest(), instruction.rhs()) {
            if seen.get(dest).is_some_and(|(prev, _)| *prev == rhs) {
                trace!("dropped duplicate {}", instruction);
                continue;
            }
            let dest = dest.to_string();
            let operands: Vec<String> =
                instruction.operands().iter().map(|s| s.to_string()).collect();
            seen.retain(|_, (_, reads)| !reads.contains(&dest));
            if operands.contains(&dest) {
                seen.remove(&dest);
            } else {
                seen.insert(dest, (rhs, operands));
            }
        } else if let Some(dest) = instruction.dest() {
            let dest = dest.to_string();
            seen.remove(&dest);
            seen.retain(|_, (_, reads)| !reads.contains(&dest));
        }

        out.push(instruction);
    }

    out
}
