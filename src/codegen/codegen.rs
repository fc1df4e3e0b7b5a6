use log::debug;

use crate::ir::Instruction;
use crate::parser::{BinOpKind, UnaryOpKind};

const WORD_SIZE: usize = 8;

/// Translates optimized IR into x86-flavoured pseudo-assembly.
///
/// Every name stays a symbolic memory operand; nothing is register-allocated.
pub struct Codegen {
    lines: Vec<String>,
}

impl Default for Codegen {
    fn default() -> Self {
        Self::new()
    }
}

fn set_instruction(op: BinOpKind) -> &'static str {
    match op {
        BinOpKind::Equal => "sete",
        BinOpKind::NotEqual => "setne",
        BinOpKind::LessThan => "setl",
        BinOpKind::LessEqual => "setle",
        BinOpKind::GreaterThan => "setg",
        BinOpKind::GreaterEqual => "setge",
        _ => unreachable!("{:?} is not a comparison", op),
    }
}

/// How many parameters at the start of a run of `param` lines are formal
/// parameters, rather than arguments of the call that follows the run.
fn formal_count(run: &[Instruction], next: Option<&Instruction>) -> usize {
    match next {
        Some(Instruction::Call { argc, .. }) | Some(Instruction::New { argc, .. }) => {
            run.len().saturating_sub(*argc)
        }
        _ => run.len(),
    }
}

impl Codegen {
    pub fn new() -> Self {
        Self { lines: vec![] }
    }

    pub fn generate(mut self, instructions: &[Instruction]) -> Vec<String> {
        self.emit(".intel_syntax noprefix");

        let mut index = 0;
        while index < instructions.len() {
            if let Instruction::Param(_) = instructions[index] {
                let end = instructions[index..]
                    .iter()
                    .position(|i| !matches!(i, Instruction::Param(_)))
                    .map_or(instructions.len(), |n| index + n);
                self.gen_params(&instructions[index..end], instructions.get(end));
                index = end;
            } else {
                self.gen_instruction(&instructions[index]);
                index += 1;
            }
        }

        debug!("generated {} assembly lines", self.lines.len());
        self.lines
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn epilogue(&mut self) {
        self.emit("  mov rsp, rbp");
        self.emit("  pop rbp");
        self.emit("  ret");
    }

    fn gen_params(&mut self, run: &[Instruction], next: Option<&Instruction>) {
        let formals = formal_count(run, next);

        for (i, instruction) in run.iter().enumerate() {
            let Instruction::Param(value) = instruction else {
                continue;
            };
            if i < formals {
                self.emit(format!(
                    "  mov rax, [rbp+{}]",
                    2 * WORD_SIZE + i * WORD_SIZE
                ));
                self.emit(format!("  mov {}, rax", value));
            } else {
                self.emit(format!("  push {}", value));
            }
        }
    }

    fn gen_binary(&mut self, dest: &str, left: &str, op: BinOpKind, right: &str) {
        self.emit(format!("  mov rax, {}", left));
        match op {
            BinOpKind::Add => self.emit(format!("  add rax, {}", right)),
            BinOpKind::Sub => self.emit(format!("  sub rax, {}", right)),
            BinOpKind::Mul => self.emit(format!("  imul rax, {}", right)),
            BinOpKind::Div => {
                self.emit("  xor rdx, rdx");
                self.emit(format!("  idiv {}", right));
            }
            BinOpKind::Mod => {
                self.emit("  xor rdx, rdx");
                self.emit(format!("  idiv {}", right));
                self.emit("  mov rax, rdx");
            }
            cmp if cmp.is_comparison() => {
                self.emit(format!("  cmp rax, {}", right));
                self.emit(format!("  {} al", set_instruction(cmp)));
                self.emit("  movzx rax, al");
            }
            BinOpKind::LogicalAnd => self.emit(format!("  and rax, {}", right)),
            _ => self.emit(format!("  or rax, {}", right)),
        }
        self.emit(format!("  mov {}, rax", dest));
    }

    fn gen_call(&mut self, dest: &str, target: &str, argc: usize) {
        self.emit(format!("  call {}", target));
        self.emit(format!("  mov {}, rax", dest));
        if argc > 0 {
            self.emit(format!("  add rsp, {}", argc * WORD_SIZE));
        }
    }

    fn gen_instruction(&mut self, instruction: &Instruction) {
        match instruction {
            Instruction::Function(name) => {
                self.emit(format!("{}:", name));
                self.emit("  push rbp");
                self.emit("  mov rbp, rsp");
            }
            Instruction::Class(name) => self.emit(format!("# class {}", name)),
            Instruction::Return(value) => {
                if let Some(value) = value {
                    self.emit(format!("  mov rax, {}", value));
                }
                self.epilogue();
            }
            Instruction::Label(name) => self.emit(format!("{}:", name)),
            Instruction::Goto(label) => self.emit(format!("  jmp {}", label)),
            Instruction::CondGoto { cond, label } => {
                self.emit(format!("  cmp {}, 0", cond));
                self.emit(format!("  jne {}", label));
            }
            Instruction::Param(value) => self.emit(format!("  push {}", value)),
            Instruction::Assign { dest, value } => {
                self.emit(format!("  mov rax, {}", value));
                self.emit(format!("  mov {}, rax", dest));
            }
            Instruction::Binary {
                dest,
                left,
                op,
                right,
            } => self.gen_binary(dest, left, *op, right),
            Instruction::Unary { dest, op, operand } => {
                self.emit(format!("  mov rax, {}", operand));
                match op {
                    UnaryOpKind::Neg => self.emit("  neg rax"),
                    UnaryOpKind::Not => {
                        self.emit("  cmp rax, 0");
                        self.emit("  sete al");
                        self.emit("  movzx rax, al");
                    }
                }
                self.emit(format!("  mov {}, rax", dest));
            }
            Instruction::Call { dest, name, argc } => self.gen_call(dest, name, *argc),
            Instruction::New { dest, class, argc } => {
                self.gen_call(dest, &format!("{}.constructor", class), *argc)
            }
            Instruction::NewArray(dest) => self.gen_call(dest, "__new_array", 0),
            Instruction::NewObject(dest) => self.gen_call(dest, "__new_object", 0),
            Instruction::IndexStore {
                array,
                index,
                value,
            } => {
                self.emit(format!("  mov rax, {}", value));
                self.emit(format!("  mov [{}+{}], rax", array, index * WORD_SIZE));
            }
            Instruction::Store {
                object,
                field,
                value,
            } => {
                self.emit(format!("  mov rax, {}", value));
                self.emit(format!("  mov [{}.{}], rax", object, field));
            }
            Instruction::Load {
                dest,
                object,
                field,
            } => {
                self.emit(format!("  mov rax, [{}.{}]", object, field));
                self.emit(format!("  mov {}, rax", dest));
            }
            Instruction::Closure { dest, label } => {
                self.emit(format!("  lea rax, [{}]", label));
                self.emit(format!("  mov {}, rax", dest));
            }
        }
    }
}
