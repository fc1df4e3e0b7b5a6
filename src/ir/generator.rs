use log::debug;

use super::Instruction;
use crate::parser::{BinOpKind, Block, ClassDef, Expr, FuncDef, Program, Stmt};

/// Lowers an AST into three-address code.
///
/// Temp and label counters live here, so every generator numbers from `t0`/`L0`.
pub struct IrGenerator {
    instructions: Vec<Instruction>,
    temp_index: usize,
    label_index: usize,
    /// Number of function bodies currently being lowered.
    function_depth: usize,
}

impl Default for IrGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IrGenerator {
    pub fn new() -> Self {
        Self {
            instructions: vec![],
            temp_index: 0,
            label_index: 0,
            function_depth: 0,
        }
    }

    pub fn generate(mut self, program: &Program) -> Vec<Instruction> {
        for stmt in program.0.iter() {
            self.gen_stmt(stmt);
        }

        debug!(
            "generated {} instructions ({} temps, {} labels)",
            self.instructions.len(),
            self.temp_index,
            self.label_index
        );
        self.instructions
    }

    fn new_temp(&mut self) -> String {
        let s = format!("t{}", self.temp_index);
        self.temp_index += 1;
        s
    }

    fn new_label(&mut self) -> String {
        let s = format!("L{}", self.label_index);
        self.label_index += 1;
        s
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn gen_block(&mut self, block: &Block) {
        for stmt in block.0.iter() {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Function(func_def) => {
                self.gen_declaration(|g| g.gen_func_def(&func_def.name.name, func_def))
            }
            Stmt::Class(class_def) => self.gen_declaration(|g| g.gen_class_def(class_def)),
            Stmt::Variable(_, name, Some(init)) => {
                let value = self.gen_expr(init);
                self.emit(Instruction::Assign {
                    dest: name.name.clone(),
                    value,
                });
            }
            Stmt::Variable(_, _, None) => (),
            Stmt::If(cond, then_block, else_block) => {
                self.gen_if(cond, then_block, else_block.as_ref())
            }
            Stmt::Return(expr) => {
                let value = expr.as_ref().map(|e| self.gen_expr(e));
                self.emit(Instruction::Return(value));
            }
            Stmt::Expr(expr) => {
                self.gen_expr(expr);
            }
        }
    }

    fn gen_if(&mut self, cond: &Expr, then_block: &Block, else_block: Option<&Block>) {
        let cond = self.gen_expr(cond);
        let true_label = self.new_label();
        let false_label = else_block.map(|_| self.new_label());
        let end_label = self.new_label();

        self.emit(Instruction::CondGoto {
            cond,
            label: true_label.clone(),
        });
        self.emit(Instruction::Goto(
            false_label.clone().unwrap_or_else(|| end_label.clone()),
        ));
        self.emit(Instruction::Label(true_label));
        self.gen_block(then_block);

        if let (Some(else_block), Some(false_label)) = (else_block, false_label) {
            self.emit(Instruction::Goto(end_label.clone()));
            self.emit(Instruction::Label(false_label));
            self.gen_block(else_block);
        }

        self.emit(Instruction::Label(end_label));
    }

    /// A declaration inside a function body is jumped over, like an arrow body.
    fn gen_declaration(&mut self, gen: impl FnOnce(&mut Self)) {
        if self.function_depth == 0 {
            gen(self);
            return;
        }

        let end = self.new_label();
        self.emit(Instruction::Goto(end.clone()));
        gen(self);
        self.emit(Instruction::Label(end));
    }

    fn gen_func_def(&mut self, name: &str, func_def: &FuncDef) {
        self.emit(Instruction::Function(name.to_string()));
        for param in func_def.params.iter() {
            self.emit(Instruction::Param(param.name.clone()));
        }

        self.function_depth += 1;
        self.gen_block(&func_def.body);
        self.function_depth -= 1;

        if !matches!(func_def.body.0.last(), Some(Stmt::Return(_))) {
            self.emit(Instruction::Return(None));
        }
    }

    fn gen_class_def(&mut self, class_def: &ClassDef) {
        self.emit(Instruction::Class(class_def.name.name.clone()));
        for method in class_def.methods.iter() {
            let name = format!("{}.{}", class_def.name.name, method.name.name);
            self.gen_func_def(&name, method);
        }
    }

    /// Lowers each argument, then passes them in order.
    fn gen_params(&mut self, args: &[Expr]) {
        let values: Vec<_> = args.iter().map(|a| self.gen_expr(a)).collect();
        for value in values {
            self.emit(Instruction::Param(value));
        }
    }

    /// Returns the operand holding the expression's value.
    fn gen_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(literal) => literal.to_string(),
            Expr::Ident(ident) => ident.name.clone(),
            Expr::Unary(op, operand) => {
                let operand = self.gen_expr(operand);
                let dest = self.new_temp();
                self.emit(Instruction::Unary {
                    dest: dest.clone(),
                    op: *op,
                    operand,
                });
                dest
            }
            Expr::Binary(op, left, right) => {
                let left = self.gen_expr(left);
                let right = self.gen_expr(right);
                let dest = self.new_temp();
                self.emit(Instruction::Binary {
                    dest: dest.clone(),
                    left,
                    op: *op,
                    right,
                });
                dest
            }
            Expr::Assign(target, op, value) => self.gen_assign(target, op.bin_op(), value),
            Expr::Call(callee, args) => {
                self.gen_params(args);
                let dest = self.new_temp();
                self.emit(Instruction::Call {
                    dest: dest.clone(),
                    name: callee.name.clone(),
                    argc: args.len(),
                });
                dest
            }
            Expr::MethodCall(object, method, args) => {
                let object = self.gen_expr(object);
                self.gen_params(args);
                let dest = self.new_temp();
                self.emit(Instruction::Call {
                    dest: dest.clone(),
                    name: format!("{}.{}", object, method),
                    argc: args.len(),
                });
                dest
            }
            Expr::Member(object, field) => {
                let object = self.gen_expr(object);
                let dest = self.new_temp();
                self.emit(Instruction::Load {
                    dest: dest.clone(),
                    object,
                    field: field.clone(),
                });
                dest
            }
            Expr::New(class, args) => {
                self.gen_params(args);
                let dest = self.new_temp();
                self.emit(Instruction::New {
                    dest: dest.clone(),
                    class: class.name.clone(),
                    argc: args.len(),
                });
                dest
            }
            Expr::Array(elements) => {
                let array = self.new_temp();
                self.emit(Instruction::NewArray(array.clone()));
                for (index, element) in elements.iter().enumerate() {
                    let value = self.gen_expr(element);
                    self.emit(Instruction::IndexStore {
                        array: array.clone(),
                        index,
                        value,
                    });
                }
                array
            }
            Expr::Object(properties) => {
                let object = self.new_temp();
                self.emit(Instruction::NewObject(object.clone()));
                for (field, value) in properties {
                    let value = self.gen_expr(value);
                    self.emit(Instruction::Store {
                        object: object.clone(),
                        field: field.clone(),
                        value,
                    });
                }
                object
            }
            Expr::Arrow(param, body) => {
                // The body is emitted inline and jumped over.
                let entry = self.new_label();
                let end = self.new_label();
                self.emit(Instruction::Goto(end.clone()));
                self.emit(Instruction::Label(entry.clone()));
                self.emit(Instruction::Param(param.name.clone()));
                let value = self.gen_expr(body);
                self.emit(Instruction::Return(Some(value)));
                self.emit(Instruction::Label(end));

                let dest = self.new_temp();
                self.emit(Instruction::Closure {
                    dest: dest.clone(),
                    label: entry,
                });
                dest
            }
        }
    }

    /// `op` is the arithmetic of a compound assignment.
    fn gen_assign(&mut self, target: &Expr, op: Option<BinOpKind>, value: &Expr) -> String {
        match target {
            Expr::Member(object, field) => {
                let object = self.gen_expr(object);
                let value = self.gen_expr(value);
                let value = match op {
                    Some(op) => {
                        let current = self.new_temp();
                        self.emit(Instruction::Load {
                            dest: current.clone(),
                            object: object.clone(),
                            field: field.clone(),
                        });
                        let dest = self.new_temp();
                        self.emit(Instruction::Binary {
                            dest: dest.clone(),
                            left: current,
                            op,
                            right: value,
                        });
                        dest
                    }
                    None => value,
                };
                self.emit(Instruction::Store {
                    object,
                    field: field.clone(),
                    value: value.clone(),
                });
                value
            }
            _ => {
                let name = match target {
                    Expr::Ident(ident) => ident.name.clone(),
                    other => self.gen_expr(other),
                };
                let value = self.gen_expr(value);
                match op {
                    Some(op) => self.emit(Instruction::Binary {
                        dest: name.clone(),
                        left: name.clone(),
                        op,
                        right: value,
                    }),
                    None => self.emit(Instruction::Assign {
                        dest: name.clone(),
                        value,
                    }),
                }
                name
            }
        }
    }
}
