use log::{debug, trace};

use super::{ScopeId, Symbol, SymbolKind, SymbolTable, Ty, GLOBAL_SCOPE};
use crate::error::{CompileError, CompileResult};
use crate::parser::{
    AssignOpKind, Block, ClassDef, DeclKind, Expr, FuncDef, Identifier, Program, Stmt,
    UnaryOpKind,
};

pub struct SemanticVisitor {
    symbol_table: SymbolTable,
    scope: ScopeId,
    /// Return type inferred so far for each enclosing function body.
    return_types: Vec<Ty>,
}

impl Default for SemanticVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticVisitor {
    pub fn new() -> Self {
        Self {
            symbol_table: SymbolTable::new(),
            scope: GLOBAL_SCOPE,
            return_types: vec![],
        }
    }

    pub fn visit_program(mut self, program: &Program) -> CompileResult<SymbolTable> {
        for stmt in program.0.iter() {
            self.visit_stmt(stmt)?;
        }

        debug!(
            "analyzed {} scopes, {} symbols",
            self.symbol_table.scopes().len(),
            self.symbol_table.flatten().len()
        );
        Ok(self.symbol_table)
    }

    fn enter_scope(&mut self, name: &str) {
        self.scope = self.symbol_table.push_scope(self.scope, name);
        trace!("enter scope {} ({})", self.scope, name);
    }

    fn exit_scope(&mut self) {
        trace!("exit scope {}", self.scope);
        self.scope = self
            .symbol_table
            .scope(self.scope)
            .parent
            .unwrap_or(GLOBAL_SCOPE);
    }

    fn declare(&mut self, ident: &Identifier, symbol: Symbol) -> CompileResult<()> {
        if self.symbol_table.declare(self.scope, &ident.name, symbol) {
            Ok(())
        } else {
            Err(CompileError::semantic(
                format!("Duplicate declaration: {}", ident.name),
                Some(ident.position),
            ))
        }
    }

    fn resolve(&self, ident: &Identifier) -> CompileResult<&Symbol> {
        self.symbol_table
            .lookup(self.scope, &ident.name)
            .ok_or_else(|| {
                CompileError::semantic(
                    format!("Undefined variable: {}", ident.name),
                    Some(ident.position),
                )
            })
    }

    fn set_return_type(&mut self, name: &str, returns: Ty) {
        if let Some(symbol) = self.symbol_table.lookup_mut(self.scope, name) {
            symbol.ty = Ty::Func(Box::new(returns));
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Function(func_def) => {
                let params = func_def.params.iter().map(|p| p.name.clone()).collect();
                self.declare(&func_def.name, Symbol::function(params, Ty::Unknown))?;
                let returns = self.visit_func_def(func_def)?;
                self.set_return_type(&func_def.name.name, returns);
            }
            Stmt::Class(class_def) => self.visit_class_def(class_def)?,
            Stmt::Variable(kind, name, init) => self.visit_variable(*kind, name, init.as_ref())?,
            Stmt::If(cond, then_block, else_block) => {
                self.visit_expr(cond)?;
                self.visit_block(then_block)?;
                if let Some(else_block) = else_block {
                    self.visit_block(else_block)?;
                }
            }
            Stmt::Return(expr) => {
                let ty = match expr {
                    Some(e) => self.visit_expr(e)?,
                    None => Ty::Unknown,
                };
                if let Some(current) = self.return_types.last_mut() {
                    if *current == Ty::Unknown {
                        *current = ty;
                    }
                }
            }
            Stmt::Expr(expr) => {
                self.visit_expr(expr)?;
            }
        };
        Ok(())
    }

    fn visit_block(&mut self, block: &Block) -> CompileResult<()> {
        self.enter_scope("block");
        for stmt in block.0.iter() {
            self.visit_stmt(stmt)?;
        }
        self.exit_scope();
        Ok(())
    }

    /// Parameters and the body's own declarations share one scope, so a body
    /// cannot redeclare a parameter.
    fn visit_func_def(&mut self, func_def: &FuncDef) -> CompileResult<Ty> {
        self.enter_scope(&func_def.name.name);

        for param in func_def.params.iter() {
            if !self
                .symbol_table
                .declare(self.scope, &param.name, Symbol::parameter())
            {
                return Err(CompileError::semantic(
                    format!("Duplicate parameter name: {}", param.name),
                    Some(param.position),
                ));
            }
        }

        self.return_types.push(Ty::Unknown);
        for stmt in func_def.body.0.iter() {
            self.visit_stmt(stmt)?;
        }
        let returns = self.return_types.pop().unwrap_or(Ty::Unknown);

        self.exit_scope();
        Ok(returns)
    }

    fn visit_class_def(&mut self, class_def: &ClassDef) -> CompileResult<()> {
        let class_name = &class_def.name.name;
        self.declare(
            &class_def.name,
            Symbol::variable(None, Ty::Class(class_name.clone()), true),
        )?;

        self.enter_scope(class_name);

        // A constructor binds `this` for every method of the class.
        for method in class_def.methods.iter() {
            let (name, symbol) = if method.is_constructor() {
                let this = Symbol::variable(None, Ty::Instance(class_name.clone()), true);
                ("this", this)
            } else {
                let params = method.params.iter().map(|p| p.name.clone()).collect();
                (method.name.name.as_str(), Symbol::function(params, Ty::Unknown))
            };
            if !self.symbol_table.declare(self.scope, name, symbol) {
                return Err(CompileError::semantic(
                    format!("Duplicate declaration: {}", method.name.name),
                    Some(method.name.position),
                ));
            }
        }

        for method in class_def.methods.iter() {
            let returns = self.visit_func_def(method)?;
            if !method.is_constructor() {
                self.set_return_type(&method.name.name, returns);
            }
        }

        self.exit_scope();
        Ok(())
    }

    fn visit_variable(
        &mut self,
        kind: DeclKind,
        name: &Identifier,
        init: Option<&Expr>,
    ) -> CompileResult<()> {
        if kind == DeclKind::Const && init.is_none() {
            return Err(CompileError::semantic(
                format!("Missing initializer in const declaration: {}", name.name),
                Some(name.position),
            ));
        }

        // The initializer is resolved before the new name is bound.
        let ty = match init {
            Some(e) => self.visit_expr(e)?,
            None => Ty::Unknown,
        };
        self.declare(name, Symbol::variable(Some(kind), ty, init.is_some()))
    }

    fn visit_args(&mut self, args: &[Expr]) -> CompileResult<()> {
        for arg in args {
            self.visit_expr(arg)?;
        }
        Ok(())
    }

    fn visit_expr(&mut self, expr: &Expr) -> CompileResult<Ty> {
        match expr {
            Expr::Literal(literal) => Ok(Ty::of_literal(literal)),
            Expr::Ident(ident) => Ok(self.resolve(ident)?.ty.clone()),
            Expr::Unary(op, operand) => {
                self.visit_expr(operand)?;
                Ok(match op {
                    UnaryOpKind::Neg => Ty::Number,
                    UnaryOpKind::Not => Ty::Boolean,
                })
            }
            Expr::Binary(op, left, right) => {
                let t1 = self.visit_expr(left)?;
                let t2 = self.visit_expr(right)?;
                Ok(Ty::of_binary(*op, &t1, &t2))
            }
            Expr::Assign(target, op, value) => self.visit_assign(target, *op, value),
            Expr::Call(callee, args) => {
                self.visit_args(args)?;
                let symbol = self.resolve(callee)?;
                if symbol.kind == SymbolKind::Function
                    && !symbol.builtin
                    && symbol.params.len() != args.len()
                {
                    return Err(CompileError::semantic(
                        format!(
                            "Function {} expects {} arguments but got {}",
                            callee.name,
                            symbol.params.len(),
                            args.len()
                        ),
                        Some(callee.position),
                    ));
                }
                Ok(symbol.ty.get_return_type().unwrap_or(Ty::Unknown))
            }
            Expr::MethodCall(object, _, args) => {
                self.visit_expr(object)?;
                self.visit_args(args)?;
                Ok(Ty::Unknown)
            }
            Expr::Member(object, _) => {
                self.visit_expr(object)?;
                Ok(Ty::Unknown)
            }
            Expr::New(class, args) => {
                self.visit_args(args)?;
                let Ty::Class(name) = &self.resolve(class)?.ty else {
                    return Err(CompileError::semantic(
                        format!("{} is not a class", class.name),
                        Some(class.position),
                    ));
                };
                Ok(Ty::Instance(name.clone()))
            }
            Expr::Array(elements) => {
                self.visit_args(elements)?;
                Ok(Ty::Array)
            }
            Expr::Object(properties) => {
                for (_, value) in properties {
                    self.visit_expr(value)?;
                }
                Ok(Ty::Object)
            }
            Expr::Arrow(param, body) => {
                self.enter_scope("arrow");
                self.declare(param, Symbol::parameter())?;
                let returns = self.visit_expr(body)?;
                self.exit_scope();
                Ok(Ty::Func(Box::new(returns)))
            }
        }
    }

    fn visit_assign(
        &mut self,
        target: &Expr,
        op: AssignOpKind,
        value: &Expr,
    ) -> CompileResult<Ty> {
        let ty = self.visit_expr(value)?;

        match target {
            Expr::Ident(ident) => {
                let symbol = self
                    .symbol_table
                    .lookup_mut(self.scope, &ident.name)
                    .ok_or_else(|| {
                        CompileError::semantic(
                            format!("Undefined variable: {}", ident.name),
                            Some(ident.position),
                        )
                    })?;
                if symbol.is_const() {
                    return Err(CompileError::semantic(
                        format!("Cannot assign to constant: {}", ident.name),
                        Some(ident.position),
                    ));
                }
                symbol.initialized = true;
                if op == AssignOpKind::Assign && symbol.ty == Ty::Unknown {
                    symbol.ty = ty.clone();
                }
            }
            _ => {
                self.visit_expr(target)?;
            }
        }

        Ok(ty)
    }
}
