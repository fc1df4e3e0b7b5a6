use log::debug;
use phf::phf_map;

use super::{
    AssignOpKind, BinOpKind, Block, ClassDef, DeclKind, Expr, FuncDef, Identifier, Literal,
    Program, Stmt, UnaryOpKind,
};
use crate::error::{CompileError, CompileResult, Position};
use crate::lexer::{Token, TokenKind};

static BINARY_OPERATORS: phf::Map<&'static str, BinOpKind> = phf_map! {
    "+" => BinOpKind::Add,
    "-" => BinOpKind::Sub,
    "*" => BinOpKind::Mul,
    "/" => BinOpKind::Div,
    "%" => BinOpKind::Mod,
    "==" => BinOpKind::Equal,
    "!=" => BinOpKind::NotEqual,
    "<" => BinOpKind::LessThan,
    "<=" => BinOpKind::LessEqual,
    ">" => BinOpKind::GreaterThan,
    ">=" => BinOpKind::GreaterEqual,
    "&&" => BinOpKind::LogicalAnd,
    "||" => BinOpKind::LogicalOr,
};

static ASSIGN_OPERATORS: phf::Map<&'static str, AssignOpKind> = phf_map! {
    "=" => AssignOpKind::Assign,
    "+=" => AssignOpKind::AddAssign,
    "-=" => AssignOpKind::SubAssign,
    "*=" => AssignOpKind::MulAssign,
    "/=" => AssignOpKind::DivAssign,
};

static DECL_KEYWORDS: phf::Map<&'static str, DeclKind> = phf_map! {
    "let" => DeclKind::Let,
    "const" => DeclKind::Const,
    "var" => DeclKind::Var,
};

#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn parse(&mut self) -> CompileResult<Program> {
        let program = self.parse_program()?;
        debug!("parsed {} top-level statements", program.0.len());
        Ok(program)
    }

    fn is_eof(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.index).cloned();
        if t.is_some() {
            self.index += 1;
        }
        t
    }

    /// Position of the current token, or of the last one once input is exhausted.
    fn position(&self) -> Option<Position> {
        self.peek().or(self.tokens.last()).map(Token::position)
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::syntax(message, self.position())
    }

    fn check_operator(&self, op: &str) -> bool {
        self.peek().is_some_and(|t| t.is_operator(op))
    }

    fn consume_operator(&mut self, op: &str) -> bool {
        if !self.check_operator(op) {
            return false;
        }
        self.index += 1;
        true
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        if !self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            return false;
        }
        self.index += 1;
        true
    }

    fn expect_operator(&mut self, op: &str, message: &str) -> CompileResult<()> {
        if self.consume_operator(op) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn expect_ident(&mut self, message: &str) -> CompileResult<Identifier> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Identifier => {
                let ident = Identifier::new(t.lexeme.clone(), t.position());
                self.index += 1;
                Ok(ident)
            }
            _ => Err(self.error(message)),
        }
    }

    fn consume_lookup<T: Copy>(
        &mut self,
        table: &phf::Map<&'static str, T>,
        kind: TokenKind,
    ) -> Option<T> {
        let t = self.peek()?;
        if t.kind != kind {
            return None;
        }
        let found = table.get(t.lexeme.as_str()).copied();
        if found.is_some() {
            self.index += 1;
        }
        found
    }

    /// program = stmt*
    fn parse_program(&mut self) -> CompileResult<Program> {
        let mut stmts = vec![];

        while !self.is_eof() {
            if self.consume_operator(";") {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }

        Ok(Program(stmts))
    }

    /// stmt = "function" func
    ///      | "class" class
    ///      | ("let" | "const" | "var") ident ("=" expr)? ";"?
    ///      | "if" "(" expr ")" block ("else" (block | if))?
    ///      | "return" expr? ";"?
    ///      | expr ";"?
    fn parse_stmt(&mut self) -> CompileResult<Stmt> {
        if self.consume_keyword("function") {
            let name = self.expect_ident("Expected function name")?;
            Ok(Stmt::Function(self.parse_func(name)?))
        } else if self.consume_keyword("class") {
            self.parse_class()
        } else if let Some(kind) = self.consume_lookup(&DECL_KEYWORDS, TokenKind::Keyword) {
            self.parse_variable(kind)
        } else if self.consume_keyword("if") {
            self.parse_if()
        } else if self.consume_keyword("return") {
            self.parse_return()
        } else {
            let expr = self.parse_expr()?;
            self.consume_operator(";");
            Ok(Stmt::Expr(expr))
        }
    }

    /// block = "{" stmt* "}"
    fn parse_block(&mut self) -> CompileResult<Block> {
        self.expect_operator("{", "Expected '{' to open block")?;

        let mut stmts = vec![];
        loop {
            if self.is_eof() {
                return Err(self.error("Expected closing brace for block"));
            }
            if self.consume_operator("}") {
                break;
            }
            if self.consume_operator(";") {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }

        Ok(Block(stmts))
    }

    /// func = name "(" (ident ("," ident)*)? ")" block
    fn parse_func(&mut self, name: Identifier) -> CompileResult<FuncDef> {
        self.expect_operator("(", "Expected '(' after function name")?;

        let mut params = vec![];
        if !self.consume_operator(")") {
            loop {
                params.push(self.expect_ident("Expected parameter name")?);
                if self.consume_operator(",") {
                    continue;
                }
                self.expect_operator(")", "Expected closing parenthesis in parameter list")?;
                break;
            }
        }

        let body = self.parse_block()?;
        Ok(FuncDef { name, params, body })
    }

    /// class = ident "{" (("constructor" | ident) func)* "}"
    fn parse_class(&mut self) -> CompileResult<Stmt> {
        let name = self.expect_ident("Expected class name")?;
        self.expect_operator("{", "Expected '{' after class name")?;

        let mut methods = vec![];
        loop {
            if self.is_eof() {
                return Err(self.error("Expected closing brace for class body"));
            }
            if self.consume_operator("}") {
                break;
            }
            if self.consume_operator(";") {
                continue;
            }
            let method_name = self.expect_ident("Expected method name")?;
            methods.push(self.parse_func(method_name)?);
        }

        Ok(Stmt::Class(ClassDef { name, methods }))
    }

    fn parse_variable(&mut self, kind: DeclKind) -> CompileResult<Stmt> {
        let name = self.expect_ident("Expected variable name")?;
        let init = if self.consume_operator("=") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.consume_operator(";");
        Ok(Stmt::Variable(kind, name, init))
    }

    fn parse_if(&mut self) -> CompileResult<Stmt> {
        self.expect_operator("(", "Expected '(' after 'if'")?;
        let cond = self.parse_expr()?;
        self.expect_operator(")", "Expected closing parenthesis after if condition")?;
        let then_block = self.parse_block()?;

        let else_block = if self.consume_keyword("else") {
            if self.consume_keyword("if") {
                Some(Block(vec![self.parse_if()?]))
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If(cond, then_block, else_block))
    }

    fn parse_return(&mut self) -> CompileResult<Stmt> {
        let ends_here = match self.peek() {
            None => true,
            Some(t) => t.is_operator(";") || t.is_operator("}"),
        };
        let expr = if ends_here {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume_operator(";");
        Ok(Stmt::Return(expr))
    }

    /// expr = chain (("=" | "+=" | "-=" | "*=" | "/=") expr)?
    fn parse_expr(&mut self) -> CompileResult<Expr> {
        let target = self.parse_chain()?;

        let position = self.position();
        if let Some(op) = self.consume_lookup(&ASSIGN_OPERATORS, TokenKind::Operator) {
            if !matches!(target, Expr::Ident(_) | Expr::Member(_, _)) {
                return Err(CompileError::syntax("Invalid assignment target", position));
            }
            let value = self.parse_expr()?;
            return Ok(Expr::Assign(Box::new(target), op, Box::new(value)));
        }

        Ok(target)
    }

    /// chain = unary (binop unary)*
    ///
    /// Every binary operator has the same precedence and groups to the left,
    /// so `2 + 3 * 4` is `(2 + 3) * 4`.
    fn parse_chain(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_unary()?;

        while let Some(op) = self.consume_lookup(&BINARY_OPERATORS, TokenKind::Operator) {
            let right = self.parse_unary()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }

        Ok(expr)
    }

    /// unary = ("-" | "!") unary
    ///       | postfix
    fn parse_unary(&mut self) -> CompileResult<Expr> {
        if self.consume_operator("-") {
            Ok(Expr::Unary(UnaryOpKind::Neg, Box::new(self.parse_unary()?)))
        } else if self.consume_operator("!") {
            Ok(Expr::Unary(UnaryOpKind::Not, Box::new(self.parse_unary()?)))
        } else {
            self.parse_postfix()
        }
    }

    /// postfix = primary ("." ident ("(" args ")")?)*
    fn parse_postfix(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_primary()?;

        while self.consume_operator(".") {
            let name = self.expect_ident("Expected property name after '.'")?;
            if self.consume_operator("(") {
                let args =
                    self.parse_args(name.position, "Expected closing parenthesis in method call")?;
                expr = Expr::MethodCall(Box::new(expr), name.name, args);
            } else {
                expr = Expr::Member(Box::new(expr), name.name);
            }
        }

        Ok(expr)
    }

    /// primary = num | str | "true" | "false" | "null"
    ///         | ident "=>" expr
    ///         | ident ("(" args ")")?
    ///         | "(" expr ")"
    ///         | "[" (expr ("," expr)*)? "]"
    ///         | "{" (key ":" expr ("," key ":" expr)*)? "}"
    ///         | "new" ident "(" args ")"
    fn parse_primary(&mut self) -> CompileResult<Expr> {
        let Some(t) = self.next() else {
            return Err(self.error("Unexpected end of input"));
        };
        let position = t.position();

        match t.kind {
            TokenKind::Number => Ok(Expr::Literal(Literal::Number(t.lexeme))),
            TokenKind::String => Ok(Expr::Literal(Literal::String(t.value().to_string()))),
            TokenKind::Identifier => self.parse_ident(Identifier::new(t.lexeme, position)),
            TokenKind::Keyword => match t.lexeme.as_str() {
                "true" => Ok(Expr::Literal(Literal::Boolean(true))),
                "false" => Ok(Expr::Literal(Literal::Boolean(false))),
                "null" => Ok(Expr::Literal(Literal::Null)),
                "new" => self.parse_new(),
                _ => Err(CompileError::syntax(
                    format!("Unexpected token: {}", t.lexeme),
                    Some(position),
                )),
            },
            TokenKind::Operator => match t.lexeme.as_str() {
                "(" => {
                    let expr = self.parse_expr()?;
                    self.expect_operator(")", "Expected closing parenthesis")?;
                    Ok(expr)
                }
                "[" => self.parse_array(),
                "{" => self.parse_object(),
                _ => Err(CompileError::syntax(
                    format!("Unexpected token: {}", t.lexeme),
                    Some(position),
                )),
            },
        }
    }

    fn parse_ident(&mut self, ident: Identifier) -> CompileResult<Expr> {
        if self.check_operator("=>") {
            self.index += 1;
            let body = self.parse_expr()?;
            Ok(Expr::Arrow(ident, Box::new(body)))
        } else if self.consume_operator("(") {
            let args =
                self.parse_args(ident.position, "Expected closing parenthesis in function call")?;
            Ok(Expr::Call(ident, args))
        } else {
            Ok(Expr::Ident(ident))
        }
    }

    /// args = (expr ("," expr)*)? ")"
    ///
    /// A missing `)` is reported at `call_site` rather than at the stray token.
    fn parse_args(&mut self, call_site: Position, message: &str) -> CompileResult<Vec<Expr>> {
        let mut args = vec![];
        if self.consume_operator(")") {
            return Ok(args);
        }

        loop {
            if self.is_eof() {
                return Err(CompileError::syntax(message, Some(call_site)));
            }
            args.push(self.parse_expr()?);
            if self.consume_operator(",") {
                continue;
            }
            if self.consume_operator(")") {
                return Ok(args);
            }
            return Err(CompileError::syntax(message, Some(call_site)));
        }
    }

    fn parse_new(&mut self) -> CompileResult<Expr> {
        let class = self.expect_ident("Expected class name after 'new'")?;
        self.expect_operator("(", "Expected '(' after class name in new expression")?;
        let args = self.parse_args(
            class.position,
            "Expected closing parenthesis in new expression",
        )?;
        Ok(Expr::New(class, args))
    }

    fn parse_array(&mut self) -> CompileResult<Expr> {
        let mut elements = vec![];

        loop {
            if self.is_eof() {
                return Err(self.error("Expected closing bracket in array literal"));
            }
            if self.consume_operator("]") {
                break;
            }
            elements.push(self.parse_expr()?);
            if !self.consume_operator(",") {
                self.expect_operator("]", "Expected closing bracket in array literal")?;
                break;
            }
        }

        Ok(Expr::Array(elements))
    }

    fn parse_object(&mut self) -> CompileResult<Expr> {
        let mut properties = vec![];

        loop {
            if self.is_eof() {
                return Err(self.error("Expected closing brace in object literal"));
            }
            if self.consume_operator("}") {
                break;
            }

            let key = match self.peek() {
                Some(t) if matches!(t.kind, TokenKind::Identifier | TokenKind::String) => {
                    t.value().to_string()
                }
                _ => return Err(self.error("Expected property name in object literal")),
            };
            self.index += 1;
            self.expect_operator(":", "Expected ':' after property name")?;
            properties.push((key, self.parse_expr()?));

            if !self.consume_operator(",") {
                self.expect_operator("}", "Expected closing brace in object literal")?;
                break;
            }
        }

        Ok(Expr::Object(properties))
    }
}
