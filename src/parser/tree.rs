use std::fmt;

use serde::Serialize;

use super::{Block, ClassDef, Expr, FuncDef, Literal, Program, Stmt};

/// Uniform "kind + payload + children" view of the AST, for display.
///
/// Renders as `Kind(payload,[child, child])`, omitting whichever part is empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SyntaxTree {
    pub kind: &'static str,
    pub value: Option<String>,
    pub children: Vec<SyntaxTree>,
}

impl SyntaxTree {
    fn leaf(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(value.into()),
            children: vec![],
        }
    }

    fn node(kind: &'static str, value: Option<String>, children: Vec<SyntaxTree>) -> Self {
        Self {
            kind,
            value,
            children,
        }
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.value.is_none() && self.children.is_empty() {
            return Ok(());
        }

        write!(f, "(")?;
        if let Some(value) = &self.value {
            write!(f, "{}", value)?;
            if !self.children.is_empty() {
                write!(f, ",")?;
            }
        }
        if !self.children.is_empty() {
            write!(f, "[")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", child)?;
            }
            write!(f, "]")?;
        }
        write!(f, ")")
    }
}

impl Program {
    pub fn syntax_tree(&self) -> SyntaxTree {
        SyntaxTree::node("Program", None, self.0.iter().map(stmt_tree).collect())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.syntax_tree())
    }
}

impl Stmt {
    pub fn syntax_tree(&self) -> SyntaxTree {
        stmt_tree(self)
    }
}

impl Expr {
    pub fn syntax_tree(&self) -> SyntaxTree {
        expr_tree(self)
    }
}

fn block_tree(block: &Block) -> SyntaxTree {
    SyntaxTree::node("Block", None, block.0.iter().map(stmt_tree).collect())
}

fn func_tree(kind: &'static str, func: &FuncDef) -> SyntaxTree {
    let mut children: Vec<_> = func
        .params
        .iter()
        .map(|p| SyntaxTree::leaf("Parameter", p.name.clone()))
        .collect();
    children.push(block_tree(&func.body));
    SyntaxTree::node(kind, Some(func.name.name.clone()), children)
}

fn class_tree(class: &ClassDef) -> SyntaxTree {
    let methods = class
        .methods
        .iter()
        .map(|m| func_tree("MethodDeclaration", m))
        .collect();
    SyntaxTree::node("ClassDeclaration", Some(class.name.name.clone()), methods)
}

fn stmt_tree(stmt: &Stmt) -> SyntaxTree {
    match stmt {
        Stmt::Function(f) => func_tree("FunctionDeclaration", f),
        Stmt::Class(c) => class_tree(c),
        Stmt::Variable(kind, name, init) => {
            let mut children = vec![SyntaxTree::leaf("Identifier", name.name.clone())];
            if let Some(init) = init {
                children.push(expr_tree(init));
            }
            SyntaxTree::node(
                "VariableDeclaration",
                Some(kind.keyword().to_string()),
                children,
            )
        }
        Stmt::If(cond, then_block, else_block) => {
            let mut children = vec![expr_tree(cond), block_tree(then_block)];
            if let Some(else_block) = else_block {
                children.push(block_tree(else_block));
            }
            SyntaxTree::node("IfStatement", None, children)
        }
        Stmt::Return(expr) => SyntaxTree::node(
            "ReturnStatement",
            None,
            expr.iter().map(expr_tree).collect(),
        ),
        Stmt::Expr(expr) => SyntaxTree::node("ExpressionStatement", None, vec![expr_tree(expr)]),
    }
}

fn expr_tree(expr: &Expr) -> SyntaxTree {
    match expr {
        Expr::Literal(Literal::Number(n)) => SyntaxTree::leaf("NumberLiteral", n.clone()),
        Expr::Literal(Literal::String(s)) => SyntaxTree::leaf("StringLiteral", s.clone()),
        Expr::Literal(Literal::Boolean(b)) => SyntaxTree::leaf("BooleanLiteral", b.to_string()),
        Expr::Literal(Literal::Null) => SyntaxTree::node("NullLiteral", None, vec![]),
        Expr::Ident(id) => SyntaxTree::leaf("Identifier", id.name.clone()),
        Expr::Unary(op, operand) => SyntaxTree::node(
            "UnaryExpression",
            Some(op.to_string()),
            vec![expr_tree(operand)],
        ),
        Expr::Binary(op, left, right) => SyntaxTree::node(
            "BinaryExpression",
            Some(op.to_string()),
            vec![expr_tree(left), expr_tree(right)],
        ),
        Expr::Assign(target, op, value) => SyntaxTree::node(
            "AssignmentExpression",
            Some(op.symbol().to_string()),
            vec![expr_tree(target), expr_tree(value)],
        ),
        Expr::Call(callee, args) => SyntaxTree::node(
            "FunctionCall",
            Some(callee.name.clone()),
            args.iter().map(expr_tree).collect(),
        ),
        Expr::MethodCall(object, method, args) => {
            let mut children = vec![expr_tree(object)];
            children.extend(args.iter().map(expr_tree));
            SyntaxTree::node("MethodCall", Some(method.clone()), children)
        }
        Expr::Member(object, property) => SyntaxTree::node(
            "MemberExpression",
            Some(property.clone()),
            vec![expr_tree(object)],
        ),
        Expr::New(class, args) => SyntaxTree::node(
            "NewExpression",
            Some(class.name.clone()),
            args.iter().map(expr_tree).collect(),
        ),
        Expr::Array(elements) => SyntaxTree::node(
            "ArrayLiteral",
            None,
            elements.iter().map(expr_tree).collect(),
        ),
        Expr::Object(properties) => SyntaxTree::node(
            "ObjectLiteral",
            None,
            properties
                .iter()
                .map(|(key, value)| {
                    SyntaxTree::node("Property", Some(key.clone()), vec![expr_tree(value)])
                })
                .collect(),
        ),
        Expr::Arrow(param, body) => SyntaxTree::node(
            "ArrowFunction",
            Some(param.name.clone()),
            vec![expr_tree(body)],
        ),
    }
}
