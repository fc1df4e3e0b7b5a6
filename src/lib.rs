pub mod analyzer;
pub mod codegen;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod optimizer;
pub mod parser;

use serde::Serialize;

use analyzer::{SemanticVisitor, SymbolTable};
use codegen::Codegen;
use error::CompileResult;
use ir::{Instruction, IrGenerator};
use lexer::{Lexer, Token};
use optimizer::Optimizer;
use parser::{Parser, Program};

/// The AST together with the symbol table built from it.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub program: Program,
    pub symbol_table: SymbolTable,
}

/// Output of every phase for one source string.
#[derive(Debug, Serialize)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub program: Program,
    pub symbol_table: SymbolTable,
    pub ir: Vec<Instruction>,
    pub optimized: Vec<Instruction>,
    pub assembly: Vec<String>,
}

pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
    Lexer::tokenize(source)
}

pub fn parse(source: &str) -> CompileResult<Program> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse()
}

pub fn analyze(source: &str) -> CompileResult<Analysis> {
    let program = parse(source)?;
    let symbol_table = SemanticVisitor::new().visit_program(&program)?;
    Ok(Analysis {
        program,
        symbol_table,
    })
}

/// IR is only produced for programs that pass semantic analysis.
pub fn generate_ir(source: &str) -> CompileResult<Vec<Instruction>> {
    let Analysis { program, .. } = analyze(source)?;
    Ok(IrGenerator::new().generate(&program))
}

pub fn optimize(source: &str) -> CompileResult<Vec<Instruction>> {
    let ir = generate_ir(source)?;
    Ok(Optimizer::new().optimize(&ir))
}

pub fn generate_code(source: &str) -> CompileResult<Vec<String>> {
    let optimized = optimize(source)?;
    Ok(Codegen::new().generate(&optimized))
}

/// Runs every phase once, keeping each intermediate result.
pub fn compile(source: &str) -> CompileResult<Compilation> {
    let tokens = Lexer::tokenize(source)?;
    let program = Parser::new(tokens.clone()).parse()?;
    let symbol_table = SemanticVisitor::new().visit_program(&program)?;
    let ir = IrGenerator::new().generate(&program);
    let optimized = Optimizer::new().optimize(&ir);
    let assembly = Codegen::new().generate(&optimized);

    Ok(Compilation {
        tokens,
        program,
        symbol_table,
        ir,
        optimized,
        assembly,
    })
}
