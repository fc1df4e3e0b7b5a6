use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use clap_stdin::FileOrStdin;
use serde::Serialize;

use scriptcc::error::CompileError;
use scriptcc::ir::to_lines;
use scriptcc::lexer::Token;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    Tokens,
    Ast,
    Symbols,
    Ir,
    Optimized,
    Asm,
    All,
}

/// Compile a small scripting language down to pseudo-assembly, one phase at a time
#[derive(Parser)]
#[command(name = "scriptcc", version)]
struct Args {
    /// Source file, or `-` to read stdin
    input: FileOrStdin,

    /// Phase whose output is printed
    #[arg(short, long, value_enum, default_value_t = Emit::Asm)]
    emit: Emit,

    /// Print the output as JSON
    #[arg(long)]
    json: bool,
}

fn print_lines<T: Serialize>(
    lines: &[String],
    value: &T,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        for line in lines {
            println!("{}", line);
        }
    }
    Ok(())
}

fn token_lines(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn run(emit: Emit, json: bool, source: &str) -> Result<(), Box<dyn Error>> {
    match emit {
        Emit::Tokens => {
            let tokens = scriptcc::tokenize(source)?;
            print_lines(&token_lines(&tokens), &tokens, json)
        }
        Emit::Ast => {
            let program = scriptcc::parse(source)?;
            print_lines(&[program.to_string()], &program, json)
        }
        Emit::Symbols => {
            let analysis = scriptcc::analyze(source)?;
            let lines: Vec<String> = analysis
                .symbol_table
                .to_string()
                .lines()
                .map(String::from)
                .collect();
            print_lines(&lines, &analysis.symbol_table, json)
        }
        Emit::Ir => {
            let ir = scriptcc::generate_ir(source)?;
            print_lines(&to_lines(&ir), &ir, json)
        }
        Emit::Optimized => {
            let optimized = scriptcc::optimize(source)?;
            print_lines(&to_lines(&optimized), &optimized, json)
        }
        Emit::Asm => {
            let assembly = scriptcc::generate_code(source)?;
            print_lines(&assembly, &assembly, json)
        }
        Emit::All => {
            let compilation = scriptcc::compile(source)?;
            if json {
                return print_lines(&[], &compilation, true);
            }
            println!("== tokens");
            print_lines(&token_lines(&compilation.tokens), &(), false)?;
            println!("== ast");
            println!("{}", compilation.program);
            println!("== symbols");
            print!("{}", compilation.symbol_table);
            println!("== ir");
            print_lines(&to_lines(&compilation.ir), &(), false)?;
            println!("== optimized");
            print_lines(&to_lines(&compilation.optimized), &(), false)?;
            println!("== asm");
            print_lines(&compilation.assembly, &(), false)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let Args { input, emit, json } = Args::parse();

    let source = match input.contents() {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(emit, json, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CompileError>() {
                Some(error) if json => match serde_json::to_string(error) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("{}", error),
                },
                _ => eprintln!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}
