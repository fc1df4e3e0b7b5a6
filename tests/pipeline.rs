use std::thread;

use scriptcc::error::{Phase, Position};
use scriptcc::ir::to_lines;
use scriptcc::{compile, generate_code, Compilation};

fn compiled(input: &str) -> Compilation {
    compile(input).unwrap()
}

#[test]
fn every_phase_of_a_declaration() {
    let c = compiled("let x = 42;");
    let tokens: Vec<_> = c.tokens.iter().map(|t| t.to_string()).collect();
    assert_eq!(
        tokens,
        [
            "keyword let",
            "identifier x",
            "operator =",
            "number 42",
            "operator ;"
        ]
    );
    assert_eq!(
        c.program.to_string(),
        "Program([VariableDeclaration(let,[Identifier(x), NumberLiteral(42)])])"
    );
    assert!(c.symbol_table.get_global("x").is_some());
    assert_eq!(to_lines(&c.ir), ["x = 42"]);
    assert_eq!(to_lines(&c.optimized), ["x = 42"]);
    assert_eq!(c.assembly[0], ".intel_syntax noprefix");
}

#[test]
fn folding_shows_between_ir_and_optimized() {
    let c = compiled("let x = 2 + 3;");
    assert_eq!(to_lines(&c.ir), ["t0 = 2 + 3", "x = t0"]);
    assert_eq!(to_lines(&c.optimized), ["t0 = 5", "x = 5"]);
}

#[test]
fn error_per_phase() {
    let err = compile("").unwrap_err();
    assert_eq!(err.phase, Phase::Validation);
    assert_eq!(err.to_string(), "Validation error: Source code cannot be empty");

    let err = compile("let a = #;").unwrap_err();
    assert_eq!(err.phase, Phase::Lexical);
    assert_eq!(
        err.to_string(),
        "Lexical error at line 1, column 8: Unexpected character '#'"
    );

    let err = compile("foo(1, 2").unwrap_err();
    assert_eq!(err.phase, Phase::Syntax);
    assert_eq!(
        err.to_string(),
        "Syntax error at line 1, column 0: Expected closing parenthesis in function call"
    );

    let err = compile("y;").unwrap_err();
    assert_eq!(err.phase, Phase::Semantic);
    assert_eq!(
        err.to_string(),
        "Semantic error at line 1, column 0: Undefined variable: y"
    );
}

#[test]
fn else_branch_is_compiled() {
    let c = compiled("let x = 1; if (x > 0) { x = 2; } else { x = 3; }");
    let ir = to_lines(&c.ir);
    assert!(ir.contains(&"L1:".to_string()));
    assert!(ir.contains(&"x = 3".to_string()));
    assert!(c.assembly.contains(&"  jmp L2".to_string()));
}

#[test]
fn error_as_json() {
    let err = compile("foo(1, 2").unwrap_err();
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "phase": "syntax",
            "message": "Expected closing parenthesis in function call",
            "position": { "line": 1, "column": 0 }
        })
    );
    assert_eq!(err.position, Some(Position::new(1, 0)));
}

#[test]
fn compilation_as_json() {
    let c = compiled("function sq(n) { return n * n; } let r = sq(3);");
    let json = serde_json::to_value(&c).unwrap();

    assert_eq!(json["tokens"][0]["kind"], "keyword");
    assert_eq!(json["tokens"][0]["lexeme"], "function");
    assert_eq!(json["ir"][0], "function sq:");
    assert_eq!(json["symbol_table"]["sq"]["kind"], "function");
    assert_eq!(json["symbol_table"]["sq::n"]["kind"], "parameter");
    assert_eq!(json["symbol_table"]["r"]["ty"], "number");
    assert!(json["assembly"].as_array().unwrap().len() > 10);
}

#[test]
fn repeated_runs_are_identical() {
    let source = "let a = 1 + 2; if (a) { a = a * 2; } else { a = 0; } let f = x => x + a;";
    let first = compiled(source);
    let second = compiled(source);
    assert_eq!(first.tokens, second.tokens);
    assert_eq!(first.program, second.program);
    assert_eq!(first.ir, second.ir);
    assert_eq!(first.optimized, second.optimized);
    assert_eq!(first.assembly, second.assembly);
}

#[test]
fn concurrent_runs_do_not_share_counters() {
    let source = "function f(a) { if (a) { return a + 1; } return a - 1; } let r = f(2) + f(3);";
    let expected = generate_code(source).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(move || generate_code(source).unwrap()))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
