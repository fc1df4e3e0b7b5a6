use scriptcc::analyze;
use scriptcc::analyzer::{SymbolKind, SymbolTable, Ty};
use scriptcc::error::{CompileError, Phase, Position};

fn symbols(input: &str) -> SymbolTable {
    analyze(input).unwrap().symbol_table
}

fn semantic_err(input: &str) -> CompileError {
    let err = analyze(input).unwrap_err();
    assert_eq!(err.phase, Phase::Semantic, "{}", input);
    err
}

fn keys(table: &SymbolTable) -> Vec<String> {
    table.flatten().into_iter().map(|(name, _)| name).collect()
}

#[test]
fn undefined_variable() {
    let err = semantic_err("y;");
    assert_eq!(err.message, "Undefined variable: y");
    assert_eq!(err.position, Some(Position::new(1, 0)));
}

#[test]
fn globals_and_builtins() {
    let table = symbols("let x = 42; const s = 'a' + 1; var b = 1 < 2;");

    let x = table.get_global("x").unwrap();
    assert_eq!(x.kind, SymbolKind::Variable);
    assert_eq!(x.ty, Ty::Number);
    assert!(x.initialized);
    assert_eq!(table.get_global("s").unwrap().ty, Ty::String);
    assert!(table.get_global("s").unwrap().is_const());
    assert_eq!(table.get_global("b").unwrap().ty, Ty::Boolean);

    assert!(table.get_global("console").unwrap().builtin);
    assert!(table.get_global("print").unwrap().builtin);
}

#[test]
fn uninitialized_until_assigned() {
    let table = symbols("let a;");
    assert!(!table.get_global("a").unwrap().initialized);

    let table = symbols("let a; a = 'text';");
    let a = table.get_global("a").unwrap();
    assert!(a.initialized);
    assert_eq!(a.ty, Ty::String);
}

#[test]
fn scopes_nest_by_path() {
    let table = symbols("function f(a) { let b = a; if (b) { let c = 1; } }");
    assert_eq!(
        keys(&table),
        ["console", "f", "print", "f::a", "f::b", "f::block2::c"]
    );
    assert_eq!(table.scope(2).parent, Some(1));
    assert_eq!(table.scope(1).name, "f");
}

#[test]
fn block_declarations_do_not_escape() {
    let err = semantic_err("if (true) { let a = 1; } a;");
    assert_eq!(err.message, "Undefined variable: a");

    let err = semantic_err("function f() { let local = 1; } local;");
    assert_eq!(err.message, "Undefined variable: local");
}

#[test]
fn sibling_blocks_are_separate() {
    let table = symbols("if (true) { let a = 1; } else { let a = 'x'; }");
    assert_eq!(keys(&table), ["console", "print", "block1::a", "block2::a"]);
}

#[test]
fn shadowing_in_inner_scope() {
    assert!(analyze("let a = 1; if (a) { let a = 2; }").is_ok());
    assert!(analyze("let a = 1; function f(a) { return a; }").is_ok());
}

#[test]
fn duplicate_declarations() {
    let err = semantic_err("let a = 1;\nlet a = 2;");
    assert_eq!(err.message, "Duplicate declaration: a");
    assert_eq!(err.position, Some(Position::new(2, 4)));

    let err = semantic_err("function f() {} function f() {}");
    assert_eq!(err.message, "Duplicate declaration: f");

    let err = semantic_err("function f(a, a) {}");
    assert_eq!(err.message, "Duplicate parameter name: a");

    let err = semantic_err("function f(a) { let a = 1; }");
    assert_eq!(err.message, "Duplicate declaration: a");
}

#[test]
fn initializer_cannot_see_its_own_name() {
    let err = semantic_err("let a = a + 1;");
    assert_eq!(err.message, "Undefined variable: a");
}

#[test]
fn constants() {
    let err = semantic_err("const c = 1; c = 2;");
    assert_eq!(err.message, "Cannot assign to constant: c");

    let err = semantic_err("const c = 1; c += 2;");
    assert_eq!(err.message, "Cannot assign to constant: c");

    let err = semantic_err("const c;");
    assert_eq!(err.message, "Missing initializer in const declaration: c");
}

#[test]
fn assignment_to_undeclared_name() {
    let err = semantic_err("z = 1;");
    assert_eq!(err.message, "Undefined variable: z");
}

#[test]
fn call_arity() {
    let err = semantic_err("function f(a) { return a; } f(1, 2);");
    assert_eq!(err.message, "Function f expects 1 arguments but got 2");

    assert!(analyze("function f(a) { return a; } f(1);").is_ok());
    assert!(analyze("print(1, 2, 3); print();").is_ok());
    assert!(analyze("console.log('a', 'b');").is_ok());
}

#[test]
fn arguments_are_resolved() {
    let err = semantic_err("print(missing);");
    assert_eq!(err.message, "Undefined variable: missing");
}

#[test]
fn recursive_function_return_type() {
    let table = symbols(
        "function fact(n) { if (n <= 1) { return 1; } return n * fact(n - 1); } let r = fact(5);",
    );
    let fact = table.get_global("fact").unwrap();
    assert_eq!(fact.kind, SymbolKind::Function);
    assert_eq!(fact.params, ["n"]);
    assert_eq!(fact.ty, Ty::Func(Box::new(Ty::Number)));
    assert_eq!(table.get_global("r").unwrap().ty, Ty::Number);
}

#[test]
fn top_level_return() {
    assert!(analyze("return 1;").is_ok());
    assert!(analyze("let a = 1; return;").is_ok());

    let err = semantic_err("return missing;");
    assert_eq!(err.message, "Undefined variable: missing");
}

#[test]
fn classes_and_instances() {
    let table = symbols(
        "class Point { constructor(x) { this.x = x; } getX() { return this.x; } }
         let p = new Point(1);
         p.getX();",
    );
    assert_eq!(
        table.get_global("Point").unwrap().ty,
        Ty::Class("Point".to_string())
    );
    assert_eq!(
        table.get_global("p").unwrap().ty,
        Ty::Instance("Point".to_string())
    );
    assert!(keys(&table).contains(&"Point::this".to_string()));
    assert!(keys(&table).contains(&"Point::getX".to_string()));

    let err = semantic_err("let n = 1; new n();");
    assert_eq!(err.message, "n is not a class");

    let err = semantic_err("class A { m() { return this; } }");
    assert_eq!(err.message, "Undefined variable: this");
}

#[test]
fn arrow_scopes_have_distinct_keys() {
    let table = symbols("let f = a => a; let g = a => a;");
    assert_eq!(
        keys(&table),
        ["console", "f", "g", "print", "arrow1::a", "arrow2::a"]
    );

    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json.as_object().unwrap().len(), table.flatten().len());
}

#[test]
fn arrow_parameter_is_local() {
    assert!(analyze("let xs = [1, 2]; xs.map(x => x * 2);").is_ok());

    let err = semantic_err("let xs = [1]; xs.map(x => x); x;");
    assert_eq!(err.message, "Undefined variable: x");
}

#[test]
fn symbol_table_display() {
    let table = symbols("function add(a, b) { return a + b; } const k = add(1, 2);");
    let text = table.to_string();
    assert!(text.contains("add: function function -> unknown [a, b]"));
    assert!(text.contains("add::a: parameter unknown"));
    assert!(text.contains("k: variable unknown (const)"));
}

#[test]
fn fresh_state_per_invocation() {
    let source = "function f(a) { if (a) { let b = a; } } let c = f(1);";
    assert_eq!(keys(&symbols(source)), keys(&symbols(source)));
}
