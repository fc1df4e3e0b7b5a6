use std::collections::HashSet;

use scriptcc::generate_ir;
use scriptcc::ir::{to_lines, Instruction};

fn ir(input: &str) -> Vec<String> {
    to_lines(&generate_ir(input).unwrap())
}

#[test]
fn variable_declaration() {
    assert_eq!(ir("let x = 42;"), ["x = 42"]);
    assert_eq!(ir("let x;"), Vec::<String>::new());
}

#[test]
fn binary_expression() {
    assert_eq!(ir("let x = 2 + 3;"), ["t0 = 2 + 3", "x = t0"]);
    assert_eq!(
        ir("let x = 1 + 2 * 3;"),
        ["t0 = 1 + 2", "t1 = t0 * 3", "x = t1"]
    );
}

#[test]
fn unary_and_literals() {
    assert_eq!(
        ir("let a = -5; let b = !true; let s = 'hi'; let n = null;"),
        [
            "t0 = -5",
            "a = t0",
            "t1 = !true",
            "b = t1",
            "s = \"hi\"",
            "n = null"
        ]
    );
}

#[test]
fn if_without_else() {
    assert_eq!(
        ir("let x = 1; if (x) { x = 2; }"),
        ["x = 1", "if x goto L0", "goto L1", "L0:", "x = 2", "L1:"]
    );
}

#[test]
fn if_with_else_lowers_both_branches() {
    assert_eq!(
        ir("let x = 1; if (x > 0) { x = 2; } else { x = 3; }"),
        [
            "x = 1",
            "t0 = x > 0",
            "if t0 goto L0",
            "goto L1",
            "L0:",
            "x = 2",
            "goto L2",
            "L1:",
            "x = 3",
            "L2:"
        ]
    );
}

#[test]
fn function_and_call() {
    assert_eq!(
        ir("function add(a, b) { return a + b; } let r = add(1, 2);"),
        [
            "function add:",
            "param a",
            "param b",
            "t0 = a + b",
            "return t0",
            "param 1",
            "param 2",
            "t1 = call add, 2",
            "r = t1"
        ]
    );
}

#[test]
fn implicit_return() {
    assert_eq!(
        ir("function f() { let a = 1; }"),
        ["function f:", "a = 1", "return"]
    );
    assert_eq!(ir("function g() { return; }"), ["function g:", "return"]);
}

#[test]
fn nested_declarations_are_jumped_over() {
    assert_eq!(
        ir("function f() { function g() { return 1; } }"),
        [
            "function f:",
            "goto L0",
            "function g:",
            "return 1",
            "L0:",
            "return"
        ]
    );
    assert_eq!(
        ir("function f() { class C { m() { return 2; } } return 3; }"),
        [
            "function f:",
            "goto L0",
            "class C:",
            "function C.m:",
            "return 2",
            "L0:",
            "return 3"
        ]
    );
}

#[test]
fn nested_call_arguments_are_lowered_first() {
    assert_eq!(
        ir("function f(a, b) { return a; } f(1, f(2, 3));"),
        [
            "function f:",
            "param a",
            "param b",
            "return a",
            "param 2",
            "param 3",
            "t0 = call f, 2",
            "param 1",
            "param t0",
            "t1 = call f, 2"
        ]
    );
}

#[test]
fn compound_assignment() {
    assert_eq!(
        ir("let a = 1; a += 2; a *= a;"),
        ["a = 1", "a = a + 2", "a = a * a"]
    );
}

#[test]
fn array_and_object_literals() {
    assert_eq!(
        ir("let a = [1, 2];"),
        ["t0 = []", "t0[0] = 1", "t0[1] = 2", "a = t0"]
    );
    assert_eq!(
        ir("let o = { k: 1, s: 'v' };"),
        ["t0 = {}", "t0.k = 1", "t0.s = \"v\"", "o = t0"]
    );
}

#[test]
fn method_call_and_member() {
    assert_eq!(
        ir("console.log('hi');"),
        ["param \"hi\"", "t0 = call console.log, 1"]
    );
    assert_eq!(
        ir("let o = {}; o.n = 1; o.n += 2; let v = o.n;"),
        [
            "t0 = {}",
            "o = t0",
            "o.n = 1",
            "t1 = o.n",
            "t2 = t1 + 2",
            "o.n = t2",
            "t3 = o.n",
            "v = t3"
        ]
    );
}

#[test]
fn class_and_new() {
    assert_eq!(
        ir("class P { constructor(x) { this.x = x; } get() { return this.x; } } let p = new P(1);"),
        [
            "class P:",
            "function P.constructor:",
            "param x",
            "this.x = x",
            "return",
            "function P.get:",
            "t0 = this.x",
            "return t0",
            "param 1",
            "t1 = new P, 1",
            "p = t1"
        ]
    );
}

#[test]
fn arrow_function_closure() {
    assert_eq!(
        ir("let f = x => x * 2;"),
        [
            "goto L1",
            "L0:",
            "param x",
            "t0 = x * 2",
            "return t0",
            "L1:",
            "t1 = closure L0",
            "f = t1"
        ]
    );
}

#[test]
fn temps_and_labels_are_unique() {
    let instructions = generate_ir(
        "let a = 1 + 2; if (a) { let b = a * 3; if (b) { a = b - 1; } else { a = 0; } } let c = a + a;",
    )
    .unwrap();

    let mut temps = HashSet::new();
    let mut labels = HashSet::new();
    for instruction in instructions.iter() {
        match instruction {
            Instruction::Binary { dest, .. } => assert!(temps.insert(dest.clone())),
            Instruction::Label(name) => assert!(labels.insert(name.clone())),
            _ => (),
        }
    }
    assert_eq!(temps.len(), 4);
    assert_eq!(labels.len(), 5);
}

#[test]
fn counters_reset_per_invocation() {
    let source = "let x = 1 + 2; if (x) { x = 3; }";
    let first = ir(source);
    let second = ir(source);
    assert_eq!(first, second);
    assert_eq!(first[0], "t0 = 1 + 2");
}

#[test]
fn semantic_errors_stop_lowering() {
    assert!(generate_ir("let a = b;").is_err());
}
