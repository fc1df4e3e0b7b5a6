use scriptcc::codegen::Codegen;
use scriptcc::generate_code;
use scriptcc::ir::Instruction;

fn asm(input: &str) -> Vec<String> {
    generate_code(input).unwrap()
}

fn contains_run(lines: &[String], run: &[&str]) -> bool {
    lines
        .windows(run.len())
        .any(|w| w.iter().zip(run).all(|(a, b)| a == b))
}

#[test]
fn header_and_assignments() {
    assert_eq!(
        asm("let x = 2 + 3;"),
        [
            ".intel_syntax noprefix",
            "  mov rax, 5",
            "  mov t0, rax",
            "  mov rax, 5",
            "  mov x, rax"
        ]
    );
}

#[test]
fn function_frame() {
    assert_eq!(
        asm("function add(a, b) { return a + b; }"),
        [
            ".intel_syntax noprefix",
            "add:",
            "  push rbp",
            "  mov rbp, rsp",
            "  mov rax, [rbp+16]",
            "  mov a, rax",
            "  mov rax, [rbp+24]",
            "  mov b, rax",
            "  mov rax, a",
            "  add rax, b",
            "  mov t0, rax",
            "  mov rax, t0",
            "  mov rsp, rbp",
            "  pop rbp",
            "  ret"
        ]
    );
}

#[test]
fn call_pushes_arguments_and_cleans_up() {
    let lines = asm("print(1, 2);");
    assert!(contains_run(
        &lines,
        &[
            "  push 1",
            "  push 2",
            "  call print",
            "  mov t0, rax",
            "  add rsp, 16"
        ]
    ));

    let lines = asm("function f() { return 1; } f();");
    assert!(contains_run(&lines, &["  call f", "  mov t0, rax"]));
    assert!(!lines.iter().any(|l| l.starts_with("  add rsp")));
}

#[test]
fn branches() {
    let lines = asm("function f(x) { if (x) { return 1; } return 0; }");
    assert!(contains_run(
        &lines,
        &["  cmp x, 0", "  jne L0", "  jmp L1", "L0:"]
    ));
    assert!(lines.contains(&"L1:".to_string()));
}

#[test]
fn arithmetic_instructions() {
    let lines = asm("function f(a, b) { return a / b; }");
    assert!(contains_run(
        &lines,
        &["  mov rax, a", "  xor rdx, rdx", "  idiv b", "  mov t0, rax"]
    ));

    let lines = asm("function f(a, b) { return a % b; }");
    assert!(contains_run(
        &lines,
        &["  xor rdx, rdx", "  idiv b", "  mov rax, rdx", "  mov t0, rax"]
    ));

    let lines = asm("function f(a, b) { return a - b * 2; }");
    assert!(lines.contains(&"  sub rax, b".to_string()));
    assert!(lines.contains(&"  imul rax, 2".to_string()));
}

#[test]
fn comparisons_and_unary() {
    let lines = asm("function f(a) { return a < 1; }");
    assert!(contains_run(
        &lines,
        &["  cmp rax, 1", "  setl al", "  movzx rax, al"]
    ));

    let lines = asm("function f(a) { return !a; }");
    assert!(contains_run(
        &lines,
        &["  mov rax, a", "  cmp rax, 0", "  sete al", "  movzx rax, al"]
    ));

    let lines = asm("function f(a) { return -a; }");
    assert!(contains_run(&lines, &["  mov rax, a", "  neg rax"]));
}

#[test]
fn objects_and_classes() {
    let lines = asm("class P { constructor(x) { this.x = x; } } let p = new P(1); let o = { k: p };");
    assert!(lines.contains(&"# class P".to_string()));
    assert!(lines.contains(&"P.constructor:".to_string()));
    assert!(contains_run(&lines, &["  mov rax, x", "  mov [this.x], rax"]));
    assert!(contains_run(
        &lines,
        &["  push 1", "  call P.constructor", "  mov t0, rax", "  add rsp, 8"]
    ));
    assert!(contains_run(&lines, &["  call __new_object", "  mov t1, rax"]));
}

#[test]
fn outer_function_keeps_its_epilogue() {
    let lines = asm("function f() { function g() { return 1; } }");
    assert_eq!(
        &lines[lines.len() - 4..],
        ["L0:", "  mov rsp, rbp", "  pop rbp", "  ret"]
    );
    assert_eq!(lines.iter().filter(|l| *l == "  ret").count(), 2);
}

#[test]
fn formal_parameters_and_arguments_are_told_apart() {
    let instructions = vec![
        Instruction::Function("f".to_string()),
        Instruction::Param("a".to_string()),
        Instruction::Param("1".to_string()),
        Instruction::Call {
            dest: "t0".to_string(),
            name: "g".to_string(),
            argc: 1,
        },
    ];
    let lines = Codegen::new().generate(&instructions);
    assert_eq!(
        &lines[4..],
        [
            "  mov rax, [rbp+16]",
            "  mov a, rax",
            "  push 1",
            "  call g",
            "  mov t0, rax",
            "  add rsp, 8"
        ]
    );
}

#[test]
fn arrays_and_closures() {
    let lines = asm("let a = [7]; let f = x => x;");
    assert!(contains_run(&lines, &["  call __new_array", "  mov t0, rax"]));
    assert!(contains_run(&lines, &["  mov rax, 7", "  mov [t0+0], rax"]));
    assert!(contains_run(&lines, &["  lea rax, [L0]", "  mov t1, rax"]));
}
