//! End-to-end tests driving the public `compile_file` API directly, in-process.

use jack_compiler::{compile_file, RedefinitionPolicy};

fn lines(src: &[&str]) -> Vec<String> {
    src.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn compiles_a_full_class_with_constructor_and_method() {
    let src = lines(&[
        "class Point {",
        "  field int x, y;",
        "",
        "  constructor Point new(int ax, int ay) {",
        "    let x = ax;",
        "    let y = ay;",
        "    return this;",
        "  }",
        "",
        "  method int getX() {",
        "    return x;",
        "  }",
        "",
        "  method void dispose() {",
        "    do Memory.deAlloc(this);",
        "    return;",
        "  }",
        "}",
    ]);

    let vm = compile_file("Point.jack", &src, RedefinitionPolicy::FirstWins).expect("valid class");
    assert!(vm.contains("function Point.new 0"));
    assert!(vm.contains("call Memory.alloc 1"));
    assert!(vm.contains("pop pointer 0"));
    assert!(vm.contains("function Point.getX 0"));
    assert!(vm.contains("push this 0"));
    assert!(vm.contains("function Point.dispose 0"));
    assert!(vm.contains("push argument 0\npop pointer 0"));
}

#[test]
fn array_element_read_and_write_round_trip() {
    let src = lines(&[
        "class Main {",
        "  function void main() {",
        "    var Array a;",
        "    let a = Array.new(10);",
        "    let a[0] = 5;",
        "    do Output.printInt(a[0]);",
        "    return;",
        "  }",
        "}",
    ]);

    let vm = compile_file("Main.jack", &src, RedefinitionPolicy::FirstWins).expect("valid class");
    assert!(vm.contains("pop that 0"));
    assert!(vm.contains("push that 0"));
}

#[test]
fn tokenizer_errors_surface_through_the_crate_boundary() {
    let src = lines(&["class Main { /* unterminated"]);
    let err = compile_file("Main.jack", &src, RedefinitionPolicy::FirstWins).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Main.jack"));
}

#[test]
fn redefinition_policy_error_rejects_duplicate_locals() {
    let src = lines(&[
        "class Main {",
        "  function void main() {",
        "    var int x;",
        "    var int x;",
        "    return;",
        "  }",
        "}",
    ]);
    let err = compile_file("Main.jack", &src, RedefinitionPolicy::Error).unwrap_err();
    assert!(err.to_string().contains("already declared"));
}

#[test]
fn nested_class_method_calls_resolve_through_field_types() {
    let src = lines(&[
        "class List {",
        "  field int data;",
        "  field List next;",
        "",
        "  method int getData() {",
        "    return data;",
        "  }",
        "",
        "  method int sum() {",
        "    if (next = null) {",
        "      return data;",
        "    } else {",
        "      return data + next.sum();",
        "    }",
        "  }",
        "}",
    ]);

    let vm = compile_file("List.jack", &src, RedefinitionPolicy::FirstWins).expect("valid class");
    assert!(vm.contains("push this 1"));
    assert!(vm.contains("call List.sum 1"));
}
