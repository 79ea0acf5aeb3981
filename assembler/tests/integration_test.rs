//! End-to-end tests driving the public `assemble` API directly, in-process.

use assembler::assemble;

#[test]
fn assembles_label_before_forward_reference() {
    let lines = vec![
        "@100".to_string(),
        "(LOOP)".to_string(),
        "@LOOP".to_string(),
        "0;JMP".to_string(),
    ];

    let binary = assemble(&lines, "Loop.asm").expect("valid program");

    assert_eq!(binary.len(), 3);
    assert_eq!(binary[0], "0000000001100100"); // @100
    assert_eq!(binary[1], "0000000000000001"); // @LOOP -> ROM[1]
    assert_eq!(binary[2], "1110101010000111"); // 0;JMP
}

#[test]
fn pass_one_instruction_count_matches_pass_two_output_length() {
    let lines = vec![
        "@16".to_string(),
        "D=A".to_string(),
        "(SKIP)".to_string(),
        "@SKIP".to_string(),
        "D;JGT".to_string(),
        "(END)".to_string(),
    ];

    let binary = assemble(&lines, "Count.asm").expect("valid program");
    // 4 real instructions; the two label definitions emit nothing.
    assert_eq!(binary.len(), 4);
}

#[test]
fn variable_addresses_are_assigned_contiguously_from_sixteen() {
    let lines = vec![
        "@foo".to_string(),
        "M=0".to_string(),
        "@bar".to_string(),
        "M=0".to_string(),
        "@baz".to_string(),
        "M=0".to_string(),
    ];

    let binary = assemble(&lines, "Vars.asm").expect("valid program");
    assert_eq!(binary[0], "0000000000010000"); // foo -> 16
    assert_eq!(binary[2], "0000000000010001"); // bar -> 17
    assert_eq!(binary[4], "0000000000010010"); // baz -> 18
}

#[test]
fn predefined_symbols_never_shadow_into_variable_space() {
    let lines = vec!["@SCREEN".to_string(), "D=A".to_string()];

    let binary = assemble(&lines, "Screen.asm").expect("valid program");
    assert_eq!(binary[0], "0100000000000000"); // SCREEN == 16384
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let lines = vec![
        "// header comment".to_string(),
        String::new(),
        "   @1   // inline comment".to_string(),
        "D=A".to_string(),
    ];

    let binary = assemble(&lines, "Comments.asm").expect("valid program");
    assert_eq!(binary.len(), 2);
}

#[test]
fn duplicate_label_definition_is_rejected() {
    let lines = vec![
        "(LOOP)".to_string(),
        "@0".to_string(),
        "(LOOP)".to_string(),
    ];

    let err = assemble(&lines, "Dup.asm").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Dup.asm"));
    assert!(message.contains("LOOP"));
}

#[test]
fn invalid_computation_mnemonic_is_rejected_with_line_number() {
    let lines = vec!["@0".to_string(), "@1".to_string(), "D=NOTREAL".to_string()];

    let err = assemble(&lines, "Invalid.asm").unwrap_err();
    assert_eq!(err.line, 3);
}
