use crate::{
    environment::prelude::SemanticErrorType,
    lexer::prelude::LexicalErrorType,
    utils::prelude::ProblemKind,
};
use super::prelude::{parse_program, ParseErrorType, ParseWarning, Parsed, Statement, MAX_NESTING_DEPTH};

fn positions(parsed: &Parsed) -> Vec<(u32, u32)> {
    parsed.errors.iter().map(|err| (err.line(), err.column())).collect()
}

#[test]
fn test_precedence() {
    let input = r#"
        print(3 + 4 * 5);
        print(-2 * 3 - 1);
        print((1 + 2) * 3);
        print(1 < 2 == true);
        print(1 - 2 - 3);
        print(!true || false && true);
    "#;

    let parsed = parse_program(input);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);

    let expected = vec![
        "print((3 + (4 * 5)));",
        "print((((-2) * 3) - 1));",
        "print(((1 + 2) * 3));",
        "print(((1 < 2) == true));",
        "print(((1 - 2) - 3));",
        "print(((!true) || (false && true)));",
    ];

    assert_eq!(parsed.program.to_string(), expected.join("\n"));
}

#[test]
fn test_identifier_led_statements() {
    let input = r#"
        int x = 1;
        x + 1;
        x = x + 2;
        x += 3;
        x++;
        --x;
    "#;

    let parsed = parse_program(input);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);

    let statements = &parsed.program.statements;
    assert_eq!(statements.len(), 6);
    assert!(matches!(statements[0], Statement::Declaration(_)));
    assert!(matches!(statements[1], Statement::Expression(_)));
    assert!(matches!(statements[2], Statement::Assignment(_)));
    assert!(matches!(statements[3], Statement::CompoundAssignment(_)));
    assert!(matches!(statements[4], Statement::Expression(_)));
    assert!(matches!(statements[5], Statement::Expression(_)));

    assert_eq!(
        parsed.program.to_string(),
        "int x = 1;\n(x + 1);\nx = (x + 2);\nx += 3;\nx++;\n--x;"
    );
}

#[test]
fn test_rewind_drops_speculative_errors() {
    let input = "int[] a = [1];\na[b] + 1;";

    let parsed = parse_program(input);

    assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
    assert_eq!(
        parsed.errors[0].kind,
        ProblemKind::Semantic(SemanticErrorType::UndeclaredVariable { name: "b".into() })
    );
    assert_eq!(positions(&parsed), vec![(2, 3)]);
}

#[test]
fn test_arrays() {
    let input = "int[] a = [1, 2];\na[0] = a[1] + 1;";

    let parsed = parse_program(input);

    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    assert_eq!(parsed.program.to_string(), "int[] a = [1, 2];\na[0] = (a[1] + 1);");
}

#[test]
fn test_duplicate_declaration() {
    let input = "int x = 1;\nint x = 2;\nprint(x);";

    let parsed = parse_program(input);

    assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
    assert_eq!(positions(&parsed), vec![(2, 5)]);

    match &parsed.errors[0].kind {
        ProblemKind::Semantic(SemanticErrorType::DuplicateDeclaration { name, previous }) => {
            assert_eq!(name, "x");
            assert_eq!((previous.line, previous.column), (1, 5));
        },
        kind => panic!("unexpected problem {kind:?}")
    }
}

#[test]
fn test_for_scope_is_closed() {
    let input = "for (int i = 0; i < 3; i++) { print(i); }\nprint(i);";

    let parsed = parse_program(input);

    assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
    assert_eq!(
        parsed.errors[0].kind,
        ProblemKind::Semantic(SemanticErrorType::UndeclaredVariable { name: "i".into() })
    );
    assert_eq!(positions(&parsed), vec![(2, 7)]);
}

#[test]
fn test_recovery_skips_to_next_statement() {
    let input = "int a = ;\nint b = 2;\nprint(b);";

    let parsed = parse_program(input);

    assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
    assert_eq!(
        parsed.errors[0].kind,
        ProblemKind::Syntactic(ParseErrorType::ExpectedExpression { found: "`;`".into() })
    );
    assert_eq!(positions(&parsed), vec![(1, 9)]);
    assert_eq!(parsed.program.statements.len(), 2);
}

#[test]
fn test_missing_token_is_inserted() {
    let input = "int a = 1\nprint(a);";

    let parsed = parse_program(input);

    assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
    assert_eq!(
        parsed.errors[0].kind,
        ProblemKind::Syntactic(ParseErrorType::UnexpectedToken {
            expected: "`;`".into(),
            found: "`print`".into(),
        })
    );
    assert_eq!(positions(&parsed), vec![(2, 1)]);
    assert_eq!(parsed.program.statements.len(), 2);
}

#[test]
fn test_stray_brace() {
    let parsed = parse_program("}\nprint(1);");

    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].kind, ProblemKind::Syntactic(ParseErrorType::UnmatchedBrace));
    assert_eq!(parsed.program.statements.len(), 1);
}

#[test]
fn test_invalid_increment_target() {
    let parsed = parse_program("int a = 1;\n++5;\nprint(a);");

    assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
    assert_eq!(
        parsed.errors[0].kind,
        ProblemKind::Syntactic(ParseErrorType::InvalidIncrementTarget {
            operator: "++".into(),
            found: "`5`".into(),
        })
    );
    assert_eq!(positions(&parsed), vec![(2, 3)]);
}

#[test]
fn test_unary_plus() {
    let parsed = parse_program("print(+5);");

    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].kind, ProblemKind::Lexical(LexicalErrorType::UnaryPlus));
    assert_eq!(positions(&parsed), vec![(1, 7)]);
    assert_eq!(parsed.program.to_string(), "print(5);");
}

#[test]
fn test_shadowing_warns() {
    let input = r#"int x = 1;
{
    int x = x + 1;
    print(x);
}
print(x);"#;

    let parsed = parse_program(input);

    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    assert_eq!(parsed.warnings.len(), 1, "{:?}", parsed.warnings);

    match &parsed.warnings[0] {
        ParseWarning::ShadowedVariable { name, location, outer } => {
            assert_eq!(name, "x");
            assert_eq!((location.line, location.column), (3, 9));
            assert_eq!((outer.line, outer.column), (1, 5));
        },
        warning => panic!("unexpected warning {warning:?}")
    }
}

#[test]
fn test_unused_and_unreachable() {
    let input = r#"void f() {
    int unused = 1;
    int _ignored = 2;
    return;
    print(1);
    print(2);
}"#;

    let parsed = parse_program(input);

    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    assert_eq!(
        parsed.warnings.iter().map(|warning| warning.location().line).collect::<Vec<_>>(),
        vec![2, 5]
    );
    assert!(matches!(
        &parsed.warnings[0],
        ParseWarning::UnusedVariable { name, .. } if name == "unused"
    ));
    assert!(matches!(parsed.warnings[1], ParseWarning::UnreachableCode { .. }));
}

#[test]
fn test_control_flow_context() {
    let input = r#"break;
while (true) { break; }
for (;;) { if (true) continue; }
return 1;"#;

    let parsed = parse_program(input);

    let kinds = parsed.errors.iter().map(|err| err.kind.clone()).collect::<Vec<_>>();
    assert_eq!(kinds, vec![
        ProblemKind::Semantic(SemanticErrorType::OutsideLoop { keyword: "break" }),
        ProblemKind::Semantic(SemanticErrorType::ReturnOutsideFunction),
    ]);
    assert_eq!(positions(&parsed), vec![(1, 1), (4, 1)]);
}

#[test]
fn test_functions_are_hoisted() {
    let input = r#"int main() { return twice(2); }
int twice(int n) { return n * 2; }
print(twice(1, 2));
print(nothing());
print(len("abc"), max(1, 2));"#;

    let parsed = parse_program(input);

    let kinds = parsed.errors.iter().map(|err| err.kind.clone()).collect::<Vec<_>>();
    assert_eq!(kinds, vec![
        ProblemKind::Semantic(SemanticErrorType::ArityMismatch {
            name: "twice".into(),
            expected: 1,
            found: 2,
        }),
        ProblemKind::Semantic(SemanticErrorType::UndefinedFunction { name: "nothing".into() }),
    ]);
    assert_eq!(positions(&parsed), vec![(3, 7), (4, 7)]);
    assert_eq!(parsed.program.functions().count(), 2);
}

#[test]
fn test_function_declaration_rules() {
    let input = "void f() {}\nvoid f() {}\n{ int g() { return 1; } }";

    let parsed = parse_program(input);

    assert_eq!(parsed.errors.len(), 2, "{:?}", parsed.errors);
    assert_eq!(positions(&parsed), vec![(2, 6), (3, 7)]);

    match &parsed.errors[0].kind {
        ProblemKind::Semantic(SemanticErrorType::DuplicateDeclaration { name, previous }) => {
            assert_eq!(name, "f");
            assert_eq!((previous.line, previous.column), (1, 6));
        },
        kind => panic!("unexpected problem {kind:?}")
    }
    assert_eq!(
        parsed.errors[1].kind,
        ProblemKind::Semantic(SemanticErrorType::NestedFunction { name: "g".into() })
    );
}

#[test]
fn test_function_display() {
    let input = "func add(int a, double[] b) { return a + len(b); }";

    let parsed = parse_program(input);

    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    assert_eq!(
        parsed.program.to_string(),
        "func add(int a, double[] b) { return (a + len(b)); }"
    );
}

#[test]
fn test_deep_parentheses_are_rejected() {
    let input = format!("int x = {}1{};\nprint(2);", "(".repeat(1000), ")".repeat(1000));

    let parsed = parse_program(&input);

    assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
    assert_eq!(
        parsed.errors[0].kind,
        ProblemKind::Syntactic(ParseErrorType::NestingTooDeep { limit: MAX_NESTING_DEPTH })
    );
    // the statement itself takes one level
    assert_eq!(positions(&parsed), vec![(1, 9 + MAX_NESTING_DEPTH as u32 - 1)]);
    assert!(matches!(parsed.program.statements[..], [Statement::Print(_)]));

    let shallow = format!("int x = {}1{};", "(".repeat(100), ")".repeat(100));
    assert!(parse_program(&shallow).errors.is_empty());
}

#[test]
fn test_deep_blocks_are_rejected() {
    let input = format!("{}{}", "{".repeat(1000), "}".repeat(1000));

    // the default test thread stack is too small for the recovery path
    let parsed = std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(move || parse_program(&input).errors)
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(
        parsed[0].kind,
        ProblemKind::Syntactic(ParseErrorType::NestingTooDeep { limit: MAX_NESTING_DEPTH })
    );
    assert!(parsed[1..].iter().all(|err| err.kind == ProblemKind::Syntactic(ParseErrorType::UnmatchedBrace)));
}
