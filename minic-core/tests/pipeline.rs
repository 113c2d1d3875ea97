use std::{path::PathBuf, rc::Rc};

use minic_core::{
    driver::{analyze, analyze_source, run, Analyzed},
    environment::prelude::{SemanticErrorType, Value},
    eval::prelude::{Evaluator, EvaluatorOptions},
    parser::prelude::{parse_program, Statement},
    utils::prelude::{Error, NullWarningEmitterIO, Problem, VectorWarningEmitterIO, Warning},
};

fn analyzed(src: &str) -> Result<Analyzed, Error> {
    analyze_source(PathBuf::from("test.mc"), src.to_string(), Rc::new(NullWarningEmitterIO))
}

fn execute(src: &str) -> (String, Result<(), Error>) {
    let analyzed = analyzed(src).unwrap_or_else(|err| panic!("{}", err.pretty_string()));
    let mut output = Vec::new();

    let result = run(analyzed, &mut output, EvaluatorOptions::default());

    (String::from_utf8(output).unwrap(), result)
}

fn semantic(problems: &[Problem]) -> Vec<SemanticErrorType> {
    problems.iter().filter_map(|problem| problem.semantic().cloned()).collect()
}

#[test]
fn declarations_store_coerced_values() {
    let parsed = parse_program("int i = 7.8; double d = 3; bool b = 0.0; string s = \"hi\";");
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);

    let mut evaluator = Evaluator::new(&parsed.program, parsed.symbols, Vec::new());
    assert!(evaluator.run().is_empty());

    let expected = [
        ("i", Value::Integer(7)),
        ("d", Value::Double(3.0)),
        ("b", Value::Boolean(false)),
        ("s", Value::String("hi".into())),
    ];

    for (name, value) in expected {
        let symbol = evaluator.symbols().lookup(name).unwrap();

        assert!(symbol.initialized, "`{name}` left uninitialized");
        assert_eq!(symbol.value, Some(value), "value of `{name}`");
    }
}

#[test]
fn precedence_and_integer_division() {
    let (output, result) = execute("print(3 + 4 * 5, (3 + 4) * 5, 5 / 2, 5.0 / 2.0);");

    assert_eq!(result, Ok(()));
    assert_eq!(output, "23 35 2 2.5\n");
}

#[test]
fn division_by_zero_is_reported() {
    let (output, result) = execute("print(5 / 0);\nprint(\"after\");");

    let errors = result.unwrap_err();
    assert!(matches!(errors, Error::Runtime { .. }));
    assert_eq!(semantic(errors.problems()), vec![SemanticErrorType::DivisionByZero]);
    assert_eq!(output, "after\n");
}

#[test]
fn integer_overflow_is_reported() {
    let (_, result) = execute("int x = 9223372036854775807;\nx = x + 1;");

    let errors = result.unwrap_err();
    assert_eq!(semantic(errors.problems()), vec![SemanticErrorType::Overflow]);
    assert_eq!(errors.problems()[0].line(), 2);
}

#[test]
fn infinite_loop_stops_at_the_limit() {
    let (output, result) = execute("int n = 0;\nwhile (true) { n++; }\nprint(n);");

    let errors = result.unwrap_err();
    let problems = errors.problems();

    assert_eq!(
        semantic(problems),
        vec![SemanticErrorType::LoopLimitExceeded { limit: 100_000 }]
    );
    assert_eq!((problems[0].line(), problems[0].column()), (2, 1));
    assert_eq!(output, "100000\n");
}

#[test]
fn for_variable_does_not_leak() {
    let result = analyzed("for (int i = 0; i < 3; i = i + 1) { }\nprint(i);");

    let Err(Error::Compile { errors, .. }) = result else {
        panic!("expected a compile error");
    };

    assert_eq!(
        semantic(&errors),
        vec![SemanticErrorType::UndeclaredVariable { name: "i".into() }]
    );
    assert_eq!((errors[0].line(), errors[0].column()), (2, 7));
}

#[test]
fn inner_declaration_shadows_outer() {
    let warnings = VectorWarningEmitterIO::new();
    let analyzed = analyze_source(
        PathBuf::from("test.mc"),
        "int x = 1;\n{\n    int x = 2;\n    x = x * 10;\n    print(x);\n}\nprint(x);".into(),
        Rc::new(warnings.clone()),
    ).unwrap_or_else(|err| panic!("{}", err.pretty_string()));

    let mut output = Vec::new();
    assert_eq!(run(analyzed, &mut output, EvaluatorOptions::default()), Ok(()));
    assert_eq!(String::from_utf8(output).unwrap(), "20\n1\n");

    let warnings = warnings.take();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].pretty_string().contains("Shadowed variable"));
}

#[test]
fn identifier_led_expression_statement() {
    let parsed = parse_program("int x = 1;\nx + 1;");

    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    assert!(matches!(parsed.program.statements[1], Statement::Expression(_)));
}

#[test]
fn duplicate_declaration_reported_once() {
    for src in ["int x;\nint x = 2;", "int x = 1;\nint x;"] {
        let Err(Error::Compile { errors, .. }) = analyzed(src) else {
            panic!("expected a compile error for {src:?}");
        };

        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(matches!(
            errors[0].semantic(),
            Some(SemanticErrorType::DuplicateDeclaration { name, previous })
                if name == "x" && previous.line == 1
        ));
        assert_eq!((errors[0].line(), errors[0].column()), (2, 5));
    }
}

#[test]
fn compile_errors_render_as_diagnostics() {
    let Err(err) = analyzed("print(1 +);") else {
        panic!("expected a compile error");
    };

    let rendered = err.pretty_string();

    assert!(rendered.contains("Syntax error"), "{rendered}");
    assert!(rendered.contains("test.mc"), "{rendered}");
}

#[test]
fn runtime_errors_render_as_diagnostics() {
    let (_, result) = execute("int[] a = [1];\nprint(a[4]);");

    let rendered = result.unwrap_err().pretty_string();

    assert!(rendered.contains("Runtime error"), "{rendered}");
    assert!(rendered.contains("out of bounds"), "{rendered}");
}

#[test]
fn analyze_reads_files() {
    let path = std::env::temp_dir().join(format!("minic-pipeline-{}.mc", std::process::id()));
    std::fs::write(&path, "int unused = 1;\nstring s = \"héllo\";\nprint(len(s));\n").unwrap();

    let warnings = VectorWarningEmitterIO::new();
    let result = analyze(path.clone(), Rc::new(warnings.clone()));
    let _ = std::fs::remove_file(&path);

    let analyzed = result.unwrap_or_else(|err| panic!("{}", err.pretty_string()));
    assert_eq!(analyzed.path, path);

    let mut output = Vec::new();
    assert_eq!(run(analyzed, &mut output, EvaluatorOptions::default()), Ok(()));
    assert_eq!(String::from_utf8(output).unwrap(), "5\n");

    let warnings = warnings.take();
    assert!(matches!(
        &warnings[..],
        [Warning::Parse { .. }]
    ), "{warnings:?}");
    assert!(warnings[0].pretty_string().contains("Unused variable"));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = analyze(PathBuf::from("/definitely/not/here.mc"), Rc::new(NullWarningEmitterIO));

    assert!(matches!(
        result,
        Err(Error::StdIo { err: std::io::ErrorKind::NotFound })
    ));
}

#[test]
fn problems_share_one_text_format() {
    let rendered = |err: Error| err.problems().iter()
        .map(|problem| problem.to_string())
        .collect::<Vec<String>>();

    let Err(lexical) = analyzed("print(1);\n@") else {
        panic!("expected a lexical error");
    };
    assert_eq!(
        rendered(lexical),
        vec!["at line 2, column 1: lexical error - invalid character `@`"]
    );

    let Err(syntactic) = analyzed("int a = ;") else {
        panic!("expected a syntax error");
    };
    assert_eq!(
        rendered(syntactic),
        vec!["at line 1, column 9: syntactic error - expected an expression, found `;`"]
    );

    let (_, result) = execute("int big = 9223372036854775807;\nbig = big + 1;");
    assert_eq!(
        rendered(result.unwrap_err()),
        vec!["at line 2, column 11: semantic error - arithmetic overflow"]
    );
}
