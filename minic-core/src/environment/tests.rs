use crate::utils::prelude::{Location, SrcSpan};

use super::prelude::{
    Declared, ScopeError, SemanticErrorType, SymbolTable, Value, ValueType, GLOBAL_SCOPE
};

fn at(line: u32, column: u32) -> Location {
    let offset = line * 100 + column;

    Location::new(line, column, SrcSpan::from(offset, offset + 1))
}

#[test]
fn test_coercions() {
    let cases = vec![
        (Value::Integer(3), ValueType::Double, Some(Value::Double(3.0))),
        (Value::Double(3.9), ValueType::Integer, Some(Value::Integer(3))),
        (Value::Double(-3.9), ValueType::Integer, Some(Value::Integer(-3))),
        (Value::Double(1e30), ValueType::Integer, None),
        (Value::Double(f64::NAN), ValueType::Integer, None),
        (Value::Integer(0), ValueType::Boolean, Some(Value::Boolean(false))),
        (Value::Integer(-7), ValueType::Boolean, Some(Value::Boolean(true))),
        (Value::Double(1e-12), ValueType::Boolean, Some(Value::Boolean(false))),
        (Value::Boolean(true), ValueType::Integer, Some(Value::Integer(1))),
        (Value::Boolean(false), ValueType::Double, Some(Value::Double(0.0))),
        (Value::String("a".into()), ValueType::String, Some(Value::String("a".into()))),
        (Value::String("1".into()), ValueType::Integer, None),
        (Value::Integer(1), ValueType::String, None),
        (
            Value::Array(vec![Value::Integer(1), Value::Double(2.5)]),
            ValueType::array_of(ValueType::Integer),
            Some(Value::Array(vec![Value::Integer(1), Value::Integer(2)]))
        ),
        (
            Value::Array(vec![Value::String("x".into())]),
            ValueType::array_of(ValueType::Integer),
            None
        ),
        (Value::Integer(1), ValueType::array_of(ValueType::Integer), None),
    ];

    for (idx, (value, target, expected)) in cases.into_iter().enumerate() {
        assert_eq!(value.coerce_to(&target), expected, "coercion case {idx}");
    }
}

#[test]
fn test_truthiness_and_display() {
    assert!(Value::Double(0.5).is_truthy());
    assert!(!Value::Double(1e-11).is_truthy());
    assert!(!Value::String(String::new()).is_truthy());
    assert!(Value::Array(vec![Value::Integer(0)]).is_truthy());
    assert!(!Value::Integer(0).is_truthy());

    assert_eq!(Value::Double(2.0).to_string(), "2.0");
    assert_eq!(Value::Double(2.5).to_string(), "2.5");
    assert_eq!(Value::Array(vec![Value::Integer(1), Value::Integer(2)]).to_string(), "[1, 2]");
    assert_eq!(ValueType::array_of(ValueType::Double).to_string(), "double[]");
}

#[test]
fn test_declare_and_shadow() {
    let mut table = SymbolTable::new();

    assert_eq!(table.declare("x", ValueType::Integer, at(1, 5)), Ok(Declared::Fresh));

    let duplicate = table.declare("x", ValueType::Double, at(2, 5)).unwrap_err();
    assert_eq!(
        duplicate.error,
        SemanticErrorType::DuplicateDeclaration { name: "x".into(), previous: at(1, 5) }
    );
    assert_eq!(duplicate.location, at(2, 5));

    let block = table.enter_scope("block");
    assert_eq!(table.declare("x", ValueType::String, at(3, 9)), Ok(Declared::Shadowing(at(1, 5))));
    assert!(table.scope(block).is_some_and(|scope| scope.shadowed.contains("x")));

    table.write("x", Value::String("inner".into()), at(4, 9)).unwrap();
    assert_eq!(table.read("x", at(5, 9)), Ok(Value::String("inner".into())));

    let closed = table.exit_scope().unwrap();
    assert!(closed.closed);
    assert_eq!(closed.parent, Some(GLOBAL_SCOPE));
    assert!(closed.symbols.contains_key("x"));

    // the outer binding is untouched
    assert_eq!(table.lookup("x").map(|symbol| &symbol.value_type), Some(&ValueType::Integer));
    assert!(matches!(
        table.read("x", at(6, 1)).map_err(|err| err.error),
        Err(SemanticErrorType::UninitializedUse { .. })
    ));
}

#[test]
fn test_exit_purges_symbols() {
    let mut table = SymbolTable::new();

    table.enter_scope("for");
    table.declare("i", ValueType::Integer, at(1, 10)).unwrap();
    table.write("i", Value::Integer(0), at(1, 10)).unwrap();
    table.exit_scope().unwrap();

    assert!(table.lookup("i").is_none());
    assert_eq!(
        table.read("i", at(2, 1)).map_err(|err| err.error),
        Err(SemanticErrorType::UndeclaredVariable { name: "i".into() })
    );
    assert_eq!(table.exit_scope(), Err(ScopeError::GlobalScope));
    assert_eq!(table.depth(), 1);
}

#[test]
fn test_scope_ids_are_not_reused() {
    let mut table = SymbolTable::new();

    let first = table.enter_scope("a");
    table.exit_scope().unwrap();
    let second = table.enter_scope("b");

    assert_ne!(first, second);
    assert_eq!(table.scopes().len(), 2);
}

#[test]
fn test_function_scope_skips_caller_locals() {
    let mut table = SymbolTable::new();
    table.declare("g", ValueType::Integer, at(1, 1)).unwrap();

    table.enter_scope("block");
    table.declare("local", ValueType::Integer, at(2, 1)).unwrap();

    table.enter_function_scope("f");
    assert!(table.lookup("g").is_some());
    assert!(table.lookup("local").is_none());

    table.exit_scope().unwrap();
    assert!(table.lookup("local").is_some());
}

#[test]
fn test_write_coerces_and_checks() {
    let mut table = SymbolTable::new();
    table.declare("n", ValueType::Integer, at(1, 1)).unwrap();
    table.declare("s", ValueType::String, at(2, 1)).unwrap();

    table.write("n", Value::Double(7.8), at(3, 1)).unwrap();
    assert_eq!(table.read("n", at(4, 1)), Ok(Value::Integer(7)));

    assert_eq!(
        table.write("s", Value::Integer(1), at(5, 1)).map_err(|err| err.error),
        Err(SemanticErrorType::TypeMismatch { expected: "string".into(), found: "int".into() })
    );
    assert!(!table.lookup("s").is_some_and(|symbol| symbol.initialized));

    assert!(matches!(
        table.write("missing", Value::Integer(1), at(6, 1)).map_err(|err| err.error),
        Err(SemanticErrorType::UndeclaredVariable { .. })
    ));
}

#[test]
fn test_write_element() {
    let mut table = SymbolTable::new();
    table.declare("a", ValueType::array_of(ValueType::Integer), at(1, 1)).unwrap();

    assert!(matches!(
        table.write_element("a", 0, Value::Integer(1), at(2, 1)).map_err(|err| err.error),
        Err(SemanticErrorType::UninitializedUse { .. })
    ));

    table.write("a", Value::Array(vec![Value::Integer(1), Value::Integer(2)]), at(3, 1)).unwrap();
    table.write_element("a", 1, Value::Double(9.5), at(4, 1)).unwrap();

    assert_eq!(
        table.read("a", at(5, 1)),
        Ok(Value::Array(vec![Value::Integer(1), Value::Integer(9)]))
    );
    assert_eq!(
        table.write_element("a", 2, Value::Integer(0), at(6, 1)).map_err(|err| err.error),
        Err(SemanticErrorType::IndexOutOfBounds { index: 2, length: 2 })
    );
    assert_eq!(
        table.write_element("a", -1, Value::Integer(0), at(7, 1)).map_err(|err| err.error),
        Err(SemanticErrorType::IndexOutOfBounds { index: -1, length: 2 })
    );
}

#[test]
fn test_rebind_replaces_binding() {
    let mut table = SymbolTable::new();
    table.declare("x", ValueType::Integer, at(1, 1)).unwrap();
    table.write("x", Value::Integer(3), at(1, 1)).unwrap();

    table.rebind("x", ValueType::Integer, at(1, 1));

    assert!(table.lookup("x").is_some_and(|symbol| !symbol.initialized && symbol.value.is_none()));
}

#[test]
fn test_unused_symbols() {
    let mut table = SymbolTable::new();
    table.enter_scope("block");
    table.declare("b", ValueType::Integer, at(2, 1)).unwrap();
    table.declare("a", ValueType::Integer, at(1, 1)).unwrap();
    table.declare("c", ValueType::Integer, at(3, 1)).unwrap();

    assert!(table.mark_used("c"));
    assert!(!table.mark_used("d"));

    let scope = table.exit_scope().unwrap();
    let unused = scope.unused().iter().map(|symbol| symbol.name.as_str()).collect::<Vec<_>>();

    assert_eq!(unused, vec!["a", "b"]);
}

#[test]
fn test_value_of_borrows_in_place() {
    let mut table = SymbolTable::new();
    table.declare("a", ValueType::array_of(ValueType::Integer), at(1, 1)).unwrap();

    assert_eq!(
        table.value_of("a", at(2, 1)).map_err(|err| err.error),
        Err(SemanticErrorType::UninitializedUse { name: "a".into() })
    );

    table.write("a", Value::Array(vec![Value::Integer(4), Value::Integer(5)]), at(1, 1)).unwrap();

    let stored = table.value_of("a", at(3, 1)).unwrap();
    assert!(std::ptr::eq(stored, table.lookup("a").unwrap().value.as_ref().unwrap()));
    assert_eq!(table.read("a", at(3, 1)).ok().as_ref(), Some(stored));
}
