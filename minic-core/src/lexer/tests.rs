use super::prelude::{tokenize, Lexer, LexicalErrorType, TokenKind, TokenValue};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input).tokens.iter().map(|token| token.kind).collect()
}

#[test]
fn test_numbers() {
    let input = r#"
        10
        0
        1.5
        12.250
        7.
        3.x
    "#;

    let lexed = tokenize(input);

    let expected = vec![
        (TokenKind::Int, Some(TokenValue::Int(10))),
        (TokenKind::Int, Some(TokenValue::Int(0))),
        (TokenKind::Double, Some(TokenValue::Double(1.5))),
        (TokenKind::Double, Some(TokenValue::Double(12.25))),
        (TokenKind::Int, Some(TokenValue::Int(7))),
        (TokenKind::Invalid, None),
        (TokenKind::Int, Some(TokenValue::Int(3))),
        (TokenKind::Invalid, None),
        (TokenKind::Ident, None),
        (TokenKind::Eof, None),
    ];

    assert_eq!(lexed.tokens.len(), expected.len(), "{:?}", lexed.tokens);

    for (idx, ((kind, value), token)) in expected.iter().zip(lexed.tokens.iter()).enumerate() {
        assert_eq!(
            (*kind, value), (token.kind, &token.value),
            "Next token does not match expected token at {}", idx
        );
    }

    // both stray periods are invalid characters
    assert_eq!(lexed.errors.len(), 2);
    assert!(lexed.errors.iter().all(|err| err.error == LexicalErrorType::InvalidCharacter { ch: '.' }));
}

#[test]
fn test_invalid_numbers() {
    let lexed = tokenize("99999999999999999999 12abc 9");

    let fails = vec![
        LexicalErrorType::MalformedNumber { lexeme: "99999999999999999999".into() },
        LexicalErrorType::InvalidIdentifier { lexeme: "12abc".into() },
    ];

    assert_eq!(lexed.errors.iter().map(|err| err.error.clone()).collect::<Vec<_>>(), fails);
    assert_eq!(
        lexed.tokens.iter().map(|token| token.kind).collect::<Vec<_>>(),
        vec![TokenKind::Invalid, TokenKind::Invalid, TokenKind::Int, TokenKind::Eof]
    );
}

#[test]
fn test_keywords_and_identifiers() {
    assert_eq!(
        kinds("int double string bool void func if else while for break continue return print true false _tmp x1 Int"),
        vec![
            TokenKind::IntType,
            TokenKind::DoubleType,
            TokenKind::StringType,
            TokenKind::BoolType,
            TokenKind::Void,
            TokenKind::Func,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::For,
            TokenKind::Break,
            TokenKind::Continue,
            TokenKind::Return,
            TokenKind::Print,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_longest_match() {
    assert_eq!(
        kinds("<= >= == != && || ++ -- += -= *= /= %= < > = ! + - * / %"),
        vec![
            TokenKind::LessThanOrEqual,
            TokenKind::GreaterThanOrEqual,
            TokenKind::Equal,
            TokenKind::NotEqual,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Increment,
            TokenKind::Decrement,
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
            TokenKind::StarAssign,
            TokenKind::SlashAssign,
            TokenKind::PercentAssign,
            TokenKind::LessThan,
            TokenKind::GreaterThan,
            TokenKind::Assign,
            TokenKind::Bang,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Eof,
        ]
    );

    assert_eq!(
        kinds("a+++b"),
        vec![TokenKind::Ident, TokenKind::Increment, TokenKind::Plus, TokenKind::Ident, TokenKind::Eof]
    );
}

#[test]
fn test_positions() {
    let lexed = tokenize("int x = 5;\n  print(x);");

    let positions = lexed.tokens.iter()
        .map(|token| (token.lexeme.as_str(), token.line, token.column, token.offset))
        .collect::<Vec<_>>();

    assert_eq!(positions, vec![
        ("int", 1, 1, 0),
        ("x", 1, 5, 4),
        ("=", 1, 7, 6),
        ("5", 1, 9, 8),
        (";", 1, 10, 9),
        ("print", 2, 3, 13),
        ("(", 2, 8, 18),
        ("x", 2, 9, 19),
        (")", 2, 10, 20),
        (";", 2, 11, 21),
        ("", 2, 12, 22),
    ]);
}

#[test]
fn test_strings() {
    let lexed = tokenize(r#"string s = "hello world";"#);

    let string = &lexed.tokens[3];
    assert_eq!(string.kind, TokenKind::String);
    assert_eq!(string.lexeme, "\"hello world\"");
    assert_eq!(string.value, Some(TokenValue::String("hello world".into())));
    assert!(lexed.errors.is_empty());
}

#[test]
fn test_unterminated_string() {
    let lexed = tokenize("print(\"abc\n);");

    assert_eq!(lexed.errors.len(), 1);
    assert_eq!(lexed.errors[0].error, LexicalErrorType::UnterminatedString);
    assert_eq!((lexed.errors[0].location.line, lexed.errors[0].location.column), (1, 7));

    // lexing continues on the next line
    assert_eq!(
        lexed.tokens.iter().map(|token| token.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Print,
            TokenKind::LParen,
            TokenKind::Invalid,
            TokenKind::RParen,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
    assert_eq!(lexed.tokens[2].lexeme, "\"abc");

    let lexed = tokenize("\"never closed");
    assert_eq!(lexed.errors[0].error, LexicalErrorType::UnterminatedString);
    assert_eq!(lexed.tokens.last().map(|token| token.kind), Some(TokenKind::Eof));
}

#[test]
fn test_invalid_characters() {
    let lexed = tokenize("x @ y # z");

    assert_eq!(
        lexed.errors.iter().map(|err| err.error.clone()).collect::<Vec<_>>(),
        vec![
            LexicalErrorType::InvalidCharacter { ch: '@' },
            LexicalErrorType::InvalidCharacter { ch: '#' },
        ]
    );
    assert_eq!(lexed.errors[1].location.column, 7);
    assert_eq!(lexed.tokens.iter().filter(|token| token.kind == TokenKind::Invalid).count(), 2);
}

#[test]
fn test_comments_and_single_eof() {
    let input = "// leading comment\nint a; // trailing\n// last";

    let lexed = tokenize(input);

    assert_eq!(
        lexed.tokens.iter().map(|token| token.kind).collect::<Vec<_>>(),
        vec![TokenKind::IntType, TokenKind::Ident, TokenKind::Semicolon, TokenKind::Eof]
    );
    assert_eq!(lexed.tokens[0].line, 2);

    let mut lexer = Lexer::new("".char_indices().map(|(i, c)| (i as u32, c)));
    assert_eq!(lexer.next().map(|token| token.kind), Some(TokenKind::Eof));
    assert_eq!(lexer.next(), None);
}
