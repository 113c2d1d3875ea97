use crate::{
    environment::prelude::SemanticErrorType,
    eval::builtins,
    lexer::prelude::{LexicalError, LexicalErrorType, TokenKind, TokenValue},
};
use super::ast::{
    Call, Expression, Fixity, Identifier, Increment, IncrementOperator, Infix, InfixOperator,
    Prefix, PrefixOperator, Primitive,
};
use super::error::{parse_error, ParseError, ParseErrorType};
use super::parser::{InfixParse, Parse, Parser, Precedence};

// expression -> <primary> { [ <expression> ] } { <infix_operator> <expression> }
impl Parse for Expression {
    fn parse(
        parser: &mut Parser,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.nested(|parser| parse_expression(parser, precedence))
    }
}

fn parse_expression(
    parser: &mut Parser,
    precedence: Option<Precedence>
) -> Result<Expression, ParseError> {
    let token = parser.current().clone();

    let mut expr = match token.kind {
        TokenKind::Int
        | TokenKind::Double
        | TokenKind::String
        | TokenKind::True
        | TokenKind::False => Expression::Primitive(Primitive::parse(parser, None)?),
        TokenKind::Ident if parser.peek(1).is(TokenKind::LParen) => {
            Expression::Call(Call::parse(parser, None)?)
        },
        TokenKind::Ident => {
            let ident = parser.expect_ident()?;

            match parser.current().kind {
                TokenKind::Increment | TokenKind::Decrement => {
                    Expression::Increment(Increment::postfix(parser, ident))
                },
                _ => {
                    parser.resolve(&ident);
                    Expression::Identifier(ident)
                }
            }
        },
        TokenKind::Minus | TokenKind::Bang => Expression::Prefix(Prefix::parse(parser, None)?),
        TokenKind::Plus => {
            // unary plus is rejected, the operand still gets parsed
            parser.advance();
            parser.error(LexicalError {
                error: LexicalErrorType::UnaryPlus,
                location: token.location(),
            });

            Expression::parse(parser, Some(Precedence::Prefix))?
        },
        TokenKind::Increment | TokenKind::Decrement => {
            Expression::Increment(Increment::parse(parser, None)?)
        },
        TokenKind::LParen => {
            parser.advance();

            let expression = Box::new(Expression::parse(parser, None)?);
            parser.expect_or_insert(TokenKind::RParen);

            Expression::Nested {
                expression,
                location: token.location()
            }
        },
        TokenKind::LBracket => {
            parser.advance();

            let elements = parse_arguments(parser, TokenKind::RBracket)?;
            parser.expect_or_insert(TokenKind::RBracket);

            Expression::Array {
                elements,
                location: token.location()
            }
        },
        _ => return parse_error(
            ParseErrorType::ExpectedExpression { found: token.to_string() },
            token.location()
        )
    };

    while let Some(open) = parser.eat(TokenKind::LBracket) {
        let index = Box::new(Expression::parse(parser, None)?);
        parser.expect_or_insert(TokenKind::RBracket);

        expr = Expression::Index {
            target: Box::new(expr),
            index,
            location: open.location()
        };
    }

    while precedence.unwrap_or(Precedence::Lowest) < parser.current_precedence() {
        expr = Expression::Infix(Infix::parse(parser, expr, precedence)?);
    }

    Ok(expr)
}

/// Comma separated expressions up to, but not including, `close`.
pub fn parse_arguments(parser: &mut Parser, close: TokenKind) -> Result<Vec<Expression>, ParseError> {
    let mut arguments = vec![];

    if parser.check(close) {
        return Ok(arguments);
    }

    loop {
        arguments.push(Expression::parse(parser, None)?);

        if parser.eat(TokenKind::Comma).is_none() {
            break;
        }
    }

    Ok(arguments)
}

impl InfixParse for Infix {
    fn parse(
        parser: &mut Parser,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let token = parser.current().clone();

        let operator = match InfixOperator::from_token(token.kind) {
            Some(operator) => operator,
            None => return parse_error(
                ParseErrorType::UnexpectedToken {
                    expected: "an operator".to_string(),
                    found: token.to_string(),
                },
                token.location()
            )
        };
        parser.advance();

        // equal precedence stops the right side, so operators associate left
        let right = Expression::parse(parser, Some(operator.precedence()))?;

        Ok(Self {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            location: token.location()
        })
    }
}

impl Parse for Prefix {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let token = parser.advance();

        let operator = match token.kind {
            TokenKind::Bang => PrefixOperator::Not,
            _ => PrefixOperator::Negate,
        };

        let expression = Expression::parse(parser, Some(Precedence::Prefix))?;

        Ok(Self {
            operator,
            expression: Box::new(expression),
            location: token.location()
        })
    }
}

impl Parse for Primitive {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let token = parser.advance();
        let location = token.location();

        match (token.kind, token.value) {
            (TokenKind::Int, Some(TokenValue::Int(value))) => Ok(Self::Int { value, location }),
            (TokenKind::Double, Some(TokenValue::Double(value))) => Ok(Self::Double { value, location }),
            (TokenKind::String, Some(TokenValue::String(value))) => Ok(Self::String { value, location }),
            (TokenKind::True, _) => Ok(Self::Bool { value: true, location }),
            (TokenKind::False, _) => Ok(Self::Bool { value: false, location }),
            _ => parse_error(
                ParseErrorType::ExpectedExpression { found: token.lexeme },
                location
            )
        }
    }
}

// call -> <identifier> ( [ <expression> { , <expression> } ] )
impl Parse for Call {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let callee = parser.expect_ident()?;
        parser.expect_one(TokenKind::LParen)?;

        let arguments = parse_arguments(parser, TokenKind::RParen)?;
        parser.expect_or_insert(TokenKind::RParen);

        let expected = match parser.signature(&callee.value) {
            Some(signature) => Some(signature.arity),
            None => builtins::arity(&callee.value)
        };

        match expected {
            Some(expected) if expected != arguments.len() => parser.semantic_error(
                SemanticErrorType::ArityMismatch {
                    name: callee.value.clone(),
                    expected,
                    found: arguments.len(),
                },
                callee.location
            ),
            Some(_) => {},
            None => parser.semantic_error(
                SemanticErrorType::UndefinedFunction { name: callee.value.clone() },
                callee.location
            )
        }

        Ok(Self {
            location: callee.location,
            callee,
            arguments,
        })
    }
}

// prefix increment -> (++ | --) <identifier>
impl Parse for Increment {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let token = parser.advance();

        let target = match parser.check(TokenKind::Ident) {
            true => parser.expect_ident()?,
            false => return parse_error(
                ParseErrorType::InvalidIncrementTarget {
                    operator: token.lexeme,
                    found: parser.current().to_string(),
                },
                parser.current().location()
            )
        };

        parser.resolve(&target);

        Ok(Self {
            target,
            operator: increment_operator(token.kind),
            fixity: Fixity::Prefix,
            location: token.location()
        })
    }
}

impl Increment {
    /// Builds `target++` / `target--` with the operator as the current token.
    pub fn postfix(parser: &mut Parser, target: Identifier) -> Self {
        let token = parser.advance();
        parser.resolve(&target);

        Self {
            location: target.location,
            target,
            operator: increment_operator(token.kind),
            fixity: Fixity::Postfix,
        }
    }
}

fn increment_operator(kind: TokenKind) -> IncrementOperator {
    match kind {
        TokenKind::Decrement => IncrementOperator::Decrement,
        _ => IncrementOperator::Increment,
    }
}
