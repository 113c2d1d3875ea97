use crate::{
    environment::prelude::SemanticErrorType,
    lexer::prelude::TokenKind,
};
use super::ast::{
    Assignment, Block, CompoundAssignment, Conditional, Declaration, Declarator, Expression,
    ExpressionStatement, ForLoop, FunctionDeclaration, Identifier, Increment, InfixOperator,
    Parameter, Print, Program, Return, ReturnType, Statement, Target, WhileLoop,
};
use super::error::{ParseError, ParseErrorType, ParseWarning};
use super::expression::parse_arguments;
use super::parser::{Parse, Parser, Precedence};

// program -> { <statement> } EOF
impl Parse for Program {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let location = parser.current().location();
        let mut statements = vec![];

        loop {
            match parser.current().kind {
                TokenKind::Eof => break,
                TokenKind::RBrace => {
                    let token = parser.advance();
                    parser.error(ParseError {
                        error: ParseErrorType::UnmatchedBrace,
                        location: token.location(),
                    });
                },
                _ => {
                    if let Some(statement) = parse_recovering(parser) {
                        statements.push(statement);
                    }
                }
            }
        }

        Ok(Self {
            statements,
            location
        })
    }
}

/// Parses one statement; on failure records the error and skips ahead to
/// the next statement boundary.
fn parse_recovering(parser: &mut Parser) -> Option<Statement> {
    match Statement::parse(parser, None) {
        Ok(statement) => Some(statement),
        Err(err) => {
            parser.error(err);
            parser.synchronize();

            None
        }
    }
}

/// Statements up to, but not including, the closing `}` of a block.
pub fn parse_block_statements(parser: &mut Parser) -> Vec<Statement> {
    let mut statements = vec![];
    let mut terminated = false;
    let mut reported = false;

    while !parser.check(TokenKind::RBrace) && !parser.check(TokenKind::Eof) {
        let Some(statement) = parse_recovering(parser) else {
            continue;
        };

        if terminated && !reported {
            parser.warning(ParseWarning::UnreachableCode { location: statement.location() });
            reported = true;
        }

        terminated |= statement.is_terminal();
        statements.push(statement);
    }

    statements
}

impl Parse for Statement {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.nested(parse_statement)
    }
}

fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let token = parser.current().clone();

    match token.kind {
        TokenKind::Print => Ok(Statement::Print(Print::parse(parser, None)?)),
        TokenKind::Break | TokenKind::Continue => {
            parser.advance();

            if !parser.in_loop_body() {
                parser.semantic_error(
                    SemanticErrorType::OutsideLoop { keyword: token.kind.as_literal() },
                    token.location()
                );
            }

            parser.expect_or_insert(TokenKind::Semicolon);

            Ok(match token.kind {
                TokenKind::Break => Statement::Break(token.location()),
                _ => Statement::Continue(token.location()),
            })
        },
        TokenKind::Return => Ok(Statement::Return(Return::parse(parser, None)?)),
        _ if parser.is_function_start() => {
            Ok(Statement::Function(FunctionDeclaration::parse(parser, None)?))
        },
        kind if kind.is_variable_type() => {
            let declaration = Declaration::parse(parser, None)?;
            parser.expect_or_insert(TokenKind::Semicolon);

            Ok(Statement::Declaration(declaration))
        },
        TokenKind::For => Ok(Statement::For(ForLoop::parse(parser, None)?)),
        TokenKind::While => Ok(Statement::While(WhileLoop::parse(parser, None)?)),
        TokenKind::If => Ok(Statement::If(Conditional::parse(parser, None)?)),
        TokenKind::LBrace => Ok(Statement::Block(Block::parse(parser, None)?)),
        _ => {
            let statement = parse_simple(parser)?;
            parser.expect_or_insert(TokenKind::Semicolon);

            Ok(statement)
        }
    }
}

/// Assignment, compound assignment, `x++` / `x--` or an expression, without
/// the trailing `;`. Also used for `for` headers.
///
/// Identifier-led input is parsed speculatively: the target is consumed
/// first and, when no assignment operator follows, the parser rewinds and
/// reads the whole thing as an expression.
pub fn parse_simple(parser: &mut Parser) -> Result<Statement, ParseError> {
    if !parser.check(TokenKind::Ident) || parser.peek(1).is(TokenKind::LParen) {
        return expression_statement(parser);
    }

    let checkpoint = parser.checkpoint();
    let name = parser.expect_ident()?;

    let index = match parser.eat(TokenKind::LBracket) {
        Some(_) => match Expression::parse(parser, None) {
            Ok(index) if parser.eat(TokenKind::RBracket).is_some() => Some(index),
            _ => {
                parser.rewind(checkpoint);
                return expression_statement(parser);
            }
        },
        None => None
    };

    let operator = parser.current().kind;

    match (operator, index) {
        (TokenKind::Assign, index) => {
            parser.advance();
            let target = target(parser, name, index, false);
            let value = Expression::parse(parser, None)?;

            Ok(Statement::Assignment(Assignment {
                location: target.name().location,
                target,
                value,
            }))
        },
        (kind, index) if kind.is_compound_assignment() => {
            parser.advance();
            let target = target(parser, name, index, true);
            let value = Expression::parse(parser, None)?;

            Ok(Statement::CompoundAssignment(CompoundAssignment {
                location: target.name().location,
                operator: InfixOperator::from_compound(kind).unwrap_or(InfixOperator::Add),
                target,
                value,
            }))
        },
        (TokenKind::Increment | TokenKind::Decrement, None) => {
            let location = name.location;
            let increment = Increment::postfix(parser, name);

            Ok(Statement::Expression(ExpressionStatement {
                expression: Expression::Increment(increment),
                location
            }))
        },
        _ => {
            parser.rewind(checkpoint);
            expression_statement(parser)
        }
    }
}

fn target(parser: &mut Parser, name: Identifier, index: Option<Expression>, reads: bool) -> Target {
    // storing into an element reads the array first
    match reads || index.is_some() {
        true => parser.resolve(&name),
        false => parser.resolve_target(&name),
    }

    match index {
        Some(index) => Target::Element {
            array: name,
            index: Box::new(index)
        },
        None => Target::Variable(name)
    }
}

fn expression_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let location = parser.current().location();
    let expression = Expression::parse(parser, None)?;

    Ok(Statement::Expression(ExpressionStatement {
        expression,
        location
    }))
}

/// Body of `if`, `while` or `for`. A function may not be declared here.
fn parse_body(parser: &mut Parser) -> Result<Box<Statement>, ParseError> {
    parser.in_block(|parser| Statement::parse(parser, None)).map(Box::new)
}

// declaration -> <type> <identifier> [ = <expression> ] { , <identifier> [ = <expression> ] }
impl Parse for Declaration {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let location = parser.current().location();
        let value_type = parser.parse_type()?;
        let mut declarators = vec![];

        loop {
            let name = parser.expect_ident()?;

            // the initializer still sees any outer binding of the same name
            let initializer = match parser.eat(TokenKind::Assign) {
                Some(_) => Some(Expression::parse(parser, None)?),
                None => None
            };

            parser.declare(&name, value_type.clone());
            declarators.push(Declarator { name, initializer });

            if parser.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        Ok(Self {
            value_type,
            declarators,
            location
        })
    }
}

impl Parse for Print {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let token = parser.advance();
        parser.expect_one(TokenKind::LParen)?;

        let arguments = parse_arguments(parser, TokenKind::RParen)?;
        parser.expect_or_insert(TokenKind::RParen);
        parser.expect_or_insert(TokenKind::Semicolon);

        Ok(Self {
            arguments,
            location: token.location()
        })
    }
}

impl Parse for Return {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let token = parser.advance();

        if !parser.in_function_body() {
            parser.semantic_error(SemanticErrorType::ReturnOutsideFunction, token.location());
        }

        let value = match parser.current().kind {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => None,
            _ => Some(Expression::parse(parser, None)?)
        };

        parser.expect_or_insert(TokenKind::Semicolon);

        Ok(Self {
            value,
            location: token.location()
        })
    }
}

fn parse_condition(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_one(TokenKind::LParen)?;
    let condition = Expression::parse(parser, None)?;
    parser.expect_or_insert(TokenKind::RParen);

    Ok(condition)
}

// conditional -> if ( <expression> ) <statement> [ else <statement> ]
impl Parse for Conditional {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let token = parser.advance();
        let condition = parse_condition(parser)?;
        let resolution = parse_body(parser)?;

        let alternative = match parser.eat(TokenKind::Else) {
            Some(_) => Some(parse_body(parser)?),
            None => None
        };

        Ok(Self {
            condition,
            resolution,
            alternative,
            location: token.location()
        })
    }
}

impl Parse for WhileLoop {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let token = parser.advance();
        let condition = parse_condition(parser)?;
        let body = parser.in_loop(parse_body)?;

        Ok(Self {
            condition,
            body,
            location: token.location()
        })
    }
}

// for_loop -> for ( [init] ; [<expression>] ; [update] ) <statement>
impl Parse for ForLoop {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let token = parser.advance();
        parser.expect_one(TokenKind::LParen)?;

        // the loop variable lives in a scope wrapping the whole loop
        parser.scoped("for", |parser| {
            let initializer = match parser.current().kind {
                TokenKind::Semicolon => None,
                kind if kind.is_variable_type() => {
                    Some(Box::new(Statement::Declaration(Declaration::parse(parser, None)?)))
                },
                _ => Some(Box::new(parse_simple(parser)?))
            };
            parser.expect_or_insert(TokenKind::Semicolon);

            let condition = match parser.check(TokenKind::Semicolon) {
                true => None,
                false => Some(Expression::parse(parser, None)?)
            };
            parser.expect_or_insert(TokenKind::Semicolon);

            let update = match parser.check(TokenKind::RParen) {
                true => None,
                false => Some(Box::new(parse_simple(parser)?))
            };
            parser.expect_or_insert(TokenKind::RParen);

            let body = parser.in_loop(parse_body)?;

            Ok(Self {
                initializer,
                condition,
                update,
                body,
                location: token.location()
            })
        })
    }
}

// block -> { { <statement> } }
impl Parse for Block {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let open = parser.expect_one(TokenKind::LBrace)?;

        let statements = parser.scoped("block", |parser| {
            parser.in_block(parse_block_statements)
        });
        parser.expect_or_insert(TokenKind::RBrace);

        Ok(Self {
            statements,
            location: open.location()
        })
    }
}

// function -> (<type> | void | func) <identifier> ( [<type> <identifier> { , ... }] ) <block>
impl Parse for FunctionDeclaration {
    fn parse(
        parser: &mut Parser,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let location = parser.current().location();

        let return_type = match parser.current().kind {
            TokenKind::Func => {
                parser.advance();
                ReturnType::Dynamic
            },
            TokenKind::Void => {
                parser.advance();
                ReturnType::Void
            },
            _ => ReturnType::Value(parser.parse_type()?)
        };

        let name = parser.expect_ident()?;

        if !parser.at_top_level() {
            parser.semantic_error(
                SemanticErrorType::NestedFunction { name: name.value.clone() },
                name.location
            );
        } else if !parser.define_function(&name.value) {
            let previous = parser.signature(&name.value)
                .map(|signature| signature.location)
                .unwrap_or(name.location);

            parser.semantic_error(
                SemanticErrorType::DuplicateDeclaration { name: name.value.clone(), previous },
                name.location
            );
        }

        parser.expect_one(TokenKind::LParen)?;

        let mut parameters = vec![];

        if !parser.check(TokenKind::RParen) {
            loop {
                let value_type = parser.parse_type()?;
                let name = parser.expect_ident()?;

                parameters.push(Parameter { name, value_type });

                if parser.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        parser.expect_or_insert(TokenKind::RParen);
        let open = parser.expect_one(TokenKind::LBrace)?;

        let statements = parser.in_function(&name.value, |parser| {
            parser.function_scoped(&name.value, |parser| {
                for parameter in &parameters {
                    parser.declare(&parameter.name, parameter.value_type.clone());
                }

                parse_block_statements(parser)
            })
        });
        parser.expect_or_insert(TokenKind::RBrace);

        Ok(Self {
            name,
            parameters,
            return_type,
            body: Block {
                statements,
                location: open.location()
            },
            location
        })
    }
}
