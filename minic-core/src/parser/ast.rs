use std::fmt::Display;

use crate::{
    environment::prelude::ValueType,
    lexer::prelude::TokenKind,
    utils::prelude::Location,
};

use super::parser::Precedence;

// program -> { <statement> } EOF
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub location: Location
}

impl Program {
    /// Function declarations at the top level, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDeclaration> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Function(function) => Some(function),
            _ => None
        })
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let statements = self.statements.iter()
            .map(|statement| statement.to_string())
            .collect::<Vec<String>>();

        write!(f, "{}", statements.join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declaration(Declaration),
    Assignment(Assignment),
    CompoundAssignment(CompoundAssignment),
    Expression(ExpressionStatement),
    Print(Print),
    Break(Location),
    Continue(Location),
    Return(Return),
    If(Conditional),
    While(WhileLoop),
    For(ForLoop),
    Block(Block),
    Function(FunctionDeclaration),
}

impl Statement {
    pub fn location(&self) -> Location {
        match self {
            Self::Declaration(declaration) => declaration.location,
            Self::Assignment(assignment) => assignment.location,
            Self::CompoundAssignment(assignment) => assignment.location,
            Self::Expression(statement) => statement.location,
            Self::Print(print) => print.location,
            Self::Break(location) | Self::Continue(location) => *location,
            Self::Return(statement) => statement.location,
            Self::If(conditional) => conditional.location,
            Self::While(loop_) => loop_.location,
            Self::For(loop_) => loop_.location,
            Self::Block(block) => block.location,
            Self::Function(function) => function.location,
        }
    }

    /// True for statements after which the rest of a block never runs.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Break(_) | Self::Continue(_) | Self::Return(_))
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declaration(declaration) => write!(f, "{declaration};"),
            Self::Assignment(assignment) => write!(f, "{assignment};"),
            Self::CompoundAssignment(assignment) => write!(f, "{assignment};"),
            Self::Expression(statement) => write!(f, "{};", statement.expression),
            Self::Print(print) => write!(f, "{print}"),
            Self::Break(_) => write!(f, "break;"),
            Self::Continue(_) => write!(f, "continue;"),
            Self::Return(statement) => write!(f, "{statement}"),
            Self::If(conditional) => write!(f, "{conditional}"),
            Self::While(loop_) => write!(f, "{loop_}"),
            Self::For(loop_) => write!(f, "{loop_}"),
            Self::Block(block) => write!(f, "{block}"),
            Self::Function(function) => write!(f, "{function}"),
        }
    }
}

// declaration -> <type> <declarator> { , <declarator> } ;
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub value_type: ValueType,
    pub declarators: Vec<Declarator>,
    pub location: Location
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: Identifier,
    pub initializer: Option<Expression>
}

impl Display for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let declarators = self.declarators.iter()
            .map(|declarator| match &declarator.initializer {
                Some(initializer) => format!("{} = {}", declarator.name, initializer),
                None => declarator.name.to_string()
            })
            .collect::<Vec<String>>();

        write!(f, "{} {}", self.value_type, declarators.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Variable(Identifier),
    Element {
        array: Identifier,
        index: Box<Expression>
    }
}

impl Target {
    pub fn name(&self) -> &Identifier {
        match self {
            Self::Variable(name) | Self::Element { array: name, .. } => name
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "{name}"),
            Self::Element { array, index } => write!(f, "{array}[{index}]")
        }
    }
}

// assignment -> <target> = <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Target,
    pub value: Expression,
    pub location: Location
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.target, self.value)
    }
}

// compound -> <target> (+= | -= | *= | /= | %=) <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundAssignment {
    pub target: Target,
    pub operator: InfixOperator,
    pub value: Expression,
    pub location: Location
}

impl Display for CompoundAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}= {}", self.target, self.operator, self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub location: Location
}

// print -> print ( [ <expression> { , <expression> } ] ) ;
#[derive(Debug, Clone, PartialEq)]
pub struct Print {
    pub arguments: Vec<Expression>,
    pub location: Location
}

impl Display for Print {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "print({});", join(&self.arguments))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Option<Expression>,
    pub location: Location
}

impl Display for Return {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "return {value};"),
            None => write!(f, "return;")
        }
    }
}

// conditional -> if ( <expression> ) <statement> [ else <statement> ]
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub condition: Expression,
    pub resolution: Box<Statement>,
    pub alternative: Option<Box<Statement>>,
    pub location: Location
}

impl Display for Conditional {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if ({}) {}", self.condition, self.resolution)?;

        match &self.alternative {
            Some(alternative) => write!(f, " else {alternative}"),
            None => Ok(())
        }
    }
}

// while_loop -> while ( <expression> ) <statement>
#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoop {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub location: Location
}

impl Display for WhileLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "while ({}) {}", self.condition, self.body)
    }
}

// for_loop -> for ( [init] ; [<expression>] ; [update] ) <statement>
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub initializer: Option<Box<Statement>>,
    pub condition: Option<Expression>,
    pub update: Option<Box<Statement>>,
    pub body: Box<Statement>,
    pub location: Location
}

impl Display for ForLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // header parts are printed without their own `;`
        let header = |statement: &Option<Box<Statement>>| match statement.as_deref() {
            Some(statement) => statement.to_string().trim_end_matches(';').to_string(),
            None => String::new()
        };

        let condition = match &self.condition {
            Some(condition) => condition.to_string(),
            None => String::new()
        };

        write!(f, "for ({}; {}; {}) {}",
            header(&self.initializer),
            condition,
            header(&self.update),
            self.body
        )
    }
}

// block -> { { <statement> } }
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub location: Location
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.statements.is_empty() {
            return write!(f, "{{}}");
        }

        let statements = self.statements.iter()
            .map(|statement| statement.to_string())
            .collect::<Vec<String>>();

        write!(f, "{{ {} }}", statements.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnType {
    /// `void name(...)`
    Void,
    /// `func name(...)`, returns whatever `return` hands back.
    Dynamic,
    Value(ValueType),
}

impl Display for ReturnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Dynamic => write!(f, "func"),
            Self::Value(value_type) => write!(f, "{value_type}")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub value_type: ValueType
}

// function -> (<type> | void | func) <identifier> ( <params> ) <block>
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: Identifier,
    pub parameters: Vec<Parameter>,
    pub return_type: ReturnType,
    pub body: Block,
    pub location: Location
}

impl Display for FunctionDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parameters = self.parameters.iter()
            .map(|parameter| format!("{} {}", parameter.value_type, parameter.name))
            .collect::<Vec<String>>();

        write!(f, "{} {}({}) {}", self.return_type, self.name, parameters.join(", "), self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Primitive(Primitive),
    Identifier(Identifier),
    Prefix(Prefix),
    Infix(Infix),
    Nested {
        expression: Box<Expression>,
        location: Location
    },
    Increment(Increment),
    Call(Call),
    Array {
        elements: Vec<Expression>,
        location: Location
    },
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
        location: Location
    },
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(primitive) => write!(f, "{primitive}"),
            Self::Identifier(ident) => write!(f, "{ident}"),
            Self::Prefix(prefix) => write!(f, "{prefix}"),
            Self::Infix(infix) => write!(f, "{infix}"),
            // infix nodes already print their own parentheses
            Self::Nested { expression, .. } => write!(f, "{expression}"),
            Self::Increment(increment) => write!(f, "{increment}"),
            Self::Call(call) => write!(f, "{call}"),
            Self::Array { elements, .. } => write!(f, "[{}]", join(elements)),
            Self::Index { target, index, .. } => write!(f, "{target}[{index}]"),
        }
    }
}

impl Expression {
    pub fn location(&self) -> Location {
        match self {
            Self::Primitive(primitive) => primitive.location(),
            Self::Identifier(ident) => ident.location,
            Self::Prefix(prefix) => prefix.location,
            Self::Infix(infix) => infix.location,
            Self::Increment(increment) => increment.location,
            Self::Call(call) => call.location,
            Self::Nested { location, .. }
            | Self::Array { location, .. }
            | Self::Index { location, .. } => *location,
        }
    }
}

// identifier -> (<letter> | _) { <letter> | <digit> | _ }
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub value: String,
    pub location: Location
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
}

impl InfixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => Self::Add,
            TokenKind::Minus => Self::Subtract,
            TokenKind::Star => Self::Multiply,
            TokenKind::Slash => Self::Divide,
            TokenKind::Percent => Self::Modulo,
            TokenKind::Equal => Self::Equal,
            TokenKind::NotEqual => Self::NotEqual,
            TokenKind::LessThan => Self::LessThan,
            TokenKind::LessThanOrEqual => Self::LessThanOrEqual,
            TokenKind::GreaterThan => Self::GreaterThan,
            TokenKind::GreaterThanOrEqual => Self::GreaterThanOrEqual,
            TokenKind::And => Self::And,
            TokenKind::Or => Self::Or,
            _ => return None
        })
    }

    /// Arithmetic operator behind a compound assignment such as `+=`.
    pub fn from_compound(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::PlusAssign => Self::Add,
            TokenKind::MinusAssign => Self::Subtract,
            TokenKind::StarAssign => Self::Multiply,
            TokenKind::SlashAssign => Self::Divide,
            TokenKind::PercentAssign => Self::Modulo,
            _ => return None
        })
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Or => Precedence::Or,
            Self::And => Precedence::And,
            Self::Equal
            | Self::NotEqual
            | Self::LessThan
            | Self::LessThanOrEqual
            | Self::GreaterThan
            | Self::GreaterThanOrEqual => Precedence::Relational,
            Self::Add | Self::Subtract => Precedence::Sum,
            Self::Multiply | Self::Divide | Self::Modulo => Precedence::Product,
        }
    }

    pub fn is_relational(&self) -> bool {
        self.precedence() == Precedence::Relational
    }

    pub fn as_literal(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_literal())
    }
}

// infix -> <expression> <operator> <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Infix {
    pub left: Box<Expression>,
    pub operator: InfixOperator,
    pub right: Box<Expression>,
    /// Position of the operator token.
    pub location: Location
}

impl Display for Infix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator, self.right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Negate,
    Not,
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negate => write!(f, "-"),
            Self::Not => write!(f, "!"),
        }
    }
}

// prefix -> (- | !) <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub operator: PrefixOperator,
    pub expression: Box<Expression>,
    pub location: Location
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}{})", self.operator, self.expression)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOperator {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Postfix,
}

// increment -> (++ | --) <identifier> | <identifier> (++ | --)
#[derive(Debug, Clone, PartialEq)]
pub struct Increment {
    pub target: Identifier,
    pub operator: IncrementOperator,
    pub fixity: Fixity,
    pub location: Location
}

impl Display for Increment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self.operator {
            IncrementOperator::Increment => "++",
            IncrementOperator::Decrement => "--",
        };

        match self.fixity {
            Fixity::Prefix => write!(f, "{operator}{}", self.target),
            Fixity::Postfix => write!(f, "{}{operator}", self.target),
        }
    }
}

// call -> <identifier> ( [ <expression> { , <expression> } ] )
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Identifier,
    pub arguments: Vec<Expression>,
    pub location: Location
}

impl Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.callee, join(&self.arguments))
    }
}

// primitive -> <int> | <double> | <string> | true | false
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Int {
        value: i64,
        location: Location
    },
    Double {
        value: f64,
        location: Location
    },
    String {
        value: String,
        location: Location
    },
    Bool {
        value: bool,
        location: Location
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int { value, .. } => write!(f, "{value}"),
            Self::Double { value, .. } if value.fract() == 0.0 => write!(f, "{value:.1}"),
            Self::Double { value, .. } => write!(f, "{value}"),
            Self::String { value, .. } => write!(f, "\"{value}\""),
            Self::Bool { value, .. } => write!(f, "{value}")
        }
    }
}

impl Primitive {
    pub fn location(&self) -> Location {
        match self {
            Self::Int { location, .. }
            | Self::Double { location, .. }
            | Self::String { location, .. }
            | Self::Bool { location, .. } => *location
        }
    }
}

fn join(expressions: &[Expression]) -> String {
    expressions.iter()
        .map(|expression| expression.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}
