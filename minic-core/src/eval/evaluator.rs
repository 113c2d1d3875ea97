use std::{collections::HashMap, io::{self, Write}};

use crate::{
    environment::prelude::{SemanticError, SemanticErrorType, SymbolTable, Value},
    parser::prelude::{
        Call, CompoundAssignment, Declaration, Expression, Fixity, ForLoop, FunctionDeclaration,
        Identifier, Increment, IncrementOperator, Infix, InfixOperator, Prefix, PrefixOperator,
        Primitive, Print, Program, ReturnType, Statement, Target, WhileLoop,
    },
    utils::prelude::{Location, Problem},
};
use super::builtins::Builtin;
use super::operators;

/// Runtime limits of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Body executions allowed per loop before it is abandoned.
    pub max_loop_iterations: usize,
    /// Nested user function calls allowed at once.
    pub max_call_depth: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_loop_iterations: 100_000,
            max_call_depth: 256,
        }
    }
}

/// How control leaves a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Option<Value>),
}

/// Tree-walking interpreter over a parsed program.
///
/// Faults are recorded as problems and abort only the smallest enclosing
/// construct, so a run always finishes and reports everything it hit.
pub struct Evaluator<'a, W: Write> {
    program: &'a Program,
    functions: HashMap<&'a str, &'a FunctionDeclaration>,
    symbols: SymbolTable,
    output: W,
    errors: Vec<Problem>,
    options: EvaluatorOptions,
    depth: usize,
    io_error: Option<io::Error>,
}

impl<'a, W: Write> Evaluator<'a, W> {
    pub fn new(program: &'a Program, symbols: SymbolTable, output: W) -> Self {
        let mut functions = HashMap::new();

        for function in program.functions() {
            functions.entry(function.name.value.as_str()).or_insert(function);
        }

        Self {
            program,
            functions,
            symbols,
            output,
            errors: vec![],
            options: EvaluatorOptions::default(),
            depth: 0,
            io_error: None,
        }
    }

    pub fn with_options(mut self, options: EvaluatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn run(&mut self) -> &[Problem] {
        let program = self.program;

        for statement in &program.statements {
            self.execute(statement);
        }

        log::debug!(
            "evaluated {} statement(s) with {} runtime error(s)",
            program.statements.len(), self.errors.len()
        );

        &self.errors
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn errors(&self) -> &[Problem] {
        &self.errors
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// First failure to write program output, if any.
    pub fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    fn fault<T>(&mut self, error: SemanticErrorType, location: Location) -> Option<T> {
        self.errors.push(SemanticError::new(error, location).into());
        None
    }

    fn report<T>(&mut self, result: Result<T, SemanticError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err.into());
                None
            }
        }
    }

    fn scoped<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.symbols.enter_scope(name);
        let result = f(self);
        self.close_scope();

        result
    }

    fn function_scoped<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.symbols.enter_function_scope(name);
        let result = f(self);
        self.close_scope();

        result
    }

    fn close_scope(&mut self) {
        if let Err(err) = self.symbols.exit_scope() {
            log::error!("{err}");
        }
    }

    fn execute_all(&mut self, statements: &'a [Statement]) -> Flow {
        for statement in statements {
            match self.execute(statement) {
                Flow::Normal => {},
                flow => return flow
            }
        }

        Flow::Normal
    }

    fn execute(&mut self, statement: &'a Statement) -> Flow {
        match statement {
            Statement::Declaration(declaration) => self.declare(declaration),
            Statement::Assignment(assignment) => {
                self.assign(&assignment.target, &assignment.value);
            },
            Statement::CompoundAssignment(assignment) => {
                self.compound(assignment);
            },
            Statement::Expression(statement) => {
                match &statement.expression {
                    Expression::Call(call) => self.call(call, false),
                    expression => self.evaluate(expression),
                };
            },
            Statement::Print(print) => self.print(print),
            Statement::Break(_) => return Flow::Break,
            Statement::Continue(_) => return Flow::Continue,
            Statement::Return(statement) => {
                let value = match &statement.value {
                    Some(value) => self.evaluate(value),
                    None => None
                };

                return Flow::Return(value);
            },
            Statement::If(conditional) => {
                let Some(condition) = self.evaluate(&conditional.condition) else {
                    return Flow::Normal;
                };

                if condition.is_truthy() {
                    return self.execute(&conditional.resolution);
                }

                if let Some(alternative) = &conditional.alternative {
                    return self.execute(alternative);
                }
            },
            Statement::While(loop_) => return self.while_loop(loop_),
            Statement::For(loop_) => return self.for_loop(loop_),
            Statement::Block(block) => {
                return self.scoped("block", |this| this.execute_all(&block.statements));
            },
            // collected when the evaluator was created
            Statement::Function(_) => {},
        }

        Flow::Normal
    }

    fn declare(&mut self, declaration: &'a Declaration) {
        for declarator in &declaration.declarators {
            let name = &declarator.name;

            // the initializer is evaluated before the new binding exists
            let value = match &declarator.initializer {
                Some(initializer) => self.evaluate(initializer),
                None => None
            };

            self.symbols.rebind(&name.value, declaration.value_type.clone(), name.location);

            if let Some(value) = value {
                let result = self.symbols.write(&name.value, value, name.location);
                self.report(result);
            }
        }
    }

    fn assign(&mut self, target: &'a Target, value: &'a Expression) -> Option<()> {
        match target {
            Target::Variable(name) => {
                let value = self.evaluate(value)?;
                let result = self.symbols.write(&name.value, value, name.location);

                self.report(result)
            },
            Target::Element { array, index } => {
                let index = self.index(index)?;
                let value = self.evaluate(value)?;
                let result = self.symbols.write_element(&array.value, index, value, array.location);

                self.report(result)
            }
        }
    }

    fn compound(&mut self, assignment: &'a CompoundAssignment) -> Option<()> {
        let location = assignment.location;

        let (current, index) = match &assignment.target {
            Target::Variable(name) => {
                let result = self.symbols.read(&name.value, location);
                (self.report(result)?, None)
            },
            Target::Element { array, index } => {
                let index = self.index(index)?;

                (self.variable_element(array, index, location)?, Some(index))
            }
        };

        let value = self.evaluate(&assignment.value)?;

        let result = match operators::arithmetic(assignment.operator, &current, &value) {
            Ok(result) => result,
            Err(err) => return self.fault(err, location)
        };

        let name = &assignment.target.name().value;
        let written = match index {
            Some(index) => self.symbols.write_element(name, index, result, location),
            None => self.symbols.write(name, result, location),
        };

        self.report(written)
    }

    fn print(&mut self, print: &'a Print) {
        let values = print.arguments.iter()
            .map(|argument| self.evaluate(argument))
            .collect::<Option<Vec<Value>>>();

        let Some(values) = values else {
            return;
        };

        let line = values.iter()
            .map(|value| value.to_string())
            .collect::<Vec<String>>()
            .join(" ");

        if let Err(err) = writeln!(self.output, "{line}") {
            log::error!("failed to write program output: {err}");
            self.io_error.get_or_insert(err);
        }
    }

    /// Records the limit once and tells the caller to abandon the loop.
    fn loop_limit(&mut self, iterations: usize, location: Location) -> bool {
        if iterations < self.options.max_loop_iterations {
            return false;
        }

        log::warn!("loop at {location} abandoned after {iterations} iteration(s)");
        self.fault::<()>(
            SemanticErrorType::LoopLimitExceeded { limit: self.options.max_loop_iterations },
            location
        );

        true
    }

    fn while_loop(&mut self, loop_: &'a WhileLoop) -> Flow {
        let mut iterations = 0;

        loop {
            match self.evaluate(&loop_.condition) {
                Some(condition) if condition.is_truthy() => {},
                _ => break
            }

            if self.loop_limit(iterations, loop_.location) {
                break;
            }
            iterations += 1;

            match self.execute(&loop_.body) {
                Flow::Break => break,
                Flow::Return(value) => return Flow::Return(value),
                Flow::Normal | Flow::Continue => {}
            }
        }

        Flow::Normal
    }

    fn for_loop(&mut self, loop_: &'a ForLoop) -> Flow {
        self.scoped("for", |this| {
            if let Some(initializer) = &loop_.initializer {
                this.execute(initializer);
            }

            let mut iterations = 0;

            loop {
                if let Some(condition) = &loop_.condition {
                    match this.evaluate(condition) {
                        Some(condition) if condition.is_truthy() => {},
                        _ => break
                    }
                }

                if this.loop_limit(iterations, loop_.location) {
                    break;
                }
                iterations += 1;

                match this.execute(&loop_.body) {
                    Flow::Break => break,
                    Flow::Return(value) => return Flow::Return(value),
                    Flow::Normal | Flow::Continue => {}
                }

                if let Some(update) = &loop_.update {
                    this.execute(update);
                }
            }

            Flow::Normal
        })
    }

    /// Evaluates an expression; `None` means a fault was recorded.
    pub fn evaluate(&mut self, expression: &'a Expression) -> Option<Value> {
        match expression {
            Expression::Primitive(primitive) => Some(match primitive {
                Primitive::Int { value, .. } => Value::Integer(*value),
                Primitive::Double { value, .. } => Value::Double(*value),
                Primitive::String { value, .. } => Value::String(value.clone()),
                Primitive::Bool { value, .. } => Value::Boolean(*value),
            }),
            Expression::Identifier(ident) => {
                let result = self.symbols.read(&ident.value, ident.location);
                self.report(result)
            },
            Expression::Prefix(prefix) => self.prefix(prefix),
            Expression::Infix(infix) => self.infix(infix),
            Expression::Nested { expression, .. } => self.evaluate(expression),
            Expression::Increment(increment) => self.increment(increment),
            Expression::Call(call) => self.call(call, true),
            Expression::Array { elements, .. } => {
                let items = elements.iter()
                    .map(|element| self.evaluate(element))
                    .collect::<Option<Vec<Value>>>()?;

                Some(Value::Array(items))
            },
            Expression::Index { target, index, location } => match target.as_ref() {
                Expression::Identifier(name) => {
                    let index = self.index(index)?;

                    self.variable_element(name, index, *location)
                },
                target => {
                    let target = self.evaluate(target)?;
                    let index = self.index(index)?;

                    self.element(&target, index, *location)
                }
            }
        }
    }

    /// Evaluates an index expression, which must be an int.
    fn index(&mut self, index: &'a Expression) -> Option<i64> {
        match self.evaluate(index)? {
            Value::Integer(index) => Some(index),
            value => self.fault(
                SemanticErrorType::TypeMismatch {
                    expected: "int".to_string(),
                    found: value.type_name(),
                },
                index.location()
            )
        }
    }

    fn element(&mut self, target: &Value, index: i64, location: Location) -> Option<Value> {
        match operators::element(target, index) {
            Ok(value) => Some(value),
            Err(err) => self.fault(err, location)
        }
    }

    /// Indexes a variable in place, without copying the whole array.
    fn variable_element(&mut self, name: &Identifier, index: i64, location: Location) -> Option<Value> {
        let result = match self.symbols.value_of(&name.value, name.location) {
            Ok(target) => operators::element(target, index)
                .map_err(|err| SemanticError::new(err, location)),
            Err(err) => Err(err)
        };

        self.report(result)
    }

    fn prefix(&mut self, prefix: &'a Prefix) -> Option<Value> {
        let value = self.evaluate(&prefix.expression)?;

        match prefix.operator {
            PrefixOperator::Not => Some(Value::Boolean(!value.is_truthy())),
            PrefixOperator::Negate => match operators::negate(&value) {
                Ok(value) => Some(value),
                Err(err) => self.fault(err, prefix.location)
            }
        }
    }

    fn infix(&mut self, infix: &'a Infix) -> Option<Value> {
        let left = self.evaluate(&infix.left)?;

        // `&&` and `||` only look at the right side when they must
        match (infix.operator, left.is_truthy()) {
            (InfixOperator::And, false) => return Some(Value::Boolean(false)),
            (InfixOperator::Or, true) => return Some(Value::Boolean(true)),
            _ => {}
        }

        let right = self.evaluate(&infix.right)?;

        match operators::binary(infix.operator, &left, &right) {
            Ok(value) => Some(value),
            Err(err) => self.fault(err, infix.location)
        }
    }

    fn increment(&mut self, increment: &'a Increment) -> Option<Value> {
        let name = &increment.target;
        let result = self.symbols.read(&name.value, name.location);
        let current = self.report(result)?;

        let delta = match increment.operator {
            IncrementOperator::Increment => 1,
            IncrementOperator::Decrement => -1,
        };

        let updated = match operators::step(&current, delta) {
            Ok(value) => value,
            Err(err) => return self.fault(err, increment.location)
        };

        let result = self.symbols.write(&name.value, updated.clone(), name.location);
        self.report(result)?;

        match increment.fixity {
            Fixity::Prefix => Some(updated),
            Fixity::Postfix => Some(current),
        }
    }

    /// Calls a user function or built-in. A call whose value is used must
    /// produce one.
    fn call(&mut self, call: &'a Call, needs_value: bool) -> Option<Value> {
        let name = call.callee.value.as_str();

        let arguments = call.arguments.iter()
            .map(|argument| self.evaluate(argument))
            .collect::<Option<Vec<Value>>>()?;

        let Some(function) = self.functions.get(name).copied() else {
            return match Builtin::from_name(name) {
                Some(builtin) => match builtin.call(arguments) {
                    Ok(value) => Some(value),
                    Err(err) => self.fault(err, call.location)
                },
                None => self.fault(
                    SemanticErrorType::UndefinedFunction { name: name.to_string() },
                    call.location
                )
            };
        };

        if function.parameters.len() != arguments.len() {
            return self.fault(
                SemanticErrorType::ArityMismatch {
                    name: name.to_string(),
                    expected: function.parameters.len(),
                    found: arguments.len(),
                },
                call.location
            );
        }

        if self.depth >= self.options.max_call_depth {
            log::warn!("call to `{name}` at {} exceeds the call depth limit", call.location);

            return self.fault(
                SemanticErrorType::RecursionLimit { limit: self.options.max_call_depth },
                call.location
            );
        }

        let errors = self.errors.len();
        self.depth += 1;

        let flow = self.function_scoped(name, |this| {
            let bindings = function.parameters.iter()
                .zip(call.arguments.iter())
                .zip(arguments);

            for ((parameter, argument), value) in bindings {
                let parameter_name = &parameter.name;
                this.symbols.rebind(&parameter_name.value, parameter.value_type.clone(), parameter_name.location);

                let result = this.symbols.write(&parameter_name.value, value, argument.location());
                this.report(result)?;
            }

            Some(this.execute_all(&function.body.statements))
        });

        self.depth -= 1;

        let value = match flow? {
            Flow::Return(value) => value,
            _ => None
        };

        match (value, &function.return_type) {
            (Some(value), ReturnType::Value(value_type)) => match value.coerce_to(value_type) {
                Some(value) => Some(value),
                None => self.fault(
                    SemanticErrorType::TypeMismatch {
                        expected: value_type.to_string(),
                        found: value.type_name(),
                    },
                    call.location
                )
            },
            (Some(value), ReturnType::Dynamic) => Some(value),
            // a fault inside the body was already reported
            (_, _) if !needs_value || self.errors.len() > errors => None,
            (_, _) => self.fault(
                SemanticErrorType::MissingReturnValue { name: name.to_string() },
                call.location
            )
        }
    }
}
