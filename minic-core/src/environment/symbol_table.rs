use std::collections::{HashMap, HashSet};

use crate::utils::prelude::Location;

use super::error::{ScopeError, SemanticError, SemanticErrorType};
use super::value::{Value, ValueType};

pub type ScopeId = usize;

pub const GLOBAL_SCOPE: ScopeId = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub value_type: ValueType,
    pub value: Option<Value>,
    pub initialized: bool,
    /// Set by the parser whenever the binding is read.
    pub used: bool,
    pub location: Location,
}

impl Symbol {
    fn new(name: &str, value_type: ValueType, location: Location) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            value: None,
            initialized: false,
            used: false,
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub id: ScopeId,
    pub name: String,
    pub parent: Option<ScopeId>,
    pub symbols: HashMap<String, Symbol>,
    /// Names declared here that hide a binding of an enclosing scope.
    pub shadowed: HashSet<String>,
    pub closed: bool,
}

impl Scope {
    fn new(id: ScopeId, name: &str, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent,
            symbols: HashMap::new(),
            shadowed: HashSet::new(),
            closed: false,
        }
    }

    /// Symbols never read while the scope was open, in source order.
    pub fn unused(&self) -> Vec<&Symbol> {
        let mut unused = self.symbols.values()
            .filter(|symbol| !symbol.used)
            .collect::<Vec<&Symbol>>();

        unused.sort_by_key(|symbol| symbol.location.offset());
        unused
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    Fresh,
    /// The new binding hides one declared at the given location in an
    /// enclosing scope.
    Shadowing(Location),
}

/// Arena of live scopes plus the stack of scope ids that are currently
/// open. Parents are stored as ids, so the tree has no owning cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable {
    scopes: HashMap<ScopeId, Scope>,
    stack: Vec<ScopeId>,
    next_id: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut scopes = HashMap::new();
        scopes.insert(GLOBAL_SCOPE, Scope::new(GLOBAL_SCOPE, "global", None));

        Self {
            scopes,
            stack: vec![GLOBAL_SCOPE],
            next_id: GLOBAL_SCOPE + 1,
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(GLOBAL_SCOPE)
    }

    /// Number of open scopes, the global one included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn enter_scope(&mut self, name: &str) -> ScopeId {
        let parent = self.current_scope();

        self.push(name, parent)
    }

    /// Opens a scope for a function body. Its parent is the global scope, so
    /// the body never sees the locals of whoever called it.
    pub fn enter_function_scope(&mut self, name: &str) -> ScopeId {
        self.push(name, GLOBAL_SCOPE)
    }

    fn push(&mut self, name: &str, parent: ScopeId) -> ScopeId {
        let id = self.next_id;
        self.next_id += 1;

        self.scopes.insert(id, Scope::new(id, name, Some(parent)));
        self.stack.push(id);

        log::trace!("entered scope `{name}` #{id} (parent #{parent})");

        id
    }

    /// Pops the current scope and drops every symbol declared in it. The
    /// returned record is marked closed.
    pub fn exit_scope(&mut self) -> Result<Scope, ScopeError> {
        if self.stack.len() <= 1 {
            return Err(ScopeError::GlobalScope);
        }

        let id = self.stack.pop().ok_or(ScopeError::GlobalScope)?;
        let mut scope = self.scopes.remove(&id).ok_or(ScopeError::UnknownScope { id })?;
        scope.closed = true;

        log::trace!("exited scope `{}` #{} with {} symbol(s)", scope.name, id, scope.symbols.len());

        Ok(scope)
    }

    pub fn declare(
        &mut self,
        name: &str,
        value_type: ValueType,
        location: Location
    ) -> Result<Declared, SemanticError> {
        let current = self.current_scope();

        if let Some(existing) = self.scopes.get(&current).and_then(|scope| scope.symbols.get(name)) {
            return Err(SemanticError::new(
                SemanticErrorType::DuplicateDeclaration {
                    name: name.to_string(),
                    previous: existing.location,
                },
                location
            ));
        }

        // the current scope has no binding, so any hit is in an ancestor
        let outer = self.lookup(name).map(|symbol| symbol.location);

        let scope = self.scope_mut(current);
        scope.symbols.insert(name.to_string(), Symbol::new(name, value_type, location));

        match outer {
            Some(outer) => {
                scope.shadowed.insert(name.to_string());
                Ok(Declared::Shadowing(outer))
            },
            None => Ok(Declared::Fresh)
        }
    }

    /// Declares `name` in the current scope, replacing any binding it already
    /// has there with a fresh uninitialized one.
    pub fn rebind(&mut self, name: &str, value_type: ValueType, location: Location) {
        let current = self.current_scope();
        let shadows = self.scope_of(name).is_some_and(|id| id != current);

        let scope = self.scope_mut(current);
        scope.symbols.insert(name.to_string(), Symbol::new(name, value_type, location));

        if shadows {
            scope.shadowed.insert(name.to_string());
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let id = self.scope_of(name)?;

        self.scopes.get(&id)?.symbols.get(name)
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let id = self.scope_of(name)?;

        self.scopes.get_mut(&id)?.symbols.get_mut(name)
    }

    /// Id of the innermost scope, walking parents from the current one, that
    /// binds `name`.
    fn scope_of(&self, name: &str) -> Option<ScopeId> {
        let mut next = Some(self.current_scope());

        while let Some(id) = next {
            let scope = self.scopes.get(&id)?;

            if scope.symbols.contains_key(name) {
                return Some(id);
            }

            next = scope.parent;
        }

        None
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        self.scopes.entry(id)
            .or_insert_with(|| Scope::new(id, "detached", Some(GLOBAL_SCOPE)))
    }

    /// Records a read of `name`; returns false when it is not declared.
    pub fn mark_used(&mut self, name: &str) -> bool {
        match self.lookup_mut(name) {
            Some(symbol) => {
                symbol.used = true;
                true
            },
            None => false
        }
    }

    pub fn read(&self, name: &str, location: Location) -> Result<Value, SemanticError> {
        self.value_of(name, location).cloned()
    }

    /// Like `read`, but borrows the stored value.
    pub fn value_of(&self, name: &str, location: Location) -> Result<&Value, SemanticError> {
        let symbol = self.lookup(name)
            .ok_or_else(|| undeclared(name, location))?;

        match (&symbol.value, symbol.initialized) {
            (Some(value), true) => Ok(value),
            _ => Err(SemanticError::new(
                SemanticErrorType::UninitializedUse { name: name.to_string() },
                location
            ))
        }
    }

    /// Coerces `value` into the declared type of `name` and stores it.
    pub fn write(&mut self, name: &str, value: Value, location: Location) -> Result<(), SemanticError> {
        let symbol = self.lookup_mut(name)
            .ok_or_else(|| undeclared(name, location))?;

        let coerced = value.coerce_to(&symbol.value_type)
            .ok_or_else(|| mismatch(&symbol.value_type, &value, location))?;

        symbol.value = Some(coerced);
        symbol.initialized = true;

        Ok(())
    }

    /// Stores `value` at `index` of the array bound to `name`.
    pub fn write_element(
        &mut self,
        name: &str,
        index: i64,
        value: Value,
        location: Location
    ) -> Result<(), SemanticError> {
        let symbol = self.lookup_mut(name)
            .ok_or_else(|| undeclared(name, location))?;

        let element_type = match symbol.value_type.element() {
            Some(element) => element.clone(),
            None => return Err(SemanticError::new(
                SemanticErrorType::TypeMismatch {
                    expected: "array".to_string(),
                    found: symbol.value_type.to_string(),
                },
                location
            ))
        };

        let items = match &mut symbol.value {
            Some(Value::Array(items)) if symbol.initialized => items,
            _ => return Err(SemanticError::new(
                SemanticErrorType::UninitializedUse { name: name.to_string() },
                location
            ))
        };

        let length = items.len();
        let slot = usize::try_from(index).ok()
            .and_then(|index| items.get_mut(index))
            .ok_or_else(|| SemanticError::new(
                SemanticErrorType::IndexOutOfBounds { index, length },
                location
            ))?;

        *slot = value.coerce_to(&element_type)
            .ok_or_else(|| mismatch(&element_type, &value, location))?;

        Ok(())
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(&id)
    }

    /// Live scopes ordered by id.
    pub fn scopes(&self) -> Vec<&Scope> {
        let mut scopes = self.scopes.values().collect::<Vec<&Scope>>();
        scopes.sort_by_key(|scope| scope.id);
        scopes
    }

    /// Every symbol of the open scopes, outermost scope first.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.stack.iter()
            .filter_map(|id| self.scopes.get(id))
            .flat_map(|scope| {
                let mut symbols = scope.symbols.values().collect::<Vec<&Symbol>>();
                symbols.sort_by_key(|symbol| symbol.location.offset());
                symbols
            })
    }
}

fn undeclared(name: &str, location: Location) -> SemanticError {
    SemanticError::new(
        SemanticErrorType::UndeclaredVariable { name: name.to_string() },
        location
    )
}

fn mismatch(expected: &ValueType, found: &Value, location: Location) -> SemanticError {
    SemanticError::new(
        SemanticErrorType::TypeMismatch {
            expected: expected.to_string(),
            found: found.type_name(),
        },
        location
    )
}
