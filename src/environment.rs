use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope.  The active call stack and any number of
/// closures may hold the same scope; writes through one handle are visible
/// through all of them.
///
/// A function declared in a scope is stored in that scope and also holds it
/// as its closure.  That `Rc` cycle is never broken, so a call scope that
/// declares an inner function outlives the call.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope: its own bindings plus a link to the enclosing scope.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// A root (global) scope.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap `self` into a shareable handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Bind `name` in this scope, replacing any previous binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup through the chain.  Used for globals.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Assign to an existing binding; never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read a binding from this scope only.
    pub fn get_here(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }
}

/// The scope exactly `distance` links up from `env`.
pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
    let mut current: EnvRef = Rc::clone(env);

    for _ in 0..distance {
        let next: EnvRef = current.borrow().enclosing()?;
        current = next;
    }

    Some(current)
}

/// Read `name` from the scope `distance` hops up, as fixed by the resolver.
pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
    debug!("get_at '{}' distance {}", name.lexeme, distance);

    ancestor(env, distance)
        .and_then(|scope| scope.borrow().get_here(&name.lexeme))
        .ok_or_else(|| undefined(name))
}

/// Write `name` in the scope `distance` hops up, as fixed by the resolver.
pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
    debug!("assign_at '{}' distance {}", name.lexeme, distance);

    let scope: EnvRef = ancestor(env, distance).ok_or_else(|| undefined(name))?;
    let mut scope = scope.borrow_mut();

    match scope.values.get_mut(&name.lexeme) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(undefined(name)),
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, 1)
    }

    #[test]
    fn assignment_reaches_the_declaring_scope() {
        let global: EnvRef = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));

        let inner: EnvRef = Environment::with_enclosing(Rc::clone(&global)).into_ref();
        inner
            .borrow_mut()
            .assign(&ident("a"), Value::Number(2.0))
            .unwrap();

        assert_eq!(global.borrow().get(&ident("a")).unwrap(), Value::Number(2.0));
        assert!(inner.borrow().get_here("a").is_none());
    }

    #[test]
    fn assignment_to_unknown_name_fails() {
        let global: EnvRef = Environment::new().into_ref();
        let err = global
            .borrow_mut()
            .assign(&ident("missing"), Value::Nil)
            .unwrap_err();

        assert_eq!(err.to_string(), "Undefined variable 'missing'. [line 1]");
    }

    #[test]
    fn get_at_skips_shadowing_scopes() {
        let global: EnvRef = Environment::new().into_ref();
        global.borrow_mut().define("x", Value::String("outer".into()));

        let middle: EnvRef = Environment::with_enclosing(Rc::clone(&global)).into_ref();
        middle.borrow_mut().define("x", Value::String("middle".into()));

        let inner: EnvRef = Environment::with_enclosing(Rc::clone(&middle)).into_ref();

        assert_eq!(
            get_at(&inner, 2, &ident("x")).unwrap(),
            Value::String("outer".into())
        );
        assert_eq!(
            get_at(&inner, 1, &ident("x")).unwrap(),
            Value::String("middle".into())
        );
        assert!(get_at(&inner, 0, &ident("x")).is_err());
    }

    #[test]
    fn scope_is_freed_unless_it_holds_its_own_closure() {
        use crate::ast::FunctionDecl;
        use crate::callable::LoxFunction;

        let plain: EnvRef = Environment::new().into_ref();
        plain.borrow_mut().define("n", Value::Number(1.0));
        let plain_weak = Rc::downgrade(&plain);
        drop(plain);
        assert!(plain_weak.upgrade().is_none());

        let scope: EnvRef = Environment::new().into_ref();
        let declaration = Rc::new(FunctionDecl {
            name: ident("inner"),
            params: Vec::new(),
            body: Vec::new(),
        });
        let inner = LoxFunction::new(declaration, Rc::clone(&scope), false);
        scope.borrow_mut().define("inner", Value::Function(inner));

        let scope_weak = Rc::downgrade(&scope);
        drop(scope);
        assert!(scope_weak.upgrade().is_some());
    }
}
