//! Lexical scope chain. Mirrors the reference implementation's `Runtime`
//! (a map plus an outer pointer), translated from Go's implicit
//! pointer-sharing to an explicit `Rc<RefCell<_>>` so a closure and the
//! scope it captured can outlive the stack frame that created them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Value;

#[derive(Debug)]
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: None,
        }))
    }

    /// Creates a child scope whose lookups fall through to `parent` when a
    /// name isn't bound locally.
    pub fn extend(parent: Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(parent),
        }))
    }

    /// Walks the parent chain looking for `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .outer
                .as_ref()
                .and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Binds `name` in this scope only. A name already bound here is
    /// overwritten in place — Monkey has no assignment, so `let` re-running
    /// on an existing name is the only way to "mutate" a binding, and it
    /// does so by direct replacement, not by shadowing in a new frame.
    pub fn put(&mut self, name: String, value: Value) {
        self.store.insert(name, value);
    }
}
