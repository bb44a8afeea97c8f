//! Runtime error wording and the evaluator's one tunable knob.
//!
//! `RuntimeErrorKind` is the single source of truth for every message string
//! in the language's error sentinel (`Value::Error`). It is rendered to a
//! plain `String` at the point it is raised — the language-level value never
//! carries the typed enum itself, only its rendering, since `Value` must stay
//! plain data (see `object.rs`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    #[error("type mismatch: {left} {op} {right}")]
    TypeMismatch {
        left: String,
        op: String,
        right: String,
    },

    #[error("unknown operator: {op}{operand}")]
    UnknownPrefixOperator { op: String, operand: String },

    #[error("unknown operator: {left} {op} {right}")]
    UnknownInfixOperator {
        left: String,
        op: String,
        right: String,
    },

    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("not a function: {0}")]
    NotAFunction(String),

    #[error("index operator not supported: {0}")]
    IndexNotSupported(String),

    #[error("unusable as hash key: {0}")]
    UnusableAsHashKey(String),

    #[error("argument to `{name}` not supported, got {got}")]
    ArgumentNotSupported { name: String, got: String },

    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("stack overflow: call depth exceeded {0}")]
    StackOverflow(usize),

    #[error("unknown program statement: {0}")]
    UnknownNode(String),
}

/// Host-tunable evaluation knobs. The only ambient "configuration" this
/// crate has — there is no file or environment-based config loader, just
/// this struct passed explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum nested function-call depth before the evaluator raises
    /// `RuntimeErrorKind::StackOverflow` instead of overflowing the host stack.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: 2048,
        }
    }
}
