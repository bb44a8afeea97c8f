//! A tree-walking interpreter for Monkey: lexer, Pratt parser, and recursive
//! evaluator with closures, arrays, and hashes.
//!
//! The only entry point a host (a REPL, a test harness, an embedder) needs
//! is [`evaluate`]: feed it source text and an [`Environment`], get back a
//! [`Value`]. Everything else in this crate exists to make that one call
//! correct.

pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod token;

use std::cell::RefCell;
use std::rc::Rc;

pub use environment::Environment;
pub use error::{Config, RuntimeErrorKind};
pub use object::Value;
pub use parser::{Parser, ParserError};

/// Lexes, parses, and evaluates `source` against `env`.
///
/// If parsing produced any errors, evaluation is skipped and a single
/// `Value::Error` is returned whose message joins every parser error on its
/// own line — the caller never needs a second channel to learn that parsing
/// failed, since the whole contract is "one `Value` in, one `Value` out".
pub fn evaluate(source: &str, env: &Rc<RefCell<Environment>>, config: &Config) -> Value {
    let mut parser = Parser::new(source);
    let (program, errors) = parser.parse_program();

    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        return Value::Error(message);
    }

    evaluator::eval_program(&program, env, config)
}
