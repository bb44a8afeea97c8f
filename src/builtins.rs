//! Host-implemented functions available to every Monkey program without an
//! explicit binding. Looked up by name when an identifier isn't found in
//! the environment chain (see `evaluator::eval_identifier`).

use crate::error::RuntimeErrorKind;
use crate::object::{BuiltinFn, Value};

pub fn lookup(name: &str) -> Option<BuiltinFn> {
    match name {
        "len" => Some(len),
        "puts" => Some(puts),
        "first" => Some(first),
        "last" => Some(last),
        "rest" => Some(rest),
        "push" => Some(push),
        _ => None,
    }
}

fn wrong_arity(got: usize, want: &str) -> Value {
    Value::Error(
        RuntimeErrorKind::WrongArgumentCount {
            got,
            want: want.to_string(),
        }
        .to_string(),
    )
}

fn len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), "1");
    }
    match &args[0] {
        Value::String(s) => Value::Integer(s.len() as i64),
        Value::Array(elements) => Value::Integer(elements.len() as i64),
        other => Value::Error(
            RuntimeErrorKind::ArgumentNotSupported {
                name: "len".to_string(),
                got: other.type_name().to_string(),
            }
            .to_string(),
        ),
    }
}

fn puts(args: &[Value]) -> Value {
    for arg in args {
        println!("{}", arg);
    }
    Value::Null
}

fn first(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), "1");
    }
    match &args[0] {
        Value::Array(elements) => elements.first().cloned().unwrap_or(Value::Null),
        other => Value::Error(
            RuntimeErrorKind::ArgumentNotSupported {
                name: "first".to_string(),
                got: other.type_name().to_string(),
            }
            .to_string(),
        ),
    }
}

fn last(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), "1");
    }
    match &args[0] {
        Value::Array(elements) => elements.last().cloned().unwrap_or(Value::Null),
        other => Value::Error(
            RuntimeErrorKind::ArgumentNotSupported {
                name: "last".to_string(),
                got: other.type_name().to_string(),
            }
            .to_string(),
        ),
    }
}

fn rest(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), "1");
    }
    match &args[0] {
        Value::Array(elements) if elements.is_empty() => Value::Null,
        Value::Array(elements) => Value::Array(elements[1..].to_vec()),
        other => Value::Error(
            RuntimeErrorKind::ArgumentNotSupported {
                name: "rest".to_string(),
                got: other.type_name().to_string(),
            }
            .to_string(),
        ),
    }
}

fn push(args: &[Value]) -> Value {
    if args.len() != 2 {
        return wrong_arity(args.len(), "2");
    }
    match &args[0] {
        Value::Array(elements) => {
            let mut new_elements = elements.clone();
            new_elements.push(args[1].clone());
            Value::Array(new_elements)
        }
        other => Value::Error(
            RuntimeErrorKind::ArgumentNotSupported {
                name: "push".to_string(),
                got: other.type_name().to_string(),
            }
            .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_counts_strings_and_arrays() {
        assert!(matches!(len(&[Value::String("four".into())]), Value::Integer(4)));
        assert!(matches!(
            len(&[Value::Array(vec![Value::Integer(1), Value::Integer(2)])]),
            Value::Integer(2)
        ));
    }

    #[test]
    fn len_rejects_unsupported_types() {
        let result = len(&[Value::Integer(1)]);
        match result {
            Value::Error(msg) => assert_eq!(msg, "argument to `len` not supported, got Integer"),
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[test]
    fn len_rejects_wrong_arity() {
        let result = len(&[]);
        match result {
            Value::Error(msg) => assert_eq!(msg, "wrong number of arguments. got=0, want=1"),
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[test]
    fn push_does_not_mutate_its_argument() {
        let original = vec![Value::Integer(1), Value::Integer(2)];
        let result = push(&[Value::Array(original.clone()), Value::Integer(3)]);
        match result {
            Value::Array(elements) => assert_eq!(elements.len(), 3),
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn first_last_rest_on_empty_array_yield_null() {
        assert!(matches!(first(&[Value::Array(vec![])]), Value::Null));
        assert!(matches!(last(&[Value::Array(vec![])]), Value::Null));
        assert!(matches!(rest(&[Value::Array(vec![])]), Value::Null));
    }
}
