//! Recursive AST walker. `eval` never panics on a well-typed `Value`; every
//! operation that cannot be carried out returns `Value::Error` instead, and
//! every recursive call site checks for that sentinel (and for
//! `Value::ReturnValue`) before doing anything else with the result.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};

use crate::ast::{Expression, Program, Statement};
use crate::builtins;
use crate::environment::Environment;
use crate::error::{Config, RuntimeErrorKind};
use crate::object::Value;

pub fn eval_program(program: &Program, env: &Rc<RefCell<Environment>>, config: &Config) -> Value {
    let mut result = Value::Null;
    for stmt in program {
        result = eval_statement(stmt, env, config, 0);
        match result {
            Value::ReturnValue(inner) => return *inner,
            Value::Error(_) => return result,
            _ => {}
        }
    }
    result
}

fn eval_block(stmts: &[Statement], env: &Rc<RefCell<Environment>>, config: &Config, depth: usize) -> Value {
    let mut result = Value::Null;
    for stmt in stmts {
        result = eval_statement(stmt, env, config, depth);
        if matches!(result, Value::ReturnValue(_) | Value::Error(_)) {
            return result;
        }
    }
    result
}

fn eval_statement(
    stmt: &Statement,
    env: &Rc<RefCell<Environment>>,
    config: &Config,
    depth: usize,
) -> Value {
    match stmt {
        Statement::Let { name, value } => {
            let evaluated = eval_expression(value, env, config, depth);
            if evaluated.is_error() {
                return evaluated;
            }
            env.borrow_mut().put(name.clone(), evaluated);
            Value::Null
        }
        Statement::Return { value } => {
            let evaluated = eval_expression(value, env, config, depth);
            if evaluated.is_error() {
                return evaluated;
            }
            Value::ReturnValue(Box::new(evaluated))
        }
        Statement::Expression(expr) => eval_expression(expr, env, config, depth),
        Statement::Block(stmts) => eval_block(stmts, env, config, depth),
    }
}

fn eval_expression(
    expr: &Expression,
    env: &Rc<RefCell<Environment>>,
    config: &Config,
    depth: usize,
) -> Value {
    trace!("eval: {:?}", expr);
    match expr {
        Expression::IntegerLiteral(value) => Value::Integer(*value),
        Expression::BooleanLiteral(value) => Value::Boolean(*value),
        Expression::StringLiteral(value) => Value::String(value.clone()),
        Expression::Identifier(name) => eval_identifier(name, env),
        Expression::Prefix { op, right } => {
            let right = eval_expression(right, env, config, depth);
            if right.is_error() {
                return right;
            }
            eval_prefix(op, right)
        }
        Expression::Infix { op, left, right } => {
            let left = eval_expression(left, env, config, depth);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env, config, depth);
            if right.is_error() {
                return right;
            }
            eval_infix(op, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
        } => eval_if(condition, consequence, alternative.as_deref(), env, config, depth),
        Expression::FunctionLiteral { params, body } => Value::Function {
            params: params.clone(),
            body: Rc::new((**body).clone()),
            env: env.clone(),
        },
        Expression::Call { callee, args } => eval_call(callee, args, env, config, depth),
        Expression::ArrayLiteral(elements) => eval_array_literal(elements, env, config, depth),
        Expression::HashLiteral(pairs) => eval_hash_literal(pairs, env, config, depth),
        Expression::Index { left, index } => eval_index(left, index, env, config, depth),
    }
}

fn eval_identifier(name: &str, env: &Rc<RefCell<Environment>>) -> Value {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }
    if let Some(builtin) = builtins::lookup(name) {
        return Value::Builtin(builtin);
    }
    Value::Error(RuntimeErrorKind::IdentifierNotFound(name.to_string()).to_string())
}

fn eval_prefix(op: &str, right: Value) -> Value {
    match op {
        "!" => Value::Boolean(!right.is_truthy()),
        "-" => match right {
            Value::Integer(value) => Value::Integer(value.wrapping_neg()),
            other => Value::Error(
                RuntimeErrorKind::UnknownPrefixOperator {
                    op: op.to_string(),
                    operand: other.type_name().to_string(),
                }
                .to_string(),
            ),
        },
        _ => Value::Error(
            RuntimeErrorKind::UnknownPrefixOperator {
                op: op.to_string(),
                operand: right.type_name().to_string(),
            }
            .to_string(),
        ),
    }
}

fn eval_infix(op: &str, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(op, *l, *r),
        (Value::String(l), Value::String(r)) => eval_string_infix(op, l, r),
        _ if std::mem::discriminant(&left) == std::mem::discriminant(&right) => match op {
            "==" => Value::Boolean(values_identical(&left, &right)),
            "!=" => Value::Boolean(!values_identical(&left, &right)),
            _ => Value::Error(
                RuntimeErrorKind::UnknownInfixOperator {
                    left: left.type_name().to_string(),
                    op: op.to_string(),
                    right: right.type_name().to_string(),
                }
                .to_string(),
            ),
        },
        _ => Value::Error(
            RuntimeErrorKind::TypeMismatch {
                left: left.type_name().to_string(),
                op: op.to_string(),
                right: right.type_name().to_string(),
            }
            .to_string(),
        ),
    }
}

/// Reference/value identity for the same-type, non-Integer, non-String case.
/// Booleans have two canonical instances and Null is a singleton, so value
/// equality and identity coincide for every type that reaches this path.
fn values_identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

fn eval_integer_infix(op: &str, left: i64, right: i64) -> Value {
    match op {
        "+" => Value::Integer(left.wrapping_add(right)),
        "-" => Value::Integer(left.wrapping_sub(right)),
        "*" => Value::Integer(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                Value::Error(RuntimeErrorKind::DivisionByZero.to_string())
            } else {
                Value::Integer(left / right)
            }
        }
        "<" => Value::Boolean(left < right),
        ">" => Value::Boolean(left > right),
        "==" => Value::Boolean(left == right),
        "!=" => Value::Boolean(left != right),
        _ => Value::Error(
            RuntimeErrorKind::UnknownInfixOperator {
                left: "Integer".to_string(),
                op: op.to_string(),
                right: "Integer".to_string(),
            }
            .to_string(),
        ),
    }
}

fn eval_string_infix(op: &str, left: &str, right: &str) -> Value {
    match op {
        "+" => Value::String(format!("{}{}", left, right)),
        _ => Value::Error(
            RuntimeErrorKind::UnknownInfixOperator {
                left: "String".to_string(),
                op: op.to_string(),
                right: "String".to_string(),
            }
            .to_string(),
        ),
    }
}

fn eval_if(
    condition: &Expression,
    consequence: &Statement,
    alternative: Option<&Statement>,
    env: &Rc<RefCell<Environment>>,
    config: &Config,
    depth: usize,
) -> Value {
    let condition = eval_expression(condition, env, config, depth);
    if condition.is_error() {
        return condition;
    }
    if condition.is_truthy() {
        eval_statement(consequence, env, config, depth)
    } else if let Some(alternative) = alternative {
        eval_statement(alternative, env, config, depth)
    } else {
        Value::Null
    }
}

fn eval_array_literal(
    elements: &[Expression],
    env: &Rc<RefCell<Environment>>,
    config: &Config,
    depth: usize,
) -> Value {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        let value = eval_expression(element, env, config, depth);
        if value.is_error() {
            return value;
        }
        values.push(value);
    }
    Value::Array(values)
}

fn eval_hash_literal(
    pairs: &[(Expression, Expression)],
    env: &Rc<RefCell<Environment>>,
    config: &Config,
    depth: usize,
) -> Value {
    let mut map = std::collections::HashMap::new();
    for (key_expr, value_expr) in pairs {
        let key = eval_expression(key_expr, env, config, depth);
        if key.is_error() {
            return key;
        }
        let hash_key = match key.hash_key() {
            Some(hash_key) => hash_key,
            None => {
                return Value::Error(
                    RuntimeErrorKind::UnusableAsHashKey(key.type_name().to_string()).to_string(),
                )
            }
        };
        let value = eval_expression(value_expr, env, config, depth);
        if value.is_error() {
            return value;
        }
        map.insert(hash_key, (key, value));
    }
    Value::Hash(map)
}

fn eval_index(
    left: &Expression,
    index: &Expression,
    env: &Rc<RefCell<Environment>>,
    config: &Config,
    depth: usize,
) -> Value {
    let left = eval_expression(left, env, config, depth);
    if left.is_error() {
        return left;
    }
    let index = eval_expression(index, env, config, depth);
    if index.is_error() {
        return index;
    }

    match (&left, &index) {
        (Value::Array(elements), Value::Integer(i)) => {
            if *i < 0 || *i as usize >= elements.len() {
                Value::Null
            } else {
                elements[*i as usize].clone()
            }
        }
        (Value::Hash(map), key) => match key.hash_key() {
            Some(hash_key) => map
                .get(&hash_key)
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null),
            None => Value::Error(
                RuntimeErrorKind::UnusableAsHashKey(key.type_name().to_string()).to_string(),
            ),
        },
        _ => Value::Error(
            RuntimeErrorKind::IndexNotSupported(left.type_name().to_string()).to_string(),
        ),
    }
}

fn eval_call(
    callee: &Expression,
    args: &[Expression],
    env: &Rc<RefCell<Environment>>,
    config: &Config,
    depth: usize,
) -> Value {
    let callee = eval_expression(callee, env, config, depth);
    if callee.is_error() {
        return callee;
    }

    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        let value = eval_expression(arg, env, config, depth);
        if value.is_error() {
            return value;
        }
        evaluated_args.push(value);
    }

    match callee {
        Value::Function { params, body, env: captured } => {
            apply_function(&params, &body, &captured, &evaluated_args, config, depth)
        }
        Value::Builtin(builtin) => {
            debug!("call builtin, depth={}", depth);
            builtin(&evaluated_args)
        }
        other => {
            Value::Error(RuntimeErrorKind::NotAFunction(other.type_name().to_string()).to_string())
        }
    }
}

fn apply_function(
    params: &[String],
    body: &Statement,
    captured_env: &Rc<RefCell<Environment>>,
    args: &[Value],
    config: &Config,
    depth: usize,
) -> Value {
    if depth >= config.max_call_depth {
        return Value::Error(RuntimeErrorKind::StackOverflow(config.max_call_depth).to_string());
    }
    debug!("call depth={}", depth + 1);

    let call_env = Environment::extend(captured_env.clone());
    for (param, arg) in params.iter().zip(args.iter()) {
        call_env.borrow_mut().put(param.clone(), arg.clone());
    }

    match eval_statement(body, &call_env, config, depth + 1) {
        Value::ReturnValue(inner) => *inner,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn eval(input: &str) -> Value {
        let mut parser = Parser::new(input);
        let (program, errors) = parser.parse_program();
        assert!(errors.is_empty(), "parser errors: {:?}", errors);
        let env = Environment::new();
        eval_program(&program, &env, &Config::default())
    }

    #[test]
    fn integer_arithmetic() {
        assert!(matches!(eval("5 + 5 + 5 - 10"), Value::Integer(5)));
        assert!(matches!(eval("2 * 2 * 2 * 2 * 2"), Value::Integer(32)));
        assert!(matches!(eval("50 / 2 * 2 + 10"), Value::Integer(60)));
    }

    #[test]
    fn integer_arithmetic_wraps_on_overflow_like_the_reference_int64() {
        assert!(matches!(
            eval("9223372036854775807 + 1"),
            Value::Integer(i64::MIN)
        ));
        assert!(matches!(
            eval("4611686018427387904 * 4"),
            Value::Integer(0)
        ));
        assert!(matches!(
            eval("-9223372036854775807 - 2"),
            Value::Integer(i64::MAX)
        ));
        assert!(matches!(eval("-(-9223372036854775807 - 1)"), Value::Integer(i64::MIN)));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        match eval("10 / 0") {
            Value::Error(msg) => assert_eq!(msg, "division by zero"),
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[test]
    fn bang_negates_truthiness() {
        assert!(matches!(eval("!true"), Value::Boolean(false)));
        assert!(matches!(eval("!false"), Value::Boolean(true)));
        assert!(matches!(eval("!5"), Value::Boolean(false)));
        assert!(matches!(eval("!!5"), Value::Boolean(true)));
    }

    #[test]
    fn if_else_expressions() {
        assert!(matches!(eval("if (true) { 10 }"), Value::Integer(10)));
        assert!(matches!(eval("if (false) { 10 }"), Value::Null));
        assert!(matches!(eval("if (1 < 2) { 10 } else { 20 }"), Value::Integer(10)));
    }

    #[test]
    fn return_statements_unwind_through_nested_blocks() {
        let input = "if (10 > 1) { if (10 > 1) { return 10; } return 1; }";
        assert!(matches!(eval(input), Value::Integer(10)));
    }

    #[test]
    fn error_handling_messages() {
        let cases = [
            ("5 + true;", "type mismatch: Integer + Boolean"),
            ("-true", "unknown operator: -Boolean"),
            ("true + false;", "unknown operator: Boolean + Boolean"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: Boolean + Boolean",
            ),
            ("foobar", "identifier not found: foobar"),
            (r#""hello" - "world""#, "unknown operator: String - String"),
        ];
        for (input, expected) in cases {
            match eval(input) {
                Value::Error(msg) => assert_eq!(msg, expected, "input: {}", input),
                other => panic!("input {}: expected Error, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn let_statements_bind_values() {
        assert!(matches!(eval("let a = 5; a;"), Value::Integer(5)));
        assert!(matches!(eval("let a = 5 * 5; a;"), Value::Integer(25)));
        assert!(matches!(eval("let a = 5; let b = a; b;"), Value::Integer(5)));
    }

    #[test]
    fn functions_and_closures() {
        assert!(matches!(eval("let identity = fn(x) { x; }; identity(5);"), Value::Integer(5)));
        assert!(matches!(
            eval("let add = fn(x, y) { x + y; }; add(5, 5);"),
            Value::Integer(10)
        ));
        assert!(matches!(
            eval("let adder = fn(x) { fn(y) { x + y }; }; adder(2)(3);"),
            Value::Integer(5)
        ));
    }

    #[test]
    fn fewer_args_than_params_is_an_identifier_error() {
        match eval("let f = fn(x, y) { y }; f(1);") {
            Value::Error(msg) => assert_eq!(msg, "identifier not found: y"),
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[test]
    fn string_concatenation() {
        assert!(matches!(
            eval(r#""Hello" + " " + "World""#),
            Value::String(s) if s == "Hello World"
        ));
    }

    #[test]
    fn array_and_index_expressions() {
        assert!(matches!(eval("len([1, 2, 3])"), Value::Integer(3)));
        assert!(matches!(eval("[1, 2, 3][3]"), Value::Null));
        assert!(matches!(eval("[1, 2, 3][0]"), Value::Integer(1)));
    }

    #[test]
    fn hash_literals_and_indexing() {
        let input = r#"let m = {"name": "Monkey", 1: true, true: "yes"}; m["name"];"#;
        match eval(input) {
            Value::String(s) => assert_eq!(s, "Monkey"),
            other => panic!("expected String, got {:?}", other),
        }
        assert!(matches!(
            eval(r#"{"one": 1}[fn(x) { x }]"#),
            Value::Error(_)
        ));
    }

    #[test]
    fn push_builtin_does_not_mutate() {
        let input = "let a = [1, 2, 3]; push(a, 4);";
        match eval(input) {
            Value::Array(elements) => assert_eq!(elements.len(), 4),
            other => panic!("expected Array, got {:?}", other),
        }
        assert!(matches!(eval("let a = [1, 2, 3]; push(a, 4); a;"), Value::Array(ref v) if v.len() == 3));
    }

    #[test]
    fn same_scope_let_rebind_is_visible_through_the_shared_environment() {
        // See SPEC_FULL.md §9: the distilled spec's own scenario claims `1`,
        // but the reference environment shares its map by pointer, so a
        // rebind in the same scope is visible to a closure that looks the
        // name up afterward.
        let input = "let x = 1; let f = fn() { x }; let x = 2; f();";
        assert!(matches!(eval(input), Value::Integer(2)));
    }

    #[test]
    fn recursion_past_max_call_depth_is_a_runtime_error() {
        let mut parser = Parser::new("let loop = fn(n) { loop(n + 1) }; loop(0);");
        let (program, errors) = parser.parse_program();
        assert!(errors.is_empty());
        let env = Environment::new();
        let config = Config { max_call_depth: 8 };
        match eval_program(&program, &env, &config) {
            Value::Error(msg) => assert_eq!(msg, "stack overflow: call depth exceeded 8"),
            other => panic!("expected Error, got {:?}", other),
        }
    }
}
