use crate::ast::Expr;
use crate::error::{Loc, RillError};
use crate::value::Value;
use std::collections::HashMap;
use std::mem;

/// A scope in the lexical environment chain: a local name→value mapping
/// plus a link to the enclosing scope. Block evaluation pushes a child
/// scope for its own duration and pops it on the way out, so a scope never
/// outlives the block that created it.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    locals: HashMap<String, Value>,
    parent: Option<Box<Environment>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Environment) -> Self {
        Self {
            locals: HashMap::new(),
            parent: Some(Box::new(parent)),
        }
    }

    /// Walks the scope chain outward and returns the first binding found.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.locals.get(name) {
            Some(*value)
        } else if let Some(ref parent) = self.parent {
            parent.lookup(name)
        } else {
            None
        }
    }

    /// Binds `name` in this scope only, overwriting any existing local of
    /// the same name. Never touches enclosing scopes.
    pub fn declare(&mut self, name: &str, value: Value) {
        self.locals.insert(name.to_string(), value);
    }

    /// Overwrites the nearest enclosing binding of `name`, walking the
    /// chain outward. Returns false when no scope binds the name.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.locals.get_mut(name) {
            *slot = value;
            true
        } else if let Some(ref mut parent) = self.parent {
            parent.assign(name, value)
        } else {
            false
        }
    }
}

/// Reduces an expression to a value in the given environment.
///
/// Evaluation is structurally recursive and strictly sequential: binary
/// operands are evaluated left before right, and `and`/`or` always evaluate
/// both sides (no short-circuiting).
pub fn evaluate(expr: &Expr, env: &mut Environment) -> Result<Value, RillError> {
    match expr {
        Expr::Literal { value, .. } => Ok(Value::Int(*value)),

        Expr::Identifier { name, loc } => env.lookup(name).ok_or_else(|| {
            RillError::runtime_error(loc.clone(), format!("variable not found: '{}'", name))
        }),

        Expr::Unary { op, operand, loc } => {
            let value = evaluate(operand, env)?;
            apply_unary(op, value, loc)
        }

        Expr::Binary {
            left,
            op,
            right,
            loc,
        } if op.as_str() == "=" => {
            let name = match left.as_ref() {
                Expr::Identifier { name, .. } => name,
                _ => {
                    return Err(RillError::runtime_error(
                        loc.clone(),
                        "invalid assignment target".to_string(),
                    ));
                }
            };
            let value = evaluate(right, env)?;
            if !env.assign(name, value) {
                return Err(RillError::runtime_error(
                    loc.clone(),
                    format!("variable not found: '{}'", name),
                ));
            }
            Ok(value)
        }

        Expr::Binary {
            left,
            op,
            right,
            loc,
        } => {
            let lhs = evaluate(left, env)?;
            let rhs = evaluate(right, env)?;
            apply_binary(op, lhs, rhs, loc)
        }

        Expr::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            if evaluate(condition, env)?.is_truthy() {
                evaluate(then_branch, env)
            } else if let Some(els) = else_branch {
                evaluate(els, env)
            } else {
                Ok(Value::Unit)
            }
        }

        // Calls are parsed but have no evaluation semantics in this core.
        Expr::Call { name, loc, .. } => Err(RillError::runtime_error_with_help(
            loc.clone(),
            format!("function calls are not supported: '{}'", name),
            "only arithmetic, comparison and logical operators are available".to_string(),
        )),

        Expr::VarDecl {
            name, initializer, ..
        } => {
            let value = evaluate(initializer, env)?;
            env.declare(name, value);
            Ok(Value::Unit)
        }

        Expr::Block {
            statements, result, ..
        } => {
            let parent = mem::take(env);
            *env = Environment::with_parent(parent);

            let outcome = eval_block_body(statements, result, env);

            // The block scope is dropped even when the body failed.
            if let Some(parent) = env.parent.take() {
                *env = *parent;
            }
            outcome
        }
    }
}

fn eval_block_body(
    statements: &[Expr],
    result: &Option<Box<Expr>>,
    env: &mut Environment,
) -> Result<Value, RillError> {
    for statement in statements {
        evaluate(statement, env)?;
    }
    match result {
        Some(result) => evaluate(result, env),
        None => Ok(Value::Unit),
    }
}

fn apply_unary(op: &str, value: Value, loc: &Loc) -> Result<Value, RillError> {
    match op {
        "-" => match value {
            Value::Int(n) => Ok(Value::Int(-n)),
            other => Err(RillError::runtime_error(
                loc.clone(),
                format!("cannot negate {}", other.type_name()),
            )),
        },
        "not" => Ok(Value::Bool(!value.is_truthy())),
        _ => Err(RillError::runtime_error(
            loc.clone(),
            format!("unknown operator: {}", op),
        )),
    }
}

fn apply_binary(op: &str, lhs: Value, rhs: Value, loc: &Loc) -> Result<Value, RillError> {
    match op {
        "==" => Ok(Value::Bool(lhs == rhs)),
        "!=" => Ok(Value::Bool(lhs != rhs)),
        "and" => Ok(Value::Bool(lhs.is_truthy() && rhs.is_truthy())),
        "or" => Ok(Value::Bool(lhs.is_truthy() || rhs.is_truthy())),
        "+" | "-" | "*" | "/" | "%" | "<" | "<=" | ">" | ">=" => {
            let (a, b) = int_operands(op, lhs, rhs, loc)?;
            match op {
                "+" => Ok(Value::Int(a + b)),
                "-" => Ok(Value::Int(a - b)),
                "*" => Ok(Value::Int(a * b)),
                "/" => {
                    if b == 0 {
                        Err(RillError::runtime_error(
                            loc.clone(),
                            "division by zero".to_string(),
                        ))
                    } else {
                        Ok(Value::Int(a / b))
                    }
                }
                "%" => {
                    if b == 0 {
                        Err(RillError::runtime_error(
                            loc.clone(),
                            "modulo by zero".to_string(),
                        ))
                    } else {
                        Ok(Value::Int(a % b))
                    }
                }
                "<" => Ok(Value::Bool(a < b)),
                "<=" => Ok(Value::Bool(a <= b)),
                ">" => Ok(Value::Bool(a > b)),
                ">=" => Ok(Value::Bool(a >= b)),
                _ => unreachable!(),
            }
        }
        _ => Err(RillError::runtime_error(
            loc.clone(),
            format!("unknown operator: {}", op),
        )),
    }
}

fn int_operands(op: &str, lhs: Value, rhs: Value, loc: &Loc) -> Result<(i64, i64), RillError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok((a, b)),
        (lhs, rhs) => Err(RillError::runtime_error(
            loc.clone(),
            format!(
                "cannot apply '{}' to {} and {}",
                op,
                lhs.type_name(),
                rhs.type_name()
            ),
        )),
    }
}
