use crate::error::Loc;
use std::fmt;

/// Expression AST. Every variant carries the location of the token that
/// introduces it: the operator token for `Unary`/`Binary`, the `if`/`var`/`{`
/// token for the structured forms, and the literal/identifier token for the
/// leaves and calls.
///
/// Operators are carried as the operator token's text. The parser's
/// precedence ladder and the evaluator both dispatch on that text, and an
/// operator string the evaluator does not recognize is a located runtime
/// error rather than a silent fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        value: i64,
        loc: Loc,
    },
    Identifier {
        name: String,
        loc: Loc,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
        loc: Loc,
    },
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
        loc: Loc,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
        loc: Loc,
    },
    Call {
        name: String,
        args: Vec<Expr>,
        loc: Loc,
    },
    VarDecl {
        name: String,
        initializer: Box<Expr>,
        loc: Loc,
    },
    /// A braced sequence of statement expressions plus an optional trailing
    /// result expression, evaluated in its own child scope.
    Block {
        statements: Vec<Expr>,
        result: Option<Box<Expr>>,
        loc: Loc,
    },
}

impl Expr {
    pub fn loc(&self) -> &Loc {
        match self {
            Expr::Literal { loc, .. } => loc,
            Expr::Identifier { loc, .. } => loc,
            Expr::Unary { loc, .. } => loc,
            Expr::Binary { loc, .. } => loc,
            Expr::If { loc, .. } => loc,
            Expr::Call { loc, .. } => loc,
            Expr::VarDecl { loc, .. } => loc,
            Expr::Block { loc, .. } => loc,
        }
    }

    /// Structural equality that ignores source locations. Intended for tests
    /// that only care about the shape of a parse, not where it came from.
    pub fn same_shape(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Literal { value: a, .. }, Expr::Literal { value: b, .. }) => a == b,
            (Expr::Identifier { name: a, .. }, Expr::Identifier { name: b, .. }) => a == b,
            (
                Expr::Unary {
                    op: a, operand: x, ..
                },
                Expr::Unary {
                    op: b, operand: y, ..
                },
            ) => a == b && x.same_shape(y),
            (
                Expr::Binary {
                    left: la,
                    op: a,
                    right: ra,
                    ..
                },
                Expr::Binary {
                    left: lb,
                    op: b,
                    right: rb,
                    ..
                },
            ) => a == b && la.same_shape(lb) && ra.same_shape(rb),
            (
                Expr::If {
                    condition: ca,
                    then_branch: ta,
                    else_branch: ea,
                    ..
                },
                Expr::If {
                    condition: cb,
                    then_branch: tb,
                    else_branch: eb,
                    ..
                },
            ) => ca.same_shape(cb) && ta.same_shape(tb) && same_shape_opt(ea, eb),
            (
                Expr::Call {
                    name: a, args: xs, ..
                },
                Expr::Call {
                    name: b, args: ys, ..
                },
            ) => {
                a == b
                    && xs.len() == ys.len()
                    && xs.iter().zip(ys).all(|(x, y)| x.same_shape(y))
            }
            (
                Expr::VarDecl {
                    name: a,
                    initializer: x,
                    ..
                },
                Expr::VarDecl {
                    name: b,
                    initializer: y,
                    ..
                },
            ) => a == b && x.same_shape(y),
            (
                Expr::Block {
                    statements: xs,
                    result: ra,
                    ..
                },
                Expr::Block {
                    statements: ys,
                    result: rb,
                    ..
                },
            ) => {
                xs.len() == ys.len()
                    && xs.iter().zip(ys).all(|(x, y)| x.same_shape(y))
                    && same_shape_opt(ra, rb)
            }
            _ => false,
        }
    }
}

fn same_shape_opt(a: &Option<Box<Expr>>, b: &Option<Box<Expr>>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x.same_shape(y),
        (None, None) => true,
        _ => false,
    }
}

/// Renders a parseable form of the expression. Compound sub-expressions are
/// parenthesized so that re-parsing the rendering reproduces the same shape
/// (parentheses are transparent to the parser).
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Literal { value, .. } => write!(f, "{}", value),
            Expr::Identifier { name, .. } => write!(f, "{}", name),
            Expr::Unary { op, operand, .. } => write!(f, "({} {})", op, operand),
            Expr::Binary {
                left, op, right, ..
            } => write!(f, "({} {} {})", left, op, right),
            Expr::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                write!(f, "(if {} then {}", condition, then_branch)?;
                if let Some(els) = else_branch {
                    write!(f, " else {}", els)?;
                }
                write!(f, ")")
            }
            Expr::Call { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::VarDecl {
                name, initializer, ..
            } => write!(f, "var {} = {}", name, initializer),
            Expr::Block {
                statements, result, ..
            } => {
                write!(f, "{{")?;
                for statement in statements {
                    write!(f, " {};", statement)?;
                }
                if let Some(result) = result {
                    write!(f, " {}", result)?;
                }
                write!(f, " }}")
            }
        }
    }
}
