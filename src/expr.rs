//! Numeric / boolean parameter expressions and their evaluator.
//!
//! Booleans are encoded as `1.0` / `0.0`; any non-zero value counts as true.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Script-level constants introduced by `let`.
pub type Constants = HashMap<String, f64>;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Builtin, Vec<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Lt,
    Gt,
    Eq,
    Le,
    Ge,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

/// Built-in numeric functions callable from expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Abs,
    Floor,
    Ceil,
    Min,
    Max,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sqrt" => Builtin::Sqrt,
            "sin" => Builtin::Sin,
            "cos" => Builtin::Cos,
            "tan" => Builtin::Tan,
            "abs" => Builtin::Abs,
            "floor" => Builtin::Floor,
            "ceil" => Builtin::Ceil,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            _ => return None,
        })
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::Min | Builtin::Max => 2,
            _ => 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Builtin::Sqrt => args[0].sqrt(),
            Builtin::Sin => args[0].sin(),
            Builtin::Cos => args[0].cos(),
            Builtin::Tan => args[0].tan(),
            Builtin::Abs => args[0].abs(),
            Builtin::Floor => args[0].floor(),
            Builtin::Ceil => args[0].ceil(),
            Builtin::Min => args[0].min(args[1]),
            Builtin::Max => args[0].max(args[1]),
        }
    }
}

/// Variable lookup for one evaluation: rule bindings shadow `let` constants.
#[derive(Clone, Copy, Debug)]
pub struct Scope<'a> {
    constants: &'a Constants,
    bindings: &'a [(&'a str, f64)],
}

impl<'a> Scope<'a> {
    pub fn new(constants: &'a Constants, bindings: &'a [(&'a str, f64)]) -> Self {
        Self {
            constants,
            bindings,
        }
    }

    pub fn constants_only(constants: &'a Constants) -> Self {
        Self::new(constants, &[])
    }

    pub fn lookup(&self, name: &str) -> Option<f64> {
        self.bindings
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .or_else(|| self.constants.get(name).copied())
    }
}

fn truth(v: f64) -> bool {
    v != 0.0
}

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

impl Expr {
    pub fn num(value: f64) -> Self {
        Expr::Number(value)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Evaluates the expression in `scope`.
    pub fn eval(&self, scope: &Scope<'_>) -> Result<f64> {
        let value = match self {
            Expr::Number(n) => *n,
            Expr::Var(name) => scope.lookup(name).ok_or_else(|| Error::UnboundVariable {
                name: name.clone(),
            })?,
            Expr::Unary(op, operand) => {
                let v = operand.eval(scope)?;
                match op {
                    UnaryOp::Neg => -v,
                    UnaryOp::Not => flag(!truth(v)),
                }
            }
            Expr::Binary(op, lhs, rhs) => {
                let l = lhs.eval(scope)?;
                // `&` and `|` short-circuit so guards like `x != 0 & 1/x > 2` are safe.
                match op {
                    BinaryOp::And if !truth(l) => return Ok(0.0),
                    BinaryOp::Or if truth(l) => return Ok(1.0),
                    _ => {}
                }
                let r = rhs.eval(scope)?;
                match op {
                    BinaryOp::Or | BinaryOp::And => flag(truth(r)),
                    BinaryOp::Lt => flag(l < r),
                    BinaryOp::Gt => flag(l > r),
                    BinaryOp::Eq => flag(l == r),
                    BinaryOp::Le => flag(l <= r),
                    BinaryOp::Ge => flag(l >= r),
                    BinaryOp::Ne => flag(l != r),
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => {
                        if r == 0.0 {
                            return Err(Error::Arithmetic(format!("division of {l} by zero")));
                        }
                        l / r
                    }
                    BinaryOp::Rem => {
                        if r == 0.0 {
                            return Err(Error::Arithmetic(format!("remainder of {l} by zero")));
                        }
                        l % r
                    }
                    BinaryOp::Pow => l.powf(r),
                }
            }
            Expr::Call(builtin, args) => {
                let values = args
                    .iter()
                    .map(|a| a.eval(scope))
                    .collect::<Result<Vec<_>>>()?;
                if values.len() != builtin.arity() {
                    return Err(Error::Arithmetic(format!(
                        "{builtin:?} takes {} argument(s), got {}",
                        builtin.arity(),
                        values.len()
                    )));
                }
                builtin.apply(&values)
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::Arithmetic(format!("non-finite result {value}")))
        }
    }

    /// Calls `f` for every variable name referenced by the expression.
    pub fn visit_variables<'e>(&'e self, f: &mut impl FnMut(&'e str)) {
        match self {
            Expr::Number(_) => {}
            Expr::Var(name) => f(name),
            Expr::Unary(_, operand) => operand.visit_variables(f),
            Expr::Binary(_, lhs, rhs) => {
                lhs.visit_variables(f);
                rhs.visit_variables(f);
            }
            Expr::Call(_, args) => args.iter().for_each(|a| a.visit_variables(f)),
        }
    }
}
