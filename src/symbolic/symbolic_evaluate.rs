//! Numeric evaluation of expression trees.
//!
//! Evaluation never coerces a mathematical error into `NaN` or infinity: operations outside
//! their real domain fail with [`SymbolicError::DomainError`], a variable without a value fails
//! with [`SymbolicError::UnboundVariable`].
use crate::symbolic::number::Number;
use crate::symbolic::symbolic_engine::{BinaryOp, Expr, UnaryOp};
use crate::symbolic::symbolic_error::{SymbolicError, SymbolicResult};
use std::collections::HashMap;

/// Values of the variables for a single evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableBinding {
    values: HashMap<String, f64>,
}

impl VariableBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `names[i]` to `values[i]`.
    pub fn from_pairs(names: &[String], values: &[f64]) -> SymbolicResult<Self> {
        if names.len() != values.len() {
            return Err(SymbolicError::ArityMismatch {
                expected: names.len(),
                got: values.len(),
            });
        }
        Ok(names.iter().cloned().zip(values.iter().copied()).collect())
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for VariableBinding {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        VariableBinding {
            values: iter.into_iter().collect(),
        }
    }
}

fn finite(operation: &str, argument: f64, result: f64) -> SymbolicResult<f64> {
    if result.is_finite() {
        Ok(result)
    } else {
        Err(SymbolicError::domain(operation, argument))
    }
}

impl UnaryOp {
    /// Applies the operation to a real argument, checking its domain.
    pub fn apply_f64(&self, v: f64) -> SymbolicResult<f64> {
        let name = self.to_string();
        match self {
            UnaryOp::Neg => finite(&name, v, -v),
            UnaryOp::Sin => finite(&name, v, v.sin()),
            UnaryOp::Cos => finite(&name, v, v.cos()),
            UnaryOp::Tan => finite(&name, v, v.tan()),
            UnaryOp::Exp => finite(&name, v, v.exp()),
            UnaryOp::Ln if v <= 0.0 => Err(SymbolicError::domain(name, v)),
            UnaryOp::Ln => finite(&name, v, v.ln()),
            UnaryOp::Sqrt if v < 0.0 => Err(SymbolicError::domain(name, v)),
            UnaryOp::Sqrt => finite(&name, v, v.sqrt()),
            UnaryOp::Abs => finite(&name, v, v.abs()),
            UnaryOp::Asin | UnaryOp::Acos if !(-1.0..=1.0).contains(&v) => {
                Err(SymbolicError::domain(name, v))
            }
            UnaryOp::Asin => Ok(v.asin()),
            UnaryOp::Acos => Ok(v.acos()),
            UnaryOp::Atan => finite(&name, v, v.atan()),
        }
    }
}

impl BinaryOp {
    /// Applies the operation to real operands, checking its domain.
    pub fn apply_f64(&self, lhs: f64, rhs: f64) -> SymbolicResult<f64> {
        match self {
            BinaryOp::Add => finite("+", lhs, lhs + rhs),
            BinaryOp::Sub => finite("-", lhs, lhs - rhs),
            BinaryOp::Mul => finite("*", lhs, lhs * rhs),
            BinaryOp::Div if rhs == 0.0 => Err(SymbolicError::domain("division", rhs)),
            BinaryOp::Div => finite("division", rhs, lhs / rhs),
            BinaryOp::Pow => {
                if lhs == 0.0 && rhs < 0.0 {
                    return Err(SymbolicError::domain("division", lhs));
                }
                if lhs < 0.0 && rhs.fract() != 0.0 {
                    let name = if rhs == 0.5 { "sqrt" } else { "pow" };
                    return Err(SymbolicError::domain(name, lhs));
                }
                let value = if rhs.fract() == 0.0 && rhs.abs() <= i32::MAX as f64 {
                    lhs.powi(rhs as i32)
                } else {
                    lhs.powf(rhs)
                };
                finite("pow", lhs, value)
            }
        }
    }
}

impl Expr {
    /// Evaluates the tree, looking variables up through `lookup`.
    pub fn evaluate_with<F>(&self, lookup: &F) -> SymbolicResult<f64>
    where
        F: Fn(&str) -> Option<f64>,
    {
        self.fold(&mut |node, children: Vec<SymbolicResult<f64>>| {
            let args = children.into_iter().collect::<SymbolicResult<Vec<f64>>>()?;
            match (node, args.as_slice()) {
                (Expr::Const(n), []) => {
                    let value = n.to_f64();
                    finite("constant", value, value)
                }
                (Expr::Var(name), []) => {
                    lookup(name).ok_or_else(|| SymbolicError::UnboundVariable(name.clone()))
                }
                (Expr::Unary(op, _), [v]) => op.apply_f64(*v),
                (Expr::Binary(op, ..), [l, r]) => op.apply_f64(*l, *r),
                _ => Err(SymbolicError::malformed("operand count does not match the node")),
            }
        })
    }

    /// Evaluates the tree under a binding.
    ///
    /// # Examples
    /// ```
    /// use RustedCAS::symbolic::symbolic_engine::Expr;
    /// use RustedCAS::symbolic::symbolic_evaluate::VariableBinding;
    /// let e = Expr::var("x").ln();
    /// assert!(e.evaluate(&VariableBinding::new().with("x", -1.0)).is_err());
    /// ```
    pub fn evaluate(&self, binding: &VariableBinding) -> SymbolicResult<f64> {
        self.evaluate_with(&|name: &str| binding.get(name))
    }

    /// Evaluates a tree of at most one free variable `var` at `value`.
    pub fn evaluate_at(&self, var: &str, value: f64) -> SymbolicResult<f64> {
        self.evaluate_with(&|name: &str| (name == var).then_some(value))
    }

    /// Folds the tree to a constant if it has no free variables and evaluates without error.
    pub fn constant_value(&self) -> Option<Number> {
        if !self.variables().is_empty() {
            return None;
        }
        self.evaluate(&VariableBinding::new()).ok().map(Number::from_f64)
    }
}
