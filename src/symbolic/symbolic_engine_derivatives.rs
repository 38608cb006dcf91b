//! # Symbolic Engine Derivatives Module
//!
//! Analytical differentiation of expression trees by structural recursion.
//!
//! ## Rules
//! - sum and difference rule
//! - product rule `(uv)' = u'v + uv'` and quotient rule `(u/v)' = (u'v - uv')/v^2`
//! - power rule with three cases:
//!   - `u^c` with an exponent free of the variable: `c*u^(c-1)*u'`
//!   - `c^v` with a base free of the variable: `c^v*ln(c)*v'`
//!   - `u^v` with both depending on the variable (logarithmic differentiation):
//!     `u^v*(v'*ln(u) + v*u'/u)`
//! - chain rule for every unary function through a table of outer derivatives
//!
//! The result is not simplified: differentiation and simplification are separate transforms,
//! callers compose them with `diff(..).simplify()`. Variables other than the one
//! differentiated against are constants.
use crate::symbolic::number::Number;
use crate::symbolic::symbolic_engine::{BinaryOp, Expr, UnaryOp};

impl Expr {
    //___________________________________DIFFERENTIATION____________________________________

    /// Analytical derivative with respect to `var`.
    ///
    /// # Examples
    /// ```
    /// use RustedCAS::symbolic::symbolic_engine::Expr;
    /// let g = Expr::int(2) * Expr::var("x") + Expr::int(10);
    /// assert_eq!(g.diff("x").simplify(), Expr::int(2));
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        if !self.contains_variable(var) {
            return Expr::zero();
        }
        match self {
            Expr::Var(_) => Expr::one(),
            Expr::Const(_) => Expr::zero(),
            Expr::Unary(op, operand) => outer_derivative(*op, operand) * operand.diff(var),
            Expr::Binary(BinaryOp::Add, lhs, rhs) => lhs.diff(var) + rhs.diff(var),
            Expr::Binary(BinaryOp::Sub, lhs, rhs) => lhs.diff(var) - rhs.diff(var),
            Expr::Binary(BinaryOp::Mul, lhs, rhs) => {
                lhs.diff(var) * rhs.as_ref().clone() + lhs.as_ref().clone() * rhs.diff(var)
            }
            Expr::Binary(BinaryOp::Div, lhs, rhs) => {
                let numerator =
                    lhs.diff(var) * rhs.as_ref().clone() - lhs.as_ref().clone() * rhs.diff(var);
                numerator / rhs.as_ref().clone().pow(Expr::int(2))
            }
            Expr::Binary(BinaryOp::Pow, base, exponent) => {
                power_derivative(base, exponent, var)
            }
        }
    }

    /// n-th derivative with respect to `var`, simplified after every step.
    pub fn nth_derivative(&self, var: &str, n: usize) -> Expr {
        (0..n).fold(self.clone(), |acc, _| acc.diff(var).simplify())
    }

    /// All first partial derivatives, in the order of `vars`.
    pub fn gradient(&self, vars: &[&str]) -> Vec<Expr> {
        vars.iter().map(|var| self.diff(var)).collect()
    }
}

/// `d op(u) / du`, expressed in `u`
fn outer_derivative(op: UnaryOp, u: &Expr) -> Expr {
    let u = u.clone();
    match op {
        UnaryOp::Neg => Expr::int(-1),
        UnaryOp::Sin => u.cos(),
        UnaryOp::Cos => -u.sin(),
        UnaryOp::Tan => Expr::one() / u.cos().pow(Expr::int(2)),
        UnaryOp::Exp => u.exp(),
        UnaryOp::Ln => Expr::one() / u,
        UnaryOp::Sqrt => Expr::one() / (Expr::int(2) * u.sqrt()),
        UnaryOp::Abs => u.clone() / u.abs(),
        UnaryOp::Asin => Expr::one() / (Expr::one() - u.pow(Expr::int(2))).sqrt(),
        UnaryOp::Acos => Expr::int(-1) / (Expr::one() - u.pow(Expr::int(2))).sqrt(),
        UnaryOp::Atan => Expr::one() / (Expr::one() + u.pow(Expr::int(2))),
    }
}

fn power_derivative(base: &Expr, exponent: &Expr, var: &str) -> Expr {
    let base_varies = base.contains_variable(var);
    let exponent_varies = exponent.contains_variable(var);
    let power = base.clone().pow(exponent.clone());
    match (base_varies, exponent_varies) {
        (true, false) => {
            let reduced = match exponent {
                Expr::Const(n) => Expr::Const(n.sub(&Number::one())),
                _ => exponent.clone() - Expr::one(),
            };
            exponent.clone() * base.clone().pow(reduced) * base.diff(var)
        }
        (false, true) => power * base.clone().ln() * exponent.diff(var),
        (true, true) => {
            let log_derivative = exponent.diff(var) * base.clone().ln()
                + exponent.clone() * base.diff(var) / base.clone();
            power * log_derivative
        }
        (false, false) => Expr::zero(),
    }
}
