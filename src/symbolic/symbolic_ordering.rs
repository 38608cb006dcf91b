//! Canonical total order over expressions.
//!
//! Operands of commutative chains are sorted with [`canonical_cmp`]:
//! `Const < Var < Unary < Binary`; constants by value, variables by name, operator nodes by
//! operator kind (declaration order of `UnaryOp` / `BinaryOp`) and then recursively by children.
//!
//! Terms of a sum are additionally ordered for display ([`term_cmp`]): by total degree,
//! highest first, then by the canonical order of the monomial; a pure constant term goes last.
//! This is what makes `x + 3*x^2 + 1` print as `3*x^2 + x + 1`.
use crate::symbolic::symbolic_engine::{BinaryOp, Expr};
use std::cmp::Ordering;

fn rank(expr: &Expr) -> u8 {
    match expr {
        Expr::Const(_) => 0,
        Expr::Var(_) => 1,
        Expr::Unary(..) => 2,
        Expr::Binary(..) => 3,
    }
}

pub fn canonical_cmp(a: &Expr, b: &Expr) -> Ordering {
    match (a, b) {
        (Expr::Const(x), Expr::Const(y)) => x.total_cmp(y),
        (Expr::Var(x), Expr::Var(y)) => x.cmp(y),
        (Expr::Unary(op_a, x), Expr::Unary(op_b, y)) => {
            op_a.cmp(op_b).then_with(|| canonical_cmp(x, y))
        }
        (Expr::Binary(op_a, l_a, r_a), Expr::Binary(op_b, l_b, r_b)) => op_a
            .cmp(op_b)
            .then_with(|| canonical_cmp(l_a, l_b))
            .then_with(|| canonical_cmp(r_a, r_b)),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Splits a product into its numeric coefficient and the remaining factor.
pub fn split_coefficient(term: &Expr) -> (f64, Option<&Expr>) {
    match term {
        Expr::Const(n) => (n.to_f64(), None),
        Expr::Binary(BinaryOp::Mul, lhs, rhs) => match lhs.as_ref() {
            Expr::Const(n) => (n.to_f64(), Some(rhs.as_ref())),
            _ => (1.0, Some(term)),
        },
        _ => (1.0, Some(term)),
    }
}

/// Total degree of a monomial: numeric exponents are summed, any other factor counts 1.
pub fn degree(monomial: &Expr) -> f64 {
    match monomial {
        Expr::Const(_) => 0.0,
        Expr::Binary(BinaryOp::Mul, lhs, rhs) => degree(lhs) + degree(rhs),
        Expr::Binary(BinaryOp::Pow, base, exponent) => match (base.as_ref(), exponent.as_ref()) {
            (b, Expr::Const(n)) if !b.is_const() => n.to_f64() * degree(b).max(1.0),
            _ => 1.0,
        },
        _ => 1.0,
    }
}

/// Display order of the terms of a sum.
pub fn term_cmp(a: &Expr, b: &Expr) -> Ordering {
    let (coef_a, mono_a) = split_coefficient(a);
    let (coef_b, mono_b) = split_coefficient(b);
    match (mono_a, mono_b) {
        (None, None) => coef_a.total_cmp(&coef_b),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(m_a), Some(m_b)) => degree(m_b)
            .total_cmp(&degree(m_a))
            .then_with(|| canonical_cmp(m_a, m_b))
            .then_with(|| coef_a.total_cmp(&coef_b)),
    }
}
