//! # Symbolic Integration Module
//!
//! Indefinite integrals by pattern matching on the simplified expression, and definite
//! integrals evaluated from the closed form or, when there is none, by adaptive quadrature.
//!
//! ## Rules of `integrate`, tried in this order
//! 1. **Constants**: `∫ c dx = c*x` for anything free of the variable
//! 2. **Linearity**: sums term by term, constant factors pulled out
//! 3. **Table**: elementary functions of a linear argument `u = a*x + b`:
//!    `u^n`, `1/u → ln|u|/a`, `c^u`, `sin`, `cos`, `tan`, `exp`, `ln`, `asin`, `acos`, `atan`,
//!    `abs`, `sin(u)^2`, `cos(u)^2`
//! 4. **Substitution**: `f(g(x))*g'(x)` up to a constant factor, e.g. `x*exp(x^2)`
//! 5. **Integration by parts**: `x^n*exp(u)`, `x^n*sin(u)`, `x^n*cos(u)` for linear `u` and
//!    `x^n*ln(a*x)`
//! 6. **Expansion**: products and small powers of sums are multiplied out
//!
//! Anything else has no closed form in this engine and `integrate` returns `None`; this is a
//! normal outcome, not an error.
use crate::Utils::config::{EngineConfig, QuadratureConfig};
use crate::symbolic::number::Number;
use crate::symbolic::symbolic_engine::{BinaryOp, Expr, UnaryOp};
use crate::symbolic::symbolic_error::SymbolicResult;
use crate::symbolic::symbolic_quadrature::adaptive_simpson;
use crate::symbolic::symbolic_simplify::{collect_product, flatten_product, flatten_sum};
use log::{debug, info};

/// nesting limit of the rules that call the integrator recursively
const MAX_RULE_DEPTH: usize = 8;

/// How a definite integral was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum IntegrationMethod {
    #[strum(to_string = "closed form")]
    ClosedForm,
    #[strum(to_string = "adaptive Simpson")]
    AdaptiveSimpson,
}

/// Value of a definite integral together with the accuracy actually achieved.
#[derive(Clone, Debug, PartialEq)]
pub struct DefiniteIntegral {
    pub value: f64,
    /// estimated relative error, `0` for a closed form
    pub achieved_tolerance: f64,
    pub method: IntegrationMethod,
    /// false if quadrature stopped at the depth ceiling before meeting the tolerance
    pub converged: bool,
}

impl Expr {
    //___________________________________SYMBOLIC INTEGRATION____________________________________

    /// Indefinite integral with respect to `var`, without the constant of integration.
    ///
    /// # Examples
    /// ```
    /// use RustedCAS::symbolic::symbolic_engine::Expr;
    /// let e = Expr::one() / Expr::var("x");
    /// assert_eq!(e.integrate_indefinite("x").unwrap().to_string(), "ln|x|");
    /// assert!(Expr::var("x").pow(Expr::int(2)).exp().integrate_indefinite("x").is_none());
    /// ```
    pub fn integrate_indefinite(&self, var: &str) -> Option<Expr> {
        let antiderivative = integrate_node(&self.simplify(), var, 0)?;
        Some(antiderivative.simplify())
    }

    /// Definite integral over `[lower, upper]`; see [`Expr::integrate_definite_with`].
    pub fn integrate_definite(&self, var: &str, lower: f64, upper: f64) -> SymbolicResult<DefiniteIntegral> {
        self.integrate_definite_with(var, lower, upper, &EngineConfig::default())
    }

    /// `F(upper) - F(lower)` if a closed form `F` exists, is defined at both bounds and the
    /// integrand has no pole strictly inside the interval; adaptive Simpson quadrature otherwise.
    ///
    /// # Errors
    /// Evaluation errors of the integrand during quadrature (`DomainError`, `UnboundVariable`).
    pub fn integrate_definite_with(
        &self,
        var: &str,
        lower: f64,
        upper: f64,
        config: &EngineConfig,
    ) -> SymbolicResult<DefiniteIntegral> {
        if let Some(antiderivative) = self.integrate_indefinite(var) {
            if has_interior_pole(&self.simplify(), var, lower, upper) {
                info!(
                    "{} has a pole inside [{}, {}], the closed form {} is not used",
                    self, lower, upper, antiderivative
                );
                return self.quadrature(var, lower, upper, &config.quadrature);
            }
            let closed_form = antiderivative
                .evaluate_at(var, upper)
                .and_then(|hi| Ok(hi - antiderivative.evaluate_at(var, lower)?));
            match closed_form {
                Ok(value) => {
                    return Ok(DefiniteIntegral {
                        value,
                        achieved_tolerance: 0.0,
                        method: IntegrationMethod::ClosedForm,
                        converged: true,
                    });
                }
                Err(e) => debug!("closed form {} not usable on [{}, {}]: {}", antiderivative, lower, upper, e),
            }
        }
        info!("no usable closed form for {}, falling back to adaptive Simpson", self);
        self.quadrature(var, lower, upper, &config.quadrature)
    }

    /// Adaptive Simpson quadrature of the expression, ignoring any closed form.
    pub fn quadrature(
        &self,
        var: &str,
        lower: f64,
        upper: f64,
        config: &QuadratureConfig,
    ) -> SymbolicResult<DefiniteIntegral> {
        let integrand = self.simplify();
        let outcome = adaptive_simpson(|t| integrand.evaluate_at(var, t), lower, upper, config)?;
        Ok(DefiniteIntegral {
            value: outcome.value,
            achieved_tolerance: outcome.relative_error(),
            method: IntegrationMethod::AdaptiveSimpson,
            converged: outcome.converged,
        })
    }
}

/// samples per denominator when looking for a pole between the bounds
const POLE_SCAN_POINTS: usize = 256;

/// Expressions whose zeros are poles of the simplified integrand: bases raised to a negative
/// power and `cos(u)` for every `tan(u)`.
fn pole_denominators(integrand: &Expr) -> Vec<Expr> {
    let mut denominators = Vec::new();
    integrand.visit(&mut |node| match node {
        Expr::Binary(BinaryOp::Pow, base, exponent) if exponent.as_number().is_some_and(Number::is_negative) => {
            denominators.push(base.as_ref().clone())
        }
        Expr::Unary(UnaryOp::Tan, u) => denominators.push(u.as_ref().clone().cos()),
        _ => {}
    });
    denominators
}

/// true if a denominator vanishes or changes sign strictly between `lower` and `upper`
fn has_interior_pole(integrand: &Expr, var: &str, lower: f64, upper: f64) -> bool {
    pole_denominators(integrand)
        .iter()
        .filter(|d| d.contains_variable(var))
        .any(|denominator| {
            let mut previous: Option<f64> = None;
            for k in 0..=POLE_SCAN_POINTS {
                let interior = k > 0 && k < POLE_SCAN_POINTS;
                let t = lower + (upper - lower) * k as f64 / POLE_SCAN_POINTS as f64;
                match denominator.evaluate_at(var, t) {
                    Ok(v) if v != 0.0 => {
                        if previous.is_some_and(|p| p.signum() != v.signum()) {
                            return true;
                        }
                        previous = Some(v);
                    }
                    _ if interior => return true,
                    _ => {}
                }
            }
            false
        })
}

fn factors_of(expr: &Expr) -> Vec<Expr> {
    let mut factors = Vec::new();
    flatten_product(expr.clone(), &mut factors);
    factors
}

fn product_of(factors: Vec<Expr>) -> Expr {
    collect_product(factors)
}

/// Slope `a` if `u = a*x + b` with `a`, `b` free of `x` and `a != 0`.
fn linear_slope(u: &Expr, var: &str) -> Option<Expr> {
    let slope = u.diff(var).simplify();
    if slope.contains_variable(var) || slope.is_zero() {
        None
    } else {
        Some(slope)
    }
}

/// `x^n` with a positive integer `n`: the degree `n`
fn monomial_degree(expr: &Expr, var: &str) -> Option<i64> {
    match expr {
        Expr::Var(name) if name == var => Some(1),
        Expr::Binary(BinaryOp::Pow, base, exponent) => match (base.as_ref(), exponent.as_ref()) {
            (Expr::Var(name), Expr::Const(n)) if name == var => n.as_integer().filter(|k| *k > 0),
            _ => None,
        },
        _ => None,
    }
}

fn integrate_node(expr: &Expr, var: &str, depth: usize) -> Option<Expr> {
    if depth > MAX_RULE_DEPTH {
        return None;
    }
    if !expr.contains_variable(var) {
        return Some(expr.clone() * Expr::var(var));
    }
    match expr {
        Expr::Binary(BinaryOp::Add, ..) => {
            let mut terms = Vec::new();
            flatten_sum(expr.clone(), &mut terms);
            let integrals = terms
                .iter()
                .map(|term| integrate_node(term, var, depth))
                .collect::<Option<Vec<Expr>>>()?;
            integrals.into_iter().reduce(|acc, t| acc + t)
        }
        Expr::Binary(BinaryOp::Mul, ..) => {
            let (free, dependent): (Vec<Expr>, Vec<Expr>) =
                factors_of(expr).into_iter().partition(|f| !f.contains_variable(var));
            let integral = match dependent.len() {
                1 => integrate_factor(&dependent[0], var, depth)?,
                _ => integrate_product(&dependent, var, depth)?,
            };
            if free.is_empty() {
                Some(integral)
            } else {
                Some(product_of(free) * integral)
            }
        }
        _ => integrate_factor(expr, var, depth),
    }
}

/// A single factor depending on the variable.
fn integrate_factor(expr: &Expr, var: &str, depth: usize) -> Option<Expr> {
    if let Some(table) = table_integral(expr, var) {
        return Some(table);
    }
    match expr {
        // (u + v)^n with a non-linear base
        Expr::Binary(BinaryOp::Pow, base, _) if matches!(base.as_ref(), Expr::Binary(BinaryOp::Add, ..)) => {
            integrate_expanded(expr, var, depth)
        }
        _ => None,
    }
}

/// Table of primitives of elementary functions of a linear argument.
fn table_integral(expr: &Expr, var: &str) -> Option<Expr> {
    let x = || Expr::var(var);
    match expr {
        Expr::Var(name) if name == var => Some(x().pow(Expr::int(2)) / Expr::int(2)),
        Expr::Binary(BinaryOp::Pow, base, exponent) => {
            if !exponent.contains_variable(var) {
                let a = linear_slope(base, var);
                if let (Some(a), Expr::Const(n)) = (a.clone(), exponent.as_ref()) {
                    let u = base.as_ref().clone();
                    if *n == Number::int(-1) {
                        debug!("∫ 1/u rule for u = {}", u);
                        return Some(u.abs().ln() / a);
                    }
                    let raised = Expr::Const(n.add(&Number::one()));
                    return Some(u.pow(raised.clone()) / (raised * a));
                }
                // sin(u)^2 and cos(u)^2
                if exponent.as_number() == Some(&Number::int(2)) {
                    if let Expr::Unary(op @ (UnaryOp::Sin | UnaryOp::Cos), u) = base.as_ref() {
                        let a = linear_slope(u, var)?;
                        let u = u.as_ref().clone();
                        let double = (Expr::int(2) * u.clone()).sin() / (Expr::int(4) * a.clone());
                        let half = u / (Expr::int(2) * a.clone());
                        return Some(if *op == UnaryOp::Sin { half - double } else { half + double });
                    }
                }
                None
            } else if !base.contains_variable(var) {
                // c^u = exp(u*ln c)
                let a = linear_slope(exponent, var)?;
                Some(expr.clone() / (base.as_ref().clone().ln() * a))
            } else {
                None
            }
        }
        Expr::Unary(op, u) => {
            let a = linear_slope(u, var)?;
            let u = u.as_ref().clone();
            let primitive = match op {
                UnaryOp::Sin => -u.cos(),
                UnaryOp::Cos => u.sin(),
                UnaryOp::Tan => -u.cos().abs().ln(),
                UnaryOp::Exp => u.exp(),
                UnaryOp::Ln => u.clone() * u.clone().ln() - u,
                UnaryOp::Asin => u.clone() * u.clone().asin() + (Expr::one() - u.pow(Expr::int(2))).sqrt(),
                UnaryOp::Acos => u.clone() * u.clone().acos() - (Expr::one() - u.pow(Expr::int(2))).sqrt(),
                UnaryOp::Atan => {
                    u.clone() * u.clone().atan() - (Expr::one() + u.pow(Expr::int(2))).ln() / Expr::int(2)
                }
                UnaryOp::Abs => u.clone() * u.abs() / Expr::int(2),
                UnaryOp::Sqrt => Expr::int(2) * u.pow(Expr::rational(3, 2).ok()?) / Expr::int(3),
                UnaryOp::Neg => -(u.pow(Expr::int(2)) / Expr::int(2)),
            };
            Some(primitive / a)
        }
        _ => None,
    }
}

fn integrate_product(factors: &[Expr], var: &str, depth: usize) -> Option<Expr> {
    if let Some(result) = integrate_by_substitution(factors, var, depth) {
        return Some(result);
    }
    if let Some(result) = integrate_by_parts(factors, var, depth) {
        return Some(result);
    }
    integrate_expanded(&product_of(factors.to_vec()), var, depth)
}

fn fresh_variable(expr: &Expr, var: &str) -> String {
    let taken = expr.variables();
    let mut name = format!("{}_u", var);
    while taken.contains(&name) {
        name.push('u');
    }
    name
}

/// Inner functions `g` of a factor, each with the outer function `f(u)` such that the
/// factor is `f(g)`.
fn substitution_candidates(factor: &Expr, u: &str) -> Vec<(Expr, Expr)> {
    let mut candidates = vec![(factor.clone(), Expr::var(u))];
    match factor {
        Expr::Unary(op, inner) => candidates.push((inner.as_ref().clone(), Expr::unary(*op, Expr::var(u)))),
        Expr::Binary(BinaryOp::Pow, base, exponent) => {
            candidates.push((base.as_ref().clone(), Expr::var(u).pow(exponent.as_ref().clone())));
            candidates.push((exponent.as_ref().clone(), base.as_ref().clone().pow(Expr::var(u))));
        }
        _ => {}
    }
    candidates
}

/// `∫ f(g(x))*k*g'(x) dx = k*F(g(x))` for a constant `k`.
fn integrate_by_substitution(factors: &[Expr], var: &str, depth: usize) -> Option<Expr> {
    let whole = product_of(factors.to_vec());
    let u = fresh_variable(&whole, var);
    for (i, factor) in factors.iter().enumerate() {
        for (inner, outer) in substitution_candidates(factor, &u) {
            if !inner.contains_variable(var) || outer.contains_variable(var) {
                continue;
            }
            let inner_derivative = inner.diff(var).simplify();
            if inner_derivative.is_zero() {
                continue;
            }
            let rest: Vec<Expr> = factors
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, f)| f.clone())
                .collect();
            let ratio = (product_of(rest) / inner_derivative).simplify();
            if ratio.contains_variable(var) {
                continue;
            }
            let Some(primitive) = integrate_node(&outer.simplify(), &u, depth + 1) else {
                continue;
            };
            debug!("substitution {} = {} in {}", u, inner, whole);
            return Some(ratio * primitive.substitute_variable(&u, &inner));
        }
    }
    None
}

/// `∫ p*dv = p*v - ∫ v*dp` for a polynomial `p` and `dv` in {exp, sin, cos} of a linear
/// argument, or `∫ x^n*ln(u) = ln(u)*v - ∫ v*d(ln(u))`.
fn integrate_by_parts(factors: &[Expr], var: &str, depth: usize) -> Option<Expr> {
    let (monomials, others): (Vec<&Expr>, Vec<&Expr>) =
        factors.iter().partition(|f| monomial_degree(f, var).is_some());
    let [other] = others.as_slice() else {
        return None;
    };
    if monomials.is_empty() {
        return None;
    }
    let polynomial = product_of(monomials.into_iter().cloned().collect());
    let Expr::Unary(op, argument) = *other else {
        return None;
    };
    linear_slope(argument, var)?;
    let (u, dv) = match op {
        UnaryOp::Exp | UnaryOp::Sin | UnaryOp::Cos => (polynomial, (*other).clone()),
        UnaryOp::Ln => ((*other).clone(), polynomial),
        _ => return None,
    };
    debug!("integrating by parts with u = {}, dv = {}", u, dv);
    let v = integrate_node(&dv, var, depth + 1)?.simplify();
    let du = u.diff(var);
    let remaining = integrate_node(&(v.clone() * du).simplify(), var, depth + 1)?;
    Some(u * v - remaining)
}

fn integrate_expanded(expr: &Expr, var: &str, depth: usize) -> Option<Expr> {
    let expanded = expr.expand();
    if expanded == *expr {
        return None;
    }
    debug!("integrating expanded form {}", expanded);
    integrate_node(&expanded, var, depth + 1)
}
