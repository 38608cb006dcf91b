//! # Scalar functions
//!
//! A [`Function`] is an ordered list of parameter names plus a body [`Expr`]. It is immutable:
//! simplification, differentiation and integration return a new `Function`.
//!
//! Functions are combined arithmetically with [`combine`]: the result is defined over the union
//! of both parameter lists (the parameters of `f`, then those of `g` not already present), its
//! body is `f.body op g.body` without any simplification, and it is displayed with both operands
//! bracketed, `(2*x + 10) + (y + z)`, until it is transformed.
//!
//! # Examples
//! ```
//! use RustedCAS::symbolic::symbolic_function::{Function, CombineOp, combine};
//! let g = Function::parse(&["x"], "2*x + 10").unwrap();
//! let h = Function::parse(&["y", "z"], "y + z").unwrap();
//! let sum = combine(CombineOp::Add, &g, &h);
//! assert_eq!(sum.to_display_string(), "(2*x + 10) + (y + z)");
//! assert_eq!(sum.simplify().to_display_string(), "2*x + y + z + 10");
//! assert_eq!(sum.evaluate(&[1.0, 2.0, 3.0]).unwrap(), 17.0);
//! ```
use crate::Utils::config::{EngineConfig, SimplifyConfig};
use crate::symbolic::symbolic_engine::{BinaryOp, Expr};
use crate::symbolic::symbolic_error::{SymbolicError, SymbolicResult};
use crate::symbolic::symbolic_evaluate::VariableBinding;
use crate::symbolic::symbolic_integration::DefiniteIntegral;
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use std::fmt;
use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayStyle {
    Plain,
    /// operands of the root operator in brackets, used for freshly combined functions
    Bracketed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    params: Vec<String>,
    body: Expr,
    display: DisplayStyle,
}

/// Builds a function from its parameter names and body.
///
/// # Errors
/// `MalformedExpression` if a parameter name is empty or repeated, or if the body uses a
/// variable that is not a parameter.
pub fn build_function(params: &[&str], body: Expr) -> SymbolicResult<Function> {
    Function::new(params.iter().map(|p| p.to_string()).collect(), body)
}

impl Function {
    pub fn new(params: Vec<String>, body: Expr) -> SymbolicResult<Function> {
        if let Some(empty) = params.iter().find(|p| p.trim().is_empty()) {
            return Err(SymbolicError::malformed(format!(
                "invalid parameter name '{}'",
                empty
            )));
        }
        if let Some(duplicate) = params.iter().duplicates().next() {
            return Err(SymbolicError::malformed(format!(
                "parameter '{}' is declared twice",
                duplicate
            )));
        }
        let unbound: Vec<String> = body
            .variables()
            .into_iter()
            .filter(|v| !params.contains(v))
            .collect();
        if !unbound.is_empty() {
            return Err(SymbolicError::malformed(format!(
                "body uses undeclared variable(s) {}",
                unbound.join(", ")
            )));
        }
        Ok(Function {
            params,
            body,
            display: DisplayStyle::Plain,
        })
    }

    /// Builds a function from infix text, e.g. `Function::parse(&["x"], "3*x^2 + 2*x")`.
    pub fn parse(params: &[&str], text: &str) -> SymbolicResult<Function> {
        build_function(params, Expr::parse_expression(text)?)
    }

    /// A transformed body over the same parameters; always displayed plainly.
    fn with_body(&self, body: Expr) -> Function {
        Function {
            params: self.params.clone(),
            body,
            display: DisplayStyle::Plain,
        }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn display_style(&self) -> DisplayStyle {
        self.display
    }

    /// Variable of a transform: the given one, or the first parameter.
    fn resolve_variable(&self, var: Option<&str>) -> SymbolicResult<String> {
        match var {
            Some(v) => Ok(v.to_string()),
            None => self.params.first().cloned().ok_or(SymbolicError::NoParameters),
        }
    }

    /// As [`Function::resolve_variable`], but the variable must be a parameter.
    fn integration_variable(&self, var: Option<&str>) -> SymbolicResult<String> {
        let var = self.resolve_variable(var)?;
        if !self.params.contains(&var) {
            return Err(SymbolicError::malformed(format!(
                "cannot integrate with respect to '{}', which is not a parameter of {}",
                var, self
            )));
        }
        Ok(var)
    }

    pub fn to_display_string(&self) -> String {
        match self.display {
            DisplayStyle::Plain => self.body.to_string(),
            DisplayStyle::Bracketed => self.body.to_bracketed_string(),
        }
    }

    //___________________________________TRANSFORMS____________________________________

    pub fn simplify(&self) -> Function {
        self.simplify_with(&SimplifyConfig::default())
    }

    pub fn simplify_with(&self, config: &SimplifyConfig) -> Function {
        self.with_body(self.body.simplify_with(config))
    }

    /// Simplified derivative with respect to `var` (default: the first parameter).
    ///
    /// A variable that is not a parameter gives the zero function.
    ///
    /// # Errors
    /// `NoParameters` if no variable is given and the function has no parameters.
    pub fn differentiate(&self, var: Option<&str>) -> SymbolicResult<Function> {
        let var = self.resolve_variable(var)?;
        debug!("differentiating {} with respect to {}", self, var);
        Ok(self.with_body(self.body.diff(&var).simplify()))
    }

    /// Antiderivative with respect to `var` (default: the first parameter), `Ok(None)` when
    /// no closed form is found.
    ///
    /// # Errors
    /// `NoParameters` as for [`Function::differentiate`]; `MalformedExpression` if `var` is not
    /// a parameter, since the antiderivative would depend on it.
    pub fn integrate_indefinite(&self, var: Option<&str>) -> SymbolicResult<Option<Function>> {
        let var = self.integration_variable(var)?;
        Ok(self
            .body
            .integrate_indefinite(&var)
            .map(|antiderivative| self.with_body(antiderivative)))
    }

    /// Value of the definite integral over `[lower, upper]`.
    pub fn integrate_definite(&self, lower: f64, upper: f64, var: Option<&str>) -> SymbolicResult<f64> {
        Ok(self.integrate_definite_detailed(lower, upper, var)?.value)
    }

    /// Definite integral together with the method used and the accuracy achieved.
    pub fn integrate_definite_detailed(
        &self,
        lower: f64,
        upper: f64,
        var: Option<&str>,
    ) -> SymbolicResult<DefiniteIntegral> {
        self.integrate_definite_with(lower, upper, var, &EngineConfig::default())
    }

    /// # Errors
    /// `MalformedExpression` if `var` is not a parameter; evaluation errors of the integrand.
    pub fn integrate_definite_with(
        &self,
        lower: f64,
        upper: f64,
        var: Option<&str>,
        config: &EngineConfig,
    ) -> SymbolicResult<DefiniteIntegral> {
        let var = self.integration_variable(var)?;
        self.body.integrate_definite_with(&var, lower, upper, config)
    }

    //___________________________________EVALUATION____________________________________

    /// Evaluates at positional arguments in parameter order.
    ///
    /// # Errors
    /// `ArityMismatch` for a wrong number of arguments, `DomainError` from the body.
    pub fn evaluate(&self, args: &[f64]) -> SymbolicResult<f64> {
        let binding = VariableBinding::from_pairs(&self.params, args)?;
        self.body.evaluate(&binding)
    }

    /// Evaluates a batch of argument tuples in parallel; results keep the input order.
    pub fn evaluate_many(&self, points: &[Vec<f64>]) -> Vec<SymbolicResult<f64>> {
        points.par_iter().map(|args| self.evaluate(args)).collect()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "f({}) = {}",
            self.params.join(", "),
            self.to_display_string()
        )
    }
}

//___________________________________COMBINATION____________________________________

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum CombineOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl CombineOp {
    fn binary_op(self) -> BinaryOp {
        match self {
            CombineOp::Add => BinaryOp::Add,
            CombineOp::Sub => BinaryOp::Sub,
            CombineOp::Mul => BinaryOp::Mul,
            CombineOp::Div => BinaryOp::Div,
        }
    }
}

/// `f op g` over the union of both parameter lists, unsimplified and displayed bracketed.
pub fn combine(op: CombineOp, f: &Function, g: &Function) -> Function {
    let params: Vec<String> = f.params.iter().chain(g.params.iter()).unique().cloned().collect();
    Function {
        params,
        body: Expr::binary(op.binary_op(), f.body.clone(), g.body.clone()),
        display: DisplayStyle::Bracketed,
    }
}

impl Function {
    pub fn plus(&self, other: &Function) -> Function {
        combine(CombineOp::Add, self, other)
    }

    pub fn minus(&self, other: &Function) -> Function {
        combine(CombineOp::Sub, self, other)
    }

    pub fn times(&self, other: &Function) -> Function {
        combine(CombineOp::Mul, self, other)
    }

    pub fn over(&self, other: &Function) -> Function {
        combine(CombineOp::Div, self, other)
    }
}
