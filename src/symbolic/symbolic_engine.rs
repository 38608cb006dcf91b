//! # Symbolic Engine Module
//!
//! Core expression model of the engine: an immutable tree of scalar mathematical
//! expressions over real numbers.
//!
//! ## Main Structures
//!
//! ### `Expr` Enum
//! - **Constants**: `Const(Number)` - exact rationals or doubles
//! - **Variables**: `Var(String)` - identified by name
//! - **Unary operations**: `Unary(UnaryOp, operand)` - negation and the elementary functions
//! - **Binary operations**: `Binary(BinaryOp, left, right)` - `+ - * / ^`
//!
//! Trees are built once and never mutated: every transformation (simplification,
//! differentiation, integration, substitution) allocates a new tree. Equality is structural.
//!
//! ### Construction
//! - `Expr::apply(op, children)` - generic constructor that validates arity
//! - `Expr::call(name, children)` - resolves an operator or function by name
//! - `Expr::var`, `Expr::int`, `Expr::rational`, `Expr::float` - leaves
//! - `std::ops` overloads (`x.clone() * x + Expr::int(2)`) and `pow/sin/cos/...` methods
//!
//! ### Traversal
//! - `fold()` - generic bottom-up fold used by the other components
//! - `visit()` - pre-order visitor
//! - `map_children()` - rebuilds a node from transformed children

use crate::symbolic::number::Number;
use crate::symbolic::symbolic_error::{SymbolicError, SymbolicResult};
use std::collections::BTreeSet;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Functions of one argument, negation included.
///
/// The declaration order is part of the canonical ordering of expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString)]
pub enum UnaryOp {
    #[strum(to_string = "-", serialize = "neg", serialize = "negate")]
    Neg,
    #[strum(to_string = "sin")]
    Sin,
    #[strum(to_string = "cos")]
    Cos,
    #[strum(to_string = "tan", serialize = "tg")]
    Tan,
    #[strum(to_string = "exp")]
    Exp,
    #[strum(to_string = "ln", serialize = "log")]
    Ln,
    #[strum(to_string = "sqrt")]
    Sqrt,
    #[strum(to_string = "abs")]
    Abs,
    #[strum(to_string = "asin", serialize = "arcsin")]
    Asin,
    #[strum(to_string = "acos", serialize = "arccos")]
    Acos,
    #[strum(to_string = "atan", serialize = "arctg", serialize = "arctan")]
    Atan,
}

/// Operators of two arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString)]
pub enum BinaryOp {
    #[strum(to_string = "+", serialize = "add", serialize = "plus")]
    Add,
    #[strum(to_string = "-", serialize = "sub", serialize = "minus")]
    Sub,
    #[strum(to_string = "*", serialize = "mul", serialize = "times")]
    Mul,
    #[strum(to_string = "/", serialize = "div", serialize = "over")]
    Div,
    #[strum(to_string = "^", serialize = "pow", serialize = "power")]
    Pow,
}

/// Any node kind of the tree, used by the arity-checked constructor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl Operator {
    pub fn arity(&self) -> usize {
        match self {
            Operator::Unary(_) => 1,
            Operator::Binary(_) => 2,
        }
    }
}

/// Core symbolic expression enum representing a scalar mathematical expression as a tree.
///
/// # Examples
/// ```
/// use RustedCAS::symbolic::symbolic_engine::Expr;
/// let x = Expr::var("x");
/// let f = Expr::int(3) * x.clone().pow(Expr::int(2)) + Expr::int(2) * x;
/// assert_eq!(f.to_string(), "3*x^2 + 2*x");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numerical constant
    Const(Number),
    /// Symbolic variable with a name (e.g., "x", "y", "velocity")
    Var(String),
    /// Function or negation applied to one operand
    Unary(UnaryOp, Box<Expr>),
    /// Arithmetic operation: left op right
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::binary(BinaryOp::Div, self, rhs)
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::unary(UnaryOp::Neg, self)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::float(value)
    }
}

impl From<Number> for Expr {
    fn from(value: Number) -> Self {
        Expr::Const(value)
    }
}

impl Expr {
    //___________________________________CONSTRUCTION____________________________________

    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    pub fn int(value: i64) -> Expr {
        Expr::Const(Number::int(value))
    }

    /// Exact rational constant, fails on a zero denominator.
    pub fn rational(numer: i64, denom: i64) -> SymbolicResult<Expr> {
        Number::rational(numer, denom)
            .map(Expr::Const)
            .ok_or_else(|| SymbolicError::malformed(format!("{}/{} has a zero denominator", numer, denom)))
    }

    /// Constant from a double; integral values are stored exactly.
    pub fn float(value: f64) -> Expr {
        Expr::Const(Number::from_f64(value))
    }

    pub fn zero() -> Expr {
        Expr::int(0)
    }

    pub fn one() -> Expr {
        Expr::int(1)
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary(op, Box::new(operand))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Builds a node from an operator and its children, validating the arity.
    ///
    /// # Errors
    /// `MalformedExpression` if the number of children does not match the operator.
    pub fn apply(op: Operator, children: Vec<Expr>) -> SymbolicResult<Expr> {
        if children.len() != op.arity() {
            return Err(SymbolicError::malformed(format!(
                "{:?} expects {} operand(s), got {}",
                op,
                op.arity(),
                children.len()
            )));
        }
        let mut children = children.into_iter();
        let node = match (op, children.next(), children.next()) {
            (Operator::Unary(u), Some(operand), None) => Expr::unary(u, operand),
            (Operator::Binary(b), Some(lhs), Some(rhs)) => Expr::binary(b, lhs, rhs),
            _ => return Err(SymbolicError::malformed(format!("{:?} has wrong operands", op))),
        };
        Ok(node)
    }

    /// Resolves `name` to an operator and applies it, e.g. `call("Math.Pow", vec![x, 2])`.
    ///
    /// A leading `Math.` qualifier is ignored and names are case-insensitive. `-` means
    /// negation with one operand and subtraction with two.
    ///
    /// # Errors
    /// `UnsupportedOperator` for unknown names, `MalformedExpression` for a wrong arity.
    pub fn call(name: &str, children: Vec<Expr>) -> SymbolicResult<Expr> {
        Expr::apply(Self::resolve_operator(name, children.len())?, children)
    }

    pub fn resolve_operator(name: &str, arity: usize) -> SymbolicResult<Operator> {
        let trimmed = name.trim();
        let bare = trimmed.strip_prefix("Math.").unwrap_or(trimmed).to_lowercase();
        if bare == "-" {
            return Ok(if arity == 1 {
                Operator::Unary(UnaryOp::Neg)
            } else {
                Operator::Binary(BinaryOp::Sub)
            });
        }
        if let Ok(op) = BinaryOp::from_str(&bare) {
            return Ok(Operator::Binary(op));
        }
        if let Ok(op) = UnaryOp::from_str(&bare) {
            return Ok(Operator::Unary(op));
        }
        Err(SymbolicError::UnsupportedOperator(name.to_string()))
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Pow, self, rhs)
    }

    pub fn sin(self) -> Expr {
        Expr::unary(UnaryOp::Sin, self)
    }

    pub fn cos(self) -> Expr {
        Expr::unary(UnaryOp::Cos, self)
    }

    pub fn tan(self) -> Expr {
        Expr::unary(UnaryOp::Tan, self)
    }

    pub fn exp(self) -> Expr {
        Expr::unary(UnaryOp::Exp, self)
    }

    pub fn ln(self) -> Expr {
        Expr::unary(UnaryOp::Ln, self)
    }

    pub fn sqrt(self) -> Expr {
        Expr::unary(UnaryOp::Sqrt, self)
    }

    pub fn abs(self) -> Expr {
        Expr::unary(UnaryOp::Abs, self)
    }

    pub fn asin(self) -> Expr {
        Expr::unary(UnaryOp::Asin, self)
    }

    pub fn acos(self) -> Expr {
        Expr::unary(UnaryOp::Acos, self)
    }

    pub fn atan(self) -> Expr {
        Expr::unary(UnaryOp::Atan, self)
    }

    //___________________________________TRAVERSAL____________________________________

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Const(_) | Expr::Var(_) => Vec::new(),
            Expr::Unary(_, operand) => vec![operand.as_ref()],
            Expr::Binary(_, lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
        }
    }

    /// Generic bottom-up fold: `f` receives a node and the folded values of its children.
    ///
    /// # Examples
    /// ```
    /// use RustedCAS::symbolic::symbolic_engine::Expr;
    /// let e = Expr::var("x").sin() + Expr::int(1);
    /// let nodes = e.fold(&mut |_, children: Vec<usize>| 1 + children.iter().sum::<usize>());
    /// assert_eq!(nodes, 4);
    /// ```
    pub fn fold<T, F>(&self, f: &mut F) -> T
    where
        F: FnMut(&Expr, Vec<T>) -> T,
    {
        let folded: Vec<T> = self.children().into_iter().map(|child| child.fold(f)).collect();
        f(self, folded)
    }

    /// Pre-order visitor.
    pub fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&Expr),
    {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Rebuilds the node with every child replaced by `f(child)`; leaves are cloned.
    pub fn map_children<F>(&self, mut f: F) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
    {
        match self {
            Expr::Const(_) | Expr::Var(_) => self.clone(),
            Expr::Unary(op, operand) => Expr::unary(*op, f(operand)),
            Expr::Binary(op, lhs, rhs) => Expr::binary(*op, f(lhs), f(rhs)),
        }
    }

    //___________________________________QUERIES____________________________________

    /// true if no constant of the tree is infinite or NaN
    pub fn has_finite_constants(&self) -> bool {
        self.fold(&mut |node, children: Vec<bool>| {
            children.into_iter().all(|c| c) && !matches!(node, Expr::Const(n) if !n.is_finite())
        })
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Expr::Const(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Expr::Const(_))
    }

    /// Checks if expression is exactly the constant zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(n) if n.is_one())
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Unary(_, operand) => operand.contains_variable(var_name),
            Expr::Binary(_, lhs, rhs) => {
                lhs.contains_variable(var_name) || rhs.contains_variable(var_name)
            }
        }
    }

    /// Sorted, deduplicated names of all variables in the tree.
    pub fn variables(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.visit(&mut |node| {
            if let Expr::Var(name) = node {
                names.insert(name.clone());
            }
        });
        names.into_iter().collect()
    }

    pub fn node_count(&self) -> usize {
        self.fold(&mut |_, children: Vec<usize>| 1 + children.iter().sum::<usize>())
    }

    pub fn depth(&self) -> usize {
        self.fold(&mut |_, children: Vec<usize>| 1 + children.into_iter().max().unwrap_or(0))
    }

    //___________________________________SUBSTITUTION____________________________________

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, replacement: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => replacement.clone(),
            _ => self.map_children(|child| child.substitute_variable(var, replacement)),
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        self.substitute_variable(var, &Expr::float(value))
    }

    /// Renames a variable throughout the expression.
    pub fn rename_variable(&self, old_var: &str, new_var: &str) -> Expr {
        self.substitute_variable(old_var, &Expr::var(new_var))
    }
}
