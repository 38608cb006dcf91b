#![allow(non_snake_case)]
/// exact rationals with a floating-point fallback, the constants of every tree
pub mod number;
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedCAS::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("x^2 + log(x + y)").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// assert_eq!(parsed_expression.variables(), vec!["x", "y"]);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) builds symbolic expressions from constants, variables and operators
/// 2) simplifies, differentiates and integrates them
/// 3) turns a symbolic expression into a string expression for printing and control results
///# Example#
/// ```
/// use RustedCAS::symbolic::symbolic_engine::Expr;
/// let x = Expr::var("x");
/// let f = Expr::int(3) * x.clone().pow(Expr::int(2)) + Expr::int(2) * x.clone();
/// // differentiate with respect to x
/// let df_dx = f.diff("x").simplify();
/// assert_eq!(df_dx.to_string(), "6*x + 2");
/// // antiderivative, None if there is no closed form
/// let big_f = f.integrate_indefinite("x").unwrap();
/// assert_eq!(big_f.to_string(), "x^3 + x^2");
/// // evaluate
/// assert_eq!(f.evaluate_at("x", 5.0).unwrap(), 85.0);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
pub mod symbolic_display;
pub mod symbolic_error;
pub mod symbolic_evaluate;
pub mod symbolic_expand;
pub mod symbolic_ordering;
pub mod symbolic_simplify;
///________________________________________________________________________________________________________________________________________________
///
/// indefinite and definite integrals
/// Example#
/// ```
/// use RustedCAS::symbolic::symbolic_engine::Expr;
/// use RustedCAS::symbolic::symbolic_integration::IntegrationMethod;
/// let gaussian = (-Expr::var("x").pow(Expr::int(2))).exp();
/// let integral = gaussian.integrate_definite("x", 0.0, 1.0).unwrap();
/// assert_eq!(integral.method, IntegrationMethod::AdaptiveSimpson);
/// assert!((integral.value - 0.746824132812427).abs() < 1e-8);
/// ```
pub mod symbolic_integration;
pub mod symbolic_quadrature;
///________________________________________________________________________________________________________________________________________________
///
/// scalar functions of named parameters and their arithmetic combination
pub mod symbolic_function;
mod symbolic_engine_tests;
