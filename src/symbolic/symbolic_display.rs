//! # Expression printer
//!
//! Deterministic infix rendering of [`Expr`] with minimal parenthesization. Precedence, from
//! loosest to tightest binding: `Add/Sub` < `Mul/Div` < unary minus < `Pow` < atoms and
//! function calls. `Pow` is right-associative, so `x^y^z` means `x^(y^z)`.
//!
//! Products are printed the way a textbook writes them:
//! - a leading coefficient of `-1` becomes a sign: `-1*x` prints as `-x`;
//! - a term with a negative coefficient inside a sum is printed as a subtraction: `x - 2*y`;
//! - factors with a negative constant exponent and the denominator of a rational coefficient
//!   move below a fraction bar: `1/3*x^3` prints as `x^3/3`, `x^-1` as `1/x`;
//! - `u^(1/2)` prints as `sqrt(u)`, `ln(abs(u))` as `ln|u|`.
//!
//! [`Expr::to_bracketed_string`] fully brackets the operands of the root operator; combined
//! functions are displayed this way until they are transformed.
use crate::symbolic::number::Number;
use crate::symbolic::symbolic_engine::{BinaryOp, Expr, UnaryOp};
use std::fmt;

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_NEG: u8 = 3;
const PREC_POW: u8 = 4;
const PREC_ATOM: u8 = 5;

struct Rendered {
    text: String,
    prec: u8,
}

impl Rendered {
    fn new(text: String, prec: u8) -> Self {
        Rendered { text, prec }
    }

    fn starts_negative(&self) -> bool {
        self.text.starts_with('-')
    }

    fn wrapped_if(self, cond: bool) -> String {
        if cond {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

fn flatten_product<'a>(expr: &'a Expr, factors: &mut Vec<&'a Expr>) {
    match expr {
        Expr::Binary(BinaryOp::Mul, lhs, rhs) => {
            flatten_product(lhs, factors);
            flatten_product(rhs, factors);
        }
        _ => factors.push(expr),
    }
}

fn rebuild_product(factors: Vec<Expr>) -> Expr {
    factors
        .into_iter()
        .reduce(|acc, factor| acc * factor)
        .unwrap_or_else(Expr::one)
}

/// true if the term prints with a leading minus sign that a sum can absorb as `-`
fn is_negative_term(expr: &Expr) -> bool {
    match expr {
        Expr::Const(n) => n.is_negative(),
        Expr::Unary(UnaryOp::Neg, _) => true,
        Expr::Binary(BinaryOp::Mul, ..) => {
            let mut factors = Vec::new();
            flatten_product(expr, &mut factors);
            matches!(factors.first(), Some(Expr::Const(n)) if n.is_negative())
        }
        Expr::Binary(BinaryOp::Div, lhs, _) => is_negative_term(lhs),
        _ => false,
    }
}

fn negated_term(expr: &Expr) -> Expr {
    match expr {
        Expr::Const(n) => Expr::Const(n.neg()),
        Expr::Unary(UnaryOp::Neg, operand) => operand.as_ref().clone(),
        Expr::Binary(BinaryOp::Mul, ..) => {
            let mut factors = Vec::new();
            flatten_product(expr, &mut factors);
            let mut rebuilt: Vec<Expr> = factors.into_iter().cloned().collect();
            if let Some(Expr::Const(n)) = rebuilt.first() {
                let flipped = n.neg();
                if flipped.is_one() && rebuilt.len() > 1 {
                    rebuilt.remove(0);
                } else {
                    rebuilt[0] = Expr::Const(flipped);
                }
            }
            rebuild_product(rebuilt)
        }
        Expr::Binary(BinaryOp::Div, lhs, rhs) => {
            Expr::binary(BinaryOp::Div, negated_term(lhs), rhs.as_ref().clone())
        }
        _ => -expr.clone(),
    }
}

fn render_number(n: &Number) -> Rendered {
    let prec = if n.is_negative() {
        PREC_NEG
    } else if n.is_exact() && n.as_integer().is_none() {
        PREC_MUL
    } else {
        PREC_ATOM
    };
    Rendered::new(n.to_string(), prec)
}

/// `base^exponent` for a non-negative constant exponent
fn render_power(base: &Expr, exponent: &Number) -> Rendered {
    if exponent.is_one() {
        return render(base);
    }
    if *exponent == Number::half() {
        return Rendered::new(format!("sqrt({})", render(base).text), PREC_ATOM);
    }
    let base = render(base);
    let wrap = base.prec <= PREC_POW || base.starts_negative();
    let exponent = render_number(exponent);
    let exponent_wrap = exponent.prec < PREC_POW;
    Rendered::new(
        format!("{}^{}", base.wrapped_if(wrap), exponent.wrapped_if(exponent_wrap)),
        PREC_POW,
    )
}

fn join_factors(items: Vec<Rendered>) -> String {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let wrap = item.prec <= PREC_ADD || (i > 0 && item.starts_negative());
            item.wrapped_if(wrap)
        })
        .collect::<Vec<_>>()
        .join("*")
}

fn render_product(expr: &Expr) -> Rendered {
    let mut factors = Vec::new();
    flatten_product(expr, &mut factors);
    let (coefficient, rest) = match factors.split_first() {
        Some((Expr::Const(n), rest)) if !rest.is_empty() => (*n, rest.to_vec()),
        _ => (Number::one(), factors),
    };

    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for factor in rest {
        match factor {
            Expr::Binary(BinaryOp::Pow, base, exponent) => match exponent.as_ref() {
                Expr::Const(n) if n.is_negative() => denominator.push(render_power(base, &n.neg())),
                _ => numerator.push(render(factor)),
            },
            _ => numerator.push(render(factor)),
        }
    }

    let negative = coefficient.is_negative();
    let magnitude = coefficient.abs();
    let (coef_numer, coef_denom) = match magnitude {
        Number::Rational(r) => (Number::int(*r.numer()), Number::int(*r.denom())),
        Number::Float(_) => (magnitude, Number::one()),
    };
    if !coef_denom.is_one() {
        denominator.insert(0, render_number(&coef_denom));
    }
    if !coef_numer.is_one() || numerator.is_empty() {
        numerator.insert(0, render_number(&coef_numer));
    }

    let sign = if negative { "-" } else { "" };
    if negative && numerator.first().is_some_and(Rendered::starts_negative) {
        let first = numerator.remove(0);
        numerator.insert(0, Rendered::new(first.wrapped_if(true), PREC_ATOM));
    }
    if denominator.is_empty() {
        return Rendered::new(format!("{}{}", sign, join_factors(numerator)), PREC_MUL);
    }
    let numerator_text = if numerator.len() == 1 {
        let item = numerator.remove(0);
        let wrap = item.prec <= PREC_ADD;
        item.wrapped_if(wrap)
    } else {
        join_factors(numerator)
    };
    let denominator_text = if denominator.len() == 1 {
        let item = denominator.remove(0);
        let wrap = item.prec <= PREC_MUL;
        item.wrapped_if(wrap)
    } else {
        format!("({})", join_factors(denominator))
    };
    Rendered::new(
        format!("{}{}/{}", sign, numerator_text, denominator_text),
        PREC_MUL,
    )
}

fn render(expr: &Expr) -> Rendered {
    match expr {
        Expr::Const(n) => render_number(n),
        Expr::Var(name) => Rendered::new(name.clone(), PREC_ATOM),
        Expr::Unary(UnaryOp::Neg, operand) => {
            let inner = render(operand);
            let wrap = inner.prec < PREC_MUL || inner.starts_negative();
            Rendered::new(format!("-{}", inner.wrapped_if(wrap)), PREC_NEG)
        }
        Expr::Unary(UnaryOp::Abs, operand) => {
            Rendered::new(format!("|{}|", render(operand).text), PREC_ATOM)
        }
        Expr::Unary(UnaryOp::Ln, operand) => match operand.as_ref() {
            Expr::Unary(UnaryOp::Abs, inner) => {
                Rendered::new(format!("ln|{}|", render(inner).text), PREC_ATOM)
            }
            _ => Rendered::new(format!("ln({})", render(operand).text), PREC_ATOM),
        },
        Expr::Unary(op, operand) => {
            Rendered::new(format!("{}({})", op, render(operand).text), PREC_ATOM)
        }
        Expr::Binary(BinaryOp::Add, lhs, rhs) => {
            let left = render(lhs).text;
            if is_negative_term(rhs) {
                let right = render(&negated_term(rhs));
                let wrap = right.prec <= PREC_ADD;
                Rendered::new(format!("{} - {}", left, right.wrapped_if(wrap)), PREC_ADD)
            } else {
                let right = render(rhs);
                let wrap = right.starts_negative();
                Rendered::new(format!("{} + {}", left, right.wrapped_if(wrap)), PREC_ADD)
            }
        }
        Expr::Binary(BinaryOp::Sub, lhs, rhs) => {
            let left = render(lhs).text;
            let right = render(rhs);
            let wrap = right.prec <= PREC_ADD || right.starts_negative();
            Rendered::new(format!("{} - {}", left, right.wrapped_if(wrap)), PREC_ADD)
        }
        Expr::Binary(BinaryOp::Mul, ..) => render_product(expr),
        Expr::Binary(BinaryOp::Div, lhs, rhs) => {
            let left = render(lhs);
            let left_wrap = left.prec < PREC_MUL;
            let right = render(rhs);
            let right_wrap = right.prec <= PREC_MUL || right.starts_negative();
            Rendered::new(
                format!("{}/{}", left.wrapped_if(left_wrap), right.wrapped_if(right_wrap)),
                PREC_MUL,
            )
        }
        Expr::Binary(BinaryOp::Pow, base, exponent) => match exponent.as_ref() {
            Expr::Const(n) if n.is_negative() => {
                let denominator = render_power(base, &n.neg());
                let wrap = denominator.prec <= PREC_MUL;
                Rendered::new(format!("1/{}", denominator.wrapped_if(wrap)), PREC_MUL)
            }
            Expr::Const(n) => render_power(base, n),
            _ => {
                let base = render(base);
                let base_wrap = base.prec <= PREC_POW || base.starts_negative();
                let exponent = render(exponent);
                let exponent_wrap = exponent.prec < PREC_POW || exponent.starts_negative();
                Rendered::new(
                    format!(
                        "{}^{}",
                        base.wrapped_if(base_wrap),
                        exponent.wrapped_if(exponent_wrap)
                    ),
                    PREC_POW,
                )
            }
        },
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(self).text)
    }
}

impl Expr {
    /// Renders the root operator with each operand in its own brackets: `(2*x + 10) + (y + z)`.
    pub fn to_bracketed_string(&self) -> String {
        match self {
            Expr::Binary(op, lhs, rhs) => format!("({}) {} ({})", lhs, op, rhs),
            Expr::Unary(UnaryOp::Neg, operand) => format!("-({})", operand),
            _ => self.to_string(),
        }
    }
}
