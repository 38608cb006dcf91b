//! Turns a string like `"3*x^2 + 2*x + cos(x)^2"` into an [`Expr`].
//!
//! The grammar, from loosest to tightest binding:
//! ```text
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := unary (('*' | '/') unary)*
//! unary          := ('-' | '+') unary | power
//! power          := atom ('^' unary)?              right-associative
//! atom           := number | name '(' args ')' | name | '(' additive ')' | '|' additive '|'
//! ```
//! so `-x^2` is `-(x^2)` and `2^-1` is `2^(-1)`. Integers and plain decimals become exact
//! rationals (`0.25` is `1/4`); numbers with an exponent (`1e-3`) go through `f64`. Function names
//! are resolved by [`Expr::call`], an unknown name is `UnsupportedOperator`.
//!
//! Parsing happens in two stages: nom builds a small syntax tree, which is then lowered into
//! an `Expr`, so that operator resolution errors keep their own error kind.
use crate::symbolic::number::Number;
use crate::symbolic::symbolic_engine::{BinaryOp, Expr, UnaryOp};
use crate::symbolic::symbolic_error::{SymbolicError, SymbolicResult};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, one_of},
    combinator::{map, opt, recognize, verify},
    multi::{many0, separated_list0},
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded},
};

#[derive(Debug, Clone, PartialEq)]
enum Syntax {
    Number(Number),
    Name(String),
    Call(String, Vec<Syntax>),
    Negate(Box<Syntax>),
    Abs(Box<Syntax>),
    Binary(BinaryOp, Box<Syntax>, Box<Syntax>),
}

impl Syntax {
    fn binary(op: char, lhs: Syntax, rhs: Syntax) -> Syntax {
        let op = match op {
            '+' => BinaryOp::Add,
            '-' => BinaryOp::Sub,
            '*' => BinaryOp::Mul,
            '/' => BinaryOp::Div,
            _ => BinaryOp::Pow,
        };
        Syntax::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    fn lower(self) -> SymbolicResult<Expr> {
        Ok(match self {
            Syntax::Number(n) if !n.is_finite() => {
                return Err(SymbolicError::Parse {
                    input: n.to_string(),
                    msg: "numeric literal is out of range".to_string(),
                });
            }
            Syntax::Number(n) => Expr::Const(n),
            Syntax::Name(name) => Expr::Var(name),
            Syntax::Call(name, args) => {
                let children = args
                    .into_iter()
                    .map(Syntax::lower)
                    .collect::<SymbolicResult<Vec<Expr>>>()?;
                Expr::call(&name, children)?
            }
            Syntax::Negate(operand) => Expr::unary(UnaryOp::Neg, operand.lower()?),
            Syntax::Abs(operand) => Expr::unary(UnaryOp::Abs, operand.lower()?),
            Syntax::Binary(op, lhs, rhs) => Expr::binary(op, lhs.lower()?, rhs.lower()?),
        })
    }
}

/// inner parser surrounded by optional whitespace
fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Exact value of a decimal literal, a float if it does not fit into `i64`.
fn number_value(text: &str) -> Number {
    if text.contains(['e', 'E']) {
        return Number::from_f64(text.parse::<f64>().unwrap_or(f64::NAN));
    }
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let digits = format!("{}{}", whole, fraction);
    let exact = digits.parse::<i64>().ok().and_then(|numer| {
        let denom = 10_i64.checked_pow(u32::try_from(fraction.len()).ok()?)?;
        Number::rational(numer, denom)
    });
    exact.unwrap_or_else(|| Number::from_f64(text.parse::<f64>().unwrap_or(f64::NAN)))
}

/// Unsigned literal: `12`, `0.25`, `.5`, `3.`, `1e-3`; the sign belongs to `unary`.
fn number(input: &str) -> IResult<&str, Syntax> {
    let literal = verify(recognize_float, |text: &str| !text.starts_with(['+', '-']));
    map(literal, |text: &str| Syntax::Number(number_value(text))).parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_"), tag(".")))),
    ))
    .parse(input)
}

fn name_or_call(input: &str) -> IResult<&str, Syntax> {
    let arguments = delimited(ws(char('(')), separated_list0(ws(char(',')), additive), ws(char(')')));
    map(pair(identifier, opt(arguments)), |(name, args)| match args {
        Some(args) => Syntax::Call(name.to_string(), args),
        None => Syntax::Name(name.to_string()),
    })
    .parse(input)
}

fn atom(input: &str) -> IResult<&str, Syntax> {
    ws(alt((
        number,
        name_or_call,
        delimited(char('('), additive, char(')')),
        map(delimited(char('|'), additive, char('|')), |inner| {
            Syntax::Abs(Box::new(inner))
        }),
    )))
    .parse(input)
}

fn power(input: &str) -> IResult<&str, Syntax> {
    let (input, base) = atom(input)?;
    let (input, exponent) = opt(preceded(ws(char('^')), unary)).parse(input)?;
    Ok(match exponent {
        Some(exponent) => (input, Syntax::binary('^', base, exponent)),
        None => (input, base),
    })
}

fn unary(input: &str) -> IResult<&str, Syntax> {
    alt((
        map(preceded(ws(char('-')), unary), |operand| {
            Syntax::Negate(Box::new(operand))
        }),
        preceded(ws(char('+')), unary),
        power,
    ))
    .parse(input)
}

fn multiplicative(input: &str) -> IResult<&str, Syntax> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(pair(ws(one_of("*/")), unary)).parse(input)?;
    let folded = rest
        .into_iter()
        .fold(first, |acc, (op, rhs)| Syntax::binary(op, acc, rhs));
    Ok((input, folded))
}

fn additive(input: &str) -> IResult<&str, Syntax> {
    let (input, first) = multiplicative(input)?;
    let (input, rest) = many0(pair(ws(one_of("+-")), multiplicative)).parse(input)?;
    let folded = rest
        .into_iter()
        .fold(first, |acc, (op, rhs)| Syntax::binary(op, acc, rhs));
    Ok((input, folded))
}

impl Expr {
    /// Parses an infix expression.
    ///
    /// # Examples
    /// ```
    /// use RustedCAS::symbolic::symbolic_engine::Expr;
    /// let e = Expr::parse_expression("3*x^2 + 2*x + cos(x)^2 + sin(x)^2").unwrap();
    /// assert_eq!(e.simplify().to_string(), "3*x^2 + 2*x + 1");
    /// ```
    ///
    /// # Errors
    /// `Parse` for malformed text or trailing input, `UnsupportedOperator` for an unknown
    /// function name, `MalformedExpression` for a call with the wrong number of arguments.
    pub fn parse_expression(text: &str) -> SymbolicResult<Expr> {
        let parse_error = |msg: String| SymbolicError::Parse {
            input: text.to_string(),
            msg,
        };
        let (rest, syntax) = additive(text).map_err(|e| parse_error(e.to_string()))?;
        if !rest.trim().is_empty() {
            return Err(parse_error(format!("unexpected input at '{}'", rest.trim())));
        }
        syntax.lower()
    }
}
