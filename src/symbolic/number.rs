//! Numeric payload of `Expr::Const`.
//!
//! Constants are kept as exact `i64` rationals whenever possible; arithmetic between two
//! rationals is exact (checked, an overflow degrades to `f64`), anything involving a float is
//! carried out in `f64`. Integral floats are normalised to rationals on construction, so `2.0`
//! and `2` are the same constant.
use num::rational::Ratio;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;

/// largest magnitude an integral f64 may have to be stored exactly as a rational
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
/// largest integer exponent folded exactly, larger powers are left symbolic
const MAX_EXACT_EXPONENT: i64 = 64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Rational(Ratio<i64>),
    Float(f64),
}

impl Number {
    pub fn int(n: i64) -> Number {
        Number::Rational(Ratio::from_integer(n))
    }

    /// `None` when the denominator is zero
    pub fn rational(numer: i64, denom: i64) -> Option<Number> {
        if denom == 0 {
            return None;
        }
        Some(Number::Rational(Ratio::new(numer, denom)))
    }

    pub fn from_f64(value: f64) -> Number {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < EXACT_INTEGER_LIMIT {
            Number::int(value as i64)
        } else {
            Number::Float(value)
        }
    }

    pub fn zero() -> Number {
        Number::int(0)
    }

    pub fn one() -> Number {
        Number::int(1)
    }

    pub fn half() -> Number {
        Number::Rational(Ratio::new(1, 2))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Rational(r) => *r.numer() as f64 / *r.denom() as f64,
            Number::Float(v) => *v,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.to_f64() == 0.0
    }

    pub fn is_one(&self) -> bool {
        self.to_f64() == 1.0
    }

    pub fn is_negative(&self) -> bool {
        self.to_f64() < 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.to_f64().is_finite()
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Number::Rational(_))
    }

    /// the integer value if the number is an exact integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Number::Rational(r) if r.is_integer() => Some(*r.numer()),
            _ => None,
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Rational(r) => match Ratio::zero().checked_sub(r) {
                Some(n) => Number::Rational(n),
                None => Number::Float(-self.to_f64()),
            },
            Number::Float(v) => Number::Float(-v),
        }
    }

    pub fn abs(&self) -> Number {
        if self.is_negative() { self.neg() } else { *self }
    }

    pub fn add(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => match a.checked_add(b) {
                Some(r) => Number::Rational(r),
                None => Number::from_f64(self.to_f64() + other.to_f64()),
            },
            _ => Number::from_f64(self.to_f64() + other.to_f64()),
        }
    }

    pub fn sub(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => match a.checked_sub(b) {
                Some(r) => Number::Rational(r),
                None => Number::from_f64(self.to_f64() - other.to_f64()),
            },
            _ => Number::from_f64(self.to_f64() - other.to_f64()),
        }
    }

    pub fn mul(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => match a.checked_mul(b) {
                Some(r) => Number::Rational(r),
                None => Number::from_f64(self.to_f64() * other.to_f64()),
            },
            _ => Number::from_f64(self.to_f64() * other.to_f64()),
        }
    }

    /// `None` for a division by zero
    pub fn div(&self, other: &Number) -> Option<Number> {
        if other.is_zero() {
            return None;
        }
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => match a.checked_div(b) {
                Some(r) => Some(Number::Rational(r)),
                None => Some(Number::from_f64(self.to_f64() / other.to_f64())),
            },
            _ => Some(Number::from_f64(self.to_f64() / other.to_f64())),
        }
    }

    /// Folds `self ^ exponent` when the result is a real number that can be represented
    /// without losing information: exact for rational bases with integer exponents and for
    /// perfect-square roots, in `f64` when either side already is a float.
    /// Returns `None` when the power must stay symbolic (`2^(1/2)`) or is undefined
    /// (`0^-1`, `(-8)^(1/3)` in the reals as a float power).
    pub fn pow(&self, exponent: &Number) -> Option<Number> {
        if self.is_zero() && (exponent.is_negative() || exponent.is_zero()) {
            return if exponent.is_zero() { Some(Number::one()) } else { None };
        }
        match (self, exponent) {
            (Number::Rational(base), Number::Rational(exp)) => {
                if exp.is_integer() {
                    let n = *exp.numer();
                    if n.abs() > MAX_EXACT_EXPONENT {
                        return None;
                    }
                    let mut acc = Ratio::<i64>::one();
                    for _ in 0..n.abs() {
                        acc = acc.checked_mul(base)?;
                    }
                    if n < 0 {
                        acc = Ratio::<i64>::one().checked_div(&acc)?;
                    }
                    Some(Number::Rational(acc))
                } else if *exp.denom() == 2 && !base.is_negative() {
                    let numer = exact_sqrt(*base.numer())?;
                    let denom = exact_sqrt(*base.denom())?;
                    Number::Rational(Ratio::new(numer, denom))
                        .pow(&Number::int(*exp.numer()))
                } else {
                    None
                }
            }
            _ => {
                let base = self.to_f64();
                let exp = exponent.to_f64();
                if base < 0.0 && exp.fract() != 0.0 {
                    return None;
                }
                let value = base.powf(exp);
                if value.is_finite() {
                    Some(Number::from_f64(value))
                } else {
                    None
                }
            }
        }
    }

    /// Total order used by the canonical ordering of expressions: by value, exact before float.
    pub fn total_cmp(&self, other: &Number) -> Ordering {
        self.to_f64().total_cmp(&other.to_f64()).then_with(|| {
            match (self, other) {
                (Number::Rational(_), Number::Float(_)) => Ordering::Less,
                (Number::Float(_), Number::Rational(_)) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        })
    }
}

fn exact_sqrt(n: i64) -> Option<i64> {
    if n < 0 {
        return None;
    }
    let root = (n as f64).sqrt().round() as i64;
    (root.checked_mul(root)? == n).then_some(root)
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Rational(r) if r.is_integer() => write!(f, "{}", r.numer()),
            Number::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_floats_become_exact() {
        assert_eq!(Number::from_f64(3.0), Number::int(3));
        assert!(matches!(Number::from_f64(0.25), Number::Float(_)));
    }

    #[test]
    fn test_exact_rational_arithmetic() {
        let third = Number::rational(1, 3).unwrap();
        let sum = third.add(&third).add(&third);
        assert_eq!(sum, Number::one());
        assert_eq!(Number::int(2).div(&Number::int(6)), Number::rational(1, 3));
        assert_eq!(Number::int(5).div(&Number::zero()), None);
    }

    #[test]
    fn test_overflow_degrades_to_float() {
        let big = Number::int(i64::MAX);
        let product = big.mul(&Number::int(4));
        assert!(!product.is_exact());
        assert!((product.to_f64() - 4.0 * i64::MAX as f64).abs() < 1e6);
    }

    #[test]
    fn test_pow_folding() {
        assert_eq!(Number::int(2).pow(&Number::int(10)), Some(Number::int(1024)));
        assert_eq!(Number::int(2).pow(&Number::int(-2)), Number::rational(1, 4));
        let half = Number::rational(1, 2).unwrap();
        assert_eq!(Number::rational(9, 4).unwrap().pow(&half), Number::rational(3, 2));
        // sqrt(2) stays symbolic
        assert_eq!(Number::int(2).pow(&half), None);
        assert_eq!(Number::zero().pow(&Number::int(-1)), None);
        assert_eq!(Number::Float(-2.5).pow(&Number::Float(0.5)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Number::rational(-2, 6).unwrap().to_string(), "-1/3");
        assert_eq!(Number::int(42).to_string(), "42");
        assert_eq!(Number::Float(0.125).to_string(), "0.125");
    }
}
