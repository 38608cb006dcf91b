//! Polynomial expansion: distributes products over sums and multiplies out small integer
//! powers of sums, `(x + 1)^2*(x - 1)` → `x^3 + x^2 - x - 1`.
use crate::symbolic::symbolic_engine::{BinaryOp, Expr};
use crate::symbolic::symbolic_simplify::{collect_product, collect_sum, flatten_sum};

/// powers of sums above this are left unexpanded
const MAX_EXPANDED_POWER: i64 = 8;

impl Expr {
    /// Expands products and integer powers of sums, then simplifies.
    pub fn expand(&self) -> Expr {
        expand_node(&self.simplify()).simplify()
    }
}

fn terms_of(expr: &Expr) -> Vec<Expr> {
    let mut terms = Vec::new();
    flatten_sum(expr.clone(), &mut terms);
    terms
}

fn distribute(lhs: &Expr, rhs: &Expr) -> Expr {
    let right_terms = terms_of(rhs);
    let products = terms_of(lhs)
        .into_iter()
        .flat_map(|a| {
            right_terms
                .iter()
                .map(move |b| collect_product(vec![a.clone(), b.clone()]))
        })
        .collect();
    collect_sum(products)
}

fn expand_node(expr: &Expr) -> Expr {
    match expr {
        Expr::Binary(BinaryOp::Add, lhs, rhs) => collect_sum(vec![expand_node(lhs), expand_node(rhs)]),
        Expr::Binary(BinaryOp::Mul, lhs, rhs) => distribute(&expand_node(lhs), &expand_node(rhs)),
        Expr::Binary(BinaryOp::Pow, base, exponent) => {
            let power = exponent.as_number().and_then(|n| n.as_integer());
            match power {
                Some(k) if (2..=MAX_EXPANDED_POWER).contains(&k) => {
                    let base = expand_node(base);
                    if terms_of(&base).len() > 1 {
                        (1..k).fold(base.clone(), |acc, _| distribute(&acc, &base))
                    } else {
                        base.pow(exponent.as_ref().clone())
                    }
                }
                _ => expr.map_children(expand_node),
            }
        }
        _ => expr.map_children(expand_node),
    }
}
