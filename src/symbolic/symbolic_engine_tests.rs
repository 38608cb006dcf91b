//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::Utils::config::EngineConfig;
    use crate::symbolic::symbolic_engine::{BinaryOp, Expr, Operator, UnaryOp};
    use crate::symbolic::symbolic_error::SymbolicError;
    use crate::symbolic::symbolic_evaluate::VariableBinding;
    use crate::symbolic::symbolic_function::{CombineOp, Function, build_function, combine};
    use crate::symbolic::symbolic_integration::IntegrationMethod;
    use crate::symbolic::symbolic_quadrature::quad_gauss_legendre;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn x() -> Expr {
        Expr::var("x")
    }

    /// f(x) = 3x^2 + 2x + cos(x)^2 + sin(x)^2
    fn f() -> Function {
        let body = Expr::int(3) * x().pow(Expr::int(2))
            + Expr::int(2) * x()
            + x().cos().pow(Expr::int(2))
            + x().sin().pow(Expr::int(2));
        build_function(&["x"], body).unwrap()
    }

    /// g(x) = 2x + 10
    fn g() -> Function {
        build_function(&["x"], Expr::int(2) * x() + Expr::int(10)).unwrap()
    }

    /// h(y, z) = y + z
    fn h() -> Function {
        build_function(&["y", "z"], Expr::var("y") + Expr::var("z")).unwrap()
    }

    //___________________________________SCENARIOS____________________________________

    #[test]
    fn test_scenario_simplify_trig_identity() {
        assert_eq!(f().simplify().to_display_string(), "3*x^2 + 2*x + 1");
    }

    #[test]
    fn test_scenario_linear_function() {
        assert_eq!(g().differentiate(None).unwrap().to_display_string(), "2");
        let integral = g().integrate_definite_detailed(0.0, 2.0, None).unwrap();
        assert_relative_eq!(integral.value, 24.0, epsilon = 1e-12);
        assert_eq!(integral.method, IntegrationMethod::ClosedForm);
    }

    #[test]
    fn test_scenario_combined_function() {
        let combined = combine(CombineOp::Add, &g(), &h());
        assert_eq!(combined.params(), &["x", "y", "z"]);
        assert_eq!(combined.to_display_string(), "(2*x + 10) + (y + z)");
        let simplified = combined.simplify();
        assert_eq!(simplified.to_display_string(), "2*x + y + z + 10");
        assert_relative_eq!(simplified.evaluate(&[1.0, 2.0, 3.0]).unwrap(), 17.0);
    }

    #[test]
    fn test_scenario_evaluate() {
        assert_relative_eq!(f().evaluate(&[5.0]).unwrap(), 86.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scenario_elementary_integrals() {
        let inverse = build_function(&["x"], Expr::one() / x()).unwrap();
        let antiderivative = inverse.integrate_indefinite(None).unwrap().unwrap();
        assert_eq!(antiderivative.to_display_string(), "ln|x|");
        let square = build_function(&["x"], x().pow(Expr::int(2))).unwrap();
        let antiderivative = square.integrate_indefinite(None).unwrap().unwrap();
        assert_eq!(antiderivative.to_display_string(), "x^3/3");
    }

    #[test]
    fn test_demo_integrals_of_f() {
        let antiderivative = f().integrate_indefinite(Some("x")).unwrap().unwrap();
        assert_eq!(antiderivative.to_display_string(), "x^3 + x^2 + x");
        assert_relative_eq!(f().integrate_definite(0.0, 2.0, None).unwrap(), 14.0, epsilon = 1e-12);
    }

    #[test]
    fn test_demo_products_and_quotients() {
        let product = f().times(&g());
        assert_eq!(
            product.to_display_string(),
            "(3*x^2 + 2*x + cos(x)^2 + sin(x)^2) * (2*x + 10)"
        );
        assert_relative_eq!(product.evaluate(&[1.0]).unwrap(), 6.0 * 12.0, epsilon = 1e-12);
        let quotient = f().over(&g());
        assert_eq!(
            quotient.to_display_string(),
            "(3*x^2 + 2*x + cos(x)^2 + sin(x)^2) / (2*x + 10)"
        );
        assert_relative_eq!(quotient.evaluate(&[1.0]).unwrap(), 0.5, epsilon = 1e-12);
        assert_eq!(quotient.simplify().to_display_string(), "(3*x^2 + 2*x + 1)/(2*x + 10)");
    }

    #[test]
    fn test_text_and_graph_builders_agree() {
        let parsed = Function::parse(&["x"], "3*x^2 + 2*x + cos(x)^2 + sin(x)^2").unwrap();
        assert_eq!(parsed, f());
    }

    //___________________________________ERRORS____________________________________

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            Expr::apply(Operator::Unary(UnaryOp::Sin), vec![x(), x()]),
            Err(SymbolicError::MalformedExpression(_))
        ));
        assert!(matches!(
            Expr::apply(Operator::Binary(BinaryOp::Pow), vec![x()]),
            Err(SymbolicError::MalformedExpression(_))
        ));
        assert!(matches!(
            Expr::call("gamma", vec![x()]),
            Err(SymbolicError::UnsupportedOperator(_))
        ));
        assert_eq!(Expr::call("Math.Pow", vec![x(), Expr::int(2)]).unwrap(), x().pow(Expr::int(2)));
    }

    #[test]
    fn test_evaluation_errors() {
        let e = x().ln() + Expr::var("y");
        assert!(matches!(
            e.evaluate_at("x", 1.0),
            Err(SymbolicError::UnboundVariable(name)) if name == "y"
        ));
        let log = build_function(&["x"], x().ln()).unwrap();
        assert!(matches!(log.evaluate(&[0.0]), Err(SymbolicError::DomainError { .. })));
        let root = build_function(&["x"], x().sqrt()).unwrap();
        assert!(matches!(root.evaluate(&[-4.0]), Err(SymbolicError::DomainError { .. })));
        let inverse = build_function(&["x"], Expr::one() / x()).unwrap();
        assert!(matches!(inverse.evaluate(&[0.0]), Err(SymbolicError::DomainError { .. })));
        let arcsine = build_function(&["x"], x().asin()).unwrap();
        assert!(matches!(arcsine.evaluate(&[1.5]), Err(SymbolicError::DomainError { .. })));
        assert!(matches!(g().evaluate(&[]), Err(SymbolicError::ArityMismatch { .. })));
    }

    //___________________________________PROPERTIES____________________________________

    const SAMPLE_POINTS: [f64; 4] = [-0.9, -0.3, 0.4, 1.1];

    /// random tree over operators that are defined on the whole real line
    fn random_expr(rng: &mut StdRng, depth: usize) -> Expr {
        if depth == 0 || rng.random_bool(0.25) {
            return if rng.random_bool(0.6) {
                x()
            } else {
                Expr::int(rng.random_range(1..=3))
            };
        }
        let d = depth - 1;
        match rng.random_range(0..8) {
            0 => random_expr(rng, d) + random_expr(rng, d),
            1 => random_expr(rng, d) - random_expr(rng, d),
            2 => random_expr(rng, d) * random_expr(rng, d),
            3 => random_expr(rng, d).pow(Expr::int(rng.random_range(2..=3))),
            4 => random_expr(rng, d).sin(),
            5 => random_expr(rng, d).cos(),
            6 => random_expr(rng, d).atan(),
            _ => -random_expr(rng, d),
        }
    }

    fn random_exprs(seed: u64, count: usize) -> Vec<Expr> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count).map(|_| random_expr(&mut rng, 3)).collect()
    }

    #[test]
    fn test_simplify_is_idempotent() {
        for e in random_exprs(7, 200) {
            let once = e.simplify();
            assert_eq!(once.simplify(), once, "not idempotent on {}", e);
        }
    }

    #[test]
    fn test_simplify_preserves_value() {
        for e in random_exprs(11, 200) {
            let simplified = e.simplify();
            for at in SAMPLE_POINTS {
                let expected = e.evaluate_at("x", at).unwrap();
                let actual = simplified.evaluate_at("x", at).unwrap();
                assert_relative_eq!(actual, expected, max_relative = 1e-9, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_derivative_matches_central_difference() {
        let h = 1e-5;
        for e in random_exprs(23, 200) {
            let derivative = e.diff("x").simplify();
            for at in SAMPLE_POINTS {
                let numeric =
                    (e.evaluate_at("x", at + h).unwrap() - e.evaluate_at("x", at - h).unwrap()) / (2.0 * h);
                let analytic = derivative.evaluate_at("x", at).unwrap();
                assert_relative_eq!(analytic, numeric, max_relative = 1e-4, epsilon = 1e-5);
            }
        }
    }

    /// random tree over every operator, in `x` and `y`; may be undefined at some points.
    /// `smooth` keeps the arguments of `ln` and `sqrt` away from zero.
    fn random_wide_expr(rng: &mut StdRng, depth: usize, smooth: bool) -> Expr {
        if depth == 0 || rng.random_bool(0.25) {
            return match rng.random_range(0..5) {
                0 | 1 => x(),
                2 => Expr::var("y"),
                _ => Expr::int(rng.random_range(1..=3)),
            };
        }
        let d = depth - 1;
        match rng.random_range(0..11) {
            0 => random_wide_expr(rng, d, smooth) + random_wide_expr(rng, d, smooth),
            1 => random_wide_expr(rng, d, smooth) - random_wide_expr(rng, d, smooth),
            2 => random_wide_expr(rng, d, smooth) * random_wide_expr(rng, d, smooth),
            3 => random_wide_expr(rng, d, smooth) / random_wide_expr(rng, d, smooth),
            4 => random_wide_expr(rng, d, smooth).pow(Expr::int(rng.random_range(-2..=3))),
            5 => random_wide_expr(rng, d, smooth).exp(),
            6 | 7 => {
                let mut argument = random_wide_expr(rng, d, smooth);
                if smooth {
                    argument = argument.pow(Expr::int(2)) + Expr::one();
                }
                if rng.random_bool(0.5) { argument.ln() } else { argument.sqrt() }
            }
            8 => random_wide_expr(rng, d, smooth).sin(),
            9 => random_wide_expr(rng, d, smooth).cos(),
            _ => -random_wide_expr(rng, d, smooth),
        }
    }

    fn random_wide_exprs(seed: u64, count: usize, smooth: bool) -> Vec<Expr> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count).map(|_| random_wide_expr(&mut rng, 3, smooth)).collect()
    }

    fn at_xy(e: &Expr, x: f64) -> Result<f64, SymbolicError> {
        e.evaluate(&VariableBinding::new().with("x", x).with("y", 0.7))
    }

    #[test]
    fn test_simplify_all_operators() {
        let mut checked = 0;
        for e in random_wide_exprs(13, 300, false) {
            let simplified = e.simplify();
            assert_eq!(simplified.simplify(), simplified, "not idempotent on {}", e);
            assert!(simplified.has_finite_constants(), "{}", simplified);
            for at in SAMPLE_POINTS {
                // simplification may only widen the domain
                if let Ok(expected) = at_xy(&e, at) {
                    let actual = at_xy(&simplified, at)
                        .unwrap_or_else(|err| panic!("{} -> {} at {}: {}", e, simplified, at, err));
                    assert_relative_eq!(actual, expected, max_relative = 1e-8, epsilon = 1e-8);
                    checked += 1;
                }
            }
        }
        assert!(checked > 100, "only {} points were defined", checked);
    }

    #[test]
    fn test_derivative_all_operators() {
        let central = |e: &Expr, at: f64, h: f64| -> Option<f64> {
            Some((at_xy(e, at + h).ok()? - at_xy(e, at - h).ok()?) / (2.0 * h))
        };
        let mut checked = 0;
        for e in random_wide_exprs(29, 300, true) {
            let derivative = e.diff("x").simplify();
            for at in SAMPLE_POINTS {
                let (Some(coarse), Some(fine)) = (central(&e, at, 1e-4), central(&e, at, 5e-5)) else {
                    continue;
                };
                // skip points where the difference quotient has not settled (poles, domain edges)
                if (coarse - fine).abs() > 1e-6 * (1.0 + fine.abs()) {
                    continue;
                }
                let analytic = at_xy(&derivative, at)
                    .unwrap_or_else(|err| panic!("d/dx {} = {} at {}: {}", e, derivative, at, err));
                assert_relative_eq!(analytic, fine, max_relative = 1e-5, epsilon = 1e-5);
                checked += 1;
            }
        }
        assert!(checked > 100, "only {} points were checked", checked);
    }

    /// random sum of elementary functions of linear arguments, all with a closed form
    /// and defined on `[-1, 1.2]`
    fn random_integrable(rng: &mut StdRng) -> Expr {
        let terms = rng.random_range(1..=3);
        (0..terms)
            .map(|_| {
                let coefficient = Expr::int(rng.random_range(1..=5));
                let u = Expr::int(rng.random_range(1..=3)) * x() + Expr::int(rng.random_range(-2..=2));
                // slope above one
                let steep = Expr::int(rng.random_range(2..=3)) * x() + Expr::int(rng.random_range(-1..=1));
                // positive on the sample interval
                let positive = Expr::int(rng.random_range(1..=2)) * x() + Expr::int(3);
                let basis = match rng.random_range(0..14) {
                    0 => u.pow(Expr::int(rng.random_range(1..=4))),
                    1 => u.sin(),
                    2 => u.cos(),
                    3 => u.exp(),
                    4 => u.atan(),
                    5 => steep.sin().pow(Expr::int(2)),
                    6 => steep.cos().pow(Expr::int(2)),
                    7 => positive.ln(),
                    8 => Expr::one() / positive,
                    9 => positive.sqrt(),
                    10 => (x() / Expr::int(2)).tan(),
                    11 => Expr::int(2).pow(u),
                    12 => (x() / Expr::int(4)).asin(),
                    _ => x().pow(Expr::int(rng.random_range(0..=5))),
                };
                coefficient * basis
            })
            .reduce(|acc, term| acc + term)
            .unwrap_or_else(Expr::zero)
    }

    #[test]
    fn test_antiderivative_round_trip() {
        let mut rng = StdRng::seed_from_u64(31);
        for _ in 0..100 {
            let e = random_integrable(&mut rng);
            let antiderivative = e
                .integrate_indefinite("x")
                .unwrap_or_else(|| panic!("no closed form for {}", e));
            let derivative = antiderivative.diff("x").simplify();
            for at in SAMPLE_POINTS {
                assert_relative_eq!(
                    derivative.evaluate_at("x", at).unwrap(),
                    e.evaluate_at("x", at).unwrap(),
                    max_relative = 1e-9,
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_definite_integral_matches_gauss_legendre() {
        let mut rng = StdRng::seed_from_u64(47);
        for _ in 0..50 {
            let e = random_integrable(&mut rng);
            let integral = e.integrate_definite("x", 0.0, 1.0).unwrap();
            assert_eq!(integral.method, IntegrationMethod::ClosedForm);
            let reference = quad_gauss_legendre(|t| e.evaluate_at("x", t).unwrap_or(f64::NAN), 0.0, 1.0, 30).unwrap();
            assert_relative_eq!(integral.value, reference, max_relative = 1e-6, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_quadrature_fallback_matches_gauss_legendre() {
        let samples = vec![
            ((-x().pow(Expr::int(2))).exp(), -1.0, 2.0),
            (x().sin() / x(), 1.0, 3.0),
            (x().sin() / x(), 0.0, 1.0),
            (x().pow(x()), 0.5, 2.0),
            (x().cos().exp(), 0.0, 4.0),
        ];
        for (e, lower, upper) in samples {
            let integral = e.integrate_definite("x", lower, upper).unwrap();
            assert_eq!(integral.method, IntegrationMethod::AdaptiveSimpson, "{}", e);
            assert!(integral.converged);
            let reference =
                quad_gauss_legendre(|t| e.evaluate_at("x", t).unwrap_or(f64::NAN), lower, upper, 60).unwrap();
            assert_relative_eq!(integral.value, reference, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_quadrature_bound_at_removable_singularity() {
        let sinc = build_function(&["x"], x().sin() / x()).unwrap();
        let integral = sinc.integrate_definite_detailed(0.0, 1.0, None).unwrap();
        assert_eq!(integral.method, IntegrationMethod::AdaptiveSimpson);
        assert!(integral.converged);
        // Si(1)
        assert_relative_eq!(integral.value, 0.946083070367183, max_relative = 1e-9);
        let reversed = sinc.integrate_definite(1.0, 0.0, None).unwrap();
        assert_relative_eq!(reversed, -0.946083070367183, max_relative = 1e-9);
    }

    #[test]
    fn test_quadrature_reports_degraded_accuracy() {
        let config = EngineConfig::from_toml_str(
            "[quadrature]\nrelative_tolerance = 1e-15\nabsolute_tolerance = 0.0\nmax_depth = 3\n",
        )
        .unwrap();
        let e = x().sqrt().sin();
        let integral = e.integrate_definite_with("x", 0.0, 1.0, &config).unwrap();
        assert_eq!(integral.method, IntegrationMethod::AdaptiveSimpson);
        assert!(!integral.converged);
        assert!(integral.achieved_tolerance > 0.0);
        assert_relative_eq!(integral.value, 2.0 * (1f64.sin() - 1f64.cos()), max_relative = 1e-2);
    }
}
