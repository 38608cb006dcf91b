#![allow(non_snake_case)]
use RustedCAS::Utils::logger::{LoggerSettings, init_logger};
use RustedCAS::symbolic::symbolic_error::SymbolicResult;
use RustedCAS::symbolic::symbolic_function::Function;
use log::warn;

fn print_function(f: &Function) -> SymbolicResult<()> {
    println!("{}", f);
    println!("simplified: {}", f.simplify().to_display_string());
    match f.integrate_indefinite(None)? {
        Some(antiderivative) => println!("antiderivative: {}", antiderivative.to_display_string()),
        None => println!("antiderivative: no closed form"),
    }
    println!("integral over [0, 2]: {}", f.integrate_definite(0.0, 2.0, None)?);
    println!("derivative: {}", f.differentiate(None)?.to_display_string());
    println!("value at 5: {}", f.evaluate(&[5.0])?);
    println!();
    Ok(())
}

fn main() -> SymbolicResult<()> {
    let loglevel = std::env::args().nth(2).unwrap_or_else(|| "warn".to_string());
    if !init_logger(&LoggerSettings::default().with_level_name(&loglevel)?)? {
        warn!("logger was already initialized");
    }
    let example: usize = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0);

    let f = Function::parse(&["x"], "3*x^2 + 2*x + cos(x)^2 + sin(x)^2")?;
    let g = Function::parse(&["x"], "2*x + 5*2")?;
    let h = Function::parse(&["y", "z"], "y + z")?;
    match example {
        0 => {
            // single functions: simplify, integrate, differentiate, evaluate
            print_function(&f)?;
            print_function(&g)?;
        }
        1 => {
            // arithmetic combination of functions
            println!("{}", g.plus(&h));
            println!("{}", g.minus(&h));
            println!("{}", f.times(&g));
            println!("{}", f.over(&g));
            let sum = g.plus(&h).simplify();
            println!("{} at (1, 2, 3) = {}", sum, sum.evaluate(&[1.0, 2.0, 3.0])?);
        }
        2 => {
            // no closed form: quadrature fallback
            let gaussian = Function::parse(&["x"], "exp(-x^2)")?;
            let integral = gaussian.integrate_definite_detailed(-3.0, 3.0, None)?;
            println!(
                "{}: integral over [-3, 3] = {} ({}, relative error {:e}, converged {})",
                gaussian, integral.value, integral.method, integral.achieved_tolerance, integral.converged
            );
        }
        _ => println!("example must be 0, 1 or 2"),
    }
    Ok(())
}
