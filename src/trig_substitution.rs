//! # Trigonometric Substitution
//!
//! Integrals containing `sqrt(a^2 - x^2)`, `sqrt(a^2 + x^2)` or `sqrt(x^2 - a^2)` are solved
//! by the substitutions `x = a*sin(theta)`, `x = a*tan(theta)` and `x = a*sec(theta)`.
//! The Pythagorean identity removes the radical, the integral in `theta` is taken with the
//! reduction formulas and the reference right triangle brings the result back to `x`.
//!
//! # Example
//! ```rust
//! use RustedTrigSub::trig_substitution::pipeline::{LoggingObserver, TrigSubstitution};
//! use RustedTrigSub::symbolic::symbolic_engine::Expr;
//! let solver = TrigSubstitution::default();
//! let integrand = Expr::parse_expression("x**2/sqrt(16 + x**2)").unwrap();
//! let result = solver.resolve_with(&integrand, &mut LoggingObserver).unwrap();
//! // x*sqrt(x^2 + 16)/2 - 8*ln(x/4 + sqrt(x^2 + 16)/4)
//! println!("{}", result.antiderivative.unwrap());
//! ```

/// detection of the radical and of the parameter `a`
pub mod classifier;
/// settings of a run, optionally read from TOML
pub mod config;
/// substitution, Pythagorean rewrite, integration and back-substitution
pub mod engine;
pub mod errors;
/// the three families with their identities and reference triangles
pub mod family;
/// stage-by-stage orchestration, observers and numeric cross-check
pub mod pipeline;
mod pipeline_tests;
