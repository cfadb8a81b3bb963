#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedTrigSub::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("1/(x**2 * sqrt(x**2 - 4))").unwrap();
/// assert_eq!(parsed_expression.to_string(), "1/(x^2*sqrt(x^2 - 4))");
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) represents an expression as a tree with exact rational constants
/// 2) substitutes variables and sub-expressions
/// 3) prints expressions in a form the parser reads back
///# Example#
/// ```
/// use RustedTrigSub::symbolic::symbolic_engine::Expr;
/// let x = Expr::var("x");
/// let theta = Expr::var("theta");
/// let radical = (Expr::int(9) - x.pow(Expr::int(2))).sqrt();
/// let substituted = radical.substitute_variable("x", &(Expr::int(3) * Expr::sin(theta.boxed())));
/// println!("{}", substituted.simplify());
/// ```
/// Example2#
/// ```
/// use RustedTrigSub::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("arcsin(x/3)").unwrap();
/// println!("{}", f.diff("x"));
/// let (norm, res) = f.compare_num1D("x", 0.5, 2.5, 50, 1e-4);
/// println!("norm = {}, res = {}", norm, res);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
mod symbolic_engine_tests;
/// integration in the angle variable with the reduction formulas, and Gauss-Legendre quadrature
pub mod symbolic_integration;
/// LaTeX markup
pub mod symbolic_markup;
/// canonical sum-of-products form
pub mod symbolic_simplify;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility functions: grids, numerical derivatives, exact square roots
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
