//! # Symbolic Engine Derivatives Module
//!
//! This module extends the symbolic engine with differentiation and numeric evaluation.
//! Both are used to verify antiderivatives: the derivative of a result is evaluated on
//! sample points and compared with the original integrand.
//!
//! ## Key Methods
//!
//! ### Differentiation
//! - `diff(var: &str)` - Analytical derivative (product, quotient, power and chain rules)
//!
//! ### Function evaluation
//! - `eval_at(var, value)` - Direct evaluation of a single-variable expression
//! - `lambdify1D()` - Closure over a single-variable expression
//!
//! ### Numerical Analysis
//! - `compare_num1D()` - Validate an analytical derivative against central differences
//! - `max_residual_against()` - Largest pointwise difference between two expressions

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{linspace, norm, numerical_derivative};
use num::ToPrimitive;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements the standard differentiation rules:
    /// - Power rule: d/dx(f^c) = c*f^(c-1)*f'  (constant exponent)
    /// - General power: d/dx(f^g) = f^g * (g'*ln(f) + g*f'/f)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule for every function variant
    ///
    /// The result is not simplified.
    ///
    /// # Arguments
    /// * `var` - Variable name to differentiate with respect to
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::var("x").pow(Expr::int(2)); // x^2
    /// let df_dx = f.diff("x"); // 2*x^1*1
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::int(1)
                } else {
                    Expr::int(0)
                }
            }
            Expr::Const(_) => Expr::int(0),
            Expr::Add(lhs, rhs) => lhs.diff(var) + rhs.diff(var),
            Expr::Sub(lhs, rhs) => lhs.diff(var) - rhs.diff(var),
            Expr::Mul(lhs, rhs) => {
                lhs.diff(var) * *rhs.clone() + *lhs.clone() * rhs.diff(var)
            }
            Expr::Div(lhs, rhs) => (lhs.diff(var) * *rhs.clone() - *lhs.clone() * rhs.diff(var))
                / rhs.as_ref().clone().pow(Expr::int(2)),
            Expr::Pow(base, exp) => {
                if !exp.contains_variable(var) {
                    let lowered = Expr::Sub(exp.clone(), Expr::int(1).boxed());
                    *exp.clone() * base.as_ref().clone().pow(lowered) * base.diff(var)
                } else {
                    self.clone()
                        * (exp.diff(var) * base.as_ref().clone().ln()
                            + *exp.clone() * base.diff(var) / *base.clone())
                }
            }
            Expr::Exp(arg) => self.clone() * arg.diff(var),
            Expr::Ln(arg) => arg.diff(var) / *arg.clone(),
            Expr::sin(arg) => Expr::cos(arg.clone()) * arg.diff(var),
            Expr::cos(arg) => -Expr::sin(arg.clone()) * arg.diff(var),
            Expr::tg(arg) => Expr::sec(arg.clone()).pow(Expr::int(2)) * arg.diff(var),
            Expr::ctg(arg) => -Expr::csc(arg.clone()).pow(Expr::int(2)) * arg.diff(var),
            Expr::sec(arg) => Expr::sec(arg.clone()) * Expr::tg(arg.clone()) * arg.diff(var),
            Expr::csc(arg) => -Expr::csc(arg.clone()) * Expr::ctg(arg.clone()) * arg.diff(var),
            Expr::arcsin(arg) => {
                arg.diff(var) / (Expr::int(1) - arg.as_ref().clone().pow(Expr::int(2))).sqrt()
            }
            Expr::arccos(arg) => {
                -arg.diff(var) / (Expr::int(1) - arg.as_ref().clone().pow(Expr::int(2))).sqrt()
            }
            Expr::arctg(arg) => {
                arg.diff(var) / (Expr::int(1) + arg.as_ref().clone().pow(Expr::int(2)))
            }
            Expr::arcctg(arg) => {
                -arg.diff(var) / (Expr::int(1) + arg.as_ref().clone().pow(Expr::int(2)))
            }
        }
    } // end of diff

    /// FUNCTION EVALUATION

    /// Evaluates the expression with `var` set to `value`.
    ///
    /// Any other variable evaluates to NaN, so the result is only meaningful for
    /// single-variable expressions. Domain errors propagate as NaN or infinities.
    pub fn eval_at(&self, var: &str, value: f64) -> f64 {
        match self {
            Expr::Var(name) => {
                if name == var {
                    value
                } else {
                    f64::NAN
                }
            }
            Expr::Const(c) => c.to_f64().unwrap_or(f64::NAN),
            Expr::Add(lhs, rhs) => lhs.eval_at(var, value) + rhs.eval_at(var, value),
            Expr::Sub(lhs, rhs) => lhs.eval_at(var, value) - rhs.eval_at(var, value),
            Expr::Mul(lhs, rhs) => lhs.eval_at(var, value) * rhs.eval_at(var, value),
            Expr::Div(lhs, rhs) => lhs.eval_at(var, value) / rhs.eval_at(var, value),
            Expr::Pow(base, exp) => {
                let b = base.eval_at(var, value);
                match exp.as_const() {
                    Some(q) if q.is_integer() => b.powi(q.to_integer() as i32),
                    Some(q) if *q.numer() == 1 && *q.denom() == 2 => b.sqrt(),
                    _ => b.powf(exp.eval_at(var, value)),
                }
            }
            Expr::Exp(arg) => arg.eval_at(var, value).exp(),
            Expr::Ln(arg) => arg.eval_at(var, value).ln(),
            Expr::sin(arg) => arg.eval_at(var, value).sin(),
            Expr::cos(arg) => arg.eval_at(var, value).cos(),
            Expr::tg(arg) => arg.eval_at(var, value).tan(),
            Expr::ctg(arg) => 1.0 / arg.eval_at(var, value).tan(),
            Expr::sec(arg) => 1.0 / arg.eval_at(var, value).cos(),
            Expr::csc(arg) => 1.0 / arg.eval_at(var, value).sin(),
            Expr::arcsin(arg) => arg.eval_at(var, value).asin(),
            Expr::arccos(arg) => arg.eval_at(var, value).acos(),
            Expr::arctg(arg) => arg.eval_at(var, value).atan(),
            Expr::arcctg(arg) => std::f64::consts::FRAC_PI_2 - arg.eval_at(var, value).atan(),
        }
    }

    /// Converts a single-variable symbolic expression into a closure.
    ///
    /// The variable is found inside the expression; a constant expression gives a
    /// constant closure. With more than one variable the closure evaluates to NaN.
    pub fn lambdify1D(&self) -> Box<dyn Fn(f64) -> f64 + Send + Sync> {
        let vars = self.all_arguments_are_variables();
        let var_name = vars.first().cloned().unwrap_or_default();
        let expr = self.clone();
        Box::new(move |x| expr.eval_at(&var_name, x))
    }

    /// Compares the analytical derivative with central differences on a linspace.
    ///
    /// # Returns
    /// `(norm, passed)` - Euclidean norm of the difference and whether it is below
    /// `max_norm`. Points where either side is not finite are skipped.
    pub fn compare_num1D(
        &self,
        var: &str,
        start: f64,
        end: f64,
        num_values: usize,
        max_norm: f64,
    ) -> (f64, bool) {
        let x_values = linspace(start, end, num_values);
        let analytical = self.diff(var);
        let f = |x: f64| self.eval_at(var, x);
        let numerical = numerical_derivative(f, x_values.clone(), 1e-6);
        let (lhs, rhs): (Vec<f64>, Vec<f64>) = x_values
            .iter()
            .zip(numerical)
            .map(|(&x, num)| (analytical.eval_at(var, x), num))
            .filter(|(a, n)| a.is_finite() && n.is_finite())
            .unzip();
        let norm = norm(lhs, rhs);
        (norm, norm < max_norm)
    }

    /// Largest absolute difference `|self(x) - other(x)|` over the sample points,
    /// scaled by `max(1, |other(x)|)`. Points where either side is not finite are
    /// skipped; `None` means no point could be evaluated.
    pub fn max_residual_against(&self, other: &Expr, var: &str, points: &[f64]) -> Option<f64> {
        points
            .iter()
            .filter_map(|&x| {
                let lhs = self.eval_at(var, x);
                let rhs = other.eval_at(var, x);
                if lhs.is_finite() && rhs.is_finite() {
                    Some((lhs - rhs).abs() / rhs.abs().max(1.0))
                } else {
                    None
                }
            })
            .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |m| m.max(r))))
    }
}
