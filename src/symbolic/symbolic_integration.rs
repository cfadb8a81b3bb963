//! # Integration in the Angle Variable
//!
//! After a trigonometric substitution and the Pythagorean rewrite, an integrand is a sum of
//! terms `c * sqrt(r) * sin(t)^m * cos(t)^n` with rational `c`, squarefree integer `r` and
//! integer (possibly negative) `m`, `n`. Every other trigonometric function of `t` is one of
//! these monomials (`tan = sin/cos`, `sec = cos^-1`, ...).
//!
//! Each monomial `I(m, n) = ∫ sin^m cos^n dt` is reduced with the classical reduction
//! formulas until one of nine base integrals is reached:
//!
//! | (m, n)   | ∫ sin^m cos^n dt      |
//! |----------|-----------------------|
//! | (0, 0)   | t                     |
//! | (1, 0)   | -cos(t)               |
//! | (0, 1)   | sin(t)                |
//! | (1, 1)   | sin(t)^2/2            |
//! | (-1, 0)  | ln(csc(t) - cot(t))   |
//! | (0, -1)  | ln(sec(t) + tan(t))   |
//! | (1, -1)  | -ln(cos(t))           |
//! | (-1, 1)  | ln(sin(t))            |
//! | (-1, -1) | ln(tan(t))            |
//!
//! Logarithms drop the absolute value: the angle stays in the first quadrant for positive `x`.
//!
//! The module also holds the Gauss-Legendre quadrature used to cross-check antiderivatives.

use crate::symbolic::symbolic_engine::{Expr, TrigFn};
use crate::symbolic::symbolic_simplify::SumOfProducts;
use crate::symbolic::utils::{rational_add, rational_mul, square_free_split};
use gauss_quad::GaussLegendre;
use log::debug;
use num::rational::Rational64;
use num::{Signed, Zero};
use std::collections::BTreeMap;

/// Largest `|m| + |n|` the reduction formulas are applied to. Up to this degree every
/// reduction coefficient fits in 54 bits.
pub const MAX_TOTAL_DEGREE: u64 = 48;

/// Building blocks of an antiderivative in the angle variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ThetaTerm {
    /// `sin(t)^p * cos(t)^q`
    Monomial(i64, i64),
    /// the angle itself
    Angle,
    LnSecPlusTan,
    LnCscMinusCot,
    LnSin,
    LnCos,
    LnTan,
}

impl ThetaTerm {
    /// Renders the term with sine and cosine (and `sec`/`csc`/`tan`/`cot` inside logarithms).
    pub fn to_expr(&self, theta: &str) -> Expr {
        let t = Expr::var(theta);
        let f = |func: TrigFn| func.apply(t.clone());
        match self {
            ThetaTerm::Monomial(p, q) => {
                f(TrigFn::Sin).pow(Expr::int(*p)) * f(TrigFn::Cos).pow(Expr::int(*q))
            }
            ThetaTerm::Angle => t,
            ThetaTerm::LnSecPlusTan => (f(TrigFn::Sec) + f(TrigFn::Tan)).ln(),
            ThetaTerm::LnCscMinusCot => (f(TrigFn::Csc) - f(TrigFn::Cot)).ln(),
            ThetaTerm::LnSin => f(TrigFn::Sin).ln(),
            ThetaTerm::LnCos => f(TrigFn::Cos).ln(),
            ThetaTerm::LnTan => f(TrigFn::Tan).ln(),
        }
    }
}

/// A linear combination of `ThetaTerm`s with coefficients `c * sqrt(r)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThetaAntiderivative {
    terms: BTreeMap<(ThetaTerm, i64), Rational64>,
}

impl ThetaAntiderivative {
    fn add(&mut self, term: ThetaTerm, radicand: i64, coeff: Rational64) -> Result<(), String> {
        // constants of integration are dropped
        if coeff.is_zero() || term == ThetaTerm::Monomial(0, 0) {
            return Ok(());
        }
        let key = (term, radicand);
        let entry = self.terms.entry(key).or_insert_with(Rational64::zero);
        *entry = rational_add(*entry, coeff)?;
        if entry.is_zero() {
            self.terms.remove(&key);
        }
        Ok(())
    }

    /// `(term, radicand, coefficient)` triples in a deterministic order.
    pub fn terms(&self) -> impl Iterator<Item = (ThetaTerm, i64, Rational64)> + '_ {
        self.terms.iter().map(|((term, r), c)| (*term, *r, *c))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Builds the antiderivative as an expression, rendering each term with `render`,
    /// and simplifies it.
    pub fn to_expr_with<F>(&self, render: F) -> Result<Expr, String>
    where
        F: Fn(&ThetaTerm) -> Expr,
    {
        let sum = self
            .terms()
            .map(|(term, radicand, coeff)| {
                let mut factor = Expr::Const(coeff);
                if radicand != 1 {
                    factor *= Expr::int(radicand).sqrt();
                }
                factor * render(&term)
            })
            .reduce(|acc, term| acc + term)
            .unwrap_or_else(|| Expr::int(0));
        sum.try_simplify()
    }

    /// The antiderivative in sine/cosine form.
    pub fn to_expr(&self, theta: &str) -> Result<Expr, String> {
        self.to_expr_with(|term| term.to_expr(theta))
    }
}

/// Integrand normalised to `sum c * sqrt(r) * sin^m * cos^n`, keyed by `(m, n, r)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrigPolynomial {
    terms: BTreeMap<(i64, i64, i64), Rational64>,
}

impl TrigPolynomial {
    /// Normalises an expression in the angle variable.
    ///
    /// Accepted factors are trigonometric functions of exactly `theta` with integer exponents
    /// and square roots of positive integers. Anything else (the bare angle, other
    /// variables, sums in a denominator or under a radical) is an error.
    pub fn from_expr(expr: &Expr, theta: &str) -> Result<TrigPolynomial, String> {
        let sum = SumOfProducts::from_expr(expr)?;
        let overflow = || format!("exponent or radicand overflow in {}", expr);
        let angle = Expr::var(theta);
        let half = Rational64::new(1, 2);
        let mut poly = TrigPolynomial::default();
        for (key, coeff) in sum.terms() {
            let (mut m, mut n) = (0_i64, 0_i64);
            let mut radicand = 1_i64;
            for (base, exp) in &key.0 {
                if let Expr::Const(r) = base {
                    if *exp == half && r.is_integer() && r.is_positive() {
                        radicand = radicand.checked_mul(r.to_integer()).ok_or_else(overflow)?;
                        continue;
                    }
                }
                match TrigFn::of(base) {
                    Some((func, arg)) if *arg == angle && exp.is_integer() => {
                        let k = exp.to_integer();
                        let (sm, cn) = func.sin_cos_exponents();
                        m = sm
                            .checked_mul(k)
                            .and_then(|d| m.checked_add(d))
                            .ok_or_else(overflow)?;
                        n = cn
                            .checked_mul(k)
                            .and_then(|d| n.checked_add(d))
                            .ok_or_else(overflow)?;
                    }
                    _ => {
                        return Err(format!(
                            "factor {} with exponent {} is not a power of a trigonometric function of {}",
                            base, exp, theta
                        ));
                    }
                }
            }
            let (outside, radicand) = square_free_split(radicand);
            let entry = poly
                .terms
                .entry((m, n, radicand))
                .or_insert_with(Rational64::zero);
            *entry = rational_add(*entry, rational_mul(*coeff, Rational64::from_integer(outside))?)?;
        }
        poly.terms.retain(|_, c| !c.is_zero());
        Ok(poly)
    }

    pub fn terms(&self) -> impl Iterator<Item = ((i64, i64, i64), Rational64)> + '_ {
        self.terms.iter().map(|(k, c)| (*k, *c))
    }

    /// Term-by-term antiderivative.
    pub fn integrate(&self) -> Result<ThetaAntiderivative, String> {
        let mut result = ThetaAntiderivative::default();
        for (&(m, n, radicand), &coeff) in &self.terms {
            for (term, c) in integrate_sin_cos(m, n)? {
                result.add(term, radicand, rational_mul(coeff, c)?)?;
            }
        }
        Ok(result)
    }
}

fn base_integral(m: i64, n: i64) -> Option<Vec<(ThetaTerm, Rational64)>> {
    let one = Rational64::from_integer(1);
    let terms = match (m, n) {
        (0, 0) => vec![(ThetaTerm::Angle, one)],
        (1, 0) => vec![(ThetaTerm::Monomial(0, 1), -one)],
        (0, 1) => vec![(ThetaTerm::Monomial(1, 0), one)],
        (1, 1) => vec![(ThetaTerm::Monomial(2, 0), Rational64::new(1, 2))],
        (-1, 0) => vec![(ThetaTerm::LnCscMinusCot, one)],
        (0, -1) => vec![(ThetaTerm::LnSecPlusTan, one)],
        (1, -1) => vec![(ThetaTerm::LnCos, -one)],
        (-1, 1) => vec![(ThetaTerm::LnSin, one)],
        (-1, -1) => vec![(ThetaTerm::LnTan, one)],
        _ => return None,
    };
    Some(terms)
}

/// `∫ sin^m cos^n dt` as a combination of `ThetaTerm`s.
pub fn integrate_sin_cos(m: i64, n: i64) -> Result<Vec<(ThetaTerm, Rational64)>, String> {
    if m.unsigned_abs().saturating_add(n.unsigned_abs()) > MAX_TOTAL_DEGREE {
        return Err(format!(
            "sin^{}*cos^{} exceeds the supported degree {}",
            m, n, MAX_TOTAL_DEGREE
        ));
    }
    if let Some(terms) = base_integral(m, n) {
        return Ok(terms);
    }
    let r = |p: i64, q: i64| Rational64::new(p, q);
    // (boundary term, its coefficient, reduced integral, its coefficient)
    let (boundary, bc, (rm, rn), rc) = if m >= 2 && m + n != 0 {
        (ThetaTerm::Monomial(m - 1, n + 1), r(-1, m + n), (m - 2, n), r(m - 1, m + n))
    } else if n >= 2 && m + n != 0 {
        (ThetaTerm::Monomial(m + 1, n - 1), r(1, m + n), (m, n - 2), r(n - 1, m + n))
    } else if m >= 2 && n == -m {
        (ThetaTerm::Monomial(m - 1, 1 - m), r(1, m - 1), (m - 2, 2 - m), r(-1, 1))
    } else if n >= 2 && m == -n {
        (ThetaTerm::Monomial(1 - n, n - 1), r(-1, n - 1), (2 - n, n - 2), r(-1, 1))
    } else if n <= -2 {
        (ThetaTerm::Monomial(m + 1, n + 1), r(-1, n + 1), (m, n + 2), r(m + n + 2, n + 1))
    } else if m <= -2 {
        (ThetaTerm::Monomial(m + 1, n + 1), r(1, m + 1), (m + 2, n), r(m + n + 2, m + 1))
    } else {
        return Err(format!("no reduction formula applies to sin^{}*cos^{}", m, n));
    };
    let mut acc: BTreeMap<ThetaTerm, Rational64> = BTreeMap::new();
    acc.insert(boundary, bc);
    if !rc.is_zero() {
        for (term, c) in integrate_sin_cos(rm, rn)? {
            let entry = acc.entry(term).or_insert_with(Rational64::zero);
            *entry = rational_add(*entry, rational_mul(rc, c)?)?;
        }
    }
    Ok(acc.into_iter().filter(|(_, c)| !c.is_zero()).collect())
}

impl Expr {
    /// Antiderivative with respect to the angle variable `theta`.
    ///
    /// # Examples
    /// ```rust
    /// use RustedTrigSub::symbolic::symbolic_engine::Expr;
    /// let f = Expr::parse_expression("cos(t)^2").unwrap();
    /// let F = f.integrate_trig("t").unwrap().to_expr("t").unwrap(); // sin(t)*cos(t)/2 + t/2
    /// ```
    pub fn integrate_trig(&self, theta: &str) -> Result<ThetaAntiderivative, String> {
        let poly = TrigPolynomial::from_expr(self, theta)?;
        debug!("{} normalised into {} trigonometric monomials", self, poly.terms.len());
        poly.integrate()
    }

    /// Numerical integration over `[lower, upper]` by Gauss-Legendre quadrature.
    pub fn quad(&self, var: &str, degree: usize, lower: f64, upper: f64) -> Result<f64, String> {
        let quad = GaussLegendre::new(degree)
            .map_err(|e| format!("Failed to create Gauss-Legendre quadrature: {:?}", e))?;
        let f = |x: f64| self.eval_at(var, x);
        let result = quad.integrate(lower, upper, f);
        if result.is_finite() {
            Ok(result)
        } else {
            Err(format!(
                "quadrature of {} over [{}, {}] is not finite",
                self, lower, upper
            ))
        }
    }
}
