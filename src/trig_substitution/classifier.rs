//! Detection of the radical that decides the substitution family.

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{rational_add, rational_mul};
use crate::trig_substitution::errors::TrigSubError;
use crate::trig_substitution::family::{Parameter, SubstitutionFamily};
use log::debug;
use num::rational::Rational64;
use num::{One, Signed, Zero};

/// Outcome of the detection stage.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub family: SubstitutionFamily,
    /// the radical node `R^(k/2)` that matched
    pub radical: Expr,
    /// its base `R`
    pub radicand: Expr,
}

/// Coefficients of a radicand `c0 + c2*x^2`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct QuadraticRadicand {
    c0: Rational64,
    c2: Rational64,
}

/// Adds `k` to `slot`; `false` if the sum leaves the `Rational64` range.
fn accumulate(slot: &mut Rational64, k: Result<Rational64, String>) -> bool {
    match k.and_then(|k| rational_add(*slot, k)) {
        Ok(sum) => {
            *slot = sum;
            true
        }
        Err(e) => {
            debug!("radicand coefficient dropped: {}", e);
            false
        }
    }
}

/// Accumulates a flat signed sum of constants and multiples of `x^2`.
/// Returns `false` on any other term, or when a coefficient overflows.
fn collect_terms(expr: &Expr, sign: Rational64, var: &str, acc: &mut QuadraticRadicand) -> bool {
    let is_square = |e: &Expr| match e {
        Expr::Pow(base, exp) => {
            matches!(base.as_ref(), Expr::Var(name) if name == var) && exp.as_const() == Some(Rational64::from_integer(2))
        }
        _ => false,
    };
    match expr {
        Expr::Add(lhs, rhs) => {
            collect_terms(lhs, sign, var, acc) && collect_terms(rhs, sign, var, acc)
        }
        Expr::Sub(lhs, rhs) => {
            collect_terms(lhs, sign, var, acc) && collect_terms(rhs, -sign, var, acc)
        }
        Expr::Const(c) => accumulate(&mut acc.c0, rational_mul(sign, *c)),
        e if is_square(e) => accumulate(&mut acc.c2, Ok(sign)),
        Expr::Mul(lhs, rhs) => match (lhs.as_const(), rhs.as_const()) {
            (Some(k), _) if is_square(rhs) => accumulate(&mut acc.c2, rational_mul(sign, k)),
            (_, Some(k)) if is_square(lhs) => accumulate(&mut acc.c2, rational_mul(sign, k)),
            (Some(k), _) => match rational_mul(sign, k) {
                Ok(scaled) => collect_terms(rhs, scaled, var, acc),
                Err(_) => false,
            },
            _ => false,
        },
        Expr::Div(lhs, rhs) => match rhs.as_const() {
            Some(k) if !k.is_zero() => match rational_mul(sign, k.recip()) {
                Ok(scaled) => collect_terms(lhs, scaled, var, acc),
                Err(_) => false,
            },
            _ => false,
        },
        _ => false,
    }
}

fn quadratic_radicand(base: &Expr, var: &str) -> Option<QuadraticRadicand> {
    let mut acc = QuadraticRadicand {
        c0: Rational64::zero(),
        c2: Rational64::zero(),
    };
    if !collect_terms(base, Rational64::one(), var, &mut acc) {
        return None;
    }
    // only unit coefficients of x^2 are handled
    if acc.c2.abs() != Rational64::one() {
        return None;
    }
    Some(acc)
}

fn family_of(radicand: &Expr, q: QuadraticRadicand) -> Result<SubstitutionFamily, TrigSubError> {
    let malformed = |reason: String| TrigSubError::MalformedParameterFailure {
        radicand: radicand.clone(),
        reason,
    };
    if q.c0.is_zero() {
        return Err(malformed("the constant term is zero, so a = 0".to_string()));
    }
    if q.c2.is_negative() {
        if !q.c0.is_positive() {
            return Err(malformed(format!(
                "C - x^2 with C = {} is negative for every real x",
                q.c0
            )));
        }
        let a = Parameter::from_squared(q.c0).map_err(malformed)?;
        Ok(SubstitutionFamily::SinForm { a })
    } else if q.c0.is_positive() {
        let a = Parameter::from_squared(q.c0).map_err(malformed)?;
        Ok(SubstitutionFamily::TanForm { a })
    } else {
        let a = Parameter::from_squared(-q.c0).map_err(malformed)?;
        Ok(SubstitutionFamily::SecForm { a })
    }
}

fn collect_radicals<'a>(expr: &'a Expr, out: &mut Vec<(&'a Expr, &'a Expr)>) {
    if let Some((base, _)) = expr.radical_parts() {
        out.push((expr, base));
    }
    for child in expr.children() {
        collect_radicals(child, out);
    }
}

/// Finds the first radical (pre-order) whose base is `C - x^2`, `C + x^2` or `x^2 - C`
/// and derives the family and `a = sqrt(|C|)` from it.
///
/// Radicals of any other shape are skipped. The first one of a quadratic shape decides:
/// if its constant is unusable the result is `MalformedParameterFailure`.
pub fn classify(integrand: &Expr, var: &str) -> Result<Classification, TrigSubError> {
    let mut radicals = Vec::new();
    collect_radicals(integrand, &mut radicals);
    for (radical, base) in radicals {
        let Some(q) = quadratic_radicand(base, var) else {
            debug!("radical {} does not have a canonical shape", radical);
            continue;
        };
        let family = family_of(base, q)?;
        debug!("{} selects {}", radical, family);
        return Ok(Classification {
            family,
            radical: radical.clone(),
            radicand: base.clone(),
        });
    }
    Err(TrigSubError::ClassificationFailure {
        integrand: integrand.clone(),
    })
}
