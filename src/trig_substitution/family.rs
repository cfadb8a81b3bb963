//! The three substitution families and the data each one carries: forward rule,
//! differential, Pythagorean identity, reference triangle and inverse relations.

use crate::symbolic::symbolic_engine::{Expr, TrigFn};
use crate::symbolic::symbolic_integration::ThetaTerm;
use crate::symbolic::symbolic_simplify::SumOfProducts;
use num::rational::Rational64;
use num::{Signed, ToPrimitive};
use std::fmt;
use strum_macros::{Display, EnumDiscriminants, EnumIter};

/// The parameter `a = sqrt(C)` of a family, kept exact.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    squared: Rational64,
    value: Expr,
}

impl Parameter {
    /// `a` from `a^2 = C`; `C` must be positive.
    pub fn from_squared(squared: Rational64) -> Result<Self, String> {
        if !squared.is_positive() {
            return Err(format!("a^2 = {} is not positive", squared));
        }
        let value = Expr::Const(squared).sqrt().try_simplify()?;
        Ok(Parameter { squared, value })
    }

    /// `a^2` as an exact rational.
    pub fn squared(&self) -> Rational64 {
        self.squared
    }

    /// `a` as an exact expression: a rational constant or a multiple of a square root.
    pub fn value(&self) -> &Expr {
        &self.value
    }

    pub fn is_rational(&self) -> bool {
        matches!(self.value, Expr::Const(_))
    }

    pub fn as_f64(&self) -> f64 {
        self.squared.to_f64().unwrap_or(f64::NAN).sqrt()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A Pythagorean identity as a rewrite rule:
/// `constant_sign + square_sign * atom^2 = collapses_to^2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PythagoreanIdentity {
    pub atom: TrigFn,
    pub constant_sign: i64,
    pub square_sign: i64,
    pub collapses_to: TrigFn,
}

impl PythagoreanIdentity {
    /// Rewrites `K*(constant_sign + square_sign*atom(theta)^2)` into `K*collapses_to(theta)^2`.
    /// `None` if `sum` does not have that exact shape.
    pub fn rewrite_sum(&self, sum: &SumOfProducts, theta: &str) -> Option<Expr> {
        if sum.len() != 2 {
            return None;
        }
        let atom = self.atom.apply(Expr::var(theta));
        let c0 = sum.constant_term();
        let mut c2 = None;
        for (key, coeff) in sum.terms() {
            if key.is_constant() {
                continue;
            }
            if key.0.len() == 1 && key.exponent_of(&atom) == Rational64::from_integer(2) {
                c2 = Some(*coeff);
            }
        }
        let c2 = c2?;
        if c0 == Rational64::from_integer(0) {
            return None;
        }
        let k = c0 / Rational64::from_integer(self.constant_sign);
        if c2 != k * Rational64::from_integer(self.square_sign) {
            return None;
        }
        Some(Expr::Const(k) * self.collapses_to.apply(Expr::var(theta)).pow(Expr::int(2)))
    }

    /// Applies the rewrite to every sum node, bottom-up.
    pub fn apply(&self, expr: &Expr, theta: &str) -> Expr {
        let rebuilt = expr.map_children(|child| self.apply(child, theta));
        match rebuilt {
            Expr::Add(_, _) | Expr::Sub(_, _) => rebuilt
                .sum_of_products()
                .ok()
                .and_then(|sum| self.rewrite_sum(&sum, theta))
                .unwrap_or(rebuilt),
            _ => rebuilt,
        }
    }

    /// Human-readable form, e.g. `1 - sin(theta)^2 = cos(theta)^2`.
    pub fn describe(&self, theta: &str) -> String {
        let t = Expr::var(theta);
        let square = self.atom.apply(t.clone()).pow(Expr::int(2));
        let lhs = match (self.constant_sign, self.square_sign) {
            (1, 1) => Expr::int(1) + square,
            (1, _) => Expr::int(1) - square,
            _ => square - Expr::int(1),
        };
        format!("{} = {}", lhs, self.collapses_to.apply(t).pow(Expr::int(2)))
    }
}

/// Reference right triangle of a substitution, sides expressed in `x` and `a`.
#[derive(Clone, Debug, PartialEq)]
pub struct RightTriangle {
    pub hypotenuse: Expr,
    pub opposite: Expr,
    pub adjacent: Expr,
}

impl RightTriangle {
    /// The trigonometric ratio of the angle, simplified.
    pub fn ratio(&self, f: TrigFn) -> Expr {
        let (num, den) = match f {
            TrigFn::Sin => (&self.opposite, &self.hypotenuse),
            TrigFn::Cos => (&self.adjacent, &self.hypotenuse),
            TrigFn::Tan => (&self.opposite, &self.adjacent),
            TrigFn::Cot => (&self.adjacent, &self.opposite),
            TrigFn::Sec => (&self.hypotenuse, &self.adjacent),
            TrigFn::Csc => (&self.hypotenuse, &self.opposite),
        };
        (num.clone() / den.clone()).simplify()
    }

    /// Symbolic check of `hyp^2 = opp^2 + adj^2`.
    pub fn check_pythagoras(&self) -> Result<(), String> {
        let square = |e: &Expr| e.clone().pow(Expr::int(2));
        let defect = square(&self.hypotenuse) - square(&self.opposite) - square(&self.adjacent);
        let defect = defect.try_simplify()?;
        if defect.is_zero() {
            Ok(())
        } else {
            Err(format!(
                "hypotenuse^2 - opposite^2 - adjacent^2 = {} for the triangle ({}, {}, {})",
                defect, self.hypotenuse, self.opposite, self.adjacent
            ))
        }
    }

    /// `hyp^2 = opp^2 + adj^2` in LaTeX.
    pub fn pythagoras_markup(&self) -> String {
        let square = |e: &Expr| format!("\\left({}\\right)^{{2}}", e.to_latex());
        format!(
            "{} = {} + {}",
            square(&self.hypotenuse),
            square(&self.opposite),
            square(&self.adjacent)
        )
    }
}

/// The three canonical substitutions, each carrying its parameter `a`.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(FamilyKind), derive(Display, EnumIter, Hash))]
pub enum SubstitutionFamily {
    /// `sqrt(a^2 - x^2)`, `x = a*sin(theta)`
    SinForm { a: Parameter },
    /// `sqrt(a^2 + x^2)`, `x = a*tan(theta)`
    TanForm { a: Parameter },
    /// `sqrt(x^2 - a^2)`, `x = a*sec(theta)`
    SecForm { a: Parameter },
}

impl SubstitutionFamily {
    pub fn kind(&self) -> FamilyKind {
        FamilyKind::from(self)
    }

    pub fn parameter(&self) -> &Parameter {
        match self {
            SubstitutionFamily::SinForm { a }
            | SubstitutionFamily::TanForm { a }
            | SubstitutionFamily::SecForm { a } => a,
        }
    }

    fn a(&self) -> Expr {
        self.parameter().value().clone()
    }

    fn a_squared(&self) -> Expr {
        Expr::Const(self.parameter().squared())
    }

    /// The function `x/a` equals.
    pub fn primary(&self) -> TrigFn {
        match self {
            SubstitutionFamily::SinForm { .. } => TrigFn::Sin,
            SubstitutionFamily::TanForm { .. } => TrigFn::Tan,
            SubstitutionFamily::SecForm { .. } => TrigFn::Sec,
        }
    }

    /// The function the radical collapses to.
    pub fn cofunction(&self) -> TrigFn {
        match self {
            SubstitutionFamily::SinForm { .. } => TrigFn::Cos,
            SubstitutionFamily::TanForm { .. } => TrigFn::Sec,
            SubstitutionFamily::SecForm { .. } => TrigFn::Tan,
        }
    }

    /// The canonical radicand, e.g. `a^2 - x^2`.
    pub fn radicand(&self, var: &str) -> Expr {
        let x2 = Expr::var(var).pow(Expr::int(2));
        match self {
            SubstitutionFamily::SinForm { .. } => self.a_squared() - x2,
            SubstitutionFamily::TanForm { .. } => self.a_squared() + x2,
            SubstitutionFamily::SecForm { .. } => x2 - self.a_squared(),
        }
    }

    /// `x = a*primary(theta)`.
    pub fn forward(&self, theta: &str) -> Expr {
        self.a() * self.primary().apply(Expr::var(theta))
    }

    /// `dx/dtheta`.
    pub fn differential(&self, theta: &str) -> Expr {
        let t = Expr::var(theta);
        match self {
            SubstitutionFamily::SinForm { .. } => self.a() * Expr::cos(t.boxed()),
            SubstitutionFamily::TanForm { .. } => self.a() * Expr::sec(t.boxed()).pow(Expr::int(2)),
            SubstitutionFamily::SecForm { .. } => {
                self.a() * Expr::sec(t.clone().boxed()) * Expr::tg(t.boxed())
            }
        }
    }

    pub fn identity(&self) -> PythagoreanIdentity {
        match self {
            SubstitutionFamily::SinForm { .. } => PythagoreanIdentity {
                atom: TrigFn::Sin,
                constant_sign: 1,
                square_sign: -1,
                collapses_to: TrigFn::Cos,
            },
            SubstitutionFamily::TanForm { .. } => PythagoreanIdentity {
                atom: TrigFn::Tan,
                constant_sign: 1,
                square_sign: 1,
                collapses_to: TrigFn::Sec,
            },
            SubstitutionFamily::SecForm { .. } => PythagoreanIdentity {
                atom: TrigFn::Sec,
                constant_sign: -1,
                square_sign: 1,
                collapses_to: TrigFn::Tan,
            },
        }
    }

    pub fn triangle(&self, var: &str) -> RightTriangle {
        let x = Expr::var(var);
        let side = self.radicand(var).sqrt();
        match self {
            SubstitutionFamily::SinForm { .. } => RightTriangle {
                hypotenuse: self.a(),
                opposite: x,
                adjacent: side,
            },
            SubstitutionFamily::TanForm { .. } => RightTriangle {
                hypotenuse: side,
                opposite: x,
                adjacent: self.a(),
            },
            SubstitutionFamily::SecForm { .. } => RightTriangle {
                hypotenuse: x,
                opposite: side,
                adjacent: self.a(),
            },
        }
    }

    /// The angle in terms of `x`: `arcsin(x/a)`, `arctan(x/a)` or `arccos(a/x)`.
    pub fn inverse_angle(&self, triangle: &RightTriangle) -> Expr {
        match self {
            SubstitutionFamily::SinForm { .. } => Expr::arcsin(triangle.ratio(TrigFn::Sin).boxed()),
            SubstitutionFamily::TanForm { .. } => Expr::arctg(triangle.ratio(TrigFn::Tan).boxed()),
            SubstitutionFamily::SecForm { .. } => Expr::arccos(triangle.ratio(TrigFn::Cos).boxed()),
        }
    }

    /// `sin^p * cos^q` written with the primary function and its co-function.
    pub fn monomial(&self, p: i64, q: i64, theta: &str) -> Expr {
        let t = Expr::var(theta);
        match self {
            SubstitutionFamily::SinForm { .. } => {
                Expr::sin(t.clone().boxed()).pow(Expr::int(p)) * Expr::cos(t.boxed()).pow(Expr::int(q))
            }
            // sin = tan/sec, cos = 1/sec
            SubstitutionFamily::TanForm { .. } | SubstitutionFamily::SecForm { .. } => {
                Expr::tg(t.clone().boxed()).pow(Expr::int(p))
                    * Expr::sec(t.boxed()).pow(Expr::int(-(p + q)))
            }
        }
    }

    /// Renders a term of an antiderivative in the angle using only the family's pair of
    /// functions, so that the triangle can replace all of them.
    pub fn render_theta_term(&self, term: &ThetaTerm, theta: &str) -> Expr {
        let t = Expr::var(theta);
        let pair_form = matches!(
            self,
            SubstitutionFamily::TanForm { .. } | SubstitutionFamily::SecForm { .. }
        );
        let f = |func: TrigFn| func.apply(t.clone());
        match term {
            ThetaTerm::Monomial(p, q) => self.monomial(*p, *q, theta),
            ThetaTerm::Angle => t.clone(),
            ThetaTerm::LnSecPlusTan if pair_form => (f(TrigFn::Sec) + f(TrigFn::Tan)).ln(),
            ThetaTerm::LnSecPlusTan => ((Expr::int(1) + f(TrigFn::Sin)) / f(TrigFn::Cos)).ln(),
            // csc - cot = (1 - cos)/sin
            ThetaTerm::LnCscMinusCot if pair_form => {
                ((f(TrigFn::Sec) - Expr::int(1)) / f(TrigFn::Tan)).ln()
            }
            ThetaTerm::LnCscMinusCot => ((Expr::int(1) - f(TrigFn::Cos)) / f(TrigFn::Sin)).ln(),
            ThetaTerm::LnSin => self.monomial(1, 0, theta).ln(),
            ThetaTerm::LnCos => self.monomial(0, 1, theta).ln(),
            ThetaTerm::LnTan => self.monomial(1, -1, theta).ln(),
        }
    }

    /// Rewrites every trigonometric function of the angle that is not the primary function
    /// or the co-function into those two.
    pub fn rewrite_to_pair(&self, expr: &Expr, theta: &str) -> Expr {
        let angle = Expr::var(theta);
        let rebuilt = expr.map_children(|child| self.rewrite_to_pair(child, theta));
        match TrigFn::of(&rebuilt) {
            Some((f, arg)) if *arg == angle && f != self.primary() && f != self.cofunction() => {
                let (p, q) = f.sin_cos_exponents();
                self.monomial(p, q, theta)
            }
            _ => rebuilt,
        }
    }

    /// Interval `[lo, hi]` inside the domain used by the numeric cross-check.
    pub fn sample_interval(&self) -> (f64, f64) {
        let a = self.parameter().as_f64();
        match self {
            SubstitutionFamily::SinForm { .. } => (0.2 * a, 0.8 * a),
            SubstitutionFamily::TanForm { .. } => (0.5 * a, 2.0 * a),
            SubstitutionFamily::SecForm { .. } => (1.2 * a, 3.0 * a),
        }
    }
}

impl fmt::Display for SubstitutionFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (a = {})", self.kind(), self.parameter())
    }
}
