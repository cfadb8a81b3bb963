//! The algebraic work of stages 3 to 6: substitution, Pythagorean rewrite, integration in
//! the angle and back-substitution through the reference triangle.

use crate::symbolic::symbolic_engine::{Expr, TrigFn};
use crate::trig_substitution::errors::TrigSubError;
use crate::trig_substitution::family::{RightTriangle, SubstitutionFamily};
use crate::trig_substitution::pipeline::Stage;
use log::{debug, info};

/// Carries out one substitution for a fixed family and pair of variable names.
pub struct SubstitutionEngine<'a> {
    family: &'a SubstitutionFamily,
    var: &'a str,
    theta: &'a str,
}

impl<'a> SubstitutionEngine<'a> {
    pub fn new(family: &'a SubstitutionFamily, var: &'a str, theta: &'a str) -> Self {
        SubstitutionEngine { family, var, theta }
    }

    /// `f(x) dx` becomes `f(a*g(theta)) * dx/dtheta`. Not simplified.
    pub fn transform(&self, integrand: &Expr) -> Expr {
        let forward = self.family.forward(self.theta);
        let substituted = integrand.substitute_variable(self.var, &forward);
        substituted * self.family.differential(self.theta)
    }

    /// Canonical simplification, Pythagorean rewrite of every matching sum, and a second
    /// simplification that pulls `K^q * u^(2q)` out of each collapsed radical.
    pub fn simplify(&self, transformed: &Expr) -> Result<Expr, TrigSubError> {
        let identity = self.family.identity();
        let overflow = |e: String| TrigSubError::delegated(Stage::Simplify, e);
        let first = transformed.try_simplify().map_err(overflow)?;
        let rewritten = identity.apply(&first, self.theta);
        let simplified = rewritten.try_simplify().map_err(overflow)?;
        debug!("{} -> {} -> {}", first, rewritten, simplified);
        let theta = self.theta;
        let radical_left = simplified.any_node(&|node| {
            node.radical_parts()
                .is_some_and(|(base, _)| base.contains_variable(theta))
        });
        if radical_left {
            return Err(TrigSubError::delegated(
                Stage::Simplify,
                format!(
                    "the identity {} did not remove the radical from {}",
                    identity.describe(theta),
                    simplified
                ),
            ));
        }
        Ok(simplified)
    }

    /// Antiderivative in the angle, written with the family's pair of functions only.
    pub fn integrate(&self, simplified: &Expr) -> Result<Expr, TrigSubError> {
        if simplified.contains_variable(self.var) {
            return Err(TrigSubError::delegated(
                Stage::Integrate,
                format!("{} still depends on {}", simplified, self.var),
            ));
        }
        let antiderivative = simplified
            .integrate_trig(self.theta)
            .map_err(|e| TrigSubError::delegated(Stage::Integrate, e))?;
        let theta = self.theta;
        let family = self.family;
        antiderivative
            .to_expr_with(|term| family.render_theta_term(term, theta))
            .map_err(|e| TrigSubError::delegated(Stage::Integrate, e))
    }

    /// Rewrites the angle antiderivative back into `x`: the pair of functions through the
    /// triangle ratios, the bare angle through the inverse function.
    pub fn back_substitute(
        &self,
        raw: &Expr,
        triangle: &RightTriangle,
    ) -> Result<Expr, TrigSubError> {
        let theta = Expr::var(self.theta);
        let overflow = |e: String| TrigSubError::delegated(Stage::BackSubstitute, e);
        let mut expr = self
            .family
            .rewrite_to_pair(raw, self.theta)
            .try_simplify()
            .map_err(overflow)?;
        for f in [self.family.primary(), self.family.cofunction()] {
            let ratio = triangle.ratio(f);
            debug!("{}({}) = {}", f, theta, ratio);
            expr = expr.replace_subexpr(&f.apply(theta.clone()), &ratio);
        }
        let name = self.theta;
        let trig_left = expr.any_node(&|node| {
            TrigFn::of(node).is_some_and(|(_, arg)| arg.contains_variable(name))
        });
        if trig_left {
            return Err(TrigSubError::IncompleteBackSubstitution { residual: expr });
        }
        let inverse = self.family.inverse_angle(triangle);
        let result = expr
            .substitute_variable(self.theta, &inverse)
            .try_simplify()
            .map_err(overflow)?;
        if result.contains_variable(self.theta) {
            return Err(TrigSubError::IncompleteBackSubstitution { residual: result });
        }
        info!("antiderivative in {}: {}", self.var, result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::utils::linspace;
    use crate::trig_substitution::classifier::classify;

    fn engine_for(input: &str) -> (Expr, SubstitutionFamily) {
        let integrand = Expr::parse_expression(input).unwrap();
        let family = classify(&integrand, "x").unwrap().family;
        (integrand, family)
    }

    #[test]
    fn test_radical_collapses_to_cofunction() {
        let cases = [
            ("sqrt(9 - x^2)", "3*cos(theta)"),
            ("sqrt(16 + x^2)", "4*sec(theta)"),
            ("sqrt(x^2 - 4)", "2*tan(theta)"),
        ];
        for (input, expected) in cases {
            let (radical, family) = engine_for(input);
            let engine = SubstitutionEngine::new(&family, "x", "theta");
            let substituted = radical.substitute_variable("x", &family.forward("theta"));
            assert_eq!(engine.simplify(&substituted).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn test_transform_then_simplify() {
        let (integrand, family) = engine_for("1/(x^2*sqrt(x^2 - 4))");
        let engine = SubstitutionEngine::new(&family, "x", "theta");
        let transformed = engine.transform(&integrand);
        assert!(!transformed.contains_variable("x"));
        let simplified = engine.simplify(&transformed).unwrap();
        assert_eq!(simplified.to_string(), "1/(4*sec(theta))");
    }

    #[test]
    fn test_integrate_and_back_substitute() {
        let (integrand, family) = engine_for("x^2/sqrt(16 + x^2)");
        let engine = SubstitutionEngine::new(&family, "x", "theta");
        let simplified = engine.simplify(&engine.transform(&integrand)).unwrap();
        let raw = engine.integrate(&simplified).unwrap();
        // only tan and sec of the angle remain
        assert!(!raw.any_node(&|n| matches!(TrigFn::of(n), Some((f, _)) if f != TrigFn::Tan && f != TrigFn::Sec)));
        let triangle = family.triangle("x");
        let result = engine.back_substitute(&raw, &triangle).unwrap();
        assert!(!result.contains_variable("theta"));
        let derivative = result.diff("x");
        let points = linspace(0.5, 8.0, 20);
        let r = derivative.max_residual_against(&integrand, "x", &points).unwrap();
        assert!(r < 1e-9, "{}", result);
    }

    #[test]
    fn test_unintegrable_angle_form_is_delegated_failure() {
        let (_, family) = engine_for("sqrt(4 - x^2)");
        let engine = SubstitutionEngine::new(&family, "x", "theta");
        let e = Expr::parse_expression("theta*sin(theta)").unwrap();
        let err = engine.integrate(&e).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Integrate));
    }

    #[test]
    fn test_overflow_fails_in_simplify() {
        // (10*tan)^20 needs 10^20
        let (integrand, family) = engine_for("x^20/sqrt(100 + x^2)");
        let engine = SubstitutionEngine::new(&family, "x", "theta");
        let err = engine.simplify(&engine.transform(&integrand)).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Simplify));
        assert!(matches!(err, TrigSubError::DelegatedComputationFailure { .. }));
    }

    #[test]
    fn test_residual_trig_of_other_argument() {
        let (_, family) = engine_for("sqrt(4 - x^2)");
        let engine = SubstitutionEngine::new(&family, "x", "theta");
        let raw = Expr::parse_expression("sin(2*theta)").unwrap();
        let err = engine.back_substitute(&raw, &family.triangle("x")).unwrap_err();
        assert!(matches!(err, TrigSubError::IncompleteBackSubstitution { .. }));
    }
}
