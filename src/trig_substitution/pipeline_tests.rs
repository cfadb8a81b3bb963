//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::symbolic::symbolic_engine::Expr;
    use crate::symbolic::utils::linspace;
    use crate::trig_substitution::config::SubstitutionConfig;
    use crate::trig_substitution::errors::TrigSubError;
    use crate::trig_substitution::family::FamilyKind;
    use crate::trig_substitution::pipeline::{
        PipelineState, Stage, StageObserver, StagePayload, TrigSubstitution,
    };
    use strum::IntoEnumIterator;

    const MENU: [&str; 4] = [
        "1/(x**2 * sqrt(x**2 - 4))",
        "1/sqrt(9 - x**2)",
        "x**2/sqrt(16 + x**2)",
        "1/(x * sqrt(x**2 - 25))",
    ];

    #[derive(Default)]
    struct Recorder {
        payloads: Vec<StagePayload>,
    }

    impl StageObserver for Recorder {
        fn on_stage(&mut self, payload: &StagePayload) {
            self.payloads.push(payload.clone());
        }
    }

    fn derivative_residual(antiderivative: &Expr, integrand: &Expr, lo: f64, hi: f64) -> f64 {
        let points = linspace(lo, hi, 30);
        antiderivative
            .diff("x")
            .max_residual_against(integrand, "x", &points)
            .unwrap()
    }

    #[test]
    fn test_sec_form_menu_integral() {
        let solver = TrigSubstitution::default();
        let result = solver.resolve_str("1/(x**2 * sqrt(x**2 - 4))").unwrap();
        let family = result.family.clone().unwrap();
        assert_eq!(family.kind(), FamilyKind::SecForm);
        assert_eq!(family.parameter().value(), &Expr::int(2));
        assert_eq!(
            result.antiderivative.as_ref().unwrap().to_string(),
            "sqrt(x^2 - 4)/(4*x)"
        );
        assert_eq!(result.state, PipelineState::Done);
        assert!(result.cross_check.as_ref().unwrap().agrees);
    }

    #[test]
    fn test_sin_form_menu_integral() {
        let solver = TrigSubstitution::default();
        let result = solver.resolve_str("1/sqrt(9 - x**2)").unwrap();
        assert_eq!(result.family.as_ref().unwrap().kind(), FamilyKind::SinForm);
        assert_eq!(result.simplified.as_ref().unwrap(), &Expr::int(1));
        assert_eq!(result.theta_antiderivative.as_ref().unwrap().to_string(), "theta");
        assert_eq!(result.antiderivative.unwrap().to_string(), "arcsin(x/3)");
    }

    #[test]
    fn test_tan_form_menu_integral() {
        let solver = TrigSubstitution::default();
        let result = solver.resolve_str("x**2/sqrt(16 + x**2)").unwrap();
        assert_eq!(result.family.as_ref().unwrap().kind(), FamilyKind::TanForm);
        let antiderivative = result.antiderivative.as_ref().unwrap();
        assert!(antiderivative.any_node(&|n| matches!(n, Expr::Ln(_))));
        assert!(derivative_residual(antiderivative, &result.integrand, 0.5, 10.0) < 1e-9);
        assert!(result.cross_check.unwrap().agrees);
    }

    #[test]
    fn test_arccos_menu_integral() {
        let solver = TrigSubstitution::default();
        let result = solver.resolve_str("1/(x * sqrt(x**2 - 25))").unwrap();
        assert_eq!(result.simplified.as_ref().unwrap(), &Expr::frac(1, 5));
        assert_eq!(result.antiderivative.unwrap().to_string(), "arccos(5/x)/5");
    }

    #[test]
    fn test_every_stage_reported_in_order() {
        let solver = TrigSubstitution::default();
        let integrand = Expr::parse_expression(MENU[0]).unwrap();
        let mut recorder = Recorder::default();
        let result = solver.resolve_with(&integrand, &mut recorder).unwrap();
        let stages: Vec<Stage> = recorder.payloads.iter().map(|p| p.stage).collect();
        assert_eq!(stages, Stage::iter().collect::<Vec<_>>());
        assert_eq!(result.stages, recorder.payloads);
        assert!(recorder.payloads.iter().all(|p| !p.markup.is_empty()));
        assert!(recorder.payloads[1].expression.is_none());
        assert_eq!(
            recorder.payloads[5].expression,
            result.antiderivative
        );
    }

    #[test]
    fn test_irrational_parameter() {
        let solver = TrigSubstitution::default();
        let result = solver.resolve_str("1/sqrt(5 - x**2)").unwrap();
        let family = result.family.clone().unwrap();
        assert_eq!(family.parameter().value(), &Expr::int(5).sqrt());
        let antiderivative = result.antiderivative.as_ref().unwrap();
        assert!(matches!(antiderivative, Expr::arcsin(_)));
        assert!(derivative_residual(antiderivative, &result.integrand, 0.3, 2.0) < 1e-9);
        assert!(result.cross_check.unwrap().agrees);
    }

    #[test]
    fn test_more_integrals_verify() {
        let solver = TrigSubstitution::default();
        for input in [
            "sqrt(9 - x^2)",
            "x^3*sqrt(4 - x^2)",
            "1/(x^2 + 4)^(3/2)",
            "sqrt(x^2 - 9)/x",
            "x*sqrt(x^2 + 1)",
            "1/(x^2*sqrt(16 + x^2))",
        ] {
            let result = solver.resolve_str(input).unwrap();
            let antiderivative = result.antiderivative.as_ref().unwrap();
            assert!(!antiderivative.contains_variable("theta"), "{}", input);
            let check = result.cross_check.as_ref().unwrap();
            assert!(check.agrees, "{}: {:?} for {}", input, check, antiderivative);
        }
    }

    #[test]
    fn test_power_of_sum_antiderivative() {
        let solver = TrigSubstitution::default();
        let result = solver.resolve_str("1/(x^2 + 4)^(3/2)").unwrap();
        assert_eq!(
            result.antiderivative.unwrap().to_string(),
            "x/(4*sqrt(x^2 + 4))"
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let solver = TrigSubstitution::default();
        for input in MENU {
            let first = solver.resolve_str(input).unwrap();
            let second = solver.resolve_str(input).unwrap();
            assert_eq!(first, second);
            let antiderivative = first.antiderivative.unwrap();
            assert_eq!(antiderivative.simplify(), antiderivative);
        }
    }

    #[test]
    fn test_batch_keeps_order() {
        let solver = TrigSubstitution::default();
        let integrands: Vec<Expr> = MENU
            .iter()
            .map(|s| Expr::parse_expression(s).unwrap())
            .collect();
        let batch = solver.resolve_batch(&integrands);
        assert_eq!(batch.len(), MENU.len());
        for (integrand, result) in integrands.iter().zip(batch) {
            let single = solver.resolve(integrand).unwrap();
            assert_eq!(result.unwrap(), single);
        }
    }

    #[test]
    fn test_classification_failure_returns_integrand() {
        let solver = TrigSubstitution::default();
        let err = solver.resolve_str("x^3 + 1").unwrap_err();
        match err {
            TrigSubError::ClassificationFailure { integrand } => {
                assert_eq!(integrand, Expr::parse_expression("x^3 + 1").unwrap())
            }
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_malformed_and_parse_failures() {
        let solver = TrigSubstitution::default();
        let err = solver.resolve_str("sqrt(-4 - x^2)").unwrap_err();
        assert!(matches!(err, TrigSubError::MalformedParameterFailure { .. }));
        assert_eq!(err.stage(), Some(Stage::Detect));
        let err = solver.resolve_str("sqrt(9 - x**2").unwrap_err();
        assert!(matches!(err, TrigSubError::ParseFailure { .. }));
    }

    #[test]
    fn test_delegated_failures_name_their_stage() {
        let solver = TrigSubstitution::default();
        let err = solver.resolve_str("sqrt(9 - x^2)*sqrt(x + 1)").unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Simplify));
        let err = solver.resolve_str("sqrt(9 - x^2)*exp(x)").unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Integrate));
    }

    #[test]
    fn test_large_parameter_and_high_powers() {
        let solver = TrigSubstitution::default();
        let result = solver.resolve_str("1/sqrt(10000000000 - x**2)").unwrap();
        assert_eq!(result.family.as_ref().unwrap().parameter().value(), &Expr::int(100000));
        assert_eq!(result.antiderivative.unwrap().to_string(), "arcsin(x/100000)");
        for input in ["x**5/sqrt(x**2 + 100)", "x**9*sqrt(1 - x**2)"] {
            let result = solver.resolve_str(input).unwrap();
            let check = result.cross_check.as_ref().unwrap();
            assert!(check.agrees, "{}: {:?}", input, check);
        }
    }

    #[test]
    fn test_coefficient_overflow_is_a_simplify_failure() {
        let solver = TrigSubstitution::default();
        for input in [
            "x**8/sqrt(100000 + x**2)",
            "x**20/sqrt(100 + x**2)",
            "x**4/sqrt(10000000000 - x**2)",
            "sqrt(x**2 + 1)*2**70",
        ] {
            let err = solver.resolve_str(input).unwrap_err();
            assert!(
                matches!(err, TrigSubError::DelegatedComputationFailure { stage: Stage::Simplify, .. }),
                "{}: {}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_high_secant_power_never_panics() {
        let solver = TrigSubstitution::default();
        match solver.resolve_str("x**30/sqrt(x**2 - 9)") {
            Ok(result) => {
                let antiderivative = result.antiderivative.unwrap();
                assert!(!antiderivative.contains_variable("theta"));
            }
            Err(err) => {
                assert!(
                    matches!(err, TrigSubError::DelegatedComputationFailure { .. }),
                    "{}",
                    err
                );
                assert!(err.stage() >= Some(Stage::Simplify));
            }
        }
        // beyond the degree the reduction formulas handle
        let err = solver.resolve_str("x**60/sqrt(x**2 - 1)").unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Integrate));
    }

    #[test]
    fn test_custom_variable_names() {
        let config = SubstitutionConfig::new().with_variable("u").with_angle("t");
        let solver = TrigSubstitution::new(config).unwrap();
        let result = solver.resolve_str("1/sqrt(4 - u^2)").unwrap();
        assert_eq!(result.antiderivative.unwrap().to_string(), "arcsin(u/2)");
        assert!(TrigSubstitution::new(SubstitutionConfig::new().with_angle("x")).is_err());
    }

    #[test]
    fn test_cross_check_detects_wrong_antiderivative() {
        let solver = TrigSubstitution::default();
        let result = solver.resolve_str("1/sqrt(9 - x**2)").unwrap();
        let family = result.family.unwrap();
        let wrong = Expr::parse_expression("arcsin(x/3) + x^2").unwrap();
        let check = solver.cross_check(&result.integrand, &wrong, &family);
        assert!(!check.agrees);
        assert!((check.interval.0 - 0.6).abs() < 1e-12);
        assert!((check.interval.1 - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_summary_table_lists_stages() {
        let solver = TrigSubstitution::default();
        let table = solver.resolve_str(MENU[0]).unwrap().summary_table();
        for stage in Stage::iter() {
            assert!(table.contains(&stage.to_string()), "{}", stage);
        }
        assert!(table.contains("sqrt(x^2 - 4)/(4*x)"));
        assert!(table.contains("agrees"));
    }
}
