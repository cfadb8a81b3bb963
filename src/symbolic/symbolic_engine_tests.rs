//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::symbolic::symbolic_engine::{Expr, TrigFn};
    use strum::IntoEnumIterator;

    #[test]
    fn test_mul_assign() {
        let mut expr = Expr::var("x");
        expr *= Expr::int(2);
        let expected = Expr::Mul(Box::new(Expr::var("x")), Box::new(Expr::int(2)));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_neg() {
        let neg_expr = -Expr::var("x");
        let expected = Expr::Mul(Box::new(Expr::int(-1)), Box::new(Expr::var("x")));
        assert_eq!(neg_expr, expected);
    }

    #[test]
    fn test_display() {
        let x = Expr::var("x");
        let e = Expr::int(1) / (x.clone().pow(Expr::int(2)) * (x.clone().pow(Expr::int(2)) - Expr::int(4)).sqrt());
        assert_eq!(e.to_string(), "1/(x^2*sqrt(x^2 - 4))");
        let e = Expr::int(3) * Expr::arcsin((x.clone() / Expr::int(3)).boxed());
        assert_eq!(e.to_string(), "3*arcsin(x/3)");
        assert_eq!(Expr::frac(-1, 2).to_string(), "-1/2");
        let e = x.clone() - (x.clone() - Expr::int(1));
        assert_eq!(e.to_string(), "x - (x - 1)");
        let e = Expr::frac(1, 2) * x.clone();
        assert_eq!(e.to_string(), "1/2*x");
    }

    #[test]
    fn test_substitute_variable() {
        let x = Expr::var("x");
        let theta = Expr::var("theta");
        let e = (Expr::int(9) - x.clone().pow(Expr::int(2))).sqrt();
        let forward = Expr::int(3) * Expr::sin(theta.clone().boxed());
        let substituted = e.substitute_variable("x", &forward);
        assert!(!substituted.contains_variable("x"));
        assert!(substituted.contains_variable("theta"));
    }

    #[test]
    fn test_replace_subexpr() {
        let theta = Expr::var("theta");
        let sec = Expr::sec(theta.clone().boxed());
        let e = Expr::int(8) * sec.clone() * Expr::tg(theta.clone().boxed());
        let replaced = e.replace_subexpr(&sec, &(Expr::var("x") / Expr::int(4)));
        assert_eq!(replaced.to_string(), "8*(x/4)*tan(theta)");
    }

    #[test]
    fn test_radical_parts() {
        let x = Expr::var("x");
        let r = (x.clone() - Expr::int(1)).pow(Expr::frac(-3, 2));
        let (base, q) = r.radical_parts().unwrap();
        assert_eq!(base, &(x.clone() - Expr::int(1)));
        assert_eq!(q, num::rational::Rational64::new(-3, 2));
        assert!(x.pow(Expr::int(2)).radical_parts().is_none());
    }

    #[test]
    fn test_all_arguments_are_variables() {
        let e = Expr::parse_expression("theta*x + sin(x) + a").unwrap();
        assert_eq!(e.all_arguments_are_variables(), vec!["a", "theta", "x"]);
    }

    #[test]
    fn test_any_node() {
        let e = Expr::parse_expression("1/(x*sqrt(x^2 - 25))").unwrap();
        assert!(e.any_node(&|n| n.radical_parts().is_some()));
        assert!(!e.any_node(&|n| matches!(n, Expr::sin(_))));
    }

    #[test]
    fn test_trig_fn_round_trip() {
        let t = Expr::var("t");
        for f in TrigFn::iter() {
            let applied = f.apply(t.clone());
            let (g, arg) = TrigFn::of(&applied).unwrap();
            assert_eq!(g, f);
            assert_eq!(arg, &t);
            assert_eq!(applied.to_string(), format!("{}(t)", f));
        }
        assert!(TrigFn::of(&t).is_none());
    }

    #[test]
    fn test_sin_cos_exponents_match_values() {
        let t = 0.7_f64;
        for f in TrigFn::iter() {
            let (m, n) = f.sin_cos_exponents();
            let expected = t.sin().powi(m as i32) * t.cos().powi(n as i32);
            let value = f.apply(Expr::var("t")).eval_at("t", t);
            assert!((value - expected).abs() < 1e-12, "{}", f);
        }
    }
}
