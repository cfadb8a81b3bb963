//! LaTeX rendering of expressions, used for the formula payloads of the pipeline stages.

use crate::symbolic::symbolic_engine::Expr;
use num::Signed;
use num::rational::Rational64;

fn latex_var(name: &str) -> String {
    match name {
        "theta" | "alpha" | "beta" | "phi" | "psi" | "tau" => format!("\\{}", name),
        _ => name.to_string(),
    }
}

fn needs_parens(expr: &Expr) -> bool {
    match expr {
        Expr::Add(_, _) | Expr::Sub(_, _) => true,
        Expr::Const(c) => c.is_negative(),
        _ => false,
    }
}

fn wrapped(expr: &Expr) -> String {
    if needs_parens(expr) {
        format!("\\left({}\\right)", expr.to_latex())
    } else {
        expr.to_latex()
    }
}

/// `(command, argument)` of a named function call.
fn function_parts(expr: &Expr) -> Option<(&'static str, &Expr)> {
    let parts = match expr {
        Expr::Ln(arg) => ("\\ln", arg.as_ref()),
        Expr::sin(arg) => ("\\sin", arg.as_ref()),
        Expr::cos(arg) => ("\\cos", arg.as_ref()),
        Expr::tg(arg) => ("\\tan", arg.as_ref()),
        Expr::ctg(arg) => ("\\cot", arg.as_ref()),
        Expr::sec(arg) => ("\\sec", arg.as_ref()),
        Expr::csc(arg) => ("\\csc", arg.as_ref()),
        Expr::arcsin(arg) => ("\\arcsin", arg.as_ref()),
        Expr::arccos(arg) => ("\\arccos", arg.as_ref()),
        Expr::arctg(arg) => ("\\arctan", arg.as_ref()),
        Expr::arcctg(arg) => ("\\operatorname{arccot}", arg.as_ref()),
        _ => return None,
    };
    Some(parts)
}

impl Expr {
    /// LaTeX markup of the expression.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let e = Expr::parse_expression("sqrt(x^2 - 4)/(4*x)").unwrap();
    /// assert_eq!(e.to_latex(), "\\frac{\\sqrt{x^{2} - 4}}{4 x}");
    /// ```
    pub fn to_latex(&self) -> String {
        match self {
            Expr::Var(name) => latex_var(name),
            Expr::Const(c) => {
                if c.is_integer() {
                    c.to_string()
                } else if c.is_negative() {
                    format!("-\\frac{{{}}}{{{}}}", -c.numer(), c.denom())
                } else {
                    format!("\\frac{{{}}}{{{}}}", c.numer(), c.denom())
                }
            }
            Expr::Add(lhs, rhs) => format!("{} + {}", lhs.to_latex(), rhs.to_latex()),
            Expr::Sub(lhs, rhs) => format!("{} - {}", lhs.to_latex(), wrapped(rhs)),
            Expr::Mul(lhs, rhs) => {
                if lhs.as_const() == Some(Rational64::from_integer(-1)) {
                    return format!("-{}", wrapped(rhs));
                }
                let separator = if rhs.as_const().is_some() { " \\cdot " } else { " " };
                format!("{}{}{}", wrapped(lhs), separator, wrapped(rhs))
            }
            Expr::Div(lhs, rhs) => format!("\\frac{{{}}}{{{}}}", lhs.to_latex(), rhs.to_latex()),
            Expr::Pow(base, exp) => {
                if **exp == Expr::half() {
                    return format!("\\sqrt{{{}}}", base.to_latex());
                }
                if let Some((command, arg)) = function_parts(base) {
                    return format!(
                        "{}^{{{}}}\\left({}\\right)",
                        command,
                        exp.to_latex(),
                        arg.to_latex()
                    );
                }
                let base = match base.as_ref() {
                    Expr::Var(_) | Expr::Const(_) if !needs_parens(base) => base.to_latex(),
                    _ => format!("\\left({}\\right)", base.to_latex()),
                };
                format!("{}^{{{}}}", base, exp.to_latex())
            }
            Expr::Exp(arg) => format!("e^{{{}}}", arg.to_latex()),
            _ => match function_parts(self) {
                Some((command, arg)) => format!("{}\\left({}\\right)", command, arg.to_latex()),
                None => self.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latex(input: &str) -> String {
        Expr::parse_expression(input).unwrap().to_latex()
    }

    #[test]
    fn test_latex_fraction_and_root() {
        assert_eq!(latex("sqrt(x^2 - 4)/(4*x)"), "\\frac{\\sqrt{x^{2} - 4}}{4 x}");
        assert_eq!(latex("3/4"), "\\frac{3}{4}");
    }

    #[test]
    fn test_latex_trig_powers() {
        assert_eq!(latex("sec(theta)^2"), "\\sec^{2}\\left(\\theta\\right)");
        assert_eq!(latex("arcsin(x/3)"), "\\arcsin\\left(\\frac{x}{3}\\right)");
    }

    #[test]
    fn test_latex_products_and_signs() {
        assert_eq!(latex("-x"), "-x");
        assert_eq!(latex("2*(x + 1)"), "2 \\left(x + 1\\right)");
        assert_eq!(latex("x - (x + 1)"), "x - \\left(x + 1\\right)");
        assert_eq!(latex("ln(sec(theta) + tan(theta))"), "\\ln\\left(\\sec\\left(\\theta\\right) + \\tan\\left(\\theta\\right)\\right)");
    }
}
