use crate::symbolic::symbolic_engine::Expr;
use log::debug;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, one_of},
    combinator::{all_consuming, map_res, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};
use num::rational::Rational64;
/// a module turns a String expression into a symbolic expression
///# Example
/// ```
/// use RustedTrigSub::symbolic::symbolic_engine::Expr;
/// let input = "1/(x**2 * sqrt(x**2 - 4))";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// ```
//                  grammar
//     expr   := term   (('+' | '-') term)*
//     term   := unary  (('*' | '/') unary)*
//     unary  := ('-' | '+') unary | power
//     power  := atom ('^' unary)?            right associative, x^-1 allowed
//     atom   := number | call | ident | '(' expr ')'
//     call   := ident '(' expr ')'
//  `**` is rewritten to `^` before parsing.

fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Decimal literal read as an exact rational: "2.25" -> 9/4.
fn decimal_to_rational(literal: &str) -> Result<Rational64, String> {
    match literal.split_once('.') {
        None => literal
            .parse::<i64>()
            .map(Rational64::from_integer)
            .map_err(|e| format!("integer literal '{}' is out of range: {}", literal, e)),
        Some((int_part, frac_part)) => {
            let digits = format!("{}{}", int_part, frac_part);
            let numer = digits
                .parse::<i64>()
                .map_err(|e| format!("decimal literal '{}' is out of range: {}", literal, e))?;
            let denom = 10_i64
                .checked_pow(frac_part.len() as u32)
                .ok_or_else(|| format!("decimal literal '{}' has too many digits", literal))?;
            Ok(Rational64::new(numer, denom))
        }
    }
}

fn number(input: &str) -> IResult<&str, Expr> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        |literal: &str| decimal_to_rational(literal).map(Expr::Const),
    )
    .parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn apply_function(name: &str, arg: Expr) -> Result<Expr, String> {
    let arg = Box::new(arg);
    let expr = match name {
        "sqrt" => Expr::Pow(arg, Expr::half().boxed()),
        "exp" => Expr::Exp(arg),
        "ln" | "log" => Expr::Ln(arg),
        "sin" => Expr::sin(arg),
        "cos" => Expr::cos(arg),
        "tan" | "tg" => Expr::tg(arg),
        "cot" | "ctg" => Expr::ctg(arg),
        "sec" => Expr::sec(arg),
        "csc" | "cosec" => Expr::csc(arg),
        "asin" | "arcsin" => Expr::arcsin(arg),
        "acos" | "arccos" => Expr::arccos(arg),
        "atan" | "arctan" | "arctg" => Expr::arctg(arg),
        "acot" | "arccot" | "arcctg" => Expr::arcctg(arg),
        _ => return Err(format!("unknown function '{}'", name)),
    };
    Ok(expr)
}

fn call(input: &str) -> IResult<&str, Expr> {
    map_res(
        pair(
            identifier,
            preceded(multispace0, delimited(char('('), expr, char(')'))),
        ),
        |(name, arg)| apply_function(name, arg),
    )
    .parse(input)
}

fn variable(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = identifier(input)?;
    Ok((rest, Expr::Var(name.to_string())))
}

fn atom(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        number,
        call,
        variable,
        delimited(char('('), expr, char(')')),
    )))
    .parse(input)
}

fn power(input: &str) -> IResult<&str, Expr> {
    let (rest, base) = atom(input)?;
    let (rest, exponent) = opt(preceded(char('^'), unary)).parse(rest)?;
    let expr = match exponent {
        // `x^(3/2)` keeps its exponent as one exact constant
        Some(exp) => match exp.sum_of_products().ok().and_then(|sum| sum.as_constant()) {
            Some(c) => Expr::Pow(Box::new(base), Box::new(Expr::Const(c))),
            None => Expr::Pow(Box::new(base), Box::new(exp)),
        },
        None => base,
    };
    Ok((rest, expr))
}

fn unary(input: &str) -> IResult<&str, Expr> {
    let (rest, sign) = opt(ws(one_of("+-"))).parse(input)?;
    match sign {
        Some('-') => {
            let (rest, operand) = unary(rest)?;
            // a negated literal stays a literal
            let negated = match operand {
                Expr::Const(c) => Expr::Const(-c),
                other => Expr::Mul(Box::new(Expr::int(-1)), Box::new(other)),
            };
            Ok((rest, negated))
        }
        Some(_) => unary(rest),
        None => power(rest),
    }
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (rest, first) = unary(input)?;
    let (rest, tail) = many0(pair(ws(one_of("*/")), unary)).parse(rest)?;
    let expr = tail.into_iter().fold(first, |acc, (op, rhs)| match op {
        '*' => Expr::Mul(Box::new(acc), Box::new(rhs)),
        _ => Expr::Div(Box::new(acc), Box::new(rhs)),
    });
    Ok((rest, expr))
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (rest, first) = term(input)?;
    let (rest, tail) = many0(pair(ws(one_of("+-")), term)).parse(rest)?;
    let expr = tail.into_iter().fold(first, |acc, (op, rhs)| match op {
        '+' => Expr::Add(Box::new(acc), Box::new(rhs)),
        _ => Expr::Sub(Box::new(acc), Box::new(rhs)),
    });
    Ok((rest, expr))
}

/// Parses a textual expression such as `1/(x**2 * sqrt(x**2 - 4))`.
///
/// Both `**` and `^` denote powers. Numbers are read exactly, function names follow
/// the usual conventions (`sqrt`, `asin`, `atan`, ...) as well as `tg`/`ctg`.
pub fn parse_expression_func(input: &str) -> Result<Expr, String> {
    let normalized = input.replace("**", "^");
    if normalized.trim().is_empty() {
        return Err("empty expression".to_string());
    }
    match all_consuming(terminated(expr, multispace0)).parse(normalized.as_str()) {
        Ok((_, parsed)) => {
            debug!("parsed '{}' as {}", input, parsed);
            Ok(parsed)
        }
        Err(e) => Err(format!("cannot parse '{}': {}", input, e)),
    }
}

impl Expr {
    /// Parses a textual expression, see [`parse_expression_func`].
    pub fn parse_expression(input: &str) -> Result<Expr, String> {
        parse_expression_func(input)
    }
}
