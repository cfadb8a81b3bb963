//! # Symbolic Engine Module
//!
//! This module provides the expression tree used by every other part of the crate: the
//! pattern classifier inspects it, the substitution engine rewrites it, and the algebra
//! routines (differentiation, simplification, integration in the angle variable) consume
//! and produce it.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! The core symbolic expression type supporting:
//! - **Variables**: `Var(String)` - symbolic variables like "x", "theta"
//! - **Constants**: `Const(Rational64)` - exact rational constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `ctg`, `sec`, `csc` and the inverse
//!   trigonometric functions
//!
//! Square roots are not a separate variant: `sqrt(u)` is `Pow(u, 1/2)`. With exact rational
//! exponents every radical `u^(k/2)` is recognisable structurally.
//!
//! ### Key Methods
//! - `var(name)`, `int(n)`, `frac(p, q)` - leaf constructors
//! - `substitute_variable(var, expr)` - replace a variable by an expression
//! - `replace_subexpr(target, replacement)` - replace a whole sub-expression
//! - `contains_variable(var)` - occurrence check
//! - `radical_parts()` - split `u^(k/2)` into `(u, k/2)`
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Expression Tree**: Uses Box<Expr> for nested expressions
//! 2. **Operator Overloading**: std::ops traits (Add, Sub, Mul, Div, Neg) for natural syntax
//! 3. **Exact arithmetic**: constants are `num::rational::Rational64`, so `sqrt(9/4)` stays
//!    exactly `3/2` and `sqrt(5)` stays symbolic
//! 4. **Non-standard Function Names**: Uses mathematical notation (tg, ctg) instead
//!    of programming conventions (tan, cot) for trigonometric variants

#![allow(non_camel_case_types)]

use num::rational::Rational64;
use num::{One, Signed, Zero};
use std::fmt;
use strum_macros::{Display, EnumIter};

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::int(2)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "theta")
    Var(String),
    /// Exact rational constant
    Const(Rational64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
    /// Cotangent function: cot(x) - uses mathematical notation 'ctg'
    ctg(Box<Expr>),
    /// Secant function: 1/cos(x)
    sec(Box<Expr>),
    /// Cosecant function: 1/sin(x)
    csc(Box<Expr>),
    /// Arcsine function: arcsin(x)
    arcsin(Box<Expr>),
    /// Arccosine function: arccos(x)
    arccos(Box<Expr>),
    /// Arctangent function: arctan(x) - uses mathematical notation 'arctg'
    arctg(Box<Expr>),
    /// Arccotangent function: arccot(x) - uses mathematical notation 'arcctg'
    arcctg(Box<Expr>),
}

/// The six trigonometric functions, used wherever a rule has to name one of them as data
/// (substitution tables, triangle ratios, identities).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum TrigFn {
    #[strum(to_string = "sin")]
    Sin,
    #[strum(to_string = "cos")]
    Cos,
    #[strum(to_string = "tan")]
    Tan,
    #[strum(to_string = "cot")]
    Cot,
    #[strum(to_string = "sec")]
    Sec,
    #[strum(to_string = "csc")]
    Csc,
}

impl TrigFn {
    /// Builds `f(arg)` as an expression.
    pub fn apply(self, arg: Expr) -> Expr {
        let arg = arg.boxed();
        match self {
            TrigFn::Sin => Expr::sin(arg),
            TrigFn::Cos => Expr::cos(arg),
            TrigFn::Tan => Expr::tg(arg),
            TrigFn::Cot => Expr::ctg(arg),
            TrigFn::Sec => Expr::sec(arg),
            TrigFn::Csc => Expr::csc(arg),
        }
    }

    /// If `expr` is a trigonometric function call, returns the function and its argument.
    pub fn of(expr: &Expr) -> Option<(TrigFn, &Expr)> {
        match expr {
            Expr::sin(arg) => Some((TrigFn::Sin, arg)),
            Expr::cos(arg) => Some((TrigFn::Cos, arg)),
            Expr::tg(arg) => Some((TrigFn::Tan, arg)),
            Expr::ctg(arg) => Some((TrigFn::Cot, arg)),
            Expr::sec(arg) => Some((TrigFn::Sec, arg)),
            Expr::csc(arg) => Some((TrigFn::Csc, arg)),
            _ => None,
        }
    }

    /// Exponents `(m, n)` such that `f = sin^m * cos^n`.
    pub fn sin_cos_exponents(self) -> (i64, i64) {
        match self {
            TrigFn::Sin => (1, 0),
            TrigFn::Cos => (0, 1),
            TrigFn::Tan => (1, -1),
            TrigFn::Cot => (-1, 1),
            TrigFn::Sec => (0, -1),
            TrigFn::Csc => (-1, 0),
        }
    }
}

/// Binding strength used by `Display` to decide where parentheses are needed.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(_, _) | Expr::Sub(_, _) => 1,
        Expr::Mul(_, _) | Expr::Div(_, _) => 2,
        Expr::Const(c) if c.is_negative() || !c.is_integer() => 2,
        Expr::Pow(_, exp) if **exp == Expr::half() => 5,
        Expr::Pow(_, _) => 4,
        _ => 5,
    }
}

fn fmt_operand(f: &mut fmt::Formatter, expr: &Expr, min_prec: u8) -> fmt::Result {
    if precedence(expr) < min_prec {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Parentheses are only emitted where precedence requires them, `u^(1/2)` prints as
/// `sqrt(u)`, and the output can be fed back into the parser.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => {
                fmt_operand(f, lhs, 1)?;
                write!(f, " + ")?;
                fmt_operand(f, rhs, 1)
            }
            Expr::Sub(lhs, rhs) => {
                fmt_operand(f, lhs, 1)?;
                write!(f, " - ")?;
                fmt_operand(f, rhs, 2)
            }
            Expr::Mul(lhs, rhs) => {
                fmt_operand(f, lhs, 2)?;
                write!(f, "*")?;
                fmt_operand(f, rhs, 3)
            }
            Expr::Div(lhs, rhs) => {
                fmt_operand(f, lhs, 2)?;
                write!(f, "/")?;
                fmt_operand(f, rhs, 3)
            }
            Expr::Pow(base, exp) => {
                if **exp == Expr::half() {
                    return write!(f, "sqrt({})", base);
                }
                fmt_operand(f, base, 5)?;
                write!(f, "^")?;
                fmt_operand(f, exp, 5)
            }
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tan({})", expr),
            Expr::ctg(expr) => write!(f, "cot({})", expr),
            Expr::sec(expr) => write!(f, "sec({})", expr),
            Expr::csc(expr) => write!(f, "csc({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctan({})", expr),
            Expr::arcctg(expr) => write!(f, "arccot({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::int(-1)), Box::new(self))
    }
}

impl std::ops::MulAssign for Expr {
    fn mul_assign(&mut self, rhs: Self) {
        *self = Expr::Mul(Box::new(self.clone()), Box::new(rhs));
    }
}

impl Expr {
    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    pub fn int(value: i64) -> Expr {
        Expr::Const(Rational64::from_integer(value))
    }

    /// Exact fraction `numer/denom`. Panics on a zero denominator, like `Ratio::new`.
    pub fn frac(numer: i64, denom: i64) -> Expr {
        Expr::Const(Rational64::new(numer, denom))
    }

    pub fn half() -> Expr {
        Expr::frac(1, 2)
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Square root as the power `self^(1/2)`.
    pub fn sqrt(self) -> Expr {
        Expr::Pow(self.boxed(), Expr::half().boxed())
    }

    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    pub fn as_const(&self) -> Option<Rational64> {
        match self {
            Expr::Const(c) => Some(*c),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(c) if c.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(c) if c.is_one())
    }

    /// Splits a radical `u^(k/2)` (odd `k`) into `(u, k/2)`.
    pub fn radical_parts(&self) -> Option<(&Expr, Rational64)> {
        match self {
            Expr::Pow(base, exp) => match exp.as_ref() {
                Expr::Const(q) if *q.denom() == 2 => Some((base.as_ref(), *q)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Direct children of the node, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Var(_) | Expr::Const(_) => Vec::new(),
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Exp(arg)
            | Expr::Ln(arg)
            | Expr::sin(arg)
            | Expr::cos(arg)
            | Expr::tg(arg)
            | Expr::ctg(arg)
            | Expr::sec(arg)
            | Expr::csc(arg)
            | Expr::arcsin(arg)
            | Expr::arccos(arg)
            | Expr::arctg(arg)
            | Expr::arcctg(arg) => vec![arg.as_ref()],
        }
    }

    /// Rebuilds the node with every direct child passed through `f`.
    pub fn map_children<F>(&self, mut f: F) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
    {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Sub(lhs, rhs) => Expr::Sub(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Mul(lhs, rhs) => Expr::Mul(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Div(lhs, rhs) => Expr::Div(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Pow(base, exp) => Expr::Pow(f(base).boxed(), f(exp).boxed()),
            Expr::Exp(arg) => Expr::Exp(f(arg).boxed()),
            Expr::Ln(arg) => Expr::Ln(f(arg).boxed()),
            Expr::sin(arg) => Expr::sin(f(arg).boxed()),
            Expr::cos(arg) => Expr::cos(f(arg).boxed()),
            Expr::tg(arg) => Expr::tg(f(arg).boxed()),
            Expr::ctg(arg) => Expr::ctg(f(arg).boxed()),
            Expr::sec(arg) => Expr::sec(f(arg).boxed()),
            Expr::csc(arg) => Expr::csc(f(arg).boxed()),
            Expr::arcsin(arg) => Expr::arcsin(f(arg).boxed()),
            Expr::arccos(arg) => Expr::arccos(f(arg).boxed()),
            Expr::arctg(arg) => Expr::arctg(f(arg).boxed()),
            Expr::arcctg(arg) => Expr::arcctg(f(arg).boxed()),
        }
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            _ => self.map_children(|child| child.substitute_variable(var, expr)),
        }
    }

    /// Replaces every occurrence of the sub-expression `target` by `replacement`.
    ///
    /// Matching is structural equality; replaced nodes are not searched again.
    pub fn replace_subexpr(&self, target: &Expr, replacement: &Expr) -> Expr {
        if self == target {
            return replacement.clone();
        }
        self.map_children(|child| child.replace_subexpr(target, replacement))
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            _ => self
                .children()
                .into_iter()
                .any(|child| child.contains_variable(var_name)),
        }
    }

    /// True if some node satisfies the predicate (pre-order search).
    pub fn any_node<P>(&self, pred: &P) -> bool
    where
        P: Fn(&Expr) -> bool,
    {
        pred(self) || self.children().into_iter().any(|child| child.any_node(pred))
    }

    /// Sorted, deduplicated names of all variables in the expression.
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<String>) {
        if let Expr::Var(name) = self {
            vars.push(name.clone());
        }
        for child in self.children() {
            child.collect_variables(vars);
        }
    }
}
