// the collection of utility functions: sampling grids, finite differences and the
// integer arithmetic behind exact square roots

use num::integer::Roots;
use num::rational::Rational64;
use num::{CheckedAdd, CheckedMul, One, Signed, Zero};

pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    if num_values == 1 {
        return vec![start];
    }
    let step = (end - start) / (num_values as f64 - 1.0);
    (0..num_values).map(|i| start + i as f64 * step).collect()
}
/*
    let x_values = vec![0.0, 1.0, 2.0, 3.0, 4.0];
    let h = 0.001;
    let derivatives = numerical_derivative(f, x_values, h);
*/
pub fn numerical_derivative<F>(f: F, x_values: Vec<f64>, h: f64) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    x_values
        .iter()
        .map(|&x| (f(x + h) - f(x - h)) / (2.0 * h))
        .collect()
}

// compute norm of two vectors
pub fn norm(x: Vec<f64>, y: Vec<f64>) -> f64 {
    assert_eq!(x.len(), y.len());
    if x.is_empty() {
        return 0.0;
    }
    (1.0 / x.len() as f64)
        * x.iter()
            .zip(y.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
}

/// Largest trial divisor of `square_free_split`.
const TRIAL_DIVISION_LIMIT: i64 = 1_000_000;

/// Splits a positive integer as `n = s^2 * r`, returns `(s, r)`. `r` is squarefree unless
/// it has a repeated prime factor above `TRIAL_DIVISION_LIMIT` that is not a perfect square
/// on its own.
pub fn square_free_split(n: i64) -> (i64, i64) {
    debug_assert!(n > 0);
    let mut s = 1_i64;
    let mut r = 1_i64;
    let mut rest = n;
    let mut p = 2_i64;
    while p <= rest / p && p <= TRIAL_DIVISION_LIMIT {
        let mut count = 0;
        while rest % p == 0 {
            rest /= p;
            count += 1;
        }
        s *= p.pow(count / 2);
        if count % 2 == 1 {
            r *= p;
        }
        p += 1;
    }
    let root = rest.sqrt();
    if rest > 1 && root * root == rest {
        return (s * root, r);
    }
    (s, r * rest)
}

// i64::MIN has no negation, so it is treated as out of range as well
fn in_range(q: Rational64) -> Option<Rational64> {
    (*q.numer() != i64::MIN).then_some(q)
}

/// `a + b`, or an error if the reduced sum does not fit in 64 bits.
pub fn rational_add(a: Rational64, b: Rational64) -> Result<Rational64, String> {
    a.checked_add(&b)
        .and_then(in_range)
        .ok_or_else(|| format!("rational overflow in {} + {}", a, b))
}

/// `a * b`, or an error if the reduced product does not fit in 64 bits.
pub fn rational_mul(a: Rational64, b: Rational64) -> Result<Rational64, String> {
    a.checked_mul(&b)
        .and_then(in_range)
        .ok_or_else(|| format!("rational overflow in {} * {}", a, b))
}

/// Writes `sqrt(q)` for a positive rational as `c * sqrt(r)` with `c` rational and `r`
/// a squarefree integer: `sqrt(p/q) = sqrt(p*q)/q`.
pub fn rational_sqrt_parts(q: Rational64) -> Result<(Rational64, i64), String> {
    let (n, d) = (*q.numer(), *q.denom());
    let product = n
        .checked_mul(d)
        .ok_or_else(|| format!("rational overflow in sqrt({})", q))?;
    let (s, r) = square_free_split(product);
    Ok((Rational64::new(s, d), r))
}

/// Integer power of a rational, negative exponents invert.
pub fn rational_powi(base: Rational64, exp: i64) -> Result<Rational64, String> {
    if exp == 0 {
        return Ok(Rational64::one());
    }
    if base.is_zero() || base.abs().is_one() {
        let odd = exp % 2 != 0;
        return Ok(if base.is_zero() || odd { base } else { Rational64::one() });
    }
    let mut result = Rational64::one();
    for _ in 0..exp.unsigned_abs() {
        result = rational_mul(result, base)
            .map_err(|_| format!("rational overflow in ({})^{}", base, exp))?;
    }
    if exp < 0 { Ok(result.recip()) } else { Ok(result) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
    }

    #[test]
    fn test_square_free_split() {
        assert_eq!(square_free_split(1), (1, 1));
        assert_eq!(square_free_split(12), (2, 3));
        assert_eq!(square_free_split(72), (6, 2));
        assert_eq!(square_free_split(49), (7, 1));
        assert_eq!(square_free_split(30), (1, 30));
    }

    #[test]
    fn test_square_free_split_large() {
        // 10^10 = (10^5)^2
        assert_eq!(square_free_split(10_000_000_000), (100_000, 1));
        // i64::MAX = 7^2 * 73 * 127 * 337 * 92737 * 649657
        assert_eq!(square_free_split(i64::MAX), (7, i64::MAX / 49));
        // two primes above the trial limit: 1000003^2
        assert_eq!(square_free_split(1_000_006_000_009), (1_000_003, 1));
        assert_eq!(square_free_split(2 * 1_000_006_000_009), (1_000_003, 2));
    }

    #[test]
    fn test_rational_sqrt_parts() {
        // sqrt(1/2) = sqrt(2)/2
        assert_eq!(rational_sqrt_parts(Rational64::new(1, 2)).unwrap(), (Rational64::new(1, 2), 2));
        assert_eq!(rational_sqrt_parts(Rational64::from_integer(20)).unwrap(), (Rational64::from_integer(2), 5));
        assert!(rational_sqrt_parts(Rational64::new(i64::MAX, i64::MAX - 1)).is_err());
    }

    #[test]
    fn test_rational_powi() {
        assert_eq!(rational_powi(Rational64::new(2, 3), 3).unwrap(), Rational64::new(8, 27));
        assert_eq!(rational_powi(Rational64::new(2, 3), -2).unwrap(), Rational64::new(9, 4));
        assert_eq!(rational_powi(Rational64::from_integer(5), 0).unwrap(), Rational64::one());
        assert_eq!(rational_powi(Rational64::from_integer(-1), 1001).unwrap(), Rational64::from_integer(-1));
        assert_eq!(rational_powi(Rational64::from_integer(2), 62).unwrap(), Rational64::from_integer(1 << 62));
    }

    #[test]
    fn test_rational_overflow_is_an_error() {
        assert!(rational_powi(Rational64::from_integer(2), 70).is_err());
        assert!(rational_powi(Rational64::from_integer(10), -20).is_err());
        assert!(rational_powi(Rational64::from_integer(-2), 63).is_err());
        let big = Rational64::from_integer(i64::MAX);
        assert!(rational_add(big, Rational64::one()).is_err());
        assert!(rational_mul(big, Rational64::from_integer(2)).is_err());
        assert_eq!(
            rational_add(Rational64::new(1, 2), Rational64::new(1, 3)).unwrap(),
            Rational64::new(5, 6)
        );
    }

    #[test]
    fn test_numerical_derivative() {
        let d = numerical_derivative(|x| x * x, vec![1.0, 2.0], 1e-5);
        assert!((d[0] - 2.0).abs() < 1e-8);
        assert!((d[1] - 4.0).abs() < 1e-8);
    }
}
