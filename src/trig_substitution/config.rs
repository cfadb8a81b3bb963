//! Run configuration: variable names, cross-check settings and log level.
//!
//! Can be built in code or read from a TOML document:
//! ```toml
//! loglevel = "info"
//!
//! [substitution]
//! variable = "x"
//! angle = "theta"
//!
//! [verification]
//! quadrature_degree = 32
//! sample_points = 25
//! tolerance = 1e-6
//! strict = false
//! ```

use crate::trig_substitution::errors::TrigSubError;
use log::LevelFilter;
use toml::{Table, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionConfig {
    /// integration variable
    pub variable: String,
    /// angle variable introduced by the substitution
    pub angle: String,
    /// number of Gauss-Legendre nodes of the cross-check
    pub quadrature_degree: usize,
    /// points at which the derivative of the antiderivative is compared with the integrand
    pub sample_points: usize,
    /// relative tolerance of the cross-check
    pub tolerance: f64,
    /// turn a failed cross-check into an error instead of a warning
    pub strict_verification: bool,
    /// log level for `Utils::logger::init_logger`; `None` leaves logging alone
    pub loglevel: Option<String>,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        SubstitutionConfig {
            variable: "x".to_string(),
            angle: "theta".to_string(),
            quadrature_degree: 32,
            sample_points: 25,
            tolerance: 1e-6,
            strict_verification: false,
            loglevel: None,
        }
    }
}

/// Parses a log level name. `"off"` and `"none"` disable logging.
pub fn parse_loglevel(level: &str) -> Result<LevelFilter, TrigSubError> {
    match level.to_lowercase().as_str() {
        "off" | "none" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(TrigSubError::ConfigFailure(format!(
            "unknown log level '{}'",
            other
        ))),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn get_str(table: &Table, key: &str) -> Result<Option<String>, TrigSubError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(TrigSubError::ConfigFailure(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
    }
}

fn get_usize(table: &Table, key: &str) -> Result<Option<usize>, TrigSubError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Integer(i)) if *i > 0 => Ok(Some(*i as usize)),
        Some(other) => Err(TrigSubError::ConfigFailure(format!(
            "'{}' must be a positive integer, got {}",
            key, other
        ))),
    }
}

fn get_f64(table: &Table, key: &str) -> Result<Option<f64>, TrigSubError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Float(x)) => Ok(Some(*x)),
        Some(Value::Integer(i)) => Ok(Some(*i as f64)),
        Some(other) => Err(TrigSubError::ConfigFailure(format!(
            "'{}' must be a number, got {}",
            key, other
        ))),
    }
}

fn get_bool(table: &Table, key: &str) -> Result<Option<bool>, TrigSubError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Boolean(b)) => Ok(Some(*b)),
        Some(other) => Err(TrigSubError::ConfigFailure(format!(
            "'{}' must be a boolean, got {}",
            key, other
        ))),
    }
}

fn section<'a>(table: &'a Table, name: &str) -> Result<Option<&'a Table>, TrigSubError> {
    match table.get(name) {
        None => Ok(None),
        Some(Value::Table(t)) => Ok(Some(t)),
        Some(_) => Err(TrigSubError::ConfigFailure(format!(
            "[{}] must be a table",
            name
        ))),
    }
}

impl SubstitutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, variable: &str) -> Self {
        self.variable = variable.to_string();
        self
    }

    pub fn with_angle(mut self, angle: &str) -> Self {
        self.angle = angle.to_string();
        self
    }

    pub fn with_quadrature_degree(mut self, degree: usize) -> Self {
        self.quadrature_degree = degree;
        self
    }

    pub fn with_sample_points(mut self, n: usize) -> Self {
        self.sample_points = n;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_strict_verification(mut self, strict: bool) -> Self {
        self.strict_verification = strict;
        self
    }

    pub fn with_loglevel(mut self, loglevel: &str) -> Self {
        self.loglevel = Some(loglevel.to_string());
        self
    }

    /// Checks names, cross-check settings and the log level.
    pub fn validate(&self) -> Result<(), TrigSubError> {
        for name in [&self.variable, &self.angle] {
            if !is_identifier(name) {
                return Err(TrigSubError::ConfigFailure(format!(
                    "'{}' is not a valid variable name",
                    name
                )));
            }
        }
        if self.variable == self.angle {
            return Err(TrigSubError::ConfigFailure(format!(
                "integration variable and angle are both '{}'",
                self.variable
            )));
        }
        if self.quadrature_degree < 2 {
            return Err(TrigSubError::ConfigFailure(
                "quadrature_degree must be at least 2".to_string(),
            ));
        }
        if self.sample_points < 2 {
            return Err(TrigSubError::ConfigFailure(
                "sample_points must be at least 2".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(TrigSubError::ConfigFailure(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if let Some(level) = &self.loglevel {
            parse_loglevel(level)?;
        }
        Ok(())
    }

    /// Reads a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, TrigSubError> {
        let table = s
            .parse::<Table>()
            .map_err(|e| TrigSubError::ConfigFailure(e.to_string()))?;
        let mut config = SubstitutionConfig::default();
        if let Some(level) = get_str(&table, "loglevel")? {
            config.loglevel = Some(level);
        }
        if let Some(sub) = section(&table, "substitution")? {
            if let Some(v) = get_str(sub, "variable")? {
                config.variable = v;
            }
            if let Some(v) = get_str(sub, "angle")? {
                config.angle = v;
            }
        }
        if let Some(ver) = section(&table, "verification")? {
            if let Some(v) = get_usize(ver, "quadrature_degree")? {
                config.quadrature_degree = v;
            }
            if let Some(v) = get_usize(ver, "sample_points")? {
                config.sample_points = v;
            }
            if let Some(v) = get_f64(ver, "tolerance")? {
                config.tolerance = v;
            }
            if let Some(v) = get_bool(ver, "strict")? {
                config.strict_verification = v;
            }
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SubstitutionConfig::default();
        assert_eq!(config.variable, "x");
        assert_eq!(config.angle, "theta");
        assert_eq!(config.quadrature_degree, 32);
        assert!(!config.strict_verification);
        config.validate().unwrap();
    }

    #[test]
    fn test_builder() {
        let config = SubstitutionConfig::new()
            .with_variable("u")
            .with_angle("t")
            .with_tolerance(1e-8)
            .with_strict_verification(true)
            .with_loglevel("debug");
        assert_eq!(config.variable, "u");
        assert_eq!(config.angle, "t");
        assert!(config.strict_verification);
        config.validate().unwrap();
    }

    #[test]
    fn test_from_toml() {
        let doc = r#"
loglevel = "warn"

[substitution]
variable = "u"
angle = "phi"

[verification]
quadrature_degree = 40
tolerance = 1e-9
strict = true
"#;
        let config = SubstitutionConfig::from_toml_str(doc).unwrap();
        assert_eq!(config.variable, "u");
        assert_eq!(config.angle, "phi");
        assert_eq!(config.quadrature_degree, 40);
        assert_eq!(config.sample_points, 25);
        assert_eq!(config.tolerance, 1e-9);
        assert!(config.strict_verification);
        assert_eq!(config.loglevel.as_deref(), Some("warn"));
    }

    #[test]
    fn test_invalid_configs() {
        assert!(SubstitutionConfig::from_toml_str("[substitution]\nvariable = 3").is_err());
        assert!(SubstitutionConfig::from_toml_str("[substitution]\nangle = \"x\"").is_err());
        assert!(SubstitutionConfig::from_toml_str("loglevel = \"loud\"").is_err());
        assert!(SubstitutionConfig::from_toml_str("not toml at all [").is_err());
        assert!(SubstitutionConfig::new().with_sample_points(1).validate().is_err());
        assert!(SubstitutionConfig::new().with_tolerance(-1.0).validate().is_err());
        assert!(SubstitutionConfig::new().with_variable("2x").validate().is_err());
    }

    #[test]
    fn test_parse_loglevel() {
        assert_eq!(parse_loglevel("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_loglevel("none").unwrap(), LevelFilter::Off);
        assert!(matches!(
            parse_loglevel("verbose"),
            Err(TrigSubError::ConfigFailure(_))
        ));
    }
}
