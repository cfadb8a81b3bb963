use crate::symbolic::symbolic_engine::Expr;
use crate::trig_substitution::pipeline::Stage;
use std::fmt;

/// Every way a run can fail. Each variant knows the stage it aborted.
#[derive(Debug, Clone, PartialEq)]
pub enum TrigSubError {
    /// the textual integrand could not be parsed
    ParseFailure { input: String, message: String },
    /// no radical of the three canonical shapes was found; the integrand is returned untouched
    ClassificationFailure { integrand: Expr },
    /// a radical of a canonical shape was found but its constant is unusable
    MalformedParameterFailure { radicand: Expr, reason: String },
    /// the algebra engine failed inside a stage
    DelegatedComputationFailure { stage: Stage, message: String },
    /// the angle variable survived back-substitution
    IncompleteBackSubstitution { residual: Expr },
    /// strict mode only: the antiderivative disagrees with direct quadrature
    VerificationFailure { message: String },
    /// invalid configuration document or log level
    ConfigFailure(String),
}

impl TrigSubError {
    /// The stage the run aborted in, `None` for failures outside the pipeline.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            TrigSubError::ParseFailure { .. } | TrigSubError::ConfigFailure(_) => None,
            TrigSubError::ClassificationFailure { .. }
            | TrigSubError::MalformedParameterFailure { .. } => Some(Stage::Detect),
            TrigSubError::DelegatedComputationFailure { stage, .. } => Some(*stage),
            TrigSubError::IncompleteBackSubstitution { .. }
            | TrigSubError::VerificationFailure { .. } => Some(Stage::BackSubstitute),
        }
    }

    pub(crate) fn delegated(stage: Stage, message: impl Into<String>) -> Self {
        TrigSubError::DelegatedComputationFailure {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for TrigSubError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrigSubError::ParseFailure { input, message } => {
                write!(f, "cannot parse integrand '{}': {}", input, message)
            }
            TrigSubError::ClassificationFailure { integrand } => write!(
                f,
                "stage {}: no radical of the form sqrt(a^2 - x^2), sqrt(a^2 + x^2) or sqrt(x^2 - a^2) in {}",
                Stage::Detect,
                integrand
            ),
            TrigSubError::MalformedParameterFailure { radicand, reason } => write!(
                f,
                "stage {}: unusable parameter in sqrt({}): {}",
                Stage::Detect,
                radicand,
                reason
            ),
            TrigSubError::DelegatedComputationFailure { stage, message } => {
                write!(f, "stage {}: {}", stage, message)
            }
            TrigSubError::IncompleteBackSubstitution { residual } => write!(
                f,
                "stage {}: the angle variable is still present in {}",
                Stage::BackSubstitute,
                residual
            ),
            TrigSubError::VerificationFailure { message } => {
                write!(f, "verification failed: {}", message)
            }
            TrigSubError::ConfigFailure(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for TrigSubError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_of_errors() {
        let e = TrigSubError::ClassificationFailure {
            integrand: Expr::var("x"),
        };
        assert_eq!(e.stage(), Some(Stage::Detect));
        let e = TrigSubError::delegated(Stage::Integrate, "boom");
        assert_eq!(e.stage(), Some(Stage::Integrate));
        assert_eq!(e.to_string(), "stage integrate: boom");
        assert_eq!(TrigSubError::ConfigFailure("x".into()).stage(), None);
    }

    #[test]
    fn test_display_mentions_integrand() {
        let integrand = Expr::parse_expression("x^3 + 1").unwrap();
        let e = TrigSubError::ClassificationFailure { integrand };
        assert!(e.to_string().contains("x^3 + 1"));
    }
}
