//! # Six-Stage Pipeline
//!
//! `TrigSubstitution` drives one integrand through
//! detect -> construct triangle -> substitute -> simplify -> integrate -> back-substitute,
//! reporting every completed stage to a `StageObserver`, then cross-checks the
//! antiderivative numerically.
//!
//! # Examples
//! ```rust
//! use RustedTrigSub::trig_substitution::pipeline::TrigSubstitution;
//! let solver = TrigSubstitution::default();
//! let result = solver.resolve_str("1/(x**2 * sqrt(x**2 - 4))").unwrap();
//! println!("{}", result.antiderivative.as_ref().unwrap()); // sqrt(x^2 - 4)/(4*x)
//! println!("{}", result.summary_table());
//! ```

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::linspace;
use crate::trig_substitution::classifier::classify;
use crate::trig_substitution::config::SubstitutionConfig;
use crate::trig_substitution::engine::SubstitutionEngine;
use crate::trig_substitution::errors::TrigSubError;
use crate::trig_substitution::family::{RightTriangle, SubstitutionFamily};
use itertools::Itertools;
use log::{error, info, warn};
use rayon::prelude::*;
use std::time::Instant;
use strum_macros::{Display, EnumIter};
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Detect,
    ConstructTriangle,
    Substitute,
    Simplify,
    Integrate,
    BackSubstitute,
}

/// Where a run is. Each successful stage moves one state forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PipelineState {
    Start,
    Classified,
    TriangleBuilt,
    Substituted,
    Simplified,
    Integrated,
    BackSubstituted,
    Done,
    Failed,
}

impl PipelineState {
    fn after(stage: Stage) -> PipelineState {
        match stage {
            Stage::Detect => PipelineState::Classified,
            Stage::ConstructTriangle => PipelineState::TriangleBuilt,
            Stage::Substitute => PipelineState::Substituted,
            Stage::Simplify => PipelineState::Simplified,
            Stage::Integrate => PipelineState::Integrated,
            Stage::BackSubstitute => PipelineState::BackSubstituted,
        }
    }
}

/// What a stage reports: a description, its expression (if any) and LaTeX markup.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePayload {
    pub stage: Stage,
    pub description: String,
    pub expression: Option<Expr>,
    pub markup: String,
}

/// Receives a payload after every completed stage.
pub trait StageObserver {
    fn on_stage(&mut self, payload: &StagePayload);
}

/// Writes each stage to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl StageObserver for LoggingObserver {
    fn on_stage(&mut self, payload: &StagePayload) {
        match &payload.expression {
            Some(e) => info!("[{}] {}: {}", payload.stage, payload.description, e),
            None => info!("[{}] {}", payload.stage, payload.description),
        }
    }
}

/// Ignores every stage.
impl StageObserver for () {
    fn on_stage(&mut self, _payload: &StagePayload) {}
}

/// Numeric comparison of the antiderivative with the integrand.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossCheck {
    pub interval: (f64, f64),
    /// Gauss-Legendre value of the definite integral
    pub quadrature: f64,
    /// `F(hi) - F(lo)`
    pub antiderivative_delta: f64,
    /// largest relative gap between `F'` and `f` at the sample points
    pub max_derivative_residual: f64,
    pub agrees: bool,
}

/// Everything a successful run produced, stage by stage.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub integrand: Expr,
    pub state: PipelineState,
    pub family: Option<SubstitutionFamily>,
    pub radical: Option<Expr>,
    pub triangle: Option<RightTriangle>,
    pub transformed: Option<Expr>,
    pub simplified: Option<Expr>,
    pub theta_antiderivative: Option<Expr>,
    pub antiderivative: Option<Expr>,
    pub cross_check: Option<CrossCheck>,
    pub stages: Vec<StagePayload>,
}

impl PipelineResult {
    fn new(integrand: &Expr) -> Self {
        PipelineResult {
            integrand: integrand.clone(),
            state: PipelineState::Start,
            family: None,
            radical: None,
            triangle: None,
            transformed: None,
            simplified: None,
            theta_antiderivative: None,
            antiderivative: None,
            cross_check: None,
            stages: Vec::new(),
        }
    }

    /// Table of the stages and the cross-check for terminal output.
    pub fn summary_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(["stage", "description", "expression"]);
        builder.push_record(["integrand".to_string(), String::new(), self.integrand.to_string()]);
        for payload in &self.stages {
            let expression = payload
                .expression
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();
            builder.push_record([
                payload.stage.to_string(),
                payload.description.clone(),
                expression,
            ]);
        }
        if let Some(check) = &self.cross_check {
            builder.push_record([
                "cross_check".to_string(),
                format!(
                    "[{:.4}, {:.4}] quadrature {:.10}, F(b)-F(a) {:.10}",
                    check.interval.0, check.interval.1, check.quadrature, check.antiderivative_delta
                ),
                format!(
                    "max |F' - f| = {:.3e}, {}",
                    check.max_derivative_residual,
                    if check.agrees { "agrees" } else { "MISMATCH" }
                ),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

/// Trigonometric substitution solver.
#[derive(Debug, Clone, Default)]
pub struct TrigSubstitution {
    config: SubstitutionConfig,
}

impl TrigSubstitution {
    pub fn new(config: SubstitutionConfig) -> Result<Self, TrigSubError> {
        config.validate()?;
        Ok(TrigSubstitution { config })
    }

    pub fn config(&self) -> &SubstitutionConfig {
        &self.config
    }

    /// Runs the pipeline without an observer.
    pub fn resolve(&self, integrand: &Expr) -> Result<PipelineResult, TrigSubError> {
        self.resolve_with(integrand, &mut ())
    }

    /// Parses the integrand, then runs the pipeline.
    pub fn resolve_str(&self, input: &str) -> Result<PipelineResult, TrigSubError> {
        let integrand = Expr::parse_expression(input).map_err(|message| {
            TrigSubError::ParseFailure {
                input: input.to_string(),
                message,
            }
        })?;
        self.resolve(&integrand)
    }

    /// Independent integrands in parallel; results keep the input order.
    pub fn resolve_batch(&self, integrands: &[Expr]) -> Vec<Result<PipelineResult, TrigSubError>> {
        integrands
            .par_iter()
            .map(|integrand| self.resolve(integrand))
            .collect()
    }

    /// Runs the pipeline, reporting each completed stage to `observer`.
    /// A failure aborts the run; no partial result is returned.
    pub fn resolve_with(
        &self,
        integrand: &Expr,
        observer: &mut dyn StageObserver,
    ) -> Result<PipelineResult, TrigSubError> {
        let begin = Instant::now();
        let mut result = PipelineResult::new(integrand);
        match self.run(&mut result, observer) {
            Ok(()) => {
                result.state = PipelineState::Done;
                info!(
                    "integral of {} resolved in {:?}",
                    integrand,
                    begin.elapsed()
                );
                Ok(result)
            }
            Err(e) => {
                result.state = PipelineState::Failed;
                error!("integral of {} failed: {}", integrand, e);
                Err(e)
            }
        }
    }

    fn emit(
        result: &mut PipelineResult,
        observer: &mut dyn StageObserver,
        stage: Stage,
        description: String,
        expression: Option<Expr>,
        markup: String,
    ) {
        let payload = StagePayload {
            stage,
            description,
            expression,
            markup,
        };
        observer.on_stage(&payload);
        result.stages.push(payload);
        result.state = PipelineState::after(stage);
    }

    fn run(
        &self,
        result: &mut PipelineResult,
        observer: &mut dyn StageObserver,
    ) -> Result<(), TrigSubError> {
        let var = self.config.variable.as_str();
        let theta = self.config.angle.as_str();
        let integrand = result.integrand.clone();

        // 1. detect
        let classification = classify(&integrand, var)?;
        let family = classification.family;
        Self::emit(
            result,
            observer,
            Stage::Detect,
            format!("{} from sqrt({})", family, classification.radicand),
            Some(classification.radical.clone()),
            format!(
                "\\sqrt{{{}}}, \\quad a = {}",
                classification.radicand.to_latex(),
                family.parameter().value().to_latex()
            ),
        );
        result.family = Some(family.clone());
        result.radical = Some(classification.radical);

        // 2. triangle
        let triangle = family.triangle(var);
        triangle
            .check_pythagoras()
            .map_err(|e| TrigSubError::delegated(Stage::ConstructTriangle, e))?;
        Self::emit(
            result,
            observer,
            Stage::ConstructTriangle,
            format!(
                "hypotenuse {}, opposite {}, adjacent {}",
                triangle.hypotenuse, triangle.opposite, triangle.adjacent
            ),
            None,
            triangle.pythagoras_markup(),
        );
        result.triangle = Some(triangle.clone());

        // 3. substitute
        let engine = SubstitutionEngine::new(&family, var, theta);
        let transformed = engine.transform(&integrand);
        let forward = family.forward(theta);
        let differential = family.differential(theta);
        Self::emit(
            result,
            observer,
            Stage::Substitute,
            format!("{} = {}, d{} = {} d{}", var, forward, var, differential, theta),
            Some(transformed.clone()),
            format!(
                "{} = {}, \\quad d{} = {} \\, d{}",
                var,
                forward.to_latex(),
                var,
                differential.to_latex(),
                Expr::var(theta).to_latex()
            ),
        );
        result.transformed = Some(transformed.clone());

        // 4. simplify
        let simplified = engine.simplify(&transformed)?;
        Self::emit(
            result,
            observer,
            Stage::Simplify,
            format!("using {}", family.identity().describe(theta)),
            Some(simplified.clone()),
            format!(
                "\\int {} \\, d{}",
                simplified.to_latex(),
                Expr::var(theta).to_latex()
            ),
        );
        result.simplified = Some(simplified.clone());

        // 5. integrate
        let raw = engine.integrate(&simplified)?;
        Self::emit(
            result,
            observer,
            Stage::Integrate,
            format!("antiderivative in {}", theta),
            Some(raw.clone()),
            format!("{} + C", raw.to_latex()),
        );
        result.theta_antiderivative = Some(raw.clone());

        // 6. back-substitute
        let antiderivative = engine.back_substitute(&raw, &triangle)?;
        let inverse = family.inverse_angle(&triangle);
        let relations = [family.primary(), family.cofunction()]
            .iter()
            .map(|f| format!("{}({}) = {}", f, theta, triangle.ratio(*f)))
            .join(", ");
        Self::emit(
            result,
            observer,
            Stage::BackSubstitute,
            format!("{}, {} = {}", relations, theta, inverse),
            Some(antiderivative.clone()),
            format!(
                "\\int {} \\, d{} = {} + C",
                integrand.to_latex(),
                var,
                antiderivative.to_latex()
            ),
        );
        result.antiderivative = Some(antiderivative.clone());

        let check = self.cross_check(&integrand, &antiderivative, &family);
        if !check.agrees {
            let message = format!(
                "{} vs {}: quadrature {} against F(b)-F(a) = {}, max |F' - f| = {:e} on [{}, {}]",
                antiderivative,
                integrand,
                check.quadrature,
                check.antiderivative_delta,
                check.max_derivative_residual,
                check.interval.0,
                check.interval.1
            );
            if self.config.strict_verification {
                return Err(TrigSubError::VerificationFailure { message });
            }
            warn!("cross-check mismatch: {}", message);
        }
        result.cross_check = Some(check);
        Ok(())
    }

    /// Compares the antiderivative with Gauss-Legendre quadrature of the integrand on a
    /// sample interval inside the family's domain, and `F'` with `f` at sample points.
    pub fn cross_check(
        &self,
        integrand: &Expr,
        antiderivative: &Expr,
        family: &SubstitutionFamily,
    ) -> CrossCheck {
        let var = self.config.variable.as_str();
        let tol = self.config.tolerance;
        let (lo, hi) = family.sample_interval();
        let quadrature = integrand
            .quad(var, self.config.quadrature_degree, lo, hi)
            .unwrap_or_else(|e| {
                warn!("{}", e);
                f64::NAN
            });
        let antiderivative_delta = antiderivative.eval_at(var, hi) - antiderivative.eval_at(var, lo);
        let points = linspace(lo, hi, self.config.sample_points);
        let max_derivative_residual = antiderivative
            .diff(var)
            .max_residual_against(integrand, var, &points)
            .unwrap_or(f64::NAN);
        let scale = quadrature.abs().max(1.0);
        let agrees = (quadrature - antiderivative_delta).abs() <= tol * scale
            && max_derivative_residual <= tol;
        CrossCheck {
            interval: (lo, hi),
            quadrature,
            antiderivative_delta,
            max_derivative_residual,
            agrees,
        }
    }
}
