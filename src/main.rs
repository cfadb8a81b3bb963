#![allow(non_snake_case)]
use RustedTrigSub::Utils::logger::init_logger;
use RustedTrigSub::trig_substitution::config::SubstitutionConfig;
use RustedTrigSub::trig_substitution::pipeline::{LoggingObserver, TrigSubstitution};
use RustedTrigSub::symbolic::symbolic_engine::Expr;
use std::process::ExitCode;

const MENU: [&str; 4] = [
    "1/(x**2 * sqrt(x**2 - 4))",
    "1/sqrt(9 - x**2)",
    "x**2/sqrt(16 + x**2)",
    "1/(x * sqrt(x**2 - 25))",
];

/// usage: RustedTrigSub [--config settings.toml] [integrand]
fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let mut config = SubstitutionConfig::default();
    let mut integrands: Vec<String> = Vec::new();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let Some(path) = args.next() else {
                eprintln!("--config needs a file name");
                return ExitCode::FAILURE;
            };
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|s| SubstitutionConfig::from_toml_str(&s).map_err(|e| e.to_string()));
            match loaded {
                Ok(c) => config = c,
                Err(e) => {
                    eprintln!("{}: {}", path, e);
                    return ExitCode::FAILURE;
                }
            }
        } else {
            integrands.push(arg);
        }
    }
    if integrands.is_empty() {
        integrands = MENU.iter().map(|s| s.to_string()).collect();
    }
    let loglevel = config.loglevel.clone().unwrap_or_else(|| "info".to_string());
    if let Err(e) = init_logger(Some(&loglevel), false) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    let var = config.variable.clone();
    let solver = match TrigSubstitution::new(config) {
        Ok(solver) => solver,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut failures = 0;
    for input in &integrands {
        let outcome = Expr::parse_expression(input)
            .map_err(|e| e.to_string())
            .and_then(|integrand| {
                solver
                    .resolve_with(&integrand, &mut LoggingObserver)
                    .map_err(|e| e.to_string())
            });
        match outcome {
            Ok(result) => {
                println!("{}", result.summary_table());
                if let Some(antiderivative) = &result.antiderivative {
                    println!("∫ {} d{} = {} + C\n", result.integrand, var, antiderivative);
                }
            }
            Err(e) => {
                failures += 1;
                println!("∫ {} d{}: {}\n", input, var, e);
            }
        }
    }
    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
