use crate::trig_substitution::config::parse_loglevel;
use crate::trig_substitution::errors::TrigSubError;
use chrono::Local;
use log::info;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;

/// Starts terminal logging and, if `log_to_file`, a copy in `log_<date>_<time>.txt`.
/// `None` means "info". A second call keeps the logger that is already installed.
pub fn init_logger(loglevel: Option<&str>, log_to_file: bool) -> Result<(), TrigSubError> {
    let level = match loglevel {
        Some(level) => parse_loglevel(level)?,
        None => LevelFilter::Info,
    };
    if level == LevelFilter::Off {
        return Ok(());
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        let file = File::create(&name)
            .map_err(|e| TrigSubError::ConfigFailure(format!("cannot create {}: {}", name, e)))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    if CombinedLogger::init(loggers).is_ok() {
        info!("logging at level {}", level);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_config_failure() {
        let err = init_logger(Some("chatty"), false).unwrap_err();
        assert!(matches!(err, TrigSubError::ConfigFailure(_)));
        init_logger(Some("off"), false).unwrap();
    }
}
