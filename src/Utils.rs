//! utility modules used throughout the project
/// logger initialisation: terminal output and an optional timestamped log file
pub mod logger;
