// src/result/mod.rs

//! Parsed test-case results.

pub mod model;
pub mod parser;

pub use model::{AssessmentVariable, LogEntry, LogLevel, Outcome, ParsedResult, ResultLog};
pub use parser::{parse, parse_exec_date, parse_file};
