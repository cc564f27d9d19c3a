// src/result/model.rs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

/// Outcome of one test-case execution as reported by TPT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    Success,
    #[default]
    Inconclusive,
    Failed,
    Error,
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "success" | "passed" => Ok(Outcome::Success),
            "inconclusive" => Ok(Outcome::Inconclusive),
            "failed" => Ok(Outcome::Failed),
            "error" | "execution_error" => Ok(Outcome::Error),
            other => Err(format!("unknown result '{other}'")),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Success => "SUCCESS",
            Outcome::Inconclusive => "INCONCLUSIVE",
            Outcome::Failed => "FAILED",
            Outcome::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Level bucket of a log entry. `All` is the catch-all for entries without
/// a recognised type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub text: String,
}

/// Log entries in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultLog {
    entries: Vec<LogEntry>,
}

impl ResultLog {
    pub fn push(&mut self, level: LogLevel, text: impl Into<String>) {
        self.entries.push(LogEntry {
            level,
            text: text.into(),
        });
    }

    /// Entries of one bucket, in insertion order.
    pub fn entries(&self, level: LogLevel) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.level == level)
    }

    /// Every entry, in insertion order.
    pub fn all_entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssessmentVariable {
    pub name: Option<String>,
    pub result: Option<String>,
    pub var_type: Option<String>,
    pub value: Option<String>,
    /// Body text of the element, concatenated.
    pub message: String,
}

impl AssessmentVariable {
    pub fn append_message(&mut self, text: &str) {
        self.message.push_str(text);
    }
}

/// Result of one test case, parsed from its `testcase_information.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResult {
    pub name: String,
    pub id: i64,
    pub execution_config_name: String,
    pub platform_name: String,
    pub exec_date: Option<NaiveDateTime>,
    /// Raw duration string; the unit is defined by TPT.
    pub exec_duration: String,
    pub outcome: Outcome,
    pub log: ResultLog,
    pub assessment_variables: Vec<AssessmentVariable>,
}

impl Default for ParsedResult {
    fn default() -> Self {
        Self {
            name: String::new(),
            id: 0,
            execution_config_name: String::new(),
            platform_name: String::new(),
            exec_date: None,
            exec_duration: "0".to_string(),
            outcome: Outcome::default(),
            log: ResultLog::default(),
            assessment_variables: Vec::new(),
        }
    }
}

impl ParsedResult {
    /// `<name>_<id>`
    pub fn qualified_name(&self) -> String {
        format!("{}_{}", self.name, self.id)
    }

    /// Associate the result with the execution configuration and platform
    /// it was produced by. Platforms used more than once carry an index
    /// suffix.
    pub fn with_origin(
        mut self,
        execution_config_name: impl Into<String>,
        platform_name: impl Into<String>,
    ) -> Self {
        self.execution_config_name = execution_config_name.into();
        self.platform_name = platform_name.into();
        self
    }
}
