// src/result/parser.rs

//! Streaming parser for `testcase_information.xml`.
//!
//! The document is consumed one event at a time; no tree is built. The
//! parser is stateless between calls and safe to use from many threads at
//! once.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use super::model::{AssessmentVariable, LogLevel, Outcome, ParsedResult};
use crate::errors::{Result, TptError};
use crate::fs::FileSystem;

const ROOT_ELEMENT: &[u8] = b"TestcaseInformation";
const LOG_ELEMENT: &[u8] = b"Log";
const ASSESSMENT_VARIABLE_ELEMENT: &[u8] = b"AssessmentVariable";

/// Format of the `ExecDate` attribute, e.g. `14:05:09 01.02.2020`.
pub const EXEC_DATE_FORMAT: &str = "%H:%M:%S %d.%m.%Y";

/// Parse a result artifact from memory.
pub fn parse(xml: &[u8]) -> Result<ParsedResult> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut state = ParseState::default();
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            TptError::MalformedArtifact(format!(
                "XML error at position {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => state.start_element(&e)?,
            Event::Empty(e) => {
                state.start_element(&e)?;
                state.end_element(e.name().as_ref());
            }
            Event::End(e) => state.end_element(e.name().as_ref()),
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| TptError::MalformedArtifact(format!("bad text content: {e}")))?;
                state.characters(&text);
            }
            Event::CData(c) => state.characters(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    state
        .result
        .ok_or_else(|| TptError::MalformedArtifact("missing root element".to_string()))
}

/// Parse a result artifact through the given filesystem.
pub fn parse_file(fs: &dyn FileSystem, path: &Path) -> Result<ParsedResult> {
    let mut bytes = Vec::new();
    fs.open_read(path)
        .and_then(|mut r| Ok(r.read_to_end(&mut bytes)?))
        .map_err(|e| {
            TptError::MalformedArtifact(format!("{}: I/O error: {e}", path.display()))
        })?;

    parse(&bytes).map_err(|e| match e {
        TptError::MalformedArtifact(msg) => {
            TptError::MalformedArtifact(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Parse an `ExecDate` attribute value.
pub fn parse_exec_date(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, EXEC_DATE_FORMAT)
        .map_err(|_| TptError::MalformedArtifact(format!("can't parse date format \"{value}\"")))
}

/// Bucket for a `Log` element's `Type` attribute. `None` means the entry
/// is invisible and must not be recorded.
pub fn log_level_for(type_attr: Option<&str>) -> Option<LogLevel> {
    let Some(kind) = type_attr else {
        return Some(LogLevel::All);
    };
    match kind.to_lowercase().as_str() {
        "info" | "customoutput" | "section" => Some(LogLevel::Info),
        "warning" => Some(LogLevel::Warning),
        "error" => Some(LogLevel::Error),
        "invisible" => None,
        _ => Some(LogLevel::All),
    }
}

#[derive(Default)]
struct ParseState {
    result: Option<ParsedResult>,
    // Open `Log` element: its bucket (None = invisible) and text so far.
    log: Option<(Option<LogLevel>, String)>,
    variable: Option<AssessmentVariable>,
}

impl ParseState {
    fn start_element(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let name = e.name();
        let name = name.as_ref();
        let attrs = Attrs::read(e)?;

        if name.eq_ignore_ascii_case(ROOT_ELEMENT) {
            self.result = Some(root_from_attrs(&attrs)?);
        } else if name.eq_ignore_ascii_case(LOG_ELEMENT) {
            self.log = Some((log_level_for(attrs.get("Type")), String::new()));
        } else if name.eq_ignore_ascii_case(ASSESSMENT_VARIABLE_ELEMENT) {
            self.variable = Some(AssessmentVariable {
                name: attrs.get_owned("Name"),
                result: attrs.get_owned("Result"),
                var_type: attrs.get_owned("Type"),
                value: attrs.get_owned("Value"),
                message: String::new(),
            });
        }
        Ok(())
    }

    fn end_element(&mut self, name: &[u8]) {
        if name.eq_ignore_ascii_case(LOG_ELEMENT) {
            if let Some((level, text)) = self.log.take() {
                match (level, self.result.as_mut()) {
                    (Some(level), Some(result)) => result.log.push(level, text),
                    (None, _) => debug!("suppressed invisible log entry"),
                    (Some(_), None) => debug!("log entry outside root element ignored"),
                }
            }
        } else if name.eq_ignore_ascii_case(ASSESSMENT_VARIABLE_ELEMENT) {
            if let (Some(variable), Some(result)) = (self.variable.take(), self.result.as_mut()) {
                result.assessment_variables.push(variable);
            }
        }
    }

    fn characters(&mut self, text: &str) {
        if let Some((_, buf)) = self.log.as_mut() {
            buf.push_str(text);
        }
        if let Some(variable) = self.variable.as_mut() {
            variable.append_message(text);
        }
    }
}

fn root_from_attrs(attrs: &Attrs) -> Result<ParsedResult> {
    let mut result = ParsedResult {
        name: attrs.get_owned("ScenarioName").unwrap_or_default(),
        ..ParsedResult::default()
    };

    let id = attrs
        .get("ScenarioId")
        .ok_or_else(|| TptError::MalformedArtifact("missing ScenarioId".to_string()))?;
    result.id = id
        .trim()
        .parse()
        .map_err(|_| TptError::MalformedArtifact(format!("invalid ScenarioId \"{id}\"")))?;

    if let Some(duration) = attrs.get("ExecutionDuration") {
        result.exec_duration = duration.to_string();
    }
    if let Some(outcome) = attrs.get("Result") {
        result.outcome = outcome
            .parse::<Outcome>()
            .map_err(TptError::MalformedArtifact)?;
    }
    if let Some(date) = attrs.get("ExecDate") {
        result.exec_date = Some(parse_exec_date(date)?);
    }

    Ok(result)
}

/// Decoded attributes of one element, in document order.
struct Attrs(Vec<(String, String)>);

impl Attrs {
    fn read(e: &BytesStart<'_>) -> Result<Self> {
        let mut out = Vec::new();
        for attr in e.attributes() {
            let attr =
                attr.map_err(|e| TptError::MalformedArtifact(format!("bad attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| TptError::MalformedArtifact(format!("bad attribute value: {e}")))?
                .into_owned();
            out.push((key, value));
        }
        Ok(Self(out))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn get_owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }
}
