#![allow(dead_code)]

use std::path::PathBuf;

use tpt_exec::config::{ConfigFile, RawConfigFile, RawExecutionSection, RawToolSection};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from a valid configuration for `TC_Braking_3` in `EC1`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                tool: RawToolSection {
                    executables: vec![PathBuf::from("/opt/tpt/tpt")],
                    host: Some("localhost".to_string()),
                    port: 1099,
                    binding_name: "TptApi".to_string(),
                    arguments: vec![],
                    startup_timeout: "60s".to_string(),
                    readiness_timeout: "10m".to_string(),
                },
                execution: RawExecutionSection {
                    project: PathBuf::from("/work/brake.tpt"),
                    execution_config: "EC1".to_string(),
                    test_case: "TC_Braking_3".to_string(),
                    data_dir: PathBuf::from("/work/out/data"),
                    report_dir: PathBuf::from("/work/out/report"),
                    temp_test_set: "JENKINS Exec".to_string(),
                    artifact_dir: None,
                    close_project: false,
                },
            },
        }
    }

    pub fn with_executable(mut self, path: &str) -> Self {
        self.config.tool.executables.push(PathBuf::from(path));
        self
    }

    pub fn with_executables(mut self, paths: &[&str]) -> Self {
        self.config.tool.executables = paths.iter().map(PathBuf::from).collect();
        self
    }

    pub fn with_host(mut self, host: Option<&str>) -> Self {
        self.config.tool.host = host.map(str::to_string);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.tool.port = port;
        self
    }

    pub fn with_binding_name(mut self, name: &str) -> Self {
        self.config.tool.binding_name = name.to_string();
        self
    }

    pub fn with_argument(mut self, arg: &str) -> Self {
        self.config.tool.arguments.push(arg.to_string());
        self
    }

    pub fn with_startup_timeout(mut self, value: &str) -> Self {
        self.config.tool.startup_timeout = value.to_string();
        self
    }

    pub fn with_readiness_timeout(mut self, value: &str) -> Self {
        self.config.tool.readiness_timeout = value.to_string();
        self
    }

    pub fn with_project(mut self, path: &str) -> Self {
        self.config.execution.project = PathBuf::from(path);
        self
    }

    pub fn with_execution_config(mut self, name: &str) -> Self {
        self.config.execution.execution_config = name.to_string();
        self
    }

    pub fn with_test_case(mut self, name: &str) -> Self {
        self.config.execution.test_case = name.to_string();
        self
    }

    pub fn with_dirs(mut self, data_dir: &str, report_dir: &str) -> Self {
        self.config.execution.data_dir = PathBuf::from(data_dir);
        self.config.execution.report_dir = PathBuf::from(report_dir);
        self
    }

    pub fn with_temp_test_set(mut self, name: &str) -> Self {
        self.config.execution.temp_test_set = name.to_string();
        self
    }

    pub fn with_artifact_dir(mut self, path: &str) -> Self {
        self.config.execution.artifact_dir = Some(PathBuf::from(path));
        self
    }

    pub fn with_close_project(mut self, val: bool) -> Self {
        self.config.execution.close_project = val;
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `testcase_information.xml` documents.
pub struct ResultXmlBuilder {
    root_attrs: Vec<(String, String)>,
    body: String,
}

impl ResultXmlBuilder {
    pub fn new(name: &str, id: i64) -> Self {
        Self {
            root_attrs: vec![
                ("ScenarioName".to_string(), name.to_string()),
                ("ScenarioId".to_string(), id.to_string()),
            ],
            body: String::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.root_attrs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn result(self, value: &str) -> Self {
        self.attr("Result", value)
    }

    pub fn exec_date(self, value: &str) -> Self {
        self.attr("ExecDate", value)
    }

    pub fn exec_duration(self, value: &str) -> Self {
        self.attr("ExecutionDuration", value)
    }

    /// `<Log Type="..">text</Log>`; `text` is inserted as is.
    pub fn log(mut self, log_type: Option<&str>, text: &str) -> Self {
        match log_type {
            Some(t) => self.body.push_str(&format!("<Log Type=\"{t}\">{text}</Log>")),
            None => self.body.push_str(&format!("<Log>{text}</Log>")),
        }
        self
    }

    pub fn assessment_variable(
        mut self,
        name: &str,
        result: &str,
        var_type: &str,
        value: &str,
        message: &str,
    ) -> Self {
        self.body.push_str(&format!(
            "<AssessmentVariable Name=\"{name}\" Result=\"{result}\" Type=\"{var_type}\" Value=\"{value}\">{message}</AssessmentVariable>"
        ));
        self
    }

    /// Any raw markup inside the root element.
    pub fn raw(mut self, markup: &str) -> Self {
        self.body.push_str(markup);
        self
    }

    pub fn build(self) -> String {
        let attrs: String = self
            .root_attrs
            .iter()
            .map(|(k, v)| format!(" {k}=\"{v}\""))
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<TestcaseInformation{attrs}>{}</TestcaseInformation>",
            self.body
        )
    }
}
