//! Run reports handed to the processor.
//!
//! A report carries the host name, the run's log records and its resource
//! metrics. Reports are read from YAML or JSON:
//!
//! ```yaml
//! host: web01.example.com
//! metrics:
//!   resources:
//!     out_of_sync: 1
//!     changed: 1
//! logs:
//!   - level: notice
//!     message: "ensure changed 'stopped' to 'running'"
//!     source: "/Stage[main]/Nginx/Service[nginx]"
//!     tags: [nginx, service]
//! ```

use crate::error::Result;
use crate::matcher::LogRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Resource counters from a run summary. Missing counters are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceMetrics {
    #[serde(default)]
    pub out_of_sync: Option<u64>,
    #[serde(default)]
    pub changed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportMetrics {
    #[serde(default)]
    pub resources: ResourceMetrics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub host: String,
    #[serde(default)]
    pub metrics: ReportMetrics,
    #[serde(default)]
    pub logs: Vec<LogRecord>,
}

impl Report {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            metrics: ReportMetrics::default(),
            logs: Vec::new(),
        }
    }

    pub fn with_resources(mut self, out_of_sync: u64, changed: u64) -> Self {
        self.metrics.resources = ResourceMetrics {
            out_of_sync: Some(out_of_sync),
            changed: Some(changed),
        };
        self
    }

    pub fn with_log(mut self, log: LogRecord) -> Self {
        self.logs.push(log);
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a report file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&raw),
            _ => Self::from_yaml_str(&raw),
        }
    }

    /// False only when the run reports zero out-of-sync and zero changed
    /// resources. Missing counters never suppress a report.
    pub fn has_changes(&self) -> bool {
        let resources = &self.metrics.resources;
        !(resources.out_of_sync == Some(0) && resources.changed == Some(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{LogLevel, Record};
    use crate::error::TagmailError;
    use std::io::Write;

    const REPORT_YAML: &str = r#"
host: web01.example.com
metrics:
  resources:
    out_of_sync: 1
    changed: 1
logs:
  - level: notice
    message: "ensure changed 'stopped' to 'running'"
    source: "/Stage[main]/Nginx/Service[nginx]"
    time: "2024-03-01T12:30:00Z"
    tags: [nginx, service]
  - level: info
    message: "Applied catalog in 2.1 seconds"
    time: "2024-03-01T12:30:02Z"
"#;

    #[test]
    fn test_from_yaml() {
        let report = Report::from_yaml_str(REPORT_YAML).unwrap();
        assert_eq!(report.host, "web01.example.com");
        assert_eq!(report.logs.len(), 2);
        assert!(report.logs[0].is_tagged("nginx"));
        assert!(report.logs[1].tags.is_empty());
        assert_eq!(report.logs[1].level, LogLevel::Info);
        assert!(report.has_changes());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "host": "db01",
            "metrics": {"resources": {"out_of_sync": 0, "changed": 0}},
            "logs": [{"level": "err", "message": "failed", "time": "2024-03-01T12:30:00Z"}]
        }"#;
        let report = Report::from_json_str(json).unwrap();
        assert_eq!(report.host, "db01");
        assert!(!report.has_changes());
    }

    #[test]
    fn test_has_changes_gate() {
        assert!(!Report::new("h").with_resources(0, 0).has_changes());
        assert!(Report::new("h").with_resources(1, 0).has_changes());
        assert!(Report::new("h").with_resources(0, 3).has_changes());
        assert!(Report::new("h").has_changes());

        let mut partial = Report::new("h");
        partial.metrics.resources.changed = Some(0);
        assert!(partial.has_changes());
    }

    #[test]
    fn test_from_file_by_extension() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml.write_all(REPORT_YAML.as_bytes()).unwrap();
        assert_eq!(Report::from_file(yaml.path()).unwrap().logs.len(), 2);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(br#"{"host": "app01"}"#).unwrap();
        let report = Report::from_file(json.path()).unwrap();
        assert_eq!(report.host, "app01");
        assert!(report.logs.is_empty());
    }

    #[test]
    fn test_invalid_report() {
        assert!(matches!(
            Report::from_json_str("{\"logs\": []}"),
            Err(TagmailError::JsonError(_))
        ));
        assert!(matches!(
            Report::from_yaml_str("host: [unclosed"),
            Err(TagmailError::YamlError(_))
        ));
    }
}
