//! Configuration for tagmail.
//!
//! All settings are passed explicitly: the compiler, the engine and the
//! delivery adapter receive the pieces they need at call time. Configuration
//! can be built in code with the `with_*` methods or loaded from YAML.
//!
//! ```rust
//! use tagmail::TagmailConfig;
//!
//! let config = TagmailConfig::from_yaml_str(r#"
//! tagmap: /etc/puppet/tagmail.conf
//! delivery:
//!   smtp_server: mail.example.com
//!   report_from: puppet@example.com
//! engine:
//!   parallel:
//!     enabled: true
//! "#)?;
//!
//! assert_eq!(config.delivery.smtp_server.as_deref(), Some("mail.example.com"));
//! assert_eq!(config.delivery.smtp_port, 25);
//! assert!(config.engine.parallel.enabled);
//! # Ok::<(), tagmail::TagmailError>(())
//! ```

use crate::error::{Result, TagmailError};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TAGMAP: &str = "/etc/puppet/tagmail.conf";
const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";

/// Rule-level parallelism for the routing engine.
///
/// Rules are independent, so evaluating them on the rayon pool never changes
/// the output. It only pays off for large tagmaps, hence the threshold.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Evaluate rules on the rayon pool.
    ///
    /// **Default**: false
    pub enabled: bool,

    /// Rule sets smaller than this are always evaluated sequentially.
    ///
    /// **Default**: 8
    pub min_rules: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_rules: 8,
        }
    }
}

/// Routing engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub parallel: ParallelConfig,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequential evaluation regardless of rule count.
    pub fn sequential() -> Self {
        Self {
            parallel: ParallelConfig {
                enabled: false,
                ..Default::default()
            },
        }
    }

    /// Parallel evaluation for every rule set with at least one rule.
    pub fn parallel() -> Self {
        Self {
            parallel: ParallelConfig {
                enabled: true,
                min_rules: 1,
            },
        }
    }

    /// Whether a rule set of `rule_count` rules goes to the rayon pool.
    pub fn use_parallel(&self, rule_count: usize) -> bool {
        self.parallel.enabled && rule_count >= self.parallel.min_rules.max(1)
    }
}

/// Mail delivery settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// SMTP relay. Takes precedence over `sendmail` when set.
    pub smtp_server: Option<String>,
    pub smtp_port: u16,
    pub smtp_helo: String,
    /// Local mail transfer agent, invoked once per recipient group. An empty
    /// path counts as unset.
    #[serde(deserialize_with = "empty_path_as_none")]
    pub sendmail: Option<PathBuf>,
    /// Envelope sender and `From:` header.
    pub report_from: String,
    /// Subject is `"<subject_prefix> <host>"`.
    pub subject_prefix: String,
    /// SMTP connect, read and write timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            smtp_server: None,
            smtp_port: 25,
            smtp_helo: "localhost".to_string(),
            sendmail: default_sendmail(),
            report_from: "report@localhost".to_string(),
            subject_prefix: "Puppet Report for".to_string(),
            timeout_secs: 30,
        }
    }
}

fn empty_path_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let path = Option::<PathBuf>::deserialize(deserializer)?;
    Ok(path.filter(|p| !p.as_os_str().is_empty()))
}

fn default_sendmail() -> Option<PathBuf> {
    let path = Path::new(DEFAULT_SENDMAIL);
    path.exists().then(|| path.to_path_buf())
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn subject_for(&self, host: &str) -> String {
        format!("{} {}", self.subject_prefix, host)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TagmailConfig {
    pub tagmap: PathBuf,
    pub engine: EngineConfig,
    pub delivery: DeliveryConfig,
}

impl Default for TagmailConfig {
    fn default() -> Self {
        Self {
            tagmap: PathBuf::from(DEFAULT_TAGMAP),
            engine: EngineConfig::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}

impl TagmailConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.delivery.smtp_port == 0 {
            return Err(TagmailError::ConfigError(
                "smtp_port must be non-zero".to_string(),
            ));
        }
        if self.delivery.timeout_secs == 0 {
            return Err(TagmailError::ConfigError(
                "timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.delivery.report_from.trim().is_empty() {
            return Err(TagmailError::ConfigError(
                "report_from must not be empty".to_string(),
            ));
        }
        if self
            .delivery
            .smtp_server
            .as_deref()
            .is_some_and(|server| server.trim().is_empty())
        {
            return Err(TagmailError::ConfigError(
                "smtp_server must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }

    // Builder methods

    pub fn with_tagmap(mut self, path: impl Into<PathBuf>) -> Self {
        self.tagmap = path.into();
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_parallel_processing(mut self, enable: bool) -> Self {
        self.engine.parallel.enabled = enable;
        self
    }

    pub fn with_min_rules_for_parallelism(mut self, min_rules: usize) -> Self {
        self.engine.parallel.min_rules = min_rules;
        self
    }

    pub fn with_smtp_server(mut self, server: impl Into<String>) -> Self {
        self.delivery.smtp_server = Some(server.into());
        self
    }

    pub fn with_smtp_port(mut self, port: u16) -> Self {
        self.delivery.smtp_port = port;
        self
    }

    pub fn with_smtp_helo(mut self, helo: impl Into<String>) -> Self {
        self.delivery.smtp_helo = helo.into();
        self
    }

    pub fn with_sendmail(mut self, path: impl Into<PathBuf>) -> Self {
        self.delivery.sendmail = Some(path.into());
        self
    }

    pub fn without_sendmail(mut self) -> Self {
        self.delivery.sendmail = None;
        self
    }

    pub fn with_report_from(mut self, from: impl Into<String>) -> Self {
        self.delivery.report_from = from.into();
        self
    }

    pub fn with_subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.delivery.subject_prefix = prefix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.delivery.timeout_secs = timeout.as_secs().max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TagmailConfig::default();

        assert_eq!(config.tagmap, PathBuf::from("/etc/puppet/tagmail.conf"));
        assert_eq!(config.delivery.smtp_server, None);
        assert_eq!(config.delivery.smtp_port, 25);
        assert_eq!(config.delivery.smtp_helo, "localhost");
        assert_eq!(config.delivery.timeout(), Duration::from_secs(30));
        assert!(!config.engine.parallel.enabled);
        assert_eq!(config.engine.parallel.min_rules, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = TagmailConfig::new()
            .with_tagmap("/tmp/tagmail.conf")
            .with_smtp_server("mail.example.com")
            .with_smtp_port(2525)
            .with_smtp_helo("agent.example.com")
            .with_sendmail("/usr/lib/sendmail")
            .with_report_from("puppet@example.com")
            .with_subject_prefix("Run report for")
            .with_timeout(Duration::from_secs(5))
            .with_parallel_processing(true)
            .with_min_rules_for_parallelism(2);

        assert_eq!(config.tagmap, PathBuf::from("/tmp/tagmail.conf"));
        assert_eq!(config.delivery.smtp_server.as_deref(), Some("mail.example.com"));
        assert_eq!(config.delivery.smtp_port, 2525);
        assert_eq!(config.delivery.smtp_helo, "agent.example.com");
        assert_eq!(config.delivery.sendmail, Some(PathBuf::from("/usr/lib/sendmail")));
        assert_eq!(config.delivery.report_from, "puppet@example.com");
        assert_eq!(config.delivery.subject_for("web01"), "Run report for web01");
        assert_eq!(config.delivery.timeout_secs, 5);
        assert!(config.engine.use_parallel(2));
        assert!(!config.engine.use_parallel(1));
    }

    #[test]
    fn test_without_sendmail() {
        let config = TagmailConfig::new().with_sendmail("/bin/true").without_sendmail();
        assert_eq!(config.delivery.sendmail, None);
    }

    #[test]
    fn test_engine_presets() {
        assert!(!EngineConfig::sequential().use_parallel(1000));
        assert!(EngineConfig::parallel().use_parallel(1));
        assert!(!EngineConfig::parallel().use_parallel(0));
        assert!(!EngineConfig::default().use_parallel(100));
    }

    #[test]
    fn test_from_yaml_partial_document() {
        let config = TagmailConfig::from_yaml_str(
            r#"
tagmap: /srv/tagmail.conf
delivery:
  sendmail: /usr/bin/msmtp
  subject_prefix: "Report for"
"#,
        )
        .unwrap();

        assert_eq!(config.tagmap, PathBuf::from("/srv/tagmail.conf"));
        assert_eq!(config.delivery.sendmail, Some(PathBuf::from("/usr/bin/msmtp")));
        assert_eq!(config.delivery.smtp_port, 25);
        assert_eq!(config.delivery.subject_for("db1"), "Report for db1");
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_from_yaml_rejects_invalid() {
        let err = TagmailConfig::from_yaml_str("delivery:\n  smtp_port: 0\n").unwrap_err();
        assert!(matches!(err, TagmailError::ConfigError(_)));

        let err = TagmailConfig::from_yaml_str("delivery:\n  report_from: ''\n").unwrap_err();
        assert!(matches!(err, TagmailError::ConfigError(_)));

        let err = TagmailConfig::from_yaml_str("delivery:\n  smtp_server: 127.0.0.1\n  timeout_secs: 0\n")
            .unwrap_err();
        assert_eq!(
            err,
            TagmailError::ConfigError("timeout_secs must be non-zero".to_string())
        );

        let err = TagmailConfig::from_yaml_str("delivery: [1, 2").unwrap_err();
        assert!(matches!(err, TagmailError::YamlError(_)));
    }

    #[test]
    fn test_empty_sendmail_is_unset() {
        let config = TagmailConfig::from_yaml_str("delivery:\n  sendmail: ''\n").unwrap();
        assert_eq!(config.delivery.sendmail, None);

        let config = TagmailConfig::from_yaml_str("delivery:\n  sendmail: ~\n").unwrap();
        assert_eq!(config.delivery.sendmail, None);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "delivery:").unwrap();
        writeln!(file, "  smtp_server: relay.local").unwrap();
        writeln!(file, "  timeout_secs: 3").unwrap();

        let config = TagmailConfig::from_file(file.path()).unwrap();
        assert_eq!(config.delivery.smtp_server.as_deref(), Some("relay.local"));
        assert_eq!(config.delivery.timeout(), Duration::from_secs(3));
    }
}
