//! Engine configuration.

use crate::logging::LogConfig;
use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// What [`validate`](super::ValidationEngine::validate) returns when the engine itself faults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultPolicy {
    /// Return `{valid: true, errors: {}}` so a broken template never blocks a form
    #[default]
    FailOpen,
    /// Return `{valid: false, errors: {}, fault}` so a broken engine never approves data
    FailClosed,
}

/// How the fields of one submission are evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldEvaluation {
    /// One field after another, in template order
    #[default]
    Sequential,
    /// All fields at once; results are still collected in template order
    Concurrent,
}

/// Configuration of a [`ValidationEngine`](super::ValidationEngine).
///
/// # Examples
///
/// ```rust
/// use form_guard::core::{EngineConfig, FaultPolicy, FieldEvaluation};
///
/// let config = EngineConfig::from_json(
///     r#"{"fault_policy": "fail-closed", "field_evaluation": "concurrent"}"#,
/// ).unwrap();
/// assert_eq!(config.fault_policy, FaultPolicy::FailClosed);
/// assert_eq!(config.field_evaluation, FieldEvaluation::Concurrent);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Result returned on an engine fault
    pub fault_policy: FaultPolicy,
    /// Sequential or concurrent field evaluation
    pub field_evaluation: FieldEvaluation,
    /// Logging detail for the engine
    #[serde(skip)]
    pub log: LogConfig,
}

impl EngineConfig {
    /// Fail closed and log every rule.
    pub fn strict() -> Self {
        Self {
            fault_policy: FaultPolicy::FailClosed,
            field_evaluation: FieldEvaluation::Sequential,
            log: LogConfig::verbose(),
        }
    }

    /// Concurrent field evaluation with minimal logging, for bulk uploads.
    pub fn high_throughput() -> Self {
        Self {
            fault_policy: FaultPolicy::FailOpen,
            field_evaluation: FieldEvaluation::Concurrent,
            log: LogConfig::production(),
        }
    }

    /// Sets the fault policy.
    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    /// Sets the field evaluation mode.
    pub fn with_field_evaluation(mut self, mode: FieldEvaluation) -> Self {
        self.field_evaluation = mode;
        self
    }

    /// Sets the logging configuration.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Parses a configuration from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GuardError::Configuration(format!("invalid engine config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fail_open() {
        let config = EngineConfig::default();
        assert_eq!(config.fault_policy, FaultPolicy::FailOpen);
        assert_eq!(config.field_evaluation, FieldEvaluation::Sequential);
    }

    #[test]
    fn test_presets() {
        assert_eq!(EngineConfig::strict().fault_policy, FaultPolicy::FailClosed);
        assert!(EngineConfig::strict().log.log_rule_details);
        assert_eq!(
            EngineConfig::high_throughput().field_evaluation,
            FieldEvaluation::Concurrent
        );
    }

    #[test]
    fn test_from_json() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config.fault_policy, FaultPolicy::FailOpen);

        let err = EngineConfig::from_json(r#"{"fault_policy": "explode"}"#).unwrap_err();
        assert!(matches!(err, GuardError::Configuration(_)));
    }
}
