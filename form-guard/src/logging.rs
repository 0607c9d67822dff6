//! Logging configuration for form-guard.
//!
//! The engine emits structured `tracing` events. Validation may run on every
//! keystroke, so per-rule events are gated behind [`LogConfig`]. Form values
//! are personal data (salaries, bank accounts, tax numbers) and stay out of
//! log output unless [`ValueLogging`] allows them.

use serde_json::Value;
use tracing::Level;

/// How field values appear in engine log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueLogging {
    /// Values are replaced by `<redacted>`
    #[default]
    Redacted,
    /// All but the last two characters are replaced by `*`
    Masked,
    /// Values are logged as submitted, truncated to the configured length
    Plain,
}

/// Logging detail for the validation engine.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Most detailed level the engine emits on its own
    pub base_level: Level,
    /// Emit one debug event per evaluated rule
    pub log_rule_details: bool,
    /// Treatment of field values in rule events
    pub field_values: ValueLogging,
    /// Longest value rendered before truncation, in characters
    pub max_value_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_rule_details: false,
            field_values: ValueLogging::Redacted,
            max_value_length: 64,
        }
    }
}

impl LogConfig {
    /// Every rule with its plain value, for debugging a template.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_rule_details: true,
            field_values: ValueLogging::Plain,
            max_value_length: 512,
        }
    }

    /// Warnings only.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            ..Self::default()
        }
    }

    /// Sets the value treatment.
    pub fn with_field_values(mut self, mode: ValueLogging) -> Self {
        self.field_values = mode;
        self
    }

    /// Renders a field value for a log event.
    pub fn render_value(&self, value: &Value) -> String {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match self.field_values {
            ValueLogging::Redacted => "<redacted>".to_string(),
            ValueLogging::Masked => mask_value(&text),
            ValueLogging::Plain => truncate_value(&text, self.max_value_length),
        }
    }
}

/// Debug event emitted only when the config's base level includes DEBUG.
///
/// Arguments are not evaluated otherwise.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Debug event emitted only when per-rule detail is enabled.
#[macro_export]
macro_rules! log_rule {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_rule_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Cuts `value` to `max_chars` characters, noting how many were dropped.
pub fn truncate_value(value: &str, max_chars: usize) -> String {
    let total = value.chars().count();
    if total <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars).collect();
    format!("{kept}... (+{} chars)", total - max_chars)
}

fn mask_value(value: &str) -> String {
    let total = value.chars().count();
    let visible = if total > 4 { 2 } else { 0 };
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i + visible < total { '*' } else { c })
        .collect()
}

/// Subscriber setup for applications embedding the engine.
pub mod setup {
    use crate::error::{GuardError, Result};
    use tracing::Level;

    /// Output encoding of log lines.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub enum LogFormat {
        /// Human-readable lines
        #[default]
        Text,
        /// One JSON object per event
        Json,
    }

    /// Subscriber configuration.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Level for everything outside form-guard
        pub level: Level,
        /// Level for the `form_guard` target
        pub engine_level: Level,
        /// Line encoding
        pub format: LogFormat,
        /// Complete filter directive replacing `level` and `engine_level`
        pub filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                engine_level: Level::DEBUG,
                format: LogFormat::Text,
                filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON lines, engine at INFO, everything else at WARN.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                engine_level: Level::INFO,
                format: LogFormat::Json,
                filter: None,
            }
        }

        /// Text lines with everything at DEBUG.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                ..Self::default()
            }
        }

        /// Sets the level outside form-guard.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the level of the `form_guard` target.
        pub fn with_engine_level(mut self, level: Level) -> Self {
            self.engine_level = level;
            self
        }

        /// Sets the line encoding.
        pub fn with_format(mut self, format: LogFormat) -> Self {
            self.format = format;
            self
        }

        /// Replaces the generated filter directive.
        pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
            self.filter = Some(filter.into());
            self
        }

        /// Returns the filter directive handed to `EnvFilter`.
        pub fn env_filter(&self) -> String {
            match &self.filter {
                Some(filter) => filter.clone(),
                None => format!(
                    "{},form_guard={}",
                    self.level.as_str().to_lowercase(),
                    self.engine_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global subscriber.
    ///
    /// `RUST_LOG` wins over the configured filter when it is set. Fails if a
    /// global subscriber is already installed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use form_guard::logging::setup::{init_logging, LogFormat, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::production().with_format(LogFormat::Text))?;
    /// # Ok::<(), form_guard::error::GuardError>(())
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
            LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| GuardError::Configuration(format!("cannot install subscriber: {e}")))
    }
}
