//! Validation context for passing caller-owned information to rules.
//!
//! The context carries the validation scope, the existing-record snapshot
//! used by uniqueness rules, custom validators, an optional override
//! resolver and an optional reference date. It is cheap to clone and never
//! modified by the engine.

use super::form_data::FormData;
use super::hooks::{CustomValidator, OverrideResolver};
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The surface a validation call comes from, used for applicability filtering.
///
/// Scopes compare case-insensitively: `Upload` and `upload` are the same scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope(Arc<str>);

impl Scope {
    /// Scope of interactive form submissions.
    pub const FORM: &'static str = "form";
    /// Scope of bulk spreadsheet uploads.
    pub const UPLOAD: &'static str = "upload";

    /// Creates a scope, normalizing it to trimmed lowercase.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref().trim().to_ascii_lowercase()))
    }

    /// The interactive form scope.
    pub fn form() -> Self {
        Self::new(Self::FORM)
    }

    /// The bulk upload scope.
    pub fn upload() -> Self {
        Self::new(Self::UPLOAD)
    }

    /// Returns the scope name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::form()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scope {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Runtime context for validation operations.
///
/// # Examples
///
/// ```rust
/// use form_guard::core::ValidationContext;
/// use serde_json::json;
///
/// let existing = vec![json!({"email": "a@b.com"}).as_object().cloned().unwrap()];
/// let ctx = ValidationContext::upload().with_existing_records(existing);
///
/// assert_eq!(ctx.scope().as_str(), "upload");
/// assert_eq!(ctx.existing_records().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct ValidationContext {
    scope: Scope,
    existing_records: Arc<Vec<FormData>>,
    custom_validators: HashMap<String, Arc<dyn CustomValidator>>,
    override_resolver: Option<Arc<dyn OverrideResolver>>,
    reference_date: Option<NaiveDate>,
}

impl ValidationContext {
    /// Creates a context for the given scope.
    pub fn new(scope: impl Into<Scope>) -> Self {
        Self {
            scope: scope.into(),
            ..Self::default()
        }
    }

    /// Creates a context for interactive form submissions.
    pub fn form() -> Self {
        Self::new(Scope::form())
    }

    /// Creates a context for bulk uploads.
    pub fn upload() -> Self {
        Self::new(Scope::upload())
    }

    /// Sets the scope.
    pub fn with_scope(mut self, scope: impl Into<Scope>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the snapshot of existing records used by uniqueness rules.
    pub fn with_existing_records(mut self, records: Vec<FormData>) -> Self {
        self.existing_records = Arc::new(records);
        self
    }

    /// Shares an existing snapshot without copying it.
    pub fn with_shared_records(mut self, records: Arc<Vec<FormData>>) -> Self {
        self.existing_records = records;
        self
    }

    /// Registers a custom validator under `name`.
    pub fn with_custom_validator(
        mut self,
        name: impl Into<String>,
        validator: Arc<dyn CustomValidator>,
    ) -> Self {
        self.custom_validators.insert(name.into(), validator);
        self
    }

    /// Installs an override resolver that takes control of every rule.
    pub fn with_override(mut self, resolver: Arc<dyn OverrideResolver>) -> Self {
        self.override_resolver = Some(resolver);
        self
    }

    /// Fixes the date used as "today" by age rules.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Returns the validation scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns the existing record snapshot.
    pub fn existing_records(&self) -> &[FormData] {
        &self.existing_records
    }

    /// Returns the shared handle to the existing record snapshot.
    pub fn shared_records(&self) -> Arc<Vec<FormData>> {
        Arc::clone(&self.existing_records)
    }

    /// Looks up a custom validator by name.
    ///
    /// Exact names win; otherwise the lookup ignores ASCII case.
    pub fn custom_validator(&self, name: &str) -> Option<&Arc<dyn CustomValidator>> {
        let name = name.trim();
        self.custom_validators.get(name).or_else(|| {
            self.custom_validators
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, validator)| validator)
        })
    }

    /// Returns the installed override resolver, if any.
    pub fn override_resolver(&self) -> Option<&Arc<dyn OverrideResolver>> {
        self.override_resolver.as_ref()
    }

    /// Returns the reference date, or the local date when none was fixed.
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut validators: Vec<&str> = self.custom_validators.keys().map(String::as_str).collect();
        validators.sort_unstable();

        f.debug_struct("ValidationContext")
            .field("scope", &self.scope)
            .field("existing_records", &self.existing_records.len())
            .field("custom_validators", &validators)
            .field("override_resolver", &self.override_resolver.is_some())
            .field("reference_date", &self.reference_date)
            .finish()
    }
}

// Task-scoped override kept for callers that install a process-wide
// resolver around their validation calls. The per-call resolver on the
// context takes precedence over it.
tokio::task_local! {
    pub static LEGACY_OVERRIDE: Arc<dyn OverrideResolver>;
}

/// Returns the task-scoped override resolver, if one is installed.
pub fn legacy_override() -> Option<Arc<dyn OverrideResolver>> {
    LEGACY_OVERRIDE.try_with(Arc::clone).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hooks::{override_fn, validator_fn};

    #[test]
    fn test_scope_normalization() {
        assert_eq!(Scope::new(" Upload "), Scope::upload());
        assert_eq!(Scope::default().as_str(), "form");
        assert_eq!(Scope::from("PAYROLL").to_string(), "payroll");
    }

    #[test]
    fn test_context_builder() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let ctx = ValidationContext::form()
            .with_custom_validator("EmployeeCode", validator_fn(|_| None))
            .with_reference_date(date);

        assert_eq!(ctx.today(), date);
        assert!(ctx.custom_validator("EmployeeCode").is_some());
        assert!(ctx.custom_validator("employeecode").is_some());
        assert!(ctx.custom_validator("missing").is_none());
        assert!(ctx.override_resolver().is_none());
        assert!(ctx.existing_records().is_empty());
    }

    #[test]
    fn test_debug_lists_validator_names() {
        let ctx = ValidationContext::upload()
            .with_custom_validator("b", validator_fn(|_| None))
            .with_custom_validator("a", validator_fn(|_| None));
        let debug = format!("{ctx:?}");
        assert!(debug.contains("[\"a\", \"b\"]"));
        assert!(debug.contains("upload"));
    }

    #[tokio::test]
    async fn test_legacy_override_scope() {
        assert!(legacy_override().is_none());

        let resolver = override_fn(|_| Ok(Some("blocked".to_string())));
        LEGACY_OVERRIDE
            .scope(resolver, async {
                assert!(legacy_override().is_some());
            })
            .await;

        assert!(legacy_override().is_none());
    }
}
