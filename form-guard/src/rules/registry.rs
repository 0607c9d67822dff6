//! Registration table mapping rule type names to handlers.

use super::{
    normalize_type_name, AgeRule, ConditionalRequiredRule, CustomRule, DateComparisonRule,
    DateRangeRule, DateRule, DepartmentCheckRule, EmailRule, FormatCheckRule, LeaveBalanceRule,
    PhoneFormatRule, RangeRule, RegexRule, RequiredRule, RuleKind, UniqueRule,
};
use crate::core::{BoxedRuleHandler, RuleHandler};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Maps canonical rule type names to handlers.
///
/// Adding a rule type is a registration, not a code change in the engine.
/// Names are normalized the same way template types are, so a handler
/// registered as `IBAN_Check` serves rules typed `iban-check`.
///
/// # Examples
///
/// ```rust
/// use form_guard::rules::{RuleRegistry, RequiredRule};
/// use std::sync::Arc;
///
/// let mut registry = RuleRegistry::with_builtins();
/// assert!(registry.get("salary-range").is_some());
///
/// registry.register("mandatory", Arc::new(RequiredRule));
/// assert!(registry.get("Mandatory").is_some());
/// ```
#[derive(Clone, Default)]
pub struct RuleRegistry {
    handlers: HashMap<String, BoxedRuleHandler>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in rule kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let range: BoxedRuleHandler = Arc::new(RangeRule);
        let unique: BoxedRuleHandler = Arc::new(UniqueRule);

        for kind in RuleKind::ALL {
            let handler: BoxedRuleHandler = match kind {
                RuleKind::Required => Arc::new(RequiredRule),
                RuleKind::Regex => Arc::new(RegexRule),
                RuleKind::Range | RuleKind::SalaryRange => Arc::clone(&range),
                RuleKind::Email => Arc::new(EmailRule),
                RuleKind::PhoneFormat => Arc::new(PhoneFormatRule),
                RuleKind::Date => Arc::new(DateRule),
                RuleKind::DateBefore => Arc::new(DateComparisonRule::before()),
                RuleKind::DateAfter => Arc::new(DateComparisonRule::after()),
                RuleKind::DateRange => Arc::new(DateRangeRule),
                RuleKind::Age => Arc::new(AgeRule),
                RuleKind::Unique | RuleKind::DuplicateCheck => Arc::clone(&unique),
                RuleKind::DepartmentCheck => Arc::new(DepartmentCheckRule),
                RuleKind::LeaveBalance => Arc::new(LeaveBalanceRule),
                RuleKind::ConditionalRequired => Arc::new(ConditionalRequiredRule),
                RuleKind::FormatCheck => Arc::new(FormatCheckRule),
                RuleKind::Custom => Arc::new(CustomRule),
            };
            registry.handlers.insert(kind.name().to_string(), handler);
        }
        registry
    }

    /// Adds or replaces the handler for `type_name`.
    ///
    /// Registering a built-in name replaces the built-in handler.
    pub fn register(&mut self, type_name: &str, handler: Arc<dyn RuleHandler>) -> &mut Self {
        let name = canonical_name(type_name);
        debug!(rule.r#type = %name, handler = handler.name(), "Registering rule handler");
        self.handlers.insert(name, handler);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_handler(mut self, type_name: &str, handler: Arc<dyn RuleHandler>) -> Self {
        self.register(type_name, handler);
        self
    }

    /// Returns the handler for a type name, resolving aliases.
    pub fn get(&self, type_name: &str) -> Option<&BoxedRuleHandler> {
        self.handlers.get(&canonical_name(type_name))
    }

    /// Returns true if a handler exists for the type name.
    pub fn contains(&self, type_name: &str) -> bool {
        self.get(type_name).is_some()
    }

    /// Returns the registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered type names.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn canonical_name(type_name: &str) -> String {
    match RuleKind::from_type_name(type_name) {
        Some(kind) => kind.name().to_string(),
        None => normalize_type_name(type_name),
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
