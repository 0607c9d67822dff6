//! Templates: ordered field definitions with compiled rule chains.
//!
//! Templates are loaded from the JSON documents produced by the template
//! builder. Rule conditions are resolved once, at load time, so validation
//! calls never re-parse them.

use super::form_data::deserialize_flag;
use super::rule::{CompiledRule, RuleSpec};
use super::validation_context::Scope;
use crate::prelude::*;
use crate::security::InputValidator;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, instrument};

/// Field type used when a template does not name one.
pub const DEFAULT_FIELD_TYPE: &str = "text";

#[derive(Debug, Deserialize)]
struct RawTemplate {
    #[serde(default, alias = "Name", alias = "templateName", alias = "TemplateName")]
    name: Option<String>,
    #[serde(alias = "Fields", alias = "templateFields", alias = "TemplateFields")]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    #[serde(alias = "Name", alias = "fieldName", alias = "FieldName")]
    name: String,
    #[serde(default, alias = "Label", alias = "displayName", alias = "DisplayName")]
    label: Option<String>,
    #[serde(
        default,
        rename = "type",
        alias = "Type",
        alias = "fieldType",
        alias = "FieldType"
    )]
    field_type: Option<String>,
    #[serde(
        default,
        alias = "Required",
        alias = "isRequired",
        alias = "IsRequired",
        deserialize_with = "deserialize_flag"
    )]
    required: bool,
    #[serde(
        default,
        alias = "Applicable",
        alias = "applicableFor",
        alias = "ApplicableFor"
    )]
    applicable: Option<Applicability>,
    #[serde(
        default,
        alias = "Validation",
        alias = "validations",
        alias = "rules",
        alias = "Rules"
    )]
    validation: Option<RawValidation>,
}

/// `applicable` as a list or a comma-delimited string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Applicability {
    List(Vec<String>),
    Text(String),
}

impl Applicability {
    fn into_scopes(self) -> Vec<Scope> {
        let names: Vec<String> = match self {
            Applicability::List(items) => items,
            Applicability::Text(text) => text.split(',').map(str::to_string).collect(),
        };
        names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(Scope::new)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValidation {
    Text(String),
    Chain(Vec<RawRule>),
    Rule(RuleSpec),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRule {
    Text(String),
    Rule(RuleSpec),
}

impl RawRule {
    fn into_spec(self) -> Option<RuleSpec> {
        let spec = match self {
            RawRule::Text(name) => RuleSpec::new(name.trim()),
            RawRule::Rule(spec) => spec,
        };
        let empty = spec.rule_type.trim().is_empty() || spec.rule_type.trim().eq_ignore_ascii_case("none");
        (!empty).then_some(spec)
    }
}

impl RawValidation {
    fn into_specs(self) -> Vec<RuleSpec> {
        match self {
            RawValidation::Text(name) => RawRule::Text(name).into_spec().into_iter().collect(),
            RawValidation::Chain(rules) => rules.into_iter().filter_map(RawRule::into_spec).collect(),
            RawValidation::Rule(spec) => RawRule::Rule(spec).into_spec().into_iter().collect(),
        }
    }
}

/// One named, typed, optionally required field with its rule chain.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    name: String,
    label: String,
    field_type: String,
    required: bool,
    applicable: Vec<Scope>,
    rules: Vec<CompiledRule>,
}

impl FieldDefinition {
    /// Starts building a field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use form_guard::core::{FieldDefinition, RuleSpec};
    ///
    /// let field = FieldDefinition::builder("basicSalary")
    ///     .label("Basic Salary")
    ///     .field_type("number")
    ///     .required(true)
    ///     .rule(RuleSpec::new("salary-range").with_condition("20000-90000"))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(field.label(), "Basic Salary");
    /// assert_eq!(field.rules().len(), 1);
    /// ```
    pub fn builder(name: impl Into<String>) -> FieldDefinitionBuilder {
        FieldDefinitionBuilder {
            name: name.into(),
            label: None,
            field_type: None,
            required: false,
            applicable: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Returns the field name, the key into form data.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the label used in messages.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the declared field type.
    pub fn field_type(&self) -> &str {
        &self.field_type
    }

    /// Returns true if an empty value fails the field before any rule runs.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the scopes the field applies to; empty means every scope.
    pub fn applicable(&self) -> &[Scope] {
        &self.applicable
    }

    /// Returns the compiled rule chain in declared order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Returns true if the field is validated in `scope`.
    pub fn applies_to(&self, scope: &Scope) -> bool {
        self.applicable.is_empty() || self.applicable.contains(scope)
    }

    fn from_raw(raw: RawField) -> Result<Self> {
        let mut builder = Self::builder(raw.name.trim())
            .required(raw.required)
            .rules(raw.validation.map(RawValidation::into_specs).unwrap_or_default());
        if let Some(label) = raw.label.filter(|l| !l.trim().is_empty()) {
            builder = builder.label(label.trim());
        }
        if let Some(field_type) = raw.field_type.filter(|t| !t.trim().is_empty()) {
            builder = builder.field_type(field_type.trim());
        }
        if let Some(applicable) = raw.applicable {
            builder.applicable = applicable.into_scopes();
        }
        builder.build()
    }
}

/// Builder for [`FieldDefinition`].
#[derive(Debug)]
pub struct FieldDefinitionBuilder {
    name: String,
    label: Option<String>,
    field_type: Option<String>,
    required: bool,
    applicable: Vec<Scope>,
    rules: Vec<RuleSpec>,
}

impl FieldDefinitionBuilder {
    /// Sets the label; defaults to the field name.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the field type; defaults to `text`.
    pub fn field_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Marks the field as required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Restricts the field to a scope. May be called repeatedly.
    pub fn applicable(mut self, scope: impl Into<Scope>) -> Self {
        self.applicable.push(scope.into());
        self
    }

    /// Appends a rule to the chain.
    pub fn rule(mut self, rule: RuleSpec) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends several rules to the chain.
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleSpec>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Validates the name and compiles the rule chain.
    pub fn build(self) -> Result<FieldDefinition> {
        InputValidator::validate_identifier(&self.name, "field name")?;

        let rules = self
            .rules
            .into_iter()
            .map(|spec| CompiledRule::compile(spec, &self.name))
            .collect();

        Ok(FieldDefinition {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            field_type: self
                .field_type
                .unwrap_or_else(|| DEFAULT_FIELD_TYPE.to_string()),
            name: self.name,
            required: self.required,
            applicable: self.applicable,
            rules,
        })
    }
}

/// An ordered, compiled set of field definitions.
///
/// # Examples
///
/// ```rust
/// use form_guard::core::Template;
///
/// let template = Template::from_json(r#"{
///     "name": "employee",
///     "fields": [
///         {"name": "email", "label": "Email", "required": true, "validation": "email"},
///         {"name": "department", "validation": {"type": "department-check"}},
///         {"name": "notes", "validation": "none"}
///     ]
/// }"#).unwrap();
///
/// assert_eq!(template.len(), 3);
/// assert_eq!(template.field("notes").unwrap().rules().len(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Template {
    name: Option<String>,
    fields: Vec<FieldDefinition>,
}

impl Template {
    /// Starts building a template.
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    /// Parses a template from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| GuardError::TemplateParse(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Builds a template from a JSON value: an object with `fields`, or a bare field array.
    #[instrument(skip(value))]
    pub fn from_value(value: Value) -> Result<Self> {
        let raw = match value {
            Value::Array(_) => RawTemplate {
                name: None,
                fields: serde_json::from_value(value)
                    .map_err(|e| GuardError::TemplateParse(e.to_string()))?,
            },
            Value::Object(_) => serde_json::from_value::<RawTemplate>(value)
                .map_err(|e| GuardError::TemplateParse(e.to_string()))?,
            other => {
                return Err(GuardError::TemplateParse(format!(
                    "expected an object with fields or an array of fields, found {}",
                    json_type_name(&other)
                )))
            }
        };

        let mut builder = TemplateBuilder {
            name: raw.name.filter(|n| !n.trim().is_empty()),
            fields: Vec::with_capacity(raw.fields.len()),
        };
        for field in raw.fields {
            let name = field.name.clone();
            let definition = FieldDefinition::from_raw(field)
                .with_context(|| format!("Loading field '{name}'"))?;
            builder = builder.field(definition);
        }
        let template = builder.build()?;

        debug!(
            template.name = template.name().unwrap_or("<unnamed>"),
            template.fields = template.len(),
            template.rules = template.rule_count(),
            "Template compiled"
        );
        Ok(template)
    }

    /// Reads and parses a template file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text).with_context(|| format!("Loading template {}", path.display()))
    }

    /// Returns the template name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the fields in declared order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the template has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of rules across all fields.
    pub fn rule_count(&self) -> usize {
        self.fields.iter().map(|field| field.rules.len()).sum()
    }
}

/// Builder for [`Template`].
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    name: Option<String>,
    fields: Vec<FieldDefinition>,
}

impl TemplateBuilder {
    /// Sets the template name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a field.
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Builds the template, rejecting duplicate field names.
    ///
    /// Date rules that compare against a sibling field pick up that
    /// field's label for their messages.
    pub fn build(mut self) -> Result<Template> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(GuardError::TemplateParse(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }

        let labels: HashMap<String, String> = self
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.label.clone()))
            .collect();
        let labels: HashMap<&str, &str> = labels
            .iter()
            .map(|(name, label)| (name.as_str(), label.as_str()))
            .collect();
        for field in &mut self.fields {
            for rule in &mut field.rules {
                rule.label_references(&labels);
            }
        }

        Ok(Template {
            name: self.name,
            fields: self.fields,
        })
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
