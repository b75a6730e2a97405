//! Definition types for positional arguments and options.
//!
//! Options are a tagged union: a boolean flag or a value option whose value
//! is a string or a number. The kind is resolved once, when the option is
//! declared, from the composite flag syntax (`--config <file>`), an explicit
//! value name or type, or the type of the default value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix that marks a token as an option.
pub const OPTION_PREFIX: &str = "--";

/// Flag handled by the engine on every command.
pub const HELP_FLAG: &str = "--help";

/// Returns true if the token is shaped like an option.
pub fn is_flag(token: &str) -> bool {
    token.starts_with(OPTION_PREFIX)
}

/// Strips one pair of surrounding angle brackets, if present.
pub(crate) fn strip_angle(text: &str) -> &str {
    text.strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(text)
}

/// Type a value option coerces its token to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Number,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::Number => write!(f, "number"),
        }
    }
}

/// A parsed or default option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Number(n) => write!(f, "{n}"),
            OptionValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Number(f64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

/// A positional argument, filled in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionalDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PositionalDef {
    /// Creates a positional; `<file>` and `file` are equivalent.
    pub fn new(name: &str) -> Self {
        Self {
            name: strip_angle(name.trim()).to_string(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Usage placeholder, e.g. `<file>`.
    pub fn placeholder(&self) -> String {
        format!("<{}>", self.name)
    }
}

/// Kind of an option, fixed at declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionKind {
    /// Flag with no value token. Present means true.
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<bool>,
    },
    /// Option that consumes the following token.
    Value {
        value_name: String,
        value_type: ValueType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<OptionValue>,
    },
}

/// Declared option on a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDef {
    /// Flag including the `--` prefix, e.g. `--config`.
    pub flag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: OptionKind,
}

impl OptionDef {
    /// Creates a boolean flag.
    pub fn boolean(flag: &str) -> Self {
        Self {
            flag: flag.to_string(),
            description: None,
            kind: OptionKind::Boolean { default: None },
        }
    }

    /// Creates a value option.
    pub fn value(flag: &str, value_name: &str, value_type: ValueType) -> Self {
        Self {
            flag: flag.to_string(),
            description: None,
            kind: OptionKind::Value {
                value_name: strip_angle(value_name).to_string(),
                value_type,
                default: None,
            },
        }
    }

    /// Resolves a declaration into a definition.
    ///
    /// The flag may be composite (`--config <file>`); everything after the
    /// first whitespace names the value and makes the option a value option.
    pub fn from_declaration(flag: &str, description: &str, config: OptionConfig) -> Self {
        let (base, composite_name) = match flag.trim().split_once(char::is_whitespace) {
            Some((base, rest)) => {
                let name = strip_angle(rest.trim());
                (base, (!name.is_empty()).then(|| name.to_string()))
            }
            None => (flag.trim(), None),
        };

        let value_name = config
            .value_name
            .map(|name| strip_angle(&name).to_string())
            .or(composite_name);
        let default_type = match &config.default {
            Some(OptionValue::Number(_)) => Some(ValueType::Number),
            Some(OptionValue::String(_)) => Some(ValueType::String),
            _ => None,
        };
        let value_type = config.value_type.or(default_type);

        let kind = if value_name.is_some() || value_type.is_some() {
            let key = base.strip_prefix(OPTION_PREFIX).unwrap_or(base);
            OptionKind::Value {
                value_name: value_name.unwrap_or_else(|| key.to_string()),
                value_type: value_type.unwrap_or_default(),
                default: config.default,
            }
        } else {
            OptionKind::Boolean {
                default: config.default.as_ref().and_then(OptionValue::as_bool),
            }
        };

        Self {
            flag: base.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            kind,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Key used in parsed results: the flag without its prefix.
    pub fn key(&self) -> &str {
        self.flag.strip_prefix(OPTION_PREFIX).unwrap_or(&self.flag)
    }

    pub fn matches(&self, token: &str) -> bool {
        self.flag == token
    }

    pub fn takes_value(&self) -> bool {
        matches!(self.kind, OptionKind::Value { .. })
    }

    /// Display label, e.g. `--verbose` or `--config <file>`.
    pub fn label(&self) -> String {
        match &self.kind {
            OptionKind::Boolean { .. } => self.flag.clone(),
            OptionKind::Value { value_name, .. } => format!("{} <{value_name}>", self.flag),
        }
    }

    /// Explicitly declared default, used for help annotations.
    pub fn declared_default(&self) -> Option<OptionValue> {
        match &self.kind {
            OptionKind::Boolean { default } => default.map(OptionValue::Bool),
            OptionKind::Value { default, .. } => default.clone(),
        }
    }

    /// Value seeded into the parse result before tokens are read.
    ///
    /// Booleans always have one (false unless declared); value options only
    /// when a default was declared.
    pub fn seed_value(&self) -> Option<OptionValue> {
        match &self.kind {
            OptionKind::Boolean { default } => Some(OptionValue::Bool(default.unwrap_or(false))),
            OptionKind::Value { default, .. } => default.clone(),
        }
    }
}

/// Optional settings for declaring an option through
/// [`CommandBuilder::option`](crate::CommandBuilder::option).
///
/// # Examples
///
/// ```
/// use argus_core::{OptionConfig, OptionDef, OptionKind, ValueType};
///
/// let depth = OptionDef::from_declaration("--depth", "", OptionConfig::new().default_value(1));
/// assert!(matches!(
///     depth.kind,
///     OptionKind::Value { value_type: ValueType::Number, .. }
/// ));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionConfig {
    default: Option<OptionValue>,
    value_name: Option<String>,
    value_type: Option<ValueType>,
}

impl OptionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default value. A string or number default makes the option a value
    /// option of that type unless a type is set explicitly.
    pub fn default_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Placeholder shown in help; makes the option a value option.
    pub fn value_name(mut self, name: impl Into<String>) -> Self {
        self.value_name = Some(name.into());
        self
    }

    /// Value option coerced to a number.
    pub fn number(mut self) -> Self {
        self.value_type = Some(ValueType::Number);
        self
    }

    /// Value option kept as a string.
    pub fn string(mut self) -> Self {
        self.value_type = Some(ValueType::String);
        self
    }
}

/// Serializable description of a command tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandShape {
    pub name: String,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positionals: Vec<PositionalDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandShape>,
    #[serde(default)]
    pub has_handler: bool,
    #[serde(default)]
    pub middleware: usize,
}

impl CommandShape {
    /// Finds a direct sub-command by name or alias.
    pub fn find_subcommand(&self, name: &str) -> Option<&CommandShape> {
        self.subcommands
            .iter()
            .find(|sub| sub.name == name || sub.aliases.iter().any(|a| a == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_flag_declares_value_option() {
        let option = OptionDef::from_declaration("--config <file>", "Config file", OptionConfig::new());
        assert_eq!(option.flag, "--config");
        assert_eq!(option.key(), "config");
        assert_eq!(option.label(), "--config <file>");
        assert_eq!(option.description.as_deref(), Some("Config file"));
        assert!(matches!(
            option.kind,
            OptionKind::Value { ref value_name, value_type: ValueType::String, default: None }
                if value_name == "file"
        ));
    }

    #[test]
    fn test_plain_flag_is_boolean() {
        let option = OptionDef::from_declaration("--verbose", "", OptionConfig::new());
        assert_eq!(option.kind, OptionKind::Boolean { default: None });
        assert_eq!(option.description, None);
        assert_eq!(option.seed_value(), Some(OptionValue::Bool(false)));
        assert_eq!(option.declared_default(), None);
    }

    #[test]
    fn test_boolean_default_is_kept() {
        let option =
            OptionDef::from_declaration("--color", "", OptionConfig::new().default_value(true));
        assert_eq!(option.kind, OptionKind::Boolean { default: Some(true) });
        assert_eq!(option.seed_value(), Some(OptionValue::Bool(true)));
    }

    #[test]
    fn test_typed_default_implies_value_kind() {
        let port = OptionDef::from_declaration("--port", "", OptionConfig::new().default_value(3000));
        assert_eq!(
            port.kind,
            OptionKind::Value {
                value_name: "port".into(),
                value_type: ValueType::Number,
                default: Some(OptionValue::Number(3000.0)),
            }
        );

        let host =
            OptionDef::from_declaration("--host", "", OptionConfig::new().default_value("localhost"));
        assert!(matches!(host.kind, OptionKind::Value { value_type: ValueType::String, .. }));
    }

    #[test]
    fn test_explicit_number_without_default() {
        let option = OptionDef::from_declaration(
            "--count",
            "",
            OptionConfig::new().number().value_name("<n>"),
        );
        assert_eq!(option.label(), "--count <n>");
        assert_eq!(option.seed_value(), None);
        assert!(option.takes_value());
    }

    #[test]
    fn test_option_value_display() {
        assert_eq!(OptionValue::Number(5.0).to_string(), "5");
        assert_eq!(OptionValue::Number(2.5).to_string(), "2.5");
        assert_eq!(OptionValue::Bool(true).to_string(), "true");
        assert_eq!(OptionValue::from("x").to_string(), "x");
    }

    #[test]
    fn test_positional_strips_brackets() {
        let positional = PositionalDef::new("<file>");
        assert_eq!(positional.name, "file");
        assert_eq!(positional.placeholder(), "<file>");
    }

    #[test]
    fn test_option_def_serialization() {
        let option = OptionDef::value("--depth", "n", ValueType::Number);
        let json = serde_json::to_value(&option).unwrap();
        assert_eq!(json["flag"], "--depth");
        assert_eq!(json["kind"], "value");
        assert_eq!(json["value_type"], "number");

        let parsed: OptionDef = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, option);
    }
}
