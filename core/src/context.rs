//! Per-invocation context handed to middleware and handlers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::parser::ParsedArgs;
use crate::types::{OPTION_PREFIX, OptionValue};
use crate::ui::{Console, Ui};

/// Parsed inputs plus the capabilities available to the matched command.
///
/// Middleware receives it mutably and may annotate options before calling
/// its continuation; the handler sees the final state.
pub struct InvocationContext {
    args: BTreeMap<String, String>,
    options: BTreeMap<String, OptionValue>,
    command_path: Vec<String>,
    ui: Option<Arc<dyn Ui>>,
    console: Arc<dyn Console>,
}

impl InvocationContext {
    pub fn new(
        parsed: ParsedArgs,
        command_path: Vec<String>,
        ui: Option<Arc<dyn Ui>>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            args: parsed.positionals,
            options: parsed.options,
            command_path,
            ui,
            console,
        }
    }

    /// Positional arguments by name.
    pub fn args(&self) -> &BTreeMap<String, String> {
        &self.args
    }

    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    /// Option values keyed by flag name without the `--` prefix.
    pub fn options(&self) -> &BTreeMap<String, OptionValue> {
        &self.options
    }

    /// Looks up an option; `"--port"` and `"port"` are equivalent.
    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(normalize_key(key))
    }

    /// True only when the option holds boolean `true`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.option(key), Some(OptionValue::Bool(true)))
    }

    /// Typed option lookup.
    pub fn value<T: FromOptionValue>(&self, key: &str) -> Option<T> {
        self.option(key).and_then(T::from_option_value)
    }

    /// Sets or replaces an option value.
    pub fn set_option(&mut self, key: &str, value: impl Into<OptionValue>) {
        self.options
            .insert(normalize_key(key).to_string(), value.into());
    }

    /// Path of the matched command, root name first.
    pub fn command_path(&self) -> &[String] {
        &self.command_path
    }

    pub fn ui(&self) -> Option<&dyn Ui> {
        self.ui.as_deref()
    }

    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("args", &self.args)
            .field("options", &self.options)
            .field("command_path", &self.command_path)
            .field("has_ui", &self.ui.is_some())
            .finish_non_exhaustive()
    }
}

fn normalize_key(key: &str) -> &str {
    key.strip_prefix(OPTION_PREFIX).unwrap_or(key)
}

/// Conversion from a stored option value.
pub trait FromOptionValue: Sized {
    fn from_option_value(value: &OptionValue) -> Option<Self>;
}

impl FromOptionValue for bool {
    fn from_option_value(value: &OptionValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromOptionValue for String {
    fn from_option_value(value: &OptionValue) -> Option<Self> {
        value.as_str().map(String::from)
    }
}

impl FromOptionValue for f64 {
    fn from_option_value(value: &OptionValue) -> Option<Self> {
        value.as_number()
    }
}

impl FromOptionValue for i64 {
    fn from_option_value(value: &OptionValue) -> Option<Self> {
        value
            .as_number()
            .filter(|n| n.fract() == 0.0 && n.is_finite())
            .map(|n| n as i64)
    }
}

impl FromOptionValue for OptionValue {
    fn from_option_value(value: &OptionValue) -> Option<Self> {
        Some(value.clone())
    }
}
