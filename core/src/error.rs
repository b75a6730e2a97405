//! Error taxonomy for command resolution and parsing.
//!
//! [`CliError`] is the structured, user-facing taxonomy. Every kind carries a
//! stable machine code, a message, optional details and an optional hint, and
//! renders itself through a [`Ui`] panel or, without one, as plain text on a
//! [`Console`]. The dispatcher renders these and swallows them.
//!
//! [`ConfigurationError`] covers wiring mistakes caught while the command tree
//! is being built. [`Error`] is the crate-level error for everything that is
//! returned to the caller instead of being rendered.

use thiserror::Error;

use crate::ui::{Colorizer, Console, Ui};

/// Mistakes in the declared command tree.
///
/// Alias and name conflicts are raised immediately by
/// [`CommandBuilder::subcommand`](crate::CommandBuilder::subcommand); the
/// remaining variants are collected by
/// [`validate_command`](crate::validate_command) when the tree is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A proposed alias equals the name of an existing sibling command.
    #[error("Alias '{alias}' conflicts with existing command '{command}'")]
    AliasConflictsWithCommand { alias: String, command: String },
    /// A proposed alias is already an alias of an existing sibling command.
    #[error("Alias '{alias}' conflicts with existing alias for command '{command}'")]
    AliasConflictsWithAlias { alias: String, command: String },
    /// The same alias appears twice in one registration.
    #[error("Alias '{alias}' is declared more than once for command '{command}'")]
    DuplicateAlias { alias: String, command: String },
    /// A sub-command name is already taken by a sibling name or alias.
    #[error("Command '{name}' conflicts with existing command '{command}'")]
    DuplicateCommand { name: String, command: String },
    /// Sub-command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Positional argument name is empty.
    #[error("positional argument name cannot be empty on command '{0}'")]
    EmptyPositionalName(String),
    /// Option flag does not start with `--` or has no name after it.
    #[error("invalid option flag '{0}': flags must start with '--'")]
    InvalidFlag(String),
    /// The same flag is declared twice on one command.
    #[error("duplicate option '{flag}' on command '{command}'")]
    DuplicateFlag { flag: String, command: String },
    /// The flag is handled by the engine itself.
    #[error("option '{0}' is reserved")]
    ReservedFlag(String),
    /// A value option's default does not match its declared value type.
    #[error("default for option '{flag}' must be a {expected}")]
    InvalidDefault { flag: String, expected: String },
}

/// Structured errors rendered to the user instead of being returned.
///
/// # Examples
///
/// ```
/// use argus_core::CliError;
///
/// let err = CliError::MissingArgument { name: "file".into() };
/// assert_eq!(err.code(), "E_MISSING_ARGUMENT");
/// assert_eq!(err.to_string(), "Missing required argument <file>.");
/// assert_eq!(
///     err.format(None),
///     "E_MISSING_ARGUMENT Missing required argument <file>.\n\
///      The positional argument <file> is required but was not provided.\n\
///      Hint: Provide the <file> value or run with --help to see usage."
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// A declared positional argument received no token.
    #[error("Missing required argument <{name}>.")]
    MissingArgument { name: String },
    /// A flag that the matched command does not declare.
    #[error("Unknown option {flag}.")]
    UnknownOption { flag: String },
    /// A value option without a usable value.
    ///
    /// `received` is set when a token was present but could not be coerced
    /// to the option's declared type.
    #[error("Missing value for option {flag}.")]
    MissingOptionValue {
        flag: String,
        value_name: String,
        received: Option<String>,
    },
    /// A leading token that names none of the command's sub-commands.
    #[error("Invalid sub-command '{input}'.")]
    InvalidSubcommand {
        input: String,
        available: Vec<String>,
    },
    /// Command tree wiring failure.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
    /// Raised by table renderers when header labels and data columns differ.
    #[error("Header count does not match number of columns.")]
    TableHeaderMismatch { headers: usize, columns: usize },
    /// Application-defined error sharing the taxonomy's shape.
    #[error("{message}")]
    Custom {
        code: String,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },
}

impl CliError {
    /// Creates an application-defined error.
    pub fn custom(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<&str>,
        hint: Option<&str>,
    ) -> Self {
        Self::Custom {
            code: code.into(),
            message: message.into(),
            details: details.map(String::from),
            hint: hint.map(String::from),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &str {
        match self {
            Self::MissingArgument { .. } => "E_MISSING_ARGUMENT",
            Self::UnknownOption { .. } => "E_UNKNOWN_OPTION",
            Self::MissingOptionValue { .. } => "E_MISSING_OPTION_VALUE",
            Self::InvalidSubcommand { .. } => "E_INVALID_SUBCOMMAND",
            Self::Configuration(_) => "E_CONFIGURATION",
            Self::TableHeaderMismatch { .. } => "E_TABLE_HEADER_MISMATCH",
            Self::Custom { code, .. } => code,
        }
    }

    /// Elaboration shown below the message.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::MissingArgument { name } => Some(format!(
                "The positional argument <{name}> is required but was not provided."
            )),
            Self::UnknownOption { flag } => Some(format!(
                "The option '{flag}' is not recognized for this command."
            )),
            Self::MissingOptionValue {
                flag,
                value_name,
                received: None,
            } => Some(format!(
                "Expected a value for '{flag}' in place of <{value_name}>."
            )),
            Self::MissingOptionValue {
                flag,
                value_name,
                received: Some(received),
            } => Some(format!(
                "Expected a number for '{flag}' in place of <{value_name}>, received '{received}'."
            )),
            Self::InvalidSubcommand { available, .. } if available.is_empty() => {
                Some("No sub-commands available.".to_string())
            }
            Self::InvalidSubcommand { available, .. } => {
                Some(format!("Available: {}", available.join(", ")))
            }
            Self::Configuration(_) => None,
            Self::TableHeaderMismatch { headers, columns } => Some(format!(
                "Received {headers} header title(s), but inferred {columns} column(s) from data."
            )),
            Self::Custom { details, .. } => details.clone(),
        }
    }

    /// Actionable suggestion shown last.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::MissingArgument { name } => Some(format!(
                "Provide the <{name}> value or run with --help to see usage."
            )),
            Self::UnknownOption { .. } => {
                Some("Remove the option or check the valid options with --help.".to_string())
            }
            Self::MissingOptionValue {
                flag, value_name, ..
            } => Some(format!(
                "Provide a value after {flag}, e.g., \"{flag} <{value_name}>\"."
            )),
            Self::InvalidSubcommand { .. } => {
                Some("Run with --help to list sub-commands.".to_string())
            }
            Self::Configuration(_) => None,
            Self::TableHeaderMismatch { .. } => Some(
                "Ensure head contains exactly one label for each column in the first data row."
                    .to_string(),
            ),
            Self::Custom { hint, .. } => hint.clone(),
        }
    }

    /// Renders `"{code} {message}"`, then details, then `"Hint: {hint}"`.
    ///
    /// With a colorizer the code is red and the hint label blue.
    pub fn format(&self, colors: Option<&dyn Colorizer>) -> String {
        let code = match colors {
            Some(c) => c.red(self.code()),
            None => self.code().to_string(),
        };
        let mut lines = vec![format!("{code} {self}")];
        if let Some(details) = self.details() {
            lines.push(details);
        }
        if let Some(hint) = self.hint() {
            let label = match colors {
                Some(c) => c.blue("Hint: "),
                None => "Hint: ".to_string(),
            };
            lines.push(format!("{label}{hint}"));
        }
        lines.join("\n")
    }

    /// Hands the error to [`Ui::error`] under the title `Error`, or prints
    /// it as plain text on the console's error stream when no UI capability
    /// is available.
    pub fn print(&self, ui: Option<&dyn Ui>, console: &dyn Console) {
        let colors = ui.and_then(|ui| ui.colors());
        let title = match colors {
            Some(c) => c.bold("Error"),
            None => "Error".to_string(),
        };
        let text = self.format(colors);
        match ui {
            Some(ui) => ui.error(&text, &title),
            None => console.err(&format!("{title}:\n{text}")),
        }
    }
}

/// A middleware stage called its continuation a second time.
///
/// This is fatal and is never rendered as a [`CliError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("middleware stage {stage} invoked its continuation more than once")]
pub struct ContinuationReused {
    /// Zero-based index of the offending stage in the root-to-leaf chain.
    pub stage: usize,
}

/// Errors returned to the caller rather than rendered.
#[derive(Debug, Error)]
pub enum Error {
    /// The command tree failed validation.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A continuation was invoked twice within one stage call.
    #[error(transparent)]
    ContinuationReused(#[from] ContinuationReused),

    /// `run_from` was given a path that does not exist in the tree.
    #[error("no command at path '{0}'")]
    UnknownCommandPath(String),

    /// Non-taxonomy failure from a handler or middleware, passed through
    /// unmodified.
    #[error(transparent)]
    Handler(anyhow::Error),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
