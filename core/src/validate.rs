//! Command tree validation.
//!
//! Checks structural invariants that sub-command registration cannot check
//! eagerly: flag formats, duplicate and reserved flags, empty positional
//! names, and defaults that disagree with their option's value type.
//! Validation stops at the first problem in a scope, mirroring how
//! [`CommandBuilder::compile`](crate::CommandBuilder::compile) reports it.
//!
//! # Examples
//!
//! ```
//! use argus_core::*;
//!
//! let mut cli = CommandBuilder::new(CliConfig::new("app"));
//! cli.option("--verbose", "", OptionConfig::new());
//! assert!(validate_command(&cli).is_empty());
//!
//! // Invalid: flag without the `--` prefix
//! cli.option("quiet", "", OptionConfig::new());
//! assert_eq!(
//!     validate_command(&cli),
//!     vec![ConfigurationError::InvalidFlag("quiet".to_string())]
//! );
//! ```

use std::collections::HashSet;

use crate::builder::CommandBuilder;
use crate::error::ConfigurationError;
use crate::types::{HELP_FLAG, OPTION_PREFIX, OptionDef, OptionKind, OptionValue, ValueType};

/// Validates a command and everything below it.
pub fn validate_command(command: &CommandBuilder) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();

    if command.name().trim().is_empty() {
        errors.push(ConfigurationError::EmptyCommandName);
        return errors;
    }

    let display_path = command.path().join(" ");

    if command
        .positionals()
        .iter()
        .any(|positional| positional.name.trim().is_empty())
    {
        errors.push(ConfigurationError::EmptyPositionalName(display_path));
        return errors;
    }

    errors.extend(validate_options(command.options(), &display_path));
    if !errors.is_empty() {
        return errors;
    }

    for sub in command.subcommands() {
        errors.extend(validate_command(sub));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn validate_options(options: &[OptionDef], command: &str) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for option in options {
        let flag = option.flag.as_str();
        if !flag.starts_with(OPTION_PREFIX) || flag.len() <= OPTION_PREFIX.len() {
            errors.push(ConfigurationError::InvalidFlag(flag.to_string()));
            return errors;
        }

        if flag == HELP_FLAG {
            errors.push(ConfigurationError::ReservedFlag(flag.to_string()));
            return errors;
        }

        if !seen.insert(flag) {
            errors.push(ConfigurationError::DuplicateFlag {
                flag: flag.to_string(),
                command: command.to_string(),
            });
            return errors;
        }

        if let OptionKind::Value {
            value_type,
            default: Some(default),
            ..
        } = &option.kind
        {
            let matches_type = matches!(
                (value_type, default),
                (ValueType::String, OptionValue::String(_))
                    | (ValueType::Number, OptionValue::Number(_))
            );
            if !matches_type {
                errors.push(ConfigurationError::InvalidDefault {
                    flag: flag.to_string(),
                    expected: value_type.to_string(),
                });
                return errors;
            }
        }
    }

    errors
}
