//! Token parsing against a command's declared positionals and options.
//!
//! Runs after sub-command resolution, on the tokens left for the matched
//! command. The rules:
//!
//! - every option is seeded first: booleans to their default or `false`,
//!   value options to their default when one is declared
//! - a `--` token must match a declared flag exactly
//! - a boolean flag is `true`, unless the next token is the literal `true`
//!   or `false`, which is consumed
//! - a value option consumes the next token unless it is absent or itself
//!   starts with `--`; number options must coerce to a finite or infinite
//!   number, never NaN
//! - other tokens fill positionals in declaration order; surplus tokens are
//!   reported as [`ParseFailure::TooManyArguments`]

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use crate::error::CliError;
use crate::types::{OptionDef, OptionKind, OptionValue, PositionalDef, ValueType, is_flag};

/// Result of a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArgs {
    pub positionals: BTreeMap<String, String>,
    /// Keyed by flag name without the `--` prefix.
    pub options: BTreeMap<String, OptionValue>,
}

/// Why parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// A structured error to render.
    Invalid(CliError),
    /// More positional tokens than declared positionals.
    TooManyArguments { expected: usize, actual: usize },
}

impl From<CliError> for ParseFailure {
    fn from(err: CliError) -> Self {
        ParseFailure::Invalid(err)
    }
}

/// Parses `tokens` for a command declaring `positionals` and `options`.
///
/// # Examples
///
/// ```
/// use argus_core::{OptionConfig, OptionDef, OptionValue, PositionalDef, parse_tokens};
///
/// let positionals = [PositionalDef::new("file")];
/// let options = [OptionDef::from_declaration("--strict", "", OptionConfig::new())];
/// let tokens = ["a.txt".to_string(), "--strict".to_string()];
///
/// let parsed = parse_tokens(&positionals, &options, &tokens).unwrap();
/// assert_eq!(parsed.positionals["file"], "a.txt");
/// assert_eq!(parsed.options["strict"], OptionValue::Bool(true));
/// ```
pub fn parse_tokens(
    positionals: &[PositionalDef],
    options: &[OptionDef],
    tokens: &[String],
) -> Result<ParsedArgs, ParseFailure> {
    let mut parsed = ParsedArgs::default();
    for option in options {
        if let Some(seed) = option.seed_value() {
            parsed.options.insert(option.key().to_string(), seed);
        }
    }

    let mut filled: Vec<&str> = Vec::with_capacity(positionals.len());
    let mut surplus = 0usize;
    let mut index = 0;

    while index < tokens.len() {
        let token = tokens[index].as_str();

        if !is_flag(token) {
            if filled.len() < positionals.len() {
                filled.push(token);
            } else {
                surplus += 1;
            }
            index += 1;
            continue;
        }

        let option = options
            .iter()
            .find(|option| option.matches(token))
            .ok_or_else(|| CliError::UnknownOption {
                flag: token.to_string(),
            })?;

        match &option.kind {
            OptionKind::Boolean { .. } => {
                let (value, consumed) = match tokens.get(index + 1).map(String::as_str) {
                    Some("true") => (true, 2),
                    Some("false") => (false, 2),
                    _ => (true, 1),
                };
                parsed
                    .options
                    .insert(option.key().to_string(), OptionValue::Bool(value));
                index += consumed;
            }
            OptionKind::Value {
                value_name,
                value_type,
                ..
            } => {
                let raw = tokens
                    .get(index + 1)
                    .filter(|next| !is_flag(next))
                    .ok_or_else(|| CliError::MissingOptionValue {
                        flag: option.flag.clone(),
                        value_name: value_name.clone(),
                        received: None,
                    })?;
                let value = coerce(option, value_name, *value_type, raw)?;
                parsed.options.insert(option.key().to_string(), value);
                index += 2;
            }
        }
    }

    if let Some(missing) = positionals.get(filled.len()) {
        return Err(CliError::MissingArgument {
            name: missing.name.clone(),
        }
        .into());
    }

    if surplus > 0 {
        return Err(ParseFailure::TooManyArguments {
            expected: positionals.len(),
            actual: positionals.len() + surplus,
        });
    }

    for (positional, value) in positionals.iter().zip(filled) {
        parsed
            .positionals
            .insert(positional.name.clone(), value.to_string());
    }

    trace!(
        positionals = parsed.positionals.len(),
        options = parsed.options.len(),
        "Parsed tokens"
    );
    Ok(parsed)
}

fn coerce(
    option: &OptionDef,
    value_name: &str,
    value_type: ValueType,
    raw: &str,
) -> Result<OptionValue, CliError> {
    match value_type {
        ValueType::String => Ok(OptionValue::String(raw.to_string())),
        ValueType::Number => Some(raw.trim())
            .filter(|token| is_decimal(token))
            .and_then(|token| token.parse::<f64>().ok())
            .map(OptionValue::Number)
            .ok_or_else(|| CliError::MissingOptionValue {
                flag: option.flag.clone(),
                value_name: value_name.to_string(),
                received: Some(raw.to_string()),
            }),
    }
}

/// Decimal numerals only; `inf`, `NaN` and friends are not numbers here.
fn is_decimal(token: &str) -> bool {
    token.bytes().any(|b| b.is_ascii_digit())
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionConfig;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn parse(
        positionals: &[PositionalDef],
        options: &[OptionDef],
        items: &[&str],
    ) -> Result<ParsedArgs, ParseFailure> {
        parse_tokens(positionals, options, &tokens(items))
    }

    fn flag(declaration: &str, config: OptionConfig) -> OptionDef {
        OptionDef::from_declaration(declaration, "", config)
    }

    #[test]
    fn test_positionals_and_boolean() {
        let positionals = [PositionalDef::new("file")];
        let options = [flag("--strict", OptionConfig::new())];

        let parsed = parse(&positionals, &options, &["file.txt", "--strict"]).unwrap();
        assert_eq!(parsed.positionals["file"], "file.txt");
        assert_eq!(parsed.options["strict"], OptionValue::Bool(true));

        let unset = parse(&positionals, &options, &["file.txt"]).unwrap();
        assert_eq!(unset.options["strict"], OptionValue::Bool(false));
    }

    #[test]
    fn test_boolean_consumes_literal() {
        let positionals = [PositionalDef::new("file")];
        let options = [flag("--strict", OptionConfig::new().default_value(true))];

        let parsed = parse(&positionals, &options, &["--strict", "false", "a"]).unwrap();
        assert_eq!(parsed.options["strict"], OptionValue::Bool(false));
        assert_eq!(parsed.positionals["file"], "a");

        let parsed = parse(&positionals, &options, &["--strict", "yes"]).unwrap();
        assert_eq!(parsed.options["strict"], OptionValue::Bool(true));
        assert_eq!(parsed.positionals["file"], "yes");
    }

    #[test]
    fn test_number_option() {
        let options = [flag("--count <n>", OptionConfig::new().number())];

        let parsed = parse(&[], &options, &["--count", "5"]).unwrap();
        assert_eq!(parsed.options["count"], OptionValue::Number(5.0));

        let parsed = parse(&[], &options, &["--count", " 2.5 "]).unwrap();
        assert_eq!(parsed.options["count"], OptionValue::Number(2.5));

        let err = parse(&[], &options, &["--count", "abc"]).unwrap_err();
        assert_eq!(
            err,
            ParseFailure::Invalid(CliError::MissingOptionValue {
                flag: "--count".into(),
                value_name: "n".into(),
                received: Some("abc".into()),
            })
        );

        let err = parse(&[], &options, &["--count", "NaN"]).unwrap_err();
        assert!(matches!(
            err,
            ParseFailure::Invalid(CliError::MissingOptionValue { received: Some(_), .. })
        ));
    }

    #[test]
    fn test_number_option_rejects_infinity_spellings() {
        let options = [flag("--count <n>", OptionConfig::new().number())];

        for token in ["inf", "infinity", "-Infinity", "+inf", "."] {
            let err = parse(&[], &options, &["--count", token]).unwrap_err();
            assert_eq!(
                err,
                ParseFailure::Invalid(CliError::MissingOptionValue {
                    flag: "--count".into(),
                    value_name: "n".into(),
                    received: Some(token.into()),
                })
            );
        }

        let parsed = parse(&[], &options, &["--count", "1e3"]).unwrap();
        assert_eq!(parsed.options["count"], OptionValue::Number(1000.0));
    }

    #[test]
    fn test_value_option_missing_value() {
        let options = [flag("--config <file>", OptionConfig::new())];

        for items in [&["--config"][..], &["--config", "--other"][..]] {
            let err = parse(&[], &options, items).unwrap_err();
            let ParseFailure::Invalid(err) = err else {
                panic!("expected a rendered error");
            };
            assert_eq!(err.code(), "E_MISSING_OPTION_VALUE");
            assert_eq!(err.to_string(), "Missing value for option --config.");
        }
    }

    #[test]
    fn test_empty_string_is_a_value() {
        let options = [flag("--name <name>", OptionConfig::new())];
        let parsed = parse(&[], &options, &["--name", ""]).unwrap();
        assert_eq!(parsed.options["name"], OptionValue::from(""));
    }

    #[test]
    fn test_value_default_seeded() {
        let options = [
            flag("--port", OptionConfig::new().default_value(3000)),
            flag("--host <host>", OptionConfig::new()),
        ];
        let parsed = parse(&[], &options, &[]).unwrap();
        assert_eq!(parsed.options["port"], OptionValue::Number(3000.0));
        assert!(!parsed.options.contains_key("host"));
    }

    #[test]
    fn test_unknown_option() {
        let err = parse(&[], &[], &["--nope"]).unwrap_err();
        assert_eq!(
            err,
            ParseFailure::Invalid(CliError::UnknownOption {
                flag: "--nope".into()
            })
        );
    }

    #[test]
    fn test_missing_positional() {
        let positionals = [PositionalDef::new("source"), PositionalDef::new("target")];
        let err = parse(&positionals, &[], &["a"]).unwrap_err();
        assert_eq!(
            err,
            ParseFailure::Invalid(CliError::MissingArgument {
                name: "target".into()
            })
        );
    }

    #[test]
    fn test_too_many_arguments() {
        let positionals = [PositionalDef::new("file")];
        let err = parse(&positionals, &[], &["a", "b", "c"]).unwrap_err();
        assert_eq!(
            err,
            ParseFailure::TooManyArguments {
                expected: 1,
                actual: 3
            }
        );
    }

    #[test]
    fn test_single_dash_is_positional() {
        let positionals = [PositionalDef::new("input")];
        let parsed = parse(&positionals, &[], &["-"]).unwrap();
        assert_eq!(parsed.positionals["input"], "-");
    }
}
