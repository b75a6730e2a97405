//! Declarative command trees with token resolution, parsing, help and
//! middleware dispatch.
//!
//! This crate turns a declared tree of commands into a runnable program:
//!
//! - [`CommandBuilder`]: fluent declaration of commands, aliases,
//!   positionals, options, middleware and actions.
//! - [`Program`]: the validated, frozen tree. [`Program::run`] resolves
//!   tokens to a command, parses them, and runs the root-to-leaf middleware
//!   chain around the command's action.
//! - [`CliError`]: the user-facing error taxonomy with stable codes,
//!   details and hints. Errors are rendered, not returned.
//! - [`Ui`] and [`Console`]: injected output capabilities; [`testing`]
//!   captures them.
//!
//! Validation ([`validate_command`]) catches structural mistakes such as
//! malformed or duplicate flags and mistyped defaults before anything runs.
//!
//! # Example
//!
//! ```
//! use argus_core::*;
//!
//! let mut cli = CommandBuilder::new(CliConfig::new("greet"));
//! cli.positional("name", "Who to greet")
//!     .option("--shout", "Use capitals", OptionConfig::new())
//!     .action(|ctx| {
//!         Box::pin(async move {
//!             let name = ctx.arg("name").unwrap_or_default();
//!             let text = if ctx.flag("shout") { name.to_uppercase() } else { name.to_string() };
//!             ctx.console().out(&format!("hello {text}"));
//!             Ok(())
//!         })
//!     });
//!
//! let program = cli.compile().unwrap();
//! let outcome = futures::executor::block_on(program.run(["world", "--shout"])).unwrap();
//! assert_eq!(outcome, Outcome::Completed);
//! ```

mod builder;
mod config;
mod context;
mod dispatch;
mod error;
mod help;
mod middleware;
mod parser;
mod program;
pub mod testing;
mod types;
mod ui;
mod validate;

pub use builder::CommandBuilder;
pub use config::{CliConfig, HelpConfig};
pub use context::{FromOptionValue, InvocationContext};
pub use dispatch::{HelpReason, Outcome};
pub use error::{CliError, ConfigurationError, ContinuationReused, Error, Result};
pub use help::{strip_styles, visible_width};
pub use middleware::{Handler, Middleware, Next};
pub use parser::{ParseFailure, ParsedArgs, parse_tokens};
pub use program::{Program, ShapeFormat, format_shape};
pub use types::*;
pub use ui::{Colorizer, Console, StdConsole, Ui};
pub use validate::validate_command;
