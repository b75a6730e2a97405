//! Fluent declaration of a command tree.
//!
//! ```
//! use argus_core::{CliConfig, CommandBuilder, OptionConfig};
//!
//! let mut app = CommandBuilder::new(CliConfig::new("pm").with_description("Package manager"));
//! app.subcommand("install", "Install a package", &["i", "add"])
//!     .unwrap()
//!     .positional("package", "Package to install")
//!     .option("--dev", "Save as a development dependency", OptionConfig::new())
//!     .action(|ctx| {
//!         Box::pin(async move {
//!             ctx.console().out(&format!("installing {}", ctx.arg("package").unwrap_or_default()));
//!             Ok(())
//!         })
//!     });
//!
//! let program = app.compile().unwrap();
//! assert!(program.shape().find_subcommand("add").is_some());
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::config::{CliConfig, HelpConfig};
use crate::context::InvocationContext;
use crate::error::ConfigurationError;
use crate::middleware::{Handler, Middleware, Next};
use crate::program::Program;
use crate::types::{OptionConfig, OptionDef, PositionalDef};
use crate::validate::validate_command;

/// A node of the command tree under construction.
///
/// The root is created from a [`CliConfig`]; every other node is created
/// through [`subcommand`](Self::subcommand).
pub struct CommandBuilder {
    pub(crate) path: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) aliases: Vec<String>,
    pub(crate) positionals: Vec<PositionalDef>,
    pub(crate) options: Vec<OptionDef>,
    pub(crate) subcommands: Vec<CommandBuilder>,
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) handler: Option<Arc<dyn Handler>>,
    pub(crate) help: HelpConfig,
}

impl CommandBuilder {
    /// Creates the root command.
    pub fn new(config: CliConfig) -> Self {
        Self {
            path: vec![config.name],
            description: config.description,
            aliases: Vec::new(),
            positionals: Vec::new(),
            options: Vec::new(),
            subcommands: Vec::new(),
            middleware: Vec::new(),
            handler: None,
            help: config.help,
        }
    }

    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Names from the root to this command.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn positionals(&self) -> &[PositionalDef] {
        &self.positionals
    }

    pub fn options(&self) -> &[OptionDef] {
        &self.options
    }

    pub fn subcommands(&self) -> &[CommandBuilder] {
        &self.subcommands
    }

    /// Finds a direct sub-command by name or alias.
    pub fn find_subcommand(&self, name: &str) -> Option<&CommandBuilder> {
        self.subcommands.iter().find(|sub| sub.answers_to(name))
    }

    /// Mutable variant of [`find_subcommand`](Self::find_subcommand), for
    /// revisiting a node after the chain that created it has ended.
    pub fn find_subcommand_mut(&mut self, name: &str) -> Option<&mut CommandBuilder> {
        self.subcommands.iter_mut().find(|sub| sub.answers_to(name))
    }

    fn answers_to(&self, token: &str) -> bool {
        self.name() == token || self.aliases.iter().any(|alias| alias == token)
    }

    /// Declares the next positional argument. An empty description is
    /// treated as none.
    pub fn positional(&mut self, name: &str, description: &str) -> &mut Self {
        let mut positional = PositionalDef::new(name);
        if !description.is_empty() {
            positional = positional.with_description(description);
        }
        self.positionals.push(positional);
        self
    }

    /// Declares an option. `flag` may be composite, e.g. `--config <file>`.
    pub fn option(&mut self, flag: &str, description: &str, config: OptionConfig) -> &mut Self {
        self.options
            .push(OptionDef::from_declaration(flag, description, config));
        self
    }

    /// Adds a child command and returns it for further declaration.
    ///
    /// Fails if the name is empty, if it is already a sibling's name or
    /// alias, or if any alias repeats, equals the name, or collides with a
    /// sibling's name or alias.
    pub fn subcommand(
        &mut self,
        name: &str,
        description: &str,
        aliases: &[&str],
    ) -> Result<&mut CommandBuilder, ConfigurationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyCommandName);
        }

        if let Some(existing) = self.find_subcommand(name) {
            return Err(ConfigurationError::DuplicateCommand {
                name: name.to_string(),
                command: existing.name().to_string(),
            });
        }

        for (i, alias) in aliases.iter().enumerate() {
            if *alias == name {
                return Err(ConfigurationError::AliasConflictsWithCommand {
                    alias: alias.to_string(),
                    command: name.to_string(),
                });
            }
            if aliases[..i].contains(alias) {
                return Err(ConfigurationError::DuplicateAlias {
                    alias: alias.to_string(),
                    command: name.to_string(),
                });
            }
            for sibling in &self.subcommands {
                if sibling.name() == *alias {
                    return Err(ConfigurationError::AliasConflictsWithCommand {
                        alias: alias.to_string(),
                        command: sibling.name().to_string(),
                    });
                }
                if sibling.aliases.iter().any(|existing| existing == alias) {
                    return Err(ConfigurationError::AliasConflictsWithAlias {
                        alias: alias.to_string(),
                        command: sibling.name().to_string(),
                    });
                }
            }
        }

        let mut path = self.path.clone();
        path.push(name.to_string());
        debug!(command = ?path, aliases = ?aliases, "Registering sub-command");

        self.subcommands.push(CommandBuilder {
            path,
            description: (!description.is_empty()).then(|| description.to_string()),
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
            positionals: Vec::new(),
            options: Vec::new(),
            subcommands: Vec::new(),
            middleware: Vec::new(),
            handler: None,
            help: self.help.clone(),
        });
        let index = self.subcommands.len() - 1;
        Ok(&mut self.subcommands[index])
    }

    /// Appends a middleware closure. It runs for this command and every
    /// command below it, after middleware registered on ancestors.
    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut InvocationContext, Next<'a>) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.wrap(middleware)
    }

    /// Appends a [`Middleware`] implementation.
    pub fn wrap(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Binds the action closure, replacing any previous one.
    pub fn action<F>(&mut self, action: F) -> &mut Self
    where
        F: for<'a> Fn(&'a InvocationContext) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.handler(action)
    }

    /// Binds a [`Handler`] implementation, replacing any previous one.
    pub fn handler(&mut self, handler: impl Handler + 'static) -> &mut Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Validates the whole tree and freezes it into a [`Program`].
    ///
    /// Returns the first error found; use
    /// [`validate_command`](crate::validate_command) to see all of them.
    pub fn compile(self) -> Result<Program, ConfigurationError> {
        if let Some(err) = validate_command(&self).into_iter().next() {
            return Err(err);
        }
        Ok(Program::from_builder(self))
    }
}

impl fmt::Debug for CommandBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("path", &self.path)
            .field("description", &self.description)
            .field("aliases", &self.aliases)
            .field("positionals", &self.positionals)
            .field("options", &self.options)
            .field("subcommands", &self.subcommands)
            .field("middleware", &self.middleware.len())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}
