//! Token resolution and dispatch.
//!
//! Starting from a node, the dispatcher applies these rules to the remaining
//! tokens, first match wins:
//!
//! 1. `--help` among tokens that are all flags shows help for the current
//!    node if it was reached through a sub-command token, otherwise for the
//!    root.
//! 2. A leading non-flag token on a node with children must name one of
//!    them; dispatch continues in that child with the rest of the tokens.
//! 3. `--help` anywhere in what remains shows the current node's help.
//! 4. A node with children and no handler, given nothing to do, shows its
//!    help.
//! 5. Otherwise the tokens are parsed and the root-to-leaf middleware chain
//!    runs around the node's handler.
//!
//! Structured [`CliError`]s are rendered here and never escape.

use std::sync::Arc;

use tracing::debug;

use crate::context::InvocationContext;
use crate::error::{CliError, ContinuationReused, Error, Result};
use crate::help::render_help;
use crate::middleware::Chain;
use crate::parser::{ParseFailure, parse_tokens};
use crate::program::{CommandTree, NodeId};
use crate::types::{HELP_FLAG, is_flag};
use crate::ui::{Console, Ui};

/// Why help was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpReason {
    /// `--help` was passed.
    Requested,
    /// A command with sub-commands and no action got nothing to run.
    NoCommandSelected,
    /// More positional tokens than the command declares.
    TooManyArguments { expected: usize, actual: usize },
}

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The handler ran, or middleware short-circuited it, without error.
    Completed,
    /// Tokens parsed but the command has no action bound.
    NoHandler,
    /// Help was printed for the command at `command`.
    Help {
        command: Vec<String>,
        reason: HelpReason,
    },
    /// A structured error was rendered.
    Failed(CliError),
}

impl Outcome {
    /// Process exit code: 1 for a rendered error, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Failed(_) => 1,
            _ => 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }
}

pub(crate) struct Dispatcher<'a> {
    tree: &'a CommandTree,
    ui: Option<&'a Arc<dyn Ui>>,
    console: &'a Arc<dyn Console>,
}

impl<'a> Dispatcher<'a> {
    pub(crate) fn new(
        tree: &'a CommandTree,
        ui: Option<&'a Arc<dyn Ui>>,
        console: &'a Arc<dyn Console>,
    ) -> Self {
        Self { tree, ui, console }
    }

    pub(crate) async fn dispatch(&self, start: NodeId, tokens: Vec<String>) -> Result<Outcome> {
        let mut current = start;
        let mut consumed = 0;
        let mut delegated = false;

        loop {
            let remaining = &tokens[consumed..];

            if remaining.iter().any(|token| token == HELP_FLAG)
                && remaining.iter().all(|token| is_flag(token))
            {
                let target = if delegated { current } else { self.tree.root() };
                return Ok(self.show_help(target, HelpReason::Requested));
            }

            let node = self.tree.node(current);
            match remaining.first() {
                Some(first) if !is_flag(first) && !node.children.is_empty() => {
                    let Some(child) = self.tree.find_child(current, first) else {
                        let available = node
                            .children
                            .iter()
                            .map(|&child| self.tree.node(child).name().to_string())
                            .collect();
                        return Ok(self.fail(CliError::InvalidSubcommand {
                            input: first.clone(),
                            available,
                        }));
                    };
                    debug!(
                        token = %first,
                        command = ?self.tree.node(child).path,
                        "Delegating to sub-command"
                    );
                    current = child;
                    consumed += 1;
                    delegated = true;
                }
                _ => break,
            }
        }

        let node = self.tree.node(current);
        let remaining = &tokens[consumed..];

        if remaining.iter().any(|token| token == HELP_FLAG) {
            return Ok(self.show_help(current, HelpReason::Requested));
        }

        if !node.children.is_empty()
            && node.handler.is_none()
            && remaining.first().is_none_or(|token| is_flag(token))
        {
            return Ok(self.show_help(current, HelpReason::NoCommandSelected));
        }

        let parsed = match parse_tokens(&node.positionals, &node.options, remaining) {
            Ok(parsed) => parsed,
            Err(ParseFailure::Invalid(err)) => return Ok(self.fail(err)),
            Err(ParseFailure::TooManyArguments { expected, actual }) => {
                debug!(expected, actual, command = ?node.path, "Too many arguments");
                return Ok(self.show_help(
                    current,
                    HelpReason::TooManyArguments { expected, actual },
                ));
            }
        };

        let Some(handler) = node.handler.clone() else {
            debug!(command = ?node.path, "No action bound; discarding parsed input");
            return Ok(Outcome::NoHandler);
        };

        let stages = self
            .tree
            .lineage(current)
            .into_iter()
            .flat_map(|id| self.tree.node(id).middleware.iter().cloned())
            .collect();
        let chain = Chain::new(stages, handler);
        let mut ctx = InvocationContext::new(
            parsed,
            node.path.clone(),
            self.ui.cloned(),
            Arc::clone(self.console),
        );

        debug!(command = ?node.path, "Running command");
        match chain.run(&mut ctx).await {
            Ok(()) => Ok(Outcome::Completed),
            Err(err) => self.recover(err),
        }
    }

    /// Renders taxonomy errors; everything else propagates.
    fn recover(&self, err: anyhow::Error) -> Result<Outcome> {
        let err = match err.downcast::<CliError>() {
            Ok(cli_error) => return Ok(self.fail(cli_error)),
            Err(err) => err,
        };
        match err.downcast::<ContinuationReused>() {
            Ok(reused) => Err(Error::ContinuationReused(reused)),
            Err(err) => Err(Error::Handler(err)),
        }
    }

    fn fail(&self, err: CliError) -> Outcome {
        debug!(code = err.code(), "Rendering error");
        err.print(self.ui.map(|ui| ui.as_ref()), self.console.as_ref());
        Outcome::Failed(err)
    }

    fn show_help(&self, id: NodeId, reason: HelpReason) -> Outcome {
        let colors = self.ui.and_then(|ui| ui.colors());
        self.console.out(&render_help(self.tree, id, colors));
        Outcome::Help {
            command: self.tree.node(id).path.clone(),
            reason,
        }
    }
}
