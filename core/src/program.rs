//! Compiled command tree and the entry points that run it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::builder::CommandBuilder;
use crate::config::CliConfig;
use crate::dispatch::{Dispatcher, Outcome};
use crate::error::{Error, Result};
use crate::help::render_help;
use crate::middleware::{Handler, Middleware};
use crate::types::{CommandShape, OptionDef, PositionalDef};
use crate::ui::{Console, StdConsole, Ui};

pub(crate) type NodeId = usize;

/// A frozen command in the arena.
pub(crate) struct CommandNode {
    pub(crate) path: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) aliases: Vec<String>,
    pub(crate) positionals: Vec<PositionalDef>,
    pub(crate) options: Vec<OptionDef>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) handler: Option<Arc<dyn Handler>>,
}

impl CommandNode {
    pub(crate) fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    fn answers_to(&self, token: &str) -> bool {
        self.name() == token || self.aliases.iter().any(|alias| alias == token)
    }
}

/// Arena of command nodes; the root is always node 0.
pub(crate) struct CommandTree {
    nodes: Vec<CommandNode>,
    config: CliConfig,
}

impl CommandTree {
    fn from_builder(builder: CommandBuilder) -> Self {
        let config = CliConfig {
            name: builder.name().to_string(),
            description: builder.description.clone(),
            help: builder.help.clone(),
        };
        let mut nodes = Vec::new();
        insert_node(&mut nodes, builder, None);
        Self { nodes, config }
    }

    pub(crate) const fn root(&self) -> NodeId {
        0
    }

    pub(crate) fn config(&self) -> &CliConfig {
        &self.config
    }

    pub(crate) fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id]
    }

    /// Finds a direct child of `id` by name or alias.
    pub(crate) fn find_child(&self, id: NodeId, token: &str) -> Option<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].answers_to(token))
    }

    /// Node ids from the root down to `id`, inclusive.
    pub(crate) fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = vec![id];
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            ids.push(parent);
            current = parent;
        }
        ids.reverse();
        ids
    }

    /// Resolves canonical names or aliases below the root.
    pub(crate) fn resolve_path(&self, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(self.root(), |id, segment| self.find_child(id, segment))
    }

    fn shape(&self, id: NodeId) -> CommandShape {
        let node = &self.nodes[id];
        CommandShape {
            name: node.name().to_string(),
            path: node.path.clone(),
            description: node.description.clone(),
            aliases: node.aliases.clone(),
            positionals: node.positionals.clone(),
            options: node.options.clone(),
            subcommands: node.children.iter().map(|&child| self.shape(child)).collect(),
            has_handler: node.handler.is_some(),
            middleware: node.middleware.len(),
        }
    }
}

fn insert_node(nodes: &mut Vec<CommandNode>, builder: CommandBuilder, parent: Option<NodeId>) -> NodeId {
    let id = nodes.len();
    let CommandBuilder {
        path,
        description,
        aliases,
        positionals,
        options,
        subcommands,
        middleware,
        handler,
        help: _,
    } = builder;

    nodes.push(CommandNode {
        path,
        description,
        aliases,
        positionals,
        options,
        children: Vec::with_capacity(subcommands.len()),
        parent,
        middleware,
        handler,
    });

    for sub in subcommands {
        let child = insert_node(nodes, sub, Some(id));
        nodes[id].children.push(child);
    }
    id
}

/// A validated, immutable command tree ready to run.
///
/// Cloning is cheap; clones share the tree. The UI and console are
/// per-clone, which is how tests capture output.
#[derive(Clone)]
pub struct Program {
    tree: Arc<CommandTree>,
    ui: Option<Arc<dyn Ui>>,
    console: Arc<dyn Console>,
}

impl Program {
    pub(crate) fn from_builder(builder: CommandBuilder) -> Self {
        Self {
            tree: Arc::new(CommandTree::from_builder(builder)),
            ui: None,
            console: Arc::new(StdConsole),
        }
    }

    /// Injects a UI capability into every invocation.
    pub fn with_ui(mut self, ui: Arc<dyn Ui>) -> Self {
        self.ui = Some(ui);
        self
    }

    /// The injected UI capability, if any.
    pub fn ui(&self) -> Option<&Arc<dyn Ui>> {
        self.ui.as_ref()
    }

    pub fn without_ui(mut self) -> Self {
        self.ui = None;
        self
    }

    /// Replaces the output sink, standard streams by default.
    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = console;
        self
    }

    pub fn config(&self) -> &CliConfig {
        self.tree.config()
    }

    /// Resolves and runs `tokens` from the root command.
    ///
    /// Structured errors are rendered and reported as
    /// [`Outcome::Failed`]; only fatal problems come back as `Err`.
    pub async fn run<I, S>(&self, tokens: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        self.dispatcher().dispatch(self.tree.root(), tokens).await
    }

    /// Runs `tokens` against the command at `path` below the root.
    ///
    /// The start node is not considered delegated into, so `--help` alone
    /// shows the root's help, as it would at the top level.
    pub async fn run_from<I, S>(&self, path: &[&str], tokens: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let start = self
            .tree
            .resolve_path(path)
            .ok_or_else(|| Error::UnknownCommandPath(path.join(" ")))?;
        self.dispatcher().dispatch(start, tokens).await
    }

    /// Help text for the command at `path` below the root, without colors.
    pub fn help(&self, path: &[&str]) -> Result<String> {
        let id = self
            .tree
            .resolve_path(path)
            .ok_or_else(|| Error::UnknownCommandPath(path.join(" ")))?;
        Ok(render_help(&self.tree, id, None))
    }

    /// Serializable description of the whole tree.
    pub fn shape(&self) -> CommandShape {
        self.tree.shape(self.tree.root())
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.tree, self.ui.as_ref(), &self.console)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("config", self.tree.config())
            .field("commands", &self.tree.nodes.len())
            .field("has_ui", &self.ui.is_some())
            .finish_non_exhaustive()
    }
}

/// Output format for [`format_shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeFormat {
    #[default]
    Json,
    Yaml,
}

/// Serializes a command shape as pretty JSON or YAML.
pub fn format_shape(shape: &CommandShape, format: ShapeFormat) -> Result<String> {
    match format {
        ShapeFormat::Json => Ok(serde_json::to_string_pretty(shape)?),
        ShapeFormat::Yaml => Ok(serde_yaml::to_string(shape)?),
    }
}
