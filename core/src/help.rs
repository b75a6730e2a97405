//! Help rendering.
//!
//! Layout, top to bottom: the command path as title, the description, a
//! usage line, then `Commands`, `Arguments` and `Options` sections. Empty
//! sections are omitted, except `Options`, which always lists `--help`.
//! Columns are aligned on visible width so colored labels line up.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::HelpConfig;
use crate::program::{CommandTree, NodeId};
use crate::types::{HELP_FLAG, OptionDef};
use crate::ui::Colorizer;

static STYLE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("static regex must compile")
});

/// Removes ANSI escape sequences.
pub fn strip_styles(text: &str) -> String {
    STYLE_SEQUENCE.replace_all(text, "").into_owned()
}

/// Number of characters a terminal will display for `text`.
pub fn visible_width(text: &str) -> usize {
    strip_styles(text).chars().count()
}

struct Painter<'a> {
    colors: Option<&'a dyn Colorizer>,
}

impl Painter<'_> {
    fn paint(&self, text: &str, style: fn(&dyn Colorizer, &str) -> String) -> String {
        match self.colors {
            Some(colors) => style(colors, text),
            None => text.to_string(),
        }
    }
}

pub(crate) fn render_help(tree: &CommandTree, id: NodeId, colors: Option<&dyn Colorizer>) -> String {
    let node = tree.node(id);
    let layout = &tree.config().help;
    let painter = Painter { colors };
    let mut lines = Vec::new();

    lines.push(painter.paint(&node.path.join(" "), |c, t| c.bold(t)));
    if let Some(description) = &node.description {
        lines.push(description.clone());
    }

    let mut usage = node.path.clone();
    usage.extend(node.positionals.iter().map(|p| p.placeholder()));
    if !node.children.is_empty() {
        usage.push("<command>".to_string());
    }
    usage.extend(node.options.iter().map(|o| format!("[{}]", o.label())));
    lines.push(String::new());
    lines.push(format!(
        "{} {}",
        painter.paint("Usage:", |c, t| c.bold(t)),
        usage.join(" ")
    ));

    let commands: Vec<(String, String)> = node
        .children
        .iter()
        .map(|&child| {
            let child = tree.node(child);
            let label = std::iter::once(child.name())
                .chain(child.aliases.iter().map(String::as_str))
                .map(|name| painter.paint(name, |c, t| c.cyan(t)))
                .collect::<Vec<_>>()
                .join(", ");
            (label, child.description.clone().unwrap_or_default())
        })
        .collect();
    push_section(&mut lines, "Commands", &commands, layout, &painter);

    let arguments: Vec<(String, String)> = node
        .positionals
        .iter()
        .map(|p| {
            (
                painter.paint(&p.placeholder(), |c, t| c.green(t)),
                p.description.clone().unwrap_or_default(),
            )
        })
        .collect();
    push_section(&mut lines, "Arguments", &arguments, layout, &painter);

    let mut options: Vec<(String, String)> = node
        .options
        .iter()
        .map(|o| {
            (
                painter.paint(&o.label(), |c, t| c.yellow(t)),
                option_description(o),
            )
        })
        .collect();
    options.push((
        painter.paint(HELP_FLAG, |c, t| c.yellow(t)),
        layout.help_description.clone(),
    ));
    push_section(&mut lines, "Options", &options, layout, &painter);

    lines.join("\n")
}

fn option_description(option: &OptionDef) -> String {
    let description = option.description.clone().unwrap_or_default();
    match option.declared_default() {
        Some(default) if description.is_empty() => format!("(default: {default})"),
        Some(default) => format!("{description} (default: {default})"),
        None => description,
    }
}

fn push_section(
    lines: &mut Vec<String>,
    title: &str,
    rows: &[(String, String)],
    layout: &HelpConfig,
    painter: &Painter<'_>,
) {
    if rows.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(painter.paint(&format!("{title}:"), |c, t| c.bold(t)));

    let width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or(0);
    for (label, description) in rows {
        let padding = width - visible_width(label) + layout.column_gap;
        let line = format!(
            "{:indent$}{label}{:padding$}{description}",
            "",
            "",
            indent = layout.indent,
        );
        lines.push(line.trim_end().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_styles() {
        assert_eq!(strip_styles("\x1b[1mbold\x1b[22m"), "bold");
        assert_eq!(visible_width("\x1b[36minstall\x1b[39m, i"), 10);
        assert_eq!(visible_width("plain"), 5);
    }

    #[test]
    fn test_option_description_with_default() {
        use crate::types::{OptionConfig, OptionDef};

        let port = OptionDef::from_declaration(
            "--port",
            "Port to listen on",
            OptionConfig::new().default_value(3000),
        );
        assert_eq!(option_description(&port), "Port to listen on (default: 3000)");

        let bare = OptionDef::from_declaration("--color", "", OptionConfig::new().default_value(true));
        assert_eq!(option_description(&bare), "(default: true)");
    }
}
