//! Terminal implementation of the UI capability: ANSI colors, rounded panels
//! and ASCII tables.

use argus_core::{CliError, Colorizer, Ui, visible_width};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";

/// Colorizer emitting ANSI SGR sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiColors;

fn wrap(code: &str, text: &str) -> String {
    format!("{code}{text}{RESET}")
}

impl Colorizer for AnsiColors {
    fn bold(&self, text: &str) -> String {
        wrap(BOLD, text)
    }
    fn red(&self, text: &str) -> String {
        wrap(RED, text)
    }
    fn green(&self, text: &str) -> String {
        wrap(GREEN, text)
    }
    fn yellow(&self, text: &str) -> String {
        wrap(YELLOW, text)
    }
    fn blue(&self, text: &str) -> String {
        wrap(BLUE, text)
    }
    fn magenta(&self, text: &str) -> String {
        wrap(MAGENTA, text)
    }
    fn cyan(&self, text: &str) -> String {
        wrap(CYAN, text)
    }
}

/// UI that draws panels on stdout.
#[derive(Debug, Clone, Default)]
pub struct TerminalUi {
    colors: Option<AnsiColors>,
}

impl TerminalUi {
    pub fn new(colored: bool) -> Self {
        Self {
            colors: colored.then_some(AnsiColors),
        }
    }
}

impl Ui for TerminalUi {
    fn panel(&self, text: &str, title: Option<&str>) {
        println!("{}", draw_panel(text, title, 1));
    }

    fn colors(&self) -> Option<&dyn Colorizer> {
        self.colors.as_ref().map(|colors| colors as &dyn Colorizer)
    }
}

/// Draws `text` in a rounded box, centering `title` in the top border.
pub fn draw_panel(text: &str, title: Option<&str>, padding: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let max_len = lines.iter().map(|line| visible_width(line)).max().unwrap_or(0);
    let inner = max_len + padding * 2 + 2;

    let top = match title {
        Some(title) => {
            let title = format!(" {title} ");
            let title_width = visible_width(&title);
            let left = inner.saturating_sub(title_width) / 2;
            let right = inner.saturating_sub(title_width + left);
            format!("╭{}{title}{}╮", "─".repeat(left), "─".repeat(right))
        }
        None => format!("╭{}╮", "─".repeat(inner)),
    };

    let mut out = vec![top];
    for line in lines {
        let fill = max_len - visible_width(line);
        out.push(format!(
            "│ {pad}{line}{fill}{pad} │",
            pad = " ".repeat(padding),
            fill = " ".repeat(fill),
        ));
    }
    out.push(format!("╰{}╯", "─".repeat(inner)));
    out.join("\n")
}

/// Renders rows under `head` as an ASCII table.
///
/// Fails with [`CliError::TableHeaderMismatch`] when a row's cell count
/// differs from the header count, or from the first row when there is no
/// header.
pub fn draw_table(head: &[&str], rows: &[Vec<String>]) -> Result<String, CliError> {
    let columns = if head.is_empty() {
        rows.first().map_or(0, Vec::len)
    } else {
        head.len()
    };
    if let Some(ragged) = rows.iter().find(|row| row.len() != columns) {
        return Err(CliError::TableHeaderMismatch {
            headers: columns,
            columns: ragged.len(),
        });
    }
    if head.is_empty() && rows.is_empty() {
        return Ok(String::new());
    }

    let mut widths: Vec<usize> = (0..columns)
        .map(|i| head.get(i).map_or(0, |h| visible_width(h)))
        .collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(visible_width(cell));
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let mut lines = vec![border.clone()];
    if !head.is_empty() {
        lines.push(table_row(head.iter().copied(), &widths));
        lines.push(border.clone());
    }
    for row in rows {
        lines.push(table_row(row.iter().map(String::as_str), &widths));
    }
    lines.push(border);
    Ok(lines.join("\n"))
}

fn table_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let cells: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!(" {cell}{} ", " ".repeat(width - visible_width(cell))))
        .collect();
    format!("|{}|", cells.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_with_title() {
        let panel = draw_panel("hello", Some("Error"), 1);
        assert_eq!(
            panel,
            "╭─ Error ─╮\n│  hello  │\n╰─────────╯"
        );
    }

    #[test]
    fn test_panel_aligns_colored_lines() {
        let colored = AnsiColors.red("ab");
        let panel = draw_panel(&format!("{colored}\nabcd"), None, 0);
        let lines: Vec<&str> = panel.lines().collect();
        assert_eq!(lines[0], "╭──────╮");
        assert_eq!(visible_width(lines[1]), visible_width(lines[2]));
        assert_eq!(lines[2], "│ abcd │");
    }

    #[test]
    fn test_table_layout() {
        let rows = vec![
            vec!["left-pad".to_string(), "1.3.0".to_string()],
            vec!["zod".to_string(), "3.22.4".to_string()],
        ];
        let table = draw_table(&["Package", "Version"], &rows).unwrap();
        assert_eq!(
            table,
            "+----------+---------+\n\
             | Package  | Version |\n\
             +----------+---------+\n\
             | left-pad | 1.3.0   |\n\
             | zod      | 3.22.4  |\n\
             +----------+---------+"
        );
    }

    #[test]
    fn test_table_header_mismatch() {
        let rows = vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]];
        let err = draw_table(&["One", "Two"], &rows).unwrap_err();
        assert_eq!(err.code(), "E_TABLE_HEADER_MISMATCH");
        assert_eq!(
            err.details().as_deref(),
            Some("Received 2 header title(s), but inferred 3 column(s) from data.")
        );
    }

    #[test]
    fn test_table_rejects_ragged_rows() {
        let rows = vec![
            vec!["left-pad".to_string(), "1.3.0".to_string()],
            vec!["zod".to_string(), "3.22.4".to_string(), "extra".to_string()],
        ];
        let err = draw_table(&["Package", "Version"], &rows).unwrap_err();
        assert_eq!(
            err,
            CliError::TableHeaderMismatch {
                headers: 2,
                columns: 3
            }
        );

        let rows = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ];
        let err = draw_table(&[], &rows).unwrap_err();
        assert_eq!(
            err,
            CliError::TableHeaderMismatch {
                headers: 2,
                columns: 1
            }
        );
    }

    #[test]
    fn test_colorizer_wraps_with_reset() {
        assert_eq!(AnsiColors.bold("x"), "\x1b[1mx\x1b[0m");
        assert!(TerminalUi::new(false).colors().is_none());
        assert!(TerminalUi::new(true).colors().is_some());
    }
}
