//! UI capability and output sink.
//!
//! The engine never draws widgets itself. Handlers, middleware and the error
//! renderer reach the terminal through a [`Ui`] (panels, optional colors) and
//! a [`Console`] (plain stdout/stderr text). Capture in tests is done by
//! substituting both, see [`testing`](crate::testing).

/// Text styling used by help and error rendering.
pub trait Colorizer: Send + Sync {
    fn bold(&self, text: &str) -> String;
    fn red(&self, text: &str) -> String;
    fn green(&self, text: &str) -> String;
    fn yellow(&self, text: &str) -> String;
    fn blue(&self, text: &str) -> String;
    fn magenta(&self, text: &str) -> String;
    fn cyan(&self, text: &str) -> String;
}

/// Human-facing rendering capability injected into handlers and middleware.
pub trait Ui: Send + Sync {
    /// Renders `text` inside a panel with an optional title.
    fn panel(&self, text: &str, title: Option<&str>);

    /// Renders a structured error. Draws a titled panel unless overridden.
    fn error(&self, text: &str, title: &str) {
        self.panel(text, Some(title));
    }

    /// Colorizer, if this UI supports styled output.
    fn colors(&self) -> Option<&dyn Colorizer> {
        None
    }
}

/// Plain-text output sink.
///
/// Each call writes one logical message followed by a line break.
pub trait Console: Send + Sync {
    fn out(&self, text: &str);
    fn err(&self, text: &str);
}

/// Console writing to the process's standard streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn out(&self, text: &str) {
        println!("{text}");
    }

    fn err(&self, text: &str) {
        eprintln!("{text}");
    }
}
