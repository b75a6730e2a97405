//! Output capture for tests.
//!
//! ```
//! use argus_core::{CliConfig, CommandBuilder};
//! use argus_core::testing::TestHarness;
//!
//! let mut cli = CommandBuilder::new(CliConfig::new("app"));
//! cli.positional("name", "").action(|ctx| {
//!     Box::pin(async move {
//!         ctx.console().out(&format!("hello {}", ctx.arg("name").unwrap_or_default()));
//!         Ok(())
//!     })
//! });
//! let harness = TestHarness::new(&cli.compile().unwrap());
//! let output = futures::executor::block_on(harness.execute(["world"]));
//! assert_eq!(output.stdout, "hello world\n");
//! assert_eq!(output.exit_code, 0);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use crate::program::Program;
use crate::ui::{Colorizer, Console, Ui};

/// Console that records everything written to it.
#[derive(Debug, Default)]
pub struct CapturedConsole {
    stdout: Mutex<String>,
    stderr: Mutex<String>,
}

impl CapturedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(&self) -> String {
        read(&self.stdout)
    }

    pub fn stderr(&self) -> String {
        read(&self.stderr)
    }
}

impl Console for CapturedConsole {
    fn out(&self, text: &str) {
        append(&self.stdout, text);
    }

    fn err(&self, text: &str) {
        append(&self.stderr, text);
    }
}

fn append(buffer: &Mutex<String>, text: &str) {
    let mut buffer = buffer.lock().unwrap_or_else(PoisonError::into_inner);
    buffer.push_str(text);
    buffer.push('\n');
}

fn read(buffer: &Mutex<String>) -> String {
    buffer.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// UI stand-in that keeps the program UI's colors but writes into a
/// [`CapturedConsole`].
///
/// Panels land on stdout, preceded by their title line. Errors land on
/// stderr in the same `Error:` layout used without a UI.
pub struct CapturedUi {
    inner: Arc<dyn Ui>,
    console: Arc<CapturedConsole>,
}

impl CapturedUi {
    pub fn new(inner: Arc<dyn Ui>, console: Arc<CapturedConsole>) -> Self {
        Self { inner, console }
    }
}

impl Ui for CapturedUi {
    fn panel(&self, text: &str, title: Option<&str>) {
        match title {
            Some(title) => self.console.out(&format!("{title}\n{text}")),
            None => self.console.out(text),
        }
    }

    fn error(&self, text: &str, title: &str) {
        self.console.err(&format!("{title}:\n{text}"));
    }

    fn colors(&self) -> Option<&dyn Colorizer> {
        self.inner.colors()
    }
}

/// Captured streams and exit code of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Runs a program with a fresh captured console per invocation.
///
/// An installed UI is swapped for a [`CapturedUi`], so panels and rendered
/// errors are captured too.
#[derive(Debug, Clone)]
pub struct TestHarness {
    program: Program,
}

impl TestHarness {
    pub fn new(program: &Program) -> Self {
        Self {
            program: program.clone(),
        }
    }

    /// Runs `tokens` from the root. Fatal errors are written to stderr and
    /// reported with exit code 1.
    pub async fn execute<I, S>(&self, tokens: I) -> ExecutionOutput
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let console = Arc::new(CapturedConsole::new());
        let mut program = self.program.clone().with_console(console.clone());
        if let Some(ui) = self.program.ui() {
            let captured = CapturedUi::new(Arc::clone(ui), console.clone());
            program = program.with_ui(Arc::new(captured));
        }
        let exit_code = match program.run(tokens).await {
            Ok(outcome) => outcome.exit_code(),
            Err(err) => {
                console.err(&err.to_string());
                1
            }
        };
        ExecutionOutput {
            stdout: console.stdout(),
            stderr: console.stderr(),
            exit_code,
        }
    }
}
