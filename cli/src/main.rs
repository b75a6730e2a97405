use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use argus_core::{CliConfig, ShapeFormat, format_shape};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod terminal;

use terminal::TerminalUi;

/// CLI-specific shape format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliShapeFormat {
    Json,
    Yaml,
}

impl From<CliShapeFormat> for ShapeFormat {
    fn from(fmt: CliShapeFormat) -> Self {
        match fmt {
            CliShapeFormat::Json => Self::Json,
            CliShapeFormat::Yaml => Self::Yaml,
        }
    }
}

/// Host options are read before the command tree sees anything; every
/// token from the first unrecognized one onwards is passed through.
#[derive(Debug, Parser)]
#[command(name = "argus-demo")]
#[command(about = "Package manager demo for the argus command engine")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// YAML file with the program name, description and help layout.
    #[arg(long, value_name = "FILE")]
    program_config: Option<PathBuf>,
    /// Print the command tree in the given format and exit.
    #[arg(long, value_name = "FORMAT")]
    print_shape: Option<CliShapeFormat>,
    /// Disable panels and colors; errors go to stderr as plain text.
    #[arg(long)]
    plain: bool,
    /// Tokens for the command tree.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_env("ARGUS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = match &cli.program_config {
        Some(path) => CliConfig::load(path)?,
        None => app::default_config(),
    };
    let mut program = app::build_program(config)?;

    if let Some(format) = cli.print_shape {
        println!("{}", format_shape(&program.shape(), format.into())?);
        return Ok(0);
    }

    if !cli.plain {
        let colored = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        program = program.with_ui(Arc::new(TerminalUi::new(colored)));
    }

    let outcome = program.run(cli.tokens).await?;
    Ok(outcome.exit_code())
}
