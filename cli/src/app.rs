//! The demo program: a small package manager front end.

use std::time::Instant;

use argus_core::{CliConfig, CliError, CommandBuilder, ConfigurationError, OptionConfig, Program};
use tracing::debug;

use crate::terminal::draw_table;

pub fn default_config() -> CliConfig {
    CliConfig::new("pm").with_description("A tiny package manager built on argus")
}

const INSTALLED: &[(&str, &str, &str)] = &[
    ("left-pad", "1.3.0", "1.3.0"),
    ("serde", "1.0.200", "1.0.210"),
    ("zod", "3.22.4", "3.23.8"),
];

pub fn build_program(config: CliConfig) -> Result<Program, ConfigurationError> {
    let mut app = CommandBuilder::new(config);

    app.use_middleware(|ctx, next| {
        Box::pin(async move {
            let started = Instant::now();
            let result = next.run(ctx).await;
            debug!(
                command = ?ctx.command_path(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Command finished"
            );
            result
        })
    });

    app.subcommand("install", "Install a package", &["i", "add"])?
        .positional("package", "Package to install")
        .option("--dev", "Save as a development dependency", OptionConfig::new())
        .option(
            "--registry <url>",
            "Registry to install from",
            OptionConfig::new().default_value("https://registry.example.com"),
        )
        .action(|ctx| {
            Box::pin(async move {
                let package = ctx.arg("package").unwrap_or_default();
                let registry = ctx.value::<String>("registry").unwrap_or_default();
                let scope = if ctx.flag("dev") { " (dev)" } else { "" };
                ctx.console()
                    .out(&format!("Installed {package}{scope} from {registry}"));
                Ok(())
            })
        });

    app.subcommand("remove", "Remove a package", &["rm", "uninstall"])?
        .positional("package", "Package to remove")
        .action(|ctx| {
            Box::pin(async move {
                let package = ctx.arg("package").unwrap_or_default();
                if !INSTALLED.iter().any(|(name, _, _)| *name == package) {
                    return Err(CliError::custom(
                        "E_NOT_INSTALLED",
                        format!("Package '{package}' is not installed."),
                        None,
                        Some("Run `pm list` to see installed packages."),
                    )
                    .into());
                }
                ctx.console().out(&format!("Removed {package}"));
                Ok(())
            })
        });

    app.subcommand("list", "List installed packages", &["ls"])?
        .option(
            "--depth <n>",
            "Dependency depth to show",
            OptionConfig::new().default_value(0),
        )
        .option("--outdated", "Only show outdated packages", OptionConfig::new())
        .action(|ctx| {
            Box::pin(async move {
                let outdated = ctx.flag("outdated");
                let depth = ctx.value::<f64>("depth").unwrap_or_default();
                let rows: Vec<Vec<String>> = INSTALLED
                    .iter()
                    .filter(|(_, current, latest)| !outdated || current != latest)
                    .map(|(name, current, latest)| {
                        vec![name.to_string(), current.to_string(), latest.to_string()]
                    })
                    .collect();
                ctx.console()
                    .out(&draw_table(&["Package", "Current", "Latest"], &rows)?);
                ctx.console().out(&format!("depth: {depth}"));
                Ok(())
            })
        });

    let build = app.subcommand("build", "Build a project", &["b", "compile"])?;
    build
        .positional("project", "Project directory")
        .option("--prod", "Optimize for production", OptionConfig::new())
        .option("--config <file>", "Build configuration file", OptionConfig::new())
        .use_middleware(|ctx, next| {
            Box::pin(async move {
                if ctx.flag("prod") {
                    ctx.set_option("optimize", true);
                }
                next.run(ctx).await
            })
        })
        .action(|ctx| {
            Box::pin(async move {
                let project = ctx.arg("project").unwrap_or_default();
                let mode = if ctx.flag("optimize") { "release" } else { "debug" };
                let mut message = format!("Building {project} in {mode} mode");
                if let Some(config) = ctx.value::<String>("config") {
                    message.push_str(&format!(" using {config}"));
                }
                ctx.console().out(&message);
                Ok(())
            })
        });

    app.subcommand("publish", "Publish the current package", &[])?
        .option("--dry-run", "Check without uploading", OptionConfig::new())
        .use_middleware(|ctx, next| {
            Box::pin(async move {
                if ctx.flag("dry-run") {
                    match ctx.ui() {
                        Some(ui) => ui.panel("Nothing was uploaded.", Some("Dry run")),
                        None => ctx.console().out("Dry run: nothing was uploaded."),
                    }
                    return Ok(());
                }
                next.run(ctx).await
            })
        })
        .action(|ctx| {
            Box::pin(async move {
                ctx.console().out("Published");
                Ok(())
            })
        });

    let cache = app.subcommand("cache", "Manage the download cache", &[])?;
    cache
        .subcommand("clean", "Delete cached downloads", &[])?
        .action(|ctx| {
            Box::pin(async move {
                ctx.console().out("Cache cleaned");
                Ok(())
            })
        });
    cache
        .subcommand("verify", "Check cached downloads", &["check"])?
        .action(|ctx| {
            Box::pin(async move {
                ctx.console().out("Cache verified");
                Ok(())
            })
        });

    app.compile()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use argus_core::testing::TestHarness;

    use super::*;
    use crate::terminal::TerminalUi;

    fn harness() -> TestHarness {
        TestHarness::new(&build_program(default_config()).unwrap())
    }

    #[tokio::test]
    async fn test_install_alias() {
        let output = harness().execute(["add", "zod", "--dev"]).await;
        assert_eq!(output.exit_code, 0);
        assert_eq!(
            output.stdout,
            "Installed zod (dev) from https://registry.example.com\n"
        );
    }

    #[tokio::test]
    async fn test_build_middleware_annotates_context() {
        let output = harness()
            .execute(["b", "app", "--prod", "--config", "build.yaml"])
            .await;
        assert_eq!(output.stdout, "Building app in release mode using build.yaml\n");
    }

    #[tokio::test]
    async fn test_remove_unknown_package_renders_custom_error() {
        let output = harness().execute(["rm", "nope"]).await;
        assert_eq!(output.exit_code, 1);
        assert!(output.stderr.starts_with("Error:\nE_NOT_INSTALLED Package 'nope' is not installed."));
        assert!(output.stderr.contains("Hint: Run `pm list` to see installed packages."));
    }

    #[tokio::test]
    async fn test_list_outdated_table() {
        let output = harness().execute(["ls", "--outdated", "--depth", "2"]).await;
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout.contains("| serde   | 1.0.200 | 1.0.210 |"));
        assert!(!output.stdout.contains("left-pad"));
        assert!(output.stdout.contains("depth: 2"));
    }

    #[tokio::test]
    async fn test_publish_dry_run_short_circuits() {
        let output = harness().execute(["publish", "--dry-run"]).await;
        assert_eq!(output.stdout, "Dry run: nothing was uploaded.\n");
    }

    #[tokio::test]
    async fn test_terminal_ui_output_is_captured() {
        let program = build_program(default_config())
            .unwrap()
            .with_ui(Arc::new(TerminalUi::new(false)));
        let harness = TestHarness::new(&program);

        let output = harness.execute(["publish", "--dry-run"]).await;
        assert_eq!(output.stdout, "Dry run\nNothing was uploaded.\n");

        let output = harness.execute(["rm", "nope"]).await;
        assert_eq!(output.exit_code, 1);
        assert!(output.stderr.starts_with("Error:\nE_NOT_INSTALLED"));
    }

    #[tokio::test]
    async fn test_cache_without_subcommand_shows_help() {
        let output = harness().execute(["cache"]).await;
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout.starts_with("pm cache\nManage the download cache"));
        assert!(output.stdout.contains("verify, check"));
    }
}
