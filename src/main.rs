use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stylename::cli::{OutputFormat, OutputWriter, run_check};
use stylename::config::Config;

#[derive(Parser)]
#[command(name = "stylename", version, about = "styleName CSS class intelligence")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the language server over stdio (default)
    Serve,

    /// Report styleName classes missing from imported stylesheets
    Check {
        /// Component files or directories to scan
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Workspace root holding .stylename.toml
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries the LSP stream; console logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("stylename=info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (non_blocking_console, _console_guard) = non_blocking(std::io::stderr());

    // Optional daily-rolling file log
    let (file_layer, _file_guard) = match std::env::var_os("STYLENAME_LOG_DIR") {
        Some(logs_dir) => {
            let file_appender = rolling::daily(logs_dir, "stylename.log");
            let (non_blocking_file, guard) = non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking_file)
                .with_target(true)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking_console)
                .with_target(false)
                .with_ansi(false),
        )
        .with(file_layer)
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting stylename language server v{}", env!("CARGO_PKG_VERSION"));
            stylename::handler::serve_stdio().await;
            info!("stylename language server stopped");
            ExitCode::SUCCESS
        }
        Command::Check {
            paths,
            root,
            format,
        } => match check(&paths, &root, format).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::from(1),
            Err(e) => {
                error!("check failed: {:#}", e);
                eprintln!("stylename: {:#}", e);
                ExitCode::from(2)
            }
        },
    }
}

async fn check(paths: &[PathBuf], root: &std::path::Path, format: OutputFormat) -> anyhow::Result<bool> {
    let config = Config::load(root)?;
    let report = run_check(paths, &config).await?;
    OutputWriter::new(format).write_report(&report)?;
    Ok(report.is_clean())
}
