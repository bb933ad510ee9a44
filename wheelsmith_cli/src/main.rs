mod cli;
mod export_format;

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use cli::{Cli, Commands};
use tracing_appender::non_blocking;
use tracing_subscriber::{EnvFilter, prelude::*};
use wheelsmith_rs::export::render_table;
use wheelsmith_rs::progress::LogProgress;
use wheelsmith_rs::WheelPipeline;

fn init_tracing(log_file: Option<PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| anyhow!("failed to create log directory {parent:?}: {err}"))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| anyhow!("failed to open log file {path:?}: {err}"))?;
        let (non_blocking_writer, guard) = non_blocking(file);
        // Leak the guard so the non-blocking writer stays alive for the
        // duration of the process.
        let _guard = Box::leak(Box::new(guard));
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking_writer);
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
    }
}

fn log_invocation(log_file: Option<&PathBuf>) {
    let cwd = std::env::current_dir().ok();
    let argv: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    tracing::info!("==================== new wheelsmith_cli run ====================");
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        cwd = ?cwd,
        log_file = ?log_file,
        argv = ?argv,
        "wheelsmith_cli invoked"
    );

    if argv.len() >= 2 {
        tracing::info!(
            "cargo_repro_command=cargo run --release -p wheelsmith_cli -- {}",
            argv[1..].join(" ")
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Wheel(args) => {
            if args.no_file_log {
                None
            } else {
                Some(args.output_dir.join("wheelsmith.log"))
            }
        }
    };

    init_tracing(log_file.clone())?;
    log_invocation(log_file.as_ref());

    match cli.command {
        Commands::Wheel(args) => {
            let print = args.print;
            let config = args.into_config()?;
            let quiet = config.quiet;
            let mut pipeline = WheelPipeline::new(config);
            if !quiet {
                pipeline = pipeline.with_observer(LogProgress::default());
            }
            let run = pipeline.run()?;
            if print && !run.report.combinations.is_empty() {
                print!("{}", render_table(&run.report.combinations));
            }
            Ok(())
        }
    }
}
