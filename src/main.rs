use clap::{Parser, Subcommand};
use mem_trim::frontend::render::{clean_summary, history_lines, status_block, tooltip};
use mem_trim::frontend::{FrontendContext, WatchEvent, WatchOptions, run_watch};
use mem_trim::logging;
use mem_trim::shared::config::load_settings;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "memtrim")]
#[command(about = "Watch memory pressure and trim process working sets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show current memory usage and recent cleans
    Status,
    /// Trim working sets now and record the outcome
    Clean,
    /// List recent cleans, newest first
    History {
        /// Number of entries to show (defaults to shell.history_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show or change persisted preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Poll memory, warn above the threshold and auto-clean when enabled
    Watch,
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    /// e.g. `config set warning_threshold 90`
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings()?;
    logging::init(&settings.logging)?;
    info!("memtrim starting");

    let ctx = FrontendContext::from_settings(settings)?;
    let limit = ctx.settings.shell.history_limit;

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => {
            let report = ctx.service.status()?;
            print!("{}", status_block(&report));
            println!("\nRecent cleans:");
            for line in history_lines(&ctx.service.recent(limit)) {
                println!("  {line}");
            }
        }
        Command::Clean => {
            let result = ctx.service.clean()?;
            println!("{}", clean_summary(&result));
            println!("{}", tooltip(&ctx.service.sample()?));
        }
        Command::History { limit: requested } => {
            for line in history_lines(&ctx.service.recent(requested.unwrap_or(limit))) {
                println!("{line}");
            }
        }
        Command::Config { action } => {
            if let ConfigAction::Set { key, value } = action {
                let parsed =
                    serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
                ctx.service.set_preference(&key, &parsed)?;
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&ctx.service.preferences())?
            );
        }
        Command::Watch => {
            let service = Arc::clone(&ctx.service);
            let options = WatchOptions {
                max_period: Some(Duration::from_secs(ctx.settings.shell.status_refresh_secs)),
                ..WatchOptions::default()
            };
            let watch = run_watch(service, options, |event| match event {
                WatchEvent::Tick(report) => {
                    println!("{}", tooltip(&report.status.snapshot));
                    if let Some(result) = report.cleaned {
                        println!("{}", clean_summary(&result));
                    }
                }
                WatchEvent::Failed(reason) => eprintln!("refresh failed: {reason}"),
            });
            tokio::select! {
                _ = watch => {}
                _ = tokio::signal::ctrl_c() => info!("Interrupted; stopping watch"),
            }
        }
    }

    Ok(())
}
