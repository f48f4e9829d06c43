use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use orderdesk_application::{AccessGate, OrderDesk};
use orderdesk_core::action::Incoming;
use orderdesk_core::clock::{Clock, SystemClock};
use orderdesk_core::order::FormRegistry;
use orderdesk_core::session::UserId;
use orderdesk_infrastructure::{ConfigService, JsonOrderRepository, OrderdeskPaths};

mod helper;
mod terminal;

use helper::CliHelper;
use terminal::{ScreenEvent, TerminalTransport};

#[derive(Parser)]
#[command(name = "orderdesk")]
#[command(version, about = "Conversational order desk in your terminal", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long)]
    debug: bool,

    /// Log at info level
    #[arg(short, long)]
    verbose: bool,

    /// Path to config.toml (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding orders.json (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Chat user to act as
    #[arg(long, default_value_t = 1)]
    user_id: UserId,
}

fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_event(event: &ScreenEvent) {
    match event {
        ScreenEvent::Shown {
            id,
            message,
            edited,
        } => {
            let header = if *edited {
                format!("[m{}] (edited)", id)
            } else {
                format!("[m{}]", id)
            };
            println!("{}", header.bright_black());
            for line in message.text.lines() {
                println!("{}", line.bright_blue());
            }
            for (n, button) in message.keyboard.iter().enumerate() {
                println!(
                    "  {} {}",
                    format!("@{}.{}", id, n + 1).yellow(),
                    button.label
                );
            }
            println!();
        }
        ScreenEvent::Deleted(id) => {
            println!("{}", format!("[m{}] deleted", id).bright_black());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::new(path.clone()),
        None => ConfigService::at_default_location()?,
    };
    let config = config_service.get_config()?;

    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        config.logging.level.as_str()
    };
    init_tracing(level);

    let data_dir = match cli.data_dir.or(config.storage.data_dir) {
        Some(dir) => dir,
        None => OrderdeskPaths::data_dir()?,
    };
    tracing::info!(data_dir = %data_dir.display(), config = %config_service.path().display(), "starting");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repository = Arc::new(JsonOrderRepository::new(&data_dir));
    let registry = Arc::new(FormRegistry::new()?);
    let gate = AccessGate::new(config.access.secret_format.clone(), clock.clone())?;
    let desk = OrderDesk::new(registry, repository, clock, gate);

    let mut terminal = TerminalTransport::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Order desk ===".bright_magenta().bold());
    println!(
        "{}",
        "Send /start to begin. Press buttons with @<message>.<button>, type 'quit' to exit."
            .bright_black()
    );
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let incoming = match terminal.parse(trimmed) {
                    Ok(incoming) => incoming,
                    Err(err) => {
                        eprintln!("{}", err.to_string().red());
                        continue;
                    }
                };
                let origin = match &incoming {
                    Incoming::Callback { origin, .. } => *origin,
                    _ => None,
                };

                let outgoing = desk.handle(cli.user_id, incoming).await;
                for event in terminal.deliver(origin, outgoing) {
                    print_event(&event);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
