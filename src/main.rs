use std::io::Read;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use log::info;

use event_transforms::cli::{Cli, Command};
use event_transforms::config::{load_config, AppConfig};
use event_transforms::handler::{handle_file_event, FileEvent, HandlerOptions, HandlerOutcome};
use event_transforms::observability::{CompositeObserver, FileObserver, LogObserver, ProcessingObserver};
use event_transforms::processing::gather_message;
use event_transforms::storage::LocalStore;
use event_transforms::types::Record;

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config: AppConfig = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    match cli.command {
        Command::Process {
            root,
            bucket,
            name,
            dead_letter,
        } => {
            let settings = config
                .file_processing
                .ok_or_else(|| eyre::eyre!("config has no [file_processing] section"))?;

            let mut observers: Vec<Arc<dyn ProcessingObserver>> = vec![Arc::new(LogObserver)];
            if let Some(path) = dead_letter {
                observers.push(Arc::new(FileObserver::new(path)));
            }
            let options = HandlerOptions {
                observer: Some(Arc::new(CompositeObserver::new(observers))),
                ..Default::default()
            };

            let store = LocalStore::new(&root);
            let event = FileEvent::new(bucket, name);
            let outcome = handle_file_event(&event, &settings, &store, &options)
                .with_context(|| format!("Processing file {} failed", event.name))?;

            let summary = match outcome {
                HandlerOutcome::Skipped => serde_json::json!({"status": "success", "message": "file is skipped"}),
                HandlerOutcome::Processed { bucket, name, rows, .. } => serde_json::json!({
                    "status": "success",
                    "message": format!("wrote {rows} rows to {bucket}/{name}"),
                }),
                HandlerOutcome::Rejected { status, message } => {
                    serde_json::json!({"status": status, "message": message})
                }
            };
            println!("{summary}");
        }
        Command::Gather { input } => {
            let mut text = String::new();
            match input {
                Some(path) => {
                    text = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                }
                None => {
                    std::io::stdin()
                        .read_to_string(&mut text)
                        .context("Failed to read message from stdin")?;
                }
            }
            let message: Record = serde_json::from_str(&text).context("Message must be a JSON object")?;

            info!("gathering message with {} fields", message.len());
            let gathered = gather_message(message, config.columns_publish.as_ref());
            println!("{}", serde_json::to_string(&gathered)?);
        }
    }

    Ok(())
}
