use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "restock-cli")]
#[command(about = "Restock signup reconciliation command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one reconciliation and print the JSON report to stdout.
    Report {
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Report { pretty: false }) {
        Commands::Report { pretty } => report(pretty).await,
    }
}

async fn report(pretty: bool) -> anyhow::Result<()> {
    let config = restock_core::load_app_config_from_env()?;
    let subscribers = restock_pipeline::run_reconciliation(&config).await?;
    tracing::info!(records = subscribers.len(), "reconciliation complete");

    let body = serde_json::json!({ "subscribers": subscribers });
    let rendered = if pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    println!("{rendered}");
    Ok(())
}
