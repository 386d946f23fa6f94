use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use auricle::app::{self, Session};
use auricle::cli::{commands, Cli, Commands};
use auricle::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let state_path = app::default_state_path()?;
    let persisted = app::read_state(&state_path);
    let session = Session::restore(config, persisted.as_deref())?;

    match cli.command {
        Commands::Home => {
            commands::home(&session, cli.pages).await?;
        }
        Commands::Search { query } => {
            commands::search(&session, &query, cli.pages).await?;
        }
        Commands::Authors { query } => {
            commands::search_authors(&session, &query, cli.pages).await?;
        }
        Commands::Book { url } => {
            commands::book(&session, &url).await?;
        }
        Commands::Chapter { url } => {
            commands::chapter(&session, &url).await?;
        }
        Commands::Channel { url } => {
            commands::channel(&session, &url).await?;
        }
        Commands::List { url } => {
            commands::channel_contents(&session, &url, cli.pages).await?;
        }
        Commands::State => {
            commands::state(&session)?;
        }
    }

    app::write_state(&state_path, &session.persist_state()?)?;

    Ok(())
}
