mod app;
mod cache;
mod cli;
mod commands;
mod config;
mod connectivity;
mod error;
mod event;
mod logging;
mod render;
mod repository;
mod state;
#[cfg(test)]
mod testing;
mod tmdb;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use cache::SqliteStorage;
use cli::{Args, Command};
use connectivity::TcpProbe;
use repository::MovieRepository;
use tmdb::TmdbClient;

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let command = args.command.clone().unwrap_or(Command::Browse);

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // stderr would draw over the terminal UI
  let log_to_stderr = args.verbose && command != Command::Browse;
  let _log_guard = logging::init(&config::Config::data_dir()?, log_to_stderr)?;
  info!(?command, "Starting movieshelf");

  let cache_path = config.cache_path()?;
  let store = Arc::new(SqliteStorage::open(&cache_path)?);
  let remote = Arc::new(TmdbClient::new(&config)?);
  let probe = Arc::new(
    TcpProbe::for_base_url(&config.tmdb.base_url)
      .with_timeout(Duration::from_secs(config.tmdb.request_timeout_secs.clamp(1, 5))),
  );
  let repo = MovieRepository::new(remote, store, probe).with_ttl(config.ttl());

  match command {
    Command::Trending { refresh, follow } => cli::trending(&repo, refresh, follow).await?,
    Command::Search { query } => cli::search(&repo, &query).await?,
    Command::Detail { id, refresh } => cli::detail(&repo, id, refresh).await?,
    Command::Browse => {
      let mut app = app::App::new(config, repo);
      app.run().await?;
    }
  }

  Ok(())
}
