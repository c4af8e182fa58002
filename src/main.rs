mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod format;
mod logging;
mod query;
mod ui;

use api::{ApiClient, CachedClient};
use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "release-radar")]
#[command(about = "A terminal client for the Manga Release Radar API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/release-radar/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// API base URL (overrides config and RELEASE_RADAR_API_URL)
  #[arg(long)]
  api_url: Option<String>,

  #[command(subcommand)]
  command: Option<Cmd>,
}

#[derive(Subcommand, Debug, Default)]
enum Cmd {
  /// Browse releases interactively (default)
  #[default]
  Tui,
  /// Check that the API is reachable
  Health,
  /// List publishers with their release counts
  Publishers,
  /// Show the values each listing can be filtered by
  Filters,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;
  config.apply_api_url(args.api_url);

  let _log_guard = logging::init(&config.log);
  info!(api = %config.api.base_url, "starting");

  let client = CachedClient::new(ApiClient::new(&config.api)?);

  match args.command.unwrap_or_default() {
    Cmd::Tui => {
      let mut app = app::App::new(config, client);
      app.run().await?;
    }
    Cmd::Health => {
      let health = client
        .health()
        .await
        .map_err(|e| eyre!("{} is not reachable: {}", client.base_url(), e))?;
      match &health.version {
        Some(version) => println!("{} ({})", health.status, version),
        None => println!("{}", health.status),
      }
    }
    Cmd::Publishers => {
      let publishers = client.publishers().await?;
      for p in &publishers.data {
        println!("{:<20} {:<30} {:>5} releases", p.slug, p.name, p.release_count);
      }
    }
    Cmd::Filters => {
      let filters = client.metadata_filters().await?;
      let publishers: Vec<&str> = filters.publishers.iter().map(|p| p.slug.as_str()).collect();
      println!("publishers:   {}", publishers.join(", "));
      println!("regions:      {}", filters.regions.join(", "));
      println!("formats:      {}", filters.formats.join(", "));
      println!("demographics: {}", filters.demographics.join(", "));
      println!("genres:       {}", filters.genres.join(", "));
    }
  }

  Ok(())
}
