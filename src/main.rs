mod app;
mod cache;
mod catalog;
mod config;
mod controller;
mod debounce;
mod event;
mod logging;
mod prefs;
mod query;
mod session;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

use catalog::ResourceKind;

#[derive(Parser, Debug)]
#[command(name = "c137")]
#[command(about = "A terminal explorer for the Rick and Morty catalog")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/c137/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Catalog API base URL
  #[arg(long)]
  api_url: Option<String>,

  /// Write logs here instead of $XDG_DATA_HOME/c137/c137.log
  #[arg(long)]
  log_file: Option<PathBuf>,

  /// Tab to open after login
  #[arg(short, long, value_parser = parse_kind)]
  start: Option<ResourceKind>,
}

fn parse_kind(s: &str) -> Result<ResourceKind, String> {
  match s.to_lowercase().as_str() {
    "characters" | "character" | "c" => Ok(ResourceKind::Characters),
    "locations" | "location" | "l" => Ok(ResourceKind::Locations),
    other => Err(format!("unknown view '{}', expected characters or locations", other)),
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over the config file
  if let Some(url) = args.api_url {
    config.api_url = url;
  }
  if let Some(path) = args.log_file {
    config.log_file = Some(path);
  }
  if let Some(kind) = args.start {
    config.start_view = kind;
  }

  let _log_guard = logging::init(config.log_file.as_deref())?;
  info!(api_url = %config.api_url, "starting");

  let mut app = app::App::new(config)?;
  app.run().await?;

  info!("shutting down");
  Ok(())
}
