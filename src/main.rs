use std::path::PathBuf;

use clap::Parser;

use gtour::app::{App, TourSource};
use gtour::config::Config;
use gtour::error::AppResult;
use gtour::logging::init_logging;
use gtour::tour::load_steps;

/// Guided tour over a mock admin console.
#[derive(Debug, Parser)]
#[command(name = "gtour", version)]
struct Cli {
    /// TOML step file to run instead of the built-in tour.
    #[arg(long, value_name = "FILE")]
    tour: Option<PathBuf>,

    /// 1-based step to start from.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    start: Option<u64>,

    /// Configuration file (defaults to the platform config directory).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Open the console without starting the tour; press `t` to start it.
    #[arg(long)]
    no_autostart: bool,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    init_logging(&config.log)?;

    let source = match &cli.tour {
        Some(path) => TourSource::Steps(load_steps(path)?),
        None => TourSource::Builtin,
    };
    let autostart = (!cli.no_autostart).then(|| cli.start.unwrap_or(1) as usize);

    let mut app = App::new(config, source).with_autostart(autostart);
    app.run().await
}
