use clap::Parser;
use emblem_core::config::Config;

use crate::cli::{Cli, Cmd};

mod cli;
mod commands;

fn setup_logger(verbose: bool, ansi: bool) -> eyre::Result<()> {
    use tracing::Level;
    use tracing_subscriber::{
        filter::LevelFilter, fmt::layer, layer::SubscriberExt, util::SubscriberInitExt, Registry,
    };

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    Registry::default()
        .with(LevelFilter::from(level))
        .with(layer().with_ansi(ansi).with_target(false).without_time())
        .try_init()?;
    Ok(())
}

async fn load_config(args: &Cli) -> eyre::Result<Config> {
    if args.config_file.exists() {
        Ok(Config::parse_file(&args.config_file).await?)
    } else {
        tracing::debug!(
            config_file = %args.config_file.display(),
            "no configuration file, using defaults"
        );
        Ok(Config::default())
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    let ansi = !matches!(&args.subcommand, Cmd::Build(build) if build.ci);
    setup_logger(args.verbose, ansi)?;

    let config = load_config(&args).await?;
    match &args.subcommand {
        Cmd::Build(build_args) => commands::build(&config, &args, build_args).await,
        Cmd::Check(check_args) => commands::check(&config, &args, check_args).await,
        Cmd::Config => commands::config(&config),
        Cmd::Version => commands::version(&config).await,
    }
}
