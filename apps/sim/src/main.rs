use anyhow::Context;
use clap::Parser;
use hotbar::domain::config::HostConfig;
use hotbar_logger::{LevelFilter, Logger};
use hotbar_sim::{Args, host_config, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = host_config(&args)?;
    let _log = logger(&args, &config)?;

    run(&args, &config).await?;
    Ok(())
}

fn logger(args: &Args, config: &HostConfig) -> anyhow::Result<Logger> {
    let level = config
        .logging
        .level
        .parse::<LevelFilter>()
        .with_context(|| format!("Unknown log level '{}'", config.logging.level))?;
    let builder = Logger::builder(env!("CARGO_PKG_NAME")).level(level);

    let logger = match args.log_dir.as_ref().or(config.logging.directory.as_ref()) {
        Some(dir) if config.logging.json => builder.path(dir).json().init()?,
        Some(dir) => builder.path(dir).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}
