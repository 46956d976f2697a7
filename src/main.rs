use anyhow::{Context, Result};
use clap::Parser;
use dnsnoop::cli::Cli;
use dnsnoop::{console, sniffer};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let list_devices = cli.list_devices();
    let config = cli.into_config();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.default_filter()),
    )
    .init();

    if list_devices {
        let devices = sniffer::list_devices().context("Failed to list capture devices")?;
        console::show_devices(&devices);
        return Ok(());
    }

    let stats = dnsnoop::run(&config).context("Failed to start capture")?;
    println!("{}", stats);

    Ok(())
}
