use anyhow::Result;
use clap::Parser;
use manifest_merge::{
    cli::Cli,
    config::Config,
    merge,
    registry::{self, RegistryClient},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr; stdout is reserved for the merged index
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Resolve every reference up front so a bad name fails before any fetch
    let sources = cli
        .sources
        .iter()
        .map(|name| registry::parse_reference(name))
        .collect::<Result<Vec<_>, _>>()?;
    let target = cli
        .target
        .as_deref()
        .map(registry::parse_reference)
        .transpose()?;

    let config = Config::load()?;
    let mut client = RegistryClient::new(&config);

    let serialized = merge::run(&mut client, &sources, target.as_ref()).await?;

    if target.is_none() {
        println!("{}", serialized);
    }

    Ok(())
}
