use clap::Parser;
use voketag::{Cli, Context};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    if let Err(e) = voketag_utils::tracing::init() {
        eprintln!("failed to initialize logging: {e}");
    }

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let context = Context::new(config, cli.json)?;

    cli.command.execute(&context).await?;
    Ok(())
}
