use clap::Parser;
use flota::cli::{self, Cli};
use flota::config::Config;
use flota::observability::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load()?;
    let _guard = init_logging(&config.log_dir);

    cli::run(cli, config).await
}
