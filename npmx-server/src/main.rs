//! npmx server binary

use anyhow::Result;
use clap::Parser;
use npmx_logging::{init_subscriber, LogConfig};
use npmx_server::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_subscriber(&LogConfig::from_env());

    run(Cli::parse()).await
}
