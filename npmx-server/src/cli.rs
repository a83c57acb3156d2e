//! Command-line interface for the npmx server
//!
//! Argument parsing and command dispatch. Build metadata is resolved here,
//! once, before anything else runs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use npmx_build_env::{AppEnv, BuildEnvOptions, EnvVars};
use tracing::info;

use crate::config::Config;
use crate::server::run_server;
use crate::upstream::JsDelivrClient;
use crate::AppState;

#[derive(Parser)]
#[command(name = "npmx-server")]
#[command(about = "npmx web front end and registry API")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file, embedded defaults are used when missing
    #[arg(long, default_value = "npmx.json", global = true)]
    pub config: PathBuf,

    /// Treat this as a development build
    #[arg(long, global = true)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to, overrides the configuration file
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to, overrides the configuration file
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve build metadata and print it as JSON
    BuildInfo {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Options for resolving the build environment from a configuration.
pub fn build_env_options(config: &Config, dev: bool, vars: EnvVars) -> BuildEnvOptions {
    BuildEnvOptions {
        dev,
        version: env!("CARGO_PKG_VERSION").to_string(),
        repo_root: config.assets.root.clone(),
        privacy_policy_path: config.privacy_policy_path(),
        layout: config.assets.layout(),
        vars,
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let options = build_env_options(&config, cli.dev, EnvVars::capture());
    let app_env = AppEnv::resolve(&options)
        .await
        .context("Failed to resolve build environment")?;

    match cli.command {
        Commands::Start { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let file_source = Arc::new(JsDelivrClient::new(config.upstream.clone())?);
            let state = AppState::new(config, app_env, file_source);
            run_server(state).await
        }

        Commands::BuildInfo { output } => {
            let json = serde_json::to_string_pretty(&app_env.build_info)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Build info written");
                }
                None => println!("{json}"),
            }
            Ok(())
        }
    }
}
