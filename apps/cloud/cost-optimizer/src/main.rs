//! Cloud Cost Optimizer
//!
//! Sends a JSON description of cloud resources to Gemini and reports
//! cost-saving recommendations. Runs as an HTTP API or as a one-shot CLI.

use axum_helpers::server::{create_router, health_router, serve};
use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_cost_optimizer::{
    AnalysisService, GeminiClient, GenerativeModel, ReportState, RequestBuilder, sample,
};
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;

mod config;
mod openapi;
mod render;
mod routes;

use config::Config;

#[derive(Parser)]
#[command(name = "cost-optimizer")]
#[command(about = "Find cost-saving opportunities in cloud resources")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,

    /// Analyze a JSON array of resources once
    Analyze {
        /// File to read. Defaults to stdin.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Print the sample data set
    Sample,
}

#[derive(Subcommand)]
enum KeyAction {
    /// Save an API key
    Set { key: String },
    /// Remove the saved API key
    Clear,
    /// Show whether a key is configured
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    match cli.command {
        Commands::Serve => run_server(config).await?,
        Commands::Analyze { input, json } => run_analysis(config, input, json).await?,
        Commands::Key { action } => manage_key(&config, action)?,
        Commands::Sample => println!("{}", sample::sample_text()),
    }

    Ok(())
}

fn build_service(config: &Config) -> Result<AnalysisService<GeminiClient>> {
    let credentials = Arc::new(config.credentials()?);
    let model = GeminiClient::new(config.gemini.clone());

    Ok(AnalysisService::new(model, credentials)
        .with_validation_mode(config.validation)
        .with_request_builder(RequestBuilder::new(config.gemini.temperature)))
}

async fn run_server(config: Config) -> Result<()> {
    let service = Arc::new(build_service(&config)?);
    let reports = Arc::new(ReportState::new(config.superseded));

    info!(
        endpoint = %config.gemini.endpoint_url(),
        credential_source = %config.credential_source,
        validation = %config.validation,
        superseded = %config.superseded,
        "Starting cost optimizer API"
    );

    let credentials = Arc::clone(service.credentials());
    let api_routes = routes::routes(service, reports);

    let app = create_router::<openapi::ApiDoc>(api_routes, &config.server, &config.environment)?
        .merge(health_router(config.app))
        .merge(routes::ready_router(credentials));

    serve(app, &config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Cost optimizer API shutdown complete");
    Ok(())
}

async fn read_input(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .wrap_err_with(|| format!("Failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .wrap_err("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

async fn run_analysis(config: Config, input: Option<PathBuf>, json: bool) -> Result<()> {
    let raw = read_input(input).await?;
    let service = build_service(&config)?;

    info!(model = %service.model().model_name(), "Analyzing resources");

    let report = service
        .analyze(&raw)
        .await
        .map_err(|e| eyre::eyre!("{}: {}", e.kind(), e.user_message()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::render_report(&report));
    }

    Ok(())
}

fn manage_key(config: &Config, action: KeyAction) -> Result<()> {
    let credentials = config.credentials()?;

    let status = match action {
        KeyAction::Set { key } => credentials.set(&key)?,
        KeyAction::Clear => credentials.clear()?,
        KeyAction::Show => credentials.status(),
    };

    println!("{}", render::render_credential(&status));
    Ok(())
}
