mod api;
mod app_config;
mod pipeline;
mod router;
mod state;
mod upload;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing::info;

use healthflow_core::{Config, UploadedDocument};
use healthflow_ingest::PdfExtractor;

/// HealthFlow: AI summaries of medical report PDFs.
#[derive(Parser, Debug)]
#[command(name = "healthflow-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Extract and clean the text of a PDF, printing it to stdout
    Extract { path: PathBuf },
    /// Run the full analysis pipeline on a PDF, printing the summary
    Analyze { path: PathBuf },
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.log_summary();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(app_config::build_state(config));
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn read_pdf(config: &Config, path: &Path) -> anyhow::Result<UploadedDocument> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    upload::check_size(bytes.len(), &config.upload).map_err(report_failure)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report.pdf".to_string());
    Ok(UploadedDocument::new(filename, Bytes::from(bytes)))
}

async fn extract(config: Config, path: &Path) -> anyhow::Result<()> {
    let doc = read_pdf(&config, path).await?;
    let text = PdfExtractor::new()
        .extract(&doc.bytes)
        .map_err(|e| report_failure(e.into()))?;
    if text.trim().is_empty() {
        return Err(report_failure(pipeline::PipelineError::EmptyExtraction));
    }
    println!("{text}");
    Ok(())
}

async fn analyze(config: Config, path: &Path) -> anyhow::Result<()> {
    let doc = read_pdf(&config, path).await?;
    let state = app_config::build_state(config);
    let report = state.pipeline.run(doc).await.map_err(report_failure)?;
    info!(
        confidence = report.validation_score,
        "analysis of '{}' completed", report.filename
    );
    println!("{}", report.analysis_narrative);
    Ok(())
}

/// Print the caller-facing failure and turn it into a non-zero exit.
fn report_failure(err: pipeline::PipelineError) -> anyhow::Error {
    eprintln!("{}: {}", err.category(), err.message());
    if let Some(suggestion) = err.suggestion() {
        eprintln!("{suggestion}");
    }
    anyhow::Error::new(err)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = app_config::load_config();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Extract { path } => extract(config, &path).await,
        Command::Analyze { path } => analyze(config, &path).await,
    }
}
