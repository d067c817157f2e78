use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use claim_client::{present, ClaimSession, DocumentFile, HttpAdjudicationService, SubmissionStatus};
use shared::domain::DocumentType;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod interactive;

use commands::{parse_claim_date, parse_document_arg};
use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "claim_desk", about = "Submit claim documents for adjudication")]
struct Cli {
    /// Adjudication endpoint, overriding claim_desk.toml and the environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Request timeout in whole seconds, at least 1.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit documents in one go and print the decision.
    Submit {
        /// Document as <type>=<path>; repeat for more documents.
        #[arg(long = "doc", value_name = "TYPE=PATH")]
        documents: Vec<String>,
        /// Claim date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        /// Print the decision as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Fill in the claim form interactively.
    Form,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut settings, config_warnings) = load_settings();
    if let Some(url) = cli.server_url {
        settings.adjudication_url = url;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }
    init_tracing(&settings.log_filter)?;
    for warning in config_warnings {
        warn!("{warning}");
    }

    let endpoint = settings.endpoint()?;
    let service = HttpAdjudicationService::with_timeout(endpoint, settings.request_timeout())
        .context("failed to set up adjudication client")?;
    let session = ClaimSession::new(Arc::new(service));

    match cli.command {
        Command::Submit {
            documents,
            date,
            json,
        } => submit_once(&session, &documents, &date, json).await,
        Command::Form => interactive::run(session).await,
    }
}

fn init_tracing(log_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_filter))
        .with_context(|| format!("invalid log filter '{log_filter}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn submit_once(
    session: &Arc<ClaimSession>,
    documents: &[String],
    date: &str,
    json: bool,
) -> Result<()> {
    let claim_date = parse_claim_date(date)?;
    let mut files: Vec<(DocumentType, DocumentFile)> = Vec::with_capacity(documents.len());
    for raw in documents {
        let (kind, path): (DocumentType, PathBuf) = parse_document_arg(raw)?;
        let file = DocumentFile::load(&path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        if !file.has_accepted_extension() {
            warn!(
                filename = file.name(),
                "file is not PDF, TXT, PNG, JPG or JPEG; the service may reject it"
            );
        }
        files.push((kind, file));
    }

    session
        .edit(|form| {
            for (kind, file) in files {
                let id = form.add_document();
                form.set_document_type(id, kind);
                form.attach_file(id, Some(file));
            }
            form.set_claim_date(claim_date);
        })
        .await;

    match session.submit_and_wait().await? {
        SubmissionStatus::Succeeded(decision) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            } else {
                print!("{}", present(&decision));
            }
            Ok(())
        }
        SubmissionStatus::Failed(err) => Err(err.into()),
        other => bail!("submission ended while {}", other.label()),
    }
}
