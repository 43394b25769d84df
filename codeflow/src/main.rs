//! `codeflow-publish`: publish selected flows to the production target.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use codeflow::admin::AdminClient;
use codeflow::config::{ConfigResolver, ProcessEnv};
use codeflow::core::PublishOutcome;
use codeflow::observability::{init_tracing, LogFormat};
use codeflow::publish::{
    fetch_progress, publish_progress, LocalStateSync, PublishObserver, PublishOrchestrator,
    RemoteUploader,
};
use codeflow::transport::ReqwestTransport;

#[derive(Debug, Parser)]
#[command(name = "codeflow-publish", version, about = "Publish code flows to production")]
struct Cli {
    /// Publish every flow known to the admin backend.
    #[arg(long, conflicts_with = "keys")]
    all: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,

    /// Keys of the flows to publish.
    keys: Vec<String>,
}

struct ConsoleProgress;

impl PublishObserver for ConsoleProgress {
    fn on_fetch_progress(&self, done: usize, total: usize) {
        eprintln!("[{:>3}%] fetched {done}/{total}", fetch_progress(done, total));
    }

    fn on_item_finished(&self, index: usize, total: usize, outcome: &PublishOutcome) {
        eprintln!(
            "[{:>3}%] {outcome}",
            publish_progress(index + 1, total)
        );
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let resolver = ConfigResolver::from_source(&ProcessEnv::with_dotenv());
    if !resolver.is_publish_enabled() {
        bail!(
            "publishing is disabled (build mode: {}, target configured: {})",
            resolver.build_mode(),
            resolver.resolve_target().is_some()
        );
    }

    let transport = Arc::new(
        ReqwestTransport::new(resolver.http()).context("failed to build HTTP client")?,
    );
    let admin = Arc::new(AdminClient::new(transport.clone(), resolver.admin().clone()));

    let keys = if cli.all {
        admin
            .list_flows()
            .await
            .context("failed to list flows")?
            .into_iter()
            .map(|f| f.key)
            .collect()
    } else {
        cli.keys
    };
    if keys.is_empty() {
        bail!("no flows selected; pass keys or --all");
    }

    let uploader = RemoteUploader::new(transport, LocalStateSync::new(admin.clone()));
    let orchestrator = PublishOrchestrator::from_config(&resolver, uploader)?
        .with_observer(Arc::new(ConsoleProgress));

    let report = orchestrator
        .publish_selected(admin.as_ref(), &keys)
        .await
        .context("failed to load selected flows")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in report.outcomes() {
            println!("{outcome}");
        }
        println!("{}", report.summary());
    }

    Ok(report.all_succeeded())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Plain
    });

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
