//! Prioritizer CLI - AI-assisted ordering of Google Tasks lists.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::disallowed_macros)]
#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

use prioritizer::auth::ServiceAccount;
use prioritizer::store::find_list_by_title;
use prioritizer::{
    ui, AIProvider, GeminiProvider, GoogleTasksStore, PrioritizerConfig, TaskStore, Workflow,
};

#[derive(Parser)]
#[command(name = "prioritizer")]
#[command(about = "Rank and decompose Google Tasks lists with an AI model", long_about = None)]
#[command(version)]
struct Cli {
    /// Account whose task lists are processed
    #[arg(short, long, env = "PRIORITIZER_USER")]
    user: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        ui::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = PrioritizerConfig::load().context("Failed to load configuration")?;

    let api_key = config.api_key()?;

    let account = ServiceAccount::from_file(&config.credentials_path)
        .context("Failed to load service account")?;
    let token = account
        .access_token_for(&cli.user)
        .await
        .with_context(|| format!("Failed to authorize as {}", cli.user))?;

    let store: Arc<dyn TaskStore> = Arc::new(
        GoogleTasksStore::new(token.token)
            .context("Failed to create task store client")?
            .with_base_url(&config.tasks_base_url),
    );
    let provider: Arc<dyn AIProvider> =
        Arc::new(GeminiProvider::new(api_key).with_base_url(&config.inference_base_url));

    ui::print_info(&format!(
        "Target lists: {}",
        config.target_lists.join(", ")
    ));

    let workflow = Workflow::new(Arc::clone(&store), provider, &config);
    let report = workflow.run(&config.target_lists).await;

    println!();
    println!("{}", ui::report_table(&report));

    if report.failed() == 0 {
        ui::print_success(&format!(
            "{} list(s) processed, {} skipped",
            report.completed(),
            report.skipped()
        ));
    } else {
        ui::print_warning(&format!(
            "{} list(s) processed, {} skipped, {} failed",
            report.completed(),
            report.skipped(),
            report.failed()
        ));
    }

    display_lists(store.as_ref(), &config.target_lists).await;

    Ok(())
}

/// Re-fetch and print each target list in its new order.
async fn display_lists(store: &dyn TaskStore, titles: &[String]) {
    for title in titles {
        let list = match find_list_by_title(store, title).await {
            Ok(list) => list,
            Err(e) => {
                warn!(list = %title, error = %e, "Cannot display list");
                continue;
            }
        };

        match store.list_tasks(&list.id).await {
            Ok(tasks) => ui::display_list(&list.title, &tasks),
            Err(e) => warn!(list = %title, error = %e, "Failed to fetch tasks for display"),
        }
    }
}
