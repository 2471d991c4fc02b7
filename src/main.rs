//! refactor-preview CLI entry point.
//!
//! Loads a JSON edit list, shows it as a preview tree and applies or drops it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use refactor_preview::application::preview::{
    PreviewController, PreviewOptions, PreviewServices, PreviewTree, Resolution, TreeRow,
    TreeView,
};
use refactor_preview::domain::{DiffResourcePair, ResourceEdit};
use refactor_preview::infra::app_config;
use refactor_preview::infra::dialog::StderrDialog;
use refactor_preview::infra::opener::{DiffViewHandle, DiffViewOpener, DiffViewRequest};
use refactor_preview::infra::operations::DefaultOperationSetFactory;
use refactor_preview::infra::preferences::TomlPreferenceStore;
use refactor_preview::infra::probe::FsModelProbe;

#[derive(Parser, Debug)]
#[command(name = "refactor-preview")]
#[command(version)]
#[command(about = "Preview a bulk refactoring before applying it", long_about = None)]
struct Args {
    /// JSON file holding the list of resource edits
    edits: PathBuf,

    /// Top-level grouping of the tree
    #[arg(long, value_enum)]
    group_by: Option<GroupBy>,

    /// Apply the checked edits and print them as JSON
    #[arg(long, conflicts_with = "discard")]
    accept: bool,

    /// Drop the preview without applying anything
    #[arg(long)]
    discard: bool,

    /// Open the focused element in the diff view
    #[arg(long)]
    open: bool,

    /// Config file (defaults to the per-user config)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GroupBy {
    File,
    Type,
}

/// Prints diff views instead of showing them.
struct ConsoleOpener;

struct ConsoleHandle {
    edits: Option<Vec<ResourceEdit>>,
}

#[async_trait(?Send)]
impl DiffViewHandle for ConsoleHandle {
    async fn resolved_edits(&mut self) -> Result<Option<Vec<ResourceEdit>>> {
        Ok(self.edits.take())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait(?Send)]
impl DiffViewOpener for ConsoleOpener {
    async fn open(&self, request: DiffViewRequest) -> Result<Box<dyn DiffViewHandle>> {
        println!("== {} ({}) ==", request.label, request.source);
        if let Some(reveal) = &request.reveal {
            println!(
                "revealing {} at {}:{}",
                reveal.resource, reveal.position.line, reveal.position.column
            );
        }
        print_pairs(&request.diff_resources);
        Ok(Box::new(ConsoleHandle {
            edits: Some(request.edits),
        }))
    }
}

fn print_rows(rows: &[TreeRow]) {
    for row in rows {
        let marker = match (row.disabled, row.checked) {
            (true, _) => "-",
            (false, true) => "x",
            (false, false) => " ",
        };
        let fold = if row.expanded { "v" } else { ">" };
        println!("{}{fold} [{marker}] {}", "  ".repeat(row.depth), row.label);
    }
}

fn print_pairs(pairs: &[DiffResourcePair]) {
    for pair in pairs {
        match &pair.original {
            Some(original) => println!("{original} <-> {}", pair.modified),
            None => println!("(deleted) <-> {}", pair.modified),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(app_config::config_path);
    let preferences = TomlPreferenceStore::open(config_path);
    let options = PreviewOptions::from(preferences.config());

    let contents = std::fs::read_to_string(&args.edits)
        .with_context(|| format!("Failed to read {}", args.edits.display()))?;
    let edits: Vec<ResourceEdit> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid edit list in {}", args.edits.display()))?;

    let services = PreviewServices {
        factory: Arc::new(DefaultOperationSetFactory::new()),
        probe: Arc::new(FsModelProbe),
        dialog: Box::new(StderrDialog),
        opener: Box::new(ConsoleOpener),
        preferences: Box::new(preferences),
    };
    let mut controller = PreviewController::new(PreviewTree::new(), services, options);

    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let decision = controller.set_input(edits, token).await?;
    match args.group_by {
        Some(GroupBy::File) => controller.group_by_file().await?,
        Some(GroupBy::Type) if !controller.flags().has_categories => {
            log::info!("--group-by type ignored: the edits form a single category");
        }
        Some(GroupBy::Type) => controller.group_by_type().await?,
        None => {}
    }

    print_rows(controller.tree().rows());
    print_pairs(&controller.resolve_resources().await?);

    if args.open
        && let Some(focused) = controller.tree().focus()
    {
        controller.open_element(&focused, false).await?;
    }

    let resolution = if args.accept {
        controller.accept().await
    } else {
        if !args.discard {
            log::info!("Neither --accept nor --discard given, discarding");
        }
        controller.discard()
    };
    if resolution == Some(Resolution::Cancelled) {
        log::info!("Preview cancelled");
    }

    let result = decision.await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
