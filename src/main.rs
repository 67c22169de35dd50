//! filedesk - selection-driven file operations against a file service.
//!
//! Usage:
//!   filedesk list LISTING                          Show a namespace listing
//!   filedesk apply LISTING -a ACTION -i ID [ID..]  Run one action, print events
//!   filedesk mkdir LISTING -p ID -n NAME           Create a folder
//!   filedesk --help                                Show help

mod console;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tracing_subscriber::EnvFilter;

use filedesk_core::{Action, EnglishTexts, FileSystemItem, ItemId, Selection};
use filedesk_ops::{ActionParam, ActionRouter, Collaborators, InvocationOutcome};
use filedesk_service::{MemoryFileService, Namespace, ServiceConfig};

use console::{
    ConsoleDialogs, ConsoleNavigator, ConsolePicker, ConsoleViewer, JsonEventSink, LoggingListener,
};

/// Base URL used when no config file is given.
const DEFAULT_BASE_URL: &str = "http://localhost/filedesk";

#[derive(Parser)]
#[command(
    name = "filedesk",
    version,
    about = "Selection-driven file operations against a file service",
    long_about = "filedesk validates, confirms and dispatches copy, move, rename, delete \
                  and download actions.\n\n\
                  Items come from a JSON listing; `apply` runs one action against an \
                  in-memory service loaded from it and prints every published change \
                  event as a JSON line."
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a namespace listing
    List {
        /// JSON listing file
        listing: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Apply one action to one or more items
    Apply {
        /// JSON listing file
        listing: PathBuf,

        /// Action: copy, move, rename, delete, download, download_as_zip,
        /// copy_here, view or public_link
        #[arg(short, long)]
        action: Action,

        /// Item id (repeat for a batch)
        #[arg(short, long = "item", required = true, num_args = 1..)]
        items: Vec<String>,

        /// Target folder id for copy and move (prompts when omitted)
        #[arg(short, long)]
        target: Option<String>,

        /// New name for rename and copy_here (prompts when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Confirm deletions without asking
        #[arg(short, long)]
        yes: bool,

        /// Service config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the resulting listing to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Create an empty folder
    Mkdir {
        /// JSON listing file
        listing: PathBuf,

        /// Parent folder id
        #[arg(short, long)]
        parent: String,

        /// Name of the new folder
        #[arg(short, long)]
        name: String,

        /// Service config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the resulting listing to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::List { listing, format } => run_list(&listing, format)?,
        Command::Apply {
            listing,
            action,
            items,
            target,
            name,
            yes,
            config,
            save,
        } => {
            let request = ApplyRequest {
                action,
                items,
                target,
                name,
                yes,
            };
            run_apply(&listing, config.as_deref(), save.as_deref(), request).await?;
        }
        Command::Mkdir {
            listing,
            parent,
            name,
            config,
            save,
        } => run_mkdir(&listing, config.as_deref(), save.as_deref(), &parent, &name).await?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let config = match path {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::builder().base_url(DEFAULT_BASE_URL).build()?,
    };
    Ok(config)
}

async fn save_listing(service: &MemoryFileService, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        let json = service.snapshot().await.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write listing {}", path.display()))?;
    }
    Ok(())
}

fn load_listing(path: &Path) -> Result<Namespace> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read listing {}", path.display()))?;
    Namespace::from_json(&json).with_context(|| format!("Invalid listing {}", path.display()))
}

/// Print a listing as an indented tree.
fn run_list(path: &Path, format: OutputFormat) -> Result<()> {
    let namespace = load_listing(path)?;

    match format {
        OutputFormat::Text => {
            for root in namespace.roots() {
                println!("{} ({})", root.path, root.id);
                print_children(&namespace, &root.id, 1);
            }
        }
        OutputFormat::Json => {
            println!("{}", namespace.to_json()?);
        }
    }

    Ok(())
}

fn print_children(namespace: &Namespace, parent: &ItemId, depth: usize) {
    let indent = "  ".repeat(depth);
    for child in namespace.children(parent) {
        match &child {
            FileSystemItem::File(file) => {
                println!("{indent}{} ({}, {} bytes)", file.name, file.id, file.size);
            }
            FileSystemItem::Folder(folder) => {
                println!("{indent}{}/ ({})", folder.name, folder.id);
                print_children(namespace, &folder.id, depth + 1);
            }
        }
    }
}

struct ApplyRequest {
    action: Action,
    items: Vec<String>,
    target: Option<String>,
    name: Option<String>,
    yes: bool,
}

/// Run one router invocation against an in-memory service.
async fn run_apply(
    listing: &Path,
    config: Option<&Path>,
    save: Option<&Path>,
    request: ApplyRequest,
) -> Result<()> {
    let namespace = load_listing(listing)?;
    let config = load_config(config)?;

    let items = request
        .items
        .iter()
        .map(|id| {
            namespace
                .get(&ItemId::from(id.as_str()))
                .cloned()
                .ok_or_else(|| eyre!("No item with id '{id}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    let target = request
        .target
        .as_deref()
        .map(|id| {
            namespace
                .folder(&ItemId::from(id))
                .cloned()
                .ok_or_else(|| eyre!("No folder with id '{id}'"))
        })
        .transpose()?;

    let service = Arc::new(
        MemoryFileService::from_config(namespace, &config).context("Invalid service config")?,
    );
    let mut router = ActionRouter::new(
        Collaborators {
            service: service.clone(),
            items: service.clone(),
            picker: Arc::new(ConsolePicker),
            dialogs: Arc::new(ConsoleDialogs::new(request.yes, request.name.clone())),
            navigator: Arc::new(ConsoleNavigator),
            viewer: Arc::new(ConsoleViewer),
            texts: Arc::new(EnglishTexts),
        },
        config.dispatch_config(),
    );
    router.add_event_sink(Arc::new(JsonEventSink));
    router.add_listener(Arc::new(LoggingListener));

    let action = request.action;
    let outcome = match <[FileSystemItem; 1]>::try_from(items) {
        Ok([item]) => {
            let param = match (action, target, request.name) {
                (Action::Copy | Action::Move, Some(folder), _) => ActionParam::Target(folder),
                (Action::Rename, _, Some(name)) => ActionParam::NewName(name),
                _ => ActionParam::None,
            };
            router.on_action(&item, action, None, param).await
        }
        Err(items) => {
            let selection = Selection::new(items)?;
            router
                .on_batch_action(&selection, action, target.as_ref(), None, None)
                .await
        }
    };

    save_listing(&service, save).await?;

    match outcome {
        InvocationOutcome::Dispatched(_) | InvocationOutcome::Completed => Ok(()),
        InvocationOutcome::Cancelled => {
            eprintln!("Cancelled.");
            Ok(())
        }
        InvocationOutcome::Ignored => {
            eprintln!("{action} is not available for multiple items.");
            Ok(())
        }
        InvocationOutcome::Rejected(error) => bail!(error),
        InvocationOutcome::Failed(error) => Err(error).context(format!("{action} failed")),
    }
}

/// Create a folder directly on the backend and print it as JSON.
async fn run_mkdir(
    listing: &Path,
    config: Option<&Path>,
    save: Option<&Path>,
    parent: &str,
    name: &str,
) -> Result<()> {
    let namespace = load_listing(listing)?;
    let config = load_config(config)?;
    let parent = namespace
        .folder(&ItemId::from(parent))
        .cloned()
        .ok_or_else(|| eyre!("No folder with id '{parent}'"))?;

    let service =
        MemoryFileService::from_config(namespace, &config).context("Invalid service config")?;
    let folder = service
        .create_folder(&parent, name)
        .await
        .with_context(|| format!("Failed to create '{name}' in {}", parent.path))?;

    println!("{}", serde_json::to_string(&FileSystemItem::from(folder))?);
    save_listing(&service, save).await
}
