//! Terminal implementations of the router's collaborators.
//!
//! Prompts go to stderr and answers come from stdin, so stdout carries only
//! events and URLs.

use filedesk_core::{Action, File, FileSystemEvent, ServiceError};
use filedesk_ops::{
    BoxFuture, ConfirmOutcome, ConfirmStyle, DialogService, EventSink, FileSystemActionListener,
    FileViewer, FolderPicker, InputOutcome, InputPrompt, Navigator, PickOutcome, PickerRequest,
};

/// Read one line from stdin without blocking the runtime. `None` on EOF or error.
async fn read_line() -> Option<String> {
    let read = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        let n = std::io::stdin().read_line(&mut line)?;
        Ok::<_, std::io::Error>((n > 0).then_some(line))
    })
    .await;

    match read {
        Ok(Ok(line)) => line.map(|l| l.trim_end_matches(['\r', '\n']).to_string()),
        Ok(Err(error)) => {
            tracing::warn!(%error, "failed to read stdin");
            None
        }
        Err(error) => {
            tracing::warn!(%error, "stdin reader panicked");
            None
        }
    }
}

/// Dialogs on the terminal. `--yes` answers confirmations, `--name` answers
/// name prompts.
pub struct ConsoleDialogs {
    assume_yes: bool,
    name: Option<String>,
}

impl ConsoleDialogs {
    pub fn new(assume_yes: bool, name: Option<String>) -> Self {
        Self { assume_yes, name }
    }
}

impl DialogService for ConsoleDialogs {
    fn confirm<'a>(
        &'a self,
        title: &'a str,
        message: &'a str,
        style: ConfirmStyle,
    ) -> BoxFuture<'a, ConfirmOutcome> {
        Box::pin(async move {
            match style {
                ConfirmStyle::Delete => eprintln!("{title} (destructive)"),
            }
            eprintln!("{message}");
            if self.assume_yes {
                eprintln!("Confirmed by --yes.");
                return ConfirmOutcome::Confirmed;
            }

            eprint!("[y/N] ");
            match read_line().await {
                Some(answer) if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") => {
                    ConfirmOutcome::Confirmed
                }
                _ => ConfirmOutcome::Cancelled,
            }
        })
    }

    fn info(&self, title: &str, message: &str, detail: Option<&str>) {
        eprintln!("{title}: {message}");
        if let Some(detail) = detail {
            println!("{detail}");
        }
    }

    fn error(&self, error: &ServiceError) {
        eprintln!("Error: {error}");
    }

    fn input_text(&self, prompt: InputPrompt) -> BoxFuture<'_, InputOutcome> {
        Box::pin(async move {
            eprintln!("{}: {}", prompt.title, prompt.message);

            if let Some(name) = &self.name {
                if prompt.is_acceptable(name) {
                    return InputOutcome::Accepted(name.clone());
                }
                eprintln!("'{name}' is not an acceptable name.");
                return InputOutcome::Cancelled;
            }

            loop {
                eprint!("[{}] ", prompt.default_value);
                let Some(line) = read_line().await else {
                    return InputOutcome::Cancelled;
                };
                if line.is_empty() {
                    return InputOutcome::Cancelled;
                }
                if prompt.is_acceptable(&line) {
                    return InputOutcome::Accepted(line);
                }
                eprintln!("'{line}' is not an acceptable name.");
            }
        })
    }
}

/// Numbered folder menu over the admissible folders.
pub struct ConsolePicker;

impl FolderPicker for ConsolePicker {
    fn open(&self, request: PickerRequest) -> BoxFuture<'_, PickOutcome> {
        Box::pin(async move {
            let folders = match request.admissible_folders().await {
                Ok(folders) => folders,
                Err(error) => {
                    tracing::warn!(%error, "failed to list folders");
                    return PickOutcome::Cancelled;
                }
            };
            if folders.is_empty() {
                eprintln!("No folder can receive this selection.");
                return PickOutcome::Cancelled;
            }

            eprintln!("{}", request.title);
            eprintln!("{}", request.message);
            for (i, folder) in folders.iter().enumerate() {
                eprintln!("  [{}] {} ({})", i + 1, folder.path, folder.id);
            }
            eprint!("{} to [1-{}], empty to cancel: ", request.action_label, folders.len());

            read_line()
                .await
                .and_then(|line| line.trim().parse::<usize>().ok())
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| folders.get(i).cloned())
                .map_or(PickOutcome::Cancelled, PickOutcome::Selected)
        })
    }
}

/// Prints URLs on stdout.
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn open_download_url(&self, url: &str) {
        println!("{url}");
    }
}

pub struct ConsoleViewer;

impl FileViewer for ConsoleViewer {
    fn open_viewer(&self, file: &File, params: &serde_json::Value) {
        println!("view {} {params}", file.path);
    }
}

/// Writes each published event as one JSON line on stdout.
pub struct JsonEventSink;

impl EventSink for JsonEventSink {
    fn publish(&self, event: &FileSystemEvent) {
        match serde_json::to_string(event) {
            Ok(json) => println!("{json}"),
            Err(error) => tracing::warn!(%error, "failed to serialize event"),
        }
    }
}

pub struct LoggingListener;

impl FileSystemActionListener for LoggingListener {
    fn on_file_system_action(&self, action: Action) {
        tracing::info!(%action, "file system changed");
    }
}
