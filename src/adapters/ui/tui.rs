//! Implements InputPort. Inquire-based chat list and results views.

use super::html::ResultsDocument;
use super::{Answer, answer, open_link, print_error, print_info, print_styled, print_title, print_warning};
use crate::domain::{BlockOutcome, Conversation, ConversationKind, DomainError, ResultBlock};
use crate::ports::{ChatBackend, InputPort};
use crate::usecases::{SummarizationPipeline, SummarizationRun};
use async_trait::async_trait;
use crossterm::style::Color;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::ui::{Color as PromptColor, RenderConfig, Styled};
use inquire::{MultiSelect, Select};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const ANALYZE: &str = "ANALYZE";
const UPDATE: &str = "UPDATE LIST";
const QUIT: &str = "QUIT";
const BACK: &str = "BACK";
const OPEN_IN_BROWSER: &str = "OPEN IN BROWSER";

/// Blue prompts and green checkboxes for every inquire prompt.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("›").with_fg(PromptColor::LightBlue))
        .with_highlighted_option_prefix(Styled::new("➤").with_fg(PromptColor::LightBlue))
        .with_selected_checkbox(Styled::new("[x]").with_fg(PromptColor::LightGreen))
        .with_unselected_checkbox(Styled::new("[ ]").with_fg(PromptColor::DarkGrey));
    inquire::set_global_render_config(config);
}

fn kind_icon(kind: ConversationKind) -> &'static str {
    match kind {
        ConversationKind::Direct => "👤",
        ConversationKind::Group => "👥",
        ConversationKind::Broadcast => "📢",
    }
}

/// Checkable list entry: `<icon> <name> (+<unread>)`.
struct ChatEntry(Conversation);

impl fmt::Display for ChatEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (+{})",
            kind_icon(self.0.kind),
            self.0.title,
            self.0.unread_count
        )
    }
}

/// Status line under the list header.
fn list_status(count: usize) -> String {
    if count == 0 {
        "No unread messages.".to_string()
    } else {
        format!("Active chats: {}", count)
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    backend: Arc<dyn ChatBackend>,
    pipeline: SummarizationPipeline,
    dialog_limit: usize,
    data_dir: PathBuf,
}

impl TuiInputPort {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        pipeline: SummarizationPipeline,
        dialog_limit: usize,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend,
            pipeline,
            dialog_limit,
            data_dir: data_dir.into(),
        }
    }

    /// Fetch the list; on failure show the error and an empty list.
    async fn load_chats(&self) -> Vec<Conversation> {
        print_title("Your Chats");
        print_info("Updating dialogs...");
        match self.backend.list_unread_conversations(self.dialog_limit).await {
            Ok(chats) => {
                print_info(&list_status(chats.len()));
                chats
            }
            Err(e) => {
                print_error(&e.to_string());
                print_info("Load error");
                Vec::new()
            }
        }
    }

    /// Ask which chats to analyze. Empty when there is nothing to pick or the user backed out.
    fn select_chats(&self, chats: &[Conversation]) -> Result<Vec<Conversation>, DomainError> {
        if chats.is_empty() {
            return Ok(Vec::new());
        }
        let entries: Vec<ChatEntry> = chats.iter().cloned().map(ChatEntry).collect();
        let picked = MultiSelect::new("Select chats to analyze:", entries)
            .with_page_size(15)
            .prompt();
        Ok(match answer(picked)? {
            Answer::Value(picked) => picked.into_iter().map(|e| e.0).collect(),
            Answer::Cancelled | Answer::Quit => Vec::new(),
        })
    }

    /// Results view: progress bar plus blocks as they arrive.
    async fn show_results(&self, mut run: SummarizationRun<'_>) -> Result<(), DomainError> {
        let bar = ProgressBar::new(run.total() as u64);
        let style = ProgressStyle::with_template("{bar:30.green/black} {pos}/{len} {msg}")
            .map_err(|e| DomainError::Ui(e.to_string()))?;
        bar.set_style(style);

        let mut document = ResultsDocument::new();
        loop {
            if let Some(upcoming) = run.upcoming() {
                bar.set_message(format!("Analysis: {}...", upcoming.title));
            }
            let Some(block) = run.next().await else {
                break;
            };
            bar.suspend(|| print_block(&block));
            document.push(&block);
            bar.set_position(run.completed() as u64);
        }
        bar.finish_with_message("Done!");

        loop {
            let choice = Select::new("Results:", vec![BACK, OPEN_IN_BROWSER]).prompt();
            match answer(choice)? {
                Answer::Value(OPEN_IN_BROWSER) => self.open_document(&document).await,
                _ => return Ok(()),
            }
        }
    }

    /// Write the page to `<data_dir>/results.html` (overwritten) and open it.
    async fn open_document(&self, document: &ResultsDocument) {
        let path = self.data_dir.join("results.html");
        let written = async {
            tokio::fs::create_dir_all(&self.data_dir).await?;
            tokio::fs::write(&path, document.to_html()).await
        };
        match written.await {
            Ok(()) => {
                info!(path = %path.display(), blocks = document.len(), "results page written");
                open_link(&path.display().to_string());
            }
            Err(e) => print_error(&format!("Could not write {}: {}", path.display(), e)),
        }
    }
}

fn print_block(block: &ResultBlock) {
    let c = &block.conversation;
    match &block.outcome {
        BlockOutcome::Summary { text } => {
            print_styled(
                &format!("{} (+{})", c.title, c.unread_count),
                Color::Rgb { r: 0x4d, g: 0xa6, b: 0xff },
                true,
            );
            println!("{}\n", text.trim());
        }
        BlockOutcome::Unavailable { notice } => {
            print_styled(
                &format!("{} (+{})", c.title, c.unread_count),
                Color::Rgb { r: 0x4d, g: 0xa6, b: 0xff },
                true,
            );
            print_error(notice);
            println!();
        }
        BlockOutcome::Failed { error } => {
            print_error(&format!("Error with {}: {}", c.title, error));
            println!();
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let mut chats = self.load_chats().await;
        loop {
            let action = Select::new("Action:", vec![ANALYZE, UPDATE, QUIT]).prompt();
            let action = match answer(action)? {
                Answer::Value(a) => a,
                Answer::Cancelled => continue,
                Answer::Quit => return Ok(()),
            };
            match action {
                UPDATE => chats = self.load_chats().await,
                ANALYZE => {
                    let selected = self.select_chats(&chats)?;
                    match self.pipeline.run(selected) {
                        Ok(run) => {
                            self.show_results(run).await?;
                            print_title("Your Chats");
                            print_info(&list_status(chats.len()));
                        }
                        Err(DomainError::NothingSelected) => {
                            print_warning(&format!("Oops! {}", DomainError::NothingSelected))
                        }
                        Err(e) => return Err(e),
                    }
                }
                _ => return Ok(()),
            }
        }
    }
}
