//! Summarization pipeline. Fetch history -> build prompt -> summarize -> render, per chat.
//!
//! Chats are processed strictly one after another in selection order. Each
//! one yields exactly one `ResultBlock`; a failure only affects its own block.

use crate::adapters::ui::html;
use crate::domain::{BlockOutcome, Conversation, DomainError, ResultBlock};
use crate::ports::{ChatBackend, SummarizerPort};
use crate::usecases::prompt::build_prompt;
use std::sync::Arc;
use std::vec::IntoIter;
use tracing::{info, warn};

pub struct SummarizationPipeline {
    backend: Arc<dyn ChatBackend>,
    summarizer: Arc<dyn SummarizerPort>,
    /// Already-read messages fetched in front of the unread ones.
    context_messages: u32,
}

impl SummarizationPipeline {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        summarizer: Arc<dyn SummarizerPort>,
        context_messages: u32,
    ) -> Self {
        Self {
            backend,
            summarizer,
            context_messages,
        }
    }

    /// Start a run over `selection`. Chats without unread messages are dropped.
    ///
    /// Fails with `NothingSelected` before any network call if nothing is left.
    pub fn run(&self, selection: Vec<Conversation>) -> Result<SummarizationRun<'_>, DomainError> {
        let eligible: Vec<Conversation> =
            selection.into_iter().filter(|c| c.is_eligible()).collect();
        if eligible.is_empty() {
            return Err(DomainError::NothingSelected);
        }
        info!(chats = eligible.len(), "starting summarization run");
        Ok(SummarizationRun {
            pipeline: self,
            total: eligible.len(),
            completed: 0,
            pending: eligible.into_iter(),
        })
    }

    /// Process one chat. Never fails: errors become the block's content.
    async fn process(&self, conversation: Conversation) -> ResultBlock {
        let history = match self
            .backend
            .fetch_history(&conversation, self.context_messages)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                warn!(chat_id = conversation.id, error = %e, "history fetch failed");
                let error = e.to_string();
                return ResultBlock {
                    html: html::error_block(&conversation, &error),
                    conversation,
                    outcome: BlockOutcome::Failed { error },
                };
            }
        };

        info!(
            chat_id = conversation.id,
            new = history.new_messages.len(),
            context = history.old_messages.len(),
            "summarizing chat"
        );
        let prompt = build_prompt(&conversation.title, &history);

        let (outcome, body) = match self.summarizer.summarize(&prompt).await {
            Ok(text) => {
                let body = html::render_markdown(&text);
                (BlockOutcome::Summary { text }, body)
            }
            Err(e) => {
                let notice = e.to_string();
                let body = html::render_notice(&notice);
                (BlockOutcome::Unavailable { notice }, body)
            }
        };
        ResultBlock {
            html: html::conversation_card(&conversation, &body),
            conversation,
            outcome,
        }
    }
}

/// One pass over the selected chats. Finite; once drained it stays drained.
pub struct SummarizationRun<'a> {
    pipeline: &'a SummarizationPipeline,
    pending: IntoIter<Conversation>,
    total: usize,
    completed: usize,
}

impl SummarizationRun<'_> {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Chat that the next call to `next` will process.
    pub fn upcoming(&self) -> Option<&Conversation> {
        self.pending.as_slice().first()
    }

    /// Process the next chat and return its block, or `None` when done.
    pub async fn next(&mut self) -> Option<ResultBlock> {
        let conversation = self.pending.next()?;
        let block = self.pipeline.process(conversation).await;
        self.completed += 1;
        info!(
            completed = self.completed,
            total = self.total,
            failed = block.is_error(),
            "chat processed"
        );
        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SummaryError;
    use crate::usecases::test_support::{
        conversation, history, ScriptedBackend, ScriptedSummarizer,
    };

    fn pipeline(
        backend: Arc<ScriptedBackend>,
        summarizer: Arc<ScriptedSummarizer>,
    ) -> SummarizationPipeline {
        SummarizationPipeline::new(backend, summarizer, 30)
    }

    #[tokio::test]
    async fn empty_selection_is_rejected_without_calls() {
        let backend = Arc::new(ScriptedBackend::default());
        let p = pipeline(backend.clone(), Arc::new(ScriptedSummarizer::ok()));
        assert!(matches!(p.run(Vec::new()), Err(DomainError::NothingSelected)));
        assert!(matches!(
            p.run(vec![conversation(1, "read", 0)]),
            Err(DomainError::NothingSelected)
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn one_fetch_error_still_yields_all_blocks_in_order() {
        let backend = Arc::new(ScriptedBackend::default());
        {
            let mut h = backend.histories.lock().unwrap();
            h.insert(1, history(40));
            h.insert(3, history(5));
        }
        let summarizer = Arc::new(ScriptedSummarizer::ok());
        let p = pipeline(backend.clone(), summarizer.clone());
        let selection = vec![
            conversation(1, "Alpha", 2),
            conversation(2, "Broken", 1),
            conversation(3, "Gamma", 3),
        ];

        let mut run = p.run(selection).unwrap();
        assert_eq!(run.total(), 3);
        assert_eq!(run.upcoming().map(|c| c.id), Some(1));

        let mut blocks = Vec::new();
        while let Some(block) = run.next().await {
            assert_eq!(run.completed(), blocks.len() + 1);
            blocks.push(block);
        }
        assert_eq!(run.completed(), 3);
        assert!(run.next().await.is_none());

        let titles: Vec<&str> = blocks.iter().map(|b| b.conversation.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Broken", "Gamma"]);
        assert_eq!(blocks.iter().filter(|b| b.is_error()).count(), 1);
        assert!(blocks[1].is_error());
        assert!(blocks[1].html.contains("Error with Broken"));
        assert!(blocks[0].html.contains("<strong>Summary</strong>"));
        assert_eq!(*backend.fetched.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(summarizer.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn prompt_contains_context_and_new_messages() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.histories.lock().unwrap().insert(1, history(40));
        let summarizer = Arc::new(ScriptedSummarizer::ok());
        let p = pipeline(backend, summarizer.clone());

        let mut run = p.run(vec![conversation(1, "Alpha", 2)]).unwrap();
        run.next().await.unwrap();

        let prompts = summarizer.prompts.lock().unwrap();
        let prompt = &prompts[0];
        // window = 2 unread + 30 context: ids 9..=40, new are 39 and 40
        assert!(prompt.contains("chat 'Alpha'"));
        assert!(!prompt.contains("[ID:8] "));
        let new_section = prompt.split("--- NEW MESSAGES").nth(1).unwrap();
        assert!(new_section.contains("[ID:39] Alice: message 39"));
        assert!(new_section.contains("[ID:40] Alice: message 40"));
        assert!(!new_section.contains("[ID:38]"));
    }

    #[tokio::test]
    async fn summarizer_failure_is_shown_inside_the_card() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.histories.lock().unwrap().insert(1, history(3));
        let summarizer = Arc::new(ScriptedSummarizer::failing_on(
            "Alpha",
            SummaryError::Blocked {
                reason: "SAFETY".into(),
            },
        ));
        let p = pipeline(backend, summarizer);

        let mut run = p.run(vec![conversation(1, "Alpha", 1)]).unwrap();
        let block = run.next().await.unwrap();
        assert!(!block.is_error());
        match &block.outcome {
            BlockOutcome::Unavailable { notice } => assert!(notice.contains("SAFETY")),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(block.html.contains("color: #ffcccc"));
        assert!(block.html.contains("(+1)"));
    }
}
