//! Application use cases. Orchestrate domain logic via ports.

pub mod auth_flow;
pub mod prompt;
pub mod summarization;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_flow::{AuthError, AuthFlow, AuthState, StepView};
pub use summarization::{SummarizationPipeline, SummarizationRun};
