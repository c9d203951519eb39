//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: the interactive front end drives the use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Chat list / analysis loop. Returns when the user quits.
    async fn run(&self) -> Result<(), DomainError>;
}
