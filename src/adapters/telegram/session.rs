//! Session management. Open the grammers session and start a client on it.
//!
//! Uses grammers-session's SqliteSession for persistent file-based storage so
//! authorization is preserved across application restarts.

use crate::domain::DomainError;
use grammers_client::Client;
use grammers_session::storages::SqliteSession;
use std::path::Path;
use std::sync::Arc;

/// Opens a persistent session storage at the given path.
///
/// The file is created if it does not exist. Parent directories are created as needed.
pub async fn open_file_session(path: impl AsRef<Path>) -> Result<SqliteSession, DomainError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::Io(format!("create session directory: {}", e)))?;
    }
    SqliteSession::open(path)
        .await
        .map_err(|e| DomainError::Io(format!("open session file: {}", e)))
}

/// Create a grammers Client over the session at `session_path`.
///
/// The sender pool runner is spawned on the current runtime; it lives as long
/// as the client handle.
pub async fn start_client(session_path: &Path, api_id: i32) -> Result<Client, DomainError> {
    let session = Arc::new(open_file_session(session_path).await?);
    let pool = grammers_client::SenderPool::new(session, api_id);
    let handle = pool.handle.clone();
    tokio::spawn(async move {
        pool.runner.run().await;
    });
    Ok(Client::new(handle))
}
