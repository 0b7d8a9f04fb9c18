//! Session events.
//!
//! Every operation reports its outcome both through its `Result` and as an
//! event on the session's broadcast channel, in completion order. The
//! string identifiers returned by [`SessionEvent::name`] are part of the
//! compatibility contract.

use crate::handle::QueryResult;
use casdb_protocol::ResultPage;

/// An event emitted by a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// An operation failed.
    Error { message: String },
    /// The handshake completed and the session is usable.
    Connect { session_id: i32 },
    /// Engine version retrieved.
    EngineVersion(String),
    /// A non-query batch finished; per-statement affected-row counts.
    BatchExecuteDone { affected: Vec<i32> },
    /// A query produced its first page.
    QueryData { result: QueryResult },
    /// A fetch produced another page.
    Fetch { handle: i32, page: ResultPage },
    /// A fetch found the result set exhausted.
    FetchDone { handle: i32 },
    /// A transaction was opened (auto-commit switched off).
    BeginTransaction,
    /// The auto-commit mode changed (or was confirmed).
    SetAutoCommitMode(bool),
    /// A commit completed.
    Commit,
    /// A rollback completed.
    Rollback,
    /// A query handle was closed.
    CloseQuery { handle: i32 },
    /// The session closed.
    Close,
}

impl SessionEvent {
    /// The stable string identifier for this event.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Error { .. } => "error",
            SessionEvent::Connect { .. } => "connect",
            SessionEvent::EngineVersion(_) => "engine version",
            SessionEvent::BatchExecuteDone { .. } => "batch execute done",
            SessionEvent::QueryData { .. } => "query data",
            SessionEvent::Fetch { .. } => "fetch",
            SessionEvent::FetchDone { .. } => "fetch done",
            SessionEvent::BeginTransaction => "begin transaction",
            SessionEvent::SetAutoCommitMode(_) => "set autocommit mode",
            SessionEvent::Commit => "commit",
            SessionEvent::Rollback => "rollback",
            SessionEvent::CloseQuery { .. } => "close query",
            SessionEvent::Close => "close",
        }
    }
}
