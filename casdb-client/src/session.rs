//! Session core: handshake state machine, single-flight action discipline,
//! and the data-plane operations.

use crate::cache::QueryCache;
use crate::config::SessionConfig;
use crate::error::{ClientError, StateError};
use crate::event::SessionEvent;
use crate::handle::{QueryHandle, QueryResult};
use crate::transport::Transport;
use bytes::Bytes;
use casdb_protocol::{
    AckResponse, BatchExecuteRequest, BatchExecuteResponse, BrokerInfo, CasInfo,
    ClientInfoRequest, ClientInfoResponse, CloseDatabaseRequest, CloseQueryRequest, CommitRequest,
    EngineVersionResponse, ExecuteQueryRequest, ExecuteQueryResponse, FetchRequest, FetchResponse,
    Frame, GetEngineVersionRequest, OpenDatabaseRequest, OpenDatabaseResponse, ResultPage,
    RollbackRequest, SetAutoCommitRequest, CAS_INFO_SIZE, DEFAULT_FETCH_SIZE,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

/// Capacity of the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle of a session.
///
/// Replaces the connection-open / connection-pending / query-pending flag
/// triple of older drivers, so that at most one pending phase can exist by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    RendezvousPending,
    LoginPending,
    Idle,
    QueryPending,
    Closing,
}

struct Inner {
    state: SessionState,
    transport: Option<Transport>,
    cas_info: [u8; CAS_INFO_SIZE],
    broker_info: Option<BrokerInfo>,
    session_id: i32,
    auto_commit: bool,
    handles: Vec<QueryHandle>,
    cache: Option<QueryCache>,
    connected: Arc<AtomicBool>,
}

impl Inner {
    fn expect_idle(&self) -> Result<(), StateError> {
        match self.state {
            SessionState::Idle => Ok(()),
            SessionState::Closed | SessionState::Closing => Err(StateError::NotConnected),
            SessionState::QueryPending => Err(StateError::QueryAlreadyPending),
            SessionState::RendezvousPending | SessionState::LoginPending => {
                Err(StateError::ConnectAlreadyPending)
            }
        }
    }

    /// Leaves the pending phase unless a terminal error already closed the
    /// session.
    fn finish_op(&mut self) {
        if self.state == SessionState::QueryPending {
            self.state = SessionState::Idle;
        }
    }

    fn teardown(&mut self) {
        self.transport = None;
        self.state = SessionState::Closed;
        self.session_id = 0;
        self.broker_info = None;
        self.handles.clear();
        self.cas_info = CasInfo::INITIAL.bytes();
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Sends one request and awaits its response frame, applying the
    /// query deadline and updating the echoed CAS info token.
    async fn round_trip(
        &mut self,
        request: Bytes,
        min_body: usize,
        timeout: Option<Duration>,
        disconnect_on_timeout: bool,
    ) -> Result<Frame, ClientError> {
        let transport = self.transport.as_mut().ok_or(StateError::NotConnected)?;
        let exchange = transport.round_trip(request, min_body);
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, exchange).await {
                Ok(result) => result,
                Err(_) => {
                    if disconnect_on_timeout {
                        self.teardown();
                    }
                    return Err(ClientError::Timeout);
                }
            },
            None => exchange.await,
        };
        match result {
            Ok(frame) => {
                self.cas_info = frame.cas_info;
                Ok(frame)
            }
            Err(err) => {
                if err.is_terminal() {
                    self.teardown();
                }
                Err(err)
            }
        }
    }
}

async fn with_deadline<T>(
    deadline: Option<tokio::time::Instant>,
    work: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, work)
            .await
            .map_err(|_| ClientError::Timeout)?,
        None => work.await,
    }
}

/// An authenticated session to one broker-fronted database.
///
/// The session owns one socket and runs one operation at a time. Operations
/// taken while another is in flight wait their turn in FIFO order, except
/// `connect` and `query`, which are rejected outright. Every operation
/// reports its outcome through its `Result` and as a [`SessionEvent`].
pub struct Session {
    config: SessionConfig,
    inner: Mutex<Inner>,
    events: broadcast::Sender<SessionEvent>,
    connected: Arc<AtomicBool>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));
        let cache = config.cache_ttl().map(QueryCache::new);
        let inner = Inner {
            state: SessionState::Closed,
            transport: None,
            cas_info: CasInfo::INITIAL.bytes(),
            broker_info: None,
            session_id: 0,
            auto_commit: config.autocommit,
            handles: Vec::new(),
            cache,
            connected: connected.clone(),
        };
        Self {
            config,
            inner: Mutex::new(inner),
            events,
            connected,
        }
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Returns whether the handshake has completed and the session is open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    pub async fn session_id(&self) -> i32 {
        self.inner.lock().await.session_id
    }

    pub async fn broker_info(&self) -> Option<BrokerInfo> {
        self.inner.lock().await.broker_info
    }

    pub async fn auto_commit(&self) -> bool {
        self.inner.lock().await.auto_commit
    }

    pub async fn open_handle_count(&self) -> usize {
        self.inner.lock().await.handles.len()
    }

    // =========================================================================
    // Connection lifecycle
    // =========================================================================

    /// Performs the broker rendezvous and database login.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let mut inner = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                let err: ClientError = StateError::ConnectAlreadyPending.into();
                self.emit_error(&err);
                return Err(err);
            }
        };
        match self.connect_locked(&mut inner).await {
            Ok(session_id) => {
                self.emit(SessionEvent::Connect { session_id });
                Ok(())
            }
            Err(err) => {
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Connecting through a URL is not supported yet.
    pub async fn connect_with_url(&self, _url: &str) -> Result<(), ClientError> {
        let err = ClientError::NotImplemented("connect with URL");
        self.emit_error(&err);
        Err(err)
    }

    /// Closes all open query handles (best effort), tells the broker the
    /// session is over and destroys the socket.
    pub async fn close(&self) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Closed {
            return Ok(());
        }
        inner.state = SessionState::Closing;

        let handles: Vec<i32> = inner.handles.iter().map(|h| h.id()).collect();
        for handle in handles {
            let request = CloseQueryRequest { handle }.encode(inner.cas_info);
            if let Err(err) = self.ack_round_trip(&mut inner, request).await {
                tracing::warn!("failed to close query handle {}: {}", handle, err);
                if err.is_terminal() {
                    break;
                }
            }
        }

        if inner.transport.is_some() {
            let request = CloseDatabaseRequest.encode(inner.cas_info);
            if let Err(err) = self.ack_round_trip(&mut inner, request).await {
                tracing::warn!("close database failed: {}", err);
            }
        }

        if let Some(mut transport) = inner.transport.take() {
            transport.shutdown().await;
        }
        inner.teardown();
        self.emit(SessionEvent::Close);
        Ok(())
    }

    async fn connect_locked(&self, inner: &mut Inner) -> Result<i32, ClientError> {
        if inner.state != SessionState::Closed {
            return Err(StateError::AlreadyConnected.into());
        }
        let mut retries_left = self.config.max_connection_retry_count;
        loop {
            match self.handshake(inner).await {
                Ok(session_id) => {
                    inner.connected.store(true, Ordering::SeqCst);
                    return Ok(session_id);
                }
                Err(err) => {
                    inner.teardown();
                    if matches!(err, ClientError::Transport(_)) && retries_left > 0 {
                        retries_left -= 1;
                        tracing::debug!("handshake failed, retrying: {}", err);
                    } else {
                        return Err(err);
                    }
                }
            }
        }
    }

    async fn handshake(&self, inner: &mut Inner) -> Result<i32, ClientError> {
        let config = &self.config;
        let deadline = config
            .login_timeout
            .map(|limit| tokio::time::Instant::now() + limit);
        let cas_echo = inner.cas_info;

        inner.state = SessionState::RendezvousPending;
        let port = with_deadline(deadline, async {
            tracing::debug!("rendezvous with broker {}:{}", config.host, config.port);
            let mut rendezvous = Transport::connect(&config.host, config.port, None).await?;
            let frame = rendezvous
                .round_trip(
                    ClientInfoRequest.encode(cas_echo),
                    ClientInfoResponse::MIN_BODY,
                )
                .await?;
            let info = ClientInfoResponse::decode(&frame)??;
            // The rendezvous socket is done; the session continues on the
            // assigned port.
            Ok(if info.port > 0 {
                info.port as u16
            } else {
                config.port
            })
        })
        .await?;

        inner.state = SessionState::LoginPending;
        let (transport, cas_info, open) = with_deadline(deadline, async {
            tracing::debug!("opening database {:?} on port {}", config.database, port);
            let mut transport = Transport::connect(&config.host, port, None).await?;
            let request = OpenDatabaseRequest {
                database: &config.database,
                user: &config.user,
                password: &config.password,
            }
            .encode(cas_echo);
            let frame = transport
                .round_trip(request, OpenDatabaseResponse::MIN_BODY)
                .await?;
            let cas_info = frame.cas_info;
            let open = OpenDatabaseResponse::decode(&frame)??;
            Ok((transport, cas_info, open))
        })
        .await?;

        inner.transport = Some(transport);
        inner.cas_info = cas_info;
        // The returned token carries the authoritative auto-commit state.
        inner.auto_commit = CasInfo::from_bytes(cas_info).auto_commit();
        inner.broker_info = Some(open.broker_info);
        inner.session_id = open.session_id;
        inner.state = SessionState::Idle;
        tracing::debug!("session {} open", open.session_id);
        Ok(open.session_id)
    }

    // =========================================================================
    // Queries and result streaming
    // =========================================================================

    /// Executes a SQL statement and returns its first page.
    ///
    /// With the cache enabled, a fresh entry for the exact SQL text is
    /// returned instead of a round trip; such a result carries no handle.
    pub async fn query(&self, sql: &str) -> Result<QueryResult, ClientError> {
        if sql.trim().is_empty() {
            let err = ClientError::Validation("empty SQL text".to_string());
            self.emit_error(&err);
            return Err(err);
        }
        let mut inner = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                let err: ClientError = StateError::QueryAlreadyPending.into();
                self.emit_error(&err);
                return Err(err);
            }
        };
        match self.query_locked(&mut inner, sql).await {
            Ok(result) => {
                self.emit(SessionEvent::QueryData {
                    result: result.clone(),
                });
                Ok(result)
            }
            Err(err) => {
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Fetches the next page for an open handle.
    ///
    /// Returns `None` once every tuple has been consumed; nothing is sent
    /// on the wire in that case.
    pub async fn fetch(&self, handle: i32) -> Result<Option<ResultPage>, ClientError> {
        let mut inner = self.inner.lock().await;
        match self.fetch_locked(&mut inner, handle).await {
            Ok(Some(page)) => {
                self.emit(SessionEvent::Fetch {
                    handle,
                    page: page.clone(),
                });
                Ok(Some(page))
            }
            Ok(None) => {
                self.emit(SessionEvent::FetchDone { handle });
                Ok(None)
            }
            Err(err) => {
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Releases a server-side result set.
    pub async fn close_query(&self, handle: i32) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().await;
        match self.close_query_locked(&mut inner, handle).await {
            Ok(()) => {
                self.emit(SessionEvent::CloseQuery { handle });
                Ok(())
            }
            Err(err) => {
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Runs a batch of non-query statements; returns per-statement
    /// affected-row counts.
    pub async fn batch_execute(&self, sqls: &[&str]) -> Result<Vec<i32>, ClientError> {
        if sqls.is_empty() {
            let err = ClientError::Validation("empty statement batch".to_string());
            self.emit_error(&err);
            return Err(err);
        }
        if sqls.iter().any(|sql| sql.trim().is_empty()) {
            let err = ClientError::Validation("empty SQL text in batch".to_string());
            self.emit_error(&err);
            return Err(err);
        }
        let mut inner = self.inner.lock().await;
        match self.batch_execute_locked(&mut inner, sqls).await {
            Ok(affected) => {
                self.emit(SessionEvent::BatchExecuteDone {
                    affected: affected.clone(),
                });
                Ok(affected)
            }
            Err(err) => {
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Asks the broker for the database engine version.
    pub async fn get_engine_version(&self) -> Result<String, ClientError> {
        let mut inner = self.inner.lock().await;
        match self.engine_version_locked(&mut inner).await {
            Ok(version) => {
                self.emit(SessionEvent::EngineVersion(version.clone()));
                Ok(version)
            }
            Err(err) => {
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Schema introspection is not supported yet.
    pub async fn get_schema(&self) -> Result<(), ClientError> {
        let err = ClientError::NotImplemented("schema introspection");
        self.emit_error(&err);
        Err(err)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Switches the server-side auto-commit mode. A no-op when the session
    /// is already in the requested mode.
    pub async fn set_auto_commit_mode(&self, on: bool) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().await;
        match self.set_mode_locked(&mut inner, on).await {
            Ok(()) => {
                self.emit(SessionEvent::SetAutoCommitMode(on));
                Ok(())
            }
            Err(err) => {
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Opens a transaction by switching auto-commit off.
    pub async fn begin_transaction(&self) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().await;
        match self.set_mode_locked(&mut inner, false).await {
            Ok(()) => {
                self.emit(SessionEvent::BeginTransaction);
                Ok(())
            }
            Err(err) => {
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Commits the open transaction. A benign no-op with auto-commit on.
    pub async fn commit(&self) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().await;
        let request = CommitRequest.encode(inner.cas_info);
        match self.end_tran_locked(&mut inner, request).await {
            Ok(()) => {
                self.emit(SessionEvent::Commit);
                Ok(())
            }
            Err(err) => {
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Rolls back the open transaction. A benign no-op with auto-commit on.
    pub async fn rollback(&self) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().await;
        let request = RollbackRequest.encode(inner.cas_info);
        match self.end_tran_locked(&mut inner, request).await {
            Ok(()) => {
                self.emit(SessionEvent::Rollback);
                Ok(())
            }
            Err(err) => {
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    // =========================================================================
    // Locked operation bodies
    // =========================================================================

    async fn query_locked(
        &self,
        inner: &mut Inner,
        sql: &str,
    ) -> Result<QueryResult, ClientError> {
        inner.expect_idle()?;

        if let Some(cache) = inner.cache.as_mut() {
            if let Some(hit) = cache.lookup(sql) {
                tracing::debug!("cache hit, answering without a round trip");
                return Ok(hit);
            }
        }

        inner.state = SessionState::QueryPending;
        let request = ExecuteQueryRequest {
            sql,
            auto_commit: inner.auto_commit,
        }
        .encode(inner.cas_info);
        let result = async {
            let frame = inner
                .round_trip(
                    request,
                    ExecuteQueryResponse::MIN_BODY,
                    self.config.query_timeout,
                    self.config.disconnect_on_query_timeout,
                )
                .await?;
            let resp = ExecuteQueryResponse::decode(&frame)??;
            Ok::<_, ClientError>(resp)
        }
        .await;
        inner.finish_op();
        let resp = result?;

        // The server may reuse a handle id released earlier; the list keeps
        // one record per id.
        inner.handles.retain(|h| h.id() != resp.handle);
        inner.handles.push(QueryHandle::new(
            resp.handle,
            resp.total_rows,
            resp.columns.clone(),
            resp.first_page.clone(),
        ));

        let result = QueryResult {
            handle: Some(resp.handle),
            total_rows: resp.total_rows,
            columns: resp.columns,
            page: resp.first_page,
        };
        if let Some(cache) = inner.cache.as_mut() {
            cache.insert(sql, &result);
        }
        Ok(result)
    }

    async fn fetch_locked(
        &self,
        inner: &mut Inner,
        handle: i32,
    ) -> Result<Option<ResultPage>, ClientError> {
        inner.expect_idle()?;
        let idx = inner
            .handles
            .iter()
            .position(|h| h.id() == handle)
            .ok_or(StateError::NoActiveQuery(handle))?;
        if inner.handles[idx].exhausted() {
            tracing::debug!("handle {} exhausted, end of stream", handle);
            return Ok(None);
        }

        inner.state = SessionState::QueryPending;
        let request = FetchRequest {
            handle,
            start_row: inner.handles[idx].next_start_row(),
            fetch_size: DEFAULT_FETCH_SIZE,
            case_sensitive: false,
            result_set_index: 0,
        }
        .encode(inner.cas_info);
        let column_count = inner.handles[idx].columns().len();
        let result = async {
            let frame = inner
                .round_trip(
                    request,
                    FetchResponse::MIN_BODY,
                    self.config.query_timeout,
                    self.config.disconnect_on_query_timeout,
                )
                .await?;
            let resp = FetchResponse::decode(&frame, column_count)??;
            Ok::<_, ClientError>(resp)
        }
        .await;
        inner.finish_op();
        let resp = result?;

        inner.handles[idx].advance(resp.page.clone());
        Ok(Some(resp.page))
    }

    async fn close_query_locked(
        &self,
        inner: &mut Inner,
        handle: i32,
    ) -> Result<(), ClientError> {
        inner.expect_idle()?;
        if !inner.handles.iter().any(|h| h.id() == handle) {
            tracing::debug!("close for unknown query handle {}", handle);
            return Ok(());
        }

        inner.state = SessionState::QueryPending;
        let request = CloseQueryRequest { handle }.encode(inner.cas_info);
        let result = self.ack_round_trip(inner, request).await;
        inner.finish_op();
        result?;

        // Removed only once the broker acknowledged the close.
        inner.handles.retain(|h| h.id() != handle);
        Ok(())
    }

    async fn batch_execute_locked(
        &self,
        inner: &mut Inner,
        sqls: &[&str],
    ) -> Result<Vec<i32>, ClientError> {
        inner.expect_idle()?;
        inner.state = SessionState::QueryPending;
        let request = BatchExecuteRequest {
            sqls,
            auto_commit: inner.auto_commit,
        }
        .encode(inner.cas_info);
        let result = async {
            let frame = inner
                .round_trip(
                    request,
                    BatchExecuteResponse::MIN_BODY,
                    self.config.query_timeout,
                    self.config.disconnect_on_query_timeout,
                )
                .await?;
            let resp = BatchExecuteResponse::decode(&frame)??;
            Ok::<_, ClientError>(resp)
        }
        .await;
        inner.finish_op();
        Ok(result?.affected)
    }

    async fn engine_version_locked(&self, inner: &mut Inner) -> Result<String, ClientError> {
        inner.expect_idle()?;
        inner.state = SessionState::QueryPending;
        let request = GetEngineVersionRequest.encode(inner.cas_info);
        let result = async {
            let frame = inner
                .round_trip(
                    request,
                    EngineVersionResponse::MIN_BODY,
                    self.config.query_timeout,
                    self.config.disconnect_on_query_timeout,
                )
                .await?;
            let resp = EngineVersionResponse::decode(&frame)??;
            Ok::<_, ClientError>(resp)
        }
        .await;
        inner.finish_op();
        Ok(result?.version)
    }

    async fn set_mode_locked(&self, inner: &mut Inner, on: bool) -> Result<(), ClientError> {
        inner.expect_idle()?;
        if inner.auto_commit == on {
            tracing::debug!("auto-commit already {}, nothing to send", on);
            return Ok(());
        }
        inner.state = SessionState::QueryPending;
        let request = SetAutoCommitRequest { enabled: on }.encode(inner.cas_info);
        let result = self.ack_round_trip(inner, request).await;
        inner.finish_op();
        result?;
        inner.auto_commit = on;
        Ok(())
    }

    async fn end_tran_locked(&self, inner: &mut Inner, request: Bytes) -> Result<(), ClientError> {
        inner.expect_idle()?;
        if inner.auto_commit {
            tracing::debug!("auto-commit on, transaction boundary is a no-op");
            return Ok(());
        }
        inner.state = SessionState::QueryPending;
        let result = self.ack_round_trip(inner, request).await;
        inner.finish_op();
        result
    }

    async fn ack_round_trip(&self, inner: &mut Inner, request: Bytes) -> Result<(), ClientError> {
        let frame = inner
            .round_trip(
                request,
                AckResponse::MIN_BODY,
                self.config.query_timeout,
                self.config.disconnect_on_query_timeout,
            )
            .await?;
        AckResponse::decode(&frame)??;
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    fn emit(&self, event: SessionEvent) {
        let name = event.name();
        if self.events.send(event).is_err() {
            tracing::debug!("no subscribers for {} event", name);
        }
    }

    fn emit_error(&self, err: &ClientError) {
        let event = SessionEvent::Error {
            message: err.to_string(),
        };
        if self.events.send(event).is_err() {
            // Unobserved errors are logged, never fatal for the host.
            tracing::warn!("unhandled session error: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_closed() {
        let session = Session::new(SessionConfig::new());
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_data_plane_ops_require_connection() {
        let session = Session::new(SessionConfig::new());

        let err = session.query("SELECT 1").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::State(StateError::NotConnected)
        ));

        let err = session.fetch(1).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::State(StateError::NotConnected)
        ));

        let err = session.commit().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::State(StateError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_empty_sql_rejected_before_wire() {
        let session = Session::new(SessionConfig::new());
        let err = session.query("   ").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let err = session.batch_execute(&[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unimplemented_surfaces() {
        let session = Session::new(SessionConfig::new());
        assert!(matches!(
            session.connect_with_url("cas://x").await.unwrap_err(),
            ClientError::NotImplemented(_)
        ));
        assert!(matches!(
            session.get_schema().await.unwrap_err(),
            ClientError::NotImplemented(_)
        ));
    }

    #[tokio::test]
    async fn test_failures_emit_error_events() {
        let session = Session::new(SessionConfig::new());
        let mut events = session.subscribe();

        let _ = session.query("SELECT 1").await;
        let event = events.recv().await.unwrap();
        assert_eq!(event.name(), "error");

        let _ = session.connect_with_url("cas://x").await;
        let event = events.recv().await.unwrap();
        assert_eq!(event.name(), "error");
    }

    #[tokio::test]
    async fn test_close_on_closed_session_is_quiet() {
        let session = Session::new(SessionConfig::new());
        let mut events = session.subscribe();
        session.close().await.unwrap();
        assert!(events.try_recv().is_err());
    }
}
