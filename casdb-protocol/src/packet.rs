//! Request encoders and response decoders, one pair per broker operation.
//!
//! Every request body starts with a function code byte after the CAS info
//! echo. Every response body starts with a signed response code; a negative
//! code is followed by the error tail (error code + null-terminated
//! message) instead of the per-packet fields.

use crate::error::{ProtocolError, ServerError};
use crate::frame::{Frame, FrameCursor, FrameWriter};
use crate::{CAS_INFO_SIZE, CLIENT_MAGIC, CLIENT_VERSION, CREDENTIAL_FIELD_SIZE};
use bytes::Bytes;

/// Function codes selecting the server-side operation.
///
/// The numeric values are fixed by the broker protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FuncCode {
    ClientInfo = 0,
    OpenDatabase = 1,
    GetEngineVersion = 2,
    ExecuteQuery = 3,
    ExecuteBatch = 4,
    Fetch = 5,
    CloseQuery = 6,
    CloseDatabase = 7,
    Commit = 8,
    Rollback = 9,
    SetAutoCommit = 10,
}

impl FuncCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => FuncCode::ClientInfo,
            1 => FuncCode::OpenDatabase,
            2 => FuncCode::GetEngineVersion,
            3 => FuncCode::ExecuteQuery,
            4 => FuncCode::ExecuteBatch,
            5 => FuncCode::Fetch,
            6 => FuncCode::CloseQuery,
            7 => FuncCode::CloseDatabase,
            8 => FuncCode::Commit,
            9 => FuncCode::Rollback,
            10 => FuncCode::SetAutoCommit,
            _ => return None,
        })
    }
}

/// The 4-byte session token echoed on every frame.
///
/// The server returns a fresh token on the open-database response; bit 0 of
/// byte 3 of a returned token carries the server-side auto-commit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasInfo([u8; CAS_INFO_SIZE]);

impl CasInfo {
    /// Token sent before the server has assigned one.
    pub const INITIAL: CasInfo = CasInfo([0x00, 0xFF, 0xFF, 0xFF]);

    pub const fn from_bytes(bytes: [u8; CAS_INFO_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; CAS_INFO_SIZE] {
        self.0
    }

    pub fn auto_commit(&self) -> bool {
        self.0[3] & 0x01 != 0
    }
}

/// The 8-byte broker descriptor returned at handshake end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerInfo([u8; 8]);

impl BrokerInfo {
    pub const SIZE: usize = 8;

    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 8] {
        self.0
    }

    /// DBMS type code.
    pub fn dbms_type(&self) -> u8 {
        self.0[0]
    }

    /// Whether the broker polls statements.
    pub fn statement_pooling(&self) -> bool {
        self.0[2] != 0
    }

    /// Protocol version (low 7 bits of byte 4).
    pub fn protocol_version(&self) -> u8 {
        self.0[4] & 0x7F
    }
}

/// Per-column metadata from an execute response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub type_code: u8,
    pub scale: i32,
    pub precision: i32,
    pub name: String,
}

/// One tuple: per-column raw values, `None` for SQL NULL.
///
/// Value typing beyond raw bytes is the type-conversion collaborator's
/// concern.
pub type Row = Vec<Option<Bytes>>;

/// One decoded page of tuples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    pub rows: Vec<Row>,
}

impl ResultPage {
    pub fn tuple_count(&self) -> usize {
        self.rows.len()
    }
}

// ============================================================================
// Shared decode helpers
// ============================================================================

/// Reads the common response tail. Returns the cursor positioned after the
/// response code on success, or the decoded server error.
fn begin_decode(frame: &Frame) -> Result<Result<FrameCursor<'_>, ServerError>, ProtocolError> {
    let mut cur = frame.cursor();
    let code = cur.read_int()?;
    if code < 0 {
        return Ok(Err(read_server_error(&mut cur)?));
    }
    Ok(Ok(cur))
}

fn read_server_error(cur: &mut FrameCursor<'_>) -> Result<ServerError, ProtocolError> {
    let code = cur.read_int()?;
    let message = if cur.remaining() == 0 {
        &[][..]
    } else {
        match cur.read_cstr() {
            Ok(msg) => msg,
            // Terminator lost to an under-declared length; take what's there.
            Err(ProtocolError::UnterminatedString) => cur.take_remaining(),
            Err(other) => return Err(other),
        }
    };
    Ok(ServerError::from_wire(code, message))
}

fn read_columns(cur: &mut FrameCursor<'_>) -> Result<Vec<ColumnMeta>, ProtocolError> {
    let count = cur.read_int()?;
    if count < 0 {
        return Err(ProtocolError::NegativeCount(count));
    }
    let mut columns = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let type_code = cur.read_byte()?;
        let scale = cur.read_int()?;
        let precision = cur.read_int()?;
        let name = String::from_utf8_lossy(cur.read_cstr()?).into_owned();
        columns.push(ColumnMeta {
            type_code,
            scale,
            precision,
            name,
        });
    }
    Ok(columns)
}

fn read_page(cur: &mut FrameCursor<'_>, column_count: usize) -> Result<ResultPage, ProtocolError> {
    let count = cur.read_int()?;
    if count < 0 {
        return Err(ProtocolError::NegativeCount(count));
    }
    let mut rows = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut row = Vec::with_capacity(column_count);
        for _ in 0..column_count {
            let len = cur.read_int()?;
            if len < 0 {
                row.push(None);
            } else {
                row.push(Some(Bytes::copy_from_slice(cur.read_blob(len as usize)?)));
            }
        }
        rows.push(row);
    }
    Ok(ResultPage { rows })
}

// ============================================================================
// Client info exchange (broker rendezvous)
// ============================================================================

/// Rendezvous request: magic and client id payload.
#[derive(Debug, Clone, Copy)]
pub struct ClientInfoRequest;

impl ClientInfoRequest {
    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::ClientInfo as u8);
        w.write_bytes(&CLIENT_MAGIC);
        w.write_bytes(&CLIENT_VERSION);
        w.finish(cas_info)
    }
}

/// Rendezvous response: the port assigned for the session connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientInfoResponse {
    pub port: i32,
}

impl ClientInfoResponse {
    pub const MIN_BODY: usize = 8;

    pub fn decode(frame: &Frame) -> Result<Result<Self, ServerError>, ProtocolError> {
        let mut cur = match begin_decode(frame)? {
            Ok(cur) => cur,
            Err(err) => return Ok(Err(err)),
        };
        let port = cur.read_int()?;
        Ok(Ok(Self { port }))
    }
}

// ============================================================================
// Open database
// ============================================================================

/// Authenticate and bind to a database.
#[derive(Debug, Clone)]
pub struct OpenDatabaseRequest<'a> {
    pub database: &'a str,
    pub user: &'a str,
    pub password: &'a str,
}

impl OpenDatabaseRequest<'_> {
    /// Extended-info filler after the credential fields.
    const EXTENDED_INFO_SIZE: usize = 512;
    /// Reserved trailer.
    const RESERVED_SIZE: usize = 20;

    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::OpenDatabase as u8);
        w.write_fixed_str(self.database, CREDENTIAL_FIELD_SIZE);
        w.write_fixed_str(self.user, CREDENTIAL_FIELD_SIZE);
        w.write_fixed_str(self.password, CREDENTIAL_FIELD_SIZE);
        w.write_filler(Self::EXTENDED_INFO_SIZE, 0);
        w.write_filler(Self::RESERVED_SIZE, 0);
        w.finish(cas_info)
    }
}

/// Open-database response. The fresh CAS info token is the frame prefix
/// itself and is taken from [`Frame::cas_info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenDatabaseResponse {
    pub broker_info: BrokerInfo,
    pub session_id: i32,
}

impl OpenDatabaseResponse {
    pub const MIN_BODY: usize = 4 + BrokerInfo::SIZE + 4;

    pub fn decode(frame: &Frame) -> Result<Result<Self, ServerError>, ProtocolError> {
        let mut cur = match begin_decode(frame)? {
            Ok(cur) => cur,
            Err(err) => return Ok(Err(err)),
        };
        let broker_raw: [u8; 8] = cur.read_blob(BrokerInfo::SIZE)?.try_into().unwrap();
        let session_id = cur.read_int()?;
        Ok(Ok(Self {
            broker_info: BrokerInfo::from_bytes(broker_raw),
            session_id,
        }))
    }
}

// ============================================================================
// Get engine version
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct GetEngineVersionRequest;

impl GetEngineVersionRequest {
    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::GetEngineVersion as u8);
        w.finish(cas_info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVersionResponse {
    pub version: String,
}

impl EngineVersionResponse {
    pub const MIN_BODY: usize = 5;

    pub fn decode(frame: &Frame) -> Result<Result<Self, ServerError>, ProtocolError> {
        let mut cur = match begin_decode(frame)? {
            Ok(cur) => cur,
            Err(err) => return Ok(Err(err)),
        };
        let version = String::from_utf8_lossy(cur.read_cstr()?).into_owned();
        Ok(Ok(Self { version }))
    }
}

// ============================================================================
// Execute query
// ============================================================================

#[derive(Debug, Clone)]
pub struct ExecuteQueryRequest<'a> {
    pub sql: &'a str,
    pub auto_commit: bool,
}

impl ExecuteQueryRequest<'_> {
    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::ExecuteQuery as u8);
        w.write_int(self.sql.len() as i32);
        w.write_bytes(self.sql.as_bytes());
        w.write_byte(self.auto_commit as u8);
        // Statement flags, unused by this client.
        w.write_filler(2, 0);
        w.finish(cas_info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteQueryResponse {
    pub handle: i32,
    pub total_rows: i32,
    pub columns: Vec<ColumnMeta>,
    pub first_page: ResultPage,
}

impl ExecuteQueryResponse {
    pub const MIN_BODY: usize = 16;

    pub fn decode(frame: &Frame) -> Result<Result<Self, ServerError>, ProtocolError> {
        let mut cur = match begin_decode(frame)? {
            Ok(cur) => cur,
            Err(err) => return Ok(Err(err)),
        };
        let handle = cur.read_int()?;
        let total_rows = cur.read_int()?;
        let columns = read_columns(&mut cur)?;
        let first_page = read_page(&mut cur, columns.len())?;
        Ok(Ok(Self {
            handle,
            total_rows,
            columns,
            first_page,
        }))
    }
}

// ============================================================================
// Batch execute (no row results)
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchExecuteRequest<'a> {
    pub sqls: &'a [&'a str],
    pub auto_commit: bool,
}

impl BatchExecuteRequest<'_> {
    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::ExecuteBatch as u8);
        w.write_int(self.sqls.len() as i32);
        for sql in self.sqls {
            w.write_int(sql.len() as i32);
            w.write_bytes(sql.as_bytes());
        }
        w.write_byte(self.auto_commit as u8);
        w.finish(cas_info)
    }
}

/// Per-statement affected-row counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchExecuteResponse {
    pub affected: Vec<i32>,
}

impl BatchExecuteResponse {
    pub const MIN_BODY: usize = 8;

    pub fn decode(frame: &Frame) -> Result<Result<Self, ServerError>, ProtocolError> {
        let mut cur = match begin_decode(frame)? {
            Ok(cur) => cur,
            Err(err) => return Ok(Err(err)),
        };
        let count = cur.read_int()?;
        if count < 0 {
            return Err(ProtocolError::NegativeCount(count));
        }
        let mut affected = Vec::with_capacity(count as usize);
        for _ in 0..count {
            affected.push(cur.read_int()?);
        }
        Ok(Ok(Self { affected }))
    }
}

// ============================================================================
// Fetch
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct FetchRequest {
    pub handle: i32,
    /// First row of the requested page, 1-based.
    pub start_row: i32,
    pub fetch_size: i32,
    pub case_sensitive: bool,
    pub result_set_index: i32,
}

impl FetchRequest {
    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::Fetch as u8);
        w.write_int(self.handle);
        w.write_int(self.start_row);
        w.write_int(self.fetch_size);
        w.write_byte(self.case_sensitive as u8);
        w.write_int(self.result_set_index);
        w.finish(cas_info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub page: ResultPage,
}

impl FetchResponse {
    pub const MIN_BODY: usize = 8;

    /// Decodes a fetch page. The column count comes from the handle the
    /// fetch was issued for.
    pub fn decode(
        frame: &Frame,
        column_count: usize,
    ) -> Result<Result<Self, ServerError>, ProtocolError> {
        let mut cur = match begin_decode(frame)? {
            Ok(cur) => cur,
            Err(err) => return Ok(Err(err)),
        };
        let page = read_page(&mut cur, column_count)?;
        Ok(Ok(Self { page }))
    }
}

// ============================================================================
// Close query / transaction control / close database
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct CloseQueryRequest {
    pub handle: i32,
}

impl CloseQueryRequest {
    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::CloseQuery as u8);
        w.write_int(self.handle);
        w.finish(cas_info)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SetAutoCommitRequest {
    pub enabled: bool,
}

impl SetAutoCommitRequest {
    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::SetAutoCommit as u8);
        w.write_byte(self.enabled as u8);
        w.finish(cas_info)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommitRequest;

impl CommitRequest {
    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::Commit as u8);
        w.finish(cas_info)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RollbackRequest;

impl RollbackRequest {
    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::Rollback as u8);
        w.finish(cas_info)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CloseDatabaseRequest;

impl CloseDatabaseRequest {
    pub fn encode(&self, cas_info: [u8; CAS_INFO_SIZE]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_byte(FuncCode::CloseDatabase as u8);
        w.finish(cas_info)
    }
}

/// Bare acknowledgement: close query, set auto-commit, commit, rollback and
/// close database all answer with the response code alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckResponse;

impl AckResponse {
    pub const MIN_BODY: usize = 4;

    pub fn decode(frame: &Frame) -> Result<Result<Self, ServerError>, ProtocolError> {
        match begin_decode(frame)? {
            Ok(_) => Ok(Ok(Self)),
            Err(err) => Ok(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameReader;

    const CAS: [u8; 4] = [0x00, 0xFF, 0xFF, 0xFF];

    fn frame_from(bytes: &[u8], min_body: usize) -> Frame {
        let mut r = FrameReader::new();
        r.extend(bytes);
        r.take_frame(min_body).unwrap().unwrap()
    }

    #[test]
    fn test_func_code_values() {
        assert_eq!(FuncCode::ClientInfo as u8, 0);
        assert_eq!(FuncCode::OpenDatabase as u8, 1);
        assert_eq!(FuncCode::ExecuteQuery as u8, 3);
        assert_eq!(FuncCode::CloseDatabase as u8, 7);
        assert_eq!(FuncCode::SetAutoCommit as u8, 10);
        assert_eq!(FuncCode::from_u8(7), Some(FuncCode::CloseDatabase));
        assert_eq!(FuncCode::from_u8(11), None);
    }

    #[test]
    fn test_cas_info_auto_commit_bit() {
        assert!(CasInfo::INITIAL.auto_commit());
        assert!(!CasInfo::from_bytes([0, 0xFF, 0xFF, 0xFE]).auto_commit());
        assert!(CasInfo::from_bytes([0, 0, 0, 0x01]).auto_commit());
    }

    #[test]
    fn test_broker_info_accessors() {
        let info = BrokerInfo::from_bytes([5, 0, 1, 0, 0x85, 0, 0, 0]);
        assert_eq!(info.dbms_type(), 5);
        assert!(info.statement_pooling());
        assert_eq!(info.protocol_version(), 5);
    }

    #[test]
    fn test_close_database_request_literal() {
        // Length 1, initial CAS info, close-database function code.
        let encoded = CloseDatabaseRequest.encode(CAS);
        assert_eq!(
            &encoded[..],
            &[0x00, 0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0x07]
        );
    }

    #[test]
    fn test_close_database_response_literal() {
        // Acknowledgement declaring length 0 while carrying the 4-byte code.
        let bytes = [
            0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00,
        ];
        let frame = frame_from(&bytes, AckResponse::MIN_BODY);
        assert!(AckResponse::decode(&frame).unwrap().is_ok());
    }

    #[test]
    fn test_open_database_request_layout() {
        let req = OpenDatabaseRequest {
            database: "manager_master",
            user: "nsight",
            password: "ns0)3#ht",
        };
        let encoded = req.encode(CAS);
        // fc + 3 credential fields + extended info + reserved trailer
        assert_eq!(encoded.len(), 8 + 1 + 96 + 512 + 20);

        let frame = frame_from(&encoded, 0);
        let mut cur = frame.cursor();
        assert_eq!(cur.read_byte().unwrap(), FuncCode::OpenDatabase as u8);
        assert_eq!(cur.read_fixed_str(32).unwrap(), b"manager_master");
        assert_eq!(cur.read_fixed_str(32).unwrap(), b"nsight");
        assert_eq!(cur.read_fixed_str(32).unwrap(), b"ns0)3#ht");
        assert_eq!(cur.remaining(), 532);
    }

    #[test]
    fn test_open_database_response_literal() {
        let bytes = [
            0x00, 0x00, 0x00, 0x0F, // declared length
            0x00, 0xFF, 0xFF, 0xFF, // fresh CAS info
            0x00, 0x00, 0x00, 0x00, // response code
            0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, 0x05, // broker info
            0x00, 0x00, 0x00, 0x03, // session id
        ];
        let frame = frame_from(&bytes, OpenDatabaseResponse::MIN_BODY);
        assert_eq!(frame.cas_info, [0, 255, 255, 255]);

        let resp = OpenDatabaseResponse::decode(&frame).unwrap().unwrap();
        assert_eq!(resp.broker_info.dbms_type(), 5);
        assert_eq!(resp.broker_info.protocol_version(), 5);
        assert_eq!(resp.session_id, 3);
    }

    #[test]
    fn test_error_tail_with_empty_message() {
        let mut w = FrameWriter::new();
        w.write_int(-1);
        w.write_int(-1012);
        w.write_cstr("");
        let frame = frame_from(&w.finish(CAS), AckResponse::MIN_BODY);

        let err = AckResponse::decode(&frame).unwrap().unwrap_err();
        assert_eq!(err.code, -1012);
        assert_eq!(err.message, "CAS_ER_NO_MORE_DATA");
    }

    #[test]
    fn test_error_tail_without_message_bytes() {
        let mut w = FrameWriter::new();
        w.write_int(-1);
        w.write_int(-1003);
        let frame = frame_from(&w.finish(CAS), ExecuteQueryResponse::MIN_BODY);

        let err = ExecuteQueryResponse::decode(&frame).unwrap().unwrap_err();
        assert_eq!(err.code, -1003);
        assert_eq!(err.message, "CAS_ER_COMMUNICATION");
    }

    #[test]
    fn test_client_info_roundtrip() {
        let encoded = ClientInfoRequest.encode(CAS);
        let frame = frame_from(&encoded, 0);
        let mut cur = frame.cursor();
        assert_eq!(cur.read_byte().unwrap(), FuncCode::ClientInfo as u8);
        assert_eq!(cur.read_blob(4).unwrap(), &CLIENT_MAGIC);
        assert_eq!(cur.read_blob(4).unwrap(), &CLIENT_VERSION);
        assert_eq!(cur.remaining(), 0);

        let mut w = FrameWriter::new();
        w.write_int(0);
        w.write_int(35000);
        let frame = frame_from(&w.finish(CAS), ClientInfoResponse::MIN_BODY);
        let resp = ClientInfoResponse::decode(&frame).unwrap().unwrap();
        assert_eq!(resp.port, 35000);
    }

    #[test]
    fn test_execute_query_request_layout() {
        let req = ExecuteQueryRequest {
            sql: "SELECT 1",
            auto_commit: true,
        };
        let frame = frame_from(&req.encode(CAS), 0);
        let mut cur = frame.cursor();
        assert_eq!(cur.read_byte().unwrap(), FuncCode::ExecuteQuery as u8);
        let len = cur.read_int().unwrap();
        assert_eq!(len, 8);
        assert_eq!(cur.read_blob(8).unwrap(), b"SELECT 1");
        assert_eq!(cur.read_byte().unwrap(), 1);
    }

    fn execute_response_frame(handle: i32, total: i32, rows: &[&[&str]]) -> Bytes {
        let mut w = FrameWriter::new();
        w.write_int(0);
        w.write_int(handle);
        w.write_int(total);
        w.write_int(2); // column count
        for name in ["id", "name"] {
            w.write_byte(1);
            w.write_int(0);
            w.write_int(10);
            w.write_cstr(name);
        }
        w.write_int(rows.len() as i32);
        for row in rows {
            for value in *row {
                w.write_int(value.len() as i32);
                w.write_bytes(value.as_bytes());
            }
        }
        w.finish(CAS)
    }

    #[test]
    fn test_execute_query_response_roundtrip() {
        let encoded = execute_response_frame(42, 250, &[&["1", "ada"], &["2", "brin"]]);
        let frame = frame_from(&encoded, ExecuteQueryResponse::MIN_BODY);
        let resp = ExecuteQueryResponse::decode(&frame).unwrap().unwrap();

        assert_eq!(resp.handle, 42);
        assert_eq!(resp.total_rows, 250);
        assert_eq!(resp.columns.len(), 2);
        assert_eq!(resp.columns[0].name, "id");
        assert_eq!(resp.columns[1].name, "name");
        assert_eq!(resp.first_page.tuple_count(), 2);
        assert_eq!(
            resp.first_page.rows[1][1],
            Some(Bytes::from_static(b"brin"))
        );
    }

    #[test]
    fn test_fetch_request_layout() {
        let req = FetchRequest {
            handle: 42,
            start_row: 101,
            fetch_size: 100,
            case_sensitive: false,
            result_set_index: 0,
        };
        let frame = frame_from(&req.encode(CAS), 0);
        let mut cur = frame.cursor();
        assert_eq!(cur.read_byte().unwrap(), FuncCode::Fetch as u8);
        assert_eq!(cur.read_int().unwrap(), 42);
        assert_eq!(cur.read_int().unwrap(), 101);
        assert_eq!(cur.read_int().unwrap(), 100);
        assert_eq!(cur.read_byte().unwrap(), 0);
        assert_eq!(cur.read_int().unwrap(), 0);
    }

    #[test]
    fn test_fetch_response_with_nulls() {
        let mut w = FrameWriter::new();
        w.write_int(0);
        w.write_int(1); // tuple count
        w.write_int(3);
        w.write_bytes(b"abc");
        w.write_int(-1); // SQL NULL
        let frame = frame_from(&w.finish(CAS), FetchResponse::MIN_BODY);

        let resp = FetchResponse::decode(&frame, 2).unwrap().unwrap();
        assert_eq!(resp.page.tuple_count(), 1);
        assert_eq!(resp.page.rows[0][0], Some(Bytes::from_static(b"abc")));
        assert_eq!(resp.page.rows[0][1], None);
    }

    #[test]
    fn test_batch_execute_roundtrip() {
        let req = BatchExecuteRequest {
            sqls: &["INSERT INTO t VALUES (1)", "DELETE FROM t"],
            auto_commit: false,
        };
        let frame = frame_from(&req.encode(CAS), 0);
        let mut cur = frame.cursor();
        assert_eq!(cur.read_byte().unwrap(), FuncCode::ExecuteBatch as u8);
        assert_eq!(cur.read_int().unwrap(), 2);

        let mut w = FrameWriter::new();
        w.write_int(0);
        w.write_int(2);
        w.write_int(1);
        w.write_int(4);
        let frame = frame_from(&w.finish(CAS), BatchExecuteResponse::MIN_BODY);
        let resp = BatchExecuteResponse::decode(&frame).unwrap().unwrap();
        assert_eq!(resp.affected, vec![1, 4]);
    }

    #[test]
    fn test_engine_version_response() {
        let mut w = FrameWriter::new();
        w.write_int(0);
        w.write_cstr("10.2.0.8851");
        let frame = frame_from(&w.finish(CAS), EngineVersionResponse::MIN_BODY);
        let resp = EngineVersionResponse::decode(&frame).unwrap().unwrap();
        assert_eq!(resp.version, "10.2.0.8851");
    }

    #[test]
    fn test_set_auto_commit_request() {
        let frame = frame_from(&SetAutoCommitRequest { enabled: true }.encode(CAS), 0);
        let mut cur = frame.cursor();
        assert_eq!(cur.read_byte().unwrap(), FuncCode::SetAutoCommit as u8);
        assert_eq!(cur.read_byte().unwrap(), 1);
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_transaction_requests_are_bare_function_codes() {
        for (encoded, fc) in [
            (CommitRequest.encode(CAS), FuncCode::Commit),
            (RollbackRequest.encode(CAS), FuncCode::Rollback),
        ] {
            let frame = frame_from(&encoded, 0);
            assert_eq!(frame.body.len(), 1);
            assert_eq!(frame.body[0], fc as u8);
        }
    }

    #[test]
    fn test_truncated_execute_response() {
        let mut w = FrameWriter::new();
        w.write_int(0);
        w.write_int(42);
        let frame = frame_from(&w.finish(CAS), 0);
        assert!(matches!(
            ExecuteQueryResponse::decode(&frame),
            Err(ProtocolError::Truncated { .. })
        ));
    }
}
