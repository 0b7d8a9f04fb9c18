//! # casdb-protocol
//!
//! Wire protocol implementation for the CAS broker (Common Application
//! Server) family.
//!
//! This crate provides:
//! - Length-prefixed binary framing with the 4-byte CAS info echo
//! - Request encoders and response decoders for every broker operation
//! - The CAS error-code table and protocol constants
//!
//! The codec is pure: it performs no I/O, all multi-byte integers are
//! big-endian, and strings are raw bytes (no charset transcoding).

pub mod error;
pub mod frame;
pub mod packet;

pub use error::{cas_error_message, ProtocolError, ServerError};
pub use frame::{Frame, FrameCursor, FrameReader, FrameWriter};
pub use packet::{
    AckResponse, BatchExecuteRequest, BatchExecuteResponse, BrokerInfo, CasInfo,
    ClientInfoRequest, ClientInfoResponse, CloseDatabaseRequest, CloseQueryRequest, ColumnMeta,
    CommitRequest, EngineVersionResponse, ExecuteQueryRequest, ExecuteQueryResponse, FetchRequest,
    FetchResponse, FuncCode, GetEngineVersionRequest, OpenDatabaseRequest, OpenDatabaseResponse,
    ResultPage, RollbackRequest, Row, SetAutoCommitRequest,
};

/// Default broker rendezvous port.
pub const DEFAULT_BROKER_PORT: u16 = 33000;

/// Size of the CAS info token carried on every frame.
pub const CAS_INFO_SIZE: usize = 4;

/// Size of the fixed frame prefix: 4-byte body length + CAS info.
pub const FRAME_PREFIX_SIZE: usize = 4 + CAS_INFO_SIZE;

/// Maximum frame body size (16 MiB).
pub const MAX_BODY_SIZE: u32 = 16 * 1024 * 1024;

/// Default number of tuples requested per fetch.
pub const DEFAULT_FETCH_SIZE: i32 = 100;

/// Magic bytes identifying this client during broker rendezvous.
pub const CLIENT_MAGIC: [u8; 4] = *b"CASB";

/// Client id bytes sent after the magic during rendezvous.
pub const CLIENT_VERSION: [u8; 4] = [0, 1, 0, 0];

/// Fixed width of the database, user and password fields in the
/// open-database request.
pub const CREDENTIAL_FIELD_SIZE: usize = 32;
