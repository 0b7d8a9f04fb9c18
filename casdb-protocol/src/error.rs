//! Protocol error types and the CAS error-code table.

use thiserror::Error;

/// Errors raised while framing or decoding wire data.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: u32, max: u32 },

    #[error("negative length field: {0}")]
    NegativeLength(i32),

    #[error("truncated frame: need {needed} more bytes")]
    Truncated { needed: usize },

    #[error("missing string terminator")]
    UnterminatedString,

    #[error("negative count field: {0}")]
    NegativeCount(i32),
}

/// An error returned by the broker: a negative response code followed by an
/// error code and message tail.
///
/// When the broker sends an empty message, the text is resolved from the
/// CAS error-code table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("server error {code}: {message}")]
pub struct ServerError {
    pub code: i32,
    pub message: String,
}

impl ServerError {
    /// Builds a server error from the wire tail, resolving empty messages
    /// through the error-code table.
    pub fn from_wire(code: i32, raw_message: &[u8]) -> Self {
        let message = if raw_message.is_empty() {
            match cas_error_message(code) {
                Some(text) => text.to_string(),
                None => format!("unknown error code {code}"),
            }
        } else {
            String::from_utf8_lossy(raw_message).into_owned()
        };
        Self { code, message }
    }
}

/// Resolves a CAS error code to its symbolic name.
///
/// These codes are part of the protocol contract and must remain stable.
pub fn cas_error_message(code: i32) -> Option<&'static str> {
    Some(match code {
        -1000 => "CAS_ER_DBMS",
        -1001 => "CAS_ER_INTERNAL",
        -1002 => "CAS_ER_NO_MORE_MEMORY",
        -1003 => "CAS_ER_COMMUNICATION",
        -1004 => "CAS_ER_ARGS",
        -1005 => "CAS_ER_TRAN_TYPE",
        -1006 => "CAS_ER_SRV_HANDLE",
        -1007 => "CAS_ER_NUM_BIND",
        -1008 => "CAS_ER_UNKNOWN_U_TYPE",
        -1009 => "CAS_ER_DB_VALUE",
        -1010 => "CAS_ER_TYPE_CONVERSION",
        -1011 => "CAS_ER_PARAM_NAME",
        -1012 => "CAS_ER_NO_MORE_DATA",
        -1013 => "CAS_ER_OBJECT",
        -1014 => "CAS_ER_OPEN_FILE",
        -1015 => "CAS_ER_SCHEMA_TYPE",
        -1016 => "CAS_ER_VERSION",
        -1017 => "CAS_ER_FREE_SERVER",
        -1018 => "CAS_ER_NOT_AUTHORIZED_CLIENT",
        -1019 => "CAS_ER_QUERY_CANCEL",
        -1020 => "CAS_ER_NOT_COLLECTION",
        -1021 => "CAS_ER_COLLECTION_DOMAIN",
        -1022 => "CAS_ER_NO_MORE_RESULT_SET",
        -1023 => "CAS_ER_INVALID_CALL_STMT",
        -1024 => "CAS_ER_STMT_POOLING",
        -1025 => "CAS_ER_DBSERVER_DISCONNECTED",
        -1100 => "CAS_ER_NOT_IMPLEMENTED",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_error_codes() {
        assert_eq!(cas_error_message(-1012), Some("CAS_ER_NO_MORE_DATA"));
        assert_eq!(cas_error_message(-1000), Some("CAS_ER_DBMS"));
        assert_eq!(cas_error_message(-1100), Some("CAS_ER_NOT_IMPLEMENTED"));
        assert_eq!(cas_error_message(-999), None);
        assert_eq!(cas_error_message(0), None);
    }

    #[test]
    fn test_empty_message_resolved_from_table() {
        let err = ServerError::from_wire(-1012, b"");
        assert_eq!(err.code, -1012);
        assert_eq!(err.message, "CAS_ER_NO_MORE_DATA");
    }

    #[test]
    fn test_explicit_message_kept() {
        let err = ServerError::from_wire(-1000, b"syntax error near 'FORM'");
        assert_eq!(err.message, "syntax error near 'FORM'");
    }

    #[test]
    fn test_unknown_code_with_empty_message() {
        let err = ServerError::from_wire(-42, b"");
        assert_eq!(err.message, "unknown error code -42");
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError::from_wire(-1012, b"");
        assert_eq!(
            err.to_string(),
            "server error -1012: CAS_ER_NO_MORE_DATA"
        );
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::Truncated { needed: 3 };
        assert!(err.to_string().contains("3"));

        let err = ProtocolError::FrameTooLarge {
            size: 100,
            max: 50,
        };
        assert!(err.to_string().contains("100"));

        let err = ProtocolError::NegativeLength(-7);
        assert!(err.to_string().contains("-7"));
    }
}
