//! Messages exchanged with compression workers.
//!
//! The JSON shape is kept stable so the same messages can cross a process
//! or FFI boundary:
//!
//! ```text
//! request: { "id": 3, "payload": { "data": "...", "requestType": "compress" } }
//! reply:   { "id": 3, "err": null, "payload": "..." }
//! ```

use crate::codec;
use crate::error::CompressionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a compression request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Compress,
    Decompress,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestType::Compress => write!(f, "compress"),
            RequestType::Decompress => write!(f, "decompress"),
        }
    }
}

/// Body of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub data: String,
    pub request_type: RequestType,
}

/// A request tagged with its correlation id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub id: u64,
    pub payload: RequestPayload,
}

impl WorkerRequest {
    pub fn new(id: u64, request_type: RequestType, data: String) -> Self {
        Self {
            id,
            payload: RequestPayload { data, request_type },
        }
    }

    /// Run the codec for this request and build the matching reply.
    pub fn process(&self) -> WorkerReply {
        let result = match self.payload.request_type {
            RequestType::Compress => codec::compress(&self.payload.data),
            RequestType::Decompress => codec::decompress(&self.payload.data),
        };
        WorkerReply::from_result(self.id, result)
    }
}

/// Reply to a request. At most one of `err` and `payload` is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReply {
    pub id: u64,
    pub err: Option<String>,
    pub payload: Option<String>,
}

impl WorkerReply {
    pub fn success(id: u64, payload: String) -> Self {
        Self {
            id,
            err: None,
            payload: Some(payload),
        }
    }

    pub fn failure(id: u64, err: impl Into<String>) -> Self {
        Self {
            id,
            err: Some(err.into()),
            payload: None,
        }
    }

    pub fn from_result(id: u64, result: Result<String, CompressionError>) -> Self {
        match result {
            Ok(payload) => Self::success(id, payload),
            Err(e) => Self::failure(id, e.to_string()),
        }
    }

    /// Interpret the reply. A reply with neither field set is "got nothing".
    pub fn into_result(self) -> Result<String, CompressionError> {
        match (self.payload, self.err) {
            (Some(payload), _) => Ok(payload),
            (None, Some(err)) if !err.is_empty() => Err(CompressionError::Worker(err)),
            (None, _) => Err(CompressionError::GotNothing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = WorkerRequest::new(3, RequestType::Decompress, "eJw=".to_string());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({ "id": 3, "payload": { "data": "eJw=", "requestType": "decompress" } })
        );
    }

    #[test]
    fn test_reply_parses_from_wire() {
        let reply: WorkerReply =
            serde_json::from_value(json!({ "id": 9, "err": "Not a string", "payload": null }))
                .unwrap();
        assert_eq!(reply, WorkerReply::failure(9, "Not a string"));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(
            WorkerReply::success(1, "abc".into()).into_result(),
            Ok("abc".to_string())
        );
        assert_eq!(
            WorkerReply::success(1, String::new()).into_result(),
            Ok(String::new())
        );
        assert_eq!(
            WorkerReply::failure(1, "boom").into_result(),
            Err(CompressionError::Worker("boom".to_string()))
        );

        let empty = WorkerReply {
            id: 1,
            err: None,
            payload: None,
        };
        assert_eq!(empty.into_result(), Err(CompressionError::GotNothing));

        let blank_error = WorkerReply {
            id: 1,
            err: Some(String::new()),
            payload: None,
        };
        assert_eq!(blank_error.into_result(), Err(CompressionError::GotNothing));
    }

    #[test]
    fn test_process_round_trip() {
        let compressed = WorkerRequest::new(1, RequestType::Compress, "slot data".into())
            .process()
            .into_result()
            .unwrap();
        let restored = WorkerRequest::new(2, RequestType::Decompress, compressed)
            .process();
        assert_eq!(restored.id, 2);
        assert_eq!(restored.into_result(), Ok("slot data".to_string()));
    }

    #[test]
    fn test_process_reports_malformed_input() {
        let reply = WorkerRequest::new(5, RequestType::Decompress, "%%%".into()).process();
        assert!(reply.payload.is_none());
        assert!(reply.err.unwrap().contains("Malformed"));
    }
}
