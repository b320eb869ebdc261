//! Response envelopes
//!
//! Field names are capitalised on the wire (`Message`, `Data`).

use serde::Serialize;

/// Plain message envelope for mutation results and validation errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    #[serde(rename = "Message")]
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Message envelope carrying read results
#[derive(Debug, Clone, Serialize)]
pub struct MessageData<T> {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Data")]
    pub data: T,
}

impl<T> MessageData<T> {
    pub fn success(data: T) -> Self {
        Self {
            message: "success".to_string(),
            data,
        }
    }
}
