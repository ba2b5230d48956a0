//! Executor envelope → client envelope
//!
//! The executor answers `{"results": {"A": {"status": 200, "frames": [...]}}}`.
//! Clients get `{"results": [...]}` with the frames untouched.

use serde_json::{Value, json};
use thiserror::Error;

use crate::core::constants::EXECUTOR_REF_ID;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("executor response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Frames of the single sub-query; missing or malformed paths yield none
pub fn extract_frames(body: &[u8]) -> Result<Vec<Value>, NormalizeError> {
    let mut raw: Value = serde_json::from_slice(body)?;
    let pointer = format!("/results/{}/frames", EXECUTOR_REF_ID);

    match raw.pointer_mut(&pointer).map(Value::take) {
        Some(Value::Array(frames)) => Ok(frames),
        _ => Ok(Vec::new()),
    }
}

/// Wrap the frames as `{"results": frames}`
pub fn normalize_response(body: &[u8]) -> Result<Value, NormalizeError> {
    Ok(json!({ "results": extract_frames(body)? }))
}
