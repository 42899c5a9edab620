//! The `{code, message, data}` wrapper every non-binary API response uses.
//!
//! `code == 200` is business success whatever the HTTP status was; any other
//! code is a business failure described by `message`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FALLBACK_BUSINESS_MESSAGE};

pub const SUCCESS_CODE: i64 = 200;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T = serde_json::Value> {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    /// Missing `data` decodes like an explicit null.
    #[serde(default)]
    pub data: T,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { code: SUCCESS_CODE, message: Some("success".to_owned()), data }
    }

    /// Unwrap the payload, or turn a non-200 code into [`ApiError::Business`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Business`] when `code` is not 200.
    pub fn into_result(self) -> Result<T, ApiError> {
        if self.code == SUCCESS_CODE {
            return Ok(self.data);
        }
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_BUSINESS_MESSAGE.to_owned());
        Err(ApiError::Business { code: self.code, message })
    }
}

/// Decode an envelope body and extract its typed payload.
///
/// The body is first checked as an untyped envelope so a business error with
/// a payload that does not match `T` still reports the server's message.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] for malformed bodies and
/// [`ApiError::Business`] for non-200 codes.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let raw: Envelope<serde_json::Value> =
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    let data = raw.into_result()?;
    serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
