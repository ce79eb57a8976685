use std::string::FromUtf8Error;

use thiserror::Error;

/// Failure kinds of the ugly URL decoding pipeline, one per stage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecoderError {
    /// None of the carrier parameter names were present in the query.
    #[error("No encoded URL found in parameters")]
    NotFound,

    /// The carrier value was not valid base64, or the bytes were not UTF-8.
    #[error("Failed to decode URL: {0}")]
    Decode(String),

    /// Decoding worked but the result failed the redirect safety checks.
    /// Deliberately carries no copy of the rejected URL.
    #[error("Invalid or potentially dangerous URL")]
    InvalidUrl,
}

impl From<base64::DecodeError> for DecoderError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<FromUtf8Error> for DecoderError {
    fn from(err: FromUtf8Error) -> Self {
        Self::Decode(err.to_string())
    }
}
