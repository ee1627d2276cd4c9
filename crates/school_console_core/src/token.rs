//! crates/school_console_core/src/token.rs
//!
//! The bearer-token codec. Tokens are three dot-separated segments; the
//! middle segment is a URL-safe-base64 JSON object carrying the claims.
//! Decoding is a pure computation — persistence and state transitions are
//! the session store's job.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};

use crate::domain::Claims;

/// URL-safe base64, tolerant of both padded and unpadded payloads. Issuers
/// differ on padding and both must decode.
const PAYLOAD_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why a token failed to decode. All variants are terminal: a token that
/// fails here is treated as expired (fail-closed) by every caller.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token does not have three dot-separated segments")]
    SegmentCount,

    #[error("claims segment is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("claims segment is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Not a JSON object, or missing/invalid `exp`, `role`, or `user_id`.
    #[error("claims segment is not a valid claims object: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Decodes the claims embedded in `token`.
///
/// The payload bytes are reinterpreted as UTF-8 text before JSON parsing so
/// that multi-byte characters in embedded names (e.g. a Cyrillic school
/// name) survive intact.
pub fn decode(token: &str) -> Result<Claims, TokenError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => return Err(TokenError::SegmentCount),
    };
    let bytes = PAYLOAD_B64.decode(payload)?;
    let text = String::from_utf8(bytes)?;
    let claims: Claims = serde_json::from_str(&text)?;
    Ok(claims)
}

/// Whether `token` is expired at `now`.
///
/// An undecodable token is expired (fail-closed). The comparison is a
/// strict `exp < now`: a token whose `exp` equals the current second is
/// still accepted.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match decode(token) {
        Ok(claims) => claims.exp < now.timestamp(),
        Err(_) => true,
    }
}
