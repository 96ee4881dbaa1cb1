//! QR payload codec.
//!
//! A payload identifies one printed label instance. It is the standard base64
//! encoding (with padding) of `"{template_id}|{sequence_no}|{epoch_millis}"`:
//!
//! ```text
//! (7, 3, 1700000000000) → "7|3|1700000000000" → "N3wzfDE3MDAwMDAwMDAwMDA="
//! ```
//!
//! The output uses the standard alphabet, so `+`, `/` and `=` may appear.
//! [`target_url`] percent-encodes the payload before embedding it in a query
//! string.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::LabelError;

/// Decoded form of a QR payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    pub template_id: u64,
    pub sequence_no: u32,
    pub epoch_millis: i64,
}

impl QrPayload {
    pub fn new(template_id: u64, sequence_no: u32, epoch_millis: i64) -> Self {
        Self {
            template_id,
            sequence_no,
            epoch_millis,
        }
    }

    /// Encode to the base64 payload string.
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}|{}",
            self.template_id, self.sequence_no, self.epoch_millis
        );
        BASE64.encode(raw)
    }

    /// Decode a payload produced by [`QrPayload::encode`].
    pub fn decode(payload: &str) -> Result<Self, LabelError> {
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| LabelError::InvalidPayload(format!("not base64: {}", e)))?;
        let raw = String::from_utf8(bytes)
            .map_err(|_| LabelError::InvalidPayload("not UTF-8".to_string()))?;

        let fields: Vec<&str> = raw.split('|').collect();
        let [template_id, sequence_no, epoch_millis] = fields.as_slice() else {
            return Err(LabelError::InvalidPayload(format!(
                "expected 3 fields, found {}",
                fields.len()
            )));
        };

        Ok(Self {
            template_id: parse_field("template id", template_id)?,
            sequence_no: parse_field("sequence number", sequence_no)?,
            epoch_millis: parse_field("epoch", epoch_millis)?,
        })
    }
}

fn parse_field<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, LabelError> {
    value
        .parse()
        .map_err(|_| LabelError::InvalidPayload(format!("{} is not an integer: {:?}", name, value)))
}

/// Encode a (template, sequence, epoch) triple into a payload string.
pub fn encode(template_id: u64, sequence_no: u32, epoch_millis: i64) -> String {
    QrPayload::new(template_id, sequence_no, epoch_millis).encode()
}

/// Decode a payload string back into its fields.
pub fn decode(payload: &str) -> Result<QrPayload, LabelError> {
    QrPayload::decode(payload)
}

/// The run of identities for one approved template: sequence numbers `1..=quantity`.
pub fn batch(template_id: u64, quantity: u32, epoch_millis: i64) -> Vec<QrPayload> {
    (1..=quantity)
        .map(|sequence_no| QrPayload::new(template_id, sequence_no, epoch_millis))
        .collect()
}

/// URL encoded into the rendered QR code: `https://{host}/info?qrcode={payload}`.
pub fn target_url(host: &str, payload: &str) -> String {
    format!("https://{}/info?qrcode={}", host, percent_encode(payload))
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                out.push('%');
                out.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
                out.push(HEX_DIGITS[usize::from(byte & 0x0F)] as char);
            }
        }
    }
    out
}
