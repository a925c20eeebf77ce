//! Base64 transport for RawBT handoff
//!
//! The printing app on the device receives the ESC/POS buffer as base64
//! inside a URI. Two forms are produced: the `rawbt:` scheme, and an Android
//! `intent:` URI used as fallback when the scheme handler is not registered.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, instrument};

use crate::error::{PrintError, PrintResult};
use crate::receipt::ReceiptData;

/// Package id of the RawBT print service
pub const RAWBT_PACKAGE: &str = "ru.a402d.rawbtprinter";

/// Fragment key used by the preview page
const FRAGMENT_KEY: &str = "data=";

/// Encode bytes as standard base64 (padded, no line breaks)
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64
pub fn decode_base64(s: &str) -> PrintResult<Vec<u8>> {
    Ok(STANDARD.decode(s.trim())?)
}

/// Primary URI: `rawbt:base64,<b64>`
pub fn rawbt_uri(b64: &str) -> String {
    format!("rawbt:base64,{b64}")
}

/// Fallback Android intent URI wrapping a `data:` URI
pub fn intent_uri(b64: &str, package: &str) -> String {
    let data_uri = format!("data:application/octet-stream;base64,{b64}");
    format!(
        "intent:{}#Intent;scheme=rawbt;package={package};end;",
        urlencoding::encode(&data_uri)
    )
}

/// Everything a dispatcher needs to hand a receipt to the print app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintPayload {
    pub base64: String,
    pub primary: String,
    pub fallback: String,
}

impl PrintPayload {
    #[instrument(skip(bytes), fields(bytes = bytes.len()))]
    pub fn new(bytes: &[u8], package: &str) -> Self {
        let base64 = encode_base64(bytes);
        let primary = rawbt_uri(&base64);
        let fallback = intent_uri(&base64, package);
        debug!(
            base64_len = base64.len(),
            fallback_len = fallback.len(),
            "print payload encoded"
        );
        Self {
            base64,
            primary,
            fallback,
        }
    }
}

/// Decode a preview fragment of the form `#data=<base64 JSON>`
///
/// The leading `#` is optional.
#[instrument(skip(fragment))]
pub fn decode_fragment(fragment: &str) -> PrintResult<ReceiptData> {
    let fragment = fragment.trim();
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let encoded = fragment.strip_prefix(FRAGMENT_KEY).ok_or_else(|| {
        PrintError::InvalidReceipt(format!("fragment must start with `#{FRAGMENT_KEY}`"))
    })?;

    // Fragments copied out of a browser bar are often percent-encoded
    let encoded = urlencoding::decode(encoded)
        .map_err(|e| PrintError::InvalidReceipt(format!("fragment is not valid UTF-8: {e}")))?;

    let json = decode_base64(&encoded)?;
    let json = String::from_utf8(json)
        .map_err(|e| PrintError::InvalidReceipt(format!("fragment JSON is not UTF-8: {e}")))?;
    ReceiptData::from_json(&json)
}

/// Build a preview fragment for a receipt
pub fn encode_fragment(receipt: &ReceiptData) -> PrintResult<String> {
    let json = serde_json::to_string(receipt)?;
    Ok(format!("#{FRAGMENT_KEY}{}", encode_base64(json.as_bytes())))
}
