//! # struk-printer
//!
//! ESC/POS receipt encoder for 58mm thermal printers driven through RawBT.
//!
//! ## Scope
//!
//! This crate turns a sale or service receipt into printer bytes:
//! - ESC/POS command primitives and QR code blocks
//! - CP437 text encoding
//! - Two-column layout with Rupiah formatting
//! - Base64 / URI handoff to the RawBT app
//!
//! Where the receipt data comes from (database, demo data) and how the user
//! is told about failures stays in application code.
//!
//! ## Example
//!
//! ```ignore
//! use struk_printer::{PrintPayload, RAWBT_PACKAGE, ReceiptData, ReceiptRenderer};
//!
//! let receipt = ReceiptData::from_json(&json)?;
//! let bytes = ReceiptRenderer::new(32).render(&receipt)?;
//! let payload = PrintPayload::new(&bytes, RAWBT_PACKAGE);
//! println!("{}", payload.primary);
//! ```

mod dispatch;
mod encoding;
mod error;
pub mod escpos;
mod layout;
pub mod qr;
mod receipt;
mod transport;

// Re-exports
pub use dispatch::{DEFAULT_DISPATCH_DELAY, DispatchConfig, PrintDispatcher, UriLauncher};
pub use encoding::{TextPolicy, cp437_width, encode_cp437};
pub use error::{PrintError, PrintResult};
pub use escpos::{DEFAULT_WIDTH, Fragment, Fragments};
pub use layout::{format_rupiah, item_label, item_line, padding, two_column};
pub use qr::{ErrorCorrection, QrOptions, qr_block};
pub use receipt::{
    CustomerInfo, DEFAULT_FOOTER, InvoiceInfo, Payment, QrConfig, ReceiptData, ReceiptKind,
    ReceiptRenderer, SaleItem, SaleReceipt, ServiceInfo, ServiceReceipt, StoreInfo, TRACK_HEADING,
    Totals, Tracking, build_receipt,
};
pub use transport::{
    PrintPayload, RAWBT_PACKAGE, decode_base64, decode_fragment, encode_base64, encode_fragment,
    intent_uri, rawbt_uri,
};
