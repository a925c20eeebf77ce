//! Receipt data model and renderer

mod model;
mod render;

pub use model::{
    CustomerInfo, InvoiceInfo, Payment, QrConfig, ReceiptData, ReceiptKind, SaleItem,
    SaleReceipt, ServiceInfo, ServiceReceipt, StoreInfo, Totals, Tracking,
};
pub use render::{DEFAULT_FOOTER, ReceiptRenderer, TRACK_HEADING, build_receipt};
