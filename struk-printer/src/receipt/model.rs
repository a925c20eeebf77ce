//! Receipt input model
//!
//! The wire format carries no type tag: a document with a `service` field is a
//! service receipt, otherwise a document with an `items` array is a sale
//! receipt. That rule is applied once here, at the input boundary, and the rest
//! of the crate works with the [`ReceiptData`] enum.

use std::fmt;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{PrintError, PrintResult};
use crate::qr::QrOptions;

/// Store block printed at the top of every receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
    pub addr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Invoice header; both fields are display strings printed as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceInfo {
    pub id: String,
    pub datetime: String,
}

/// Customer the receipt is issued to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
}

/// One sold line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub name: String,
    pub qty: u32,
    /// Unit price
    pub price: Decimal,
}

impl SaleItem {
    /// Line amount (qty x unit price)
    pub fn amount(&self) -> PrintResult<Decimal> {
        Decimal::from(self.qty)
            .checked_mul(self.price)
            .ok_or_else(|| {
                PrintError::InvalidReceipt(format!(
                    "`{}`: {} x {} is out of range",
                    self.name, self.qty, self.price
                ))
            })
    }
}

/// Service job on a service receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cost: Decimal,
}

/// Sale totals, printed as given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,
    pub total: Decimal,
}

/// Cash tendered and change returned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,
}

/// Status page encoded in the QR code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracking {
    pub url: String,
}

/// QR settings as received; resolved with [`QrConfig::options`]
///
/// Both fields are read leniently: a value of the wrong type counts as absent
/// and falls back to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QrConfig {
    #[serde(
        default,
        deserialize_with = "lenient_size",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_code",
        skip_serializing_if = "Option::is_none"
    )]
    pub ec: Option<String>,
}

impl QrConfig {
    pub fn options(&self) -> QrOptions {
        QrOptions::resolve(self.size, self.ec.as_deref())
    }
}

/// Receipt for sold items
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleReceipt {
    pub store: StoreInfo,
    pub invoice: InvoiceInfo,
    pub customer: CustomerInfo,
    pub items: Vec<SaleItem>,
    pub totals: Totals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

/// Receipt for a service job, optionally with a tracking QR code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceReceipt {
    pub store: StoreInfo,
    pub invoice: InvoiceInfo,
    pub customer: CustomerInfo,
    pub service: ServiceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<Tracking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr: Option<QrConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl ServiceReceipt {
    /// Tracking URL used as QR payload, if any
    pub fn tracking_url(&self) -> Option<&str> {
        self.tracking
            .as_ref()
            .map(|t| t.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// Which receipt layout a document selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptKind {
    Sale,
    Service,
}

impl fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sale => f.write_str("sale"),
            Self::Service => f.write_str("service"),
        }
    }
}

/// A receipt ready for encoding
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReceiptData {
    Sale(SaleReceipt),
    Service(ServiceReceipt),
}

/// Wire shape with every top-level field optional
///
/// Variant-specific fields stay as raw JSON until the variant is known, so a
/// stray sibling belonging to the other shape never fails the parse.
#[derive(Debug, Deserialize)]
struct RawReceipt {
    store: Option<StoreInfo>,
    invoice: Option<InvoiceInfo>,
    customer: Option<CustomerInfo>,
    footer: Option<String>,
    // sale
    items: Option<Value>,
    totals: Option<Value>,
    payment: Option<Value>,
    // service
    service: Option<Value>,
    tracking: Option<Value>,
    qr: Option<Value>,
}

impl ReceiptData {
    /// Parse a receipt from JSON text
    pub fn from_json(json: &str) -> PrintResult<Self> {
        let raw: RawReceipt = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Parse a receipt from an already-decoded JSON value
    pub fn from_value(value: Value) -> PrintResult<Self> {
        let raw: RawReceipt = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawReceipt) -> PrintResult<Self> {
        let store = present(raw.store, "store")?;
        let invoice = present(raw.invoice, "invoice")?;
        let customer = present(raw.customer, "customer")?;

        if raw.service.is_some() {
            return Ok(Self::Service(ServiceReceipt {
                store,
                invoice,
                customer,
                service: required(raw.service, "service")?,
                tracking: optional(raw.tracking, "tracking")?,
                qr: optional(raw.qr, "qr")?,
                footer: raw.footer,
            }));
        }

        if raw.items.is_none() {
            return Err(PrintError::InvalidReceipt(
                "document has neither `service` nor `items`".to_string(),
            ));
        }

        let items: Vec<SaleItem> = required(raw.items, "items")?;
        validate_items(&items)?;

        Ok(Self::Sale(SaleReceipt {
            store,
            invoice,
            customer,
            items,
            totals: required(raw.totals, "totals")?,
            payment: optional(raw.payment, "payment")?,
            footer: raw.footer,
        }))
    }

    pub fn kind(&self) -> ReceiptKind {
        match self {
            Self::Sale(_) => ReceiptKind::Sale,
            Self::Service(_) => ReceiptKind::Service,
        }
    }

    pub fn store(&self) -> &StoreInfo {
        match self {
            Self::Sale(r) => &r.store,
            Self::Service(r) => &r.store,
        }
    }

    pub fn invoice(&self) -> &InvoiceInfo {
        match self {
            Self::Sale(r) => &r.invoice,
            Self::Service(r) => &r.invoice,
        }
    }

    pub fn customer(&self) -> &CustomerInfo {
        match self {
            Self::Sale(r) => &r.customer,
            Self::Service(r) => &r.customer,
        }
    }

    pub fn footer(&self) -> Option<&str> {
        match self {
            Self::Sale(r) => r.footer.as_deref(),
            Self::Service(r) => r.footer.as_deref(),
        }
    }
}

impl<'de> Deserialize<'de> for ReceiptData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawReceipt::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

fn present<T>(value: Option<T>, field: &str) -> PrintResult<T> {
    value.ok_or_else(|| PrintError::InvalidReceipt(format!("missing field `{field}`")))
}

fn required<T: DeserializeOwned>(value: Option<Value>, field: &str) -> PrintResult<T> {
    let value = present(value, field)?;
    serde_json::from_value(value)
        .map_err(|e| PrintError::InvalidReceipt(format!("invalid `{field}`: {e}")))
}

fn optional<T: DeserializeOwned>(value: Option<Value>, field: &str) -> PrintResult<Option<T>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v)
            .map(Some)
            .map_err(|e| PrintError::InvalidReceipt(format!("invalid `{field}`: {e}"))),
    }
}

/// Module size as a number or numeric string
fn lenient_size<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Error correction letter; anything but a string is dropped
fn lenient_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn validate_items(items: &[SaleItem]) -> PrintResult<()> {
    for (idx, item) in items.iter().enumerate() {
        if item.qty == 0 {
            return Err(PrintError::InvalidReceipt(format!(
                "items[{idx}] `{}`: qty must be positive",
                item.name
            )));
        }
        if item.price < Decimal::ZERO {
            return Err(PrintError::InvalidReceipt(format!(
                "items[{idx}] `{}`: price must not be negative",
                item.name
            )));
        }
        if item.amount().is_err() {
            return Err(PrintError::InvalidReceipt(format!(
                "items[{idx}] `{}`: amount is out of range",
                item.name
            )));
        }
    }
    Ok(())
}
