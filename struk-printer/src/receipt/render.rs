//! Receipt renderer
//!
//! Turns a [`ReceiptData`] into ESC/POS bytes for a 58mm/80mm thermal printer.
//! Each section returns its own [`Fragments`]; the buffer is only assembled
//! after every section built successfully, so a bad input never yields a
//! half-printed receipt.

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::model::{
    CustomerInfo, InvoiceInfo, QrConfig, ReceiptData, SaleReceipt, ServiceReceipt, StoreInfo,
};
use crate::encoding::TextPolicy;
use crate::error::PrintResult;
use crate::escpos::{
    Align, CODE_PAGE_PC437, DEFAULT_WIDTH, Fragment, Fragments, align, bold, codepage, cut, feed,
    horizontal_rule, init, line_feed, size, text,
};
use crate::layout::{format_rupiah, item_line, two_column};
use crate::qr::qr_block;

/// Footer printed when the receipt carries none
pub const DEFAULT_FOOTER: &str = "Terima kasih!";

/// Heading printed above the tracking QR code
pub const TRACK_HEADING: &str = "LACAK STATUS SERVIS";

/// Lines fed before the cut
const TAIL_FEED_LINES: u8 = 3;

const LABEL_DATE: &str = "Tanggal: ";
const LABEL_ID: &str = "No: ";
const LABEL_CUSTOMER: &str = "Pelanggan: ";
const LABEL_ITEMS: &str = "Item:";
const LABEL_SERVICE: &str = "Servis:";
const LABEL_COST: &str = "Biaya";
const LABEL_SUBTOTAL: &str = "Subtotal";
const LABEL_DISCOUNT: &str = "Diskon";
const LABEL_TAX: &str = "Pajak";
const LABEL_GRAND_TOTAL: &str = "Grand Total";
const LABEL_CASH: &str = "Tunai";
const LABEL_CHANGE: &str = "Kembali";

/// Receipt renderer
///
/// Common widths:
/// - 58mm paper: 32 characters
/// - 80mm paper: 48 characters
#[derive(Debug, Clone)]
pub struct ReceiptRenderer {
    width: usize,
    policy: TextPolicy,
    default_footer: String,
}

impl ReceiptRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            policy: TextPolicy::default(),
            default_footer: DEFAULT_FOOTER.to_string(),
        }
    }

    /// Set how unprintable characters are handled
    pub fn with_policy(mut self, policy: TextPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the footer used when a receipt has none
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.default_footer = footer.into();
        self
    }

    /// Render a receipt to ESC/POS bytes
    #[instrument(skip(self, receipt), fields(kind = %receipt.kind(), width = self.width))]
    pub fn render(&self, receipt: &ReceiptData) -> PrintResult<Vec<u8>> {
        let body = match receipt {
            ReceiptData::Sale(sale) => self.render_sale(sale)?,
            ReceiptData::Service(service) => self.render_service(service)?,
        };

        let fragments = self
            .render_header(receipt.store(), receipt.invoice(), receipt.customer())?
            .chain(body)
            .chain(self.render_footer(receipt.footer())?);

        let count = fragments.len();
        let buf = fragments.concat();
        debug!(fragments = count, bytes = buf.len(), "receipt rendered");
        Ok(buf)
    }

    /// Store block, invoice info and customer
    fn render_header(
        &self,
        store: &StoreInfo,
        invoice: &InvoiceInfo,
        customer: &CustomerInfo,
    ) -> PrintResult<Fragments> {
        let mut f = Fragments::new()
            .with(init())
            .with(codepage(CODE_PAGE_PC437))
            // Store name (bold, double height, centered)
            .with(align(Align::Center))
            .with(bold(true))
            .with(size(0, 1))
            .with(self.line(&store.name)?)
            .with(size(0, 0))
            .with(bold(false))
            .with(self.line(&store.addr)?);

        if let Some(phone) = &store.phone {
            f = f.with(self.line(phone)?);
        }

        Ok(f.with(self.rule())
            .with(align(Align::Left))
            .chain(self.labelled(LABEL_DATE, &invoice.datetime)?)
            .chain(self.labelled(LABEL_ID, &invoice.id)?)
            .with(self.rule())
            .chain(self.labelled(LABEL_CUSTOMER, &customer.name)?)
            .with(line_feed()))
    }

    fn render_sale(&self, sale: &SaleReceipt) -> PrintResult<Fragments> {
        let mut f = Fragments::new()
            .with(bold(true))
            .with(self.line(LABEL_ITEMS)?)
            .with(bold(false));

        for item in &sale.items {
            f = f.with(self.line(&item_line(item, self.width)?)?);
        }

        f = f.with(line_feed()).with(self.rule());

        // Breakdown only when something sits between subtotal and total
        let totals = &sale.totals;
        if totals.discount.is_some() || totals.tax.is_some() {
            f = f.with(self.amount_row(LABEL_SUBTOTAL, totals.subtotal)?);
            if let Some(discount) = totals.discount {
                f = f.with(self.amount_row(LABEL_DISCOUNT, discount)?);
            }
            if let Some(tax) = totals.tax {
                f = f.with(self.amount_row(LABEL_TAX, tax)?);
            }
        }

        f = f
            .with(bold(true))
            .with(size(0, 1))
            .with(self.amount_row(LABEL_GRAND_TOTAL, totals.total)?)
            .with(size(0, 0))
            .with(bold(false))
            .with(self.rule());

        if let Some(payment) = &sale.payment
            && let Some(cash) = payment.cash
        {
            f = f.with(self.amount_row(LABEL_CASH, cash)?);
            if let Some(change) = payment.change {
                f = f.with(self.amount_row(LABEL_CHANGE, change)?);
            }
        }

        Ok(f)
    }

    fn render_service(&self, receipt: &ServiceReceipt) -> PrintResult<Fragments> {
        let service = &receipt.service;
        let mut f = Fragments::new()
            .with(bold(true))
            .with(self.line(LABEL_SERVICE)?)
            .with(bold(false))
            .with(self.line(&service.name)?);

        if let Some(description) = &service.description {
            f = f.with(self.line(description)?);
        }

        f = f
            .with(self.amount_row(LABEL_COST, service.cost)?)
            .with(self.rule());

        if let Some(url) = receipt.tracking_url() {
            let options = receipt
                .qr
                .as_ref()
                .map(QrConfig::options)
                .unwrap_or_default();
            debug!(size = options.size, ec = ?options.ec, "adding tracking QR");
            f = f
                .with(align(Align::Center))
                .with(bold(true))
                .with(self.line(TRACK_HEADING)?)
                .with(bold(false))
                .chain(qr_block(url, options)?)
                .with(align(Align::Left))
                .with(self.rule());
        }

        Ok(f)
    }

    fn render_footer(&self, footer: Option<&str>) -> PrintResult<Fragments> {
        let footer = footer.unwrap_or(&self.default_footer);
        Ok(Fragments::new()
            .with(align(Align::Center))
            .with(self.line(footer)?)
            .with(feed(TAIL_FEED_LINES))
            .with(cut()))
    }

    // === Line helpers ===

    /// Encoded text followed by LF
    fn line(&self, s: &str) -> PrintResult<Fragment> {
        let mut bytes = text(s, self.policy)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Separator row
    fn rule(&self) -> Fragment {
        let mut bytes = horizontal_rule(self.width);
        bytes.push(b'\n');
        bytes
    }

    /// Bold label followed by a plain value on the same line
    fn labelled(&self, label: &str, value: &str) -> PrintResult<Fragments> {
        Ok(Fragments::new()
            .with(bold(true))
            .with(text(label, self.policy)?)
            .with(bold(false))
            .with(self.line(value)?))
    }

    /// Label left, Rupiah amount right
    fn amount_row(&self, label: &str, amount: Decimal) -> PrintResult<Fragment> {
        self.line(&two_column(label, &format_rupiah(amount), self.width))
    }
}

impl Default for ReceiptRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

/// Render a receipt with default settings at the given width
pub fn build_receipt(receipt: &ReceiptData, width: usize) -> PrintResult<Vec<u8>> {
    ReceiptRenderer::new(width).render(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{Payment, SaleItem, ServiceInfo, Totals, Tracking};

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn store() -> StoreInfo {
        StoreInfo {
            name: "Toko Kaca".to_string(),
            addr: "Jl. Kenanga 5".to_string(),
            phone: None,
        }
    }

    fn sale() -> SaleReceipt {
        SaleReceipt {
            store: store(),
            invoice: InvoiceInfo {
                id: "A1".to_string(),
                datetime: "01/01/2026".to_string(),
            },
            customer: CustomerInfo {
                name: "Sari".to_string(),
            },
            items: vec![SaleItem {
                name: "Kaca tanpa kaca".to_string(),
                qty: 1,
                price: dec(25000),
            }],
            totals: Totals {
                subtotal: dec(25000),
                discount: None,
                tax: None,
                total: dec(25000),
            },
            payment: None,
            footer: None,
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_header_starts_with_init_and_codepage() {
        let buf = build_receipt(&ReceiptData::Sale(sale()), 32).unwrap();
        assert_eq!(&buf[..5], &[0x1B, 0x40, 0x1B, 0x74, 0x00]);
        assert!(contains(&buf, b"\x1B\x61\x01\x1B\x45\x01\x1D\x21\x01Toko Kaca\n"));
    }

    #[test]
    fn test_sale_item_and_total_rows() {
        let buf = build_receipt(&ReceiptData::Sale(sale()), 32).unwrap();
        assert!(contains(&buf, b"Kaca tanpa kaca (x1)   Rp 25.000\n"));
        assert!(contains(
            &buf,
            b"\x1B\x45\x01\x1D\x21\x01Grand Total            Rp 25.000\n\x1D\x21\x00\x1B\x45\x00"
        ));
        assert!(!contains(&buf, b"Subtotal"));
    }

    #[test]
    fn test_sale_breakdown_when_discount_present() {
        let mut s = sale();
        s.totals.discount = Some(dec(5000));
        s.totals.total = dec(20000);
        let buf = build_receipt(&ReceiptData::Sale(s), 32).unwrap();
        assert!(contains(&buf, b"Subtotal"));
        assert!(contains(&buf, b"Diskon                  Rp 5.000\n"));
        assert!(!contains(&buf, b"Pajak"));
    }

    #[test]
    fn test_sale_cash_and_change() {
        let mut s = sale();
        s.payment = Some(Payment {
            cash: Some(dec(50000)),
            change: Some(dec(25000)),
        });
        let buf = build_receipt(&ReceiptData::Sale(s), 32).unwrap();
        assert!(contains(&buf, b"Tunai                  Rp 50.000\n"));
        assert!(contains(&buf, b"Kembali                Rp 25.000\n"));
    }

    #[test]
    fn test_payment_without_cash_prints_nothing() {
        let mut s = sale();
        s.payment = Some(Payment {
            cash: None,
            change: Some(dec(1000)),
        });
        let buf = build_receipt(&ReceiptData::Sale(s), 32).unwrap();
        assert!(!contains(&buf, b"Tunai"));
        assert!(!contains(&buf, b"Kembali"));
    }

    #[test]
    fn test_custom_default_footer() {
        let buf = ReceiptRenderer::new(32)
            .with_footer("Sampai jumpa")
            .render(&ReceiptData::Sale(sale()))
            .unwrap();
        assert!(contains(&buf, b"\x1B\x61\x01Sampai jumpa\n\x1B\x64\x03\x1D\x56\x00"));
    }

    #[test]
    fn test_out_of_range_item_fails_without_output() {
        let mut s = sale();
        s.items[0].qty = 10;
        s.items[0].price = Decimal::MAX;
        assert!(matches!(
            build_receipt(&ReceiptData::Sale(s), 32),
            Err(crate::error::PrintError::InvalidReceipt(_))
        ));
    }

    #[test]
    fn test_service_description_and_cost() {
        let receipt = ServiceReceipt {
            store: store(),
            invoice: sale().invoice,
            customer: sale().customer,
            service: ServiceInfo {
                name: "Ganti LCD".to_string(),
                description: Some("Retak pojok kiri".to_string()),
                cost: dec(350000),
            },
            tracking: Some(Tracking { url: String::new() }),
            qr: None,
            footer: Some("Garansi 30 hari".to_string()),
        };
        let buf = build_receipt(&ReceiptData::Service(receipt), 32).unwrap();
        assert!(contains(&buf, b"Ganti LCD\nRetak pojok kiri\n"));
        assert!(contains(&buf, b"Biaya                 Rp 350.000\n"));
        assert!(contains(&buf, b"Garansi 30 hari\n"));
        // empty URL counts as no tracking
        assert!(!contains(&buf, TRACK_HEADING.as_bytes()));
        assert!(!contains(&buf, &[0x1D, 0x28, 0x6B]));
    }
}
