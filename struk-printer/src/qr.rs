//! QR code block (ESC/POS `GS ( k`, cn = 49)
//!
//! The printer stores the symbol data first and prints it on a separate
//! trigger, so a block is five sub-commands in fixed order:
//! model, module size, error correction, store, print.

use tracing::instrument;

use crate::error::{PrintError, PrintResult};
use crate::escpos::{Fragment, Fragments, line_feed};

/// Smallest module size accepted by the printer
pub const MIN_MODULE_SIZE: u8 = 3;
/// Largest module size that still fits 58mm paper
pub const MAX_MODULE_SIZE: u8 = 10;
/// Module size used when none is configured
pub const DEFAULT_MODULE_SIZE: u8 = 6;

/// Bytes the store command counts on top of the payload (cn fn m)
const STORE_HEADER_LEN: usize = 3;

/// QR error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ErrorCorrection {
    /// ~7% recovery
    L = 48,
    /// ~15% recovery
    #[default]
    M = 49,
    /// ~25% recovery
    Q = 50,
    /// ~30% recovery
    H = 51,
}

impl ErrorCorrection {
    /// Parse a level letter; unknown codes fall back to M
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "L" => Self::L,
            "Q" => Self::Q,
            "H" => Self::H,
            _ => Self::M,
        }
    }

    /// Command byte for `GS ( k <fn 69>`
    pub fn byte(self) -> u8 {
        self as u8
    }
}

/// Clamp a requested module size into the printable range
///
/// Fractions are truncated; NaN selects the default size.
pub fn clamp_size(size: f64) -> u8 {
    if size.is_nan() {
        return DEFAULT_MODULE_SIZE;
    }
    size.clamp(f64::from(MIN_MODULE_SIZE), f64::from(MAX_MODULE_SIZE)) as u8
}

/// Function 165: select model 2
pub const fn model_select() -> [u8; 9] {
    [0x1D, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]
}

/// Function 167: module size in dots
pub const fn size_select(size: u8) -> [u8; 8] {
    [0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x43, size]
}

/// Function 169: error correction level
pub const fn error_correction(level: ErrorCorrection) -> [u8; 8] {
    [0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x45, level as u8]
}

/// Function 180: store symbol data
///
/// The length field counts the payload plus the three header bytes,
/// split little-endian into pL/pH.
pub fn store_data(payload: &[u8]) -> PrintResult<Fragment> {
    let len = payload.len() + STORE_HEADER_LEN;
    if len > u16::MAX as usize {
        return Err(PrintError::QrPayloadTooLarge(payload.len()));
    }
    let p_l = (len & 0xFF) as u8;
    let p_h = ((len >> 8) & 0xFF) as u8;

    let mut cmd = Vec::with_capacity(5 + len);
    cmd.extend_from_slice(&[0x1D, 0x28, 0x6B, p_l, p_h, 0x31, 0x50, 0x30]);
    cmd.extend_from_slice(payload);
    Ok(cmd)
}

/// Function 181: print the stored symbol
pub const fn print_stored() -> [u8; 8] {
    [0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x51, 0x30]
}

/// Resolved QR settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    pub size: u8,
    pub ec: ErrorCorrection,
}

impl QrOptions {
    /// Build options from loosely-typed input, clamping and defaulting
    pub fn resolve(size: Option<f64>, ec: Option<&str>) -> Self {
        Self {
            size: size.map(clamp_size).unwrap_or(DEFAULT_MODULE_SIZE),
            ec: ec.map(ErrorCorrection::from_code).unwrap_or_default(),
        }
    }
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_MODULE_SIZE,
            ec: ErrorCorrection::M,
        }
    }
}

/// Full QR block for a payload, framed by line feeds
#[instrument(skip(payload), fields(payload_len = payload.len()))]
pub fn qr_block(payload: &str, options: QrOptions) -> PrintResult<Fragments> {
    Ok(Fragments::new()
        .with(line_feed())
        .with(model_select())
        .with(size_select(options.size.clamp(MIN_MODULE_SIZE, MAX_MODULE_SIZE)))
        .with(error_correction(options.ec))
        .with(store_data(payload.as_bytes())?)
        .with(print_stored())
        .with(line_feed()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_correction_codes() {
        assert_eq!(ErrorCorrection::from_code("L").byte(), 48);
        assert_eq!(ErrorCorrection::from_code("m").byte(), 49);
        assert_eq!(ErrorCorrection::from_code("Q").byte(), 50);
        assert_eq!(ErrorCorrection::from_code("h").byte(), 51);
        assert_eq!(ErrorCorrection::from_code("X"), ErrorCorrection::M);
        assert_eq!(ErrorCorrection::from_code(""), ErrorCorrection::M);
    }

    #[test]
    fn test_clamp_size() {
        assert_eq!(clamp_size(0.0), 3);
        assert_eq!(clamp_size(-4.0), 3);
        assert_eq!(clamp_size(3.0), 3);
        assert_eq!(clamp_size(7.0), 7);
        assert_eq!(clamp_size(10.0), 10);
        assert_eq!(clamp_size(99.0), 10);
    }

    #[test]
    fn test_clamp_size_non_integral() {
        assert_eq!(clamp_size(4.5), 4);
        assert_eq!(clamp_size(9.99), 9);
        assert_eq!(clamp_size(1e300), 10);
        assert_eq!(clamp_size(f64::NEG_INFINITY), 3);
        assert_eq!(clamp_size(f64::NAN), DEFAULT_MODULE_SIZE);
    }

    #[test]
    fn test_resolve_defaults() {
        let opts = QrOptions::resolve(None, None);
        assert_eq!(opts, QrOptions::default());
        assert_eq!(opts.size, DEFAULT_MODULE_SIZE);

        let opts = QrOptions::resolve(Some(20.0), Some("H"));
        assert_eq!(opts.size, 10);
        assert_eq!(opts.ec, ErrorCorrection::H);
    }

    #[test]
    fn test_store_data_length_prefix() {
        for len in [0usize, 1, 252, 253, 256, 300, 1000] {
            let payload = vec![b'a'; len];
            let cmd = store_data(&payload).unwrap();
            let total = len + 3;
            assert_eq!(cmd[3], (total & 0xFF) as u8, "pL for {len}");
            assert_eq!(cmd[4], ((total >> 8) & 0xFF) as u8, "pH for {len}");
            assert_eq!(&cmd[5..8], &[0x31, 0x50, 0x30]);
            assert_eq!(&cmd[8..], payload.as_slice());
        }
    }

    #[test]
    fn test_store_data_crosses_byte_boundary() {
        // 253 + 3 = 256 -> pL 0, pH 1
        let cmd = store_data(&[b'x'; 253]).unwrap();
        assert_eq!((cmd[3], cmd[4]), (0x00, 0x01));

        // 252 + 3 = 255 -> pL 255, pH 0
        let cmd = store_data(&[b'x'; 252]).unwrap();
        assert_eq!((cmd[3], cmd[4]), (0xFF, 0x00));
    }

    #[test]
    fn test_store_data_rejects_oversized_payload() {
        let payload = vec![0u8; u16::MAX as usize - 2];
        assert!(matches!(
            store_data(&payload),
            Err(PrintError::QrPayloadTooLarge(_))
        ));
        assert!(store_data(&vec![0u8; u16::MAX as usize - 3]).is_ok());
    }

    #[test]
    fn test_qr_block_order() {
        let opts = QrOptions::resolve(Some(4.0), Some("Q"));
        let buf = qr_block("https://t.co/x", opts).unwrap().concat();

        let mut expected: Vec<u8> = vec![0x0A];
        expected.extend_from_slice(&[0x1D, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]);
        expected.extend_from_slice(&[0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x43, 4]);
        expected.extend_from_slice(&[0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x45, 50]);
        expected.extend_from_slice(&[0x1D, 0x28, 0x6B, 17, 0x00, 0x31, 0x50, 0x30]);
        expected.extend_from_slice(b"https://t.co/x");
        expected.extend_from_slice(&[0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x51, 0x30]);
        expected.push(0x0A);

        assert_eq!(buf, expected);
    }

    #[test]
    fn test_qr_block_keeps_utf8_payload() {
        let buf = qr_block("é", QrOptions::default()).unwrap().concat();
        // store command: header 8 bytes then the two UTF-8 bytes
        let store_at = 1 + 9 + 8 + 8;
        assert_eq!(buf[store_at + 3], 5);
        assert_eq!(&buf[store_at + 8..store_at + 10], "é".as_bytes());
    }
}
