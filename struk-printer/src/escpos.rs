//! ESC/POS command primitives
//!
//! Every primitive is a pure function returning a fresh byte fragment.
//! A receipt is an ordered list of fragments folded into one buffer at the end
//! (see [`Fragments`]), so nothing here tracks what was emitted before.

use crate::encoding::{TextPolicy, encode_cp437};
use crate::error::PrintResult;

/// A single piece of printer output
pub type Fragment = Vec<u8>;

/// Code page used for all receipt text (PC437)
pub const CODE_PAGE_PC437: u8 = 0;

/// Default paper width in characters (58mm paper)
pub const DEFAULT_WIDTH: usize = 32;

/// Text alignment for `ESC a`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Align {
    Left = 0,
    Center = 1,
    Right = 2,
}

// === Printer Control ===

/// Initialize printer (ESC @)
pub const fn init() -> [u8; 2] {
    [0x1B, 0x40]
}

/// Select character code page (ESC t n)
pub const fn codepage(n: u8) -> [u8; 3] {
    [0x1B, 0x74, n]
}

/// Set alignment (ESC a n)
pub const fn align(a: Align) -> [u8; 3] {
    [0x1B, 0x61, a as u8]
}

/// Toggle emphasis (ESC E n)
pub const fn bold(on: bool) -> [u8; 3] {
    [0x1B, 0x45, on as u8]
}

/// Character size (GS ! n)
///
/// `w` and `h` are multipliers minus one: 0 = normal, 1 = double.
pub const fn size(w: u8, h: u8) -> [u8; 3] {
    [0x1D, 0x21, ((w & 0x07) << 4) | (h & 0x07)]
}

/// Print and feed n lines (ESC d n)
pub const fn feed(n: u8) -> [u8; 3] {
    [0x1B, 0x64, n]
}

/// Full cut (GS V 0)
pub const fn cut() -> [u8; 3] {
    [0x1D, 0x56, 0x00]
}

/// Single newline (LF)
pub const fn line_feed() -> [u8; 1] {
    [0x0A]
}

/// A row of '-' characters, without the trailing newline
pub fn horizontal_rule(width: usize) -> Fragment {
    vec![b'-'; width]
}

/// Encode text in the receipt code page
pub fn text(s: &str, policy: TextPolicy) -> PrintResult<Fragment> {
    encode_cp437(s, policy)
}

// ============================================================================
// Fragment list
// ============================================================================

/// Ordered list of output fragments
///
/// Sections of a receipt each produce a `Fragments`; the receipt builder
/// chains them and calls [`Fragments::concat`] once the whole document
/// has been built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragments(Vec<Fragment>);

impl Fragments {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a fragment, returning the extended list
    pub fn with(mut self, fragment: impl Into<Fragment>) -> Self {
        self.0.push(fragment.into());
        self
    }

    /// Append every fragment of another list
    pub fn chain(mut self, other: Fragments) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Number of fragments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fold all fragments into the final byte buffer
    pub fn concat(self) -> Vec<u8> {
        let total = self.0.iter().map(Vec::len).sum();
        self.0.into_iter().fold(Vec::with_capacity(total), |mut buf, f| {
            buf.extend_from_slice(&f);
            buf
        })
    }
}
