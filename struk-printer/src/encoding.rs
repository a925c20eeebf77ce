//! Code page 437 encoding for ESC/POS text
//!
//! Receipts select code page 0 (PC437), the power-on default of most
//! 58mm thermal printers. This module provides utilities for:
//! - Converting UTF-8 text to CP437 bytes
//! - Calculating printed column widths
//!
//! ASCII passes through unchanged. Characters outside CP437 are handled
//! according to [`TextPolicy`].

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::{PrintError, PrintResult};

/// What to do with characters the code page cannot print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextPolicy {
    /// Replace with `?` and log a warning
    #[default]
    Lossy,
    /// Fail the whole build
    Strict,
}

impl FromStr for TextPolicy {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lossy" => Ok(Self::Lossy),
            "strict" => Ok(Self::Strict),
            other => Err(PrintError::InvalidConfig(format!(
                "Unknown text policy: {other} (expected lossy or strict)"
            ))),
        }
    }
}

impl fmt::Display for TextPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lossy => f.write_str("lossy"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Get the printed width of a string in columns
///
/// Every CP437 glyph is one byte and one column, so this is the char count.
pub fn cp437_width(s: &str) -> usize {
    s.chars().count()
}

/// Encode text as CP437 bytes
pub fn encode_cp437(s: &str, policy: TextPolicy) -> PrintResult<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_ascii() {
            out.push(ch as u8);
            continue;
        }
        match unicode_to_cp437(ch) {
            Some(byte) => out.push(byte),
            None => match policy {
                TextPolicy::Lossy => {
                    warn!(ch = %ch, code = ch as u32, "unmapped character, replacing with '?'");
                    out.push(b'?');
                }
                TextPolicy::Strict => {
                    return Err(PrintError::UnsupportedCharacter {
                        ch,
                        text: s.to_string(),
                    });
                }
            },
        }
    }
    Ok(out)
}

/// Map a character to its CP437 byte (0x80-0xFF)
fn unicode_to_cp437(ch: char) -> Option<u8> {
    CP437_HIGH
        .iter()
        .position(|&c| c == ch)
        .map(|idx| 0x80 + idx as u8)
}

/// CP437 upper half, indexed from 0x80
const CP437_HIGH: [char; 128] = [
    // 0x80
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    // 0xA0
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    // 0xC0
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    // 0xD0
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    // 0xE0
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    // 0xF0
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];
