//! Band table for the classic (pre-RFC 3629) UTF-8 layout
//!
//! Every sequence length from 1 to 6 bytes is described by one [`Band`]; the
//! decoder classifies a leading byte against the table and the encoder picks
//! the first band whose ceiling covers the value.

use crate::CodePoint;

/// One sequence length of the extended UTF-8 layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Band {
    /// Bits of the leading byte that identify the band
    pub lead_mask: u8,
    /// Value of those bits for this band
    pub lead_pattern: u8,
    /// Number of continuation bytes following the leading byte
    pub continuations: usize,
    /// Largest code point encoded with this band
    pub max: CodePoint,
}

impl Band {
    /// Data bits carried by the leading byte
    #[inline]
    pub fn lead_bits(&self, lead: u8) -> CodePoint {
        CodePoint::from(lead & !self.lead_mask)
    }

    /// Total sequence length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.continuations + 1
    }
}

pub(crate) const CONTINUATION_PREFIX: u8 = 0x80;
pub(crate) const CONTINUATION_BITS: u32 = 6;
pub(crate) const CONTINUATION_MASK: u8 = 0x3F;

/// Longest sequence, in bytes
pub const MAX_SEQUENCE_LEN: usize = 6;

#[rustfmt::skip]
pub(crate) const BANDS: [Band; MAX_SEQUENCE_LEN] = [
    Band { lead_mask: 0x80, lead_pattern: 0x00, continuations: 0, max: 0x7F },
    Band { lead_mask: 0xE0, lead_pattern: 0xC0, continuations: 1, max: 0x7FF },
    Band { lead_mask: 0xF0, lead_pattern: 0xE0, continuations: 2, max: 0xFFFF },
    Band { lead_mask: 0xF8, lead_pattern: 0xF0, continuations: 3, max: 0x1F_FFFF },
    Band { lead_mask: 0xFC, lead_pattern: 0xF8, continuations: 4, max: 0x3FF_FFFF },
    Band { lead_mask: 0xFE, lead_pattern: 0xFC, continuations: 5, max: 0x7FFF_FFFF },
];

/// Band announced by a leading byte, `None` for `10xxxxxx`, `0xFE` and `0xFF`
pub(crate) fn classify_lead(lead: u8) -> Option<&'static Band> {
    BANDS.iter().find(|band| lead & band.lead_mask == band.lead_pattern)
}

/// Shortest band able to hold `value`
pub(crate) fn band_for(value: CodePoint) -> Option<&'static Band> {
    BANDS.iter().find(|band| value <= band.max)
}
