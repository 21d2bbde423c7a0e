//! Code point decoding from a byte stream
//!
//! A [`Decoder`] pulls exactly as many bytes as one code point needs and never
//! keeps a partial sequence between calls. End of input, including end of
//! input in the middle of a sequence, is reported as `Ok(None)`.

use std::io::{ErrorKind, Read};

use crate::utf8::{self, CONTINUATION_BITS, CONTINUATION_MASK};
use crate::{CodePoint, Encoding, Error, Result};

/// Reads code points from `R` in a fixed source encoding
#[derive(Debug)]
pub struct Decoder<R> {
    inner: R,
    encoding: Encoding,
    offset: u64,
    decoded: usize,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder for a concrete source encoding
    pub fn new(inner: R, encoding: Encoding) -> Result<Self> {
        if !encoding.is_concrete() {
            return Err(Error::UnsupportedEncoding(encoding));
        }
        Ok(Self {
            inner,
            encoding,
            offset: 0,
            decoded: 0,
        })
    }

    /// Treat the first byte read as sitting at `offset` in the stream.
    ///
    /// Used after a BOM skip so that reported offsets stay absolute.
    pub fn starting_at(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Source encoding
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Stream offset of the next byte to be read
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of code points successfully decoded so far
    pub fn decoded(&self) -> usize {
        self.decoded
    }

    /// Give back the underlying reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Decode the next code point, `Ok(None)` at end of stream
    pub fn read(&mut self) -> Result<Option<CodePoint>> {
        let value = match self.encoding {
            Encoding::ANSI => self.read_byte()?.map(CodePoint::from),
            Encoding::UTF16LE => self
                .read_pair()?
                .map(|[low, high]| CodePoint::from(u16::from_le_bytes([low, high]))),
            Encoding::UTF16BE => self
                .read_pair()?
                .map(|[high, low]| CodePoint::from(u16::from_be_bytes([high, low]))),
            Encoding::UTF8 => self.read_utf8()?,
            Encoding::Auto | Encoding::Unspecified => {
                return Err(Error::UnsupportedEncoding(self.encoding));
            }
        };

        if value.is_some() {
            self.decoded += 1;
        }
        Ok(value)
    }

    fn read_utf8(&mut self) -> Result<Option<CodePoint>> {
        let Some(lead) = self.read_byte()? else {
            return Ok(None);
        };

        // Reported offset is one past the bad lead byte.
        let band = utf8::classify_lead(lead).ok_or(Error::Decode {
            byte: lead,
            offset: self.offset,
        })?;

        let mut value = band.lead_bits(lead);
        for _ in 0..band.continuations {
            // The `10` prefix of continuation bytes is not checked.
            let Some(byte) = self.read_byte()? else {
                return Ok(None);
            };
            value = (value << CONTINUATION_BITS) + CodePoint::from(byte & CONTINUATION_MASK);
        }
        Ok(Some(value))
    }

    fn read_pair(&mut self) -> Result<Option<[u8; 2]>> {
        let Some(first) = self.read_byte()? else {
            return Ok(None);
        };
        let Some(second) = self.read_byte()? else {
            return Ok(None);
        };
        Ok(Some([first, second]))
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Read(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn decode_all(bytes: &[u8], encoding: Encoding) -> Vec<CodePoint> {
        let mut decoder = Decoder::new(bytes, encoding).unwrap();
        let mut out = Vec::new();
        while let Some(cp) = decoder.read().unwrap() {
            out.push(cp);
        }
        out
    }

    #[test]
    fn test_ansi_passes_bytes_through() {
        assert_eq!(
            decode_all(&[0x41, 0xE9, 0xFF, 0x00], Encoding::ANSI),
            [0x41, 0xE9, 0xFF, 0x00]
        );
    }

    #[test]
    fn test_utf16_byte_order() {
        let bytes = [0x48, 0x00, 0x3D, 0xD8, 0x00, 0xDE];
        assert_eq!(decode_all(&bytes, Encoding::UTF16LE), [0x0048, 0xD83D, 0xDE00]);
        assert_eq!(decode_all(&bytes, Encoding::UTF16BE), [0x4800, 0x3DD8, 0x00DE]);
    }

    #[test]
    fn test_utf16_surrogates_stay_separate() {
        // U+1F600 as a surrogate pair decodes to two independent units.
        let bytes = [0xD8, 0x3D, 0xDE, 0x00];
        assert_eq!(decode_all(&bytes, Encoding::UTF16BE), [0xD83D, 0xDE00]);
    }

    #[test]
    fn test_utf16_odd_trailing_byte_is_end_of_stream() {
        assert_eq!(decode_all(&[0x41, 0x00, 0x42], Encoding::UTF16LE), [0x41]);
    }

    #[test]
    fn test_utf8_every_band() {
        let cases: [(&[u8], CodePoint); 6] = [
            (b"A", 0x41),
            (&[0xC3, 0xA9], 0xE9),
            (&[0xE2, 0x82, 0xAC], 0x20AC),
            (&[0xF0, 0x9F, 0x98, 0x80], 0x1F600),
            (&[0xF8, 0x88, 0x80, 0x80, 0x80], 0x20_0000),
            (&[0xFD, 0xBF, 0xBF, 0xBF, 0xBF, 0xBF], 0x7FFF_FFFF),
        ];
        for (bytes, expected) in cases {
            assert_eq!(decode_all(bytes, Encoding::UTF8), [expected], "{bytes:02X?}");
        }
    }

    #[test]
    fn test_utf8_matches_std_for_modern_text() {
        let text = "héllo wörld € 😀\n";
        let expected: Vec<CodePoint> = text.chars().map(CodePoint::from).collect();
        assert_eq!(decode_all(text.as_bytes(), Encoding::UTF8), expected);
    }

    #[test]
    fn test_utf8_continuation_prefix_not_checked() {
        // 0x29 lacks the `10` prefix but still contributes its low 6 bits.
        assert_eq!(decode_all(&[0xC3, 0x29], Encoding::UTF8), [0xE9]);
    }

    #[test]
    fn test_utf8_invalid_lead_reports_offset() {
        for bad in [0x80u8, 0xBF, 0xFE, 0xFF] {
            let bytes = [b'o', b'k', bad, b'x'];
            let mut decoder = Decoder::new(&bytes[..], Encoding::UTF8).unwrap();
            assert_eq!(decoder.read().unwrap(), Some(u32::from(b'o')));
            assert_eq!(decoder.read().unwrap(), Some(u32::from(b'k')));
            match decoder.read() {
                Err(Error::Decode { byte, offset }) => {
                    assert_eq!(byte, bad);
                    assert_eq!(offset, 3);
                }
                other => panic!("expected decode error, got {other:?}"),
            }
            assert_eq!(decoder.decoded(), 2);
        }
    }

    #[test]
    fn test_offset_is_absolute_after_skip() {
        let mut decoder = Decoder::new(&[0x80u8][..], Encoding::UTF8)
            .unwrap()
            .starting_at(3);
        assert!(matches!(decoder.read(), Err(Error::Decode { offset: 4, .. })));
        assert_eq!(decoder.offset(), 4);
    }

    #[test]
    fn test_utf8_truncated_sequence_is_end_of_stream() {
        let mut decoder = Decoder::new(&[b'a', 0xE2, 0x82][..], Encoding::UTF8).unwrap();
        assert_eq!(decoder.read().unwrap(), Some(0x61));
        assert_eq!(decoder.read().unwrap(), None);
        assert_eq!(decoder.decoded(), 1);
        assert_eq!(decoder.offset(), 3);
    }

    #[test]
    fn test_rejects_non_concrete_encoding() {
        assert!(matches!(
            Decoder::new(&b""[..], Encoding::Auto),
            Err(Error::UnsupportedEncoding(Encoding::Auto))
        ));
    }

    struct FlakyReader {
        interrupted: bool,
    }

    impl Read for FlakyReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            Err(io::Error::other("device gone"))
        }
    }

    #[test]
    fn test_read_failure_after_interrupt() {
        let mut decoder = Decoder::new(FlakyReader { interrupted: false }, Encoding::ANSI).unwrap();
        assert!(matches!(decoder.read(), Err(Error::Read(_))));
    }
}
