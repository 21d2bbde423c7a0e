//! Code point encoding into a byte sink
//!
//! [`encode_code_point`] is the pure byte-layout step; [`Encoder`] wraps a
//! [`Write`] sink around it and adds the one-time BOM prologue.

use std::io::Write;

use crate::utf8::{
    self, CONTINUATION_BITS, CONTINUATION_MASK, CONTINUATION_PREFIX, MAX_SEQUENCE_LEN,
};
use crate::{CodePoint, Encoding, Error, Result};

/// Encode `value` into `buf`, returning the number of bytes used.
///
/// ANSI keeps only the low 8 bits and UTF-16 only the low 16 bits, without
/// reporting the loss. UTF-8 uses the extended 1-6 byte layout and fails only
/// for values above [`crate::MAX_CODE_POINT`].
pub fn encode_code_point(
    value: CodePoint,
    encoding: Encoding,
    buf: &mut [u8; MAX_SEQUENCE_LEN],
) -> Result<usize> {
    match encoding {
        Encoding::ANSI => {
            buf[0] = value as u8;
            Ok(1)
        }
        Encoding::UTF16LE => {
            buf[..2].copy_from_slice(&(value as u16).to_le_bytes());
            Ok(2)
        }
        Encoding::UTF16BE => {
            buf[..2].copy_from_slice(&(value as u16).to_be_bytes());
            Ok(2)
        }
        Encoding::UTF8 => {
            let band = utf8::band_for(value).ok_or(Error::CodePointOutOfRange(value))?;

            // Continuations are filled from the end so the lead byte keeps the top bits.
            let mut rest = value;
            for slot in buf[1..band.len()].iter_mut().rev() {
                *slot = CONTINUATION_PREFIX | (rest as u8 & CONTINUATION_MASK);
                rest >>= CONTINUATION_BITS;
            }
            buf[0] = band.lead_pattern | rest as u8;
            Ok(band.len())
        }
        Encoding::Auto | Encoding::Unspecified => Err(Error::UnsupportedEncoding(encoding)),
    }
}

/// Writes code points to `W` in a fixed target encoding
#[derive(Debug)]
pub struct Encoder<W> {
    inner: W,
    encoding: Encoding,
    written: u64,
    truncated: bool,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder for a concrete target encoding
    pub fn new(inner: W, encoding: Encoding) -> Result<Self> {
        if !encoding.is_concrete() {
            return Err(Error::UnsupportedEncoding(encoding));
        }
        Ok(Self {
            inner,
            encoding,
            written: 0,
            truncated: false,
        })
    }

    /// Target encoding
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Bytes handed to the sink so far, BOM included
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Write the target encoding's byte order mark, if it has one
    pub fn write_bom(&mut self) -> Result<()> {
        match self.encoding.bom() {
            Some(bom) => self.write_bytes(bom),
            None => Ok(()),
        }
    }

    /// Encode one code point
    pub fn write(&mut self, value: CodePoint) -> Result<()> {
        if self.encoding == Encoding::ANSI && value > 0xFF && !self.truncated {
            self.truncated = true;
            tracing::warn!(value, "code point above 0xFF truncated to 8 bits");
        }

        let mut buf = [0u8; MAX_SEQUENCE_LEN];
        let len = encode_code_point(value, self.encoding, &mut buf)?;
        self.write_bytes(&buf[..len])
    }

    /// Flush the underlying sink
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(Error::Write)
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).map_err(Error::Write)?;
        self.written += bytes.len() as u64;
        Ok(())
    }
}
