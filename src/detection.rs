//! Input format detection from the byte-order mark
//!
//! The detector peeks at the first bytes of a stream. A BOM decides the
//! format outright; without one, a long enough pure 7-bit sample is taken to
//! be ANSI text and anything else is left unresolved.

use std::io::{Read, Seek, SeekFrom};

use serde::Serialize;

use crate::{Encoding, Error, Result};

/// Byte-order marks in match order
const BOMS: [(&[u8], Encoding); 3] = [
    (&[0xFE, 0xFF], Encoding::UTF16BE),
    (&[0xFF, 0xFE], Encoding::UTF16LE),
    (&[0xEF, 0xBB, 0xBF], Encoding::UTF8),
];

/// Smallest sample that can hold the longest BOM
const MIN_SAMPLE_SIZE: usize = 3;

/// Result of sniffing the start of an input stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    /// Detected encoding, `None` when the data is inconclusive
    pub encoding: Option<Encoding>,
    /// Length of the BOM found at the start of the stream (0 if none)
    pub bom_len: usize,
    /// Bytes peeked from the start of the stream
    pub sample: Vec<u8>,
}

impl Detection {
    /// Whether a byte-order mark was found
    pub fn bom_detected(&self) -> bool {
        self.bom_len > 0
    }

    /// Turn the requested input format into a concrete one.
    ///
    /// [`Encoding::Auto`] takes the detected encoding and fails with
    /// [`Error::UnresolvedEncoding`] when there is none; a concrete request
    /// always wins over the detection.
    pub fn resolve(&self, requested: Encoding) -> Result<Encoding> {
        match requested {
            Encoding::Auto => self.encoding.ok_or(Error::UnresolvedEncoding),
            Encoding::Unspecified => Err(Error::UnsupportedEncoding(requested)),
            concrete => Ok(concrete),
        }
    }
}

/// BOM sniffer with an ASCII fallback
#[derive(Debug, Clone)]
pub struct EncodingDetector {
    /// Maximum bytes to peek at
    sample_size: usize,
    /// Minimum sample length before all-ASCII data is called ANSI
    ascii_threshold: usize,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self {
            sample_size: 32,
            ascii_threshold: 16,
        }
    }
}

impl EncodingDetector {
    /// Create a new encoding detector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create detector with custom sample size
    ///
    /// Sizes below the longest BOM (3 bytes) are raised to it.
    pub fn with_sample_size(sample_size: usize) -> Self {
        Self {
            sample_size: sample_size.max(MIN_SAMPLE_SIZE),
            ..Self::default()
        }
    }

    /// Set how many bytes must be seen before all-ASCII data counts as ANSI
    pub fn ascii_threshold(mut self, ascii_threshold: usize) -> Self {
        self.ascii_threshold = ascii_threshold;
        self
    }

    /// Classify the first bytes of a stream
    pub fn detect(&self, data: &[u8]) -> Result<Detection> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }

        let sample = &data[..data.len().min(self.sample_size)];

        // Check for BOM first
        if let Some((encoding, bom_len)) = self.detect_bom(sample) {
            return Ok(Detection {
                encoding: Some(encoding),
                bom_len,
                sample: sample.to_vec(),
            });
        }

        let encoding = if sample.len() >= self.ascii_threshold && sample.is_ascii() {
            Some(Encoding::ANSI)
        } else {
            None
        };

        Ok(Detection {
            encoding,
            bom_len: 0,
            sample: sample.to_vec(),
        })
    }

    /// Peek at the start of `stream` and leave it positioned after any BOM.
    pub fn sniff<R: Read + Seek>(&self, stream: &mut R) -> Result<Detection> {
        stream.seek(SeekFrom::Start(0)).map_err(Error::Read)?;

        let mut sample = Vec::with_capacity(self.sample_size);
        stream
            .by_ref()
            .take(self.sample_size as u64)
            .read_to_end(&mut sample)
            .map_err(Error::Read)?;

        let detection = self.detect(&sample)?;
        stream
            .seek(SeekFrom::Start(detection.bom_len as u64))
            .map_err(Error::Read)?;

        tracing::debug!(
            encoding = ?detection.encoding,
            bom_len = detection.bom_len,
            peeked = detection.sample.len(),
            "sniffed input format"
        );
        Ok(detection)
    }

    /// Detect BOM (Byte Order Mark)
    fn detect_bom(&self, data: &[u8]) -> Option<(Encoding, usize)> {
        BOMS.iter()
            .find(|(bom, _)| data.starts_with(bom))
            .map(|&(bom, encoding)| (encoding, bom.len()))
    }
}
