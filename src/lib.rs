//! # txconv - Text File Encoding Converter
//!
//! Converts text between legacy 8-bit ("ANSI") text and the Unicode transfer
//! encodings UTF-8, UTF-16LE and UTF-16BE, one code point at a time.
//!
//! ## Features
//!
//! - **Byte-order-mark sniffing** to resolve an `Auto` input format
//! - **Extended UTF-8** with the pre-2003 5- and 6-byte sequences
//! - **Line-oriented sessions** with running line and character counts
//! - **Comprehensive error handling** with byte offsets for malformed input
//!
//! ## Quick Start
//!
//! ```rust
//! use txconv::{convert, Encoding};
//!
//! let utf16 = convert(b"Hello\n", Encoding::ANSI, Encoding::UTF16LE).unwrap();
//! assert_eq!(
//!     utf16,
//!     [0xFF, 0xFE, 0x48, 0, 0x65, 0, 0x6C, 0, 0x6C, 0, 0x6F, 0, 0x0A, 0]
//! );
//! ```

#![deny(missing_docs)]

use std::fmt;
use std::io::{self, Cursor, Read, Seek, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod detection;
pub mod reader;
pub mod transcode;
mod utf8;
pub mod writer;

pub use detection::{Detection, EncodingDetector};
pub use reader::Decoder;
pub use transcode::{Session, Stats};
pub use utf8::MAX_SEQUENCE_LEN;
pub use writer::{Encoder, encode_code_point};

/// One decoded character, independent of its byte encoding.
///
/// Values are not checked against the Unicode scalar range; anything up to
/// `0x7FFF_FFFF` can be decoded and re-encoded.
pub type CodePoint = u32;

/// Largest value representable in extended UTF-8.
pub const MAX_CODE_POINT: CodePoint = 0x7FFF_FFFF;

/// Line-feed code point that terminates a line.
pub const LINE_FEED: CodePoint = 0x0A;

/// Result type for transcoding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while transcoding
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Byte that cannot start a UTF-8 sequence
    #[error("invalid UTF-8 leading byte 0x{byte:02X} at offset {offset}")]
    Decode {
        /// The offending byte
        byte: u8,
        /// Stream offset just past the offending byte
        offset: u64,
    },
    /// The input stream failed
    #[error("failed reading input")]
    Read(#[source] io::Error),
    /// The output sink failed
    #[error("failed writing output")]
    Write(#[source] io::Error),
    /// Auto-detection could not determine the input format
    #[error("can't identify input format automatically, specify it explicitly")]
    UnresolvedEncoding,
    /// The input contains no bytes at all
    #[error("empty input")]
    EmptyInput,
    /// An encoding tag that does not name a concrete byte format
    #[error("{0} is not a concrete encoding")]
    UnsupportedEncoding(Encoding),
    /// Code point too large for extended UTF-8
    #[error("code point 0x{0:X} is out of range")]
    CodePointOutOfRange(CodePoint),
    /// Encoding name that is not recognized
    #[error("unrecognized encoding: {0}")]
    UnknownEncoding(String),
}

/// Text encodings known to the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Encoding {
    /// Not known, not initialized, or not resolvable
    Unspecified,
    /// Determine the input format from the data (input only)
    Auto,
    /// 8-bit single-byte text
    ANSI,
    /// UTF-8 Unicode encoding (variable length, 1-6 bytes)
    UTF8,
    /// UTF-16LE Unicode encoding (little endian)
    UTF16LE,
    /// UTF-16BE Unicode encoding (big endian)
    UTF16BE,
}

impl Encoding {
    /// Get the canonical name of this encoding
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Unspecified => "UNKNOWN",
            Encoding::Auto => "AUTO",
            Encoding::ANSI => "ANSI",
            Encoding::UTF8 => "UTF8",
            Encoding::UTF16LE => "UTF16",
            Encoding::UTF16BE => "UTF16BE",
        }
    }

    /// Look up an encoding by name, ignoring case.
    ///
    /// Returns [`Encoding::Unspecified`] for names that are not recognized.
    pub fn from_name(name: &str) -> Encoding {
        match name.trim().to_ascii_uppercase().as_str() {
            "AUTO" => Encoding::Auto,
            "ANSI" => Encoding::ANSI,
            "UTF8" | "UTF-8" => Encoding::UTF8,
            "UTF16" | "UTF-16" | "UTF16LE" | "UTF-16LE" => Encoding::UTF16LE,
            "UTF16BE" | "UTF-16BE" => Encoding::UTF16BE,
            _ => Encoding::Unspecified,
        }
    }

    /// True for the four formats that have a byte layout
    pub fn is_concrete(self) -> bool {
        matches!(
            self,
            Encoding::ANSI | Encoding::UTF8 | Encoding::UTF16LE | Encoding::UTF16BE
        )
    }

    /// Get the byte order mark (BOM) for this encoding if it has one
    pub fn bom(self) -> Option<&'static [u8]> {
        match self {
            Encoding::UTF8 => Some(&[0xEF, 0xBB, 0xBF]),
            Encoding::UTF16LE => Some(&[0xFF, 0xFE]),
            Encoding::UTF16BE => Some(&[0xFE, 0xFF]),
            _ => None,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match Encoding::from_name(s) {
            Encoding::Unspecified => Err(Error::UnknownEncoding(s.to_string())),
            encoding => Ok(encoding),
        }
    }
}

/// Outcome of a whole conversion
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Resolved input format
    pub input: Encoding,
    /// Output format
    pub output: Encoding,
    /// What the sniffer saw at the start of the input
    pub detection: Detection,
    /// Running counts for the session
    pub stats: Stats,
}

/// Convert a seekable input stream into `output`.
///
/// `from` may be [`Encoding::Auto`]; a leading BOM is skipped either way.
pub fn transcode<R, W>(mut input: R, from: Encoding, output: W, to: Encoding) -> Result<Report>
where
    R: Read + Seek,
    W: Write,
{
    let detection = EncodingDetector::new().sniff(&mut input)?;
    let resolved = detection.resolve(from)?;

    let decoder = Decoder::new(input, resolved)?.starting_at(detection.bom_len as u64);
    let encoder = Encoder::new(output, to)?;
    let mut session = Session::new(decoder, encoder);
    let stats = session.run()?;

    Ok(Report {
        input: resolved,
        output: to,
        detection,
        stats,
    })
}

/// Convert an in-memory buffer, BOM included in the result.
pub fn convert(input: &[u8], from: Encoding, to: Encoding) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(input.len() * 2);
    transcode(Cursor::new(input), from, &mut output, to)?;
    Ok(output)
}
