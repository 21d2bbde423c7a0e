//! Line-at-a-time transcoding sessions

use std::io::{Read, Write};

use serde::Serialize;

use crate::{CodePoint, Decoder, Encoder, LINE_FEED, Result};

/// Running counts for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Lines transcoded, including an unterminated final line
    pub lines: usize,
    /// Code points decoded and written
    pub chars: usize,
    /// Bytes written to the output, BOM included
    pub bytes_written: u64,
}

/// One input stream converted into one output stream
#[derive(Debug)]
pub struct Session<R, W> {
    decoder: Decoder<R>,
    encoder: Encoder<W>,
    line: Vec<CodePoint>,
    stats: Stats,
    bom_written: bool,
}

impl<R: Read, W: Write> Session<R, W> {
    /// Pair a decoder with an encoder
    pub fn new(decoder: Decoder<R>, encoder: Encoder<W>) -> Self {
        Self {
            decoder,
            encoder,
            line: Vec::new(),
            stats: Stats::default(),
            bom_written: false,
        }
    }

    /// Counts so far
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Write the output BOM before the first line.
    ///
    /// Only the first call writes anything, so `run` after an explicit
    /// `write_bom` still emits a single BOM.
    pub fn write_bom(&mut self) -> Result<()> {
        if self.bom_written {
            return Ok(());
        }
        self.encoder.write_bom()?;
        self.bom_written = true;
        self.stats.bytes_written = self.encoder.bytes_written();
        Ok(())
    }

    /// Transcode the next line, line feed included.
    ///
    /// Returns the number of code points written, or `None` once the input
    /// is exhausted. A final line without a line feed is still written. On a
    /// decode error nothing from the current line reaches the output.
    pub fn transcode_line(&mut self) -> Result<Option<usize>> {
        self.line.clear();
        while let Some(value) = self.decoder.read()? {
            self.line.push(value);
            if value == LINE_FEED {
                break;
            }
        }

        if self.line.is_empty() {
            return Ok(None);
        }

        for &value in &self.line {
            self.encoder.write(value)?;
        }

        self.stats.lines += 1;
        self.stats.chars += self.line.len();
        self.stats.bytes_written = self.encoder.bytes_written();
        tracing::trace!(line = self.stats.lines, chars = self.line.len(), "line transcoded");

        Ok(Some(self.line.len()))
    }

    /// Write the BOM, transcode every line and flush the output
    pub fn run(&mut self) -> Result<Stats> {
        self.write_bom()?;
        while self.transcode_line()?.is_some() {}
        self.encoder.flush()?;

        tracing::debug!(
            from = %self.decoder.encoding(),
            to = %self.encoder.encoding(),
            lines = self.stats.lines,
            chars = self.stats.chars,
            bytes = self.stats.bytes_written,
            "session finished"
        );
        Ok(self.stats)
    }

    /// Give back the decoder and encoder
    pub fn into_inner(self) -> (Decoder<R>, Encoder<W>) {
        (self.decoder, self.encoder)
    }
}
