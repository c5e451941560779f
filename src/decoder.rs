use std::io::{ErrorKind, Read};

use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::input::{check_delim, start_skip, Input};
use crate::{Delim, JsonSliceError, PathTracker, SliceConfig, Token};

/// Forward-only JSON token reader over a blocking byte source.
///
/// Bytes are pulled from the reader in `buffer_size` chunks only when the
/// buffered input ends inside the next token, and are dropped as soon as the
/// lexer is done with them. Nothing is ever re-read.
pub struct TokenDecoder<R> {
    reader: R,
    input: Input,
    config: SliceConfig,
}

impl<R: Read> TokenDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, SliceConfig::default())
    }

    pub fn with_config(reader: R, config: SliceConfig) -> Self {
        Self {
            reader,
            input: Input::with_capacity(config.buffer_size),
            config,
        }
    }

    /// Bytes consumed from the stream so far.
    pub fn offset(&self) -> u64 {
        self.input.offset()
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill_buffer(&mut self) -> Result<(), JsonSliceError> {
        self.input.check_refill(self.config.max_buffer_size)?;

        let buffer = self.input.buffer_mut();
        let start_len = buffer.len();
        buffer.resize(start_len + self.config.buffer_size.max(1), 0);
        let bytes_read = loop {
            match self.reader.read(&mut buffer[start_len..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    buffer.truncate(start_len);
                    return Err(e.into());
                }
            }
        };
        buffer.truncate(start_len + bytes_read);
        self.input.filled(bytes_read);
        Ok(())
    }

    fn read_token(&mut self, discard: bool) -> Result<Token, JsonSliceError> {
        loop {
            if let Some(token) = self.input.try_token(discard)? {
                return Ok(token);
            }
            self.fill_buffer()?;
        }
    }

    /// Reads the next delimiter or scalar.
    pub fn next_token(&mut self) -> Result<Token, JsonSliceError> {
        self.read_token(false)
    }

    /// Whether the open array or object has another element. Never consumes
    /// a token.
    pub fn more(&mut self) -> Result<bool, JsonSliceError> {
        loop {
            if let Some(more) = self.input.try_more() {
                return Ok(more);
            }
            self.fill_buffer()?;
        }
    }

    /// Decodes exactly one complete value. Returns `Ok(None)` when the input
    /// ends where the value should begin.
    pub fn decode<T: DeserializeOwned>(&mut self) -> Result<Option<T>, JsonSliceError> {
        loop {
            if let Some(value) = self.input.try_value()? {
                return Ok(value);
            }
            self.fill_buffer()?;
        }
    }

    /// Consumes one token and checks that it is `expected`.
    pub fn expect_delim(&mut self, expected: Delim) -> Result<(), JsonSliceError> {
        check_delim(expected, self.next_token()?)
    }

    /// Consumes one complete value of any shape without materializing it.
    pub fn skip_value(&mut self) -> Result<(), JsonSliceError> {
        if let Some(mut skipper) = start_skip(self.read_token(true)?)? {
            while !skipper.feed(&self.read_token(true)?) {}
        }
        Ok(())
    }

    /// Positions the decoder on the value at `path`.
    #[instrument(skip(self, path), fields(depth = path.len()))]
    pub fn track_path<S: AsRef<str>>(&mut self, path: &[S]) -> Result<(), JsonSliceError> {
        let mut tracker = PathTracker::new(path);
        while !tracker.is_done() {
            let token = self.read_token(tracker.is_skipping())?;
            tracker.feed(token)?;
        }
        Ok(())
    }
}
