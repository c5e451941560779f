use serde::de::DeserializeOwned;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    time::timeout,
};
use tracing::instrument;

use crate::input::{check_delim, start_skip, Input};
use crate::{Delim, JsonSliceError, PathTracker, SliceConfig, Token};

/// Async counterpart of [`TokenDecoder`](crate::TokenDecoder): the same lexer
/// and the same operations, refilled from an [`AsyncRead`].
///
/// Each refill is bounded by [`SliceConfig::timeout`] when one is set.
pub struct AsyncTokenDecoder<R> {
    reader: R,
    input: Input,
    config: SliceConfig,
}

impl<R: AsyncRead + Unpin> AsyncTokenDecoder<R> {
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

    pub fn offset(&self) -> u64 {
        self.input.offset()
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    #[instrument(level = "trace", skip(self))]
    async fn fill_buffer(&mut self) -> Result<(), JsonSliceError> {
        self.input.check_refill(self.config.max_buffer_size)?;

        let buffer = self.input.buffer_mut();
        buffer.reserve(self.config.buffer_size.max(1));
        let read_fut = self.reader.read_buf(buffer);
        let bytes_read = match self.config.timeout() {
            Some(t) => timeout(t, read_fut)
                .await
                .map_err(|_| JsonSliceError::Timeout)??,
            None => read_fut.await?,
        };
        self.input.filled(bytes_read);
        Ok(())
    }

    async fn read_token(&mut self, discard: bool) -> Result<Token, JsonSliceError> {
        loop {
            if let Some(token) = self.input.try_token(discard)? {
                return Ok(token);
            }
            self.fill_buffer().await?;
        }
    }

    pub async fn next_token(&mut self) -> Result<Token, JsonSliceError> {
        self.read_token(false).await
    }

    pub async fn more(&mut self) -> Result<bool, JsonSliceError> {
        loop {
            if let Some(more) = self.input.try_more() {
                return Ok(more);
            }
            self.fill_buffer().await?;
        }
    }

    pub async fn decode<T: DeserializeOwned>(&mut self) -> Result<Option<T>, JsonSliceError> {
        loop {
            if let Some(value) = self.input.try_value()? {
                return Ok(value);
            }
            self.fill_buffer().await?;
        }
    }

    pub async fn expect_delim(&mut self, expected: Delim) -> Result<(), JsonSliceError> {
        check_delim(expected, self.next_token().await?)
    }

    pub async fn skip_value(&mut self) -> Result<(), JsonSliceError> {
        if let Some(mut skipper) = start_skip(self.read_token(true).await?)? {
            while !skipper.feed(&self.read_token(true).await?) {}
        }
        Ok(())
    }

    #[instrument(skip(self, path), fields(depth = path.len()))]
    pub async fn track_path<S: AsRef<str>>(&mut self, path: &[S]) -> Result<(), JsonSliceError> {
        let mut tracker = PathTracker::new(path);
        while !tracker.is_done() {
            let token = self.read_token(tracker.is_skipping()).await?;
            tracker.feed(token)?;
        }
        Ok(())
    }
}
