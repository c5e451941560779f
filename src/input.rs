use bytes::{Buf, BytesMut};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::lexer::{Lexer, Step};
use crate::{Delim, JsonSliceError, Skipper, Token};

/// Buffered bytes plus lexer state, shared by the sync and async decoders.
///
/// The `try_*` methods answer `None` when the buffer has to be refilled
/// before they can finish. Bytes the lexer is done with are dropped from the
/// front of the buffer either way, so only the token or element in progress
/// stays buffered across a refill.
#[derive(Debug)]
pub(crate) struct Input {
    buffer: BytesMut,
    lexer: Lexer,
    eof: bool,
}

impl Input {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            lexer: Lexer::new(),
            eof: false,
        }
    }

    pub(crate) fn offset(&self) -> u64 {
        self.lexer.offset()
    }

    fn settle<T>(&mut self, step: Step<T>) -> Option<T> {
        match step {
            Step::Ready(value, consumed) => {
                self.buffer.advance(consumed);
                Some(value)
            }
            Step::NeedMore(consumed) => {
                self.buffer.advance(consumed);
                None
            }
        }
    }

    /// Next token; with `discard` set, strings come back empty and their
    /// bytes are released while they are scanned.
    pub(crate) fn try_token(&mut self, discard: bool) -> Result<Option<Token>, JsonSliceError> {
        let step = if discard {
            self.lexer.skip_token(&self.buffer, self.eof)?
        } else {
            self.lexer.next_token(&self.buffer, self.eof)?
        };
        Ok(self.settle(step))
    }

    pub(crate) fn try_more(&mut self) -> Option<bool> {
        let step = self.lexer.more(&self.buffer, self.eof);
        self.settle(step)
    }

    /// `Some(None)` when the input ended where the value should begin.
    pub(crate) fn try_value<T: DeserializeOwned>(&mut self) -> Result<Option<Option<T>>, JsonSliceError> {
        match self.lexer.next_value(&self.buffer, self.eof)? {
            Step::Ready(Some(range), consumed) => {
                let mut bytes = self.buffer[range].to_vec();
                self.buffer.advance(consumed);
                Ok(Some(Some(simd_json::from_slice(&mut bytes)?)))
            }
            Step::Ready(None, consumed) => {
                self.buffer.advance(consumed);
                Ok(Some(None))
            }
            Step::NeedMore(consumed) => {
                self.buffer.advance(consumed);
                Ok(None)
            }
        }
    }

    /// Fails when another read cannot help: the source is finished, or the
    /// token in progress already fills `max_buffer_size`.
    pub(crate) fn check_refill(&self, max_buffer_size: usize) -> Result<(), JsonSliceError> {
        if self.eof {
            return Err(JsonSliceError::UnexpectedEof {
                offset: self.offset() + self.buffer.len() as u64,
            });
        }
        if self.buffer.len() >= max_buffer_size {
            return Err(JsonSliceError::BufferOverflow {
                limit: max_buffer_size,
            });
        }
        Ok(())
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buffer
    }

    pub(crate) fn filled(&mut self, bytes_read: usize) {
        if bytes_read == 0 {
            self.eof = true;
        }
        trace!(bytes_read, buffered = self.buffer.len(), "filled buffer");
        crate::metrics::record_buffer_size(self.buffer.len());
    }
}

pub(crate) fn check_delim(expected: Delim, token: Token) -> Result<(), JsonSliceError> {
    match token {
        Token::Delim(d) if d == expected => Ok(()),
        other => Err(JsonSliceError::UnexpectedToken {
            expected: expected.expected(),
            found: other.to_string(),
        }),
    }
}

/// First step of skipping a value: `Some` when `token` opened a container
/// whose remaining tokens still have to be drained.
pub(crate) fn start_skip(token: Token) -> Result<Option<Skipper>, JsonSliceError> {
    match token {
        Token::Delim(d) if d.is_open() => Ok(Some(Skipper::opened())),
        Token::Delim(d) => Err(JsonSliceError::UnexpectedToken {
            expected: "a value",
            found: format!("'{}'", d),
        }),
        _ => Ok(None),
    }
}
