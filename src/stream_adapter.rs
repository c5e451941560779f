use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, Bytes};
use futures::Stream;
use tokio::io::{AsyncRead, ReadBuf};

/// Adapts a stream of byte chunks, such as an HTTP response body, into an
/// [`AsyncRead`] so it can be handed to [`AsyncSliceIterator`](crate::AsyncSliceIterator).
pub struct StreamToAsyncRead<S> {
    stream: S,
    pending: Bytes,
}

impl<S> StreamToAsyncRead<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            pending: Bytes::new(),
        }
    }
}

impl<S, B> AsyncRead for StreamToAsyncRead<S>
where
    S: Stream<Item = Result<B, std::io::Error>> + Unpin,
    B: Into<Bytes>,
{
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        while self.pending.is_empty() {
            match Pin::new(&mut self.stream).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => self.pending = chunk.into(),
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Err(e)),
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }

        let len = std::cmp::min(self.pending.len(), buf.remaining());
        buf.put_slice(&self.pending[..len]);
        self.pending.advance(len);
        Poll::Ready(Ok(()))
    }
}
