use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use tokio::io::AsyncRead;
use tokio_stream::Stream;
use tracing::{debug, instrument, warn};

use crate::slice::CursorState;
use crate::{AsyncTokenDecoder, Delim, JsonSliceError, SliceConfig};

/// Async cursor over the elements of the array found at a field path.
///
/// ```no_run
/// use tokio_stream::StreamExt;
///
/// #[derive(Debug, serde::Deserialize)]
/// struct Event {
///     kind: String,
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let file = tokio::fs::File::open("events.json").await?;
///     let cursor = jsonslice::AsyncSliceIterator::<_, Event>::open(file, &["events"]).await;
///     let events = cursor.into_stream();
///     tokio::pin!(events);
///     while let Some(event) = events.next().await {
///         println!("{:?}", event?);
///     }
///     Ok(())
/// }
/// ```
pub struct AsyncSliceIterator<R, T> {
    decoder: AsyncTokenDecoder<R>,
    state: CursorState,
    _phantom: PhantomData<fn() -> T>,
}

impl<R: AsyncRead + Unpin, T: DeserializeOwned> AsyncSliceIterator<R, T> {
    pub async fn open<S: AsRef<str>>(reader: R, path: &[S]) -> Self {
        Self::open_with_config(reader, path, SliceConfig::default()).await
    }

    #[instrument(skip(reader, path, config), fields(path_len = path.len()))]
    pub async fn open_with_config<S: AsRef<str>>(reader: R, path: &[S], config: SliceConfig) -> Self {
        let mut decoder = AsyncTokenDecoder::with_config(reader, config);
        let opened = match decoder.track_path(path).await {
            Ok(()) => decoder.expect_delim(Delim::ArrayOpen).await,
            Err(e) => Err(e),
        };
        let state = match opened {
            Ok(()) => {
                debug!(offset = decoder.offset(), "positioned at array start");
                CursorState::Active
            }
            Err(e) => {
                debug!(error = %e, "navigation failed");
                CursorState::Errored(e)
            }
        };
        Self {
            decoder,
            state,
            _phantom: PhantomData,
        }
    }

    /// Pulls the next element; terminal answers repeat without reading.
    pub async fn next_element(&mut self) -> Result<Option<T>, JsonSliceError> {
        if let Some(answer) = self.state.terminal() {
            return answer;
        }
        let outcome = self.pull().await;
        self.state.settle(outcome)
    }

    pub async fn next_into(&mut self, dst: &mut T) -> Result<bool, JsonSliceError> {
        match self.next_element().await? {
            Some(value) => {
                *dst = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull(&mut self) -> Result<Option<T>, JsonSliceError> {
        if !self.decoder.more().await? {
            self.decoder.expect_delim(Delim::ArrayClose).await?;
            return Ok(None);
        }
        let element = self.decoder.decode::<T>().await?;
        if element.is_none() {
            warn!(offset = self.decoder.offset(), "stream ended between array elements");
        }
        Ok(element)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, CursorState::Exhausted)
    }

    pub fn offset(&self) -> u64 {
        self.decoder.offset()
    }

    pub fn into_inner(self) -> R {
        self.decoder.into_inner()
    }

    /// Turns the cursor into a stream that ends after exhaustion or after
    /// yielding the first error.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<T, JsonSliceError>> {
        async_stream::stream! {
            loop {
                match self.next_element().await {
                    Ok(Some(item)) => yield Ok(item),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        }
    }
}
