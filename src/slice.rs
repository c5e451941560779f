use std::io::Read;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::{Delim, JsonSliceError, SliceConfig, TokenDecoder};

/// Where a cursor is in its life. `Exhausted` and `Errored` are terminal.
#[derive(Debug, Clone)]
pub(crate) enum CursorState {
    Active,
    Exhausted,
    Errored(JsonSliceError),
}

impl CursorState {
    /// Answer for a cursor that will never touch its reader again.
    pub(crate) fn terminal<T>(&self) -> Option<Result<Option<T>, JsonSliceError>> {
        match self {
            CursorState::Active => None,
            CursorState::Exhausted => Some(Ok(None)),
            CursorState::Errored(e) => Some(Err(e.clone())),
        }
    }

    /// Records the outcome of one pull and passes it through.
    pub(crate) fn settle<T>(
        &mut self,
        outcome: Result<Option<T>, JsonSliceError>,
    ) -> Result<Option<T>, JsonSliceError> {
        match &outcome {
            Ok(Some(_)) => crate::metrics::record_element(),
            Ok(None) => *self = CursorState::Exhausted,
            Err(e) => {
                debug!(error = %e, "cursor failed");
                *self = CursorState::Errored(e.clone());
            }
        }
        outcome
    }
}

/// Lazily decodes the elements of the array found at a field path.
///
/// Created by [`slice_iterator`] or [`SliceIterator::with_config`]. Navigation
/// happens up front; any failure there is reported by the first pull.
pub struct SliceIterator<R, T> {
    decoder: TokenDecoder<R>,
    state: CursorState,
    error_yielded: bool,
    _phantom: PhantomData<fn() -> T>,
}

/// Navigates `reader` to the array at `path` and returns a cursor over its
/// elements. An empty path means the document root is the array.
///
/// ```
/// #[derive(serde::Deserialize)]
/// struct Item {
///     id: u32,
/// }
///
/// let body = r#"{"meta": {"page": 1}, "data": {"results": [{"id": 1}, {"id": 2}]}}"#;
/// let ids: Vec<u32> = jsonslice::slice_iterator::<_, Item, _>(body.as_bytes(), &["data", "results"])
///     .map(|item| item.map(|i| i.id))
///     .collect::<Result<_, _>>()?;
/// assert_eq!(ids, [1, 2]);
/// # Ok::<(), jsonslice::JsonSliceError>(())
/// ```
pub fn slice_iterator<R, T, S>(reader: R, path: &[S]) -> SliceIterator<R, T>
where
    R: Read,
    T: DeserializeOwned,
    S: AsRef<str>,
{
    SliceIterator::with_config(reader, path, SliceConfig::default())
}

impl<R: Read, T: DeserializeOwned> SliceIterator<R, T> {
    #[instrument(skip(reader, path, config), fields(path_len = path.len()))]
    pub fn with_config<S: AsRef<str>>(reader: R, path: &[S], config: SliceConfig) -> Self {
        let mut decoder = TokenDecoder::with_config(reader, config);
        let state = match open_array(&mut decoder, path) {
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
            error_yielded: false,
            _phantom: PhantomData,
        }
    }

    /// Pulls the next element. `Ok(None)` means the array is exhausted; after
    /// that, or after an error, every call returns the same answer.
    pub fn next_element(&mut self) -> Result<Option<T>, JsonSliceError> {
        if let Some(answer) = self.state.terminal() {
            return answer;
        }
        let outcome = self.pull();
        self.state.settle(outcome)
    }

    /// Decodes the next element into `dst`, returning whether one was produced.
    pub fn next_into(&mut self, dst: &mut T) -> Result<bool, JsonSliceError> {
        match self.next_element()? {
            Some(value) => {
                *dst = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn pull(&mut self) -> Result<Option<T>, JsonSliceError> {
        if !self.decoder.more()? {
            self.decoder.expect_delim(Delim::ArrayClose)?;
            return Ok(None);
        }
        let element = self.decoder.decode::<T>()?;
        if element.is_none() {
            warn!(offset = self.decoder.offset(), "stream ended between array elements");
        }
        Ok(element)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, CursorState::Exhausted)
    }

    /// Bytes consumed from the reader so far.
    pub fn offset(&self) -> u64 {
        self.decoder.offset()
    }

    /// Gives the reader back. Bytes buffered but not consumed are dropped.
    pub fn into_inner(self) -> R {
        self.decoder.into_inner()
    }
}

fn open_array<R: Read, S: AsRef<str>>(
    decoder: &mut TokenDecoder<R>,
    path: &[S],
) -> Result<(), JsonSliceError> {
    decoder.track_path(path)?;
    decoder.expect_delim(Delim::ArrayOpen)
}

impl<R: Read, T: DeserializeOwned> Iterator for SliceIterator<R, T> {
    type Item = Result<T, JsonSliceError>;

    /// Yields a terminal error once, then `None`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.error_yielded {
            return None;
        }
        match self.next_element() {
            Ok(item) => item.map(Ok),
            Err(e) => {
                self.error_yielded = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read, T: DeserializeOwned> FusedIterator for SliceIterator<R, T> {}
