use tracing::{debug, trace};

use crate::{Delim, JsonSliceError, Skipper, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Track {
    /// Waiting for the `{` of the object holding the current segment.
    OpenObject,
    /// Reading field names at the current level.
    FieldName,
    /// A non-matching name was read; its value comes next.
    FieldValue,
    Skipping(Skipper),
    Done,
}

/// Walks a token stream down a sequence of field names.
///
/// Feed it tokens one at a time until [`PathTracker::is_done`] reports that
/// the stream sits right after the last matched field name, i.e. on the value
/// the path points to. Sibling fields are discarded as they go by.
#[derive(Debug, Clone)]
pub struct PathTracker {
    path: Vec<String>,
    found: usize,
    state: Track,
}

impl PathTracker {
    pub fn new<S: AsRef<str>>(path: &[S]) -> Self {
        let path: Vec<String> = path.iter().map(|s| s.as_ref().to_owned()).collect();
        let state = if path.is_empty() {
            Track::Done
        } else {
            Track::OpenObject
        };
        Self {
            path,
            found: 0,
            state,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == Track::Done
    }

    /// Whether the next token belongs to a sibling value that is being
    /// discarded, so its strings need not be kept.
    pub fn is_skipping(&self) -> bool {
        matches!(self.state, Track::FieldValue | Track::Skipping(_))
    }

    /// Number of leading segments matched so far.
    pub fn found(&self) -> usize {
        self.found
    }

    pub fn feed(&mut self, token: Token) -> Result<(), JsonSliceError> {
        self.state = match self.state {
            Track::Done => Track::Done,
            Track::OpenObject => match token {
                Token::Delim(Delim::ObjectOpen) => Track::FieldName,
                other => {
                    return Err(JsonSliceError::UnexpectedToken {
                        expected: Delim::ObjectOpen.expected(),
                        found: other.to_string(),
                    })
                }
            },
            Track::FieldName => match token {
                Token::Delim(Delim::ObjectClose) => {
                    debug!(segment = %self.path[self.found], "field missing at this level");
                    return Err(self.not_found());
                }
                Token::String(name) if name == self.path[self.found] => {
                    self.found += 1;
                    trace!(field = %name, found = self.found, "matched path segment");
                    if self.found == self.path.len() {
                        Track::Done
                    } else {
                        Track::OpenObject
                    }
                }
                Token::String(name) => {
                    trace!(field = %name, "skipping sibling field");
                    Track::FieldValue
                }
                other => {
                    return Err(JsonSliceError::UnexpectedToken {
                        expected: "field name",
                        found: other.to_string(),
                    })
                }
            },
            Track::FieldValue => match token.as_delim() {
                Some(d) if d.is_open() => {
                    crate::metrics::record_skipped_value();
                    Track::Skipping(Skipper::opened())
                }
                Some(d) => {
                    return Err(JsonSliceError::UnexpectedToken {
                        expected: "field value",
                        found: format!("'{}'", d),
                    })
                }
                None => Track::FieldName,
            },
            Track::Skipping(mut skipper) => {
                if skipper.feed(&token) {
                    Track::FieldName
                } else {
                    Track::Skipping(skipper)
                }
            }
        };
        Ok(())
    }

    fn not_found(&self) -> JsonSliceError {
        JsonSliceError::NotFound {
            path: self.path.join("."),
        }
    }
}
