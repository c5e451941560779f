//! # Streaming JSON slices
//!
//! This library walks a JSON byte stream down a sequence of field names to an
//! array, then decodes that array's elements one at a time. Sibling fields
//! along the way are skipped token by token and never materialized, so a
//! response such as `{"meta": {...}, "data": {"results": [ ...millions... ]}}`
//! can be processed with memory bounded by the largest single element.
//!
//! ## Example
//!
//! ```
//! use jsonslice::{slice_iterator, JsonSliceError};
//!
//! #[derive(Debug, serde::Deserialize, PartialEq)]
//! struct Value {
//!     #[serde(rename = "Value")]
//!     value: i32,
//! }
//!
//! let body = r#"{"skip": [[1, 2], {"p1": 0}], "p1": [{"Value": 1}, {"Value": 2}]}"#;
//! let mut cursor = slice_iterator::<_, Value, _>(body.as_bytes(), &["p1"]);
//!
//! assert_eq!(cursor.next_element()?, Some(Value { value: 1 }));
//! assert_eq!(cursor.next_element()?, Some(Value { value: 2 }));
//! assert_eq!(cursor.next_element()?, None);
//!
//! let missing = slice_iterator::<_, Value, _>(body.as_bytes(), &["p2"]).next_element();
//! assert!(matches!(missing, Err(JsonSliceError::NotFound { .. })));
//! # Ok::<(), JsonSliceError>(())
//! ```
//!
//! The same navigation is available over [`tokio::io::AsyncRead`] through
//! [`AsyncSliceIterator`].

#[cfg(test)]
mod tests;

mod error;
pub use error::*;

mod token;
pub use token::*;

mod lexer;
mod input;

mod skip;
pub use skip::*;

mod path;
pub use path::*;

mod config;
pub use config::*;

mod decoder;
pub use decoder::*;

mod slice;
pub use slice::{slice_iterator, SliceIterator};

mod async_decoder;
pub use async_decoder::*;

mod async_slice;
pub use async_slice::*;

mod reader;
pub use reader::*;

mod stream_adapter;
pub use stream_adapter::*;

mod metrics;
#[cfg(feature = "metrics")]
pub use metrics::gather_metrics;
