use crate::{Delim, Token};

/// Discards one array or object token by token, tracking nesting depth.
///
/// The opening delimiter of the container being skipped is counted in the
/// starting depth; every later `{`/`[` raises it and every `}`/`]` lowers it.
/// Skipping is complete exactly when the depth returns to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skipper {
    depth: usize,
}

impl Skipper {
    /// A skipper for a container whose opening delimiter was already read.
    pub fn opened() -> Self {
        Self { depth: 1 }
    }

    /// A skipper starting from an arbitrary number of already-open containers.
    pub fn with_depth(depth: usize) -> Self {
        Self { depth }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_done(&self) -> bool {
        self.depth == 0
    }

    /// Accounts for one token; returns `true` once the container is balanced.
    pub fn feed(&mut self, token: &Token) -> bool {
        match token.as_delim() {
            Some(Delim::ObjectOpen | Delim::ArrayOpen) => self.depth += 1,
            Some(Delim::ObjectClose | Delim::ArrayClose) => self.depth = self.depth.saturating_sub(1),
            None => {}
        }
        self.is_done()
    }
}
