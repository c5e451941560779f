//! Sans-IO JSON lexer.
//!
//! The lexer never reads from a source itself. Every operation looks at the
//! bytes buffered so far plus an end-of-input flag and answers either
//! [`Step::Ready`] with the number of bytes it consumed, or [`Step::NeedMore`]
//! when the buffer ends inside the next token. `NeedMore` carries the length
//! of the prefix the lexer is finished with (whitespace, separators, the body
//! of a discarded string); the caller drops it, refills, and retries the same
//! operation on what is left.

use std::ops::Range;

use crate::{Delim, JsonSliceError, Token};

#[derive(Debug)]
pub(crate) enum Step<T> {
    Ready(T, usize),
    NeedMore(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    TopValue,
    ArrayStart,
    ArrayValue,
    ArrayComma,
    ObjectStart,
    ObjectKey,
    ObjectColon,
    ObjectValue,
    ObjectComma,
}

impl State {
    fn expects_value(self) -> bool {
        matches!(
            self,
            State::TopValue | State::ArrayStart | State::ArrayValue | State::ObjectValue
        )
    }

    fn expects_key(self) -> bool {
        matches!(self, State::ObjectStart | State::ObjectKey)
    }
}

enum Prepared {
    At(usize, State),
    End(usize, State),
    NeedMore(usize, State),
}

/// Boundary scan of one array or object, resumable across refills.
#[derive(Debug)]
struct SpanScan {
    start: usize,
    pos: usize,
    depth: u32,
    in_string: bool,
    escape: bool,
}

impl SpanScan {
    fn new(start: usize) -> Self {
        Self {
            start,
            pos: start,
            depth: 0,
            in_string: false,
            escape: false,
        }
    }

    fn resume(&mut self, buf: &[u8], eof: bool, base: u64) -> Result<Option<usize>, JsonSliceError> {
        while self.pos < buf.len() {
            let c = buf[self.pos];
            self.pos += 1;
            match (self.in_string, self.escape, c) {
                (true, false, b'\\') => self.escape = true,
                (true, true, _) => self.escape = false,
                (true, false, b'"') => self.in_string = false,
                (true, false, _) => {}
                (false, _, b'"') => self.in_string = true,
                (false, _, b'{' | b'[') => self.depth += 1,
                (false, _, b'}' | b']') => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Ok(Some(self.pos));
                    }
                }
                _ => {}
            }
        }
        if eof {
            Err(JsonSliceError::UnexpectedEof {
                offset: base + self.pos as u64,
            })
        } else {
            Ok(None)
        }
    }

    /// Shifts the scan after `by` leading bytes were dropped from the buffer.
    fn rebase(&mut self, by: usize) {
        self.start -= by;
        self.pos -= by;
    }
}

/// A string being discarded whose closing quote has not arrived yet.
#[derive(Debug, Clone, Copy)]
struct OpenString {
    escape: bool,
    next: State,
}

#[derive(Debug)]
pub(crate) struct Lexer {
    stack: Vec<Container>,
    state: State,
    offset: u64,
    span: Option<SpanScan>,
    discarding: Option<OpenString>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self {
            stack: Vec::new(),
            state: State::TopValue,
            offset: 0,
            span: None,
            discarding: None,
        }
    }
}

impl Lexer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bytes consumed since the start of the stream.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    /// Reports whether another element or member follows in the open
    /// container, without consuming it. End of input counts as "no".
    pub(crate) fn more(&mut self, buf: &[u8], eof: bool) -> Step<bool> {
        let pos = skip_whitespace(buf, 0);
        let more = match buf.get(pos) {
            None if eof => false,
            None => return self.hold(self.state, pos),
            Some(b']') | Some(b'}') => false,
            Some(_) => true,
        };
        self.offset += pos as u64;
        Step::Ready(more, pos)
    }

    pub(crate) fn next_token(&mut self, buf: &[u8], eof: bool) -> Result<Step<Token>, JsonSliceError> {
        self.lex(buf, eof, false)
    }

    /// Like [`Lexer::next_token`], but strings are scanned and dropped as
    /// they stream by and come back empty. For values nobody will look at.
    pub(crate) fn skip_token(&mut self, buf: &[u8], eof: bool) -> Result<Step<Token>, JsonSliceError> {
        self.lex(buf, eof, true)
    }

    fn lex(&mut self, buf: &[u8], eof: bool, discard: bool) -> Result<Step<Token>, JsonSliceError> {
        if let Some(open) = self.discarding {
            return self.discard_string(buf, 0, eof, open);
        }
        let (pos, state) = match self.prepare(buf, eof)? {
            Prepared::At(pos, state) => (pos, state),
            Prepared::End(pos, _) => {
                return Err(JsonSliceError::UnexpectedEof {
                    offset: self.offset + pos as u64,
                })
            }
            Prepared::NeedMore(pos, state) => return Ok(self.hold(state, pos)),
        };

        let c = buf[pos];
        match c {
            b'{' | b'[' if state.expects_value() => {
                let (container, next, delim) = if c == b'{' {
                    (Container::Object, State::ObjectStart, Delim::ObjectOpen)
                } else {
                    (Container::Array, State::ArrayStart, Delim::ArrayOpen)
                };
                self.stack.push(container);
                Ok(self.commit(next, pos + 1, Token::Delim(delim)))
            }
            b'}' if matches!(state, State::ObjectStart | State::ObjectComma) => {
                self.stack.pop();
                let next = self.after_value();
                Ok(self.commit(next, pos + 1, Token::Delim(Delim::ObjectClose)))
            }
            b']' if matches!(state, State::ArrayStart | State::ArrayComma) => {
                self.stack.pop();
                let next = self.after_value();
                Ok(self.commit(next, pos + 1, Token::Delim(Delim::ArrayClose)))
            }
            b'"' if discard && (state.expects_key() || state.expects_value()) => {
                let next = if state.expects_key() {
                    State::ObjectColon
                } else {
                    self.after_value()
                };
                self.state = state;
                self.discard_string(buf, pos + 1, eof, OpenString { escape: false, next })
            }
            b'"' if state.expects_key() => match self.scan_scalar(buf, pos, eof)? {
                Some((token, end)) => Ok(self.commit(State::ObjectColon, end, token)),
                None => Ok(self.hold(state, pos)),
            },
            _ if state.expects_key() => Err(self.unexpected(pos, c, "expected string object key")),
            _ if state.expects_value() => match self.scan_scalar(buf, pos, eof)? {
                Some((token, end)) => {
                    let next = self.after_value();
                    Ok(self.commit(next, end, token))
                }
                None => Ok(self.hold(state, pos)),
            },
            _ => Err(self.unexpected(pos, c, "expected a value")),
        }
    }

    /// Locates the byte range of the next complete value. `Ready(None, _)`
    /// means the input ended where the value should have started.
    pub(crate) fn next_value(
        &mut self,
        buf: &[u8],
        eof: bool,
    ) -> Result<Step<Option<Range<usize>>>, JsonSliceError> {
        let (pos, state) = match self.prepare(buf, eof)? {
            Prepared::At(pos, state) => (pos, state),
            Prepared::End(pos, state) => return Ok(self.commit(state, pos, None)),
            Prepared::NeedMore(pos, state) => return Ok(self.hold(state, pos)),
        };
        if !state.expects_value() {
            return Err(self.unexpected(pos, buf[pos], "expected a value"));
        }

        let end = match buf[pos] {
            b'{' | b'[' => {
                let base = self.offset;
                let scan = self.span.get_or_insert_with(|| SpanScan::new(pos));
                debug_assert_eq!(scan.start, pos);
                match scan.resume(buf, eof, base)? {
                    Some(end) => {
                        self.span = None;
                        end
                    }
                    None => {
                        scan.rebase(pos);
                        return Ok(self.hold(state, pos));
                    }
                }
            }
            b'}' | b']' => return Err(self.unexpected(pos, buf[pos], "expected a value")),
            _ => match self.scan_scalar(buf, pos, eof)? {
                Some((_, end)) => end,
                None => return Ok(self.hold(state, pos)),
            },
        };
        let next = self.after_value();
        Ok(self.commit(next, end, Some(pos..end)))
    }

    /// Skips whitespace and any pending separator.
    fn prepare(&self, buf: &[u8], eof: bool) -> Result<Prepared, JsonSliceError> {
        let mut state = self.state;
        let mut pos = skip_whitespace(buf, 0);
        loop {
            let Some(&c) = buf.get(pos) else {
                return Ok(if eof {
                    Prepared::End(pos, state)
                } else {
                    Prepared::NeedMore(pos, state)
                });
            };
            match (state, c) {
                (State::ArrayComma, b',') => state = State::ArrayValue,
                (State::ArrayComma, b']') => return Ok(Prepared::At(pos, state)),
                (State::ArrayComma, _) => {
                    return Err(self.unexpected(pos, c, "expected ',' or ']' after array element"))
                }
                (State::ObjectColon, b':') => state = State::ObjectValue,
                (State::ObjectColon, _) => {
                    return Err(self.unexpected(pos, c, "expected ':' after object key"))
                }
                (State::ObjectComma, b',') => state = State::ObjectKey,
                (State::ObjectComma, b'}') => return Ok(Prepared::At(pos, state)),
                (State::ObjectComma, _) => {
                    return Err(self.unexpected(pos, c, "expected ',' or '}' after object member"))
                }
                _ => return Ok(Prepared::At(pos, state)),
            }
            pos = skip_whitespace(buf, pos + 1);
        }
    }

    /// Scans a string from `start` (just past its opening quote or where a
    /// previous refill left off) without keeping any of it.
    fn discard_string(
        &mut self,
        buf: &[u8],
        start: usize,
        eof: bool,
        mut open: OpenString,
    ) -> Result<Step<Token>, JsonSliceError> {
        for (i, &c) in buf.iter().enumerate().skip(start) {
            if open.escape {
                open.escape = false;
            } else if c == b'\\' {
                open.escape = true;
            } else if c == b'"' {
                self.discarding = None;
                return Ok(self.commit(open.next, i + 1, Token::String(String::new())));
            } else if c < 0x20 {
                self.discarding = None;
                return Err(self.unexpected(i, c, "control character in string"));
            }
        }
        if eof {
            self.discarding = None;
            return Err(JsonSliceError::UnexpectedEof {
                offset: self.offset + buf.len() as u64,
            });
        }
        self.discarding = Some(open);
        self.offset += buf.len() as u64;
        Ok(Step::NeedMore(buf.len()))
    }

    fn scan_scalar(&self, buf: &[u8], pos: usize, eof: bool) -> Result<Option<(Token, usize)>, JsonSliceError> {
        match buf[pos] {
            b'"' => self.scan_string(buf, pos, eof),
            b'-' | b'0'..=b'9' => self.scan_number(buf, pos, eof),
            b't' => self.scan_literal(buf, pos, eof, b"true", Token::Bool(true)),
            b'f' => self.scan_literal(buf, pos, eof, b"false", Token::Bool(false)),
            b'n' => self.scan_literal(buf, pos, eof, b"null", Token::Null),
            c => Err(self.unexpected(pos, c, "expected a value")),
        }
    }

    fn scan_string(&self, buf: &[u8], pos: usize, eof: bool) -> Result<Option<(Token, usize)>, JsonSliceError> {
        let mut escaped = false;
        let mut i = pos + 1;
        while i < buf.len() {
            match buf[i] {
                b'\\' => {
                    escaped = true;
                    i += 2;
                    continue;
                }
                b'"' => {
                    let end = i + 1;
                    let s = self.decode_string(&buf[pos..end], escaped, pos)?;
                    return Ok(Some((Token::String(s), end)));
                }
                c if c < 0x20 => return Err(self.unexpected(i, c, "control character in string")),
                _ => {}
            }
            i += 1;
        }
        if eof {
            Err(JsonSliceError::UnexpectedEof {
                offset: self.offset + buf.len() as u64,
            })
        } else {
            Ok(None)
        }
    }

    fn decode_string(&self, quoted: &[u8], escaped: bool, pos: usize) -> Result<String, JsonSliceError> {
        let offset = self.offset + pos as u64;
        if !escaped {
            return std::str::from_utf8(&quoted[1..quoted.len() - 1])
                .map(str::to_owned)
                .map_err(|e| JsonSliceError::syntax(offset, format!("invalid UTF-8 in string: {}", e)));
        }
        let mut owned = quoted.to_vec();
        simd_json::from_slice::<String>(&mut owned)
            .map_err(|e| JsonSliceError::syntax(offset, format!("invalid string escape: {}", e)))
    }

    fn scan_number(&self, buf: &[u8], pos: usize, eof: bool) -> Result<Option<(Token, usize)>, JsonSliceError> {
        let end = buf[pos..]
            .iter()
            .position(|c| !matches!(c, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'))
            .map_or(buf.len(), |n| pos + n);
        if end == buf.len() && !eof {
            return Ok(None);
        }
        let lexeme = &buf[pos..end];
        if !is_valid_number(lexeme) {
            return Err(JsonSliceError::syntax(
                self.offset + pos as u64,
                format!("invalid number literal {:?}", String::from_utf8_lossy(lexeme)),
            ));
        }
        // Only ASCII digits and signs passed the check above.
        let text = String::from_utf8_lossy(lexeme).into_owned();
        Ok(Some((Token::Number(text), end)))
    }

    fn scan_literal(
        &self,
        buf: &[u8],
        pos: usize,
        eof: bool,
        literal: &'static [u8],
        token: Token,
    ) -> Result<Option<(Token, usize)>, JsonSliceError> {
        let available = &buf[pos..];
        if available.len() >= literal.len() {
            if &available[..literal.len()] == literal {
                return Ok(Some((token, pos + literal.len())));
            }
        } else if literal.starts_with(available) {
            return if eof {
                Err(JsonSliceError::UnexpectedEof {
                    offset: self.offset + buf.len() as u64,
                })
            } else {
                Ok(None)
            };
        }
        Err(self.unexpected(pos, buf[pos], "invalid literal"))
    }

    fn after_value(&self) -> State {
        match self.stack.last() {
            Some(Container::Object) => State::ObjectComma,
            Some(Container::Array) => State::ArrayComma,
            None => State::TopValue,
        }
    }

    fn commit<T>(&mut self, state: State, consumed: usize, value: T) -> Step<T> {
        self.state = state;
        self.offset += consumed as u64;
        Step::Ready(value, consumed)
    }

    /// Gives up the `consumed` bytes ahead of an incomplete token.
    fn hold<T>(&mut self, state: State, consumed: usize) -> Step<T> {
        self.state = state;
        self.offset += consumed as u64;
        Step::NeedMore(consumed)
    }

    fn unexpected(&self, pos: usize, c: u8, context: &str) -> JsonSliceError {
        JsonSliceError::syntax(
            self.offset + pos as u64,
            format!("{}: found {:?}", context, c as char),
        )
    }
}

fn skip_whitespace(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() && matches!(buf[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}

/// `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
fn is_valid_number(s: &[u8]) -> bool {
    fn digits(s: &[u8], mut i: usize) -> usize {
        while i < s.len() && s[i].is_ascii_digit() {
            i += 1;
        }
        i
    }

    let mut i = 0;
    if s.first() == Some(&b'-') {
        i += 1;
    }
    match s.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => i = digits(s, i + 1),
        _ => return false,
    }
    if s.get(i) == Some(&b'.') {
        let j = digits(s, i + 1);
        if j == i + 1 {
            return false;
        }
        i = j;
    }
    if matches!(s.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(s.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let j = digits(s, i);
        if j == i {
            return false;
        }
        i = j;
    }
    i == s.len()
}
