//! Space-separated tokenizer for directive strings (`:int default 5`,
//! `name required nullable`).
//!
//! Only the space character separates tokens; tabs and other whitespace
//! stay inside a token. No quoting: once a `default` keyword is seen the
//! caller takes the whole `remainder()` as a single JSON literal.

/// Splits a string into space-delimited tokens, one at a time.
#[derive(Debug, Clone)]
pub struct TokenParser<'a> {
    remained: Option<&'a str>,
    current: Option<&'a str>,
}

impl<'a> TokenParser<'a> {
    pub fn new(stream: &'a str) -> Self {
        Self { remained: non_empty(stream.trim_start_matches(SEPARATOR)), current: None }
    }

    /// Move to the next token. Returns `None` once the stream is exhausted.
    pub fn next(&mut self) -> Option<&'a str> {
        self.current = match self.remained.take() {
            None => None,
            Some(rest) => match rest.split_once(SEPARATOR) {
                None => Some(rest),
                Some((token, tail)) => {
                    self.remained = non_empty(tail.trim_start_matches(SEPARATOR));
                    Some(token)
                }
            },
        };
        self.current
    }

    /// Last token returned by [`next`](Self::next).
    pub fn current(&self) -> Option<&'a str> {
        self.current
    }

    /// Untokenized rest of the stream, leading spaces trimmed.
    pub fn remainder(&self) -> Option<&'a str> {
        self.remained
    }

    /// Discard everything left in the stream.
    pub fn done(&mut self) {
        self.current = None;
        self.remained = None;
    }

    /// First token of `stream`, without building a parser.
    pub fn first(stream: &str) -> &str {
        let stream = stream.trim_start_matches(SEPARATOR);
        match stream.split_once(SEPARATOR) {
            Some((token, _)) => token,
            None => stream,
        }
    }
}

const SEPARATOR: char = ' ';

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim_end_matches(SEPARATOR);
    if s.is_empty() { None } else { Some(s) }
}
