//! Tokenizing cursor over one trace line.
//!
//! A cursor is a slice of the line plus a position inside it. Every cursor
//! remembers the column at which its slice starts, so errors raised while
//! parsing a nested slice still point at the right place in the line.
//! Columns count characters, not bytes.

use crate::error::{ParseContext, ParseError, Result};

#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    /// Character column of `src[0]` within the line.
    base: usize,
    line_num: usize,
    ctx: &'a ParseContext,
}

impl<'a> Cursor<'a> {
    /// Cursor over a whole line.
    pub fn new(src: &'a str, line_num: usize, ctx: &'a ParseContext) -> Self {
        Self {
            src,
            pos: 0,
            base: 0,
            line_num,
            ctx,
        }
    }

    /// Cursor over `src`, a slice of this cursor's line starting at `col`.
    fn sub(&self, src: &'a str, col: usize) -> Self {
        Self {
            src,
            pos: 0,
            base: col,
            line_num: self.line_num,
            ctx: self.ctx,
        }
    }

    /// Character column of the current position within the line.
    pub fn col(&self) -> usize {
        self.base + self.src[..self.pos].chars().count()
    }

    /// Unconsumed remainder.
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Attach the current location to an error.
    pub fn error(&self, err: ParseError) -> ParseError {
        err.with_location(self.ctx, self.line_num, self.col())
    }

    /// Consume `lit` if the remainder starts with it.
    pub fn eat(&mut self, lit: &str) -> bool {
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    /// Consume `lit` or fail.
    pub fn expect(&mut self, lit: &'static str) -> Result<()> {
        if self.eat(lit) {
            Ok(())
        } else {
            Err(self.error(ParseError::ExpectedLiteral(lit, String::new())))
        }
    }

    /// Consume a non-empty run of ASCII digits.
    pub fn take_digits(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        let len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 {
            return Err(self.error(ParseError::ExpectedDigit(String::new())));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    /// Consume everything before the next `delim`, leaving `delim` unconsumed.
    ///
    /// Returns `None` without moving if `delim` does not occur.
    pub fn take_until(&mut self, delim: &str) -> Option<Cursor<'a>> {
        let idx = self.rest().find(delim)?;
        Some(self.advance(idx))
    }

    /// Consume everything before the last `delim` in the remainder.
    pub fn take_until_last(&mut self, delim: &str) -> Option<Cursor<'a>> {
        let idx = self.rest().rfind(delim)?;
        Some(self.advance(idx))
    }

    fn advance(&mut self, len: usize) -> Cursor<'a> {
        let taken = self.sub(&self.rest()[..len], self.col());
        self.pos += len;
        taken
    }

    /// Split the remainder on `sep` into sub-cursors. Does not consume.
    pub fn split(&self, sep: char) -> Vec<Cursor<'a>> {
        let mut col = self.col();
        self.rest()
            .split(sep)
            .map(|piece| {
                let cursor = self.sub(piece, col);
                col += piece.chars().count() + 1;
                cursor
            })
            .collect()
    }

    /// The remainder with surrounding whitespace removed.
    pub fn trim(&self) -> Cursor<'a> {
        let rest = self.rest();
        let leading = rest.len() - rest.trim_start().len();
        let start = rest[..leading].chars().count();
        self.sub(rest.trim(), self.col() + start)
    }

    /// Fail unless the whole slice has been consumed.
    pub fn finish(&self) -> Result<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error(ParseError::ExtraContent(String::new())))
        }
    }
}
