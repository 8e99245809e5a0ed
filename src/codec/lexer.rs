use crate::error::{Result, StorageError};

/// Token classes of the s-expression wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Open,
    Close,
    /// Bare word: a tag, a number, or the `.` of a dotted pair.
    Symbol(String),
    /// Double-quoted text. Backslash escapes are not interpreted.
    Quoted(String),
}

/// A token with its byte span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Splits payload text into tokens, starting at an arbitrary byte cursor.
pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str, cursor: usize) -> Result<Self> {
        if !text.is_char_boundary(cursor) {
            return Err(StorageError::syntax(
                "Cursor is not on a character boundary",
                format!("offset {} of {} bytes", cursor, text.len()),
            ));
        }
        Ok(Self { text, pos: cursor })
    }

    /// Byte offset just after the last consumed token.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn peek_token(&mut self) -> Result<Option<Token>> {
        let saved = self.pos;
        let token = self.next_token();
        self.pos = saved;
        token
    }

    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return Ok(None);
        }

        let start = self.pos;
        let kind = match bytes[start] {
            b'(' => {
                self.pos += 1;
                TokenKind::Open
            }
            b')' => {
                self.pos += 1;
                TokenKind::Close
            }
            b'"' => {
                let close = self.text[start + 1..].find('"').ok_or_else(|| {
                    StorageError::syntax("Unterminated string", &self.text[start..])
                })?;
                let end = start + 1 + close;
                self.pos = end + 1;
                TokenKind::Quoted(self.text[start + 1..end].to_string())
            }
            _ => {
                while self.pos < bytes.len() && !is_delimiter(bytes[self.pos]) {
                    self.pos += 1;
                }
                TokenKind::Symbol(self.text[start..self.pos].to_string())
            }
        };

        Ok(Some(Token {
            kind,
            start,
            end: self.pos,
        }))
    }
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'(' | b')' | b'"')
}
