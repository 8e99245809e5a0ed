use super::lexer::{Lexer, TokenKind};
use crate::error::{Result, StorageError};

use std::ops::Range;

/// Deepest list nesting the parser accepts.
pub const MAX_DEPTH: usize = 256;

/// Typed s-expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SExprKind {
    List(Vec<SExpr>),
    Symbol(String),
    Quoted(String),
}

/// A parsed expression with the byte range it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SExpr {
    pub kind: SExprKind,
    pub span: Range<usize>,
}

impl SExpr {
    pub fn as_list(&self) -> Option<&[SExpr]> {
        match &self.kind {
            SExprKind::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            SExprKind::Symbol(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_quoted(&self) -> Option<&str> {
        match &self.kind {
            SExprKind::Quoted(text) => Some(text),
            _ => None,
        }
    }

    /// First element of a list when it is a bare word, e.g. a value tag.
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol()
    }

    /// The source text this expression came from.
    pub fn source<'t>(&self, text: &'t str) -> &'t str {
        &text[self.span.clone()]
    }
}

/// Parses exactly one expression starting at `cursor`.
///
/// Returns the expression and the byte offset right after it; any text past
/// that offset is left untouched.
pub fn parse_expr(text: &str, cursor: usize) -> Result<(SExpr, usize)> {
    let mut parser = Parser {
        lexer: Lexer::new(text, cursor)?,
        text,
    };
    let expr = parser.expr(0)?;
    Ok((expr, parser.lexer.position()))
}

/// Parses one expression that must span all of `text` (bar whitespace).
pub fn parse_complete(text: &str) -> Result<SExpr> {
    let (expr, end) = parse_expr(text, 0)?;
    let rest = &text[end..];
    if !rest.trim().is_empty() {
        return Err(StorageError::syntax("Trailing input after expression", rest));
    }
    Ok(expr)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    text: &'a str,
}

impl<'a> Parser<'a> {
    fn expr(&mut self, depth: usize) -> Result<SExpr> {
        let start = self.lexer.position();
        let token = self
            .lexer
            .next_token()?
            .ok_or_else(|| StorageError::syntax("Unexpected end of input", &self.text[start..]))?;

        match token.kind {
            TokenKind::Open => self.list(token.start, depth + 1),
            TokenKind::Close => Err(StorageError::syntax(
                "Unexpected closing parenthesis",
                &self.text[token.start..],
            )),
            TokenKind::Symbol(text) => Ok(SExpr {
                kind: SExprKind::Symbol(text),
                span: token.start..token.end,
            }),
            TokenKind::Quoted(text) => Ok(SExpr {
                kind: SExprKind::Quoted(text),
                span: token.start..token.end,
            }),
        }
    }

    fn list(&mut self, start: usize, depth: usize) -> Result<SExpr> {
        if depth > MAX_DEPTH {
            return Err(StorageError::syntax(
                format!("Nesting deeper than {}", MAX_DEPTH),
                &self.text[start..],
            ));
        }

        let mut items = Vec::new();
        loop {
            match self.lexer.peek_token()? {
                None => {
                    return Err(StorageError::syntax(
                        "Unbalanced parentheses",
                        &self.text[start..],
                    ));
                }
                Some(token) if token.kind == TokenKind::Close => {
                    self.lexer.next_token()?;
                    return Ok(SExpr {
                        kind: SExprKind::List(items),
                        span: start..token.end,
                    });
                }
                Some(_) => items.push(self.expr(depth)?),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_nested_lists_with_spans() {
        let text = "(LinkValue (FloatValue 1)(stv 1 0))";
        let expr = parse_complete(text).unwrap();

        let items = expr.as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(expr.head(), Some("LinkValue"));
        assert_eq!(items[1].source(text), "(FloatValue 1)");
        assert_eq!(items[2].source(text), "(stv 1 0)");
    }

    #[test]
    fn test_stops_after_one_expression() {
        let text = "(a)(b)";
        let (expr, end) = parse_expr(text, 0).unwrap();
        assert_eq!(expr.source(text), "(a)");
        assert_eq!(end, 3);

        let (next, end) = parse_expr(text, end).unwrap();
        assert_eq!(next.head(), Some("b"));
        assert_eq!(end, 6);
    }

    #[test]
    fn test_unbalanced_is_rejected() {
        let err = parse_complete("(LinkValue (FloatValue 1)").unwrap_err();
        assert!(err.to_string().contains("Unbalanced"));
    }

    #[test]
    fn test_stray_close_is_rejected() {
        assert!(parse_complete(")").unwrap_err().is_syntax());
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        assert!(parse_complete("(a) b").unwrap_err().is_syntax());
        assert!(parse_complete("(a)  \n").is_ok());
    }

    #[test]
    fn test_depth_limit() {
        let text = format!("{}{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(parse_complete(&text).unwrap_err().is_syntax());

        let text = format!("{}{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(parse_complete(&text).is_ok());
    }
}
