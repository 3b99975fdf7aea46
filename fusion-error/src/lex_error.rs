use fusion_ast::TokenKind;
use fusion_types::Span;
use thiserror::Error;

/// No rule for the requested token kind matched at the cursor.
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
#[error("Unexpected {}. Expected token: `{}`.", found_description(.found), .expected)]
pub struct LexError {
    pub span: Span,
    pub expected: TokenKind,
    pub found: Option<char>,
}

fn found_description(found: &Option<char>) -> String {
    match *found {
        None => "<EOF>".to_string(),
        Some('\n') => "newline".to_string(),
        Some(c) if c.is_whitespace() => "whitespace".to_string(),
        Some(c) => format!("char `{c}`"),
    }
}
