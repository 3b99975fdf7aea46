use crate::priv_prelude::*;

use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! token_rule {
    ($name:ident, $pattern:literal) => {
        static $name: Lazy<Regex> = Lazy::new(|| {
            Regex::new($pattern).expect("token rules are valid regular expressions")
        });
    };
}

token_rule!(SLASH_COMMENT, r"^//.*");
token_rule!(HASH_COMMENT, r"^#.*");
token_rule!(MULTILINE_COMMENT, r"^/\*[^*]*\*+(?:[^/*][^*]*\*+)*/");
token_rule!(NEWLINE, r"^\n+");
token_rule!(SPACE, r"^[ \t]+");
token_rule!(TRUE_VALUE, r"^(?:true|TRUE)");
token_rule!(FALSE_VALUE, r"^(?:false|FALSE)");
token_rule!(NULL_VALUE, r"^(?:null|NULL)");
token_rule!(INTEGER, r"^-?[0-9]{1,19}");
token_rule!(FLOAT, r"^-?[0-9]{1,14}\.[0-9]{1,14}");
token_rule!(STRING_DOUBLE_QUOTED, r#"^"[^"\\]*(?:\\.[^"\\]*)*""#);
token_rule!(STRING_SINGLE_QUOTED, r"^'[^'\\]*(?:\\.[^'\\]*)*'");
token_rule!(DSL_EXPRESSION_START, r"^[a-zA-Z0-9.]+");
token_rule!(DSL_EXPRESSION_CONTENT, r"^`[^`]*`");
token_rule!(FUSION_OBJECT_NAME, r"^[0-9a-zA-Z.]+:[0-9a-zA-Z.]+");
token_rule!(INCLUDE, r"^include\s*:");
token_rule!(OBJECT_PATH_PART, r"^[a-zA-Z0-9_:-]+");
token_rule!(FILE_PATTERN, r"^[a-zA-Z0-9.*:/_-]+");

/// Produces tokens on demand, one requested kind at a time.
///
/// The lexer never tokenizes ahead on its own. The parser asks for a kind, the
/// lexer tries only that kind's rule at the cursor, and a successful match is
/// cached as the lookahead until it is consumed. While a lookahead is cached it
/// is returned for every request, whatever kind is asked for.
pub struct Lexer {
    code: Arc<str>,
    path: Option<Arc<PathBuf>>,
    cursor: usize,
    lookahead: Option<Token>,
}

impl Lexer {
    pub fn new(src: &str, path: Option<Arc<PathBuf>>) -> Lexer {
        let code = src.replace("\r\n", "\n").replace('\r', "\n");
        Lexer {
            code: Arc::from(code),
            path,
            cursor: 0,
            lookahead: None,
        }
    }

    /// The normalized source text.
    pub fn code(&self) -> &Arc<str> {
        &self.code
    }

    pub fn path(&self) -> Option<&Arc<PathBuf>> {
        self.path.as_ref()
    }

    /// Byte offset just past the last matched token, including a cached lookahead.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn lookahead(&self) -> Option<&Token> {
        self.lookahead.as_ref()
    }

    /// Returns the cached lookahead or tries to produce one of the requested `kind`.
    ///
    /// Once the cursor reaches the end of the input an end-of-input token is
    /// produced whatever `kind` is asked for.
    pub fn try_match(&mut self, kind: TokenKind) -> Option<&Token> {
        if self.lookahead.is_none() {
            self.lookahead = self.generate(kind);
        }
        self.lookahead.as_ref()
    }

    /// Hands out the cached lookahead and clears it.
    pub fn consume_lookahead(&mut self) -> Option<Token> {
        self.lookahead.take()
    }

    /// The character right at the cursor, if any input is left.
    pub fn peek_char(&self) -> Option<char> {
        self.code[self.cursor..].chars().next()
    }

    pub fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.code.clone(), start, end, self.path.clone())
            .unwrap_or_else(|| Span::at(self.code.clone(), start, self.path.clone()))
    }

    /// A span covering the character at `offset`, or an empty span at the end of input.
    pub fn span_of_char_at(&self, offset: usize) -> Span {
        let end = self.code[offset.min(self.code.len())..]
            .chars()
            .next()
            .map(|c| offset + c.len_utf8())
            .unwrap_or(offset);
        self.span(offset, end)
    }

    fn generate(&mut self, kind: TokenKind) -> Option<Token> {
        if self.cursor == self.code.len() {
            return Some(Token::new(TokenKind::Eof, self.span(self.cursor, self.cursor)));
        }
        let len = match_len(kind, &self.code[self.cursor..])?;
        let start = self.cursor;
        self.cursor += len;
        Some(Token::new(kind, self.span(start, self.cursor)))
    }
}

fn match_len(kind: TokenKind, rest: &str) -> Option<usize> {
    let rule = match kind {
        TokenKind::Eof => return None,
        TokenKind::Assignment => return literal(rest, "="),
        TokenKind::Copy => return literal(rest, "<"),
        TokenKind::Unset => return literal(rest, ">"),
        TokenKind::Dot => return literal(rest, "."),
        TokenKind::Rparen => return literal(rest, ")"),
        TokenKind::Lbrace => return literal(rest, "{"),
        TokenKind::Rbrace => return literal(rest, "}"),
        TokenKind::MetaPathStart => return literal(rest, "@"),
        TokenKind::PrototypeStart => return literal(rest, "prototype("),
        TokenKind::EelExpression => return scan_eel_expression(rest),
        TokenKind::DslExpressionStart => {
            let len = DSL_EXPRESSION_START.find(rest)?.end();
            return rest[len..].starts_with('`').then_some(len);
        }
        TokenKind::SlashComment => &SLASH_COMMENT,
        TokenKind::HashComment => &HASH_COMMENT,
        TokenKind::MultilineComment => &MULTILINE_COMMENT,
        TokenKind::Newline => &NEWLINE,
        TokenKind::Space => &SPACE,
        TokenKind::TrueValue => &TRUE_VALUE,
        TokenKind::FalseValue => &FALSE_VALUE,
        TokenKind::NullValue => &NULL_VALUE,
        TokenKind::Integer => &INTEGER,
        TokenKind::Float => &FLOAT,
        TokenKind::StringDoubleQuoted => &STRING_DOUBLE_QUOTED,
        TokenKind::StringSingleQuoted => &STRING_SINGLE_QUOTED,
        TokenKind::DslExpressionContent => &DSL_EXPRESSION_CONTENT,
        TokenKind::FusionObjectName => &FUSION_OBJECT_NAME,
        TokenKind::Include => &INCLUDE,
        TokenKind::ObjectPathPart => &OBJECT_PATH_PART,
        TokenKind::FilePattern => &FILE_PATTERN,
    };
    rule.find(rest)
        .map(|m| m.end())
        .filter(|len| *len > 0)
}

fn literal(rest: &str, literal: &str) -> Option<usize> {
    rest.starts_with(literal).then_some(literal.len())
}

/// Matches `${ ... }` where the body may nest braces and contain quoted strings
/// holding unbalanced braces.
fn scan_eel_expression(rest: &str) -> Option<usize> {
    let body = rest.strip_prefix("${")?;
    let mut depth = 0usize;
    let mut chars = body.char_indices();
    while let Some((ix, c)) = chars.next() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some("${".len() + ix + 1),
            '}' => depth -= 1,
            '"' | '\'' => loop {
                match chars.next()? {
                    (_, '\\') => {
                        chars.next()?;
                    }
                    (_, quote) if quote == c => break,
                    _ => {}
                }
            },
            _ => {}
        }
    }
    None
}
