use crate::priv_prelude::*;

/// Every lexical class the lexer can be asked for.
///
/// Several classes overlap (a bare identifier, a `Namespace:Type` name and a
/// file pattern can all match the same text), so which one a piece of source
/// becomes depends on the kind the parser asks for at that point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,

    SlashComment,
    HashComment,
    MultilineComment,

    Newline,
    Space,

    TrueValue,
    FalseValue,
    NullValue,

    Integer,
    Float,

    StringDoubleQuoted,
    StringSingleQuoted,

    DslExpressionStart,
    DslExpressionContent,
    EelExpression,

    FusionObjectName,

    Include,
    PrototypeStart,
    ObjectPathPart,
    MetaPathStart,
    FilePattern,

    Assignment,
    Copy,
    Unset,

    Dot,
    Rparen,
    Lbrace,
    Rbrace,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Eof => "<EOF>",
            TokenKind::SlashComment => "// comment",
            TokenKind::HashComment => "# comment",
            TokenKind::MultilineComment => "/* comment */",
            TokenKind::Newline => "newline",
            TokenKind::Space => "space",
            TokenKind::TrueValue => "true",
            TokenKind::FalseValue => "false",
            TokenKind::NullValue => "null",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::StringDoubleQuoted => "double quoted string",
            TokenKind::StringSingleQuoted => "single quoted string",
            TokenKind::DslExpressionStart => "dsl identifier",
            TokenKind::DslExpressionContent => "dsl code in backticks",
            TokenKind::EelExpression => "eel expression",
            TokenKind::FusionObjectName => "fusion object name",
            TokenKind::Include => "include:",
            TokenKind::PrototypeStart => "prototype(",
            TokenKind::ObjectPathPart => "object path part",
            TokenKind::MetaPathStart => "@",
            TokenKind::FilePattern => "file pattern",
            TokenKind::Assignment => "=",
            TokenKind::Copy => "<",
            TokenKind::Unset => ">",
            TokenKind::Dot => ".",
            TokenKind::Rparen => ")",
            TokenKind::Lbrace => "{",
            TokenKind::Rbrace => "}",
        }
    }

    /// Whitespace and comment classes, which never end up in the AST.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::SlashComment
                | TokenKind::HashComment
                | TokenKind::MultilineComment
                | TokenKind::Newline
                | TokenKind::Space
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token { kind, span }
    }

    /// The raw source text this token was matched from.
    pub fn text(&self) -> &str {
        self.span.as_str()
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span.clone()
    }
}
