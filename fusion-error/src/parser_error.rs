use fusion_ast::TokenKind;
use fusion_types::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    #[error("Expected token: `{expected}`, found `{found}`.")]
    UnexpectedToken { expected: TokenKind, found: TokenKind },
    #[error("Expected a statement: an object path, `prototype(...)`, `@meta` or `include:`.")]
    ExpectedStatement,
    #[error("Expected an object path segment: an identifier, `prototype(...)`, `@meta` or a quoted key.")]
    ExpectedPathSegment,
    #[error("Expected a value: a string, number, boolean, null, fusion object name, eel or dsl expression.")]
    ExpectedPathValue,
    #[error("Expected an operator (`=`, `<`, `>`) or a block `{{` after the object path.")]
    ExpectedOperationOrBlock,
    #[error("Expected the end of a statement, but found more content on this line.")]
    ExpectedEndOfStatement,
    #[error("Expected a fusion object name like `Vendor.Site:Type` inside `prototype(...)`.")]
    ExpectedPrototypeName,
    #[error("No closing brace \"}}\" matched this starting block. Encountered <EOF>.")]
    UnclosedBlock,
    #[error("A dsl expression starting with `{identifier}` must be followed by code in backticks.")]
    MalformedDslExpression { identifier: String },
    #[error("Expected file pattern in quotes or [a-zA-Z0-9.*:/_-].")]
    ExpectedIncludePattern,
    #[error("Blocks are nested deeper than {max} levels.")]
    NestingTooDeep { max: usize },
}

impl ParseErrorKind {
    /// Numeric code kept for compatibility with existing tooling, where one exists.
    pub fn code(&self) -> Option<u32> {
        let code = match self {
            ParseErrorKind::UnexpectedToken { .. } => 1646988824,
            ParseErrorKind::ExpectedStatement => 1646988828,
            ParseErrorKind::ExpectedPathSegment => 1635708755,
            ParseErrorKind::ExpectedPathValue => 1646988841,
            ParseErrorKind::ExpectedOperationOrBlock => 1646988835,
            ParseErrorKind::ExpectedEndOfStatement => 1635878683,
            ParseErrorKind::ExpectedPrototypeName => 1646991578,
            ParseErrorKind::UnclosedBlock => 1646988844,
            ParseErrorKind::MalformedDslExpression { .. } => 1490714685,
            ParseErrorKind::ExpectedIncludePattern => 1646988832,
            ParseErrorKind::NestingTooDeep { .. } => return None,
        };
        Some(code)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
#[error("{}", kind)]
pub struct ParseError {
    pub span: Span,
    pub kind: ParseErrorKind,
}
