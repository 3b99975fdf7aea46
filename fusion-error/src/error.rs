use crate::{lex_error::LexError, parser_error::ParseError};

use fusion_types::{LineCol, Span, Spanned};
use std::{fmt, path::PathBuf, sync::Arc};
use thiserror::Error;

/// The coarse classification every error falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lex,
    Syntax,
    Structural,
    Cycle,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ErrorKind::Lex => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Structural => "structural error",
            ErrorKind::Cycle => "cycle error",
            ErrorKind::Io => "io error",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompileError {
    #[error("{error}")]
    Lex { error: LexError },
    #[error("{error}")]
    Parse { error: ParseError },
    #[error("Reserved key '{key}' used.")]
    ReservedKey { key: String, span: Span },
    #[error("A path must not be empty.")]
    EmptyPathSegment { span: Span },
    #[error("Key '{}' cannot contain newlines.", .key.replace('\n', ""))]
    NewlineInPathSegment { key: String, span: Span },
    #[error(
        "Cannot inherit, when one of the sides is nested (e.g. foo.prototype(Bar)). \
         Setting up prototype inheritance is only supported at the top level: prototype(Foo) < prototype(Bar)"
    )]
    NestedPrototypeInheritance { span: Span },
    #[error(
        "Cannot inherit, when one of the sides is no prototype definition of the form prototype(Foo). \
         It is only allowed to build inheritance chains with prototype objects."
    )]
    PrototypeCopyMismatch { span: Span },
    #[error("@private can only be declared inside a root prototype declaration.")]
    PrivateOutsidePrototypeDeclaration { span: Span },
    #[error(
        "Recursive inheritance found for prototype \"{prototype}\". Prototype chain: {}",
        .chain.join(" < ")
    )]
    RecursivePrototypeInheritance {
        prototype: String,
        chain: Vec<String>,
        span: Span,
    },
    #[error("Error while transpiling dsl `{identifier}`: {message}")]
    DslTranspilation {
        identifier: String,
        message: String,
        span: Span,
    },
    #[error("Code produced by dsl `{identifier}` is invalid: {error}")]
    InvalidDslOutput {
        identifier: String,
        error: Box<CompileError>,
        span: Span,
    },
    #[error("Could not include files of pattern '{pattern}': {message}")]
    Include {
        pattern: String,
        message: String,
        span: Span,
    },
    #[error("Could not read file '{}' of pattern '{pattern}': {message}", .file.display())]
    IncludeRead {
        pattern: String,
        file: PathBuf,
        message: String,
        span: Span,
    },
    #[error("File '{}' is already being included further up the include chain.", .file.display())]
    IncludeCycle { file: PathBuf, span: Span },
    #[error("Could not read '{}': {message}", .file.display())]
    ReadFile {
        file: PathBuf,
        message: String,
        span: Span,
    },
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        use CompileError::*;
        match self {
            Lex { .. } => ErrorKind::Lex,
            Parse { .. } | DslTranspilation { .. } => ErrorKind::Syntax,
            InvalidDslOutput { error, .. } => error.kind(),
            ReservedKey { .. }
            | EmptyPathSegment { .. }
            | NewlineInPathSegment { .. }
            | NestedPrototypeInheritance { .. }
            | PrototypeCopyMismatch { .. }
            | PrivateOutsidePrototypeDeclaration { .. } => ErrorKind::Structural,
            RecursivePrototypeInheritance { .. } => ErrorKind::Cycle,
            Include { .. } | IncludeRead { .. } | IncludeCycle { .. } | ReadFile { .. } => {
                ErrorKind::Io
            }
        }
    }

    /// Numeric code kept for compatibility with existing tooling, where one exists.
    pub fn code(&self) -> Option<u32> {
        use CompileError::*;
        let code = match self {
            Lex { .. } => 1646988824,
            Parse { error } => return error.kind.code(),
            ReservedKey { .. } => 1437065270,
            EmptyPathSegment { .. } => 1646988838,
            NewlineInPathSegment { .. } => 1644068086,
            NestedPrototypeInheritance { .. } => 1358418019,
            PrototypeCopyMismatch { .. } => 1358418015,
            PrivateOutsidePrototypeDeclaration { .. } => 1677101592,
            RecursivePrototypeInheritance { .. } => 1492801503,
            DslTranspilation { .. } | InvalidDslOutput { .. } => 1180600696,
            IncludeRead { .. } => 1347977017,
            Include { .. } | IncludeCycle { .. } | ReadFile { .. } => return None,
        };
        Some(code)
    }

    pub fn path(&self) -> Option<Arc<PathBuf>> {
        self.span().path().cloned()
    }

    pub fn line_col(&self) -> (LineCol, LineCol) {
        self.span().line_col()
    }
}

impl Spanned for CompileError {
    fn span(&self) -> Span {
        use CompileError::*;
        match self {
            Lex { error } => error.span.clone(),
            Parse { error } => error.span.clone(),
            ReservedKey { span, .. }
            | EmptyPathSegment { span }
            | NewlineInPathSegment { span, .. }
            | NestedPrototypeInheritance { span }
            | PrototypeCopyMismatch { span }
            | PrivateOutsidePrototypeDeclaration { span }
            | RecursivePrototypeInheritance { span, .. }
            | DslTranspilation { span, .. }
            | InvalidDslOutput { span, .. }
            | Include { span, .. }
            | IncludeRead { span, .. }
            | IncludeCycle { span, .. }
            | ReadFile { span, .. } => span.clone(),
        }
    }
}
