pub use {
    crate::{
        lexer::Lexer,
        unescape::{strip_c_slashes, strip_slashes},
    },
    fusion_ast::{
        AssignedObjectPath, Block, FusionFile, IncludeStatement, ObjectPath, ObjectStatement,
        Operation, PathSegment, PathValue, Statement, StatementList, Token, TokenKind,
    },
    fusion_error::{
        error::CompileError,
        handler::{ErrorEmitted, Handler},
        lex_error::LexError,
        parser_error::{ParseError, ParseErrorKind},
    },
    fusion_types::{Span, Spanned},
    std::{path::PathBuf, sync::Arc},
};
