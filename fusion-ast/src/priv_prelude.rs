pub use {
    crate::{
        path::{AssignedObjectPath, ObjectPath, PathSegment},
        statement::{Block, IncludeStatement, ObjectStatement, Statement, StatementList},
        token::{Token, TokenKind},
        value::{Operation, PathValue},
    },
    fusion_types::{Span, Spanned},
    std::{fmt, path::PathBuf, sync::Arc},
};
