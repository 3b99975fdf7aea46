pub mod file;
pub mod path;
mod priv_prelude;
pub mod statement;
pub mod token;
pub mod value;

pub use crate::{
    file::FusionFile,
    path::{AssignedObjectPath, ObjectPath, PathSegment},
    statement::{Block, IncludeStatement, ObjectStatement, Statement, StatementList},
    token::{Token, TokenKind},
    value::{Operation, PathValue},
};
