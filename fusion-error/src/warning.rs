use fusion_types::{Span, Spanned};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
pub enum CompileWarning {
    #[error("Include pattern `{pattern}` did not match any file.")]
    IncludeMatchedNothing { pattern: String, span: Span },
}

impl Spanned for CompileWarning {
    fn span(&self) -> Span {
        match self {
            CompileWarning::IncludeMatchedNothing { span, .. } => span.clone(),
        }
    }
}
