use crate::priv_prelude::*;

/// A single parsed Fusion source, before any include is followed.
#[derive(Clone, Debug)]
pub struct FusionFile {
    pub statement_list: StatementList,
    pub path: Option<Arc<PathBuf>>,
    pub span: Span,
}

impl FusionFile {
    pub fn includes(&self) -> impl Iterator<Item = &IncludeStatement> {
        self.statement_list.statements.iter().filter_map(|statement| {
            if let Statement::Include(include) = statement {
                Some(include)
            } else {
                None
            }
        })
    }
}

impl Spanned for FusionFile {
    fn span(&self) -> Span {
        self.span.clone()
    }
}
