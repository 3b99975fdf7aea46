use crate::priv_prelude::*;

#[derive(Clone, Debug, Default)]
pub struct StatementList {
    pub statements: Vec<Statement>,
}

impl StatementList {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Clone, Debug)]
pub enum Statement {
    Include(IncludeStatement),
    Object(ObjectStatement),
}

impl Spanned for Statement {
    fn span(&self) -> Span {
        match self {
            Statement::Include(include) => include.span(),
            Statement::Object(object) => object.span(),
        }
    }
}

/// `include: <pattern>`
#[derive(Clone, Debug)]
pub struct IncludeStatement {
    pub pattern: String,
    pub span: Span,
}

impl Spanned for IncludeStatement {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

/// `path [operation] [block]`, with at least one of operation and block present.
#[derive(Clone, Debug)]
pub struct ObjectStatement {
    pub path: ObjectPath,
    pub operation: Option<Operation>,
    pub block: Option<Block>,
}

impl ObjectStatement {
    /// True for statements of the exact form `prototype(Foo) < prototype(Bar)`.
    pub fn is_root_prototype_declaration(&self) -> bool {
        match &self.operation {
            Some(Operation::Copy(source)) => {
                self.path.is_single_prototype() && source.path.is_single_prototype()
            }
            _ => false,
        }
    }
}

impl Spanned for ObjectStatement {
    fn span(&self) -> Span {
        self.path.span()
    }
}

#[derive(Clone, Debug)]
pub struct Block {
    pub open_brace: Span,
    pub statement_list: StatementList,
    pub close_brace: Span,
}

impl Spanned for Block {
    fn span(&self) -> Span {
        Span::join(self.open_brace.clone(), &self.close_brace)
    }
}
