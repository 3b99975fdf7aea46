use crate::priv_prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectPath {
    pub segments: Vec<PathSegment>,
}

impl ObjectPath {
    pub fn is_single_prototype(&self) -> bool {
        matches!(self.segments.as_slice(), [PathSegment::Prototype { .. }])
    }
}

impl Spanned for ObjectPath {
    fn span(&self) -> Span {
        match self.segments.as_slice() {
            [] => Span::dummy(),
            [only] => only.span(),
            [first, .., last] => Span::join(first.span(), &last.span()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PathSegment {
    /// `foo`
    Plain { key: String, span: Span },
    /// `"foo"` or `'foo'`, already unescaped.
    Quoted { key: String, span: Span },
    /// `@foo`
    Meta { name: String, span: Span },
    /// `prototype(Vendor:Type)`
    Prototype { name: String, span: Span },
}

impl Spanned for PathSegment {
    fn span(&self) -> Span {
        match self {
            PathSegment::Plain { span, .. }
            | PathSegment::Quoted { span, .. }
            | PathSegment::Meta { span, .. }
            | PathSegment::Prototype { span, .. } => span.clone(),
        }
    }
}

/// The source side of a copy, `.foo.bar` when relative.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignedObjectPath {
    pub path: ObjectPath,
    pub is_relative: bool,
}

impl Spanned for AssignedObjectPath {
    fn span(&self) -> Span {
        self.path.span()
    }
}
