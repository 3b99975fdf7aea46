use crate::priv_prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Assign(PathValue),
    Unset { span: Span },
    Copy(AssignedObjectPath),
}

impl Spanned for Operation {
    fn span(&self) -> Span {
        match self {
            Operation::Assign(value) => value.span(),
            Operation::Unset { span } => span.clone(),
            Operation::Copy(source) => source.span(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PathValue {
    String { value: String, span: Span },
    Int { value: i64, span: Span },
    Float { value: f64, span: Span },
    Bool { value: bool, span: Span },
    Null { span: Span },
    /// `Vendor:Type`
    FusionObject { name: String, span: Span },
    /// The code between `${` and `}`.
    Eel { code: String, span: Span },
    /// `identifier` and the code between the backticks.
    Dsl {
        identifier: String,
        code: String,
        span: Span,
    },
}

impl Spanned for PathValue {
    fn span(&self) -> Span {
        match self {
            PathValue::String { span, .. }
            | PathValue::Int { span, .. }
            | PathValue::Float { span, .. }
            | PathValue::Bool { span, .. }
            | PathValue::Null { span }
            | PathValue::FusionObject { span, .. }
            | PathValue::Eel { span, .. }
            | PathValue::Dsl { span, .. } => span.clone(),
        }
    }
}
