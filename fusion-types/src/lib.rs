pub mod constants;
pub mod span;

pub use span::{LineCol, Span, Spanned};
