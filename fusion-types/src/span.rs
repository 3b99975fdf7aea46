use std::{fmt, path::PathBuf, sync::Arc};

/// A one-based line and column pair, as shown to users.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A byte range into a shared source text, optionally tagged with the file it came from.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    src: Arc<str>,
    start: usize,
    end: usize,
    path: Option<Arc<PathBuf>>,
}

impl Span {
    pub fn new(src: Arc<str>, start: usize, end: usize, path: Option<Arc<PathBuf>>) -> Option<Span> {
        src.get(start..end)?;
        Some(Span {
            src,
            start,
            end,
            path,
        })
    }

    /// A span covering nothing. Used for errors that have no place in any source,
    /// such as an inheritance cycle spread over several files.
    pub fn dummy() -> Span {
        Span {
            src: Arc::from(""),
            start: 0,
            end: 0,
            path: None,
        }
    }

    /// An empty span sitting at `offset`, clamped to the source length.
    pub fn at(src: Arc<str>, offset: usize, path: Option<Arc<PathBuf>>) -> Span {
        let mut offset = offset.min(src.len());
        while !src.is_char_boundary(offset) {
            offset -= 1;
        }
        Span {
            src,
            start: offset,
            end: offset,
            path,
        }
    }

    pub fn join(lhs: Span, rhs: &Span) -> Span {
        debug_assert!(Arc::ptr_eq(&lhs.src, &rhs.src));
        Span {
            start: lhs.start.min(rhs.start),
            end: lhs.end.max(rhs.end),
            ..lhs
        }
    }

    pub fn as_str(&self) -> &str {
        &self.src[self.start..self.end]
    }

    pub fn src(&self) -> &Arc<str> {
        &self.src
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn path(&self) -> Option<&Arc<PathBuf>> {
        self.path.as_ref()
    }

    pub fn is_dummy(&self) -> bool {
        self.src.is_empty() && self.path.is_none()
    }

    pub fn start_line_col(&self) -> LineCol {
        line_col_at(&self.src, self.start)
    }

    pub fn end_line_col(&self) -> LineCol {
        line_col_at(&self.src, self.end)
    }

    pub fn line_col(&self) -> (LineCol, LineCol) {
        (self.start_line_col(), self.end_line_col())
    }
}

fn line_col_at(src: &str, offset: usize) -> LineCol {
    let mut line_col = LineCol { line: 1, col: 1 };
    for (ix, c) in src.char_indices() {
        if ix >= offset {
            break;
        }
        if c == '\n' {
            line_col.line += 1;
            line_col.col = 1;
        } else {
            line_col.col += 1;
        }
    }
    line_col
}

impl fmt::Debug for Span {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Span")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("as_str", &self.as_str())
            .finish()
    }
}

pub trait Spanned {
    fn span(&self) -> Span;
}

impl<T: Spanned> Spanned for Box<T> {
    fn span(&self) -> Span {
        (**self).span()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_is_one_based() {
        let src: Arc<str> = Arc::from("a = 1\nbb = 2\n");
        let span = Span::new(src, 6, 8, None).unwrap();
        assert_eq!(span.as_str(), "bb");
        assert_eq!(span.start_line_col(), LineCol { line: 2, col: 1 });
        assert_eq!(span.end_line_col(), LineCol { line: 2, col: 3 });
    }

    #[test]
    fn out_of_range_span_is_rejected() {
        let src: Arc<str> = Arc::from("abc");
        assert!(Span::new(src.clone(), 2, 4, None).is_none());
        assert_eq!(Span::at(src, 10, None).start(), 3);
    }

    #[test]
    fn join_covers_both_spans() {
        let src: Arc<str> = Arc::from("foo.bar");
        let lhs = Span::new(src.clone(), 0, 3, None).unwrap();
        let rhs = Span::new(src, 4, 7, None).unwrap();
        assert_eq!(Span::join(lhs, &rhs).as_str(), "foo.bar");
    }
}
