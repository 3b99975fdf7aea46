//! Rendering of errors and warnings with a source excerpt.
use annotate_snippets::{
    display_list::{DisplayList, FormatOptions},
    snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation},
};
use fusion_error::{error::CompileError, warning::CompileWarning};
use fusion_types::{LineCol, Span, Spanned};

pub fn format_err(err: &CompileError) {
    let mut message = err.to_string();
    if let Some(code) = err.code() {
        message = format!("{message} ({code})");
    }
    let rendered = render(&err.span(), &message, AnnotationType::Error, true);
    tracing::error!("{}\n____\n", rendered);
}

pub fn format_warning(warning: &CompileWarning) {
    let rendered = render(&warning.span(), &warning.to_string(), AnnotationType::Warning, true);
    tracing::warn!("{}\n____\n", rendered);
}

fn render(span: &Span, message: &str, annotation_type: AnnotationType, color: bool) -> String {
    let path = span.path().map(|path| path.to_string_lossy().into_owned());
    let opt = FormatOptions {
        color,
        ..Default::default()
    };

    // Spans not pointing into a source only get a title.
    if span.is_dummy() {
        let snippet = Snippet {
            title: Some(Annotation {
                label: Some(message),
                id: None,
                annotation_type,
            }),
            footer: vec![],
            slices: vec![],
            opt,
        };
        return DisplayList::from(snippet).to_string();
    }

    let (start, end) = span.line_col();
    let (source, line_start, range) =
        construct_window(span.src(), span.start(), span.end(), start, end);
    let snippet = Snippet {
        title: Some(Annotation {
            label: None,
            id: None,
            annotation_type,
        }),
        footer: vec![],
        slices: vec![Slice {
            source,
            line_start,
            origin: path.as_deref(),
            fold: false,
            annotations: vec![SourceAnnotation {
                label: message,
                annotation_type,
                range,
            }],
        }],
        opt,
    };
    DisplayList::from(snippet).to_string()
}

/// Cuts the lines around `start_ix..end_ix` out of `input`.
///
/// Returns the excerpt, the line number it starts at, and the highlighted
/// range counted in chars from the start of the excerpt. The range is never
/// empty so that the marker is always drawn.
fn construct_window(
    input: &str,
    start_ix: usize,
    end_ix: usize,
    start: LineCol,
    end: LineCol,
) -> (&str, usize, (usize, usize)) {
    // how many lines to show around the highlighted ones
    const NUM_LINES_BUFFER: usize = 2;

    let first_line = start.line.saturating_sub(NUM_LINES_BUFFER).max(1);
    let last_line = end.line + NUM_LINES_BUFFER;

    let mut window_start = 0;
    let mut window_end = input.len();
    let mut line = 1;
    for (ix, c) in input.char_indices() {
        if c != '\n' {
            continue;
        }
        line += 1;
        if line == first_line {
            window_start = ix + 1;
        }
        if line > last_line {
            window_end = ix;
            break;
        }
    }

    let window = &input[window_start..window_end];
    let to_window_chars =
        |ix: usize| input[window_start..ix.clamp(window_start, window_end)].chars().count();
    let mut range = (to_window_chars(start_ix), to_window_chars(end_ix));
    if range.0 == range.1 {
        if range.1 < window.chars().count() {
            range.1 += 1;
        } else if range.0 > 0 {
            range.0 -= 1;
        }
    }
    (window, first_line, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{path::PathBuf, sync::Arc};

    const SRC: &str = "a = 1\nb = 2\nc = 3\nd = 4\ne = 5\nf = 6\ng = 7\nh = 8\n";

    fn line_col(line: usize, col: usize) -> LineCol {
        LineCol { line, col }
    }

    #[test]
    fn window_keeps_two_lines_of_context() {
        let (window, line_start, range) = construct_window(SRC, 24, 25, line_col(5, 1), line_col(5, 2));
        assert_eq!(window, "c = 3\nd = 4\ne = 5\nf = 6\ng = 7");
        assert_eq!(line_start, 3);
        assert_eq!(range, (12, 13));
    }

    #[test]
    fn window_at_the_start_of_the_input() {
        let (window, line_start, range) = construct_window(SRC, 4, 5, line_col(1, 5), line_col(1, 6));
        assert_eq!(window, "a = 1\nb = 2\nc = 3");
        assert_eq!(line_start, 1);
        assert_eq!(range, (4, 5));
    }

    #[test]
    fn empty_ranges_are_widened() {
        let src = "a {\n";
        let (window, _, range) = construct_window(src, 4, 4, line_col(2, 1), line_col(2, 1));
        assert_eq!(window, "a {\n");
        assert_eq!(range, (3, 4));

        let (_, _, range) = construct_window(src, 2, 2, line_col(1, 3), line_col(1, 3));
        assert_eq!(range, (2, 3));
    }

    #[test]
    fn rendered_errors_name_the_file() {
        let src: Arc<str> = Arc::from(SRC);
        let path = Some(Arc::new(PathBuf::from("Root.fusion")));
        let span = Span::new(src, 6, 7, path).unwrap();
        let rendered = render(&span, "Reserved key '__meta' used.", AnnotationType::Error, false);
        assert!(rendered.contains("Root.fusion"), "{rendered}");
        assert!(rendered.contains("Reserved key '__meta' used."), "{rendered}");
        assert!(rendered.contains("b = 2"), "{rendered}");
    }

    #[test]
    fn errors_without_position_render_as_title() {
        let rendered = render(&Span::dummy(), "Recursive inheritance", AnnotationType::Error, false);
        assert_eq!(rendered.trim_end(), "error: Recursive inheritance");
    }
}
