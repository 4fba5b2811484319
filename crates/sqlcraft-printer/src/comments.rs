use crate::options::CommentStyle;

/// A comment body made entirely of separator characters (a `----------` divider,
/// say) must never round-trip as a line comment: consumed as one, it would
/// swallow every token after it on the same source line. Force it to a block
/// comment no matter what the caller asked for.
fn is_pure_separator(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| matches!(c, '-' | '=' | '_' | '+' | '#'))
}

fn escape_block_body(text: &str) -> String {
    text.replace("*/", "*\\/")
}

fn flatten_line_body(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// Returns the sanitized body and whether it must render as a block comment.
pub(crate) fn sanitize(text: &str, originally_block: bool, style: CommentStyle) -> (String, bool) {
    if is_pure_separator(text) {
        return (text.to_string(), true);
    }
    let block = match style {
        CommentStyle::Block => true,
        CommentStyle::Line => false,
        // Downgrading an originally-block comment to line form is safe only
        // when it carries no embedded newline to lose; a comment that was
        // already a line comment never does.
        CommentStyle::Smart => originally_block && (text.contains('\n') || text.contains('\r')),
    };
    if block {
        (escape_block_body(text), true)
    } else {
        (flatten_line_body(text), false)
    }
}

pub(crate) fn render(text: &str, originally_block: bool, style: CommentStyle) -> String {
    let (body, block) = sanitize(text, originally_block, style);
    if block {
        format!("/* {body} */")
    } else {
        format!("-- {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_forces_block_form() {
        let rendered = render("----------", false, CommentStyle::Smart);
        assert_eq!(rendered, "/* ---------- */");
    }

    #[test]
    fn separator_forces_block_form_even_under_line_style() {
        let rendered = render("----------", true, CommentStyle::Line);
        assert_eq!(rendered, "/* ---------- */");
    }

    #[test]
    fn block_comment_escapes_embedded_close() {
        let rendered = render("careful */ here", true, CommentStyle::Block);
        assert!(!rendered[3..rendered.len() - 3].contains("*/"));
    }

    #[test]
    fn line_comment_collapses_newlines() {
        let rendered = render("first\nsecond", false, CommentStyle::Line);
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn smart_downgrades_safe_block_comment_to_line() {
        let rendered = render("just a note", true, CommentStyle::Smart);
        assert_eq!(rendered, "-- just a note");
    }

    #[test]
    fn smart_keeps_multiline_block_comment_as_block() {
        let rendered = render("first\nsecond", true, CommentStyle::Smart);
        assert!(rendered.starts_with("/*") && rendered.ends_with("*/"));
    }

    #[test]
    fn smart_keeps_line_comment_as_line() {
        let rendered = render("just a note", false, CommentStyle::Smart);
        assert_eq!(rendered, "-- just a note");
    }
}
