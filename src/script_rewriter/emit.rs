//! Span-preserving re-emission.
//!
//! Only rewritten nodes are printed; every other byte of the script is
//! copied from the source.

use std::ops::Range;

use super::ast::{Expr, ExprKind};
use super::errors::{ScriptError, ScriptResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Range<usize>,
    pub replacement: String,
}

/// Edits for every dirty literal and replaced argument list, outermost first.
pub fn collect_edits(items: &[Expr]) -> Vec<Edit> {
    let mut edits = Vec::new();
    for item in items {
        collect(item, &mut edits);
    }
    edits
}

fn collect(expr: &Expr, edits: &mut Vec<Edit>) {
    match &expr.kind {
        ExprKind::Str(lit) => {
            if lit.dirty {
                edits.push(Edit {
                    span: expr.span.clone(),
                    replacement: format!(
                        "{}{}{}",
                        "(".repeat(lit.opens),
                        quote_js_string(&lit.value, lit.quote),
                        ")".repeat(lit.closes)
                    ),
                });
            }
        }
        ExprKind::Call {
            callee,
            args_span,
            args_replacement: Some(replacement),
            ..
        } => {
            collect(callee, edits);
            edits.push(Edit {
                span: args_span.clone(),
                replacement: replacement.clone(),
            });
        }
        _ => {
            for child in expr.children() {
                collect(child, edits);
            }
        }
    }
}

/// Splice `edits` into `source`.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> ScriptResult<String> {
    edits.sort_by_key(|e| (e.span.start, e.span.end));
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &edits {
        if edit.span.start < cursor || edit.span.end > source.len() {
            return Err(ScriptError::OverlappingEdit(edit.span.start));
        }
        out.push_str(&source[cursor..edit.span.start]);
        out.push_str(&edit.replacement);
        cursor = edit.span.end;
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}

/// Quote `value` as a script string literal using `quote`.
///
/// `</script` is written as `<\/script` so the literal cannot close the
/// surrounding script element.
pub fn quote_js_string(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for (i, c) in value.char_indices() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '/' if i > 0
                && value.as_bytes()[i - 1] == b'<'
                && value.as_bytes()[i + 1..]
                    .get(..6)
                    .is_some_and(|s| s.eq_ignore_ascii_case(b"script")) =>
            {
                out.push_str("\\/");
            }
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_escapes_quote_and_backslash() {
        assert_eq!(quote_js_string(r#"a"b\c"#, '"'), r#""a\"b\\c""#);
        assert_eq!(quote_js_string(r#"a"b'c"#, '\''), r#"'a"b\'c'"#);
        assert_eq!(quote_js_string("l1\nl2", '"'), r#""l1\nl2""#);
    }

    #[test]
    fn quoting_breaks_script_close_tags() {
        assert_eq!(
            quote_js_string("<script src=a.js></SCRIPT>", '"'),
            r#""<script src=a.js><\/SCRIPT>""#
        );
        assert_eq!(quote_js_string("a/b </p>", '"'), r#""a/b </p>""#);
    }

    #[test]
    fn edits_splice_in_order() {
        let edits = vec![
            Edit {
                span: 6..7,
                replacement: "Y".into(),
            },
            Edit {
                span: 0..1,
                replacement: "X".into(),
            },
        ];
        assert_eq!(apply_edits("a b c d", edits).expect("applies"), "X b c Y");
    }

    #[test]
    fn overlapping_edits_are_rejected() {
        let edits = vec![
            Edit {
                span: 0..4,
                replacement: String::new(),
            },
            Edit {
                span: 2..5,
                replacement: String::new(),
            },
        ];
        assert_eq!(apply_edits("abcdef", edits), Err(ScriptError::OverlappingEdit(2)));
    }
}
