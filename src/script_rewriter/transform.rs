//! Rewrite passes over a parsed script.
//!
//! Passes run in a fixed order: `location.protocol` folding, then
//! `document.write` markup rewriting, then URL literal rewriting. Literal
//! rewriting skips argument lists already replaced by the markup pass.

use std::ops::Range;

use log::trace;

use super::ast::{Expr, ExprKind, StrLit};
use super::emit::quote_js_string;
use crate::html_tokenizer::{serialize, tokenize};
use crate::link_rewriter::{Classification, RewriteContext, rewrite_tag_attributes};
use crate::utils::{LOCAL_SCRIPT_RESOURCE_EXTENSIONS, extension_of};

/// Run every pass over the top-level expressions of a script.
pub fn rewrite_expressions(items: &mut [Expr], ctx: &RewriteContext<'_>) {
    for item in items.iter_mut() {
        fold_location_protocol(item);
    }
    for item in items.iter_mut() {
        rewrite_document_writes(item, ctx);
    }
    for item in items.iter_mut() {
        rewrite_literals(item, ctx);
    }
}

fn is_location_protocol(expr: &Expr) -> bool {
    expr.is_member_of("location", "protocol")
}

#[derive(Debug, Clone, PartialEq)]
enum PartRole {
    Protocol,
    Literal(StrLit),
    Other,
}

/// One operand of a flattened `+` concatenation.
#[derive(Debug, Clone, PartialEq)]
struct ConcatPart {
    span: Range<usize>,
    role: PartRole,
    /// `(` written directly before this operand.
    opens: usize,
    /// `)` written directly after this operand.
    closes: usize,
}

impl ConcatPart {
    fn of(expr: &Expr) -> Self {
        let role = match &expr.kind {
            ExprKind::Str(lit) => PartRole::Literal(lit.clone()),
            _ if is_location_protocol(expr) => PartRole::Protocol,
            _ => PartRole::Other,
        };
        Self {
            span: expr.span.clone(),
            role,
            opens: 0,
            closes: 0,
        }
    }

    fn other(span: Range<usize>) -> Self {
        Self {
            span,
            role: PartRole::Other,
            opens: 0,
            closes: 0,
        }
    }
}

/// Operands of a `+` concatenation in source order.
///
/// Nested concatenations and single-expression parentheses are opened up.
/// A chain that ends in `+` but also holds other operators contributes
/// everything up to its last non-`+` operator as one opaque operand.
fn flatten_concat(expr: &Expr, out: &mut Vec<ConcatPart>) {
    match &expr.kind {
        ExprKind::Group {
            delim: '(',
            children,
        } if children.len() == 1 => {
            let first = out.len();
            flatten_concat(&children[0], out);
            if let Some(part) = out.get_mut(first) {
                part.opens += 1;
            }
            if let Some(part) = out.last_mut() {
                part.closes += 1;
            }
        }
        ExprKind::Chain { head, links } if expr.is_concat() => {
            let rest = match links.iter().rposition(|link| link.op != "+") {
                None => {
                    flatten_concat(head, out);
                    links.as_slice()
                }
                Some(k) => {
                    out.push(ConcatPart::other(
                        head.span.start..links[k].operand.span.end,
                    ));
                    &links[k + 1..]
                }
            };
            for link in rest {
                flatten_concat(&link.operand, out);
            }
        }
        _ => out.push(ConcatPart::of(expr)),
    }
}

fn protocol_prefixed(value: &str) -> String {
    if value.starts_with("//") {
        format!("http:{value}")
    } else if value.starts_with('/') {
        format!("http:/{value}")
    } else {
        format!("http://{value}")
    }
}

/// A `location.protocol + "<literal>"` pair to merge.
#[derive(Debug, Clone, PartialEq)]
struct ProtocolFold {
    protocol: Range<usize>,
    literal: Range<usize>,
    folded: StrLit,
}

/// Adjacent protocol/literal pairs among `parts`.
///
/// A pair split by parentheses on both sides, as in `(a + location.protocol)
/// + ("//h" + b)`, has no single literal slot to fold into and is skipped.
fn protocol_folds(parts: &[ConcatPart]) -> Vec<ProtocolFold> {
    let mut folds = Vec::new();
    let mut i = 0;
    while i + 1 < parts.len() {
        let (part, next) = (&parts[i], &parts[i + 1]);
        if let (PartRole::Protocol, PartRole::Literal(lit)) = (&part.role, &next.role) {
            if part.closes == 0 || next.opens == 0 {
                let mut folded = StrLit::new(protocol_prefixed(&lit.value), lit.quote);
                folded.dirty = true;
                folded.opens = next.opens;
                folded.closes = part.closes;
                folds.push(ProtocolFold {
                    protocol: part.span.clone(),
                    literal: next.span.clone(),
                    folded,
                });
                i += 2;
                continue;
            }
        }
        i += 1;
    }
    folds
}

/// The innermost node spanning exactly `span`, other than chains and groups.
fn node_at_mut<'e>(expr: &'e mut Expr, span: &Range<usize>) -> Option<&'e mut Expr> {
    if expr.span.start > span.start || expr.span.end < span.end {
        return None;
    }
    if expr.span == *span && !matches!(expr.kind, ExprKind::Chain { .. } | ExprKind::Group { .. })
    {
        return Some(expr);
    }
    expr.children_mut()
        .into_iter()
        .find_map(|child| node_at_mut(child, span))
}

fn apply_protocol_fold(expr: &mut Expr, fold: ProtocolFold) {
    let ProtocolFold {
        protocol,
        literal,
        folded,
    } = fold;
    trace!("Folded location.protocol literal into {:?}", folded.value);
    if let Some(node) = node_at_mut(expr, &protocol) {
        node.kind = ExprKind::Erased;
    }
    if let Some(node) = node_at_mut(expr, &literal) {
        *node = Expr::new(protocol.start..literal.end, ExprKind::Str(folded));
    }
}

/// Fold `location.protocol + "<literal>"` pairs into one `http:` literal.
///
/// Each run of `+` operators in a chain is flattened, parentheses included,
/// and every protocol read directly followed by a string literal becomes a
/// single literal. An operand to the right of another operator (`a -
/// location.protocol + "//h"`) does not take part in the following run.
pub fn fold_location_protocol(expr: &mut Expr) {
    let mut folds = Vec::new();
    if let ExprKind::Chain { head, links } = &expr.kind {
        let mut parts = Vec::new();
        flatten_concat(head, &mut parts);
        for link in links {
            if link.op == "+" {
                flatten_concat(&link.operand, &mut parts);
            } else {
                folds.extend(protocol_folds(&parts));
                parts.clear();
            }
        }
        folds.extend(protocol_folds(&parts));
    }
    for fold in folds {
        apply_protocol_fold(expr, fold);
    }
    for child in expr.children_mut() {
        fold_location_protocol(child);
    }
}

/// Append the constant string value of `expr` to `out`.
///
/// Accepts literals, `+` concatenations and parenthesized single expressions.
fn fold_static_string(expr: &Expr, out: &mut String, quote: &mut Option<char>) -> bool {
    match &expr.kind {
        ExprKind::Str(lit) => {
            quote.get_or_insert(lit.quote);
            out.push_str(&lit.value);
            true
        }
        ExprKind::Erased => true,
        ExprKind::Chain { head, links } if links.iter().all(|link| link.op == "+") => {
            fold_static_string(head, out, quote)
                && links
                    .iter()
                    .all(|link| fold_static_string(&link.operand, out, quote))
        }
        ExprKind::Group {
            delim: '(',
            children,
        } if children.len() == 1 => fold_static_string(&children[0], out, quote),
        _ => false,
    }
}

fn is_document_write(callee: &Expr) -> bool {
    callee.is_member_of("document", "write") || callee.is_member_of("document", "writeln")
}

/// Rewrite the markup passed to `document.write` / `document.writeln`.
pub fn rewrite_document_writes(expr: &mut Expr, ctx: &RewriteContext<'_>) {
    if let ExprKind::Call {
        callee,
        args,
        args_replacement,
        ..
    } = &mut expr.kind
    {
        if is_document_write(callee) {
            if let Some(replacement) = rewritten_write_arguments(args, ctx) {
                *args_replacement = Some(replacement);
                return;
            }
        }
    }
    for child in expr.children_mut() {
        rewrite_document_writes(child, ctx);
    }
}

/// Replacement argument text for a `document.write` call, when the markup
/// is constant and rewriting changed it.
fn rewritten_write_arguments(args: &[Expr], ctx: &RewriteContext<'_>) -> Option<String> {
    if args.is_empty() {
        return None;
    }
    let mut markup = String::new();
    let mut quote = None;
    if !args
        .iter()
        .all(|arg| fold_static_string(arg, &mut markup, &mut quote))
    {
        return None;
    }
    let mut tokens = tokenize(&markup);
    if rewrite_tag_attributes(&mut tokens, ctx) == 0 {
        return None;
    }
    let rewritten = serialize(&tokens);
    if rewritten == markup {
        return None;
    }
    trace!("Rewrote document.write markup: {rewritten:?}");
    Some(quote_js_string(&rewritten, quote.unwrap_or('"')))
}

fn literal_classification(value: &str) -> Classification {
    match extension_of(value) {
        Some(ext) if LOCAL_SCRIPT_RESOURCE_EXTENSIONS.contains(&ext.as_str()) => {
            Classification::Local
        }
        _ => Classification::External,
    }
}

fn rewrite_literal(lit: &mut StrLit, ctx: &RewriteContext<'_>) {
    let value = &lit.value;
    if !(value.starts_with("http://") || value.starts_with("https://") || value.starts_with('/')) {
        return;
    }
    let resolved = ctx.resolve(value, literal_classification(value));
    if resolved != *value {
        trace!("Rewrote script literal {value:?} -> {resolved:?}");
        lit.value = resolved;
        lit.dirty = true;
    }
}

/// Resolve every URL-shaped string literal.
pub fn rewrite_literals(expr: &mut Expr, ctx: &RewriteContext<'_>) {
    if let ExprKind::Str(lit) = &mut expr.kind {
        rewrite_literal(lit, ctx);
        return;
    }
    if let ExprKind::Call {
        callee,
        args_replacement: Some(_),
        ..
    } = &mut expr.kind
    {
        rewrite_literals(callee, ctx);
        return;
    }
    for child in expr.children_mut() {
        rewrite_literals(child, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script_rewriter::emit::{apply_edits, collect_edits};
    use crate::script_rewriter::parser::parse_script;

    #[test]
    fn protocol_prefix_depends_on_leading_slashes() {
        assert_eq!(protocol_prefixed("//a.com/x"), "http://a.com/x");
        assert_eq!(protocol_prefixed("/a.com/x"), "http://a.com/x");
        assert_eq!(protocol_prefixed("a.com/x"), "http://a.com/x");
    }

    fn folded(src: &str) -> String {
        let mut items = parse_script(src).expect("parses");
        for item in items.iter_mut() {
            fold_location_protocol(item);
        }
        apply_edits(src, collect_edits(&items)).expect("edits apply")
    }

    #[test]
    fn fold_keeps_surrounding_operands() {
        assert_eq!(
            folded(r#"a + location.protocol + "//h/p" + b"#),
            r#"a + "http://h/p" + b"#
        );
        assert_eq!(folded("location.protocol + '//h' == u"), "'http://h' == u");
    }

    #[test]
    fn fold_reaches_through_parentheses() {
        assert_eq!(
            folded("x = location.protocol + ('//h/x' + y);"),
            "x = ('http://h/x' + y);"
        );
        assert_eq!(
            folded("x = (a + location.protocol) + '//h/x';"),
            "x = (a + 'http://h/x');"
        );
        assert_eq!(
            folded("x = a + (location.protocol + '//h/x');"),
            "x = a + ('http://h/x');"
        );
    }

    #[test]
    fn fold_respects_operator_boundaries() {
        for src in [
            "x = a - location.protocol + '//h';",
            "x = (a + location.protocol) + ('//h' + b);",
            "x = location.protocol * '//h';",
        ] {
            assert_eq!(folded(src), src);
        }
    }

    #[test]
    fn flatten_opens_nested_concatenations() {
        let items = parse_script("a + (b + (c)) - d + e").expect("parses");
        let mut parts = Vec::new();
        flatten_concat(&items[0], &mut parts);
        let spans: Vec<Range<usize>> = parts.iter().map(|p| p.span.clone()).collect();
        // Everything before the `-` is one operand.
        assert_eq!(spans, [0..17, 20..21]);
    }

    #[test]
    fn protocol_without_literal_is_untouched() {
        let mut items = parse_script("location.protocol + host").expect("parses");
        let before = items.clone();
        fold_location_protocol(&mut items[0]);
        assert_eq!(items, before);
    }

    #[test]
    fn static_string_folding_requires_constants() {
        let items = parse_script(r#"('<a' + ">") + "x""#).expect("parses");
        let mut out = String::new();
        let mut quote = None;
        assert!(fold_static_string(&items[0], &mut out, &mut quote));
        assert_eq!(out, "<a>x");
        assert_eq!(quote, Some('\''));

        let items = parse_script(r#""<a href='" + url + "'>""#).expect("parses");
        assert!(!fold_static_string(&items[0], &mut String::new(), &mut None));
    }

    #[test]
    fn literal_classification_uses_extension() {
        assert_eq!(literal_classification("/img/a.GIF"), Classification::Local);
        assert_eq!(literal_classification("/lib/app.js?v=1"), Classification::Local);
        assert_eq!(literal_classification("/news/index.html"), Classification::External);
        assert_eq!(literal_classification("/cgi-bin/search"), Classification::External);
    }
}
