//! URL rewriting inside embedded scripts.
//!
//! A script is lexed losslessly, parsed into a shallow expression tree and
//! rewritten in place: `location.protocol` concatenations are folded into
//! literals, markup written with `document.write` goes back through the
//! attribute rewriter, and URL-shaped string literals are resolved. Only
//! changed nodes are re-printed, so untouched code keeps its exact bytes.
//!
//! Scripts that fail to lex or parse are returned unchanged.

pub mod ast;
pub mod emit;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod transform;

use log::warn;

use crate::archive::VersionSettings;
use crate::html_tokenizer::{TagOpen, attribute_value};
use crate::link_rewriter::{OutputMode, RewriteContext};

pub use errors::{ScriptError, ScriptResult};
pub use parser::parse_script;

/// Rewrite the URLs in `code`, returning it unchanged on any failure.
pub fn rewrite_script(
    code: &str,
    requested_path: &str,
    settings: &VersionSettings,
    root_path: &str,
    mode: OutputMode,
) -> String {
    let ctx = RewriteContext::new(requested_path, settings, root_path, mode);
    rewrite_script_with(code, &ctx)
}

/// [`rewrite_script`] with a prepared context.
pub fn rewrite_script_with(code: &str, ctx: &RewriteContext<'_>) -> String {
    match try_rewrite_script(code, ctx) {
        Ok(rewritten) => rewritten,
        Err(e) => {
            warn!(
                "Leaving script in {} unchanged: {e}",
                ctx.requested_path
            );
            code.to_string()
        }
    }
}

/// Rewrite the URLs in `code`, reporting why a script could not be handled.
pub fn try_rewrite_script(code: &str, ctx: &RewriteContext<'_>) -> ScriptResult<String> {
    let mut items = parse_script(code)?;
    transform::rewrite_expressions(&mut items, ctx);
    let edits = emit::collect_edits(&items);
    if edits.is_empty() {
        return Ok(code.to_string());
    }
    emit::apply_edits(code, edits)
}

/// Whether a `<script>` open tag holds JavaScript.
///
/// Missing `type` and `language` attributes mean JavaScript.
pub fn is_javascript(tag: &TagOpen) -> bool {
    let type_ok = attribute_value(tag, "type").is_none_or(|t| {
        let t = t.trim().to_ascii_lowercase();
        t.is_empty()
            || t == "module"
            || t.contains("javascript")
            || t.contains("ecmascript")
            || t.contains("jscript")
    });
    let language_ok = attribute_value(tag, "language").is_none_or(|l| {
        let l = l.trim().to_ascii_lowercase();
        l.is_empty()
            || l.starts_with("javascript")
            || l.starts_with("jscript")
            || l.starts_with("ecmascript")
    });
    type_ok && language_ok
}
