//! Document rewrite orchestration.

use log::{debug, log_enabled, trace};

use super::decode::{DecodeOptions, decode_document};
use super::locale::normalize_locale;
use crate::archive::VersionSettings;
use crate::html_tokenizer::{Token, serialize, tokenize};
use crate::link_rewriter::{OutputMode, RewriteContext, rewrite_tag_attributes};
use crate::script_rewriter::{is_javascript, rewrite_script_with};

/// Decode, normalize and relocate an archived HTML document.
///
/// Uses the default charset sniffing window and fallback encoding.
pub fn render_document(
    raw_bytes: &[u8],
    requested_path: &str,
    settings: &VersionSettings,
    root_path: &str,
    mode: OutputMode,
) -> String {
    let ctx = RewriteContext::new(requested_path, settings, root_path, mode);
    render_document_with(raw_bytes, &ctx, &DecodeOptions::default())
}

/// [`render_document`] with explicit decoding options.
pub fn render_document_with(
    raw_bytes: &[u8],
    ctx: &RewriteContext<'_>,
    options: &DecodeOptions,
) -> String {
    let html = decode_document(raw_bytes, ctx.settings.encoding.as_deref(), options);
    rewrite_document(&html, ctx)
}

/// Rewrite already-decoded markup.
pub fn rewrite_document(html: &str, ctx: &RewriteContext<'_>) -> String {
    let tokens = tokenize(html);
    let mut tokens = normalize_locale(tokens, ctx.settings);
    let attributes = rewrite_tag_attributes(&mut tokens, ctx);
    let scripts = rewrite_inline_scripts(&mut tokens, ctx);
    debug!(
        "Rewrote {} ({} tokens): {attributes} attributes, {scripts} scripts",
        ctx.requested_path,
        tokens.len()
    );
    serialize(&tokens)
}

/// Rewrite the body of every inline JavaScript block; returns how many changed.
pub fn rewrite_inline_scripts(tokens: &mut [Token], ctx: &RewriteContext<'_>) -> usize {
    let mut changed = 0;
    for token in tokens.iter_mut() {
        let Token::Script(script) = token else {
            continue;
        };
        if !is_javascript(&script.open) {
            trace!("Skipping non-JavaScript <{}> block", script.open.raw_name);
            continue;
        }
        let rewritten = rewrite_script_with(&script.raw_content, ctx);
        if rewritten != script.raw_content {
            script.raw_content = rewritten;
            changed += 1;
        }
    }
    changed
}

/// Decode and re-serialize without rewriting, logging each token at trace level.
pub fn tokenize_document(
    raw_bytes: &[u8],
    settings: &VersionSettings,
    options: &DecodeOptions,
) -> String {
    let html = decode_document(raw_bytes, settings.encoding.as_deref(), options);
    let tokens = tokenize(&html);
    if log_enabled!(log::Level::Trace) {
        for token in &tokens {
            trace!("{token:?}");
        }
    }
    serialize(&tokens)
}
