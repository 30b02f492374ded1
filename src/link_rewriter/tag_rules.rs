//! Per-tag URL attribute table and in-place attribute rewriting.

use once_cell::sync::Lazy;
use regex::Regex;

use super::resolver::{Classification, RewriteContext};
use crate::html_tokenizer::{
    TagOpen, Token, attribute_value, get_attribute_mut, set_attribute_value,
};

/// One URL-bearing attribute of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRule {
    pub attribute: &'static str,
    pub classification: Classification,
    /// Sibling attribute that must hold the given value (ASCII case-insensitive).
    pub requires: Option<(&'static str, &'static str)>,
}

const fn local(attribute: &'static str) -> AttributeRule {
    AttributeRule {
        attribute,
        classification: Classification::Local,
        requires: None,
    }
}

const fn external(attribute: &'static str) -> AttributeRule {
    AttributeRule {
        attribute,
        classification: Classification::External,
        requires: None,
    }
}

const IMG_RULES: &[AttributeRule] = &[local("src"), local("lowsrc")];
const BACKGROUND_RULES: &[AttributeRule] = &[local("background")];
const HREF_EXTERNAL_RULES: &[AttributeRule] = &[external("href")];
const HREF_LOCAL_RULES: &[AttributeRule] = &[local("href")];
const SRC_RULES: &[AttributeRule] = &[local("src")];
const OPTION_RULES: &[AttributeRule] = &[external("value")];
const FORM_RULES: &[AttributeRule] = &[external("action")];
const INPUT_RULES: &[AttributeRule] = &[AttributeRule {
    attribute: "src",
    classification: Classification::Local,
    requires: Some(("type", "image")),
}];

/// URL attributes rewritten for a lowercased tag name.
pub fn rules_for_tag(name: &str) -> &'static [AttributeRule] {
    match name {
        "img" => IMG_RULES,
        "body" | "table" | "td" => BACKGROUND_RULES,
        "a" | "area" => HREF_EXTERNAL_RULES,
        "link" => HREF_LOCAL_RULES,
        "iframe" | "frame" | "script" | "bgsound" | "embed" => SRC_RULES,
        "option" => OPTION_RULES,
        "form" => FORM_RULES,
        "input" => INPUT_RULES,
        _ => &[],
    }
}

static META_REFRESH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s*;\s*url\s*=\s*(.+)\s*$").expect("meta refresh pattern is valid")
});

/// Rewrite the `url=` target of a `<meta http-equiv=refresh>` content value.
///
/// Returns `None` when the value is not a refresh with a target.
pub fn rewrite_refresh_content(content: &str, ctx: &RewriteContext<'_>) -> Option<String> {
    let caps = META_REFRESH_RE.captures(content)?;
    let target = ctx.resolve(&caps[2], Classification::External);
    Some(format!("{}; url={target}", &caps[1]))
}

/// Rewrite the URL attributes of one opening tag; returns how many changed.
pub fn rewrite_tag(tag: &mut TagOpen, ctx: &RewriteContext<'_>) -> usize {
    if tag.name == "meta" {
        return rewrite_meta_refresh(tag, ctx);
    }

    let mut changed = 0;
    for rule in rules_for_tag(&tag.name) {
        if let Some((name, expected)) = rule.requires {
            let satisfied =
                attribute_value(tag, name).is_some_and(|v| v.eq_ignore_ascii_case(expected));
            if !satisfied {
                continue;
            }
        }
        let Some(attr) = tag.attrs.iter_mut().find(|a| a.name == rule.attribute) else {
            continue;
        };
        let Some(value) = attr.value.as_deref().filter(|v| !v.is_empty()) else {
            continue;
        };
        let rewritten = ctx.resolve(value, rule.classification);
        if rewritten != value {
            log::trace!("{}[{}]: {} -> {}", tag.raw_name, rule.attribute, value, rewritten);
            set_attribute_value(attr, &rewritten);
            changed += 1;
        }
    }
    changed
}

fn rewrite_meta_refresh(tag: &mut TagOpen, ctx: &RewriteContext<'_>) -> usize {
    let is_refresh = attribute_value(tag, "http-equiv")
        .is_some_and(|v| v.eq_ignore_ascii_case("refresh"));
    if !is_refresh {
        return 0;
    }
    let Some(attr) = get_attribute_mut(tag, "content") else {
        return 0;
    };
    let Some(value) = attr.value.as_deref().filter(|v| !v.is_empty()) else {
        return 0;
    };
    match rewrite_refresh_content(value, ctx) {
        Some(rewritten) if rewritten != value => {
            log::trace!("meta refresh: {value} -> {rewritten}");
            set_attribute_value(attr, &rewritten);
            1
        }
        _ => 0,
    }
}

/// Rewrite every opening tag in `tokens`; returns the number of changed attributes.
pub fn rewrite_tag_attributes(tokens: &mut [Token], ctx: &RewriteContext<'_>) -> usize {
    tokens
        .iter_mut()
        .filter_map(Token::as_tag_open_mut)
        .map(|tag| rewrite_tag(tag, ctx))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{UrlRewrites, VersionSettings};
    use crate::html_tokenizer::{serialize, tokenize};
    use crate::link_rewriter::OutputMode;

    fn settings() -> VersionSettings {
        VersionSettings {
            default_page: "index.html".to_string(),
            encoding: None,
            language: None,
            url_rewrites: UrlRewrites {
                base_origin: "http://www.example.com".to_string(),
                base_pathname: "/".to_string(),
                path_remaps: Default::default(),
            },
        }
    }

    fn rewrite(html: &str) -> String {
        let s = settings();
        let ctx = RewriteContext::new(
            "docs/page.html",
            &s,
            "/example/2001-06-01/",
            OutputMode::Absolute,
        );
        let mut tokens = tokenize(html);
        rewrite_tag_attributes(&mut tokens, &ctx);
        serialize(&tokens)
    }

    #[test]
    fn rewrites_image_and_anchor() {
        assert_eq!(
            rewrite(r#"<IMG SRC="a.gif" alt=x><a href='/about.html'>"#),
            r#"<IMG SRC="/example/2001-06-01/docs/a.gif" alt=x><a href='/example/2001-06-01/about.html'>"#
        );
    }

    #[test]
    fn input_requires_image_type() {
        assert_eq!(
            rewrite(r#"<input type=text src="a.gif">"#),
            r#"<input type=text src="a.gif">"#
        );
        assert_eq!(
            rewrite(r#"<input type=IMAGE src="a.gif">"#),
            r#"<input type=IMAGE src="/example/2001-06-01/docs/a.gif">"#
        );
    }

    #[test]
    fn meta_refresh_target_is_rewritten() {
        assert_eq!(
            rewrite(r#"<meta http-equiv="Refresh" content="5;URL=next.html">"#),
            r#"<meta http-equiv="Refresh" content="5; url=/example/2001-06-01/docs/next.html">"#
        );
        assert_eq!(
            rewrite(r#"<meta http-equiv="refresh" content="5">"#),
            r#"<meta http-equiv="refresh" content="5">"#
        );
    }

    #[test]
    fn empty_and_unlisted_attributes_untouched() {
        let html = r#"<a href="">x</a><div src="a.gif"><img alt="a.gif">"#;
        assert_eq!(rewrite(html), html);
    }
}
