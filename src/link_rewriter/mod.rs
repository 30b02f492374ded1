//! URL relocation for archived markup.
//!
//! [`resolve_url`] turns one URL found in an archived page into the URL the
//! replayed page should carry. [`rewrite_tag_attributes`] applies it to every
//! URL-bearing attribute of a token sequence, following a fixed per-tag table
//! in which each attribute is classified local (archived resource) or external
//! (navigation target).

pub mod resolver;
pub mod tag_rules;

pub use resolver::{Classification, OutputMode, RewriteContext, resolve_url};
pub use tag_rules::{
    AttributeRule, rewrite_refresh_content, rewrite_tag, rewrite_tag_attributes, rules_for_tag,
};
