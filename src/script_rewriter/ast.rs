//! Expression tree over script source spans.
//!
//! The tree is deliberately shallow: it models only what the rewrite passes
//! inspect (string literals, member reads, calls, `+` chains) and treats
//! everything else as opaque source.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Byte range in the script source.
    pub span: Range<usize>,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrLit {
    /// Decoded value.
    pub value: String,
    /// Quote character of the source literal.
    pub quote: char,
    /// Set when `value` no longer matches the source text.
    pub dirty: bool,
    /// Parentheses re-emitted before and after the literal when a fold
    /// swallowed the source between them.
    pub opens: usize,
    pub closes: usize,
}

impl StrLit {
    pub fn new(value: String, quote: char) -> Self {
        Self {
            value,
            quote,
            dirty: false,
            opens: 0,
            closes: 0,
        }
    }
}

/// One `op operand` step of an operator chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLink {
    pub op: String,
    pub operand: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Str(StrLit),
    Ident(String),
    Member {
        object: Box<Expr>,
        property: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        /// Source range between the parentheses.
        args_span: Range<usize>,
        /// Replacement text for the whole argument list.
        args_replacement: Option<String>,
    },
    /// Left-associative run of binary operators sharing one precedence
    /// level, kept flat so long concatenations do not nest.
    Chain {
        head: Box<Expr>,
        links: Vec<ChainLink>,
    },
    /// Right-associative operator: assignment or `**`.
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Option<Box<Expr>>,
    },
    /// Bracketed contents (`(`, `[` or `{`) or a function's parameters and body.
    Group {
        delim: char,
        children: Vec<Expr>,
    },
    Opaque,
    /// Source folded into a neighbouring literal; contributes nothing.
    Erased,
}

impl Expr {
    pub fn new(span: Range<usize>, kind: ExprKind) -> Self {
        Self { span, kind }
    }

    pub fn opaque(span: Range<usize>) -> Self {
        Self::new(span, ExprKind::Opaque)
    }

    pub fn as_str_lit(&self) -> Option<&StrLit> {
        match &self.kind {
            ExprKind::Str(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, ExprKind::Ident(n) if n == name)
    }

    /// True for `object.property` where `object` is the identifier `object_name`.
    pub fn is_member_of(&self, object_name: &str, property_name: &str) -> bool {
        matches!(
            &self.kind,
            ExprKind::Member { object, property }
                if property == property_name && object.is_ident(object_name)
        )
    }

    /// True for a chain whose final operator is `+`.
    pub fn is_concat(&self) -> bool {
        matches!(
            &self.kind,
            ExprKind::Chain { links, .. } if links.last().is_some_and(|l| l.op == "+")
        )
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Str(_) | ExprKind::Ident(_) | ExprKind::Opaque | ExprKind::Erased => {
                Vec::new()
            }
            ExprKind::Member { object, .. } => vec![object.as_ref()],
            ExprKind::Index { object, index } => vec![object.as_ref(), index.as_ref()],
            ExprKind::Call { callee, args, .. } => {
                let mut out = vec![callee.as_ref()];
                out.extend(args.iter());
                out
            }
            ExprKind::Chain { head, links } => {
                let mut out = vec![head.as_ref()];
                out.extend(links.iter().map(|link| &link.operand));
                out
            }
            ExprKind::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            ExprKind::Unary { operand, .. } => vec![operand.as_ref()],
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let mut out = vec![test.as_ref(), consequent.as_ref()];
                out.extend(alternate.as_deref());
                out
            }
            ExprKind::Group { children, .. } => children.iter().collect(),
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match &mut self.kind {
            ExprKind::Str(_) | ExprKind::Ident(_) | ExprKind::Opaque | ExprKind::Erased => {
                Vec::new()
            }
            ExprKind::Member { object, .. } => vec![object.as_mut()],
            ExprKind::Index { object, index } => vec![object.as_mut(), index.as_mut()],
            ExprKind::Call { callee, args, .. } => {
                let mut out = vec![callee.as_mut()];
                out.extend(args.iter_mut());
                out
            }
            ExprKind::Chain { head, links } => {
                let mut out = vec![head.as_mut()];
                out.extend(links.iter_mut().map(|link| &mut link.operand));
                out
            }
            ExprKind::Binary { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            ExprKind::Unary { operand, .. } => vec![operand.as_mut()],
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let mut out = vec![test.as_mut(), consequent.as_mut()];
                if let Some(alt) = alternate {
                    out.push(alt.as_mut());
                }
                out
            }
            ExprKind::Group { children, .. } => children.iter_mut().collect(),
        }
    }
}
