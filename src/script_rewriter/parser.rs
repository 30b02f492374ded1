//! Permissive expression parser.
//!
//! A script is read as a flat list of expressions. Statement keywords and
//! separators are skipped, so any sequence of balanced brackets parses;
//! only lexing errors and unbalanced brackets are rejected.

use std::ops::Range;

use super::ast::{ChainLink, Expr, ExprKind, StrLit};
use super::errors::{ScriptError, ScriptResult};
use super::lexer::{JsToken, TokenKind, decode_string_literal, lex};

/// Bracket, call and unary nesting allowed before a script is rejected.
/// Flat operator chains do not count toward it.
const MAX_DEPTH: usize = 128;

const EXPONENT_PRECEDENCE: u8 = 11;

const STATEMENT_KEYWORDS: &[&str] = &[
    "var", "let", "const", "if", "else", "for", "while", "do", "return", "break", "continue",
    "switch", "case", "default", "try", "catch", "finally", "throw", "with", "debugger", "import",
    "export",
];

const ASSIGNMENT_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=",
    "||=", "??=", "=>",
];

fn binary_precedence(op: &str) -> Option<u8> {
    Some(match op {
        "??" | "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" | "===" | "!==" => 6,
        "<" | ">" | "<=" | ">=" | "in" | "instanceof" => 7,
        "<<" | ">>" | ">>>" => 8,
        "+" | "-" => 9,
        "*" | "/" | "%" => 10,
        "**" => EXPONENT_PRECEDENCE,
        _ => return None,
    })
}

/// Closing bracket the item loop is waiting for.
#[derive(Debug, Clone, Copy)]
struct Closer {
    close: &'static str,
    open: char,
    offset: usize,
}

struct Parser<'s> {
    source: &'s str,
    /// Significant tokens only.
    tokens: Vec<JsToken>,
    pos: usize,
    depth: usize,
}

/// Parse `source` into its top-level expressions.
pub fn parse_script(source: &str) -> ScriptResult<Vec<Expr>> {
    let tokens = lex(source)?
        .into_iter()
        .filter(|t| !t.is_trivia())
        .collect();
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
    };
    parser.parse_items(None)
}

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<&JsToken> {
        self.tokens.get(self.pos)
    }

    fn peek_text(&self) -> Option<&'s str> {
        let source = self.source;
        self.peek().map(|t| t.text(source))
    }

    fn peek_punct(&self) -> Option<&'s str> {
        self.peek()
            .filter(|t| t.kind == TokenKind::Punct)
            .map(|t| t.text(self.source))
    }

    /// Start offset of the current token, or end of input.
    fn offset(&self) -> usize {
        self.peek().map_or(self.source.len(), |t| t.span.start)
    }

    fn descend(&mut self) -> ScriptResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ScriptError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn parse_items(&mut self, closer: Option<Closer>) -> ScriptResult<Vec<Expr>> {
        let mut items = Vec::new();
        loop {
            let Some(tok) = self.peek() else {
                return match closer {
                    Some(c) => Err(ScriptError::UnclosedGroup {
                        open: c.open,
                        offset: c.offset,
                    }),
                    None => Ok(items),
                };
            };
            let text = tok.text(self.source);
            if tok.kind == TokenKind::Punct && matches!(text, ")" | "]" | "}") {
                if closer.is_some_and(|c| c.close == text) {
                    return Ok(items);
                }
                return Err(ScriptError::UnexpectedCloser {
                    found: text.chars().next().unwrap_or(')'),
                    offset: tok.span.start,
                });
            }
            if self.can_start_expression(tok) {
                let before = self.pos;
                items.push(self.parse_expression()?);
                if self.pos == before {
                    self.pos += 1;
                }
            } else {
                self.pos += 1;
            }
        }
    }

    fn can_start_expression(&self, tok: &JsToken) -> bool {
        let text = tok.text(self.source);
        match tok.kind {
            TokenKind::Str | TokenKind::Number | TokenKind::Template | TokenKind::Regex => true,
            TokenKind::Ident => !STATEMENT_KEYWORDS.contains(&text),
            TokenKind::Punct => {
                matches!(text, "(" | "[" | "{" | "!" | "~" | "+" | "-" | "++" | "--")
            }
            _ => false,
        }
    }

    fn parse_expression(&mut self) -> ScriptResult<Expr> {
        self.descend()?;
        let expr = self.parse_assignment();
        self.depth -= 1;
        expr
    }

    fn parse_assignment(&mut self) -> ScriptResult<Expr> {
        let left = self.parse_conditional()?;
        let Some(op) = self.peek_punct().filter(|op| ASSIGNMENT_OPS.contains(op)) else {
            return Ok(left);
        };
        self.pos += 1;
        let right = self.parse_expression()?;
        Ok(Expr::new(
            left.span.start..right.span.end.max(left.span.end),
            ExprKind::Binary {
                op: op.to_string(),
                left: Box::new(left),
                right: Box::new(right),
            },
        ))
    }

    fn parse_conditional(&mut self) -> ScriptResult<Expr> {
        let test = self.parse_binary(0)?;
        if self.peek_punct() != Some("?") {
            return Ok(test);
        }
        self.pos += 1;
        let consequent = self.parse_expression()?;
        let alternate = if self.peek_punct() == Some(":") {
            self.pos += 1;
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        let end = alternate
            .as_ref()
            .map_or(consequent.span.end, |alt| alt.span.end);
        Ok(Expr::new(
            test.span.start..end.max(test.span.end),
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate,
            },
        ))
    }

    fn peek_binary_op(&self) -> Option<(&'s str, u8)> {
        let tok = self.peek()?;
        if !matches!(tok.kind, TokenKind::Punct | TokenKind::Ident) {
            return None;
        }
        let text = tok.text(self.source);
        binary_precedence(text).map(|prec| (text, prec))
    }

    fn parse_binary(&mut self, min_prec: u8) -> ScriptResult<Expr> {
        let mut left = self.parse_unary()?;
        while let Some((_, prec)) = self.peek_binary_op() {
            if prec < min_prec {
                break;
            }
            left = if prec == EXPONENT_PRECEDENCE {
                self.parse_exponent(left)?
            } else {
                self.parse_chain(left, prec)?
            };
        }
        Ok(left)
    }

    /// Collect every operator at `prec` following `head` into one flat chain.
    ///
    /// Operands bind tighter operators themselves, so the chain ends at the
    /// first operator of lower precedence.
    fn parse_chain(&mut self, head: Expr, prec: u8) -> ScriptResult<Expr> {
        let start = head.span.start;
        let mut end = head.span.end;
        let mut links = Vec::new();
        while let Some((op, next)) = self.peek_binary_op() {
            if next != prec {
                break;
            }
            self.pos += 1;
            let operand = self.parse_binary(prec + 1)?;
            end = end.max(operand.span.end);
            links.push(ChainLink {
                op: op.to_string(),
                operand,
            });
        }
        Ok(Expr::new(
            start..end,
            ExprKind::Chain {
                head: Box::new(head),
                links,
            },
        ))
    }

    /// `base ** exponent`; right-associative, so each link nests.
    fn parse_exponent(&mut self, base: Expr) -> ScriptResult<Expr> {
        self.pos += 1;
        self.descend()?;
        let exponent = self.parse_binary(EXPONENT_PRECEDENCE);
        self.depth -= 1;
        let exponent = exponent?;
        Ok(Expr::new(
            base.span.start..exponent.span.end.max(base.span.end),
            ExprKind::Binary {
                op: "**".to_string(),
                left: Box::new(base),
                right: Box::new(exponent),
            },
        ))
    }

    fn parse_unary(&mut self) -> ScriptResult<Expr> {
        let Some(tok) = self.peek() else {
            return self.parse_postfix();
        };
        let text = tok.text(self.source);
        let is_prefix = match tok.kind {
            TokenKind::Punct => matches!(text, "!" | "~" | "+" | "-" | "++" | "--"),
            TokenKind::Ident => matches!(text, "typeof" | "void" | "delete" | "await" | "new"),
            _ => false,
        };
        if !is_prefix {
            return self.parse_postfix();
        }
        let start = tok.span.start;
        self.pos += 1;
        self.descend()?;
        let operand = self.parse_unary();
        self.depth -= 1;
        let operand = operand?;
        Ok(Expr::new(
            start..operand.span.end.max(start + text.len()),
            ExprKind::Unary {
                op: text.to_string(),
                operand: Box::new(operand),
            },
        ))
    }

    fn parse_postfix(&mut self) -> ScriptResult<Expr> {
        let mut expr = self.parse_primary()?;
        while let Some(tok) = self.peek() {
            let start = expr.span.start;
            let text = tok.text(self.source);
            let tok_end = tok.span.end;
            match (tok.kind, text) {
                (TokenKind::Punct, "." | "?.") => {
                    self.pos += 1;
                    // `?.(` and `?.[` fall through to the call/index arms.
                    if let Some(name) = self.peek().filter(|t| t.kind == TokenKind::Ident) {
                        let end = name.span.end;
                        let property = name.text(self.source).to_string();
                        self.pos += 1;
                        expr = Expr::new(
                            start..end,
                            ExprKind::Member {
                                object: Box::new(expr),
                                property,
                            },
                        );
                    }
                }
                (TokenKind::Punct, "(") => {
                    let (span, _, children) = self.parse_bracketed()?;
                    expr = Expr::new(
                        start..span.end,
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args: children,
                            args_span: span.start + 1..span.end - 1,
                            args_replacement: None,
                        },
                    );
                }
                (TokenKind::Punct, "[") => {
                    let index = self.parse_group()?;
                    expr = Expr::new(
                        start..index.span.end,
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                    );
                }
                (TokenKind::Template, _) => {
                    // Tagged template.
                    self.pos += 1;
                    expr = Expr::opaque(start..tok_end);
                }
                (TokenKind::Punct, "++" | "--") => {
                    self.pos += 1;
                    expr = Expr::new(
                        start..tok_end,
                        ExprKind::Unary {
                            op: text.to_string(),
                            operand: Box::new(expr),
                        },
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ScriptResult<Expr> {
        let Some(tok) = self.peek().cloned() else {
            let end = self.source.len();
            return Ok(Expr::opaque(end..end));
        };
        let text = tok.text(self.source);
        match tok.kind {
            TokenKind::Str => {
                self.pos += 1;
                Ok(Expr::new(
                    tok.span,
                    ExprKind::Str(StrLit::new(
                        decode_string_literal(text),
                        text.chars().next().unwrap_or('"'),
                    )),
                ))
            }
            TokenKind::Number | TokenKind::Template | TokenKind::Regex => {
                self.pos += 1;
                Ok(Expr::opaque(tok.span))
            }
            TokenKind::Ident if text == "function" => self.parse_function(),
            TokenKind::Ident if !STATEMENT_KEYWORDS.contains(&text) => {
                self.pos += 1;
                Ok(Expr::new(tok.span, ExprKind::Ident(text.to_string())))
            }
            TokenKind::Punct if matches!(text, "(" | "[" | "{") => self.parse_group(),
            // Left for the item loop to skip.
            _ => Ok(Expr::opaque(tok.span.start..tok.span.start)),
        }
    }

    /// `function [*] [name] (params) { body }`
    fn parse_function(&mut self) -> ScriptResult<Expr> {
        let start = self.offset();
        let mut end = start + "function".len();
        self.pos += 1;
        if self.peek_punct() == Some("*") {
            self.pos += 1;
        }
        if let Some(name) = self.peek().filter(|t| t.kind == TokenKind::Ident) {
            end = name.span.end;
            self.pos += 1;
        }
        let mut children = Vec::new();
        for bracket in ["(", "{"] {
            if self.peek_punct() == Some(bracket) {
                let group = self.parse_group()?;
                end = group.span.end;
                children.push(group);
            }
        }
        Ok(Expr::new(
            start..end,
            ExprKind::Group {
                delim: 'f',
                children,
            },
        ))
    }

    /// Parse a bracketed group starting at the current `(`, `[` or `{`.
    fn parse_group(&mut self) -> ScriptResult<Expr> {
        let (span, delim, children) = self.parse_bracketed()?;
        Ok(Expr::new(span, ExprKind::Group { delim, children }))
    }

    fn parse_bracketed(&mut self) -> ScriptResult<(Range<usize>, char, Vec<Expr>)> {
        let start = self.offset();
        let (open, close) = match self.peek_text() {
            Some("(") => ('(', ")"),
            Some("[") => ('[', "]"),
            _ => ('{', "}"),
        };
        self.pos += 1;
        let children = self.parse_items(Some(Closer {
            close,
            open,
            offset: start,
        }))?;
        // parse_items only returns Ok at the matching closer.
        let end = self.peek().map_or(self.source.len(), |t| t.span.end);
        self.pos += 1;
        Ok((start..end, open, children))
    }
}
