//! Parsing of type annotation text into type nodes.
//!
//! Used by the builder and by edit application, which both describe types as
//! short strings: `int`, `Box<T>`, `A | null`, `(int, string) => void`.

use ets_common::Span;

use crate::node::{FunctionTypeData, NodeKind, TypeRefData};
use crate::{NodeArena, NodeIndex};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token<'s> {
    Name(&'s str),
    Lt,
    Gt,
    Comma,
    Pipe,
    LParen,
    RParen,
    Arrow,
}

fn tokenize(text: &str) -> Option<Vec<Token<'_>>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b' ' | b'\t' => i += 1,
            b'<' => {
                tokens.push(Token::Lt);
                i += 1;
            }
            b'>' => {
                tokens.push(Token::Gt);
                i += 1;
            }
            b',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            b'|' => {
                tokens.push(Token::Pipe);
                i += 1;
            }
            b'(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            b')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            b'=' if bytes.get(i + 1) == Some(&b'>') => {
                tokens.push(Token::Arrow);
                i += 2;
            }
            _ if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'.') => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b'$' | b'.')) {
                    i += 1;
                }
                tokens.push(Token::Name(&text[start..i]));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

struct TypeParser<'s, 'a> {
    tokens: Vec<Token<'s>>,
    pos: usize,
    arena: &'a mut NodeArena,
    span: Span,
}

impl TypeParser<'_, '_> {
    fn peek(&self) -> Option<&Token<'_>> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, expected: &Token<'_>) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Option<NodeIndex> {
        let first = self.parse_primary()?;
        if self.peek() != Some(&Token::Pipe) {
            return Some(first);
        }
        let mut members = vec![first];
        while self.eat(&Token::Pipe) {
            members.push(self.parse_primary()?);
        }
        Some(self.arena.add(NodeKind::UnionTypeNode(members), self.span))
    }

    fn parse_primary(&mut self) -> Option<NodeIndex> {
        if self.eat(&Token::LParen) {
            let mut params = Vec::new();
            if !self.eat(&Token::RParen) {
                loop {
                    params.push(self.parse_type()?);
                    if self.eat(&Token::RParen) {
                        break;
                    }
                    if !self.eat(&Token::Comma) {
                        return None;
                    }
                }
            }
            if !self.eat(&Token::Arrow) {
                return None;
            }
            let return_type = self.parse_type()?;
            return Some(self.arena.add(
                NodeKind::FunctionTypeNode(FunctionTypeData { params, return_type }),
                self.span,
            ));
        }

        let name = match self.peek()? {
            Token::Name(name) => (*name).to_string(),
            _ => return None,
        };
        self.pos += 1;
        let mut type_args = Vec::new();
        if self.eat(&Token::Lt) {
            loop {
                type_args.push(self.parse_type()?);
                if self.eat(&Token::Gt) {
                    break;
                }
                if !self.eat(&Token::Comma) {
                    return None;
                }
            }
        }
        Some(self.arena.add(NodeKind::TypeRef(TypeRefData { name, type_args }), self.span))
    }
}

/// Parse `text` into type nodes appended to `arena`, all carrying `span`.
///
/// Returns `None` for malformed text.
pub fn parse_type(arena: &mut NodeArena, text: &str, span: Span) -> Option<NodeIndex> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return None;
    }
    let mut parser = TypeParser {
        tokens,
        pos: 0,
        arena,
        span,
    };
    let ty = parser.parse_type()?;
    (parser.pos == parser.tokens.len()).then_some(ty)
}

/// Render a type node back to the text accepted by [`parse_type`].
#[must_use]
pub fn type_to_text(arena: &NodeArena, idx: NodeIndex) -> String {
    match arena.kind(idx) {
        Some(NodeKind::TypeRef(t)) if t.type_args.is_empty() => t.name.clone(),
        Some(NodeKind::TypeRef(t)) => {
            let args: Vec<String> = t.type_args.iter().map(|&a| type_to_text(arena, a)).collect();
            format!("{}<{}>", t.name, args.join(", "))
        }
        Some(NodeKind::UnionTypeNode(types)) => {
            let parts: Vec<String> = types.iter().map(|&t| type_to_text(arena, t)).collect();
            parts.join(" | ")
        }
        Some(NodeKind::FunctionTypeNode(f)) => {
            let params: Vec<String> = f.params.iter().map(|&p| type_to_text(arena, p)).collect();
            format!("({}) => {}", params.join(", "), type_to_text(arena, f.return_type))
        }
        _ => String::new(),
    }
}
