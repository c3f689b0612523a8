// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Splits a condition string into parentheses, conjunctions and the raw
//! text of each leaf condition.

use super::error::ExpressionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    And,
    Or,
    /// Raw leaf text, e.g. `host_name = 'web 1'`
    Condition(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

/// Tokenize a condition string.
///
/// `AND` / `OR` are recognized case-insensitively as whole words outside
/// quotes; everything between conjunctions and parentheses is leaf text.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut lexer = Lexer { input, tokens: Vec::new(), condition: None };
    let mut chars = input.char_indices();
    let mut word: Option<usize> = None;

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '\'' | '"' => {
                word.get_or_insert(pos);
                if !chars.by_ref().any(|(_, c)| c == ch) {
                    return Err(ExpressionError::UnterminatedQuote { position: pos });
                }
            }
            '(' | ')' => {
                if let Some(start) = word.take() {
                    lexer.word(start, pos);
                }
                lexer.flush();
                let kind = if ch == '(' { TokenKind::LParen } else { TokenKind::RParen };
                lexer.tokens.push(Token { kind, start: pos, end: pos + 1 });
            }
            c if c.is_whitespace() => {
                if let Some(start) = word.take() {
                    lexer.word(start, pos);
                }
            }
            _ => {
                word.get_or_insert(pos);
            }
        }
    }
    if let Some(start) = word.take() {
        lexer.word(start, input.len());
    }
    lexer.flush();
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    /// Span of the leaf condition being accumulated
    condition: Option<(usize, usize)>,
}

impl Lexer<'_> {
    fn word(&mut self, start: usize, end: usize) {
        let text = self.input.get(start..end).unwrap_or_default();
        let conjunction = if text.eq_ignore_ascii_case("and") {
            Some(TokenKind::And)
        } else if text.eq_ignore_ascii_case("or") {
            Some(TokenKind::Or)
        } else {
            None
        };
        match conjunction {
            Some(kind) => {
                self.flush();
                self.tokens.push(Token { kind, start, end });
            }
            None => {
                let begin = self.condition.map_or(start, |(begin, _)| begin);
                self.condition = Some((begin, end));
            }
        }
    }

    fn flush(&mut self) {
        if let Some((start, end)) = self.condition.take() {
            let text = self.input.get(start..end).unwrap_or_default().to_string();
            self.tokens.push(Token { kind: TokenKind::Condition(text), start, end });
        }
    }
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
