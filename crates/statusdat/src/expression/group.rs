// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AND/OR groups of conditions.
//!
//! Precedence is positional rather than AND-over-OR: the first conjunction of
//! a level fixes the group's kind, and when the other conjunction shows up
//! the previous operand plus the rest of the level move into a child group of
//! that kind.
//!
//! ```text
//! a AND b OR c          => AND(a, OR(b, c))
//! a AND b OR c AND d    => AND(a, OR(b, AND(c, d)))
//! (a AND b) OR c        => OR(AND(a, b), c)
//! ```

use std::collections::{HashSet, VecDeque};
use std::vec::IntoIter;

use super::condition::Expression;
use super::error::ExpressionError;
use super::lexer::{tokenize, Token, TokenKind};
use super::operand::Operand;
use crate::model::{ObjectId, RuntimeState};

/// A leaf condition that can filter candidate objects.
pub trait Predicate: Sized {
    fn parse(raw: &str, values: &mut VecDeque<Operand>) -> Result<Self, ExpressionError>;

    /// The subset of `candidates` that match, in candidate order.
    fn filter(&self, state: &RuntimeState, candidates: &[ObjectId]) -> Vec<ObjectId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupKind {
    #[default]
    And,
    Or,
}

mon_core::simple_display! {
    GroupKind {
        And => "AND",
        Or => "OR",
    }
}

#[derive(Debug, Clone)]
pub enum Node<P = Expression> {
    Leaf(P),
    Group(Group<P>),
}

impl<P: Predicate> Node<P> {
    fn filter(&self, state: &RuntimeState, candidates: &[ObjectId]) -> Vec<ObjectId> {
        match self {
            Node::Leaf(predicate) => predicate.filter(state, candidates),
            Node::Group(group) => group.filter(state, candidates),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Group<P = Expression> {
    kind: Option<GroupKind>,
    items: Vec<Node<P>>,
}

impl<P> Default for Group<P> {
    fn default() -> Self {
        Self { kind: None, items: Vec::new() }
    }
}

impl<P> Group<P> {
    pub fn new(kind: GroupKind) -> Self {
        Self { kind: Some(kind), items: Vec::new() }
    }

    pub fn with_items(kind: GroupKind, items: Vec<Node<P>>) -> Self {
        Self { kind: Some(kind), items }
    }

    /// Group kind; a group without any conjunction is an AND.
    pub fn kind(&self) -> GroupKind {
        self.kind.unwrap_or_default()
    }

    pub fn items(&self) -> &[Node<P>] {
        &self.items
    }

    pub fn push(&mut self, node: Node<P>) {
        self.items.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<P: Predicate> Group<P> {
    /// Parse a condition string, consuming one value per `?` from the front
    /// of `values`.
    pub fn parse(condition: &str, values: &mut VecDeque<Operand>) -> Result<Self, ExpressionError> {
        let mut tokens = tokenize(condition)?.into_iter();
        parse_level(Group::default(), &mut tokens, values, None, 0)
    }

    /// Filter `candidates`: AND narrows the survivors child by child, OR
    /// unions each child's matches over the same candidates.
    pub fn filter(&self, state: &RuntimeState, candidates: &[ObjectId]) -> Vec<ObjectId> {
        let matched: HashSet<ObjectId> = match self.kind() {
            GroupKind::And => {
                let mut survivors = candidates.to_vec();
                for item in &self.items {
                    survivors = item.filter(state, &survivors);
                }
                survivors.into_iter().collect()
            }
            GroupKind::Or => {
                self.items.iter().flat_map(|item| item.filter(state, candidates)).collect()
            }
        };
        let mut seen = HashSet::new();
        candidates.iter().copied().filter(|id| matched.contains(id) && seen.insert(*id)).collect()
    }
}

/// Compile a condition with all of its placeholder values.
///
/// Fails when placeholders outnumber `values` or values are left over.
pub fn compile(condition: &str, values: Vec<Operand>) -> Result<Group, ExpressionError> {
    let mut values = VecDeque::from(values);
    let group = Group::parse(condition, &mut values)?;
    if !values.is_empty() {
        return Err(ExpressionError::ExcessValues(values.len()));
    }
    Ok(group)
}

type Tokens = IntoIter<Token>;

/// Parse one nesting level into `group`.
///
/// `open` is the position of the `(` that started this level; the level ends
/// at its `)` (consumed) or, for the top level, at end of input. `after` is
/// the end of the token preceding this level.
fn parse_level<P: Predicate>(
    mut group: Group<P>,
    tokens: &mut Tokens,
    values: &mut VecDeque<Operand>,
    open: Option<usize>,
    after: usize,
) -> Result<Group<P>, ExpressionError> {
    // Whether the next token must be an operand. An implicit group arrives
    // holding one operand right after its conjunction.
    let mut expect_operand = group.items.is_empty() || group.kind.is_some();
    let mut last_end = after;

    loop {
        let Some(token) = tokens.next() else {
            if let Some(position) = open {
                return Err(ExpressionError::UnclosedGroup { position });
            }
            if expect_operand && !group.items.is_empty() {
                return Err(ExpressionError::EmptyOperand { position: last_end });
            }
            return Ok(group);
        };

        let conjunction = match token.kind {
            TokenKind::And => Some(GroupKind::And),
            TokenKind::Or => Some(GroupKind::Or),
            _ => None,
        };
        match token.kind {
            TokenKind::RParen => {
                if open.is_none() {
                    return Err(ExpressionError::UnexpectedClose { position: token.start });
                }
                if expect_operand {
                    return Err(ExpressionError::EmptyOperand { position: token.start });
                }
                return Ok(group);
            }
            TokenKind::LParen | TokenKind::Condition(_) if !expect_operand => {
                return Err(ExpressionError::MissingConjunction { position: token.start });
            }
            TokenKind::LParen => {
                let child = parse_level(Group::default(), tokens, values, Some(token.start), token.end)?;
                group.items.push(Node::Group(child));
                expect_operand = false;
            }
            TokenKind::Condition(text) => {
                group.items.push(Node::Leaf(P::parse(&text, values)?));
                expect_operand = false;
            }
            TokenKind::And | TokenKind::Or => {
                if expect_operand {
                    return Err(ExpressionError::EmptyOperand { position: token.start });
                }
                let kind = conjunction.unwrap_or_default();
                match group.kind {
                    None => group.kind = Some(kind),
                    Some(current) if current == kind => {}
                    Some(_) => {
                        // The rest of this level, including its closing
                        // parenthesis, belongs to the implicit child.
                        let mut implicit = Group::new(kind);
                        implicit.items.extend(group.items.pop());
                        let implicit = parse_level(implicit, tokens, values, open, token.end)?;
                        group.items.push(Node::Group(implicit));
                        return Ok(group);
                    }
                }
                expect_operand = true;
            }
        }
        last_end = token.end;
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
