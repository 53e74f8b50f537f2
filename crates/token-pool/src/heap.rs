//! Array-backed binary min-heap keyed by token usage
//!
//! Tokens live in a dense, zero-indexed `Vec`. A position table maps each
//! token id to its current slot and is rewritten by every swap, which is what
//! makes in-place priority increase O(log n) without a linear search.
//!
//! Ties on usage are never broken explicitly: comparisons are strict, so the
//! extraction order among equal-usage tokens is whatever the array layout
//! yields. Given the same insertion history it is always the same order.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};

/// Stable token identity, assigned once at pool construction.
pub type TokenId = u32;

/// A rotatable resource handle and its usage since the last reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    id: TokenId,
    usage: u64,
}

impl Token {
    /// A fresh token with zero usage.
    pub fn new(id: TokenId) -> Self {
        Self { id, usage: 0 }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn usage(&self) -> u64 {
        self.usage
    }

    /// Bump usage by one. Only valid while the token is detached from a heap.
    pub(crate) fn increment(&mut self) {
        self.usage = self.usage.saturating_add(1);
    }
}

/// Min-heap of tokens ordered by usage count.
#[derive(Debug, Default)]
pub struct UsageHeap {
    tokens: Vec<Token>,
    positions: HashMap<TokenId, usize>,
}

impl UsageHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a heap from an arbitrary set of tokens in O(n).
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let positions = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();
        let mut heap = Self { tokens, positions };
        heap.reheapify();
        heap
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// A token with the minimum usage, without removing it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.first()
    }

    /// Look up a token by id.
    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.positions.get(&id).map(|&i| &self.tokens[i])
    }

    /// Tokens in heap (array) order.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Add a token and restore heap order. O(log n).
    pub fn insert(&mut self, token: Token) {
        debug_assert!(
            !self.positions.contains_key(&token.id),
            "token {} inserted twice",
            token.id
        );
        let idx = self.tokens.len();
        self.positions.insert(token.id, idx);
        self.tokens.push(token);
        self.sift_up(idx);
    }

    /// Remove and return a token with the minimum usage. O(log n).
    ///
    /// Which of several tied tokens comes out is decided by array layout.
    pub fn extract_min(&mut self) -> Result<Token> {
        if self.tokens.is_empty() {
            return Err(Error::EmptyPool);
        }
        let last = self.tokens.len() - 1;
        self.swap(0, last);
        let token = self.tokens.pop().ok_or(Error::EmptyPool)?;
        self.positions.remove(&token.id);
        if !self.tokens.is_empty() {
            self.sift_down(0);
        }
        Ok(token)
    }

    /// Raise a token's usage in place and restore heap order. O(log n).
    ///
    /// Returns the updated token, or `None` if the id is not in the heap.
    pub fn increase(&mut self, id: TokenId, amount: u64) -> Option<&Token> {
        let idx = *self.positions.get(&id)?;
        let token = &mut self.tokens[idx];
        token.usage = token.usage.saturating_add(amount);
        let idx = self.sift_down(idx);
        Some(&self.tokens[idx])
    }

    /// Set every token's usage to zero and rebuild heap order.
    pub fn zero_usage(&mut self) {
        for token in &mut self.tokens {
            token.usage = 0;
        }
        self.reheapify();
    }

    /// Rebuild heap order from scratch in O(n).
    pub fn reheapify(&mut self) {
        let n = self.tokens.len();
        for i in (0..n / 2).rev() {
            self.sift_down(i);
        }
    }

    fn less(&self, i: usize, j: usize) -> bool {
        self.tokens[i].usage < self.tokens[j].usage
    }

    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.tokens.swap(i, j);
        self.positions.insert(self.tokens[i].id, i);
        self.positions.insert(self.tokens[j].id, j);
    }

    fn sift_up(&mut self, mut idx: usize) -> usize {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !self.less(idx, parent) {
                break;
            }
            self.swap(idx, parent);
            idx = parent;
        }
        idx
    }

    fn sift_down(&mut self, mut idx: usize) -> usize {
        let n = self.tokens.len();
        loop {
            let left = 2 * idx + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < n && self.less(right, left) {
                child = right;
            }
            if !self.less(child, idx) {
                break;
            }
            self.swap(idx, child);
            idx = child;
        }
        idx
    }

    /// Heap property on usage, and the position table matches the array.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let ordered = (1..self.tokens.len()).all(|i| {
            let parent = (i - 1) / 2;
            self.tokens[parent].usage <= self.tokens[i].usage
        });
        let indexed = self.positions.len() == self.tokens.len()
            && self
                .tokens
                .iter()
                .enumerate()
                .all(|(i, t)| self.positions.get(&t.id) == Some(&i));
        ordered && indexed
    }
}
